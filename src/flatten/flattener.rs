use crate::content::Information;
use crate::error::{Error, Result};
use crate::flatten::types::{
    CollisionPolicy, FlattenConfig, FlattenedItem, IncludeTable, Item, ItemInfo, Link, Node,
    SearchResponse,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Replaces every link in a response with the content it points at
pub struct Flattener {
    config: FlattenConfig,
}

impl Flattener {
    pub fn new(config: FlattenConfig) -> Self {
        Flattener { config }
    }

    /// Flatten every top-level item of a response, in order.
    ///
    /// Top-level entries are injected into the include table first, so
    /// results can link to each other. The first failing item aborts the
    /// batch. An empty response flattens to an empty list.
    pub fn flatten_many(&self, mut response: SearchResponse) -> Result<Vec<FlattenedItem>> {
        response.includes.inject_entries(&response.items);

        response
            .items
            .iter()
            .map(|item| self.flatten_one(item, &response.includes))
            .collect()
    }

    /// Flatten one item against an include table
    pub fn flatten_one(&self, item: &Item, includes: &IncludeTable) -> Result<FlattenedItem> {
        self.flatten_item(item, includes, 0)
    }

    /// Flatten a single field value
    pub fn flatten_field(&self, node: &Node, includes: &IncludeTable) -> Result<Value> {
        self.flatten_node(node, includes, 0)
    }

    fn flatten_item(&self, item: &Item, includes: &IncludeTable, depth: usize) -> Result<FlattenedItem> {
        let mut flattened = self.flatten_fields(&item.fields, includes, depth)?;
        self.inject_metadata(&mut flattened, &item.sys)?;
        Ok(flattened)
    }

    /// Flatten a field map without attaching metadata
    fn flatten_fields(
        &self,
        fields: &BTreeMap<String, Node>,
        includes: &IncludeTable,
        depth: usize,
    ) -> Result<Map<String, Value>> {
        fields
            .iter()
            .map(|(key, node)| Ok((key.clone(), self.flatten_node(node, includes, depth)?)))
            .collect()
    }

    fn flatten_node(&self, node: &Node, includes: &IncludeTable, depth: usize) -> Result<Value> {
        match node {
            Node::Scalar(value) => Ok(value.clone()),
            Node::List(items) => items
                .iter()
                .map(|item| self.flatten_node(item, includes, depth))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Node::Object(fields) => self.flatten_fields(fields, includes, depth).map(Value::Object),
            Node::Link(link) => self.resolve(link, includes, depth).map(Value::Object),
        }
    }

    /// Look up a link target and flatten it against the same table
    fn resolve(&self, link: &Link, includes: &IncludeTable, depth: usize) -> Result<FlattenedItem> {
        if depth >= self.config.max_depth {
            return Err(Error::DepthExceeded {
                limit: self.config.max_depth,
                kind: link.kind,
                id: link.id.clone(),
            });
        }

        let target = includes.find(link)?;
        self.flatten_item(target, includes, depth + 1)
    }

    fn inject_metadata(&self, flattened: &mut FlattenedItem, sys: &ItemInfo) -> Result<()> {
        let metadata: Map<String, Value> = serde_json::to_value(Information::from(sys))
            .and_then(serde_json::from_value)
            .map_err(Error::Metadata)?;

        if self.config.metadata_collision == CollisionPolicy::Reject {
            if let Some(key) = metadata.keys().find(|key| flattened.contains_key(*key)) {
                return Err(Error::MetadataCollision { key: key.clone() });
            }
        }

        flattened.extend(metadata);
        Ok(())
    }
}

impl Default for Flattener {
    fn default() -> Self {
        Flattener::new(FlattenConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{CONTENT_TYPE_KEY, ID_KEY, LOCALE_KEY, METADATA_KEYS, REVISION_KEY};
    use crate::flatten::types::LinkKind;
    use serde_json::json;

    fn link(kind: &str, id: &str) -> Value {
        json!({"sys": {"type": "Link", "linkType": kind, "id": id}})
    }

    fn item(value: Value) -> Item {
        serde_json::from_value(value).unwrap()
    }

    fn response(value: Value) -> SearchResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_link_free_item_keeps_fields() {
        let fields = json!({
            "title": "Main page",
            "count": 3,
            "published": true,
            "nothing": null,
            "tags": ["a", "b"],
            "seo": {"description": "plain object", "keywords": ["x"]}
        });
        let input = item(json!({
            "sys": {"type": "Entry", "id": "p1", "locale": "en-US"},
            "fields": fields
        }));

        let flattened = Flattener::default()
            .flatten_one(&input, &IncludeTable::default())
            .unwrap();

        assert_eq!(flattened.len(), fields.as_object().unwrap().len() + METADATA_KEYS.len());
        for (key, value) in fields.as_object().unwrap() {
            assert_eq!(&flattened[key], value);
        }
        assert_eq!(flattened[ID_KEY], "p1");
        assert_eq!(flattened[LOCALE_KEY], "en-US");
    }

    #[test]
    fn test_link_resolves_with_metadata() {
        let includes = IncludeTable {
            entries: vec![item(json!({"sys": {"type": "Entry", "id": "e1"}, "fields": {"x": 1}}))],
            assets: vec![],
        };
        let node = Node::from(link("Entry", "e1"));

        let value = Flattener::default().flatten_field(&node, &includes).unwrap();

        assert_eq!(value["x"], 1);
        assert_eq!(value[ID_KEY], "e1");
        assert_eq!(value[CONTENT_TYPE_KEY], "");
        assert_eq!(value[REVISION_KEY], 0);
    }

    #[test]
    fn test_unknown_link_type_stays_plain_object() {
        let space = link("Space", "s1");
        let node = Node::from(space.clone());

        let value = Flattener::default()
            .flatten_field(&node, &IncludeTable::default())
            .unwrap();
        assert_eq!(value, space);
    }

    #[test]
    fn test_siblings_resolve_through_injection() {
        let response = response(json!({
            "total": 2,
            "items": [
                {"sys": {"type": "Entry", "id": "a"}, "fields": {"title": "A", "next": link("Entry", "b")}},
                {"sys": {"type": "Entry", "id": "b"}, "fields": {"title": "B"}}
            ],
            "includes": {}
        }));

        let flattened = Flattener::default().flatten_many(response).unwrap();

        assert_eq!(flattened.len(), 2);
        assert_eq!(flattened[0]["title"], "A");
        assert_eq!(flattened[0]["next"]["title"], "B");
        assert_eq!(flattened[0]["next"][ID_KEY], "b");
        assert_eq!(flattened[1]["title"], "B");
    }

    #[test]
    fn test_dangling_asset_fails() {
        let response = response(json!({
            "total": 1,
            "items": [{"sys": {"type": "Entry", "id": "p1"}, "fields": {"banner": link("Asset", "missing")}}],
            "includes": {"Asset": [{"sys": {"type": "Asset", "id": "other"}, "fields": {}}]}
        }));

        let err = Flattener::default().flatten_many(response).unwrap_err();
        match err {
            Error::DanglingReference { kind, id, searched } => {
                assert_eq!(kind, LinkKind::Asset);
                assert_eq!(id, "missing");
                assert_eq!(searched, vec!["other"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_list_of_links_keeps_order() {
        let includes = IncludeTable {
            entries: vec![
                item(json!({"sys": {"type": "Entry", "id": "b"}, "fields": {"name": "B"}})),
                item(json!({"sys": {"type": "Entry", "id": "a"}, "fields": {"name": "A"}})),
            ],
            assets: vec![],
        };
        let node = Node::from(json!([link("Entry", "a"), link("Entry", "b")]));

        let value = Flattener::default().flatten_field(&node, &includes).unwrap();

        let names: Vec<&Value> = value.as_array().unwrap().iter().map(|v| &v["name"]).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_list_with_dangling_link_fails_whole_list() {
        let includes = IncludeTable {
            entries: vec![item(json!({"sys": {"type": "Entry", "id": "a"}, "fields": {}}))],
            assets: vec![],
        };
        let node = Node::from(json!([link("Entry", "a"), link("Entry", "b")]));

        let err = Flattener::default().flatten_field(&node, &includes).unwrap_err();
        assert!(matches!(err, Error::DanglingReference { ref id, .. } if id == "b"));
    }

    #[test]
    fn test_empty_response_flattens_to_empty_list() {
        let response = response(json!({"total": 0, "items": []}));

        let flattened = Flattener::default().flatten_many(response).unwrap();
        assert!(flattened.is_empty());
    }

    #[test]
    fn test_links_inside_plain_objects_resolve() {
        let includes = IncludeTable {
            entries: vec![],
            assets: vec![item(json!({"sys": {"type": "Asset", "id": "img"}, "fields": {"title": "Orange"}}))],
        };
        let node = Node::from(json!({"hero": {"image": link("Asset", "img"), "caption": "c"}}));

        let value = Flattener::default().flatten_field(&node, &includes).unwrap();

        assert_eq!(value["hero"]["caption"], "c");
        assert_eq!(value["hero"]["image"]["title"], "Orange");
        assert!(value["hero"].get(ID_KEY).is_none());
    }

    #[test]
    fn test_nested_references_resolve_recursively() {
        let response = response(json!({
            "total": 1,
            "items": [{"sys": {"type": "Entry", "id": "root"}, "fields": {"child": link("Entry", "c1")}}],
            "includes": {
                "Entry": [
                    {"sys": {"type": "Entry", "id": "c1"}, "fields": {"banner": link("Asset", "img")}}
                ],
                "Asset": [
                    {"sys": {"type": "Asset", "id": "img"}, "fields": {"title": "Green"}}
                ]
            }
        }));

        let flattened = Flattener::default().flatten_many(response).unwrap();
        assert_eq!(flattened[0]["child"]["banner"]["title"], "Green");
        assert_eq!(flattened[0]["child"]["banner"][CONTENT_TYPE_KEY], "");
    }

    #[test]
    fn test_cycle_hits_depth_limit() {
        let response = response(json!({
            "total": 2,
            "items": [
                {"sys": {"type": "Entry", "id": "a"}, "fields": {"other": link("Entry", "b")}},
                {"sys": {"type": "Entry", "id": "b"}, "fields": {"other": link("Entry", "a")}}
            ]
        }));
        let flattener = Flattener::new(FlattenConfig {
            max_depth: 8,
            ..Default::default()
        });

        let err = flattener.flatten_many(response).unwrap_err();
        assert!(matches!(err, Error::DepthExceeded { limit: 8, .. }));
    }

    #[test]
    fn test_metadata_overwrites_colliding_field_by_default() {
        let input = item(json!({
            "sys": {"type": "Entry", "id": "real"},
            "fields": {"contentfulId": "authored"}
        }));

        let flattened = Flattener::default()
            .flatten_one(&input, &IncludeTable::default())
            .unwrap();
        assert_eq!(flattened[ID_KEY], "real");
    }

    #[test]
    fn test_reject_policy_reports_colliding_field() {
        let input = item(json!({
            "sys": {"type": "Entry", "id": "real"},
            "fields": {"contentfulLocale": "authored"}
        }));
        let flattener = Flattener::new(FlattenConfig {
            metadata_collision: CollisionPolicy::Reject,
            ..Default::default()
        });

        let err = flattener.flatten_one(&input, &IncludeTable::default()).unwrap_err();
        assert!(matches!(err, Error::MetadataCollision { ref key } if key == LOCALE_KEY));
    }
}
