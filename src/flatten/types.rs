use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Value of `sys.type` that marks an object as a link
pub const LINK_MARKER: &str = "Link";

/// A flattened item: resolved fields plus the injected metadata keys
pub type FlattenedItem = Map<String, Value>;

/// What a link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkKind {
    Entry,
    Asset,
}

impl LinkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkKind::Entry => "Entry",
            LinkKind::Asset => "Asset",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Entry" => Ok(LinkKind::Entry),
            "Asset" => Ok(LinkKind::Asset),
            other => Err(Error::InvalidLinkKind {
                kind: other.to_string(),
            }),
        }
    }
}

/// A reference placeholder standing in for an included entry or asset
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    pub kind: LinkKind,
    pub id: String,
}

impl Link {
    /// Build a link from a raw kind string, rejecting kinds other than Entry/Asset
    pub fn new(kind: &str, id: impl Into<String>) -> Result<Self, Error> {
        Ok(Link {
            kind: kind.parse()?,
            id: id.into(),
        })
    }

    pub fn entry(id: impl Into<String>) -> Self {
        Link {
            kind: LinkKind::Entry,
            id: id.into(),
        }
    }

    pub fn asset(id: impl Into<String>) -> Self {
        Link {
            kind: LinkKind::Asset,
            id: id.into(),
        }
    }

    /// Classify the inner `sys` mapping of a candidate link.
    ///
    /// Returns `None` unless `id` is non-empty, `linkType` is Entry or Asset,
    /// and `type` is exactly `"Link"`.
    pub fn from_sys(sys: &Map<String, Value>) -> Option<Self> {
        let id = sys.get("id")?.as_str()?;
        if id.is_empty() {
            return None;
        }

        if sys.get("type")?.as_str()? != LINK_MARKER {
            return None;
        }

        let kind = sys.get("linkType")?.as_str()?.parse().ok()?;
        Some(Link {
            kind,
            id: id.to_string(),
        })
    }

    /// Classify an object of the wire form `{"sys": {...}}`
    pub fn from_object(obj: &Map<String, Value>) -> Option<Self> {
        match obj.get("sys") {
            Some(Value::Object(sys)) => Self::from_sys(sys),
            _ => None,
        }
    }
}

/// A field value, classified once when the response is decoded
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum Node {
    /// String, number, bool or null
    Scalar(Value),
    List(Vec<Node>),
    /// A nested object that is not a link
    Object(BTreeMap<String, Node>),
    Link(Link),
}

impl Node {
    /// Whether this value was classified as a link to an entry or asset
    pub fn is_link(&self) -> bool {
        matches!(self, Node::Link(_))
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(arr) => Node::List(arr.into_iter().map(Node::from).collect()),
            Value::Object(obj) => match Link::from_object(&obj) {
                Some(link) => Node::Link(link),
                None => Node::Object(
                    obj.into_iter()
                        .map(|(key, value)| (key, Node::from(value)))
                        .collect(),
                ),
            },
            scalar => Node::Scalar(scalar),
        }
    }
}

/// `sys` block of a link to a non-item resource, e.g. a content type
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SysRef {
    #[serde(default)]
    pub sys: SysRefInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SysRefInfo {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub sys_type: String,
    #[serde(rename = "linkType", default)]
    pub link_type: String,
}

/// System information of an entry or asset
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInfo {
    /// `Entry` or `Asset` for delivered items
    #[serde(rename = "type", default)]
    pub item_type: String,

    #[serde(default)]
    pub id: String,

    /// Only present on entries
    #[serde(default)]
    pub content_type: Option<SysRef>,

    #[serde(default)]
    pub revision: i64,

    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,

    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,

    #[serde(default)]
    pub locale: String,
}

impl ItemInfo {
    /// The item's kind, if `type` is Entry or Asset
    pub fn kind(&self) -> Option<LinkKind> {
        self.item_type.parse().ok()
    }

    /// Content type id, empty for assets
    pub fn content_type_id(&self) -> &str {
        self.content_type
            .as_ref()
            .map(|ct| ct.sys.id.as_str())
            .unwrap_or("")
    }
}

/// An entry or asset as delivered by the API
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub sys: ItemInfo,

    #[serde(default)]
    pub fields: BTreeMap<String, Node>,
}

impl Item {
    /// True if this item is the target of `link`
    pub fn matches(&self, link: &Link) -> bool {
        self.sys.id == link.id && self.sys.kind() == Some(link.kind)
    }
}

/// Side table of referenced items returned next to the search results
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IncludeTable {
    #[serde(rename = "Entry", alias = "entry", default)]
    pub entries: Vec<Item>,

    #[serde(rename = "Asset", alias = "asset", default)]
    pub assets: Vec<Item>,
}

/// A decoded page of search results
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub total: u64,

    #[serde(default)]
    pub skip: u64,

    #[serde(default)]
    pub limit: u64,

    #[serde(default)]
    pub items: Vec<Item>,

    #[serde(default)]
    pub includes: IncludeTable,
}

/// What to do when a content field already uses a metadata key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Metadata replaces the field value
    #[default]
    Overwrite,
    /// Fail with `Error::MetadataCollision`
    Reject,
}

/// Configuration for the flattening process
#[derive(Debug, Clone)]
pub struct FlattenConfig {
    /// Maximum number of nested link resolutions below one top-level item
    pub max_depth: usize,

    /// Handling of fields named like an injected metadata key
    pub metadata_collision: CollisionPolicy,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        FlattenConfig {
            max_depth: 64,
            metadata_collision: CollisionPolicy::Overwrite,
        }
    }
}
