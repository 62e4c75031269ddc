use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

// key=value with exactly one '='
static QUERY_PAIR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^=]+)=([^=]*)$").unwrap()
});

/// Query parameters for the entries endpoint.
///
/// See the Content Delivery API reference for every supported parameter;
/// the builder methods cover the common ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParameters {
    values: BTreeMap<String, Vec<String>>,
}

impl SearchParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `key=value` pairs, e.g. from the command line
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        pairs.into_iter().try_fold(Self::new(), |params, pair| {
            let (key, value) = parse_pair(pair.as_ref())?;
            Ok(params.add(key, value))
        })
    }

    /// Replace all values of `key`
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), vec![value.into()]);
        self
    }

    /// Append a value to `key`
    pub fn add(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.entry(key.into()).or_default().push(value.into());
        self
    }

    pub fn by_content_type(self, content_type: &str) -> Self {
        self.set("content_type", content_type)
    }

    /// Match a field value; the API requires `by_content_type` alongside it
    pub fn by_field_value(self, field_name: &str, field_value: &str) -> Self {
        self.add(format!("fields.{}", field_name), field_value)
    }

    pub fn by_locale(self, locale: &str) -> Self {
        self.set("locale", locale)
    }

    pub fn by_id(self, id: &str) -> Self {
        self.set("sys.id", id)
    }

    pub fn limit(self, limit: u32) -> Self {
        self.set("limit", limit.to_string())
    }

    pub fn skip(self, skip: u32) -> Self {
        self.set("skip", skip.to_string())
    }

    /// First value of `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Form-urlencoded query string, keys sorted
    pub fn encode(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.values {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

/// Split a `key=value` pair
pub fn parse_pair(pair: &str) -> Result<(String, String)> {
    let captures = QUERY_PAIR_REGEX
        .captures(pair)
        .ok_or_else(|| Error::InvalidQuery(pair.to_string()))?;

    Ok((captures[1].to_string(), captures[2].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_sorts_and_escapes() {
        let params = SearchParameters::new();
        assert!(params.is_empty());
        assert_eq!(params.encode(), "");

        let params = params
            .by_content_type("page")
            .by_field_value("title", "Main page")
            .by_field_value("description", "Main page description")
            .by_locale("en-US")
            .by_id("contentful_ID")
            .skip(1)
            .limit(2);

        assert_eq!(
            params.encode(),
            "content_type=page&fields.description=Main+page+description&fields.title=Main+page&limit=2&locale=en-US&skip=1&sys.id=contentful_ID"
        );
    }

    #[test]
    fn test_set_replaces_and_add_appends() {
        let params = SearchParameters::new()
            .limit(5)
            .limit(10)
            .add("fields.tag", "a")
            .add("fields.tag", "b");

        assert_eq!(params.get("limit"), Some("10"));
        assert_eq!(params.encode(), "fields.tag=a&fields.tag=b&limit=10");
    }

    #[test]
    fn test_parse_pairs() {
        let params = SearchParameters::from_pairs(["content_type=page", "fields.title=Main page"]).unwrap();
        assert_eq!(params.get("content_type"), Some("page"));
        assert_eq!(params.get("fields.title"), Some("Main page"));

        assert_eq!(parse_pair("skip=").unwrap(), ("skip".to_string(), String::new()));
        assert!(matches!(parse_pair("no-equals"), Err(Error::InvalidQuery(_))));
        assert!(matches!(parse_pair("a=b=c"), Err(Error::InvalidQuery(_))));
        assert!(matches!(parse_pair("=value"), Err(Error::InvalidQuery(_))));
    }
}
