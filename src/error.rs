//! Error type shared by the flattening engine and the search client

use crate::flatten::LinkKind;
use thiserror::Error;

/// Everything that can go wrong between a search request and a typed result
#[derive(Debug, Error)]
pub enum Error {
    /// A link kind other than `Entry` or `Asset`.
    ///
    /// Only raised by [`LinkKind`](crate::LinkKind) parsing and
    /// [`Link::new`](crate::Link::new). Flattening never raises it: a `sys`
    /// with an unknown `linkType` is kept as a plain object.
    #[error("unsupported link kind `{kind}`, expected Entry or Asset")]
    InvalidLinkKind { kind: String },

    /// A well-formed link whose target is missing from the include table
    #[error(
        "dangling reference to {kind} `{id}`, searched {} included {kind} item(s): [{}]",
        .searched.len(),
        .searched.join(", ")
    )]
    DanglingReference {
        kind: LinkKind,
        id: String,
        /// Ids of the include sequence that was searched, in order
        searched: Vec<String>,
    },

    /// Link nesting went past `FlattenConfig::max_depth`
    #[error("link depth limit of {limit} exceeded while resolving {kind} `{id}`")]
    DepthExceeded {
        limit: usize,
        kind: LinkKind,
        id: String,
    },

    /// A content field uses one of the injected metadata keys
    #[error("field `{key}` collides with an injected metadata key")]
    MetadataCollision { key: String },

    /// The destination type does not match the flattened value
    #[error("flattened value does not fit the destination: {0}")]
    StructuralMismatch(#[source] serde_json::Error),

    /// Item metadata could not be encoded
    #[error("failed to encode item metadata: {0}")]
    Metadata(#[source] serde_json::Error),

    /// The search returned zero items
    #[error("contentful: no entries returned")]
    NoEntries,

    /// A single entry was expected but more were returned
    #[error("contentful: more than one entry was returned")]
    MoreThanOneEntry,

    /// Rate limited and the retry would not finish before the deadline
    #[error("contentful: too many requests")]
    TooManyRequests,

    /// Any other non-200 status
    #[error("non-ok status code: {0}")]
    Status(u16),

    /// The response body is not a search response
    #[error("failed to decode search response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("http request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A query pair that is not `key=value`
    #[error("could not parse query `{0}`, expected key=value")]
    InvalidQuery(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
