//! Link flattening - inline every reference of a search response
//!
//! A search response carries its primary `items` plus an `includes` side
//! table of referenced entries and assets. Fields point into that table with
//! link objects of the form `{"sys": {"type": "Link", "linkType": "Entry", "id": "..."}}`.
//! The [`Flattener`] replaces each link with the flattened content of its
//! target, recursively, and attaches the target's system metadata, so the
//! result deserializes straight into plain structs.

pub mod types;
pub mod resolver;
pub mod flattener;
pub mod materialize;
pub mod writer;

pub use types::{
    CollisionPolicy, FlattenConfig, FlattenedItem, IncludeTable, Item, ItemInfo, Link, LinkKind,
    Node, SearchResponse, SysRef, SysRefInfo, LINK_MARKER,
};
pub use flattener::Flattener;
pub use materialize::{materialize, materialize_many, materialize_one};
pub use writer::{ItemWriter, OutputFormat};

use crate::error::Result;

/// Flatten every item of `response` with the default configuration
pub fn flatten_many(response: SearchResponse) -> Result<Vec<FlattenedItem>> {
    Flattener::default().flatten_many(response)
}

/// Flatten one item against `includes` with the default configuration
pub fn flatten_one(item: &Item, includes: &IncludeTable) -> Result<FlattenedItem> {
    Flattener::default().flatten_one(item, includes)
}
