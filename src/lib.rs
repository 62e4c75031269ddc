//! # contentful-flatten - Contentful Delivery Client
//!
//! Searches a Contentful space and turns the linked response graph into
//! plain, self-contained JSON that deserializes directly into your types.
//!
//! ## Modules
//!
//! - **flatten**: resolve every link against the `includes` table
//! - **search**: query parameters and the blocking HTTP client
//! - **content**: typed helpers for metadata and assets
//! - **hooks**: lifecycle span events
//!
//! ## Quick Start
//!
//! ### Flattening a response
//!
//! ```rust
//! use contentful_flatten::{Flattener, SearchResponse};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let response: SearchResponse = serde_json::from_value(json!({
//!     "total": 1,
//!     "items": [{
//!         "sys": {"type": "Entry", "id": "page1"},
//!         "fields": {
//!             "title": "Main page",
//!             "banner": {"sys": {"type": "Link", "linkType": "Asset", "id": "img1"}}
//!         }
//!     }],
//!     "includes": {
//!         "Asset": [{"sys": {"type": "Asset", "id": "img1"}, "fields": {"title": "Green"}}]
//!     }
//! }))?;
//!
//! let items = Flattener::default().flatten_many(response)?;
//! assert_eq!(items[0]["banner"]["title"], "Green");
//! assert_eq!(items[0]["contentfulId"], "page1");
//! # Ok(())
//! # }
//! ```
//!
//! ### Searching
//!
//! ```no_run
//! use contentful_flatten::{Asset, Client, ClientConfig, SearchParameters};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Page {
//!     title: String,
//!     banner: Asset,
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! let client = Client::new(ClientConfig::new("token", "space", false))?;
//! let page: Page = client.get_one(
//!     SearchParameters::new()
//!         .by_content_type("page")
//!         .by_field_value("title", "Main page"),
//! )?;
//! println!("{} {}", page.title, page.banner.file.absolute_url());
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

pub mod content;
pub mod error;
pub mod flatten;
pub mod hooks;
pub mod search;

// Re-export commonly used types for convenience
pub use content::{Asset, File, Information};
pub use error::Error;
pub use flatten::{
    materialize, CollisionPolicy, FlattenConfig, FlattenedItem, Flattener, IncludeTable, Item,
    ItemWriter, Link, LinkKind, OutputFormat, SearchResponse,
};
pub use hooks::{NoopHooks, SearchHooks, SpanEvent, SpanName, SpanStatus};
pub use search::{Client, ClientConfig, SearchParameters};

/// Flatten a stream of search responses, one JSON document per line
pub fn flatten_json<R: BufRead, W: Write>(
    reader: R,
    writer: &mut ItemWriter<W>,
    config: FlattenConfig,
) -> Result<()> {
    let flattener = Flattener::new(config);

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read line")?;
        if line.trim().is_empty() {
            continue;
        }

        let response: SearchResponse = serde_json::from_str(&line)
            .with_context(|| format!("Failed to parse search response on line {}", index + 1))?;

        let items = flattener.flatten_many(response)?;
        writer.write_items(items)?;
    }

    Ok(())
}
