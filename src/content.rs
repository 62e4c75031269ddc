//! Typed destinations for flattened items
//!
//! Every flattened item carries six metadata keys. [`Information`] binds
//! them and is also what the flattener serializes to inject them, so the key
//! names are defined in exactly one place. Embed it with `#[serde(flatten)]`:
//!
//! ```rust
//! use contentful_flatten::{Asset, Information};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Page {
//!     title: String,
//!     banner: Asset,
//!     #[serde(default, rename = "subPages")]
//!     sub_pages: Vec<Page>,
//!     #[serde(flatten)]
//!     information: Information,
//! }
//! ```

use crate::flatten::ItemInfo;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Prefix shared by all injected metadata keys
pub const METADATA_PREFIX: &str = "contentful";

pub const ID_KEY: &str = "contentfulId";
pub const CONTENT_TYPE_KEY: &str = "contentfulContentType";
pub const REVISION_KEY: &str = "contentfulRevision";
pub const CREATED_AT_KEY: &str = "contentfulCreatedAt";
pub const UPDATED_AT_KEY: &str = "contentfulUpdatedAt";
pub const LOCALE_KEY: &str = "contentfulLocale";

/// All injected metadata keys
pub const METADATA_KEYS: [&str; 6] = [
    ID_KEY,
    CONTENT_TYPE_KEY,
    REVISION_KEY,
    CREATED_AT_KEY,
    UPDATED_AT_KEY,
    LOCALE_KEY,
];

/// System information of an entry or asset, as injected into flattened items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Information {
    #[serde(rename = "contentfulId", default)]
    pub id: String,

    /// Empty for assets
    #[serde(rename = "contentfulContentType", default)]
    pub content_type: String,

    #[serde(rename = "contentfulRevision", default)]
    pub revision: i64,

    #[serde(
        rename = "contentfulCreatedAt",
        default,
        with = "time::serde::rfc3339::option"
    )]
    pub created_at: Option<OffsetDateTime>,

    #[serde(
        rename = "contentfulUpdatedAt",
        default,
        with = "time::serde::rfc3339::option"
    )]
    pub updated_at: Option<OffsetDateTime>,

    #[serde(rename = "contentfulLocale", default)]
    pub locale: String,
}

impl From<&ItemInfo> for Information {
    fn from(sys: &ItemInfo) -> Self {
        Information {
            id: sys.id.clone(),
            content_type: sys.content_type_id().to_string(),
            revision: sys.revision,
            created_at: sys.created_at,
            updated_at: sys.updated_at,
            locale: sys.locale.clone(),
        }
    }
}

/// A flattened asset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub file: File,

    #[serde(flatten)]
    pub information: Information,
}

/// The `file` field of an asset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    /// Protocol-relative, e.g. `//images.ctfassets.net/space/asset/hash/orange.png`
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub file_name: String,

    #[serde(default)]
    pub content_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<FileDetails>,
}

impl File {
    /// `url` with an `https:` scheme when it is protocol-relative
    pub fn absolute_url(&self) -> String {
        if self.url.starts_with("//") {
            format!("https:{}", self.url)
        } else {
            self.url.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileDetails {
    /// Size in bytes
    #[serde(default)]
    pub size: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageDetails>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDetails {
    pub width: u32,
    pub height: u32,
}
