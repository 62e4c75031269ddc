//! Link lookup against the include table

use crate::error::{Error, Result};
use crate::flatten::types::{IncludeTable, Item, Link, LinkKind};

impl IncludeTable {
    /// The include sequence holding items of `kind`
    pub fn items(&self, kind: LinkKind) -> &[Item] {
        match kind {
            LinkKind::Entry => &self.entries,
            LinkKind::Asset => &self.assets,
        }
    }

    pub fn contains(&self, link: &Link) -> bool {
        self.items(link.kind).iter().any(|item| item.matches(link))
    }

    /// Find the first included item targeted by `link`
    pub fn find(&self, link: &Link) -> Result<&Item> {
        let candidates = self.items(link.kind);
        candidates
            .iter()
            .find(|item| item.matches(link))
            .ok_or_else(|| Error::DanglingReference {
                kind: link.kind,
                id: link.id.clone(),
                searched: candidates.iter().map(|item| item.sys.id.clone()).collect(),
            })
    }

    /// Append top-level entries so that siblings can reference each other.
    ///
    /// The API does not repeat primary results under `includes`. Assets are
    /// never injected, and an entry already present under the same id is
    /// skipped.
    pub fn inject_entries(&mut self, items: &[Item]) {
        for item in items {
            if item.sys.kind() != Some(LinkKind::Entry) {
                continue;
            }

            let link = Link::entry(item.sys.id.clone());
            if !self.contains(&link) {
                self.entries.push(item.clone());
            }
        }
    }
}
