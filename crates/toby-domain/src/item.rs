//! Saved link representation

use serde::{Deserialize, Serialize};

use crate::ids::new_id;

/// A saved link. Owned by exactly one collection at a time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Everything needed to create an item except its id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update for an existing item. `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub favicon: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Item {
    /// Create an item from a draft, minting a fresh id
    pub fn from_draft(draft: ItemDraft) -> Self {
        Self {
            id: new_id(),
            title: draft.title,
            url: draft.url,
            favicon: draft.favicon,
            description: draft.description,
        }
    }

    /// The item's data without its id, as used when re-adding it elsewhere
    pub fn to_draft(&self) -> ItemDraft {
        ItemDraft {
            title: self.title.clone(),
            url: self.url.clone(),
            favicon: self.favicon.clone(),
            description: self.description.clone(),
        }
    }

    /// Merge the set fields of `patch` into this item.
    ///
    /// Returns true if any field actually changed.
    pub fn apply_patch(&mut self, patch: ItemPatch) -> bool {
        let mut changed = false;
        if let Some(title) = patch.title {
            changed |= self.title != title;
            self.title = title;
        }
        if let Some(url) = patch.url {
            changed |= self.url != url;
            self.url = url;
        }
        if let Some(favicon) = patch.favicon {
            changed |= self.favicon.as_deref() != Some(favicon.as_str());
            self.favicon = Some(favicon);
        }
        if let Some(description) = patch.description {
            changed |= self.description.as_deref() != Some(description.as_str());
            self.description = Some(description);
        }
        changed
    }
}

impl ItemDraft {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            favicon: None,
            description: None,
        }
    }

    pub fn with_favicon(mut self, favicon: impl Into<String>) -> Self {
        self.favicon = Some(favicon.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.url.is_none()
            && self.favicon.is_none()
            && self.description.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_draft_mints_id() {
        let a = Item::from_draft(ItemDraft::new("Rust", "https://rust-lang.org"));
        let b = Item::from_draft(ItemDraft::new("Rust", "https://rust-lang.org"));
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        assert_eq!(a.title, "Rust");
    }

    #[test]
    fn test_to_draft_drops_id() {
        let item = Item::from_draft(
            ItemDraft::new("Docs", "https://docs.rs").with_favicon("https://docs.rs/favicon.ico"),
        );
        let draft = item.to_draft();
        assert_eq!(draft.url, "https://docs.rs");
        assert_eq!(draft.favicon.as_deref(), Some("https://docs.rs/favicon.ico"));
    }

    #[test]
    fn test_apply_patch() {
        let mut item = Item::from_draft(ItemDraft::new("Old", "https://example.com"));
        let id = item.id.clone();
        let changed = item.apply_patch(ItemPatch {
            title: Some("New".to_string()),
            description: Some("notes".to_string()),
            ..Default::default()
        });
        assert!(changed);
        assert_eq!(item.id, id);
        assert_eq!(item.title, "New");
        assert_eq!(item.url, "https://example.com");
        assert_eq!(item.description.as_deref(), Some("notes"));

        assert!(!item.apply_patch(ItemPatch {
            title: Some("New".to_string()),
            ..Default::default()
        }));
    }

    #[test]
    fn test_optional_fields_omitted_from_json() {
        let item = Item {
            id: "i1".to_string(),
            title: "T".to_string(),
            url: "https://t.example".to_string(),
            favicon: None,
            description: None,
        };
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"id":"i1","title":"T","url":"https://t.example"}"#);
    }
}
