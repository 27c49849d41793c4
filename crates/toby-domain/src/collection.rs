//! Collection representation for grouping saved links

use serde::{Deserialize, Serialize};

use crate::ids::new_id;
use crate::item::Item;

/// A named, ordered group of saved links
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Collection {
    /// Create a new empty collection with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            items: Vec::new(),
        }
    }

    /// Create a collection with a caller-supplied id (fixtures, imports)
    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }

    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }

    pub fn position_of(&self, item_id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id == item_id)
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.items.iter().any(|i| i.url == url)
    }

    /// Remove and return the item with the given id
    pub fn remove_item(&mut self, item_id: &str) -> Option<Item> {
        let index = self.position_of(item_id)?;
        Some(self.items.remove(index))
    }

    /// Remove every item whose URL matches, returning how many were dropped
    pub fn remove_url(&mut self, url: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|i| i.url != url);
        before - self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemDraft;

    fn link(title: &str, url: &str) -> Item {
        Item::from_draft(ItemDraft::new(title, url))
    }

    #[test]
    fn test_collection_new() {
        let col = Collection::new("Reading List");
        assert_eq!(col.name, "Reading List");
        assert!(col.is_empty());
        assert!(!col.id.is_empty());
    }

    #[test]
    fn test_remove_item() {
        let a = link("A", "https://a.example");
        let b = link("B", "https://b.example");
        let mut col = Collection::new("Work").with_items(vec![a.clone(), b.clone()]);

        assert_eq!(col.remove_item(&a.id), Some(a));
        assert_eq!(col.len(), 1);
        assert!(col.remove_item("missing").is_none());
        assert_eq!(col.items[0].id, b.id);
    }

    #[test]
    fn test_remove_url() {
        let mut col = Collection::new("Work").with_items(vec![
            link("A", "https://a.example"),
            link("B", "https://b.example"),
        ]);
        assert_eq!(col.remove_url("https://a.example"), 1);
        assert!(!col.contains_url("https://a.example"));
        assert_eq!(col.remove_url("https://a.example"), 0);
    }

    #[test]
    fn test_items_default_when_missing() {
        let col: Collection = serde_json::from_str(r#"{"id":"c1","name":"Bare"}"#).unwrap();
        assert!(col.items.is_empty());
    }
}
