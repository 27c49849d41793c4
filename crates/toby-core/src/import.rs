//! Import payload detection and translation.
//!
//! Two shapes are accepted:
//! - the export format: a JSON array of collections (`id`, `name`, `items`)
//! - the legacy envelope `{ version, lists: [{ title, cards: [...] }] }`,
//!   where every list and card gets a fresh id
//!
//! Items without a favicon get one derived from their URL's host.
//! Every imported collection needs a name. Legacy cards without a URL are
//! dropped, and an untitled card is titled by its URL.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use toby_domain::{new_id, Collection, Item};

use crate::config::FaviconConfig;
use crate::error::ImportError;
use crate::favicon::favicon_for_url;

/// Detected import payload shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportShape {
    /// Array of collection records, ids preserved
    Collections,
    /// `{ version, lists }` envelope, ids minted on import
    Lists,
}

#[derive(Debug, Deserialize)]
struct ListsEnvelope {
    lists: Vec<LegacyList>,
}

#[derive(Debug, Deserialize)]
struct LegacyList {
    #[serde(default)]
    title: String,
    #[serde(default)]
    cards: Vec<LegacyCard>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyCard {
    #[serde(default)]
    title: String,
    #[serde(default)]
    custom_title: Option<String>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    custom_description: Option<String>,
}

/// Work out which shape a parsed payload has, if any
pub fn detect_shape(value: &Value) -> Option<ImportShape> {
    match value {
        Value::Array(_) => Some(ImportShape::Collections),
        Value::Object(map) if matches!(map.get("lists"), Some(Value::Array(_))) => {
            Some(ImportShape::Lists)
        }
        _ => None,
    }
}

/// Parse and translate a raw import payload into collections
pub fn parse_import(raw: &str, favicon: &FaviconConfig) -> Result<Vec<Collection>, ImportError> {
    if raw.trim().is_empty() {
        return Err(ImportError::EmptyInput);
    }

    let value: Value = serde_json::from_str(raw).map_err(|e| ImportError::Parse {
        message: e.to_string(),
    })?;

    let mut collections = match detect_shape(&value) {
        Some(ImportShape::Collections) => {
            serde_json::from_value::<Vec<Collection>>(value).map_err(|e| {
                ImportError::InvalidFormat {
                    message: format!("collection records: {}", e),
                }
            })?
        }
        Some(ImportShape::Lists) => {
            let envelope: ListsEnvelope =
                serde_json::from_value(value).map_err(|e| ImportError::InvalidFormat {
                    message: format!("lists envelope: {}", e),
                })?;
            envelope
                .lists
                .into_iter()
                .enumerate()
                .map(|(index, list)| translate_list(index, list))
                .collect::<Result<Vec<_>, _>>()?
        }
        None => {
            return Err(ImportError::InvalidFormat {
                message: "expected an array of collections or an object with a `lists` array"
                    .to_string(),
            })
        }
    };

    if let Some(index) = collections.iter().position(|c| c.name.trim().is_empty()) {
        return Err(ImportError::InvalidFormat {
            message: format!("collection {} has no name", index),
        });
    }

    for collection in &mut collections {
        fill_favicons(collection, favicon);
    }

    Ok(collections)
}

fn translate_list(index: usize, list: LegacyList) -> Result<Collection, ImportError> {
    let name = list.title.trim();
    if name.is_empty() {
        return Err(ImportError::InvalidFormat {
            message: format!("list {} has no title", index),
        });
    }
    let items = list.cards.into_iter().filter_map(translate_card).collect();
    Ok(Collection::with_id(new_id(), name).with_items(items))
}

fn translate_card(card: LegacyCard) -> Option<Item> {
    let url = card.url.trim().to_string();
    if url.is_empty() {
        debug!("Skipping card {:?}: no URL", card.title);
        return None;
    }

    let title = [card.custom_title.as_deref(), Some(card.title.as_str())]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .unwrap_or(url.as_str())
        .to_string();

    Some(Item {
        id: new_id(),
        title,
        url,
        favicon: None,
        description: card.custom_description.filter(|d| !d.is_empty()),
    })
}

fn fill_favicons(collection: &mut Collection, config: &FaviconConfig) {
    for item in &mut collection.items {
        if item.favicon.is_none() && !item.url.is_empty() {
            item.favicon = Some(favicon_for_url(&item.url, config));
        }
    }
}
