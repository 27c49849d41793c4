//! Domain types for toby
//!
//! This crate provides the data model shared by the store, the search view and
//! the command-line front end:
//! - Item: a single saved link (title, URL, favicon, description)
//! - Collection: a named, ordered group of items
//! - ItemDraft / ItemPatch: inputs for creating and editing items
//! - Validation of user-entered names, titles and URLs

pub mod collection;
pub mod ids;
pub mod item;
pub mod validation;

pub use collection::*;
pub use ids::*;
pub use item::*;
pub use validation::*;
