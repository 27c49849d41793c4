//! toby-core: the collection store behind the toby new-tab page.
//!
//! This library provides:
//! - The collection store: CRUD, cross-collection URL dedup, reordering,
//!   collapse state and selection
//! - Write-through persistence over an async key-value gateway, plus a
//!   broadcast channel for keeping several open pages in step
//! - Import (export format and the legacy `lists`/`cards` envelope) and export
//! - A flattened search view ranked by the fuzzy matcher
//! - Drag coordination: transfer payloads, insertion points and auto-scroll
//!
//! Rendering, the browser tab inventory and theme state live outside this crate.

pub mod config;
pub mod drag;
pub mod error;
pub mod export;
pub mod favicon;
pub mod import;
pub mod interaction;
pub mod outcome;
pub mod persistence;
pub mod search;
pub mod store;
pub mod sync;

pub use config::{ConfigError, DragConfig, FaviconConfig, SearchConfig, TobyConfig};
pub use drag::{DragCoordinator, DragPayload, DragSession, DropResult, InsertionPoint, SlotGeometry};
pub use error::{ImportError, PersistenceError, Result, StoreError};
pub use interaction::{AutoConfirm, Confirmation, Interaction, RecordingInteraction};
pub use outcome::{Outcome, SkipReason};
pub use persistence::{JsonFileGateway, MemoryGateway, PersistenceGateway};
pub use search::{DoubleTapDetector, SearchEntry, SearchIndex, SearchSession};
pub use store::{CollectionStore, Direction, ItemRef, PendingReorder};
pub use sync::{LocalBus, NullChannel, SyncChannel, SyncMessage};

pub use toby_domain::{Collection, Item, ItemDraft, ItemPatch, ValidationError};
