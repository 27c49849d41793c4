//! The collection store.
//!
//! Owns the ordered collection list, the collapsed-state map and the current
//! selection. Every mutation updates memory synchronously and only then awaits
//! the write-through save, so no invariant is ever observable half-applied.
//!
//! URL uniqueness: adding a URL to a collection first drops every item with
//! that URL from all *other* collections. The newest placement wins.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use toby_domain::{
    validate_collection_name, validate_draft, validate_patch, Collection, Item, ItemDraft,
    ItemPatch, ValidationError,
};

use crate::config::TobyConfig;
use crate::error::Result;
use crate::export::export_json;
use crate::import::parse_import;
use crate::interaction::{Confirmation, Interaction};
use crate::outcome::{Outcome, SkipReason};
use crate::persistence::PersistenceGateway;
use crate::sync::{SyncChannel, SyncMessage};

/// Pointer to an item inside a collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    pub collection_id: String,
    pub item_id: String,
}

impl ItemRef {
    pub fn new(collection_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            collection_id: collection_id.into(),
            item_id: item_id.into(),
        }
    }
}

/// Direction of a one-step item reorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// A one-step reorder that passed its checks and is waiting to be committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReorder {
    pub collection_id: String,
    pub item_id: String,
    pub direction: Direction,
}

/// In-memory collections with write-through persistence
pub struct CollectionStore<G> {
    gateway: G,
    channel: Box<dyn SyncChannel>,
    interaction: Box<dyn Interaction>,
    config: TobyConfig,
    collections: Vec<Collection>,
    collapsed: BTreeMap<String, bool>,
    selected: Option<ItemRef>,
    /// Keys whose last save failed
    unsynced: BTreeSet<String>,
}

fn reject(errors: Vec<ValidationError>) -> Result<()> {
    match errors.into_iter().next() {
        Some(first) => Err(first.into()),
        None => Ok(()),
    }
}

impl<G: PersistenceGateway> CollectionStore<G> {
    /// Create an empty store without touching persistence
    pub fn new(
        gateway: G,
        channel: impl SyncChannel + 'static,
        interaction: impl Interaction + 'static,
        config: TobyConfig,
    ) -> Self {
        Self {
            gateway,
            channel: Box::new(channel),
            interaction: Box::new(interaction),
            config,
            collections: Vec::new(),
            collapsed: BTreeMap::new(),
            selected: None,
            unsynced: BTreeSet::new(),
        }
    }

    /// Create a store and load its persisted state.
    ///
    /// A key that fails to load is logged and treated as empty.
    pub async fn open(
        gateway: G,
        channel: impl SyncChannel + 'static,
        interaction: impl Interaction + 'static,
        config: TobyConfig,
    ) -> Self {
        let mut store = Self::new(gateway, channel, interaction, config);
        if let Err(e) = store.reload_collections().await {
            error!("Error loading collections: {}", e);
        }
        if let Err(e) = store.reload_collapsed().await {
            error!("Error loading collapsed state: {}", e);
        }
        store
    }

    // ==================== Accessors ====================

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn collection(&self, collection_id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == collection_id)
    }

    fn collection_mut(&mut self, collection_id: &str) -> Option<&mut Collection> {
        self.collections.iter_mut().find(|c| c.id == collection_id)
    }

    pub fn collection_ids(&self) -> Vec<String> {
        self.collections.iter().map(|c| c.id.clone()).collect()
    }

    /// The collection and item currently holding `url`, if any
    pub fn find_item_by_url(&self, url: &str) -> Option<(&Collection, &Item)> {
        self.collections
            .iter()
            .find_map(|c| c.items.iter().find(|i| i.url == url).map(|i| (c, i)))
    }

    pub fn config(&self) -> &TobyConfig {
        &self.config
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// True while some write-through save has failed and not been retried
    pub fn is_unsynced(&self) -> bool {
        !self.unsynced.is_empty()
    }

    // ==================== Collections ====================

    /// Create an empty collection at the top of the list
    pub async fn create_collection(&mut self, name: &str) -> Result<Collection> {
        let name = name.trim();
        validate_collection_name(name)?;

        let collection = Collection::new(name);
        self.collections.insert(0, collection.clone());
        debug!("Created collection {} ({})", collection.name, collection.id);

        self.persist_collections().await;
        Ok(collection)
    }

    /// Delete a collection after confirmation.
    ///
    /// A non-empty collection needs a second confirmation naming its item count.
    pub async fn delete_collection(&mut self, collection_id: &str) -> Result<Outcome> {
        let Some(collection) = self.collection(collection_id) else {
            warn!("Cannot delete collection {}: not found", collection_id);
            return Ok(Outcome::Skipped(SkipReason::CollectionNotFound));
        };

        if !self.interaction.confirm(&Confirmation::DeleteCollection {
            name: &collection.name,
        }) {
            return Ok(Outcome::Skipped(SkipReason::Declined));
        }

        if !collection.is_empty()
            && !self
                .interaction
                .confirm(&Confirmation::DeleteNonEmptyCollection {
                    name: &collection.name,
                    item_count: collection.len(),
                })
        {
            return Ok(Outcome::Skipped(SkipReason::Declined));
        }

        self.collections.retain(|c| c.id != collection_id);
        self.prune_selection();
        info!("Deleted collection {}", collection_id);

        self.persist_collections().await;
        Ok(Outcome::Applied(()))
    }

    pub async fn rename_collection(&mut self, collection_id: &str, new_name: &str) -> Result<Outcome> {
        let new_name = new_name.trim();
        validate_collection_name(new_name)?;

        let Some(collection) = self.collection_mut(collection_id) else {
            warn!("Cannot rename collection {}: not found", collection_id);
            return Ok(Outcome::Skipped(SkipReason::CollectionNotFound));
        };
        if collection.name == new_name {
            return Ok(Outcome::Skipped(SkipReason::Unchanged));
        }
        collection.name = new_name.to_string();

        self.persist_collections().await;
        Ok(Outcome::Applied(()))
    }

    /// Replace the collection order with a permutation of the current ids
    pub async fn reorder_collections<S: AsRef<str>>(&mut self, ordered_ids: &[S]) -> Outcome {
        let outcome = self.preview_collection_order(ordered_ids);
        if outcome.is_applied() {
            self.persist_collections().await;
        }
        outcome
    }

    /// Reorder in memory only, as a drag in progress does.
    ///
    /// Rejects anything that is not exactly a permutation of the current ids.
    pub fn preview_collection_order<S: AsRef<str>>(&mut self, ordered_ids: &[S]) -> Outcome {
        if ordered_ids.len() != self.collections.len() {
            warn!(
                "Rejected collection order: {} ids for {} collections",
                ordered_ids.len(),
                self.collections.len()
            );
            return Outcome::Skipped(SkipReason::OrderMismatch);
        }

        let requested: HashSet<&str> = ordered_ids.iter().map(AsRef::as_ref).collect();
        if requested.len() != ordered_ids.len()
            || self
                .collections
                .iter()
                .any(|c| !requested.contains(c.id.as_str()))
        {
            warn!("Rejected collection order: ids do not match the current set");
            return Outcome::Skipped(SkipReason::OrderMismatch);
        }

        let mut by_id: HashMap<String, Collection> = self
            .collections
            .drain(..)
            .map(|c| (c.id.clone(), c))
            .collect();
        self.collections = ordered_ids
            .iter()
            .filter_map(|id| by_id.remove(id.as_ref()))
            .collect();

        Outcome::Applied(())
    }

    // ==================== Items ====================

    /// Add an item in memory without saving.
    ///
    /// With `check_duplicates`, a URL already present in the target collection
    /// makes this a no-op. Copies of the URL in other collections are always
    /// removed first.
    pub fn insert_item(
        &mut self,
        collection_id: &str,
        draft: ItemDraft,
        check_duplicates: bool,
    ) -> Result<Outcome<Item>> {
        let draft = ItemDraft {
            title: draft.title.trim().to_string(),
            url: draft.url.trim().to_string(),
            ..draft
        };
        reject(validate_draft(&draft))?;
        Ok(self.place_item(collection_id, draft, check_duplicates))
    }

    /// Insertion without field validation. Moves go through here so records
    /// loaded from storage keep their fields as stored.
    fn place_item(
        &mut self,
        collection_id: &str,
        draft: ItemDraft,
        check_duplicates: bool,
    ) -> Outcome<Item> {
        let Some(target) = self.collection(collection_id) else {
            warn!("Cannot add item to collection {}: not found", collection_id);
            return Outcome::Skipped(SkipReason::CollectionNotFound);
        };

        if check_duplicates && target.contains_url(&draft.url) {
            info!("{} is already in collection {}", draft.url, target.name);
            return Outcome::Skipped(SkipReason::DuplicateInCollection);
        }

        let removed = self.remove_url_elsewhere(&draft.url, collection_id);
        if removed > 0 {
            debug!("Moved {} out of {} other location(s)", draft.url, removed);
        }

        let item = Item::from_draft(draft);
        if let Some(target) = self.collection_mut(collection_id) {
            target.items.push(item.clone());
        }
        Outcome::Applied(item)
    }

    /// Add an item and save
    pub async fn add_item(
        &mut self,
        collection_id: &str,
        draft: ItemDraft,
        check_duplicates: bool,
    ) -> Result<Outcome<Item>> {
        let outcome = self.insert_item(collection_id, draft, check_duplicates)?;
        if outcome.is_applied() {
            self.persist_collections().await;
        }
        Ok(outcome)
    }

    /// Remove an item after confirmation
    pub async fn remove_item(&mut self, collection_id: &str, item_id: &str) -> Result<Outcome> {
        let Some(collection) = self.collection(collection_id) else {
            warn!("Cannot remove item from collection {}: not found", collection_id);
            return Ok(Outcome::Skipped(SkipReason::CollectionNotFound));
        };
        let Some(item) = collection.item(item_id) else {
            warn!("Cannot remove item {}: not in {}", item_id, collection_id);
            return Ok(Outcome::Skipped(SkipReason::ItemNotFound));
        };

        if !self.interaction.confirm(&Confirmation::RemoveItem {
            title: &item.title,
            collection: &collection.name,
        }) {
            return Ok(Outcome::Skipped(SkipReason::Declined));
        }

        self.discard_item(collection_id, item_id);
        self.persist_collections().await;
        Ok(Outcome::Applied(()))
    }

    /// Merge `patch` into an item.
    ///
    /// A changed URL takes the URL away from every other collection, as an add
    /// would. A URL another item in the same collection already has is refused.
    pub async fn update_item(
        &mut self,
        collection_id: &str,
        item_id: &str,
        patch: ItemPatch,
    ) -> Result<Outcome<Item>> {
        let patch = ItemPatch {
            title: patch.title.map(|t| t.trim().to_string()),
            url: patch.url.map(|u| u.trim().to_string()),
            ..patch
        };
        reject(validate_patch(&patch))?;

        let Some(collection) = self.collection_mut(collection_id) else {
            warn!("Cannot update item in collection {}: not found", collection_id);
            return Ok(Outcome::Skipped(SkipReason::CollectionNotFound));
        };
        if let Some(url) = patch.url.as_deref() {
            if collection.items.iter().any(|i| i.id != item_id && i.url == url) {
                info!("{} is already in collection {}", url, collection.name);
                return Ok(Outcome::Skipped(SkipReason::DuplicateInCollection));
            }
        }
        let Some(item) = collection.item_mut(item_id) else {
            warn!("Cannot update item {}: not in {}", item_id, collection_id);
            return Ok(Outcome::Skipped(SkipReason::ItemNotFound));
        };
        if patch.is_empty() {
            return Ok(Outcome::Skipped(SkipReason::Unchanged));
        }

        let old_url = item.url.clone();
        if !item.apply_patch(patch) {
            return Ok(Outcome::Skipped(SkipReason::Unchanged));
        }
        let updated = item.clone();

        if updated.url != old_url {
            self.remove_url_elsewhere(&updated.url, collection_id);
        }

        self.persist_collections().await;
        Ok(Outcome::Applied(updated))
    }

    /// Transfer an item to another collection without asking for confirmation.
    ///
    /// The item is re-added to the target with a fresh id, then dropped from
    /// the source. A selection on the old item follows it.
    pub async fn move_item(
        &mut self,
        item_id: &str,
        from_collection_id: &str,
        to_collection_id: &str,
    ) -> Result<Outcome<Item>> {
        if from_collection_id == to_collection_id {
            return Ok(Outcome::Skipped(SkipReason::SameCollection));
        }

        let Some(source) = self.collection(from_collection_id) else {
            warn!("Cannot move from collection {}: not found", from_collection_id);
            return Ok(Outcome::Skipped(SkipReason::CollectionNotFound));
        };
        let Some(item) = source.item(item_id) else {
            warn!("Cannot move item {}: not in {}", item_id, from_collection_id);
            return Ok(Outcome::Skipped(SkipReason::ItemNotFound));
        };
        let draft = item.to_draft();

        let Some(target_name) = self.collection(to_collection_id).map(|c| c.name.clone()) else {
            warn!("Cannot move to collection {}: not found", to_collection_id);
            return Ok(Outcome::Skipped(SkipReason::CollectionNotFound));
        };

        let was_selected = self.selected == Some(ItemRef::new(from_collection_id, item_id));

        let moved = match self.place_item(to_collection_id, draft.clone(), true) {
            Outcome::Applied(item) => item,
            Outcome::Skipped(SkipReason::DuplicateInCollection) => {
                match self
                    .collection(to_collection_id)
                    .and_then(|c| c.items.iter().find(|i| i.url == draft.url))
                    .cloned()
                {
                    Some(existing) => existing,
                    None => return Ok(Outcome::Skipped(SkipReason::DuplicateInCollection)),
                }
            }
            Outcome::Skipped(reason) => return Ok(Outcome::Skipped(reason)),
        };

        // usually already gone through URL dedup; not when the target had the URL
        self.discard_item(from_collection_id, item_id);
        if was_selected {
            self.selected = Some(ItemRef::new(to_collection_id, moved.id.clone()));
        }

        self.interaction
            .notify(&format!("Moved \"{}\" to {}", moved.title, target_name));
        self.persist_collections().await;
        Ok(Outcome::Applied(moved))
    }

    /// Swap an item with its neighbour; a no-op at either end
    pub async fn reorder_item(
        &mut self,
        collection_id: &str,
        item_id: &str,
        direction: Direction,
    ) -> Outcome {
        let pending = PendingReorder {
            collection_id: collection_id.to_string(),
            item_id: item_id.to_string(),
            direction,
        };
        self.commit_reorder(&pending).await
    }

    /// Check that a swap is possible without performing it.
    ///
    /// Used to start the move animation; the swap itself happens in
    /// [`commit_reorder`](Self::commit_reorder).
    pub fn plan_reorder(
        &self,
        collection_id: &str,
        item_id: &str,
        direction: Direction,
    ) -> std::result::Result<PendingReorder, SkipReason> {
        self.neighbor_index(collection_id, item_id, direction)?;
        Ok(PendingReorder {
            collection_id: collection_id.to_string(),
            item_id: item_id.to_string(),
            direction,
        })
    }

    /// Perform a planned swap against the current state and save.
    ///
    /// The item is looked up again, so a plan made stale by later edits is
    /// skipped instead of swapping the wrong pair.
    pub async fn commit_reorder(&mut self, pending: &PendingReorder) -> Outcome {
        let (index, neighbor) =
            match self.neighbor_index(&pending.collection_id, &pending.item_id, pending.direction) {
                Ok(pair) => pair,
                Err(reason) => return Outcome::Skipped(reason),
            };

        if let Some(collection) = self.collection_mut(&pending.collection_id) {
            collection.items.swap(index, neighbor);
        }
        self.persist_collections().await;
        Outcome::Applied(())
    }

    /// Plan, wait for the move animation, then commit
    pub async fn reorder_item_animated(
        &mut self,
        collection_id: &str,
        item_id: &str,
        direction: Direction,
    ) -> Outcome {
        let pending = match self.plan_reorder(collection_id, item_id, direction) {
            Ok(pending) => pending,
            Err(reason) => return Outcome::Skipped(reason),
        };
        tokio::time::sleep(Duration::from_millis(self.config.reorder.animation_ms)).await;
        self.commit_reorder(&pending).await
    }

    /// Keyboard reorder of the selected item
    pub async fn reorder_selected(&mut self, direction: Direction) -> Outcome {
        let Some(selected) = self.selected.clone() else {
            return Outcome::Skipped(SkipReason::NoSelection);
        };
        self.reorder_item_animated(&selected.collection_id, &selected.item_id, direction)
            .await
    }

    fn neighbor_index(
        &self,
        collection_id: &str,
        item_id: &str,
        direction: Direction,
    ) -> std::result::Result<(usize, usize), SkipReason> {
        let collection = self
            .collection(collection_id)
            .ok_or(SkipReason::CollectionNotFound)?;
        let index = collection
            .position_of(item_id)
            .ok_or(SkipReason::ItemNotFound)?;
        let neighbor = match direction {
            Direction::Previous => index.checked_sub(1),
            Direction::Next => Some(index + 1).filter(|&n| n < collection.len()),
        };
        neighbor
            .map(|n| (index, n))
            .ok_or(SkipReason::AtBoundary)
    }

    fn remove_url_elsewhere(&mut self, url: &str, keep_collection_id: &str) -> usize {
        let removed: usize = self
            .collections
            .iter_mut()
            .filter(|c| c.id != keep_collection_id)
            .map(|c| c.remove_url(url))
            .sum();
        if removed > 0 {
            self.prune_selection();
        }
        removed
    }

    fn discard_item(&mut self, collection_id: &str, item_id: &str) -> Option<Item> {
        let item = self.collection_mut(collection_id)?.remove_item(item_id)?;
        self.prune_selection();
        Some(item)
    }

    // ==================== Selection ====================

    pub fn selected_item(&self) -> Option<&ItemRef> {
        self.selected.as_ref()
    }

    pub fn selected_entry(&self) -> Option<(&Collection, &Item)> {
        let selected = self.selected.as_ref()?;
        let collection = self.collection(&selected.collection_id)?;
        let item = collection.item(&selected.item_id)?;
        Some((collection, item))
    }

    /// Select an item; the pair must exist
    pub fn select_item(&mut self, collection_id: &str, item_id: &str) -> Outcome {
        let Some(collection) = self.collection(collection_id) else {
            return Outcome::Skipped(SkipReason::CollectionNotFound);
        };
        if collection.item(item_id).is_none() {
            return Outcome::Skipped(SkipReason::ItemNotFound);
        }
        self.selected = Some(ItemRef::new(collection_id, item_id));
        Outcome::Applied(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    fn contains(&self, item_ref: &ItemRef) -> bool {
        self.collection(&item_ref.collection_id)
            .is_some_and(|c| c.item(&item_ref.item_id).is_some())
    }

    fn prune_selection(&mut self) {
        if let Some(selected) = &self.selected {
            if !self.contains(selected) {
                debug!("Clearing selection of removed item {}", selected.item_id);
                self.selected = None;
            }
        }
    }

    // ==================== Collapse state ====================

    pub fn is_collapsed(&self, collection_id: &str) -> bool {
        self.collapsed.get(collection_id).copied().unwrap_or(false)
    }

    pub fn collapsed_collections(&self) -> &BTreeMap<String, bool> {
        &self.collapsed
    }

    /// Flip a collapse flag, save it and tell the other instances.
    ///
    /// Returns the new value.
    pub async fn toggle_collapsed(&mut self, collection_id: &str) -> bool {
        let flag = self.collapsed.entry(collection_id.to_string()).or_insert(false);
        *flag = !*flag;
        let collapsed = *flag;

        self.persist_collapsed().await;

        let message = SyncMessage::CollapsedStateUpdated {
            collapsed_collections: self.collapsed.clone(),
        };
        if let Err(e) = self.channel.broadcast(&message) {
            warn!("Failed to broadcast collapsed state: {}", e);
        }
        collapsed
    }

    /// Handle a message from another instance. The local map is replaced as-is.
    pub fn apply_sync_message(&mut self, message: SyncMessage) {
        match message {
            SyncMessage::CollapsedStateUpdated {
                collapsed_collections,
            } => {
                debug!(
                    "Replacing collapsed state ({} entries) from another instance",
                    collapsed_collections.len()
                );
                self.collapsed = collapsed_collections;
            }
        }
    }

    // ==================== Persistence ====================

    /// Re-read the collection list. A missing key means no collections.
    pub async fn reload_collections(&mut self) -> Result<()> {
        let key = self.config.storage.collections_key.clone();
        self.collections = match self.gateway.load(&key).await? {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_json::from_value(value)?,
        };
        self.prune_selection();
        Ok(())
    }

    /// Re-read the collapsed map. A missing key means nothing is collapsed.
    pub async fn reload_collapsed(&mut self) -> Result<()> {
        let key = self.config.storage.collapsed_key.clone();
        self.collapsed = match self.gateway.load(&key).await? {
            None | Some(Value::Null) => BTreeMap::new(),
            Some(value) => serde_json::from_value(value)?,
        };
        Ok(())
    }

    async fn persist_collections(&mut self) {
        let key = self.config.storage.collections_key.clone();
        let value = serde_json::to_value(&self.collections);
        self.persist(key, value).await;
    }

    async fn persist_collapsed(&mut self) {
        let key = self.config.storage.collapsed_key.clone();
        let value = serde_json::to_value(&self.collapsed);
        self.persist(key, value).await;
    }

    /// Save one key. Failures are logged and leave memory ahead of storage.
    async fn persist(&mut self, key: String, value: serde_json::Result<Value>) {
        let result = match value {
            Ok(value) => self.gateway.save(&key, value).await,
            Err(e) => Err(e.into()),
        };
        match result {
            Ok(()) => {
                self.unsynced.remove(&key);
            }
            Err(e) => {
                error!("Error saving {}: {}", key, e);
                self.unsynced.insert(key);
            }
        }
    }

    // ==================== Import / export ====================

    /// Copy of the collection list as it would be exported
    pub fn export_all(&self) -> Vec<Collection> {
        self.collections.clone()
    }

    pub fn export_json(&self) -> Result<String> {
        export_json(&self.collections)
    }

    /// Merge an import payload, returning how many collections were added.
    ///
    /// Collections whose id already exists are dropped. The remaining count is
    /// confirmed with the user before anything is appended.
    pub async fn import_merge(&mut self, raw: &str) -> Result<Outcome<usize>> {
        let incoming = parse_import(raw, &self.config.favicon)?;
        let total = incoming.len();

        let mut known: HashSet<String> = self.collections.iter().map(|c| c.id.clone()).collect();
        let fresh: Vec<Collection> = incoming
            .into_iter()
            .filter(|c| known.insert(c.id.clone()))
            .collect();

        if fresh.is_empty() {
            info!("Nothing to import: all {} collection(s) already present", total);
            return Ok(Outcome::Applied(0));
        }

        let count = fresh.len();
        if !self.interaction.confirm(&Confirmation::Import { count }) {
            return Ok(Outcome::Skipped(SkipReason::Declined));
        }

        self.collections.extend(fresh);
        info!(
            "Imported {} collection(s), skipped {} already present",
            count,
            total - count
        );

        self.persist_collections().await;
        Ok(Outcome::Applied(count))
    }
}
