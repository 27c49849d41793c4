//! Drag and drop between the tab list and collections.
//!
//! A drag carries a [`DragPayload`] serialized to JSON in the transfer data.
//! While a collection is being dragged the store order is previewed live;
//! it is only persisted when the drag ends.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use toby_domain::{Item, ItemDraft};

use crate::config::DragConfig;
use crate::error::Result;
use crate::outcome::{Outcome, SkipReason};
use crate::persistence::PersistenceGateway;
use crate::store::CollectionStore;

/// What is being dragged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DragPayload {
    /// An open browser tab; dropping always adds
    Tab {
        title: String,
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        favicon: Option<String>,
    },
    /// A saved item; dropping elsewhere moves it
    #[serde(rename_all = "camelCase")]
    Item {
        collection_id: String,
        item_id: String,
        title: String,
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        favicon: Option<String>,
    },
    /// A whole collection being reordered
    #[serde(rename_all = "camelCase")]
    Collection { collection_id: String },
}

impl DragPayload {
    pub fn from_item(collection_id: &str, item: &Item) -> Self {
        DragPayload::Item {
            collection_id: collection_id.to_string(),
            item_id: item.id.clone(),
            title: item.title.clone(),
            url: item.url.clone(),
            favicon: item.favicon.clone(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Id of the collection being dragged, for collection payloads
    pub fn dragged_collection(&self) -> Option<&str> {
        match self {
            DragPayload::Collection { collection_id } => Some(collection_id.as_str()),
            _ => None,
        }
    }
}

/// Vertical extent of one collection element
#[derive(Debug, Clone, PartialEq)]
pub struct SlotGeometry {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

impl SlotGeometry {
    pub fn new(id: impl Into<String>, top: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            top,
            height,
        }
    }

    pub fn center(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Where a dragged collection would land
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertionPoint {
    Before(String),
    End,
}

/// The slot whose center is the nearest one below the pointer.
///
/// The dragged element itself is ignored. Past the last center the drop goes
/// to the end.
pub fn insertion_point(
    slots: &[SlotGeometry],
    pointer_y: f64,
    dragged_id: Option<&str>,
) -> InsertionPoint {
    slots
        .iter()
        .filter(|slot| Some(slot.id.as_str()) != dragged_id)
        .map(|slot| (pointer_y - slot.center(), slot))
        .filter(|(offset, _)| *offset < 0.0)
        .max_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, slot)| InsertionPoint::Before(slot.id.clone()))
        .unwrap_or(InsertionPoint::End)
}

/// `order` with `dragged_id` moved to `point`
pub fn order_with_insertion(order: &[String], dragged_id: &str, point: &InsertionPoint) -> Vec<String> {
    let mut reordered: Vec<String> = order.iter().filter(|id| *id != dragged_id).cloned().collect();
    let index = match point {
        InsertionPoint::Before(target) => reordered
            .iter()
            .position(|id| id == target)
            .unwrap_or(reordered.len()),
        InsertionPoint::End => reordered.len(),
    };
    reordered.insert(index, dragged_id.to_string());
    reordered
}

/// Auto-scroll speed for a pointer near the viewport edges.
///
/// Negative scrolls up, positive down, zero outside both edge zones. Speed
/// grows linearly from `min_scroll_speed` at the zone boundary to
/// `max_scroll_speed` at the edge.
pub fn auto_scroll_velocity(pointer_y: f64, viewport_height: f64, config: &DragConfig) -> f64 {
    let threshold = config.edge_threshold_px;
    if threshold <= 0.0 {
        return 0.0;
    }

    let speed_at = |distance: f64| {
        let closeness = 1.0 - (distance.max(0.0) / threshold).min(1.0);
        config.min_scroll_speed + (config.max_scroll_speed - config.min_scroll_speed) * closeness
    };

    if pointer_y < threshold {
        -speed_at(pointer_y)
    } else if pointer_y > viewport_height - threshold {
        speed_at(viewport_height - pointer_y)
    } else {
        0.0
    }
}

/// An active drag
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub payload: DragPayload,
    /// Collection order when the drag started
    pub original_order: Vec<String>,
    /// Last computed insertion point
    pub insertion: Option<InsertionPoint>,
}

/// What a drop did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropResult {
    Added(Item),
    Moved(Item),
    /// Collection order was previewed; it is saved by [`DragCoordinator::end`]
    Reordered,
    Ignored(SkipReason),
    /// No drag in progress
    NoDrag,
}

/// Owns the drag session and routes drops into the store
#[derive(Debug, Default)]
pub struct DragCoordinator {
    session: Option<DragSession>,
}

impl DragCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Start a drag, replacing any session left over from an aborted one
    pub fn begin<G: PersistenceGateway>(&mut self, payload: DragPayload, store: &CollectionStore<G>) {
        debug!("Drag started: {:?}", payload);
        self.session = Some(DragSession {
            payload,
            original_order: store.collection_ids(),
            insertion: None,
        });
    }

    /// Pointer moved over the collection list.
    ///
    /// Collection drags reorder the store in memory right away.
    pub fn hover<G: PersistenceGateway>(
        &mut self,
        store: &mut CollectionStore<G>,
        slots: &[SlotGeometry],
        pointer_y: f64,
    ) -> Option<InsertionPoint> {
        let session = self.session.as_mut()?;
        let dragged = session.payload.dragged_collection();
        let point = insertion_point(slots, pointer_y, dragged);

        if let Some(dragged) = dragged {
            if session.insertion.as_ref() != Some(&point) {
                let order = order_with_insertion(&store.collection_ids(), dragged, &point);
                store.preview_collection_order(&order);
            }
        }
        session.insertion = Some(point.clone());
        Some(point)
    }

    /// Drop the current payload on a collection
    pub async fn drop_on<G: PersistenceGateway>(
        &mut self,
        store: &mut CollectionStore<G>,
        target_collection_id: &str,
    ) -> Result<DropResult> {
        let Some(payload) = self.session.as_ref().map(|s| s.payload.clone()) else {
            return Ok(DropResult::NoDrag);
        };
        apply_drop(store, payload, target_collection_id).await
    }

    /// Drop raw transfer data, e.g. from a drag that started elsewhere
    pub async fn drop_transfer<G: PersistenceGateway>(
        &mut self,
        store: &mut CollectionStore<G>,
        raw: &str,
        target_collection_id: &str,
    ) -> Result<DropResult> {
        let payload = DragPayload::from_json(raw)?;
        apply_drop(store, payload, target_collection_id).await
    }

    /// Finish the drag, persisting a collection order that changed
    pub async fn end<G: PersistenceGateway>(&mut self, store: &mut CollectionStore<G>) -> Outcome {
        let Some(session) = self.session.take() else {
            return Outcome::Skipped(SkipReason::Unchanged);
        };
        if session.payload.dragged_collection().is_none() {
            return Outcome::Skipped(SkipReason::Unchanged);
        }

        let order = store.collection_ids();
        if order == session.original_order {
            return Outcome::Skipped(SkipReason::Unchanged);
        }
        store.reorder_collections(&order).await
    }

    /// Abandon the drag and restore the order it started with
    pub fn cancel<G: PersistenceGateway>(&mut self, store: &mut CollectionStore<G>) {
        let Some(session) = self.session.take() else {
            return;
        };
        if session.payload.dragged_collection().is_some()
            && !store.preview_collection_order(&session.original_order).is_applied()
        {
            warn!("Could not restore collection order after cancelled drag");
        }
    }
}

async fn apply_drop<G: PersistenceGateway>(
    store: &mut CollectionStore<G>,
    payload: DragPayload,
    target_collection_id: &str,
) -> Result<DropResult> {
    let result = match payload {
        DragPayload::Tab {
            title,
            url,
            favicon,
        } => {
            let draft = ItemDraft {
                title,
                url,
                favicon,
                description: None,
            };
            match store.add_item(target_collection_id, draft, true).await? {
                Outcome::Applied(item) => DropResult::Added(item),
                Outcome::Skipped(reason) => DropResult::Ignored(reason),
            }
        }
        DragPayload::Item {
            collection_id,
            item_id,
            ..
        } => {
            if collection_id == target_collection_id {
                DropResult::Ignored(SkipReason::SameCollection)
            } else {
                match store
                    .move_item(&item_id, &collection_id, target_collection_id)
                    .await?
                {
                    Outcome::Applied(item) => DropResult::Moved(item),
                    Outcome::Skipped(reason) => DropResult::Ignored(reason),
                }
            }
        }
        DragPayload::Collection { .. } => DropResult::Reordered,
    };
    debug!("Drop on {}: {:?}", target_collection_id, result);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use crate::config::TobyConfig;
    use crate::interaction::AutoConfirm;
    use crate::persistence::MemoryGateway;
    use crate::sync::NullChannel;

    fn slots() -> Vec<SlotGeometry> {
        vec![
            SlotGeometry::new("a", 0.0, 100.0),
            SlotGeometry::new("b", 100.0, 100.0),
            SlotGeometry::new("c", 200.0, 100.0),
        ]
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case(10.0, None, InsertionPoint::Before("a".into()))]
    #[case(60.0, None, InsertionPoint::Before("b".into()))]
    #[case(160.0, None, InsertionPoint::Before("c".into()))]
    #[case(260.0, None, InsertionPoint::End)]
    #[case(60.0, Some("b"), InsertionPoint::Before("c".into()))]
    #[case(10.0, Some("a"), InsertionPoint::Before("b".into()))]
    fn test_insertion_point(
        #[case] pointer_y: f64,
        #[case] dragged: Option<&str>,
        #[case] expected: InsertionPoint,
    ) {
        assert_eq!(insertion_point(&slots(), pointer_y, dragged), expected);
    }

    #[test]
    fn test_order_with_insertion() {
        let order = ids(&["a", "b", "c"]);
        assert_eq!(
            order_with_insertion(&order, "c", &InsertionPoint::Before("a".into())),
            ids(&["c", "a", "b"])
        );
        assert_eq!(
            order_with_insertion(&order, "a", &InsertionPoint::End),
            ids(&["b", "c", "a"])
        );
    }

    #[rstest]
    #[case(0.0, -20.0)]
    #[case(150.0, -11.0)]
    #[case(300.0, 0.0)]
    #[case(500.0, 0.0)]
    #[case(850.0, 11.0)]
    #[case(1000.0, 20.0)]
    fn test_auto_scroll_velocity(#[case] pointer_y: f64, #[case] expected: f64) {
        let config = DragConfig::default();
        let velocity = auto_scroll_velocity(pointer_y, 1000.0, &config);
        assert!((velocity - expected).abs() < 1e-9, "{} != {}", velocity, expected);
    }

    #[test]
    fn test_payload_wire_format() {
        let payload = DragPayload::Item {
            collection_id: "c1".into(),
            item_id: "i1".into(),
            title: "Docs".into(),
            url: "https://docs.rs".into(),
            favicon: None,
        };
        let json = payload.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"type":"item","collectionId":"c1","itemId":"i1","title":"Docs","url":"https://docs.rs"}"#
        );
        assert_eq!(DragPayload::from_json(&json).unwrap(), payload);

        let tab = DragPayload::from_json(r#"{"type":"tab","title":"T","url":"https://t.test"}"#).unwrap();
        assert!(matches!(tab, DragPayload::Tab { favicon: None, .. }));

        assert!(DragPayload::from_json(r#"{"type":"window"}"#).is_err());
    }

    async fn store_with(names: &[&str]) -> (CollectionStore<MemoryGateway>, Vec<String>) {
        let mut store =
            CollectionStore::new(MemoryGateway::new(), NullChannel, AutoConfirm, TobyConfig::default());
        // created in reverse so the list reads in `names` order
        for name in names.iter().rev() {
            store.create_collection(name).await.unwrap();
        }
        let ids = store.collection_ids();
        (store, ids)
    }

    #[tokio::test]
    async fn test_collection_drag_previews_then_persists_on_end() {
        let (mut store, order) = store_with(&["A", "B", "C"]).await;
        let saves = store.gateway().save_count();
        let geometry: Vec<SlotGeometry> = order
            .iter()
            .enumerate()
            .map(|(i, id)| SlotGeometry::new(id.clone(), i as f64 * 100.0, 100.0))
            .collect();

        let mut drag = DragCoordinator::new();
        drag.begin(
            DragPayload::Collection {
                collection_id: order[2].clone(),
            },
            &store,
        );
        let point = drag.hover(&mut store, &geometry, 10.0);
        assert_eq!(point, Some(InsertionPoint::Before(order[0].clone())));
        assert_eq!(
            store.collection_ids(),
            vec![order[2].clone(), order[0].clone(), order[1].clone()]
        );
        assert_eq!(store.gateway().save_count(), saves);

        assert_eq!(drag.drop_on(&mut store, &order[0]).await.unwrap(), DropResult::Reordered);
        assert!(drag.end(&mut store).await.is_applied());
        assert!(!drag.is_active());
        assert_eq!(store.gateway().save_count(), saves + 1);
    }

    #[tokio::test]
    async fn test_cancel_restores_original_order() {
        let (mut store, order) = store_with(&["A", "B"]).await;
        let geometry = vec![
            SlotGeometry::new(order[0].clone(), 0.0, 100.0),
            SlotGeometry::new(order[1].clone(), 100.0, 100.0),
        ];

        let mut drag = DragCoordinator::new();
        drag.begin(
            DragPayload::Collection {
                collection_id: order[0].clone(),
            },
            &store,
        );
        drag.hover(&mut store, &geometry, 190.0);
        assert_eq!(store.collection_ids(), vec![order[1].clone(), order[0].clone()]);

        drag.cancel(&mut store);
        assert_eq!(store.collection_ids(), order);
    }

    #[tokio::test]
    async fn test_tab_drop_adds_item() {
        let (mut store, order) = store_with(&["A"]).await;
        let mut drag = DragCoordinator::new();
        drag.begin(
            DragPayload::Tab {
                title: "Tokio".into(),
                url: "https://tokio.rs".into(),
                favicon: None,
            },
            &store,
        );

        let result = drag.drop_on(&mut store, &order[0]).await.unwrap();
        assert!(matches!(result, DropResult::Added(ref item) if item.url == "https://tokio.rs"));
        assert_eq!(drag.end(&mut store).await.skip_reason(), Some(SkipReason::Unchanged));
    }

    #[tokio::test]
    async fn test_item_drop_moves_or_ignores_origin() {
        let (mut store, order) = store_with(&["A", "B"]).await;
        let item = store
            .add_item(&order[0], ItemDraft::new("Docs", "https://docs.rs"), true)
            .await
            .unwrap()
            .applied()
            .unwrap();
        let payload = DragPayload::from_item(&order[0], &item).to_json().unwrap();

        let mut drag = DragCoordinator::new();
        let result = drag.drop_transfer(&mut store, &payload, &order[0]).await.unwrap();
        assert_eq!(result, DropResult::Ignored(SkipReason::SameCollection));

        let result = drag.drop_transfer(&mut store, &payload, &order[1]).await.unwrap();
        assert!(matches!(result, DropResult::Moved(ref moved) if moved.url == "https://docs.rs"));
        assert!(store.collection(&order[0]).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_item_drop_moves_untitled_stored_item() {
        let gateway = MemoryGateway::new();
        gateway.insert(
            "collections",
            serde_json::json!([
                { "id": "l", "name": "L", "items": [{ "id": "i1", "title": "", "url": "https://x.test" }] },
                { "id": "b", "name": "B", "items": [] }
            ]),
        );
        let mut store =
            CollectionStore::open(gateway, NullChannel, AutoConfirm, TobyConfig::default()).await;
        let item = store.collection("l").unwrap().items[0].clone();
        let payload = DragPayload::from_item("l", &item).to_json().unwrap();

        let mut drag = DragCoordinator::new();
        let result = drag.drop_transfer(&mut store, &payload, "b").await.unwrap();
        assert!(matches!(result, DropResult::Moved(ref moved) if moved.url == "https://x.test"));
        assert!(store.collection("l").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_drop_without_session() {
        let (mut store, order) = store_with(&["A"]).await;
        let mut drag = DragCoordinator::new();
        assert_eq!(drag.drop_on(&mut store, &order[0]).await.unwrap(), DropResult::NoDrag);
    }
}
