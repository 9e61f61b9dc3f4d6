use std::{collections::BTreeSet, sync::Arc};

use chrono::NaiveTime;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    store::{collection_store::CollectionStore, entities::PlannerActivity},
    utils::clock::Clock,
};

/// Activity fields taken in at the form boundary. Start/end ordering and a
/// non-empty day set are the boundary's responsibility; the ledger stores what
/// it is given.
#[derive(Debug, Clone)]
pub struct ActivityDraft {
    pub title: String,
    pub description: Option<String>,
    pub color: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub days: BTreeSet<u8>,
    pub is_active: bool,
    pub linked_habit_id: Option<Uuid>,
}

/// Owns the scheduled planner activities. Same write-through shape as the
/// habit ledger, without any dependent child records. `linked_habit_id` is
/// held opaquely; the ledger never validates it against the habit list or
/// reacts to the referenced habit's lifecycle.
pub struct ActivityLedger<S: CollectionStore> {
    store: S,
    clock: Arc<dyn Clock>,
    activities: Vec<PlannerActivity>,
}

impl<S: CollectionStore> ActivityLedger<S> {
    pub async fn load(store: S, clock: Arc<dyn Clock>) -> Self {
        let activities = store.load_activities().await.unwrap_or_else(|e| {
            warn!("Loading activities failed: {e:#}");
            vec![]
        });
        Self {
            store,
            clock,
            activities,
        }
    }

    pub fn activities(&self) -> &[PlannerActivity] {
        &self.activities
    }

    pub fn activity(&self, id: Uuid) -> Option<&PlannerActivity> {
        self.activities.iter().find(|a| a.id == id)
    }

    pub async fn add_activity(&mut self, draft: ActivityDraft) -> Uuid {
        let activity = PlannerActivity {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
            color: draft.color,
            start_time: draft.start_time,
            end_time: draft.end_time,
            days: draft.days,
            created_at: self.clock.time(),
            is_active: draft.is_active,
            linked_habit_id: draft.linked_habit_id,
        };
        let id = activity.id;
        self.activities.push(activity);
        self.persist().await;
        id
    }

    /// Replaces the activity with the same id. Silently a no-op when the id is
    /// unknown.
    pub async fn update_activity(&mut self, activity: PlannerActivity) {
        let Some(slot) = self.activities.iter_mut().find(|a| a.id == activity.id) else {
            debug!("Ignoring update for unknown activity {}", activity.id);
            return;
        };
        *slot = activity;
        self.persist().await;
    }

    pub async fn delete_activity(&mut self, id: Uuid) {
        self.activities.retain(|a| a.id != id);
        self.persist().await;
    }

    async fn persist(&self) {
        if let Err(e) = self.store.save_activities(&self.activities).await {
            warn!("Saving activities failed: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::{store::collection_store::MockCollectionStore, utils::clock::MockClock};

    use super::*;

    fn fixed_clock() -> Arc<dyn Clock> {
        let mut clock = MockClock::new();
        clock
            .expect_time()
            .return_const(Utc.with_ymd_and_hms(2025, 3, 5, 9, 30, 0).unwrap());
        Arc::new(clock)
    }

    fn empty_store() -> MockCollectionStore {
        let mut store = MockCollectionStore::new();
        store.expect_load_activities().returning(|| Ok(vec![]));
        store
    }

    fn draft(title: &str, start: &str, end: &str) -> ActivityDraft {
        ActivityDraft {
            title: title.into(),
            description: None,
            color: "#8B5CF6".into(),
            start_time: NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
            end_time: NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
            days: BTreeSet::from([1, 3, 5]),
            is_active: true,
            linked_habit_id: None,
        }
    }

    #[tokio::test]
    async fn add_update_delete_round_trip() {
        let mut store = empty_store();
        store.expect_save_activities().returning(|_| Ok(()));

        let mut ledger = ActivityLedger::load(store, fixed_clock()).await;
        let id = ledger.add_activity(draft("Gym", "18:00", "19:00")).await;
        assert_eq!(ledger.activities().len(), 1);

        let mut updated = ledger.activity(id).unwrap().clone();
        updated.title = "Swim".into();
        ledger.update_activity(updated).await;
        assert_eq!(ledger.activity(id).unwrap().title, "Swim");

        ledger.delete_activity(id).await;
        assert!(ledger.activities().is_empty());
    }

    #[tokio::test]
    async fn dangling_link_is_stored_untouched() {
        let mut store = empty_store();
        store.expect_save_activities().returning(|_| Ok(()));

        let mut ledger = ActivityLedger::load(store, fixed_clock()).await;
        let ghost = Uuid::new_v4();
        let mut activity = draft("Gym", "18:00", "19:00");
        activity.linked_habit_id = Some(ghost);

        let id = ledger.add_activity(activity).await;
        assert_eq!(ledger.activity(id).unwrap().linked_habit_id, Some(ghost));
    }

    #[tokio::test]
    async fn update_of_unknown_activity_is_a_silent_noop() {
        let mut store = empty_store();
        store.expect_save_activities().times(0);

        let mut ledger = ActivityLedger::load(store, fixed_clock()).await;
        let mut ghost = draft("Gym", "18:00", "19:00");
        ghost.title = "Ghost".into();
        let activity = PlannerActivity {
            id: Uuid::new_v4(),
            title: ghost.title,
            description: None,
            color: ghost.color,
            start_time: ghost.start_time,
            end_time: ghost.end_time,
            days: ghost.days,
            created_at: Utc::now(),
            is_active: true,
            linked_habit_id: None,
        };

        ledger.update_activity(activity).await;
        assert!(ledger.activities().is_empty());
    }
}
