use std::sync::Arc;

use chrono::NaiveDate;
use futures::join;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    store::{
        collection_store::CollectionStore,
        entities::{Frequency, Habit, HabitCompletion},
    },
    utils::clock::Clock,
};

/// Habit fields taken in at the form boundary. The ledger assigns the id and
/// creation timestamp itself.
#[derive(Debug, Clone)]
pub struct HabitDraft {
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub frequency: Frequency,
    pub custom_frequency: Option<u8>,
    pub is_active: bool,
}

/// Owns the in-memory habit and completion lists and is the read path of
/// record. The store is read once at load and only ever written afterwards
/// (write-through). A failed write is logged and swallowed here, leaving
/// in-memory state authoritative until the next successful replace.
pub struct HabitLedger<S: CollectionStore> {
    store: S,
    clock: Arc<dyn Clock>,
    habits: Vec<Habit>,
    completions: Vec<HabitCompletion>,
}

impl<S: CollectionStore> HabitLedger<S> {
    /// Reads both collections once at startup.
    pub async fn load(store: S, clock: Arc<dyn Clock>) -> Self {
        let (habits, completions) = join!(store.load_habits(), store.load_completions());
        let habits = habits.unwrap_or_else(|e| {
            warn!("Loading habits failed: {e:#}");
            vec![]
        });
        let completions = completions.unwrap_or_else(|e| {
            warn!("Loading completions failed: {e:#}");
            vec![]
        });
        Self {
            store,
            clock,
            habits,
            completions,
        }
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn completions(&self) -> &[HabitCompletion] {
        &self.completions
    }

    pub fn habit(&self, id: Uuid) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    pub async fn add_habit(&mut self, draft: HabitDraft) -> Uuid {
        let habit = Habit {
            id: Uuid::new_v4(),
            name: draft.name,
            description: draft.description,
            color: draft.color,
            frequency: draft.frequency,
            custom_frequency: draft.custom_frequency,
            created_at: self.clock.time(),
            is_active: draft.is_active,
        };
        let id = habit.id;
        self.habits.push(habit);
        self.persist_habits().await;
        id
    }

    /// Replaces the habit with the same id. Silently a no-op when the id is
    /// unknown.
    pub async fn update_habit(&mut self, habit: Habit) {
        let Some(slot) = self.habits.iter_mut().find(|h| h.id == habit.id) else {
            debug!("Ignoring update for unknown habit {}", habit.id);
            return;
        };
        *slot = habit;
        self.persist_habits().await;
    }

    /// Removes the habit together with every completion that references it.
    /// Both lists are filtered in the same mutation and both collections are
    /// persisted together, so the read path never holds a completion for a
    /// deleted habit.
    pub async fn delete_habit(&mut self, id: Uuid) {
        self.habits.retain(|h| h.id != id);
        self.completions.retain(|c| c.habit_id != id);

        let (habits, completions) = join!(
            self.store.save_habits(&self.habits),
            self.store.save_completions(&self.completions)
        );
        if let Err(e) = habits {
            warn!("Saving habits failed: {e:#}");
        }
        if let Err(e) = completions {
            warn!("Saving completions failed: {e:#}");
        }
    }

    /// Flips the completion state for `(habit_id, date)`: removed when present,
    /// inserted otherwise. Never duplicate-inserts, so two toggles net back to
    /// the original state. Returns the state after the flip.
    pub async fn toggle_completion(&mut self, habit_id: Uuid, date: NaiveDate) -> bool {
        let completed = if self.is_completed_on(habit_id, date) {
            self.completions
                .retain(|c| !(c.habit_id == habit_id && c.date == date));
            false
        } else {
            self.completions.push(HabitCompletion {
                id: Uuid::new_v4(),
                habit_id,
                date,
                completed_at: self.clock.time(),
            });
            true
        };
        self.persist_completions().await;
        completed
    }

    pub fn is_completed_on(&self, habit_id: Uuid, date: NaiveDate) -> bool {
        self.completions
            .iter()
            .any(|c| c.habit_id == habit_id && c.date == date)
    }

    async fn persist_habits(&self) {
        if let Err(e) = self.store.save_habits(&self.habits).await {
            warn!("Saving habits failed: {e:#}");
        }
    }

    async fn persist_completions(&self) {
        if let Err(e) = self.store.save_completions(&self.completions).await {
            warn!("Saving completions failed: {e:#}");
        }
    }
}
