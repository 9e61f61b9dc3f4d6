use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Result;
use async_trait::async_trait;
use fs4::tokio::AsyncFileExt;
use serde::{de::DeserializeOwned, Serialize};
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, warn};

use super::entities::{Habit, HabitCompletion, PlannerActivity};

const HABITS_FILE: &str = "habits.json";
const COMPLETIONS_FILE: &str = "completions.json";
const ACTIVITIES_FILE: &str = "activities.json";

/// Interface for abstracting persistence of the three collections. Every write
/// replaces the whole collection; there are no partial updates and no
/// multi-collection transaction. Reads resolve to an empty collection when the
/// medium fails, writes surface their error so the caller can log and continue
/// with in-memory state authoritative.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionStore: Send + Sync {
    async fn load_habits(&self) -> Result<Vec<Habit>>;
    async fn save_habits(&self, habits: &[Habit]) -> Result<()>;

    async fn load_completions(&self) -> Result<Vec<HabitCompletion>>;
    async fn save_completions(&self, completions: &[HabitCompletion]) -> Result<()>;

    async fn load_activities(&self) -> Result<Vec<PlannerActivity>>;
    async fn save_activities(&self, activities: &[PlannerActivity]) -> Result<()>;
}

/// The main realization of [CollectionStore]. One JSON array file per
/// collection under the application data directory.
pub struct FileCollectionStore {
    data_dir: PathBuf,
}

impl FileCollectionStore {
    pub fn new(data_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&data_dir)?;

        Ok(Self { data_dir })
    }

    async fn read_collection<T: DeserializeOwned>(&self, file_name: &str) -> Result<Vec<T>> {
        let path = self.data_dir.join(file_name);
        match Self::read_inner(&path).await {
            Ok(records) => Ok(records),
            Err(e) => {
                // Missing medium or a torn write degrades to an empty
                // collection rather than blocking the user.
                warn!("Reading {path:?} failed, resolving to an empty collection: {e:#}");
                Ok(vec![])
            }
        }
    }

    async fn read_inner<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
        debug!("Extracting {path:?}");
        let mut file = match File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };
        file.lock_shared()?;
        let mut raw = String::new();
        let read = file.read_to_string(&mut raw).await;
        file.unlock_async().await?;
        read?;

        if raw.trim().is_empty() {
            return Ok(vec![]);
        }
        Ok(serde_json::from_str(&raw)?)
    }

    async fn write_collection<T: Serialize + Sync>(
        &self,
        file_name: &str,
        records: &[T],
    ) -> Result<()> {
        let path = self.data_dir.join(file_name);
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .await?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let written = Self::write_inner(&mut file, records).await;
        file.unlock_async().await?;
        written
    }

    async fn write_inner<T: Serialize>(file: &mut File, records: &[T]) -> Result<()> {
        let buffer = serde_json::to_vec(records)?;
        file.write_all(&buffer).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl CollectionStore for FileCollectionStore {
    async fn load_habits(&self) -> Result<Vec<Habit>> {
        self.read_collection(HABITS_FILE).await
    }

    async fn save_habits(&self, habits: &[Habit]) -> Result<()> {
        self.write_collection(HABITS_FILE, habits).await
    }

    async fn load_completions(&self) -> Result<Vec<HabitCompletion>> {
        self.read_collection(COMPLETIONS_FILE).await
    }

    async fn save_completions(&self, completions: &[HabitCompletion]) -> Result<()> {
        self.write_collection(COMPLETIONS_FILE, completions).await
    }

    async fn load_activities(&self) -> Result<Vec<PlannerActivity>> {
        self.read_collection(ACTIVITIES_FILE).await
    }

    async fn save_activities(&self, activities: &[PlannerActivity]) -> Result<()> {
        self.write_collection(ACTIVITIES_FILE, activities).await
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{NaiveDate, Utc};
    use tempfile::tempdir;
    use uuid::Uuid;

    use crate::{store::entities::Frequency, utils::logging::TEST_LOGGING};

    use super::*;

    fn sample_habit(name: &str) -> Habit {
        Habit {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            color: "#3B82F6".into(),
            frequency: Frequency::Daily,
            custom_frequency: None,
            created_at: Utc::now(),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn save_then_load_returns_the_same_records() -> Result<()> {
        let dir = tempdir()?;
        let store = FileCollectionStore::new(dir.path().to_owned())?;

        let habits = vec![sample_habit("Meditate"), sample_habit("Read")];
        store.save_habits(&habits).await?;

        assert_eq!(store.load_habits().await?, habits);
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_loads_as_empty() -> Result<()> {
        let dir = tempdir()?;
        let store = FileCollectionStore::new(dir.path().to_owned())?;

        assert!(store.load_completions().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_loads_as_empty() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        std::fs::write(dir.path().join(HABITS_FILE), b"{not json")?;
        let store = FileCollectionStore::new(dir.path().to_owned())?;

        assert!(store.load_habits().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn save_replaces_the_whole_collection() -> Result<()> {
        let dir = tempdir()?;
        let store = FileCollectionStore::new(dir.path().to_owned())?;

        store
            .save_habits(&[sample_habit("Meditate"), sample_habit("Read")])
            .await?;
        let survivor = vec![sample_habit("Stretch")];
        store.save_habits(&survivor).await?;

        assert_eq!(store.load_habits().await?, survivor);
        Ok(())
    }

    #[tokio::test]
    async fn completions_round_trip_their_dates() -> Result<()> {
        let dir = tempdir()?;
        let store = FileCollectionStore::new(dir.path().to_owned())?;

        let completions = vec![HabitCompletion {
            id: Uuid::new_v4(),
            habit_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
            completed_at: Utc::now(),
        }];
        store.save_completions(&completions).await?;

        assert_eq!(store.load_completions().await?, completions);
        Ok(())
    }
}
