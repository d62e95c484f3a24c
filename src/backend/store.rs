//! Flat-file JSON persistence
//!
//! One JSON array per collection. Every read goes to disk, there is no cache.
//! Mutations hold a single async lock for the whole read-modify-write and
//! land through a temp file + rename.

use crate::error::StewardError;
use crate::models::{normalize_user_id, User};
use crate::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::debug;

/// The collections the backend persists, one file each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Users,
    Accounts,
    Transactions,
    Goals,
    Partners,
    Schedules,
    Advisors,
    Meetings,
}

impl Collection {
    pub fn file_name(&self) -> &'static str {
        match self {
            Collection::Users => "users.json",
            Collection::Accounts => "accounts.json",
            Collection::Transactions => "transactions.json",
            Collection::Goals => "life_goals.json",
            Collection::Partners => "bank_partners.json",
            Collection::Schedules => "schedule.json",
            Collection::Advisors => "advisors.json",
            Collection::Meetings => "meetings.json",
        }
    }

    /// Core data must exist; booking data starts out empty.
    fn required(&self) -> bool {
        !matches!(
            self,
            Collection::Schedules | Collection::Advisors | Collection::Meetings
        )
    }
}

pub struct JsonStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn path_of(&self, collection: Collection) -> PathBuf {
        self.dir.join(collection.file_name())
    }

    /// Read a whole collection from disk.
    pub async fn load<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>> {
        let path = self.path_of(collection);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if collection.required() {
                    return Err(StewardError::NotFound(format!(
                        "{} not found",
                        collection.file_name()
                    )));
                }
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if !collection.required() && bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            StewardError::StorageError(format!(
                "Error decoding {}: {}",
                collection.file_name(),
                e
            ))
        })
    }

    async fn save<T: Serialize>(&self, collection: Collection, records: &[T]) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_of(collection);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(records)?;

        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(
            file = collection.file_name(),
            records = records.len(),
            "Collection written"
        );
        Ok(())
    }

    /// Read-modify-write under the store lock. The collection is only
    /// written back when `apply` succeeds.
    pub async fn update<T, R, F>(&self, collection: Collection, apply: F) -> Result<R>
    where
        T: DeserializeOwned + Serialize,
        F: FnOnce(&mut Vec<T>) -> Result<R>,
    {
        let _guard = self.write_lock.lock().await;

        let mut records: Vec<T> = self.load(collection).await?;
        let result = apply(&mut records)?;
        self.save(collection, &records).await?;

        Ok(result)
    }

    /// Look up a user by id after normalization.
    pub async fn require_user(&self, user_id: &str) -> Result<User> {
        let user_id = normalize_user_id(user_id);
        let users: Vec<User> = self.load(Collection::Users).await?;

        users
            .into_iter()
            .find(|u| u.user_id == user_id)
            .ok_or_else(|| StewardError::NotFound("User not found".to_string()))
    }
}

/// Overlay the fields present in `patch` onto `existing`, keeping `id_field`.
pub fn merge_patch<T>(existing: &T, patch: &Value, id_field: &str) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let fields = patch.as_object().ok_or_else(|| {
        StewardError::BadRequest("Update body must be a JSON object".to_string())
    })?;

    let mut merged = serde_json::to_value(existing)?;
    if let Some(target) = merged.as_object_mut() {
        for (key, value) in fields {
            if key != id_field {
                target.insert(key.clone(), value.clone());
            }
        }
    }

    serde_json::from_value(merged)
        .map_err(|e| StewardError::BadRequest(format!("Invalid update: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LifeGoal;
    use serde_json::json;

    fn goal() -> LifeGoal {
        LifeGoal {
            goal_id: "goal-1".to_string(),
            user_id: "user-001".to_string(),
            description: "Emergency fund".to_string(),
            target_amount: 10_000.0,
            target_date: "2026-12-31".to_string(),
            current_amount_saved: 500.0,
        }
    }

    #[tokio::test]
    async fn test_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());

        let err = store.load::<LifeGoal>(Collection::Goals).await.unwrap_err();
        assert!(matches!(err, StewardError::NotFound(ref m) if m == "life_goals.json not found"));

        let schedules: Vec<Value> = store.load(Collection::Schedules).await.unwrap();
        assert!(schedules.is_empty());
    }

    #[tokio::test]
    async fn test_update_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("life_goals.json"), "[]").unwrap();
        let store = JsonStore::new(dir.path());

        let count = store
            .update(Collection::Goals, |goals: &mut Vec<LifeGoal>| {
                goals.push(goal());
                Ok(goals.len())
            })
            .await
            .unwrap();
        assert_eq!(count, 1);

        let goals: Vec<LifeGoal> = store.load(Collection::Goals).await.unwrap();
        assert_eq!(goals, vec![goal()]);
        assert!(!dir.path().join("life_goals.json.tmp").exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_all_land() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("life_goals.json"), "[]").unwrap();
        let store = std::sync::Arc::new(JsonStore::new(dir.path()));

        let mut writers = tokio::task::JoinSet::new();
        for i in 0..50 {
            let store = store.clone();
            writers.spawn(async move {
                store
                    .update(Collection::Goals, move |goals: &mut Vec<LifeGoal>| {
                        goals.push(LifeGoal {
                            goal_id: format!("goal-{}", i),
                            ..goal()
                        });
                        Ok(())
                    })
                    .await
            });
        }
        while let Some(joined) = writers.join_next().await {
            joined.unwrap().unwrap();
        }

        let goals: Vec<LifeGoal> = store.load(Collection::Goals).await.unwrap();
        let mut ids: Vec<String> = goals.into_iter().map(|g| g.goal_id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[tokio::test]
    async fn test_failed_update_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("life_goals.json"), "[]").unwrap();
        let store = JsonStore::new(dir.path());

        let result = store
            .update(Collection::Goals, |goals: &mut Vec<LifeGoal>| {
                goals.push(goal());
                Err::<(), _>(StewardError::Conflict("nope".to_string()))
            })
            .await;
        assert!(result.is_err());

        let goals: Vec<LifeGoal> = store.load(Collection::Goals).await.unwrap();
        assert!(goals.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("accounts.json"), "[{\"account_id\": 1}]").unwrap();
        let store = JsonStore::new(dir.path());

        let err = store
            .load::<crate::models::Account>(Collection::Accounts)
            .await
            .unwrap_err();
        assert!(matches!(err, StewardError::StorageError(_)));
    }

    #[test]
    fn test_merge_patch_keeps_id() {
        let patched = merge_patch(
            &goal(),
            &json!({"target_amount": 15000.0, "goal_id": "hijack"}),
            "goal_id",
        )
        .unwrap();

        assert_eq!(patched.goal_id, "goal-1");
        assert_eq!(patched.target_amount, 15_000.0);
        assert_eq!(patched.description, "Emergency fund");

        assert!(merge_patch(&goal(), &json!([1, 2]), "goal_id").is_err());
        assert!(merge_patch(&goal(), &json!({"target_amount": "lots"}), "goal_id").is_err());
    }
}
