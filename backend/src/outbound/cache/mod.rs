//! In-process profile view cache.
//!
//! Entries expire after a fixed TTL measured with the injected clock. Writes
//! to a student record invalidate its entry explicitly, so the TTL only bounds
//! staleness from writers outside this process. Every `put` sweeps expired
//! entries, which keeps the map bounded by the profiles read within one TTL.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;

use crate::domain::StudentRecord;
use crate::domain::ports::{ProfileViewCache, ProfileViewCacheError};

/// Default lifetime of a cached profile.
pub const DEFAULT_PROFILE_TTL_SECONDS: i64 = 300;

struct Entry {
    record: StudentRecord,
    stored_at: DateTime<Utc>,
}

/// `Mutex<HashMap>` backed [`ProfileViewCache`].
pub struct InMemoryProfileViewCache {
    entries: Mutex<HashMap<String, Entry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl InMemoryProfileViewCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, Duration::seconds(DEFAULT_PROFILE_TTL_SECONDS))
    }

    pub fn with_ttl(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    fn is_fresh(&self, entry: &Entry, now: DateTime<Utc>) -> bool {
        now - entry.stored_at < self.ttl
    }

    #[cfg(test)]
    fn stored(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Entry>>, ProfileViewCacheError> {
        self.entries
            .lock()
            .map_err(|_| ProfileViewCacheError::backend("profile cache lock poisoned"))
    }
}

#[async_trait]
impl ProfileViewCache for InMemoryProfileViewCache {
    async fn get(&self, uid: &str) -> Result<Option<StudentRecord>, ProfileViewCacheError> {
        let now = self.clock.utc();
        let mut entries = self.lock()?;
        match entries.get(uid) {
            Some(entry) if self.is_fresh(entry, now) => Ok(Some(entry.record.clone())),
            Some(_) => {
                entries.remove(uid);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, record: &StudentRecord) -> Result<(), ProfileViewCacheError> {
        let stored_at = self.clock.utc();
        let mut entries = self.lock()?;
        entries.retain(|_, entry| self.is_fresh(entry, stored_at));
        entries.insert(
            record.uid.as_str().to_owned(),
            Entry {
                record: record.clone(),
                stored_at,
            },
        );
        Ok(())
    }

    async fn invalidate(&self, uid: &str) -> Result<(), ProfileViewCacheError> {
        self.lock()?.remove(uid);
        Ok(())
    }
}
