//! Per-owner submission cooldowns.
//!
//! Stored as a JSON object mapping owner ids to the unix timestamp (seconds,
//! fractional) at which the lock expires.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::fs::write_json;
use crate::{StoreError, StoreResult};

const SECS_PER_DAY: u64 = 86_400;

fn unix_secs(at: SystemTime) -> f64 {
    at.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Cooldown lock file.
#[derive(Debug)]
pub struct CooldownLocks {
    path: PathBuf,
    locks: Mutex<BTreeMap<String, f64>>,
}

impl CooldownLocks {
    /// Open the lock file. A missing file means no locks; it is created on
    /// the first change.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let locks = if path.exists() {
            let content = std::fs::read(&path)?;
            if content.iter().all(u8::is_ascii_whitespace) {
                BTreeMap::new()
            } else {
                serde_json::from_slice(&content).map_err(|e| StoreError::Corrupt {
                    path: path.clone(),
                    reason: e.to_string(),
                })?
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), count = locks.len(), "Cooldown locks loaded");
        Ok(Self {
            path,
            locks: Mutex::new(locks),
        })
    }

    /// Lock `owner_id` for `duration` from now.
    pub fn lock(&self, owner_id: &str, duration: Duration) -> StoreResult<SystemTime> {
        let until = SystemTime::now()
            .checked_add(duration)
            .ok_or_else(|| StoreError::LockOutOfRange(owner_id.to_string()))?;
        self.lock_until(owner_id, until)?;
        Ok(until)
    }

    /// Lock `owner_id` until `until`, replacing any existing lock.
    pub fn lock_until(&self, owner_id: &str, until: SystemTime) -> StoreResult<()> {
        let mut locks = self.locks.lock();
        let mut next = locks.clone();
        next.insert(owner_id.to_string(), unix_secs(until));
        self.save(&next)?;
        *locks = next;
        info!(owner_id, until = unix_secs(until), "Owner locked");
        Ok(())
    }

    /// Remove a lock. Returns whether one existed.
    pub fn unlock(&self, owner_id: &str) -> StoreResult<bool> {
        let mut locks = self.locks.lock();
        if !locks.contains_key(owner_id) {
            return Ok(false);
        }
        let mut next = locks.clone();
        next.remove(owner_id);
        self.save(&next)?;
        *locks = next;
        info!(owner_id, "Owner unlocked");
        Ok(true)
    }

    /// Time left on the owner's lock at `now`; `None` when unlocked or expired.
    ///
    /// An expiry too far out to represent counts as `Duration::MAX`.
    pub fn remaining(&self, owner_id: &str, now: SystemTime) -> Option<Duration> {
        let until = *self.locks.lock().get(owner_id)?;
        let left = until - unix_secs(now);
        (left > 0.0).then(|| Duration::try_from_secs_f64(left).unwrap_or(Duration::MAX))
    }

    /// Whole days left, rounded down.
    pub fn remaining_days(&self, owner_id: &str, now: SystemTime) -> Option<u64> {
        self.remaining(owner_id, now)
            .map(|left| left.as_secs() / SECS_PER_DAY)
    }

    pub fn is_locked(&self, owner_id: &str) -> bool {
        self.remaining(owner_id, SystemTime::now()).is_some()
    }

    fn save(&self, locks: &BTreeMap<String, f64>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        write_json(&self.path, locks)
    }
}
