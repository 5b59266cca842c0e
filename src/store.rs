use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error as ThisError;

use crate::persistence::Snapshot;

/// The Store is the single source of truth for all keys: string values with
/// optional expirations and list values. It is designed to be shared and
/// cloned cheaply using reference counting; every operation runs under one
/// mutual-exclusion region, so no caller ever observes a half-applied effect
/// of another.
///
/// Expired string entries are removed lazily whenever they are touched; a
/// periodic [`sweep_expired`](StoreGuard::sweep_expired) pass bounds memory
/// growth from keys that are never read again.
#[derive(Clone, Default)]
pub struct Store {
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    strings: HashMap<String, StringEntry>,
    lists: HashMap<String, VecDeque<String>>,
}

/// A string value and, optionally, the absolute UNIX-epoch millisecond after
/// which it no longer exists. Wall-clock time rather than a monotonic
/// instant, so expirations survive the snapshot round-trip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StringEntry {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

#[derive(Debug, ThisError, PartialEq)]
pub enum StoreError {
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,
    #[error("ERR key must not be empty")]
    EmptyKey,
    #[error("ERR value is not an integer or out of range")]
    NotAnInteger,
}

impl Store {
    pub fn new() -> Store {
        Store::default()
    }

    /// Acquire the store's exclusive region. All operations live on the
    /// returned guard; holding it is what makes a check-then-act sequence a
    /// single step.
    pub fn lock(&self) -> StoreGuard<'_> {
        StoreGuard {
            state: self.state.lock().unwrap(),
        }
    }
}

pub struct StoreGuard<'a> {
    state: MutexGuard<'a, State>,
}

impl StoreGuard<'_> {
    /// Store `value` under `key`, expiring after `ttl_millis` if given.
    pub fn set(
        &mut self,
        key: String,
        value: String,
        ttl_millis: Option<u64>,
    ) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        if self.state.lists.contains_key(&key) {
            return Err(StoreError::WrongType);
        }

        let expires_at = ttl_millis.map(|ttl| now_ms().saturating_add(ttl));
        self.state.strings.insert(key, StringEntry { value, expires_at });
        Ok(())
    }

    /// Read a string value. Touching an expired entry deletes it.
    pub fn get(&mut self, key: &str) -> Result<Option<String>, StoreError> {
        if self.live_string(key) {
            return Ok(self.state.strings.get(key).map(|entry| entry.value.clone()));
        }
        if self.state.lists.contains_key(key) {
            return Err(StoreError::WrongType);
        }
        Ok(None)
    }

    /// Expiration-aware existence check for a key of either type.
    pub fn exists(&mut self, key: &str) -> bool {
        self.live_string(key) || self.state.lists.contains_key(key)
    }

    /// Remove `key` from whichever map holds it.
    pub fn remove(&mut self, key: &str) -> bool {
        let in_strings = self.state.strings.remove(key).is_some();
        let in_lists = self.state.lists.remove(key).is_some();
        in_strings || in_lists
    }

    /// Remove each key in turn without releasing the lock in between.
    pub fn remove_many<I>(&mut self, keys: I) -> u64
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        keys.into_iter()
            .filter(|key| self.remove(key.as_ref()))
            .count() as u64
    }

    /// Atomically increment the integer stored at `key`, treating a missing
    /// key as 0 and preserving any expiry. This is the read-modify-write
    /// composition that two separate GET and SET commands cannot provide.
    pub fn incr(&mut self, key: &str) -> Result<i64, StoreError> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        if self.state.lists.contains_key(key) {
            return Err(StoreError::WrongType);
        }

        let entry = if self.live_string(key) {
            self.state.strings.get(key).cloned()
        } else {
            None
        };
        let entry = entry.unwrap_or(StringEntry {
            value: "0".to_string(),
            expires_at: None,
        });

        let value = entry
            .value
            .parse::<i64>()
            .map_err(|_| StoreError::NotAnInteger)?
            .checked_add(1)
            .ok_or(StoreError::NotAnInteger)?;

        self.state.strings.insert(
            key.to_string(),
            StringEntry {
                value: value.to_string(),
                expires_at: entry.expires_at,
            },
        );
        Ok(value)
    }

    /// Prepend to the list at `key`, creating it if absent.
    pub fn lpush(&mut self, key: String, value: String) -> Result<usize, StoreError> {
        self.push(key, value, true)
    }

    /// Append to the list at `key`, creating it if absent.
    pub fn rpush(&mut self, key: String, value: String) -> Result<usize, StoreError> {
        self.push(key, value, false)
    }

    fn push(&mut self, key: String, value: String, front: bool) -> Result<usize, StoreError> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        if self.live_string(&key) {
            return Err(StoreError::WrongType);
        }

        let list = self.state.lists.entry(key).or_default();
        if front {
            list.push_front(value);
        } else {
            list.push_back(value);
        }
        Ok(list.len())
    }

    /// Remove and return the head of the list at `key`.
    pub fn lpop(&mut self, key: &str) -> Result<Option<String>, StoreError> {
        self.pop(key, true)
    }

    /// Remove and return the tail of the list at `key`.
    pub fn rpop(&mut self, key: &str) -> Result<Option<String>, StoreError> {
        self.pop(key, false)
    }

    fn pop(&mut self, key: &str, front: bool) -> Result<Option<String>, StoreError> {
        if self.live_string(key) {
            return Err(StoreError::WrongType);
        }

        let Some(list) = self.state.lists.get_mut(key) else {
            return Ok(None);
        };
        let popped = if front { list.pop_front() } else { list.pop_back() };

        // A drained list is indistinguishable from a never-created one.
        if list.is_empty() {
            self.state.lists.remove(key);
        }
        Ok(popped)
    }

    /// Inclusive range over the list at `key`. Negative indices count from
    /// the end; both bounds are clamped to the list. `None` means no such
    /// list, distinct from an empty range.
    pub fn lrange(
        &mut self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Option<Vec<String>>, StoreError> {
        if self.live_string(key) {
            return Err(StoreError::WrongType);
        }

        let Some(list) = self.state.lists.get(key) else {
            return Ok(None);
        };

        let len = list.len() as i64;
        let start = if start < 0 { (len + start).max(0) } else { start.min(len) };
        let stop = if stop < 0 { (len + stop).max(0) } else { stop.min(len) };
        if start > stop {
            return Ok(Some(Vec::new()));
        }

        let range = list
            .iter()
            .skip(start as usize)
            .take((stop - start + 1) as usize)
            .cloned()
            .collect();
        Ok(Some(range))
    }

    /// Drop every string entry whose expiry has passed. Returns how many
    /// were removed.
    pub fn sweep_expired(&mut self) -> usize {
        let now = now_ms();
        let before = self.state.strings.len();
        self.state
            .strings
            .retain(|_, entry| !entry.expired_at(now));
        before - self.state.strings.len()
    }

    /// Copy the whole key space out, for persistence. The copy happens under
    /// the lock; writing it anywhere does not.
    pub fn export(&self) -> Snapshot {
        Snapshot {
            strings: self
                .state
                .strings
                .iter()
                .map(|(key, entry)| (key.clone(), entry.clone()))
                .collect(),
            lists: self
                .state
                .lists
                .iter()
                .map(|(key, list)| (key.clone(), list.iter().cloned().collect()))
                .collect(),
            timestamp: now_ms(),
        }
    }

    /// Wholesale-replace the key space from a snapshot.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.state.strings = snapshot.strings.into_iter().collect();
        self.state.lists = snapshot
            .lists
            .into_iter()
            .map(|(key, elements)| (key, elements.into()))
            .collect();
    }

    pub fn strings_len(&self) -> usize {
        self.state.strings.len()
    }

    pub fn lists_len(&self) -> usize {
        self.state.lists.len()
    }

    /// Rough keyspace footprint in bytes, for INFO.
    pub fn estimated_bytes(&self) -> usize {
        let strings: usize = self
            .state
            .strings
            .iter()
            .map(|(key, entry)| key.len() + entry.value.len())
            .sum();
        let lists: usize = self
            .state
            .lists
            .iter()
            .map(|(key, list)| key.len() + list.iter().map(String::len).sum::<usize>())
            .sum();
        strings + lists
    }

    /// True if `key` holds a string that has not expired. An expired entry
    /// is deleted on the spot, so lazy deletion always wins over the sweep.
    fn live_string(&mut self, key: &str) -> bool {
        match self.state.strings.get(key) {
            Some(entry) if entry.expired_at(now_ms()) => {
                self.state.strings.remove(key);
                false
            }
            Some(_) => true,
            None => false,
        }
    }
}

impl StringEntry {
    fn expired_at(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|at| now > at)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_millis() as u64
}
