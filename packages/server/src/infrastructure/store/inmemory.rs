//! InMemory Room Store 実装
//!
//! `RoomStore` trait のプロセス内実装。HashMap を KVS として使用します。
//!
//! - 値の型は string / hash / list の3種類
//! - キーごとに期限（`tokio::time::Instant`）を持つ
//! - 期限切れのキーはアクセス時に削除され、`purge_expired` でも一括削除できる
//! - 空になった hash / list はキーごと削除される

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use tokio::{sync::Mutex, task::JoinHandle, time::Instant};

use super::{RoomStore, StoreError, StoreResult};

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Hash(HashMap<String, String>),
    List(VecDeque<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }

    fn is_empty(&self) -> bool {
        match &self.value {
            Value::Str(_) => false,
            Value::Hash(hash) => hash.is_empty(),
            Value::List(list) => list.is_empty(),
        }
    }
}

/// インメモリ Room Store 実装
#[derive(Debug, Default)]
pub struct InMemoryRoomStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 期限切れのキーを全て削除し、削除した数を返す
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// 一定間隔で期限切れのキーを削除するタスクを起動
    pub fn spawn_sweeper(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let purged = self.purge_expired().await;
                if purged > 0 {
                    tracing::debug!("Purged {} expired key(s) from room store", purged);
                }
            }
        })
    }
}

fn evict_if_expired(entries: &mut HashMap<String, Entry>, key: &str) {
    if entries
        .get(key)
        .is_some_and(|entry| entry.is_expired(Instant::now()))
    {
        entries.remove(key);
    }
}

fn remove_if_empty(entries: &mut HashMap<String, Entry>, key: &str) {
    if entries.get(key).is_some_and(Entry::is_empty) {
        entries.remove(key);
    }
}

/// Redis と同じ規則でリストの範囲を `[start, stop]` に正規化する
fn normalize_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    if len == 0 {
        return None;
    }
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}

fn wrong_type(key: &str) -> StoreError {
    StoreError::WrongType(key.to_string())
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut entries = self.entries.lock().await;
        evict_if_expired(&mut entries, key);
        match entries.get(key).map(|entry| &entry.value) {
            None => Ok(None),
            Some(Value::Str(value)) => Ok(Some(value.clone())),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn set(&self, key: &str, value: String) -> StoreResult<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), Entry::new(Value::Str(value)));
        Ok(())
    }

    async fn hset(&self, key: &str, field: &str, value: String) -> StoreResult<()> {
        let mut entries = self.entries.lock().await;
        evict_if_expired(&mut entries, key);
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Value::Hash(HashMap::new())));
        match &mut entry.value {
            Value::Hash(hash) => {
                hash.insert(field.to_string(), value);
                Ok(())
            }
            _ => Err(wrong_type(key)),
        }
    }

    async fn hdel(&self, key: &str, field: &str) -> StoreResult<bool> {
        let mut entries = self.entries.lock().await;
        evict_if_expired(&mut entries, key);
        let removed = match entries.get_mut(key).map(|entry| &mut entry.value) {
            None => false,
            Some(Value::Hash(hash)) => hash.remove(field).is_some(),
            Some(_) => return Err(wrong_type(key)),
        };
        remove_if_empty(&mut entries, key);
        Ok(removed)
    }

    async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, String>> {
        let mut entries = self.entries.lock().await;
        evict_if_expired(&mut entries, key);
        match entries.get(key).map(|entry| &entry.value) {
            None => Ok(HashMap::new()),
            Some(Value::Hash(hash)) => Ok(hash.clone()),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn hlen(&self, key: &str) -> StoreResult<usize> {
        let mut entries = self.entries.lock().await;
        evict_if_expired(&mut entries, key);
        match entries.get(key).map(|entry| &entry.value) {
            None => Ok(0),
            Some(Value::Hash(hash)) => Ok(hash.len()),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn lpush(&self, key: &str, value: String) -> StoreResult<usize> {
        let mut entries = self.entries.lock().await;
        evict_if_expired(&mut entries, key);
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Value::List(VecDeque::new())));
        match &mut entry.value {
            Value::List(list) => {
                list.push_front(value);
                Ok(list.len())
            }
            _ => Err(wrong_type(key)),
        }
    }

    async fn ltrim(&self, key: &str, start: isize, stop: isize) -> StoreResult<()> {
        let mut entries = self.entries.lock().await;
        evict_if_expired(&mut entries, key);
        match entries.get_mut(key).map(|entry| &mut entry.value) {
            None => return Ok(()),
            Some(Value::List(list)) => match normalize_range(list.len(), start, stop) {
                Some((start, stop)) => {
                    list.truncate(stop + 1);
                    list.drain(..start);
                }
                None => list.clear(),
            },
            Some(_) => return Err(wrong_type(key)),
        }
        remove_if_empty(&mut entries, key);
        Ok(())
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>> {
        let mut entries = self.entries.lock().await;
        evict_if_expired(&mut entries, key);
        match entries.get(key).map(|entry| &entry.value) {
            None => Ok(Vec::new()),
            Some(Value::List(list)) => Ok(normalize_range(list.len(), start, stop)
                .map(|(start, stop)| list.range(start..=stop).cloned().collect())
                .unwrap_or_default()),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool> {
        let mut entries = self.entries.lock().await;
        evict_if_expired(&mut entries, key);
        match entries.get_mut(key) {
            Some(entry) => {
                // 表現できないほど長い TTL は期限なしとして扱う
                entry.expires_at = Instant::now().checked_add(ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn persist(&self, key: &str) -> StoreResult<bool> {
        let mut entries = self.entries.lock().await;
        evict_if_expired(&mut entries, key);
        Ok(entries
            .get_mut(key)
            .and_then(|entry| entry.expires_at.take())
            .is_some())
    }

    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>> {
        let mut entries = self.entries.lock().await;
        evict_if_expired(&mut entries, key);
        Ok(entries
            .get(key)
            .and_then(|entry| entry.expires_at)
            .map(|deadline| deadline.saturating_duration_since(Instant::now())))
    }

    async fn del(&self, keys: &[String]) -> StoreResult<usize> {
        let mut entries = self.entries.lock().await;
        let mut removed = 0;
        for key in keys {
            evict_if_expired(&mut entries, key);
            if entries.remove(key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
