//! In-process TTL cache for short-lived auth state (OTPs, pending signups, login/reset handles).
//!
//! Expiry is checked lazily: an expired entry is dropped the next time it is touched.
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|t| t <= now)
    }
}

#[derive(Debug, Default)]
pub struct Cache {
    entries: DashMap<String, Entry>,
}

impl Cache {
    pub fn new() -> Self { Self::default() }

    pub fn set(&self, key: impl Into<String>, value: Value, ttl: Option<Duration>) {
        let expires_at = ttl.map(|d| Instant::now() + d);
        self.entries.insert(key.into(), Entry { value, expires_at });
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        let hit = self.entries.get(key).map(|e| (e.is_expired(now), e.value.clone()));
        match hit {
            Some((false, value)) => Some(value),
            Some((true, _)) => {
                self.entries.remove_if(key, |_, e| e.is_expired(now));
                None
            }
            None => None,
        }
    }

    pub fn del(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn exists(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Reset the TTL of a live entry; false when the key is missing or already expired.
    pub fn expire(&self, key: &str, ttl: Duration) -> bool {
        let now = Instant::now();
        match self.entries.get_mut(key) {
            Some(mut e) if !e.is_expired(now) => {
                e.expires_at = Some(now + ttl);
                true
            }
            _ => false,
        }
    }

    pub fn set_json<T: Serialize>(&self, key: impl Into<String>, value: &T, ttl: Option<Duration>) {
        match serde_json::to_value(value) {
            Ok(v) => self.set(key, v, ttl),
            Err(e) => tracing::warn!(error = %e, "cache_serialize_failed"),
        }
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| serde_json::from_value(v).ok())
    }

    /// Get and delete in one step.
    pub fn take_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get_json(key);
        if value.is_some() {
            self.del(key);
        }
        value
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, e| !e.is_expired(now));
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_get_del_exists() {
        let c = Cache::new();
        c.set("a", json!({"x": 1}), None);
        assert_eq!(c.get("a"), Some(json!({"x": 1})));
        assert!(c.exists("a"));
        assert!(c.del("a"));
        assert!(!c.exists("a"));
        assert!(!c.del("a"));
    }

    #[test]
    fn entries_expire_lazily() {
        let c = Cache::new();
        c.set("otp", json!("123456"), Some(Duration::from_millis(20)));
        assert!(c.exists("otp"));
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(c.get("otp"), None);
        assert!(!c.expire("otp", Duration::from_secs(5)));
    }

    #[test]
    fn expire_extends_live_entry() {
        let c = Cache::new();
        c.set("k", json!(1), Some(Duration::from_millis(20)));
        assert!(c.expire("k", Duration::from_secs(60)));
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(c.get("k"), Some(json!(1)));
    }

    #[test]
    fn typed_helpers_and_purge() {
        #[derive(Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Pending { phone: String }
        let c = Cache::new();
        c.set_json("p", &Pending { phone: "123456".into() }, None);
        assert_eq!(c.take_json::<Pending>("p"), Some(Pending { phone: "123456".into() }));
        assert!(c.get("p").is_none());

        c.set("gone", json!(true), Some(Duration::from_millis(1)));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(c.purge_expired(), 1);
    }
}
