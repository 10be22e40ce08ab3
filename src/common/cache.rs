use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
    time::{Duration, Instant},
};

use serde_json::Value;

// Cache em memória com TTL explícito, injetado via AppState.
#[derive(Clone, Default)]
pub struct TtlCache {
    inner: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retorna o valor se ainda estiver dentro do TTL; entradas vencidas
    /// são removidas na própria leitura.
    pub fn get(&self, key: &str) -> Option<Value> {
        {
            let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
            match map.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.value.clone());
                }
                Some(_) => {} // vencida: cai para a remoção abaixo
                None => return None,
            }
        }

        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.remove(key);
        None
    }

    /// Grava com TTL. Toda escrita também varre as entradas vencidas,
    /// então o mapa não cresce sem limite entre leituras.
    pub fn put(&self, key: impl Into<String>, value: Value, ttl: Duration) {
        let now = Instant::now();
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.retain(|_, entry| entry.expires_at > now);
        map.insert(
            key.into(),
            CacheEntry {
                value,
                expires_at: now + ttl,
            },
        );
    }

    /// Invalida todas as chaves com um dado prefixo (ex: "dashboard:").
    pub fn invalidate_prefix(&self, prefix: &str) {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.retain(|key, _| !key.starts_with(prefix));
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn returns_value_within_ttl() {
        let cache = TtlCache::new();
        cache.put("k", json!({"n": 1}), Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(json!({"n": 1})));
    }

    #[test]
    fn expires_after_ttl() {
        let cache = TtlCache::new();
        cache.put("k", json!(1), Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(cache.get("k"), None);
        // a leitura da entrada vencida também remove do mapa
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn write_sweeps_expired_entries() {
        let cache = TtlCache::new();
        cache.put("velha", json!(1), Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(30));
        cache.put("nova", json!(2), Duration::from_secs(60));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("nova"), Some(json!(2)));
    }

    #[test]
    fn invalidate_prefix_only_touches_prefix() {
        let cache = TtlCache::new();
        cache.put("dashboard:summary", json!(1), Duration::from_secs(60));
        cache.put("analytics:health", json!(2), Duration::from_secs(60));
        cache.invalidate_prefix("dashboard:");
        assert_eq!(cache.get("dashboard:summary"), None);
        assert_eq!(cache.get("analytics:health"), Some(json!(2)));
    }
}
