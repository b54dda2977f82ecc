use crate::{link::Provider, metadata::Metadata, resolver::SearchResult, search_id::SearchId};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{
    collections::{BTreeSet, HashMap},
    io::Write,
    path::PathBuf,
    sync::{Arc, RwLock},
    time::Duration,
};

/// Key/value store with per-entry expiry. Expiry is checked on read only.
pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str, ttl: Duration) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    key: String,
    value: String,
    expires_at: DateTime<Utc>,
}

impl Entry {
    fn new(key: &str, value: &str, ttl: Duration) -> anyhow::Result<Self> {
        let ttl = chrono::Duration::from_std(ttl).context("cache ttl out of range")?;
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .context("cache ttl out of range")?;

        Ok(Self {
            key: key.to_string(),
            value: value.to_string(),
            expires_at,
        })
    }

    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        {
            let entries = self
                .entries
                .read()
                .map_err(|_| anyhow::anyhow!("memory cache lock poisoned"))?;

            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow::anyhow!("memory cache lock poisoned"))?;

        // may have been refreshed between the two locks
        if entries.get(key).is_some_and(Entry::is_expired) {
            log::debug!("cache key={key} expired, removing");
            entries.remove(key);
        }

        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> anyhow::Result<()> {
        let entry = Entry::new(key, value, ttl)?;
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow::anyhow!("memory cache lock poisoned"))?;

        // keys that are never read again would otherwise stay forever
        entries.retain(|_, entry| !entry.is_expired());
        entries.insert(key.to_string(), entry);
        Ok(())
    }
}

/// One JSON file per key, named after the sha256 of the key.
#[derive(Clone)]
pub struct FileCache {
    pub base_dir: PathBuf,
}

impl FileCache {
    pub fn new(cache_dir: &str) -> std::io::Result<Self> {
        let path = PathBuf::from(cache_dir);
        std::fs::create_dir_all(&path)?;
        Ok(FileCache { base_dir: path })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir
            .join(format!("{:x}.json", Sha256::digest(key.as_bytes())))
    }
}

impl Cache for FileCache {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path_for(key);

        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let entry: Entry = serde_json::from_slice(&raw)
            .with_context(|| format!("malformed cache entry {}", path.display()))?;

        if entry.key != key {
            return Ok(None);
        }

        if entry.is_expired() {
            log::debug!("cache key={key} expired, removing");
            if let Err(err) = std::fs::remove_file(&path) {
                log::debug!("could not remove {}: {err}", path.display());
            }
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> anyhow::Result<()> {
        let entry = Entry::new(key, value, ttl)?;

        // write to a temp file in the same dir, then rename over the entry
        let mut temp = tempfile::NamedTempFile::new_in(&self.base_dir)?;
        temp.write_all(&serde_json::to_vec(&entry)?)?;
        temp.persist(self.path_for(key)).map_err(|err| err.error)?;

        Ok(())
    }
}

pub fn metadata_key(source_url: &str) -> String {
    format!("metadata:{source_url}")
}

/// Results resolved against a restricted adapter set are kept apart from
/// full results so they never answer a full lookup.
pub fn result_key(id: &SearchId, selection: &BTreeSet<Provider>) -> String {
    if selection.len() == Provider::ALL.len() {
        return format!("result:{id}");
    }

    let scope = selection
        .iter()
        .map(|provider| provider.as_str())
        .collect::<Vec<_>>()
        .join(",");

    format!("result:{id}:{scope}")
}

/// Typed view over a [`Cache`] with the two namespaces used by resolution.
///
/// Every failure is logged and treated as a miss: caching never fails a
/// resolution.
#[derive(Clone)]
pub struct CacheStore {
    cache: Arc<dyn Cache>,
    metadata_ttl: Duration,
    result_ttl: Duration,
}

impl CacheStore {
    pub fn new(cache: Arc<dyn Cache>, metadata_ttl: Duration, result_ttl: Duration) -> Self {
        Self {
            cache,
            metadata_ttl,
            result_ttl,
        }
    }

    pub fn get_metadata(&self, source_url: &str) -> Option<Metadata> {
        self.get_json(&metadata_key(source_url))
    }

    pub fn set_metadata(&self, source_url: &str, metadata: &Metadata) {
        self.set_json(&metadata_key(source_url), metadata, self.metadata_ttl)
    }

    pub fn get_result(&self, key: &str) -> Option<SearchResult> {
        self.get_json(key)
    }

    pub fn set_result(&self, key: &str, result: &SearchResult) {
        self.set_json(key, result, self.result_ttl)
    }

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    log::debug!("cache key={key} outcome=hit");
                    Some(value)
                }
                Err(err) => {
                    log::warn!("cache key={key} outcome=error err={err}");
                    None
                }
            },
            Ok(None) => {
                log::debug!("cache key={key} outcome=miss");
                None
            }
            Err(err) => {
                log::warn!("cache key={key} outcome=error err={err}");
                None
            }
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                log::warn!("cache key={key} serialize failed: {err}");
                return;
            }
        };

        if let Err(err) = self.cache.set(key, &raw, ttl) {
            log::warn!("cache key={key} write failed: {err}");
        }
    }
}
