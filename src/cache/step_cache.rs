//! Step cache record: load, query, mark, save (atomic)

use crate::error::{ScaffoldError, ScaffoldResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Current on-disk record format
pub const RECORD_VERSION: u32 = 1;

/// Identity of one provisioning step
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StepKey {
    /// An external command, by its argument vector
    Command { argv: Vec<String> },
    /// A file installed from a template, relative to the target root
    File { path: PathBuf },
    /// A directory, relative to the target root
    Directory { path: PathBuf },
}

impl StepKey {
    pub fn command<S: AsRef<str>>(argv: &[S]) -> Self {
        Self::Command {
            argv: argv.iter().map(|a| a.as_ref().to_string()).collect(),
        }
    }

    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::File {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn directory(path: impl AsRef<Path>) -> Self {
        Self::Directory {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command { argv } => write!(f, "command `{}`", argv.join(" ")),
            Self::File { path } => write!(f, "file {}", path.display()),
            Self::Directory { path } => write!(f, "directory {}", path.display()),
        }
    }
}

/// Serialized form of a step cache
#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord {
    version: u32,
    target: String,
    updated_at: DateTime<Utc>,
    steps: Vec<RecordEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RecordEntry {
    key: StepKey,
    done: bool,
}

/// Completed-step record for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCache {
    target: String,
    entries: BTreeMap<StepKey, bool>,
}

impl StepCache {
    /// Create an empty cache for a target
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Path of the persisted record for `target` under `root`.
    ///
    /// The record is a sibling of the target directory, so a nested target
    /// such as `apps/api` records to `<root>/apps/.api.stepcache.json`.
    pub fn record_path(root: &Path, target: &str) -> PathBuf {
        let target_dir = root.join(target);
        match (target_dir.parent(), target_dir.file_name()) {
            (Some(parent), Some(name)) => {
                parent.join(format!(".{}.stepcache.json", name.to_string_lossy()))
            }
            _ => root.join(format!(".{}.stepcache.json", target)),
        }
    }

    /// Load the cache for `target`.
    ///
    /// A record whose target directory no longer exists is deleted and an
    /// empty cache is returned.
    pub async fn load(root: &Path, target: &str) -> ScaffoldResult<Self> {
        let record_path = Self::record_path(root, target);
        let target_dir = root.join(target);

        if record_path.exists() && !target_dir.is_dir() {
            info!(
                "Target directory {} is missing, discarding its step cache",
                target_dir.display()
            );
            fs::remove_file(&record_path).await.map_err(|e| {
                ScaffoldError::io(format!("removing stale cache {}", record_path.display()), e)
            })?;
            return Ok(Self::new(target));
        }

        Self::read_record(&record_path, target).await
    }

    /// Like `load`, but never deletes a stale record
    pub async fn read(root: &Path, target: &str) -> ScaffoldResult<Self> {
        if !root.join(target).is_dir() {
            return Ok(Self::new(target));
        }
        Self::read_record(&Self::record_path(root, target), target).await
    }

    async fn read_record(path: &Path, target: &str) -> ScaffoldResult<Self> {
        if !path.exists() {
            debug!("No step cache at {}", path.display());
            return Ok(Self::new(target));
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| ScaffoldError::io(format!("reading cache {}", path.display()), e))?;

        let record: CacheRecord = match serde_json::from_str(&content) {
            Ok(record) => record,
            Err(e) => {
                warn!("Ignoring unreadable step cache {}: {}", path.display(), e);
                return Ok(Self::new(target));
            }
        };

        if record.version != RECORD_VERSION || record.target != target {
            warn!(
                "Ignoring step cache {} (version {}, target {})",
                path.display(),
                record.version,
                record.target
            );
            return Ok(Self::new(target));
        }

        let entries: BTreeMap<_, _> = record
            .steps
            .into_iter()
            .map(|entry| (entry.key, entry.done))
            .collect();
        debug!(
            "Loaded {} cached steps for {} (saved {})",
            entries.len(),
            target,
            record.updated_at
        );

        Ok(Self {
            target: target.to_string(),
            entries,
        })
    }

    /// Persist the full cache, replacing any previous record atomically
    pub async fn save(&self, root: &Path) -> ScaffoldResult<()> {
        let path = Self::record_path(root, &self.target);
        let record = CacheRecord {
            version: RECORD_VERSION,
            target: self.target.clone(),
            updated_at: Utc::now(),
            steps: self
                .entries
                .iter()
                .map(|(key, done)| RecordEntry {
                    key: key.clone(),
                    done: *done,
                })
                .collect(),
        };
        let content = serde_json::to_string_pretty(&record)?;

        let parent = path.parent().unwrap_or(root);
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ScaffoldError::io(format!("creating {}", parent.display()), e))?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .await
            .map_err(|e| ScaffoldError::io(format!("writing cache {}", tmp_path.display()), e))?;
        fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| ScaffoldError::io(format!("replacing cache {}", path.display()), e))?;

        debug!("Saved {} cached steps to {}", self.entries.len(), path.display());
        Ok(())
    }

    /// Target this cache belongs to
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_done(&self, key: &StepKey) -> bool {
        self.entries.get(key).copied().unwrap_or(false)
    }

    pub fn mark_done(&mut self, key: StepKey) {
        self.entries.insert(key, true);
    }

    pub fn is_command_done<S: AsRef<str>>(&self, argv: &[S]) -> bool {
        self.is_done(&StepKey::command(argv))
    }

    pub fn mark_command_done<S: AsRef<str>>(&mut self, argv: &[S]) {
        self.mark_done(StepKey::command(argv));
    }

    pub fn is_file_done(&self, path: impl AsRef<Path>) -> bool {
        self.is_done(&StepKey::file(path))
    }

    pub fn mark_file_done(&mut self, path: impl AsRef<Path>) {
        self.mark_done(StepKey::file(path));
    }

    pub fn is_directory_done(&self, path: impl AsRef<Path>) -> bool {
        self.is_done(&StepKey::directory(path))
    }

    pub fn mark_directory_done(&mut self, path: impl AsRef<Path>) {
        self.mark_done(StepKey::directory(path));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn populated(target: &str) -> StepCache {
        let mut cache = StepCache::new(target);
        cache.mark_command_done(&["npm", "init", "-y"]);
        cache.mark_directory_done("uploads");
        cache.mark_file_done("routes/videos.js");
        cache
    }

    #[test]
    fn record_path_is_adjacent_to_target() {
        let p = StepCache::record_path(Path::new("/work"), "backend");
        assert_eq!(p, PathBuf::from("/work/.backend.stepcache.json"));

        let nested = StepCache::record_path(Path::new("/work"), "apps/api");
        assert_eq!(nested, PathBuf::from("/work/apps/.api.stepcache.json"));
    }

    #[tokio::test]
    async fn nested_target_saves_and_loads() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("apps").join("api")).unwrap();

        populated("apps/api").save(dir.path()).await.unwrap();
        assert!(dir.path().join("apps").join(".api.stepcache.json").is_file());

        let loaded = StepCache::load(dir.path(), "apps/api").await.unwrap();
        assert_eq!(loaded.target(), "apps/api");
        assert!(loaded.is_directory_done("uploads"));
    }

    #[test]
    fn mark_and_query() {
        let cache = populated("backend");
        assert!(cache.is_command_done(&["npm", "init", "-y"]));
        assert!(!cache.is_command_done(&["npm", "init"]));
        assert!(cache.is_directory_done("uploads"));
        assert!(!cache.is_file_done("uploads"));
        assert!(cache.is_file_done("routes/videos.js"));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn key_kinds_do_not_collide() {
        let mut cache = StepCache::new("t");
        cache.mark_file_done("out");
        assert!(!cache.is_directory_done("out"));
        assert!(!cache.is_command_done(&["out"]));
    }

    #[test]
    fn step_key_display() {
        assert_eq!(
            StepKey::command(&["npm", "install"]).to_string(),
            "command `npm install`"
        );
        assert_eq!(StepKey::directory("uploads").to_string(), "directory uploads");
    }

    #[tokio::test]
    async fn load_missing_record_is_empty() {
        let dir = TempDir::new().unwrap();
        let cache = StepCache::load(dir.path(), "backend").await.unwrap();
        assert!(cache.is_empty());
        assert_eq!(cache.target(), "backend");
    }

    #[tokio::test]
    async fn save_and_load() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("backend")).unwrap();

        let cache = populated("backend");
        cache.save(dir.path()).await.unwrap();

        let loaded = StepCache::load(dir.path(), "backend").await.unwrap();
        assert_eq!(loaded, cache);
        assert!(!dir.path().join(".backend.stepcache.json.tmp").exists());
    }

    #[tokio::test]
    async fn stale_record_is_discarded_when_target_missing() {
        let dir = TempDir::new().unwrap();
        populated("backend").save(dir.path()).await.unwrap();
        let record = StepCache::record_path(dir.path(), "backend");
        assert!(record.exists());

        let loaded = StepCache::load(dir.path(), "backend").await.unwrap();
        assert!(loaded.is_empty());
        assert!(!record.exists());
    }

    #[tokio::test]
    async fn read_never_deletes() {
        let dir = TempDir::new().unwrap();
        populated("backend").save(dir.path()).await.unwrap();

        let peeked = StepCache::read(dir.path(), "backend").await.unwrap();
        assert!(peeked.is_empty());
        assert!(StepCache::record_path(dir.path(), "backend").exists());
    }

    #[tokio::test]
    async fn unreadable_record_is_treated_as_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("frontend")).unwrap();
        std::fs::write(StepCache::record_path(dir.path(), "frontend"), "{not json").unwrap();

        let loaded = StepCache::load(dir.path(), "frontend").await.unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn record_for_other_target_is_ignored() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("frontend")).unwrap();
        populated("backend").save(dir.path()).await.unwrap();
        std::fs::rename(
            StepCache::record_path(dir.path(), "backend"),
            StepCache::record_path(dir.path(), "frontend"),
        )
        .unwrap();

        let loaded = StepCache::load(dir.path(), "frontend").await.unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn record_is_tagged_json() {
        let dir = TempDir::new().unwrap();
        populated("backend").save(dir.path()).await.unwrap();

        let raw = std::fs::read_to_string(StepCache::record_path(dir.path(), "backend")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], RECORD_VERSION);
        assert_eq!(value["target"], "backend");
        let kinds: Vec<_> = value["steps"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["key"]["kind"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(kinds, vec!["command", "file", "directory"]);
    }
}
