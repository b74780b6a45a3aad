// snippet-service/src/utils/snippet_store.rs
//
// Data store handle: users, snippets and snippet version history as JSON
// rows on disk, one file per row. The handle is constructed once in main
// (or over a temp dir in tests) and injected into the engine, so there is
// no process-wide storage path.
use crate::models::{ServiceError, Snippet, SnippetVersion, User};
use chrono::Utc;
use log::{debug, error, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub struct SnippetStore {
    data_dir: PathBuf,
    // Serializes mutations so a parent-row write and its history write land
    // as one unit, and usage counters never lose an increment
    write_lock: Mutex<()>,
}

impl SnippetStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, ServiceError> {
        let store = SnippetStore {
            data_dir: data_dir.into(),
            write_lock: Mutex::new(()),
        };

        for dir in [store.users_dir(), store.snippets_dir(), store.versions_dir()] {
            fs::create_dir_all(&dir).map_err(|e| {
                error!("Failed to create store directory {:?}: {:?}", dir, e);
                ServiceError::InternalServerError
            })?;
        }

        Ok(store)
    }

    fn users_dir(&self) -> PathBuf {
        self.data_dir.join("users")
    }

    fn snippets_dir(&self) -> PathBuf {
        self.data_dir.join("snippets")
    }

    fn versions_dir(&self) -> PathBuf {
        self.data_dir.join("versions")
    }

    fn user_path(&self, id: &str) -> PathBuf {
        self.users_dir().join(format!("{}.json", id))
    }

    fn snippet_path(&self, id: &str) -> PathBuf {
        self.snippets_dir().join(format!("{}.json", id))
    }

    fn snippet_versions_dir(&self, snippet_id: &str) -> PathBuf {
        self.versions_dir().join(snippet_id)
    }

    fn version_path(&self, snippet_id: &str, version: u32) -> PathBuf {
        self.snippet_versions_dir(snippet_id).join(format!("{}.json", version))
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, ServiceError> {
        self.write_lock.lock().map_err(|e| {
            error!("Store write lock poisoned: {:?}", e);
            ServiceError::InternalServerError
        })
    }

    // ---- users ----

    pub fn save_user(&self, user: &User) -> Result<(), ServiceError> {
        let json = serde_json::to_string_pretty(user).map_err(|e| {
            error!("Failed to serialize user: {:?}", e);
            ServiceError::InternalServerError
        })?;

        fs::write(self.user_path(&user.id), json).map_err(|e| {
            error!("Failed to save user: {:?}", e);
            ServiceError::InternalServerError
        })
    }

    pub fn find_user_by_id(&self, id: &str) -> Result<Option<User>, ServiceError> {
        read_row(&self.user_path(id))
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        for user in self.list_users()? {
            if user.email.eq_ignore_ascii_case(email) {
                return Ok(Some(user));
            }
        }
        Ok(None)
    }

    pub fn list_users(&self) -> Result<Vec<User>, ServiceError> {
        scan_rows(&self.users_dir())
    }

    // ---- snippets ----

    pub fn find_snippet_by_id(&self, id: &str) -> Result<Option<Snippet>, ServiceError> {
        read_row(&self.snippet_path(id))
    }

    pub fn list_snippets(&self) -> Result<Vec<Snippet>, ServiceError> {
        scan_rows(&self.snippets_dir())
    }

    pub fn save_snippet(&self, snippet: &Snippet) -> Result<(), ServiceError> {
        let _guard = self.lock_writes()?;
        self.write_snippet_row(snippet)
    }

    // Persist a snippet row together with its new version snapshot. Both
    // writes happen under the write lock; if the parent write fails, the
    // just-written snapshot is removed so no orphaned version row remains.
    pub fn save_snippet_with_version(
        &self,
        snippet: &Snippet,
        version: &SnippetVersion,
    ) -> Result<(), ServiceError> {
        let _guard = self.lock_writes()?;

        self.write_version_row(version)?;

        if let Err(e) = self.write_snippet_row(snippet) {
            let _ = fs::remove_file(self.version_path(&version.snippet_id, version.version));
            return Err(e);
        }

        Ok(())
    }

    // Hard delete: removes the snippet row and all of its version rows.
    // Returns false when the id does not exist.
    pub fn delete_snippet(&self, id: &str) -> Result<bool, ServiceError> {
        let _guard = self.lock_writes()?;

        let row_path = self.snippet_path(id);
        if !row_path.exists() {
            return Ok(false);
        }

        fs::remove_file(&row_path).map_err(|e| {
            error!("Failed to delete snippet row: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let versions_dir = self.snippet_versions_dir(id);
        if versions_dir.exists() {
            fs::remove_dir_all(&versions_dir).map_err(|e| {
                error!("Failed to delete version rows for snippet {}: {:?}", id, e);
                ServiceError::InternalServerError
            })?;
        }

        Ok(true)
    }

    // Bump usage_count and stamp last_used_at under the write lock so two
    // concurrent insertions both count
    pub fn record_usage(&self, id: &str) -> Result<bool, ServiceError> {
        let _guard = self.lock_writes()?;

        let mut snippet = match read_row::<Snippet>(&self.snippet_path(id))? {
            Some(snippet) => snippet,
            None => return Ok(false),
        };

        snippet.usage_count += 1;
        snippet.last_used_at = Some(Utc::now());
        self.write_snippet_row(&snippet)?;

        Ok(true)
    }

    fn write_snippet_row(&self, snippet: &Snippet) -> Result<(), ServiceError> {
        // Owner enrichment is response-only, never persisted
        let mut row = snippet.clone();
        row.owner_name = None;
        row.owner_email = None;

        let json = serde_json::to_string_pretty(&row).map_err(|e| {
            error!("Failed to serialize snippet: {:?}", e);
            ServiceError::InternalServerError
        })?;

        debug!("Writing snippet row: {}", row.id);
        fs::write(self.snippet_path(&row.id), json).map_err(|e| {
            error!("Failed to write snippet row: {:?}", e);
            ServiceError::InternalServerError
        })
    }

    // ---- version history ----

    pub fn list_versions(&self, snippet_id: &str) -> Result<Vec<SnippetVersion>, ServiceError> {
        let dir = self.snippet_versions_dir(snippet_id);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut versions: Vec<SnippetVersion> = scan_rows(&dir)?;
        versions.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(versions)
    }

    fn write_version_row(&self, version: &SnippetVersion) -> Result<(), ServiceError> {
        let dir = self.snippet_versions_dir(&version.snippet_id);
        fs::create_dir_all(&dir).map_err(|e| {
            error!("Failed to create version directory: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let json = serde_json::to_string_pretty(version).map_err(|e| {
            error!("Failed to serialize version: {:?}", e);
            ServiceError::InternalServerError
        })?;

        debug!("Writing version row: snippet_id={}, version={}", version.snippet_id, version.version);
        fs::write(self.version_path(&version.snippet_id, version.version), json).map_err(|e| {
            error!("Failed to write version row: {:?}", e);
            ServiceError::InternalServerError
        })
    }
}

// Read one JSON row, None if the file does not exist
fn read_row<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, ServiceError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| {
        error!("Failed to read row file {:?}: {:?}", path, e);
        ServiceError::InternalServerError
    })?;

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| {
            error!("Failed to parse row file {:?}: {:?}", path, e);
            ServiceError::InternalServerError
        })
}

// Scan a table directory, skipping rows that fail to parse
fn scan_rows<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>, ServiceError> {
    let mut rows = Vec::new();

    for entry in fs::read_dir(dir).map_err(|e| {
        error!("Failed to read table directory {:?}: {:?}", dir, e);
        ServiceError::InternalServerError
    })? {
        let entry = entry.map_err(|e| {
            error!("Failed to read directory entry: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let path = entry.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
            let content = fs::read_to_string(&path).map_err(|e| {
                error!("Failed to read row file {:?}: {:?}", path, e);
                ServiceError::InternalServerError
            })?;

            match serde_json::from_str(&content) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!("Skipping unparseable row file {:?}: {:?}", path, e);
                }
            }
        }
    }

    Ok(rows)
}
