// fs.rs — JSON-directory store
//
// Layout under the data directory:
//   certificates/<id>.json  — one CertificateRecord per file
//   users/<id>.json         — one User per file
//
// Files are pretty-printed for humans. A certificate is written to a temp
// file in the same directory and hard-linked into place, so an existing id
// is never overwritten even when two processes race on the same id, and a
// failed write never leaves a partial record under the final name.

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::auth::User;
use crate::cert::model::CertificateRecord;
use crate::error::StoreError;
use crate::store::{CertificateStore, UserStore};

const CERTIFICATES_DIR: &str = "certificates";
const USERS_DIR: &str = "users";

#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        JsonDirStore { root: root.into() }
    }

    fn path_for(&self, collection: &str, key: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_key(key) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(collection).join(format!("{}.json", key)))
    }

    fn ensure_dir(&self, collection: &str) -> Result<PathBuf, StoreError> {
        let dir = self.root.join(collection);
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(dir)
    }

    fn load<T: DeserializeOwned>(&self, collection: &str, key: &str) -> Result<Option<T>, StoreError> {
        // A key that could never have been written cannot exist.
        let path = match self.path_for(collection, key) {
            Ok(p) => p,
            Err(StoreError::InvalidKey(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        match fs::read_to_string(&path) {
            Ok(data) => parse(&path, &data).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn scan_collection<T: DeserializeOwned>(
        &self,
        collection: &str,
        filter: &dyn Fn(&T) -> bool,
    ) -> Result<Vec<T>, StoreError> {
        let dir = self.root.join(collection);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path: dir, source }),
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut out = Vec::new();
        for path in paths {
            let data = fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            let item: T = parse(&path, &data)?;
            if filter(&item) {
                out.push(item);
            }
        }
        debug!(collection, matched = out.len(), "scanned {}", dir.display());
        Ok(out)
    }
}

fn parse<T: DeserializeOwned>(path: &Path, data: &str) -> Result<T, StoreError> {
    serde_json::from_str(data).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

fn to_pretty<T: Serialize>(path: &Path, value: &T) -> Result<String, StoreError> {
    serde_json::to_string_pretty(value).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Create `path` with the bytes written by `fill`. Fails with AlreadyExists
/// when `path` is taken. Temp files start with '.' and end in .tmp, so scans
/// never see them.
fn create_new_with<F>(path: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp = dir.join(format!(".{}.tmp", Uuid::new_v4()));
    let result = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp)
        .and_then(|mut file| {
            fill(&mut file)?;
            file.sync_all()
        })
        .and_then(|()| fs::hard_link(&tmp, path));
    if let Err(e) = fs::remove_file(&tmp) {
        if e.kind() != ErrorKind::NotFound {
            debug!(error = %e, "leftover temp file {}", tmp.display());
        }
    }
    result
}

/// Keys become file names, so only a conservative character set is allowed.
fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl CertificateStore for JsonDirStore {
    fn get(&self, id: &str) -> Result<Option<CertificateRecord>, StoreError> {
        self.load(CERTIFICATES_DIR, id)
    }

    fn insert(&self, record: &CertificateRecord) -> Result<(), StoreError> {
        let path = self.path_for(CERTIFICATES_DIR, &record.id)?;
        self.ensure_dir(CERTIFICATES_DIR)?;
        let json = to_pretty(&path, record)?;

        match create_new_with(&path, |file| file.write_all(json.as_bytes())) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(StoreError::Duplicate(record.id.clone()))
            }
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn scan(
        &self,
        filter: &dyn Fn(&CertificateRecord) -> bool,
    ) -> Result<Vec<CertificateRecord>, StoreError> {
        let mut records = self.scan_collection(CERTIFICATES_DIR, filter)?;
        // File-name order differs from id order only around '.' vs other chars.
        records.sort_by(|a: &CertificateRecord, b| a.id.cmp(&b.id));
        Ok(records)
    }
}

impl UserStore for JsonDirStore {
    fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        self.load(USERS_DIR, id)
    }

    fn put_user(&self, user: &User) -> Result<(), StoreError> {
        let path = self.path_for(USERS_DIR, &user.id)?;
        self.ensure_dir(USERS_DIR)?;
        let json = to_pretty(&path, user)?;
        fs::write(&path, json).map_err(|source| StoreError::Io { path, source })
    }

    fn scan_users(&self, filter: &dyn Fn(&User) -> bool) -> Result<Vec<User>, StoreError> {
        let mut users = self.scan_collection(USERS_DIR, filter)?;
        users.sort_by(|a: &User, b| a.id.cmp(&b.id));
        Ok(users)
    }
}
