// store/ — Storage ports for certificates and accounts
//
// mod.rs    — The traits the services are written against
// memory.rs — In-process store (tests, embedding)
// fs.rs     — One JSON document per record under a data directory
//
// Services receive a store by reference; nothing in the crate reaches for a
// global handle. Stores return records exactly as written: integrity is the
// verifier's job, not the store's.

pub mod fs;
pub mod memory;

use crate::auth::User;
use crate::cert::model::CertificateRecord;
use crate::error::StoreError;

pub use fs::JsonDirStore;
pub use memory::MemoryStore;

pub trait CertificateStore: Send + Sync {
    /// Point lookup by certificate id.
    fn get(&self, id: &str) -> Result<Option<CertificateRecord>, StoreError>;

    /// Point insert. An existing record with the same id is never replaced;
    /// the call fails with `StoreError::Duplicate` instead.
    fn insert(&self, record: &CertificateRecord) -> Result<(), StoreError>;

    /// All records matching `filter`, ordered by id.
    fn scan(
        &self,
        filter: &dyn Fn(&CertificateRecord) -> bool,
    ) -> Result<Vec<CertificateRecord>, StoreError>;
}

pub trait UserStore: Send + Sync {
    fn get_user(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Insert or replace the profile keyed by `user.id`.
    fn put_user(&self, user: &User) -> Result<(), StoreError>;

    /// All profiles matching `filter`, ordered by id.
    fn scan_users(&self, filter: &dyn Fn(&User) -> bool) -> Result<Vec<User>, StoreError>;
}
