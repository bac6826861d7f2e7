use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::auth::User;
use crate::cert::model::CertificateRecord;
use crate::error::StoreError;
use crate::store::{CertificateStore, UserStore};

/// Both collections held in memory behind `RwLock`s.
#[derive(Debug, Default)]
pub struct MemoryStore {
    certificates: RwLock<BTreeMap<String, CertificateRecord>>,
    users: RwLock<BTreeMap<String, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read()
        .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write()
        .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
}

impl CertificateStore for MemoryStore {
    fn get(&self, id: &str) -> Result<Option<CertificateRecord>, StoreError> {
        Ok(read(&self.certificates)?.get(id).cloned())
    }

    fn insert(&self, record: &CertificateRecord) -> Result<(), StoreError> {
        let mut certs = write(&self.certificates)?;
        if certs.contains_key(&record.id) {
            return Err(StoreError::Duplicate(record.id.clone()));
        }
        certs.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn scan(
        &self,
        filter: &dyn Fn(&CertificateRecord) -> bool,
    ) -> Result<Vec<CertificateRecord>, StoreError> {
        Ok(read(&self.certificates)?
            .values()
            .filter(|r| filter(*r))
            .cloned()
            .collect())
    }
}

impl UserStore for MemoryStore {
    fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(read(&self.users)?.get(id).cloned())
    }

    fn put_user(&self, user: &User) -> Result<(), StoreError> {
        write(&self.users)?.insert(user.id.clone(), user.clone());
        Ok(())
    }

    fn scan_users(&self, filter: &dyn Fn(&User) -> bool) -> Result<Vec<User>, StoreError> {
        Ok(read(&self.users)?
            .values()
            .filter(|u| filter(*u))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::model::CertificateStatus;

    fn record(id: &str, student: &str) -> CertificateRecord {
        CertificateRecord {
            id: id.into(),
            student_name: "Jane Doe".into(),
            student_id: student.into(),
            university: "Tech U".into(),
            degree: "BSc".into(),
            program: "CS".into(),
            gpa: None,
            graduation_date: "2024-05-01".into(),
            issue_date: "2024-05-02".into(),
            verified_by: None,
            additional_data: None,
            hash: "0".repeat(64),
            status: CertificateStatus::Valid,
            issuer_id: "inst".into(),
            fraud_analysis: None,
        }
    }

    #[test]
    fn duplicate_insert_keeps_original() {
        let store = MemoryStore::new();
        store.insert(&record("CERT-1", "STU-1")).unwrap();
        let err = store.insert(&record("CERT-1", "STU-2")).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(ref id) if id == "CERT-1"));
        assert_eq!(store.get("CERT-1").unwrap().unwrap().student_id, "STU-1");
    }

    #[test]
    fn scan_filters_and_orders_by_id() {
        let store = MemoryStore::new();
        store.insert(&record("CERT-3", "STU-1")).unwrap();
        store.insert(&record("CERT-1", "STU-1")).unwrap();
        store.insert(&record("CERT-2", "STU-2")).unwrap();
        let ids: Vec<_> = store
            .scan(&|r| r.student_id == "STU-1")
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["CERT-1", "CERT-3"]);
    }
}
