// listing.rs — Student certificate listing
//
// Equality scan on studentId, gated by role: students see their own
// certificates, admins see anyone's.

use tracing::debug;

use crate::auth::{Authorizer, User};
use crate::cert::model::CertificateRecord;
use crate::error::AuthError;
use crate::store::CertificateStore;

/// Certificates held by one student, ordered by certificate id.
///
/// Students may only list their own student id; admins may list any.
pub fn certificates_for_student(
    certificates: &dyn CertificateStore,
    authorizer: &Authorizer,
    actor: &User,
    student_id: &str,
) -> Result<Vec<CertificateRecord>, AuthError> {
    authorizer.require_student_access(actor, student_id)?;
    let records = certificates.scan(&|r| r.student_id == student_id)?;
    debug!(student_id, count = records.len(), "listed student certificates");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AccountStatus, AdminAllowList, Role};
    use crate::cert::model::CertificateStatus;
    use crate::store::MemoryStore;

    fn record(id: &str, student_id: &str) -> CertificateRecord {
        CertificateRecord {
            id: id.into(),
            student_name: "Jane Doe".into(),
            student_id: student_id.into(),
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
            issuer_id: "inst-1".into(),
            fraud_analysis: None,
        }
    }

    fn account(role: Role, email: &str, student_id: Option<&str>) -> User {
        User {
            id: format!("{:?}", role).to_lowercase(),
            name: "someone".into(),
            email: email.into(),
            role,
            status: AccountStatus::Active,
            student_id: student_id.map(str::to_string),
            mobile_number: None,
            institution_details: None,
        }
    }

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert(&record("CERT-2024-2", "STU-1")).unwrap();
        store.insert(&record("CERT-2024-1", "STU-1")).unwrap();
        store.insert(&record("CERT-2024-3", "STU-2")).unwrap();
        store
    }

    #[test]
    fn student_lists_own_certificates() {
        let store = seeded();
        let auth = Authorizer::default();
        let jane = account(Role::Student, "jane@student.example", Some("STU-1"));
        let ids: Vec<_> = certificates_for_student(&store, &auth, &jane, "STU-1")
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["CERT-2024-1", "CERT-2024-2"]);
    }

    #[test]
    fn student_cannot_list_others() {
        let store = seeded();
        let auth = Authorizer::default();
        let jane = account(Role::Student, "jane@student.example", Some("STU-1"));
        assert!(matches!(
            certificates_for_student(&store, &auth, &jane, "STU-2"),
            Err(AuthError::Forbidden { .. })
        ));
    }

    #[test]
    fn admin_lists_anyone() {
        let store = seeded();
        let auth = Authorizer::new(AdminAllowList::new(["root@registry.example"]));
        // Allow-listed verifier account is treated as admin.
        let root = account(Role::Verifier, "root@registry.example", None);
        assert_eq!(
            certificates_for_student(&store, &auth, &root, "STU-2").unwrap().len(),
            1
        );
    }
}
