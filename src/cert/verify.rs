// verify.rs — Public certificate verification
//
// Fetches the stored record, recomputes its digest from the stored field
// values and compares it with the stored digest.
//
// Outcomes, in order of precedence:
//   NotFound  — no record under that id
//   Tampered  — digest mismatch, whatever the status says
//   Inactive  — digest matches but the record is REVOKED or EXPIRED
//   Authentic — digest matches and the record is VALID
//
// Storage and hash-primitive failures are errors, never verdicts.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cert::digest::{DigestVerifier, Integrity};
use crate::cert::model::{CertificateRecord, CertificateStatus};
use crate::error::VerifyError;
use crate::hash::ContentHasher;
use crate::store::CertificateStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", content = "record", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Authentic(CertificateRecord),
    /// The record is still returned so the viewer can see what it claims.
    Tampered(CertificateRecord),
    Inactive(CertificateRecord),
    NotFound,
}

impl Verdict {
    pub fn is_authentic(&self) -> bool {
        matches!(self, Verdict::Authentic(_))
    }

    pub fn record(&self) -> Option<&CertificateRecord> {
        match self {
            Verdict::Authentic(r) | Verdict::Tampered(r) | Verdict::Inactive(r) => Some(r),
            Verdict::NotFound => None,
        }
    }
}

pub struct CertificateVerifier<'a, H: ContentHasher> {
    certificates: &'a dyn CertificateStore,
    digests: &'a DigestVerifier<H>,
}

impl<'a, H: ContentHasher> CertificateVerifier<'a, H> {
    pub fn new(certificates: &'a dyn CertificateStore, digests: &'a DigestVerifier<H>) -> Self {
        CertificateVerifier {
            certificates,
            digests,
        }
    }

    pub fn verify_certificate(&self, id: &str) -> Result<Verdict, VerifyError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(VerifyError::EmptyId);
        }

        let Some(record) = self.certificates.get(id)? else {
            debug!(id, "no certificate under this id");
            return Ok(Verdict::NotFound);
        };

        let integrity = self.digests.check(&record.hashable_fields(), &record.hash)?;
        let verdict = match (integrity, record.status) {
            (Integrity::Tampered, _) => {
                warn!(id, stored = %record.hash, "integrity mismatch: stored fields do not match digest");
                Verdict::Tampered(record)
            }
            (Integrity::Authentic, CertificateStatus::Valid) => Verdict::Authentic(record),
            (Integrity::Authentic, status) => {
                info!(id, ?status, "certificate is intact but no longer valid");
                Verdict::Inactive(record)
            }
        };
        Ok(verdict)
    }
}
