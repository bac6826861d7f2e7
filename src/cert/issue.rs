// issue.rs — Certificate issuance
//
// Pipeline: authorize issuer → fraud gate → allocate id → apply defaults →
// digest the hashable fields → persist.
//
// The digest is computed over the operator-confirmed values only. The fraud
// report travels with the record but is never hashed.

use chrono::{Datelike, Utc};
use rand::Rng;
use tracing::{info, warn};

use crate::auth::{Authorizer, Role, User};
use crate::cert::digest::DigestVerifier;
use crate::cert::model::{CertificateRecord, CertificateStatus, HashableFields, IssueRequest};
use crate::error::{IssueError, StoreError};
use crate::fraud::{FraudAnalysis, FraudAnalyzer};
use crate::hash::ContentHasher;
use crate::store::CertificateStore;

pub const DEFAULT_UNIVERSITY: &str = "University of Tech";
pub const DEFAULT_DEGREE: &str = "Bachelor";
pub const DEFAULT_PROGRAM: &str = "General";
pub const DEFAULT_GRADUATION_DATE: &str = "2024-01-01";
pub const DEFAULT_FRAUD_THRESHOLD: u8 = 80;

/// Fresh ids are drawn from CERT-<year>-[0, 100000).
const ID_SPACE: u32 = 100_000;
const MAX_ID_ATTEMPTS: usize = 8;

pub struct Issuer<'a, H: ContentHasher> {
    certificates: &'a dyn CertificateStore,
    analyzer: &'a dyn FraudAnalyzer,
    authorizer: &'a Authorizer,
    digests: &'a DigestVerifier<H>,
    fraud_threshold: u8,
}

impl<'a, H: ContentHasher> Issuer<'a, H> {
    pub fn new(
        certificates: &'a dyn CertificateStore,
        analyzer: &'a dyn FraudAnalyzer,
        authorizer: &'a Authorizer,
        digests: &'a DigestVerifier<H>,
    ) -> Self {
        Issuer {
            certificates,
            analyzer,
            authorizer,
            digests,
            fraud_threshold: DEFAULT_FRAUD_THRESHOLD,
        }
    }

    pub fn with_fraud_threshold(mut self, threshold: u8) -> Self {
        self.fraud_threshold = threshold;
        self
    }

    pub fn issue(&self, actor: &User, request: IssueRequest) -> Result<CertificateRecord, IssueError> {
        let issuer = self.authorizer.require_issuer(actor)?;

        if request.student_name.trim().is_empty() {
            return Err(IssueError::MissingStudentName);
        }

        let analysis = match self.analyzer.analyze(&request) {
            Ok(a) => a,
            Err(e) => {
                warn!(error = %e, "fraud analysis unavailable, issuing without score");
                FraudAnalysis::unavailable()
            }
        };
        if analysis.blocks_at(self.fraud_threshold) {
            warn!(
                issuer = %issuer.id,
                score = analysis.score,
                threshold = self.fraud_threshold,
                "issuance blocked by fraud gate"
            );
            return Err(IssueError::FraudBlocked {
                score: analysis.score,
                reasons: analysis.reasons,
            });
        }

        let today = Utc::now().date_naive();
        let today_str = today.format("%Y-%m-%d").to_string();
        let mut rng = rand::thread_rng();
        let student_id = non_blank(request.student_id.clone())
            .unwrap_or_else(|| format!("STU-{}", rng.gen_range(0..1000)));

        for attempt in 1..=MAX_ID_ATTEMPTS {
            let id = format!("CERT-{}-{}", today.year(), rng.gen_range(0..ID_SPACE));
            let fields = hashable_fields(&id, &issuer, &request, &today_str);
            let hash = self.digests.compute_digest(&fields)?;

            let record = CertificateRecord {
                id: fields.id,
                student_name: fields.student_name,
                student_id: student_id.clone(),
                university: fields.university,
                degree: fields.degree,
                program: fields.program,
                gpa: fields.gpa,
                graduation_date: fields.graduation_date,
                issue_date: fields.issue_date,
                verified_by: fields.verified_by,
                additional_data: Some(fields.additional_data),
                hash,
                status: CertificateStatus::Valid,
                issuer_id: issuer.id.clone(),
                fraud_analysis: Some(analysis.clone()),
            };

            match self.certificates.insert(&record) {
                Ok(()) => {
                    info!(
                        id = %record.id,
                        issuer = %issuer.id,
                        hash = %record.hash,
                        fraud_score = analysis.score,
                        "certificate issued"
                    );
                    return Ok(record);
                }
                Err(StoreError::Duplicate(taken)) => {
                    warn!(id = %taken, attempt, "certificate id already taken, drawing another");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(IssueError::IdSpaceExhausted(MAX_ID_ATTEMPTS))
    }
}

/// Resolve the digest-covered fields for a new certificate.
fn hashable_fields(id: &str, issuer: &User, request: &IssueRequest, today: &str) -> HashableFields {
    let university = if issuer.role == Role::Institution {
        Some(issuer.name.clone()).filter(|n| !n.trim().is_empty())
    } else {
        None
    }
    .or_else(|| non_blank(request.university.clone()))
    .unwrap_or_else(|| DEFAULT_UNIVERSITY.to_string());

    HashableFields {
        id: id.to_string(),
        student_name: request.student_name.clone(),
        university,
        degree: or_default(&request.degree, DEFAULT_DEGREE),
        program: or_default(&request.program, DEFAULT_PROGRAM),
        graduation_date: or_default(&request.graduation_date, DEFAULT_GRADUATION_DATE),
        gpa: Some(or_default(&request.gpa, "")),
        issue_date: or_default(&request.issue_date, today),
        verified_by: Some(or_default(&request.verified_by, "")),
        additional_data: request.additional_data.clone(),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn or_default(value: &Option<String>, default: &str) -> String {
    non_blank(value.clone()).unwrap_or_else(|| default.to_string())
}
