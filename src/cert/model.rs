use serde::{Deserialize, Serialize};

use crate::fraud::FraudAnalysis;

// ── Certificate ─────────────────────────────────────────────────────────────

/// A free-form metadata entry attached by the issuing institution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataPair {
    pub key: String,
    pub value: String,
}

impl MetadataPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        MetadataPair {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateStatus {
    Valid,
    Revoked,
    Expired,
}

/// A persisted certificate, as stored and as read back for verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRecord {
    pub id: String,
    pub student_name: String,
    pub student_id: String,
    pub university: String,
    pub degree: String,
    pub program: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
    pub graduation_date: String,
    pub issue_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_data: Option<Vec<MetadataPair>>,
    pub hash: String,
    pub status: CertificateStatus,
    pub issuer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraud_analysis: Option<FraudAnalysis>,
}

impl CertificateRecord {
    /// The subset of this record covered by its digest.
    pub fn hashable_fields(&self) -> HashableFields {
        HashableFields {
            id: self.id.clone(),
            student_name: self.student_name.clone(),
            university: self.university.clone(),
            degree: self.degree.clone(),
            program: self.program.clone(),
            graduation_date: self.graduation_date.clone(),
            gpa: self.gpa.clone(),
            issue_date: self.issue_date.clone(),
            verified_by: self.verified_by.clone(),
            additional_data: self.additional_data.clone().unwrap_or_default(),
        }
    }
}

/// Exactly the fields that participate in the certificate digest.
///
/// Adding or removing a field here changes every digest ever issued, so
/// previously issued certificates would stop verifying.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashableFields {
    pub id: String,
    pub student_name: String,
    pub university: String,
    pub degree: String,
    pub program: String,
    pub graduation_date: String,
    #[serde(default)]
    pub gpa: Option<String>,
    pub issue_date: String,
    #[serde(default)]
    pub verified_by: Option<String>,
    #[serde(default)]
    pub additional_data: Vec<MetadataPair>,
}

// ── Issuance request ────────────────────────────────────────────────────────

/// Operator-confirmed form values submitted for issuance.
///
/// Every field except `student_name` may be left blank; the issuer fills in
/// defaults. Blank strings are treated the same as absent values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssueRequest {
    pub student_name: String,
    pub student_id: Option<String>,
    pub university: Option<String>,
    pub degree: Option<String>,
    pub program: Option<String>,
    pub graduation_date: Option<String>,
    pub gpa: Option<String>,
    pub issue_date: Option<String>,
    pub verified_by: Option<String>,
    pub additional_data: Vec<MetadataPair>,
}
