// fraud.rs — Fraud scoring port consulted before issuance
//
// The scoring service itself is external. The issuer only needs a score,
// a suspicious flag and human-readable reasons. The report is stored with
// the certificate but is never part of the hashed content.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cert::model::IssueRequest;
use crate::error::AnalyzerError;

pub const MAX_SCORE: u8 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudAnalysis {
    /// 0 is safe, 100 is fraud. Fractional scores are kept as given.
    pub score: f64,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub is_suspicious: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_confidence: Option<f64>,
}

impl FraudAnalysis {
    /// The report recorded when no analysis could be obtained.
    pub fn unavailable() -> Self {
        FraudAnalysis {
            score: 0.0,
            reasons: vec!["AI Service Unavailable".to_string()],
            is_suspicious: false,
            ai_confidence: None,
        }
    }

    /// Whether this report blocks issuance at the given threshold.
    pub fn blocks_at(&self, threshold: u8) -> bool {
        self.is_suspicious && self.score > f64::from(threshold)
    }
}

pub trait FraudAnalyzer: Send + Sync {
    fn analyze(&self, request: &IssueRequest) -> Result<FraudAnalysis, AnalyzerError>;
}

/// Used when no scoring service is configured. Always unavailable.
#[derive(Debug, Default)]
pub struct OfflineAnalyzer;

impl FraudAnalyzer for OfflineAnalyzer {
    fn analyze(&self, _request: &IssueRequest) -> Result<FraudAnalysis, AnalyzerError> {
        Err(AnalyzerError::Unavailable(
            "no fraud analysis service configured".to_string(),
        ))
    }
}

/// Replays a report produced out of band (e.g. saved from the scoring
/// service) for the request being issued.
#[derive(Debug)]
pub struct ReportFileAnalyzer {
    path: PathBuf,
}

impl ReportFileAnalyzer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ReportFileAnalyzer { path: path.into() }
    }
}

impl FraudAnalyzer for ReportFileAnalyzer {
    fn analyze(&self, _request: &IssueRequest) -> Result<FraudAnalysis, AnalyzerError> {
        let data = fs::read_to_string(&self.path).map_err(|e| {
            AnalyzerError::Unavailable(format!("reading {}: {}", self.path.display(), e))
        })?;
        parse_report(&data)
    }
}

/// Parse a report returned by the scoring service.
///
/// Scores outside 0-100 are clamped into range, never rejected, so a
/// suspicious report always reaches the gate.
pub fn parse_report(data: &str) -> Result<FraudAnalysis, AnalyzerError> {
    let mut report: FraudAnalysis =
        serde_json::from_str(data).map_err(|e| AnalyzerError::Malformed(e.to_string()))?;
    if report.score.is_nan() {
        return Err(AnalyzerError::Malformed("score is not a number".to_string()));
    }
    report.score = report.score.clamp(0.0, f64::from(MAX_SCORE));
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn blocks_only_when_suspicious_and_above_threshold() {
        let mut r = FraudAnalysis {
            score: 81.0,
            reasons: vec![],
            is_suspicious: true,
            ai_confidence: None,
        };
        assert!(r.blocks_at(80));
        r.score = 80.0;
        assert!(!r.blocks_at(80));
        r.score = 80.5;
        assert!(r.blocks_at(80));
        r.score = 99.0;
        r.is_suspicious = false;
        assert!(!r.blocks_at(80));
    }

    #[test]
    fn unavailable_report_never_blocks() {
        assert!(!FraudAnalysis::unavailable().blocks_at(0));
    }

    #[test]
    fn parse_keeps_fractional_scores() {
        let report = parse_report(r#"{"score":92.5,"reasons":[],"isSuspicious":true}"#).unwrap();
        assert_eq!(report.score, 92.5);
        assert!(report.blocks_at(80));
    }

    #[test]
    fn parse_clamps_out_of_range_scores() {
        let high = parse_report(r#"{"score":150,"reasons":[],"isSuspicious":true}"#).unwrap();
        assert_eq!(high.score, 100.0);
        assert!(high.blocks_at(80));
        let low = parse_report(r#"{"score":-3,"reasons":[],"isSuspicious":false}"#).unwrap();
        assert_eq!(low.score, 0.0);
    }

    #[test]
    fn parse_rejects_non_json() {
        let err = parse_report("score: high").unwrap_err();
        assert!(matches!(err, AnalyzerError::Malformed(_)));
    }

    #[test]
    fn report_file_is_replayed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"score":91,"reasons":["seal mismatch"],"isSuspicious":true,"aiConfidence":0.7}}"#
        )
        .unwrap();
        let analyzer = ReportFileAnalyzer::new(file.path());
        let report = analyzer.analyze(&IssueRequest::default()).unwrap();
        assert_eq!(report.score, 91.0);
        assert_eq!(report.reasons, vec!["seal mismatch".to_string()]);
        assert_eq!(report.ai_confidence, Some(0.7));
    }

    #[test]
    fn offline_analyzer_is_unavailable() {
        let err = OfflineAnalyzer.analyze(&IssueRequest::default()).unwrap_err();
        assert!(matches!(err, AnalyzerError::Unavailable(_)));
    }
}
