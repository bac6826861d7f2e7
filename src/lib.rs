//! certledger — academic certificate issuance and tamper-evident verification.
//!
//! A certificate's digest is SHA-256 over a canonical JSON rendering of its
//! hashable fields. Verification recomputes the digest from the stored
//! fields and compares it with the digest stored at issuance; any edit to a
//! hashed field shows up as a mismatch.
//!
//! ```
//! use certledger::cert::digest::{compute_digest, verify};
//! use certledger::cert::model::HashableFields;
//!
//! let mut fields = HashableFields {
//!     id: "CERT-2024-1".into(),
//!     student_name: "Jane Doe".into(),
//!     ..HashableFields::default()
//! };
//! let digest = compute_digest(&fields).unwrap();
//! assert!(verify(&fields, &digest).unwrap());
//!
//! fields.student_name = "Jane D. Doe".into();
//! assert!(!verify(&fields, &digest).unwrap());
//! ```

pub mod auth;
pub mod cert;
pub mod config;
pub mod error;
pub mod fraud;
pub mod hash;
pub mod store;
