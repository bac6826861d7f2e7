// cert/ — Certificate integrity core and the services around it
//
// model.rs     — Record, hashable field set, issuance request (serde)
// canonical.rs — Deterministic JSON of the hashable field set
// digest.rs    — SHA-256 digest and integrity comparison
// issue.rs     — Issuance: authorize, fraud gate, defaults, digest, persist
// verify.rs    — Verification: lookup, recompute, verdict
// listing.rs   — Student certificate listing

pub mod canonical;
pub mod digest;
pub mod issue;
pub mod listing;
pub mod model;
pub mod verify;
