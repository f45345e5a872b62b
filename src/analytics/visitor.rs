//! Day-scoped visitor fingerprinting
//!
//! A visitor is identified by the first 16 hex characters of
//! `SHA-256(day_salt(day) ":" ip)`. The salt is a pure function of the UTC
//! calendar day, so the fingerprint is stable for one IP within a day and
//! rotates at midnight. No raw IP is ever stored and no reverse mapping
//! exists. A visitor active across a UTC midnight boundary counts as two
//! uniques; that is accepted behavior, not a bug.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

const SALT_NAMESPACE: &str = "linkpulse-visitor";

/// Length of the stored fingerprint in hex characters.
pub const HASH_LEN: usize = 16;

/// Salt string for one UTC calendar day. Deterministic and not secret;
/// its only job is partitioning fingerprints by day.
pub fn day_salt(day: NaiveDate) -> String {
    format!("{}:{}", SALT_NAMESPACE, day.format("%Y-%m-%d"))
}

/// Derive the visitor fingerprint for a client IP on a given UTC day.
pub fn hash_visitor(ip: &str, day: NaiveDate) -> String {
    let digest = Sha256::digest(format!("{}:{}", day_salt(day), ip).as_bytes());
    digest
        .iter()
        .take(HASH_LEN / 2)
        .map(|b| format!("{:02x}", b))
        .collect()
}
