//! # promora-types
//!
//! Shared entity types for the Promora marketplace core.
//!
//! All monetary amounts are integer paise (minor currency units); all
//! timestamps are Unix epoch seconds. Status fields are closed enums that
//! round-trip through their `snake_case` string form for storage.
//!
//! ## Modules
//!
//! - [`campaign`] — campaigns and their budget account
//! - [`ledger`] — append-only ledger entries
//! - [`submission`] — participations, submissions, verification records
//! - [`payout`] — payout batches and their line items

pub mod campaign;
pub mod ledger;
pub mod payout;
pub mod submission;

/// Error raised when decoding a stored enum string.
#[derive(Debug, thiserror::Error)]
#[error("unknown {field} value: {value}")]
pub struct UnknownValue {
    /// The field being decoded.
    pub field: &'static str,
    /// The offending stored value.
    pub value: String,
}

/// Generate a fresh entity id: 16 random bytes, hex-encoded.
pub fn new_id() -> String {
    let mut bytes = [0u8; 16];
    rand::RngCore::fill_bytes(&mut rand::rngs::OsRng, &mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_format() {
        let id = new_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_new_id_unique() {
        assert_ne!(new_id(), new_id());
    }
}
