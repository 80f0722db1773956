//! Query functions, one module per table group.

pub mod audit;
pub mod campaigns;
pub mod ledger;
pub mod participations;
pub mod payouts;
pub mod submissions;
pub mod verifications;

use promora_types::UnknownValue;

/// Decode a stored enum column inside a `query_map` closure, converting a
/// bad stored value into a rusqlite conversion failure.
pub(crate) fn parse_col<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = UnknownValue>,
{
    value.parse().map_err(|e: UnknownValue| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Decode a JSON-valued column inside a `query_map` closure.
pub(crate) fn parse_json_col<T>(idx: usize, value: &str) -> rusqlite::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
