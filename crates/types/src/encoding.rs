//! On-disk encoding tag for stored attributes

use serde::Serialize;

/// Which storage representation a stored attribute was read from.
///
/// Kept as one tagged variant rather than independent booleans so every
/// code path has to handle all three states exhaustively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// No attribute was present.
    #[default]
    None,
    /// Two separate text entries: hex digest and dotted decimal timestamp.
    Legacy,
    /// One binary entry packing the raw digest and the timestamp string.
    Combined,
}
