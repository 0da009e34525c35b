use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::dimension::Dimension;

/// Qualitative weight of a recorded answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ConstraintType {
    /// Rules whole regions of the solution space out.
    Eliminator,
    /// Bends the solution space without removing anything.
    #[default]
    Shaper,
    /// A fixed point every solution must respect.
    Anchor,
}

/// A single answered question. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    pub id: String,
    pub dimension: Dimension,
    #[serde(rename = "type")]
    pub constraint_type: ConstraintType,
    pub value: String,
    /// Timestamp when the answer was recorded (ISO 8601 format)
    pub answered_at: String,
    /// Position in the ledger, equal to insertion order
    pub timeline_index: usize,
}
