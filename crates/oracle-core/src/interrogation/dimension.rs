//! The fixed set of questioning dimensions.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::{OracleError, Result};

/// One of the five axes the user's problem is interrogated along.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Dimension {
    Resources,
    Timeline,
    RiskTolerance,
    Market,
    FounderContext,
}

impl Dimension {
    /// Parses a wire name such as `"riskTolerance"`.
    pub fn parse(value: &str) -> Result<Self> {
        Self::from_str(value.trim()).map_err(|_| OracleError::InvalidDimension(value.to_string()))
    }

    /// All dimensions in canonical order.
    pub fn all() -> impl Iterator<Item = Dimension> {
        Self::iter()
    }
}

/// Which dimensions have received at least one answer.
///
/// Flags only ever move from `false` to `true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DimensionCoverage {
    pub resources: bool,
    pub timeline: bool,
    pub risk_tolerance: bool,
    pub market: bool,
    pub founder_context: bool,
}

impl DimensionCoverage {
    pub fn is_covered(&self, dimension: Dimension) -> bool {
        match dimension {
            Dimension::Resources => self.resources,
            Dimension::Timeline => self.timeline,
            Dimension::RiskTolerance => self.risk_tolerance,
            Dimension::Market => self.market,
            Dimension::FounderContext => self.founder_context,
        }
    }

    /// Marks a dimension as covered.
    pub fn mark(&mut self, dimension: Dimension) {
        let flag = match dimension {
            Dimension::Resources => &mut self.resources,
            Dimension::Timeline => &mut self.timeline,
            Dimension::RiskTolerance => &mut self.risk_tolerance,
            Dimension::Market => &mut self.market,
            Dimension::FounderContext => &mut self.founder_context,
        };
        *flag = true;
    }

    /// Folds another coverage record into this one without clearing any flag.
    pub fn merge(&mut self, other: &DimensionCoverage) {
        for dimension in Dimension::all().filter(|d| other.is_covered(*d)) {
            self.mark(dimension);
        }
    }

    pub fn all_covered(&self) -> bool {
        Dimension::all().all(|d| self.is_covered(d))
    }

    /// Dimensions still waiting for an answer, in canonical order.
    pub fn uncovered(&self) -> Vec<Dimension> {
        Dimension::all().filter(|d| !self.is_covered(*d)).collect()
    }

    pub fn covered_count(&self) -> usize {
        Dimension::all().filter(|d| self.is_covered(*d)).count()
    }
}
