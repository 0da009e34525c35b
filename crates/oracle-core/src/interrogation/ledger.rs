//! Append-only ledger of answered dimensions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::constraint::{Constraint, ConstraintType};
use super::dimension::{Dimension, DimensionCoverage};
use crate::error::{OracleError, Result};

/// Ordered record of every answer given during the session.
///
/// Answers are cumulative: answering the same dimension twice appends a
/// second constraint, while its coverage flag simply stays `true`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintLedger {
    #[serde(default)]
    constraints: Vec<Constraint>,
    #[serde(default)]
    dimension_coverage: DimensionCoverage,
}

impl ConstraintLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an answer given as a wire dimension name.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimension` if `dimension` is not one of the five
    /// fixed dimensions. Nothing is recorded in that case.
    pub fn record_answer(
        &mut self,
        dimension: &str,
        value: impl Into<String>,
        constraint_type: ConstraintType,
    ) -> Result<&Constraint> {
        let dimension = Dimension::parse(dimension)?;
        Ok(self.record(dimension, value, constraint_type))
    }

    /// Records an answer for an already-parsed dimension.
    pub fn record(
        &mut self,
        dimension: Dimension,
        value: impl Into<String>,
        constraint_type: ConstraintType,
    ) -> &Constraint {
        let constraint = Constraint {
            id: Uuid::new_v4().to_string(),
            dimension,
            constraint_type,
            value: value.into(),
            answered_at: chrono::Utc::now().to_rfc3339(),
            timeline_index: self.constraints.len(),
        };
        self.dimension_coverage.mark(dimension);
        self.constraints.push(constraint);
        &self.constraints[self.constraints.len() - 1]
    }

    pub fn is_complete(&self) -> bool {
        self.dimension_coverage.all_covered()
    }

    pub fn coverage(&self) -> &DimensionCoverage {
        &self.dimension_coverage
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Constraint recorded at the given ledger position.
    pub fn at(&self, timeline_index: usize) -> Option<&Constraint> {
        self.constraints.get(timeline_index)
    }

    /// Most recent answer recorded for a dimension.
    pub fn latest_for(&self, dimension: Dimension) -> Option<&Constraint> {
        self.constraints
            .iter()
            .rev()
            .find(|c| c.dimension == dimension)
    }

    /// Checks that a constraint list pushed by the collaborator is ordered
    /// by `timelineIndex` with no gaps.
    pub fn validate_constraints(constraints: &[Constraint]) -> Result<()> {
        let violations: Vec<String> = constraints
            .iter()
            .enumerate()
            .filter(|(position, c)| c.timeline_index != *position)
            .map(|(position, c)| {
                format!(
                    "constraint '{}' has timelineIndex {} at position {}",
                    c.id, c.timeline_index, position
                )
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(OracleError::MalformedPush(violations.join("; ")))
        }
    }

    /// Replaces the constraint list with one pushed by the collaborator.
    ///
    /// Coverage is recomputed from the new list and merged with the existing
    /// flags, so no dimension ever becomes uncovered again.
    pub fn replace_constraints(&mut self, constraints: Vec<Constraint>) -> Result<()> {
        Self::validate_constraints(&constraints)?;
        for constraint in &constraints {
            self.dimension_coverage.mark(constraint.dimension);
        }
        self.constraints = constraints;
        Ok(())
    }

    /// Merges pushed coverage flags. Flags are never cleared.
    pub fn merge_coverage(&mut self, coverage: &DimensionCoverage) {
        self.dimension_coverage.merge(coverage);
    }
}
