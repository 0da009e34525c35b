//! Session phase machine.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{OracleError, Result};

/// Where the session is in its lifecycle.
///
/// Phases only move forward, one step at a time:
/// `entry → interrogation → ignition → exploration`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Phase {
    /// Waiting for the problem statement.
    #[default]
    Entry,
    /// Questions are being asked along the five dimensions.
    Interrogation,
    /// Answers confirmed; the map is being generated.
    #[serde(alias = "map_generation")]
    Ignition,
    /// The map exists and can be explored, rewound and forked.
    Exploration,
}

impl Phase {
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Entry => Some(Phase::Interrogation),
            Phase::Interrogation => Some(Phase::Ignition),
            Phase::Ignition => Some(Phase::Exploration),
            Phase::Exploration => None,
        }
    }

    /// Moves one step forward to `target`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPhaseTransition` for regressions, skips, and
    /// self-transitions.
    pub fn advance_to(&mut self, target: Phase) -> Result<()> {
        if self.next() != Some(target) {
            return Err(OracleError::InvalidPhaseTransition {
                from: *self,
                to: target,
            });
        }
        *self = target;
        Ok(())
    }

    /// Requires the session to be in `expected`.
    pub fn expect(self, expected: Phase) -> Result<()> {
        if self == expected {
            Ok(())
        } else {
            Err(OracleError::InvalidPhase {
                expected,
                actual: self,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_steps_only() {
        let mut phase = Phase::Entry;
        phase.advance_to(Phase::Interrogation).unwrap();
        assert!(phase.advance_to(Phase::Exploration).is_err());
        assert!(phase.advance_to(Phase::Entry).is_err());
        assert!(phase.advance_to(Phase::Interrogation).is_err());
        assert_eq!(phase, Phase::Interrogation);

        phase.advance_to(Phase::Ignition).unwrap();
        phase.advance_to(Phase::Exploration).unwrap();
        assert_eq!(phase.next(), None);
    }

    #[test]
    fn test_map_generation_alias() {
        let phase: Phase = serde_json::from_str("\"map_generation\"").unwrap();
        assert_eq!(phase, Phase::Ignition);
        assert_eq!(serde_json::to_string(&Phase::Ignition).unwrap(), "\"ignition\"");
    }

    #[test]
    fn test_expect_reports_both_phases() {
        let err = Phase::Entry.expect(Phase::Exploration).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Operation requires phase 'exploration', session is in 'entry'"
        );
    }
}
