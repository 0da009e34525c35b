//! Interrogation domain module.
//!
//! # Module Structure
//!
//! - `dimension`: The fixed questioning axes and their coverage (`Dimension`, `DimensionCoverage`)
//! - `constraint`: Recorded answers (`Constraint`, `ConstraintType`)
//! - `ledger`: Append-only constraint ledger (`ConstraintLedger`)

mod constraint;
mod dimension;
mod ledger;

pub use constraint::{Constraint, ConstraintType};
pub use dimension::{Dimension, DimensionCoverage};
pub use ledger::ConstraintLedger;
