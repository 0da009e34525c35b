//! Timeline branching module.
//!
//! The main timeline always exists under the reserved id `"main"`. At most
//! one fork may exist beside it.
//!
//! - `model`: A fork timeline (`Branch`)
//! - `manager`: Ownership of all timelines and the active pointer (`BranchManager`)

mod manager;
mod model;

#[cfg(test)]
mod manager_test;

pub use manager::{BranchManager, MAIN_BRANCH_ID, MAX_FORKS};
pub use model::Branch;
