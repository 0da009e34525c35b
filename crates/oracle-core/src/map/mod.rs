//! Solution map domain module.
//!
//! - `model`: The node/edge graph (`MapState`, `OracleNode`, `OracleEdge`)
//! - `validate`: Tree invariant checks applied to every map accepted from the collaborator

mod model;
mod validate;

pub use model::{MapState, NodeCategory, OracleEdge, OracleNode, Position};
pub use validate::{map_violations, validate_map};
