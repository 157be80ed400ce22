pub mod delta;
pub mod schema;
pub mod state;

// Re-export for convenience
pub use delta::GraphDelta;
pub use schema::*;
pub use state::{GraphSnapshot, GraphState, InvariantViolation};
