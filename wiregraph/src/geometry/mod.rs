//! Geometry primitives and the routing policy shared by every layer of the engine.
//!
//! All spatial equality in the graph goes through a tolerance (`epsilon`) owned by
//! [`GeometryPolicy`]; nothing compares raw floats directly.

pub mod point;
pub mod policy;

pub use point::{Point, Rect};
pub use policy::{GeometryPolicy, Orientation, PathStrategy, Routing};
