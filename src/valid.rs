//! Polygon validity checks that need noding and a planar graph.
//!
//! Both testers are read-only: they report whether a defect exists and
//! the location of the first one found, and never repair their input.

mod connected_interior;
pub use connected_interior::ConnectedInteriorTester;

mod nested_ring;
pub use nested_ring::SweeplineNestedRingTester;
