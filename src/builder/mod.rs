//! Build description generation.
//!
//! Turns a checked module graph into a [`BuildPlan`], renders it as an
//! ant-style build description and generates stub solutions for
//! precompiled libraries.

pub mod plan;
pub mod script;
pub mod stubs;

pub use plan::{BuildPlan, PlanError};
pub use stubs::StubSolution;
