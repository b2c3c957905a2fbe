//! Step definitions for task time tracking scenarios.

mod given;
mod then;
mod when;
pub mod world;
