//! Shared runtime context for a command-line client of a git hosting service.
//!
//! A [`Factory`] hands commands the configuration, an authenticated HTTP
//! client, the repositories behind the local git remotes and the current
//! branch. Each of these is resolved lazily, at most once per process.
pub mod builders;
pub mod core;
pub mod utils;

pub use crate::core::error::{Error, Result};
pub use crate::core::factory::{Factory, FactoryBuilder};
