// Library exports for socialseed-core
// The loader binary drives these modules; tests use them directly

pub mod config;
pub mod dataset;
pub mod db;
pub mod error;
pub mod generate;
pub mod persist;
pub mod pipeline;
pub mod seed;
pub mod validate;
pub mod verify;

pub use dataset::Dataset;
pub use error::{InvariantViolation, SeedError, SeedResult};
