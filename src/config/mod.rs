//! Configuration management for bagging ensembles.
//!
//! Configurations can be built programmatically with [`ConfigBuilder`],
//! loaded from `.json`/`.toml` files, or read from `BAGGING_*` environment
//! variables. All three paths end in [`EnsembleConfig::validate`].

pub mod core;

pub use self::core::{ConfigBuilder, EnsembleConfig};
