//! Shared types and calculation engine for the Distillery Operations Platform
//!
//! This crate contains the pure LAL, dilution, bottling and cut-yield
//! calculations shared between the backend, the browser (via WASM), and the
//! batch import tooling. Nothing in here performs I/O.

pub mod bottling;
pub mod coercion;
pub mod config;
pub mod cuts;
pub mod dilution;
pub mod display;
pub mod import;
pub mod lal;
pub mod merge;
pub mod models;
pub mod normalize;
pub mod types;
pub mod validation;

pub use config::EngineConfig;
pub use models::*;
pub use types::*;
