//! HTTP handlers for the Distillery Operations Platform API

pub mod batches;
pub mod bottling;
pub mod health;
pub mod lal;
pub mod recipes;

pub use batches::{import_batches, merge_batches, resolve_batch};
pub use bottling::{balance_bottles, bottling_summary};
pub use health::health_check;
pub use lal::calculate_lal;
pub use recipes::{calculate_dilution, list_recipes};
