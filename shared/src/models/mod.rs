//! Domain models for the Distillery Operations Platform

mod batch;
mod bottling;
mod recipe;

pub use batch::*;
pub use bottling::*;
pub use recipe::*;
