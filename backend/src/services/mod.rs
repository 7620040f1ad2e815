//! Business logic services for the Distillery Operations Platform

pub mod batch;
pub mod bottling;
pub mod lal;
pub mod recipe;

pub use batch::BatchService;
pub use bottling::BottlingService;
pub use lal::LalService;
pub use recipe::RecipeService;
