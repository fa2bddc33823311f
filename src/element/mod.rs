pub mod classifier;
pub mod context;
pub mod selector;
pub mod semantic;
