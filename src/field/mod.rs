pub mod discovery;
pub mod field_model;
