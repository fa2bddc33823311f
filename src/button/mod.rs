pub mod button_model;
pub mod discovery;
pub mod prioritizer;
