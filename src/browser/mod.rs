pub mod endpoint;
pub mod error;
pub mod handle;
pub mod session;
