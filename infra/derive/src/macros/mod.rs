pub mod endpoint;
pub mod error;
