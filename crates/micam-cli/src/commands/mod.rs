//! Command implementations

mod property;
mod request;

pub use property::{get, set};
pub use request::{raw, request};
