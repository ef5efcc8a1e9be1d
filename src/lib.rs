pub mod config;
pub mod error;
pub mod network;
pub mod service;

pub use error::{EqusendError, Result};
