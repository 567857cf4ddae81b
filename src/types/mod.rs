//! Payment Types
//!
//! Configuration, token and shared resource types.

pub mod common;
pub mod config;
pub mod token;

pub use common::*;
pub use config::*;
pub use token::*;
