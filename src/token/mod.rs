//! Token Management
//!
//! In-memory token state guarded per client, with lazy proactive refresh.

pub mod cell;
pub mod policy;

pub use cell::TokenCell;
pub use policy::RefreshPolicy;
