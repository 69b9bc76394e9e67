//! # Domain Types
//!
//! Strongly typed identifiers shared by the storage and auth layers.

pub mod id;

pub use id::{TokenId, UserId};
