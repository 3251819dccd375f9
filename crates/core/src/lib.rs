//! `kiemke-core`: stock-count foundation building blocks.
//!
//! This crate contains **pure** value types shared by every other crate
//! (no IO, no storage, no logging setup).

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ItemCode, LineItemKey, SessionDate};
pub use value_object::ValueObject;
