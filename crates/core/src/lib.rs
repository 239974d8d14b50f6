//! `crownchat-core`
//!
//! **Responsibility:** shared primitives for the CrownChat shell.
//!
//! This crate contains **pure** building blocks (no IO, no async): the error
//! model, identifiers and validated value objects used by the auth and gate
//! crates.

pub mod error;
pub mod id;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::UserId;
pub use value_object::{DisplayName, Email, Username};
