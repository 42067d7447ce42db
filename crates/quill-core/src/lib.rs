//! # Quill Core
//!
//! The domain layer of the Quill blogging API.
//! This crate contains the blog's business rules with zero infrastructure dependencies:
//! entities, validators, repository ports, and the use-case services built on them.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod validation;

pub use error::DomainError;
