//! Core types, algorithms and trait definitions for the organization
//! directory.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! taxonomy depth rule, the descendant closure and the radius pre-filter all
//! live here and talk to storage only through [`store::DirectoryStore`].

pub mod activity;
pub mod building;
pub mod error;
pub mod geo;
pub mod index;
pub mod organization;
pub mod store;
pub mod taxonomy;
pub mod validate;

pub use error::{Entity, Error, ErrorKind, Result};
