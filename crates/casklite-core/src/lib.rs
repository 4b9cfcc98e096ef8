//! Core types shared across the casklite workspace.
//!
//! This crate is an internal implementation detail of casklite. Users
//! should depend on the main `casklite` crate instead, which provides
//! the stable public API.

mod error;

pub use error::{Error, Result};
