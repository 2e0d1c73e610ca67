//! Domain types shared across MedObs crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; infra converts to and from
//! the column representations.

pub mod date_filter;
pub mod evaluation;
pub mod observation;
pub mod pagination;
pub mod search;
pub mod user;
