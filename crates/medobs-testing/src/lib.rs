//! Test utilities for the MedObs service.
//!
//! Provides a migrated in-memory database and row seeders.
//! Import from tests only, never from production code.

pub mod db;
pub mod fixture;
