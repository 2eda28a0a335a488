mod repository;

pub use repository::*;

/// SQL migration for the charges collection
pub const MIGRATION_001_CHARGES: &str = include_str!("migrations/001_charges.sql");
