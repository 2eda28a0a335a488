// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use condoledger::application::ChargeService;
use condoledger::domain::{ChargeKey, Month};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(ChargeService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = ChargeService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string (YYYY-MM-DD)
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

pub fn month(n: u32) -> Month {
    Month::new(n).unwrap()
}

pub fn key(apartment_id: i64, period: &str) -> ChargeKey {
    ChargeKey::new(apartment_id, period)
}

/// Test fixture: a small building
pub struct StandardBuilding;

impl StandardBuilding {
    pub const APARTMENTS: [i64; 3] = [101, 102, 201];

    /// Bill every apartment for the whole year
    pub async fn bill_year(service: &ChargeService, year: i32) -> Result<()> {
        service
            .generate_charges(year, None, &Self::APARTMENTS)
            .await?;
        Ok(())
    }
}
