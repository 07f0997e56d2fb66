// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tempfile::TempDir;
use vectura::application::RentalService;
use vectura::domain::Vehicle;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(RentalService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = RentalService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Second pool onto the same test database, for tests that tamper with
/// rows behind the service's back
pub async fn raw_pool(temp_dir: &TempDir) -> Result<SqlitePool> {
    let db_path = temp_dir.path().join("test.db");
    let pool = SqlitePool::connect(&format!("sqlite:{}", db_path.to_str().unwrap())).await?;
    Ok(pool)
}

/// Today as the service dates rentals: the UTC wall clock
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Test fixture: Standard fleet setup
pub struct StandardFleet;

impl StandardFleet {
    /// Create the basic three-vehicle fleet: sedan at 50.00/day, SUV at
    /// 80.00/day, compact at 35.00/day. Returned in insertion order.
    pub async fn create_basic(service: &RentalService) -> Result<Vec<Vehicle>> {
        let sedan = service
            .add_vehicle("Toyota".into(), "Camry".into(), 5000)
            .await?;
        let suv = service
            .add_vehicle("Honda".into(), "CR-V".into(), 8000)
            .await?;
        let compact = service
            .add_vehicle("Fiat".into(), "Panda".into(), 3500)
            .await?;
        Ok(vec![sedan, suv, compact])
    }
}
