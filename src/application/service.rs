use chrono::{NaiveDate, Utc};

use crate::domain::{
    Cents, Customer, CustomerId, IntegrityReport, RentalId, RentalTerms, Vehicle, VehicleId,
};
use crate::storage::{RentalRecord, Repository};

use super::AppError;

/// Application service owning every read/write operation of the rental
/// ledger. This is the primary interface for any client (CLI, desk menu,
/// tests); nothing here prints.
pub struct RentalService {
    repo: Repository,
}

/// A priced rental before confirmation: what the operator reviews and
/// approves. Producing a quote has no side effects.
pub struct RentalQuote {
    pub vehicle: Vehicle,
    pub terms: RentalTerms,
}

/// Receipt for a newly opened rental.
pub struct RentalReceipt {
    pub rental_id: RentalId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub vehicle_brand: String,
    pub vehicle_model: String,
    pub days: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_cost: Cents,
}

/// Summary for a closed rental.
pub struct ReturnSummary {
    pub customer_name: String,
    pub vehicle_brand: String,
    pub vehicle_model: String,
    pub return_date: NaiveDate,
}

/// Detailed vehicle information for display.
pub struct VehicleInfo {
    pub vehicle: Vehicle,
    pub total_rentals: i64,
    pub open_rental: Option<RentalRecord>,
}

/// The ledger dates rentals by the wall clock, not an injected clock.
fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl RentalService {
    /// Create a new rental service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Fleet provisioning
    // ========================

    /// Add a vehicle to the fleet. Provisioning is external to the rental
    /// workflow; the ledger itself never creates vehicles.
    pub async fn add_vehicle(
        &self,
        brand: String,
        model: String,
        rate_per_day: Cents,
    ) -> Result<Vehicle, AppError> {
        if rate_per_day < 0 {
            return Err(AppError::InvalidInput(format!(
                "daily rate must not be negative, got {} cents",
                rate_per_day
            )));
        }

        Ok(self
            .repo
            .insert_vehicle(&brand, &model, rate_per_day)
            .await?)
    }

    /// List the whole fleet, rented vehicles included.
    pub async fn list_fleet(&self) -> Result<Vec<Vehicle>, AppError> {
        Ok(self.repo.list_vehicles(false).await?)
    }

    /// Get a vehicle together with its rental history summary.
    pub async fn get_vehicle_info(&self, id: VehicleId) -> Result<VehicleInfo, AppError> {
        let vehicle = self
            .repo
            .get_vehicle(id)
            .await?
            .ok_or(AppError::VehicleNotFound(id))?;
        let (total_rentals, _open) = self.repo.count_rentals_for_vehicle(id).await?;
        let open_rental = self.repo.get_open_rental_for_vehicle(id).await?;

        Ok(VehicleInfo {
            vehicle,
            total_rentals,
            open_rental,
        })
    }

    // ========================
    // Rental operations
    // ========================

    /// List vehicles currently available for rent, in store order.
    /// Read-only; the list is a snapshot and may be stale by the time the
    /// caller acts on it.
    pub async fn list_available_vehicles(&self) -> Result<Vec<Vehicle>, AppError> {
        Ok(self.repo.list_vehicles(true).await?)
    }

    /// Price a rental without opening it: look up the vehicle (available
    /// only), compute dates and total cost starting today. This is the
    /// first phase of the two-phase rent flow; the caller displays the
    /// quote and asks for confirmation before committing anything.
    pub async fn quote_rental(
        &self,
        vehicle_id: VehicleId,
        days: i64,
    ) -> Result<RentalQuote, AppError> {
        if days <= 0 {
            return Err(AppError::InvalidInput(format!(
                "rental days must be positive, got {}",
                days
            )));
        }

        let vehicle = self
            .repo
            .get_available_vehicle(vehicle_id)
            .await?
            .ok_or(AppError::VehicleUnavailable(vehicle_id))?;

        let terms = RentalTerms::compute(vehicle.rate_per_day, days, today())?;

        Ok(RentalQuote { vehicle, terms })
    }

    /// Open a rental: create the customer record, create the rental row,
    /// and mark the vehicle unavailable, atomically. A failure at any step
    /// leaves the store exactly as it was.
    pub async fn open_rental(
        &self,
        vehicle_id: VehicleId,
        customer_name: &str,
        days: i64,
    ) -> Result<RentalReceipt, AppError> {
        let quote = self.quote_rental(vehicle_id, days).await?;

        let opened = self
            .repo
            .open_rental(vehicle_id, customer_name, &quote.terms)
            .await?
            .ok_or(AppError::VehicleUnavailable(vehicle_id))?;

        Ok(RentalReceipt {
            rental_id: opened.rental.id,
            customer_id: opened.customer.id,
            customer_name: opened.customer.name,
            vehicle_brand: quote.vehicle.brand,
            vehicle_model: quote.vehicle.model,
            days: quote.terms.days,
            start_date: opened.rental.start_date,
            end_date: opened.rental.end_date,
            total_cost: opened.rental.total_cost,
        })
    }

    /// Close the open rental for a (vehicle, customer) pair: set its return
    /// date to today and free the vehicle, atomically.
    pub async fn close_rental(
        &self,
        vehicle_id: VehicleId,
        customer_id: CustomerId,
    ) -> Result<ReturnSummary, AppError> {
        let return_date = today();

        let record = self
            .repo
            .close_rental(vehicle_id, customer_id, return_date)
            .await?
            .ok_or(AppError::RentalNotFound {
                vehicle_id,
                customer_id,
            })?;

        Ok(ReturnSummary {
            customer_name: record.customer_name,
            vehicle_brand: record.vehicle_brand,
            vehicle_model: record.vehicle_model,
            return_date,
        })
    }

    /// List rentals with joined customer and vehicle names.
    pub async fn list_rentals(&self, open_only: bool) -> Result<Vec<RentalRecord>, AppError> {
        Ok(self.repo.list_rentals(open_only).await?)
    }

    /// List all customer records (full-snapshot export only).
    pub async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        Ok(self.repo.list_customers().await?)
    }

    // ========================
    // Integrity
    // ========================

    /// Audit the store against the ledger's invariants.
    pub async fn check_integrity(&self) -> Result<IntegrityReport, AppError> {
        Ok(self.repo.get_integrity_report().await?)
    }
}
