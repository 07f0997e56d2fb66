use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::RentalService;
use crate::domain::{Customer, Rental, Vehicle};

/// Full store snapshot for JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub vehicles: Vec<Vehicle>,
    pub customers: Vec<Customer>,
    pub rentals: Vec<Rental>,
}

/// Exporter for converting rental data to various formats.
pub struct Exporter<'a> {
    service: &'a RentalService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a RentalService) -> Self {
        Self { service }
    }

    /// Export rental history to CSV format.
    pub async fn export_rentals_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let rentals = self.service.list_rentals(false).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        // Write header
        csv_writer.write_record([
            "id",
            "vehicle_id",
            "vehicle",
            "customer_id",
            "customer",
            "start_date",
            "end_date",
            "total_cost_cents",
            "return_date",
        ])?;

        let mut count = 0;
        for record in &rentals {
            csv_writer.write_record([
                record.rental.id.to_string(),
                record.rental.vehicle_id.to_string(),
                format!("{} {}", record.vehicle_brand, record.vehicle_model),
                record.rental.customer_id.to_string(),
                record.customer_name.clone(),
                record.rental.start_date.format("%Y-%m-%d").to_string(),
                record.rental.end_date.format("%Y-%m-%d").to_string(),
                record.rental.total_cost.to_string(),
                record
                    .rental
                    .return_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the fleet to CSV format.
    pub async fn export_fleet_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let vehicles = self.service.list_fleet().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        // Write header
        csv_writer.write_record(["id", "brand", "model", "rate_per_day_cents", "available"])?;

        let mut count = 0;
        for vehicle in &vehicles {
            csv_writer.write_record([
                vehicle.id.to_string(),
                vehicle.brand.clone(),
                vehicle.model.clone(),
                vehicle.rate_per_day.to_string(),
                if vehicle.is_available { "yes" } else { "no" }.to_string(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the full store as a JSON snapshot.
    pub async fn export_full_json<W: Write>(&self, mut writer: W) -> Result<FleetSnapshot> {
        let vehicles = self.service.list_fleet().await?;
        let customers = self.service.list_customers().await?;
        let rentals = self
            .service
            .list_rentals(false)
            .await?
            .into_iter()
            .map(|record| record.rental)
            .collect();

        let snapshot = FleetSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            vehicles,
            customers,
            rentals,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
