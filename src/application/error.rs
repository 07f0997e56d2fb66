use thiserror::Error;

use crate::domain::{CustomerId, TermsError, VehicleId};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Vehicle not found: {0}")]
    VehicleNotFound(VehicleId),

    /// Deliberately does not distinguish a missing vehicle from a rented one;
    /// the rent flow treats both the same way.
    #[error("Invalid or unavailable vehicle: {0}")]
    VehicleUnavailable(VehicleId),

    #[error("No active rental for vehicle {vehicle_id} and customer {customer_id}")]
    RentalNotFound {
        vehicle_id: VehicleId,
        customer_id: CustomerId,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl From<TermsError> for AppError {
    fn from(err: TermsError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}
