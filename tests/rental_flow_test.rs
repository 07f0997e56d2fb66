mod common;

use anyhow::Result;
use common::{StandardFleet, test_service, today};
use vectura::application::AppError;

#[tokio::test]
async fn test_listing_excludes_rented_vehicles() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let fleet = StandardFleet::create_basic(&service).await?;

    // All three start out available
    let available = service.list_available_vehicles().await?;
    assert_eq!(available.len(), 3);
    assert!(available.iter().all(|v| v.is_available));

    // Renting the sedan removes exactly it from the listing
    service.open_rental(fleet[0].id, "Ada Lovelace", 3).await?;

    let available = service.list_available_vehicles().await?;
    assert_eq!(available.len(), 2);
    assert!(available.iter().all(|v| v.id != fleet[0].id));

    Ok(())
}

#[tokio::test]
async fn test_open_rental_computes_exact_cost() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let fleet = StandardFleet::create_basic(&service).await?;

    // 50.00/day for 3 days is exactly 150.00
    let receipt = service.open_rental(fleet[0].id, "Ada Lovelace", 3).await?;

    assert_eq!(receipt.total_cost, 15000);
    assert_eq!(receipt.days, 3);
    assert_eq!(receipt.vehicle_brand, "Toyota");
    assert_eq!(receipt.vehicle_model, "Camry");
    assert_eq!(receipt.customer_name, "Ada Lovelace");
    assert_eq!(receipt.start_date, today());
    assert_eq!(receipt.end_date, today() + chrono::Duration::days(3));

    // Exactly one open rental exists
    let open = service.list_rentals(true).await?;
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].rental.id, receipt.rental_id);
    assert!(open[0].rental.is_open());

    Ok(())
}

#[tokio::test]
async fn test_open_rental_on_rented_vehicle_fails() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let fleet = StandardFleet::create_basic(&service).await?;

    service
        .open_rental(fleet[0].id, "First Customer", 2)
        .await?;

    // A second open on the same vehicle is refused
    let result = service.open_rental(fleet[0].id, "Second Customer", 4).await;
    assert!(matches!(result, Err(AppError::VehicleUnavailable(_))));

    // No partial rows: still one rental, one customer
    assert_eq!(service.list_rentals(false).await?.len(), 1);
    assert_eq!(service.list_customers().await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_open_rental_on_missing_vehicle_fails() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardFleet::create_basic(&service).await?;

    let result = service.open_rental(999, "Nobody", 1).await;
    assert!(matches!(result, Err(AppError::VehicleUnavailable(999))));

    assert!(service.list_rentals(false).await?.is_empty());
    assert!(service.list_customers().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_open_rental_rejects_non_positive_days() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let fleet = StandardFleet::create_basic(&service).await?;

    for days in [0, -3] {
        let result = service.open_rental(fleet[0].id, "Ada Lovelace", days).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    // Nothing was created and the vehicle stayed available
    assert!(service.list_rentals(false).await?.is_empty());
    assert_eq!(service.list_available_vehicles().await?.len(), 3);

    Ok(())
}

#[tokio::test]
async fn test_quote_has_no_side_effects() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let fleet = StandardFleet::create_basic(&service).await?;

    let quote = service.quote_rental(fleet[1].id, 5).await?;
    assert_eq!(quote.terms.total_cost, 40000); // 80.00 * 5
    assert_eq!(quote.terms.days, 5);
    assert_eq!(quote.terms.start_date, today());

    // Declining after the quote means nothing was ever written
    assert!(service.list_rentals(false).await?.is_empty());
    assert!(service.list_customers().await?.is_empty());
    assert_eq!(service.list_available_vehicles().await?.len(), 3);

    Ok(())
}

#[tokio::test]
async fn test_close_rental_frees_the_vehicle() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let fleet = StandardFleet::create_basic(&service).await?;

    let receipt = service.open_rental(fleet[0].id, "Ada Lovelace", 3).await?;

    let summary = service
        .close_rental(fleet[0].id, receipt.customer_id)
        .await?;
    assert_eq!(summary.customer_name, "Ada Lovelace");
    assert_eq!(summary.vehicle_brand, "Toyota");
    assert_eq!(summary.vehicle_model, "Camry");
    assert_eq!(summary.return_date, today());

    // The vehicle is listed available again
    let available = service.list_available_vehicles().await?;
    assert!(available.iter().any(|v| v.id == fleet[0].id));

    // The rental is closed, not deleted
    let rentals = service.list_rentals(false).await?;
    assert_eq!(rentals.len(), 1);
    assert_eq!(rentals[0].rental.return_date, Some(today()));
    assert!(service.list_rentals(true).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_close_without_open_rental_fails() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let fleet = StandardFleet::create_basic(&service).await?;

    // Nothing rented yet
    let result = service.close_rental(fleet[0].id, 1).await;
    assert!(matches!(result, Err(AppError::RentalNotFound { .. })));

    // Wrong customer for an open rental
    let receipt = service.open_rental(fleet[0].id, "Ada Lovelace", 3).await?;
    let result = service
        .close_rental(fleet[0].id, receipt.customer_id + 1)
        .await;
    assert!(matches!(result, Err(AppError::RentalNotFound { .. })));

    // The open rental is untouched and the vehicle still out
    assert_eq!(service.list_rentals(true).await?.len(), 1);
    assert_eq!(service.list_available_vehicles().await?.len(), 2);

    // Closing twice fails the second time
    service
        .close_rental(fleet[0].id, receipt.customer_id)
        .await?;
    let result = service.close_rental(fleet[0].id, receipt.customer_id).await;
    assert!(matches!(result, Err(AppError::RentalNotFound { .. })));

    Ok(())
}

#[tokio::test]
async fn test_vehicle_can_be_rented_again_after_return() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let fleet = StandardFleet::create_basic(&service).await?;

    let first = service.open_rental(fleet[0].id, "Ada Lovelace", 3).await?;
    service.close_rental(fleet[0].id, first.customer_id).await?;

    // Historical rentals accumulate; only one may be open at a time
    let second = service.open_rental(fleet[0].id, "Grace Hopper", 1).await?;
    assert_ne!(first.rental_id, second.rental_id);

    assert_eq!(service.list_rentals(false).await?.len(), 2);
    assert_eq!(service.list_rentals(true).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_customer_ids_are_store_assigned() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let fleet = StandardFleet::create_basic(&service).await?;

    let first = service.open_rental(fleet[0].id, "Ada Lovelace", 2).await?;
    let second = service.open_rental(fleet[1].id, "Grace Hopper", 2).await?;

    assert!(first.customer_id > 0);
    assert!(second.customer_id > first.customer_id);

    // Each rental got its own customer row
    assert_eq!(service.list_customers().await?.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_full_rental_lifecycle() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let vehicle = service
        .add_vehicle("Toyota".into(), "Camry".into(), 5000)
        .await?;
    assert!(
        service
            .list_available_vehicles()
            .await?
            .iter()
            .any(|v| v.id == vehicle.id)
    );

    // Open for 3 days at 50.00/day
    let receipt = service.open_rental(vehicle.id, "Grace Hopper", 3).await?;
    assert_eq!(receipt.total_cost, 15000);
    assert!(
        !service
            .list_available_vehicles()
            .await?
            .iter()
            .any(|v| v.id == vehicle.id)
    );

    // Return it
    service
        .close_rental(vehicle.id, receipt.customer_id)
        .await?;
    assert!(
        service
            .list_available_vehicles()
            .await?
            .iter()
            .any(|v| v.id == vehicle.id)
    );

    let rentals = service.list_rentals(false).await?;
    assert_eq!(rentals.len(), 1);
    assert!(rentals[0].rental.return_date.is_some());

    Ok(())
}
