use anyhow::{Context, Result};
use std::io::{self, Write};

use crate::application::{RentalQuote, RentalReceipt, RentalService};
use crate::domain::{format_dollars, CustomerId, Vehicle, VehicleId};

use super::truncate;

/// Interactive desk loop. Every operation failure is printed and the menu
/// comes back; only a terminal I/O failure aborts the loop.
pub async fn run(service: &RentalService) -> Result<()> {
    loop {
        print_menu()?;

        let mut line = String::new();
        let bytes = io::stdin()
            .read_line(&mut line)
            .context("Failed to read input")?;
        if bytes == 0 {
            // stdin closed
            println!();
            return Ok(());
        }

        match line.trim() {
            "1" => rent_flow(service).await?,
            "2" => return_flow(service).await?,
            "3" => {
                println!("Thank you for using the rental desk. Goodbye!");
                return Ok(());
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}

fn print_menu() -> Result<()> {
    println!();
    println!("=== Vehicle Rental Desk ===");
    println!("1. Rent a vehicle");
    println!("2. Return a vehicle");
    println!("3. Exit");
    print!("Enter your choice: ");
    io::stdout().flush().context("Failed to flush stdout")
}

async fn rent_flow(service: &RentalService) -> Result<()> {
    let vehicles = match service.list_available_vehicles().await {
        Ok(vehicles) => vehicles,
        Err(err) => {
            println!("Error listing vehicles: {}", err);
            return Ok(());
        }
    };

    if vehicles.is_empty() {
        println!("No vehicles available for rent.");
        return Ok(());
    }

    print_available(&vehicles);

    let vehicle_id = match prompt("Enter the vehicle ID to rent: ")?.parse::<VehicleId>() {
        Ok(id) => id,
        Err(_) => {
            println!("Please enter a numeric vehicle ID.");
            return Ok(());
        }
    };

    let name = prompt("Enter the customer name: ")?;
    if name.is_empty() {
        println!("Customer name cannot be empty.");
        return Ok(());
    }

    let days = match prompt("Enter the number of rental days: ")?.parse::<i64>() {
        Ok(days) => days,
        Err(_) => {
            println!("Please enter a whole number of days.");
            return Ok(());
        }
    };

    // Phase one: price the rental without touching the store.
    let quote = match service.quote_rental(vehicle_id, days).await {
        Ok(quote) => quote,
        Err(err) => {
            println!("{}", err);
            return Ok(());
        }
    };

    print_quote(&name, &quote);

    if !confirm_rental()? {
        println!("Rental cancelled.");
        return Ok(());
    }

    // Phase two: availability is checked again inside the transaction.
    match service.open_rental(vehicle_id, &name, days).await {
        Ok(receipt) => print_receipt(&receipt),
        Err(err) => println!("Error renting vehicle: {}", err),
    }
    Ok(())
}

async fn return_flow(service: &RentalService) -> Result<()> {
    let vehicle_id = match prompt("Enter the vehicle ID to return: ")?.parse::<VehicleId>() {
        Ok(id) => id,
        Err(_) => {
            println!("Please enter a numeric vehicle ID.");
            return Ok(());
        }
    };

    let customer_id = match prompt("Enter the customer ID: ")?.parse::<CustomerId>() {
        Ok(id) => id,
        Err(_) => {
            println!("Please enter a numeric customer ID.");
            return Ok(());
        }
    };

    match service.close_rental(vehicle_id, customer_id).await {
        Ok(summary) => {
            println!();
            println!("Vehicle returned successfully!");
            println!("Customer: {}", summary.customer_name);
            println!(
                "Vehicle:  {} {}",
                summary.vehicle_brand, summary.vehicle_model
            );
            println!("Returned: {}", summary.return_date);
        }
        Err(err) => println!("{}", err),
    }
    Ok(())
}

fn print_available(vehicles: &[Vehicle]) {
    println!();
    println!("Available vehicles:");
    println!("{}", "-".repeat(48));
    println!(
        "{:<5} {:<15} {:<15} {:>10}",
        "ID", "BRAND", "MODEL", "RATE/DAY"
    );
    println!("{}", "-".repeat(48));
    for vehicle in vehicles {
        println!(
            "{:<5} {:<15} {:<15} {:>10}",
            vehicle.id,
            truncate(&vehicle.brand, 15),
            truncate(&vehicle.model, 15),
            format_dollars(vehicle.rate_per_day)
        );
    }
    println!("{}", "-".repeat(48));
}

pub(crate) fn print_quote(customer_name: &str, quote: &RentalQuote) {
    println!();
    println!("Rental Information:");
    println!("{}", "-".repeat(40));
    println!("Customer:   {}", customer_name);
    println!("Vehicle:    {}", quote.vehicle.label());
    println!("Days:       {}", quote.terms.days);
    println!("Start date: {}", quote.terms.start_date);
    println!("End date:   {}", quote.terms.end_date);
    println!("Total cost: {}", format_dollars(quote.terms.total_cost));
    println!("{}", "-".repeat(40));
}

pub(crate) fn print_receipt(receipt: &RentalReceipt) {
    println!();
    println!("Rental Confirmation:");
    println!("{}", "-".repeat(40));
    println!("Rental ID:   {}", receipt.rental_id);
    println!("Customer ID: {}", receipt.customer_id);
    println!("Customer:    {}", receipt.customer_name);
    println!(
        "Vehicle:     {} {}",
        receipt.vehicle_brand, receipt.vehicle_model
    );
    println!("Days:        {}", receipt.days);
    println!("Start date:  {}", receipt.start_date);
    println!("End date:    {}", receipt.end_date);
    println!("Total cost:  {}", format_dollars(receipt.total_cost));
    println!("{}", "-".repeat(40));
    println!("Vehicle rented successfully!");
}

/// Only the exact affirmative "yes" (case-insensitive, trimmed) proceeds.
pub(crate) fn confirm_rental() -> Result<bool> {
    let answer = prompt("Do you want to proceed with the rental? (yes/no): ")?;
    Ok(answer.to_lowercase() == "yes")
}

fn prompt(text: &str) -> Result<String> {
    print!("{}", text);
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim().to_string())
}
