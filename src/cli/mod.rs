use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::application::RentalService;
use crate::domain::{format_dollars, parse_cents, CustomerId, VehicleId};

mod desk;

/// Vectura - Vehicle Rental Desk
#[derive(Parser)]
#[command(name = "vectura")]
#[command(about = "A local-first vehicle rental desk for the command line")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "vectura.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Fleet management commands
    #[command(subcommand)]
    Fleet(FleetCommands),

    /// Run the interactive rental desk
    Desk,

    /// Rent a vehicle to a customer
    Rent {
        /// Vehicle ID
        vehicle_id: VehicleId,

        /// Customer name
        #[arg(short, long)]
        name: String,

        /// Number of rental days
        #[arg(short, long)]
        days: i64,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Return a rented vehicle
    Return {
        /// Vehicle ID
        vehicle_id: VehicleId,

        /// Customer ID (printed on the rental receipt)
        customer_id: CustomerId,
    },

    /// List rentals
    Rentals {
        /// Show only open rentals
        #[arg(long)]
        open: bool,
    },

    /// Verify store integrity
    Check,

    /// Export data to CSV or JSON
    Export {
        /// What to export: rentals, fleet, full
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum FleetCommands {
    /// Add a vehicle to the fleet
    Add {
        /// Vehicle brand
        brand: String,

        /// Vehicle model
        model: String,

        /// Daily rate (e.g., "50.00" or "50")
        #[arg(short, long)]
        rate: String,
    },

    /// List vehicles (available only by default)
    List {
        /// Include vehicles currently rented out
        #[arg(long)]
        all: bool,
    },

    /// Show detailed vehicle information
    Show {
        /// Vehicle ID
        id: VehicleId,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        if self.verbose {
            eprintln!("Using database: {}", self.database);
        }

        match self.command {
            Commands::Init => {
                RentalService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Fleet(fleet_cmd) => {
                let service = RentalService::connect(&self.database).await?;
                run_fleet_command(&service, fleet_cmd).await?;
            }

            Commands::Desk => {
                let service = RentalService::connect(&self.database).await?;
                desk::run(&service).await?;
            }

            Commands::Rent {
                vehicle_id,
                name,
                days,
                yes,
            } => {
                let service = RentalService::connect(&self.database).await?;
                run_rent_command(&service, vehicle_id, &name, days, yes).await?;
            }

            Commands::Return {
                vehicle_id,
                customer_id,
            } => {
                let service = RentalService::connect(&self.database).await?;
                let summary = service.close_rental(vehicle_id, customer_id).await?;
                println!(
                    "Returned {} {} for {} on {}",
                    summary.vehicle_brand,
                    summary.vehicle_model,
                    summary.customer_name,
                    summary.return_date
                );
            }

            Commands::Rentals { open } => {
                let service = RentalService::connect(&self.database).await?;
                run_rentals_command(&service, open).await?;
            }

            Commands::Check => {
                let service = RentalService::connect(&self.database).await?;
                run_check_command(&service).await?;
            }

            Commands::Export {
                export_type,
                output,
            } => {
                let service = RentalService::connect(&self.database).await?;
                run_export_command(&service, &export_type, output.as_deref()).await?;
            }
        }

        Ok(())
    }
}

async fn run_fleet_command(service: &RentalService, cmd: FleetCommands) -> Result<()> {
    match cmd {
        FleetCommands::Add { brand, model, rate } => {
            let rate_cents =
                parse_cents(&rate).context("Invalid rate format. Use '50.00' or '50'")?;

            let vehicle = service.add_vehicle(brand, model, rate_cents).await?;
            println!(
                "Added vehicle {}: {} ({} per day)",
                vehicle.id,
                vehicle.label(),
                format_dollars(vehicle.rate_per_day)
            );
        }

        FleetCommands::List { all } => {
            let vehicles = if all {
                service.list_fleet().await?
            } else {
                service.list_available_vehicles().await?
            };

            if vehicles.is_empty() {
                println!("No vehicles found.");
            } else {
                println!(
                    "{:<5} {:<15} {:<15} {:>10} {:<9}",
                    "ID", "BRAND", "MODEL", "RATE/DAY", "AVAILABLE"
                );
                println!("{}", "-".repeat(58));
                for vehicle in vehicles {
                    println!(
                        "{:<5} {:<15} {:<15} {:>10} {:<9}",
                        vehicle.id,
                        truncate(&vehicle.brand, 15),
                        truncate(&vehicle.model, 15),
                        format_dollars(vehicle.rate_per_day),
                        if vehicle.is_available { "yes" } else { "no" }
                    );
                }
            }
        }

        FleetCommands::Show { id } => {
            let info = service.get_vehicle_info(id).await?;
            let vehicle = &info.vehicle;

            println!("Vehicle: {}", vehicle.label());
            println!("  ID:        {}", vehicle.id);
            println!("  Rate/day:  {}", format_dollars(vehicle.rate_per_day));
            println!(
                "  Available: {}",
                if vehicle.is_available { "yes" } else { "no" }
            );
            println!("  Rentals:   {}", info.total_rentals);

            if let Some(open) = &info.open_rental {
                println!();
                println!(
                    "  Rented by: {} (customer {})",
                    open.customer_name, open.rental.customer_id
                );
                println!(
                    "  Since:     {} (due back {})",
                    open.rental.start_date, open.rental.end_date
                );
            }
        }
    }
    Ok(())
}

async fn run_rent_command(
    service: &RentalService,
    vehicle_id: VehicleId,
    name: &str,
    days: i64,
    yes: bool,
) -> Result<()> {
    let quote = service.quote_rental(vehicle_id, days).await?;
    desk::print_quote(name, &quote);

    if !yes && !desk::confirm_rental()? {
        println!("Rental cancelled.");
        return Ok(());
    }

    let receipt = service.open_rental(vehicle_id, name, days).await?;
    desk::print_receipt(&receipt);
    Ok(())
}

async fn run_rentals_command(service: &RentalService, open_only: bool) -> Result<()> {
    let rentals = service.list_rentals(open_only).await?;

    if rentals.is_empty() {
        println!("No rentals found.");
        return Ok(());
    }

    println!(
        "{:<5} {:<20} {:<15} {:<11} {:<11} {:>10} {:<10}",
        "ID", "VEHICLE", "CUSTOMER", "START", "END", "TOTAL", "RETURNED"
    );
    println!("{}", "-".repeat(88));

    for record in rentals {
        let vehicle_label = format!("{} {}", record.vehicle_brand, record.vehicle_model);
        let returned = match record.rental.return_date {
            Some(date) => date.to_string(),
            None => "open".to_string(),
        };

        println!(
            "{:<5} {:<20} {:<15} {:<11} {:<11} {:>10} {:<10}",
            record.rental.id,
            truncate(&vehicle_label, 20),
            truncate(&record.customer_name, 15),
            record.rental.start_date.to_string(),
            record.rental.end_date.to_string(),
            format_dollars(record.rental.total_cost),
            returned
        );
    }
    Ok(())
}

async fn run_check_command(service: &RentalService) -> Result<()> {
    println!("Checking store integrity...\n");

    let report = service.check_integrity().await?;

    println!("Vehicles:  {}", report.vehicle_count);
    println!("Customers: {}", report.customer_count);
    println!(
        "Rentals:   {} ({} open)",
        report.rental_count, report.open_rental_count
    );
    println!();

    if report.is_clean() {
        println!("Store is consistent.");
    } else {
        println!("Issues found:");
        for issue in report.issues() {
            println!("  - {}", issue);
        }
        anyhow::bail!("Integrity check failed");
    }

    Ok(())
}

async fn run_export_command(
    service: &RentalService,
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{stdout, Write};

    let exporter = Exporter::new(service);

    // Determine output writer
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "rentals" => {
            let count = exporter.export_rentals_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} rentals", count);
            }
        }
        "fleet" => {
            let count = exporter.export_fleet_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} vehicles", count);
            }
        }
        "full" => {
            let snapshot = exporter.export_full_json(writer).await?;
            if output.is_some() {
                eprintln!(
                    "Exported full database: {} vehicles, {} customers, {} rentals",
                    snapshot.vehicles.len(),
                    snapshot.customers.len(),
                    snapshot.rentals.len()
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: rentals, fleet, full",
                export_type
            );
        }
    }

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        // The cut is in bytes and must land on a char boundary.
        let mut cut = max_len.saturating_sub(3);
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &s[..cut])
    }
}
