use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::domain::{
    Cents, Customer, CustomerId, IntegrityReport, Rental, RentalTerms, Vehicle, VehicleId,
};

use super::MIGRATION_001_INITIAL;

/// A rental joined with the customer and vehicle it references.
/// This is what listings and receipts are built from.
#[derive(Debug, Clone)]
pub struct RentalRecord {
    pub rental: Rental,
    pub customer_name: String,
    pub vehicle_brand: String,
    pub vehicle_model: String,
}

/// Result of a committed open-rental transaction: the freshly created
/// customer and rental rows with their store-generated ids.
#[derive(Debug, Clone)]
pub struct OpenedRental {
    pub customer: Customer,
    pub rental: Rental,
}

/// Repository for persisting and querying vehicles, customers, and rentals.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path.
    /// Creates the database file if it doesn't exist.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Vehicle operations
    // ========================

    /// Insert a vehicle into the fleet and return it with its generated id.
    /// New vehicles start out available.
    pub async fn insert_vehicle(
        &self,
        brand: &str,
        model: &str,
        rate_per_day: Cents,
    ) -> Result<Vehicle> {
        let result = sqlx::query(
            r#"
            INSERT INTO vehicles (brand, model, rate_per_day, is_available)
            VALUES (?, ?, ?, 1)
            "#,
        )
        .bind(brand)
        .bind(model)
        .bind(rate_per_day)
        .execute(&self.pool)
        .await
        .context("Failed to insert vehicle")?;

        Ok(Vehicle {
            id: result.last_insert_rowid(),
            brand: brand.to_string(),
            model: model.to_string(),
            rate_per_day,
            is_available: true,
        })
    }

    /// Get a vehicle by id regardless of availability.
    pub async fn get_vehicle(&self, id: VehicleId) -> Result<Option<Vehicle>> {
        let row = sqlx::query(
            r#"
            SELECT id, brand, model, rate_per_day, is_available
            FROM vehicles
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch vehicle")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_vehicle(&row)?)),
            None => Ok(None),
        }
    }

    /// Get a vehicle by id, filtered to availability = true.
    /// Absent means "invalid or unavailable" without distinguishing the two.
    pub async fn get_available_vehicle(&self, id: VehicleId) -> Result<Option<Vehicle>> {
        let row = sqlx::query(
            r#"
            SELECT id, brand, model, rate_per_day, is_available
            FROM vehicles
            WHERE id = ? AND is_available = 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch available vehicle")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_vehicle(&row)?)),
            None => Ok(None),
        }
    }

    /// List vehicles in store order, optionally only the available ones.
    pub async fn list_vehicles(&self, available_only: bool) -> Result<Vec<Vehicle>> {
        let query = if available_only {
            "SELECT id, brand, model, rate_per_day, is_available FROM vehicles WHERE is_available = 1 ORDER BY id"
        } else {
            "SELECT id, brand, model, rate_per_day, is_available FROM vehicles ORDER BY id"
        };

        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list vehicles")?;

        rows.iter().map(Self::row_to_vehicle).collect()
    }

    fn row_to_vehicle(row: &sqlx::sqlite::SqliteRow) -> Result<Vehicle> {
        Ok(Vehicle {
            id: row.get("id"),
            brand: row.get("brand"),
            model: row.get("model"),
            rate_per_day: row.get("rate_per_day"),
            is_available: row.get::<i32, _>("is_available") != 0,
        })
    }

    // ========================
    // Rental operations
    // ========================

    /// Open a rental: create the customer, create the rental row, and clear
    /// the vehicle's availability flag, all in one transaction. The
    /// availability check is repeated inside the transaction so the flag and
    /// the open-rental row can only ever change together.
    ///
    /// Returns `None` if the vehicle does not exist or is not available at
    /// commit time; nothing is written in that case.
    pub async fn open_rental(
        &self,
        vehicle_id: VehicleId,
        customer_name: &str,
        terms: &RentalTerms,
    ) -> Result<Option<OpenedRental>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin rental transaction")?;

        let available = sqlx::query("SELECT id FROM vehicles WHERE id = ? AND is_available = 1")
            .bind(vehicle_id)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to check vehicle availability")?;

        if available.is_none() {
            return Ok(None);
        }

        let customer_id = Self::create_customer(&mut tx, customer_name).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO rentals (vehicle_id, customer_id, start_date, end_date, total_cost, return_date)
            VALUES (?, ?, ?, ?, ?, NULL)
            "#,
        )
        .bind(vehicle_id)
        .bind(customer_id)
        .bind(terms.start_date.format("%Y-%m-%d").to_string())
        .bind(terms.end_date.format("%Y-%m-%d").to_string())
        .bind(terms.total_cost)
        .execute(&mut *tx)
        .await
        .context("Failed to insert rental")?;
        let rental_id = result.last_insert_rowid();

        sqlx::query("UPDATE vehicles SET is_available = 0 WHERE id = ?")
            .bind(vehicle_id)
            .execute(&mut *tx)
            .await
            .context("Failed to mark vehicle unavailable")?;

        tx.commit()
            .await
            .context("Failed to commit rental transaction")?;

        Ok(Some(OpenedRental {
            customer: Customer {
                id: customer_id,
                name: customer_name.to_string(),
            },
            rental: Rental {
                id: rental_id,
                vehicle_id,
                customer_id,
                start_date: terms.start_date,
                end_date: terms.end_date,
                total_cost: terms.total_cost,
                return_date: None,
            },
        }))
    }

    /// Insert a customer row and return its store-generated id.
    /// Only ever invoked from inside the open-rental transaction.
    async fn create_customer(conn: &mut SqliteConnection, name: &str) -> Result<CustomerId> {
        let result = sqlx::query("INSERT INTO customers (name) VALUES (?)")
            .bind(name)
            .execute(&mut *conn)
            .await
            .context("Failed to insert customer")?;

        let id = result.last_insert_rowid();
        if result.rows_affected() != 1 || id <= 0 {
            anyhow::bail!("Customer insert returned no generated id");
        }
        Ok(id)
    }

    /// List all customers, oldest first. Only the full-snapshot export reads
    /// customers standalone; everything else reaches them through the rental
    /// join.
    pub async fn list_customers(&self) -> Result<Vec<Customer>> {
        let rows = sqlx::query("SELECT id, name FROM customers ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list customers")?;

        Ok(rows
            .iter()
            .map(|row| Customer {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    /// Close the open rental for a (vehicle, customer) pair: set its return
    /// date and restore the vehicle's availability flag in one transaction.
    ///
    /// Returns `None` if no open rental matches the pair; nothing is written
    /// in that case.
    pub async fn close_rental(
        &self,
        vehicle_id: VehicleId,
        customer_id: CustomerId,
        return_date: NaiveDate,
    ) -> Result<Option<RentalRecord>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin return transaction")?;

        let row = sqlx::query(
            r#"
            SELECT r.id, r.vehicle_id, r.customer_id, r.start_date, r.end_date,
                   r.total_cost, r.return_date, c.name AS customer_name,
                   v.brand AS vehicle_brand, v.model AS vehicle_model
            FROM rentals r
            JOIN customers c ON r.customer_id = c.id
            JOIN vehicles v ON r.vehicle_id = v.id
            WHERE r.vehicle_id = ? AND r.customer_id = ? AND r.return_date IS NULL
            "#,
        )
        .bind(vehicle_id)
        .bind(customer_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to look up open rental")?;

        let mut record = match row {
            Some(row) => Self::row_to_rental_record(&row)?,
            None => return Ok(None),
        };

        // Update by primary key so exactly one row can be touched.
        sqlx::query("UPDATE rentals SET return_date = ? WHERE id = ?")
            .bind(return_date.format("%Y-%m-%d").to_string())
            .bind(record.rental.id)
            .execute(&mut *tx)
            .await
            .context("Failed to set return date")?;

        sqlx::query("UPDATE vehicles SET is_available = 1 WHERE id = ?")
            .bind(vehicle_id)
            .execute(&mut *tx)
            .await
            .context("Failed to mark vehicle available")?;

        tx.commit()
            .await
            .context("Failed to commit return transaction")?;

        record.rental.return_date = Some(return_date);
        Ok(Some(record))
    }

    /// List rentals joined with customer and vehicle, oldest first.
    pub async fn list_rentals(&self, open_only: bool) -> Result<Vec<RentalRecord>> {
        let query = if open_only {
            r#"
            SELECT r.id, r.vehicle_id, r.customer_id, r.start_date, r.end_date,
                   r.total_cost, r.return_date, c.name AS customer_name,
                   v.brand AS vehicle_brand, v.model AS vehicle_model
            FROM rentals r
            JOIN customers c ON r.customer_id = c.id
            JOIN vehicles v ON r.vehicle_id = v.id
            WHERE r.return_date IS NULL
            ORDER BY r.id
            "#
        } else {
            r#"
            SELECT r.id, r.vehicle_id, r.customer_id, r.start_date, r.end_date,
                   r.total_cost, r.return_date, c.name AS customer_name,
                   v.brand AS vehicle_brand, v.model AS vehicle_model
            FROM rentals r
            JOIN customers c ON r.customer_id = c.id
            JOIN vehicles v ON r.vehicle_id = v.id
            ORDER BY r.id
            "#
        };

        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list rentals")?;

        rows.iter().map(Self::row_to_rental_record).collect()
    }

    /// Get the open rental for a vehicle, if any.
    pub async fn get_open_rental_for_vehicle(
        &self,
        vehicle_id: VehicleId,
    ) -> Result<Option<RentalRecord>> {
        let row = sqlx::query(
            r#"
            SELECT r.id, r.vehicle_id, r.customer_id, r.start_date, r.end_date,
                   r.total_cost, r.return_date, c.name AS customer_name,
                   v.brand AS vehicle_brand, v.model AS vehicle_model
            FROM rentals r
            JOIN customers c ON r.customer_id = c.id
            JOIN vehicles v ON r.vehicle_id = v.id
            WHERE r.vehicle_id = ? AND r.return_date IS NULL
            "#,
        )
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch open rental")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_rental_record(&row)?)),
            None => Ok(None),
        }
    }

    /// Count rentals for a vehicle (total and still open).
    pub async fn count_rentals_for_vehicle(&self, vehicle_id: VehicleId) -> Result<(i64, i64)> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) as total_count,
                COALESCE(SUM(CASE WHEN return_date IS NULL THEN 1 ELSE 0 END), 0) as open_count
            FROM rentals
            WHERE vehicle_id = ?
            "#,
        )
        .bind(vehicle_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count rentals")?;

        Ok((row.get("total_count"), row.get("open_count")))
    }

    // ========================
    // Integrity
    // ========================

    /// Audit the store against the ledger's invariants.
    pub async fn get_integrity_report(&self) -> Result<IntegrityReport> {
        let vehicle_count: i64 = sqlx::query("SELECT COUNT(*) as count FROM vehicles")
            .fetch_one(&self.pool)
            .await?
            .get("count");

        let customer_count: i64 = sqlx::query("SELECT COUNT(*) as count FROM customers")
            .fetch_one(&self.pool)
            .await?
            .get("count");

        let rental_count: i64 = sqlx::query("SELECT COUNT(*) as count FROM rentals")
            .fetch_one(&self.pool)
            .await?
            .get("count");

        let open_rental_count: i64 =
            sqlx::query("SELECT COUNT(*) as count FROM rentals WHERE return_date IS NULL")
                .fetch_one(&self.pool)
                .await?
                .get("count");

        // Availability flag vs open-rental row, both directions.
        let unavailable_without_open_rental: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) as count
            FROM vehicles v
            WHERE v.is_available = 0
              AND NOT EXISTS (
                  SELECT 1 FROM rentals r
                  WHERE r.vehicle_id = v.id AND r.return_date IS NULL
              )
            "#,
        )
        .fetch_one(&self.pool)
        .await?
        .get("count");

        let available_with_open_rental: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) as count
            FROM vehicles v
            WHERE v.is_available = 1
              AND EXISTS (
                  SELECT 1 FROM rentals r
                  WHERE r.vehicle_id = v.id AND r.return_date IS NULL
              )
            "#,
        )
        .fetch_one(&self.pool)
        .await?
        .get("count");

        let multiple_open_rentals: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) as count FROM (
                SELECT vehicle_id
                FROM rentals
                WHERE return_date IS NULL
                GROUP BY vehicle_id
                HAVING COUNT(*) > 1
            )
            "#,
        )
        .fetch_one(&self.pool)
        .await?
        .get("count");

        let orphaned_rentals: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) as count
            FROM rentals r
            WHERE NOT EXISTS (SELECT 1 FROM vehicles v WHERE v.id = r.vehicle_id)
               OR NOT EXISTS (SELECT 1 FROM customers c WHERE c.id = r.customer_id)
            "#,
        )
        .fetch_one(&self.pool)
        .await?
        .get("count");

        let negative_costs: i64 =
            sqlx::query("SELECT COUNT(*) as count FROM rentals WHERE total_cost < 0")
                .fetch_one(&self.pool)
                .await?
                .get("count");

        let inverted_periods: i64 =
            sqlx::query("SELECT COUNT(*) as count FROM rentals WHERE end_date < start_date")
                .fetch_one(&self.pool)
                .await?
                .get("count");

        Ok(IntegrityReport {
            vehicle_count,
            customer_count,
            rental_count,
            open_rental_count,
            unavailable_without_open_rental,
            available_with_open_rental,
            multiple_open_rentals,
            orphaned_rentals,
            negative_costs,
            inverted_periods,
        })
    }

    fn row_to_rental_record(row: &sqlx::sqlite::SqliteRow) -> Result<RentalRecord> {
        let return_date_str: Option<String> = row.get("return_date");

        Ok(RentalRecord {
            rental: Rental {
                id: row.get("id"),
                vehicle_id: row.get("vehicle_id"),
                customer_id: row.get("customer_id"),
                start_date: Self::parse_stored_date(row.get("start_date"))?,
                end_date: Self::parse_stored_date(row.get("end_date"))?,
                total_cost: row.get("total_cost"),
                return_date: return_date_str
                    .map(|s| Self::parse_stored_date(s))
                    .transpose()?,
            },
            customer_name: row.get("customer_name"),
            vehicle_brand: row.get("vehicle_brand"),
            vehicle_model: row.get("vehicle_model"),
        })
    }

    fn parse_stored_date(s: String) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .with_context(|| format!("Invalid date in store: {}", s))
    }
}
