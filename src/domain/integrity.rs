/// Result of auditing the store against the ledger's invariants.
///
/// The central rule: a vehicle is flagged unavailable exactly while it has
/// one open rental. Everything the audit counts is a violation of that rule
/// or of basic referential/cost sanity.
#[derive(Debug, Clone)]
pub struct IntegrityReport {
    pub vehicle_count: i64,
    pub customer_count: i64,
    pub rental_count: i64,
    pub open_rental_count: i64,
    /// Vehicles flagged unavailable with no open rental backing the flag.
    pub unavailable_without_open_rental: i64,
    /// Vehicles flagged available despite an open rental (double-booking risk).
    pub available_with_open_rental: i64,
    /// Vehicles with more than one open rental at once.
    pub multiple_open_rentals: i64,
    /// Rentals referencing a missing vehicle or customer row.
    pub orphaned_rentals: i64,
    /// Rentals with a negative total cost.
    pub negative_costs: i64,
    /// Rentals whose end date precedes their start date.
    pub inverted_periods: i64,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.unavailable_without_open_rental == 0
            && self.available_with_open_rental == 0
            && self.multiple_open_rentals == 0
            && self.orphaned_rentals == 0
            && self.negative_costs == 0
            && self.inverted_periods == 0
    }

    /// Human-readable description of each violation found.
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.unavailable_without_open_rental > 0 {
            issues.push(format!(
                "{} vehicle(s) marked unavailable with no open rental",
                self.unavailable_without_open_rental
            ));
        }
        if self.available_with_open_rental > 0 {
            issues.push(format!(
                "{} vehicle(s) marked available despite an open rental",
                self.available_with_open_rental
            ));
        }
        if self.multiple_open_rentals > 0 {
            issues.push(format!(
                "{} vehicle(s) with more than one open rental",
                self.multiple_open_rentals
            ));
        }
        if self.orphaned_rentals > 0 {
            issues.push(format!(
                "{} rental(s) referencing a missing vehicle or customer",
                self.orphaned_rentals
            ));
        }
        if self.negative_costs > 0 {
            issues.push(format!(
                "{} rental(s) with a negative total cost",
                self.negative_costs
            ));
        }
        if self.inverted_periods > 0 {
            issues.push(format!(
                "{} rental(s) ending before they start",
                self.inverted_periods
            ));
        }

        issues
    }
}
