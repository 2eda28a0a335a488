use serde::{Deserialize, Serialize};

use crate::domain::{ApartmentId, Cents};
use crate::storage::ChargeTotals;

use super::ChargeFilter;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeSummary {
    pub apartment_id: Option<ApartmentId>,
    pub period: Option<String>,
    pub paid_count: i64,
    pub unpaid_count: i64,
    pub collected: Cents,
    pub outstanding: Cents,
}

impl ChargeSummary {
    pub fn new(filter: ChargeFilter, totals: ChargeTotals) -> Self {
        Self {
            apartment_id: filter.apartment_id,
            period: filter.period,
            paid_count: totals.paid_count,
            unpaid_count: totals.unpaid_count,
            collected: totals.collected,
            outstanding: totals.outstanding,
        }
    }

    pub fn total_count(&self) -> i64 {
        self.paid_count + self.unpaid_count
    }

    pub fn total_billed(&self) -> Cents {
        self.collected + self.outstanding
    }

    /// Share of the billed amount already collected, as a percentage.
    pub fn collection_rate(&self) -> f64 {
        let billed = self.total_billed();
        if billed == 0 {
            0.0
        } else {
            self.collected as f64 / billed as f64 * 100.0
        }
    }
}
