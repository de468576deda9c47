//! Multi-month installment plans.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Extra, Money};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub id: String,
    pub description: String,
    /// `original_full_amount / total_months`, rounded to cents.
    pub monthly_amount: Money,
    pub total_months: u32,
    pub months_left: u32,
    pub original_full_amount: Money,
    pub start_date: NaiveDate,
    pub timestamp: i64,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Installment {
    /// 1-based number of the month the next payment covers.
    pub fn current_month(&self) -> u32 {
        self.total_months - self.months_left + 1
    }

    pub fn amount_left(&self) -> Money {
        self.monthly_amount.times(self.months_left)
    }

    pub fn is_complete(&self) -> bool {
        self.months_left == 0
    }
}
