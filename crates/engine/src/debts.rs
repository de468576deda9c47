//! Money owed by the user.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Extra, Money};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: String,
    pub who: String,
    pub why: String,
    pub original_amount: Money,
    /// Always within `0..=original_amount`. The debt is settled, and removed,
    /// once this reaches zero.
    pub remaining_amount: Money,
    pub due_date: NaiveDate,
    pub timestamp: i64,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Debt {
    pub fn paid(&self) -> Money {
        self.original_amount - self.remaining_amount
    }
}
