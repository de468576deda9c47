//! The credit-card sub-ledger.
//!
//! Card purchases never touch an account. Paying an item down debits an
//! account and raises the item's `paid_amount` until it is paid off.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Extra, Money};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCardTransaction {
    pub id: String,
    pub amount: Money,
    pub description: String,
    pub date: NaiveDate,
    pub paid_amount: Money,
    /// Derived from `paid_amount`; see [`Self::refresh_paid_off`].
    pub paid_off: bool,
    pub timestamp: i64,
    #[serde(flatten)]
    pub extra: Extra,
}

impl CreditCardTransaction {
    /// Amount still owed on the item.
    pub fn remaining(&self) -> Money {
        self.amount - self.paid_amount
    }

    /// Re-derives `paid_off`. A paid off item has `paid_amount == amount`.
    pub fn refresh_paid_off(&mut self) {
        self.paid_off = self.remaining().is_settled();
        if self.paid_off {
            self.paid_amount = self.amount;
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreditCard {
    pub limit: Money,
    pub transactions: Vec<CreditCardTransaction>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for CreditCard {
    fn default() -> Self {
        Self {
            limit: Money::ZERO,
            transactions: Vec::new(),
            extra: Extra::new(),
        }
    }
}

impl CreditCard {
    /// Sum still owed across all items.
    pub fn used(&self) -> Money {
        self.outstanding().map(CreditCardTransaction::remaining).sum()
    }

    pub fn available(&self) -> Money {
        self.limit - self.used()
    }

    /// Items that still carry an unpaid balance.
    pub fn outstanding(&self) -> impl Iterator<Item = &CreditCardTransaction> {
        self.transactions.iter().filter(|item| !item.paid_off)
    }
}
