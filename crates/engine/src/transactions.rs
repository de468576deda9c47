//! Transaction primitives.
//!
//! A `Transaction` is a one-off income or expense booked against a single
//! account. Its balance effect is applied when it is added and reverted when
//! it is deleted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{EngineError, Extra, Money};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Balance effect of `amount`: positive for income, negative for expense.
    pub fn signed(self, amount: Money) -> Money {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::Validation(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

/// Kind of record that produced a logged payment transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    Debt,
    Receivable,
    Installment,
    CcItem,
}

impl SourceKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Debt => "debt",
            Self::Receivable => "receivable",
            Self::Installment => "installment",
            Self::CcItem => "credit card item",
        }
    }
}

/// Link from a logged transaction back to the record it was generated for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub kind: SourceKind,
    pub id: String,
}

impl SourceRef {
    pub fn new(kind: SourceKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Money,
    /// Id of the account the transaction is booked against.
    pub account: String,
    /// Set for expenses, `None` for income.
    pub category: Option<String>,
    pub description: String,
    pub date: NaiveDate,
    /// Creation order tiebreaker (epoch milliseconds). Not touched on edit.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<SourceRef>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Transaction {
    pub fn is_linked_to(&self, kind: SourceKind, id: &str) -> bool {
        self.source_ref
            .as_ref()
            .is_some_and(|source| source.kind == kind && source.id == id)
    }
}
