//! Money owed to the user.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Extra, Money};

/// How the money was lent.
///
/// `Cash` debits a source account when the receivable is created. `Cc` was
/// lent through the credit line and touches no account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceivableKind {
    Cash,
    Cc,
}

impl ReceivableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Cc => "cc",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receivable {
    pub id: String,
    pub who: String,
    pub why: String,
    pub original_amount: Money,
    pub remaining_amount: Money,
    pub date_given: NaiveDate,
    #[serde(rename = "type")]
    pub kind: ReceivableKind,
    /// Account debited at creation. Required for `Cash`.
    #[serde(default)]
    pub source_account: Option<String>,
    pub timestamp: i64,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Receivable {
    /// The account debited at creation, if any.
    pub fn cash_source(&self) -> Option<&str> {
        match self.kind {
            ReceivableKind::Cash => self.source_account.as_deref(),
            ReceivableKind::Cc => None,
        }
    }
}
