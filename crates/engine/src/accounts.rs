//! The module contains `Account` struct and the reserved default accounts.

use serde::{Deserialize, Serialize};

use crate::{EngineError, Extra, Money, ResultEngine, TransactionKind};

/// Id of the reserved cash account. Its name cannot be changed.
pub const CASH_ACCOUNT_ID: &str = "cash";

/// Accounts guaranteed to exist in every document, as `(id, default name)`.
pub const DEFAULT_ACCOUNTS: [(&str, &str); 4] = [
    (CASH_ACCOUNT_ID, "Cash"),
    ("bank_1", "Commercial"),
    ("bank_2", "HNB"),
    ("bank_3", "Genie"),
];

/// An account.
///
/// An account is where money is actually held: cash in hand or a bank
/// account. Credit cards are tracked separately, see [`crate::CreditCard`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Stable slug; records reference accounts by this id, so an account can
    /// be renamed without breaking them.
    pub id: String,
    pub name: String,
    pub balance: Money,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Account {
    pub fn new(id: impl Into<String>, name: impl Into<String>, balance: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            balance,
            extra: Extra::new(),
        }
    }

    /// `true` for the reserved cash account.
    pub fn is_reserved(&self) -> bool {
        self.id == CASH_ACCOUNT_ID
    }

    /// Applies the balance effect of a transaction of `kind`.
    pub fn apply(&mut self, kind: TransactionKind, amount: Money) -> ResultEngine<()> {
        self.adjust(kind.signed(amount))
    }

    /// Reverts the balance effect of a transaction of `kind`.
    pub fn revert(&mut self, kind: TransactionKind, amount: Money) -> ResultEngine<()> {
        self.adjust(-kind.signed(amount))
    }

    /// Adds `delta` to the balance, rejecting results beyond [`Money::MAX`].
    pub fn adjust(&mut self, delta: Money) -> ResultEngine<()> {
        self.balance = self.balance.checked_add(delta).ok_or_else(|| {
            EngineError::Validation(format!("balance of {} would overflow", self.name))
        })?;
        Ok(())
    }
}

/// The default account set with zero balances.
pub fn default_accounts() -> Vec<Account> {
    DEFAULT_ACCOUNTS
        .iter()
        .map(|(id, name)| Account::new(*id, *name, Money::ZERO))
        .collect()
}

/// Default display name of a reserved account id.
pub fn default_account_name(id: &str) -> Option<&'static str> {
    DEFAULT_ACCOUNTS
        .iter()
        .find(|(default_id, _)| *default_id == id)
        .map(|(_, name)| *name)
}
