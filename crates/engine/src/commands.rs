//! Command structs for ledger operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use chrono::NaiveDate;

use crate::{Money, ReceivableKind, TransactionKind};

/// Create or edit a one-off income/expense.
#[derive(Clone, Debug)]
pub struct TransactionInput {
    pub kind: TransactionKind,
    pub amount: Money,
    pub account: String,
    /// Required for expenses, ignored for income.
    pub category: Option<String>,
    pub description: String,
    pub date: NaiveDate,
}

impl TransactionInput {
    #[must_use]
    pub fn income(
        amount: Money,
        account: impl Into<String>,
        description: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            kind: TransactionKind::Income,
            amount,
            account: account.into(),
            category: None,
            description: description.into(),
            date,
        }
    }

    #[must_use]
    pub fn expense(
        amount: Money,
        account: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            kind: TransactionKind::Expense,
            amount,
            account: account.into(),
            category: Some(category.into()),
            description: description.into(),
            date,
        }
    }
}

/// Move money between two accounts.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub from: String,
    pub to: String,
    pub amount: Money,
}

impl TransferCmd {
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: Money) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }
}

/// Pay down a debt or a credit-card item from an account.
#[derive(Clone, Debug)]
pub struct PaymentCmd {
    pub amount: Money,
    pub account: String,
    /// When set, the payment is also logged as an expense in this category.
    pub expense_category: Option<String>,
}

impl PaymentCmd {
    #[must_use]
    pub fn new(amount: Money, account: impl Into<String>) -> Self {
        Self {
            amount,
            account: account.into(),
            expense_category: None,
        }
    }

    #[must_use]
    pub fn log_as_expense(mut self, category: impl Into<String>) -> Self {
        self.expense_category = Some(category.into());
        self
    }
}

#[derive(Clone, Debug)]
pub struct NewDebt {
    pub who: String,
    pub why: String,
    pub amount: Money,
    pub due_date: NaiveDate,
}

impl NewDebt {
    #[must_use]
    pub fn new(
        who: impl Into<String>,
        why: impl Into<String>,
        amount: Money,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            who: who.into(),
            why: why.into(),
            amount,
            due_date,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DebtEdit {
    pub who: String,
    pub why: String,
    pub original_amount: Money,
    pub remaining_amount: Money,
    pub due_date: NaiveDate,
}

#[derive(Clone, Debug)]
pub struct NewReceivable {
    pub who: String,
    pub why: String,
    pub amount: Money,
    pub date_given: NaiveDate,
    pub kind: ReceivableKind,
    pub source_account: Option<String>,
}

impl NewReceivable {
    /// Cash lent out of `source_account`, debited immediately.
    #[must_use]
    pub fn cash(
        who: impl Into<String>,
        why: impl Into<String>,
        amount: Money,
        date_given: NaiveDate,
        source_account: impl Into<String>,
    ) -> Self {
        Self {
            who: who.into(),
            why: why.into(),
            amount,
            date_given,
            kind: ReceivableKind::Cash,
            source_account: Some(source_account.into()),
        }
    }

    /// Money lent through the credit card; no account is touched.
    #[must_use]
    pub fn cc(
        who: impl Into<String>,
        why: impl Into<String>,
        amount: Money,
        date_given: NaiveDate,
    ) -> Self {
        Self {
            who: who.into(),
            why: why.into(),
            amount,
            date_given,
            kind: ReceivableKind::Cc,
            source_account: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ReceivableEdit {
    pub who: String,
    pub why: String,
    pub original_amount: Money,
    pub remaining_amount: Money,
    pub date_given: NaiveDate,
    pub kind: ReceivableKind,
    pub source_account: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NewInstallment {
    pub description: String,
    pub full_amount: Money,
    pub total_months: u32,
    /// Defaults to `total_months` when `None` or out of range.
    pub months_left: Option<u32>,
    pub start_date: NaiveDate,
}

impl NewInstallment {
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        full_amount: Money,
        total_months: u32,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            description: description.into(),
            full_amount,
            total_months,
            months_left: None,
            start_date,
        }
    }

    #[must_use]
    pub fn months_left(mut self, months_left: u32) -> Self {
        self.months_left = Some(months_left);
        self
    }
}

#[derive(Clone, Debug)]
pub struct InstallmentEdit {
    pub description: String,
    pub full_amount: Money,
    pub total_months: u32,
    pub months_left: u32,
    pub start_date: NaiveDate,
}

/// Create or edit a credit-card purchase.
#[derive(Clone, Debug)]
pub struct CcItemInput {
    pub amount: Money,
    pub description: String,
    pub date: NaiveDate,
}

impl CcItemInput {
    #[must_use]
    pub fn new(amount: Money, description: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            amount,
            description: description.into(),
            date,
        }
    }
}

/// Opening values for one default account.
#[derive(Clone, Debug)]
pub struct SetupAccount {
    pub id: String,
    /// `None` or blank keeps the default name.
    pub name: Option<String>,
    pub balance: Money,
}

impl SetupAccount {
    #[must_use]
    pub fn new(id: impl Into<String>, balance: Money) -> Self {
        Self {
            id: id.into(),
            name: None,
            balance,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// First-run setup.
#[derive(Clone, Debug, Default)]
pub struct SetupCmd {
    pub accounts: Vec<SetupAccount>,
    /// `None` disables the credit-card section.
    pub cc_limit: Option<Money>,
    /// Empty keeps the default categories.
    pub categories: Vec<String>,
}

impl SetupCmd {
    #[must_use]
    pub fn account(mut self, account: SetupAccount) -> Self {
        self.accounts.push(account);
        self
    }

    #[must_use]
    pub fn cc_limit(mut self, limit: Money) -> Self {
        self.cc_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }
}
