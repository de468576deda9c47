//! State integrity and reconciliation engine of a personal ledger.
//!
//! The whole ledger lives in one JSON [`Document`]. [`Ledger`] owns it,
//! loads it through a [`Storage`] (merge onto defaults, then sanitize) and
//! applies every mutation atomically before persisting it again.

pub use accounts::{Account, CASH_ACCOUNT_ID, DEFAULT_ACCOUNTS};
pub use categories::{DEFAULT_CATEGORIES, OTHER};
pub use clock::{Clock, FixedClock, SystemClock, ZonedClock};
pub use commands::{
    CcItemInput, DebtEdit, InstallmentEdit, NewDebt, NewInstallment, NewReceivable, PaymentCmd,
    ReceivableEdit, SetupAccount, SetupCmd, TransactionInput, TransferCmd,
};
pub use credit_card::{CreditCard, CreditCardTransaction};
pub use debts::Debt;
pub use document::{Document, Extra, Settings};
pub use error::EngineError;
pub use installments::Installment;
pub use merge::merge;
pub use money::{Money, TOLERANCE, round2};
pub use ops::{
    DEFAULT_STORAGE_KEY, Ledger, LedgerBuilder, LedgerWarning, LoadReport, PaymentOutcome,
    Receipt, rehydrate,
};
pub use receivables::{Receivable, ReceivableKind};
pub use sanitize::{SanitizeReport, Sanitized, sanitize};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use summary::{
    DashboardTotals, MonthlyBreakdown, PeriodStats, dashboard_totals, monthly_breakdown,
    period_stats,
};
pub use transactions::{SourceKind, SourceRef, Transaction, TransactionKind};

mod accounts;
mod categories;
mod clock;
mod commands;
mod credit_card;
mod debts;
mod document;
mod error;
mod installments;
mod merge;
mod money;
mod ops;
mod receivables;
mod sanitize;
mod storage;
mod summary;
mod transactions;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
