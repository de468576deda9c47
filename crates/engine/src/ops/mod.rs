use std::fmt;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::{
    Clock, Document, EngineError, Money, ResultEngine, SanitizeReport, SourceKind, SourceRef,
    Storage, SystemClock, Transaction, TransactionKind,
    categories::find_category,
    util::{new_id, normalize_required_text},
};

mod accounts;
mod categories;
mod credit_card;
mod debts;
mod installments;
mod persistence;
mod receivables;
mod settings;
mod transactions;

pub use persistence::rehydrate;

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "KaasiData";

/// A non-blocking condition noticed while applying a mutation.
///
/// The mutation is committed regardless; the caller decides how to show it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerWarning {
    /// An expense was booked for more than the account held.
    InsufficientFunds {
        account: String,
        balance: Money,
        amount: Money,
    },
    /// An account ended up below zero.
    NegativeBalance { account: String, balance: Money },
    /// A deleted record had already moved money that stays moved.
    EffectNotReversed {
        record: SourceKind,
        id: String,
        amount: Money,
    },
}

impl fmt::Display for LedgerWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientFunds {
                account,
                balance,
                amount,
            } => write!(
                f,
                "insufficient funds in {account}: balance {balance}, expense {amount}"
            ),
            Self::NegativeBalance { account, balance } => {
                write!(f, "{account} balance is now negative ({balance})")
            }
            Self::EffectNotReversed { record, id, amount } => write!(
                f,
                "{} {id} deleted; {amount} already moved through accounts was not reversed",
                record.label()
            ),
        }
    }
}

/// Result of a committed mutation.
#[derive(Clone, Debug, PartialEq)]
pub struct Receipt<T> {
    pub value: T,
    pub warnings: Vec<LedgerWarning>,
}

/// Outcome of a payment against a debt, receivable, installment or card item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentOutcome {
    /// What is still owed after the payment.
    pub remaining: Money,
    /// `true` when the payment settled the record.
    pub settled: bool,
    /// Id of the transaction logged for the payment, if any.
    pub transaction_id: Option<String>,
}

/// How the working document was obtained at startup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Something was stored under the key.
    pub found: bool,
    /// The stored bytes could not be parsed; the default document is used.
    pub corrupt: bool,
    pub sanitize: SanitizeReport,
}

/// The ledger engine.
///
/// Owns the working [`Document`] and the store it is persisted into. Every
/// mutation runs against a copy of the document and is swapped in only when
/// it succeeds, so a rejected call leaves the state exactly as it was.
#[derive(Debug)]
pub struct Ledger<S: Storage> {
    document: Document,
    storage: S,
    storage_key: String,
    clock: Box<dyn Clock>,
    last_timestamp: i64,
}

impl<S: Storage> Ledger<S> {
    /// Return a builder for `Ledger`. Help to build the struct.
    pub fn builder(storage: S) -> LedgerBuilder<S> {
        LedgerBuilder {
            storage,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            clock: Box::new(SystemClock),
        }
    }

    /// Read-only view of the working document.
    pub fn state(&self) -> &Document {
        &self.document
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Runs `f` on a draft of the document and commits it on success.
    ///
    /// The committed document is then persisted. A storage failure is
    /// returned as an error but the commit stays in memory.
    fn with_tx<T>(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut Draft<'_>) -> ResultEngine<T>,
    ) -> ResultEngine<Receipt<T>> {
        let mut draft = Draft {
            doc: self.document.clone(),
            warnings: Vec::new(),
            clock: self.clock.as_ref(),
            last_timestamp: self.last_timestamp,
        };
        let value = match f(&mut draft) {
            Ok(value) => value,
            Err(err) => {
                debug!(operation, error = %err, "mutation rejected");
                return Err(err);
            }
        };

        let Draft {
            doc,
            warnings,
            last_timestamp,
            ..
        } = draft;
        self.document = doc;
        self.last_timestamp = last_timestamp;
        debug!(operation, warnings = warnings.len(), "mutation committed");

        self.persist()?;
        Ok(Receipt { value, warnings })
    }

    fn persist(&mut self) -> ResultEngine<()> {
        let payload = serde_json::to_vec(&self.document)?;
        match self.storage.save(&self.storage_key, &payload) {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(key = %self.storage_key, error = %err, "document not persisted");
                Err(err)
            }
        }
    }
}

/// The builder for `Ledger`
pub struct LedgerBuilder<S: Storage> {
    storage: S,
    storage_key: String,
    clock: Box<dyn Clock>,
}

impl<S: Storage> LedgerBuilder<S> {
    /// Key the document is stored under.
    #[must_use]
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Construct `Ledger` from whatever is stored under the key.
    ///
    /// Missing or corrupt bytes yield the default document; only a failing
    /// store is an error.
    pub fn load_or_initialize(self) -> ResultEngine<(Ledger<S>, LoadReport)> {
        let raw = self.storage.load(&self.storage_key)?;
        let mut report = LoadReport {
            found: raw.is_some(),
            ..LoadReport::default()
        };

        let document = match raw {
            None => {
                info!(key = %self.storage_key, "no stored document, starting fresh");
                Document::default()
            }
            Some(bytes) => match persistence::parse_object(&bytes) {
                Ok(source) => {
                    let sanitized = rehydrate(&source);
                    report.sanitize = sanitized.report;
                    info!(
                        key = %self.storage_key,
                        repairs = report.sanitize.repairs.len(),
                        "document loaded"
                    );
                    sanitized.document
                }
                Err(err) => {
                    warn!(key = %self.storage_key, error = %err, "stored document is corrupt, using defaults");
                    report.corrupt = true;
                    Document::default()
                }
            },
        };

        let ledger = Ledger {
            document,
            storage: self.storage,
            storage_key: self.storage_key,
            clock: self.clock,
            last_timestamp: 0,
        };
        Ok((ledger, report))
    }
}

/// Working copy of the document inside [`Ledger::with_tx`].
pub(crate) struct Draft<'a> {
    pub(crate) doc: Document,
    warnings: Vec<LedgerWarning>,
    clock: &'a dyn Clock,
    last_timestamp: i64,
}

impl Draft<'_> {
    /// Creation timestamp for a new record, strictly increasing per ledger.
    pub(crate) fn next_timestamp(&mut self) -> i64 {
        let now = self.clock.now().timestamp_millis();
        let timestamp = now.max(self.last_timestamp + 1);
        self.last_timestamp = timestamp;
        timestamp
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub(crate) fn warn(&mut self, warning: LedgerWarning) {
        warn!(%warning, "ledger warning");
        self.warnings.push(warning);
    }

    /// Debits `account` or rejects when it cannot cover `amount`.
    pub(crate) fn debit(&mut self, account: &str, amount: Money) -> ResultEngine<()> {
        let account = self.doc.account_mut(account)?;
        if account.balance < amount {
            return Err(EngineError::InsufficientFunds(format!(
                "{} holds {}, needs {}",
                account.name, account.balance, amount
            )));
        }
        account.adjust(-amount)
    }

    pub(crate) fn credit(&mut self, account: &str, amount: Money) -> ResultEngine<()> {
        self.doc.account_mut(account)?.adjust(amount)
    }

    /// Warns when `account` is below zero.
    pub(crate) fn check_negative(&mut self, account: &str) -> ResultEngine<()> {
        let account = self.doc.account(account)?;
        if account.balance.is_negative() {
            let warning = LedgerWarning::NegativeBalance {
                account: account.name.clone(),
                balance: account.balance,
            };
            self.warn(warning);
        }
        Ok(())
    }

    /// Stored spelling of an existing category.
    pub(crate) fn resolve_category(&self, name: &str) -> ResultEngine<String> {
        let name = normalize_required_text(name, "category")?;
        find_category(&self.doc.categories, &name)
            .map(ToString::to_string)
            .ok_or_else(|| EngineError::NotFound(format!("category {name}")))
    }

    /// Appends a transaction generated by a payment, dated today.
    ///
    /// The balance effect is applied by the caller.
    pub(crate) fn log_payment(
        &mut self,
        kind: TransactionKind,
        amount: Money,
        account: &str,
        category: Option<String>,
        description: String,
        source: SourceRef,
    ) -> String {
        let id = new_id();
        let transaction = Transaction {
            id: id.clone(),
            kind,
            amount,
            account: account.to_string(),
            category,
            description,
            date: self.today(),
            timestamp: self.next_timestamp(),
            source_ref: Some(source),
            extra: Default::default(),
        };
        self.doc.transactions.push(transaction);
        id
    }
}

fn require_positive(amount: Money, label: &str) -> ResultEngine<Money> {
    if !amount.is_positive() {
        return Err(EngineError::Validation(format!(
            "{label} must be greater than zero"
        )));
    }
    require_in_range(amount, label)
}

fn require_in_range(amount: Money, label: &str) -> ResultEngine<Money> {
    if amount > Money::MAX || amount < -Money::MAX {
        return Err(EngineError::Validation(format!("{label} is out of range")));
    }
    Ok(amount)
}

/// `amount` must be positive and cover at most `outstanding`.
fn require_payment(amount: Money, outstanding: Money) -> ResultEngine<Money> {
    require_positive(amount, "payment amount")?;
    if amount > outstanding {
        return Err(EngineError::Validation(format!(
            "payment of {amount} exceeds the {outstanding} outstanding"
        )));
    }
    Ok(amount)
}

/// Validates `(original, remaining)` of an edited debt or receivable.
fn require_outstanding(original: Money, remaining: Money) -> ResultEngine<()> {
    require_positive(original, "original amount")?;
    if remaining.is_negative() || remaining > original {
        return Err(EngineError::Validation(format!(
            "remaining amount must be between 0 and {original}"
        )));
    }
    Ok(())
}
