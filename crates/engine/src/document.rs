//! The persisted root document and its default-state factory.
//!
//! `Document::default()` is the canonical empty ledger: every caller gets an
//! independent value, so nothing is shared between engine instances.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    Account, CreditCard, Debt, EngineError, Installment, Receivable, ResultEngine, Transaction,
    accounts::default_accounts, categories::default_categories,
};

/// Unknown fields of a record, carried through load and save untouched.
pub type Extra = Map<String, Value>;

pub const DEFAULT_THEME: &str = "dark";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub initial_setup_done: bool,
    pub show_cc_dashboard_section: bool,
    pub theme: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_setup_done: false,
            show_cc_dashboard_section: true,
            theme: DEFAULT_THEME.to_string(),
            extra: Extra::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub transactions: Vec<Transaction>,
    pub accounts: Vec<Account>,
    pub categories: Vec<String>,
    pub debts: Vec<Debt>,
    pub receivables: Vec<Receivable>,
    pub installments: Vec<Installment>,
    pub credit_card: CreditCard,
    pub settings: Settings,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            transactions: Vec::new(),
            accounts: default_accounts(),
            categories: default_categories(),
            debts: Vec::new(),
            receivables: Vec::new(),
            installments: Vec::new(),
            credit_card: CreditCard::default(),
            settings: Settings::default(),
            extra: Extra::new(),
        }
    }
}

impl Document {
    /// The default document as a JSON object, the base every load and import
    /// is merged onto.
    pub fn default_value() -> Map<String, Value> {
        match serde_json::to_value(Self::default()) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    pub fn to_value(&self) -> ResultEngine<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(EngineError::CorruptData(
                "document did not serialize to an object".to_string(),
            )),
        }
    }

    pub fn account(&self, id: &str) -> ResultEngine<&Account> {
        self.accounts
            .iter()
            .find(|account| account.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("account {id}")))
    }

    pub fn account_mut(&mut self, id: &str) -> ResultEngine<&mut Account> {
        self.accounts
            .iter_mut()
            .find(|account| account.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("account {id}")))
    }

    pub fn transaction(&self, id: &str) -> ResultEngine<&Transaction> {
        self.transactions
            .iter()
            .find(|tx| tx.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("transaction {id}")))
    }

    pub fn debt(&self, id: &str) -> ResultEngine<&Debt> {
        self.debts
            .iter()
            .find(|debt| debt.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("debt {id}")))
    }

    pub fn receivable(&self, id: &str) -> ResultEngine<&Receivable> {
        self.receivables
            .iter()
            .find(|receivable| receivable.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("receivable {id}")))
    }

    pub fn installment(&self, id: &str) -> ResultEngine<&Installment> {
        self.installments
            .iter()
            .find(|plan| plan.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("installment {id}")))
    }

    pub fn cc_item(&self, id: &str) -> ResultEngine<&crate::CreditCardTransaction> {
        self.credit_card
            .transactions
            .iter()
            .find(|item| item.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("credit card item {id}")))
    }

    /// Transactions newest first, ordered by date and then creation order.
    pub fn transactions_newest_first(&self) -> Vec<&Transaction> {
        let mut sorted: Vec<&Transaction> = self.transactions.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date).then(b.timestamp.cmp(&a.timestamp)));
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CASH_ACCOUNT_ID, Money, OTHER};

    #[test]
    fn default_document_shape() {
        let doc = Document::default();
        assert!(doc.transactions.is_empty());
        assert!(doc.account(CASH_ACCOUNT_ID).is_ok());
        assert!(doc.accounts.iter().all(|a| a.balance == Money::ZERO));
        assert!(doc.categories.iter().any(|c| c == OTHER));
        assert_eq!(doc.credit_card.limit, Money::ZERO);
        assert!(!doc.settings.initial_setup_done);
    }

    #[test]
    fn default_value_uses_wire_names() {
        let value = Document::default_value();
        assert!(value.contains_key("creditCard"));
        assert_eq!(value["settings"]["initialSetupDone"], Value::Bool(false));
        assert_eq!(value["creditCard"]["limit"], serde_json::json!(0.0));
    }

    #[test]
    fn defaults_are_independent() {
        let mut first = Document::default();
        first.categories.clear();
        assert!(!Document::default().categories.is_empty());
    }
}
