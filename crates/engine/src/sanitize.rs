//! Sanitizer and invariant enforcer.
//!
//! Turns a merged JSON object into a typed [`Document`] that satisfies every
//! document invariant. Each rule coerces or fills in what it can and only
//! drops a record when its balance effect cannot be reconstructed (no valid
//! type, amount or date). Unknown fields are carried over untouched.
//!
//! The pass is idempotent: sanitizing the serialized output of a previous
//! pass yields the same document and an empty report.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::warn;

use crate::{
    Account, CreditCard, CreditCardTransaction, Debt, Document, Installment, Money, OTHER,
    Receivable, ReceivableKind, Settings, SourceRef, Transaction, TransactionKind,
    accounts::{DEFAULT_ACCOUNTS, default_account_name},
    categories::{default_categories, find_category, sort_categories},
    document::DEFAULT_THEME,
    util::{date_to_millis, millis_to_date, new_id, parse_date, parse_timestamp},
};

/// What the sanitizer had to change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    /// One human readable line per repair.
    pub repairs: Vec<String>,
    /// Records removed because they could not be repaired.
    pub dropped: usize,
}

impl SanitizeReport {
    pub fn is_clean(&self) -> bool {
        self.repairs.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sanitized {
    pub document: Document,
    pub report: SanitizeReport,
}

/// Repairs `raw` into a valid document.
pub fn sanitize(mut raw: Map<String, Value>) -> Sanitized {
    let mut sanitizer = Sanitizer::default();

    let accounts = sanitizer.take_array(&mut raw, "accounts");
    let categories = sanitizer.take_array(&mut raw, "categories");
    let transactions = sanitizer.take_array(&mut raw, "transactions");
    let debts = sanitizer.take_array(&mut raw, "debts");
    let receivables = sanitizer.take_array(&mut raw, "receivables");
    let installments = sanitizer.take_array(&mut raw, "installments");
    let credit_card = sanitizer.take_object(&mut raw, "creditCard");
    let settings = sanitizer.take_object(&mut raw, "settings");

    sanitizer.accounts(accounts);
    sanitizer.categories(categories);
    sanitizer.finish_categories();

    let transactions = sanitizer.collect("transactions", transactions, Sanitizer::transaction);
    let debts = sanitizer.collect("debts", debts, Sanitizer::debt);
    let receivables = sanitizer.collect("receivables", receivables, Sanitizer::receivable);
    let installments = sanitizer.collect("installments", installments, Sanitizer::installment);
    let credit_card = sanitizer.credit_card(credit_card);
    let settings = sanitizer.settings(settings);

    sanitizer.finish_categories();

    let Sanitizer {
        report,
        accounts,
        categories,
    } = sanitizer;

    Sanitized {
        document: Document {
            transactions,
            accounts,
            categories,
            debts,
            receivables,
            installments,
            credit_card,
            settings,
            extra: raw,
        },
        report,
    }
}

#[derive(Default)]
struct Sanitizer {
    report: SanitizeReport,
    accounts: Vec<Account>,
    categories: Vec<String>,
}

impl Sanitizer {
    fn repair(&mut self, message: String) {
        warn!(repair = %message, "document repaired");
        self.report.repairs.push(message);
    }

    fn take_array(&mut self, raw: &mut Map<String, Value>, key: &str) -> Vec<Value> {
        match raw.remove(key) {
            None => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.repair(format!("{key} was not an array, reset to empty"));
                Vec::new()
            }
        }
    }

    fn take_object(&mut self, raw: &mut Map<String, Value>, key: &str) -> Map<String, Value> {
        match raw.remove(key) {
            None => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                self.repair(format!("{key} was not an object, reset to defaults"));
                Map::new()
            }
        }
    }

    /// Runs `build` over every element, dropping the ones it rejects.
    fn collect<T>(
        &mut self,
        collection: &str,
        items: Vec<Value>,
        build: fn(&mut Self, Map<String, Value>) -> Result<T, String>,
    ) -> Vec<T> {
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let result = match item {
                Value::Object(fields) => build(self, fields),
                _ => Err("not an object".to_string()),
            };
            match result {
                Ok(record) => out.push(record),
                Err(reason) => {
                    self.report.dropped += 1;
                    self.repair(format!("dropped {collection}[{index}]: {reason}"));
                }
            }
        }
        out
    }

    fn accounts(&mut self, items: Vec<Value>) {
        for (index, item) in items.into_iter().enumerate() {
            let Value::Object(mut fields) = item else {
                self.report.dropped += 1;
                self.repair(format!("dropped accounts[{index}]: not an object"));
                continue;
            };
            let Some(id) = take_id(&mut fields) else {
                self.report.dropped += 1;
                self.repair(format!("dropped accounts[{index}]: missing id"));
                continue;
            };
            if self.accounts.iter().any(|account| account.id == id) {
                self.report.dropped += 1;
                self.repair(format!("dropped accounts[{index}]: duplicate id {id}"));
                continue;
            }

            let name = match fields.remove("name") {
                Some(Value::String(name)) => name,
                _ => {
                    let name = default_account_name(&id).unwrap_or(id.as_str()).to_string();
                    self.repair(format!("account {id} had no valid name, reset to {name}"));
                    name
                }
            };
            let balance = match take_money(&mut fields, "balance") {
                Some(balance) => balance,
                None => {
                    self.repair(format!("account {id} had an invalid balance, reset to 0"));
                    Money::ZERO
                }
            };

            self.accounts.push(Account {
                id,
                name,
                balance,
                extra: fields,
            });
        }

        for (id, name) in DEFAULT_ACCOUNTS {
            if !self.accounts.iter().any(|account| account.id == id) {
                self.repair(format!("default account {id} was missing, added"));
                self.accounts.push(Account::new(id, name, Money::ZERO));
            }
        }
    }

    /// Makes sure `id` names an account, adding a placeholder if it does not.
    fn ensure_account(&mut self, id: &str) {
        if !self.accounts.iter().any(|account| account.id == id) {
            self.repair(format!("unknown account {id} referenced, placeholder added"));
            self.accounts.push(Account::new(id, id, Money::ZERO));
        }
    }

    fn categories(&mut self, items: Vec<Value>) {
        for item in items {
            match item {
                Value::String(name) if !name.trim().is_empty() => {
                    self.categories.push(name.trim().to_string());
                }
                other => self.repair(format!("dropped invalid category {other}")),
            }
        }
        if self.categories.is_empty() {
            self.repair("category list was empty, defaults restored".to_string());
            self.categories = default_categories();
        }
    }

    /// Returns the stored spelling of `name`, adding it when unknown.
    ///
    /// An exact match wins over a case-insensitive one, so categories that
    /// differ only in case keep their own transactions.
    fn ensure_category(&mut self, name: &str) -> String {
        if self.categories.iter().any(|category| category == name) {
            return name.to_string();
        }
        if let Some(existing) = find_category(&self.categories, name) {
            return existing.to_string();
        }
        self.repair(format!("category {name} was referenced but missing, added"));
        self.categories.push(name.to_string());
        name.to_string()
    }

    fn finish_categories(&mut self) {
        if find_category(&self.categories, OTHER).is_none() {
            self.repair(format!("category {OTHER} was missing, added"));
            self.categories.push(OTHER.to_string());
        }
        sort_categories(&mut self.categories);
    }

    fn transaction(&mut self, mut fields: Map<String, Value>) -> Result<Transaction, String> {
        let kind = match fields.remove("type") {
            Some(Value::String(kind)) => TransactionKind::try_from(kind.as_str())
                .map_err(|_| format!("unknown type {kind}"))?,
            _ => return Err("missing type".to_string()),
        };
        let amount = positive_amount(&mut fields, "amount")?;
        let account = match fields.remove("account") {
            Some(Value::String(account)) if !account.is_empty() => account,
            _ => return Err("missing account".to_string()),
        };
        let (date, timestamp) = self.dated(&mut fields, "date")?;
        let id = self.id_or_new(&mut fields, "transaction");

        self.ensure_account(&account);

        let category = match (kind, fields.remove("category")) {
            (TransactionKind::Expense, Some(Value::String(name))) if !name.trim().is_empty() => {
                Some(self.ensure_category(name.trim()))
            }
            (TransactionKind::Expense, _) => {
                self.repair(format!("expense {id} had no category, set to {OTHER}"));
                Some(OTHER.to_string())
            }
            (TransactionKind::Income, None | Some(Value::Null)) => None,
            (TransactionKind::Income, Some(_)) => {
                self.repair(format!("income {id} had a category, cleared"));
                None
            }
        };
        let description = take_text(&mut fields, "description");
        let source_ref = match fields.remove("sourceRef") {
            None | Some(Value::Null) => None,
            Some(value) => match serde_json::from_value::<SourceRef>(value) {
                Ok(source) => Some(source),
                Err(_) => {
                    self.repair(format!("transaction {id} had an invalid sourceRef, cleared"));
                    None
                }
            },
        };

        Ok(Transaction {
            id,
            kind,
            amount,
            account,
            category,
            description,
            date,
            timestamp,
            source_ref,
            extra: fields,
        })
    }

    fn debt(&mut self, mut fields: Map<String, Value>) -> Result<Debt, String> {
        let (original_amount, remaining_amount) = self.outstanding(&mut fields)?;
        let (due_date, timestamp) = self.dated(&mut fields, "dueDate")?;
        let id = self.id_or_new(&mut fields, "debt");

        Ok(Debt {
            id,
            who: take_text(&mut fields, "who"),
            why: take_text(&mut fields, "why"),
            original_amount,
            remaining_amount,
            due_date,
            timestamp,
            extra: fields,
        })
    }

    fn receivable(&mut self, mut fields: Map<String, Value>) -> Result<Receivable, String> {
        let (original_amount, remaining_amount) = self.outstanding(&mut fields)?;
        let (date_given, timestamp) = self.dated(&mut fields, "dateGiven")?;
        let id = self.id_or_new(&mut fields, "receivable");

        let source_account = match fields.remove("sourceAccount") {
            Some(Value::String(account)) if !account.is_empty() => Some(account),
            _ => None,
        };
        let kind = match fields.remove("type") {
            Some(Value::String(kind)) if kind == "cash" && source_account.is_some() => {
                ReceivableKind::Cash
            }
            Some(Value::String(kind)) if kind == "cc" => ReceivableKind::Cc,
            other => {
                let kind = if source_account.is_some() {
                    ReceivableKind::Cash
                } else {
                    ReceivableKind::Cc
                };
                let found = other.map_or_else(|| "nothing".to_string(), |v| v.to_string());
                self.repair(format!(
                    "receivable {id} had type {found}, set to {}",
                    kind.as_str()
                ));
                kind
            }
        };
        if let Some(account) = &source_account {
            self.ensure_account(account);
        }

        Ok(Receivable {
            id,
            who: take_text(&mut fields, "who"),
            why: take_text(&mut fields, "why"),
            original_amount,
            remaining_amount,
            date_given,
            kind,
            source_account,
            timestamp,
            extra: fields,
        })
    }

    fn installment(&mut self, mut fields: Map<String, Value>) -> Result<Installment, String> {
        let total_months = match fields.remove("totalMonths").and_then(|v| v.as_f64()) {
            Some(total) if total >= 1.0 && total <= f64::from(u32::MAX) => total.trunc() as u32,
            _ => return Err("invalid totalMonths".to_string()),
        };
        let stored_left = fields.remove("monthsLeft");
        let months_left = match stored_left.as_ref().and_then(Value::as_f64) {
            Some(left) if left >= 0.0 => (left.trunc() as u64).min(u64::from(total_months)) as u32,
            _ => total_months,
        };
        if months_left == 0 {
            return Err("already complete".to_string());
        }
        if let Some(stored) = stored_left
            && stored.as_f64() != Some(f64::from(months_left))
        {
            self.repair(format!("installment monthsLeft {stored} set to {months_left}"));
        }

        let full = take_money(&mut fields, "originalFullAmount").filter(|m| m.is_positive());
        let monthly = take_money(&mut fields, "monthlyAmount").filter(|m| m.is_positive());
        let (original_full_amount, monthly_amount) = match (full, monthly) {
            (Some(full), Some(monthly)) => (full, monthly),
            (Some(full), None) => (full, full.split(total_months)),
            (None, Some(monthly)) => (monthly.times(total_months), monthly),
            (None, None) => return Err("missing amount".to_string()),
        };
        if !monthly_amount.is_positive() {
            return Err("monthly amount rounds to zero".to_string());
        }
        if original_full_amount > Money::MAX {
            return Err("amount out of range".to_string());
        }
        let (start_date, timestamp) = self.dated(&mut fields, "startDate")?;
        let id = self.id_or_new(&mut fields, "installment");

        Ok(Installment {
            id,
            description: take_text(&mut fields, "description"),
            monthly_amount,
            total_months,
            months_left,
            original_full_amount,
            start_date,
            timestamp,
            extra: fields,
        })
    }

    fn credit_card(&mut self, mut fields: Map<String, Value>) -> CreditCard {
        let limit = match fields.remove("limit") {
            None => Money::ZERO,
            Some(value) => match money(&value) {
                Some(limit) if !limit.is_negative() => limit,
                _ => {
                    self.repair("credit card limit was invalid, reset to 0".to_string());
                    Money::ZERO
                }
            },
        };
        let items = self.take_array(&mut fields, "transactions");
        let transactions = self.collect("creditCard.transactions", items, Sanitizer::cc_item);

        CreditCard {
            limit,
            transactions,
            extra: fields,
        }
    }

    fn cc_item(&mut self, mut fields: Map<String, Value>) -> Result<CreditCardTransaction, String> {
        let amount = positive_amount(&mut fields, "amount")?;
        let (date, timestamp) = self.dated(&mut fields, "date")?;
        let id = self.id_or_new(&mut fields, "credit card item");

        let paid_amount = match take_money(&mut fields, "paidAmount") {
            Some(paid) if paid.is_negative() => {
                self.repair(format!("credit card item {id} had a negative paid amount"));
                Money::ZERO
            }
            Some(paid) if paid > amount => {
                self.repair(format!("credit card item {id} was overpaid, capped"));
                amount
            }
            Some(paid) => paid,
            None => Money::ZERO,
        };
        // `paidOff` is always derived; any stored value is discarded.
        fields.remove("paidOff");

        let mut item = CreditCardTransaction {
            id,
            amount,
            description: take_text(&mut fields, "description"),
            date,
            paid_amount,
            paid_off: false,
            timestamp,
            extra: fields,
        };
        item.refresh_paid_off();
        Ok(item)
    }

    fn settings(&mut self, mut fields: Map<String, Value>) -> Settings {
        let defaults = Settings::default();
        let initial_setup_done =
            self.take_bool(&mut fields, "initialSetupDone", defaults.initial_setup_done);
        let show_cc_dashboard_section = self.take_bool(
            &mut fields,
            "showCcDashboardSection",
            defaults.show_cc_dashboard_section,
        );
        let theme = match fields.remove("theme") {
            None => DEFAULT_THEME.to_string(),
            Some(Value::String(theme)) => theme,
            Some(_) => {
                self.repair("settings.theme was invalid, reset".to_string());
                DEFAULT_THEME.to_string()
            }
        };

        Settings {
            initial_setup_done,
            show_cc_dashboard_section,
            theme,
            extra: fields,
        }
    }

    fn take_bool(&mut self, fields: &mut Map<String, Value>, key: &str, default: bool) -> bool {
        match fields.remove(key) {
            None => default,
            Some(Value::Bool(flag)) => flag,
            Some(_) => {
                self.repair(format!("settings.{key} was invalid, reset"));
                default
            }
        }
    }

    fn id_or_new(&mut self, fields: &mut Map<String, Value>, label: &str) -> String {
        match take_id(fields) {
            Some(id) => id,
            None => {
                let id = new_id();
                self.repair(format!("{label} without id, assigned {id}"));
                id
            }
        }
    }

    /// Reads the record date from `key`, falling back to the day of its
    /// timestamp. The timestamp is backfilled from the date when missing.
    fn dated(
        &mut self,
        fields: &mut Map<String, Value>,
        key: &str,
    ) -> Result<(NaiveDate, i64), String> {
        let timestamp = parse_timestamp(fields.remove("timestamp").as_ref());
        let date = fields.remove(key).as_ref().and_then(parse_date);

        match (date, timestamp) {
            (Some(date), Some(timestamp)) => Ok((date, timestamp)),
            (Some(date), None) => Ok((date, date_to_millis(date))),
            (None, Some(timestamp)) => {
                let date = millis_to_date(timestamp).ok_or_else(|| format!("invalid {key}"))?;
                self.repair(format!("{key} rebuilt from timestamp as {date}"));
                Ok((date, timestamp))
            }
            (None, None) => Err(format!("invalid {key}")),
        }
    }

    /// Reads `(originalAmount, remainingAmount)` of a debt or receivable.
    ///
    /// The original falls back to the legacy `amount` field, then to the
    /// remaining amount. The remaining amount is clamped to `0..=original`.
    fn outstanding(&mut self, fields: &mut Map<String, Value>) -> Result<(Money, Money), String> {
        let legacy = fields.get("amount").and_then(money);
        let original = take_money(fields, "originalAmount").or(legacy);
        let remaining = take_money(fields, "remainingAmount");

        let (original, remaining) = match (original, remaining) {
            (Some(original), Some(remaining)) => (original, remaining),
            (Some(original), None) => (original, original),
            (None, Some(remaining)) => (remaining, remaining),
            (None, None) => return Err("missing amount".to_string()),
        };
        if !original.is_positive() {
            return Err("non-positive amount".to_string());
        }
        let clamped = remaining.clamp(Money::ZERO, original);
        if clamped != remaining {
            self.repair(format!("remaining amount {remaining} clamped to {clamped}"));
        }
        if clamped.is_settled() {
            return Err("already settled".to_string());
        }
        Ok((original, clamped))
    }
}

/// Numbers beyond [`Money::MAX`] count as invalid.
fn money(value: &Value) -> Option<Money> {
    value.as_f64().and_then(Money::try_from_major)
}

fn take_money(fields: &mut Map<String, Value>, key: &str) -> Option<Money> {
    fields.remove(key).as_ref().and_then(money)
}

fn positive_amount(fields: &mut Map<String, Value>, key: &str) -> Result<Money, String> {
    match take_money(fields, key) {
        Some(amount) if amount.is_positive() => Ok(amount),
        Some(_) => Err(format!("non-positive {key}")),
        None => Err(format!("missing {key}")),
    }
}

/// Ids are strings; legacy numeric ids are kept as their decimal text.
fn take_id(fields: &mut Map<String, Value>) -> Option<String> {
    match fields.remove("id") {
        Some(Value::String(id)) if !id.is_empty() => Some(id),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    }
}

fn take_text(fields: &mut Map<String, Value>, key: &str) -> String {
    match fields.remove(key) {
        Some(Value::String(text)) => text,
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CASH_ACCOUNT_ID, merge::merge};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn rehydrate(value: Value) -> Sanitized {
        let mut base = Document::default_value();
        merge(&mut base, &object(value));
        sanitize(base)
    }

    #[test]
    fn default_document_is_clean() {
        let out = sanitize(Document::default_value());
        assert!(out.report.is_clean());
        assert_eq!(out.document, Document::default());
    }

    #[test]
    fn restores_default_accounts_and_resets_bad_balances() {
        let out = rehydrate(json!({
            "accounts": [
                {"id": "cash", "name": 7, "balance": "lots"},
                {"id": "bank_9", "name": "Savings", "balance": 12.345}
            ]
        }));
        let doc = out.document;

        let cash = doc.account(CASH_ACCOUNT_ID).unwrap();
        assert_eq!(cash.name, "Cash");
        assert_eq!(cash.balance, Money::ZERO);
        assert_eq!(doc.account("bank_9").unwrap().balance, Money::new(1235));
        for (id, _) in DEFAULT_ACCOUNTS {
            assert!(doc.account(id).is_ok(), "{id} missing");
        }
        assert!(!out.report.is_clean());
    }

    #[test]
    fn categories_get_defaults_and_other() {
        let empty = rehydrate(json!({"categories": []})).document;
        assert_eq!(empty.categories, default_categories());

        let custom = rehydrate(json!({"categories": ["rent", "Books", 4, " "]})).document;
        assert_eq!(custom.categories, vec!["Books", "Other", "rent"]);
    }

    #[test]
    fn transactions_are_repaired_or_dropped() {
        let out = rehydrate(json!({
            "transactions": [
                {"id": "t1", "type": "expense", "amount": 10.006, "account": "cash",
                 "description": "Tea", "date": "2024-01-05"},
                {"id": "t2", "type": "income", "amount": 5, "account": "wallet_x",
                 "category": "Salary", "description": "Gift", "date": "2024-01-06",
                 "timestamp": 1704500000000i64},
                {"id": "t3", "type": "transfer", "amount": 5, "account": "cash", "date": "2024-01-06"},
                {"id": "t4", "type": "expense", "amount": 5, "account": "cash", "date": "garbage"},
                "nonsense"
            ]
        }));
        let doc = out.document;

        assert_eq!(doc.transactions.len(), 2);
        let tea = &doc.transactions[0];
        assert_eq!(tea.amount, Money::new(1001));
        assert_eq!(tea.category.as_deref(), Some(OTHER));
        assert_eq!(tea.timestamp, 1_704_412_800_000);

        let gift = &doc.transactions[1];
        assert_eq!(gift.category, None);
        assert_eq!(gift.timestamp, 1_704_500_000_000);
        assert_eq!(doc.account("wallet_x").unwrap().balance, Money::ZERO);

        assert_eq!(out.report.dropped, 3);
    }

    #[test]
    fn debts_and_receivables_take_legacy_amount() {
        let doc = rehydrate(json!({
            "debts": [
                {"id": "d1", "who": "Sam", "why": "Rent", "amount": 1000, "remainingAmount": 1200,
                 "dueDate": "2024-02-01"}
            ],
            "receivables": [
                {"id": "r1", "who": "Ann", "why": "Loan", "amount": 300, "dateGiven": "2024-01-10",
                 "sourceAccount": "bank_1", "ccTransactionId": "legacy"}
            ]
        }))
        .document;

        let debt = &doc.debts[0];
        assert_eq!(debt.original_amount, Money::new(100_000));
        assert_eq!(debt.remaining_amount, Money::new(100_000));
        assert_eq!(debt.extra["amount"], json!(1000));

        let receivable = &doc.receivables[0];
        assert_eq!(receivable.kind, ReceivableKind::Cash);
        assert_eq!(receivable.remaining_amount, Money::new(30_000));
        assert_eq!(receivable.extra["ccTransactionId"], json!("legacy"));
    }

    #[test]
    fn installments_and_cc_items_are_derived() {
        let doc = rehydrate(json!({
            "installments": [
                {"id": "i1", "description": "Phone", "originalFullAmount": 1000,
                 "totalMonths": 3, "monthsLeft": 9, "startDate": "2024-01-01"}
            ],
            "creditCard": {
                "limit": -5,
                "transactions": [
                    {"id": "c1", "amount": 50, "description": "Book", "date": "2024-01-02",
                     "paidAmount": 49.999},
                    {"id": "c2", "amount": 80, "description": "Shoes", "date": "2024-01-03",
                     "paidOff": true}
                ]
            }
        }))
        .document;

        let plan = &doc.installments[0];
        assert_eq!(plan.monthly_amount, Money::new(33_333));
        assert_eq!(plan.months_left, 3);

        assert_eq!(doc.credit_card.limit, Money::ZERO);
        let [book, shoes] = doc.credit_card.transactions.as_slice() else {
            panic!("expected two items");
        };
        assert!(book.paid_off);
        assert_eq!(book.paid_amount, Money::new(5_000));
        assert!(!shoes.paid_off);
        assert_eq!(shoes.paid_amount, Money::ZERO);
    }

    #[test]
    fn categories_differing_in_case_keep_their_transactions() {
        let first = rehydrate(json!({
            "categories": ["food", "Food", "Other"],
            "transactions": [
                {"id": "t1", "type": "expense", "amount": 5, "account": "cash",
                 "category": "food", "description": "Rice", "date": "2024-01-05"},
                {"id": "t2", "type": "expense", "amount": 6, "account": "cash",
                 "category": "Food", "description": "Bread", "date": "2024-01-05"}
            ]
        }));
        let doc = &first.document;
        assert_eq!(doc.transactions[0].category.as_deref(), Some("food"));
        assert_eq!(doc.transactions[1].category.as_deref(), Some("Food"));
        assert!(first.report.is_clean());

        let second = sanitize(first.document.to_value().unwrap());
        assert_eq!(second.document, first.document);
        assert!(second.report.is_clean());
    }

    #[test]
    fn installment_with_zero_monthly_share_is_dropped() {
        let out = rehydrate(json!({
            "installments": [
                {"id": "i1", "description": "Pen", "originalFullAmount": 0.01,
                 "totalMonths": 3, "startDate": "2024-01-01"},
                {"id": "i2", "description": "Pad", "originalFullAmount": 0.01,
                 "monthlyAmount": 0, "totalMonths": 3, "startDate": "2024-01-01"}
            ]
        }));
        assert!(out.document.installments.is_empty());
        assert_eq!(out.report.dropped, 2);
    }

    #[test]
    fn months_left_repairs_are_reported() {
        for stored in [json!(9), json!(-2), json!("two")] {
            let out = rehydrate(json!({
                "installments": [
                    {"id": "i1", "description": "Phone", "originalFullAmount": 300,
                     "totalMonths": 3, "monthsLeft": stored, "startDate": "2024-01-01"}
                ]
            }));
            assert_eq!(out.document.installments[0].months_left, 3);
            assert!(!out.report.is_clean(), "{stored} not reported");
        }

        let exact = rehydrate(json!({
            "installments": [
                {"id": "i1", "description": "Phone", "originalFullAmount": 300,
                 "monthlyAmount": 100, "totalMonths": 3, "monthsLeft": 2,
                 "startDate": "2024-01-01", "timestamp": 1704067200000i64}
            ]
        }));
        assert!(exact.report.is_clean());
    }

    #[test]
    fn out_of_range_amounts_are_invalid() {
        let out = rehydrate(json!({
            "accounts": [{"id": "cash", "name": "Cash", "balance": 1e300}],
            "transactions": [
                {"id": "t1", "type": "income", "amount": 1e20, "account": "cash",
                 "description": "Lottery", "date": "2024-01-05"}
            ],
            "installments": [
                {"id": "i1", "description": "Yacht", "monthlyAmount": 8e13,
                 "totalMonths": 12, "startDate": "2024-01-01"}
            ]
        }));
        let doc = out.document;
        assert_eq!(doc.account(CASH_ACCOUNT_ID).unwrap().balance, Money::ZERO);
        assert!(doc.transactions.is_empty());
        assert!(doc.installments.is_empty());
        assert_eq!(out.report.dropped, 2);
    }

    #[test]
    fn unknown_fields_pass_through() {
        let doc = rehydrate(json!({
            "pluginData": {"a": 1},
            "settings": {"theme": "light", "fontSize": 14},
            "accounts": [{"id": "cash", "name": "Cash", "balance": 1, "color": "red"}]
        }))
        .document;

        assert_eq!(doc.extra["pluginData"], json!({"a": 1}));
        assert_eq!(doc.settings.extra["fontSize"], json!(14));
        assert_eq!(doc.settings.theme, "light");
        assert_eq!(doc.account(CASH_ACCOUNT_ID).unwrap().extra["color"], json!("red"));
    }

    #[test]
    fn sanitize_is_idempotent() {
        let first = rehydrate(json!({
            "transactions": [
                {"type": "expense", "amount": 3.333, "account": "ghost", "category": "Pets",
                 "description": "Food", "timestamp": 1704412800000i64}
            ],
            "accounts": [{"id": "bank_1", "balance": null}],
            "categories": ["Pets", "food & dining"],
            "debts": [{"who": "Sam", "originalAmount": 10, "remainingAmount": -1,
                       "dueDate": "2024-03-01"},
                      {"who": "Kim", "originalAmount": 10, "remainingAmount": 4,
                       "dueDate": "2024-03-01"}],
            "settings": {"initialSetupDone": "yes"}
        }));
        assert!(!first.report.is_clean());

        let second = sanitize(first.document.to_value().unwrap());
        assert_eq!(second.document, first.document);
        assert_eq!(second.report, SanitizeReport::default());
    }
}
