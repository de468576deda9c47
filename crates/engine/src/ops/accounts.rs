use tracing::info;

use crate::{
    CASH_ACCOUNT_ID, Document, EngineError, Money, OTHER, ResultEngine, SetupCmd, Storage,
    accounts::default_account_name,
    categories::{default_categories, find_category, sort_categories},
    util::{name_key, normalize_optional_text, normalize_required_text},
};

use super::{Ledger, Receipt, require_in_range};

impl<S: Storage> Ledger<S> {
    /// First-run setup: opening balances, account names, card limit and
    /// categories.
    ///
    /// Rebuilds the document from defaults, so it is only allowed once.
    pub fn complete_setup(&mut self, cmd: SetupCmd) -> ResultEngine<Receipt<()>> {
        self.with_tx("complete_setup", |draft| {
            if draft.doc.settings.initial_setup_done {
                return Err(EngineError::Validation(
                    "initial setup is already complete".to_string(),
                ));
            }

            let mut doc = Document {
                settings: draft.doc.settings.clone(),
                ..Document::default()
            };

            for entry in &cmd.accounts {
                let default_name = default_account_name(&entry.id)
                    .ok_or_else(|| EngineError::NotFound(format!("account {}", entry.id)))?;
                let name = match normalize_optional_text(entry.name.as_deref()) {
                    Some(name) if entry.id != CASH_ACCOUNT_ID => name,
                    _ => default_name.to_string(),
                };
                let account = doc.account_mut(&entry.id)?;
                account.name = name;
                account.balance = require_in_range(entry.balance, "balance")?;
            }

            let mut categories: Vec<String> = Vec::new();
            for name in &cmd.categories {
                let Some(name) = normalize_optional_text(Some(name.as_str())) else {
                    continue;
                };
                if find_category(&categories, &name).is_none() {
                    categories.push(name);
                }
            }
            if categories.is_empty() {
                categories = default_categories();
            }
            if find_category(&categories, OTHER).is_none() {
                categories.push(OTHER.to_string());
            }
            sort_categories(&mut categories);
            doc.categories = categories;

            doc.credit_card.limit = cmd
                .cc_limit
                .filter(|limit| !limit.is_negative() && *limit <= Money::MAX)
                .unwrap_or(Money::ZERO);
            doc.settings.show_cc_dashboard_section = cmd.cc_limit.is_some();
            doc.settings.initial_setup_done = true;

            draft.doc = doc;
            info!("initial setup completed");
            Ok(())
        })
    }

    /// Renames an account. The cash account keeps its name.
    pub fn rename_account(&mut self, account_id: &str, name: &str) -> ResultEngine<Receipt<()>> {
        self.with_tx("rename_account", |draft| {
            let name = normalize_required_text(name, "account name")?;
            if draft.doc.account(account_id)?.is_reserved() {
                return Err(EngineError::Validation(
                    "the cash account cannot be renamed".to_string(),
                ));
            }

            let key = name_key(&name);
            let taken = draft
                .doc
                .accounts
                .iter()
                .any(|account| account.id != account_id && name_key(&account.name) == key);
            if taken {
                return Err(EngineError::Validation(format!(
                    "account name {name} is already used"
                )));
            }

            draft.doc.account_mut(account_id)?.name = name;
            Ok(())
        })
    }

    /// Manual balance correction.
    pub fn set_account_balance(
        &mut self,
        account_id: &str,
        balance: Money,
    ) -> ResultEngine<Receipt<()>> {
        self.with_tx("set_account_balance", |draft| {
            let balance = require_in_range(balance, "balance")?;
            draft.doc.account_mut(account_id)?.balance = balance;
            draft.doc.settings.initial_setup_done = true;
            Ok(())
        })
    }
}
