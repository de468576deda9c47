use chrono::NaiveDate;
use tracing::debug;

use crate::{
    EngineError, Money, ResultEngine, Transaction, TransactionInput, TransactionKind, TransferCmd,
    util::{new_id, normalize_required_text},
};

use super::{Draft, Ledger, LedgerWarning, Receipt, Storage, require_positive};

/// Validated fields of a [`TransactionInput`].
struct Checked {
    kind: TransactionKind,
    amount: Money,
    account: String,
    category: Option<String>,
    description: String,
    date: NaiveDate,
}

fn check(draft: &Draft<'_>, input: &TransactionInput) -> ResultEngine<Checked> {
    let amount = require_positive(input.amount, "amount")?;
    let description = normalize_required_text(&input.description, "description")?;
    draft.doc.account(&input.account)?;
    let category = match input.kind {
        TransactionKind::Expense => {
            let name = input.category.as_deref().unwrap_or_default();
            Some(draft.resolve_category(name)?)
        }
        TransactionKind::Income => None,
    };
    Ok(Checked {
        kind: input.kind,
        amount,
        account: input.account.clone(),
        category,
        description,
        date: input.date,
    })
}

impl<S: Storage> Ledger<S> {
    /// Books an income or expense and applies it to its account.
    ///
    /// An expense larger than the account balance is still booked; the
    /// receipt carries a [`LedgerWarning::InsufficientFunds`].
    pub fn add_transaction(&mut self, input: TransactionInput) -> ResultEngine<Receipt<String>> {
        self.with_tx("add_transaction", |draft| {
            let checked = check(draft, &input)?;

            let account = draft.doc.account_mut(&checked.account)?;
            let before = account.balance;
            account.apply(checked.kind, checked.amount)?;
            if checked.kind == TransactionKind::Expense && before < checked.amount {
                let warning = LedgerWarning::InsufficientFunds {
                    account: account.name.clone(),
                    balance: before,
                    amount: checked.amount,
                };
                draft.warn(warning);
            }

            let id = new_id();
            let timestamp = draft.next_timestamp();
            draft.doc.transactions.push(Transaction {
                id: id.clone(),
                kind: checked.kind,
                amount: checked.amount,
                account: checked.account,
                category: checked.category,
                description: checked.description,
                date: checked.date,
                timestamp,
                source_ref: None,
                extra: Default::default(),
            });
            debug!(%id, "transaction added");
            Ok(id)
        })
    }

    /// Replaces a transaction's fields.
    ///
    /// The old effect is reverted on the old account before the new one is
    /// applied on the new account. The creation timestamp is kept.
    pub fn edit_transaction(
        &mut self,
        transaction_id: &str,
        input: TransactionInput,
    ) -> ResultEngine<Receipt<()>> {
        self.with_tx("edit_transaction", |draft| {
            let old = draft.doc.transaction(transaction_id)?.clone();
            let checked = check(draft, &input)?;

            draft.doc.account_mut(&old.account)?.revert(old.kind, old.amount)?;
            draft
                .doc
                .account_mut(&checked.account)?
                .apply(checked.kind, checked.amount)?;

            draft.check_negative(&checked.account)?;
            if old.account != checked.account {
                draft.check_negative(&old.account)?;
            }

            if let Some(tx) = draft
                .doc
                .transactions
                .iter_mut()
                .find(|tx| tx.id == transaction_id)
            {
                tx.kind = checked.kind;
                tx.amount = checked.amount;
                tx.account = checked.account;
                tx.category = checked.category;
                tx.description = checked.description;
                tx.date = checked.date;
            }
            Ok(())
        })
    }

    /// Removes a transaction and reverts its balance effect.
    pub fn delete_transaction(&mut self, transaction_id: &str) -> ResultEngine<Receipt<()>> {
        self.with_tx("delete_transaction", |draft| {
            let old = draft.doc.transaction(transaction_id)?.clone();
            draft.doc.account_mut(&old.account)?.revert(old.kind, old.amount)?;
            draft.check_negative(&old.account)?;
            draft.doc.transactions.retain(|tx| tx.id != transaction_id);
            Ok(())
        })
    }

    /// Moves money between two accounts.
    ///
    /// Unlike an expense, a transfer the source cannot cover is rejected.
    pub fn transfer(&mut self, cmd: TransferCmd) -> ResultEngine<Receipt<()>> {
        self.with_tx("transfer", |draft| {
            let amount = require_positive(cmd.amount, "amount")?;
            if cmd.from == cmd.to {
                return Err(EngineError::Validation(
                    "cannot transfer to the same account".to_string(),
                ));
            }
            draft.doc.account(&cmd.to)?;
            draft.debit(&cmd.from, amount)?;
            draft.credit(&cmd.to, amount)?;
            Ok(())
        })
    }
}
