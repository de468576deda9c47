use crate::{
    CcItemInput, CreditCardTransaction, EngineError, Money, PaymentCmd, ResultEngine, SourceKind,
    SourceRef, Storage, TransactionKind,
    util::{new_id, normalize_required_text},
};

use super::{
    Ledger, LedgerWarning, PaymentOutcome, Receipt, require_in_range, require_payment,
    require_positive,
};

impl<S: Storage> Ledger<S> {
    pub fn set_credit_limit(&mut self, limit: Money) -> ResultEngine<Receipt<()>> {
        self.with_tx("set_credit_limit", |draft| {
            if limit.is_negative() {
                return Err(EngineError::Validation(
                    "credit limit must not be negative".to_string(),
                ));
            }
            draft.doc.credit_card.limit = require_in_range(limit, "credit limit")?;
            Ok(())
        })
    }

    /// Records a card purchase. No account is touched.
    pub fn add_cc_item(&mut self, input: CcItemInput) -> ResultEngine<Receipt<String>> {
        self.with_tx("add_cc_item", |draft| {
            let amount = require_positive(input.amount, "amount")?;
            let description = normalize_required_text(&input.description, "description")?;

            let id = new_id();
            let timestamp = draft.next_timestamp();
            draft.doc.credit_card.transactions.push(CreditCardTransaction {
                id: id.clone(),
                amount,
                description,
                date: input.date,
                paid_amount: Money::ZERO,
                paid_off: false,
                timestamp,
                extra: Default::default(),
            });
            Ok(id)
        })
    }

    /// Corrects a card purchase. What was paid is capped at the new amount.
    pub fn edit_cc_item(&mut self, item_id: &str, input: CcItemInput) -> ResultEngine<Receipt<()>> {
        self.with_tx("edit_cc_item", |draft| {
            draft.doc.cc_item(item_id)?;
            let amount = require_positive(input.amount, "amount")?;
            let description = normalize_required_text(&input.description, "description")?;

            let timestamp = draft.next_timestamp();
            if let Some(item) = draft
                .doc
                .credit_card
                .transactions
                .iter_mut()
                .find(|item| item.id == item_id)
            {
                item.amount = amount;
                item.description = description;
                item.date = input.date;
                item.paid_amount = item.paid_amount.min(amount);
                item.timestamp = timestamp;
                item.refresh_paid_off();
            }
            Ok(())
        })
    }

    /// Pays a card item down from an account.
    ///
    /// Rejected when the account cannot cover the payment. A paid off item
    /// stays in the card history with `paid_off` set.
    pub fn pay_cc_item(
        &mut self,
        item_id: &str,
        cmd: PaymentCmd,
    ) -> ResultEngine<Receipt<PaymentOutcome>> {
        self.with_tx("pay_cc_item", |draft| {
            let item = draft.doc.cc_item(item_id)?.clone();
            let amount = require_payment(cmd.amount, item.remaining())?;
            let category = match &cmd.expense_category {
                Some(name) => Some(draft.resolve_category(name)?),
                None => None,
            };

            draft.debit(&cmd.account, amount)?;
            let transaction_id = category.map(|category| {
                draft.log_payment(
                    TransactionKind::Expense,
                    amount,
                    &cmd.account,
                    Some(category),
                    format!("Credit Card Payment: {}", item.description),
                    SourceRef::new(SourceKind::CcItem, item_id),
                )
            });

            let mut updated = item;
            updated.paid_amount += amount;
            updated.refresh_paid_off();
            let outcome = PaymentOutcome {
                remaining: updated.remaining(),
                settled: updated.paid_off,
                transaction_id,
            };
            if let Some(slot) = draft
                .doc
                .credit_card
                .transactions
                .iter_mut()
                .find(|i| i.id == item_id)
            {
                *slot = updated;
            }
            Ok(outcome)
        })
    }

    /// Removes a card item together with the expenses logged for its
    /// payments. Account balances are left as they are.
    ///
    /// Returns the number of linked transactions removed.
    pub fn delete_cc_item(&mut self, item_id: &str) -> ResultEngine<Receipt<usize>> {
        self.with_tx("delete_cc_item", |draft| {
            let item = draft.doc.cc_item(item_id)?.clone();
            if item.paid_amount.is_positive() {
                draft.warn(LedgerWarning::EffectNotReversed {
                    record: SourceKind::CcItem,
                    id: item.id.clone(),
                    amount: item.paid_amount,
                });
            }
            draft
                .doc
                .credit_card
                .transactions
                .retain(|i| i.id != item_id);

            let before = draft.doc.transactions.len();
            draft
                .doc
                .transactions
                .retain(|tx| !tx.is_linked_to(SourceKind::CcItem, item_id));
            Ok(before - draft.doc.transactions.len())
        })
    }
}
