use crate::{
    Debt, DebtEdit, NewDebt, PaymentCmd, ResultEngine, SourceKind, SourceRef, Storage,
    TransactionKind,
    util::{new_id, normalize_required_text},
};

use super::{
    Ledger, LedgerWarning, PaymentOutcome, Receipt, require_outstanding, require_payment,
    require_positive,
};

impl<S: Storage> Ledger<S> {
    pub fn add_debt(&mut self, cmd: NewDebt) -> ResultEngine<Receipt<String>> {
        self.with_tx("add_debt", |draft| {
            let who = normalize_required_text(&cmd.who, "who")?;
            let why = normalize_required_text(&cmd.why, "why")?;
            let amount = require_positive(cmd.amount, "amount")?;

            let id = new_id();
            let timestamp = draft.next_timestamp();
            draft.doc.debts.push(Debt {
                id: id.clone(),
                who,
                why,
                original_amount: amount,
                remaining_amount: amount,
                due_date: cmd.due_date,
                timestamp,
                extra: Default::default(),
            });
            Ok(id)
        })
    }

    /// Corrects a debt. A remaining amount of zero settles it.
    pub fn edit_debt(&mut self, debt_id: &str, edit: DebtEdit) -> ResultEngine<Receipt<()>> {
        self.with_tx("edit_debt", |draft| {
            draft.doc.debt(debt_id)?;
            let who = normalize_required_text(&edit.who, "who")?;
            let why = normalize_required_text(&edit.why, "why")?;
            require_outstanding(edit.original_amount, edit.remaining_amount)?;

            if edit.remaining_amount.is_settled() {
                draft.doc.debts.retain(|debt| debt.id != debt_id);
                return Ok(());
            }
            let timestamp = draft.next_timestamp();
            if let Some(debt) = draft.doc.debts.iter_mut().find(|debt| debt.id == debt_id) {
                debt.who = who;
                debt.why = why;
                debt.original_amount = edit.original_amount;
                debt.remaining_amount = edit.remaining_amount;
                debt.due_date = edit.due_date;
                debt.timestamp = timestamp;
            }
            Ok(())
        })
    }

    /// Pays part or all of a debt from an account.
    ///
    /// Rejected when the account cannot cover the payment. The debt is
    /// removed once nothing remains.
    pub fn pay_debt(
        &mut self,
        debt_id: &str,
        cmd: PaymentCmd,
    ) -> ResultEngine<Receipt<PaymentOutcome>> {
        self.with_tx("pay_debt", |draft| {
            let debt = draft.doc.debt(debt_id)?.clone();
            let amount = require_payment(cmd.amount, debt.remaining_amount)?;
            let category = match &cmd.expense_category {
                Some(name) => Some(draft.resolve_category(name)?),
                None => None,
            };

            draft.debit(&cmd.account, amount)?;
            let remaining = debt.remaining_amount - amount;

            let transaction_id = category.map(|category| {
                draft.log_payment(
                    TransactionKind::Expense,
                    amount,
                    &cmd.account,
                    Some(category),
                    format!("Debt Payment: {} - {}", debt.who, debt.why),
                    SourceRef::new(SourceKind::Debt, debt_id),
                )
            });

            let settled = remaining.is_settled();
            if settled {
                draft.doc.debts.retain(|d| d.id != debt_id);
            } else if let Some(d) = draft.doc.debts.iter_mut().find(|d| d.id == debt_id) {
                d.remaining_amount = remaining;
            }

            Ok(PaymentOutcome {
                remaining,
                settled,
                transaction_id,
            })
        })
    }

    /// Removes a debt. Payments already made stay booked.
    pub fn delete_debt(&mut self, debt_id: &str) -> ResultEngine<Receipt<()>> {
        self.with_tx("delete_debt", |draft| {
            let debt = draft.doc.debt(debt_id)?.clone();
            if debt.paid().is_positive() {
                draft.warn(LedgerWarning::EffectNotReversed {
                    record: SourceKind::Debt,
                    id: debt.id.clone(),
                    amount: debt.paid(),
                });
            }
            draft.doc.debts.retain(|d| d.id != debt_id);
            Ok(())
        })
    }
}
