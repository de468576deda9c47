use crate::{
    EngineError, Money, NewReceivable, Receivable, ReceivableEdit, ReceivableKind, ResultEngine,
    SourceKind, SourceRef, Storage, TransactionKind,
    util::{new_id, normalize_required_text},
};

use super::{
    Draft, Ledger, LedgerWarning, PaymentOutcome, Receipt, require_outstanding, require_positive,
};

/// Checks the source account of a receivable and returns it.
///
/// Cash receivables need one; card receivables may name one for display.
fn source_account(
    draft: &Draft<'_>,
    kind: ReceivableKind,
    source: Option<&str>,
) -> ResultEngine<Option<String>> {
    let source = source.map(str::trim).filter(|s| !s.is_empty());
    match (kind, source) {
        (ReceivableKind::Cash, None) => Err(EngineError::Validation(
            "a cash receivable needs a source account".to_string(),
        )),
        (_, Some(source)) => {
            draft.doc.account(source)?;
            Ok(Some(source.to_string()))
        }
        (ReceivableKind::Cc, None) => Ok(None),
    }
}

impl<S: Storage> Ledger<S> {
    /// Records money lent out.
    ///
    /// A cash receivable debits its source account right away and is
    /// rejected if the account cannot cover it. A card receivable moves no
    /// money.
    pub fn add_receivable(&mut self, cmd: NewReceivable) -> ResultEngine<Receipt<String>> {
        self.with_tx("add_receivable", |draft| {
            let who = normalize_required_text(&cmd.who, "who")?;
            let why = normalize_required_text(&cmd.why, "why")?;
            let amount = require_positive(cmd.amount, "amount")?;
            let source = source_account(draft, cmd.kind, cmd.source_account.as_deref())?;

            if cmd.kind == ReceivableKind::Cash {
                if let Some(source) = &source {
                    draft.debit(source, amount)?;
                }
            }

            let id = new_id();
            let timestamp = draft.next_timestamp();
            draft.doc.receivables.push(Receivable {
                id: id.clone(),
                who,
                why,
                original_amount: amount,
                remaining_amount: amount,
                date_given: cmd.date_given,
                kind: cmd.kind,
                source_account: source,
                timestamp,
                extra: Default::default(),
            });
            Ok(id)
        })
    }

    /// Corrects a receivable.
    ///
    /// The cash debit of the old version is given back before the new one is
    /// taken, so changing the amount, the type or the source account keeps
    /// balances consistent.
    pub fn edit_receivable(
        &mut self,
        receivable_id: &str,
        edit: ReceivableEdit,
    ) -> ResultEngine<Receipt<()>> {
        self.with_tx("edit_receivable", |draft| {
            let old = draft.doc.receivable(receivable_id)?.clone();
            let who = normalize_required_text(&edit.who, "who")?;
            let why = normalize_required_text(&edit.why, "why")?;
            require_outstanding(edit.original_amount, edit.remaining_amount)?;
            let source = source_account(draft, edit.kind, edit.source_account.as_deref())?;

            if let Some(old_source) = old.cash_source() {
                draft.credit(old_source, old.original_amount)?;
            }
            if edit.kind == ReceivableKind::Cash {
                if let Some(source) = &source {
                    draft.debit(source, edit.original_amount)?;
                }
            }

            if edit.remaining_amount.is_settled() {
                draft.doc.receivables.retain(|r| r.id != receivable_id);
                return Ok(());
            }
            let timestamp = draft.next_timestamp();
            if let Some(receivable) = draft
                .doc
                .receivables
                .iter_mut()
                .find(|r| r.id == receivable_id)
            {
                receivable.who = who;
                receivable.why = why;
                receivable.original_amount = edit.original_amount;
                receivable.remaining_amount = edit.remaining_amount;
                receivable.date_given = edit.date_given;
                receivable.kind = edit.kind;
                receivable.source_account = source;
                receivable.timestamp = timestamp;
            }
            Ok(())
        })
    }

    /// Credits a repayment to an account.
    ///
    /// The full amount is credited. Whatever exceeds the remaining amount is
    /// logged as a separate income.
    pub fn receive_payment(
        &mut self,
        receivable_id: &str,
        amount: Money,
        account: &str,
    ) -> ResultEngine<Receipt<PaymentOutcome>> {
        self.with_tx("receive_payment", |draft| {
            let receivable = draft.doc.receivable(receivable_id)?.clone();
            let amount = require_positive(amount, "payment amount")?;
            draft.credit(account, amount)?;

            let mut transaction_id = None;
            let remaining = if amount > receivable.remaining_amount {
                let extra = amount - receivable.remaining_amount;
                transaction_id = Some(draft.log_payment(
                    TransactionKind::Income,
                    extra,
                    account,
                    None,
                    format!("{} Paid Back Extra", receivable.who),
                    SourceRef::new(SourceKind::Receivable, receivable_id),
                ));
                Money::ZERO
            } else {
                receivable.remaining_amount - amount
            };

            let settled = remaining.is_settled();
            if settled {
                draft.doc.receivables.retain(|r| r.id != receivable_id);
            } else if let Some(r) = draft
                .doc
                .receivables
                .iter_mut()
                .find(|r| r.id == receivable_id)
            {
                r.remaining_amount = remaining;
            }

            Ok(PaymentOutcome {
                remaining,
                settled,
                transaction_id,
            })
        })
    }

    /// Removes a receivable. The cash debit taken when it was created stays.
    pub fn delete_receivable(&mut self, receivable_id: &str) -> ResultEngine<Receipt<()>> {
        self.with_tx("delete_receivable", |draft| {
            let receivable = draft.doc.receivable(receivable_id)?.clone();
            if receivable.cash_source().is_some() {
                draft.warn(LedgerWarning::EffectNotReversed {
                    record: SourceKind::Receivable,
                    id: receivable.id.clone(),
                    amount: receivable.original_amount,
                });
            }
            draft.doc.receivables.retain(|r| r.id != receivable_id);
            Ok(())
        })
    }
}
