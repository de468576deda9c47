use crate::{
    EngineError, Installment, Money, InstallmentEdit, NewInstallment, ResultEngine, SourceKind,
    SourceRef, Storage, TransactionKind,
    util::{new_id, normalize_required_text},
};

use super::{Ledger, LedgerWarning, PaymentOutcome, Receipt, require_positive};

fn require_months(total_months: u32) -> ResultEngine<u32> {
    if total_months == 0 {
        return Err(EngineError::Validation(
            "total months must be greater than zero".to_string(),
        ));
    }
    Ok(total_months)
}

/// Monthly share of `full`; a plan whose share rounds to zero is rejected.
fn monthly_share(full: Money, total_months: u32) -> ResultEngine<Money> {
    let monthly = full.split(total_months);
    if !monthly.is_positive() {
        return Err(EngineError::Validation(format!(
            "{full} over {total_months} months is less than 0.01 a month"
        )));
    }
    Ok(monthly)
}

impl<S: Storage> Ledger<S> {
    /// Adds an installment plan. The monthly amount is derived from the full
    /// amount.
    pub fn add_installment(&mut self, cmd: NewInstallment) -> ResultEngine<Receipt<String>> {
        self.with_tx("add_installment", |draft| {
            let description = normalize_required_text(&cmd.description, "description")?;
            let full = require_positive(cmd.full_amount, "full amount")?;
            let total_months = require_months(cmd.total_months)?;
            let monthly_amount = monthly_share(full, total_months)?;
            let months_left = cmd
                .months_left
                .filter(|left| (1..=total_months).contains(left))
                .unwrap_or(total_months);

            let id = new_id();
            let timestamp = draft.next_timestamp();
            draft.doc.installments.push(Installment {
                id: id.clone(),
                description,
                monthly_amount,
                total_months,
                months_left,
                original_full_amount: full,
                start_date: cmd.start_date,
                timestamp,
                extra: Default::default(),
            });
            Ok(id)
        })
    }

    /// Replaces a plan's terms. Zero months left completes it.
    pub fn edit_installment(
        &mut self,
        installment_id: &str,
        edit: InstallmentEdit,
    ) -> ResultEngine<Receipt<()>> {
        self.with_tx("edit_installment", |draft| {
            draft.doc.installment(installment_id)?;
            let description = normalize_required_text(&edit.description, "description")?;
            let full = require_positive(edit.full_amount, "full amount")?;
            let total_months = require_months(edit.total_months)?;
            let monthly_amount = monthly_share(full, total_months)?;
            if edit.months_left > total_months {
                return Err(EngineError::Validation(format!(
                    "months left must be between 0 and {total_months}"
                )));
            }

            if edit.months_left == 0 {
                draft.doc.installments.retain(|plan| plan.id != installment_id);
                return Ok(());
            }
            let timestamp = draft.next_timestamp();
            if let Some(plan) = draft
                .doc
                .installments
                .iter_mut()
                .find(|plan| plan.id == installment_id)
            {
                plan.description = description;
                plan.original_full_amount = full;
                plan.monthly_amount = monthly_amount;
                plan.total_months = total_months;
                plan.months_left = edit.months_left;
                plan.start_date = edit.start_date;
                plan.timestamp = timestamp;
            }
            Ok(())
        })
    }

    /// Marks one month as paid without moving any money.
    ///
    /// Returns the months left; the plan is removed when none are.
    pub fn advance_installment_month(
        &mut self,
        installment_id: &str,
    ) -> ResultEngine<Receipt<u32>> {
        self.with_tx("advance_installment_month", |draft| {
            let plan = draft.doc.installment(installment_id)?;
            if plan.is_complete() {
                return Err(EngineError::Validation(format!(
                    "installment {installment_id} is already complete"
                )));
            }
            let months_left = plan.months_left - 1;
            complete_month(&mut draft.doc.installments, installment_id, months_left);
            Ok(months_left)
        })
    }

    /// Pays this month's installment from an account and logs it as an
    /// expense.
    pub fn pay_installment_as_expense(
        &mut self,
        installment_id: &str,
        account: &str,
        category: &str,
    ) -> ResultEngine<Receipt<PaymentOutcome>> {
        self.with_tx("pay_installment_as_expense", |draft| {
            let plan = draft.doc.installment(installment_id)?.clone();
            if plan.is_complete() {
                return Err(EngineError::Validation(format!(
                    "installment {installment_id} is already complete"
                )));
            }
            let category = draft.resolve_category(category)?;
            require_positive(plan.monthly_amount, "monthly amount")?;

            draft.debit(account, plan.monthly_amount)?;
            let transaction_id = draft.log_payment(
                TransactionKind::Expense,
                plan.monthly_amount,
                account,
                Some(category),
                format!(
                    "Installment: {} (Month {}/{})",
                    plan.description,
                    plan.current_month(),
                    plan.total_months
                ),
                SourceRef::new(SourceKind::Installment, installment_id),
            );

            let months_left = plan.months_left - 1;
            complete_month(&mut draft.doc.installments, installment_id, months_left);
            Ok(PaymentOutcome {
                remaining: plan.monthly_amount.times(months_left),
                settled: months_left == 0,
                transaction_id: Some(transaction_id),
            })
        })
    }

    /// Removes a plan. Months already paid stay booked.
    pub fn delete_installment(&mut self, installment_id: &str) -> ResultEngine<Receipt<()>> {
        self.with_tx("delete_installment", |draft| {
            let plan = draft.doc.installment(installment_id)?.clone();
            let paid_months = plan.total_months - plan.months_left;
            if paid_months > 0 {
                draft.warn(LedgerWarning::EffectNotReversed {
                    record: SourceKind::Installment,
                    id: plan.id.clone(),
                    amount: plan.monthly_amount.times(paid_months),
                });
            }
            draft.doc.installments.retain(|p| p.id != installment_id);
            Ok(())
        })
    }
}

/// Stores the new `months_left`, removing the plan once it reaches zero.
fn complete_month(plans: &mut Vec<Installment>, installment_id: &str, months_left: u32) {
    if months_left == 0 {
        plans.retain(|plan| plan.id != installment_id);
    } else if let Some(plan) = plans.iter_mut().find(|plan| plan.id == installment_id) {
        plan.months_left = months_left;
    }
}
