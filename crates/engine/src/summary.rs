//! Read-only figures derived from a [`Document`].

use chrono::{Datelike, Days, NaiveDate};

use crate::{Document, Money, OTHER, ReceivableKind, TransactionKind};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DashboardTotals {
    /// Sum of all account balances.
    pub total_balance: Money,
    /// What others still owe the user.
    pub owed_to_me: Money,
    /// `total_balance` plus receivables that will flow back into an account.
    pub potential_balance: Money,
    /// What the user still owes.
    pub total_owed: Money,
    pub installments_left: Money,
    pub cc_used: Money,
    pub cc_available: Money,
}

pub fn dashboard_totals(doc: &Document) -> DashboardTotals {
    let total_balance: Money = doc.accounts.iter().map(|a| a.balance).sum();
    let owed_to_me: Money = doc.receivables.iter().map(|r| r.remaining_amount).sum();
    let returning: Money = doc
        .receivables
        .iter()
        .filter(|r| r.kind == ReceivableKind::Cash || r.source_account.is_some())
        .map(|r| r.remaining_amount)
        .sum();

    DashboardTotals {
        total_balance,
        owed_to_me,
        potential_balance: total_balance + returning,
        total_owed: doc.debts.iter().map(|d| d.remaining_amount).sum(),
        installments_left: doc.installments.iter().map(|i| i.amount_left()).sum(),
        cc_used: doc.credit_card.used(),
        cc_available: doc.credit_card.available(),
    }
}

/// Spending around a given day.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PeriodStats {
    pub yearly_earned: Money,
    pub yearly_spent: Money,
    pub spent_today: Money,
    pub spent_yesterday: Money,
    /// The 7 days ending today, today included.
    pub spent_last_7_days: Money,
    /// The 7 days before that.
    pub spent_previous_7_days: Money,
}

pub fn period_stats(doc: &Document, today: NaiveDate) -> PeriodStats {
    let days_back = |n: u64| today.checked_sub_days(Days::new(n)).unwrap_or(NaiveDate::MIN);
    let yesterday = days_back(1);
    let week_start = days_back(6);
    let previous_start = days_back(13);

    let mut stats = PeriodStats::default();
    for tx in &doc.transactions {
        if tx.date.year() == today.year() {
            match tx.kind {
                TransactionKind::Income => stats.yearly_earned += tx.amount,
                TransactionKind::Expense => stats.yearly_spent += tx.amount,
            }
        }
        if tx.kind != TransactionKind::Expense {
            continue;
        }
        if tx.date == today {
            stats.spent_today += tx.amount;
        }
        if tx.date == yesterday {
            stats.spent_yesterday += tx.amount;
        }
        if (week_start..=today).contains(&tx.date) {
            stats.spent_last_7_days += tx.amount;
        } else if (previous_start..week_start).contains(&tx.date) {
            stats.spent_previous_7_days += tx.amount;
        }
    }
    stats
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthlyBreakdown {
    pub year: i32,
    pub month: u32,
    pub income: Money,
    pub expense: Money,
    /// Expense per category, largest first. Categories without spending are
    /// left out.
    pub by_category: Vec<(String, Money)>,
}

pub fn monthly_breakdown(doc: &Document, year: i32, month: u32) -> MonthlyBreakdown {
    let mut income = Money::ZERO;
    let mut expense = Money::ZERO;
    let mut by_category: Vec<(String, Money)> = Vec::new();

    let in_month = doc
        .transactions
        .iter()
        .filter(|tx| tx.date.year() == year && tx.date.month() == month);
    for tx in in_month {
        match tx.kind {
            TransactionKind::Income => income += tx.amount,
            TransactionKind::Expense => {
                expense += tx.amount;
                let category = tx.category.as_deref().unwrap_or(OTHER);
                match by_category.iter_mut().find(|(name, _)| name == category) {
                    Some((_, total)) => *total += tx.amount,
                    None => by_category.push((category.to_string(), tx.amount)),
                }
            }
        }
    }
    by_category.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    MonthlyBreakdown {
        year,
        month,
        income,
        expense,
        by_category,
    }
}
