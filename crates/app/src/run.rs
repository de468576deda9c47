//! Maps parsed commands onto ledger operations and prints the outcome.

use chrono::{Datelike, NaiveDate};
use engine::{
    CcItemInput, DebtEdit, FileStorage, InstallmentEdit, Ledger, Money, NewDebt,
    NewInstallment, NewReceivable, PaymentCmd, PaymentOutcome, ReceivableEdit, ReceivableKind,
    Receipt, SetupAccount, SetupCmd, TransactionInput, TransactionKind, TransferCmd,
    dashboard_totals, monthly_breakdown, period_stats,
};
use tracing::info;

use crate::{
    cli::{
        AccountCmd, CardCmd, CategoryCmd, Command, DebtCmd, InstallmentCmd, Kind, PaymentArgs,
        ReceivableCmd, SettingsCmd, SetupArgs, TransactionCmd, TransactionFields,
    },
    error::{AppError, Result},
};

pub async fn run(ledger: &mut Ledger<FileStorage>, command: Command, today: NaiveDate) -> Result<()> {
    match command {
        Command::Status => print_status(ledger, today),
        Command::Month { year, month } => print_month(ledger, year, month),
        Command::Setup(args) => {
            let cmd = setup_cmd(args)?;
            report(ledger.complete_setup(cmd)?);
            println!("setup complete");
        }
        Command::Account(cmd) => account(ledger, cmd)?,
        Command::Category(cmd) => category(ledger, cmd)?,
        Command::Transaction(cmd) => transaction(ledger, cmd, today)?,
        Command::Transfer { from, to, amount } => {
            report(ledger.transfer(TransferCmd::new(from, to, amount))?);
            println!("transferred {amount}");
        }
        Command::Debt(cmd) => debt(ledger, cmd)?,
        Command::Receivable(cmd) => receivable(ledger, cmd, today)?,
        Command::Installment(cmd) => installment(ledger, cmd, today)?,
        Command::Card(cmd) => card(ledger, cmd, today)?,
        Command::Settings(SettingsCmd::ShowCc { show }) => {
            report(ledger.set_show_cc_dashboard_section(show)?);
        }
        Command::Settings(SettingsCmd::Theme { theme }) => report(ledger.set_theme(&theme)?),
        Command::Import { path } => {
            let bytes = tokio::fs::read(&path).await?;
            let receipt = ledger.import_external(&bytes)?;
            let sanitize = &receipt.value;
            for repair in &sanitize.repairs {
                println!("repaired: {repair}");
            }
            println!(
                "imported {} ({} records dropped)",
                path.display(),
                sanitize.dropped
            );
        }
        Command::Export { path } => {
            let snapshot = ledger.export_snapshot()?;
            match path {
                Some(path) => {
                    tokio::fs::write(&path, snapshot).await?;
                    info!(path = %path.display(), "snapshot exported");
                }
                None => println!("{snapshot}"),
            }
        }
        Command::Reset { yes } => {
            if !yes {
                return Err(AppError::Usage(
                    "reset deletes all data, pass --yes to confirm".to_string(),
                ));
            }
            ledger.reset()?;
            println!("all data deleted");
        }
    }
    Ok(())
}

/// Prints the soft warnings a mutation produced.
fn report<T>(receipt: Receipt<T>) -> T {
    for warning in &receipt.warnings {
        println!("warning: {warning}");
    }
    receipt.value
}

fn print_payment(outcome: &PaymentOutcome) {
    if outcome.settled {
        println!("settled");
    } else {
        println!("{} remaining", outcome.remaining);
    }
    if let Some(id) = &outcome.transaction_id {
        println!("logged transaction {id}");
    }
}

fn print_status(ledger: &Ledger<FileStorage>, today: NaiveDate) {
    let doc = ledger.state();
    let totals = dashboard_totals(doc);
    let stats = period_stats(doc, today);

    println!("total balance      {}", totals.total_balance);
    println!("potential balance  {}", totals.potential_balance);
    println!("owed to me         {}", totals.owed_to_me);
    println!("I owe              {}", totals.total_owed);
    println!("installments left  {}", totals.installments_left);
    if doc.settings.show_cc_dashboard_section {
        println!("card used          {}", totals.cc_used);
        println!("card available     {}", totals.cc_available);
    }
    println!();
    println!("spent today        {}", stats.spent_today);
    println!("spent yesterday    {}", stats.spent_yesterday);
    println!("last 7 days        {}", stats.spent_last_7_days);
    println!("previous 7 days    {}", stats.spent_previous_7_days);
    println!(
        "{} earned / spent {} / {}",
        today.year(),
        stats.yearly_earned,
        stats.yearly_spent
    );
}

fn print_month(ledger: &Ledger<FileStorage>, year: i32, month: u32) {
    let breakdown = monthly_breakdown(ledger.state(), year, month);
    println!("{year}-{month:02}");
    println!("income   {}", breakdown.income);
    println!("expense  {}", breakdown.expense);
    for (category, amount) in &breakdown.by_category {
        println!("  {category:<30} {amount}");
    }
}

fn setup_cmd(args: SetupArgs) -> Result<SetupCmd> {
    let mut cmd = SetupCmd::default().categories(args.categories);
    for (id, balance) in &args.balances {
        let mut account = SetupAccount::new(id.as_str(), balance.parse::<Money>()?);
        if let Some((_, name)) = args.names.iter().find(|(name_id, _)| name_id == id) {
            account = account.name(name.as_str());
        }
        cmd = cmd.account(account);
    }
    // Renamed accounts without an opening balance start at zero.
    for (id, name) in &args.names {
        if !args.balances.iter().any(|(balance_id, _)| balance_id == id) {
            cmd = cmd.account(SetupAccount::new(id.as_str(), Money::ZERO).name(name.as_str()));
        }
    }
    if let Some(limit) = args.cc_limit {
        cmd = cmd.cc_limit(limit);
    }
    Ok(cmd)
}

fn payment(args: PaymentArgs) -> PaymentCmd {
    let cmd = PaymentCmd::new(args.amount, args.account);
    match args.log_as {
        Some(category) => cmd.log_as_expense(category),
        None => cmd,
    }
}

fn account(ledger: &mut Ledger<FileStorage>, cmd: AccountCmd) -> Result<()> {
    match cmd {
        AccountCmd::List => {
            for account in &ledger.state().accounts {
                println!("{:<10} {:<20} {}", account.id, account.name, account.balance);
            }
        }
        AccountCmd::Rename { id, name } => report(ledger.rename_account(&id, &name)?),
        AccountCmd::SetBalance { id, balance } => {
            report(ledger.set_account_balance(&id, balance)?);
        }
    }
    Ok(())
}

fn category(ledger: &mut Ledger<FileStorage>, cmd: CategoryCmd) -> Result<()> {
    match cmd {
        CategoryCmd::List => {
            for category in &ledger.state().categories {
                println!("{category}");
            }
        }
        CategoryCmd::Add { name } => {
            let name = report(ledger.add_category(&name)?);
            println!("added {name}");
        }
        CategoryCmd::Rename { old, new } => {
            let moved = report(ledger.rename_category(&old, &new)?);
            println!("renamed, {moved} transactions updated");
        }
        CategoryCmd::Delete { name } => report(ledger.delete_category(&name)?),
    }
    Ok(())
}

fn transaction_input(fields: TransactionFields, today: NaiveDate) -> TransactionInput {
    let kind = match fields.kind {
        Kind::Income => TransactionKind::Income,
        Kind::Expense => TransactionKind::Expense,
    };
    TransactionInput {
        kind,
        amount: fields.amount,
        account: fields.account,
        category: fields.category,
        description: fields.description,
        date: fields.date.unwrap_or(today),
    }
}

fn transaction(
    ledger: &mut Ledger<FileStorage>,
    cmd: TransactionCmd,
    today: NaiveDate,
) -> Result<()> {
    match cmd {
        TransactionCmd::List { limit } => {
            for tx in ledger.state().transactions_newest_first().into_iter().take(limit) {
                let sign = match tx.kind {
                    TransactionKind::Income => "+",
                    TransactionKind::Expense => "-",
                };
                println!(
                    "{} {} {sign}{} {:<10} {:<20} {}",
                    tx.id,
                    tx.date,
                    tx.amount,
                    tx.account,
                    tx.category.as_deref().unwrap_or(""),
                    tx.description
                );
            }
        }
        TransactionCmd::Add(fields) => {
            let id = report(ledger.add_transaction(transaction_input(fields, today))?);
            println!("added transaction {id}");
        }
        TransactionCmd::Edit { id, fields } => {
            report(ledger.edit_transaction(&id, transaction_input(fields, today))?);
        }
        TransactionCmd::Delete { id } => report(ledger.delete_transaction(&id)?),
    }
    Ok(())
}

fn debt(ledger: &mut Ledger<FileStorage>, cmd: DebtCmd) -> Result<()> {
    match cmd {
        DebtCmd::List => {
            for debt in &ledger.state().debts {
                println!(
                    "{} {} - {} {} of {} due {}",
                    debt.id,
                    debt.who,
                    debt.why,
                    debt.remaining_amount,
                    debt.original_amount,
                    debt.due_date
                );
            }
        }
        DebtCmd::Add {
            who,
            why,
            amount,
            due_date,
        } => {
            let id = report(ledger.add_debt(NewDebt::new(who, why, amount, due_date))?);
            println!("added debt {id}");
        }
        DebtCmd::Edit {
            id,
            who,
            why,
            original,
            remaining,
            due_date,
        } => {
            let edit = DebtEdit {
                who,
                why,
                original_amount: original,
                remaining_amount: remaining,
                due_date,
            };
            report(ledger.edit_debt(&id, edit)?);
        }
        DebtCmd::Pay { id, payment: args } => {
            let outcome = report(ledger.pay_debt(&id, payment(args))?);
            print_payment(&outcome);
        }
        DebtCmd::Delete { id } => report(ledger.delete_debt(&id)?),
    }
    Ok(())
}

fn receivable(
    ledger: &mut Ledger<FileStorage>,
    cmd: ReceivableCmd,
    today: NaiveDate,
) -> Result<()> {
    match cmd {
        ReceivableCmd::List => {
            for receivable in &ledger.state().receivables {
                println!(
                    "{} {} - {} {} of {} ({}, given {})",
                    receivable.id,
                    receivable.who,
                    receivable.why,
                    receivable.remaining_amount,
                    receivable.original_amount,
                    receivable.kind.as_str(),
                    receivable.date_given
                );
            }
        }
        ReceivableCmd::AddCash {
            who,
            why,
            amount,
            source,
            date,
        } => {
            let cmd = NewReceivable::cash(who, why, amount, date.unwrap_or(today), source);
            let id = report(ledger.add_receivable(cmd)?);
            println!("added receivable {id}");
        }
        ReceivableCmd::AddCc {
            who,
            why,
            amount,
            date,
        } => {
            let cmd = NewReceivable::cc(who, why, amount, date.unwrap_or(today));
            let id = report(ledger.add_receivable(cmd)?);
            println!("added receivable {id}");
        }
        ReceivableCmd::Edit {
            id,
            who,
            why,
            original,
            remaining,
            date_given,
            source,
        } => {
            let kind = if source.is_some() {
                ReceivableKind::Cash
            } else {
                ReceivableKind::Cc
            };
            let edit = ReceivableEdit {
                who,
                why,
                original_amount: original,
                remaining_amount: remaining,
                date_given,
                kind,
                source_account: source,
            };
            report(ledger.edit_receivable(&id, edit)?);
        }
        ReceivableCmd::Receive {
            id,
            amount,
            account,
        } => {
            let outcome = report(ledger.receive_payment(&id, amount, &account)?);
            print_payment(&outcome);
        }
        ReceivableCmd::Delete { id } => report(ledger.delete_receivable(&id)?),
    }
    Ok(())
}

fn installment(
    ledger: &mut Ledger<FileStorage>,
    cmd: InstallmentCmd,
    today: NaiveDate,
) -> Result<()> {
    match cmd {
        InstallmentCmd::List => {
            for plan in &ledger.state().installments {
                println!(
                    "{} {} {} / month, month {}/{}, {} left",
                    plan.id,
                    plan.description,
                    plan.monthly_amount,
                    plan.current_month(),
                    plan.total_months,
                    plan.amount_left()
                );
            }
        }
        InstallmentCmd::Add {
            description,
            full_amount,
            total_months,
            months_left,
            start_date,
        } => {
            let mut cmd = NewInstallment::new(
                description,
                full_amount,
                total_months,
                start_date.unwrap_or(today),
            );
            if let Some(months_left) = months_left {
                cmd = cmd.months_left(months_left);
            }
            let id = report(ledger.add_installment(cmd)?);
            println!("added installment {id}");
        }
        InstallmentCmd::Edit {
            id,
            description,
            full_amount,
            total_months,
            months_left,
            start_date,
        } => {
            let edit = InstallmentEdit {
                description,
                full_amount,
                total_months,
                months_left,
                start_date,
            };
            report(ledger.edit_installment(&id, edit)?);
        }
        InstallmentCmd::Advance { id } => {
            let left = report(ledger.advance_installment_month(&id)?);
            println!("{left} months left");
        }
        InstallmentCmd::Pay {
            id,
            account,
            category,
        } => {
            let outcome = report(ledger.pay_installment_as_expense(&id, &account, &category)?);
            print_payment(&outcome);
        }
        InstallmentCmd::Delete { id } => report(ledger.delete_installment(&id)?),
    }
    Ok(())
}

fn card(ledger: &mut Ledger<FileStorage>, cmd: CardCmd, today: NaiveDate) -> Result<()> {
    match cmd {
        CardCmd::List => {
            let card = &ledger.state().credit_card;
            println!("limit {} used {} available {}", card.limit, card.used(), card.available());
            for item in &card.transactions {
                let state = if item.paid_off { "paid" } else { "open" };
                println!(
                    "{} {} {} {} paid {} ({state})",
                    item.id, item.date, item.description, item.amount, item.paid_amount
                );
            }
        }
        CardCmd::Limit { limit } => report(ledger.set_credit_limit(limit)?),
        CardCmd::Add {
            amount,
            description,
            date,
        } => {
            let input = CcItemInput::new(amount, description, date.unwrap_or(today));
            let id = report(ledger.add_cc_item(input)?);
            println!("added card item {id}");
        }
        CardCmd::Edit {
            id,
            amount,
            description,
            date,
        } => report(ledger.edit_cc_item(&id, CcItemInput::new(amount, description, date))?),
        CardCmd::Pay { id, payment: args } => {
            let outcome = report(ledger.pay_cc_item(&id, payment(args))?);
            print_payment(&outcome);
        }
        CardCmd::Delete { id } => {
            let removed = report(ledger.delete_cc_item(&id)?);
            println!("removed card item and {removed} linked transactions");
        }
    }
    Ok(())
}
