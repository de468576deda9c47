use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::Money;

#[derive(Debug, Parser)]
#[command(name = "kaasi", about = "Personal ledger", disable_version_flag = true)]
pub struct Cli {
    #[command(flatten)]
    pub overrides: Overrides,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct Overrides {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override the data directory.
    #[arg(long, global = true)]
    pub data_dir: Option<String>,
    /// Override timezone (IANA name).
    #[arg(long, global = true)]
    pub timezone: Option<String>,
    /// Override log level.
    #[arg(long, global = true)]
    pub level: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Dashboard totals and recent spending.
    Status,
    /// Income, expense and spending per category of one month.
    Month {
        year: i32,
        #[arg(value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,
    },
    /// First-run setup of balances, card limit and categories.
    Setup(SetupArgs),
    #[command(subcommand)]
    Account(AccountCmd),
    #[command(subcommand)]
    Category(CategoryCmd),
    #[command(subcommand)]
    #[command(name = "tx")]
    Transaction(TransactionCmd),
    Transfer {
        from: String,
        to: String,
        amount: Money,
    },
    #[command(subcommand)]
    Debt(DebtCmd),
    #[command(subcommand)]
    Receivable(ReceivableCmd),
    #[command(subcommand)]
    Installment(InstallmentCmd),
    #[command(subcommand)]
    Card(CardCmd),
    #[command(subcommand)]
    Settings(SettingsCmd),
    /// Replace the ledger with a JSON document.
    Import { path: PathBuf },
    /// Write the ledger as JSON to a file, or to stdout.
    Export { path: Option<PathBuf> },
    /// Delete all data.
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
pub struct SetupArgs {
    /// Opening balance as `<account>=<amount>`, repeatable.
    #[arg(long = "balance", value_parser = parse_pair)]
    pub balances: Vec<(String, String)>,
    /// New name as `<account>=<name>`, repeatable.
    #[arg(long = "name", value_parser = parse_pair)]
    pub names: Vec<(String, String)>,
    /// Credit card limit; the card section stays hidden without one.
    #[arg(long)]
    pub cc_limit: Option<Money>,
    #[arg(long = "category")]
    pub categories: Vec<String>,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .ok_or_else(|| format!("expected <account>=<value>, got {raw}"))
}

#[derive(Debug, Subcommand)]
pub enum AccountCmd {
    List,
    Rename {
        id: String,
        name: String,
    },
    SetBalance {
        id: String,
        #[arg(allow_negative_numbers = true)]
        balance: Money,
    },
}

#[derive(Debug, Subcommand)]
pub enum CategoryCmd {
    List,
    Add { name: String },
    Rename { old: String, new: String },
    Delete { name: String },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Kind {
    Income,
    Expense,
}

#[derive(Debug, Args)]
pub struct TransactionFields {
    #[arg(value_enum)]
    pub kind: Kind,
    pub amount: Money,
    pub account: String,
    pub description: String,
    /// Required for expenses.
    #[arg(long)]
    pub category: Option<String>,
    /// Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
pub enum TransactionCmd {
    /// Newest first.
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    Add(TransactionFields),
    Edit {
        id: String,
        #[command(flatten)]
        fields: TransactionFields,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct PaymentArgs {
    pub amount: Money,
    pub account: String,
    /// Also log the payment as an expense in this category.
    #[arg(long)]
    pub log_as: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum DebtCmd {
    List,
    Add {
        who: String,
        why: String,
        amount: Money,
        due_date: NaiveDate,
    },
    Edit {
        id: String,
        who: String,
        why: String,
        original: Money,
        remaining: Money,
        due_date: NaiveDate,
    },
    Pay {
        id: String,
        #[command(flatten)]
        payment: PaymentArgs,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ReceivableCmd {
    List,
    /// Lend cash out of an account.
    AddCash {
        who: String,
        why: String,
        amount: Money,
        source: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Lend through the credit card.
    AddCc {
        who: String,
        why: String,
        amount: Money,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Edit {
        id: String,
        who: String,
        why: String,
        original: Money,
        remaining: Money,
        date_given: NaiveDate,
        /// Source account of a cash receivable; without it the receivable
        /// becomes a card one.
        #[arg(long)]
        source: Option<String>,
    },
    Receive {
        id: String,
        amount: Money,
        account: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum InstallmentCmd {
    List,
    Add {
        description: String,
        full_amount: Money,
        total_months: u32,
        #[arg(long)]
        months_left: Option<u32>,
        #[arg(long)]
        start_date: Option<NaiveDate>,
    },
    Edit {
        id: String,
        description: String,
        full_amount: Money,
        total_months: u32,
        months_left: u32,
        start_date: NaiveDate,
    },
    /// Mark this month paid without moving money.
    Advance {
        id: String,
    },
    /// Pay this month from an account as an expense.
    Pay {
        id: String,
        account: String,
        category: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum CardCmd {
    List,
    Limit {
        limit: Money,
    },
    Add {
        amount: Money,
        description: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Edit {
        id: String,
        amount: Money,
        description: String,
        date: NaiveDate,
    },
    Pay {
        id: String,
        #[command(flatten)]
        payment: PaymentArgs,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsCmd {
    ShowCc {
        #[arg(action = clap::ArgAction::Set)]
        show: bool,
    },
    Theme {
        theme: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_pairs_and_amounts() {
        let cli = Cli::try_parse_from([
            "kaasi",
            "setup",
            "--balance",
            "cash=1,200.50",
            "--name",
            "bank_1=Sampath",
            "--cc-limit",
            "50000",
        ])
        .unwrap();
        let Command::Setup(args) = cli.command else {
            panic!("expected setup");
        };
        assert_eq!(args.balances, vec![("cash".to_string(), "1,200.50".to_string())]);
        assert_eq!(args.names, vec![("bank_1".to_string(), "Sampath".to_string())]);
        assert_eq!(args.cc_limit, Some(Money::new(5_000_000)));
    }

    #[test]
    fn negative_balance_is_accepted() {
        let cli = Cli::try_parse_from(["kaasi", "account", "set-balance", "bank_1", "-25"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Account(AccountCmd::SetBalance { balance, .. }) if balance == Money::new(-2_500)
        ));
    }
}
