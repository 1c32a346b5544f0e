use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use eqtrack::core::log::init_logging;
use eqtrack::core::portfolio::CashFlow;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display portfolio summary with live prices
    Summary,
    /// Fetch quotes for given symbols (defaults to portfolio symbols)
    Prices {
        symbols: Vec<String>,
        /// Override the quote cache TTL in seconds (clamped to 10-300)
        #[arg(long)]
        ttl: Option<u64>,
    },
    /// Add a purchase record
    Add {
        /// Ticker symbol, e.g. RELIANCE or TCS.NS
        #[arg(long)]
        symbol: String,
        /// Company name
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        quantity: f64,
        /// Purchase price per share
        #[arg(long)]
        price: f64,
        /// Purchase date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        broker: Option<String>,
        /// Actual cash spent including fees; defaults to quantity * price
        #[arg(long)]
        cash: Option<f64>,
    },
    /// Remove a purchase record by id
    Remove {
        #[arg(long)]
        id: u64,
    },
    /// Record or list cash transactions
    Cash {
        #[command(subcommand)]
        command: CashCommands,
    },
    /// Record or list expenses
    Expense {
        #[command(subcommand)]
        command: ExpenseCommands,
    },
    /// Record or list dividends received
    Dividend {
        #[command(subcommand)]
        command: DividendCommands,
    },
}

#[derive(Subcommand)]
enum CashCommands {
    Deposit {
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Withdraw {
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    List,
}

#[derive(Subcommand)]
enum DividendCommands {
    Add {
        /// Ticker symbol the dividend was paid on
        #[arg(long)]
        symbol: String,
        /// Dividend per share
        #[arg(long)]
        per_share: f64,
        /// Shares held on the record date
        #[arg(long)]
        shares: f64,
        /// Tax deducted at source, if any
        #[arg(long, default_value_t = 0.0)]
        tax: f64,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    List,
}

#[derive(Subcommand)]
enum ExpenseCommands {
    Add {
        #[arg(long)]
        category: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    List,
}

impl From<Commands> for eqtrack::AppCommand {
    fn from(cmd: Commands) -> eqtrack::AppCommand {
        match cmd {
            Commands::Setup => eqtrack::AppCommand::Setup,
            Commands::Summary => eqtrack::AppCommand::Summary,
            Commands::Prices { symbols, ttl } => eqtrack::AppCommand::Prices {
                symbols,
                ttl_secs: ttl,
            },
            Commands::Add {
                symbol,
                name,
                quantity,
                price,
                date,
                broker,
                cash,
            } => eqtrack::AppCommand::AddPosition(eqtrack::AddPositionArgs {
                symbol,
                company_name: name,
                quantity,
                price,
                date,
                broker,
                cash_invested: cash,
            }),
            Commands::Remove { id } => eqtrack::AppCommand::RemovePosition { id },
            Commands::Cash { command } => match command {
                CashCommands::Deposit { amount, note, date } => eqtrack::AppCommand::Cash {
                    flow: CashFlow::Deposit,
                    amount,
                    note,
                    date,
                },
                CashCommands::Withdraw { amount, note, date } => eqtrack::AppCommand::Cash {
                    flow: CashFlow::Withdrawal,
                    amount,
                    note,
                    date,
                },
                CashCommands::List => eqtrack::AppCommand::CashList,
            },
            Commands::Expense { command } => match command {
                ExpenseCommands::Add {
                    category,
                    description,
                    amount,
                    date,
                } => eqtrack::AppCommand::ExpenseAdd {
                    category,
                    description,
                    amount,
                    date,
                },
                ExpenseCommands::List => eqtrack::AppCommand::ExpenseList,
            },
            Commands::Dividend { command } => match command {
                DividendCommands::Add {
                    symbol,
                    per_share,
                    shares,
                    tax,
                    date,
                } => eqtrack::AppCommand::DividendAdd {
                    symbol,
                    per_share,
                    shares_held: shares,
                    tax_deducted: tax,
                    date,
                },
                DividendCommands::List => eqtrack::AppCommand::DividendList,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(cmd) => eqtrack::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
