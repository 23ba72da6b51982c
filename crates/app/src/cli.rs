use clap::{Args, Parser, Subcommand};
use engine::{ExpenseCategory, Money};

#[derive(Parser, Debug)]
#[command(name = "dividi")]
#[command(about = "Split shared expenses and find out who owes whom")]
pub struct Cli {
    /// Optional settings file (TOML), defaults to `settings.toml`.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Database connection string, overrides the configured database.
    #[arg(long, global = true, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage users.
    User(UserArgs),
    /// Manage activities and their rosters.
    Activity(ActivityArgs),
    /// Record, list and delete expenses.
    Expense(ExpenseArgs),
    /// Paid, owed and net balance of every participant.
    Balances { activity: String },
    /// Transfers that settle an activity.
    Settle { activity: String },
    /// Balances and settlements as CSV on stdout.
    Export { activity: String },
    /// Even split of what a group of friends paid, without storing anything.
    Quick {
        /// `NAME=AMOUNT` pairs, e.g. `Ana=60 Luis=15,50`.
        #[arg(required = true, value_parser = parse_friend)]
        friends: Vec<(String, Money)>,
    },
    /// Delete every user, activity and expense.
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    Add { name: String },
    List,
    Delete { user: String },
}

#[derive(Args, Debug)]
pub struct ActivityArgs {
    #[command(subcommand)]
    pub command: ActivityCommand,
}

#[derive(Subcommand, Debug)]
pub enum ActivityCommand {
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    List,
    Show {
        activity: String,
    },
    Delete {
        activity: String,
    },
    /// Add a user (created when unknown) to the roster.
    Join {
        activity: String,
        name: String,
    },
    /// Remove a user from the roster; their expenses stay.
    Leave {
        activity: String,
        user: String,
    },
}

#[derive(Args, Debug)]
pub struct ExpenseArgs {
    #[command(subcommand)]
    pub command: ExpenseCommand,
}

#[derive(Subcommand, Debug)]
pub enum ExpenseCommand {
    Add(ExpenseAddArgs),
    List { activity: String },
    Delete { expense: String },
}

#[derive(Args, Debug)]
pub struct ExpenseAddArgs {
    pub activity: String,
    #[arg(short, long)]
    pub description: String,
    #[arg(short, long)]
    pub amount: Money,
    /// Who paid, by name or id.
    #[arg(short, long)]
    pub payer: String,
    /// Who shares the expense; defaults to the whole roster.
    #[arg(short, long = "with", value_name = "USER")]
    pub with: Vec<String>,
    #[arg(short, long, default_value = "other", value_parser = parse_category)]
    pub category: ExpenseCategory,
}

fn parse_category(raw: &str) -> Result<ExpenseCategory, engine::EngineError> {
    ExpenseCategory::try_from(raw)
}

fn parse_friend(raw: &str) -> Result<(String, Money), String> {
    let (name, amount) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=AMOUNT, got {raw}"))?;
    let amount = amount.parse::<Money>().map_err(|err| err.to_string())?;
    Ok((name.trim().to_string(), amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_friend_pairs() {
        assert_eq!(
            parse_friend("Ana=60").unwrap(),
            ("Ana".to_string(), Money::new(60_00))
        );
        assert_eq!(
            parse_friend("Luis = 15,50").unwrap(),
            ("Luis".to_string(), Money::new(15_50))
        );
        assert!(parse_friend("Ana").is_err());
        assert!(parse_friend("Ana=abc").is_err());
    }

    #[test]
    fn parses_expense_add() {
        let cli = Cli::try_parse_from([
            "dividi", "expense", "add", "Trip", "-d", "Dinner", "-a", "120", "-p", "Ana", "-w",
            "Luis", "-w", "Carlos", "-c", "food",
        ])
        .unwrap();
        let Command::Expense(ExpenseArgs {
            command: ExpenseCommand::Add(args),
        }) = cli.command
        else {
            panic!("expected expense add");
        };
        assert_eq!(args.amount, Money::new(120_00));
        assert_eq!(args.with, vec!["Luis", "Carlos"]);
        assert_eq!(args.category, ExpenseCategory::Food);
        assert!(!cli.json);
    }

    #[test]
    fn quick_needs_friends() {
        assert!(Cli::try_parse_from(["dividi", "quick"]).is_err());
        assert!(Cli::try_parse_from(["dividi", "--json", "quick", "Ana=10", "Luis=0"]).is_ok());
    }
}
