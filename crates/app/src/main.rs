use clap::Parser;
use engine::{
    Activity, Engine, EngineError, Friend, NamedBalance, NewExpenseCmd, ParticipantBalance,
    QuickSplit, User,
};
use migration::{Migrator, MigratorTrait};
use serde_json::json;
use uuid::Uuid;

use cli::{ActivityCommand, Cli, Command, ExpenseAddArgs, ExpenseCommand, UserCommand};
use error::{AppError, Result};

mod cli;
mod error;
mod render;
mod settings;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "dividi={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let url = cli
        .database_url
        .clone()
        .unwrap_or_else(|| settings.database.url());
    let db = connect_db(&url).await?;
    let engine = Engine::builder().database(db).build().await?;

    run(&engine, cli).await?;
    Ok(())
}

async fn connect_db(url: &str) -> Result<sea_orm::DatabaseConnection> {
    tracing::debug!("connecting to {url}");
    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

async fn run(engine: &Engine, cli: Cli) -> Result<()> {
    let as_json = cli.json;
    match cli.command {
        Command::User(args) => match args.command {
            UserCommand::Add { name } => {
                let user = engine.create_user(&name).await?;
                if as_json {
                    render::json(&user)?;
                } else {
                    println!("user: {} ({})", user.name, user.id);
                }
            }
            UserCommand::List => {
                let users = engine.list_users().await?;
                if as_json {
                    render::json(&users)?;
                } else {
                    for user in &users {
                        println!("{}  {}", user.id, user.name);
                    }
                }
            }
            UserCommand::Delete { user } => {
                let user = resolve_user(engine, &user).await?;
                engine.delete_user(user.id).await?;
                println!("deleted user: {}", user.name);
            }
        },
        Command::Activity(args) => activity(engine, args.command, as_json).await?,
        Command::Expense(args) => expense(engine, args.command, as_json).await?,
        Command::Balances { activity } => {
            let activity = resolve_activity(engine, &activity).await?;
            let balances = engine.activity_balances(activity.id).await?;
            if as_json {
                let rounded: Vec<NamedBalance> =
                    balances.iter().map(NamedBalance::rounded).collect();
                render::json(&rounded)?;
            } else {
                render::balances(&balances);
            }
        }
        Command::Settle { activity } => {
            let activity = resolve_activity(engine, &activity).await?;
            let settlements = engine.activity_settlements(activity.id).await?;
            if as_json {
                render::json(&settlements)?;
            } else {
                render::settlements(&settlements);
            }
        }
        Command::Export { activity } => {
            let activity = resolve_activity(engine, &activity).await?;
            let report = engine.activity_report(activity.id).await?;
            render::export_csv(
                std::io::stdout().lock(),
                &report.balances,
                &report.settlements,
            )?;
        }
        Command::Quick { friends } => {
            let mut split = QuickSplit::new();
            for (name, paid) in friends {
                split.add_friend(Friend::new(&name, paid)?)?;
            }
            let summary = split.summary();
            let settlements = split.settlements();
            if as_json {
                render::json(&json!({
                    "summary": summary,
                    "balances": split
                        .balances()
                        .iter()
                        .map(ParticipantBalance::rounded)
                        .collect::<Vec<_>>(),
                    "settlements": settlements,
                }))?;
            } else {
                render::quick(&summary, &settlements);
            }
        }
        Command::Reset { yes } => {
            if !yes {
                return Err(AppError::Usage(
                    "reset deletes every user, activity and expense; pass --yes".to_string(),
                ));
            }
            engine.reset().await?;
            println!("all data deleted");
        }
    }
    Ok(())
}

async fn activity(engine: &Engine, command: ActivityCommand, as_json: bool) -> Result<()> {
    match command {
        ActivityCommand::Create { name, description } => {
            let created = engine
                .create_activity(&name, description.as_deref())
                .await?;
            if as_json {
                render::json(&created)?;
            } else if created.was_created {
                println!("activity: {} ({})", created.activity.name, created.activity.id);
            } else {
                println!("activity already exists: {}", created.activity.name);
            }
        }
        ActivityCommand::List => {
            let activities = engine.list_activities().await?;
            if as_json {
                render::json(&activities)?;
            } else {
                for a in &activities {
                    println!("{}  {}  ({} participants)", a.id, a.name, a.participants.len());
                }
            }
        }
        ActivityCommand::Show { activity } => {
            let activity = resolve_activity(engine, &activity).await?;
            let mut roster = Vec::with_capacity(activity.participants.len());
            for id in &activity.participants {
                roster.push(engine.user(*id).await?);
            }
            let expenses = engine.activity_expenses(activity.id).await?;
            let total: engine::Money = expenses.iter().map(|e| e.amount).sum();
            if as_json {
                render::json(&json!({
                    "activity": activity,
                    "participants": roster,
                    "expenses": expenses.len(),
                    "total": total,
                }))?;
            } else {
                println!("{} ({})", activity.name, activity.id);
                if let Some(description) = &activity.description {
                    println!("{description}");
                }
                let names: Vec<&str> = roster.iter().map(|u| u.name.as_str()).collect();
                println!("participants: {}", names.join(", "));
                println!("expenses: {}  total: {total}", expenses.len());
            }
        }
        ActivityCommand::Delete { activity } => {
            let activity = resolve_activity(engine, &activity).await?;
            engine.delete_activity(activity.id).await?;
            println!("deleted activity: {}", activity.name);
        }
        ActivityCommand::Join { activity, name } => {
            let activity = resolve_activity(engine, &activity).await?;
            let user = engine.add_user_to_activity(activity.id, &name).await?;
            if as_json {
                render::json(&user)?;
            } else {
                println!("{} joined {}", user.name, activity.name);
            }
        }
        ActivityCommand::Leave { activity, user } => {
            let activity = resolve_activity(engine, &activity).await?;
            let user = resolve_user(engine, &user).await?;
            engine
                .remove_user_from_activity(activity.id, user.id)
                .await?;
            println!("{} left {}", user.name, activity.name);
        }
    }
    Ok(())
}

async fn expense(engine: &Engine, command: ExpenseCommand, as_json: bool) -> Result<()> {
    match command {
        ExpenseCommand::Add(args) => {
            let expense = engine.create_expense(new_expense(engine, args).await?).await?;
            if as_json {
                render::json(&expense)?;
            } else {
                println!(
                    "expense: {} {} ({} participants) [{}]",
                    expense.description,
                    expense.amount,
                    expense.participant_ids.len(),
                    expense.id
                );
            }
        }
        ExpenseCommand::List { activity } => {
            let activity = resolve_activity(engine, &activity).await?;
            let expenses = engine.activity_expenses(activity.id).await?;
            if as_json {
                render::json(&expenses)?;
            } else {
                for e in &expenses {
                    let payer = engine.user(e.paid_by).await?;
                    println!(
                        "{}  {}  {:<24} {:>10}  paid by {}  [{}] split {}",
                        e.id,
                        e.created_at.format("%Y-%m-%d"),
                        e.description,
                        e.amount.to_string(),
                        payer.name,
                        e.category,
                        e.participant_ids.len()
                    );
                }
            }
        }
        ExpenseCommand::Delete { expense } => {
            let id = Uuid::parse_str(&expense)
                .map_err(|_| EngineError::InvalidId(format!("invalid expense id: {expense}")))?;
            engine.delete_expense(id).await?;
            println!("deleted expense: {id}");
        }
    }
    Ok(())
}

async fn new_expense(engine: &Engine, args: ExpenseAddArgs) -> Result<NewExpenseCmd> {
    let activity = resolve_activity(engine, &args.activity).await?;
    let payer = resolve_user(engine, &args.payer).await?;

    let participants = if args.with.is_empty() {
        activity.participants.clone()
    } else {
        let mut ids = Vec::with_capacity(args.with.len());
        for key in &args.with {
            ids.push(resolve_user(engine, key).await?.id);
        }
        ids
    };

    Ok(
        NewExpenseCmd::new(activity.id, args.description, args.amount, payer.id)
            .category(args.category)
            .participants(participants),
    )
}

/// Looks an activity up by id, falling back to its name.
async fn resolve_activity(engine: &Engine, key: &str) -> Result<Activity> {
    if let Ok(id) = Uuid::parse_str(key) {
        return Ok(engine.activity(id).await?);
    }
    engine
        .activity_by_name(key)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("activity {key}")).into())
}

async fn resolve_user(engine: &Engine, key: &str) -> Result<User> {
    if let Ok(id) = Uuid::parse_str(key) {
        return Ok(engine.user(id).await?);
    }
    engine
        .user_by_name(key)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("user {key}")).into())
}
