//! Shared expenses engine.
//!
//! The heart of the crate is two pure functions:
//!
//! - [`compute_balances`] aggregates the expenses of an activity into one
//!   [`ParticipantBalance`] per participant (paid, owed, net);
//! - [`compute_settlements`] turns those balances into a short list of
//!   debtor → creditor [`Settlement`]s.
//!
//! Both are synchronous, never fail and never touch storage. [`Engine`]
//! wraps them with the use cases of the application (users, activities,
//! expenses) persisted through `sea-orm`, and [`QuickSplit`] offers the
//! same settlement logic for a group that simply shares a total evenly.

pub use activities::Activity;
pub use balances::{ParticipantBalance, SharedExpense, compute_balances};
pub use commands::NewExpenseCmd;
pub use error::EngineError;
pub use expenses::{Expense, ExpenseCategory};
pub use money::Money;
pub use numeric::{EPSILON, is_settled, round2};
pub use ops::{
    ActivityReport, CreatedActivity, Engine, EngineBuilder, NamedBalance, NamedSettlement,
    UNKNOWN_USER,
};
pub use settlements::{Settlement, compute_settlements};
pub use split::{Friend, QuickSplit, SplitSummary};
pub use users::User;

mod activities;
mod activity_participants;
mod balances;
mod commands;
mod error;
mod expense_participants;
mod expenses;
mod money;
mod numeric;
mod ops;
mod settlements;
mod split;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
