use std::collections::HashMap;

use sea_orm::{
    ConnectionTrait, DatabaseConnection, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Activity, EngineError, Expense, ResultEngine, User, activity_participants,
    expense_participants,
    util::{name_key, parse_uuid},
};

mod activities;
mod expenses;
mod reports;
mod users;

pub use activities::CreatedActivity;
pub use reports::{ActivityReport, NamedBalance, NamedSettlement, UNKNOWN_USER};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point of every use case: users, activities, expenses and the
/// balance/settlement reports built on top of them.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Deletes every user, activity and expense.
    pub async fn reset(&self) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            expense_participants::Entity::delete_many()
                .exec(&db_tx)
                .await?;
            crate::expenses::Entity::delete_many().exec(&db_tx).await?;
            activity_participants::Entity::delete_many()
                .exec(&db_tx)
                .await?;
            crate::activities::Entity::delete_many().exec(&db_tx).await?;
            crate::users::Entity::delete_many().exec(&db_tx).await?;
            tracing::info!("all data has been reset");
            Ok(())
        })
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}

pub(crate) async fn find_user<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> ResultEngine<User> {
    let model = crate::users::Entity::find_by_id(user_id.to_string())
        .one(conn)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("user {user_id}")))?;
    User::try_from(model)
}

pub(crate) async fn find_user_by_name<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> ResultEngine<Option<User>> {
    crate::users::Entity::find()
        .filter(crate::users::Column::NameNorm.eq(name_key(name)))
        .one(conn)
        .await?
        .map(User::try_from)
        .transpose()
}

pub(crate) async fn find_activity<C: ConnectionTrait>(
    conn: &C,
    activity_id: Uuid,
) -> ResultEngine<Activity> {
    let model = crate::activities::Entity::find_by_id(activity_id.to_string())
        .one(conn)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("activity {activity_id}")))?;
    let roster = roster_rows(conn, &model.id).await?;
    Activity::try_from((model, roster))
}

pub(crate) async fn roster_rows<C: ConnectionTrait>(
    conn: &C,
    activity_id: &str,
) -> ResultEngine<Vec<activity_participants::Model>> {
    Ok(activity_participants::Entity::find()
        .filter(activity_participants::Column::ActivityId.eq(activity_id.to_string()))
        .order_by_asc(activity_participants::Column::Position)
        .all(conn)
        .await?)
}

/// Expenses of an activity, oldest first, with their participants.
pub(crate) async fn find_activity_expenses<C: ConnectionTrait>(
    conn: &C,
    activity_id: Uuid,
) -> ResultEngine<Vec<Expense>> {
    let models = crate::expenses::Entity::find()
        .filter(crate::expenses::Column::ActivityId.eq(activity_id.to_string()))
        .order_by_asc(crate::expenses::Column::CreatedAt)
        .all(conn)
        .await?;
    attach_participants(conn, models).await
}

pub(crate) async fn attach_participants<C: ConnectionTrait>(
    conn: &C,
    models: Vec<crate::expenses::Model>,
) -> ResultEngine<Vec<Expense>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
    let mut rows_by_expense: HashMap<String, Vec<expense_participants::Model>> = HashMap::new();
    for row in expense_participants::Entity::find()
        .filter(expense_participants::Column::ExpenseId.is_in(ids))
        .all(conn)
        .await?
    {
        rows_by_expense
            .entry(row.expense_id.clone())
            .or_default()
            .push(row);
    }

    models
        .into_iter()
        .map(|model| {
            let rows = rows_by_expense.remove(&model.id).unwrap_or_default();
            Expense::try_from((model, rows))
        })
        .collect()
}

/// Names of the given users; ids without a user row are left out.
pub(crate) async fn user_names<C: ConnectionTrait>(
    conn: &C,
    ids: impl IntoIterator<Item = Uuid>,
) -> ResultEngine<HashMap<Uuid, String>> {
    let ids: Vec<String> = ids.into_iter().map(|id| id.to_string()).collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    crate::users::Entity::find()
        .filter(crate::users::Column::Id.is_in(ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|model| Ok((parse_uuid(&model.id, "user")?, model.name)))
        .collect()
}
