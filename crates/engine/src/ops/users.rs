use std::collections::HashSet;

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, User, activity_participants, expense_participants, expenses, users,
};

use super::{Engine, find_user, find_user_by_name, with_tx};

impl Engine {
    /// Creates a user, or returns the existing one with the same name
    /// (case and accents ignored).
    pub async fn create_user(&self, name: &str) -> ResultEngine<User> {
        let user = User::new(name)?;
        with_tx!(self, |db_tx| {
            if let Some(existing) = find_user_by_name(&db_tx, &user.name).await? {
                tracing::debug!(user_id = %existing.id, "user already exists");
                Ok(existing)
            } else {
                users::ActiveModel::from(&user).insert(&db_tx).await?;
                tracing::debug!(user_id = %user.id, name = %user.name, "user created");
                Ok(user)
            }
        })
    }

    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        find_user(&self.database, user_id).await
    }

    pub async fn user_by_name(&self, name: &str) -> ResultEngine<Option<User>> {
        find_user_by_name(&self.database, name).await
    }

    /// Every user, oldest first.
    pub async fn list_users(&self) -> ResultEngine<Vec<User>> {
        users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    /// Deletes a user that no expense references, removing them from every
    /// activity roster.
    pub async fn delete_user(&self, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let user = find_user(&db_tx, user_id).await?;
            let id = user.id.to_string();

            let mut referenced: HashSet<String> = expenses::Entity::find()
                .filter(expenses::Column::PaidBy.eq(id.clone()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|e| e.id)
                .collect();
            referenced.extend(
                expense_participants::Entity::find()
                    .filter(expense_participants::Column::UserId.eq(id.clone()))
                    .all(&db_tx)
                    .await?
                    .into_iter()
                    .map(|row| row.expense_id),
            );

            if !referenced.is_empty() {
                return Err(EngineError::UserHasExpenses {
                    name: user.name,
                    count: referenced.len(),
                });
            }

            activity_participants::Entity::delete_many()
                .filter(activity_participants::Column::UserId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            users::Entity::delete_by_id(id).exec(&db_tx).await?;
            tracing::info!(user_id = %user_id, "user deleted");
            Ok(())
        })
    }
}
