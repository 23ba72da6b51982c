use std::collections::HashMap;

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    Activity, ResultEngine, User, activities, activity_participants, expense_participants,
    expenses, users, util::name_key,
};

use super::{Engine, find_activity, find_user, find_user_by_name, roster_rows, with_tx};

/// Outcome of [`Engine::create_activity`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CreatedActivity {
    pub activity: Activity,
    /// `false` when an activity with the same name already existed and was
    /// returned instead.
    pub was_created: bool,
}

impl Engine {
    /// Creates an activity with an empty roster. Names are unique (case and
    /// accents ignored): asking for an existing name returns that activity.
    pub async fn create_activity(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> ResultEngine<CreatedActivity> {
        let activity = Activity::new(name, description)?;
        with_tx!(self, |db_tx| {
            let existing = activities::Entity::find()
                .filter(activities::Column::NameNorm.eq(name_key(&activity.name)))
                .one(&db_tx)
                .await?;

            match existing {
                Some(model) => {
                    let roster = roster_rows(&db_tx, &model.id).await?;
                    tracing::debug!(name = %activity.name, "activity already exists");
                    Ok(CreatedActivity {
                        activity: Activity::try_from((model, roster))?,
                        was_created: false,
                    })
                }
                None => {
                    activities::ActiveModel::from(&activity)
                        .insert(&db_tx)
                        .await?;
                    tracing::debug!(activity_id = %activity.id, name = %activity.name, "activity created");
                    Ok(CreatedActivity {
                        activity,
                        was_created: true,
                    })
                }
            }
        })
    }

    pub async fn activity(&self, activity_id: Uuid) -> ResultEngine<Activity> {
        find_activity(&self.database, activity_id).await
    }

    pub async fn activity_by_name(&self, name: &str) -> ResultEngine<Option<Activity>> {
        let Some(model) = activities::Entity::find()
            .filter(activities::Column::NameNorm.eq(name_key(name)))
            .one(&self.database)
            .await?
        else {
            return Ok(None);
        };
        let roster = roster_rows(&self.database, &model.id).await?;
        Activity::try_from((model, roster)).map(Some)
    }

    /// Every activity with its roster, oldest first.
    pub async fn list_activities(&self) -> ResultEngine<Vec<Activity>> {
        let models = activities::Entity::find()
            .order_by_asc(activities::Column::CreatedAt)
            .all(&self.database)
            .await?;

        let mut rosters: HashMap<String, Vec<activity_participants::Model>> = HashMap::new();
        for row in activity_participants::Entity::find()
            .all(&self.database)
            .await?
        {
            rosters.entry(row.activity_id.clone()).or_default().push(row);
        }

        models
            .into_iter()
            .map(|model| {
                let roster = rosters.remove(&model.id).unwrap_or_default();
                Activity::try_from((model, roster))
            })
            .collect()
    }

    /// Adds the user called `user_name` to the roster, creating the user when
    /// nobody has that name yet. Adding someone already on the roster is a
    /// no-op.
    pub async fn add_user_to_activity(
        &self,
        activity_id: Uuid,
        user_name: &str,
    ) -> ResultEngine<User> {
        let candidate = User::new(user_name)?;
        with_tx!(self, |db_tx| {
            let mut activity = find_activity(&db_tx, activity_id).await?;

            let existing = find_user_by_name(&db_tx, &candidate.name).await?;
            let user = match existing {
                Some(user) => user,
                None => {
                    users::ActiveModel::from(&candidate).insert(&db_tx).await?;
                    tracing::debug!(user_id = %candidate.id, name = %candidate.name, "user created");
                    candidate
                }
            };

            if activity.add_participant(user.id) {
                let position = roster_rows(&db_tx, &activity_id.to_string())
                    .await?
                    .iter()
                    .map(|row| row.position)
                    .max()
                    .map_or(0, |p| p + 1);
                activity_participants::ActiveModel {
                    activity_id: ActiveValue::Set(activity.id.to_string()),
                    user_id: ActiveValue::Set(user.id.to_string()),
                    position: ActiveValue::Set(position),
                }
                .insert(&db_tx)
                .await?;
                tracing::debug!(activity_id = %activity.id, user_id = %user.id, "participant added");
            }

            Ok(user)
        })
    }

    /// Removes a user from the roster. Their expenses are kept and still
    /// count towards the activity balances.
    pub async fn remove_user_from_activity(
        &self,
        activity_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            find_activity(&db_tx, activity_id).await?;
            find_user(&db_tx, user_id).await?;
            activity_participants::Entity::delete_by_id((
                activity_id.to_string(),
                user_id.to_string(),
            ))
            .exec(&db_tx)
            .await?;
            tracing::debug!(activity_id = %activity_id, user_id = %user_id, "participant removed");
            Ok(())
        })
    }

    /// Deletes an activity together with its expenses and roster.
    pub async fn delete_activity(&self, activity_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let activity = find_activity(&db_tx, activity_id).await?;
            let id = activity.id.to_string();

            let expense_ids: Vec<String> = expenses::Entity::find()
                .filter(expenses::Column::ActivityId.eq(id.clone()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|e| e.id)
                .collect();

            if !expense_ids.is_empty() {
                expense_participants::Entity::delete_many()
                    .filter(expense_participants::Column::ExpenseId.is_in(expense_ids.clone()))
                    .exec(&db_tx)
                    .await?;
                expenses::Entity::delete_many()
                    .filter(expenses::Column::Id.is_in(expense_ids.clone()))
                    .exec(&db_tx)
                    .await?;
            }
            activity_participants::Entity::delete_many()
                .filter(activity_participants::Column::ActivityId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            activities::Entity::delete_by_id(id).exec(&db_tx).await?;

            tracing::info!(
                activity_id = %activity_id,
                expenses = expense_ids.len(),
                "activity deleted"
            );
            Ok(())
        })
    }
}
