use sea_orm::{ActiveValue, Condition, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Expense, ResultEngine, commands::NewExpenseCmd, expense_participants, expenses,
};

use super::{Engine, attach_participants, find_activity, find_activity_expenses, find_user, with_tx};

impl Engine {
    /// Records a new expense in an existing activity.
    ///
    /// The payer and every participant must be known users; they do not need
    /// to be on the activity roster.
    pub async fn create_expense(&self, cmd: NewExpenseCmd) -> ResultEngine<Expense> {
        let expense = Expense::new(
            &cmd.description,
            cmd.amount,
            cmd.category,
            cmd.paid_by,
            cmd.activity_id,
            cmd.participant_ids,
        )?;

        with_tx!(self, |db_tx| {
            find_activity(&db_tx, expense.activity_id).await?;
            for user_id in &expense.participant_ids {
                find_user(&db_tx, *user_id).await?;
            }

            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
            for (position, user_id) in expense.participant_ids.iter().enumerate() {
                expense_participants::ActiveModel {
                    expense_id: ActiveValue::Set(expense.id.to_string()),
                    user_id: ActiveValue::Set(user_id.to_string()),
                    position: ActiveValue::Set(position as i32),
                }
                .insert(&db_tx)
                .await?;
            }

            tracing::debug!(
                expense_id = %expense.id,
                activity_id = %expense.activity_id,
                amount = %expense.amount,
                participants = expense.participant_ids.len(),
                "expense created"
            );
            Ok(expense)
        })
    }

    pub async fn expense(&self, expense_id: Uuid) -> ResultEngine<Expense> {
        let model = expenses::Entity::find_by_id(expense_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("expense {expense_id}")))?;
        attach_participants(&self.database, vec![model])
            .await?
            .pop()
            .ok_or_else(|| EngineError::KeyNotFound(format!("expense {expense_id}")))
    }

    /// Expenses of an activity, oldest first.
    pub async fn activity_expenses(&self, activity_id: Uuid) -> ResultEngine<Vec<Expense>> {
        find_activity(&self.database, activity_id).await?;
        find_activity_expenses(&self.database, activity_id).await
    }

    /// Every expense paid by or shared with `user_id`.
    pub async fn user_expenses(&self, user_id: Uuid) -> ResultEngine<Vec<Expense>> {
        let id = user_id.to_string();
        let shared: Vec<String> = expense_participants::Entity::find()
            .filter(expense_participants::Column::UserId.eq(id.clone()))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|row| row.expense_id)
            .collect();

        let models = expenses::Entity::find()
            .filter(
                Condition::any()
                    .add(expenses::Column::PaidBy.eq(id))
                    .add(expenses::Column::Id.is_in(shared)),
            )
            .all(&self.database)
            .await?;
        attach_participants(&self.database, models).await
    }

    pub async fn delete_expense(&self, expense_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let id = expense_id.to_string();
            expenses::Entity::find_by_id(id.clone())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("expense {expense_id}")))?;

            expense_participants::Entity::delete_many()
                .filter(expense_participants::Column::ExpenseId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            expenses::Entity::delete_by_id(id).exec(&db_tx).await?;
            tracing::debug!(expense_id = %expense_id, "expense deleted");
            Ok(())
        })
    }
}
