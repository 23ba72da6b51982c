//! Expense primitives.
//!
//! An `Expense` is paid in full by one participant and split equally among
//! its participant list. The constructor is the validation boundary: once an
//! `Expense` exists, the balance calculator trusts it.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, Money, ResultEngine,
    balances::SharedExpense,
    util::{parse_uuid, validate_name},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Food,
    Transport,
    Accommodation,
    Entertainment,
    Shopping,
    Utilities,
    #[default]
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 7] = [
        Self::Food,
        Self::Transport,
        Self::Accommodation,
        Self::Entertainment,
        Self::Shopping,
        Self::Utilities,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Accommodation => "accommodation",
            Self::Entertainment => "entertainment",
            Self::Shopping => "shopping",
            Self::Utilities => "utilities",
            Self::Other => "other",
        }
    }
}

impl core::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ExpenseCategory {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == value)
            .ok_or_else(|| EngineError::InvalidName(format!("invalid expense category: {value}")))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Expense {
    pub id: Uuid,
    pub description: String,
    pub amount: Money,
    pub category: ExpenseCategory,
    pub paid_by: Uuid,
    pub activity_id: Uuid,
    /// Who shares the amount, in the order they were given.
    pub participant_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Validates and builds a new expense.
    ///
    /// - description: at least 2 characters once trimmed
    /// - amount: strictly positive
    /// - participants: non-empty, no duplicates, payer included
    pub fn new(
        description: &str,
        amount: Money,
        category: ExpenseCategory,
        paid_by: Uuid,
        activity_id: Uuid,
        participant_ids: Vec<Uuid>,
    ) -> ResultEngine<Self> {
        let description = validate_name(description, "expense description")?;
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "expense amount must be greater than 0".to_string(),
            ));
        }
        if participant_ids.is_empty() {
            return Err(EngineError::InvalidParticipants(
                "expense must have at least one participant".to_string(),
            ));
        }
        for (i, id) in participant_ids.iter().enumerate() {
            if participant_ids[..i].contains(id) {
                return Err(EngineError::InvalidParticipants(
                    "duplicate participants are not allowed".to_string(),
                ));
            }
        }
        if !participant_ids.contains(&paid_by) {
            return Err(EngineError::InvalidParticipants(
                "payer must be one of the participants".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            description,
            amount,
            category,
            paid_by,
            activity_id,
            participant_ids,
            created_at: Utc::now(),
        })
    }

    /// Equal share of each participant, unrounded, in major units.
    pub fn amount_per_participant(&self) -> f64 {
        if self.participant_ids.is_empty() {
            return 0.0;
        }
        self.amount.to_major() / self.participant_ids.len() as f64
    }

    /// Effect of this expense on `user_id`'s balance: the payer is owed
    /// everything but their own share, other participants owe their share,
    /// outsiders are untouched.
    pub fn debt_for(&self, user_id: Uuid) -> f64 {
        if !self.involves_participant(user_id) {
            return 0.0;
        }
        let share = self.amount_per_participant();
        if user_id == self.paid_by {
            self.amount.to_major() - share
        } else {
            -share
        }
    }

    pub fn involves_participant(&self, user_id: Uuid) -> bool {
        self.participant_ids.contains(&user_id)
    }

    /// Paid by or shared with `user_id`.
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.paid_by == user_id || self.involves_participant(user_id)
    }

    pub fn belongs_to(&self, activity_id: Uuid) -> bool {
        self.activity_id == activity_id
    }
}

impl SharedExpense for Expense {
    type Id = Uuid;

    fn amount(&self) -> f64 {
        self.amount.to_major()
    }

    fn payer(&self) -> &Uuid {
        &self.paid_by
    }

    fn participants(&self) -> &[Uuid] {
        &self.participant_ids
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub activity_id: String,
    pub description: String,
    pub amount_minor: i64,
    pub category: String,
    pub paid_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::activities::Entity",
        from = "Column::ActivityId",
        to = "super::activities::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Activities,
    #[sea_orm(has_many = "super::expense_participants::Entity")]
    Participants,
}

impl Related<super::activities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activities.def()
    }
}

impl Related<super::expense_participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            activity_id: ActiveValue::Set(expense.activity_id.to_string()),
            description: ActiveValue::Set(expense.description.clone()),
            amount_minor: ActiveValue::Set(expense.amount.cents()),
            category: ActiveValue::Set(expense.category.as_str().to_string()),
            paid_by: ActiveValue::Set(expense.paid_by.to_string()),
            created_at: ActiveValue::Set(expense.created_at),
        }
    }
}

/// Builds an `Expense` from its row and its participant rows (any order).
///
/// Stored rows were validated when the expense was created; an unreadable id
/// or category is reported instead of patched.
impl TryFrom<(Model, Vec<super::expense_participants::Model>)> for Expense {
    type Error = EngineError;

    fn try_from(
        (model, mut rows): (Model, Vec<super::expense_participants::Model>),
    ) -> Result<Self, Self::Error> {
        rows.sort_by_key(|row| row.position);
        let participant_ids = rows
            .iter()
            .map(|row| parse_uuid(&row.user_id, "user"))
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            description: model.description,
            amount: Money::new(model.amount_minor),
            category: ExpenseCategory::try_from(model.category.as_str())?,
            paid_by: parse_uuid(&model.paid_by, "user")?,
            activity_id: parse_uuid(&model.activity_id, "activity")?,
            participant_ids,
            created_at: model.created_at,
        })
    }
}
