//! The module contains `Activity` struct and its storage model.
//!
//! An activity (a trip, a dinner, a shared flat) owns a roster of
//! participants and the expenses recorded for it. The roster lives in
//! [`activity_participants`](crate::activity_participants) and keeps the
//! order in which people joined.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{name_key, normalize_optional_text, parse_uuid, validate_name},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// User ids in joining order, without duplicates.
    pub participants: Vec<Uuid>,
}

impl Activity {
    pub fn new(name: &str, description: Option<&str>) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: validate_name(name, "activity")?,
            description: normalize_optional_text(description),
            created_at: Utc::now(),
            participants: Vec::new(),
        })
    }

    /// Adds `user_id` to the roster. Returns `false` when already present.
    pub fn add_participant(&mut self, user_id: Uuid) -> bool {
        if self.has_participant(user_id) {
            return false;
        }
        self.participants.push(user_id);
        true
    }

    /// Removes `user_id` from the roster. Returns `false` when absent.
    pub fn remove_participant(&mut self, user_id: Uuid) -> bool {
        let before = self.participants.len();
        self.participants.retain(|id| *id != user_id);
        self.participants.len() != before
    }

    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.participants.contains(&user_id)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "activities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub name_norm: String,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::activity_participants::Entity")]
    Participants,
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
}

impl Related<super::activity_participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Activity> for ActiveModel {
    fn from(activity: &Activity) -> Self {
        Self {
            id: ActiveValue::Set(activity.id.to_string()),
            name: ActiveValue::Set(activity.name.clone()),
            name_norm: ActiveValue::Set(name_key(&activity.name)),
            description: ActiveValue::Set(activity.description.clone()),
            created_at: ActiveValue::Set(activity.created_at),
        }
    }
}

/// Builds an `Activity` from its row and its roster rows (any order).
impl TryFrom<(Model, Vec<super::activity_participants::Model>)> for Activity {
    type Error = EngineError;

    fn try_from(
        (model, mut roster): (Model, Vec<super::activity_participants::Model>),
    ) -> Result<Self, Self::Error> {
        roster.sort_by_key(|row| row.position);
        let participants = roster
            .iter()
            .map(|row| parse_uuid(&row.user_id, "user"))
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok(Self {
            id: parse_uuid(&model.id, "activity")?,
            name: model.name,
            description: model.description,
            created_at: model.created_at,
            participants,
        })
    }
}
