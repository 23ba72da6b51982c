use std::collections::HashMap;

use sea_orm::TransactionTrait;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    Money, ParticipantBalance, ResultEngine, Settlement, compute_balances, compute_settlements,
    round2,
};

use super::{Engine, find_activity, find_activity_expenses, user_names, with_tx};

/// Display name for ids that have no user record.
pub const UNKNOWN_USER: &str = "Unknown user";

/// A participant balance with the participant's name attached.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NamedBalance {
    pub user_id: Uuid,
    pub user_name: String,
    pub total_paid: f64,
    pub total_owed: f64,
    pub net_balance: f64,
}

/// A settlement with both names attached.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NamedSettlement {
    pub from_user_id: Uuid,
    pub from_user_name: String,
    pub to_user_id: Uuid,
    pub to_user_name: String,
    pub amount: f64,
}

/// Balances and settlements of one activity, read together.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActivityReport {
    pub balances: Vec<NamedBalance>,
    pub settlements: Vec<NamedSettlement>,
}

impl NamedBalance {
    /// Copy with paid/owed/net rounded to 2 decimals, for display.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            user_id: self.user_id,
            user_name: self.user_name.clone(),
            total_paid: round2(self.total_paid),
            total_owed: round2(self.total_owed),
            net_balance: round2(self.net_balance),
        }
    }
}

impl NamedSettlement {
    pub fn amount_money(&self) -> Money {
        Money::from_major(self.amount)
    }
}

fn name_of(names: &HashMap<Uuid, String>, id: &Uuid) -> String {
    names
        .get(id)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_USER.to_string())
}

impl Engine {
    /// Roster and expenses of the activity, read in one transaction so the
    /// balance computation sees a consistent snapshot.
    async fn balance_snapshot(
        &self,
        activity_id: Uuid,
    ) -> ResultEngine<(Vec<ParticipantBalance<Uuid>>, HashMap<Uuid, String>)> {
        with_tx!(self, |db_tx| {
            let activity = find_activity(&db_tx, activity_id).await?;
            let expenses = find_activity_expenses(&db_tx, activity_id).await?;
            let balances = compute_balances(&activity.participants, &expenses);
            let names = user_names(&db_tx, balances.iter().map(|b| b.participant_id)).await?;
            tracing::debug!(
                activity_id = %activity_id,
                participants = balances.len(),
                expenses = expenses.len(),
                "balances computed"
            );
            Ok((balances, names))
        })
    }

    /// Paid/owed/net per participant: roster members first (in joining
    /// order), then anyone who only appears in expenses.
    pub async fn activity_balances(&self, activity_id: Uuid) -> ResultEngine<Vec<NamedBalance>> {
        let (balances, names) = self.balance_snapshot(activity_id).await?;
        Ok(named_balances(balances, &names))
    }

    /// Transfers that settle the activity.
    pub async fn activity_settlements(
        &self,
        activity_id: Uuid,
    ) -> ResultEngine<Vec<NamedSettlement>> {
        let (balances, names) = self.balance_snapshot(activity_id).await?;
        Ok(named_settlements(activity_id, &balances, &names))
    }

    /// Balances and settlements computed from the same snapshot.
    pub async fn activity_report(&self, activity_id: Uuid) -> ResultEngine<ActivityReport> {
        let (balances, names) = self.balance_snapshot(activity_id).await?;
        let settlements = named_settlements(activity_id, &balances, &names);
        Ok(ActivityReport {
            balances: named_balances(balances, &names),
            settlements,
        })
    }
}

fn named_balances(
    balances: Vec<ParticipantBalance<Uuid>>,
    names: &HashMap<Uuid, String>,
) -> Vec<NamedBalance> {
    balances
        .into_iter()
        .map(|b| NamedBalance {
            user_name: name_of(names, &b.participant_id),
            user_id: b.participant_id,
            total_paid: b.total_paid,
            total_owed: b.total_owed,
            net_balance: b.net_balance,
        })
        .collect()
}

fn named_settlements(
    activity_id: Uuid,
    balances: &[ParticipantBalance<Uuid>],
    names: &HashMap<Uuid, String>,
) -> Vec<NamedSettlement> {
    let settlements: Vec<Settlement<Uuid>> = compute_settlements(balances);
    tracing::debug!(
        activity_id = %activity_id,
        settlements = settlements.len(),
        "settlements computed"
    );
    settlements
        .into_iter()
        .map(|s| NamedSettlement {
            from_user_name: name_of(names, &s.from_id),
            to_user_name: name_of(names, &s.to_id),
            from_user_id: s.from_id,
            to_user_id: s.to_id,
            amount: s.amount,
        })
        .collect()
}
