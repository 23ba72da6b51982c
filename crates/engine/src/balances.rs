//! Per-participant balances of a set of shared expenses.
//!
//! Every expense is paid in full by one participant and split equally among
//! its participant list. A participant's net balance is what they paid minus
//! the sum of their shares:
//!
//! - positive: creditor, the group owes them money
//! - negative: debtor, they owe money to the group
//! - within [`EPSILON`](crate::numeric::EPSILON): settled
//!
//! Shares are accumulated unrounded, so the net balances of a closed set of
//! expenses sum to zero up to floating-point noise.

use std::{collections::HashMap, hash::Hash};

use serde::Serialize;

use crate::numeric::{is_settled, round2};

/// Read access to an expense as far as the balance calculator cares.
///
/// Implementors are expected to be validated upstream (positive amount,
/// non-empty participants without duplicates, payer among the participants).
pub trait SharedExpense {
    type Id;

    /// Amount in major units.
    fn amount(&self) -> f64;

    /// Who paid the whole amount.
    fn payer(&self) -> &Self::Id;

    /// Who shares the amount, each for `amount / participants().len()`.
    fn participants(&self) -> &[Self::Id];
}

/// Net position of one participant.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParticipantBalance<Id> {
    pub participant_id: Id,
    pub total_paid: f64,
    pub total_owed: f64,
    pub net_balance: f64,
}

impl<Id> ParticipantBalance<Id> {
    /// Balance with nothing paid and nothing owed.
    pub fn zero(participant_id: Id) -> Self {
        Self {
            participant_id,
            total_paid: 0.0,
            total_owed: 0.0,
            net_balance: 0.0,
        }
    }

    pub fn is_creditor(&self) -> bool {
        !is_settled(self.net_balance) && self.net_balance > 0.0
    }

    pub fn is_debtor(&self) -> bool {
        !is_settled(self.net_balance) && self.net_balance < 0.0
    }

    pub fn is_settled(&self) -> bool {
        is_settled(self.net_balance)
    }

    /// Copy with every amount rounded to 2 decimals, for display.
    #[must_use]
    pub fn rounded(&self) -> Self
    where
        Id: Clone,
    {
        Self {
            participant_id: self.participant_id.clone(),
            total_paid: round2(self.total_paid),
            total_owed: round2(self.total_owed),
            net_balance: round2(self.net_balance),
        }
    }
}

/// Aggregates `expenses` into one balance per participant.
///
/// Every id of `roster` gets an entry, even without expenses, in roster order.
/// Ids that only show up in expenses (payer or participant outside the
/// roster) are still counted and appended in first-seen order.
///
/// Expenses without participants are skipped.
pub fn compute_balances<E, Id>(roster: &[Id], expenses: &[E]) -> Vec<ParticipantBalance<Id>>
where
    E: SharedExpense<Id = Id>,
    Id: Clone + Eq + Hash,
{
    let mut balances: Vec<ParticipantBalance<Id>> = Vec::with_capacity(roster.len());
    let mut index: HashMap<Id, usize> = HashMap::with_capacity(roster.len());

    for id in roster {
        slot(&mut balances, &mut index, id);
    }

    for expense in expenses {
        let participants = expense.participants();
        if participants.is_empty() {
            continue;
        }

        let amount = expense.amount();
        let share = amount / participants.len() as f64;

        let payer = slot(&mut balances, &mut index, expense.payer());
        balances[payer].total_paid += amount;

        for participant in participants {
            let at = slot(&mut balances, &mut index, participant);
            balances[at].total_owed += share;
        }
    }

    for balance in &mut balances {
        balance.net_balance = balance.total_paid - balance.total_owed;
    }

    balances
}

/// Position of `id` in `balances`, inserting a zero entry when missing.
fn slot<Id: Clone + Eq + Hash>(
    balances: &mut Vec<ParticipantBalance<Id>>,
    index: &mut HashMap<Id, usize>,
    id: &Id,
) -> usize {
    if let Some(&at) = index.get(id) {
        return at;
    }
    let at = balances.len();
    balances.push(ParticipantBalance::zero(id.clone()));
    index.insert(id.clone(), at);
    at
}
