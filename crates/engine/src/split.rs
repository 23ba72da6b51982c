//! Quick split: a group where everybody shares the total evenly.
//!
//! Each friend only records how much they paid. The average per person is
//! what everybody owes, and the same settlement sweep used for activities
//! tells who pays whom.

use serde::Serialize;

use crate::{
    EngineError, Money, ResultEngine,
    balances::ParticipantBalance,
    numeric::round2,
    settlements::{Settlement, compute_settlements},
    util::{name_key, validate_name},
};

/// A friend and what they paid for the group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Friend {
    pub name: String,
    pub total_paid: Money,
}

impl Friend {
    pub fn new(name: &str, total_paid: Money) -> ResultEngine<Self> {
        let name = validate_name(name, "friend")?;
        if total_paid.is_negative() {
            return Err(EngineError::InvalidAmount(
                "amount cannot be negative".to_string(),
            ));
        }
        Ok(Self { name, total_paid })
    }
}

/// Totals for a quick split.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SplitSummary {
    pub total_expenses: f64,
    pub average_per_person: f64,
    pub number_of_friends: usize,
}

/// The friends of a quick split, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct QuickSplit {
    friends: Vec<Friend>,
}

impl QuickSplit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn friends(&self) -> &[Friend] {
        &self.friends
    }

    /// Adds a friend; names are unique regardless of case and accents.
    pub fn add_friend(&mut self, friend: Friend) -> ResultEngine<()> {
        if self.position(&friend.name).is_some() {
            return Err(EngineError::ExistingKey(friend.name));
        }
        self.friends.push(friend);
        Ok(())
    }

    pub fn remove_friend(&mut self, name: &str) -> ResultEngine<Friend> {
        let at = self
            .position(name)
            .ok_or_else(|| EngineError::KeyNotFound(name.to_string()))?;
        Ok(self.friends.remove(at))
    }

    /// Replaces the friend called `name`. Renaming onto another friend's name
    /// is rejected.
    pub fn update_friend(&mut self, name: &str, friend: Friend) -> ResultEngine<()> {
        let at = self
            .position(name)
            .ok_or_else(|| EngineError::KeyNotFound(name.to_string()))?;
        if let Some(other) = self.position(&friend.name)
            && other != at
        {
            return Err(EngineError::ExistingKey(friend.name));
        }
        self.friends[at] = friend;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.friends.clear();
    }

    pub fn total(&self) -> Money {
        self.friends.iter().map(|f| f.total_paid).sum()
    }

    pub fn summary(&self) -> SplitSummary {
        let total = self.total().to_major();
        let count = self.friends.len();
        let average = if count > 0 { total / count as f64 } else { 0.0 };
        SplitSummary {
            total_expenses: round2(total),
            average_per_person: round2(average),
            number_of_friends: count,
        }
    }

    /// Balances against the unrounded average.
    pub fn balances(&self) -> Vec<ParticipantBalance<String>> {
        if self.friends.is_empty() {
            return Vec::new();
        }
        let average = self.total().to_major() / self.friends.len() as f64;
        self.friends
            .iter()
            .map(|f| {
                let paid = f.total_paid.to_major();
                ParticipantBalance {
                    participant_id: f.name.clone(),
                    total_paid: paid,
                    total_owed: average,
                    net_balance: paid - average,
                }
            })
            .collect()
    }

    pub fn settlements(&self) -> Vec<Settlement<String>> {
        compute_settlements(&self.balances())
    }

    fn position(&self, name: &str) -> Option<usize> {
        let key = name_key(name);
        self.friends.iter().position(|f| name_key(&f.name) == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn friend(name: &str, cents: i64) -> Friend {
        Friend::new(name, Money::new(cents)).unwrap()
    }

    fn split(friends: &[(&str, i64)]) -> QuickSplit {
        let mut split = QuickSplit::new();
        for (name, cents) in friends {
            split.add_friend(friend(name, *cents)).unwrap();
        }
        split
    }

    #[test]
    fn summary_of_empty_split() {
        let split = QuickSplit::new();
        assert_eq!(
            split.summary(),
            SplitSummary {
                total_expenses: 0.0,
                average_per_person: 0.0,
                number_of_friends: 0,
            }
        );
        assert!(split.settlements().is_empty());
    }

    #[test]
    fn everybody_pays_the_average() {
        let split = split(&[("Ana", 60_00), ("Luis", 30_00), ("Carlos", 0)]);

        let summary = split.summary();
        assert_eq!(summary.total_expenses, 90.0);
        assert_eq!(summary.average_per_person, 30.0);
        assert_eq!(summary.number_of_friends, 3);

        let settlements = split.settlements();
        assert_eq!(settlements.len(), 1);
        assert_eq!(settlements[0].from_id, "Carlos");
        assert_eq!(settlements[0].to_id, "Ana");
        assert_eq!(settlements[0].amount, 30.0);
    }

    #[test]
    fn average_is_rounded_for_display_only() {
        let split = split(&[("Ana", 100_00), ("Luis", 0), ("Carlos", 0)]);
        assert_eq!(split.summary().average_per_person, 33.33);

        let amounts: Vec<f64> = split.settlements().iter().map(|s| s.amount).collect();
        assert_eq!(amounts, vec![33.33, 33.33]);
    }

    #[test]
    fn equal_payments_settle_nothing() {
        let split = split(&[("Ana", 25_00), ("Luis", 25_00)]);
        assert!(split.settlements().is_empty());
    }

    #[test]
    fn rejects_duplicates_ignoring_case_and_accents() {
        let mut split = split(&[("José", 10_00)]);
        let err = split.add_friend(friend("jose", 5_00)).unwrap_err();
        assert_eq!(err, EngineError::ExistingKey("jose".to_string()));
    }

    #[test]
    fn rejects_short_names_and_negative_amounts() {
        assert!(Friend::new(" a ", Money::new(100)).is_err());
        assert!(Friend::new("Ana", Money::new(-1)).is_err());
        assert!(Friend::new("Ana", Money::ZERO).is_ok());
    }

    #[test]
    fn update_and_remove() {
        let mut split = split(&[("Ana", 10_00), ("Luis", 20_00)]);

        split.update_friend("ana", friend("Anna", 15_00)).unwrap();
        assert_eq!(split.friends()[0], friend("Anna", 15_00));

        let err = split.update_friend("Anna", friend("Luis", 1_00)).unwrap_err();
        assert_eq!(err, EngineError::ExistingKey("Luis".to_string()));

        let removed = split.remove_friend("LUIS").unwrap();
        assert_eq!(removed.name, "Luis");
        assert_eq!(split.total(), Money::new(15_00));

        split.clear();
        assert!(split.friends().is_empty());
    }
}
