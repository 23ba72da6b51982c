//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use uuid::Uuid;

use crate::{ExpenseCategory, Money};

/// Record an expense in an activity.
///
/// By default the expense is split among the payer only; add the other
/// participants with [`NewExpenseCmd::participants`] or
/// [`NewExpenseCmd::participant`]. The payer is always included.
#[derive(Clone, Debug)]
pub struct NewExpenseCmd {
    pub activity_id: Uuid,
    pub description: String,
    pub amount: Money,
    pub category: ExpenseCategory,
    pub paid_by: Uuid,
    pub participant_ids: Vec<Uuid>,
}

impl NewExpenseCmd {
    #[must_use]
    pub fn new(
        activity_id: Uuid,
        description: impl Into<String>,
        amount: Money,
        paid_by: Uuid,
    ) -> Self {
        Self {
            activity_id,
            description: description.into(),
            amount,
            category: ExpenseCategory::default(),
            paid_by,
            participant_ids: vec![paid_by],
        }
    }

    #[must_use]
    pub fn category(mut self, category: ExpenseCategory) -> Self {
        self.category = category;
        self
    }

    /// Replaces the participant list. The payer is prepended when missing.
    #[must_use]
    pub fn participants(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.participant_ids = ids.into_iter().collect();
        if !self.participant_ids.contains(&self.paid_by) {
            self.participant_ids.insert(0, self.paid_by);
        }
        self
    }

    #[must_use]
    pub fn participant(mut self, id: Uuid) -> Self {
        if !self.participant_ids.contains(&id) {
            self.participant_ids.push(id);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payer_is_always_a_participant() {
        let activity = Uuid::new_v4();
        let ana = Uuid::new_v4();
        let luis = Uuid::new_v4();

        let cmd = NewExpenseCmd::new(activity, "Dinner", Money::new(30_00), ana);
        assert_eq!(cmd.participant_ids, vec![ana]);

        let cmd = cmd.participants([luis]);
        assert_eq!(cmd.participant_ids, vec![ana, luis]);

        let cmd = cmd.participant(luis).participant(ana);
        assert_eq!(cmd.participant_ids, vec![ana, luis]);
        assert_eq!(cmd.category, ExpenseCategory::Other);
    }
}
