//! Turns balances into a short list of debtor → creditor transfers.
//!
//! Greedy largest-first matching: creditors sorted by descending balance,
//! debtors by most negative balance, then a two-pointer sweep pairs the
//! current largest creditor with the current largest debtor and moves the
//! smaller of the two amounts. Each step clears at least one side, so at
//! most `participants - 1` transfers are produced. This is not a globally
//! optimal solver and the output order is part of the contract.

use serde::Serialize;

use crate::{
    Money,
    balances::ParticipantBalance,
    numeric::{EPSILON, round2},
};

/// A recommended transfer of `amount` from `from_id` (debtor) to `to_id`
/// (creditor). `amount` is rounded to 2 decimals and always above
/// [`EPSILON`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Settlement<Id> {
    pub from_id: Id,
    pub to_id: Id,
    pub amount: f64,
}

impl<Id> Settlement<Id> {
    /// The transfer amount in cents.
    pub fn amount_money(&self) -> Money {
        Money::from_major(self.amount)
    }
}

struct Open<'a, Id> {
    id: &'a Id,
    remaining: f64,
}

/// Computes the settlements that bring every balance to zero.
///
/// Balances within [`EPSILON`] of zero are ignored. Equal balances keep their
/// input order. An empty or fully settled input yields no settlements.
pub fn compute_settlements<Id: Clone>(balances: &[ParticipantBalance<Id>]) -> Vec<Settlement<Id>> {
    let mut creditors: Vec<Open<'_, Id>> = balances
        .iter()
        .filter(|b| b.net_balance > EPSILON)
        .map(|b| Open {
            id: &b.participant_id,
            remaining: b.net_balance,
        })
        .collect();
    // `sort_by` is stable: ties stay in input order.
    creditors.sort_by(|a, b| b.remaining.total_cmp(&a.remaining));

    let mut debtors: Vec<Open<'_, Id>> = balances
        .iter()
        .filter(|b| b.net_balance < -EPSILON)
        .map(|b| Open {
            id: &b.participant_id,
            remaining: b.net_balance,
        })
        .collect();
    debtors.sort_by(|a, b| a.remaining.total_cmp(&b.remaining));

    let mut settlements = Vec::new();
    let mut c = 0;
    let mut d = 0;

    while c < creditors.len() && d < debtors.len() {
        let creditor = &mut creditors[c];
        let debtor = &mut debtors[d];
        let transfer = creditor.remaining.min(debtor.remaining.abs());

        if transfer > EPSILON {
            settlements.push(Settlement {
                from_id: debtor.id.clone(),
                to_id: creditor.id.clone(),
                amount: round2(transfer),
            });
            creditor.remaining -= transfer;
            debtor.remaining += transfer;
        }

        let creditor_done = creditor.remaining.abs() <= EPSILON;
        let debtor_done = debtor.remaining.abs() <= EPSILON;
        if creditor_done {
            c += 1;
        }
        if debtor_done {
            d += 1;
        }
        if !creditor_done && !debtor_done {
            // Unreachable with finite balances: the smaller side is always
            // cleared. Guards against NaN input looping forever.
            break;
        }
    }

    settlements
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::balances::{compute_balances, tests::Paid};

    fn balance(id: &'static str, net: f64) -> ParticipantBalance<&'static str> {
        ParticipantBalance {
            participant_id: id,
            total_paid: net.max(0.0),
            total_owed: (-net).max(0.0),
            net_balance: net,
        }
    }

    fn transfer(from: &'static str, to: &'static str, amount: f64) -> Settlement<&'static str> {
        Settlement {
            from_id: from,
            to_id: to,
            amount,
        }
    }

    #[test]
    fn trip_with_three_friends() {
        let roster = ["Ana", "Luis", "Carlos"];
        let expenses = vec![
            Paid::new(90.0, "Ana", &["Ana", "Luis", "Carlos"]),
            Paid::new(15.0, "Luis", &["Ana", "Luis"]),
            Paid::new(12.0, "Carlos", &["Ana", "Luis", "Carlos"]),
        ];

        let settlements = compute_settlements(&compute_balances(&roster, &expenses));
        assert_eq!(
            settlements,
            vec![
                transfer("Luis", "Ana", 26.5),
                transfer("Carlos", "Ana", 22.0),
            ]
        );
    }

    #[test]
    fn single_participant_settles_nothing() {
        let roster = ["Ana"];
        let expenses = vec![Paid::new(80.0, "Ana", &["Ana"])];
        assert!(compute_settlements(&compute_balances(&roster, &expenses)).is_empty());
    }

    #[test]
    fn reciprocal_expenses_settle_nothing() {
        let roster = ["Ana", "Luis"];
        let expenses = vec![
            Paid::new(40.0, "Ana", &["Ana", "Luis"]),
            Paid::new(40.0, "Luis", &["Ana", "Luis"]),
        ];
        assert!(compute_settlements(&compute_balances(&roster, &expenses)).is_empty());
    }

    #[test]
    fn no_expenses_settle_nothing() {
        let roster = ["Ana", "Luis", "Carlos"];
        let balances = compute_balances::<Paid, _>(&roster, &[]);
        assert!(compute_settlements(&balances).is_empty());
        assert!(compute_settlements::<&str>(&[]).is_empty());
    }

    #[test]
    fn balances_within_tolerance_are_ignored() {
        let balances = vec![balance("A", 0.01), balance("B", -0.01), balance("C", 0.0)];
        assert!(compute_settlements(&balances).is_empty());
    }

    #[test]
    fn largest_creditor_meets_largest_debtor_first() {
        let balances = vec![
            balance("A", 10.0),
            balance("B", 50.0),
            balance("C", -20.0),
            balance("D", -40.0),
        ];

        assert_eq!(
            compute_settlements(&balances),
            vec![
                transfer("D", "B", 40.0),
                transfer("C", "B", 10.0),
                transfer("C", "A", 10.0),
            ]
        );
    }

    #[test]
    fn ties_keep_input_order() {
        let balances = vec![
            balance("A", 10.0),
            balance("B", 10.0),
            balance("C", -10.0),
            balance("D", -10.0),
        ];

        assert_eq!(
            compute_settlements(&balances),
            vec![transfer("C", "A", 10.0), transfer("D", "B", 10.0)]
        );
    }

    #[test]
    fn amounts_are_rounded_only_when_emitted() {
        let roster = ["A", "B", "C"];
        let expenses = vec![Paid::new(100.0, "A", &["A", "B", "C"])];

        let settlements = compute_settlements(&compute_balances(&roster, &expenses));
        assert_eq!(
            settlements,
            vec![transfer("B", "A", 33.33), transfer("C", "A", 33.33)]
        );
        assert_eq!(settlements[0].amount_money(), Money::new(3333));
    }

    #[test]
    fn residue_below_tolerance_is_dropped() {
        let balances = vec![balance("A", 10.005), balance("B", -10.0)];
        assert_eq!(compute_settlements(&balances), vec![transfer("B", "A", 10.0)]);
    }

    #[test]
    fn settling_twice_is_a_no_op() {
        let roster = ["Ana", "Luis", "Carlos"];
        let expenses = vec![
            Paid::new(90.0, "Ana", &["Ana", "Luis", "Carlos"]),
            Paid::new(15.0, "Luis", &["Ana", "Luis"]),
        ];
        let mut balances = compute_balances(&roster, &expenses);
        for s in compute_settlements(&balances) {
            apply(&mut balances, &s);
        }
        assert!(compute_settlements(&balances).is_empty());
    }

    fn apply(balances: &mut [ParticipantBalance<&'static str>], s: &Settlement<&'static str>) {
        for b in balances.iter_mut() {
            if b.participant_id == s.from_id {
                b.net_balance += s.amount;
            }
            if b.participant_id == s.to_id {
                b.net_balance -= s.amount;
            }
        }
    }

    const NAMES: [&str; 6] = ["Ana", "Luis", "Carlos", "Bea", "Zoe", "Ivo"];

    fn expense_strategy() -> impl Strategy<Value = Paid> {
        (
            1i64..100_000,
            proptest::sample::subsequence(NAMES.to_vec(), 1..=NAMES.len()),
            any::<prop::sample::Index>(),
        )
            .prop_map(|(cents, participants, payer)| {
                let payer = *payer.get(&participants);
                Paid {
                    amount: cents as f64 / 100.0,
                    payer,
                    participants,
                }
            })
    }

    proptest! {
        #[test]
        fn balances_are_conserved(expenses in prop::collection::vec(expense_strategy(), 0..20)) {
            let balances = compute_balances(&NAMES, &expenses);
            let total: f64 = balances.iter().map(|b| b.net_balance).sum();
            prop_assert!(total.abs() < 1e-6, "sum of nets was {total}");
        }

        #[test]
        fn settlements_clear_every_balance(expenses in prop::collection::vec(expense_strategy(), 0..20)) {
            let mut balances = compute_balances(&NAMES, &expenses);
            let settlements = compute_settlements(&balances);

            prop_assert!(settlements.len() < NAMES.len().max(1));
            for s in &settlements {
                prop_assert!(s.from_id != s.to_id);
                prop_assert!(s.amount > EPSILON);
            }

            for s in &settlements {
                apply(&mut balances, s);
            }
            // Emitted amounts are off by at most half a cent each, and the
            // residues the sweep drops (at most EPSILON per participant) can
            // pile up on the last debtor or creditor.
            let slack = EPSILON * NAMES.len() as f64 + 0.005 * settlements.len() as f64 + 1e-9;
            for b in &balances {
                prop_assert!(b.net_balance.abs() <= slack, "{} left with {}", b.participant_id, b.net_balance);
            }
        }

        #[test]
        fn output_is_deterministic(expenses in prop::collection::vec(expense_strategy(), 0..10)) {
            let balances = compute_balances(&NAMES, &expenses);
            prop_assert_eq!(compute_balances(&NAMES, &expenses), balances.clone());
            prop_assert_eq!(compute_settlements(&balances), compute_settlements(&balances));
        }
    }
}
