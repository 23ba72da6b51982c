//! Text, JSON and CSV output.
use std::io::Write;

use engine::{NamedBalance, NamedSettlement, Settlement, SplitSummary, round2};
use serde::Serialize;

use crate::error::Result;

pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn signed(amount: f64) -> String {
    if amount > 0.0 {
        format!("+{amount:.2}")
    } else {
        format!("{amount:.2}")
    }
}

pub fn balances(rows: &[NamedBalance]) {
    if rows.is_empty() {
        println!("No participants.");
        return;
    }
    let width = name_width(rows);
    for b in rows {
        println!(
            "{:<width$}  paid {:>10.2}  owed {:>10.2}  net {:>10}",
            b.user_name,
            b.total_paid,
            b.total_owed,
            signed(b.net_balance),
        );
    }
}

/// Widest name in characters; `{:<width$}` pads by characters too.
fn name_width(rows: &[NamedBalance]) -> usize {
    rows.iter()
        .map(|b| b.user_name.chars().count())
        .max()
        .unwrap_or(0)
}

pub fn settlements(rows: &[NamedSettlement]) {
    if rows.is_empty() {
        println!("All settled.");
        return;
    }
    for s in rows {
        println!("{} → {}: {:.2}", s.from_user_name, s.to_user_name, s.amount);
    }
}

pub fn quick(summary: &SplitSummary, transfers: &[Settlement<String>]) {
    println!(
        "Total {:.2} among {} friends, {:.2} each",
        summary.total_expenses, summary.number_of_friends, summary.average_per_person
    );
    if transfers.is_empty() {
        println!("All settled.");
    }
    for s in transfers {
        println!("{} → {}: {:.2}", s.from_id, s.to_id, s.amount);
    }
}

/// One line of the CSV export: either a balance or a settlement.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    kind: &'static str,
    name: &'a str,
    counterpart: Option<&'a str>,
    paid: Option<f64>,
    owed: Option<f64>,
    net: Option<f64>,
    amount: Option<f64>,
}

pub fn export_csv<W: Write>(
    writer: W,
    balances: &[NamedBalance],
    settlements: &[NamedSettlement],
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for b in balances {
        wtr.serialize(ExportRow {
            kind: "balance",
            name: &b.user_name,
            counterpart: None,
            paid: Some(round2(b.total_paid)),
            owed: Some(round2(b.total_owed)),
            net: Some(round2(b.net_balance)),
            amount: None,
        })?;
    }
    for s in settlements {
        wtr.serialize(ExportRow {
            kind: "settlement",
            name: &s.from_user_name,
            counterpart: Some(&s.to_user_name),
            paid: None,
            owed: None,
            net: None,
            amount: Some(s.amount),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn signed_amounts() {
        assert_eq!(signed(48.5), "+48.50");
        assert_eq!(signed(-22.0), "-22.00");
        assert_eq!(signed(0.0), "0.00");
    }

    #[test]
    fn csv_export() {
        let ana = Uuid::new_v4();
        let luis = Uuid::new_v4();
        let balances = vec![
            NamedBalance {
                user_id: ana,
                user_name: "Ana".to_string(),
                total_paid: 30.0,
                total_owed: 15.0,
                net_balance: 15.0,
            },
            NamedBalance {
                user_id: luis,
                user_name: "Luis".to_string(),
                total_paid: 0.0,
                total_owed: 15.0,
                net_balance: -15.0,
            },
        ];
        let settlements = vec![NamedSettlement {
            from_user_id: luis,
            from_user_name: "Luis".to_string(),
            to_user_id: ana,
            to_user_name: "Ana".to_string(),
            amount: 15.0,
        }];

        let mut out = Vec::new();
        export_csv(&mut out, &balances, &settlements).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "kind,name,counterpart,paid,owed,net,amount");
        assert_eq!(lines[1], "balance,Ana,,30.0,15.0,15.0,");
        assert_eq!(lines[3], "settlement,Luis,Ana,,,,15.0");
        assert_eq!(lines.len(), 4);
    }

    fn thirds() -> Vec<NamedBalance> {
        let share = 100.0 / 3.0;
        vec![
            NamedBalance {
                user_id: Uuid::new_v4(),
                user_name: "José".to_string(),
                total_paid: 100.0,
                total_owed: share,
                net_balance: 100.0 - share,
            },
            NamedBalance {
                user_id: Uuid::new_v4(),
                user_name: "Luis".to_string(),
                total_paid: 0.0,
                total_owed: share,
                net_balance: -share,
            },
        ]
    }

    #[test]
    fn csv_export_rounds_balances() {
        let mut out = Vec::new();
        export_csv(&mut out, &thirds(), &[]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "balance,José,,100.0,33.33,66.67,");
        assert_eq!(lines[2], "balance,Luis,,0.0,33.33,-33.33,");
    }

    #[test]
    fn name_width_counts_characters() {
        assert_eq!(name_width(&thirds()), 4);
        assert_eq!(name_width(&[]), 0);
    }
}
