//! Balance and monthly chart aggregation.
//!
//! Both functions are pure and run in a single pass over the input. Amounts
//! are `i64` minor units summed into `i128`, so totals are exact for any
//! number of stored movements.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::{Movement, MovementKind};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub income: i128,
    pub expense: i128,
    /// `income - expense`, may be negative.
    pub balance: i128,
}

/// Income and expense totals of one calendar month.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// `YYYY-MM` of the movement date, in UTC.
    pub month: String,
    pub income: i128,
    pub expense: i128,
}

pub fn balance(movements: &[Movement]) -> BalanceReport {
    let (income, expense) =
        movements
            .iter()
            .fold((0i128, 0i128), |(income, expense), movement| {
                let amount = i128::from(movement.amount_minor);
                match movement.kind {
                    MovementKind::Income => (income + amount, expense),
                    MovementKind::Expense => (income, expense + amount),
                }
            });

    BalanceReport {
        income,
        expense,
        balance: income - expense,
    }
}

/// Groups movements by `YYYY-MM` and sums each side separately.
///
/// Only months present in the input produce a point; the result is sorted by
/// month ascending.
pub fn chart_data(movements: &[Movement]) -> Vec<ChartPoint> {
    let mut by_month: BTreeMap<(i32, u32), (i128, i128)> = BTreeMap::new();
    for movement in movements {
        let key = (movement.date.year(), movement.date.month());
        let bucket = by_month.entry(key).or_default();
        match movement.kind {
            MovementKind::Income => bucket.0 += i128::from(movement.amount_minor),
            MovementKind::Expense => bucket.1 += i128::from(movement.amount_minor),
        }
    }

    by_month
        .into_iter()
        .map(|((year, month), (income, expense))| ChartPoint {
            month: format!("{year:04}-{month:02}"),
            income,
            expense,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;

    fn movement(amount_minor: i64, kind: MovementKind, y: i32, m: u32, d: u32) -> Movement {
        Movement {
            id: Uuid::new_v4(),
            concept: "test".to_string(),
            amount_minor,
            kind,
            date: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
            user_id: "u1".to_string(),
            user_name: None,
        }
    }

    #[test]
    fn balance_is_income_minus_expense() {
        let movements = vec![
            movement(100, MovementKind::Income, 2025, 3, 1),
            movement(30, MovementKind::Expense, 2025, 3, 2),
            movement(50, MovementKind::Expense, 2025, 3, 3),
        ];
        assert_eq!(
            balance(&movements),
            BalanceReport {
                income: 100,
                expense: 80,
                balance: 20
            }
        );
    }

    #[test]
    fn balance_of_nothing_is_zero() {
        assert_eq!(balance(&[]), BalanceReport::default());
    }

    #[test]
    fn balance_goes_negative_on_expenses_only() {
        let movements = vec![movement(100, MovementKind::Expense, 2025, 1, 1)];
        assert_eq!(
            balance(&movements),
            BalanceReport {
                income: 0,
                expense: 100,
                balance: -100
            }
        );
    }

    #[test]
    fn totals_past_i64_stay_exact() {
        let big = i64::MAX / 2 + 1;
        let movements = vec![
            movement(big, MovementKind::Income, 2025, 3, 1),
            movement(big, MovementKind::Income, 2025, 3, 2),
            movement(i64::MAX, MovementKind::Expense, 2025, 4, 1),
            movement(i64::MAX, MovementKind::Expense, 2025, 4, 2),
        ];

        let report = balance(&movements);
        assert_eq!(report.income, 2 * i128::from(big));
        assert_eq!(report.expense, 2 * i128::from(i64::MAX));
        assert_eq!(report.balance, report.income - report.expense);
        assert!(report.income > i128::from(i64::MAX));

        let chart = chart_data(&movements);
        assert_eq!(chart[0].income, 2 * i128::from(big));
        assert_eq!(chart[1].expense, 2 * i128::from(i64::MAX));
    }

    #[test]
    fn balance_handles_large_collections() {
        let movements: Vec<Movement> = (0..10_000)
            .map(|i| {
                if i % 2 == 0 {
                    movement(100, MovementKind::Income, 2025, (i % 12) as u32 + 1, 1)
                } else {
                    movement(50, MovementKind::Expense, 2025, (i % 12) as u32 + 1, 1)
                }
            })
            .collect();
        let report = balance(&movements);
        assert_eq!(report.income, 500_000);
        assert_eq!(report.expense, 250_000);
        assert_eq!(report.balance, report.income - report.expense);
    }

    #[test]
    fn chart_groups_by_month_and_sorts() {
        let movements = vec![
            movement(50, MovementKind::Expense, 2025, 5, 10),
            movement(2_450, MovementKind::Income, 2025, 3, 1),
            movement(850, MovementKind::Expense, 2025, 3, 5),
            movement(1_200, MovementKind::Income, 2025, 3, 15),
            movement(500, MovementKind::Income, 2024, 12, 31),
        ];
        let points = chart_data(&movements);
        assert_eq!(
            points,
            vec![
                ChartPoint {
                    month: "2024-12".to_string(),
                    income: 500,
                    expense: 0
                },
                ChartPoint {
                    month: "2025-03".to_string(),
                    income: 3_650,
                    expense: 850
                },
                ChartPoint {
                    month: "2025-05".to_string(),
                    income: 0,
                    expense: 50
                },
            ]
        );
    }

    #[test]
    fn chart_does_not_fill_gaps() {
        let movements = vec![
            movement(10, MovementKind::Income, 2025, 1, 1),
            movement(10, MovementKind::Income, 2025, 6, 1),
        ];
        let months: Vec<String> = chart_data(&movements)
            .into_iter()
            .map(|p| p.month)
            .collect();
        assert_eq!(months, vec!["2025-01", "2025-06"]);
    }

    #[test]
    fn chart_of_nothing_is_empty() {
        assert!(chart_data(&[]).is_empty());
    }
}
