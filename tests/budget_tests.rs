// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashclip::commands::budgets::copy_last_month;
use cashclip::forecast::sum_budget;
use cashclip::models::BudgetLine;
use cashclip::money::Normalizer;
use cashclip::period::Period;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::collections::HashMap;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(r#"
        CREATE TABLE settings(key TEXT PRIMARY KEY, value TEXT NOT NULL);
        CREATE TABLE budgets(id INTEGER PRIMARY KEY AUTOINCREMENT, month TEXT NOT NULL, category TEXT NOT NULL, planned_inflow_minor INTEGER NOT NULL DEFAULT 0, planned_outflow_minor INTEGER NOT NULL DEFAULT 0, currency TEXT NOT NULL, UNIQUE(month, category));
    "#).unwrap();
    conn
}

fn line(conn: &Connection, month: &str, category: &str, inflow: i64, outflow: i64) {
    conn.execute(
        "INSERT INTO budgets(month, category, planned_inflow_minor, planned_outflow_minor, currency)
         VALUES(?1, ?2, ?3, ?4, 'EUR')",
        params![month, category, inflow, outflow],
    )
    .unwrap();
}

#[test]
fn one_line_per_month_and_category() {
    let conn = setup();
    line(&conn, "2025-08", "Rent", 0, 120000);
    let dup = conn.execute(
        "INSERT INTO budgets(month, category, planned_inflow_minor, planned_outflow_minor, currency)
         VALUES('2025-08', 'Rent', 0, 1, 'EUR')",
        [],
    );
    assert!(dup.is_err());

    // the upsert path the CLI takes replaces instead
    conn.execute(
        "INSERT INTO budgets(month, category, planned_inflow_minor, planned_outflow_minor, currency)
         VALUES('2025-08', 'Rent', 0, 130000, 'EUR')
         ON CONFLICT(month, category) DO UPDATE SET
           planned_outflow_minor=excluded.planned_outflow_minor",
        [],
    )
    .unwrap();
    let (n, out): (i64, i64) = conn
        .query_row(
            "SELECT COUNT(*), MAX(planned_outflow_minor) FROM budgets WHERE month='2025-08' AND category='Rent'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(n, 1);
    assert_eq!(out, 130000);
}

#[test]
fn copy_last_month_keeps_existing_pairs() {
    let conn = setup();
    line(&conn, "2025-08", "Rent", 0, 120000);
    line(&conn, "2025-08", "Sales", 500000, 0);
    line(&conn, "2025-09", "Rent", 0, 999); // already customized

    let copied = copy_last_month(&conn, Period::parse("2025-09").unwrap()).unwrap();
    assert_eq!(copied, 1); // only Sales

    let rent: i64 = conn
        .query_row(
            "SELECT planned_outflow_minor FROM budgets WHERE month='2025-09' AND category='Rent'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(rent, 999);
    let sales: i64 = conn
        .query_row(
            "SELECT planned_inflow_minor FROM budgets WHERE month='2025-09' AND category='Sales'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(sales, 500000);
}

#[test]
fn monthly_totals_span_all_categories() {
    let fx = Normalizer::new("EUR", HashMap::from([("GBP".to_string(), Decimal::new(117, 2))]));
    let lines = vec![
        BudgetLine {
            id: 1,
            month: "2025-10".into(),
            category: "Sales".into(),
            planned_inflow_minor: 80000,
            planned_outflow_minor: 0,
            currency: "EUR".into(),
        },
        BudgetLine {
            id: 2,
            month: "2025-10".into(),
            category: "Contracting".into(),
            planned_inflow_minor: 10000,
            planned_outflow_minor: 0,
            currency: "GBP".into(),
        },
        BudgetLine {
            id: 3,
            month: "2025-10".into(),
            category: "Rent".into(),
            planned_inflow_minor: 0,
            planned_outflow_minor: 120000,
            currency: "EUR".into(),
        },
        BudgetLine {
            id: 4,
            month: "2025-11".into(),
            category: "Rent".into(),
            planned_inflow_minor: 0,
            planned_outflow_minor: 999999,
            currency: "EUR".into(),
        },
    ];

    let october = Period::parse("2025-10").unwrap();
    let (inflow, outflow) = sum_budget(&lines, october, &fx);
    // GBP line converted before summation: 10000 -> 11700
    assert_eq!(inflow, 91700);
    assert_eq!(outflow, 120000);

    let december = Period::parse("2025-12").unwrap();
    assert_eq!(sum_budget(&lines, december, &fx), (0, 0));
}
