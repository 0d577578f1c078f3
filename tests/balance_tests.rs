// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashclip::commands::balances::{enter_snapshot, parse_line, LineSpec};
use cashclip::forecast::Ledger;
use cashclip::period::Period;
use rusqlite::Connection;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(r#"
        CREATE TABLE settings(key TEXT PRIMARY KEY, value TEXT NOT NULL);
        CREATE TABLE balances(id INTEGER PRIMARY KEY AUTOINCREMENT, month TEXT NOT NULL UNIQUE, total_minor INTEGER NOT NULL, notes TEXT);
        CREATE TABLE balance_lines(id INTEGER PRIMARY KEY AUTOINCREMENT, balance_id INTEGER NOT NULL, account TEXT NOT NULL, currency TEXT NOT NULL, amount_minor INTEGER NOT NULL);
        CREATE TABLE receivables(id INTEGER PRIMARY KEY AUTOINCREMENT, date TEXT NOT NULL, description TEXT NOT NULL, amount_minor INTEGER NOT NULL, currency TEXT NOT NULL, is_paid INTEGER NOT NULL DEFAULT 0);
        CREATE TABLE payables(id INTEGER PRIMARY KEY AUTOINCREMENT, date TEXT NOT NULL, description TEXT NOT NULL, amount_minor INTEGER NOT NULL, currency TEXT NOT NULL, is_paid INTEGER NOT NULL DEFAULT 0);
        CREATE TABLE budgets(id INTEGER PRIMARY KEY AUTOINCREMENT, month TEXT NOT NULL, category TEXT NOT NULL, planned_inflow_minor INTEGER NOT NULL DEFAULT 0, planned_outflow_minor INTEGER NOT NULL DEFAULT 0, currency TEXT NOT NULL, UNIQUE(month, category));
    "#).unwrap();
    conn
}

#[test]
fn parse_line_specs() {
    let l = parse_line("Checking:EUR:1234.56").unwrap();
    assert_eq!(l.account, "Checking");
    assert_eq!(l.currency, "EUR");
    assert_eq!(l.amount_minor, 123456);

    // the label may itself contain ':'
    let l = parse_line("Revolut:Joint:gbp:100.00").unwrap();
    assert_eq!(l.account, "Revolut:Joint");
    assert_eq!(l.currency, "GBP");
    assert_eq!(l.amount_minor, 10000);

    assert!(parse_line("EUR:100").is_err());
    assert!(parse_line("Checking:EUR:ten").is_err());
}

#[test]
fn total_is_the_converted_sum_of_lines() {
    let mut conn = setup();
    // GBP falls back to the built-in 1.17 without configuration
    let lines = vec![
        LineSpec {
            account: "Main".into(),
            currency: "EUR".into(),
            amount_minor: 100000,
        },
        LineSpec {
            account: "Revolut".into(),
            currency: "GBP".into(),
            amount_minor: 10000,
        },
    ];
    let month = Period::parse("2025-09").unwrap();
    let total = enter_snapshot(&mut conn, month, &lines, Some("month end")).unwrap();
    assert_eq!(total, 111700);

    let ledger = Ledger::load(&conn).unwrap();
    let latest = ledger.latest_balance().unwrap();
    assert_eq!(latest.period, month);
    assert_eq!(latest.total_minor, 111700);
}

#[test]
fn re_entry_replaces_the_month() {
    let mut conn = setup();
    let month = Period::parse("2025-09").unwrap();
    let first = vec![LineSpec {
        account: "Main".into(),
        currency: "EUR".into(),
        amount_minor: 100000,
    }];
    enter_snapshot(&mut conn, month, &first, None).unwrap();

    let second = vec![
        LineSpec {
            account: "Main".into(),
            currency: "EUR".into(),
            amount_minor: 50000,
        },
        LineSpec {
            account: "Savings".into(),
            currency: "EUR".into(),
            amount_minor: 25000,
        },
    ];
    let total = enter_snapshot(&mut conn, month, &second, None).unwrap();
    assert_eq!(total, 75000);

    let snapshots: i64 = conn
        .query_row("SELECT COUNT(*) FROM balances", [], |r| r.get(0))
        .unwrap();
    assert_eq!(snapshots, 1);
    let lines: i64 = conn
        .query_row("SELECT COUNT(*) FROM balance_lines", [], |r| r.get(0))
        .unwrap();
    assert_eq!(lines, 2);
    let stored: i64 = conn
        .query_row("SELECT total_minor FROM balances WHERE month='2025-09'", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(stored, 75000);
}
