// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashclip::commands::flows::FlowKind;
use cashclip::commands::importer::import_flows;
use rusqlite::Connection;
use std::io::Write;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(r#"
        CREATE TABLE settings(key TEXT PRIMARY KEY, value TEXT NOT NULL);
        CREATE TABLE receivables(id INTEGER PRIMARY KEY AUTOINCREMENT, date TEXT NOT NULL, description TEXT NOT NULL, amount_minor INTEGER NOT NULL, currency TEXT NOT NULL, is_paid INTEGER NOT NULL DEFAULT 0);
        CREATE TABLE payables(id INTEGER PRIMARY KEY AUTOINCREMENT, date TEXT NOT NULL, description TEXT NOT NULL, amount_minor INTEGER NOT NULL, currency TEXT NOT NULL, is_paid INTEGER NOT NULL DEFAULT 0);
    "#).unwrap();
    conn
}

fn csv_file(content: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f.flush().unwrap();
    f
}

#[test]
fn imports_receivables_with_minor_units() {
    let mut conn = setup();
    let f = csv_file(
        "date,description,amount,currency\n\
         2025-10-15,Invoice 42,500.00,EUR\n\
         2025-11-01,Retainer,99.99,GBP\n\
         2025-11-02,Local invoice,10,\n",
    );

    let n = import_flows(&mut conn, FlowKind::Receivable, f.path().to_str().unwrap()).unwrap();
    assert_eq!(n, 3);

    let (amount, ccy, paid): (i64, String, bool) = conn
        .query_row(
            "SELECT amount_minor, currency, is_paid FROM receivables WHERE description='Invoice 42'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(amount, 50000);
    assert_eq!(ccy, "EUR");
    assert!(!paid); // imports arrive unsettled

    let gbp: i64 = conn
        .query_row(
            "SELECT amount_minor FROM receivables WHERE description='Retainer'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(gbp, 9999);

    // empty currency column means the base currency
    let ccy: String = conn
        .query_row(
            "SELECT currency FROM receivables WHERE description='Local invoice'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(ccy, "EUR");
}

#[test]
fn rejects_bad_rows_and_keeps_nothing() {
    let mut conn = setup();
    let f = csv_file(
        "date,description,amount,currency\n\
         2025-10-15,Good,500.00,EUR\n\
         2025-10-16,Negative,-1.00,EUR\n",
    );

    assert!(import_flows(&mut conn, FlowKind::Payable, f.path().to_str().unwrap()).is_err());
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM payables", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 0); // the transaction rolled back
}

#[test]
fn bad_dates_are_rejected() {
    let mut conn = setup();
    let f = csv_file(
        "date,description,amount,currency\n\
         15/10/2025,Wrong format,500.00,EUR\n",
    );
    assert!(import_flows(&mut conn, FlowKind::Receivable, f.path().to_str().unwrap()).is_err());
}
