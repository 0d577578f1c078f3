// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::flows::FlowKind;
use crate::utils::{parse_amount, parse_date};
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use rusqlite::{params, Connection};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("receivables", sub)) => run(conn, FlowKind::Receivable, sub),
        Some(("payables", sub)) => run(conn, FlowKind::Payable, sub),
        _ => Ok(()),
    }
}

fn run(conn: &mut Connection, kind: FlowKind, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let n = import_flows(conn, kind, path)?;
    println!("Imported {} {}(s) from {}", n, kind.noun(), path);
    Ok(())
}

/// CSV columns: date,description,amount,currency. Amounts are major units;
/// an empty currency column means the base currency. Entries arrive unpaid.
pub fn import_flows(conn: &mut Connection, kind: FlowKind, path: &str) -> Result<usize> {
    let default_ccy = crate::money::get_base_currency(conn)?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let insert = format!(
        "INSERT INTO {}(date, description, amount_minor, currency) VALUES (?1, ?2, ?3, ?4)",
        kind.table()
    );
    let tx = conn.transaction()?;
    let mut n = 0usize;
    for result in rdr.records() {
        let rec = result?;
        let date_raw = rec.get(0).context("date missing")?.trim();
        let desc = rec.get(1).context("description missing")?.trim();
        let amount_raw = rec.get(2).context("amount missing")?.trim();
        let ccy = rec
            .get(3)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&default_ccy)
            .to_uppercase();

        let date = parse_date(date_raw)
            .with_context(|| format!("Invalid date '{}' for '{}'", date_raw, desc))?;
        let amount = parse_amount(amount_raw)
            .with_context(|| format!("Invalid amount '{}' for '{}'", amount_raw, desc))?;
        if amount < 0 {
            return Err(anyhow!("Negative amount '{}' for '{}'", amount_raw, desc));
        }

        tx.execute(&insert, params![date.to_string(), desc, amount, ccy])?;
        n += 1;
    }
    tx.commit()?;
    Ok(n)
}
