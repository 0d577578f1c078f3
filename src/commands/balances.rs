// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{BalanceLine, BalanceSnapshot};
use crate::money::{fmt_minor, Normalizer};
use crate::period::Period;
use crate::utils::{maybe_print_json, parse_amount, pretty_table};
use anyhow::{anyhow, Result};
use rusqlite::{params, Connection};
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub),
        Some(("list", sub)) => list(conn, sub),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone)]
pub struct LineSpec {
    pub account: String,
    pub currency: String,
    pub amount_minor: i64,
}

/// `LABEL:CCY:AMOUNT`, amount in major units. The label may contain ':'.
pub fn parse_line(spec: &str) -> Result<LineSpec> {
    let mut it = spec.rsplitn(3, ':');
    let amount_raw = it.next();
    let ccy = it.next();
    let account = it.next();
    let (Some(account), Some(ccy), Some(amount_raw)) = (account, ccy, amount_raw) else {
        return Err(anyhow!(
            "Invalid line '{}', expected LABEL:CCY:AMOUNT",
            spec
        ));
    };
    Ok(LineSpec {
        account: account.to_string(),
        currency: ccy.to_uppercase(),
        amount_minor: parse_amount(amount_raw)?,
    })
}

/// Writes the snapshot for `month`, replacing any previous entry. The
/// reporting-currency total is computed from the lines here, so the
/// total-equals-sum-of-lines invariant holds by construction. Returns the
/// total in minor units.
pub fn enter_snapshot(
    conn: &mut Connection,
    month: Period,
    lines: &[LineSpec],
    notes: Option<&str>,
) -> Result<i64> {
    let fx = Normalizer::load(conn)?;
    let total: i64 = lines
        .iter()
        .map(|l| fx.to_reporting(l.amount_minor, &l.currency))
        .sum();

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO balances(month, total_minor, notes) VALUES(?1, ?2, ?3)
         ON CONFLICT(month) DO UPDATE SET total_minor=excluded.total_minor, notes=excluded.notes",
        params![month.key(), total, notes],
    )?;
    let bal_id: i64 = tx.query_row(
        "SELECT id FROM balances WHERE month=?1",
        params![month.key()],
        |r| r.get(0),
    )?;
    tx.execute(
        "DELETE FROM balance_lines WHERE balance_id=?1",
        params![bal_id],
    )?;
    for l in lines {
        tx.execute(
            "INSERT INTO balance_lines(balance_id, account, currency, amount_minor)
             VALUES(?1, ?2, ?3, ?4)",
            params![bal_id, l.account, l.currency, l.amount_minor],
        )?;
    }
    tx.commit()?;
    Ok(total)
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = Period::parse(sub.get_one::<String>("month").unwrap())?;
    let mut lines = Vec::new();
    for spec in sub.get_many::<String>("line").unwrap() {
        lines.push(parse_line(spec)?);
    }
    let notes = sub.get_one::<String>("notes").map(|s| s.as_str());

    let total = enter_snapshot(conn, month, &lines, notes)?;
    let base = crate::money::get_base_currency(conn)?;
    println!("Snapshot for {}: {}", month, fmt_minor(total, &base));
    Ok(())
}

#[derive(Serialize)]
struct SnapshotRow {
    #[serde(flatten)]
    snapshot: BalanceSnapshot,
    lines: Vec<BalanceLine>,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let base = crate::money::get_base_currency(conn)?;

    let mut stmt =
        conn.prepare("SELECT id, month, total_minor, notes FROM balances ORDER BY month ASC")?;
    let snaps = stmt.query_map([], |r| {
        Ok(BalanceSnapshot {
            id: r.get(0)?,
            month: r.get(1)?,
            total_minor: r.get(2)?,
            notes: r.get(3)?,
        })
    })?;

    let mut data = Vec::new();
    for snap in snaps {
        let snapshot = snap?;
        let mut lstmt = conn.prepare(
            "SELECT id, balance_id, account, currency, amount_minor
             FROM balance_lines WHERE balance_id=?1 ORDER BY id",
        )?;
        let lines = lstmt
            .query_map(params![snapshot.id], |r| {
                Ok(BalanceLine {
                    id: r.get(0)?,
                    balance_id: r.get(1)?,
                    account: r.get(2)?,
                    currency: r.get(3)?,
                    amount_minor: r.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        data.push(SnapshotRow { snapshot, lines });
    }

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|s| {
                let accounts: Vec<String> = s
                    .lines
                    .iter()
                    .map(|l| format!("{} {}", l.account, fmt_minor(l.amount_minor, &l.currency)))
                    .collect();
                vec![
                    s.snapshot.month.clone(),
                    fmt_minor(s.snapshot.total_minor, &base),
                    accounts.join("; "),
                    s.snapshot.notes.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Month", "Total", "Accounts", "Notes"], rows)
        );
    }
    Ok(())
}
