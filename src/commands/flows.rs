// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::money::fmt_minor;
use crate::utils::{maybe_print_json, parse_amount, parse_date, pretty_table};
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection};
use serde::Serialize;

/// Receivables and payables share a schema and a command surface; only the
/// table and the flow direction differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Receivable,
    Payable,
}

impl FlowKind {
    pub fn table(self) -> &'static str {
        match self {
            FlowKind::Receivable => "receivables",
            FlowKind::Payable => "payables",
        }
    }

    pub fn noun(self) -> &'static str {
        match self {
            FlowKind::Receivable => "receivable",
            FlowKind::Payable => "payable",
        }
    }
}

pub fn handle(conn: &Connection, kind: FlowKind, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, kind, sub),
        Some(("list", sub)) => list(conn, kind, sub),
        Some(("toggle", sub)) => toggle(conn, kind, sub),
        _ => Ok(()),
    }
}

fn add(conn: &Connection, kind: FlowKind, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let desc = sub.get_one::<String>("desc").unwrap();
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    if amount < 0 {
        return Err(anyhow!("Amount must be non-negative"));
    }
    let ccy = match sub.get_one::<String>("currency") {
        Some(c) => c.to_uppercase(),
        None => crate::money::get_base_currency(conn)?,
    };

    conn.execute(
        &format!(
            "INSERT INTO {}(date, description, amount_minor, currency) VALUES (?1, ?2, ?3, ?4)",
            kind.table()
        ),
        params![date.to_string(), desc, amount, ccy],
    )?;
    println!(
        "Recorded {} '{}' of {} due {}",
        kind.noun(),
        desc,
        fmt_minor(amount, &ccy),
        date
    );
    Ok(())
}

#[derive(Serialize)]
pub struct FlowRow {
    pub id: i64,
    pub date: String,
    pub description: String,
    pub amount: String,
    pub currency: String,
    pub paid: bool,
}

fn list(conn: &Connection, kind: FlowKind, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let unpaid_only = sub.get_flag("unpaid");

    let mut sql = format!(
        "SELECT id, date, description, amount_minor, currency, is_paid FROM {}",
        kind.table()
    );
    if unpaid_only {
        sql.push_str(" WHERE is_paid=0");
    }
    sql.push_str(" ORDER BY date, id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |r| {
        Ok(FlowRow {
            id: r.get(0)?,
            date: r.get(1)?,
            description: r.get(2)?,
            amount: format!("{:.2}", crate::money::minor_to_major(r.get(3)?)),
            currency: r.get(4)?,
            paid: r.get(5)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.description.clone(),
                    r.amount.clone(),
                    r.currency.clone(),
                    if r.paid { "Y".into() } else { "N".into() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Date", "Description", "Amount", "CCY", "Paid"], rows)
        );
    }
    Ok(())
}

fn toggle(conn: &Connection, kind: FlowKind, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = sub
        .get_one::<String>("id")
        .unwrap()
        .parse()
        .context("Invalid id")?;
    let changed = conn.execute(
        &format!("UPDATE {} SET is_paid = 1 - is_paid WHERE id=?1", kind.table()),
        params![id],
    )?;
    if changed == 0 {
        return Err(anyhow!("{} {} not found", kind.noun(), id));
    }
    let paid: bool = conn.query_row(
        &format!("SELECT is_paid FROM {} WHERE id=?1", kind.table()),
        params![id],
        |r| r.get(0),
    )?;
    println!(
        "Marked {} {} {}",
        kind.noun(),
        id,
        if paid { "paid" } else { "unpaid" }
    );
    Ok(())
}
