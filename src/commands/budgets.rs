// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::money::fmt_minor;
use crate::period::Period;
use crate::utils::{maybe_print_json, parse_amount, pretty_table};
use anyhow::{anyhow, Result};
use rusqlite::{params, Connection};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub),
        Some(("list", sub)) => list(conn, sub),
        Some(("copy-last", sub)) => copy_last(conn, sub),
        Some(("rm", sub)) => rm(conn, sub),
        _ => Ok(()),
    }
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = Period::parse(sub.get_one::<String>("month").unwrap())?;
    let category = sub.get_one::<String>("category").unwrap();
    let inflow = parse_amount(sub.get_one::<String>("inflow").unwrap())?;
    let outflow = parse_amount(sub.get_one::<String>("outflow").unwrap())?;
    if inflow < 0 || outflow < 0 {
        return Err(anyhow!("Planned amounts must be non-negative"));
    }
    let ccy = match sub.get_one::<String>("currency") {
        Some(c) => c.to_uppercase(),
        None => crate::money::get_base_currency(conn)?,
    };

    conn.execute(
        "INSERT INTO budgets(month, category, planned_inflow_minor, planned_outflow_minor, currency)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(month, category) DO UPDATE SET
           planned_inflow_minor=excluded.planned_inflow_minor,
           planned_outflow_minor=excluded.planned_outflow_minor,
           currency=excluded.currency",
        params![month.key(), category, inflow, outflow, ccy],
    )?;
    println!(
        "Budget set for {} / {}: in {}, out {}",
        month,
        category,
        fmt_minor(inflow, &ccy),
        fmt_minor(outflow, &ccy)
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let mut data = Vec::new();
    let mut push_row = |month: String, cat: String, inflow: i64, outflow: i64, ccy: String| {
        data.push(vec![
            month,
            cat,
            format!("{:.2}", crate::money::minor_to_major(inflow)),
            format!("{:.2}", crate::money::minor_to_major(outflow)),
            ccy,
        ]);
    };

    let sql_all = "SELECT month, category, planned_inflow_minor, planned_outflow_minor, currency
         FROM budgets ORDER BY month DESC, category";
    let sql_month = "SELECT month, category, planned_inflow_minor, planned_outflow_minor, currency
         FROM budgets WHERE month=?1 ORDER BY category";

    if let Some(month) = sub.get_one::<String>("month") {
        let month = Period::parse(month)?;
        let mut stmt = conn.prepare(sql_month)?;
        let rows = stmt.query_map(params![month.key()], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, i64>(2)?,
                r.get::<_, i64>(3)?,
                r.get::<_, String>(4)?,
            ))
        })?;
        for row in rows {
            let (m, c, i, o, ccy) = row?;
            push_row(m, c, i, o, ccy);
        }
    } else {
        let mut stmt = conn.prepare(sql_all)?;
        let rows = stmt.query_map([], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, i64>(2)?,
                r.get::<_, i64>(3)?,
                r.get::<_, String>(4)?,
            ))
        })?;
        for row in rows {
            let (m, c, i, o, ccy) = row?;
            push_row(m, c, i, o, ccy);
        }
    }

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!(
            "{}",
            pretty_table(
                &["Month", "Category", "Planned In", "Planned Out", "CCY"],
                data
            )
        );
    }
    Ok(())
}

/// Copies the previous month's lines into `month`. Pairs that already
/// exist in the target month are left untouched. Returns the copy count.
pub fn copy_last_month(conn: &Connection, month: Period) -> Result<usize> {
    let prev = month.pred();
    let n = conn.execute(
        "INSERT OR IGNORE INTO budgets(month, category, planned_inflow_minor, planned_outflow_minor, currency)
         SELECT ?1, category, planned_inflow_minor, planned_outflow_minor, currency
         FROM budgets WHERE month=?2",
        params![month.key(), prev.key()],
    )?;
    Ok(n)
}

fn copy_last(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = Period::parse(sub.get_one::<String>("month").unwrap())?;
    let n = copy_last_month(conn, month)?;
    println!("Copied {} budget line(s) from {} to {}", n, month.pred(), month);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = Period::parse(sub.get_one::<String>("month").unwrap())?;
    let category = sub.get_one::<String>("category").unwrap();
    let n = conn.execute(
        "DELETE FROM budgets WHERE month=?1 AND category=?2",
        params![month.key(), category],
    )?;
    if n == 0 {
        return Err(anyhow!("No budget line for {} / {}", month, category));
    }
    println!("Removed budget line {} / {}", month, category);
    Ok(())
}
