// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::flows::FlowKind;
use crate::forecast::{compute_forecast, ForecastParams, Ledger, DEFAULT_HORIZON_MONTHS};
use crate::money::Normalizer;
use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("receivables", sub)) => export_flows(conn, FlowKind::Receivable, sub),
        Some(("payables", sub)) => export_flows(conn, FlowKind::Payable, sub),
        Some(("budgets", sub)) => export_budgets(conn, sub),
        Some(("forecast", sub)) => export_forecast(conn, sub),
        _ => Ok(()),
    }
}

fn export_flows(conn: &Connection, kind: FlowKind, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let sql = format!(
        "SELECT date, description, amount_minor, currency, is_paid FROM {} ORDER BY date, id",
        kind.table()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, i64>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, bool>(4)?,
        ))
    })?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["date", "description", "amount_minor", "currency", "is_paid"])?;
            for row in rows {
                let (d, desc, amt, ccy, paid) = row?;
                wtr.write_record([d, desc, amt.to_string(), ccy, paid.to_string()])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for row in rows {
                let (d, desc, amt, ccy, paid) = row?;
                items.push(json!({
                    "date": d, "description": desc, "amount_minor": amt,
                    "currency": ccy, "is_paid": paid
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
            return Ok(());
        }
    }
    println!("Exported {} to {}", kind.table(), out);
    Ok(())
}

fn export_budgets(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let mut stmt = conn.prepare(
        "SELECT month, category, planned_inflow_minor, planned_outflow_minor, currency
         FROM budgets ORDER BY month, category",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, i64>(2)?,
            r.get::<_, i64>(3)?,
            r.get::<_, String>(4)?,
        ))
    })?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "month",
                "category",
                "planned_inflow_minor",
                "planned_outflow_minor",
                "currency",
            ])?;
            for row in rows {
                let (m, c, i, o, ccy) = row?;
                wtr.write_record([m, c, i.to_string(), o.to_string(), ccy])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for row in rows {
                let (m, c, i, o, ccy) = row?;
                items.push(json!({
                    "month": m, "category": c, "planned_inflow_minor": i,
                    "planned_outflow_minor": o, "currency": ccy
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
            return Ok(());
        }
    }
    println!("Exported budgets to {}", out);
    Ok(())
}

fn export_forecast(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let params = ForecastParams {
        horizon_months: sub
            .get_one::<String>("months")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_HORIZON_MONTHS),
        include_budget: sub.get_flag("budget"),
        ..ForecastParams::default()
    };

    let ledger = Ledger::load(conn)?;
    let fx = Normalizer::load(conn)?;
    let today = chrono::Utc::now().date_naive();
    let rows = compute_forecast(&ledger, &fx, &params, today);

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            for row in &rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
            return Ok(());
        }
    }
    println!("Exported forecast to {}", out);
    Ok(())
}
