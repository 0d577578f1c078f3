// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::forecast::{
    compute_forecast, Direction, ForecastParams, ForecastRow, Ledger,
    DEFAULT_HORIZON_MONTHS, DEFAULT_VARIANCE_THRESHOLD_MINOR,
};
use crate::money::{minor_to_major, Normalizer};
use crate::utils::{maybe_print_json, parse_amount, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let json_flag = m.get_flag("json");
    let jsonl_flag = m.get_flag("jsonl");
    let params = params_from_matches(m);

    // One snapshot of the ledger for the whole table.
    let ledger = Ledger::load(conn)?;
    let fx = Normalizer::load(conn)?;
    let today = chrono::Utc::now().date_naive();
    let rows = compute_forecast(&ledger, &fx, &params, today);

    if !maybe_print_json(json_flag, jsonl_flag, &rows)? {
        render_table(&rows, &params, fx.base());
    }
    Ok(())
}

/// Lenient intake: unparseable numbers fall back to the defaults and the
/// engine clamps the horizon, so a request is never rejected over them.
pub fn params_from_matches(m: &clap::ArgMatches) -> ForecastParams {
    let horizon_months = m
        .get_one::<String>("months")
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_HORIZON_MONTHS);
    let variance_threshold_minor = m
        .get_one::<String>("threshold")
        .and_then(|s| parse_amount(s).ok())
        .filter(|v| *v >= 0)
        .unwrap_or(DEFAULT_VARIANCE_THRESHOLD_MINOR);
    ForecastParams {
        horizon_months,
        variance_threshold_minor,
        include_budget: m.get_flag("budget"),
    }
}

fn fmt(minor: i64) -> String {
    format!("{:.2}", minor_to_major(minor))
}

fn render_table(rows: &[ForecastRow], params: &ForecastParams, base: &str) {
    let mut headers = vec!["Period", "Opening", "Exp In", "Exp Out"];
    if params.include_budget {
        headers.extend(["Plan In", "Plan Out"]);
    }
    headers.extend([
        "Fcst Net", "Closing Fcst", "Act In", "Act Out", "Act Net", "Closing Act", "Variance",
    ]);

    let data: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            let arrow = match r.direction() {
                Direction::Surplus => "▲",
                Direction::Shortfall => "▼",
            };
            let flag = if r.exceeds(params.variance_threshold_minor) {
                " *"
            } else {
                ""
            };
            let mut row = vec![
                r.period.clone(),
                fmt(r.opening_forecast_minor),
                fmt(r.expected_inflow_minor),
                fmt(r.expected_outflow_minor),
            ];
            if params.include_budget {
                row.push(fmt(r.planned_inflow_minor));
                row.push(fmt(r.planned_outflow_minor));
            }
            row.extend([
                fmt(r.forecast_net_minor),
                fmt(r.closing_forecast_minor),
                fmt(r.actual_inflow_minor),
                fmt(r.actual_outflow_minor),
                fmt(r.actual_net_minor),
                fmt(r.closing_actual_minor),
                format!("{} {}{}", arrow, fmt(r.variance_minor), flag),
            ]);
            row
        })
        .collect();

    println!(
        "All amounts in {}. '*' marks |variance| >= {}.",
        base,
        fmt(params.variance_threshold_minor)
    );
    println!("{}", pretty_table(&headers, data));
}
