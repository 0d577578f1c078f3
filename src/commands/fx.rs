// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::money::{fmt_minor, get_base_currency, set_base_currency, set_rate, Normalizer};
use crate::utils::{http_client, parse_amount, pretty_table};
use anyhow::{anyhow, Context, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set-base", sub)) => {
            let ccy = sub.get_one::<String>("currency").unwrap().to_uppercase();
            set_base_currency(conn, &ccy)?;
            println!("Base currency set to {}", ccy);
        }
        Some(("set-rate", sub)) => {
            let ccy = sub.get_one::<String>("currency").unwrap().to_uppercase();
            let rate: Decimal = sub
                .get_one::<String>("rate")
                .unwrap()
                .parse()
                .context("Invalid rate")?;
            if rate <= Decimal::ZERO {
                return Err(anyhow!("Rate must be positive"));
            }
            set_rate(conn, &ccy, rate)?;
            println!("Rate set: 1 {} = {} {}", ccy, rate, get_base_currency(conn)?);
        }
        Some(("list", _)) => list_rates(conn)?,
        Some(("convert", sub)) => convert_amount(conn, sub)?,
        Some(("fetch", _)) => fetch_rates(conn)?,
        _ => {}
    }
    Ok(())
}

fn list_rates(conn: &Connection) -> Result<()> {
    let fx = Normalizer::load(conn)?;
    println!("Base currency: {}", fx.base());
    let mut data: Vec<Vec<String>> = fx
        .rates()
        .iter()
        .map(|(ccy, rate)| vec![ccy.clone(), rate.to_string()])
        .collect();
    data.sort();
    println!("{}", pretty_table(&["Currency", "Rate to base"], data));
    Ok(())
}

fn convert_amount(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let from = sub.get_one::<String>("from").unwrap().to_uppercase();
    let fx = Normalizer::load(conn)?;
    let res = fx.to_reporting(amount, &from);
    println!("{} -> {}", fmt_minor(amount, &from), fmt_minor(res, fx.base()));
    Ok(())
}

fn distinct_currencies(conn: &Connection) -> Result<Vec<String>> {
    let mut out = Vec::<String>::new();
    for sql in [
        "SELECT DISTINCT currency FROM receivables",
        "SELECT DISTINCT currency FROM payables",
        "SELECT DISTINCT currency FROM balance_lines",
    ] {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
        for row in rows {
            let c: String = row?;
            if !c.is_empty() && !out.contains(&c) {
                out.push(c);
            }
        }
    }
    Ok(out)
}

#[derive(Debug, Deserialize)]
struct Latest {
    rates: std::collections::HashMap<String, f64>,
}

/// Fetches the latest base->quote rates from Frankfurter (ECB) and stores
/// the reciprocal, since settings hold quote->base rates.
fn fetch_rates(conn: &Connection) -> Result<()> {
    let base = get_base_currency(conn)?;
    let targets: Vec<String> = distinct_currencies(conn)?
        .into_iter()
        .filter(|c| c != &base)
        .collect();
    if targets.is_empty() {
        println!("No non-base currencies found; nothing to fetch.");
        return Ok(());
    }
    let to_param = targets.join(",");
    let url = format!("https://api.frankfurter.dev/v1/latest?from={base}&to={to_param}");
    let client = http_client()?;
    let resp = client.get(url).send()?.error_for_status()?;
    let latest: Latest = resp.json()?;
    for (quote, rate) in latest.rates {
        let rate = Decimal::try_from(rate)
            .with_context(|| format!("Invalid rate '{}' for {}", rate, quote))?;
        if rate <= Decimal::ZERO {
            continue;
        }
        let inverse = Decimal::ONE / rate;
        set_rate(conn, &quote, inverse)?;
        println!("Updated {}: 1 {} = {} {}", quote, quote, inverse, base);
    }
    Ok(())
}
