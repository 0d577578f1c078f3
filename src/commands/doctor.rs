// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::money::Normalizer;
use crate::period::Period;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::{params, Connection};

pub fn handle(conn: &Connection) -> Result<()> {
    let mut rows = Vec::new();
    let fx = Normalizer::load(conn)?;

    // 1) Currencies that would pass through unconverted
    let mut seen = Vec::<String>::new();
    for sql in [
        "SELECT DISTINCT currency FROM receivables",
        "SELECT DISTINCT currency FROM payables",
        "SELECT DISTINCT currency FROM balance_lines",
        "SELECT DISTINCT currency FROM budgets",
    ] {
        let mut stmt = conn.prepare(sql)?;
        let mut cur = stmt.query([])?;
        while let Some(r) = cur.next()? {
            let ccy: String = r.get(0)?;
            let ccy = ccy.to_uppercase();
            if ccy != fx.base() && fx.rate(&ccy).is_none() && !seen.contains(&ccy) {
                rows.push(vec!["missing_rate".into(), ccy.clone()]);
                seen.push(ccy);
            }
        }
    }

    // 2) Snapshot totals that disagree with their lines
    let mut bstmt = conn.prepare("SELECT id, month, total_minor FROM balances ORDER BY month")?;
    let mut bcur = bstmt.query([])?;
    while let Some(r) = bcur.next()? {
        let id: i64 = r.get(0)?;
        let month: String = r.get(1)?;
        let stored: i64 = r.get(2)?;
        let mut lstmt = conn
            .prepare("SELECT currency, amount_minor FROM balance_lines WHERE balance_id=?1")?;
        let mut lcur = lstmt.query(params![id])?;
        let mut computed = 0i64;
        while let Some(l) = lcur.next()? {
            let ccy: String = l.get(0)?;
            let amount: i64 = l.get(1)?;
            computed += fx.to_reporting(amount, &ccy);
        }
        if computed != stored {
            rows.push(vec![
                "balance_total_mismatch".into(),
                format!("{}: stored {} computed {}", month, stored, computed),
            ]);
        }
        if Period::parse(&month).is_err() {
            rows.push(vec!["invalid_month".into(), format!("balance '{}'", month)]);
        }
    }

    // 3) Negative scheduled amounts
    for table in ["receivables", "payables"] {
        let mut stmt = conn.prepare(&format!(
            "SELECT id FROM {} WHERE amount_minor < 0",
            table
        ))?;
        let mut cur = stmt.query([])?;
        while let Some(r) = cur.next()? {
            let id: i64 = r.get(0)?;
            rows.push(vec![
                "negative_amount".into(),
                format!("{} #{}", table, id),
            ]);
        }
    }

    // 4) Budget months the forecast could never match
    let mut mstmt = conn.prepare("SELECT DISTINCT month FROM budgets")?;
    let mut mcur = mstmt.query([])?;
    while let Some(r) = mcur.next()? {
        let month: String = r.get(0)?;
        if Period::parse(&month).is_err() {
            rows.push(vec!["invalid_month".into(), format!("budget '{}'", month)]);
        }
    }

    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
