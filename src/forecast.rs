// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Rolling cash-flow forecast: a month-by-month forecast vs. actual
//! reconciliation. The forecast track rolls expected (unpaid) flows and,
//! optionally, the monthly budget forward; the actual track rolls only
//! settled flows. Closing balances of one period are the opening balances
//! of the next, on both tracks independently.

use crate::models::{BudgetLine, ScheduledFlow};
use crate::money::Normalizer;
use crate::period::Period;
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;

pub const MIN_HORIZON_MONTHS: usize = 1;
pub const MAX_HORIZON_MONTHS: usize = 36;
pub const DEFAULT_HORIZON_MONTHS: usize = 12;
/// 500.00 reporting-currency units, in minor units.
pub const DEFAULT_VARIANCE_THRESHOLD_MINOR: i64 = 50_000;

/// A ledger read failed; the whole request fails, no partial forecast.
#[derive(Debug, Error)]
#[error("ledger unavailable: {0}")]
pub struct DataUnavailable(#[from] rusqlite::Error);

/// What the engine needs from a balance snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Opening {
    pub period: Period,
    pub total_minor: i64,
}

/// Immutable point-in-time view of the ledger. Fetched once per forecast
/// request, before the period loop, so every row of one response reflects
/// the same state even while the store is being written to.
pub struct Ledger {
    pub balances: Vec<Opening>, // ascending by month
    pub receivables: Vec<ScheduledFlow>,
    pub payables: Vec<ScheduledFlow>,
    pub budgets: Vec<BudgetLine>,
}

impl Ledger {
    pub fn load(conn: &Connection) -> Result<Self, DataUnavailable> {
        Ok(Self {
            balances: load_openings(conn)?,
            receivables: load_flows(conn, "receivables")?,
            payables: load_flows(conn, "payables")?,
            budgets: load_budgets(conn)?,
        })
    }

    pub fn latest_balance(&self) -> Option<Opening> {
        self.balances.last().copied()
    }
}

fn load_openings(conn: &Connection) -> Result<Vec<Opening>, DataUnavailable> {
    let mut stmt = conn.prepare("SELECT month, total_minor FROM balances ORDER BY month ASC")?;
    let rows = stmt.query_map([], |r| {
        let month: String = r.get(0)?;
        let period = Period::parse(&month).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, e.into())
        })?;
        Ok(Opening {
            period,
            total_minor: r.get(1)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn load_flows(conn: &Connection, table: &str) -> Result<Vec<ScheduledFlow>, DataUnavailable> {
    let sql = format!(
        "SELECT id, date, description, amount_minor, currency, is_paid FROM {} ORDER BY date, id",
        table
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |r| {
        Ok(ScheduledFlow {
            id: r.get(0)?,
            date: r.get(1)?,
            description: r.get(2)?,
            amount_minor: r.get(3)?,
            currency: r.get(4)?,
            is_paid: r.get(5)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn load_budgets(conn: &Connection) -> Result<Vec<BudgetLine>, DataUnavailable> {
    let mut stmt = conn.prepare(
        "SELECT id, month, category, planned_inflow_minor, planned_outflow_minor, currency
         FROM budgets ORDER BY month, category",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(BudgetLine {
            id: r.get(0)?,
            month: r.get(1)?,
            category: r.get(2)?,
            planned_inflow_minor: r.get(3)?,
            planned_outflow_minor: r.get(4)?,
            currency: r.get(5)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

#[derive(Debug, Clone, Copy)]
pub struct ForecastParams {
    /// Clamped to [MIN_HORIZON_MONTHS, MAX_HORIZON_MONTHS].
    pub horizon_months: usize,
    pub variance_threshold_minor: i64,
    pub include_budget: bool,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            horizon_months: DEFAULT_HORIZON_MONTHS,
            variance_threshold_minor: DEFAULT_VARIANCE_THRESHOLD_MINOR,
            include_budget: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastRow {
    pub period: String,
    pub opening_forecast_minor: i64,
    pub opening_actual_minor: i64,
    pub expected_inflow_minor: i64,
    pub expected_outflow_minor: i64,
    pub planned_inflow_minor: i64,
    pub planned_outflow_minor: i64,
    pub actual_inflow_minor: i64,
    pub actual_outflow_minor: i64,
    pub forecast_net_minor: i64,
    pub actual_net_minor: i64,
    pub closing_forecast_minor: i64,
    pub closing_actual_minor: i64,
    pub variance_minor: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Surplus,
    Shortfall,
}

impl ForecastRow {
    pub fn direction(&self) -> Direction {
        if self.variance_minor >= 0 {
            Direction::Surplus
        } else {
            Direction::Shortfall
        }
    }

    pub fn exceeds(&self, threshold_minor: i64) -> bool {
        self.variance_minor.abs() >= threshold_minor
    }
}

/// Sum of flows settling in `period` with the given paid state. Each
/// record is converted to the reporting currency before summation; raw
/// mixed-currency amounts are never added together.
pub fn sum_flows(records: &[ScheduledFlow], period: Period, paid: bool, fx: &Normalizer) -> i64 {
    records
        .iter()
        .filter(|f| f.is_paid == paid && period.contains(f.date))
        .map(|f| fx.to_reporting(f.amount_minor, &f.currency))
        .sum()
}

/// Planned (inflow, outflow) totals for the month, across all categories.
pub fn sum_budget(lines: &[BudgetLine], period: Period, fx: &Normalizer) -> (i64, i64) {
    let key = period.key();
    lines
        .iter()
        .filter(|b| b.month == key)
        .fold((0, 0), |(inflow, outflow), b| {
            (
                inflow + fx.to_reporting(b.planned_inflow_minor, &b.currency),
                outflow + fx.to_reporting(b.planned_outflow_minor, &b.currency),
            )
        })
}

/// Builds the forecast table. The base period is the month of the latest
/// snapshot, or the month of `today` with a zero opening when none exists.
/// Strictly sequential: each period's openings are the previous period's
/// closings, so rows cannot be computed out of order.
pub fn compute_forecast(
    ledger: &Ledger,
    fx: &Normalizer,
    params: &ForecastParams,
    today: NaiveDate,
) -> Vec<ForecastRow> {
    let horizon = params
        .horizon_months
        .clamp(MIN_HORIZON_MONTHS, MAX_HORIZON_MONTHS);
    let (start, opening) = match ledger.latest_balance() {
        Some(b) => (b.period, b.total_minor),
        None => (Period::from_date(today), 0),
    };

    let mut rows = Vec::with_capacity(horizon);
    let mut opening_forecast = opening;
    let mut opening_actual = opening;
    let mut period = start;

    for _ in 0..horizon {
        let expected_inflow = sum_flows(&ledger.receivables, period, false, fx);
        let expected_outflow = sum_flows(&ledger.payables, period, false, fx);
        let actual_inflow = sum_flows(&ledger.receivables, period, true, fx);
        let actual_outflow = sum_flows(&ledger.payables, period, true, fx);
        let (planned_inflow, planned_outflow) = if params.include_budget {
            sum_budget(&ledger.budgets, period, fx)
        } else {
            (0, 0)
        };

        let forecast_net = expected_inflow - expected_outflow + planned_inflow - planned_outflow;
        let actual_net = actual_inflow - actual_outflow;
        let closing_forecast = opening_forecast + forecast_net;
        let closing_actual = opening_actual + actual_net;

        rows.push(ForecastRow {
            period: period.label(),
            opening_forecast_minor: opening_forecast,
            opening_actual_minor: opening_actual,
            expected_inflow_minor: expected_inflow,
            expected_outflow_minor: expected_outflow,
            planned_inflow_minor: planned_inflow,
            planned_outflow_minor: planned_outflow,
            actual_inflow_minor: actual_inflow,
            actual_outflow_minor: actual_outflow,
            forecast_net_minor: forecast_net,
            actual_net_minor: actual_net,
            closing_forecast_minor: closing_forecast,
            closing_actual_minor: closing_actual,
            variance_minor: closing_actual - closing_forecast,
        });

        opening_forecast = closing_forecast;
        opening_actual = closing_actual;
        period = period.succ();
    }
    rows
}
