// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Minor-unit money handling and conversion into the reporting currency.
//!
//! Amounts are carried as `i64` minor units (cents). All conversions round
//! half away from zero, the conventional rule for financial amounts, and
//! assume a two-decimal minor unit on both sides so minor units can be
//! multiplied by the rate directly.

use anyhow::{Context, Result};
use rusqlite::Connection;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;

pub const DEFAULT_BASE_CURRENCY: &str = "EUR";

const RATE_KEY_PREFIX: &str = "fx_rate_";

/// Built-in fallbacks, used when a rate is unset or not a positive number.
fn default_rates() -> HashMap<String, Decimal> {
    HashMap::from([("GBP".to_string(), Decimal::new(117, 2))])
}

pub fn get_base_currency(conn: &Connection) -> Result<String> {
    Ok(crate::utils::get_setting(conn, "base_currency")?
        .unwrap_or_else(|| DEFAULT_BASE_CURRENCY.to_string()))
}

pub fn set_base_currency(conn: &Connection, ccy: &str) -> Result<()> {
    crate::utils::set_setting(conn, "base_currency", &ccy.to_uppercase())
}

pub fn set_rate(conn: &Connection, ccy: &str, rate: Decimal) -> Result<()> {
    let key = format!("{}{}", RATE_KEY_PREFIX, ccy.to_uppercase());
    crate::utils::set_setting(conn, &key, &rate.to_string())
}

/// Converts native minor-unit amounts into the reporting currency.
///
/// Construct with an explicit rate table (`new`) or from the settings
/// store (`load`); there is no ambient process-wide rate state.
pub struct Normalizer {
    base: String,
    rates: HashMap<String, Decimal>,
}

impl Normalizer {
    pub fn new(base: &str, rates: HashMap<String, Decimal>) -> Self {
        let rates = rates
            .into_iter()
            .map(|(k, v)| (k.to_uppercase(), v))
            .collect();
        Self {
            base: base.to_uppercase(),
            rates,
        }
    }

    /// Reads `base_currency` and `fx_rate_*` settings. A rate that is
    /// missing, unparseable, or not positive falls back to the built-in
    /// default for that currency; bad configuration is never an error.
    pub fn load(conn: &Connection) -> Result<Self> {
        let base = get_base_currency(conn)?;
        let mut rates = default_rates();
        let mut stmt =
            conn.prepare("SELECT key, value FROM settings WHERE key LIKE 'fx_rate_%'")?;
        let rows = stmt.query_map([], |r| {
            Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (key, raw) = row?;
            let ccy = key
                .strip_prefix(RATE_KEY_PREFIX)
                .unwrap_or(&key)
                .to_uppercase();
            match raw.parse::<Decimal>() {
                Ok(rate) if rate > Decimal::ZERO => {
                    rates.insert(ccy, rate);
                }
                _ => {} // keep the fallback, if any
            }
        }
        Ok(Self::new(&base, rates))
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn rate(&self, ccy: &str) -> Option<Decimal> {
        self.rates.get(&ccy.to_uppercase()).copied()
    }

    pub fn rates(&self) -> &HashMap<String, Decimal> {
        &self.rates
    }

    /// Reporting-currency minor units for a native minor-unit amount.
    ///
    /// Identity when the currency already is the reporting currency or has
    /// no configured rate (unknown codes pass through; `doctor` reports
    /// them). Rounds half away from zero.
    pub fn to_reporting(&self, amount_minor: i64, currency: &str) -> i64 {
        let ccy = currency.to_uppercase();
        if ccy == self.base {
            return amount_minor;
        }
        let Some(rate) = self.rates.get(&ccy) else {
            return amount_minor;
        };
        let converted = (Decimal::from(amount_minor) * rate)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        match converted.to_i64() {
            Some(v) => v,
            None => amount_minor, // out of i64 range; keep the native amount
        }
    }
}

pub fn major_to_minor(amount: Decimal) -> Result<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .with_context(|| format!("Amount '{}' out of range", amount))
}

pub fn minor_to_major(minor: i64) -> Decimal {
    Decimal::new(minor, 2)
}

pub fn fmt_minor(minor: i64, ccy: &str) -> String {
    format!("{} {:.2}", ccy, minor_to_major(minor))
}
