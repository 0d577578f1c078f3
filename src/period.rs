// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Calendar-month bucketing. A `Period` is a (year, month) pair; the day
//! of month is always discarded. Callers normalize to naive dates before
//! bucketing so a record cannot shift months across timezones.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32, // 1..=12, enforced by the constructors
}

impl Period {
    pub fn from_date(d: NaiveDate) -> Self {
        Self {
            year: d.year(),
            month: d.month(),
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        let d = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
            .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
        Ok(Self::from_date(d))
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    /// First day of the month. Pinning to day 1 keeps month arithmetic
    /// free of end-of-month overflow.
    pub fn start(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("month is 1..=12")
    }

    pub fn succ(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn pred(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn add_months(self, n: usize) -> Self {
        let total = self.year as i64 * 12 + (self.month as i64 - 1) + n as i64;
        Self {
            year: (total.div_euclid(12)) as i32,
            month: (total.rem_euclid(12) + 1) as u32,
        }
    }

    /// `count` consecutive periods starting at `start`, one month apart.
    pub fn enumerate(start: Period, count: usize) -> Vec<Period> {
        let mut out = Vec::with_capacity(count);
        let mut p = start;
        for _ in 0..count {
            out.push(p);
            p = p.succ();
        }
        out
    }

    pub fn contains(self, d: NaiveDate) -> bool {
        Self::from_date(d) == self
    }

    /// Machine form, `YYYY-MM`; matches the stored budget/balance months.
    pub fn key(self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Display form, e.g. `Sep 2025`.
    pub fn label(self) -> String {
        self.start().format("%b %Y").to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
