// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Point-in-time cash position for one month. `total_minor` is in the
/// reporting currency and is computed from the lines, never typed in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub id: i64,
    pub month: String, // YYYY-MM
    pub total_minor: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceLine {
    pub id: i64,
    pub balance_id: i64,
    pub account: String,
    pub currency: String,
    pub amount_minor: i64, // native currency of the line
}

/// A scheduled cash movement: receivable (inflow) or payable (outflow),
/// depending on which table it was read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledFlow {
    pub id: i64,
    pub date: NaiveDate,
    pub description: String,
    pub amount_minor: i64,
    pub currency: String,
    pub is_paid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetLine {
    pub id: i64,
    pub month: String, // YYYY-MM
    pub category: String,
    pub planned_inflow_minor: i64,
    pub planned_outflow_minor: i64,
    pub currency: String,
}
