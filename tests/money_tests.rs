// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashclip::money::{fmt_minor, Normalizer};
use cashclip::utils::parse_amount;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::HashMap;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE settings(key TEXT PRIMARY KEY, value TEXT NOT NULL);")
        .unwrap();
    conn
}

fn set(conn: &Connection, key: &str, value: &str) {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)",
        rusqlite::params![key, value],
    )
    .unwrap();
}

#[test]
fn reporting_currency_is_identity() {
    let fx = Normalizer::new("EUR", HashMap::from([("GBP".to_string(), Decimal::new(117, 2))]));
    assert_eq!(fx.to_reporting(12345, "EUR"), 12345);
    assert_eq!(fx.to_reporting(12345, "eur"), 12345);
    assert_eq!(fx.to_reporting(0, "EUR"), 0);
}

#[test]
fn configured_rate_applies() {
    let conn = setup();
    set(&conn, "fx_rate_GBP", "1.17");
    let fx = Normalizer::load(&conn).unwrap();
    assert_eq!(fx.base(), "EUR");
    // 100.00 GBP -> 117.00 EUR
    assert_eq!(fx.to_reporting(10000, "GBP"), 11700);
}

#[test]
fn invalid_configured_rate_falls_back() {
    for bad in ["-2", "0", "abc", ""] {
        let conn = setup();
        set(&conn, "fx_rate_GBP", bad);
        let fx = Normalizer::load(&conn).unwrap();
        assert_eq!(fx.to_reporting(10000, "GBP"), 11700, "rate '{}'", bad);
    }
}

#[test]
fn missing_rate_uses_the_default_table() {
    let conn = setup();
    let fx = Normalizer::load(&conn).unwrap();
    assert_eq!(fx.to_reporting(10000, "GBP"), 11700);
}

#[test]
fn unknown_currency_passes_through() {
    let conn = setup();
    let fx = Normalizer::load(&conn).unwrap();
    assert_eq!(fx.to_reporting(5000, "USD"), 5000);
}

#[test]
fn rounds_half_away_from_zero() {
    // 5 * 1.1 = 5.5 -> 6, not 5
    let fx = Normalizer::new("EUR", HashMap::from([("GBP".to_string(), Decimal::new(11, 1))]));
    assert_eq!(fx.to_reporting(5, "GBP"), 6);

    // 25 * 0.5 = 12.5 -> 13
    let fx = Normalizer::new("EUR", HashMap::from([("GBP".to_string(), Decimal::new(5, 1))]));
    assert_eq!(fx.to_reporting(25, "GBP"), 13);

    // 10 * 1.005 = 10.05 -> 10
    let fx = Normalizer::new("EUR", HashMap::from([("GBP".to_string(), Decimal::new(1005, 3))]));
    assert_eq!(fx.to_reporting(10, "GBP"), 10);
}

#[test]
fn round_trip_recovers_within_one_minor_unit() {
    let rate = Decimal::new(117, 2);
    let there = Normalizer::new("EUR", HashMap::from([("GBP".to_string(), rate)]));
    let back = Normalizer::new("GBP", HashMap::from([("EUR".to_string(), Decimal::ONE / rate)]));

    for amount in [1i64, 99, 9999, 99999, 1234567] {
        let eur = there.to_reporting(amount, "GBP");
        let gbp = back.to_reporting(eur, "EUR");
        assert!((gbp - amount).abs() <= 1, "{} -> {} -> {}", amount, eur, gbp);
    }
}

#[test]
fn parse_amount_is_major_units() {
    assert_eq!(parse_amount("1234.56").unwrap(), 123456);
    assert_eq!(parse_amount("0").unwrap(), 0);
    assert_eq!(parse_amount("0.005").unwrap(), 1); // half away from zero
    assert_eq!(parse_amount("-1").unwrap(), -100);
    assert!(parse_amount("12,34").is_err());
}

#[test]
fn fmt_minor_shows_major_units() {
    assert_eq!(fmt_minor(123456, "EUR"), "EUR 1234.56");
    assert_eq!(fmt_minor(5, "GBP"), "GBP 0.05");
}
