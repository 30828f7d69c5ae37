//! Daily P/L aggregation engine
//!
//! Consumes the raw `historyAll` rows of a snapshot and produces, per
//! account, an ascending daily series of (daily P/L, cumulative P/L) pairs.
//! Pure and total: malformed rows are skipped individually and the engine
//! never returns an error. The worst outcome of bad input is an account
//! missing from the output or a series with fewer points than rows.
//!
//! Daily P/L is the difference between an account's recorded entry price on
//! consecutive observed days; the first observed day is defined as zero.
//! Output values are rounded to 2 decimal places with the midpoint rounded
//! away from zero (matches how the presentation layer always formatted them).

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::snapshot::{day_key, resolve_account, resolve_entry_date, resolve_entry_price};

/// How the running cumulative P/L is accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accumulation {
    /// Round each daily P/L to 2 decimals first, then add the rounded value
    /// to the running sum. Compounds rounding error deterministically, but
    /// reproduces the historical wire output exactly. The default.
    #[default]
    RoundBeforeSum,
    /// Accumulate exact daily deltas and round only at emission. For callers
    /// that prefer correctness over output compatibility.
    SumThenRound,
}

/// One point of a per-account daily series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeriesPoint {
    pub date: NaiveDate,
    pub pl: Decimal,
    #[serde(rename = "cumulativePL")]
    pub cumulative_pl: Decimal,
}

struct Observation {
    day: NaiveDate,
    price: Decimal,
    timestamp: DateTime<Utc>,
}

/// Build per-account daily P/L series with the wire-compatible accumulation.
pub fn build_daily_series(rows: &[Value]) -> BTreeMap<String, Vec<DailySeriesPoint>> {
    build_daily_series_with(rows, Accumulation::default())
}

/// Build per-account daily P/L series with an explicit accumulation mode.
///
/// Rows without a resolvable entry date or with a non-numeric entry price
/// are skipped. Accounts with no surviving rows do not appear in the output.
pub fn build_daily_series_with(
    rows: &[Value],
    accumulation: Accumulation,
) -> BTreeMap<String, Vec<DailySeriesPoint>> {
    let mut by_account: BTreeMap<String, Vec<Observation>> = BTreeMap::new();

    for row in rows {
        let Some(timestamp) = resolve_entry_date(row) else {
            debug!("Skipping history row without a resolvable entry date");
            continue;
        };
        let Some(price) = resolve_entry_price(row) else {
            debug!("Skipping history row with a non-numeric entry price");
            continue;
        };

        by_account
            .entry(resolve_account(row))
            .or_default()
            .push(Observation {
                day: day_key(timestamp),
                price,
                timestamp,
            });
    }

    by_account
        .into_iter()
        .map(|(account, observations)| {
            let series = build_account_series(observations, accumulation);
            (account, series)
        })
        .collect()
}

fn build_account_series(
    mut observations: Vec<Observation>,
    accumulation: Accumulation,
) -> Vec<DailySeriesPoint> {
    // Stable sort, so same-timestamp rows keep input order and the
    // chronologically last observation wins the day below.
    observations.sort_by_key(|o| o.timestamp);

    let mut price_by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for observation in observations {
        price_by_day.insert(observation.day, observation.price);
    }

    let mut points = Vec::with_capacity(price_by_day.len());
    let mut cumulative = Decimal::ZERO;
    let mut previous_price: Option<Decimal> = None;

    for (day, price) in &price_by_day {
        // Day 0: previous price equals current price, P/L is zero by definition
        let daily = match previous_price {
            Some(previous) => price - previous,
            None => Decimal::ZERO,
        };

        let (pl, cumulative_pl) = match accumulation {
            Accumulation::RoundBeforeSum => {
                let rounded = round2(daily);
                cumulative += rounded;
                (rounded, round2(cumulative))
            }
            Accumulation::SumThenRound => {
                cumulative += daily;
                (round2(daily), round2(cumulative))
            }
        };

        points.push(DailySeriesPoint {
            date: *day,
            pl,
            cumulative_pl,
        });
        previous_price = Some(*price);
    }

    points
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_two_day_series() {
        let rows = vec![
            json!({"account": "U1", "Entry Date": "2024-01-01", "Entry Price": "100"}),
            json!({"account": "U1", "Entry Date": "2024-01-02", "Entry Price": 105}),
        ];

        let out = build_daily_series(&rows);
        let series = &out["U1"];
        assert_eq!(
            series,
            &vec![
                DailySeriesPoint {
                    date: date(2024, 1, 1),
                    pl: Decimal::ZERO,
                    cumulative_pl: Decimal::ZERO,
                },
                DailySeriesPoint {
                    date: date(2024, 1, 2),
                    pl: dec!(5),
                    cumulative_pl: dec!(5),
                },
            ]
        );
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(build_daily_series(&[]).is_empty());
    }

    #[test]
    fn test_last_entry_of_a_day_wins() {
        let rows = vec![
            json!({"account": "U2", "Entry Date": "2024-02-01T15:00:00", "Entry Price": 60}),
            json!({"account": "U2", "Entry Date": "2024-02-01T09:00:00", "Entry Price": 50}),
        ];

        let out = build_daily_series(&rows);
        let series = &out["U2"];
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].pl, Decimal::ZERO);
        assert_eq!(series[0].cumulative_pl, Decimal::ZERO);

        // The 60 price (chronologically later) seeds the next day's delta
        let mut rows = rows;
        rows.push(json!({"account": "U2", "Entry Date": "2024-02-02", "Entry Price": 70}));
        let out = build_daily_series(&rows);
        assert_eq!(out["U2"][1].pl, dec!(10));
    }

    #[test]
    fn test_same_timestamp_rows_keep_input_order() {
        let rows = vec![
            json!({"account": "U2", "Entry Date": "2024-02-01", "Entry Price": 50}),
            json!({"account": "U2", "Entry Date": "2024-02-01", "Entry Price": 60}),
            json!({"account": "U2", "Entry Date": "2024-02-02", "Entry Price": 61}),
        ];

        let out = build_daily_series(&rows);
        assert_eq!(out["U2"][1].pl, dec!(1));
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let rows = vec![
            json!({"account": "U1", "Entry Date": "2024-01-03", "Entry Price": 90}),
            json!({"account": "U1", "Entry Date": "2024-01-01", "Entry Price": 100}),
            json!({"account": "U1", "Entry Date": "2024-01-02T12:00:00", "Entry Price": 105}),
        ];
        let mut shuffled = rows.clone();
        shuffled.rotate_left(1);

        assert_eq!(build_daily_series(&rows), build_daily_series(&shuffled));

        let series = &build_daily_series(&rows)["U1"];
        let pls: Vec<Decimal> = series.iter().map(|p| p.pl).collect();
        assert_eq!(pls, vec![Decimal::ZERO, dec!(5), dec!(-15)]);
    }

    #[test]
    fn test_rows_without_date_are_skipped() {
        let rows = vec![
            json!({"account": "U1", "Entry Price": 100}),
            json!({"account": "U1", "Entry Date": "garbage", "Entry Price": 100}),
            json!({"account": "U3", "Entry Date": "2024-01-01", "Entry Price": 10}),
        ];

        let out = build_daily_series(&rows);
        assert_eq!(out.len(), 1);
        assert_eq!(out["U3"].len(), 1);
    }

    #[test]
    fn test_non_numeric_price_skips_row_but_missing_price_is_zero() {
        let rows = vec![
            json!({"account": "U1", "Entry Date": "2024-01-01", "Entry Price": "oops"}),
            json!({"account": "U1", "Entry Date": "2024-01-02"}),
        ];

        let out = build_daily_series(&rows);
        let series = &out["U1"];
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].date, date(2024, 1, 2));
        assert_eq!(series[0].pl, Decimal::ZERO);
    }

    #[test]
    fn test_unlabeled_rows_group_under_unknown() {
        let rows = vec![
            json!({"Entry Date": "2024-01-01", "Entry Price": 5}),
            json!({"Entry Date": "2024-01-02", "Entry Price": 7}),
        ];

        let out = build_daily_series(&rows);
        assert_eq!(out["Unknown"][1].pl, dec!(2));
    }

    #[test]
    fn test_cumulative_sum_law() {
        let rows = vec![
            json!({"account": "U1", "Entry Date": "2024-01-01", "Entry Price": "100.004"}),
            json!({"account": "U1", "Entry Date": "2024-01-02", "Entry Price": "100.011"}),
            json!({"account": "U1", "Entry Date": "2024-01-03", "Entry Price": "100.019"}),
            json!({"account": "U1", "Entry Date": "2024-01-04", "Entry Price": "99.50"}),
        ];

        let series = &build_daily_series(&rows)["U1"];
        let mut running = Decimal::ZERO;
        for point in series {
            running = round2(running + point.pl);
            assert_eq!(point.cumulative_pl, running);
        }
    }

    #[test]
    fn test_round_before_sum_compounds_rounding() {
        // Two daily deltas of 0.004 each round to 0.00 under the compat
        // mode, so cumulative stays 0; exact accumulation reaches 0.01.
        let rows = vec![
            json!({"account": "U1", "Entry Date": "2024-01-01", "Entry Price": "100.000"}),
            json!({"account": "U1", "Entry Date": "2024-01-02", "Entry Price": "100.004"}),
            json!({"account": "U1", "Entry Date": "2024-01-03", "Entry Price": "100.008"}),
        ];

        let compat = &build_daily_series_with(&rows, Accumulation::RoundBeforeSum)["U1"];
        assert_eq!(compat[2].cumulative_pl, Decimal::ZERO);

        let exact = &build_daily_series_with(&rows, Accumulation::SumThenRound)["U1"];
        assert_eq!(exact[2].cumulative_pl, dec!(0.01));
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        let rows = vec![
            json!({"account": "U1", "Entry Date": "2024-01-01", "Entry Price": "0"}),
            json!({"account": "U1", "Entry Date": "2024-01-02", "Entry Price": "0.125"}),
        ];
        assert_eq!(build_daily_series(&rows)["U1"][1].pl, dec!(0.13));

        let rows = vec![
            json!({"account": "U1", "Entry Date": "2024-01-01", "Entry Price": "0"}),
            json!({"account": "U1", "Entry Date": "2024-01-02", "Entry Price": "-0.125"}),
        ];
        assert_eq!(build_daily_series(&rows)["U1"][1].pl, dec!(-0.13));
    }

    #[test]
    fn test_first_point_invariant_across_accounts() {
        let rows = vec![
            json!({"account": "A", "Entry Date": "2024-05-05", "Entry Price": 123.45}),
            json!({"account Number": "B", "EntryDate": "2024-05-06", "EntryPrice": "7"}),
        ];

        for series in build_daily_series(&rows).values() {
            assert_eq!(series[0].pl, Decimal::ZERO);
            assert_eq!(series[0].cumulative_pl, Decimal::ZERO);
        }
    }

    #[test]
    fn test_point_serializes_with_wire_field_names() {
        let point = DailySeriesPoint {
            date: date(2024, 1, 2),
            pl: dec!(5),
            cumulative_pl: dec!(5),
        };
        let value = serde_json::to_value(&point).unwrap();
        assert_eq!(value["date"], "2024-01-02");
        assert!(value.get("cumulativePL").is_some());
    }
}
