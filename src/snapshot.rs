//! Typed snapshot data model and ingestion
//!
//! The gateway returns a loosely-structured JSON document; everything the
//! rest of the crate consumes is validated and coerced here, once, at
//! ingestion. Sections that are missing or have the wrong shape degrade to
//! empty collections, and individually malformed rows are skipped with a
//! log line, so a partially-shaped payload never aborts the transform.
//!
//! `historyAll` rows are the exception: their field names vary between
//! exports, so they are kept as raw JSON objects and read through the
//! ordered-alias resolvers below (`resolve_account`, `resolve_entry_date`,
//! `resolve_entry_price`).

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

fn default_currency() -> String {
    "USD".to_string()
}

/// A monetary amount with its currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub value: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// One open position as reported by the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub account: String,
    #[serde(rename = "secType", default, skip_serializing_if = "Option::is_none")]
    pub sec_type: Option<String>,
    #[serde(default)]
    pub position: Decimal,
    #[serde(
        rename = "marketValue",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub market_value: Option<Decimal>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// Per-account summary values from `portfolio.account_summary`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    #[serde(rename = "NetLiquidation")]
    pub net_liquidation: Money,
    #[serde(rename = "TotalCashValue")]
    pub total_cash_value: Money,
}

/// Last-known exit record per account, seeds the "current" P/L baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "account Number")]
    pub account: String,
    #[serde(rename = "Exit Price", default, skip_serializing_if = "Option::is_none")]
    pub exit_price: Option<Decimal>,
}

/// One fully ingested gateway snapshot.
///
/// `account_summary` preserves the gateway's emission order because display
/// order follows input order. `history_all` stays raw; see module docs.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub positions: Vec<Position>,
    pub account_summary: Vec<(String, AccountSummary)>,
    pub history: Vec<HistoryEntry>,
    pub history_all: Vec<Value>,
}

impl Snapshot {
    /// Ingest a parsed gateway document.
    ///
    /// Never fails: absent or mis-shaped sections become empty collections,
    /// malformed rows are skipped individually.
    pub fn from_value(doc: &Value) -> Self {
        let portfolio = doc.get("portfolio");

        let positions = portfolio
            .and_then(|p| p.get("positions"))
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .filter_map(|row| match serde_json::from_value::<Position>(row.clone()) {
                        Ok(position) => Some(position),
                        Err(e) => {
                            warn!("Skipping malformed position row: {}", e);
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let account_summary = portfolio
            .and_then(|p| p.get("account_summary"))
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(account_id, raw)| {
                        match serde_json::from_value::<AccountSummary>(raw.clone()) {
                            Ok(summary) => Some((account_id.clone(), summary)),
                            Err(e) => {
                                warn!("Skipping malformed summary for account {}: {}", account_id, e);
                                None
                            }
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let history = doc
            .get("history")
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .filter_map(|row| match serde_json::from_value::<HistoryEntry>(row.clone()) {
                        Ok(entry) => Some(entry),
                        Err(e) => {
                            debug!("Skipping malformed history row: {}", e);
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let history_all = doc
            .get("historyAll")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Snapshot {
            positions,
            account_summary,
            history,
            history_all,
        }
    }
}

// Alias priority per logical field, primary name first. Exports disagree on
// casing and spacing, so every lookup walks these in order.
const ACCOUNT_ALIASES: [&str; 3] = ["account", "account Number", "Account"];
const ENTRY_DATE_ALIASES: [&str; 3] = ["Entry Date", "EntryDate", "entryDate"];
const ENTRY_PRICE_ALIASES: [&str; 3] = ["Entry Price", "EntryPrice", "entryPrice"];

fn resolve_alias<'a>(row: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    // A null under a higher-priority alias falls through to the next one
    aliases
        .iter()
        .filter_map(|key| row.get(*key))
        .find(|v| !v.is_null())
}

/// Resolve the account identifier of a `historyAll` row.
///
/// Rows with no recognizable account field group under `"Unknown"` rather
/// than being dropped, so their observations still chart somewhere.
pub fn resolve_account(row: &Value) -> String {
    resolve_alias(row, &ACCOUNT_ALIASES)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Resolve and parse the entry date of a `historyAll` row.
///
/// Returns None when no alias is present or the value does not parse; such
/// rows cannot be placed on the time axis and are skipped by the engine.
pub fn resolve_entry_date(row: &Value) -> Option<DateTime<Utc>> {
    let raw = resolve_alias(row, &ENTRY_DATE_ALIASES)?;
    parse_entry_date(raw.as_str()?)
}

/// Resolve the entry price of a `historyAll` row.
///
/// A missing price defaults to zero; a present but non-numeric price returns
/// None (per-entry error, the row is skipped).
pub fn resolve_entry_price(row: &Value) -> Option<Decimal> {
    match resolve_alias(row, &ENTRY_PRICE_ALIASES) {
        None => Some(Decimal::ZERO),
        Some(raw) => coerce_decimal(raw),
    }
}

fn coerce_decimal(raw: &Value) -> Option<Decimal> {
    match raw {
        Value::Number(_) => serde_json::from_value(raw.clone()).ok(),
        Value::String(s) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    }
}

/// Parse an entry date string, trying the formats seen in gateway exports.
/// All values are interpreted as UTC; the calendar-day key is the UTC date.
pub fn parse_entry_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
        }
    }

    None
}

/// Truncate a UTC timestamp to its calendar day
pub fn day_key(timestamp: DateTime<Utc>) -> NaiveDate {
    timestamp.date_naive()
}
