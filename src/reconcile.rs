//! Account reconciliation
//!
//! Merges the snapshot's position list, per-account summary and last-known
//! exit records into one normalized record per account, carrying current
//! holdings and the "current period" P/L (net liquidation minus the last
//! recorded exit value).

use std::collections::HashMap;

use itertools::Itertools;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::snapshot::{AccountSummary, HistoryEntry, Money, Position};

/// One reconciled account for the "current" view.
///
/// Serialized field names match what the presentation layer consumes.
#[derive(Debug, Clone, Serialize)]
pub struct DetailedAccount {
    pub account: String,
    #[serde(rename = "NetLiquidation")]
    pub net_liquidation: Money,
    #[serde(rename = "TotalCashValue")]
    pub total_cash_value: Money,
    pub positions: Vec<Position>,
    #[serde(rename = "positionCount")]
    pub position_count: usize,
    #[serde(rename = "historyValue")]
    pub history_value: Decimal,
    pub difference: Decimal,
}

/// Reconcile a snapshot into one `DetailedAccount` per summary entry.
///
/// The output preserves the summary's order (display order follows input
/// order) and always has exactly as many records as there are summary keys.
/// Accounts with no positions get an empty list; accounts with no matching
/// history entry get a zero baseline. Positions referencing an account that
/// has no summary entry are dropped from the result.
pub fn reconcile_accounts(
    positions: &[Position],
    account_summary: &[(String, AccountSummary)],
    history: &[HistoryEntry],
) -> Vec<DetailedAccount> {
    let mut positions_by_account: HashMap<String, Vec<Position>> = positions
        .iter()
        .cloned()
        .map(|p| (p.account.clone(), p))
        .into_group_map();

    let accounts = account_summary
        .iter()
        .map(|(account_id, summary)| {
            let account_positions = positions_by_account
                .remove(account_id)
                .unwrap_or_default();

            // First matching exit record wins; no match means a zero baseline
            let history_value = history
                .iter()
                .find(|entry| entry.account == *account_id)
                .and_then(|entry| entry.exit_price)
                .unwrap_or(Decimal::ZERO);

            let difference = summary.net_liquidation.value - history_value;

            DetailedAccount {
                account: account_id.clone(),
                net_liquidation: summary.net_liquidation.clone(),
                total_cash_value: summary.total_cash_value.clone(),
                position_count: account_positions.len(),
                positions: account_positions,
                history_value,
                difference,
            }
        })
        .collect();

    for orphaned in positions_by_account.keys().sorted() {
        debug!("Dropping positions for account {} (no summary entry)", orphaned);
    }

    accounts
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn money(value: Decimal) -> Money {
        Money {
            value,
            currency: "USD".to_string(),
        }
    }

    fn summary(net_liquidation: Decimal, cash: Decimal) -> AccountSummary {
        AccountSummary {
            net_liquidation: money(net_liquidation),
            total_cash_value: money(cash),
        }
    }

    fn position(account: &str, symbol: &str) -> Position {
        Position {
            symbol: symbol.to_string(),
            account: account.to_string(),
            sec_type: None,
            position: dec!(1),
            market_value: None,
            currency: "USD".to_string(),
        }
    }

    #[test]
    fn test_difference_without_history_entry() {
        let summaries = vec![("A1".to_string(), summary(dec!(1000), dec!(900)))];

        let accounts = reconcile_accounts(&[], &summaries, &[]);
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].history_value, Decimal::ZERO);
        assert_eq!(accounts[0].difference, dec!(1000));
    }

    #[test]
    fn test_difference_uses_exit_price_baseline() {
        let summaries = vec![("A1".to_string(), summary(dec!(1000), dec!(900)))];
        let history = vec![HistoryEntry {
            account: "A1".to_string(),
            exit_price: Some(dec!(250)),
        }];

        let accounts = reconcile_accounts(&[], &summaries, &history);
        assert_eq!(accounts[0].history_value, dec!(250));
        assert_eq!(accounts[0].difference, dec!(750));
    }

    #[test]
    fn test_first_matching_history_entry_wins_and_absent_price_is_zero() {
        let summaries = vec![("A1".to_string(), summary(dec!(100), dec!(100)))];
        let history = vec![
            HistoryEntry {
                account: "A1".to_string(),
                exit_price: None,
            },
            HistoryEntry {
                account: "A1".to_string(),
                exit_price: Some(dec!(40)),
            },
        ];

        let accounts = reconcile_accounts(&[], &summaries, &history);
        assert_eq!(accounts[0].history_value, Decimal::ZERO);
        assert_eq!(accounts[0].difference, dec!(100));
    }

    #[test]
    fn test_positions_group_by_account() {
        let summaries = vec![
            ("U1".to_string(), summary(dec!(10), dec!(10))),
            ("U2".to_string(), summary(dec!(20), dec!(20))),
        ];
        let positions = vec![
            position("U1", "AAPL"),
            position("U2", "TSLA"),
            position("U1", "MSFT"),
            position("U9", "GME"), // no summary entry, dropped
        ];

        let accounts = reconcile_accounts(&positions, &summaries, &[]);
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].position_count, 2);
        assert_eq!(accounts[0].positions[0].symbol, "AAPL");
        assert_eq!(accounts[0].positions[1].symbol, "MSFT");
        assert_eq!(accounts[1].position_count, 1);
    }

    #[test]
    fn test_one_record_per_summary_key_in_input_order() {
        let summaries = vec![
            ("Z9".to_string(), summary(dec!(1), dec!(1))),
            ("A1".to_string(), summary(dec!(2), dec!(2))),
            ("M5".to_string(), summary(dec!(3), dec!(3))),
        ];

        let accounts = reconcile_accounts(&[], &summaries, &[]);
        let ids: Vec<&str> = accounts.iter().map(|a| a.account.as_str()).collect();
        assert_eq!(ids, vec!["Z9", "A1", "M5"]);
    }

    #[test]
    fn test_empty_summary_yields_empty_output() {
        let positions = vec![position("U1", "AAPL")];
        let accounts = reconcile_accounts(&positions, &[], &[]);
        assert!(accounts.is_empty());
    }

    #[test]
    fn test_serializes_with_wire_field_names() {
        let summaries = vec![("A1".to_string(), summary(dec!(1000), dec!(900)))];
        let accounts = reconcile_accounts(&[], &summaries, &[]);

        let value = serde_json::to_value(&accounts[0]).unwrap();
        assert!(value.get("NetLiquidation").is_some());
        assert!(value.get("TotalCashValue").is_some());
        assert!(value.get("positionCount").is_some());
        assert!(value.get("historyValue").is_some());
        assert!(value.get("difference").is_some());
    }
}
