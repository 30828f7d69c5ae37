//! Utility functions for formatting and common operations
//!
//! Centralized formatting of monetary values so every view renders amounts
//! the same way: US locale, two decimal places, optional explicit sign for
//! profit/loss figures.

use rust_decimal::Decimal;

use crate::snapshot::Money;

/// Format a decimal with thousands separators and two decimal places:
/// "1,234.56".
///
/// # Examples
/// ```
/// use pnlview::utils::format_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_amount(Decimal::new(123456, 2)), "1,234.56");
/// assert_eq!(format_amount(Decimal::from(-500)), "-500.00");
/// ```
pub fn format_amount(value: Decimal) -> String {
    let is_negative = value < Decimal::ZERO;
    let formatted = format!("{:.2}", value.abs());
    let parts: Vec<&str> = formatted.split('.').collect();

    let integer_part = parts[0];
    let decimal_part = parts.get(1).unwrap_or(&"00");

    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative { "-" } else { "" };
    format!("{}{}.{}", sign, with_separators, decimal_part)
}

/// Format a `Money` with its currency code: "USD 1,234.56"
pub fn format_money(money: &Money) -> String {
    format!("{} {}", money.currency, format_amount(money.value))
}

/// Format a P/L figure with an explicit sign: "+$5.00" / "-$633.75"
pub fn format_signed(value: Decimal) -> String {
    if value < Decimal::ZERO {
        format!("-${}", format_amount(value.abs()))
    } else {
        format!("+${}", format_amount(value))
    }
}
