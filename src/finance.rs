//! Financial aggregates over account and transaction records
//!
//! Single-pass filter-and-sum; callers hand in freshly loaded records.

use crate::models::{Account, Transaction};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use std::collections::HashSet;
use tracing::warn;

pub const CASH_FLOW_WINDOW_DAYS: i64 = 30;
pub const AVERAGE_CASH_FLOW_WINDOW_DAYS: i64 = 90;
pub const AVERAGE_CASH_FLOW_MONTHS: f64 = 3.0;

/// Look-back window ending at `now`: the half-open interval `(now - days, now]`.
///
/// Future-dated records fall outside every window. A look-back too large to
/// represent has no lower bound.
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub now: DateTime<Utc>,
    pub days: i64,
}

impl Window {
    pub fn ending_now(days: i64) -> Self {
        Self {
            now: Utc::now(),
            days,
        }
    }

    /// Earliest excluded instant, or `None` when the look-back overflows.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        Duration::try_days(self.days.max(0)).and_then(|span| self.now.checked_sub_signed(span))
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        if ts > self.now {
            return false;
        }
        match self.start() {
            Some(start) => ts > start,
            None => true,
        }
    }
}

/// Parse a stored transaction timestamp.
///
/// Accepts RFC 3339 (`Z` or explicit offset), naive date-times (read as UTC)
/// and bare dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    let naive = raw.trim_end_matches('Z');
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(ts.and_utc());
        }
    }

    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

/// Accounts owned by `user_id` (already normalized).
pub fn user_accounts<'a>(accounts: &'a [Account], user_id: &str) -> Vec<&'a Account> {
    accounts.iter().filter(|a| a.user_id == user_id).collect()
}

/// Sum of balances. Liabilities are stored negative, so this is assets minus debts.
pub fn net_worth<'a, I>(accounts: I) -> f64
where
    I: IntoIterator<Item = &'a Account>,
{
    accounts.into_iter().fold(0.0, |total, a| total + a.balance)
}

/// Transactions of the given accounts whose timestamp falls inside `window`.
///
/// Transactions referencing unknown accounts are excluded, not errors.
pub fn transactions_in_window<'a>(
    transactions: &'a [Transaction],
    account_ids: &HashSet<&str>,
    window: Window,
) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|t| account_ids.contains(t.account_id.as_str()))
        .filter(|t| match parse_timestamp(&t.date) {
            Some(ts) => window.contains(ts),
            None => {
                warn!(
                    transaction_id = %t.transaction_id,
                    date = %t.date,
                    "Skipping transaction with unparseable timestamp"
                );
                false
            }
        })
        .collect()
}

pub fn cash_flow(
    transactions: &[Transaction],
    account_ids: &HashSet<&str>,
    window: Window,
) -> f64 {
    transactions_in_window(transactions, account_ids, window)
        .iter()
        .fold(0.0, |total, t| total + t.amount)
}

/// Monthly average over the 90-day window. No transactions and transactions
/// that cancel out both report zero.
pub fn average_monthly_cash_flow(
    transactions: &[Transaction],
    account_ids: &HashSet<&str>,
    now: DateTime<Utc>,
) -> f64 {
    let window = Window {
        now,
        days: AVERAGE_CASH_FLOW_WINDOW_DAYS,
    };
    let total = cash_flow(transactions, account_ids, window);
    if total == 0.0 {
        0.0
    } else {
        total / AVERAGE_CASH_FLOW_MONTHS
    }
}
