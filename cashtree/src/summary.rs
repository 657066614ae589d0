//! Per-user totals over a flat transfer list.
//!
//! Stateless: recomputed on every data refresh. A deposit credits only the
//! receiver's counter and a withdrawal debits only the sender's — the
//! counterpart account is untouched in that record. The asymmetry is the
//! backend's accounting model and is preserved as-is.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;

use crate::types::transfer::{TransferKind, TransferRecord};

/// Username a withdrawal with no sender identity is attributed to. Records
/// are never dropped for incomplete identity, so totals stay auditable.
pub const UNKNOWN_SENDER: &str = "Unknown Sender";

/// Username a deposit with no receiver identity is attributed to.
pub const UNKNOWN_RECEIVER: &str = "Unknown Receiver";

/// Currency label used when no record carries one.
pub const DEFAULT_CURRENCY: &str = "TND";

/// One output row: totals for a single username.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub username: String,
    pub deposits: Decimal,
    pub withdrawals: Decimal,
    pub net: Decimal,
    pub currency: String,
    pub last_date: Option<String>,
}

#[derive(Default)]
struct Accumulator {
    deposits: Decimal,
    withdrawals: Decimal,
    currency: Option<String>,
    last_date: Option<String>,
}

impl Accumulator {
    fn touch(&mut self, record: &TransferRecord) {
        if self.currency.is_none() {
            self.currency = record.currency.clone();
        }
        if let Some(date) = &record.date {
            let newer = match &self.last_date {
                Some(current) => is_after(date, current),
                None => true,
            };
            if newer {
                self.last_date = Some(date.clone());
            }
        }
    }
}

/// Single pass over `records`, one [`SummaryRow`] per distinct username.
///
/// Output order is unspecified by the aggregation itself (it happens to be
/// username order); callers apply their own sort.
pub fn summarize(records: &[TransferRecord]) -> Vec<SummaryRow> {
    let mut totals: BTreeMap<String, Accumulator> = BTreeMap::new();

    for record in records {
        let (username, is_deposit) = match record.kind {
            TransferKind::Deposit => (
                record.receiver_username().unwrap_or(UNKNOWN_RECEIVER),
                true,
            ),
            TransferKind::Withdraw => (record.sender_username().unwrap_or(UNKNOWN_SENDER), false),
        };

        let acc = totals.entry(username.to_string()).or_default();
        if is_deposit {
            acc.deposits += record.amount;
        } else {
            acc.withdrawals += record.amount;
        }
        acc.touch(record);
    }

    totals
        .into_iter()
        .map(|(username, acc)| SummaryRow {
            username,
            deposits: acc.deposits,
            withdrawals: acc.withdrawals,
            net: acc.deposits - acc.withdrawals,
            currency: acc.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            last_date: acc.last_date,
        })
        .collect()
}

// --- Presentation helpers ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Current sort column and direction. Re-selecting the active column flips
/// the direction; selecting another resets to ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<K> {
    pub key: K,
    pub direction: SortDirection,
}

impl<K: PartialEq + Copy> SortState<K> {
    pub fn new(key: K) -> Self {
        Self {
            key,
            direction: SortDirection::Ascending,
        }
    }

    pub fn toggle(&mut self, key: K) {
        if self.key == key {
            self.direction = match self.direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Ascending,
            };
        } else {
            self.key = key;
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn ascending(&self) -> bool {
        self.direction == SortDirection::Ascending
    }
}

/// Sort keys for summary rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySortKey {
    Username,
    Deposits,
    Withdrawals,
    Net,
}

pub fn sort_rows(rows: &mut [SummaryRow], sort: SortState<SummarySortKey>) {
    rows.sort_by(|a, b| {
        let ordering = match sort.key {
            SummarySortKey::Username => a.username.cmp(&b.username),
            SummarySortKey::Deposits => a.deposits.cmp(&b.deposits),
            SummarySortKey::Withdrawals => a.withdrawals.cmp(&b.withdrawals),
            SummarySortKey::Net => a.net.cmp(&b.net),
        };
        if sort.ascending() {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

/// Case-insensitive substring filter on username.
pub fn filter_rows(rows: Vec<SummaryRow>, query: &str) -> Vec<SummaryRow> {
    if query.is_empty() {
        return rows;
    }
    let needle = query.to_lowercase();
    rows.into_iter()
        .filter(|row| row.username.to_lowercase().contains(&needle))
        .collect()
}

/// Keep records whose date falls inside `[since, until]` (inclusive).
/// Applied before aggregation. Records with missing or unparseable dates are
/// kept rather than silently dropped.
pub fn filter_date_range(
    records: &[TransferRecord],
    since: Option<NaiveDate>,
    until: Option<NaiveDate>,
) -> Vec<TransferRecord> {
    if since.is_none() && until.is_none() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| {
            let Some(date) = record.date.as_deref().and_then(parse_date) else {
                return true;
            };
            let day = date.date_naive();
            since.is_none_or(|s| day >= s) && until.is_none_or(|u| day <= u)
        })
        .cloned()
        .collect()
}

fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw).ok()
}

fn is_after(candidate: &str, current: &str) -> bool {
    match (parse_date(candidate), parse_date(current)) {
        (Some(a), Some(b)) => a > b,
        // Unparseable dates fall back to string order, which matches
        // chronological order for the backend's ISO timestamps.
        _ => candidate > current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::transfer::PartyRef;
    use rust_decimal_macros::dec;

    fn party(username: &str) -> Option<PartyRef> {
        Some(PartyRef {
            id: None,
            username: Some(username.to_string()),
        })
    }

    fn record(
        kind: TransferKind,
        sender: Option<PartyRef>,
        receiver: Option<PartyRef>,
        amount: Decimal,
        date: &str,
    ) -> TransferRecord {
        TransferRecord {
            id: None,
            sender,
            receiver,
            amount,
            kind,
            note: None,
            date: Some(date.to_string()),
            currency: None,
            balance_before: None,
            balance_after: None,
        }
    }

    #[test]
    fn test_summarize_worked_example() {
        let records = vec![
            record(
                TransferKind::Deposit,
                party("ops"),
                party("bob"),
                dec!(100),
                "2024-05-01T10:00:00Z",
            ),
            record(
                TransferKind::Withdraw,
                party("bob"),
                party("ops"),
                dec!(30),
                "2024-05-02T10:00:00Z",
            ),
            record(
                TransferKind::Deposit,
                party("ops"),
                party("ann"),
                dec!(50),
                "2024-05-03T10:00:00Z",
            ),
        ];

        let rows = summarize(&records);

        let bob = rows.iter().find(|r| r.username == "bob").unwrap();
        assert_eq!(bob.deposits, dec!(100));
        assert_eq!(bob.withdrawals, dec!(30));
        assert_eq!(bob.net, dec!(70));

        let ann = rows.iter().find(|r| r.username == "ann").unwrap();
        assert_eq!(ann.deposits, dec!(50));
        assert_eq!(ann.withdrawals, dec!(0));
        assert_eq!(ann.net, dec!(50));
    }

    #[test]
    fn test_summarize_only_touches_one_side_per_record() {
        // A deposit to bob must not show up as a withdrawal for ops.
        let records = vec![record(
            TransferKind::Deposit,
            party("ops"),
            party("bob"),
            dec!(100),
            "2024-05-01T10:00:00Z",
        )];
        let rows = summarize(&records);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].username, "bob");
    }

    #[test]
    fn test_missing_sender_goes_to_unknown() {
        let records = vec![record(
            TransferKind::Withdraw,
            None,
            party("ops"),
            dec!(20),
            "2024-05-01T10:00:00Z",
        )];
        let rows = summarize(&records);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].username, UNKNOWN_SENDER);
        assert_eq!(rows[0].withdrawals, dec!(20));
        assert_eq!(rows[0].net, dec!(-20));
    }

    #[test]
    fn test_missing_receiver_goes_to_unknown() {
        let records = vec![record(
            TransferKind::Deposit,
            party("ops"),
            None,
            dec!(15),
            "2024-05-01T10:00:00Z",
        )];
        let rows = summarize(&records);
        assert_eq!(rows[0].username, UNKNOWN_RECEIVER);
        assert_eq!(rows[0].deposits, dec!(15));
    }

    #[test]
    fn test_no_record_is_dropped() {
        // Mix of complete and identity-less records: every one contributes.
        let records = vec![
            record(
                TransferKind::Deposit,
                party("ops"),
                party("bob"),
                dec!(10),
                "2024-05-01T10:00:00Z",
            ),
            record(TransferKind::Withdraw, None, None, dec!(20), "2024-05-01T11:00:00Z"),
            record(TransferKind::Deposit, None, None, dec!(30), "2024-05-01T12:00:00Z"),
        ];
        let rows = summarize(&records);
        let total: Decimal = rows.iter().map(|r| r.deposits + r.withdrawals).sum();
        assert_eq!(total, dec!(60));
    }

    #[test]
    fn test_last_date_is_most_recent() {
        let records = vec![
            record(
                TransferKind::Deposit,
                party("ops"),
                party("bob"),
                dec!(10),
                "2024-05-03T10:00:00Z",
            ),
            record(
                TransferKind::Deposit,
                party("ops"),
                party("bob"),
                dec!(10),
                "2024-05-01T10:00:00Z",
            ),
        ];
        let rows = summarize(&records);
        assert_eq!(rows[0].last_date.as_deref(), Some("2024-05-03T10:00:00Z"));
    }

    #[test]
    fn test_sort_toggle_flips_direction() {
        let mut sort = SortState::new(SummarySortKey::Net);
        assert!(sort.ascending());
        sort.toggle(SummarySortKey::Net);
        assert!(!sort.ascending());
        sort.toggle(SummarySortKey::Net);
        assert!(sort.ascending());
    }

    #[test]
    fn test_sort_toggle_new_key_resets_ascending() {
        let mut sort = SortState::new(SummarySortKey::Username);
        sort.toggle(SummarySortKey::Username); // descending
        sort.toggle(SummarySortKey::Deposits);
        assert_eq!(sort.key, SummarySortKey::Deposits);
        assert!(sort.ascending());
    }

    #[test]
    fn test_sort_rows_by_net_descending() {
        let mut rows = summarize(&[
            record(
                TransferKind::Deposit,
                party("ops"),
                party("ann"),
                dec!(50),
                "2024-05-01T10:00:00Z",
            ),
            record(
                TransferKind::Deposit,
                party("ops"),
                party("bob"),
                dec!(100),
                "2024-05-01T10:00:00Z",
            ),
        ]);
        let mut sort = SortState::new(SummarySortKey::Net);
        sort.toggle(SummarySortKey::Net);
        sort_rows(&mut rows, sort);
        assert_eq!(rows[0].username, "bob");
    }

    #[test]
    fn test_filter_rows_substring_case_insensitive() {
        let rows = summarize(&[
            record(
                TransferKind::Deposit,
                party("ops"),
                party("Bobby"),
                dec!(1),
                "2024-05-01T10:00:00Z",
            ),
            record(
                TransferKind::Deposit,
                party("ops"),
                party("ann"),
                dec!(1),
                "2024-05-01T10:00:00Z",
            ),
        ]);
        let filtered = filter_rows(rows, "bob");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].username, "Bobby");
    }

    #[test]
    fn test_filter_date_range_keeps_unparseable() {
        let mut records = vec![
            record(
                TransferKind::Deposit,
                party("ops"),
                party("bob"),
                dec!(1),
                "2024-05-01T10:00:00Z",
            ),
            record(
                TransferKind::Deposit,
                party("ops"),
                party("ann"),
                dec!(1),
                "2024-06-01T10:00:00Z",
            ),
        ];
        records[0].date = Some("not-a-date".into());

        let since = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        let kept = filter_date_range(&records, Some(since), None);
        // "not-a-date" is kept, the 2024-06-01 record passes the bound.
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_filter_date_range_inclusive_bounds() {
        let records = vec![record(
            TransferKind::Deposit,
            party("ops"),
            party("bob"),
            dec!(1),
            "2024-05-01T23:59:00Z",
        )];
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(filter_date_range(&records, Some(day), Some(day)).len(), 1);
    }
}
