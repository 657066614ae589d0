//! Plain-stdout rendering for the non-interactive commands.
//!
//! Pure functions over a `Write` target so the table layout is testable
//! without capturing stdout.

use std::io::Write;

use cashtree::{Role, UserRecord};
use chrono::DateTime;
use rust_decimal::Decimal;

use crate::error::TellerError;

/// Sort columns for the users table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSortKey {
    Username,
    Role,
    Balance,
    Created,
}

impl std::str::FromStr for UserSortKey {
    type Err = TellerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "username" => Ok(UserSortKey::Username),
            "role" => Ok(UserSortKey::Role),
            "balance" => Ok(UserSortKey::Balance),
            "created" => Ok(UserSortKey::Created),
            other => Err(TellerError::Config(format!("unknown sort column: {other}"))),
        }
    }
}

pub fn sort_users(users: &mut [UserRecord], key: UserSortKey, descending: bool) {
    users.sort_by(|a, b| {
        let ordering = match key {
            UserSortKey::Username => a.username.cmp(&b.username),
            UserSortKey::Role => a.role.cmp(&b.role),
            UserSortKey::Balance => a.balance.cmp(&b.balance),
            UserSortKey::Created => a.created_at.cmp(&b.created_at),
        };
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

/// Case-insensitive substring filter on username.
pub fn filter_users(users: Vec<UserRecord>, query: &str) -> Vec<UserRecord> {
    if query.is_empty() {
        return users;
    }
    let needle = query.to_lowercase();
    users
        .into_iter()
        .filter(|u| u.username.to_lowercase().contains(&needle))
        .collect()
}

/// 1-based page slice. An out-of-range page yields an empty slice.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    if per_page == 0 || page == 0 {
        return &[];
    }
    let start = (page - 1) * per_page;
    if start >= items.len() {
        return &[];
    }
    let end = (start + per_page).min(items.len());
    &items[start..end]
}

pub fn total_pages(count: usize, per_page: usize) -> usize {
    if per_page == 0 {
        0
    } else {
        count.div_ceil(per_page)
    }
}

/// Short display id: `#` plus the last ten characters.
pub fn short_id(id: &str) -> String {
    let tail: String = id
        .chars()
        .rev()
        .take(10)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("#{tail}")
}

/// Backend timestamps as `dd/mm/yyyy HH:MM:SS`; unparseable values pass
/// through untouched.
pub fn format_date(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(date) => date.format("%d/%m/%Y %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Write the users table with a footer of totals and paging info.
pub fn write_users_table<W: Write>(
    writer: &mut W,
    page_rows: &[UserRecord],
    page: usize,
    pages: usize,
    total_count: usize,
    total_balance: Decimal,
) -> Result<(), TellerError> {
    writeln!(
        writer,
        "{:<12} {:<18} {:<10} {:<20} {:<18} {:>14} {:<4}",
        "ID", "USERNAME", "ROLE", "CREATED", "CREATOR", "BALANCE", "CUR"
    )?;

    for user in page_rows {
        let created = user
            .created_at
            .as_deref()
            .map(format_date)
            .unwrap_or_default();
        let creator = user
            .creator_info
            .as_ref()
            .map(|c| c.username.as_str())
            .unwrap_or("N/A");
        let currency = user.currency.as_deref().unwrap_or("TND");
        writeln!(
            writer,
            "{:<12} {:<18} {:<10} {:<20} {:<18} {:>14} {:<4}",
            short_id(&user.id),
            user.username,
            role_label(user.role),
            created,
            creator,
            user.balance,
            currency,
        )?;
    }

    writeln!(
        writer,
        "\n{total_count} users, total balance {total_balance} TND  (page {page}/{pages})"
    )?;
    Ok(())
}

fn role_label(role: Role) -> &'static str {
    role.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn user(id: &str, username: &str, role: Role, balance: Decimal) -> UserRecord {
        serde_json::from_value(serde_json::json!({
            "_id": id,
            "username": username,
            "role": role.as_str(),
            "balance": balance.to_string(),
            "userdate": "2024-03-01T12:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_paginate_slices_one_based_pages() {
        let items: Vec<u32> = (0..25).collect();
        assert_eq!(paginate(&items, 1, 10), &items[0..10]);
        assert_eq!(paginate(&items, 3, 10), &items[20..25]);
        assert!(paginate(&items, 4, 10).is_empty());
        assert!(paginate(&items, 0, 10).is_empty());
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(30, 10), 3);
        assert_eq!(total_pages(0, 10), 0);
    }

    #[test]
    fn test_sort_users_by_balance_descending() {
        let mut users = vec![
            user("a", "ann", Role::User, dec!(10)),
            user("b", "bob", Role::User, dec!(200)),
        ];
        sort_users(&mut users, UserSortKey::Balance, true);
        assert_eq!(users[0].username, "bob");
    }

    #[test]
    fn test_filter_users_substring() {
        let users = vec![
            user("a", "partner_ann", Role::Partner, dec!(1)),
            user("b", "bob", Role::User, dec!(1)),
        ];
        let filtered = filter_users(users, "ANN");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].username, "partner_ann");
    }

    #[test]
    fn test_short_id_keeps_last_ten() {
        assert_eq!(short_id("64fa000011112222"), "#0011112222");
        assert_eq!(short_id("abc"), "#abc");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-03-01T12:30:45Z"), "01/03/2024 12:30:45");
        assert_eq!(format_date("garbage"), "garbage");
    }

    #[test]
    fn test_users_table_footer() {
        let users = vec![user("a", "ann", Role::User, dec!(10))];
        let mut buf = Vec::new();
        write_users_table(&mut buf, &users, 1, 1, 1, dec!(10)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("ann"));
        assert!(text.contains("1 users, total balance 10 TND"));
    }
}
