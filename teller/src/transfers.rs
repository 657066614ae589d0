//! Interactive transfer views: raw history and per-user totals.
//!
//! Data is fetched once per view mount; sorting, searching, and paging are
//! all local. Sort keys toggle direction when pressed twice, matching the
//! column-header behavior of the tables this replaces.

use std::time::Duration;

use cashtree::summary::{
    filter_date_range, filter_rows, sort_rows, summarize, SortState, SummaryRow, SummarySortKey,
};
use cashtree::{TransferKind, TransferRecord};
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::{HistoryArgs, TotalsArgs};
use crate::client;
use crate::error::TellerError;
use crate::output::format_date;
use crate::term::{restore_terminal, setup_terminal};

/// Target render interval (10 FPS).
const RENDER_INTERVAL: Duration = Duration::from_millis(100);

const PER_PAGE_OPTIONS: [usize; 4] = [10, 25, 50, 100];

/// Sortable history columns, in on-screen order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryColumn {
    Date,
    Sender,
    Receiver,
    Kind,
    Amount,
    BalanceBefore,
    BalanceAfter,
}

impl HistoryColumn {
    const ALL: [HistoryColumn; 7] = [
        HistoryColumn::Date,
        HistoryColumn::Sender,
        HistoryColumn::Receiver,
        HistoryColumn::Kind,
        HistoryColumn::Amount,
        HistoryColumn::BalanceBefore,
        HistoryColumn::BalanceAfter,
    ];
}

/// Stable sort of history records by one column.
pub fn sort_history(records: &mut [TransferRecord], sort: SortState<HistoryColumn>) {
    records.sort_by(|a, b| {
        let ordering = match sort.key {
            HistoryColumn::Date => a.date.cmp(&b.date),
            HistoryColumn::Sender => a.sender_username().cmp(&b.sender_username()),
            HistoryColumn::Receiver => a.receiver_username().cmp(&b.receiver_username()),
            HistoryColumn::Kind => kind_rank(a.kind).cmp(&kind_rank(b.kind)),
            HistoryColumn::Amount => a.amount.cmp(&b.amount),
            HistoryColumn::BalanceBefore => a.balance_before.cmp(&b.balance_before),
            HistoryColumn::BalanceAfter => a.balance_after.cmp(&b.balance_after),
        };
        if sort.ascending() {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

fn kind_rank(kind: TransferKind) -> u8 {
    match kind {
        TransferKind::Deposit => 0,
        TransferKind::Withdraw => 1,
    }
}

/// Keep records where either party's username contains `query`.
pub fn filter_history(records: &[TransferRecord], query: &str) -> Vec<TransferRecord> {
    if query.is_empty() {
        return records.to_vec();
    }
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| {
            let hit = |name: Option<&str>| {
                name.map(|n| n.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            };
            hit(record.sender_username()) || hit(record.receiver_username())
        })
        .cloned()
        .collect()
}

enum Mode {
    History,
    Totals,
}

struct TransfersApp {
    mode: Mode,
    records: Vec<TransferRecord>,
    search: String,
    searching: bool,
    history_sort: SortState<HistoryColumn>,
    totals_sort: SortState<SummarySortKey>,
    page: usize,
    per_page_index: usize,
    quit: bool,
}

impl TransfersApp {
    fn new(mode: Mode, records: Vec<TransferRecord>, search: String) -> Self {
        Self {
            mode,
            records,
            search,
            searching: false,
            history_sort: SortState::new(HistoryColumn::Date),
            totals_sort: SortState::new(SummarySortKey::Username),
            page: 0,
            per_page_index: 0,
            quit: false,
        }
    }

    fn per_page(&self) -> usize {
        PER_PAGE_OPTIONS[self.per_page_index]
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.searching {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => self.searching = false,
                KeyCode::Backspace => {
                    self.search.pop();
                    self.page = 0;
                }
                KeyCode::Char(c) => {
                    self.search.push(c);
                    self.page = 0;
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Left => self.page = self.page.saturating_sub(1),
            KeyCode::Right => self.page += 1, // clamped at render
            KeyCode::Char('p') => {
                self.per_page_index = (self.per_page_index + 1) % PER_PAGE_OPTIONS.len();
                self.page = 0;
            }
            KeyCode::Char(c @ '1'..='7') => {
                let index = (c as usize) - ('1' as usize);
                match self.mode {
                    Mode::History => {
                        if let Some(column) = HistoryColumn::ALL.get(index) {
                            self.history_sort.toggle(*column);
                        }
                    }
                    Mode::Totals => {
                        let keys = [
                            SummarySortKey::Username,
                            SummarySortKey::Deposits,
                            SummarySortKey::Withdrawals,
                            SummarySortKey::Net,
                        ];
                        if let Some(key) = keys.get(index) {
                            self.totals_sort.toggle(*key);
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

/// Run the raw transfer-history view.
pub async fn run_history(
    args: HistoryArgs,
    api_url: Option<String>,
    cancel: CancellationToken,
) -> Result<(), TellerError> {
    let teller = client::connect_authenticated(api_url)?;
    let records = if args.username.is_some() || args.date.is_some() {
        teller
            .api
            .transfer_history(args.username.as_deref(), args.date.as_deref())
            .await?
    } else {
        teller.api.all_transfers().await?
    };
    info!(count = records.len(), "transfer history loaded");

    let app = TransfersApp::new(Mode::History, records, String::new());
    run_view(app, cancel).await
}

/// Run the per-user totals view.
pub async fn run_totals(
    args: TotalsArgs,
    api_url: Option<String>,
    cancel: CancellationToken,
) -> Result<(), TellerError> {
    let teller = client::connect_authenticated(api_url)?;
    let records = teller.api.all_transfers().await?;

    let since = parse_day(args.since.as_deref())?;
    let until = parse_day(args.until.as_deref())?;
    let records = filter_date_range(&records, since, until);
    info!(count = records.len(), "transfers loaded for totals");

    let app = TransfersApp::new(Mode::Totals, records, args.search.unwrap_or_default());
    run_view(app, cancel).await
}

fn parse_day(raw: Option<&str>) -> Result<Option<NaiveDate>, TellerError> {
    raw.map(|value| {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| TellerError::Config(format!("invalid date (want YYYY-MM-DD): {value}")))
    })
    .transpose()
}

async fn run_view(mut app: TransfersApp, cancel: CancellationToken) -> Result<(), TellerError> {
    let mut terminal = setup_terminal()?;
    let mut render_interval = tokio::time::interval(RENDER_INTERVAL);

    let result = loop {
        if app.quit {
            break Ok(());
        }

        tokio::select! {
            _ = render_interval.tick() => {
                while event::poll(Duration::ZERO).unwrap_or(false) {
                    if let Ok(Event::Key(key)) = event::read() {
                        if key.kind == KeyEventKind::Press {
                            app.on_key(key);
                        }
                    }
                }

                if !app.quit {
                    let _ = terminal.draw(|frame| render_ui(frame, &mut app));
                }
            }

            _ = cancel.cancelled() => {
                break Ok(());
            }
        }
    };

    restore_terminal(&mut terminal);
    result
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render_ui(frame: &mut Frame, app: &mut TransfersApp) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(area);

    let title = match app.mode {
        Mode::History => " TRANSFER HISTORY | 1-7 sort, / search, ←/→ page, p rows, q quit",
        Mode::Totals => " TRANSACTION TOTALS | 1-4 sort, / search, ←/→ page, p rows, q quit",
    };
    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::White).bg(Color::Blue).bold())
        .alignment(Alignment::Center);
    frame.render_widget(header, layout[0]);

    match app.mode {
        Mode::History => render_history(frame, layout[1], layout[2], app),
        Mode::Totals => render_totals(frame, layout[1], layout[2], app),
    }
}

fn render_history(frame: &mut Frame, table_area: Rect, footer_area: Rect, app: &mut TransfersApp) {
    let mut filtered = filter_history(&app.records, &app.search);
    sort_history(&mut filtered, app.history_sort);

    let pages = page_count(filtered.len(), app.per_page());
    app.page = app.page.min(pages.saturating_sub(1));
    let start = app.page * app.per_page();
    let rows = filtered.iter().skip(start).take(app.per_page());

    let mut lines = vec![
        Line::from(format!(
            " {} {:<20} {:<14} {:<14} {:<9} {:>10} {:>12} {:>12}",
            sort_marker(app.history_sort),
            "DATE",
            "FROM",
            "TO",
            "TYPE",
            "AMOUNT",
            "BEFORE",
            "AFTER",
        )),
        Line::from(" ".to_string() + &"─".repeat(100)),
    ];

    for record in rows {
        let date = record.date.as_deref().map(format_date).unwrap_or_default();
        let color = match record.kind {
            TransferKind::Deposit => Color::Green,
            TransferKind::Withdraw => Color::Red,
        };
        lines.push(Line::styled(
            format!(
                "   {:<20} {:<14} {:<14} {:<9} {:>10} {:>12} {:>12}",
                date,
                record.sender_username().unwrap_or("-"),
                record.receiver_username().unwrap_or("-"),
                record.kind,
                record.amount,
                optional_amount(record.balance_before),
                optional_amount(record.balance_after),
            ),
            Style::default().fg(color),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Transfers ");
    frame.render_widget(Paragraph::new(lines).block(block), table_area);

    let (deposits, withdrawals) = history_totals(&filtered);
    render_footer(
        frame,
        footer_area,
        app,
        format!(
            " {} transfers | deposits {deposits} TND, withdrawals {withdrawals} TND | page {}/{}",
            filtered.len(),
            app.page + 1,
            pages.max(1),
        ),
    );
}

fn render_totals(frame: &mut Frame, table_area: Rect, footer_area: Rect, app: &mut TransfersApp) {
    let mut rows: Vec<SummaryRow> = filter_rows(summarize(&app.records), &app.search);
    sort_rows(&mut rows, app.totals_sort);

    let pages = page_count(rows.len(), app.per_page());
    app.page = app.page.min(pages.saturating_sub(1));
    let start = app.page * app.per_page();

    let mut lines = vec![
        Line::from(format!(
            " {} {:<20} {:>14} {:>14} {:>14} {:<4} {:<20}",
            sort_marker(app.totals_sort),
            "USERNAME",
            "DEPOSITS",
            "WITHDRAWALS",
            "NET",
            "CUR",
            "LAST ACTIVITY",
        )),
        Line::from(" ".to_string() + &"─".repeat(94)),
    ];

    for row in rows.iter().skip(start).take(app.per_page()) {
        let color = if row.net < Decimal::ZERO {
            Color::Red
        } else {
            Color::Green
        };
        lines.push(Line::styled(
            format!(
                "   {:<20} {:>14} {:>14} {:>14} {:<4} {:<20}",
                row.username,
                row.deposits,
                row.withdrawals,
                row.net,
                row.currency,
                row.last_date.as_deref().map(format_date).unwrap_or_default(),
            ),
            Style::default().fg(color),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Totals per user ");
    frame.render_widget(Paragraph::new(lines).block(block), table_area);

    render_footer(
        frame,
        footer_area,
        app,
        format!(
            " {} users | page {}/{}",
            rows.len(),
            app.page + 1,
            pages.max(1),
        ),
    );
}

fn render_footer(frame: &mut Frame, area: Rect, app: &TransfersApp, summary: String) {
    let search = if app.searching {
        format!(" search: {}_", app.search)
    } else if app.search.is_empty() {
        String::new()
    } else {
        format!(" search: {}", app.search)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Status ");
    frame.render_widget(
        Paragraph::new(Line::from(format!("{summary}{search}"))).block(block),
        area,
    );
}

fn sort_marker<K: PartialEq + Copy>(sort: SortState<K>) -> &'static str {
    if sort.ascending() {
        "↑"
    } else {
        "↓"
    }
}

fn optional_amount(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

fn history_totals(records: &[TransferRecord]) -> (Decimal, Decimal) {
    let mut deposits = Decimal::ZERO;
    let mut withdrawals = Decimal::ZERO;
    for record in records {
        match record.kind {
            TransferKind::Deposit => deposits += record.amount,
            TransferKind::Withdraw => withdrawals += record.amount,
        }
    }
    (deposits, withdrawals)
}

fn page_count(len: usize, per_page: usize) -> usize {
    if per_page == 0 {
        0
    } else {
        len.div_ceil(per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashtree::PartyRef;
    use rust_decimal_macros::dec;

    fn record(sender: &str, receiver: &str, kind: TransferKind, amount: Decimal, date: &str) -> TransferRecord {
        TransferRecord {
            id: None,
            sender: Some(PartyRef {
                id: None,
                username: Some(sender.to_string()),
            }),
            receiver: Some(PartyRef {
                id: None,
                username: Some(receiver.to_string()),
            }),
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
    fn test_sort_history_by_amount_descending() {
        let mut records = vec![
            record("ops", "ann", TransferKind::Deposit, dec!(5), "2024-05-01T00:00:00Z"),
            record("ops", "bob", TransferKind::Deposit, dec!(50), "2024-05-02T00:00:00Z"),
        ];
        let mut sort = SortState::new(HistoryColumn::Amount);
        sort.toggle(HistoryColumn::Amount);
        sort_history(&mut records, sort);
        assert_eq!(records[0].receiver_username(), Some("bob"));
    }

    #[test]
    fn test_sort_history_by_date_ascending_is_default() {
        let mut records = vec![
            record("ops", "ann", TransferKind::Deposit, dec!(5), "2024-05-02T00:00:00Z"),
            record("ops", "bob", TransferKind::Deposit, dec!(5), "2024-05-01T00:00:00Z"),
        ];
        sort_history(&mut records, SortState::new(HistoryColumn::Date));
        assert_eq!(records[0].receiver_username(), Some("bob"));
    }

    #[test]
    fn test_filter_history_matches_either_party() {
        let records = vec![
            record("ops", "ann", TransferKind::Deposit, dec!(5), "2024-05-01T00:00:00Z"),
            record("bob", "ops", TransferKind::Withdraw, dec!(5), "2024-05-01T00:00:00Z"),
            record("carl", "dave", TransferKind::Deposit, dec!(5), "2024-05-01T00:00:00Z"),
        ];
        let hits = filter_history(&records, "ops");
        assert_eq!(hits.len(), 2);
        assert!(filter_history(&records, "").len() == 3);
    }

    #[test]
    fn test_history_totals_split_by_kind() {
        let records = vec![
            record("ops", "ann", TransferKind::Deposit, dec!(100), "2024-05-01T00:00:00Z"),
            record("ann", "ops", TransferKind::Withdraw, dec!(40), "2024-05-01T00:00:00Z"),
        ];
        let (deposits, withdrawals) = history_totals(&records);
        assert_eq!(deposits, dec!(100));
        assert_eq!(withdrawals, dec!(40));
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
    }
}
