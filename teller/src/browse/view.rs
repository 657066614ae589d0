//! Rendering for the tree browser.
//!
//! The tree flattens to visible rows first (pre-order, children shown only
//! under expanded parents), then draws as plain lines; popups overlay the
//! tree pane for the context menu and modal forms.

use cashtree::{node_count, UserNode, MAX_TREE_DEPTH};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::forms::{Modal, TransferForm, QUICK_AMOUNTS};
use super::state::{MenuAction, TreeUiState};
use super::App;
use crate::output::{format_date, short_id};

/// One row of the flattened tree.
#[derive(Debug)]
pub struct VisibleRow<'a> {
    pub node: &'a UserNode,
    pub depth: usize,
}

/// Pre-order flatten honoring the expansion set. Children render only while
/// their parent is expanded; depth is capped defensively.
pub fn visible_rows<'a>(tree: &'a UserNode, ui: &TreeUiState) -> Vec<VisibleRow<'a>> {
    let mut rows = Vec::new();
    let mut stack = vec![(tree, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        rows.push(VisibleRow { node, depth });
        if depth < MAX_TREE_DEPTH && ui.is_expanded(&node.id) {
            for child in node.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
    }
    rows
}

/// Render the full browser frame.
pub fn render_ui(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(5),    // body
            Constraint::Length(3), // status
        ])
        .split(area);

    let header_text = format!(
        " CASHTREE BROWSER - {} | enter select/expand, m menu, r refresh, q quit",
        app.operator,
    );
    let header = Paragraph::new(header_text)
        .style(Style::default().fg(Color::White).bg(Color::Blue).bold())
        .alignment(Alignment::Center);
    frame.render_widget(header, main_layout[0]);

    let body_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(main_layout[1]);

    render_tree(frame, body_layout[0], app);
    render_details(frame, body_layout[1], app);
    render_status(frame, main_layout[2], app);

    if app.ui.menu_owner().is_some() {
        render_menu(frame, body_layout[0], app.menu_cursor);
    }
    if let Some(modal) = &app.modal {
        render_modal(frame, area, modal, app);
    }
}

fn render_tree(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines: Vec<Line> = Vec::new();

    match &app.tree {
        Some(tree) => {
            let rows = visible_rows(tree, &app.ui);
            let height = area.height.saturating_sub(2) as usize;
            let first = scroll_offset(app.cursor, rows.len(), height);

            for (index, row) in rows.iter().enumerate().skip(first).take(height) {
                let marker = if row.node.is_leaf() {
                    "· "
                } else if app.ui.is_expanded(&row.node.id) {
                    "▾ "
                } else {
                    "▸ "
                };
                let menu_hint = if app.ui.is_menu_open(&row.node.id) {
                    " ⋯"
                } else {
                    ""
                };
                let text = format!(
                    "{}{marker}{} [{}] {} TND{menu_hint}",
                    "  ".repeat(row.depth),
                    row.node.username,
                    row.node.role,
                    row.node.balance,
                );

                let mut style = Style::default();
                if app.ui.selected() == Some(row.node.id.as_str()) {
                    style = style.fg(Color::Cyan).bold();
                }
                if index == app.cursor {
                    style = style.bg(Color::DarkGray);
                }
                lines.push(Line::styled(text, style));
            }
        }
        None => lines.push(Line::from(if app.loading {
            "loading..."
        } else {
            "no users under this creator"
        })),
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Users ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// First visible row so the cursor stays on screen.
fn scroll_offset(cursor: usize, total: usize, height: usize) -> usize {
    if height == 0 || total <= height {
        0
    } else if cursor < height / 2 {
        0
    } else {
        (cursor - height / 2).min(total - height)
    }
}

fn render_details(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines: Vec<Line> = Vec::new();

    let selected = app
        .tree
        .as_ref()
        .zip(app.ui.selected())
        .and_then(|(tree, id)| cashtree::find_node(tree, id));

    match selected {
        Some(node) => {
            lines.push(Line::from(format!(" Id        {}", short_id(&node.id))));
            lines.push(Line::from(format!(" Username  {}", node.username)));
            lines.push(Line::from(format!(" Role      {}", node.role)));
            lines.push(Line::from(format!(" Balance   {} TND", node.balance)));
            if let Some(created) = &node.created_at {
                lines.push(Line::from(format!(" Created   {}", format_date(created))));
            }
            lines.push(Line::from(format!(
                " Creations {} direct, {} total",
                node.children.len(),
                node_count(node) - 1,
            )));
        }
        None => lines.push(Line::from(" select a user")),
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Details ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let (text, color) = match (&app.status, app.loading) {
        (_, true) => (" working...".to_string(), Color::Yellow),
        (Some((message, is_error)), _) => {
            (format!(" {message}"), if *is_error { Color::Red } else { Color::Green })
        }
        (None, _) => (String::new(), Color::DarkGray),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Status ");
    frame.render_widget(
        Paragraph::new(Line::styled(text, Style::default().fg(color)))
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn render_menu(frame: &mut Frame, area: Rect, cursor: usize) {
    let popup = centered_rect(area, 30, (MenuAction::ALL.len() + 2) as u16);
    let lines: Vec<Line> = MenuAction::ALL
        .iter()
        .enumerate()
        .map(|(index, action)| {
            let style = if index == cursor {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default()
            };
            Line::styled(format!(" {} ", action.label()), style)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Actions ");
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn render_modal(frame: &mut Frame, area: Rect, modal: &Modal, app: &App) {
    let (title, lines) = match modal {
        Modal::Update(form) => (
            " Edit user ",
            vec![
                field_line("Username", &form.username.display(), form.focus == 0),
                field_line("Password", &form.password.display(), form.focus == 1),
                field_line("Role", form.role().as_str(), form.focus == 2),
                Line::from(""),
                Line::from(" tab next field, ←/→ role, enter save, esc cancel"),
            ],
        ),
        Modal::Transfer(form) => (" Transfer funds ", transfer_lines(form)),
        Modal::AddChild(form) => (
            " Add sub-account ",
            vec![
                field_line("Username", &form.username.display(), form.focus == 0),
                field_line("Password", &form.password.display(), form.focus == 1),
                field_line("Role", form.role().as_str(), form.focus == 2),
                Line::from(""),
                Line::from(" tab next field, ←/→ role, enter create, esc cancel"),
            ],
        ),
        Modal::ConfirmDelete => {
            let username = app
                .selected_node()
                .map(|n| n.username.clone())
                .unwrap_or_default();
            (
                " Delete user ",
                vec![
                    Line::from(format!(" Delete {username}? This cannot be undone.")),
                    Line::from(""),
                    Line::from(" y confirm, esc cancel"),
                ],
            )
        }
    };

    let popup = centered_rect(area, 52, (lines.len() + 2) as u16);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(title);
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn transfer_lines(form: &TransferForm) -> Vec<Line<'static>> {
    let presets = QUICK_AMOUNTS
        .iter()
        .enumerate()
        .map(|(index, amount)| {
            if form.quick_index == Some(index) {
                format!("[{amount}]")
            } else {
                format!(" {amount} ")
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    vec![
        Line::from(format!(" Direction  {}   (←/→ to switch)", form.kind)),
        field_line("Amount", &form.amount.display(), true),
        Line::from(format!(" Presets    {presets}   (↑/↓ to cycle)")),
        Line::from(""),
        Line::from(" enter submit, esc cancel"),
    ]
}

fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let marker = if focused { ">" } else { " " };
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Line::styled(format!("{marker} {label:<9} {value}"), style)
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashtree::build_tree;
    use serde_json::json;

    fn tree() -> UserNode {
        build_tree(&json!({
            "_id": "r",
            "username": "root_op",
            "children": [
                { "_id": "a", "username": "alice", "children": [
                    { "_id": "c", "username": "carol" }
                ]},
                { "_id": "b", "username": "bobby" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_visible_rows_root_expanded_only() {
        let tree = tree();
        let ui = TreeUiState::new("r");
        let rows = visible_rows(&tree, &ui);
        // Root expanded, alice collapsed: carol hidden.
        let names: Vec<&str> = rows.iter().map(|r| r.node.username.as_str()).collect();
        assert_eq!(names, vec!["root_op", "alice", "bobby"]);
        assert_eq!(rows[1].depth, 1);
    }

    #[test]
    fn test_visible_rows_expanding_reveals_children_in_order() {
        let tree = tree();
        let mut ui = TreeUiState::new("r");
        ui.toggle_expanded("a");
        let names: Vec<&str> = visible_rows(&tree, &ui)
            .iter()
            .map(|r| r.node.username.as_str())
            .collect();
        assert_eq!(names, vec!["root_op", "alice", "carol", "bobby"]);
    }

    #[test]
    fn test_visible_rows_collapsed_root_is_single_row() {
        let tree = tree();
        let mut ui = TreeUiState::new("r");
        ui.toggle_expanded("r");
        assert_eq!(visible_rows(&tree, &ui).len(), 1);
    }

    #[test]
    fn test_scroll_offset_keeps_cursor_visible() {
        assert_eq!(scroll_offset(0, 100, 10), 0);
        assert_eq!(scroll_offset(50, 100, 10), 45);
        assert_eq!(scroll_offset(99, 100, 10), 90);
        assert_eq!(scroll_offset(5, 8, 10), 0);
    }
}
