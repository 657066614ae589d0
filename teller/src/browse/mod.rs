//! Interactive user-tree browser.
//!
//! One screen: the hierarchy on the left, details of the selected account on
//! the right, a context menu per node, and modal forms for the four actions
//! (edit, transfer, add sub-account, delete).
//!
//! Backend calls run on the tokio runtime and report back over a channel.
//! Each operation is tagged with the tree epoch it was dispatched under; a
//! result that arrives after a refetch or navigation is discarded, so the
//! last *action* wins, never the last response.

pub mod forms;
pub mod state;
pub mod view;

use std::time::Duration;

use cashtree::{
    find_node, replace_node, Cashtree, CashtreeError, MessageResponse, NodePatch, TransferRequest,
    TransferResponse, UpdateResponse, UpdateUserRequest, UserNode, UserRecord,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cli::BrowseArgs;
use crate::client;
use crate::error::TellerError;
use crate::term::{restore_terminal, setup_terminal};
use forms::{AddChildForm, Modal, TransferForm, UpdateForm};
use state::{MenuAction, TreeUiState};

/// Target render interval (10 FPS).
const RENDER_INTERVAL: Duration = Duration::from_millis(100);

/// Browser state shared with the view layer.
pub struct App {
    pub operator: String,
    pub tree: Option<UserNode>,
    pub ui: TreeUiState,
    /// Cursor index into the visible rows.
    pub cursor: usize,
    pub menu_cursor: usize,
    pub modal: Option<Modal>,
    pub loading: bool,
    /// Status-line message and whether it is an error.
    pub status: Option<(String, bool)>,
}

impl App {
    fn new(operator: String, root_id: &str) -> Self {
        Self {
            operator,
            tree: None,
            ui: TreeUiState::new(root_id),
            cursor: 0,
            menu_cursor: 0,
            modal: None,
            loading: false,
            status: None,
        }
    }

    pub fn selected_node(&self) -> Option<&UserNode> {
        let tree = self.tree.as_ref()?;
        find_node(tree, self.ui.selected()?)
    }

    fn ok(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), false));
    }

    fn fail(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), true));
    }
}

/// Result of one backend operation, tagged with its dispatch epoch.
enum OpOutcome {
    Tree(Result<UserNode, CashtreeError>),
    Update(Result<UpdateResponse, CashtreeError>),
    Transfer(Result<TransferResponse, CashtreeError>),
    Register(Result<MessageResponse, CashtreeError>),
    Delete(Result<MessageResponse, CashtreeError>),
}

struct Browser {
    app: App,
    api: Cashtree,
    operator: UserRecord,
    root_id: String,
    tx: mpsc::UnboundedSender<(u64, OpOutcome)>,
    /// Current tree epoch; results from older epochs are stale.
    epoch: u64,
    /// Dispatched-but-unresolved operations. Every dispatch produces exactly
    /// one outcome, stale or not, so this never leaks.
    in_flight: u32,
    quit: bool,
}

/// Run the tree browser until quit or cancellation.
pub async fn run_browser(
    args: BrowseArgs,
    api_url: Option<String>,
    cancel: CancellationToken,
) -> Result<(), TellerError> {
    let teller = client::connect_authenticated(api_url)?;
    let root_id = args.root.unwrap_or_else(|| teller.session.user.id.clone());

    info!(root = %root_id, "starting tree browser");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut browser = Browser {
        app: App::new(teller.session.user.username.clone(), &root_id),
        api: teller.api,
        operator: teller.session.user,
        root_id,
        tx,
        epoch: 0,
        in_flight: 0,
        quit: false,
    };
    browser.dispatch_fetch();

    let mut terminal = setup_terminal()?;
    let mut render_interval = tokio::time::interval(RENDER_INTERVAL);

    let result = loop {
        if browser.quit {
            break Ok(());
        }

        tokio::select! {
            Some((epoch, outcome)) = rx.recv() => {
                browser.on_outcome(epoch, outcome);
            }

            // Render tick — also polls keyboard input.
            _ = render_interval.tick() => {
                while event::poll(Duration::ZERO).unwrap_or(false) {
                    if let Ok(Event::Key(key)) = event::read() {
                        if key.kind == KeyEventKind::Press {
                            browser.on_key(key);
                        }
                    }
                }

                if !browser.quit {
                    let _ = terminal.draw(|frame| view::render_ui(frame, &browser.app));
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

impl Browser {
    // --- Operation dispatch ---

    /// Refetch the whole subtree under a fresh epoch. Anything still in
    /// flight becomes stale.
    fn dispatch_fetch(&mut self) {
        self.epoch += 1;
        let epoch = self.epoch;
        let api = self.api.clone();
        let root_id = self.root_id.clone();
        let tx = self.tx.clone();
        self.begin_op();
        tokio::spawn(async move {
            let result = api.fetch_tree(&root_id).await;
            let _ = tx.send((epoch, OpOutcome::Tree(result)));
        });
    }

    fn dispatch_update(&mut self, request: UpdateUserRequest) {
        let epoch = self.epoch;
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.begin_op();
        tokio::spawn(async move {
            let result = api.update_user(&request).await;
            let _ = tx.send((epoch, OpOutcome::Update(result)));
        });
    }

    fn dispatch_transfer(&mut self, request: TransferRequest) {
        let epoch = self.epoch;
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.begin_op();
        tokio::spawn(async move {
            let result = api.transfer(&request).await;
            let _ = tx.send((epoch, OpOutcome::Transfer(result)));
        });
    }

    fn dispatch_register(&mut self, username: String, password: String, role: cashtree::Role, creator: String) {
        let epoch = self.epoch;
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.begin_op();
        tokio::spawn(async move {
            let result = api.register(&username, &password, role, &creator).await;
            let _ = tx.send((epoch, OpOutcome::Register(result)));
        });
    }

    fn dispatch_delete(&mut self, node_id: String) {
        let epoch = self.epoch;
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.begin_op();
        tokio::spawn(async move {
            let result = api.delete_user(&node_id).await;
            let _ = tx.send((epoch, OpOutcome::Delete(result)));
        });
    }

    fn begin_op(&mut self) {
        self.in_flight += 1;
        self.app.loading = true;
    }

    // --- Outcome handling ---

    fn on_outcome(&mut self, epoch: u64, outcome: OpOutcome) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.app.loading = self.in_flight > 0;

        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "dropping stale result");
            return;
        }

        match outcome {
            OpOutcome::Tree(Ok(tree)) => {
                // Keep expansion/selection across refreshes; drop a selection
                // whose node no longer exists.
                let selection_stale = self
                    .app
                    .ui
                    .selected()
                    .map(|id| find_node(&tree, id).is_none())
                    .unwrap_or(false);
                if selection_stale {
                    self.app.ui.clear_selection();
                }
                let rows = view::visible_rows(&tree, &self.app.ui).len();
                self.app.cursor = self.app.cursor.min(rows.saturating_sub(1));
                self.app.tree = Some(tree);
            }
            OpOutcome::Tree(Err(e)) => self.app.fail(e.to_string()),

            OpOutcome::Update(Ok(response)) => {
                self.app.ok(
                    response
                        .message
                        .clone()
                        .unwrap_or_else(|| "user updated".into()),
                );
                let patched = match (self.app.tree.as_ref(), response.user.as_ref()) {
                    (Some(tree), Some(user)) => {
                        replace_node(tree, &user.id, &NodePatch::from_record(user))
                    }
                    _ => None,
                };
                match patched {
                    Some(tree) => self.app.tree = Some(tree),
                    // Patched a node we no longer know (or the response
                    // carried no record): refetch.
                    None => self.dispatch_fetch(),
                }
            }
            OpOutcome::Update(Err(e)) => self.app.fail(e.to_string()),

            OpOutcome::Transfer(Ok(response)) => {
                self.app.ok(
                    response
                        .message
                        .clone()
                        .unwrap_or_else(|| "transfer completed".into()),
                );
                if !self.patch_balances(&response) {
                    self.dispatch_fetch();
                }
            }
            OpOutcome::Transfer(Err(e)) => self.app.fail(e.to_string()),

            OpOutcome::Register(Ok(response)) => {
                self.app.ok(
                    response
                        .message
                        .unwrap_or_else(|| "user registered".into()),
                );
                // The new account only exists server-side; pull it in.
                self.dispatch_fetch();
            }
            OpOutcome::Register(Err(e)) => self.app.fail(e.to_string()),

            OpOutcome::Delete(Ok(response)) => {
                self.app
                    .ok(response.message.unwrap_or_else(|| "user deleted".into()));
                self.app.ui.clear_selection();
                self.dispatch_fetch();
            }
            OpOutcome::Delete(Err(e)) => self.app.fail(e.to_string()),
        }
    }

    /// Patch both updated balances in place. False means the response did
    /// not carry enough to patch locally and a refetch is needed.
    fn patch_balances(&mut self, response: &TransferResponse) -> bool {
        let Some(tree) = self.app.tree.clone() else {
            return false;
        };
        let (Some(sender), Some(receiver)) =
            (&response.updated_sender, &response.updated_receiver)
        else {
            return false;
        };

        // The operator usually is not part of the browsed subtree; a miss on
        // either side only forces a refetch when the node is actually shown.
        let mut tree = tree;
        for updated in [sender, receiver] {
            if find_node(&tree, &updated.id).is_some() {
                match replace_node(&tree, &updated.id, &NodePatch::balance(updated.balance)) {
                    Some(patched) => tree = patched,
                    None => return false,
                }
            }
        }
        self.app.tree = Some(tree);
        true
    }

    // --- Key handling ---

    fn on_key(&mut self, key: KeyEvent) {
        if self.app.modal.is_some() {
            self.on_modal_key(key);
        } else if self.app.ui.menu_owner().is_some() {
            self.on_menu_key(key);
        } else {
            self.on_tree_key(key);
        }
    }

    fn on_tree_key(&mut self, key: KeyEvent) {
        let rows = match &self.app.tree {
            Some(tree) => view::visible_rows(tree, &self.app.ui)
                .iter()
                .map(|row| (row.node.id.clone(), !row.node.is_leaf()))
                .collect::<Vec<_>>(),
            None => Vec::new(),
        };

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Up => self.app.cursor = self.app.cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.app.cursor + 1 < rows.len() {
                    self.app.cursor += 1;
                }
            }
            KeyCode::Enter => {
                if let Some((id, has_children)) = rows.get(self.app.cursor) {
                    self.app.ui.activate(id, *has_children);
                }
            }
            KeyCode::Char('m') => {
                if let Some((id, _)) = rows.get(self.app.cursor) {
                    self.app.ui.open_menu(id);
                    self.app.menu_cursor = 0;
                }
            }
            KeyCode::Char('r') => self.dispatch_fetch(),
            _ => {}
        }
    }

    fn on_menu_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.app.ui.close_menu(),
            KeyCode::Up => {
                self.app.menu_cursor =
                    (self.app.menu_cursor + MenuAction::ALL.len() - 1) % MenuAction::ALL.len();
            }
            KeyCode::Down => {
                self.app.menu_cursor = (self.app.menu_cursor + 1) % MenuAction::ALL.len();
            }
            KeyCode::Enter => {
                let action = MenuAction::ALL[self.app.menu_cursor];
                // Choosing an option closes the menu before anything else.
                self.app.ui.close_menu();
                self.open_modal(action);
            }
            _ => {}
        }
    }

    /// Map a menu intent to its modal. Opening a modal never performs the
    /// action; submission does.
    fn open_modal(&mut self, action: MenuAction) {
        let Some(node) = self.app.selected_node() else {
            return;
        };
        self.app.modal = Some(match action {
            MenuAction::Update => Modal::Update(UpdateForm::for_node(node)),
            MenuAction::Transfer => Modal::Transfer(TransferForm::new()),
            MenuAction::AddChild => Modal::AddChild(AddChildForm::new()),
            MenuAction::Delete => Modal::ConfirmDelete,
        });
    }

    fn on_modal_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc {
            self.app.modal = None;
            return;
        }

        let Some(mut modal) = self.app.modal.take() else {
            return;
        };

        let submit = key.code == KeyCode::Enter
            || (matches!(modal, Modal::ConfirmDelete) && key.code == KeyCode::Char('y'));

        if submit {
            // The loading flag disables submission; no duplicate concurrent
            // requests from one modal.
            if self.app.loading {
                self.app.modal = Some(modal);
                return;
            }
            self.submit_modal(modal);
            return;
        }

        match &mut modal {
            Modal::Update(form) => match key.code {
                KeyCode::Tab => form.next_focus(),
                KeyCode::Left => form.cycle_role(false),
                KeyCode::Right => form.cycle_role(true),
                KeyCode::Backspace => form.backspace(),
                KeyCode::Char(c) => form.input(c),
                _ => {}
            },
            Modal::Transfer(form) => match key.code {
                KeyCode::Left | KeyCode::Right => form.toggle_kind(),
                KeyCode::Up => form.cycle_quick(false),
                KeyCode::Down => form.cycle_quick(true),
                KeyCode::Backspace => form.backspace(),
                KeyCode::Char(c) => form.input(c),
                _ => {}
            },
            Modal::AddChild(form) => match key.code {
                KeyCode::Tab => form.next_focus(),
                KeyCode::Left => form.cycle_role(false),
                KeyCode::Right => form.cycle_role(true),
                KeyCode::Backspace => form.backspace(),
                KeyCode::Char(c) => form.input(c),
                _ => {}
            },
            Modal::ConfirmDelete => {}
        }
        self.app.modal = Some(modal);
    }

    fn submit_modal(&mut self, modal: Modal) {
        let Some(node_id) = self.app.ui.selected().map(String::from) else {
            return;
        };

        match modal {
            Modal::Update(form) => {
                if let Err(e) = cashtree::validate_username(&form.username.value) {
                    self.app.fail(e.to_string());
                    self.app.modal = Some(Modal::Update(form));
                    return;
                }
                let request = UpdateUserRequest {
                    user_id: node_id,
                    username: Some(form.username.value.clone()),
                    password: (!form.password.value.is_empty())
                        .then(|| form.password.value.clone()),
                    role: Some(form.role()),
                    balance: None,
                };
                self.dispatch_update(request);
            }
            Modal::Transfer(form) => {
                let Some(amount) = form.parsed_amount() else {
                    self.app.fail("enter a positive amount");
                    self.app.modal = Some(Modal::Transfer(form));
                    return;
                };
                let request = TransferRequest {
                    sender_id: self.operator.id.clone(),
                    receiver_id: node_id,
                    amount,
                    kind: form.kind,
                    note: String::new(),
                };
                self.dispatch_transfer(request);
            }
            Modal::AddChild(form) => {
                if let Err(e) = cashtree::validate_username(&form.username.value) {
                    self.app.fail(e.to_string());
                    self.app.modal = Some(Modal::AddChild(form));
                    return;
                }
                if form.password.value.is_empty() {
                    self.app.fail("password must not be empty");
                    self.app.modal = Some(Modal::AddChild(form));
                    return;
                }
                self.dispatch_register(
                    form.username.value.clone(),
                    form.password.value.clone(),
                    form.role(),
                    node_id,
                );
            }
            Modal::ConfirmDelete => self.dispatch_delete(node_id),
        }

        self.app.modal = None;
    }
}

