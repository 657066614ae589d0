use clap::{Parser, Subcommand};

use cashtree::Role;
use crate::output::UserSortKey;

/// teller — operator console for the Cashtree backend.
#[derive(Parser, Debug)]
#[command(name = "teller", version)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Backend base URL (overrides CASHTREE_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and persist the session
    Login(LoginArgs),

    /// Forget the persisted session
    Logout,

    /// Show the logged-in operator
    Whoami,

    /// Register a sub-account
    Register(RegisterArgs),

    /// List all visible accounts
    Users(UsersArgs),

    /// Browse the user tree interactively
    Browse(BrowseArgs),

    /// Interactive transfer history
    History(HistoryArgs),

    /// Interactive per-user transaction totals
    Totals(TotalsArgs),
}

/// Arguments for the `login` subcommand.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// Operator username
    pub username: String,

    /// Password (falls back to TELLER_PASSWORD)
    #[arg(long)]
    pub password: Option<String>,
}

/// Arguments for the `register` subcommand.
#[derive(Parser, Debug)]
pub struct RegisterArgs {
    /// Username for the new account
    pub username: String,

    /// Role for the new account (SuperAdmin, Admin, Partner, Assistant, User)
    #[arg(long)]
    pub role: Role,

    /// Initial password (falls back to TELLER_PASSWORD)
    #[arg(long)]
    pub password: Option<String>,

    /// Creator account id (defaults to the logged-in operator)
    #[arg(long)]
    pub creator: Option<String>,
}

/// Arguments for the `users` subcommand.
#[derive(Parser, Debug)]
pub struct UsersArgs {
    /// Sort column (username, role, balance, created)
    #[arg(long, default_value = "username")]
    pub sort: UserSortKey,

    /// Sort descending instead of ascending
    #[arg(long)]
    pub desc: bool,

    /// Substring filter on username
    #[arg(long)]
    pub search: Option<String>,

    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Rows per page
    #[arg(long, default_value = "10")]
    pub per_page: usize,

    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `browse` subcommand.
#[derive(Parser, Debug)]
pub struct BrowseArgs {
    /// Root account id to browse (defaults to the logged-in operator)
    #[arg(long)]
    pub root: Option<String>,
}

/// Arguments for the `history` subcommand.
#[derive(Parser, Debug)]
pub struct HistoryArgs {
    /// Only transfers involving this username
    #[arg(long)]
    pub username: Option<String>,

    /// Only transfers on this date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,
}

/// Arguments for the `totals` subcommand.
#[derive(Parser, Debug)]
pub struct TotalsArgs {
    /// Ignore transfers before this date (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,

    /// Ignore transfers after this date (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<String>,

    /// Initial substring filter on username
    #[arg(long)]
    pub search: Option<String>,
}
