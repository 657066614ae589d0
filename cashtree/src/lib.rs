pub mod client;
pub mod config;
pub mod error;
pub mod rest;
pub mod summary;
pub mod tree;
pub mod types;

// ---- Top-level re-exports for ergonomic usage ----

// Client
pub use client::{AuthSession, Cashtree};
pub use config::CashtreeConfig;
pub use error::{CashtreeError, Result};

// REST client
pub use rest::CashtreeHttpClient;

// Core enums
pub use types::{Role, TransferKind};

// User + transfer records
pub use types::{CreatorInfo, PartyRef, TransferRecord, UserRecord};

// Requests + envelopes
pub use types::{
    LoginResponse, MessageResponse, RegisterRequest, TransferRequest, TransferResponse,
    UpdateResponse, UpdateUserRequest,
};

// Hierarchy model
pub use tree::{build_tree, find_node, node_count, replace_node, NodePatch, UserNode, MAX_TREE_DEPTH};

// Aggregation
pub use summary::{
    filter_date_range, filter_rows, sort_rows, summarize, SortDirection, SortState, SummaryRow,
    SummarySortKey, DEFAULT_CURRENCY, UNKNOWN_RECEIVER, UNKNOWN_SENDER,
};

// Validation
pub use types::validate_username;
