pub mod api;
pub mod transfer;
pub mod user;

pub use api::{
    ApiFailure, BalanceEnvelope, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
    SubtreeEnvelope, TransferData, TransferHistoryEnvelope, TransferRequest, TransferResponse,
    TransfersEnvelope, UpdateResponse, UpdateUserRequest, UserEnvelope, UsersEnvelope,
};
pub use transfer::{PartyRef, TransferKind, TransferRecord};
pub use user::{validate_username, CreatorInfo, Role, UserRecord};
