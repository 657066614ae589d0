use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a balance movement from the backend's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferKind {
    Deposit,
    Withdraw,
}

impl std::fmt::Display for TransferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferKind::Deposit => write!(f, "deposit"),
            TransferKind::Withdraw => write!(f, "withdraw"),
        }
    }
}

/// One side of a transfer. The backend sometimes omits the party entirely,
/// sometimes sends a bare id with no username.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyRef {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// A transfer as returned by the history endpoints. Read-only on this side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub sender: Option<PartyRef>,
    #[serde(default)]
    pub receiver: Option<PartyRef>,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransferKind,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub balance_before: Option<Decimal>,
    #[serde(default)]
    pub balance_after: Option<Decimal>,
}

impl TransferRecord {
    pub fn sender_username(&self) -> Option<&str> {
        self.sender.as_ref()?.username.as_deref()
    }

    pub fn receiver_username(&self) -> Option<&str> {
        self.receiver.as_ref()?.username.as_deref()
    }
}
