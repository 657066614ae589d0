//! The user hierarchy: one account plus the accounts it created, nested.
//!
//! The backend returns whole subtrees in a single fetch. This module turns
//! that payload into [`UserNode`] values and provides the lookups the views
//! need: find-by-id after an in-place mutation, and a pure replace that
//! produces a patched copy without touching the original.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CashtreeError, Result};
use crate::types::user::{Role, UserRecord};

/// Traversal guard. The structure is a tree by backend invariant, but a
/// cyclic or degenerate payload must not recurse without bound.
pub const MAX_TREE_DEPTH: usize = 256;

/// One vertex of the hierarchy: an account and the accounts it created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNode {
    #[serde(alias = "_id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub balance: Decimal,
    #[serde(default, alias = "userdate")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub children: Vec<UserNode>,
}

impl UserNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Build a tree from a backend subtree payload.
///
/// Every node must carry an id (`_id` or `id`) and a username; anything else
/// is optional and a missing or empty `children` array makes a leaf.
///
/// # Errors
///
/// Returns [`CashtreeError::MalformedTree`] on a non-object node, a missing
/// required field, or nesting beyond [`MAX_TREE_DEPTH`].
pub fn build_tree(value: &Value) -> Result<UserNode> {
    build_node(value, 0)
}

fn build_node(value: &Value, depth: usize) -> Result<UserNode> {
    if depth > MAX_TREE_DEPTH {
        return Err(CashtreeError::MalformedTree(format!(
            "nesting deeper than {MAX_TREE_DEPTH} levels"
        )));
    }

    let obj = value
        .as_object()
        .ok_or_else(|| CashtreeError::MalformedTree("node is not an object".into()))?;

    let id = obj
        .get("_id")
        .or_else(|| obj.get("id"))
        .and_then(Value::as_str)
        .ok_or_else(|| CashtreeError::MalformedTree("node missing id".into()))?
        .to_string();

    let username = obj
        .get("username")
        .and_then(Value::as_str)
        .ok_or_else(|| CashtreeError::MalformedTree(format!("node {id} missing username")))?
        .to_string();

    let role = obj
        .get("role")
        .and_then(|v| serde_json::from_value::<Role>(v.clone()).ok())
        .unwrap_or_default();

    let balance = obj
        .get("balance")
        .and_then(|v| serde_json::from_value::<Decimal>(v.clone()).ok())
        .unwrap_or_default();

    let created_at = obj
        .get("userdate")
        .or_else(|| obj.get("createdAt"))
        .and_then(Value::as_str)
        .map(String::from);

    let mut children = Vec::new();
    if let Some(Value::Array(raw_children)) = obj.get("children") {
        for raw in raw_children {
            children.push(build_node(raw, depth + 1)?);
        }
    }

    Ok(UserNode {
        id,
        username,
        role,
        balance,
        created_at,
        children,
    })
}

/// Depth-first pre-order search by id. Absence is `None`, never an error;
/// callers fall back to a full refetch.
pub fn find_node<'a>(tree: &'a UserNode, id: &str) -> Option<&'a UserNode> {
    let mut stack = vec![(tree, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        if node.id == id {
            return Some(node);
        }
        if depth < MAX_TREE_DEPTH {
            // Reverse push keeps pre-order child visitation.
            for child in node.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
    }
    None
}

/// Total node count (self included).
pub fn node_count(tree: &UserNode) -> usize {
    let mut count = 0;
    let mut stack = vec![(tree, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        count += 1;
        if depth < MAX_TREE_DEPTH {
            for child in &node.children {
                stack.push((child, depth + 1));
            }
        }
    }
    count
}

/// Shallow patch applied to a single node by [`replace_node`]. Existing
/// children are preserved unless the patch supplies new ones.
#[derive(Debug, Clone, Default)]
pub struct NodePatch {
    pub username: Option<String>,
    pub role: Option<Role>,
    pub balance: Option<Decimal>,
    pub created_at: Option<String>,
    pub children: Option<Vec<UserNode>>,
}

impl NodePatch {
    /// Patch carrying the fields of an updated record from the backend.
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            username: Some(record.username.clone()),
            role: Some(record.role),
            balance: Some(record.balance),
            created_at: record.created_at.clone(),
            children: None,
        }
    }

    /// A balance-only patch, for transfer results.
    pub fn balance(balance: Decimal) -> Self {
        Self {
            balance: Some(balance),
            ..Self::default()
        }
    }

    fn apply(&self, node: &UserNode) -> UserNode {
        UserNode {
            id: node.id.clone(),
            username: self.username.clone().unwrap_or_else(|| node.username.clone()),
            role: self.role.unwrap_or(node.role),
            balance: self.balance.unwrap_or(node.balance),
            created_at: self.created_at.clone().or_else(|| node.created_at.clone()),
            children: self
                .children
                .clone()
                .unwrap_or_else(|| node.children.clone()),
        }
    }
}

/// Return a new tree with the node matching `id` shallow-merged with `patch`.
///
/// Pure: the input tree is never mutated. `None` means the id is absent —
/// the caller should treat that as a signal to refetch the whole subtree.
pub fn replace_node(tree: &UserNode, id: &str, patch: &NodePatch) -> Option<UserNode> {
    if tree.id == id {
        return Some(patch.apply(tree));
    }

    let mut replacement = None;
    for (index, child) in tree.children.iter().enumerate() {
        if let Some(patched) = replace_node(child, id, patch) {
            replacement = Some((index, patched));
            break;
        }
    }

    let (index, patched) = replacement?;
    let mut next = tree.clone();
    next.children[index] = patched;
    Some(next)
}
