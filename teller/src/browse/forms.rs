//! Modal forms for the tree browser: edit, transfer, add sub-account, and
//! the blocking delete confirmation.

use cashtree::{Role, TransferKind, UserNode};
use rust_decimal::Decimal;

/// Preset transfer amounts offered in the transfer modal.
pub const QUICK_AMOUNTS: [u32; 4] = [500, 1_000, 5_000, 25_000];

/// One line-edit field.
#[derive(Debug, Clone, Default)]
pub struct TextField {
    pub value: String,
    /// Render as bullets (passwords).
    pub masked: bool,
}

impl TextField {
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            masked: false,
        }
    }

    pub fn masked() -> Self {
        Self {
            value: String::new(),
            masked: true,
        }
    }

    pub fn push(&mut self, c: char) {
        self.value.push(c);
    }

    pub fn pop(&mut self) {
        self.value.pop();
    }

    pub fn display(&self) -> String {
        if self.masked {
            "\u{2022}".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

/// Which modal is on screen. At most one, owned by the browser view.
#[derive(Debug, Clone)]
pub enum Modal {
    Update(UpdateForm),
    Transfer(TransferForm),
    AddChild(AddChildForm),
    ConfirmDelete,
}

/// Edit username / password / role. Fields prefill from the selected node.
#[derive(Debug, Clone)]
pub struct UpdateForm {
    pub username: TextField,
    pub password: TextField,
    pub role_index: usize,
    pub focus: usize,
}

impl UpdateForm {
    pub const FIELDS: usize = 3;

    pub fn for_node(node: &UserNode) -> Self {
        Self {
            username: TextField::with_value(&node.username),
            password: TextField::masked(),
            role_index: Role::ALL
                .iter()
                .position(|r| *r == node.role)
                .unwrap_or(Role::ALL.len() - 1),
            focus: 0,
        }
    }

    pub fn role(&self) -> Role {
        Role::ALL[self.role_index]
    }

    pub fn next_focus(&mut self) {
        self.focus = (self.focus + 1) % Self::FIELDS;
    }

    pub fn cycle_role(&mut self, forward: bool) {
        let len = Role::ALL.len();
        self.role_index = if forward {
            (self.role_index + 1) % len
        } else {
            (self.role_index + len - 1) % len
        };
    }

    fn focused_field(&mut self) -> Option<&mut TextField> {
        match self.focus {
            0 => Some(&mut self.username),
            1 => Some(&mut self.password),
            _ => None,
        }
    }

    pub fn input(&mut self, c: char) {
        match self.focused_field() {
            Some(field) => field.push(c),
            // Role row: left/right cycle, but typing also moves through roles.
            None => self.cycle_role(true),
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.focused_field() {
            field.pop();
        }
    }
}

/// Amount entry plus deposit/withdraw direction.
#[derive(Debug, Clone)]
pub struct TransferForm {
    pub amount: TextField,
    pub kind: TransferKind,
    /// Cursor over [`QUICK_AMOUNTS`]; `None` once the operator types.
    pub quick_index: Option<usize>,
}

impl TransferForm {
    pub fn new() -> Self {
        Self {
            amount: TextField::default(),
            kind: TransferKind::Deposit,
            quick_index: None,
        }
    }

    pub fn toggle_kind(&mut self) {
        self.kind = match self.kind {
            TransferKind::Deposit => TransferKind::Withdraw,
            TransferKind::Withdraw => TransferKind::Deposit,
        };
    }

    /// Step through the preset amounts, filling the field.
    pub fn cycle_quick(&mut self, forward: bool) {
        let len = QUICK_AMOUNTS.len();
        let next = match self.quick_index {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None => 0,
        };
        self.quick_index = Some(next);
        self.amount.value = QUICK_AMOUNTS[next].to_string();
    }

    pub fn input(&mut self, c: char) {
        if c.is_ascii_digit() || c == '.' {
            self.quick_index = None;
            self.amount.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.quick_index = None;
        self.amount.pop();
    }

    /// Parsed amount, `None` when empty/unparseable/non-positive.
    pub fn parsed_amount(&self) -> Option<Decimal> {
        let amount: Decimal = self.amount.value.parse().ok()?;
        (amount > Decimal::ZERO).then_some(amount)
    }
}

/// Register a new account under the selected node.
#[derive(Debug, Clone)]
pub struct AddChildForm {
    pub username: TextField,
    pub password: TextField,
    pub role_index: usize,
    pub focus: usize,
}

impl AddChildForm {
    pub const FIELDS: usize = 3;

    pub fn new() -> Self {
        Self {
            username: TextField::default(),
            password: TextField::masked(),
            // Default to the least-privileged role.
            role_index: Role::ALL.len() - 1,
            focus: 0,
        }
    }

    pub fn role(&self) -> Role {
        Role::ALL[self.role_index]
    }

    pub fn next_focus(&mut self) {
        self.focus = (self.focus + 1) % Self::FIELDS;
    }

    pub fn cycle_role(&mut self, forward: bool) {
        let len = Role::ALL.len();
        self.role_index = if forward {
            (self.role_index + 1) % len
        } else {
            (self.role_index + len - 1) % len
        };
    }

    pub fn input(&mut self, c: char) {
        match self.focus {
            0 => self.username.push(c),
            1 => self.password.push(c),
            _ => self.cycle_role(true),
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            0 => self.username.pop(),
            1 => self.password.pop(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn node() -> UserNode {
        serde_json::from_value(serde_json::json!({
            "_id": "n1",
            "username": "partner_a",
            "role": "Partner",
            "balance": 10
        }))
        .unwrap()
    }

    #[test]
    fn test_update_form_prefills_from_node() {
        let form = UpdateForm::for_node(&node());
        assert_eq!(form.username.value, "partner_a");
        assert_eq!(form.role(), Role::Partner);
        assert!(form.password.value.is_empty());
    }

    #[test]
    fn test_masked_field_displays_bullets() {
        let mut field = TextField::masked();
        field.push('a');
        field.push('b');
        assert_eq!(field.display(), "\u{2022}\u{2022}");
    }

    #[test]
    fn test_transfer_form_quick_amounts() {
        let mut form = TransferForm::new();
        form.cycle_quick(true);
        assert_eq!(form.parsed_amount(), Some(dec!(500)));
        form.cycle_quick(true);
        assert_eq!(form.parsed_amount(), Some(dec!(1000)));
        // Typing clears the preset cursor.
        form.input('7');
        assert!(form.quick_index.is_none());
    }

    #[test]
    fn test_transfer_form_rejects_bad_amounts() {
        let mut form = TransferForm::new();
        assert!(form.parsed_amount().is_none());
        form.input('0');
        assert!(form.parsed_amount().is_none());
        form.backspace();
        form.input('2');
        form.input('5');
        assert_eq!(form.parsed_amount(), Some(dec!(25)));
    }

    #[test]
    fn test_transfer_form_ignores_letters() {
        let mut form = TransferForm::new();
        form.input('x');
        assert!(form.amount.value.is_empty());
    }

    #[test]
    fn test_role_cycling_wraps() {
        let mut form = AddChildForm::new();
        assert_eq!(form.role(), Role::User);
        form.cycle_role(true);
        assert_eq!(form.role(), Role::SuperAdmin);
        form.cycle_role(false);
        assert_eq!(form.role(), Role::User);
    }
}
