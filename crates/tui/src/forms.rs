use api_types::expense::{ExpenseNew, ExpenseType, SharedMember};

/// Parses a user-entered amount into a value the ledger accepts.
///
/// Rules: at most two decimals, minimum 0.10. Parsing goes through minor
/// units (cents) so float noise cannot sneak an invalid value past the
/// check.
pub fn parse_amount(input: &str) -> Result<f64, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Amount is missing.".to_string());
    }

    let (whole, frac) = match trimmed.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (trimmed, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err("Amount is not a number.".to_string());
    }
    if !whole.chars().all(|ch| ch.is_ascii_digit()) || whole.len() > 12 {
        return Err("Amount is not a number.".to_string());
    }
    if frac.len() > 2 || !frac.chars().all(|ch| ch.is_ascii_digit()) {
        return Err("Amount must have at most two decimals.".to_string());
    }

    let whole_minor: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse::<i64>().map_err(|_| "Amount is not a number.".to_string())? * 100
    };
    let frac_minor: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().map_err(|_| "Amount is not a number.".to_string())? * 10,
        _ => frac.parse::<i64>().map_err(|_| "Amount is not a number.".to_string())?,
    };
    let minor = whole_minor + frac_minor;

    if minor < 10 {
        return Err("Amount must be at least 0.10.".to_string());
    }
    Ok(minor as f64 / 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Register,
    Login,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterField {
    Username,
    Password,
    Name,
    DashboardName,
}

/// Validated registration command handed to the store.
#[derive(Debug, Clone)]
pub struct RegisterSubmit {
    pub username: String,
    pub password: String,
    pub name: String,
    /// Local presentation only; never sent to the remote service.
    pub dashboard_name: Option<String>,
}

#[derive(Debug)]
pub struct RegisterDraft {
    pub mode: AuthMode,
    pub username: String,
    pub password: String,
    pub name: String,
    pub dashboard_name: String,
    pub focus: RegisterField,
    pub message: Option<String>,
}

impl RegisterDraft {
    pub fn new(username: String) -> Self {
        Self {
            mode: AuthMode::Register,
            username,
            password: String::new(),
            name: String::new(),
            dashboard_name: String::new(),
            focus: RegisterField::Username,
            message: None,
        }
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Register => AuthMode::Login,
            AuthMode::Login => AuthMode::Register,
        };
        self.focus = RegisterField::Username;
        self.message = None;
    }

    pub fn next_field(&mut self) {
        self.focus = match (self.mode, self.focus) {
            (AuthMode::Login, RegisterField::Username) => RegisterField::Password,
            (AuthMode::Login, _) => RegisterField::Username,
            (_, RegisterField::Username) => RegisterField::Password,
            (_, RegisterField::Password) => RegisterField::Name,
            (_, RegisterField::Name) => RegisterField::DashboardName,
            (_, RegisterField::DashboardName) => RegisterField::Username,
        };
    }

    pub fn field_mut(&mut self) -> &mut String {
        match self.focus {
            RegisterField::Username => &mut self.username,
            RegisterField::Password => &mut self.password,
            RegisterField::Name => &mut self.name,
            RegisterField::DashboardName => &mut self.dashboard_name,
        }
    }

    pub fn validate(&self) -> Result<RegisterSubmit, String> {
        let username = self.username.trim();
        let name = self.name.trim();

        // The password goes through exactly as typed; trimming it would
        // change the credential.
        if username.is_empty() || self.password.len() < 8 {
            return Err("Please fill all fields correctly.".to_string());
        }
        if self.mode == AuthMode::Register && name.is_empty() {
            return Err("Please fill all fields correctly.".to_string());
        }

        let dashboard_name = self.dashboard_name.trim();
        Ok(RegisterSubmit {
            username: username.to_string(),
            password: self.password.clone(),
            name: name.to_string(),
            dashboard_name: (!dashboard_name.is_empty()).then(|| dashboard_name.to_string()),
        })
    }
}

/// Draft list of member-name fields. Add/remove only touch the draft; the
/// whole batch goes to the store in one submit.
#[derive(Debug)]
pub struct MemberDraft {
    pub names: Vec<String>,
    pub selected: usize,
    pub message: Option<String>,
}

impl Default for MemberDraft {
    fn default() -> Self {
        Self {
            names: vec![String::new()],
            selected: 0,
            message: None,
        }
    }
}

impl MemberDraft {
    pub fn add_field(&mut self) {
        self.names.push(String::new());
        self.selected = self.names.len() - 1;
    }

    pub fn remove_field(&mut self, index: usize) {
        if index < self.names.len() {
            self.names.remove(index);
        }
        if self.names.is_empty() {
            self.names.push(String::new());
        }
        self.selected = self.selected.min(self.names.len() - 1);
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % self.names.len();
    }

    pub fn field_mut(&mut self) -> &mut String {
        &mut self.names[self.selected]
    }

    pub fn validate(&self) -> Result<Vec<String>, String> {
        let names: Vec<String> = self
            .names
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        if names.iter().any(String::is_empty) {
            return Err("All member names must be filled.".to_string());
        }
        Ok(names)
    }

    pub fn reset(&mut self) {
        self.names = vec![String::new()];
        self.selected = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseField {
    Kind,
    Amount,
    Description,
    PaidBy,
    SharedBy,
}

/// Draft for the expense entry flow. The payer is exactly one member
/// (radio-style index); sharers are a toggled subset.
#[derive(Debug)]
pub struct ExpenseDraft {
    pub kind_idx: usize,
    pub amount: String,
    pub description: String,
    pub paid_by: Option<usize>,
    pub shared: Vec<String>,
    pub focus: ExpenseField,
    pub cursor: usize,
    pub message: Option<String>,
}

impl Default for ExpenseDraft {
    fn default() -> Self {
        Self {
            kind_idx: 0,
            amount: String::new(),
            description: String::new(),
            paid_by: None,
            shared: Vec::new(),
            focus: ExpenseField::Kind,
            cursor: 0,
            message: None,
        }
    }
}

impl ExpenseDraft {
    pub fn kind(&self) -> ExpenseType {
        ExpenseType::ALL[self.kind_idx % ExpenseType::ALL.len()]
    }

    pub fn cycle_kind(&mut self) {
        self.kind_idx = (self.kind_idx + 1) % ExpenseType::ALL.len();
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            ExpenseField::Kind => ExpenseField::Amount,
            ExpenseField::Amount => ExpenseField::Description,
            ExpenseField::Description => ExpenseField::PaidBy,
            ExpenseField::PaidBy => ExpenseField::SharedBy,
            ExpenseField::SharedBy => ExpenseField::Kind,
        };
        self.cursor = 0;
    }

    /// Pure add/remove on the sharer set; there is no read-back of the
    /// post-toggle state anywhere else.
    pub fn toggle_shared(&mut self, member: &str) {
        if let Some(pos) = self.shared.iter().position(|name| name == member) {
            self.shared.remove(pos);
        } else {
            self.shared.push(member.to_string());
        }
    }

    pub fn validate(&self, members: &[String]) -> Result<ExpenseNew, String> {
        let amount = parse_amount(&self.amount).map_err(|_| invalid_fields())?;
        let description = self.description.trim();
        if description.is_empty() {
            return Err(invalid_fields());
        }
        let paid_by = self
            .paid_by
            .and_then(|idx| members.get(idx))
            .ok_or_else(invalid_fields)?;
        if self.shared.is_empty() {
            return Err(invalid_fields());
        }

        Ok(ExpenseNew {
            kind: self.kind().as_str().to_string(),
            amount,
            description: description.to_string(),
            paid_by: paid_by.clone(),
            shared_by: self
                .shared
                .iter()
                .map(|name| SharedMember::from(name.as_str()))
                .collect(),
        })
    }
}

fn invalid_fields() -> String {
    "Please fill all fields correctly.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_rejects_zero_and_below_minimum() {
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("0.05").is_err());
        assert!(parse_amount("0.09").is_err());
    }

    #[test]
    fn amount_accepts_minimum_and_two_decimals() {
        assert_eq!(parse_amount("0.10").unwrap(), 0.10);
        assert_eq!(parse_amount("12.34").unwrap(), 12.34);
        assert_eq!(parse_amount("30").unwrap(), 30.0);
        assert_eq!(parse_amount("1.5").unwrap(), 1.5);
    }

    #[test]
    fn amount_rejects_garbage() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("-5").is_err());
        assert!(parse_amount("1.234").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount(".").is_err());
    }

    #[test]
    fn registration_enforces_password_length() {
        let mut draft = RegisterDraft::new("alice".to_string());
        draft.name = "Alice".to_string();
        draft.password = "1234567".to_string();
        assert!(draft.validate().is_err());
        draft.password = "12345678".to_string();
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn password_is_submitted_as_typed() {
        let mut draft = RegisterDraft::new("alice".to_string());
        draft.name = "Alice".to_string();
        // Eight characters only because the spaces count.
        draft.password = " pass 7 ".to_string();
        let submit = draft.validate().unwrap();
        assert_eq!(submit.password, " pass 7 ");
    }

    #[test]
    fn registration_dashboard_name_is_optional_and_local() {
        let mut draft = RegisterDraft::new("alice".to_string());
        draft.name = "Alice".to_string();
        draft.password = "password1".to_string();
        assert_eq!(draft.validate().unwrap().dashboard_name, None);

        draft.dashboard_name = "Road trip".to_string();
        assert_eq!(
            draft.validate().unwrap().dashboard_name.as_deref(),
            Some("Road trip")
        );
    }

    #[test]
    fn member_draft_add_and_remove_fields() {
        let mut draft = MemberDraft::default();
        draft.names[0] = "bob".to_string();
        draft.add_field();
        draft.names[1] = "carol".to_string();
        assert_eq!(draft.validate().unwrap(), ["bob", "carol"]);

        draft.remove_field(0);
        assert_eq!(draft.validate().unwrap(), ["carol"]);

        // Removing the last field leaves one empty slot, which fails
        // submit-time validation.
        draft.remove_field(0);
        assert!(draft.validate().is_err());
    }

    #[test]
    fn member_draft_rejects_blank_names() {
        let mut draft = MemberDraft::default();
        draft.names[0] = "bob".to_string();
        draft.add_field();
        assert!(draft.validate().is_err());
    }

    #[test]
    fn sharer_toggle_adds_then_removes() {
        let mut draft = ExpenseDraft::default();
        draft.toggle_shared("bob");
        draft.toggle_shared("carol");
        assert_eq!(draft.shared, ["bob", "carol"]);
        draft.toggle_shared("bob");
        assert_eq!(draft.shared, ["carol"]);
    }

    #[test]
    fn expense_draft_validates_complete_candidate() {
        let members = vec!["alice".to_string(), "bob".to_string()];
        let mut draft = ExpenseDraft::default();
        draft.amount = "30.00".to_string();
        draft.description = "lunch".to_string();
        draft.paid_by = Some(0);
        draft.toggle_shared("bob");

        let candidate = draft.validate(&members).unwrap();
        assert_eq!(candidate.kind, "Food");
        assert_eq!(candidate.amount, 30.0);
        assert_eq!(candidate.paid_by, "alice");
        assert_eq!(candidate.shared_by.len(), 1);
    }

    #[test]
    fn expense_draft_rejects_missing_pieces() {
        let members = vec!["alice".to_string()];
        let mut draft = ExpenseDraft::default();
        assert!(draft.validate(&members).is_err());

        draft.amount = "0".to_string();
        draft.description = "lunch".to_string();
        draft.paid_by = Some(0);
        draft.toggle_shared("alice");
        assert!(draft.validate(&members).is_err());

        draft.amount = "0.10".to_string();
        assert!(draft.validate(&members).is_ok());
    }
}
