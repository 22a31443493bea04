use std::time::Duration;

use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyEvent};

use crate::{
    client::Client,
    config::AppConfig,
    error::{AppError, Result},
    forms::{AuthMode, ExpenseDraft, ExpenseField, MemberDraft, RegisterDraft},
    store::{LedgerStore, StoreError},
    ui::{self, keymap::AppAction},
    views,
};

const SETTLEMENT_APOLOGY: &str = "Error settling balances. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Auth,
    Home,
}

/// What the keyboard currently drives on the home screen. In `Browse`,
/// characters are commands; in a form, they are text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeFocus {
    Browse,
    MemberForm,
    ExpenseForm,
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub register: RegisterDraft,
    pub focus: HomeFocus,
    pub member_draft: MemberDraft,
    pub expense_draft: ExpenseDraft,
    pub selected_expense: usize,
    pub selected_member: usize,
    /// Rendered settlement text, or the apology message after a failed
    /// fetch. `None` until the user asks for a settlement.
    pub settlement: Option<String>,
    /// Flow-local message for the browse surface.
    pub status: Option<String>,
    pub last_refresh: Option<DateTime<Local>>,
}

pub struct App {
    store: LedgerStore,
    pub state: AppState,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let store = LedgerStore::new(Client::new(&config.base_url));
        let state = AppState {
            screen: Screen::Auth,
            register: RegisterDraft::new(config.username),
            focus: HomeFocus::Browse,
            member_draft: MemberDraft::default(),
            expense_draft: ExpenseDraft::default(),
            selected_expense: 0,
            selected_member: 0,
            settlement: None,
            status: None,
            last_refresh: None,
        };

        Ok(Self {
            store,
            state,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(200);

        while !self.should_quit {
            terminal
                .draw(|frame| ui::render(frame, &self.state, &self.store))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key).await?,
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }

        Ok(())
    }

    async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let action = ui::keymap::map_key(key);
        if action == AppAction::Quit {
            self.should_quit = true;
            return Ok(());
        }

        match self.state.screen {
            Screen::Auth => self.handle_auth_key(action).await,
            Screen::Home => match self.state.focus {
                HomeFocus::Browse => self.handle_browse_key(action).await,
                HomeFocus::MemberForm => self.handle_member_form_key(action).await,
                HomeFocus::ExpenseForm => self.handle_expense_form_key(action).await,
            },
        }

        Ok(())
    }

    async fn handle_auth_key(&mut self, action: AppAction) {
        match action {
            AppAction::Cancel => self.should_quit = true,
            AppAction::ToggleMode => self.state.register.toggle_mode(),
            AppAction::NextField => self.state.register.next_field(),
            AppAction::Backspace => {
                self.state.register.field_mut().pop();
            }
            AppAction::Input(ch) => self.state.register.field_mut().push(ch),
            AppAction::Submit => self.attempt_auth().await,
            _ => {}
        }
    }

    async fn attempt_auth(&mut self) {
        let submit = match self.state.register.validate() {
            Ok(submit) => submit,
            Err(message) => {
                self.state.register.message = Some(message);
                return;
            }
        };

        let result = match self.state.register.mode {
            AuthMode::Register => self.store.register(submit).await,
            AuthMode::Login => self.store.login(submit).await,
        };

        match result {
            Ok(()) => {
                self.state.register.message = None;
                self.state.screen = Screen::Home;
                self.refresh(false).await;
            }
            Err(err) => {
                self.state.register.message = Some(flow_message(
                    &err,
                    "Error during registration. Please try again.",
                ));
            }
        }
    }

    async fn handle_browse_key(&mut self, action: AppAction) {
        match action {
            AppAction::Cancel | AppAction::Input('q') => self.should_quit = true,
            AppAction::Input('m') => {
                self.state.member_draft.message = None;
                self.state.focus = HomeFocus::MemberForm;
            }
            AppAction::Input('e') => {
                if self.store.members().is_empty() {
                    self.state.status =
                        Some("Add group members before recording expenses.".to_string());
                } else {
                    self.state.expense_draft = ExpenseDraft::default();
                    self.state.focus = HomeFocus::ExpenseForm;
                }
            }
            AppAction::Input('s') => self.fetch_settlement().await,
            AppAction::Input('r') => self.refresh(true).await,
            AppAction::Input('x') => self.reset_dashboard().await,
            AppAction::Input('d') => self.delete_selected_expense().await,
            AppAction::Input('D') => self.remove_selected_member().await,
            AppAction::Up | AppAction::Input('k') => {
                self.state.selected_expense = self.state.selected_expense.saturating_sub(1);
            }
            AppAction::Down | AppAction::Input('j') => {
                let len = self.store.expenses().len();
                if len > 0 {
                    self.state.selected_expense = (self.state.selected_expense + 1).min(len - 1);
                }
            }
            AppAction::Left => {
                self.state.selected_member = self.state.selected_member.saturating_sub(1);
            }
            AppAction::Right => {
                let len = self.store.members().len();
                if len > 0 {
                    self.state.selected_member = (self.state.selected_member + 1).min(len - 1);
                }
            }
            AppAction::DeleteAccount => {
                match self.store.delete_account().await {
                    Ok(()) => self.should_quit = true,
                    Err(err) => {
                        self.state.status = Some(flow_message(
                            &err,
                            "Error deleting account. Please try again.",
                        ));
                    }
                }
            }
            _ => {}
        }
    }

    async fn handle_member_form_key(&mut self, action: AppAction) {
        match action {
            AppAction::Cancel => self.state.focus = HomeFocus::Browse,
            AppAction::NextField => self.state.member_draft.select_next(),
            AppAction::AddField => self.state.member_draft.add_field(),
            AppAction::RemoveField => {
                let selected = self.state.member_draft.selected;
                self.state.member_draft.remove_field(selected);
            }
            AppAction::Backspace => {
                self.state.member_draft.field_mut().pop();
            }
            AppAction::Input(ch) => self.state.member_draft.field_mut().push(ch),
            AppAction::Submit => self.submit_members().await,
            _ => {}
        }
    }

    async fn submit_members(&mut self) {
        let names = match self.state.member_draft.validate() {
            Ok(names) => names,
            Err(message) => {
                self.state.member_draft.message = Some(message);
                return;
            }
        };

        match self.store.add_members(names).await {
            Ok(()) => {
                self.state.member_draft.reset();
                self.state.member_draft.message = None;
                self.state.selected_member = 0;
                self.state.focus = HomeFocus::Browse;
            }
            Err(err) => {
                self.state.member_draft.message = Some(flow_message(
                    &err,
                    "Error adding members. Please try again.",
                ));
            }
        }
    }

    async fn handle_expense_form_key(&mut self, action: AppAction) {
        let draft = &mut self.state.expense_draft;
        match action {
            AppAction::Cancel => self.state.focus = HomeFocus::Browse,
            AppAction::NextField => draft.next_field(),
            AppAction::Backspace => match draft.focus {
                ExpenseField::Amount => {
                    draft.amount.pop();
                }
                ExpenseField::Description => {
                    draft.description.pop();
                }
                _ => {}
            },
            AppAction::Up => {
                if matches!(draft.focus, ExpenseField::PaidBy | ExpenseField::SharedBy) {
                    draft.cursor = draft.cursor.saturating_sub(1);
                }
            }
            AppAction::Down => {
                if matches!(draft.focus, ExpenseField::PaidBy | ExpenseField::SharedBy) {
                    let len = self.store.members().len();
                    if len > 0 {
                        draft.cursor = (draft.cursor + 1).min(len - 1);
                    }
                }
            }
            AppAction::Input(ch) => match draft.focus {
                ExpenseField::Kind if ch == ' ' => draft.cycle_kind(),
                ExpenseField::Amount if ch.is_ascii_digit() || ch == '.' => draft.amount.push(ch),
                ExpenseField::Description => draft.description.push(ch),
                ExpenseField::PaidBy if ch == ' ' => draft.paid_by = Some(draft.cursor),
                ExpenseField::SharedBy if ch == ' ' => {
                    if let Some(member) = self.store.members().get(draft.cursor).cloned() {
                        draft.toggle_shared(&member);
                    }
                }
                _ => {}
            },
            AppAction::Submit => self.submit_expense().await,
            _ => {}
        }
    }

    async fn submit_expense(&mut self) {
        let candidate = match self.state.expense_draft.validate(self.store.members()) {
            Ok(candidate) => candidate,
            Err(message) => {
                self.state.expense_draft.message = Some(message);
                return;
            }
        };

        match self.store.add_expense(candidate).await {
            Ok(()) => {
                self.state.expense_draft = ExpenseDraft::default();
                self.state.focus = HomeFocus::Browse;
                // Second read path: summary figures come from the dashboard
                // endpoints, independent of the list re-fetch the store
                // already did.
                if self.store.refresh_summary().await.is_ok() {
                    self.state.last_refresh = Some(Local::now());
                }
                self.clamp_expense_selection();
            }
            Err(err) => {
                self.state.expense_draft.message = Some(flow_message(
                    &err,
                    "Error adding expense. Please try again.",
                ));
            }
        }
    }

    async fn delete_selected_expense(&mut self) {
        let Some(expense) = self.store.expenses().get(self.state.selected_expense) else {
            return;
        };
        let id = expense.id;

        match self.store.delete_expense(id).await {
            Ok(()) => {
                let _ = self.store.refresh_summary().await;
                self.clamp_expense_selection();
            }
            Err(err) => {
                self.state.status = Some(flow_message(
                    &err,
                    "Error deleting expense. Please try again.",
                ));
                self.clamp_expense_selection();
            }
        }
    }

    async fn remove_selected_member(&mut self) {
        let Some(member) = self
            .store
            .members()
            .get(self.state.selected_member)
            .cloned()
        else {
            return;
        };

        match self.store.remove_member(&member).await {
            Ok(()) => {
                let len = self.store.members().len();
                self.state.selected_member = self.state.selected_member.min(len.saturating_sub(1));
            }
            Err(err) => {
                self.state.status = Some(flow_message(
                    &err,
                    "Error removing member. Please try again.",
                ));
            }
        }
    }

    async fn fetch_settlement(&mut self) {
        self.state.settlement = match self.store.fetch_settlement().await {
            Ok(settlement) => Some(views::settlement_text(&settlement)),
            Err(_) => Some(SETTLEMENT_APOLOGY.to_string()),
        };
    }

    async fn reset_dashboard(&mut self) {
        match self.store.reset_dashboard().await {
            Ok(()) => {
                self.state.settlement = None;
                self.refresh(true).await;
            }
            Err(err) => {
                self.state.status = Some(flow_message(
                    &err,
                    "Error resetting dashboard. Please try again.",
                ));
            }
        }
    }

    /// Refreshes both read paths: the global expense list and, once an
    /// identity exists, the per-user summary figures. The two fetches are
    /// independent; a transient mismatch between them is possible until
    /// both complete.
    async fn refresh(&mut self, report_errors: bool) {
        let mut failed = false;

        if self.store.fetch_all_expenses().await.is_err() {
            failed = true;
        }
        if self.store.identity().is_some() && self.store.refresh_summary().await.is_err() {
            failed = true;
        }

        if failed {
            if report_errors {
                self.state.status = Some("Error fetching dashboard data.".to_string());
            }
        } else {
            self.state.status = None;
            self.state.last_refresh = Some(Local::now());
        }
        self.clamp_expense_selection();
    }

    fn clamp_expense_selection(&mut self) {
        let len = self.store.expenses().len();
        self.state.selected_expense = self.state.selected_expense.min(len.saturating_sub(1));
    }
}

fn flow_message(err: &StoreError, gateway_text: &str) -> String {
    match err {
        StoreError::Validation(message) => message.clone(),
        StoreError::Gateway(_) => gateway_text.to_string(),
    }
}
