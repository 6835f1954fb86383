// src/cli/state.rs
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::widgets::{ListState, TableState};

use crate::chores::ChoreStatus;
use crate::cli::api::Client;
use crate::cli::util::{parse_date, parse_money, today};
use crate::database::models::{BalanceSnapshot, LoanPayment};
use crate::engine::{self, LoanState, LoanTerms, ScheduledPayment};

const UPCOMING_COUNT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Balances,
    Chores,
    Loan,
    Help,
}

#[derive(Default, Clone)]
pub struct SnapshotForm {
    pub week_of: String,
    pub checking: String,
    pub savings: String,
    pub credit_card: String,
    pub cash: String,
    // 0: Week, 1: Checking, 2: Savings, 3: Credit card, 4: Cash
    pub focus_index: usize,
    pub error: Option<String>,
}

#[derive(Default, Clone)]
pub struct ChoreForm {
    pub name: String,
    pub cadence: String,
    // 0: Name, 1: Cadence
    pub focus_index: usize,
    pub error: Option<String>,
}

#[derive(Default, Clone)]
pub struct ExtraForm {
    pub amount: String,
    pub date: String,
    // 0: Amount, 1: Date
    pub focus_index: usize,
    pub error: Option<String>,
}

#[derive(Default)]
pub struct BalancesPage {
    pub list: Vec<BalanceSnapshot>,
    pub sel: TableState,
    pub creating: bool,
    pub form: SnapshotForm,
}

#[derive(Default)]
pub struct ChoresPage {
    pub board: Vec<ChoreStatus>,
    pub sel: ListState,
    pub creating: bool,
    pub form: ChoreForm,
}

#[derive(Default)]
pub struct LoanPage {
    pub summary: Option<LoanState>,
    pub ledger: Vec<LoanPayment>,
    pub upcoming: Vec<ScheduledPayment>,
    pub projection_note: Option<String>,
    pub sel: TableState,
    pub entering_extra: bool,
    pub form: ExtraForm,
}

pub struct App {
    pub api: Client,
    pub terms: LoanTerms,
    pub tab: Tab,
    pub status: String,
    pub quit: bool,
    pub balances: BalancesPage,
    pub chores: ChoresPage,
    pub loan: LoanPage,
}

impl App {
    pub fn new(api: Client, terms: LoanTerms) -> Self {
        Self {
            api,
            terms,
            tab: Tab::Balances,
            status: "Press ? for help | q to quit".into(),
            quit: false,
            balances: BalancesPage::default(),
            chores: ChoresPage::default(),
            loan: LoanPage::default(),
        }
    }

    pub async fn refresh_all(&mut self) -> anyhow::Result<()> {
        self.refresh_balances().await?;
        self.refresh_chores().await?;
        self.refresh_loan().await?;
        Ok(())
    }

    pub async fn refresh_balances(&mut self) -> anyhow::Result<()> {
        self.balances.list = self.api.list_snapshots().await?;
        let len = self.balances.list.len();
        if self.balances.sel.selected().is_none() && len > 0 {
            self.balances.sel.select(Some(len - 1));
        }
        Ok(())
    }

    pub async fn refresh_chores(&mut self) -> anyhow::Result<()> {
        self.chores.board = self.api.chore_board(today()).await?;
        if self.chores.sel.selected().is_none() && !self.chores.board.is_empty() {
            self.chores.sel.select(Some(0));
        }
        Ok(())
    }

    // Everything the loan tab shows is derived from the cleared ledger on
    // each refresh. Nothing is cached between refreshes.
    pub async fn refresh_loan(&mut self) -> anyhow::Result<()> {
        let ledger = self.api.loan_ledger().await?;
        self.loan.summary = Some(engine::reconcile_current_state(&ledger, &self.terms));

        self.loan.upcoming =
            match engine::project_upcoming(&ledger, &self.terms, UPCOMING_COUNT) {
                Ok(schedule) => schedule,
                Err(e) => {
                    self.status = format!("Projection unavailable: {e}");
                    Vec::new()
                }
            };

        self.loan.projection_note = Some(match engine::project_to_payoff(&ledger, &self.terms) {
            Ok(schedule) => match schedule.last() {
                Some(last) => format!("{} payments to payoff on {}", schedule.len(), last.date),
                None => "Paid in full".into(),
            },
            Err(e) => e.to_string(),
        });

        self.loan.ledger = ledger;
        let len = self.loan.ledger.len();
        match self.loan.sel.selected() {
            Some(i) if i >= len => self.loan.sel.select(if len == 0 { None } else { Some(len - 1) }),
            None if len > 0 => self.loan.sel.select(Some(len - 1)),
            _ => {}
        }
        Ok(())
    }

    pub async fn handle_key(&mut self, k: KeyEvent) -> anyhow::Result<()> {
        if k.kind != KeyEventKind::Press {
            return Ok(());
        }
        if self.balances.creating {
            self.handle_snapshot_input(k).await?;
            return Ok(());
        }
        if self.chores.creating {
            self.handle_chore_input(k).await?;
            return Ok(());
        }
        if self.loan.entering_extra {
            self.handle_extra_input(k).await?;
            return Ok(());
        }

        match k.code {
            KeyCode::Char('q') => {
                self.quit = true;
                return Ok(());
            }
            KeyCode::Tab => {
                self.tab = match self.tab {
                    Tab::Balances => Tab::Chores,
                    Tab::Chores => Tab::Loan,
                    Tab::Loan => Tab::Balances,
                    Tab::Help => Tab::Balances,
                };
                return Ok(());
            }
            KeyCode::Char('?') => {
                self.tab = Tab::Help;
                return Ok(());
            }
            _ => {}
        }

        match self.tab {
            Tab::Balances => match k.code {
                KeyCode::Up => self.move_snapshot(-1),
                KeyCode::Down => self.move_snapshot(1),
                KeyCode::Char('n') => {
                    self.balances.creating = true;
                    self.balances.form = SnapshotForm {
                        week_of: crate::cli::util::iso(&today()),
                        ..Default::default()
                    };
                }
                KeyCode::Char('x') | KeyCode::Delete => {
                    if let Some(id) = self.current_snapshot_id() {
                        match self.api.delete_snapshot(id).await {
                            Ok(_) => {
                                self.status = "Snapshot deleted.".into();
                                self.refresh_balances().await.ok();
                            }
                            Err(e) => self.status = format!("Delete failed: {e}"),
                        }
                    }
                }
                KeyCode::Char('r') => {
                    self.refresh_balances().await.ok();
                }
                _ => {}
            },
            Tab::Chores => match k.code {
                KeyCode::Up => self.move_chore(-1),
                KeyCode::Down => self.move_chore(1),
                KeyCode::Enter | KeyCode::Char(' ') => {
                    if let Some(id) = self.current_chore_id() {
                        match self.api.complete_chore(id, today()).await {
                            Ok(_) => {
                                self.status = "Logged.".into();
                                self.refresh_chores().await.ok();
                            }
                            Err(e) => self.status = format!("Log failed: {e}"),
                        }
                    }
                }
                KeyCode::Char('n') => {
                    self.chores.creating = true;
                    self.chores.form = ChoreForm::default();
                }
                KeyCode::Char('x') | KeyCode::Delete => {
                    if let Some(id) = self.current_chore_id() {
                        match self.api.delete_chore(id).await {
                            Ok(_) => {
                                self.status = "Chore removed.".into();
                                self.refresh_chores().await.ok();
                            }
                            Err(e) => self.status = format!("Delete failed: {e}"),
                        }
                    }
                }
                KeyCode::Char('r') => {
                    self.refresh_chores().await.ok();
                }
                _ => {}
            },
            Tab::Loan => match k.code {
                KeyCode::Up => self.move_payment(-1),
                KeyCode::Down => self.move_payment(1),
                KeyCode::Char('c') => self.clear_next_payment().await?,
                KeyCode::Char('e') => {
                    self.loan.entering_extra = true;
                    self.loan.form = ExtraForm {
                        date: crate::cli::util::iso(&today()),
                        ..Default::default()
                    };
                }
                KeyCode::Char('x') | KeyCode::Delete => {
                    if let Some(id) = self.current_payment_id() {
                        match self.api.delete_payment(id).await {
                            Ok(_) => {
                                self.status = "Payment removed.".into();
                                self.refresh_loan().await.ok();
                            }
                            Err(e) => self.status = format!("Delete failed: {e}"),
                        }
                    }
                }
                KeyCode::Char('r') => {
                    self.refresh_loan().await.ok();
                }
                _ => {}
            },
            Tab::Help => match k.code {
                KeyCode::Esc | KeyCode::Char('b') => self.tab = Tab::Balances,
                _ => {}
            },
        }
        Ok(())
    }

    // ============= Selection movement =============

    fn move_snapshot(&mut self, delta: isize) {
        let n = self.balances.list.len();
        if n == 0 {
            self.balances.sel.select(None);
            return;
        }
        let cur = self.balances.sel.selected().unwrap_or(0) as isize;
        self.balances.sel.select(Some((cur + delta).rem_euclid(n as isize) as usize));
    }

    fn move_chore(&mut self, delta: isize) {
        let n = self.chores.board.len();
        if n == 0 {
            self.chores.sel.select(None);
            return;
        }
        let cur = self.chores.sel.selected().unwrap_or(0) as isize;
        self.chores.sel.select(Some((cur + delta).rem_euclid(n as isize) as usize));
    }

    fn move_payment(&mut self, delta: isize) {
        let n = self.loan.ledger.len();
        if n == 0 {
            self.loan.sel.select(None);
            return;
        }
        let cur = self.loan.sel.selected().unwrap_or(0) as isize;
        self.loan.sel.select(Some((cur + delta).rem_euclid(n as isize) as usize));
    }

    fn current_snapshot_id(&self) -> Option<i64> {
        let idx = self.balances.sel.selected()?;
        self.balances.list.get(idx).map(|s| s.snapshot_id)
    }

    fn current_chore_id(&self) -> Option<i64> {
        let idx = self.chores.sel.selected()?;
        self.chores.board.get(idx).map(|s| s.chore.chore_id)
    }

    fn current_payment_id(&self) -> Option<i64> {
        let idx = self.loan.sel.selected()?;
        self.loan.ledger.get(idx).map(|p| p.payment_id)
    }

    // ============= Loan actions =============

    async fn clear_next_payment(&mut self) -> anyhow::Result<()> {
        let Some(next) = self.loan.upcoming.first().cloned() else {
            self.status = "Nothing left to clear.".into();
            return Ok(());
        };
        match self.api.clear_payment(&next).await {
            Ok(_) => {
                self.status = format!("Cleared payment due {}.", next.date);
                self.refresh_loan().await?;
            }
            Err(e) => self.status = format!("Clear failed: {e}"),
        }
        Ok(())
    }

    // ============= Form input =============

    async fn handle_snapshot_input(&mut self, k: KeyEvent) -> anyhow::Result<()> {
        match k.code {
            KeyCode::Esc => {
                self.balances.creating = false;
                self.balances.form = SnapshotForm::default();
            }
            KeyCode::Enter => self.submit_snapshot().await?,
            KeyCode::Tab | KeyCode::Down => {
                self.balances.form.focus_index = (self.balances.form.focus_index + 1) % 5;
            }
            KeyCode::BackTab | KeyCode::Up => {
                let f = &mut self.balances.form;
                f.focus_index = if f.focus_index > 0 { f.focus_index - 1 } else { 4 };
            }
            KeyCode::Char(c) => {
                let f = &mut self.balances.form;
                match f.focus_index {
                    0 => f.week_of.push(c),
                    1 => f.checking.push(c),
                    2 => f.savings.push(c),
                    3 => f.credit_card.push(c),
                    4 => f.cash.push(c),
                    _ => {}
                }
            }
            KeyCode::Backspace => {
                let f = &mut self.balances.form;
                match f.focus_index {
                    0 => {
                        f.week_of.pop();
                    }
                    1 => {
                        f.checking.pop();
                    }
                    2 => {
                        f.savings.pop();
                    }
                    3 => {
                        f.credit_card.pop();
                    }
                    4 => {
                        f.cash.pop();
                    }
                    _ => {}
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn submit_snapshot(&mut self) -> anyhow::Result<()> {
        let f = self.balances.form.clone();
        let Some(week_of) = parse_date(&f.week_of) else {
            self.balances.form.error = Some("Week: format YYYY-MM-DD".into());
            return Ok(());
        };
        let Some(checking) = parse_money(&f.checking) else {
            self.balances.form.error = Some("Checking: invalid amount".into());
            return Ok(());
        };
        let Some(savings) = parse_money(&f.savings) else {
            self.balances.form.error = Some("Savings: invalid amount".into());
            return Ok(());
        };
        let Some(credit_card) = parse_money(&f.credit_card) else {
            self.balances.form.error = Some("Credit card: invalid amount".into());
            return Ok(());
        };
        let Some(cash) = parse_money(&f.cash) else {
            self.balances.form.error = Some("Cash: invalid amount".into());
            return Ok(());
        };

        match self
            .api
            .save_snapshot(week_of, checking, savings, credit_card, cash)
            .await
        {
            Ok(_) => {
                self.balances.creating = false;
                self.status = format!("Saved week of {week_of}.");
                self.refresh_balances().await?;
            }
            Err(e) => self.balances.form.error = Some(format!("Save failed: {e}")),
        }
        Ok(())
    }

    async fn handle_chore_input(&mut self, k: KeyEvent) -> anyhow::Result<()> {
        match k.code {
            KeyCode::Esc => {
                self.chores.creating = false;
                self.chores.form = ChoreForm::default();
            }
            KeyCode::Enter => self.submit_chore().await?,
            KeyCode::Tab | KeyCode::Down | KeyCode::BackTab | KeyCode::Up => {
                self.chores.form.focus_index = (self.chores.form.focus_index + 1) % 2;
            }
            KeyCode::Char(c) => match self.chores.form.focus_index {
                0 => self.chores.form.name.push(c),
                1 => {
                    if c.is_ascii_digit() {
                        self.chores.form.cadence.push(c);
                    }
                }
                _ => {}
            },
            KeyCode::Backspace => match self.chores.form.focus_index {
                0 => {
                    self.chores.form.name.pop();
                }
                1 => {
                    self.chores.form.cadence.pop();
                }
                _ => {}
            },
            _ => {}
        }
        Ok(())
    }

    async fn submit_chore(&mut self) -> anyhow::Result<()> {
        let name = self.chores.form.name.trim().to_string();
        if name.is_empty() {
            self.chores.form.error = Some("Name is required".into());
            return Ok(());
        }
        let cadence = match self.chores.form.cadence.trim().parse::<i64>() {
            Ok(n) if n >= 1 => n,
            _ => {
                self.chores.form.error = Some("Cadence: whole days, at least 1".into());
                return Ok(());
            }
        };

        match self.api.add_chore(&name, cadence, today()).await {
            Ok(_) => {
                self.chores.creating = false;
                self.status = format!("Added \"{name}\".");
                self.refresh_chores().await?;
            }
            Err(e) => self.chores.form.error = Some(format!("Save failed: {e}")),
        }
        Ok(())
    }

    async fn handle_extra_input(&mut self, k: KeyEvent) -> anyhow::Result<()> {
        match k.code {
            KeyCode::Esc => {
                self.loan.entering_extra = false;
                self.loan.form = ExtraForm::default();
            }
            KeyCode::Enter => self.submit_extra_payment().await?,
            KeyCode::Tab | KeyCode::Down | KeyCode::BackTab | KeyCode::Up => {
                self.loan.form.focus_index = (self.loan.form.focus_index + 1) % 2;
            }
            KeyCode::Char(c) => match self.loan.form.focus_index {
                0 => self.loan.form.amount.push(c),
                1 => self.loan.form.date.push(c),
                _ => {}
            },
            KeyCode::Backspace => match self.loan.form.focus_index {
                0 => {
                    self.loan.form.amount.pop();
                }
                1 => {
                    self.loan.form.date.pop();
                }
                _ => {}
            },
            _ => {}
        }
        Ok(())
    }

    async fn submit_extra_payment(&mut self) -> anyhow::Result<()> {
        let Some(amount) = parse_money(&self.loan.form.amount) else {
            self.loan.form.error = Some("Amount: invalid number".into());
            return Ok(());
        };
        let Some(date) = parse_date(&self.loan.form.date) else {
            self.loan.form.error = Some("Date: format YYYY-MM-DD".into());
            return Ok(());
        };
        let Some(summary) = self.loan.summary.clone() else {
            self.loan.form.error = Some("Loan state not loaded yet".into());
            return Ok(());
        };

        let breakdown = match engine::extra_payment(
            amount,
            date,
            summary.remaining_balance,
            summary.last_payment_date,
            &self.terms,
        ) {
            Ok(b) => b,
            Err(e) => {
                self.loan.form.error = Some(e.to_string());
                return Ok(());
            }
        };

        match self.api.clear_payment(&breakdown).await {
            Ok(_) => {
                self.loan.entering_extra = false;
                self.status = format!("Extra payment of {amount} recorded.");
                self.refresh_loan().await?;
            }
            Err(e) => self.loan.form.error = Some(format!("Save failed: {e}")),
        }
        Ok(())
    }
}
