use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Cell, Chart, Clear, Dataset, GraphType, List, ListItem, Paragraph,
        Row, Table,
    },
    Frame,
};
use rust_decimal::prelude::ToPrimitive;

use crate::cli::state::{self, App};
use crate::cli::util::fmt_money;

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.size();

    // top tabs | main content | bottom status bar
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(size);

    let titles = ["Balances", "Chores", "Loan", "Help"]
        .into_iter()
        .map(|t| Line::from(Span::raw(t)))
        .collect::<Vec<_>>();
    let tabs = ratatui::widgets::Tabs::new(titles)
        .select(match app.tab {
            state::Tab::Balances => 0,
            state::Tab::Chores => 1,
            state::Tab::Loan => 2,
            state::Tab::Help => 3,
        })
        .block(Block::default().borders(Borders::ALL).title("Household Tracker"))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));
    f.render_widget(tabs, root[0]);

    match app.tab {
        state::Tab::Balances => draw_balances(f, root[1], app),
        state::Tab::Chores => draw_chores(f, root[1], app),
        state::Tab::Loan => draw_loan(f, root[1], app),
        state::Tab::Help => draw_help(f, root[1]),
    }

    f.render_widget(Paragraph::new(app.status.clone()), root[2]);

    if app.balances.creating {
        let area = center_rect(root[1], 54, 12);
        f.render_widget(Clear, area);
        draw_snapshot_modal(f, area, app);
    }
    if app.chores.creating {
        let area = center_rect(root[1], 50, 9);
        f.render_widget(Clear, area);
        draw_chore_modal(f, area, app);
    }
    if app.loan.entering_extra {
        let area = center_rect(root[1], 50, 9);
        f.render_widget(Clear, area);
        draw_extra_modal(f, area, app);
    }
}

// Balances page

fn draw_balances(f: &mut Frame, area: Rect, app: &mut App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let header = Row::new(vec!["Week", "Checking", "Savings", "Credit", "Cash", "Net"]).height(1);
    let body: Vec<Row> = app
        .balances
        .list
        .iter()
        .map(|s| {
            Row::new(vec![
                Cell::from(s.week_of.to_string()),
                Cell::from(fmt_money(&s.checking)),
                Cell::from(fmt_money(&s.savings)),
                Cell::from(fmt_money(&s.credit_card)),
                Cell::from(fmt_money(&s.cash)),
                Cell::from(fmt_money(&s.net())),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(12),
    ];

    let mut sel = app.balances.sel.clone();
    let table = Table::new(body, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Weekly balances  (n=new, x=delete, r=refresh)"),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(table, cols[0], &mut sel);
    app.balances.sel = sel;

    draw_net_chart(f, cols[1], app);
}

fn draw_net_chart(f: &mut Frame, area: Rect, app: &App) {
    let points: Vec<(f64, f64)> = app
        .balances
        .list
        .iter()
        .enumerate()
        .map(|(i, s)| (i as f64, s.net().to_f64().unwrap_or(0.0)))
        .collect();

    if points.len() < 2 {
        let p = Paragraph::new("Record at least two weeks to chart the trend.")
            .block(Block::default().borders(Borders::ALL).title("Net over time"));
        f.render_widget(p, area);
        return;
    }

    let y_min = points.iter().map(|(_, y)| *y).fold(f64::INFINITY, f64::min);
    let y_max = points.iter().map(|(_, y)| *y).fold(f64::NEG_INFINITY, f64::max);
    // Flat histories still need a visible band.
    let pad = ((y_max - y_min) * 0.1).max(1.0);

    let first = app.balances.list.first().map(|s| s.week_of.to_string()).unwrap_or_default();
    let last = app.balances.list.last().map(|s| s.week_of.to_string()).unwrap_or_default();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(Block::default().borders(Borders::ALL).title("Net over time"))
        .x_axis(
            Axis::default()
                .bounds([0.0, (points.len() - 1) as f64])
                .labels(vec![Span::raw(first), Span::raw(last)]),
        )
        .y_axis(
            Axis::default()
                .bounds([y_min - pad, y_max + pad])
                .labels(vec![
                    Span::raw(format!("{:.0}", y_min - pad)),
                    Span::raw(format!("{:.0}", y_max + pad)),
                ]),
        );
    f.render_widget(chart, area);
}

fn draw_snapshot_modal(f: &mut Frame, area: Rect, app: &mut App) {
    let form = &app.balances.form;
    let marker = |i: usize| if form.focus_index == i { "  <editing>" } else { "" };

    let lines = vec![
        format!("Week     : {}{}", form.week_of, marker(0)),
        format!("Checking : {}{}", form.checking, marker(1)),
        format!("Savings  : {}{}", form.savings, marker(2)),
        format!("Credit   : {}{}", form.credit_card, marker(3)),
        format!("Cash     : {}{}", form.cash, marker(4)),
        "".into(),
        "TAB: switch field | Enter: save | Esc: cancel".into(),
        form.error.clone().unwrap_or_default(),
    ]
    .join("\n");

    let p = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("New weekly snapshot"));
    f.render_widget(p, area);
}

// Chores page

fn draw_chores(f: &mut Frame, area: Rect, app: &mut App) {
    let items: Vec<ListItem> = app
        .chores
        .board
        .iter()
        .map(|s| {
            let staleness = match (s.days_since_done, s.days_overdue) {
                (None, _) => "never done".to_string(),
                (Some(d), Some(o)) if o > 0 => format!("{d}d ago, overdue by {o}d"),
                (Some(d), Some(o)) => format!("{d}d ago, due in {}d", -o),
                (Some(d), None) => format!("{d}d ago"),
            };
            let flag = if s.is_overdue() { "! " } else { "  " };
            ListItem::new(Line::from(format!(
                "{}{}  (every {}d)  {}",
                flag, s.chore.name, s.chore.cadence_days, staleness
            )))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Chores, most overdue first  (Enter=done, n=new, x=delete, r=refresh)"),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(list, area, &mut app.chores.sel);
}

fn draw_chore_modal(f: &mut Frame, area: Rect, app: &mut App) {
    let form = &app.chores.form;
    let marker = |i: usize| if form.focus_index == i { "  <editing>" } else { "" };

    let lines = vec![
        format!("Name         : {}{}", form.name, marker(0)),
        format!("Cadence days : {}{}", form.cadence, marker(1)),
        "".into(),
        "TAB: switch field | Enter: save | Esc: cancel".into(),
        form.error.clone().unwrap_or_default(),
    ]
    .join("\n");

    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("New chore"));
    f.render_widget(p, area);
}

// Loan page

fn draw_loan(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Min(6),
            Constraint::Min(6),
        ])
        .split(area);

    let summary = if let Some(s) = &app.loan.summary {
        format!(
            "Remaining balance : {}\nPrincipal paid    : {}\nInterest paid     : {}\nNext payment      : {} ({} scheduled)\nPayoff            : {}",
            fmt_money(&s.remaining_balance),
            fmt_money(&s.total_principal_paid),
            fmt_money(&s.total_interest_paid),
            s.next_payment_date,
            fmt_money(&app.terms.payment_amount),
            app.loan.projection_note.clone().unwrap_or_default(),
        )
    } else {
        "Loading…".to_string()
    };
    let p = Paragraph::new(summary).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Loan  (c=clear next, e=extra payment, x=delete, r=refresh)"),
    );
    f.render_widget(p, rows[0]);

    let header = Row::new(vec!["Due", "Payment", "Interest", "Principal", "Balance"]).height(1);
    let body: Vec<Row> = app
        .loan
        .upcoming
        .iter()
        .map(|s| {
            Row::new(vec![
                Cell::from(s.date.to_string()),
                Cell::from(fmt_money(&s.amount)),
                Cell::from(fmt_money(&s.interest)),
                Cell::from(fmt_money(&s.principal)),
                Cell::from(fmt_money(&s.balance)),
            ])
        })
        .collect();
    let widths = [
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(12),
    ];
    let upcoming = Table::new(body, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Upcoming"));
    f.render_widget(upcoming, rows[1]);

    let header = Row::new(vec!["Paid", "Amount", "Interest", "Principal", "Balance"]).height(1);
    let body: Vec<Row> = app
        .loan
        .ledger
        .iter()
        .map(|p| {
            Row::new(vec![
                Cell::from(p.payment_date.to_string()),
                Cell::from(fmt_money(&p.amount_paid)),
                Cell::from(fmt_money(&p.interest_portion)),
                Cell::from(fmt_money(&p.principal_portion)),
                Cell::from(fmt_money(&p.remaining_balance)),
            ])
        })
        .collect();
    let mut sel = app.loan.sel.clone();
    let ledger = Table::new(body, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Cleared payments"))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(ledger, rows[2], &mut sel);
    app.loan.sel = sel;
}

fn draw_extra_modal(f: &mut Frame, area: Rect, app: &mut App) {
    let form = &app.loan.form;
    let marker = |i: usize| if form.focus_index == i { "  <editing>" } else { "" };

    let lines = vec![
        format!("Amount : {}{}", form.amount, marker(0)),
        format!("Date   : {}{}", form.date, marker(1)),
        "".into(),
        "Interest accrues daily since the last payment.".into(),
        "TAB: switch field | Enter: record | Esc: cancel".into(),
        form.error.clone().unwrap_or_default(),
    ]
    .join("\n");

    let p = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Extra payment"));
    f.render_widget(p, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help_text = vec![
        "Global Keys:",
        "  q        : Quit",
        "  ?        : This help tab",
        "  Tab      : Switch tabs (Balances -> Chores -> Loan)",
        "",
        "Balances Tab:",
        "  Up/Down  : Navigate weeks",
        "  n        : Record this week's balances",
        "  x/Del    : Delete selected snapshot",
        "  r        : Refresh",
        "",
        "Chores Tab:",
        "  Up/Down  : Navigate list",
        "  Enter    : Log completion for today",
        "  n        : Add a chore",
        "  x/Del    : Remove chore and its history",
        "",
        "Loan Tab:",
        "  c        : Clear the next scheduled payment",
        "  e        : Record an extra payment",
        "  Up/Down  : Navigate cleared payments",
        "  x/Del    : Delete selected payment",
        "",
        "Forms: TAB switches fields, Enter submits, Esc cancels.",
    ]
    .join("\n");

    let p = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title("Help & Keybindings"));
    f.render_widget(p, area);
}

fn center_rect(rect: Rect, w: u16, h: u16) -> Rect {
    let x = rect.x + rect.width.saturating_sub(w) / 2;
    let y = rect.y + rect.height.saturating_sub(h) / 2;
    Rect {
        x,
        y,
        width: w.min(rect.width),
        height: h.min(rect.height),
    }
}
