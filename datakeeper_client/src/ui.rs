//! Rendering for every screen in `app::Screen`, grounded behaviorally on
//! `internal/client/auth_page.go` and `internal/client/data_page.go`'s
//! layout (menu/list on the left, form/detail on the right) but expressed
//! with `ratatui` widgets instead of `tview`'s primitives.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use crate::app::{App, AuthField, DataKind, DataMode, Screen};
use crate::grpc::{bin_summary, card_summary, password_pair_summary, text_summary};

pub fn render(frame: &mut Frame, app: &App) {
  match &app.screen {
    Screen::AuthMenu { selected } => render_auth_menu(frame, *selected),
    Screen::Login(form) => render_auth_form(frame, "sign in", form),
    Screen::Register(form) => render_auth_form(frame, "create account", form),
    Screen::Data(data) => render_data_screen(frame, app, data),
  }
}

fn render_auth_menu(frame: &mut Frame, selected: usize) {
  let area = frame.area();
  let items = ["sign in", "create account"];
  let list_items: Vec<ListItem> = items
    .iter()
    .enumerate()
    .map(|(i, label)| {
      let style = if i == selected {
        Style::default().add_modifier(Modifier::REVERSED)
      } else {
        Style::default()
      };
      ListItem::new(*label).style(style)
    })
    .collect();
  let list = List::new(list_items).block(
    Block::default()
      .borders(Borders::ALL)
      .title("datakeeper — ↑/↓ choose, enter confirm, q quit"),
  );
  frame.render_widget(list, area);
}

fn render_auth_form(frame: &mut Frame, title: &str, form: &crate::app::AuthForm) {
  let area = frame.area();
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(3),
      Constraint::Length(3),
      Constraint::Length(3),
      Constraint::Min(0),
    ])
    .split(area);

  let login_style = field_style(form.field == AuthField::Login);
  let password_style = field_style(form.field == AuthField::Password);

  frame.render_widget(
    Paragraph::new(form.login.as_str())
      .style(login_style)
      .block(Block::default().borders(Borders::ALL).title("login")),
    chunks[0],
  );
  frame.render_widget(
    Paragraph::new("*".repeat(form.password.chars().count()))
      .style(password_style)
      .block(Block::default().borders(Borders::ALL).title("password")),
    chunks[1],
  );

  let error = form.error.clone().unwrap_or_default();
  frame.render_widget(
    Paragraph::new(error).style(Style::default().fg(Color::Red)),
    chunks[2],
  );

  frame.render_widget(
    Paragraph::new(format!(
      "{title} — tab switch field, enter submit, esc back"
    )),
    chunks[3],
  );
}

fn field_style(active: bool) -> Style {
  if active {
    Style::default().fg(Color::Yellow)
  } else {
    Style::default()
  }
}

fn render_data_screen(frame: &mut Frame, app: &App, data: &crate::app::DataScreen) {
  let area = frame.area();
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
    .split(area);

  render_tabs(frame, rows[0], data.kind);
  render_list(frame, rows[1], app, data);
  render_status(frame, rows[2], data);

  match &data.mode {
    DataMode::Creating(form) => render_create_overlay(frame, area, form),
    DataMode::ConfirmRemove(_) => render_confirm_overlay(frame, area),
    DataMode::Browsing => {}
  }
}

fn render_tabs(frame: &mut Frame, area: Rect, selected: DataKind) {
  let spans: Vec<Span> = DataKind::ALL
    .iter()
    .map(|kind| {
      let label = format!(" {} ", kind.label());
      if *kind == selected {
        Span::styled(label, Style::default().add_modifier(Modifier::REVERSED))
      } else {
        Span::raw(label)
      }
    })
    .collect();
  frame.render_widget(
    Paragraph::new(Line::from(spans))
      .block(Block::default().borders(Borders::ALL).title("datakeeper")),
    area,
  );
}

fn render_list(frame: &mut Frame, area: Rect, app: &App, data: &crate::app::DataScreen) {
  let items: Vec<ListItem> = match data.kind {
    DataKind::PasswordPairs => app
      .snapshot
      .password_pairs
      .iter()
      .map(|p| ListItem::new(password_pair_summary(p)))
      .collect(),
    DataKind::Texts => app
      .snapshot
      .texts
      .iter()
      .map(|t| ListItem::new(text_summary(t)))
      .collect(),
    DataKind::Cards => app
      .snapshot
      .cards
      .iter()
      .map(|c| ListItem::new(card_summary(c)))
      .collect(),
    DataKind::Bins => app
      .snapshot
      .bins
      .iter()
      .map(|b| ListItem::new(bin_summary(b)))
      .collect(),
  };

  let mut state = ratatui::widgets::ListState::default();
  if !items.is_empty() {
    state.select(Some(data.list_index.min(items.len() - 1)));
  }

  let list = List::new(items)
    .block(
      Block::default()
        .borders(Borders::ALL)
        .title("↑/↓ move, ←/→/tab switch kind, n new, d remove, q quit"),
    )
    .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
  frame.render_stateful_widget(list, area, &mut state);
}

fn render_status(frame: &mut Frame, area: Rect, data: &crate::app::DataScreen) {
  let error = data.error.clone().unwrap_or_default();
  frame.render_widget(
    Paragraph::new(error).style(Style::default().fg(Color::Red)),
    area,
  );
}

fn render_create_overlay(frame: &mut Frame, area: Rect, form: &crate::app::CreateForm) {
  let overlay = centered(area, 60, 50);
  let fields = form.kind.form_fields();
  let constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(3)).collect();
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints(constraints)
    .split(overlay);

  frame.render_widget(ratatui::widgets::Clear, overlay);
  for (i, label) in fields.iter().enumerate() {
    let style = field_style(i == form.field);
    frame.render_widget(
      Paragraph::new(form.values[i].as_str())
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(*label)),
      chunks[i],
    );
  }
}

fn render_confirm_overlay(frame: &mut Frame, area: Rect) {
  let overlay = centered(area, 40, 20);
  frame.render_widget(ratatui::widgets::Clear, overlay);
  frame.render_widget(
    Paragraph::new("remove this entry? y/n").block(
      Block::default()
        .borders(Borders::ALL)
        .title("confirm"),
    ),
    overlay,
  );
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
  let vertical = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Percentage((100 - percent_y) / 2),
      Constraint::Percentage(percent_y),
      Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);
  Layout::default()
    .direction(Direction::Horizontal)
    .constraints([
      Constraint::Percentage((100 - percent_x) / 2),
      Constraint::Percentage(percent_x),
      Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(vertical[1])[1]
}
