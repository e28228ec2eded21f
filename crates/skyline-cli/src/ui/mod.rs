//! TUI rendering: header, three-column body, status bar.

pub mod detail;
pub mod lists;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Focus};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let title = match app.nav.current_table() {
    Some(table) => format!(" skyline  ›  {}", table.label()),
    None => " skyline".to_owned(),
  };
  let left = Span::styled(
    title,
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(format!("{date} "), Style::default().fg(Color::DarkGray));

  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([
      Constraint::Percentage(23),
      Constraint::Percentage(23),
      Constraint::Percentage(54),
    ])
    .split(area);

  lists::draw_tables(f, cols[0], app);
  lists::draw_items(f, cols[1], app);

  // Details over Info.
  let right = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
    .split(cols[2]);

  detail::draw_details(f, right[0], app);
  detail::draw_info(f, right[1], app);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match app.focus {
    Focus::Tables => ("TABLES", "↑↓/jk select  →/Enter items  r reload  q quit"),
    Focus::Items => ("ITEMS", "↑↓/jk select  PgUp/PgDn page  ←/Esc tables  q quit"),
  };

  let status = if app.status_msg.is_empty() { hints } else { app.status_msg.as_str() };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {status}"), Style::default().fg(Color::DarkGray));

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span]))
      .style(Style::default().bg(Color::Black)),
    area,
  );
}
