//! Table list and item list panes.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::app::{App, Focus};

/// Render the table list (root list) into `area`.
pub fn draw_tables(f: &mut Frame, area: Rect, app: &App) {
  let labels = app.nav.tables().iter().map(|t| t.label()).collect();
  draw_list(
    f,
    area,
    " Tables ".to_owned(),
    labels,
    app.table_cursor,
    app.focus == Focus::Tables,
  );
}

/// Render the items of the selected table into `area`.
pub fn draw_items(f: &mut Frame, area: Rect, app: &App) {
  let items = app.nav.items();
  let title = match app.nav.current_table() {
    Some(table) => format!(" {} ({}) ", table.label(), items.len()),
    None => " Items ".to_owned(),
  };
  let labels = items.iter().map(|item| item.label()).collect();
  draw_list(f, area, title, labels, app.item_cursor, app.focus == Focus::Items);
}

fn draw_list(
  f: &mut Frame,
  area: Rect,
  title: String,
  labels: Vec<String>,
  cursor: usize,
  focused: bool,
) {
  let border = if focused { Color::Cyan } else { Color::DarkGray };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let mut state = ListState::default();
  state.select((!labels.is_empty()).then_some(cursor));

  // The cursor of an unfocused list stays visible but muted.
  let highlight = if focused {
    Style::default()
      .bg(Color::Blue)
      .fg(Color::White)
      .add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::Cyan)
  };

  let list = List::new(labels.into_iter().map(ListItem::new))
    .block(block)
    .highlight_style(highlight)
    .highlight_symbol("");

  f.render_stateful_widget(list, area, &mut state);
}
