//! Details (selected item) and Info (table summary) panes.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;

/// Render the detail text of the selected item into `area`.
pub fn draw_details(f: &mut Frame, area: Rect, app: &App) {
  let block = pane(" Details ");
  let inner = block.inner(area);
  f.render_widget(block, area);

  let Some(text) = app.nav.detail() else {
    f.render_widget(
      Paragraph::new("Select an item to see its details.")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  };

  let lines: Vec<Line> = text.lines().map(field_line).collect();
  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

/// Render the summary of the listed table into `area`.
pub fn draw_info(f: &mut Frame, area: Rect, app: &App) {
  let block = pane(" Info ");
  let inner = block.inner(area);
  f.render_widget(block, area);

  let summary = app.nav.summary();
  let style = if summary.starts_with("Error: ") {
    Style::default().fg(Color::Red)
  } else {
    Style::default()
  };
  f.render_widget(
    Paragraph::new(summary.to_owned())
      .style(style)
      .wrap(Wrap { trim: false }),
    inner,
  );
}

fn pane(title: &str) -> Block<'_> {
  Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray))
}

/// `Label: value` with the label highlighted.
fn field_line(line: &str) -> Line<'_> {
  match line.split_once(": ") {
    Some((label, value)) => Line::from(vec![
      Span::styled(
        format!("{label}: "),
        Style::default()
          .fg(Color::Cyan)
          .add_modifier(Modifier::BOLD),
      ),
      Span::raw(value),
    ]),
    None => Line::raw(line),
  }
}
