//! Keyboard focus and cursors on top of the [`Navigator`].
//!
//! Moving a cursor is a selection: it immediately asks the navigator for the
//! next level, the same way the panes are refreshed on every focus change.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use skyline_store_sqlite::SqliteStore;

use crate::nav::Navigator;

/// Cursor jump for PageUp / PageDown.
const PAGE: usize = 10;

// ─── Focus ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  /// The table list (root list).
  Tables,
  /// The item list of the selected table.
  Items,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub focus: Focus,

  pub nav: Navigator<SqliteStore>,

  /// Cursor within the table list.
  pub table_cursor: usize,

  /// Cursor within the item list.
  pub item_cursor: usize,

  /// One-line status message shown in the status bar.
  pub status_msg: String,
}

impl App {
  pub fn new(store: SqliteStore) -> Self {
    Self {
      focus: Focus::Tables,
      nav: Navigator::new(store),
      table_cursor: 0,
      item_cursor: 0,
      status_msg: String::new(),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Populate the table list and select its first entry.
  pub async fn load(&mut self) -> anyhow::Result<()> {
    self.nav.populate_root().await?;
    self.table_cursor = 0;
    self.select_table_at_cursor().await;
    Ok(())
  }

  async fn select_table_at_cursor(&mut self) {
    let Some(&table) = self.nav.tables().get(self.table_cursor) else {
      return;
    };
    self.item_cursor = 0;
    self.status_msg = format!("Loading {}…", table.label());
    match self.nav.select_table(table).await {
      Ok(()) => self.status_msg.clear(),
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }

  fn select_item_at_cursor(&mut self) { self.nav.select_item(self.item_cursor); }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }
    if key.code == KeyCode::Char('q') {
      return false;
    }

    match self.focus {
      Focus::Tables => self.handle_tables_key(key).await,
      Focus::Items => self.handle_items_key(key),
    }
    true
  }

  async fn handle_tables_key(&mut self, key: KeyEvent) {
    let len = self.nav.tables().len();
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        if self.table_cursor + 1 < len {
          self.table_cursor += 1;
          self.select_table_at_cursor().await;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        if self.table_cursor > 0 {
          self.table_cursor -= 1;
          self.select_table_at_cursor().await;
        }
      }
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if !self.nav.items().is_empty() {
          self.focus = Focus::Items;
          self.select_item_at_cursor();
        }
      }
      // Re-run the selection, e.g. after an error.
      KeyCode::Char('r') => self.select_table_at_cursor().await,
      _ => {}
    }
  }

  fn handle_items_key(&mut self, key: KeyEvent) {
    let len = self.nav.items().len();
    let last = len.saturating_sub(1);
    let before = self.item_cursor;

    match key.code {
      KeyCode::Down | KeyCode::Char('j') => self.item_cursor = (self.item_cursor + 1).min(last),
      KeyCode::Up | KeyCode::Char('k') => self.item_cursor = self.item_cursor.saturating_sub(1),
      KeyCode::PageDown | KeyCode::Char(']') => {
        self.item_cursor = (self.item_cursor + PAGE).min(last)
      }
      KeyCode::PageUp | KeyCode::Char('[') => {
        self.item_cursor = self.item_cursor.saturating_sub(PAGE)
      }
      KeyCode::Home | KeyCode::Char('g') => self.item_cursor = 0,
      KeyCode::End | KeyCode::Char('G') => self.item_cursor = last,
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.focus = Focus::Tables;
        return;
      }
      _ => return,
    }

    if self.item_cursor != before {
      self.select_item_at_cursor();
    }
  }
}
