use crate::state::AppState;
use crate::ui_state::{ActivePane, UIState};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use crate::ui::widget::{Widget, WidgetResult};

const BYTES_PER_ROW: u64 = 16;
const PAGE_ROWS: u64 = 10;

pub struct HexdumpView;

fn row_start(address: u64) -> u64 {
    address - address % BYTES_PER_ROW
}

impl Widget for HexdumpView {
    fn render(&self, f: &mut Frame, area: Rect, app_state: &AppState, ui_state: &mut UIState) {
        let is_active = ui_state.active_pane == ActivePane::Hexdump;
        let border_style = if is_active {
            Style::default().fg(ui_state.theme.border_active)
        } else {
            Style::default().fg(ui_state.theme.border_inactive)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Hexdump ")
            .style(
                Style::default()
                    .bg(ui_state.theme.background)
                    .fg(ui_state.theme.foreground),
            );
        let inner_area = block.inner(area);
        ui_state.hexdump_area = area;

        let visible_height = inner_area.height as u64;
        let cursor = ui_state.hexdump.cursor;
        let context_rows = visible_height / 2;
        let first_row = row_start(cursor).saturating_sub(context_rows * BYTES_PER_ROW);
        ui_state.hexdump.address = first_row;

        let items: Vec<ListItem> = (0..visible_height)
            .map(|i| {
                let row_addr = first_row + i * BYTES_PER_ROW;
                let bytes = app_state.core.read_memory(row_addr, BYTES_PER_ROW as usize);

                let mut spans = vec![Span::styled(
                    format!("{:08X}  ", row_addr),
                    Style::default().fg(ui_state.theme.address),
                )];
                for (j, b) in bytes.iter().enumerate() {
                    let mut style = Style::default().fg(ui_state.theme.hex_bytes);
                    if row_addr + j as u64 == cursor {
                        style = style
                            .bg(ui_state.theme.selection_bg)
                            .add_modifier(Modifier::BOLD);
                    }
                    spans.push(Span::styled(format!("{:02X}", b), style));
                    spans.push(Span::raw(if j == 7 { "  " } else { " " }));
                }
                let ascii: String = bytes.iter().map(|b| crate::utils::printable_ascii(*b)).collect();
                spans.push(Span::styled(
                    format!("| {}", ascii),
                    Style::default().fg(ui_state.theme.hex_ascii),
                ));

                let style = if row_addr == row_start(cursor) {
                    Style::default().bg(ui_state.theme.highlight_bg)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(spans)).style(style)
            })
            .collect();

        f.render_widget(List::new(items).block(block), area);
    }

    fn handle_input(
        &mut self,
        key: KeyEvent,
        _app_state: &mut AppState,
        ui_state: &mut UIState,
    ) -> WidgetResult {
        let cursor = &mut ui_state.hexdump.cursor;
        match key.code {
            KeyCode::Down | KeyCode::Char('j')
                if key.code == KeyCode::Down || key.modifiers.is_empty() =>
            {
                *cursor = cursor.saturating_add(BYTES_PER_ROW);
                WidgetResult::Handled
            }
            KeyCode::Up | KeyCode::Char('k')
                if key.code == KeyCode::Up || key.modifiers.is_empty() =>
            {
                *cursor = cursor.saturating_sub(BYTES_PER_ROW);
                WidgetResult::Handled
            }
            KeyCode::Right | KeyCode::Char('l') => {
                *cursor = cursor.saturating_add(1);
                WidgetResult::Handled
            }
            KeyCode::Left | KeyCode::Char('h') => {
                *cursor = cursor.saturating_sub(1);
                WidgetResult::Handled
            }
            KeyCode::PageDown => {
                *cursor = cursor.saturating_add(BYTES_PER_ROW * PAGE_ROWS);
                WidgetResult::Handled
            }
            KeyCode::Char('d') if key.modifiers == KeyModifiers::CONTROL => {
                *cursor = cursor.saturating_add(BYTES_PER_ROW * PAGE_ROWS);
                WidgetResult::Handled
            }
            KeyCode::PageUp => {
                *cursor = cursor.saturating_sub(BYTES_PER_ROW * PAGE_ROWS);
                WidgetResult::Handled
            }
            KeyCode::Char('u') if key.modifiers == KeyModifiers::CONTROL => {
                *cursor = cursor.saturating_sub(BYTES_PER_ROW * PAGE_ROWS);
                WidgetResult::Handled
            }
            _ => WidgetResult::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::config::SystemConfig;
    use crate::memory_core::MemoryCore;
    use crate::theme::Theme;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_cursor_moves_by_rows_and_pages() {
        let mut app_state = AppState::new(
            Box::new(MemoryCore::sample().unwrap()),
            Box::new(MemoryClipboard::default()),
            SystemConfig::default(),
        );
        let mut ui_state = UIState::new(Theme::default());
        ui_state.hexdump.cursor = 0x404018;

        let down = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        HexdumpView.handle_input(down, &mut app_state, &mut ui_state);
        assert_eq!(ui_state.hexdump.cursor, 0x404028);

        let page_up = KeyEvent::new(KeyCode::PageUp, KeyModifiers::NONE);
        HexdumpView.handle_input(page_up, &mut app_state, &mut ui_state);
        assert_eq!(ui_state.hexdump.cursor, 0x404028 - 160);
    }

    #[test]
    fn test_render_marks_window_start() {
        let app_state = AppState::new(
            Box::new(MemoryCore::sample().unwrap()),
            Box::new(MemoryClipboard::default()),
            SystemConfig::default(),
        );
        let mut ui_state = UIState::new(Theme::default());
        ui_state.hexdump.cursor = 0x401005;

        let mut terminal = Terminal::new(TestBackend::new(90, 12)).unwrap();
        terminal
            .draw(|f| HexdumpView.render(f, f.area(), &app_state, &mut ui_state))
            .unwrap();
        // 10 visible rows, cursor row centered.
        assert_eq!(ui_state.hexdump.address, 0x401000 - 5 * 16);
    }
}
