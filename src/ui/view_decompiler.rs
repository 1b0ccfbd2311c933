//! Pseudocode pane. Owns the cursor the context menu is opened from.

use crate::annotation::{CodeLine, DecompiledFunction};
use crate::core::Address;
use crate::state::AppState;
use crate::ui_state::{ActivePane, UIState};
use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use crate::ui::widget::{Widget, WidgetResult};

/// Breakpoint marker, address column and a space.
const GUTTER_WIDTH: u16 = 2 + 10 + 1;

pub struct DecompilerView;

fn current_function(app_state: &AppState, ui_state: &UIState) -> Option<DecompiledFunction> {
    ui_state
        .decompiler
        .function
        .and_then(|addr| app_state.core.decompile(addr))
}

/// Pushes everything the menu derives from the cursor: line addresses,
/// annotation and word under the cursor, and the line's breakpoints.
pub fn sync_context_menu(app_state: &AppState, ui_state: &mut UIState) {
    let function = ui_state.decompiler.function;
    let decompiled = current_function(app_state, ui_state);
    let line = decompiled
        .as_ref()
        .and_then(|d| d.lines.get(ui_state.decompiler.cursor_line));
    let col = ui_state.decompiler.cursor_col;
    let first = line.and_then(CodeLine::first_offset);

    let menu = &mut ui_state.context_menu;
    menu.set_decompiled_function_address(function);
    menu.set_first_offset_in_line(first);
    let offset = line.and_then(|l| l.offset_at(col));
    menu.set_offset(offset.or(function).unwrap_or_default());
    menu.set_annotation_here(line.and_then(|l| l.annotation_at(col)).cloned());
    menu.set_cur_highlighted_word(line.map(|l| l.word_at(col)).unwrap_or_default());
    menu.set_available_breakpoints(
        line.map(|l| app_state.breakpoints_in(&l.offsets))
            .unwrap_or_default(),
    );
}

/// Shows `function`, cursor on its first line.
pub fn select_function(app_state: &AppState, ui_state: &mut UIState, function: Address) {
    ui_state.decompiler.function = Some(function);
    ui_state.decompiler.cursor_line = 0;
    ui_state.decompiler.cursor_col = 0;
    ui_state.decompiler.scroll = 0;
    sync_context_menu(app_state, ui_state);
}

/// Moves the cursor to the line covering `address`, switching function if
/// needed. Returns false when no decompiled line covers it.
pub fn navigate_to(app_state: &AppState, ui_state: &mut UIState, address: Address) -> bool {
    let core = app_state.core.as_ref();
    let mut target = None;
    for function in core.functions() {
        let Some(decompiled) = core.decompile(function.offset) else {
            continue;
        };
        if let Some(line) = decompiled
            .lines
            .iter()
            .position(|l| l.offsets.contains(&address))
        {
            target = Some((function.offset, line));
            break;
        }
        if function.offset == address {
            target = Some((function.offset, 0));
        }
    }
    let Some((function, line)) = target else {
        return false;
    };
    ui_state.decompiler.function = Some(function);
    ui_state.decompiler.cursor_line = line;
    ui_state.decompiler.cursor_col = 0;
    ui_state.active_pane = ActivePane::Decompiler;
    sync_context_menu(app_state, ui_state);
    true
}

/// Clamps the cursor after the function text changed underneath it.
pub fn refresh(app_state: &AppState, ui_state: &mut UIState) {
    if let Some(function) = ui_state.decompiler.function
        && app_state.core.function_at(function).is_none()
    {
        ui_state.decompiler.function = app_state.core.functions().first().map(|f| f.offset);
    }
    let lines = current_function(app_state, ui_state)
        .map(|d| d.lines)
        .unwrap_or_default();
    let view = &mut ui_state.decompiler;
    view.cursor_line = view.cursor_line.min(lines.len().saturating_sub(1));
    let len = lines.get(view.cursor_line).map(CodeLine::len).unwrap_or(0);
    view.cursor_col = view.cursor_col.min(len.saturating_sub(1));
    sync_context_menu(app_state, ui_state);
}

fn switch_function(app_state: &AppState, ui_state: &mut UIState, forward: bool) {
    let functions = app_state.core.functions();
    if functions.is_empty() {
        return;
    }
    let pos = ui_state
        .decompiler
        .function
        .and_then(|current| functions.iter().position(|f| f.offset == current));
    let next = match (pos, forward) {
        (None, _) => 0,
        (Some(p), true) => (p + 1) % functions.len(),
        (Some(0), false) => functions.len() - 1,
        (Some(p), false) => p - 1,
    };
    select_function(app_state, ui_state, functions[next].offset);
    ui_state.set_status_message(format!("Function {}", functions[next].name));
}

/// Screen cell of the cursor, used to anchor the keyboard-opened menu.
pub fn cursor_screen_position(ui_state: &UIState) -> (u16, u16) {
    let area = ui_state.decompiler_area;
    let view = &ui_state.decompiler;
    let row = view.cursor_line.saturating_sub(view.scroll) as u16;
    (
        area.x + 1 + GUTTER_WIDTH + view.cursor_col as u16,
        area.y + 1 + row + 1,
    )
}

fn render_line<'a>(
    line: &'a CodeLine,
    is_cursor_line: bool,
    cursor_col: usize,
    app_state: &AppState,
    ui_state: &UIState,
) -> Line<'a> {
    let theme = &ui_state.theme;
    let core = app_state.core.as_ref();

    let marker = line
        .offsets
        .iter()
        .filter_map(|addr| core.breakpoint_at(*addr))
        .map(|bp| bp.enabled)
        .reduce(|a, b| a || b);
    let mut spans = vec![match marker {
        Some(true) => Span::styled("● ", Style::default().fg(theme.breakpoint)),
        Some(false) => Span::styled("○ ", Style::default().fg(theme.breakpoint_disabled)),
        None => Span::raw("  "),
    }];
    spans.push(Span::styled(
        match line.first_offset() {
            Some(addr) => format!("{:010x} ", addr),
            None => " ".repeat(11),
        },
        Style::default().fg(theme.address),
    ));

    // Token under the cursor gets the selection background.
    let cursor_span = if is_cursor_line {
        line.annotations
            .iter()
            .filter(|s| s.start <= cursor_col && cursor_col < s.end)
            .min_by_key(|s| s.end - s.start)
    } else {
        None
    };

    for (i, ch) in line.text.chars().enumerate() {
        let mut style = line
            .annotations
            .iter()
            .filter(|s| s.start <= i && i < s.end)
            .min_by_key(|s| s.end - s.start)
            .map(|s| Style::default().fg(theme.annotation_fg(&s.annotation)))
            .unwrap_or_else(|| Style::default().fg(theme.foreground));
        if cursor_span.is_some_and(|s| s.start <= i && i < s.end) {
            style = style.bg(theme.selection_bg).add_modifier(Modifier::BOLD);
        }
        if is_cursor_line && i == cursor_col {
            style = style.add_modifier(Modifier::REVERSED);
        }
        spans.push(Span::styled(ch.to_string(), style));
    }

    if let Some(comment) = line.first_offset().and_then(|addr| core.comment_at(addr)) {
        spans.push(Span::styled(
            format!("  // {}", comment),
            Style::default().fg(theme.comment),
        ));
    }
    Line::from(spans)
}

impl Widget for DecompilerView {
    fn render(&self, f: &mut Frame, area: Rect, app_state: &AppState, ui_state: &mut UIState) {
        let is_active = ui_state.active_pane == ActivePane::Decompiler;
        let border_style = if is_active {
            Style::default().fg(ui_state.theme.border_active)
        } else {
            Style::default().fg(ui_state.theme.border_inactive)
        };
        let decompiled = current_function(app_state, ui_state);
        let title = decompiled
            .as_ref()
            .map(|d| format!(" Decompiler: {} ", d.name))
            .unwrap_or_else(|| " Decompiler ".to_string());

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title)
            .style(
                Style::default()
                    .bg(ui_state.theme.background)
                    .fg(ui_state.theme.foreground),
            );
        let inner = block.inner(area);
        ui_state.decompiler_area = area;

        let visible = inner.height as usize;
        let view = &mut ui_state.decompiler;
        if view.cursor_line < view.scroll {
            view.scroll = view.cursor_line;
        } else if visible > 0 && view.cursor_line >= view.scroll + visible {
            view.scroll = view.cursor_line + 1 - visible;
        }
        let (scroll, cursor_line, cursor_col) = (view.scroll, view.cursor_line, view.cursor_col);

        let items: Vec<ListItem> = match &decompiled {
            Some(d) => d
                .lines
                .iter()
                .enumerate()
                .skip(scroll)
                .take(visible)
                .map(|(i, line)| {
                    let is_cursor_line = i == cursor_line;
                    let item = ListItem::new(render_line(
                        line,
                        is_cursor_line,
                        cursor_col,
                        app_state,
                        ui_state,
                    ));
                    if is_cursor_line {
                        item.style(Style::default().bg(ui_state.theme.highlight_bg))
                    } else {
                        item
                    }
                })
                .collect(),
            None => vec![ListItem::new("No function selected. Use [ and ] to pick one.")],
        };

        f.render_widget(List::new(items).block(block), area);
    }

    fn handle_input(
        &mut self,
        key: KeyEvent,
        app_state: &mut AppState,
        ui_state: &mut UIState,
    ) -> WidgetResult {
        let lines = current_function(app_state, ui_state)
            .map(|d| d.lines)
            .unwrap_or_default();
        let line_len = |idx: usize| lines.get(idx).map(CodeLine::len).unwrap_or(0);
        let view = &mut ui_state.decompiler;
        let last_line = lines.len().saturating_sub(1);

        let moved = match key.code {
            KeyCode::Down | KeyCode::Char('j') if key.modifiers.is_empty() => {
                view.cursor_line = (view.cursor_line + 1).min(last_line);
                true
            }
            KeyCode::Up | KeyCode::Char('k') if key.modifiers.is_empty() => {
                view.cursor_line = view.cursor_line.saturating_sub(1);
                true
            }
            KeyCode::Right | KeyCode::Char('l') if key.modifiers.is_empty() => {
                view.cursor_col += 1;
                true
            }
            KeyCode::Left | KeyCode::Char('h') if key.modifiers.is_empty() => {
                view.cursor_col = view.cursor_col.saturating_sub(1);
                true
            }
            KeyCode::Home => {
                view.cursor_col = 0;
                true
            }
            KeyCode::End => {
                view.cursor_col = line_len(view.cursor_line).saturating_sub(1);
                true
            }
            KeyCode::PageDown => {
                view.cursor_line = (view.cursor_line + 10).min(last_line);
                true
            }
            KeyCode::PageUp => {
                view.cursor_line = view.cursor_line.saturating_sub(10);
                true
            }
            _ => false,
        };
        if moved {
            view.cursor_col = view
                .cursor_col
                .min(line_len(view.cursor_line).saturating_sub(1));
            sync_context_menu(app_state, ui_state);
            return WidgetResult::Handled;
        }

        match key.code {
            KeyCode::Char(']') => {
                switch_function(app_state, ui_state, true);
                WidgetResult::Handled
            }
            KeyCode::Char('[') => {
                switch_function(app_state, ui_state, false);
                WidgetResult::Handled
            }
            KeyCode::F(10) if key.modifiers == KeyModifiers::SHIFT => {
                let anchor = cursor_screen_position(ui_state);
                crate::events::open_context_menu(app_state, ui_state, anchor);
                WidgetResult::Handled
            }
            KeyCode::Char('m') if key.modifiers.is_empty() => {
                let anchor = cursor_screen_position(ui_state);
                crate::events::open_context_menu(app_state, ui_state, anchor);
                WidgetResult::Handled
            }
            _ => {
                sync_context_menu(app_state, ui_state);
                match ui_state.context_menu.shortcut_action(&key) {
                    Some(action) => WidgetResult::Action(action),
                    None => WidgetResult::Ignored,
                }
            }
        }
    }

    fn handle_mouse(
        &mut self,
        mouse: MouseEvent,
        app_state: &mut AppState,
        ui_state: &mut UIState,
    ) -> WidgetResult {
        let area = ui_state.decompiler_area;
        let inside = mouse.column > area.x
            && mouse.column < area.x + area.width.saturating_sub(1)
            && mouse.row > area.y
            && mouse.row < area.y + area.height.saturating_sub(1);
        if !inside {
            return WidgetResult::Ignored;
        }
        let button = match mouse.kind {
            MouseEventKind::Down(button @ (MouseButton::Left | MouseButton::Right)) => button,
            MouseEventKind::ScrollDown => {
                let view = &mut ui_state.decompiler;
                view.scroll += 1;
                return WidgetResult::Handled;
            }
            MouseEventKind::ScrollUp => {
                let view = &mut ui_state.decompiler;
                view.scroll = view.scroll.saturating_sub(1);
                return WidgetResult::Handled;
            }
            _ => return WidgetResult::Ignored,
        };

        let line_count = current_function(app_state, ui_state)
            .map(|d| d.lines.len())
            .unwrap_or(0);
        let view = &mut ui_state.decompiler;
        let row = (mouse.row - area.y - 1) as usize + view.scroll;
        if row < line_count {
            view.cursor_line = row;
            let text_start = area.x + 1 + GUTTER_WIDTH;
            view.cursor_col = mouse.column.saturating_sub(text_start) as usize;
        }
        ui_state.active_pane = ActivePane::Decompiler;
        sync_context_menu(app_state, ui_state);

        if button == MouseButton::Right {
            crate::events::open_context_menu(app_state, ui_state, (mouse.column, mouse.row));
        }
        WidgetResult::Handled
    }
}
