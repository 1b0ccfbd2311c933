use crate::context_menu::{ContextAction, DialogRequest, MenuContext, MenuOutcome};
use crate::state::AppState;
use crate::ui::context_menu::{PopupResult, PopupState};
use crate::ui::dialog_breakpoint::BreakpointDialog;
use crate::ui::dialog_comment::CommentDialog;
use crate::ui::dialog_input::InputDialog;
use crate::ui::dialog_message::MessageDialog;
use crate::ui::dialog_text_edit::TextEditDialog;
use crate::ui::dialog_variables::EditVariableDialog;
use crate::ui::dialog_xrefs::XRefsDialog;
use crate::ui::ui;
use crate::ui::view_decompiler::{self, DecompilerView};
use crate::ui::view_hexdump::HexdumpView;
use crate::ui::widget::{Widget, WidgetResult};
use crate::ui_state::{ActivePane, UIState, WindowShell};
use crate::window::ViewKind;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};
use ratatui::{Terminal, backend::Backend};

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app_state: AppState,
    mut ui_state: UIState,
) -> Result<()>
where
    B::Error: std::error::Error + Send + Sync + 'static,
{
    watch_breakpoints(&mut app_state, &ui_state);
    view_decompiler::sync_context_menu(&app_state, &mut ui_state);
    loop {
        if ui_state.window.breakpoints_changed.replace(false) {
            view_decompiler::sync_context_menu(&app_state, &mut ui_state);
        }
        terminal.draw(|f| ui(f, &app_state, &mut ui_state))?;

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                handle_key(key, &mut app_state, &mut ui_state);
            }
            Event::Mouse(mouse) => handle_mouse(mouse, &mut app_state, &mut ui_state),
            _ => {}
        }

        if ui_state.should_quit {
            log::info!("quit requested");
            return Ok(());
        }
    }
}

/// Routes the core's breakpoint changes to the window. Changes made by the
/// menu's bulk toggle are skipped while its flag is raised.
pub fn watch_breakpoints(app_state: &mut AppState, ui_state: &UIState) {
    let listener = ui_state
        .window
        .breakpoint_listener(ui_state.context_menu.toggling_flag());
    app_state.core.set_breakpoint_listener(listener);
}

pub fn handle_key(key: KeyEvent, app_state: &mut AppState, ui_state: &mut UIState) {
    if let Some(mut dialog) = ui_state.active_dialog.take() {
        let result = dialog.handle_input(key, app_state, ui_state);
        finish_dialog(dialog, result, app_state, ui_state);
        return;
    }

    if let Some(mut popup) = ui_state.popup.take() {
        let result = popup.handle_key(key, &ui_state.context_menu.items);
        finish_popup(popup, result, app_state, ui_state);
        return;
    }

    match key.code {
        KeyCode::Char('q') if key.modifiers == KeyModifiers::CONTROL => {
            ui_state.should_quit = true;
            return;
        }
        KeyCode::Tab => {
            ui_state.active_pane = match ui_state.active_pane {
                ActivePane::Decompiler => ActivePane::Hexdump,
                ActivePane::Hexdump => ActivePane::Decompiler,
            };
            return;
        }
        _ => {}
    }

    let result = match ui_state.active_pane {
        ActivePane::Decompiler => DecompilerView.handle_input(key, app_state, ui_state),
        ActivePane::Hexdump => HexdumpView.handle_input(key, app_state, ui_state),
    };
    if let WidgetResult::Action(action) = result {
        dispatch_action(app_state, ui_state, action);
    }
}

pub fn handle_mouse(mouse: MouseEvent, app_state: &mut AppState, ui_state: &mut UIState) {
    if let Some(mut dialog) = ui_state.active_dialog.take() {
        let result = dialog.handle_mouse(mouse, app_state, ui_state);
        finish_dialog(dialog, result, app_state, ui_state);
        return;
    }

    if let Some(mut popup) = ui_state.popup.take() {
        let result =
            popup.handle_mouse(mouse, &ui_state.context_menu.items, ui_state.screen_area);
        finish_popup(popup, result, app_state, ui_state);
        return;
    }

    let result = DecompilerView.handle_mouse(mouse, app_state, ui_state);
    if let WidgetResult::Action(action) = result {
        dispatch_action(app_state, ui_state, action);
    }
}

fn finish_dialog(
    dialog: Box<dyn Widget>,
    result: WidgetResult,
    app_state: &mut AppState,
    ui_state: &mut UIState,
) {
    match result {
        WidgetResult::Close => {}
        WidgetResult::Action(action) => dispatch_action(app_state, ui_state, action),
        WidgetResult::Handled | WidgetResult::Ignored => {
            // A dialog may have opened another one in the meantime.
            if ui_state.active_dialog.is_none() {
                ui_state.active_dialog = Some(dialog);
            }
        }
    }
}

fn finish_popup(
    popup: PopupState,
    result: PopupResult,
    app_state: &mut AppState,
    ui_state: &mut UIState,
) {
    match result {
        PopupResult::Ignored | PopupResult::Handled => ui_state.popup = Some(popup),
        PopupResult::Close => close_context_menu(ui_state),
        PopupResult::Trigger(action) => {
            close_context_menu(ui_state);
            dispatch_action(app_state, ui_state, action);
        }
    }
}

/// Recomputes the menu for the current cursor and shows it at `anchor`.
pub fn open_context_menu(app_state: &AppState, ui_state: &mut UIState, anchor: (u16, u16)) {
    view_decompiler::sync_context_menu(app_state, ui_state);
    let UIState {
        context_menu,
        window,
        ..
    } = &mut *ui_state;
    context_menu.about_to_show(app_state.core.as_ref(), &*window);
    ui_state.popup = Some(PopupState::open(anchor, &ui_state.context_menu.items));
    log::debug!("context menu opened at {:?}", anchor);
}

pub fn close_context_menu(ui_state: &mut UIState) {
    ui_state.popup = None;
    ui_state.context_menu.about_to_hide();
}

/// Runs one menu action against the core and applies whatever the menu
/// asks the front-end to do next.
pub fn dispatch_action(app_state: &mut AppState, ui_state: &mut UIState, action: ContextAction) {
    let outcome = {
        let UIState {
            context_menu,
            window,
            ..
        } = &mut *ui_state;
        let mut ctx = MenuContext {
            core: app_state.core.as_mut(),
            window,
            clipboard: app_state.clipboard.as_mut(),
        };
        context_menu.trigger(&action, &mut ctx)
    };

    match outcome {
        Ok(MenuOutcome::Done) => {}
        Ok(MenuOutcome::Status(message)) => ui_state.set_status_message(message),
        Ok(MenuOutcome::CopyRequested) => copy_selection(app_state, ui_state),
        Ok(MenuOutcome::Dialog(request)) => open_dialog(app_state, ui_state, request),
        Err(e) => {
            log::warn!("{:?} failed: {:#}", action, e);
            ui_state.set_status_message(format!("Error: {:#}", e));
        }
    }

    drain_window_requests(app_state, ui_state);

    // One re-sync per action, however many breakpoints it touched.
    if ui_state.window.breakpoints_changed.replace(false) {
        log::debug!("breakpoints changed by {:?}", action);
    }
    view_decompiler::sync_context_menu(app_state, ui_state);
}

fn drain_window_requests(app_state: &AppState, ui_state: &mut UIState) {
    let WindowShell {
        pending_navigation,
        refresh_requested,
        ..
    } = &mut ui_state.window;
    let navigation = pending_navigation.take();
    let refresh = std::mem::take(refresh_requested);

    if refresh {
        view_decompiler::refresh(app_state, ui_state);
    }
    match navigation {
        Some((address, ViewKind::Hexdump)) => {
            ui_state.hexdump.cursor = address;
            ui_state.active_pane = ActivePane::Hexdump;
            ui_state.set_status_message(format!(
                "Hexdump at {}",
                app_state.core.address_string(address)
            ));
        }
        Some((address, ViewKind::Decompiler)) => {
            if !view_decompiler::navigate_to(app_state, ui_state, address) {
                ui_state.set_status_message(format!(
                    "No decompiled line at {}",
                    app_state.core.address_string(address)
                ));
            }
        }
        None => {}
    }
}

/// Copies the selection of the decompiler view: the word under the cursor,
/// or the whole line when the cursor is on whitespace.
fn copy_selection(app_state: &mut AppState, ui_state: &mut UIState) {
    let word = ui_state.context_menu.state().highlighted_word.clone();
    let text = if word.is_empty() {
        ui_state
            .decompiler
            .function
            .and_then(|f| app_state.core.decompile(f))
            .and_then(|d| d.lines.get(ui_state.decompiler.cursor_line).cloned())
            .map(|line| line.text.trim().to_string())
            .unwrap_or_default()
    } else {
        word
    };
    if text.is_empty() {
        return;
    }
    match app_state.clipboard.set_text(&text) {
        Ok(()) => ui_state.set_status_message(format!("Copied '{}'", text)),
        Err(e) => {
            log::warn!("copy failed: {:#}", e);
            ui_state.set_status_message(format!("Error: {:#}", e));
        }
    }
}

pub fn open_dialog(app_state: &AppState, ui_state: &mut UIState, request: DialogRequest) {
    let core = app_state.core.as_ref();
    let dialog: Box<dyn Widget> = match request {
        DialogRequest::Prompt {
            title,
            label,
            default,
            purpose,
        } => Box::new(InputDialog::new(title, label, default, purpose)),
        DialogRequest::Error { title, message } => {
            ui_state.set_status_message(&message);
            Box::new(MessageDialog::new(title, message))
        }
        DialogRequest::Comment { address, current } => {
            Box::new(CommentDialog::new(address, current.as_deref()))
        }
        DialogRequest::TextEdit {
            title,
            function,
            text,
        } => Box::new(TextEditDialog::new(title, function, &text)),
        DialogRequest::CreateBreakpoint { address } => Box::new(BreakpointDialog::create(address)),
        DialogRequest::EditBreakpoint(breakpoint) => Box::new(BreakpointDialog::edit(&breakpoint)),
        DialogRequest::EditVariable { function, variable } => {
            Box::new(EditVariableDialog::new(function, variable))
        }
        DialogRequest::XRefs {
            address,
            display,
            refs,
        } => Box::new(XRefsDialog::new(core, address, display, refs)),
    };
    ui_state.active_dialog = Some(dialog);
}
