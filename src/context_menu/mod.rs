//! Right-click menu of the decompiler pane.
//!
//! The owner (the decompiler view) pushes cursor state through the setters,
//! then calls [`DecompilerContextMenu::about_to_show`] right before the popup
//! becomes interactive. Every label, visibility flag and dynamic submenu is
//! derived again from that state on each open, so the recomputation is
//! idempotent. [`DecompilerContextMenu::about_to_hide`] restores the defaults
//! that only some annotation kinds change.

pub mod actions;
pub mod items;

use std::cell::Cell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub use actions::{ContextAction, DialogRequest, MenuContext, MenuOutcome, PromptPurpose};
pub use items::{ItemId, MenuItem, Shortcut, Submenu};

use crate::annotation::Annotation;
use crate::core::{Address, AnalysisCore};
use crate::window::{AddressTypeHint, MainWindow};

const RENAME_TOOLTIP: &str =
    "Can't rename this variable. Only local variables defined in disassembly can be renamed.";
const EDIT_VARIABLE_TOOLTIP: &str =
    "Can't edit this variable. Only local variables defined in disassembly can be edited.";

/// Cursor-derived state, replaced by the owner before each open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuState {
    pub offset: Address,
    pub first_offset_in_line: Option<Address>,
    pub decompiled_function: Option<Address>,
    pub highlighted_word: String,
    pub available_breakpoints: Vec<Address>,
}

/// Sets the shared toggling flag for its lifetime.
pub struct TogglingGuard {
    flag: Rc<Cell<bool>>,
}

impl Drop for TogglingGuard {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

pub struct DecompilerContextMenu {
    pub items: Vec<MenuItem>,
    state: MenuState,
    annotation: Option<Annotation>,
    toggling_breakpoints: Rc<Cell<bool>>,
    tooltips_visible: bool,
    shortcut_scope: Vec<(Shortcut, ItemId)>,
}

impl Default for DecompilerContextMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl DecompilerContextMenu {
    pub fn new() -> Self {
        let mut breakpoint_menu = Submenu::new("Breakpoint");
        breakpoint_menu.push(
            MenuItem::new(
                ItemId::ToggleBreakpoint,
                "Add/remove breakpoint",
                Some(ContextAction::ToggleBreakpoint),
            )
            .with_shortcuts(&[
                Shortcut::new(KeyCode::F(2), KeyModifiers::NONE),
                Shortcut::ctrl('b'),
            ]),
        );
        breakpoint_menu.push(
            MenuItem::new(
                ItemId::AdvancedBreakpoint,
                "Advanced breakpoint",
                Some(ContextAction::AdvancedBreakpoint),
            )
            .with_shortcuts(&[Shortcut::new(KeyCode::F(2), KeyModifiers::CONTROL)]),
        );

        let mut debug_menu = Submenu::new("Debug");
        debug_menu.push(MenuItem::new(
            ItemId::ContinueUntil,
            "Continue until line",
            Some(ContextAction::ContinueUntil),
        ));
        debug_menu.push(MenuItem::new(
            ItemId::SetPc,
            "Set PC",
            Some(ContextAction::SetPc),
        ));

        let mut delete_name = MenuItem::new(
            ItemId::DeleteName,
            "Delete <name>",
            Some(ContextAction::DeleteName),
        );
        delete_name.visible = false;

        let items = vec![
            MenuItem::new(ItemId::Copy, "Copy", Some(ContextAction::Copy))
                .with_shortcuts(&[Shortcut::ctrl('c')]),
            MenuItem::new(
                ItemId::CopyInstructionAddress,
                "Copy address (<address>)",
                Some(ContextAction::CopyInstructionAddress),
            ),
            MenuItem::new(
                ItemId::CopyReferenceAddress,
                "Copy address of [flag] (<address>)",
                Some(ContextAction::CopyReferenceAddress),
            )
            .with_shortcuts(&[Shortcut::new(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL | KeyModifiers::SHIFT,
            )]),
            MenuItem::separator(ItemId::Separator),
            MenuItem::submenu(ItemId::ShowIn, Submenu::new("Show in")),
            MenuItem::separator(ItemId::CopySeparator),
            MenuItem::new(
                ItemId::AddComment,
                "Add Comment",
                Some(ContextAction::AddComment),
            )
            .with_shortcuts(&[Shortcut::key(';')]),
            MenuItem::new(
                ItemId::DeleteComment,
                "Delete comment",
                Some(ContextAction::DeleteComment),
            ),
            MenuItem::new(
                ItemId::RenameThingHere,
                "Rename function at cursor",
                Some(ContextAction::RenameThingHere),
            )
            .with_shortcuts(&[Shortcut::key('n')])
            .with_tooltip(RENAME_TOOLTIP),
            delete_name,
            MenuItem::new(ItemId::XRefs, "Show X-Refs", Some(ContextAction::XRefs))
                .with_shortcuts(&[Shortcut::key('x')]),
            MenuItem::new(
                ItemId::EditFunctionVariables,
                "Edit variable <name of variable>",
                Some(ContextAction::EditFunctionVariables),
            )
            .with_shortcuts(&[Shortcut::key('y')])
            .with_tooltip(EDIT_VARIABLE_TOOLTIP),
            MenuItem::separator(ItemId::Separator),
            MenuItem::submenu(ItemId::BreakpointMenu, breakpoint_menu),
            MenuItem::submenu(ItemId::DebugMenu, debug_menu),
            MenuItem::new(
                ItemId::EditAnnotation,
                "Edit annotation",
                Some(ContextAction::EditAnnotation),
            ),
        ];

        let mut shortcut_scope = Vec::new();
        items::collect_leaf_shortcuts(&items, &mut shortcut_scope);

        Self {
            items,
            state: MenuState::default(),
            annotation: None,
            toggling_breakpoints: Rc::new(Cell::new(false)),
            tooltips_visible: false,
            shortcut_scope,
        }
    }

    // Setters used by the owner before opening.

    pub fn set_annotation_here(&mut self, annotation: Option<Annotation>) {
        self.annotation = annotation;
    }

    pub fn set_cur_highlighted_word(&mut self, word: impl Into<String>) {
        self.state.highlighted_word = word.into();
    }

    pub fn set_offset(&mut self, offset: Address) {
        self.state.offset = offset;
    }

    pub fn set_decompiled_function_address(&mut self, function: Option<Address>) {
        self.state.decompiled_function = function;
    }

    pub fn set_first_offset_in_line(&mut self, first: Option<Address>) {
        self.state.first_offset_in_line = first;
    }

    pub fn set_available_breakpoints(&mut self, breakpoints: Vec<Address>) {
        self.state.available_breakpoints = breakpoints;
    }

    pub fn state(&self) -> &MenuState {
        &self.state
    }

    pub fn annotation_here(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    pub fn first_offset_in_line(&self) -> Option<Address> {
        self.state.first_offset_in_line
    }

    pub fn tooltips_visible(&self) -> bool {
        self.tooltips_visible
    }

    /// Shared handle the owner checks before reacting to breakpoint changes.
    pub fn toggling_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.toggling_breakpoints)
    }

    pub fn is_toggling_breakpoints(&self) -> bool {
        self.toggling_breakpoints.get()
    }

    pub(crate) fn toggling_guard(&self) -> TogglingGuard {
        self.toggling_breakpoints.set(true);
        TogglingGuard {
            flag: Rc::clone(&self.toggling_breakpoints),
        }
    }

    pub fn item(&self, id: ItemId) -> Option<&MenuItem> {
        items::find(&self.items, id)
    }

    fn with_item(&mut self, id: ItemId, f: impl FnOnce(&mut MenuItem)) {
        if let Some(item) = items::find_mut(&mut self.items, id) {
            f(item);
        }
    }

    fn set_visible(&mut self, id: ItemId, visible: bool) {
        self.with_item(id, |item| item.visible = visible);
    }

    fn set_disabled(&mut self, id: ItemId, disabled: bool) {
        self.with_item(id, |item| item.disabled = disabled);
    }

    fn set_text(&mut self, id: ItemId, text: String) {
        self.with_item(id, |item| item.name = text);
    }

    fn function_address(&self) -> Address {
        self.state.decompiled_function.unwrap_or(self.state.offset)
    }

    fn variable_present(&self, core: &dyn AnalysisCore) -> bool {
        let Some(name) = self.annotation.as_ref().and_then(Annotation::variable_name) else {
            return false;
        };
        core.variables_at(self.state.offset)
            .iter()
            .any(|var| var.name == name)
    }

    /// Leaf action bound to `key` inside this menu's scope, if it may fire.
    pub fn shortcut_action(&self, key: &KeyEvent) -> Option<ContextAction> {
        self.shortcut_scope
            .iter()
            .find(|(shortcut, _)| shortcut.matches(key))
            .and_then(|(_, id)| self.item(*id))
            .filter(|item| !item.disabled)
            .and_then(|item| item.action.clone())
    }

    pub fn about_to_show(&mut self, core: &dyn AnalysisCore, window: &dyn MainWindow) {
        if let Some(first) = self.state.first_offset_in_line {
            self.set_visible(ItemId::ShowIn, true);
            self.set_visible(ItemId::AddComment, true);
            if core.comment_at(first).is_some_and(|c| !c.is_empty()) {
                self.set_visible(ItemId::DeleteComment, true);
                self.set_text(ItemId::AddComment, "Edit Comment".to_string());
            } else {
                self.set_visible(ItemId::DeleteComment, false);
                self.set_text(ItemId::AddComment, "Add Comment".to_string());
            }
        } else {
            self.set_visible(ItemId::ShowIn, false);
            self.set_visible(ItemId::AddComment, false);
            self.set_visible(ItemId::DeleteComment, false);
        }

        let breakpoints_in_line = self.build_breakpoints_in_line_menu(core);

        self.set_visible(ItemId::DebugMenu, core.is_debugging());

        let count = self.state.available_breakpoints.len();
        let toggle_text = match count {
            0 => "Add breakpoint",
            1 => "Remove breakpoint",
            _ => "Remove all breakpoints in line",
        };
        self.set_text(ItemId::ToggleBreakpoint, toggle_text.to_string());
        let attached = (count > 1).then_some(breakpoints_in_line);
        self.with_item(ItemId::AdvancedBreakpoint, |item| item.submenu = attached);
        let advanced_text = if count > 0 {
            "Edit breakpoint"
        } else {
            "Advanced breakpoint"
        };
        self.set_text(ItemId::AdvancedBreakpoint, advanced_text.to_string());

        let pc = core.register_name("PC").to_uppercase();
        self.set_text(ItemId::SetPc, format!("Set {} here", pc));

        match self.annotation.clone() {
            None | Some(Annotation::ConstantVariable { .. }) => {
                self.set_visible(ItemId::RenameThingHere, false);
                self.set_visible(ItemId::CopySeparator, false);
            }
            Some(annotation) => {
                self.set_visible(ItemId::CopySeparator, true);
                match annotation {
                    Annotation::FunctionName { name, .. } => {
                        self.set_text(ItemId::RenameThingHere, format!("Rename function {}", name));
                    }
                    Annotation::GlobalVariable { offset } => match core.flag_at(offset) {
                        Some(flag) => {
                            self.set_text(ItemId::RenameThingHere, format!("Rename {}", flag.name));
                            self.set_text(ItemId::DeleteName, format!("Remove {}", flag.name));
                            self.set_visible(ItemId::DeleteName, true);
                        }
                        None => {
                            let text = format!("Add name to {}", self.state.highlighted_word);
                            self.set_text(ItemId::RenameThingHere, text);
                        }
                    },
                    // Nothing to rename on a plain token.
                    Annotation::Other => self.set_visible(ItemId::RenameThingHere, false),
                    _ => {}
                }
            }
        }

        let copy_text = format!("Copy address ({})", core.address_string(self.state.offset));
        self.set_text(ItemId::CopyInstructionAddress, copy_text);

        if let Some(annotation) = self.annotation.clone().filter(Annotation::is_reference) {
            self.set_visible(ItemId::CopyReferenceAddress, true);
            self.set_visible(ItemId::XRefs, true);
            let address = annotation.reference_offset().unwrap_or_default();
            let address_text = core.address_string(address);
            let text = match (&annotation, core.flag_at(address)) {
                (Annotation::FunctionName { name, .. }, _) => {
                    format!("Copy address of {} ({})", name, address_text)
                }
                (_, Some(flag)) => format!("Copy address of {} ({})", flag.name, address_text),
                (_, None) => format!("Copy address ({})", address_text),
            };
            self.set_text(ItemId::CopyReferenceAddress, text);
        } else {
            self.set_visible(ItemId::XRefs, false);
            self.set_visible(ItemId::CopyReferenceAddress, false);
        }

        let show_in = window.create_show_in_menu(self.state.offset, None);
        self.with_item(ItemId::ShowIn, |item| item.submenu = Some(show_in));
        self.update_target_menu_actions(core, window);

        match self.annotation.clone() {
            Some(annotation) if annotation.is_variable() => {
                let name = annotation.variable_name().unwrap_or_default().to_string();
                self.set_text(ItemId::EditFunctionVariables, format!("Edit variable {}", name));
                self.set_text(ItemId::RenameThingHere, format!("Rename variable {}", name));
                if !self.variable_present(core) {
                    self.set_disabled(ItemId::EditFunctionVariables, true);
                    self.set_disabled(ItemId::RenameThingHere, true);
                    self.tooltips_visible = true;
                }
            }
            _ => self.set_visible(ItemId::EditFunctionVariables, false),
        }
    }

    pub fn about_to_hide(&mut self) {
        self.set_visible(ItemId::AddComment, true);
        self.set_visible(ItemId::RenameThingHere, true);
        self.set_disabled(ItemId::RenameThingHere, false);
        self.set_visible(ItemId::DeleteName, false);
        self.set_visible(ItemId::EditFunctionVariables, true);
        self.set_disabled(ItemId::EditFunctionVariables, false);
        self.tooltips_visible = false;
    }

    fn build_breakpoints_in_line_menu(&self, core: &dyn AnalysisCore) -> Submenu {
        let mut menu = Submenu::new("Breakpoints in line");
        for address in &self.state.available_breakpoints {
            menu.push(MenuItem::new(
                ItemId::BreakpointInLine,
                &core.address_string(*address),
                Some(ContextAction::EditBreakpointAt(*address)),
            ));
        }
        menu
    }

    /// Drops last cycle's "show target in" entry and inserts a fresh one
    /// before the copy separator when the cursor is on a reference.
    fn update_target_menu_actions(&mut self, core: &dyn AnalysisCore, window: &dyn MainWindow) {
        self.items.retain(|item| item.id != ItemId::ShowTarget);

        let Some(annotation) = self.annotation.as_ref().filter(|a| a.is_reference()) else {
            return;
        };
        let (name, hint, address) = match annotation {
            Annotation::FunctionName { name, offset } => (
                format!("{} ({})", name, core.address_string(*offset)),
                AddressTypeHint::Function,
                *offset,
            ),
            Annotation::GlobalVariable { offset } | Annotation::ConstantVariable { offset } => {
                let shown = core
                    .flag_at(*offset)
                    .map(|flag| flag.name)
                    .unwrap_or_else(|| core.address_string(*offset));
                (format!("Show {} in", shown), AddressTypeHint::Data, *offset)
            }
            _ => return,
        };

        let mut entry = MenuItem::submenu(
            ItemId::ShowTarget,
            window.create_show_in_menu(address, Some(hint)),
        );
        entry.name = name;
        let index = self
            .items
            .iter()
            .position(|item| item.id == ItemId::CopySeparator)
            .unwrap_or(self.items.len());
        self.items.insert(index, entry);
    }
}
