#![allow(dead_code)]

use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use anyhow::{Result, bail};
use decompiler_menu::annotation::{Annotation, DecompiledFunction};
use decompiler_menu::clipboard::MemoryClipboard;
use decompiler_menu::context_menu::{
    ContextAction, DecompilerContextMenu, ItemId, MenuContext, MenuItem, MenuOutcome, Submenu,
};
use decompiler_menu::core::{
    Address, AnalysisCore, Breakpoint, Flag, Function, VariableDescription, Xref, XrefKind,
};
use decompiler_menu::window::{self, AddressTypeHint, MainWindow, ViewKind};

/// Every mutation the menu issued, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SetComment(Address, String),
    DelComment(Address),
    AddFlag(Address, String, u64),
    RenameFlag(String, String),
    DelFlag(Address),
    CreateFunction(Address, String),
    RenameFunction(Address, String),
    RenameVariable(Address, String, String),
    SetVariable(Address, String, VariableDescription),
    SetRegister(String, Address),
    SetBreakpoint(Address),
    RemoveBreakpoint(Address),
    ContinueUntil(Address),
    SetAnnotationBlob(Address, String),
}

#[derive(Default)]
pub struct FakeCore {
    pub calls: Vec<Call>,
    pub comments: BTreeMap<Address, String>,
    pub flags: Vec<Flag>,
    pub functions: Vec<Function>,
    pub variables: Vec<VariableDescription>,
    pub breakpoints: BTreeSet<Address>,
    pub debugging: bool,
    pub pc_register: String,
    pub annotation_blob: String,
    /// Shared re-entrancy flag of the menu under test.
    pub toggling_flag: Option<Rc<Cell<bool>>>,
    /// Value of the re-entrancy flag observed on each remove call.
    pub toggling_during_remove: Vec<bool>,
}

impl FakeCore {
    pub fn new() -> Self {
        Self {
            pc_register: "rip".to_string(),
            ..Self::default()
        }
    }

    pub fn with_flag(mut self, name: &str, offset: Address) -> Self {
        self.flags.push(Flag {
            name: name.to_string(),
            offset,
            size: 1,
        });
        self
    }

    pub fn with_function(mut self, name: &str, offset: Address) -> Self {
        self.functions.push(Function {
            name: name.to_string(),
            offset,
        });
        self
    }

    pub fn with_variable(mut self, name: &str, type_name: &str) -> Self {
        self.variables.push(VariableDescription {
            name: name.to_string(),
            type_name: type_name.to_string(),
        });
        self
    }
}

impl AnalysisCore for FakeCore {
    fn comment_at(&self, address: Address) -> Option<String> {
        self.comments.get(&address).cloned()
    }

    fn set_comment(&mut self, address: Address, text: &str) -> Result<()> {
        self.calls.push(Call::SetComment(address, text.to_string()));
        self.comments.insert(address, text.to_string());
        Ok(())
    }

    fn del_comment(&mut self, address: Address) -> Result<()> {
        self.calls.push(Call::DelComment(address));
        self.comments.remove(&address);
        Ok(())
    }

    fn flag_at(&self, address: Address) -> Option<Flag> {
        self.flags.iter().find(|f| f.offset == address).cloned()
    }

    fn add_flag(&mut self, address: Address, name: &str, size: u64) -> Result<()> {
        self.calls
            .push(Call::AddFlag(address, name.to_string(), size));
        Ok(())
    }

    fn rename_flag(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        self.calls
            .push(Call::RenameFlag(old_name.to_string(), new_name.to_string()));
        Ok(())
    }

    fn del_flag(&mut self, address: Address) -> Result<()> {
        self.calls.push(Call::DelFlag(address));
        Ok(())
    }

    fn function_at(&self, address: Address) -> Option<Function> {
        self.functions.iter().find(|f| f.offset == address).cloned()
    }

    fn create_function_at(&mut self, address: Address, name: &str) -> Result<()> {
        self.calls
            .push(Call::CreateFunction(address, name.to_string()));
        Ok(())
    }

    fn rename_function(&mut self, address: Address, new_name: &str) -> Result<()> {
        if self.functions.iter().any(|f| f.name == new_name) {
            bail!("name {} is already used", new_name);
        }
        self.calls
            .push(Call::RenameFunction(address, new_name.to_string()));
        Ok(())
    }

    fn variables_at(&self, _address: Address) -> Vec<VariableDescription> {
        self.variables.clone()
    }

    fn rename_function_variable(
        &mut self,
        function: Address,
        old_name: &str,
        new_name: &str,
    ) -> Result<()> {
        self.calls.push(Call::RenameVariable(
            function,
            old_name.to_string(),
            new_name.to_string(),
        ));
        Ok(())
    }

    fn set_function_variable(
        &mut self,
        function: Address,
        old_name: &str,
        variable: VariableDescription,
    ) -> Result<()> {
        self.calls
            .push(Call::SetVariable(function, old_name.to_string(), variable));
        Ok(())
    }

    fn register_name(&self, role: &str) -> String {
        match role {
            "PC" => self.pc_register.clone(),
            other => other.to_lowercase(),
        }
    }

    fn set_register(&mut self, name: &str, value: Address) -> Result<()> {
        self.calls.push(Call::SetRegister(name.to_string(), value));
        Ok(())
    }

    fn breakpoint_at(&self, address: Address) -> Option<Breakpoint> {
        self.breakpoints
            .contains(&address)
            .then(|| Breakpoint::new(address))
    }

    fn set_breakpoint(&mut self, breakpoint: Breakpoint) -> Result<()> {
        self.calls.push(Call::SetBreakpoint(breakpoint.address));
        self.breakpoints.insert(breakpoint.address);
        Ok(())
    }

    fn remove_breakpoint(&mut self, address: Address) -> Result<()> {
        self.calls.push(Call::RemoveBreakpoint(address));
        if let Some(flag) = &self.toggling_flag {
            self.toggling_during_remove.push(flag.get());
        }
        self.breakpoints.remove(&address);
        Ok(())
    }

    fn is_debugging(&self) -> bool {
        self.debugging
    }

    fn continue_until(&mut self, address: Address) -> Result<()> {
        self.calls.push(Call::ContinueUntil(address));
        Ok(())
    }

    fn xrefs_to(&self, address: Address) -> Vec<Xref> {
        vec![Xref {
            from: 0x401010,
            to: address,
            kind: XrefKind::Call,
        }]
    }

    fn annotation_blob(&self, _function: Address) -> Result<String> {
        Ok(self.annotation_blob.clone())
    }

    fn set_annotation_blob(&mut self, function: Address, encoded: &str) -> Result<()> {
        self.calls
            .push(Call::SetAnnotationBlob(function, encoded.to_string()));
        Ok(())
    }

    fn decompile(&self, _function: Address) -> Option<DecompiledFunction> {
        None
    }

    fn functions(&self) -> Vec<Function> {
        self.functions.clone()
    }

    fn read_memory(&self, _address: Address, len: usize) -> Vec<u8> {
        vec![0; len]
    }
}

/// Window double that records navigation and refresh requests.
#[derive(Default)]
pub struct FakeWindow {
    pub shown: Vec<(Address, ViewKind)>,
    pub refreshes: usize,
    pub show_in_requests: Cell<usize>,
}

impl MainWindow for FakeWindow {
    fn create_show_in_menu(&self, address: Address, hint: Option<AddressTypeHint>) -> Submenu {
        self.show_in_requests.set(self.show_in_requests.get() + 1);
        window::build_show_in_menu(&[ViewKind::Decompiler, ViewKind::Hexdump], address, hint)
    }

    fn show_in(&mut self, address: Address, view: ViewKind) {
        self.shown.push((address, view));
    }

    fn refresh_all(&mut self) {
        self.refreshes += 1;
    }
}

/// Cursor state pushed into the menu before an open.
pub struct Cursor {
    pub annotation: Option<Annotation>,
    pub word: &'static str,
    pub offset: Address,
    pub first_offset: Option<Address>,
    pub function: Option<Address>,
    pub breakpoints: Vec<Address>,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            annotation: None,
            word: "",
            offset: 0x401010,
            first_offset: Some(0x401010),
            function: Some(0x401000),
            breakpoints: Vec::new(),
        }
    }
}

pub fn open_at(
    menu: &mut DecompilerContextMenu,
    cursor: Cursor,
    core: &FakeCore,
    window: &FakeWindow,
) {
    menu.set_annotation_here(cursor.annotation);
    menu.set_cur_highlighted_word(cursor.word);
    menu.set_offset(cursor.offset);
    menu.set_first_offset_in_line(cursor.first_offset);
    menu.set_decompiled_function_address(cursor.function);
    menu.set_available_breakpoints(cursor.breakpoints);
    menu.about_to_show(core, window);
}

pub fn item(menu: &DecompilerContextMenu, id: ItemId) -> &MenuItem {
    match menu.item(id) {
        Some(item) => item,
        None => panic!("menu has no {:?} item", id),
    }
}

pub fn trigger(
    menu: &mut DecompilerContextMenu,
    action: ContextAction,
    core: &mut FakeCore,
    window: &mut FakeWindow,
    clipboard: &mut MemoryClipboard,
) -> MenuOutcome {
    let mut ctx = MenuContext {
        core,
        window,
        clipboard,
    };
    match menu.trigger(&action, &mut ctx) {
        Ok(outcome) => outcome,
        Err(e) => panic!("{:?} failed: {:#}", action, e),
    }
}
