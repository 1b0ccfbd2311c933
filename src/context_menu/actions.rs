use anyhow::Result;

use super::DecompilerContextMenu;
use crate::annotation::Annotation;
use crate::clipboard::Clipboard;
use crate::core::{Address, AnalysisCore, Breakpoint, VariableDescription, Xref};
use crate::edits::PendingEdit;
use crate::window::{MainWindow, ViewKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextAction {
    Copy,
    CopyInstructionAddress,
    CopyReferenceAddress,
    EditAnnotation,
    AddComment,
    DeleteComment,
    RenameThingHere,
    DeleteName,
    EditFunctionVariables,
    XRefs,
    ToggleBreakpoint,
    AdvancedBreakpoint,
    EditBreakpointAt(Address),
    ContinueUntil,
    SetPc,
    ShowIn { address: Address, view: ViewKind },
    Apply(PendingEdit),
}

/// What a text prompt will do with the entered name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPurpose {
    DefineFunction { address: Address },
    RenameFunction { address: Address },
    RenameFlag { old_name: String },
    AddFlag { address: Address },
    RenameVariable { function: Address, old_name: String },
}

impl PromptPurpose {
    pub fn into_edit(self, input: String) -> PendingEdit {
        match self {
            PromptPurpose::DefineFunction { address } => PendingEdit::CreateFunction {
                address,
                name: input,
            },
            PromptPurpose::RenameFunction { address } => PendingEdit::RenameFunction {
                address,
                name: input,
            },
            PromptPurpose::RenameFlag { old_name } => PendingEdit::RenameFlag {
                old_name,
                new_name: input,
            },
            PromptPurpose::AddFlag { address } => PendingEdit::AddFlag {
                address,
                name: input,
                size: 1,
            },
            PromptPurpose::RenameVariable { function, old_name } => PendingEdit::RenameVariable {
                function,
                old_name,
                new_name: input,
            },
        }
    }
}

/// Modal dialog the front-end should open on the menu's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogRequest {
    Prompt {
        title: String,
        label: String,
        default: String,
        purpose: PromptPurpose,
    },
    Error {
        title: String,
        message: String,
    },
    Comment {
        address: Address,
        current: Option<String>,
    },
    TextEdit {
        title: String,
        function: Address,
        text: String,
    },
    CreateBreakpoint {
        address: Address,
    },
    EditBreakpoint(Breakpoint),
    EditVariable {
        function: Address,
        variable: VariableDescription,
    },
    XRefs {
        address: Address,
        display: String,
        refs: Vec<Xref>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOutcome {
    Done,
    Status(String),
    /// The owner copies its own selection.
    CopyRequested,
    Dialog(DialogRequest),
}

pub struct MenuContext<'a> {
    pub core: &'a mut dyn AnalysisCore,
    pub window: &'a mut dyn MainWindow,
    pub clipboard: &'a mut dyn Clipboard,
}

const RENAME_VARIABLE_REFUSED: &str =
    "Can't rename this variable. Only local variables defined in disassembly can be renamed.";
const EDIT_VARIABLE_REFUSED: &str =
    "Can't edit this variable. Only local variables defined in disassembly can be edited.";

impl DecompilerContextMenu {
    pub fn trigger(
        &mut self,
        action: &ContextAction,
        ctx: &mut MenuContext<'_>,
    ) -> Result<MenuOutcome> {
        log::debug!("context action {:?}", action);
        match action {
            ContextAction::Copy => Ok(MenuOutcome::CopyRequested),
            ContextAction::CopyInstructionAddress => {
                let text = ctx.core.address_string(self.state.offset);
                ctx.clipboard.set_text(&text)?;
                Ok(MenuOutcome::Status(format!("Copied {}", text)))
            }
            ContextAction::CopyReferenceAddress => {
                let Some(address) = self.reference_offset() else {
                    return Ok(MenuOutcome::Done);
                };
                let text = ctx.core.address_string(address);
                ctx.clipboard.set_text(&text)?;
                Ok(MenuOutcome::Status(format!("Copied {}", text)))
            }
            ContextAction::EditAnnotation => self.edit_annotation(ctx.core),
            ContextAction::AddComment => Ok(match self.state.first_offset_in_line {
                Some(address) => MenuOutcome::Dialog(DialogRequest::Comment {
                    address,
                    current: ctx.core.comment_at(address),
                }),
                None => MenuOutcome::Done,
            }),
            ContextAction::DeleteComment => {
                let Some(address) = self.state.first_offset_in_line else {
                    return Ok(MenuOutcome::Done);
                };
                if ctx.core.comment_at(address).is_none() {
                    return Ok(MenuOutcome::Done);
                }
                ctx.core.del_comment(address)?;
                Ok(MenuOutcome::Status("Comment deleted".to_string()))
            }
            ContextAction::RenameThingHere => Ok(self.rename_thing_here(ctx.core)),
            ContextAction::DeleteName => {
                let Some(address) = self.reference_offset() else {
                    return Ok(MenuOutcome::Done);
                };
                ctx.core.del_flag(address)?;
                Ok(MenuOutcome::Status(format!(
                    "Name removed from {}",
                    ctx.core.address_string(address)
                )))
            }
            ContextAction::EditFunctionVariables => Ok(self.edit_function_variables(ctx.core)),
            ContextAction::XRefs => Ok(self.xrefs(ctx.core)),
            ContextAction::ToggleBreakpoint => self.toggle_breakpoint(ctx.core),
            ContextAction::AdvancedBreakpoint => Ok(self.advanced_breakpoint(ctx.core)),
            ContextAction::EditBreakpointAt(address) => Ok(MenuOutcome::Dialog(
                DialogRequest::EditBreakpoint(
                    ctx.core
                        .breakpoint_at(*address)
                        .unwrap_or_else(|| Breakpoint::new(*address)),
                ),
            )),
            ContextAction::ContinueUntil => {
                ctx.core.continue_until(self.state.offset)?;
                Ok(MenuOutcome::Status(format!(
                    "Continuing until {}",
                    ctx.core.address_string(self.state.offset)
                )))
            }
            ContextAction::SetPc => {
                let pc = ctx.core.register_name("PC");
                ctx.core.set_register(&pc, self.state.offset)?;
                Ok(MenuOutcome::Status(format!(
                    "{} = {}",
                    pc.to_uppercase(),
                    ctx.core.address_string(self.state.offset)
                )))
            }
            ContextAction::ShowIn { address, view } => {
                ctx.window.show_in(*address, *view);
                Ok(MenuOutcome::Done)
            }
            ContextAction::Apply(edit) => {
                let message = edit.apply(ctx.core)?;
                log::info!("{}", message);
                if edit.needs_full_refresh() {
                    ctx.window.refresh_all();
                }
                Ok(MenuOutcome::Status(message))
            }
        }
    }

    fn reference_offset(&self) -> Option<Address> {
        self.annotation.as_ref().and_then(Annotation::reference_offset)
    }

    fn edit_annotation(&self, core: &dyn AnalysisCore) -> Result<MenuOutcome> {
        let Some(function) = self.state.decompiled_function else {
            return Ok(MenuOutcome::Status("No decompiled function".to_string()));
        };
        let text = core.annotation_blob(function)?;
        Ok(MenuOutcome::Dialog(DialogRequest::TextEdit {
            title: "Edit annotation".to_string(),
            function,
            text,
        }))
    }

    fn rename_thing_here(&self, core: &dyn AnalysisCore) -> MenuOutcome {
        let Some(annotation) = &self.annotation else {
            return MenuOutcome::Done;
        };
        match annotation {
            Annotation::FunctionName { name, offset } => {
                let purpose = match core.function_at(*offset) {
                    None => PromptPurpose::DefineFunction { address: *offset },
                    Some(_) => PromptPurpose::RenameFunction { address: *offset },
                };
                let title = match purpose {
                    PromptPurpose::DefineFunction { .. } => {
                        format!("Define this function at {}", core.address_string(*offset))
                    }
                    _ => format!("Rename function {}", name),
                };
                MenuOutcome::Dialog(DialogRequest::Prompt {
                    title,
                    label: "Function name:".to_string(),
                    default: name.clone(),
                    purpose,
                })
            }
            Annotation::GlobalVariable { offset } => match core.flag_at(*offset) {
                Some(flag) => MenuOutcome::Dialog(DialogRequest::Prompt {
                    title: format!("Rename {}", flag.name),
                    label: "Enter name".to_string(),
                    default: flag.name.clone(),
                    purpose: PromptPurpose::RenameFlag {
                        old_name: flag.name,
                    },
                }),
                None => MenuOutcome::Dialog(DialogRequest::Prompt {
                    title: format!("Add name to {}", self.state.highlighted_word),
                    label: "Enter name".to_string(),
                    default: self.state.highlighted_word.clone(),
                    purpose: PromptPurpose::AddFlag { address: *offset },
                }),
            },
            Annotation::LocalVariable { name } | Annotation::FunctionParameter { name } => {
                if !self.variable_present(core) {
                    return MenuOutcome::Dialog(DialogRequest::Error {
                        title: format!("Rename local variable {}", name),
                        message: RENAME_VARIABLE_REFUSED.to_string(),
                    });
                }
                MenuOutcome::Dialog(DialogRequest::Prompt {
                    title: format!("Rename {}", name),
                    label: "Enter name".to_string(),
                    default: name.clone(),
                    purpose: PromptPurpose::RenameVariable {
                        function: self.function_address(),
                        old_name: name.clone(),
                    },
                })
            }
            Annotation::ConstantVariable { .. } | Annotation::Other => MenuOutcome::Done,
        }
    }

    fn edit_function_variables(&self, core: &dyn AnalysisCore) -> MenuOutcome {
        let Some(name) = self.annotation.as_ref().and_then(Annotation::variable_name) else {
            return MenuOutcome::Done;
        };
        let found = core
            .variables_at(self.state.offset)
            .into_iter()
            .find(|var| var.name == name);
        match found {
            Some(variable) => MenuOutcome::Dialog(DialogRequest::EditVariable {
                function: self.function_address(),
                variable,
            }),
            None => MenuOutcome::Dialog(DialogRequest::Error {
                title: format!("Edit local variable {}", name),
                message: EDIT_VARIABLE_REFUSED.to_string(),
            }),
        }
    }

    fn xrefs(&self, core: &dyn AnalysisCore) -> MenuOutcome {
        let Some(annotation) = self.annotation.as_ref().filter(|a| a.is_reference()) else {
            return MenuOutcome::Done;
        };
        let Some(address) = annotation.reference_offset() else {
            return MenuOutcome::Done;
        };
        let display = match annotation {
            Annotation::FunctionName { name, .. } => name.clone(),
            _ => core.address_string(address),
        };
        MenuOutcome::Dialog(DialogRequest::XRefs {
            address,
            display,
            refs: core.xrefs_to(address),
        })
    }

    fn toggle_breakpoint(&mut self, core: &mut dyn AnalysisCore) -> Result<MenuOutcome> {
        if !self.state.available_breakpoints.is_empty() {
            let removed = {
                let _guard = self.toggling_guard();
                let mut removed = 0;
                for address in &self.state.available_breakpoints {
                    core.remove_breakpoint(*address)?;
                    removed += 1;
                }
                removed
            };
            self.state.available_breakpoints.clear();
            return Ok(MenuOutcome::Status(format!(
                "Removed {} breakpoint{}",
                removed,
                if removed == 1 { "" } else { "s" }
            )));
        }
        let Some(address) = self.state.first_offset_in_line else {
            return Ok(MenuOutcome::Done);
        };
        core.set_breakpoint(Breakpoint::new(address))?;
        Ok(MenuOutcome::Status(format!(
            "Breakpoint set at {}",
            core.address_string(address)
        )))
    }

    fn advanced_breakpoint(&self, core: &dyn AnalysisCore) -> MenuOutcome {
        if let Some(earliest) = self.state.available_breakpoints.iter().copied().min() {
            let breakpoint = core
                .breakpoint_at(earliest)
                .unwrap_or_else(|| Breakpoint::new(earliest));
            return MenuOutcome::Dialog(DialogRequest::EditBreakpoint(breakpoint));
        }
        match self.state.first_offset_in_line {
            Some(address) => MenuOutcome::Dialog(DialogRequest::CreateBreakpoint { address }),
            None => MenuOutcome::Done,
        }
    }
}
