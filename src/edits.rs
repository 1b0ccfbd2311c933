use anyhow::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::core::{AnalysisCore, Address, Breakpoint, VariableDescription, address_string};

/// A change confirmed in a dialog, waiting to be written to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingEdit {
    CreateFunction {
        address: Address,
        name: String,
    },
    RenameFunction {
        address: Address,
        name: String,
    },
    RenameFlag {
        old_name: String,
        new_name: String,
    },
    AddFlag {
        address: Address,
        name: String,
        size: u64,
    },
    RenameVariable {
        function: Address,
        old_name: String,
        new_name: String,
    },
    SetVariable {
        function: Address,
        old_name: String,
        variable: VariableDescription,
    },
    SetComment {
        address: Address,
        text: String,
    },
    SetAnnotations {
        function: Address,
        text: String,
    },
    SaveBreakpoint {
        breakpoint: Breakpoint,
        /// Address of the breakpoint being edited, if it moved.
        replaces: Option<Address>,
    },
}

impl PendingEdit {
    /// Writes the edit and returns a status line describing it.
    pub fn apply(&self, core: &mut dyn AnalysisCore) -> Result<String> {
        match self {
            PendingEdit::CreateFunction { address, name } => {
                core.create_function_at(*address, name)?;
                Ok(format!("Function {} defined at {}", name, address_string(*address)))
            }
            PendingEdit::RenameFunction { address, name } => {
                core.rename_function(*address, name)?;
                Ok(format!("Function renamed to {}", name))
            }
            PendingEdit::RenameFlag { old_name, new_name } => {
                core.rename_flag(old_name, new_name)?;
                Ok(format!("{} renamed to {}", old_name, new_name))
            }
            PendingEdit::AddFlag {
                address,
                name,
                size,
            } => {
                core.add_flag(*address, name, *size)?;
                Ok(format!("Name {} added at {}", name, address_string(*address)))
            }
            PendingEdit::RenameVariable {
                function,
                old_name,
                new_name,
            } => {
                core.rename_function_variable(*function, old_name, new_name)?;
                Ok(format!("Variable {} renamed to {}", old_name, new_name))
            }
            PendingEdit::SetVariable {
                function,
                old_name,
                variable,
            } => {
                core.set_function_variable(*function, old_name, variable.clone())?;
                Ok(format!(
                    "Variable {}: {} {}",
                    old_name, variable.type_name, variable.name
                ))
            }
            PendingEdit::SetComment { address, text } => {
                if text.trim().is_empty() {
                    core.del_comment(*address)?;
                    Ok("Comment removed".to_string())
                } else {
                    core.set_comment(*address, text)?;
                    Ok("Comment set".to_string())
                }
            }
            PendingEdit::SetAnnotations { function, text } => {
                core.set_annotation_blob(*function, &BASE64.encode(text.as_bytes()))?;
                Ok("Annotations updated".to_string())
            }
            PendingEdit::SaveBreakpoint {
                breakpoint,
                replaces,
            } => {
                if let Some(old) = replaces.filter(|old| *old != breakpoint.address) {
                    core.remove_breakpoint(old)?;
                }
                core.set_breakpoint(breakpoint.clone())?;
                Ok(format!(
                    "Breakpoint set at {}",
                    address_string(breakpoint.address)
                ))
            }
        }
    }

    /// Whether every view must be rebuilt after this edit.
    pub fn needs_full_refresh(&self) -> bool {
        matches!(self, PendingEdit::SetAnnotations { .. })
    }
}
