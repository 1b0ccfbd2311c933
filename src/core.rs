//! Seam to the analysis / debug engine.
//!
//! The context menu never owns symbol tables, breakpoints or registers. It
//! reads and mutates them through [`AnalysisCore`], which the application
//! backs with [`crate::memory_core::MemoryCore`] and the tests back with a
//! recording fake.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::annotation::DecompiledFunction;

pub type Address = u64;

/// Observer the core calls after each breakpoint it adds or removes.
pub type BreakpointListener = Box<dyn FnMut(Address)>;

/// Canonical address rendering used by every label and clipboard write.
pub fn address_string(address: Address) -> String {
    format!("0x{:08x}", address)
}

/// Named address entry (a "flag").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    pub name: String,
    pub offset: Address,
    #[serde(default = "default_flag_size")]
    pub size: u64,
}

fn default_flag_size() -> u64 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub offset: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDescription {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub address: Address,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub hardware: bool,
    #[serde(default)]
    pub condition: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Breakpoint {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            enabled: true,
            hardware: false,
            condition: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XrefKind {
    Call,
    Jump,
    Data,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Xref {
    pub from: Address,
    pub to: Address,
    pub kind: XrefKind,
}

/// Everything the menu and its owner consume from the engine.
///
/// Queries are infallible; mutations report failures (naming collisions,
/// unknown addresses) through `anyhow`.
pub trait AnalysisCore {
    fn comment_at(&self, address: Address) -> Option<String>;
    fn set_comment(&mut self, address: Address, text: &str) -> Result<()>;
    fn del_comment(&mut self, address: Address) -> Result<()>;

    fn flag_at(&self, address: Address) -> Option<Flag>;
    fn add_flag(&mut self, address: Address, name: &str, size: u64) -> Result<()>;
    fn rename_flag(&mut self, old_name: &str, new_name: &str) -> Result<()>;
    fn del_flag(&mut self, address: Address) -> Result<()>;

    fn function_at(&self, address: Address) -> Option<Function>;
    fn create_function_at(&mut self, address: Address, name: &str) -> Result<()>;
    fn rename_function(&mut self, address: Address, new_name: &str) -> Result<()>;

    /// Live variables of the function containing `address`.
    fn variables_at(&self, address: Address) -> Vec<VariableDescription>;
    fn rename_function_variable(
        &mut self,
        function: Address,
        old_name: &str,
        new_name: &str,
    ) -> Result<()>;
    fn set_function_variable(
        &mut self,
        function: Address,
        old_name: &str,
        variable: VariableDescription,
    ) -> Result<()>;

    /// Register name for a role such as `"PC"` (e.g. `rip`, `pc`).
    fn register_name(&self, role: &str) -> String;
    fn set_register(&mut self, name: &str, value: Address) -> Result<()>;

    fn breakpoint_at(&self, address: Address) -> Option<Breakpoint>;
    fn set_breakpoint(&mut self, breakpoint: Breakpoint) -> Result<()>;
    fn remove_breakpoint(&mut self, address: Address) -> Result<()>;
    /// Installs the owner's breakpoint observer. Cores that never report
    /// changes ignore it.
    fn set_breakpoint_listener(&mut self, _listener: BreakpointListener) {}

    fn is_debugging(&self) -> bool;
    fn continue_until(&mut self, address: Address) -> Result<()>;

    fn xrefs_to(&self, address: Address) -> Vec<Xref>;

    /// Raw annotation blob of a decompiled function, as text.
    fn annotation_blob(&self, function: Address) -> Result<String>;
    /// Replace the annotation blob; `encoded` is base64 of the blob text.
    fn set_annotation_blob(&mut self, function: Address, encoded: &str) -> Result<()>;

    fn decompile(&self, function: Address) -> Option<DecompiledFunction>;
    fn functions(&self) -> Vec<Function>;
    fn read_memory(&self, address: Address, len: usize) -> Vec<u8>;

    fn address_string(&self, address: Address) -> String {
        address_string(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_string_is_zero_padded_hex() {
        assert_eq!(address_string(0x4010), "0x00004010");
        assert_eq!(address_string(0x1_0000_0000), "0x100000000");
    }

    #[test]
    fn test_breakpoint_defaults_from_json() {
        let bp: Breakpoint = serde_json::from_str(r#"{"address": 4096}"#).unwrap();
        assert_eq!(bp, Breakpoint::new(0x1000));
    }
}
