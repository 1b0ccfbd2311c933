//! In-memory analysis core loaded from a session snapshot.
//!
//! Renames rewrite the decompiled text in place so the view reflects them
//! without a re-decompilation pass.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::annotation::{Annotation, CodeLine, DecompiledFunction};
use crate::core::{
    Address, AnalysisCore, Breakpoint, BreakpointListener, Flag, Function, VariableDescription,
    Xref, address_string,
};

const SAMPLE_SESSION: &str = include_str!("../assets/sample_session.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    pub offset: Address,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub variables: Vec<VariableDescription>,
    #[serde(default)]
    pub lines: Vec<CodeLine>,
}

impl FunctionRecord {
    fn contains(&self, address: Address) -> bool {
        address == self.offset || (address > self.offset && address - self.offset < self.size)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySegment {
    pub address: Address,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(default = "default_pc_register")]
    pub pc_register: String,
    #[serde(default)]
    pub debugging: bool,
    #[serde(default)]
    pub functions: Vec<FunctionRecord>,
    #[serde(default)]
    pub flags: Vec<Flag>,
    #[serde(default)]
    pub comments: BTreeMap<Address, String>,
    #[serde(default)]
    pub breakpoints: Vec<Breakpoint>,
    #[serde(default)]
    pub registers: BTreeMap<String, Address>,
    #[serde(default)]
    pub memory: Vec<MemorySegment>,
    #[serde(default)]
    pub xrefs: Vec<Xref>,
}

fn default_pc_register() -> String {
    "rip".to_string()
}

pub struct MemoryCore {
    pc_register: String,
    debugging: bool,
    functions: BTreeMap<Address, FunctionRecord>,
    flags: BTreeMap<Address, Flag>,
    comments: BTreeMap<Address, String>,
    breakpoints: BTreeMap<Address, Breakpoint>,
    registers: BTreeMap<String, Address>,
    memory: Vec<MemorySegment>,
    xrefs: Vec<Xref>,
    breakpoint_listener: Option<BreakpointListener>,
}

impl fmt::Debug for MemoryCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCore")
            .field("functions", &self.functions.len())
            .field("flags", &self.flags.len())
            .field("breakpoints", &self.breakpoints)
            .field("debugging", &self.debugging)
            .finish_non_exhaustive()
    }
}

impl MemoryCore {
    pub fn from_session(session: Session) -> Self {
        Self {
            pc_register: session.pc_register,
            debugging: session.debugging,
            functions: session
                .functions
                .into_iter()
                .map(|f| (f.offset, f))
                .collect(),
            flags: session.flags.into_iter().map(|f| (f.offset, f)).collect(),
            comments: session.comments,
            breakpoints: session
                .breakpoints
                .into_iter()
                .map(|b| (b.address, b))
                .collect(),
            registers: session.registers,
            memory: session.memory,
            xrefs: session.xrefs,
            breakpoint_listener: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading session {}", path.display()))?;
        let session: Session = serde_json::from_str(&data)
            .with_context(|| format!("parsing session {}", path.display()))?;
        Ok(Self::from_session(session))
    }

    pub fn sample() -> Result<Self> {
        let session: Session =
            serde_json::from_str(SAMPLE_SESSION).context("parsing bundled sample session")?;
        Ok(Self::from_session(session))
    }

    pub fn set_debugging(&mut self, debugging: bool) {
        self.debugging = debugging;
    }

    pub fn register(&self, name: &str) -> Option<Address> {
        self.registers.get(name).copied()
    }

    pub fn breakpoints(&self) -> impl Iterator<Item = &Breakpoint> {
        self.breakpoints.values()
    }

    fn notify_breakpoint(&mut self, address: Address) {
        if let Some(listener) = self.breakpoint_listener.as_mut() {
            listener(address);
        }
    }

    fn function_containing(&self, address: Address) -> Option<&FunctionRecord> {
        self.functions.values().find(|f| f.contains(address))
    }

    fn function_containing_mut(&mut self, address: Address) -> Option<&mut FunctionRecord> {
        self.functions.values_mut().find(|f| f.contains(address))
    }

    fn rewrite_everywhere(
        &mut self,
        matches: impl Fn(&Annotation) -> bool,
        replacement: &str,
        update: impl Fn(&mut Annotation),
    ) {
        for function in self.functions.values_mut() {
            for line in &mut function.lines {
                rewrite_spans(line, &matches, replacement, &update);
            }
        }
    }
}

/// Replaces the text of every span matching `matches` with `replacement`,
/// shifting the spans that follow it on the same line.
pub fn rewrite_spans(
    line: &mut CodeLine,
    matches: &impl Fn(&Annotation) -> bool,
    replacement: &str,
    update: &impl Fn(&mut Annotation),
) {
    let new_len = replacement.chars().count();
    for idx in 0..line.annotations.len() {
        if !matches(&line.annotations[idx].annotation) {
            continue;
        }
        let mut chars: Vec<char> = line.text.chars().collect();
        let start = line.annotations[idx].start.min(chars.len());
        let end = line.annotations[idx].end.min(chars.len()).max(start);
        let old_len = end - start;
        chars.splice(start..end, replacement.chars());
        line.text = chars.into_iter().collect();

        let shift = |span_start: &mut usize, span_end: &mut usize| {
            if *span_start >= end && *span_start > start {
                *span_start = *span_start - old_len + new_len;
                *span_end = *span_end - old_len + new_len;
            } else if *span_start <= start && *span_end >= end {
                *span_end = *span_end - old_len + new_len;
            }
        };
        for other in line.annotations.iter_mut() {
            shift(&mut other.start, &mut other.end);
        }
        for instruction in line.instructions.iter_mut() {
            shift(&mut instruction.start, &mut instruction.end);
        }
        update(&mut line.annotations[idx].annotation);
    }
}

impl AnalysisCore for MemoryCore {
    fn comment_at(&self, address: Address) -> Option<String> {
        self.comments.get(&address).cloned()
    }

    fn set_comment(&mut self, address: Address, text: &str) -> Result<()> {
        self.comments.insert(address, text.to_string());
        Ok(())
    }

    fn del_comment(&mut self, address: Address) -> Result<()> {
        self.comments.remove(&address);
        Ok(())
    }

    fn flag_at(&self, address: Address) -> Option<Flag> {
        self.flags.get(&address).cloned()
    }

    fn add_flag(&mut self, address: Address, name: &str, size: u64) -> Result<()> {
        if self.flags.values().any(|f| f.name == name && f.offset != address) {
            bail!("name '{}' is already in use", name);
        }
        self.flags.insert(
            address,
            Flag {
                name: name.to_string(),
                offset: address,
                size,
            },
        );
        self.rewrite_everywhere(
            |a| matches!(a, Annotation::GlobalVariable { offset } if *offset == address),
            name,
            |_| {},
        );
        Ok(())
    }

    fn rename_flag(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        if self.flags.values().any(|f| f.name == new_name) {
            bail!("name '{}' is already in use", new_name);
        }
        let flag = self
            .flags
            .values_mut()
            .find(|f| f.name == old_name)
            .ok_or_else(|| anyhow!("no flag named '{}'", old_name))?;
        flag.name = new_name.to_string();
        let address = flag.offset;
        self.rewrite_everywhere(
            |a| matches!(a, Annotation::GlobalVariable { offset } if *offset == address),
            new_name,
            |_| {},
        );
        Ok(())
    }

    fn del_flag(&mut self, address: Address) -> Result<()> {
        self.flags
            .remove(&address)
            .map(|_| ())
            .ok_or_else(|| anyhow!("no flag at {}", address_string(address)))
    }

    fn function_at(&self, address: Address) -> Option<Function> {
        self.functions.get(&address).map(|f| Function {
            name: f.name.clone(),
            offset: f.offset,
        })
    }

    fn create_function_at(&mut self, address: Address, name: &str) -> Result<()> {
        if self.functions.contains_key(&address) {
            bail!("a function already exists at {}", address_string(address));
        }
        self.functions.insert(
            address,
            FunctionRecord {
                name: name.to_string(),
                offset: address,
                size: 0,
                variables: Vec::new(),
                lines: vec![CodeLine {
                    text: format!("void {}(void) {{ /* not decompiled yet */ }}", name),
                    offsets: vec![address],
                    ..CodeLine::default()
                }],
            },
        );
        let new_name = name.to_string();
        self.rewrite_everywhere(
            |a| matches!(a, Annotation::FunctionName { offset, .. } if *offset == address),
            name,
            |a| {
                if let Annotation::FunctionName { name, .. } = a {
                    *name = new_name.clone();
                }
            },
        );
        Ok(())
    }

    fn rename_function(&mut self, address: Address, new_name: &str) -> Result<()> {
        let function = self
            .functions
            .get_mut(&address)
            .ok_or_else(|| anyhow!("no function at {}", address_string(address)))?;
        function.name = new_name.to_string();
        let renamed = new_name.to_string();
        self.rewrite_everywhere(
            |a| matches!(a, Annotation::FunctionName { offset, .. } if *offset == address),
            new_name,
            |a| {
                if let Annotation::FunctionName { name, .. } = a {
                    *name = renamed.clone();
                }
            },
        );
        Ok(())
    }

    fn variables_at(&self, address: Address) -> Vec<VariableDescription> {
        self.function_containing(address)
            .map(|f| f.variables.clone())
            .unwrap_or_default()
    }

    fn rename_function_variable(
        &mut self,
        function: Address,
        old_name: &str,
        new_name: &str,
    ) -> Result<()> {
        let variable = self
            .variables_at(function)
            .into_iter()
            .find(|v| v.name == old_name)
            .ok_or_else(|| anyhow!("no variable named '{}'", old_name))?;
        self.set_function_variable(
            function,
            old_name,
            VariableDescription {
                name: new_name.to_string(),
                type_name: variable.type_name,
            },
        )
    }

    fn set_function_variable(
        &mut self,
        function: Address,
        old_name: &str,
        variable: VariableDescription,
    ) -> Result<()> {
        let record = self
            .function_containing_mut(function)
            .ok_or_else(|| anyhow!("no function at {}", address_string(function)))?;
        if variable.name != old_name && record.variables.iter().any(|v| v.name == variable.name) {
            bail!("variable '{}' already exists", variable.name);
        }
        let slot = record
            .variables
            .iter_mut()
            .find(|v| v.name == old_name)
            .ok_or_else(|| anyhow!("no variable named '{}'", old_name))?;
        *slot = variable.clone();

        let is_old = |a: &Annotation| a.variable_name() == Some(old_name);
        let rename = |a: &mut Annotation| match a {
            Annotation::LocalVariable { name } | Annotation::FunctionParameter { name } => {
                *name = variable.name.clone();
            }
            _ => {}
        };
        for line in &mut record.lines {
            rewrite_spans(line, &is_old, &variable.name, &rename);
        }
        Ok(())
    }

    fn register_name(&self, role: &str) -> String {
        match role {
            "PC" | "pc" => self.pc_register.clone(),
            other => other.to_lowercase(),
        }
    }

    fn set_register(&mut self, name: &str, value: Address) -> Result<()> {
        if !self.debugging {
            bail!("cannot write {}: not debugging", name);
        }
        self.registers.insert(name.to_string(), value);
        Ok(())
    }

    fn breakpoint_at(&self, address: Address) -> Option<Breakpoint> {
        self.breakpoints.get(&address).cloned()
    }

    fn set_breakpoint(&mut self, breakpoint: Breakpoint) -> Result<()> {
        let address = breakpoint.address;
        self.breakpoints.insert(address, breakpoint);
        self.notify_breakpoint(address);
        Ok(())
    }

    fn remove_breakpoint(&mut self, address: Address) -> Result<()> {
        self.breakpoints
            .remove(&address)
            .ok_or_else(|| anyhow!("no breakpoint at {}", address_string(address)))?;
        self.notify_breakpoint(address);
        Ok(())
    }

    fn set_breakpoint_listener(&mut self, listener: BreakpointListener) {
        self.breakpoint_listener = Some(listener);
    }

    fn is_debugging(&self) -> bool {
        self.debugging
    }

    fn continue_until(&mut self, address: Address) -> Result<()> {
        if !self.debugging {
            bail!("not debugging");
        }
        let pc = self.pc_register.clone();
        self.registers.insert(pc, address);
        Ok(())
    }

    fn xrefs_to(&self, address: Address) -> Vec<Xref> {
        self.xrefs
            .iter()
            .filter(|x| x.to == address)
            .cloned()
            .collect()
    }

    fn annotation_blob(&self, function: Address) -> Result<String> {
        let record = self
            .functions
            .get(&function)
            .ok_or_else(|| anyhow!("no function at {}", address_string(function)))?;
        Ok(serde_json::to_string_pretty(&record.lines)?)
    }

    fn set_annotation_blob(&mut self, function: Address, encoded: &str) -> Result<()> {
        let bytes = BASE64
            .decode(encoded)
            .context("annotation blob is not valid base64")?;
        let text = String::from_utf8(bytes).context("annotation blob is not UTF-8")?;
        let lines: Vec<CodeLine> =
            serde_json::from_str(&text).context("annotation blob is not valid JSON")?;
        let record = self
            .functions
            .get_mut(&function)
            .ok_or_else(|| anyhow!("no function at {}", address_string(function)))?;
        record.lines = lines;
        Ok(())
    }

    fn decompile(&self, function: Address) -> Option<DecompiledFunction> {
        self.functions.get(&function).map(|f| DecompiledFunction {
            address: f.offset,
            name: f.name.clone(),
            lines: f.lines.clone(),
        })
    }

    fn functions(&self) -> Vec<Function> {
        self.functions
            .values()
            .map(|f| Function {
                name: f.name.clone(),
                offset: f.offset,
            })
            .collect()
    }

    fn read_memory(&self, address: Address, len: usize) -> Vec<u8> {
        (0..len as u64)
            .map(|i| {
                let at = address.wrapping_add(i);
                self.memory
                    .iter()
                    .find(|seg| at >= seg.address && at - seg.address < seg.bytes.len() as u64)
                    .map(|seg| seg.bytes[(at - seg.address) as usize])
                    .unwrap_or(0xFF)
            })
            .collect()
    }
}
