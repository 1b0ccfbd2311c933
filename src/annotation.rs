use serde::{Deserialize, Serialize};

use crate::core::Address;

/// Symbolic token decorating a span of decompiled output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    FunctionName { name: String, offset: Address },
    GlobalVariable { offset: Address },
    ConstantVariable { offset: Address },
    LocalVariable { name: String },
    FunctionParameter { name: String },
    Other,
}

impl Annotation {
    /// Points at an address (function, global or constant).
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Annotation::FunctionName { .. }
                | Annotation::GlobalVariable { .. }
                | Annotation::ConstantVariable { .. }
        )
    }

    pub fn is_variable(&self) -> bool {
        matches!(
            self,
            Annotation::LocalVariable { .. } | Annotation::FunctionParameter { .. }
        )
    }

    pub fn reference_offset(&self) -> Option<Address> {
        match self {
            Annotation::FunctionName { offset, .. }
            | Annotation::GlobalVariable { offset }
            | Annotation::ConstantVariable { offset } => Some(*offset),
            _ => None,
        }
    }

    pub fn variable_name(&self) -> Option<&str> {
        match self {
            Annotation::LocalVariable { name } | Annotation::FunctionParameter { name } => {
                Some(name)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedSpan {
    pub start: usize,
    pub end: usize,
    #[serde(flatten)]
    pub annotation: Annotation,
}

/// Columns of a line produced by one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionSpan {
    pub start: usize,
    pub end: usize,
    pub offset: Address,
}

/// One rendered line of pseudocode and the instruction addresses it covers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CodeLine {
    pub text: String,
    #[serde(default)]
    pub offsets: Vec<Address>,
    #[serde(default)]
    pub annotations: Vec<AnnotatedSpan>,
    #[serde(default)]
    pub instructions: Vec<InstructionSpan>,
}

impl CodeLine {
    pub fn first_offset(&self) -> Option<Address> {
        self.offsets.iter().copied().min()
    }

    /// Instruction address under column `col`: the innermost instruction
    /// span covering it, else the line's first address.
    pub fn offset_at(&self, col: usize) -> Option<Address> {
        self.instructions
            .iter()
            .filter(|span| span.start <= col && col < span.end)
            .min_by_key(|span| span.end - span.start)
            .map(|span| span.offset)
            .or_else(|| self.first_offset())
    }

    /// Innermost annotation covering column `col` (char index).
    pub fn annotation_at(&self, col: usize) -> Option<&Annotation> {
        self.annotations
            .iter()
            .filter(|span| span.start <= col && col < span.end)
            .min_by_key(|span| span.end - span.start)
            .map(|span| &span.annotation)
    }

    /// Identifier-like word under column `col`, empty if none.
    pub fn word_at(&self, col: usize) -> String {
        let chars: Vec<char> = self.text.chars().collect();
        let is_word = |c: char| c.is_alphanumeric() || c == '_';
        if col >= chars.len() || !is_word(chars[col]) {
            return String::new();
        }
        let mut start = col;
        while start > 0 && is_word(chars[start - 1]) {
            start -= 1;
        }
        let mut end = col;
        while end < chars.len() && is_word(chars[end]) {
            end += 1;
        }
        chars[start..end].iter().collect()
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecompiledFunction {
    pub address: Address,
    pub name: String,
    pub lines: Vec<CodeLine>,
}
