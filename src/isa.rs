/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use crate::errors::AssemblyError;
use crate::file_reader::FileReader;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Width of every emitted machine word, in bits.
pub const WORD_BITS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperandKind {
    Register,
    Immediate,
    Memory,
    Address,
    Port,
    Interrupt,
}

impl OperandKind {
    /// Field width used when the descriptor does not declare one.
    pub fn default_width(self) -> usize {
        match self {
            OperandKind::Register => 8,
            OperandKind::Immediate => 8,
            OperandKind::Memory => 16,
            OperandKind::Address => 16,
            OperandKind::Port => 8,
            OperandKind::Interrupt => 8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BitwiseDescription {
    pub opcode: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstructionSpec {
    pub mnemonic: String,
    #[serde(default)]
    pub opcode: String,
    pub operand_count: usize,
    #[serde(default)]
    pub operand_types: Vec<OperandKind>,
    #[serde(default)]
    pub field_sizes: HashMap<String, usize>,
    pub bitwise_description: BitwiseDescription,
}

impl InstructionSpec {
    /// Declared width of the N-th operand field (0-based), falling back to
    /// the operand kind's default when the descriptor omits it.
    pub fn field_width(&self, index: usize, kind: OperandKind) -> usize {
        self.field_sizes
            .get(&format!("r{}", index + 1))
            .copied()
            .unwrap_or_else(|| kind.default_width())
    }

    /// Sum of all declared operand field widths, in bits. Drives the first
    /// pass address advance.
    pub fn total_field_bits(&self) -> usize {
        self.field_sizes.values().sum()
    }
}

// The raw document shape, before mnemonics are indexed.
#[derive(Debug, Deserialize)]
struct IsaDoc {
    #[serde(default)]
    registers: HashMap<String, String>,
    #[serde(default)]
    instructions: Vec<InstructionSpec>,
}

/// Loaded and validated ISA descriptor. Instruction lookup is by uppercased
/// mnemonic; register lookup is case-sensitive.
#[derive(Debug)]
pub struct Isa {
    registers: HashMap<String, String>,
    instructions: HashMap<String, InstructionSpec>,
}

impl Isa {
    pub fn load<F: FileReader>(path: &Path, reader: &F) -> Result<Self, AssemblyError> {
        let text = reader
            .read_to_string(path)
            .map_err(|e| AssemblyError::ConfigError {
                reason: format!("cannot read ISA descriptor '{}': {}", path.display(), e),
            })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, AssemblyError> {
        let doc: IsaDoc = serde_json::from_str(text).map_err(|e| AssemblyError::ConfigError {
            reason: format!("malformed ISA descriptor: {}", e),
        })?;

        for (name, bits) in &doc.registers {
            validate_bit_string(bits, &format!("register '{}'", name))?;
        }

        let mut instructions = HashMap::new();
        for instr in doc.instructions {
            validate_instruction(&instr)?;
            instructions.insert(instr.mnemonic.to_uppercase(), instr);
        }

        Ok(Isa {
            registers: doc.registers,
            instructions,
        })
    }

    /// Looks up an instruction descriptor. The mnemonic match is
    /// case-insensitive; callers pass the uppercased form.
    pub fn instruction(&self, mnemonic_upper: &str) -> Option<&InstructionSpec> {
        self.instructions.get(mnemonic_upper)
    }

    pub fn register(&self, name: &str) -> Option<&str> {
        self.registers.get(name).map(String::as_str)
    }
}

fn validate_bit_string(bits: &str, what: &str) -> Result<(), AssemblyError> {
    if bits.is_empty() || !bits.chars().all(|c| c == '0' || c == '1') {
        return Err(AssemblyError::ConfigError {
            reason: format!("{} has invalid bit-string '{}'", what, bits),
        });
    }
    Ok(())
}

fn validate_instruction(instr: &InstructionSpec) -> Result<(), AssemblyError> {
    let what = format!("instruction '{}'", instr.mnemonic);
    validate_bit_string(&instr.bitwise_description.opcode, &what)?;

    if instr.operand_types.len() != instr.operand_count {
        return Err(AssemblyError::ConfigError {
            reason: format!(
                "{} declares {} operand(s) but {} operand type(s)",
                what,
                instr.operand_count,
                instr.operand_types.len()
            ),
        });
    }

    let field_bits: usize = instr
        .operand_types
        .iter()
        .enumerate()
        .map(|(i, kind)| instr.field_width(i, *kind))
        .sum();
    let total = instr.bitwise_description.opcode.len() + field_bits;
    if total > WORD_BITS {
        return Err(AssemblyError::ConfigError {
            reason: format!(
                "{} encodes to {} bits, which exceeds the {}-bit word",
                what, total, WORD_BITS
            ),
        });
    }

    Ok(())
}

// ------------- unit tests -------------
