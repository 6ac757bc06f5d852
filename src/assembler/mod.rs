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

mod encoder;
pub mod preprocessor;
pub mod segment;
pub mod symbol_table;
pub mod writer;

use crate::ast::{SourceLine, Statement};
use crate::errors::AssemblyError;
use crate::isa::Isa;
use segment::{StaticEntry, TextEntry};
use symbol_table::{Label, LabelTable};

/// Pass 1: collect labels and lay out addresses. Data directives are placed
/// into the static segment here; instructions only advance the address
/// cursor. Unknown mnemonics are deliberately ignored — the second pass
/// reports them.
pub fn first_pass(
    lines: &[SourceLine],
    isa: &Isa,
) -> Result<(LabelTable, Vec<StaticEntry>), AssemblyError> {
    let mut labels = LabelTable::new();
    let mut static_segment = Vec::new();
    let mut current_address: u64 = 0;

    for line in lines {
        if let Some(name) = &line.label {
            if labels.contains_key(name) {
                return Err(AssemblyError::SemanticError {
                    line: line.line_number,
                    reason: format!("Duplicate label definition: {}", name),
                });
            }

            let label = match &line.statement {
                Some(Statement::Data { value, .. }) => Label::Data {
                    address: current_address,
                    value: *value,
                },
                _ => Label::Code {
                    address: current_address,
                },
            };
            labels.insert(name.clone(), label);
        }

        match &line.statement {
            Some(Statement::Instruction { mnemonic, .. }) => {
                if let Some(spec) = isa.instruction(&mnemonic.to_uppercase()) {
                    current_address += (spec.total_field_bits() / 8) as u64;
                }
            }
            Some(Statement::Data { width, value }) => {
                static_segment.push(StaticEntry {
                    label: line.label.clone(),
                    value: *value,
                    address: current_address,
                });
                current_address += width.size_bytes();
            }
            Some(Statement::Org(address)) => {
                current_address = *address;
            }
            None => {}
        }
    }

    Ok((labels, static_segment))
}

/// Pass 2: encode every instruction line against the ISA descriptor and the
/// label table. Errors are accumulated so a single run surfaces as many
/// diagnostics as possible; any error fails the whole assembly.
pub fn second_pass(
    lines: &[SourceLine],
    isa: &Isa,
    labels: &LabelTable,
) -> Result<Vec<TextEntry>, AssemblyError> {
    let mut text_segment = Vec::new();
    let mut errors = Vec::new();
    let mut current_address: u64 = 0;

    for line in lines {
        match &line.statement {
            Some(Statement::Instruction { mnemonic, operands }) => {
                let Some(spec) = isa.instruction(&mnemonic.to_uppercase()) else {
                    errors.push(AssemblyError::SemanticError {
                        line: line.line_number,
                        reason: format!("Unknown mnemonic: {}", mnemonic),
                    });
                    continue;
                };

                match encoder::encode_instruction(spec, operands, isa, labels, line.line_number)
                {
                    Ok(bits) => {
                        text_segment.push(TextEntry::Word {
                            bits,
                            address: format!("{:032b}", current_address),
                        });
                        current_address += 4;
                    }
                    Err(e) => errors.push(e),
                }
            }
            Some(Statement::Org(address)) => {
                current_address = *address;
                text_segment.push(TextEntry::Org(*address));
            }
            // Data lines were placed into the static segment by the first
            // pass.
            Some(Statement::Data { .. }) | None => {}
        }
    }

    if errors.is_empty() {
        Ok(text_segment)
    } else {
        Err(AssemblyError::Failed(errors))
    }
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    fn test_isa() -> Isa {
        Isa::from_json(
            r#"{
                "registers": { "ax": "0001" },
                "instructions": [
                    { "mnemonic": "NOP", "opcode": "1111", "operand_count": 0,
                      "operand_types": [], "field_sizes": { "r1": 28 },
                      "bitwise_description": { "opcode": "1111" } },
                    { "mnemonic": "JMP", "opcode": "0001", "operand_count": 1,
                      "operand_types": ["address"],
                      "field_sizes": { "r1": 28 },
                      "bitwise_description": { "opcode": "0001" } }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_first_pass_records_code_labels() {
        let isa = test_isa();
        let lines = parse_source("start:\nNOP\nafter:\n").unwrap();
        let (labels, statics) = first_pass(&lines, &isa).unwrap();
        assert_eq!(labels["start"], Label::Code { address: 0 });
        // NOP advances by its summed field widths: 28 bits -> 3 bytes.
        assert_eq!(labels["after"], Label::Code { address: 3 });
        assert!(statics.is_empty());
    }

    #[test]
    fn test_first_pass_records_data_labels() {
        let isa = test_isa();
        let lines = parse_source("x: db 7\ny: dw 8\nz: dd 9\nend:\n").unwrap();
        let (labels, statics) = first_pass(&lines, &isa).unwrap();
        assert_eq!(labels["x"], Label::Data { address: 0, value: 7 });
        assert_eq!(labels["y"], Label::Data { address: 1, value: 8 });
        assert_eq!(labels["z"], Label::Data { address: 3, value: 9 });
        assert_eq!(labels["end"], Label::Code { address: 7 });
        assert_eq!(statics.len(), 3);
        assert_eq!(statics[1].label.as_deref(), Some("y"));
        assert_eq!(statics[1].address, 1);
    }

    #[test]
    fn test_first_pass_org_moves_cursor() {
        let isa = test_isa();
        let lines = parse_source(".org 0x40\nhere:\n").unwrap();
        let (labels, _) = first_pass(&lines, &isa).unwrap();
        assert_eq!(labels["here"], Label::Code { address: 0x40 });
    }

    #[test]
    fn test_first_pass_duplicate_label() {
        let isa = test_isa();
        let lines = parse_source("a:\na:\n").unwrap();
        let result = first_pass(&lines, &isa);
        assert_eq!(
            result,
            Err(AssemblyError::SemanticError {
                line: 2,
                reason: "Duplicate label definition: a".to_string(),
            })
        );
    }

    #[test]
    fn test_first_pass_ignores_unknown_mnemonics() {
        let isa = test_isa();
        let lines = parse_source("BOGUS %ax\nhere:\n").unwrap();
        let (labels, _) = first_pass(&lines, &isa).unwrap();
        assert_eq!(labels["here"], Label::Code { address: 0 });
    }

    #[test]
    fn test_second_pass_encodes_words() {
        let isa = test_isa();
        let lines = parse_source("NOP\nNOP\n").unwrap();
        let (labels, _) = first_pass(&lines, &isa).unwrap();
        let text = second_pass(&lines, &isa, &labels).unwrap();
        assert_eq!(text.len(), 2);
        match &text[1] {
            TextEntry::Word { bits, address } => {
                assert_eq!(bits, &format!("{:032b}", 0b1111));
                assert_eq!(address, &format!("{:032b}", 4));
            }
            other => panic!("expected word, got {:?}", other),
        }
    }

    #[test]
    fn test_second_pass_accumulates_errors() {
        let isa = test_isa();
        let lines = parse_source("BOGUS\nJMP nowhere\nNOP\n").unwrap();
        let (labels, _) = first_pass(&lines, &isa).unwrap();
        let result = second_pass(&lines, &isa, &labels);
        match result {
            Err(AssemblyError::Failed(errors)) => {
                assert_eq!(errors.len(), 2);
                assert!(errors[0].to_string().contains("Unknown mnemonic: BOGUS"));
                assert!(errors[1].to_string().contains("Undefined label: nowhere"));
            }
            other => panic!("expected accumulated failure, got {:?}", other),
        }
    }
}
