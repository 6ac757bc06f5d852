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

use crate::assembler::symbol_table::{LabelTable, get_label};
use crate::ast::Operand;
use crate::errors::AssemblyError;
use crate::isa::{Isa, InstructionSpec, OperandKind, WORD_BITS};

/// Encodes one instruction into a 32-character bit-string: the opcode
/// bit-string followed by each operand field, left-padded with zeros to the
/// word width.
pub fn encode_instruction(
    spec: &InstructionSpec,
    operands: &[Operand],
    isa: &Isa,
    labels: &LabelTable,
    line: usize,
) -> Result<String, AssemblyError> {
    if operands.len() != spec.operand_count {
        return Err(AssemblyError::SemanticError {
            line,
            reason: format!(
                "Incorrect number of operands for {}. Expected {}, got {}.",
                spec.mnemonic,
                spec.operand_count,
                operands.len()
            ),
        });
    }

    let mut bits = spec.bitwise_description.opcode.clone();
    for (i, operand) in operands.iter().enumerate() {
        let kind = spec.operand_types[i];
        let width = spec.field_width(i, kind);
        bits.push_str(&encode_operand(operand, kind, width, isa, labels, line)?);
    }

    if bits.len() > WORD_BITS {
        return Err(AssemblyError::SemanticError {
            line,
            reason: format!(
                "{} encodes to {} bits, which exceeds the {}-bit word",
                spec.mnemonic,
                bits.len(),
                WORD_BITS
            ),
        });
    }

    Ok(format!("{:0>32}", bits))
}

fn encode_operand(
    operand: &Operand,
    kind: OperandKind,
    width: usize,
    isa: &Isa,
    labels: &LabelTable,
    line: usize,
) -> Result<String, AssemblyError> {
    match kind {
        OperandKind::Register => match operand {
            // Register names are case-sensitive and the stored bit-string is
            // used verbatim.
            Operand::Register(name) => match isa.register(name) {
                Some(reg_bits) => Ok(reg_bits.to_string()),
                None => Err(AssemblyError::SemanticError {
                    line,
                    reason: format!("Unknown register: {}", name),
                }),
            },
            other => Err(AssemblyError::SemanticError {
                line,
                reason: format!("Expected a register operand, got {}", describe(other)),
            }),
        },
        OperandKind::Immediate => match operand {
            Operand::Number(value) => encode_field(*value, width, line),
            Operand::Char(c) => encode_field(*c as i64, width, line),
            other => Err(AssemblyError::SemanticError {
                line,
                reason: format!("Expected an immediate operand, got {}", describe(other)),
            }),
        },
        OperandKind::Memory => match operand {
            Operand::Symbol(name) => {
                let address = get_label(labels, name, line)?.address();
                encode_field(address as i64, width, line)
            }
            Operand::Number(value) if *value >= 0 => encode_field(*value, width, line),
            other => Err(AssemblyError::SemanticError {
                line,
                reason: format!(
                    "Expected a label or a non-negative address, got {}",
                    describe(other)
                ),
            }),
        },
        OperandKind::Address => match operand {
            Operand::Symbol(name) => {
                let address = get_label(labels, name, line)?.address();
                encode_field(address as i64, width, line)
            }
            other => Err(AssemblyError::SemanticError {
                line,
                reason: format!("Expected a label, got {}", describe(other)),
            }),
        },
        OperandKind::Port | OperandKind::Interrupt => match operand {
            Operand::Number(value) if *value >= 0 => encode_field(*value, width, line),
            other => Err(AssemblyError::SemanticError {
                line,
                reason: format!("Expected a numeric operand, got {}", describe(other)),
            }),
        },
    }
}

/// Renders a value as a zero-padded bit-string of exactly `width` bits.
/// Negative values use two's complement within the field.
fn encode_field(value: i64, width: usize, line: usize) -> Result<String, AssemblyError> {
    let fits = if value >= 0 {
        width >= 64 || (value as u128) < (1u128 << width)
    } else {
        width >= 65 || value >= -(1i64 << (width - 1).min(62))
    };
    if !fits {
        return Err(AssemblyError::SemanticError {
            line,
            reason: format!("Value {} does not fit in {} bits", value, width),
        });
    }

    let mask = if width >= 128 {
        u128::MAX
    } else {
        (1u128 << width) - 1
    };
    let masked = (value as i128 as u128) & mask;
    Ok(format!("{:0width$b}", masked, width = width))
}

fn describe(operand: &Operand) -> String {
    match operand {
        Operand::Register(name) => format!("register '%{}'", name),
        Operand::Number(value) => format!("number '{}'", value),
        Operand::Char(c) => format!("character '{}'", c),
        Operand::Symbol(name) => format!("identifier '{}'", name),
    }
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::symbol_table::Label;

    fn test_isa() -> Isa {
        Isa::from_json(
            r#"{
                "registers": { "ax": "0001", "bx": "0010" },
                "instructions": [
                    { "mnemonic": "MOV", "opcode": "0001", "operand_count": 2,
                      "operand_types": ["register", "register"],
                      "field_sizes": { "r1": 4, "r2": 4 },
                      "bitwise_description": { "opcode": "0001" } },
                    { "mnemonic": "LOADI", "opcode": "0010", "operand_count": 2,
                      "operand_types": ["register", "immediate"],
                      "field_sizes": { "r1": 4, "r2": 8 },
                      "bitwise_description": { "opcode": "0010" } },
                    { "mnemonic": "JMP", "opcode": "0011", "operand_count": 1,
                      "operand_types": ["address"],
                      "field_sizes": { "r1": 28 },
                      "bitwise_description": { "opcode": "0011" } },
                    { "mnemonic": "IN", "opcode": "0100", "operand_count": 1,
                      "operand_types": ["port"],
                      "field_sizes": { "r1": 8 },
                      "bitwise_description": { "opcode": "0100" } }
                ]
            }"#,
        )
        .unwrap()
    }

    fn encode(isa: &Isa, mnemonic: &str, operands: &[Operand]) -> Result<String, AssemblyError> {
        let mut labels = LabelTable::new();
        labels.insert("loop".to_string(), Label::Code { address: 0x14 });
        let spec = isa.instruction(mnemonic).unwrap();
        encode_instruction(spec, operands, isa, &labels, 1)
    }

    #[test]
    fn test_register_bits_used_verbatim() {
        let isa = test_isa();
        let bits = encode(
            &isa,
            "MOV",
            &[
                Operand::Register("ax".to_string()),
                Operand::Register("bx".to_string()),
            ],
        )
        .unwrap();
        assert_eq!(bits.len(), 32);
        assert!(bits.ends_with("000100010010"));
    }

    #[test]
    fn test_unknown_register() {
        let isa = test_isa();
        let result = encode(
            &isa,
            "MOV",
            &[
                Operand::Register("ax".to_string()),
                Operand::Register("cx".to_string()),
            ],
        );
        assert_eq!(
            result,
            Err(AssemblyError::SemanticError {
                line: 1,
                reason: "Unknown register: cx".to_string(),
            })
        );
    }

    #[test]
    fn test_immediate_zero_padded_to_width() {
        let isa = test_isa();
        let bits = encode(
            &isa,
            "LOADI",
            &[Operand::Register("ax".to_string()), Operand::Number(5)],
        )
        .unwrap();
        assert!(bits.ends_with("0010000100000101"));
    }

    #[test]
    fn test_char_immediate_uses_ordinal() {
        let isa = test_isa();
        let bits = encode(
            &isa,
            "LOADI",
            &[Operand::Register("ax".to_string()), Operand::Char('A')],
        )
        .unwrap();
        assert!(bits.ends_with("01000001")); // 'A' == 65
    }

    #[test]
    fn test_immediate_overflow_rejected() {
        let isa = test_isa();
        let result = encode(
            &isa,
            "LOADI",
            &[Operand::Register("ax".to_string()), Operand::Number(256)],
        );
        assert_eq!(
            result,
            Err(AssemblyError::SemanticError {
                line: 1,
                reason: "Value 256 does not fit in 8 bits".to_string(),
            })
        );
    }

    #[test]
    fn test_negative_immediate_twos_complement() {
        let isa = test_isa();
        let bits = encode(
            &isa,
            "LOADI",
            &[Operand::Register("ax".to_string()), Operand::Number(-1)],
        )
        .unwrap();
        assert!(bits.ends_with("11111111"));
    }

    #[test]
    fn test_address_resolves_label() {
        let isa = test_isa();
        let bits = encode(&isa, "JMP", &[Operand::Symbol("loop".to_string())]).unwrap();
        assert_eq!(&bits[4..], format!("{:028b}", 0x14));
    }

    #[test]
    fn test_address_rejects_number() {
        let isa = test_isa();
        let result = encode(&isa, "JMP", &[Operand::Number(4)]);
        assert!(matches!(
            result,
            Err(AssemblyError::SemanticError { .. })
        ));
    }

    #[test]
    fn test_undefined_label() {
        let isa = test_isa();
        let result = encode(&isa, "JMP", &[Operand::Symbol("missing".to_string())]);
        assert_eq!(
            result,
            Err(AssemblyError::SemanticError {
                line: 1,
                reason: "Undefined label: missing".to_string(),
            })
        );
    }

    #[test]
    fn test_wrong_arity() {
        let isa = test_isa();
        let result = encode(&isa, "MOV", &[Operand::Register("ax".to_string())]);
        assert_eq!(
            result,
            Err(AssemblyError::SemanticError {
                line: 1,
                reason: "Incorrect number of operands for MOV. Expected 2, got 1.".to_string(),
            })
        );
    }

    #[test]
    fn test_port_accepts_number() {
        let isa = test_isa();
        let bits = encode(&isa, "IN", &[Operand::Number(0x3F)]).unwrap();
        assert!(bits.ends_with("00111111"));
    }
}
