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

use crate::ast::*;
use crate::errors::AssemblyError;
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

// Derive the parser from our grammar file.
#[derive(Parser)]
#[grammar = "./grammar.pest"]
pub struct LineParser;

/// Parses preprocessed assembly text (one statement per line, no comments,
/// no preprocessor directives) into a list of source lines.
pub fn parse_source(source: &str) -> Result<Vec<SourceLine>, AssemblyError> {
    let pairs = LineParser::parse(Rule::program, source).map_err(Box::new)?;
    let mut lines = Vec::new();

    for line_pair in pairs.flatten().filter(|p| p.as_rule() == Rule::line) {
        let mut line = SourceLine {
            line_number: line_pair.as_span().start_pos().line_col().0,
            ..SourceLine::default()
        };

        for pair in line_pair.into_inner() {
            match pair.as_rule() {
                Rule::label_def => {
                    let name = pair.into_inner().next().unwrap().as_str().to_string();
                    line.label = Some(name);
                }
                Rule::instruction => {
                    line.statement = Some(build_instruction(pair)?);
                }
                Rule::data_statement => {
                    line.statement = Some(build_data(pair)?);
                }
                Rule::org_directive => {
                    line.statement = Some(build_org(pair)?);
                }
                _ => {}
            }
        }

        if line.label.is_some() || line.statement.is_some() {
            lines.push(line);
        }
    }

    Ok(lines)
}

/// Convenience wrapper for the preprocessor's output.
pub fn parse_lines(lines: &[String]) -> Result<Vec<SourceLine>, AssemblyError> {
    parse_source(&lines.join("\n"))
}

fn build_instruction(pair: Pair<Rule>) -> Result<Statement, AssemblyError> {
    let line = pair.as_span().start_pos().line_col().0;
    let mut inner = pair.into_inner();
    let mnemonic = inner.next().unwrap().as_str().to_string();

    let mut operands = Vec::new();
    for op_pair in inner {
        operands.push(build_operand(op_pair, line)?);
    }

    Ok(Statement::Instruction { mnemonic, operands })
}

fn build_operand(pair: Pair<Rule>, line: usize) -> Result<Operand, AssemblyError> {
    let inner = pair.into_inner().next().unwrap();
    match inner.as_rule() {
        Rule::register => {
            let name = inner.into_inner().next().unwrap().as_str().to_string();
            Ok(Operand::Register(name))
        }
        Rule::char_literal => {
            let c = inner.into_inner().next().unwrap().as_str();
            Ok(Operand::Char(c.chars().next().unwrap()))
        }
        Rule::number => Ok(Operand::Number(parse_number(inner.as_str(), line)?)),
        Rule::ident => Ok(Operand::Symbol(inner.as_str().to_string())),
        rule => unreachable!("unexpected operand rule {:?}", rule),
    }
}

fn build_data(pair: Pair<Rule>) -> Result<Statement, AssemblyError> {
    let line = pair.as_span().start_pos().line_col().0;
    let mut inner = pair.into_inner();
    let width = match inner.next().unwrap().as_str() {
        "db" => DataWidth::Byte,
        "dw" => DataWidth::Word,
        "dd" => DataWidth::DoubleWord,
        kw => unreachable!("unexpected data keyword {:?}", kw),
    };
    let value = parse_number(inner.next().unwrap().as_str(), line)?;
    Ok(Statement::Data { width, value })
}

fn build_org(pair: Pair<Rule>) -> Result<Statement, AssemblyError> {
    let line = pair.as_span().start_pos().line_col().0;
    let text = pair.into_inner().next().unwrap().as_str();
    // The .org literal is hexadecimal with or without a 0x prefix, and is
    // loaded unscaled.
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let value =
        u64::from_str_radix(digits, 16).map_err(|_| AssemblyError::StructuralError {
            line,
            reason: format!(".org address '{}' is out of range", text),
        })?;
    Ok(Statement::Org(value))
}

fn parse_number(text: &str, line: usize) -> Result<i64, AssemblyError> {
    let parsed = if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16)
    } else {
        text.parse::<i64>()
    };
    parsed.map_err(|_| AssemblyError::StructuralError {
        line,
        reason: format!("numeric literal '{}' is out of range", text),
    })
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_mnemonic() {
        let lines = parse_source("NOP\n").unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0].statement,
            Some(Statement::Instruction {
                mnemonic: "NOP".to_string(),
                operands: vec![],
            })
        );
        assert_eq!(lines[0].label, None);
    }

    #[test]
    fn test_parse_label_only() {
        let lines = parse_source("start:\n").unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].label, Some("start".to_string()));
        assert_eq!(lines[0].statement, None);
    }

    #[test]
    fn test_parse_register_operands() {
        let lines = parse_source("ADD %r1, %r2\n").unwrap();
        assert_eq!(
            lines[0].statement,
            Some(Statement::Instruction {
                mnemonic: "ADD".to_string(),
                operands: vec![
                    Operand::Register("r1".to_string()),
                    Operand::Register("r2".to_string()),
                ],
            })
        );
    }

    #[test]
    fn test_parse_operands_without_commas() {
        let lines = parse_source("ADD %r1 %r2\n").unwrap();
        match lines[0].statement.as_ref().unwrap() {
            Statement::Instruction { operands, .. } => assert_eq!(operands.len(), 2),
            other => panic!("expected instruction, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_immediate_forms() {
        let lines = parse_source("LOAD %ax, 0x2A\nLOAD %ax, 42\nLOAD %ax, 'a'\n").unwrap();
        let ops: Vec<_> = lines
            .iter()
            .map(|l| match l.statement.as_ref().unwrap() {
                Statement::Instruction { operands, .. } => operands[1].clone(),
                other => panic!("expected instruction, got {:?}", other),
            })
            .collect();
        assert_eq!(
            ops,
            vec![
                Operand::Number(0x2A),
                Operand::Number(42),
                Operand::Char('a'),
            ]
        );
    }

    #[test]
    fn test_parse_label_reference_operand() {
        let lines = parse_source("JMP loop\n").unwrap();
        assert_eq!(
            lines[0].statement,
            Some(Statement::Instruction {
                mnemonic: "JMP".to_string(),
                operands: vec![Operand::Symbol("loop".to_string())],
            })
        );
    }

    #[test]
    fn test_parse_org_hex() {
        let lines = parse_source(".org 0x3000\n.org 4F\n").unwrap();
        assert_eq!(lines[0].statement, Some(Statement::Org(0x3000)));
        assert_eq!(lines[1].statement, Some(Statement::Org(0x4F)));
    }

    #[test]
    fn test_parse_data_directives() {
        let lines = parse_source("db 7\ndw 0x10\ndd -1\n").unwrap();
        assert_eq!(
            lines[0].statement,
            Some(Statement::Data {
                width: DataWidth::Byte,
                value: 7,
            })
        );
        assert_eq!(
            lines[1].statement,
            Some(Statement::Data {
                width: DataWidth::Word,
                value: 0x10,
            })
        );
        assert_eq!(
            lines[2].statement,
            Some(Statement::Data {
                width: DataWidth::DoubleWord,
                value: -1,
            })
        );
    }

    #[test]
    fn test_parse_data_label() {
        let lines = parse_source("count: dd 0x40\n").unwrap();
        assert_eq!(lines[0].label, Some("count".to_string()));
        assert_eq!(
            lines[0].statement,
            Some(Statement::Data {
                width: DataWidth::DoubleWord,
                value: 0x40,
            })
        );
    }

    #[test]
    fn test_line_numbers_follow_input() {
        let lines = parse_source("NOP\nNOP\nNOP\n").unwrap();
        let numbers: Vec<_> = lines.iter().map(|l| l.line_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }
}
