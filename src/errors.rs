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

use thiserror::Error;

fn join_errors(errors: &[AssemblyError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Error, Debug, PartialEq)]
pub enum AssemblyError {
    #[error("Syntax Error: {0}")]
    PestError(#[from] Box<pest::error::Error<crate::parser::Rule>>),

    #[error("Config Error: {reason}")]
    ConfigError { reason: String },

    #[error("Structural Error on line {line}: {reason}")]
    StructuralError { line: usize, reason: String },

    #[error("Preprocessor Error on line {line}: {reason}")]
    PreprocessorError { line: usize, reason: String },

    #[error("Preprocessor Error: {reason}")]
    PreprocessorErrorNoLine { reason: String },

    #[error("Semantic Error on line {line}: {reason}")]
    SemanticError { line: usize, reason: String },

    // Wraps everything the second pass accumulated before giving up.
    #[error("{}", join_errors(.0))]
    Failed(Vec<AssemblyError>),
}

#[derive(Error, Debug, PartialEq)]
pub enum PascalError {
    #[error("Lexer error at line {line}, column {column}: {message}")]
    Lexical {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Error: {message}")]
    SyntaxNoPosition { message: String },

    #[error("Semantic error at line {line}, column {column}: {message}")]
    Semantic {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Semantic error: {message}")]
    SemanticNoPosition { message: String },
}
