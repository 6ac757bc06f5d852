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

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod semantic;
pub mod symbol;
pub mod token;

use crate::errors::PascalError;

/// Runs the whole front-end over a source text: lex, parse, then analyze.
/// Returns the AST of a statically valid program, or the first error.
pub fn compile(source: &str) -> Result<ast::Program, PascalError> {
    let tokens = lexer::tokenize(source)?;
    let program = parser::parse(tokens)?;
    semantic::analyze(&program)?;
    Ok(program)
}
