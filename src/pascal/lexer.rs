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

use crate::errors::PascalError;
use crate::pascal::token::{Token, TokenKind, TokenValue};

/// Longest-match scanner producing a positioned token stream. Patterns are
/// tried in a fixed priority order at every position; comments and
/// whitespace advance the position without emitting a token.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

pub fn tokenize(code: &str) -> Result<Vec<Token>, PascalError> {
    Lexer::new(code).tokenize()
}

impl Lexer {
    pub fn new(code: &str) -> Self {
        Lexer {
            chars: code.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, PascalError> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek(0) {
            let line = self.line;
            let column = self.column;

            if c.is_ascii_digit() {
                tokens.push(self.number(line, column)?);
            } else if c == ':' && self.peek(1) == Some('=') {
                self.advance(2);
                tokens.push(Token::new(
                    TokenKind::Assign,
                    TokenValue::Text(":=".to_string()),
                    line,
                    column,
                ));
            } else if c == '{' {
                self.comment_until(&['}'], line, column)?;
            } else if c == '(' && self.peek(1) == Some('*') {
                self.comment_until(&['*', ')'], line, column)?;
            } else if let Some(kind) = single_char_kind(c) {
                self.advance(1);
                tokens.push(Token::new(
                    kind,
                    TokenValue::Text(c.to_string()),
                    line,
                    column,
                ));
            } else if c == '<' || c == '>' || c == '=' {
                tokens.push(self.comparison(c, line, column));
            } else if c == '\'' {
                tokens.push(self.string_literal(line, column)?);
            } else if c.is_ascii_alphabetic() || c == '_' {
                tokens.push(self.word(line, column));
            } else if c == '\n' {
                self.pos += 1;
                self.line += 1;
                self.column = 1;
            } else if c == ' ' || c == '\t' || c == '\r' {
                self.advance(1);
            } else {
                return Err(PascalError::Lexical {
                    line,
                    column,
                    message: format!("Unexpected character: {}", c),
                });
            }
        }

        Ok(tokens)
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    // Advances over `count` characters, none of which may be a newline.
    fn advance(&mut self, count: usize) {
        self.pos += count;
        self.column += count;
    }

    // Advances over one character, tracking newlines.
    fn advance_tracking(&mut self) {
        if self.peek(0) == Some('\n') {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.pos += 1;
    }

    fn number(&mut self, line: usize, column: usize) -> Result<Token, PascalError> {
        let start = self.pos;
        while self.peek(0).is_some_and(|c| c.is_ascii_digit()) {
            self.advance(1);
        }

        // A fraction only counts with a digit after the dot, so `1..10`
        // stays INTEGER DOT DOT INTEGER.
        let is_real =
            self.peek(0) == Some('.') && self.peek(1).is_some_and(|c| c.is_ascii_digit());
        if is_real {
            self.advance(1);
            while self.peek(0).is_some_and(|c| c.is_ascii_digit()) {
                self.advance(1);
            }
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        if is_real {
            let value = text.parse::<f64>().map_err(|_| PascalError::Lexical {
                line,
                column,
                message: format!("Malformed real literal: {}", text),
            })?;
            Ok(Token::new(TokenKind::Real, TokenValue::Real(value), line, column))
        } else {
            let value = text.parse::<i64>().map_err(|_| PascalError::Lexical {
                line,
                column,
                message: format!("Integer literal out of range: {}", text),
            })?;
            Ok(Token::new(
                TokenKind::Integer,
                TokenValue::Int(value),
                line,
                column,
            ))
        }
    }

    fn comparison(&mut self, c: char, line: usize, column: usize) -> Token {
        let (kind, text) = match (c, self.peek(1)) {
            ('<', Some('=')) => (TokenKind::Lte, "<="),
            ('<', Some('>')) => (TokenKind::Neq, "<>"),
            ('<', _) => (TokenKind::Lt, "<"),
            ('>', Some('=')) => (TokenKind::Gte, ">="),
            ('>', _) => (TokenKind::Gt, ">"),
            _ => (TokenKind::Eq, "="),
        };
        self.advance(text.len());
        Token::new(kind, TokenValue::Text(text.to_string()), line, column)
    }

    fn string_literal(&mut self, line: usize, column: usize) -> Result<Token, PascalError> {
        self.advance(1); // opening quote
        let start = self.pos;
        while let Some(c) = self.peek(0) {
            if c == '\'' {
                let text: String = self.chars[start..self.pos].iter().collect();
                self.advance(1); // closing quote
                return Ok(Token::new(
                    TokenKind::String,
                    TokenValue::Text(text),
                    line,
                    column,
                ));
            }
            self.advance_tracking();
        }
        Err(PascalError::Lexical {
            line,
            column,
            message: "Unterminated string literal".to_string(),
        })
    }

    fn word(&mut self, line: usize, column: usize) -> Token {
        let start = self.pos;
        while self
            .peek(0)
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance(1);
        }
        let text: String = self.chars[start..self.pos].iter().collect();

        let kind = if let Some(keyword) = TokenKind::keyword(&text) {
            keyword
        } else if text.eq_ignore_ascii_case("TRUE") || text.eq_ignore_ascii_case("FALSE") {
            TokenKind::Boolean
        } else {
            TokenKind::Id
        };
        Token::new(kind, TokenValue::Text(text), line, column)
    }

    fn comment_until(
        &mut self,
        terminator: &[char],
        line: usize,
        column: usize,
    ) -> Result<(), PascalError> {
        while self.pos < self.chars.len() {
            if self.matches(terminator) {
                self.advance(terminator.len());
                return Ok(());
            }
            self.advance_tracking();
        }
        Err(PascalError::Lexical {
            line,
            column,
            message: "Unterminated comment".to_string(),
        })
    }

    fn matches(&self, expected: &[char]) -> bool {
        expected
            .iter()
            .enumerate()
            .all(|(i, c)| self.peek(i) == Some(*c))
    }
}

fn single_char_kind(c: char) -> Option<TokenKind> {
    match c {
        ';' => Some(TokenKind::Semicolon),
        ':' => Some(TokenKind::Colon),
        ',' => Some(TokenKind::Comma),
        '.' => Some(TokenKind::Dot),
        '(' => Some(TokenKind::Lparen),
        ')' => Some(TokenKind::Rparen),
        '[' => Some(TokenKind::Lbracket),
        ']' => Some(TokenKind::Rbracket),
        '+' => Some(TokenKind::Plus),
        '-' => Some(TokenKind::Minus),
        '*' => Some(TokenKind::Mul),
        '/' => Some(TokenKind::Div),
        _ => None,
    }
}

// ------------- unit tests -------------
