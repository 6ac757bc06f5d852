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
use crate::pascal::ast::*;
use crate::pascal::token::{Token, TokenKind, TokenValue};

/// Recursive-descent parser over the token stream. Strict: the first
/// unexpected token aborts the parse with its position and the
/// expected-vs-found kinds.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

pub fn parse(tokens: Vec<Token>) -> Result<Program, PascalError> {
    Parser::new(tokens).parse()
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn kind(&self) -> Option<TokenKind> {
        self.current().map(|t| t.kind)
    }

    fn eat(&mut self, expected: TokenKind) -> Result<Token, PascalError> {
        match self.current() {
            Some(token) if token.kind == expected => {
                let token = token.clone();
                self.pos += 1;
                Ok(token)
            }
            Some(token) => Err(PascalError::Syntax {
                line: token.line,
                column: token.column,
                message: format!("Expected {}, found {}", expected, token.kind),
            }),
            None => Err(PascalError::SyntaxNoPosition {
                message: format!("Expected {}, found EOF", expected),
            }),
        }
    }

    fn error(&self, message: String) -> PascalError {
        match self.current() {
            Some(token) => PascalError::Syntax {
                line: token.line,
                column: token.column,
                message,
            },
            None => PascalError::SyntaxNoPosition { message },
        }
    }

    pub fn parse(mut self) -> Result<Program, PascalError> {
        let program = self.program()?;
        if self.current().is_some() {
            return Err(self.error("Unexpected token after end of program".to_string()));
        }
        Ok(program)
    }

    // program := PROGRAM id ; block .
    fn program(&mut self) -> Result<Program, PascalError> {
        self.eat(TokenKind::Program)?;
        let name = self.eat(TokenKind::Id)?.text().to_string();
        self.eat(TokenKind::Semicolon)?;
        let block = self.block()?;
        self.eat(TokenKind::Dot)?;
        Ok(Program { name, block })
    }

    fn block(&mut self) -> Result<Block, PascalError> {
        let declarations = self.declarations()?;
        let compound_statement = self.compound_statement()?;
        Ok(Block {
            declarations,
            compound_statement,
        })
    }

    fn declarations(&mut self) -> Result<Vec<Decl>, PascalError> {
        let mut declarations = Vec::new();
        loop {
            match self.kind() {
                Some(TokenKind::Var) => declarations.extend(self.var_declaration_section()?),
                Some(TokenKind::Const) => declarations.extend(self.const_declaration_section()?),
                Some(TokenKind::Type) => declarations.extend(self.type_declaration_section()?),
                _ => break,
            }
        }
        loop {
            match self.kind() {
                Some(TokenKind::Procedure) => {
                    declarations.push(self.procedure_declaration()?);
                }
                Some(TokenKind::Function) => {
                    declarations.push(self.function_declaration()?);
                }
                _ => break,
            }
        }
        Ok(declarations)
    }

    // var_declaration := VAR (id_list : type_spec ;)+
    fn var_declaration_section(&mut self) -> Result<Vec<Decl>, PascalError> {
        self.eat(TokenKind::Var)?;
        let mut declarations = Vec::new();
        while self.kind() == Some(TokenKind::Id) {
            declarations.extend(self.variable_declaration()?);
            self.eat(TokenKind::Semicolon)?;
        }
        Ok(declarations)
    }

    // id (, id)* : type_spec
    fn variable_declaration(&mut self) -> Result<Vec<Decl>, PascalError> {
        let mut var_tokens = vec![self.eat(TokenKind::Id)?];
        while self.kind() == Some(TokenKind::Comma) {
            self.eat(TokenKind::Comma)?;
            var_tokens.push(self.eat(TokenKind::Id)?);
        }
        self.eat(TokenKind::Colon)?;
        let type_node = self.type_spec()?;
        Ok(var_tokens
            .into_iter()
            .map(|token| Decl::VarDecl {
                var_node: Expr::Var { token },
                type_node: type_node.clone(),
            })
            .collect())
    }

    // const_declaration := CONST (id = literal ;)+
    fn const_declaration_section(&mut self) -> Result<Vec<Decl>, PascalError> {
        self.eat(TokenKind::Const)?;
        let mut declarations = Vec::new();
        while self.kind() == Some(TokenKind::Id) {
            let name = self.eat(TokenKind::Id)?.text().to_string();
            self.eat(TokenKind::Eq)?;
            let value = self.factor()?;
            self.eat(TokenKind::Semicolon)?;
            declarations.push(Decl::Const { name, value });
        }
        Ok(declarations)
    }

    // type_declaration := TYPE (id = type_spec ;)+
    fn type_declaration_section(&mut self) -> Result<Vec<Decl>, PascalError> {
        self.eat(TokenKind::Type)?;
        let mut declarations = Vec::new();
        while self.kind() == Some(TokenKind::Id) {
            let name = self.eat(TokenKind::Id)?.text().to_string();
            self.eat(TokenKind::Eq)?;
            let type_spec = self.type_spec()?;
            self.eat(TokenKind::Semicolon)?;
            declarations.push(Decl::Type { name, type_spec });
        }
        Ok(declarations)
    }

    // type_spec := id | array_type. Built-in type names are ordinary
    // identifiers here; the analyzer decides what they mean.
    fn type_spec(&mut self) -> Result<TypeSpec, PascalError> {
        match self.kind() {
            Some(TokenKind::Array) => self.array_type_spec(),
            Some(TokenKind::Id) => {
                let token = self.eat(TokenKind::Id)?;
                Ok(TypeSpec::SimpleType { token })
            }
            Some(kind) => Err(self.error(format!("Unexpected type: {}", kind))),
            None => Err(self.error("Unexpected type: EOF".to_string())),
        }
    }

    // array_type := ARRAY [ expr .. expr ] OF type_spec
    // The range's `..` arrives as two DOT tokens.
    fn array_type_spec(&mut self) -> Result<TypeSpec, PascalError> {
        self.eat(TokenKind::Array)?;
        self.eat(TokenKind::Lbracket)?;
        let start = self.expr()?;
        self.eat(TokenKind::Dot)?;
        self.eat(TokenKind::Dot)?;
        let end = self.expr()?;
        self.eat(TokenKind::Rbracket)?;
        self.eat(TokenKind::Of)?;
        let element_type = self.type_spec()?;
        Ok(TypeSpec::ArrayType {
            element_type: Box::new(element_type),
            start: Box::new(start),
            end: Box::new(end),
        })
    }

    // procedure := PROCEDURE id [ ( formal_params ) ] ; block ;
    fn procedure_declaration(&mut self) -> Result<Decl, PascalError> {
        self.eat(TokenKind::Procedure)?;
        let name = self.eat(TokenKind::Id)?.text().to_string();
        let params = if self.kind() == Some(TokenKind::Lparen) {
            self.formal_parameter_list()?
        } else {
            Vec::new()
        };
        self.eat(TokenKind::Semicolon)?;
        let block = self.block()?;
        self.eat(TokenKind::Semicolon)?;
        Ok(Decl::Procedure {
            name,
            params,
            block,
        })
    }

    // function := FUNCTION id [ ( formal_params ) ] : type_spec ; block ;
    fn function_declaration(&mut self) -> Result<Decl, PascalError> {
        self.eat(TokenKind::Function)?;
        let name = self.eat(TokenKind::Id)?.text().to_string();
        let params = if self.kind() == Some(TokenKind::Lparen) {
            self.formal_parameter_list()?
        } else {
            Vec::new()
        };
        self.eat(TokenKind::Colon)?;
        let return_type = self.type_spec()?;
        self.eat(TokenKind::Semicolon)?;
        let block = self.block()?;
        self.eat(TokenKind::Semicolon)?;
        Ok(Decl::Function {
            name,
            params,
            return_type,
            block,
        })
    }

    fn formal_parameter_list(&mut self) -> Result<Vec<Decl>, PascalError> {
        self.eat(TokenKind::Lparen)?;
        let params = self.formal_parameters()?;
        self.eat(TokenKind::Rparen)?;
        Ok(params)
    }

    fn formal_parameters(&mut self) -> Result<Vec<Decl>, PascalError> {
        let mut params = Vec::new();
        if self.kind() == Some(TokenKind::Id) {
            params.extend(self.variable_declaration()?);
            while self.kind() == Some(TokenKind::Semicolon) {
                self.eat(TokenKind::Semicolon)?;
                params.extend(self.variable_declaration()?);
            }
        }
        Ok(params)
    }

    fn compound_statement(&mut self) -> Result<Stmt, PascalError> {
        self.eat(TokenKind::Begin)?;
        let statements = self.statement_list()?;
        self.eat(TokenKind::End)?;
        Ok(Stmt::CompoundStatement { statements })
    }

    fn statement_list(&mut self) -> Result<Vec<Stmt>, PascalError> {
        let mut statements = vec![self.statement()?];
        while self.kind() == Some(TokenKind::Semicolon) {
            self.eat(TokenKind::Semicolon)?;
            statements.push(self.statement()?);
        }
        Ok(statements)
    }

    fn statement(&mut self) -> Result<Stmt, PascalError> {
        match self.kind() {
            Some(TokenKind::Begin) => self.compound_statement(),
            Some(TokenKind::Id) => self.assignment_statement(),
            Some(TokenKind::If) => self.if_statement(),
            Some(TokenKind::While) => self.while_statement(),
            Some(TokenKind::For) => self.for_statement(),
            Some(TokenKind::Case) => self.case_statement(),
            Some(TokenKind::Semicolon) => {
                self.eat(TokenKind::Semicolon)?;
                Ok(Stmt::NoOp)
            }
            _ => Ok(Stmt::NoOp),
        }
    }

    fn assignment_statement(&mut self) -> Result<Stmt, PascalError> {
        let left = self.variable()?;
        if self.kind() == Some(TokenKind::Assign) {
            let op = self.eat(TokenKind::Assign)?;
            let right = self.expr()?;
            return Ok(Stmt::Assign { left, op, right });
        }

        match &left {
            Expr::Var { token } => {
                let name = token.text().to_string();
                let actual_params = self.actual_parameters()?;
                Ok(Stmt::ProcedureCall {
                    name,
                    actual_params,
                })
            }
            _ => Err(self.error("Invalid assignment target".to_string())),
        }
    }

    fn if_statement(&mut self) -> Result<Stmt, PascalError> {
        self.eat(TokenKind::If)?;
        let condition = self.expr()?;
        self.eat(TokenKind::Then)?;
        let then_statement = Box::new(self.statement()?);
        let else_statement = if self.kind() == Some(TokenKind::Else) {
            self.eat(TokenKind::Else)?;
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_statement,
            else_statement,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt, PascalError> {
        self.eat(TokenKind::While)?;
        let condition = self.expr()?;
        self.eat(TokenKind::Do)?;
        let statement = Box::new(self.statement()?);
        Ok(Stmt::While {
            condition,
            statement,
        })
    }

    fn for_statement(&mut self) -> Result<Stmt, PascalError> {
        self.eat(TokenKind::For)?;
        let var = self.variable()?;
        self.eat(TokenKind::Assign)?;
        let start = self.expr()?;
        let direction = if self.kind() == Some(TokenKind::To) {
            self.eat(TokenKind::To)?;
            Direction::To
        } else {
            self.eat(TokenKind::Downto)?;
            Direction::Downto
        };
        let end = self.expr()?;
        self.eat(TokenKind::Do)?;
        let statement = Box::new(self.statement()?);
        Ok(Stmt::For {
            var,
            start,
            end,
            statement,
            direction,
        })
    }

    // case := CASE expr OF (value : stmt ;)* [ELSE stmt ;] END
    fn case_statement(&mut self) -> Result<Stmt, PascalError> {
        self.eat(TokenKind::Case)?;
        let expr = self.expr()?;
        self.eat(TokenKind::Of)?;
        let mut cases = Vec::new();
        while matches!(
            self.kind(),
            Some(TokenKind::Integer) | Some(TokenKind::String)
        ) {
            let value = self.expr()?;
            self.eat(TokenKind::Colon)?;
            let statement = self.statement()?;
            self.eat(TokenKind::Semicolon)?;
            cases.push(CaseArm { value, statement });
        }
        let else_case = if self.kind() == Some(TokenKind::Else) {
            self.eat(TokenKind::Else)?;
            let statement = Box::new(self.statement()?);
            self.eat(TokenKind::Semicolon)?;
            Some(statement)
        } else {
            None
        };
        self.eat(TokenKind::End)?;
        Ok(Stmt::Case {
            expr,
            cases,
            else_case,
        })
    }

    // Optional parenthesized argument list; a bare call has none.
    fn actual_parameters(&mut self) -> Result<Vec<Expr>, PascalError> {
        let mut params = Vec::new();
        if self.kind() == Some(TokenKind::Lparen) {
            self.eat(TokenKind::Lparen)?;
            if self.kind() != Some(TokenKind::Rparen) {
                params.push(self.expr()?);
                while self.kind() == Some(TokenKind::Comma) {
                    self.eat(TokenKind::Comma)?;
                    params.push(self.expr()?);
                }
            }
            self.eat(TokenKind::Rparen)?;
        }
        Ok(params)
    }

    // variable := id [ [ expr ] ]. Indexing becomes a BinOp with the
    // synthetic INDEX operator.
    fn variable(&mut self) -> Result<Expr, PascalError> {
        let token = self.eat(TokenKind::Id)?;
        let node = Expr::Var { token };

        if self.kind() == Some(TokenKind::Lbracket) {
            self.eat(TokenKind::Lbracket)?;
            let index = self.expr()?;
            self.eat(TokenKind::Rbracket)?;
            return Ok(Expr::BinOp {
                left: Box::new(node),
                op: Token::new(
                    TokenKind::Index,
                    TokenValue::Text("[]".to_string()),
                    0,
                    0,
                ),
                right: Box::new(index),
            });
        }

        Ok(node)
    }

    // expr := simple_expr ((EQ|NEQ|LT|LTE|GT|GTE) simple_expr)*
    fn expr(&mut self) -> Result<Expr, PascalError> {
        let mut node = self.simple_expr()?;
        while matches!(
            self.kind(),
            Some(TokenKind::Eq)
                | Some(TokenKind::Neq)
                | Some(TokenKind::Lt)
                | Some(TokenKind::Lte)
                | Some(TokenKind::Gt)
                | Some(TokenKind::Gte)
        ) {
            let op = self.eat(self.kind().unwrap())?;
            let right = self.simple_expr()?;
            node = Expr::BinOp {
                left: Box::new(node),
                op,
                right: Box::new(right),
            };
        }
        Ok(node)
    }

    // simple_expr := term ((PLUS|MINUS|OR) term)*
    fn simple_expr(&mut self) -> Result<Expr, PascalError> {
        let mut node = self.term()?;
        while matches!(
            self.kind(),
            Some(TokenKind::Plus) | Some(TokenKind::Minus) | Some(TokenKind::Or)
        ) {
            let op = self.eat(self.kind().unwrap())?;
            let right = self.term()?;
            node = Expr::BinOp {
                left: Box::new(node),
                op,
                right: Box::new(right),
            };
        }
        Ok(node)
    }

    // term := factor ((MUL|DIV|AND) factor)*
    fn term(&mut self) -> Result<Expr, PascalError> {
        let mut node = self.factor()?;
        while matches!(
            self.kind(),
            Some(TokenKind::Mul) | Some(TokenKind::Div) | Some(TokenKind::And)
        ) {
            let op = self.eat(self.kind().unwrap())?;
            let right = self.factor()?;
            node = Expr::BinOp {
                left: Box::new(node),
                op,
                right: Box::new(right),
            };
        }
        Ok(node)
    }

    fn factor(&mut self) -> Result<Expr, PascalError> {
        match self.kind() {
            Some(TokenKind::Plus) | Some(TokenKind::Minus) | Some(TokenKind::Not) => {
                let op = self.eat(self.kind().unwrap())?;
                let expr = self.factor()?;
                Ok(Expr::UnaryOp {
                    op,
                    expr: Box::new(expr),
                })
            }
            Some(TokenKind::Integer) | Some(TokenKind::Real) => {
                let token = self.eat(self.kind().unwrap())?;
                Ok(Expr::Num { token })
            }
            Some(TokenKind::String) => {
                let token = self.eat(TokenKind::String)?;
                Ok(Expr::String { token })
            }
            Some(TokenKind::Boolean) => {
                let token = self.eat(TokenKind::Boolean)?;
                let value = token.text().eq_ignore_ascii_case("true");
                Ok(Expr::Boolean { token, value })
            }
            Some(TokenKind::Lparen) => {
                self.eat(TokenKind::Lparen)?;
                let node = self.expr()?;
                self.eat(TokenKind::Rparen)?;
                Ok(node)
            }
            Some(TokenKind::Id) => self.variable_or_procedure_call(),
            Some(kind) => Err(self.error(format!("Unexpected token: {}", kind))),
            None => Err(self.error("Unexpected token: EOF".to_string())),
        }
    }

    fn variable_or_procedure_call(&mut self) -> Result<Expr, PascalError> {
        let node = self.variable()?;
        if let Expr::Var { token } = &node {
            if self.kind() == Some(TokenKind::Lparen) {
                let name = token.text().to_string();
                let actual_params = self.actual_parameters()?;
                return Ok(Expr::ProcedureCall {
                    name,
                    actual_params,
                });
            }
        }
        Ok(node)
    }
}

// ------------- unit tests -------------
