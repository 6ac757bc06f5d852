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
use crate::pascal::symbol::*;
use crate::pascal::token::{Token, TokenKind, TokenValue};

/// Walks the AST with a stack of scoped symbol tables, resolving every
/// identifier and checking type compatibility. Aborts on the first error.
pub struct SemanticAnalyzer {
    scopes: ScopeStack,
}

pub fn analyze(program: &Program) -> Result<(), PascalError> {
    SemanticAnalyzer::new().analyze_program(program)
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        SemanticAnalyzer {
            scopes: ScopeStack::new(),
        }
    }

    pub fn analyze_program(&mut self, program: &Program) -> Result<(), PascalError> {
        self.scopes.push("global");
        let result = self.visit_block(&program.block);
        self.scopes.pop();
        result
    }

    fn visit_block(&mut self, block: &Block) -> Result<(), PascalError> {
        for declaration in &block.declarations {
            self.visit_decl(declaration)?;
        }
        self.visit_stmt(&block.compound_statement)
    }

    fn visit_decl(&mut self, declaration: &Decl) -> Result<(), PascalError> {
        match declaration {
            Decl::VarDecl {
                var_node,
                type_node,
            } => {
                let ty = Ty::from_type_spec(type_node)?;
                let Expr::Var { token } = var_node else {
                    return Err(PascalError::SemanticNoPosition {
                        message: "Malformed variable declaration".to_string(),
                    });
                };
                let name = token.text().to_string();
                self.check_duplicate(&name, token)?;
                self.scopes
                    .current()
                    .insert(Symbol::Variable(VariableSymbol { name, ty }));
                Ok(())
            }
            Decl::Const { name, value } => {
                let ty = self.expr_type_required(value)?;
                let folded = literal_value(value).ok_or_else(|| {
                    PascalError::SemanticNoPosition {
                        message: format!("Invalid constant value for '{}'", name),
                    }
                })?;
                if self.scopes.lookup_local(name).is_some() {
                    return Err(PascalError::SemanticNoPosition {
                        message: format!("Duplicate identifier '{}' found", name),
                    });
                }
                self.scopes.current().insert(Symbol::Constant(ConstantSymbol {
                    name: name.clone(),
                    ty,
                    value: folded,
                }));
                Ok(())
            }
            // User-defined type aliases are carried in the AST but introduce
            // nothing into the symbol table yet; references to them stay
            // named simple types.
            Decl::Type { .. } => Ok(()),
            Decl::Procedure {
                name,
                params,
                block,
            } => self.visit_routine(name, params, None, block),
            Decl::Function {
                name,
                params,
                return_type,
                block,
            } => self.visit_routine(name, params, Some(return_type), block),
        }
    }

    fn visit_routine(
        &mut self,
        name: &str,
        params: &[Decl],
        return_type: Option<&TypeSpec>,
        block: &Block,
    ) -> Result<(), PascalError> {
        let mut param_symbols = Vec::new();
        for param in params {
            let Decl::VarDecl {
                var_node,
                type_node,
            } = param
            else {
                continue;
            };
            param_symbols.push(VariableSymbol {
                name: var_node.var_name().to_string(),
                ty: Ty::from_type_spec(type_node)?,
            });
        }

        if self.scopes.lookup_local(name).is_some() {
            return Err(PascalError::SemanticNoPosition {
                message: format!("Duplicate identifier '{}' found", name),
            });
        }

        let symbol = match return_type {
            Some(spec) => Symbol::Function(FunctionSymbol {
                name: name.to_string(),
                params: param_symbols.clone(),
                return_type: Ty::from_type_spec(spec)?,
            }),
            None => Symbol::Procedure(ProcedureSymbol {
                name: name.to_string(),
                params: param_symbols.clone(),
            }),
        };
        self.scopes.current().insert(symbol);

        self.scopes.push(name);
        for param in param_symbols {
            self.scopes.current().insert(Symbol::Variable(param));
        }
        let result = self.visit_block(block);
        self.scopes.pop();
        result
    }

    fn visit_stmt(&mut self, statement: &Stmt) -> Result<(), PascalError> {
        match statement {
            Stmt::CompoundStatement { statements } => {
                for s in statements {
                    self.visit_stmt(s)?;
                }
                Ok(())
            }
            Stmt::Assign { left, op, right } => {
                let right_ty = self.expr_type_required(right)?;
                let left_ty = self.expr_type_required(left)?;
                if !Ty::compatible(&left_ty, &right_ty) {
                    return Err(PascalError::Semantic {
                        line: op.line,
                        column: op.column,
                        message: format!(
                            "Incompatible types in assignment: {} and {}",
                            left_ty.name(),
                            right_ty.name()
                        ),
                    });
                }
                Ok(())
            }
            Stmt::If {
                condition,
                then_statement,
                else_statement,
            } => {
                let condition_ty = self.expr_type_required(condition)?;
                if condition_ty != Ty::Boolean {
                    return Err(PascalError::SemanticNoPosition {
                        message: "Condition in IF statement must be of type BOOLEAN".to_string(),
                    });
                }
                self.visit_stmt(then_statement)?;
                if let Some(else_statement) = else_statement {
                    self.visit_stmt(else_statement)?;
                }
                Ok(())
            }
            Stmt::While {
                condition,
                statement,
            } => {
                let condition_ty = self.expr_type_required(condition)?;
                if condition_ty != Ty::Boolean {
                    return Err(PascalError::SemanticNoPosition {
                        message: "Condition in WHILE statement must be of type BOOLEAN"
                            .to_string(),
                    });
                }
                self.visit_stmt(statement)
            }
            Stmt::For {
                var,
                start,
                end,
                statement,
                ..
            } => {
                let var_ty = self.expr_type_required(var)?;
                let start_ty = self.expr_type_required(start)?;
                let end_ty = self.expr_type_required(end)?;
                if var_ty != Ty::Integer {
                    return Err(PascalError::SemanticNoPosition {
                        message: "Loop variable in FOR statement must be of type INTEGER"
                            .to_string(),
                    });
                }
                if start_ty != Ty::Integer {
                    return Err(PascalError::SemanticNoPosition {
                        message: "Start value in FOR statement must be of type INTEGER"
                            .to_string(),
                    });
                }
                if end_ty != Ty::Integer {
                    return Err(PascalError::SemanticNoPosition {
                        message: "End value in FOR statement must be of type INTEGER".to_string(),
                    });
                }
                self.visit_stmt(statement)
            }
            Stmt::Case {
                expr,
                cases,
                else_case,
            } => {
                let expr_ty = self.expr_type_required(expr)?;
                for arm in cases {
                    let arm_ty = self.expr_type_required(&arm.value)?;
                    if !Ty::compatible(&expr_ty, &arm_ty) {
                        return Err(PascalError::SemanticNoPosition {
                            message: "Incompatible types in CASE statement".to_string(),
                        });
                    }
                    self.visit_stmt(&arm.statement)?;
                }
                if let Some(else_case) = else_case {
                    self.visit_stmt(else_case)?;
                }
                Ok(())
            }
            Stmt::ProcedureCall {
                name,
                actual_params,
            } => self.check_call(name, actual_params).map(|_| ()),
            Stmt::NoOp => Ok(()),
        }
    }

    /// Type of an expression, or `None` for a call to a proper procedure.
    fn expr_type(&mut self, expr: &Expr) -> Result<Option<Ty>, PascalError> {
        match expr {
            Expr::Num { token } => match token.value {
                TokenValue::Int(_) => Ok(Some(Ty::Integer)),
                TokenValue::Real(_) => Ok(Some(Ty::Real)),
                _ => Err(PascalError::SemanticNoPosition {
                    message: "Unexpected numeric literal".to_string(),
                }),
            },
            Expr::String { .. } => Ok(Some(Ty::String)),
            Expr::Boolean { .. } => Ok(Some(Ty::Boolean)),
            Expr::Var { token } => self.variable_type(token).map(Some),
            Expr::BinOp { left, op, right } => self.binop_type(left, op, right).map(Some),
            Expr::UnaryOp { op, expr } => self.unaryop_type(op, expr).map(Some),
            Expr::ProcedureCall {
                name,
                actual_params,
            } => self.check_call(name, actual_params),
        }
    }

    fn expr_type_required(&mut self, expr: &Expr) -> Result<Ty, PascalError> {
        self.expr_type(expr)?
            .ok_or_else(|| PascalError::SemanticNoPosition {
                message: "Unable to determine expression type".to_string(),
            })
    }

    fn variable_type(&mut self, token: &Token) -> Result<Ty, PascalError> {
        let name = token.text();
        let symbol = self
            .scopes
            .lookup(name)
            .ok_or_else(|| PascalError::Semantic {
                line: token.line,
                column: token.column,
                message: format!("Symbol(identifier) not found '{}'", name),
            })?;
        symbol
            .value_type()
            .cloned()
            .ok_or_else(|| PascalError::Semantic {
                line: token.line,
                column: token.column,
                message: format!("Type information missing for variable '{}'", name),
            })
    }

    fn binop_type(&mut self, left: &Expr, op: &Token, right: &Expr) -> Result<Ty, PascalError> {
        let left_ty =
            self.expr_type(left)?
                .ok_or_else(|| PascalError::SemanticNoPosition {
                    message: format!(
                        "Unable to determine type for left operand of '{}' operator",
                        op.kind
                    ),
                })?;
        let right_ty =
            self.expr_type(right)?
                .ok_or_else(|| PascalError::SemanticNoPosition {
                    message: format!(
                        "Unable to determine type for right operand of '{}' operator",
                        op.kind
                    ),
                })?;

        match op.kind {
            TokenKind::Index => {
                let Ty::Array { element, .. } = left_ty else {
                    return Err(PascalError::SemanticNoPosition {
                        message: format!(
                            "Indexing operation not supported for type {}",
                            left_ty.name()
                        ),
                    });
                };
                if right_ty != Ty::Integer {
                    return Err(PascalError::SemanticNoPosition {
                        message: format!(
                            "Array index must be of type INTEGER, got {}",
                            right_ty.name()
                        ),
                    });
                }
                Ok(*element)
            }
            TokenKind::Plus | TokenKind::Minus | TokenKind::Mul | TokenKind::Div => {
                if !left_ty.is_numeric() || !right_ty.is_numeric() {
                    return Err(PascalError::SemanticNoPosition {
                        message: format!(
                            "Invalid types for arithmetic operator '{}': {} and {}",
                            op.kind,
                            left_ty.name(),
                            right_ty.name()
                        ),
                    });
                }
                if left_ty == Ty::Real || right_ty == Ty::Real {
                    Ok(Ty::Real)
                } else {
                    Ok(Ty::Integer)
                }
            }
            TokenKind::Eq
            | TokenKind::Neq
            | TokenKind::Lt
            | TokenKind::Lte
            | TokenKind::Gt
            | TokenKind::Gte => {
                if !left_ty.is_comparable() || !right_ty.is_comparable() {
                    return Err(PascalError::SemanticNoPosition {
                        message: format!(
                            "Invalid types for comparison operator '{}': {} and {}",
                            op.kind,
                            left_ty.name(),
                            right_ty.name()
                        ),
                    });
                }
                let cross_numeric = left_ty.is_numeric() && right_ty.is_numeric();
                if left_ty != right_ty && !cross_numeric {
                    return Err(PascalError::SemanticNoPosition {
                        message: format!(
                            "Incompatible types for comparison operator '{}': {} and {}",
                            op.kind,
                            left_ty.name(),
                            right_ty.name()
                        ),
                    });
                }
                Ok(Ty::Boolean)
            }
            TokenKind::And | TokenKind::Or => {
                if left_ty != Ty::Boolean || right_ty != Ty::Boolean {
                    return Err(PascalError::SemanticNoPosition {
                        message: format!(
                            "Invalid types for logical operator '{}': {} and {}",
                            op.kind,
                            left_ty.name(),
                            right_ty.name()
                        ),
                    });
                }
                Ok(Ty::Boolean)
            }
            kind => Err(PascalError::SemanticNoPosition {
                message: format!("Unsupported binary operator: {}", kind),
            }),
        }
    }

    fn unaryop_type(&mut self, op: &Token, expr: &Expr) -> Result<Ty, PascalError> {
        let ty = self.expr_type_required(expr)?;
        match op.kind {
            TokenKind::Plus | TokenKind::Minus => {
                if !ty.is_numeric() {
                    return Err(PascalError::SemanticNoPosition {
                        message: format!(
                            "Invalid type for unary operator '{}': {}",
                            op.kind,
                            ty.name()
                        ),
                    });
                }
                Ok(ty)
            }
            TokenKind::Not => {
                if ty != Ty::Boolean {
                    return Err(PascalError::SemanticNoPosition {
                        message: format!(
                            "Invalid type for unary operator '{}': {}",
                            op.kind,
                            ty.name()
                        ),
                    });
                }
                Ok(ty)
            }
            kind => Err(PascalError::SemanticNoPosition {
                message: format!("Unsupported unary operator: {}", kind),
            }),
        }
    }

    /// Checks a call's target, arity and argument types. Returns the return
    /// type for functions, `None` for procedures.
    fn check_call(
        &mut self,
        name: &str,
        actual_params: &[Expr],
    ) -> Result<Option<Ty>, PascalError> {
        let (params, return_type) = match self.scopes.lookup(name) {
            Some(Symbol::Procedure(p)) => (p.params.clone(), None),
            Some(Symbol::Function(f)) => (f.params.clone(), Some(f.return_type.clone())),
            _ => {
                return Err(PascalError::SemanticNoPosition {
                    message: format!("Undefined procedure '{}'", name),
                });
            }
        };

        if actual_params.len() != params.len() {
            return Err(PascalError::SemanticNoPosition {
                message: format!("Procedure '{}' called with wrong number of arguments", name),
            });
        }

        for (i, (param, arg)) in params.iter().zip(actual_params).enumerate() {
            let arg_ty = self.expr_type_required(arg)?;
            if !Ty::compatible(&param.ty, &arg_ty) {
                return Err(PascalError::SemanticNoPosition {
                    message: format!(
                        "Incompatible argument type for parameter {} of '{}'",
                        i + 1,
                        name
                    ),
                });
            }
        }

        Ok(return_type)
    }

    fn check_duplicate(&self, name: &str, token: &Token) -> Result<(), PascalError> {
        if self.scopes.lookup_local(name).is_some() {
            return Err(PascalError::Semantic {
                line: token.line,
                column: token.column,
                message: format!("Duplicate identifier '{}' found", name),
            });
        }
        Ok(())
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts a constant declaration's literal payload, through unary signs.
fn literal_value(expr: &Expr) -> Option<TokenValue> {
    match expr {
        Expr::Num { token } | Expr::String { token } | Expr::Boolean { token, .. } => {
            Some(token.value.clone())
        }
        Expr::UnaryOp { op, expr } => match (op.kind, literal_value(expr)?) {
            (TokenKind::Minus, TokenValue::Int(v)) => Some(TokenValue::Int(-v)),
            (TokenKind::Minus, TokenValue::Real(v)) => Some(TokenValue::Real(-v)),
            (TokenKind::Plus, value) => Some(value),
            _ => None,
        },
        _ => None,
    }
}

// ------------- unit tests -------------
