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
use crate::pascal::ast::{Expr, TypeSpec};
use crate::pascal::token::TokenValue;
use std::collections::HashMap;

/// Resolved type of an expression or declaration. Built-in simple types get
/// their own variants; an unknown type name stays `Named`. Array bounds are
/// the folded literal values of the declared range.
#[derive(Debug, Clone, PartialEq)]
pub enum Ty {
    Integer,
    Real,
    Boolean,
    Char,
    String,
    Named(String),
    Array {
        element: Box<Ty>,
        start: i64,
        end: i64,
    },
}

impl Ty {
    pub fn from_name(name: &str) -> Ty {
        match name.to_ascii_uppercase().as_str() {
            "INTEGER" => Ty::Integer,
            "REAL" => Ty::Real,
            "BOOLEAN" => Ty::Boolean,
            "CHAR" => Ty::Char,
            "STRING" => Ty::String,
            _ => Ty::Named(name.to_string()),
        }
    }

    pub fn from_type_spec(spec: &TypeSpec) -> Result<Ty, PascalError> {
        match spec {
            TypeSpec::SimpleType { token } => Ok(Ty::from_name(token.text())),
            TypeSpec::ArrayType {
                element_type,
                start,
                end,
            } => {
                let element = Ty::from_type_spec(element_type)?;
                let start = fold_integer(start).ok_or_else(|| PascalError::SemanticNoPosition {
                    message: "Array bounds must be integer literals".to_string(),
                })?;
                let end = fold_integer(end).ok_or_else(|| PascalError::SemanticNoPosition {
                    message: "Array bounds must be integer literals".to_string(),
                })?;
                Ok(Ty::Array {
                    element: Box::new(element),
                    start,
                    end,
                })
            }
        }
    }

    /// Name used in diagnostics.
    pub fn name(&self) -> &str {
        match self {
            Ty::Integer => "INTEGER",
            Ty::Real => "REAL",
            Ty::Boolean => "BOOLEAN",
            Ty::Char => "CHAR",
            Ty::String => "STRING",
            Ty::Named(name) => name,
            Ty::Array { .. } => "ARRAY",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Ty::Integer | Ty::Real)
    }

    /// Types a comparison operator accepts.
    pub fn is_comparable(&self) -> bool {
        matches!(self, Ty::Integer | Ty::Real | Ty::String | Ty::Boolean)
    }

    /// Reflexive on simple types with implicit INTEGER<->REAL widening in
    /// either direction; structural on arrays (compatible element type,
    /// identical bounds).
    pub fn compatible(left: &Ty, right: &Ty) -> bool {
        match (left, right) {
            (
                Ty::Array {
                    element: le,
                    start: ls,
                    end: lend,
                },
                Ty::Array {
                    element: re,
                    start: rs,
                    end: rend,
                },
            ) => Ty::compatible(le, re) && ls == rs && lend == rend,
            (Ty::Array { .. }, _) | (_, Ty::Array { .. }) => false,
            (Ty::Integer, Ty::Real) | (Ty::Real, Ty::Integer) => true,
            (l, r) => l == r,
        }
    }
}

/// Folds an expression down to an integer literal, through unary signs.
pub fn fold_integer(expr: &Expr) -> Option<i64> {
    match expr {
        Expr::Num { token } => match token.value {
            TokenValue::Int(v) => Some(v),
            _ => None,
        },
        Expr::UnaryOp { op, expr } => {
            let inner = fold_integer(expr)?;
            match op.kind {
                crate::pascal::token::TokenKind::Minus => Some(-inner),
                crate::pascal::token::TokenKind::Plus => Some(inner),
                _ => None,
            }
        }
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableSymbol {
    pub name: String,
    pub ty: Ty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantSymbol {
    pub name: String,
    pub ty: Ty,
    pub value: TokenValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureSymbol {
    pub name: String,
    pub params: Vec<VariableSymbol>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSymbol {
    pub name: String,
    pub params: Vec<VariableSymbol>,
    pub return_type: Ty,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Variable(VariableSymbol),
    Constant(ConstantSymbol),
    Procedure(ProcedureSymbol),
    Function(FunctionSymbol),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Variable(s) => &s.name,
            Symbol::Constant(s) => &s.name,
            Symbol::Procedure(s) => &s.name,
            Symbol::Function(s) => &s.name,
        }
    }

    /// Declared type when the symbol is referenced as a value. Procedures
    /// and functions have none in value position.
    pub fn value_type(&self) -> Option<&Ty> {
        match self {
            Symbol::Variable(s) => Some(&s.ty),
            Symbol::Constant(s) => Some(&s.ty),
            Symbol::Procedure(_) | Symbol::Function(_) => None,
        }
    }
}

/// One lexical scope: a name-to-symbol map plus its position in the scope
/// chain.
#[derive(Debug)]
pub struct ScopedSymbolTable {
    symbols: HashMap<String, Symbol>,
    pub scope_name: String,
    pub scope_level: usize,
}

impl ScopedSymbolTable {
    pub fn new(scope_name: &str, scope_level: usize) -> Self {
        ScopedSymbolTable {
            symbols: HashMap::new(),
            scope_name: scope_name.to_string(),
            scope_level,
        }
    }

    pub fn insert(&mut self, symbol: Symbol) {
        self.symbols.insert(symbol.name().to_string(), symbol);
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }
}

/// The live scope chain. Tables are owned by the stack; pushing opens a
/// block's scope and popping re-points the current scope at the enclosing
/// one. Lookup walks from the innermost scope outward.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<ScopedSymbolTable>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack { scopes: Vec::new() }
    }

    pub fn push(&mut self, scope_name: &str) {
        let level = self.scopes.len() + 1;
        self.scopes.push(ScopedSymbolTable::new(scope_name, level));
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
    }

    pub fn current(&mut self) -> &mut ScopedSymbolTable {
        self.scopes.last_mut().expect("no open scope")
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.lookup(name))
    }

    /// Lookup restricted to the current scope, for duplicate checks.
    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.scopes.last().and_then(|scope| scope.lookup(name))
    }
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_type_names_are_case_insensitive() {
        assert_eq!(Ty::from_name("integer"), Ty::Integer);
        assert_eq!(Ty::from_name("Real"), Ty::Real);
        assert_eq!(Ty::from_name("Matrix"), Ty::Named("Matrix".to_string()));
    }

    #[test]
    fn test_numeric_widening_compatibility() {
        assert!(Ty::compatible(&Ty::Integer, &Ty::Real));
        assert!(Ty::compatible(&Ty::Real, &Ty::Integer));
        assert!(!Ty::compatible(&Ty::Boolean, &Ty::Integer));
    }

    #[test]
    fn test_array_compatibility_is_structural() {
        let a = Ty::Array {
            element: Box::new(Ty::Integer),
            start: 1,
            end: 10,
        };
        let b = Ty::Array {
            element: Box::new(Ty::Integer),
            start: 1,
            end: 10,
        };
        let c = Ty::Array {
            element: Box::new(Ty::Integer),
            start: 0,
            end: 10,
        };
        assert!(Ty::compatible(&a, &b));
        assert!(!Ty::compatible(&a, &c));
    }

    #[test]
    fn test_scope_stack_shadowing() {
        let mut scopes = ScopeStack::new();
        scopes.push("global");
        scopes.current().insert(Symbol::Variable(VariableSymbol {
            name: "x".to_string(),
            ty: Ty::Integer,
        }));
        scopes.push("inner");
        scopes.current().insert(Symbol::Variable(VariableSymbol {
            name: "x".to_string(),
            ty: Ty::Real,
        }));

        match scopes.lookup("x") {
            Some(Symbol::Variable(v)) => assert_eq!(v.ty, Ty::Real),
            other => panic!("expected shadowing variable, got {:?}", other),
        }

        scopes.pop();
        match scopes.lookup("x") {
            Some(Symbol::Variable(v)) => assert_eq!(v.ty, Ty::Integer),
            other => panic!("expected outer variable, got {:?}", other),
        }
    }
}
