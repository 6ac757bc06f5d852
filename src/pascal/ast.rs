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

use crate::pascal::token::Token;
use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

// Every node serializes as `{ "type": "<NodeName>", ... }`. The enums get
// that shape from serde's internal tagging; `Program` and `Block` write the
// tag by hand.

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: String,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub declarations: Vec<Decl>,
    pub compound_statement: Stmt,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Decl {
    VarDecl {
        var_node: Expr,
        type_node: TypeSpec,
    },
    Const {
        name: String,
        value: Expr,
    },
    Type {
        name: String,
        type_spec: TypeSpec,
    },
    Procedure {
        name: String,
        params: Vec<Decl>,
        block: Block,
    },
    Function {
        name: String,
        params: Vec<Decl>,
        return_type: TypeSpec,
        block: Block,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum TypeSpec {
    SimpleType {
        token: Token,
    },
    ArrayType {
        element_type: Box<TypeSpec>,
        start: Box<Expr>,
        end: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    To,
    Downto,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseArm {
    pub value: Expr,
    pub statement: Stmt,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Stmt {
    CompoundStatement {
        statements: Vec<Stmt>,
    },
    Assign {
        left: Expr,
        op: Token,
        right: Expr,
    },
    If {
        condition: Expr,
        then_statement: Box<Stmt>,
        else_statement: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        statement: Box<Stmt>,
    },
    For {
        var: Expr,
        start: Expr,
        end: Expr,
        statement: Box<Stmt>,
        direction: Direction,
    },
    Case {
        expr: Expr,
        cases: Vec<CaseArm>,
        else_case: Option<Box<Stmt>>,
    },
    ProcedureCall {
        name: String,
        actual_params: Vec<Expr>,
    },
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expr {
    BinOp {
        left: Box<Expr>,
        op: Token,
        right: Box<Expr>,
    },
    UnaryOp {
        op: Token,
        expr: Box<Expr>,
    },
    Var {
        token: Token,
    },
    Num {
        token: Token,
    },
    String {
        token: Token,
    },
    Boolean {
        token: Token,
        value: bool,
    },
    ProcedureCall {
        name: String,
        actual_params: Vec<Expr>,
    },
}

impl Expr {
    /// Identifier text of a `Var` node; empty for anything else.
    pub fn var_name(&self) -> &str {
        match self {
            Expr::Var { token } => token.text(),
            _ => "",
        }
    }
}

impl Serialize for Program {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Program", 3)?;
        state.serialize_field("type", "Program")?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("block", &self.block)?;
        state.end()
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Block", 3)?;
        state.serialize_field("type", "Block")?;
        state.serialize_field("declarations", &self.declarations)?;
        state.serialize_field("compound_statement", &self.compound_statement)?;
        state.end()
    }
}
