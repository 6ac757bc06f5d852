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

use rcpu::errors::PascalError;
use rcpu::pascal;
use serde_json::Value;

fn compile_to_json(source: &str) -> Value {
    let program = pascal::compile(source).unwrap();
    serde_json::to_value(&program).unwrap()
}

#[test]
fn test_program_ast_shape() {
    let ast = compile_to_json("PROGRAM T; VAR x: INTEGER; BEGIN x := 1 + 2 END.");

    assert_eq!(ast["type"], "Program");
    assert_eq!(ast["name"], "T");
    assert_eq!(ast["block"]["type"], "Block");

    let decl = &ast["block"]["declarations"][0];
    assert_eq!(decl["type"], "VarDecl");
    assert_eq!(decl["var_node"]["type"], "Var");
    assert_eq!(decl["var_node"]["token"]["value"], "x");
    assert_eq!(decl["type_node"]["type"], "SimpleType");
    assert_eq!(decl["type_node"]["token"]["value"], "INTEGER");

    let compound = &ast["block"]["compound_statement"];
    assert_eq!(compound["type"], "CompoundStatement");

    let assign = &compound["statements"][0];
    assert_eq!(assign["type"], "Assign");
    assert_eq!(assign["left"]["token"]["value"], "x");
    assert_eq!(assign["op"]["type"], "ASSIGN");

    let sum = &assign["right"];
    assert_eq!(sum["type"], "BinOp");
    assert_eq!(sum["op"]["type"], "PLUS");
    assert_eq!(sum["left"]["type"], "Num");
    assert_eq!(sum["left"]["token"]["value"], 1);
    assert_eq!(sum["right"]["token"]["value"], 2);
}

#[test]
fn test_tokens_serialize_as_type_value_pairs() {
    let ast = compile_to_json("PROGRAM T; VAR r: REAL; BEGIN r := 2.5 END.");
    let num = &ast["block"]["compound_statement"]["statements"][0]["right"];
    assert_eq!(num["token"]["type"], "REAL");
    assert_eq!(num["token"]["value"], 2.5);
    // Exactly the wire fields, nothing else.
    let token = num["token"].as_object().unwrap();
    assert_eq!(token.len(), 2);
}

#[test]
fn test_index_serializes_as_synthetic_binop() {
    let ast = compile_to_json(
        "PROGRAM T; VAR a: ARRAY [1..3] OF INTEGER; BEGIN a[2] := 5 END.",
    );
    let assign = &ast["block"]["compound_statement"]["statements"][0];
    assert_eq!(assign["left"]["type"], "BinOp");
    assert_eq!(assign["left"]["op"]["type"], "INDEX");
    assert_eq!(assign["left"]["op"]["value"], "[]");
    assert_eq!(assign["left"]["left"]["token"]["value"], "a");
}

#[test]
fn test_nested_procedures_compile() {
    let source = "PROGRAM Nest; VAR total: INTEGER; \
                  PROCEDURE Outer(n: INTEGER); \
                    VAR local: INTEGER; \
                    PROCEDURE Inner(m: INTEGER); BEGIN total := total + m END; \
                  BEGIN local := n; Inner(local) END; \
                  BEGIN Outer(3) END.";
    let ast = compile_to_json(source);
    let outer = &ast["block"]["declarations"][1];
    assert_eq!(outer["type"], "Procedure");
    assert_eq!(outer["name"], "Outer");
    let inner = &outer["block"]["declarations"][1];
    assert_eq!(inner["type"], "Procedure");
    assert_eq!(inner["name"], "Inner");
}

#[test]
fn test_control_flow_statements_compile() {
    let source = "PROGRAM Flow; VAR i, x: INTEGER; b: BOOLEAN; \
                  BEGIN \
                    b := TRUE; \
                    IF b THEN x := 1 ELSE x := 2; \
                    WHILE x < 10 DO x := x + 1; \
                    FOR i := 1 TO 5 DO x := x + i; \
                    CASE x OF 1: x := 0; 2: x := 1; ELSE x := 9; END \
                  END.";
    let ast = compile_to_json(source);
    let statements = ast["block"]["compound_statement"]["statements"]
        .as_array()
        .unwrap();
    let kinds: Vec<&str> = statements
        .iter()
        .map(|s| s["type"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["Assign", "If", "While", "For", "Case"]);
    assert_eq!(statements[3]["direction"], "TO");
}

#[test]
fn test_function_declaration_shape() {
    let ast = compile_to_json(
        "PROGRAM T; VAR x: INTEGER; \
         FUNCTION Twice(n: INTEGER): INTEGER; BEGIN END; \
         BEGIN x := Twice(21) END.",
    );
    let func = &ast["block"]["declarations"][1];
    assert_eq!(func["type"], "Function");
    assert_eq!(func["return_type"]["token"]["value"], "INTEGER");
    assert_eq!(func["params"][0]["type"], "VarDecl");

    let call = &ast["block"]["compound_statement"]["statements"][0]["right"];
    assert_eq!(call["type"], "ProcedureCall");
    assert_eq!(call["name"], "Twice");
    assert_eq!(call["actual_params"][0]["token"]["value"], 21);
}

#[test]
fn test_type_error_on_assignment() {
    let result = pascal::compile("PROGRAM T; VAR b: BOOLEAN; BEGIN b := 1 + 2 END.");
    match result {
        Err(PascalError::Semantic { message, .. }) => {
            assert_eq!(
                message,
                "Incompatible types in assignment: BOOLEAN and INTEGER"
            );
        }
        other => panic!("expected semantic error, got {:?}", other),
    }
}

#[test]
fn test_duplicate_identifier_diagnostic() {
    let result = pascal::compile("PROGRAM T; VAR x: INTEGER; x: REAL; BEGIN END.");
    match result {
        Err(e @ PascalError::Semantic { .. }) => {
            assert!(e.to_string().contains("Duplicate identifier 'x' found"));
        }
        other => panic!("expected semantic error, got {:?}", other),
    }
}

#[test]
fn test_syntax_error_reports_expected_vs_found() {
    let result = pascal::compile("PROGRAM T; VAR x INTEGER; BEGIN END.");
    match result {
        Err(PascalError::Syntax { message, .. }) => {
            assert_eq!(message, "Expected COLON, found ID");
        }
        other => panic!("expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_lexical_error_reports_position() {
    let result = pascal::compile("PROGRAM T;\nVAR x: INTEGER;\nBEGIN x := #1 END.");
    match result {
        Err(PascalError::Lexical { line, column, .. }) => {
            assert_eq!((line, column), (3, 12));
        }
        other => panic!("expected lexical error, got {:?}", other),
    }
}

#[test]
fn test_serialized_output_is_stable() {
    let source = "PROGRAM T; VAR i: INTEGER; a: ARRAY [1..4] OF REAL; \
                  BEGIN FOR i := 1 TO 4 DO a[i] := i + 0.5 END.";
    let first = serde_json::to_string_pretty(&pascal::compile(source).unwrap()).unwrap();
    let second = serde_json::to_string_pretty(&pascal::compile(source).unwrap()).unwrap();
    assert_eq!(first, second);
}
