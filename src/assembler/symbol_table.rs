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

use crate::errors::AssemblyError;
use std::collections::HashMap;

/// A label is either a position in the text segment or a static data slot
/// that also carries its literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    Code { address: u64 },
    Data { address: u64, value: i64 },
}

impl Label {
    pub fn address(&self) -> u64 {
        match self {
            Label::Code { address } => *address,
            Label::Data { address, .. } => *address,
        }
    }
}

// The label table stores label names and their first-pass addresses.
pub type LabelTable = HashMap<String, Label>;

pub fn get_label<'a>(
    labels: &'a LabelTable,
    name: &str,
    line: usize,
) -> Result<&'a Label, AssemblyError> {
    labels.get(name).ok_or_else(|| AssemblyError::SemanticError {
        line,
        reason: format!("Undefined label: {}", name),
    })
}
