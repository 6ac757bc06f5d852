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

/// One entry of the text segment: an encoded word together with its encoded
/// address, both kept as 32-character bit-strings until emission. `Org`
/// markers move the address cursor but produce no output.
#[derive(Debug, Clone, PartialEq)]
pub enum TextEntry {
    Word { bits: String, address: String },
    Org(u64),
}

/// One entry of a data segment: an optional label, the literal value and the
/// address assigned during the first pass.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticEntry {
    pub label: Option<String>,
    pub value: i64,
    pub address: u64,
}

/// The segmented address space. Only `text` and `static_data` are ever
/// populated; `heap` and `stack` exist in the layout model but nothing emits
/// into them.
#[derive(Debug, Default)]
pub struct Segments {
    pub text: Vec<TextEntry>,
    pub static_data: Vec<StaticEntry>,
    pub heap: Vec<StaticEntry>,
    pub stack: Vec<StaticEntry>,
}
