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

pub mod assembler;
pub mod ast;
pub mod errors;
pub mod file_reader;
pub mod isa;
pub mod parser;
pub mod pascal;

use std::path::Path;

use anyhow::{Context, Result};
use assembler::segment::Segments;
use file_reader::FileReader;

extern crate pest;
extern crate pest_derive;

/// Runs the whole assembler pipeline over a source file and returns the
/// rendered hex listing.
pub fn assemble<F: FileReader>(
    source_path: &Path,
    isa_path: &Path,
    reader: &F,
) -> Result<String> {
    let isa = isa::Isa::load(isa_path, reader).context("Failed to load ISA descriptor")?;

    let lines = assembler::preprocessor::preprocess(source_path, reader)
        .context("Failed during preprocessing")?;

    let parsed = parser::parse_lines(&lines).context("Failed to parse assembly source")?;

    let (labels, static_data) =
        assembler::first_pass(&parsed, &isa).context("Failed during assembler pass 1")?;

    let text = assembler::second_pass(&parsed, &isa, &labels)
        .context("Failed during assembler pass 2")?;

    let segments = Segments {
        text,
        static_data,
        ..Segments::default()
    };

    Ok(assembler::writer::write_listing(&segments))
}
