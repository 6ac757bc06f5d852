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

use anyhow::{Context, Result};
use clap::Parser as clap_parser;
use rcpu::assemble;
use rcpu::file_reader::AsmFileReader;
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(clap_parser)]
#[clap(version, about = "Table-driven two-pass assembler")]
struct Opts {
    /// Input assembly source file
    input: PathBuf,
    /// Output hex listing file
    output: PathBuf,
    /// ISA descriptor (JSON)
    config: PathBuf,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let opts: Opts = Opts::parse();

    let reader = AsmFileReader;
    let listing = assemble(&opts.input, &opts.config, &reader)?;

    fs::write(&opts.output, listing)
        .with_context(|| format!("Failed to write output file: {}", opts.output.display()))?;
    println!(
        "Successfully assembled {} to {}",
        opts.input.display(),
        opts.output.display()
    );

    Ok(())
}
