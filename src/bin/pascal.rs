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
use rcpu::pascal;
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(clap_parser)]
#[clap(version, about = "Pascal front-end: lexer, parser and type checker")]
struct Opts {
    /// Pascal source file
    source: PathBuf,
    /// Write the AST as JSON to this file instead of standard output
    #[clap(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let opts: Opts = Opts::parse();

    let source = fs::read_to_string(&opts.source)
        .with_context(|| format!("Failed to read source file: {}", opts.source.display()))?;

    let program = pascal::compile(&source)?;
    let json = serde_json::to_string_pretty(&program).context("Failed to serialize AST")?;

    match &opts.output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            println!(
                "Successfully compiled {} to {}",
                opts.source.display(),
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}
