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
use crate::file_reader::FileReader;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// Substitutions are applied in definition order over the raw line text, so
// the table keeps insertion order.
type DefineTable = Vec<(String, String)>;

/// Runs the preprocessor over a source file: strips comments, splices
/// `#include`s (their lines end up ahead of the including file's), records
/// and substitutes `.define` macros, and filters `.ifdef`/`.ifndef`
/// conditional sections. The returned lines are trimmed and non-empty.
pub fn preprocess<F: FileReader>(
    source_path: &Path,
    reader: &F,
) -> Result<Vec<String>, AssemblyError> {
    let mut defines: DefineTable = Vec::new();
    let mut include_stack: HashSet<PathBuf> = HashSet::new();
    process_file(source_path, reader, &mut defines, &mut include_stack)
}

fn process_file<F: FileReader>(
    path: &Path,
    reader: &F,
    defines: &mut DefineTable,
    include_stack: &mut HashSet<PathBuf>,
) -> Result<Vec<String>, AssemblyError> {
    if !include_stack.insert(path.to_path_buf()) {
        return Err(AssemblyError::PreprocessorErrorNoLine {
            reason: format!("recursive include of '{}'", path.display()),
        });
    }

    let text =
        reader
            .read_to_string(path)
            .map_err(|e| AssemblyError::PreprocessorErrorNoLine {
                reason: format!("cannot read '{}': {}", path.display(), e),
            })?;
    let source_dir = path.parent().unwrap_or(Path::new(""));

    let mut included: Vec<String> = Vec::new();
    let mut output: Vec<String> = Vec::new();
    let mut condition_stack: Vec<bool> = Vec::new();
    // Conjunction of the whole condition stack, recomputed after every
    // push, pop and flip.
    let mut emit = true;

    for (idx, raw) in text.lines().enumerate() {
        let line_number = idx + 1;
        let line = raw.split(';').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        // Includes are spliced wherever they appear, even inside a filtered
        // region; the included file shares the define table.
        if let Some(rest) = line.strip_prefix("#include") {
            let file = rest.trim().trim_matches('"');
            let include_path = source_dir.join(file);
            let lines = process_file(&include_path, reader, defines, include_stack)?;
            included.extend(lines);
            continue;
        }

        if let Some(name) = directive_argument(line, ".ifdef") {
            condition_stack.push(is_defined(defines, name));
            emit = condition_stack.iter().all(|&c| c);
            continue;
        }

        if let Some(name) = directive_argument(line, ".ifndef") {
            condition_stack.push(!is_defined(defines, name));
            emit = condition_stack.iter().all(|&c| c);
            continue;
        }

        if line == ".else" {
            match condition_stack.last_mut() {
                Some(top) => *top = !*top,
                None => {
                    return Err(AssemblyError::PreprocessorError {
                        line: line_number,
                        reason: "'.else' without matching '.ifdef' or '.ifndef'".to_string(),
                    });
                }
            }
            emit = condition_stack.iter().all(|&c| c);
            continue;
        }

        if line == ".endif" {
            if condition_stack.pop().is_none() {
                return Err(AssemblyError::PreprocessorError {
                    line: line_number,
                    reason: "'.endif' without matching '.ifdef' or '.ifndef'".to_string(),
                });
            }
            emit = condition_stack.iter().all(|&c| c);
            continue;
        }

        if !emit {
            continue;
        }

        if let Some(rest) = line.strip_prefix(".define") {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(name), Some(value), None) => {
                    defines.push((name.to_string(), value.to_string()));
                }
                _ => {
                    return Err(AssemblyError::PreprocessorError {
                        line: line_number,
                        reason: "malformed '.define', expected '.define NAME VALUE'".to_string(),
                    });
                }
            }
            continue;
        }

        // Plain line: substitute macros and emit.
        let mut substituted = line.to_string();
        for (name, value) in defines.iter() {
            substituted = substituted.replace(name, value);
        }
        output.push(substituted);
    }

    if !condition_stack.is_empty() {
        return Err(AssemblyError::PreprocessorErrorNoLine {
            reason: format!(
                "'.ifdef' or '.ifndef' in '{}' without matching '.endif'",
                path.display()
            ),
        });
    }

    include_stack.remove(path);

    included.extend(output);
    Ok(included)
}

fn directive_argument<'a>(line: &'a str, directive: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(directive)?;
    // Require a token break so ".ifndef" is not read as ".ifdef".
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim())
}

fn is_defined(defines: &DefineTable, name: &str) -> bool {
    defines.iter().any(|(n, _)| n == name)
}

// ------------- unit tests -------------
