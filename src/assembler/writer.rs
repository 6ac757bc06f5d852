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

use crate::assembler::segment::{Segments, TextEntry};

/// Renders the emitted segments as a text listing: one `AAAAAAAA: DDDDDDDD`
/// line per word, lowercase hex, text segment first, then static data.
/// `Org` markers produce no output line.
pub fn write_listing(segments: &Segments) -> String {
    let mut out = String::new();

    for entry in &segments.text {
        match entry {
            TextEntry::Word { bits, address } => {
                let word = u64::from_str_radix(bits, 2).unwrap_or(0);
                let addr = u64::from_str_radix(address, 2).unwrap_or(0);
                out.push_str(&format!("{:08x}: {:08x}\n", addr, word));
            }
            TextEntry::Org(_) => {}
        }
    }

    for entry in &segments.static_data {
        out.push_str(&format!(
            "{:08x}: {:08x}\n",
            entry.address,
            entry.value as u32
        ));
    }

    out
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::segment::StaticEntry;

    #[test]
    fn test_word_formatting() {
        let segments = Segments {
            text: vec![TextEntry::Word {
                bits: format!("{:032b}", 0xDEADBEEFu32),
                address: format!("{:032b}", 8),
            }],
            ..Segments::default()
        };
        assert_eq!(write_listing(&segments), "00000008: deadbeef\n");
    }

    #[test]
    fn test_org_entries_emit_nothing() {
        let segments = Segments {
            text: vec![
                TextEntry::Org(0x100),
                TextEntry::Word {
                    bits: format!("{:032b}", 0xF),
                    address: format!("{:032b}", 0x100),
                },
            ],
            ..Segments::default()
        };
        assert_eq!(write_listing(&segments), "00000100: 0000000f\n");
    }

    #[test]
    fn test_static_entries_follow_text() {
        let segments = Segments {
            text: vec![TextEntry::Word {
                bits: format!("{:032b}", 0xF),
                address: format!("{:032b}", 0),
            }],
            static_data: vec![StaticEntry {
                label: Some("x".to_string()),
                value: 0x42,
                address: 4,
            }],
            ..Segments::default()
        };
        assert_eq!(
            write_listing(&segments),
            "00000000: 0000000f\n00000004: 00000042\n"
        );
    }
}
