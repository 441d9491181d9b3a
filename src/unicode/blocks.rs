//! Unicode block range table
//!
//! Parsed from the UCD `Blocks.txt` format:
//!
//! ```text
//! 0000..007F; Basic Latin
//! 0080..00FF; Latin-1 Supplement
//! ```
//!
//! Ranges must be sorted and non-overlapping so lookups can binary search
//! over the block boundaries.

use crate::core::errors::ForgeError;

/// Name of the one oversized block whose canonical directory additionally
/// buckets files by leading hex digits.
pub const CJK_UNIFIED_IDEOGRAPHS: &str = "CJK Unified Ideographs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnicodeBlock {
    pub begin: u32,
    pub end: u32,
    pub name: String,
}

impl UnicodeBlock {
    /// Canonical directory name, e.g. `4E00-9FFF CJK Unified Ideographs`.
    pub fn dir_name(&self) -> String {
        format!("{:04X}-{:04X} {}", self.begin, self.end, self.name)
    }

    pub fn contains(&self, code_point: u32) -> bool {
        self.begin <= code_point && code_point <= self.end
    }
}

/// Ordered, non-overlapping table of Unicode blocks.
#[derive(Debug, Clone)]
pub struct BlockTable {
    blocks: Vec<UnicodeBlock>,
}

impl BlockTable {
    pub fn parse(text: &str) -> Result<Self, ForgeError> {
        let mut blocks: Vec<UnicodeBlock> = Vec::new();
        for (index, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fail = |reason: &str| ForgeError::MalformedBlockData {
                line: index + 1,
                reason: reason.to_string(),
            };
            let (range, name) = line.split_once(';').ok_or_else(|| fail("missing `;`"))?;
            let (begin, end) = range
                .trim()
                .split_once("..")
                .ok_or_else(|| fail("missing `..` in range"))?;
            let begin = u32::from_str_radix(begin.trim(), 16)
                .map_err(|_| fail("range start is not hexadecimal"))?;
            let end = u32::from_str_radix(end.trim(), 16)
                .map_err(|_| fail("range end is not hexadecimal"))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(fail("empty block name"));
            }
            if end < begin {
                return Err(fail("range end precedes range start"));
            }
            if let Some(previous) = blocks.last() {
                if begin <= previous.end {
                    return Err(fail("ranges must be sorted and non-overlapping"));
                }
            }
            blocks.push(UnicodeBlock {
                begin,
                end,
                name: name.to_string(),
            });
        }
        Ok(BlockTable { blocks })
    }

    /// Binary search over block boundaries for the block owning
    /// `code_point`.
    pub fn find(&self, code_point: u32) -> Result<&UnicodeBlock, ForgeError> {
        let index = self
            .blocks
            .partition_point(|block| block.end < code_point);
        match self.blocks.get(index) {
            Some(block) if block.contains(code_point) => Ok(block),
            _ => Err(ForgeError::UnknownCodePoint { code_point }),
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# Blocks-15.0.0.txt
# Format: Start..End; Block Name

0000..007F; Basic Latin
0080..00FF; Latin-1 Supplement
4E00..9FFF; CJK Unified Ideographs
";

    #[test]
    fn parses_comments_and_blank_lines() {
        let table = BlockTable::parse(SAMPLE).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn finds_owning_block_by_binary_search() {
        let table = BlockTable::parse(SAMPLE).unwrap();
        assert_eq!(table.find(0x41).unwrap().name, "Basic Latin");
        assert_eq!(table.find(0x80).unwrap().name, "Latin-1 Supplement");
        assert_eq!(table.find(0x6211).unwrap().name, CJK_UNIFIED_IDEOGRAPHS);
        assert_eq!(table.find(0x9FFF).unwrap().name, CJK_UNIFIED_IDEOGRAPHS);
    }

    #[test]
    fn uncovered_code_point_is_an_error() {
        let table = BlockTable::parse(SAMPLE).unwrap();
        assert!(matches!(
            table.find(0x3000),
            Err(ForgeError::UnknownCodePoint { code_point: 0x3000 })
        ));
        assert!(table.find(0x10000).is_err());
    }

    #[test]
    fn overlapping_ranges_are_rejected() {
        let result = BlockTable::parse("0000..007F; A\n0070..00FF; B\n");
        assert!(matches!(
            result,
            Err(ForgeError::MalformedBlockData { line: 2, .. })
        ));
    }

    #[test]
    fn dir_name_uses_four_digit_upper_hex() {
        let table = BlockTable::parse(SAMPLE).unwrap();
        assert_eq!(table.find(0x41).unwrap().dir_name(), "0000-007F Basic Latin");
    }
}
