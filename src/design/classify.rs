//! Design file classification
//!
//! Parses raw design file names of the form
//! `<hex-or-notdef>[ <flavor,flavor,...>].png` and computes the canonical
//! location of each file: a Unicode-block directory, with an extra
//! leading-hex-digit bucket inside the CJK Unified Ideographs block to
//! keep directory fan-out bounded.

use crate::core::config::LocaleFlavor;
use crate::core::errors::ForgeError;
use crate::design::DesignKey;
use crate::unicode::blocks::{BlockTable, CJK_UNIFIED_IDEOGRAPHS};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Parsed identity of one design file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFileName {
    pub key: DesignKey,
    pub flavors: BTreeSet<LocaleFlavor>,
}

/// Parse `<hex-or-notdef>[ <flavors>].png`. Hex is canonicalized to
/// upper case; the sentinel token must be exactly `notdef`.
pub fn parse_file_name(name: &str) -> Result<ParsedFileName, ForgeError> {
    let fail = |reason: &str| ForgeError::MalformedFileName {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    let stem = name.strip_suffix(".png").unwrap_or(name);
    let tokens: Vec<&str> = stem.split(' ').collect();
    if tokens.is_empty() || tokens.len() > 2 || tokens[0].is_empty() {
        return Err(fail("expected `<key>[ <flavors>].png`"));
    }

    let key = if tokens[0] == "notdef" {
        DesignKey::Notdef
    } else {
        let code_point = u32::from_str_radix(tokens[0], 16)
            .map_err(|_| fail("key is neither `notdef` nor a hexadecimal code point"))?;
        DesignKey::CodePoint(code_point)
    };

    let mut flavors = BTreeSet::new();
    if tokens.len() == 2 {
        for tag in tokens[1].split(',') {
            let flavor = LocaleFlavor::parse_tag(&tag.to_lowercase())
                .ok_or_else(|| fail(&format!("unrecognized locale flavor `{tag}`")))?;
            flavors.insert(flavor);
        }
    }

    Ok(ParsedFileName { key, flavors })
}

/// Canonical file name for a parsed identity. Parsing the result yields
/// the identity back, which is what makes re-classification idempotent.
pub fn canonical_file_name(key: DesignKey, flavors: &BTreeSet<LocaleFlavor>) -> String {
    let token = key.file_token();
    if flavors.is_empty() {
        format!("{token}.png")
    } else {
        let tags: Vec<&str> = flavors.iter().map(|flavor| flavor.tag()).collect();
        format!("{token} {}.png", tags.join(","))
    }
}

/// Canonical path of a design file relative to its size-mode directory.
///
/// The sentinel lives at the root; every code point lives under its
/// owning block's directory. The CJK Unified Ideographs block buckets a
/// further level down by the code point's leading hex digits.
pub fn canonical_relative_path(
    blocks: &BlockTable,
    key: DesignKey,
    flavors: &BTreeSet<LocaleFlavor>,
) -> Result<PathBuf, ForgeError> {
    let file_name = canonical_file_name(key, flavors);
    let Some(code_point) = key.code_point() else {
        return Ok(PathBuf::from(file_name));
    };
    let block = blocks.find(code_point)?;
    let mut path = PathBuf::from(block.dir_name());
    if block.name == CJK_UNIFIED_IDEOGRAPHS {
        let token = key.file_token();
        path.push(format!("{}-", &token[..token.len() - 2]));
    }
    path.push(file_name);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> BlockTable {
        BlockTable::parse(
            "0000..007F; Basic Latin\n\
             3000..303F; CJK Symbols and Punctuation\n\
             4E00..9FFF; CJK Unified Ideographs\n",
        )
        .unwrap()
    }

    #[test]
    fn parses_key_and_flavor_list() {
        let parsed = parse_file_name("0030 zh_hans,ja.png").unwrap();
        assert_eq!(parsed.key, DesignKey::CodePoint(0x30));
        assert_eq!(parsed.flavors.len(), 2);
        assert!(parsed.flavors.contains(&LocaleFlavor::ZhHans));
        assert!(parsed.flavors.contains(&LocaleFlavor::Ja));
    }

    #[test]
    fn parses_the_sentinel_and_lower_case_hex() {
        assert_eq!(
            parse_file_name("notdef.png").unwrap().key,
            DesignKey::Notdef
        );
        assert_eq!(
            parse_file_name("4e2d.png").unwrap().key,
            DesignKey::CodePoint(0x4E2D)
        );
    }

    #[test]
    fn rejects_malformed_names() {
        assert!(parse_file_name("0030 zh_hans extra.png").is_err());
        assert!(parse_file_name("zz.png").is_err());
        assert!(parse_file_name("0030 klingon.png").is_err());
        assert!(parse_file_name(".png").is_err());
    }

    #[test]
    fn canonical_names_round_trip_through_the_parser() {
        for name in ["4E2D ja,ko.png", "notdef.png", "0041.png"] {
            let parsed = parse_file_name(name).unwrap();
            let canonical = canonical_file_name(parsed.key, &parsed.flavors);
            assert_eq!(canonical, name, "already-canonical names are stable");
            assert_eq!(parse_file_name(&canonical).unwrap(), parsed);
        }
    }

    #[test]
    fn code_points_are_filed_under_their_block_directory() {
        let blocks = table();
        let path =
            canonical_relative_path(&blocks, DesignKey::CodePoint(0x41), &BTreeSet::new()).unwrap();
        assert_eq!(path, PathBuf::from("0000-007F Basic Latin/0041.png"));
    }

    #[test]
    fn cjk_unified_ideographs_bucket_by_leading_hex_digits() {
        let blocks = table();
        let path =
            canonical_relative_path(&blocks, DesignKey::CodePoint(0x4E2D), &BTreeSet::new())
                .unwrap();
        assert_eq!(
            path,
            PathBuf::from("4E00-9FFF CJK Unified Ideographs/4E-/4E2D.png")
        );
    }

    #[test]
    fn sentinel_stays_at_the_size_mode_root() {
        let blocks = table();
        let path = canonical_relative_path(&blocks, DesignKey::Notdef, &BTreeSet::new()).unwrap();
        assert_eq!(path, PathBuf::from("notdef.png"));
    }

    #[test]
    fn unknown_code_point_fails_classification() {
        let blocks = table();
        let result =
            canonical_relative_path(&blocks, DesignKey::CodePoint(0xE000), &BTreeSet::new());
        assert!(matches!(
            result,
            Err(ForgeError::UnknownCodePoint { code_point: 0xE000 })
        ));
    }
}
