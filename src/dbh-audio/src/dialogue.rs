//! Dialogue clip extraction
//!
//! A dialogue block is `CSNDDATA`, a run of mostly binary bytes that embeds
//! an underscore-separated token string, then a `RIFF` (WEM) payload:
//!
//! ```text
//! CSNDDATA ..noise.. X_CHAPTER_SCENE_1234567890123_LINE_ENG ..noise.. RIFF....------
//! ```
//!
//! The token string carries the output path (`CHAPTER/SCENE/LINE`) and the
//! language code (`ENG`). Long digit runs are content hashes and are dropped
//! from the path.

use crate::boundary::slice_to_terminator;
use crate::language::{folder_for, LanguageSelection, UNKNOWN_CODE};
use crate::report::{Attempt, Skip, SkipReason};
use crate::scan::{find_from, scan};
use crate::session::CancelToken;
use crate::signature::{DIALOGUE, NOISE_DIGITS_MAX, RIFF};
use crate::Result;

/// Leaf name used when the token string yields no path segment
pub const UNKNOWN_DIALOGUE: &str = "UnknownDialogue";

/// Leading segment that opens the path in a token string
const PATH_SIGIL: &str = "X";

/// A dialogue clip carved out of a volume
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueAsset<'a> {
    /// Three-letter language code as read from the token string
    pub language: String,
    /// No language code was read, so `language` defaulted to `UNK`
    pub language_fallback: bool,
    /// Output folder for `language`
    pub folder: &'static str,
    pub directories: Vec<String>,
    pub leaf: String,
    /// Offset of the dialogue marker in the volume
    pub offset: usize,
    /// WEM payload, starting at its `RIFF` magic
    pub bytes: &'a [u8],
}

/// Path and language decoded from a token string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueTag {
    pub language: String,
    /// A language code was read (as opposed to defaulting to `UNK`)
    pub language_found: bool,
    pub directories: Vec<String>,
    pub leaf: String,
}

/// Keep ASCII letters, digits and underscores
pub fn clean_tokens(bytes: &[u8]) -> String {
    bytes
        .iter()
        .filter(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .map(|&b| char::from(b))
        .collect()
}

/// Cut everything before the `X` that opens the path.
///
/// An `X` within the first few characters is marker residue, so the second
/// `X` is used instead.
pub fn trim_to_path(tokens: &str) -> &str {
    let chosen = match tokens.find('X') {
        Some(first) if first <= 3 => tokens[first + 1..].find('X').map(|p| first + 1 + p),
        other => other,
    };
    chosen.map_or(tokens, |start| &tokens[start..])
}

/// Split the trailing language code off `tokens`.
///
/// Tries the 3 characters after each underscore, last underscore first;
/// returns the uppercased code and the string before its underscore.
pub fn take_language_code(tokens: &str) -> Option<(String, &str)> {
    let mut search_end = tokens.len();

    while let Some(underscore) = tokens[..search_end].rfind('_') {
        if let Some(candidate) = tokens.get(underscore + 1..underscore + 4) {
            let code: String = candidate
                .chars()
                .filter(char::is_ascii_alphabetic)
                .map(|c| c.to_ascii_uppercase())
                .collect();
            if code.len() == 3 {
                return Some((code, &tokens[..underscore]));
            }
        }
        search_end = underscore;
    }

    None
}

/// Long all-digit segments are hashes or ids, not path components
pub fn is_noise_segment(segment: &str) -> bool {
    segment.len() > NOISE_DIGITS_MAX && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Split a path string into directories and leaf
pub fn split_path(path: &str) -> (Vec<String>, String) {
    let mut segments: Vec<String> = path
        .split('_')
        .filter(|s| !s.is_empty() && !is_noise_segment(s))
        .map(str::to_string)
        .collect();

    if segments.first().is_some_and(|s| s == PATH_SIGIL) {
        segments.remove(0);
    }

    let leaf = segments
        .pop()
        .unwrap_or_else(|| UNKNOWN_DIALOGUE.to_string());
    (segments, leaf)
}

/// Decode the path and language of a cleaned token string
pub fn parse_tag(tokens: &str) -> DialogueTag {
    let trimmed = trim_to_path(tokens);

    let (language, path, language_found) = match take_language_code(trimmed) {
        Some((code, rest)) => (code, rest, true),
        None => (UNKNOWN_CODE.to_string(), trimmed, false),
    };

    let (directories, leaf) = split_path(path);
    DialogueTag {
        language,
        language_found,
        directories,
        leaf,
    }
}

fn extract_one<'a>(
    data: &'a [u8],
    offset: usize,
    languages: &LanguageSelection,
) -> Attempt<DialogueAsset<'a>> {
    let start = offset + DIALOGUE.len();
    let riff = find_from(data, RIFF.bytes, start)
        .ok_or(Skip::new(offset, SkipReason::NoRiffMagic))?;
    if riff == start {
        return Err(Skip::new(offset, SkipReason::EmptyRange));
    }

    let tag = parse_tag(&clean_tokens(&data[start..riff]));
    if !languages.accepts(&tag.language) {
        return Err(Skip::new(offset, SkipReason::LanguageNotSelected { code: tag.language }));
    }

    let bytes =
        slice_to_terminator(data, riff).ok_or(Skip::new(offset, SkipReason::EmptyRange))?;

    Ok(DialogueAsset {
        folder: folder_for(&tag.language),
        language: tag.language,
        language_fallback: !tag.language_found,
        directories: tag.directories,
        leaf: tag.leaf,
        offset,
        bytes,
    })
}

/// Carve every dialogue clip in a selected language out of `data`.
///
/// Does nothing when `languages` is empty.
pub fn extract_dialogue<'a>(
    data: &'a [u8],
    languages: &LanguageSelection,
    cancel: &CancelToken,
) -> Result<Vec<Attempt<DialogueAsset<'a>>>> {
    if languages.is_empty() {
        return Ok(Vec::new());
    }

    let mut attempts = Vec::new();
    for offset in scan(data, DIALOGUE.bytes)? {
        if cancel.is_cancelled() {
            break;
        }
        attempts.push(extract_one(data, offset, languages));
    }

    Ok(attempts)
}
