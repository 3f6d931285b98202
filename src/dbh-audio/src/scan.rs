//! Exact byte-pattern search
//!
//! [`scan`] reports every occurrence, overlapping ones included, using a
//! Knuth-Morris-Pratt pass over the buffer. [`find_from`] is the single-hit
//! forward search used for boundary lookups.

use memchr::memmem;

use crate::{Error, Result};

/// Longest-proper-prefix table for `pattern`
fn failure_table(pattern: &[u8]) -> Vec<usize> {
    let mut lps = vec![0usize; pattern.len()];
    let mut len = 0;
    let mut i = 1;

    while i < pattern.len() {
        if pattern[i] == pattern[len] {
            len += 1;
            lps[i] = len;
            i += 1;
        } else if len != 0 {
            len = lps[len - 1];
        } else {
            lps[i] = 0;
            i += 1;
        }
    }

    lps
}

/// Find every offset where `pattern` occurs in `data`, in ascending order.
///
/// Overlapping matches are reported: `"AA"` in `"AAAA"` yields `[0, 1, 2]`.
pub fn scan(data: &[u8], pattern: &[u8]) -> Result<Vec<usize>> {
    if pattern.is_empty() {
        return Err(Error::InvalidPattern);
    }

    let lps = failure_table(pattern);
    let mut matches = Vec::new();
    let mut j = 0;

    for (i, &byte) in data.iter().enumerate() {
        while j > 0 && byte != pattern[j] {
            j = lps[j - 1];
        }

        if byte == pattern[j] {
            j += 1;
            if j == pattern.len() {
                matches.push(i + 1 - j);
                j = lps[j - 1];
            }
        }
    }

    Ok(matches)
}

/// First offset `>= from` where `pattern` occurs
pub fn find_from(data: &[u8], pattern: &[u8], from: usize) -> Option<usize> {
    if pattern.is_empty() || from > data.len() {
        return None;
    }

    memmem::find(&data[from..], pattern).map(|pos| from + pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference implementation: test every window
    fn naive(data: &[u8], pattern: &[u8]) -> Vec<usize> {
        data.windows(pattern.len())
            .enumerate()
            .filter(|(_, w)| *w == pattern)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_failure_table() {
        assert_eq!(failure_table(b"AAAA"), vec![0, 1, 2, 3]);
        assert_eq!(failure_table(b"ABAB"), vec![0, 0, 1, 2]);
        assert_eq!(failure_table(b"AABAAA"), vec![0, 1, 0, 1, 2, 2]);
    }

    #[test]
    fn test_scan_overlapping() {
        assert_eq!(scan(b"AAAA", b"AA").unwrap(), vec![0, 1, 2]);
        assert_eq!(scan(b"AAA", b"AA").unwrap(), vec![0, 1]);
        assert_eq!(scan(b"ABABAB", b"ABAB").unwrap(), vec![0, 2]);
    }

    #[test]
    fn test_scan_signatures() {
        let mut data = vec![0u8; 5];
        data.extend_from_slice(b"CSNDBKDT");
        data.extend_from_slice(b"junk");
        data.extend_from_slice(b"CSNDBKDT");

        assert_eq!(scan(&data, b"CSNDBKDT").unwrap(), vec![5, 17]);
        assert!(scan(&data, b"CSNDBNK_").unwrap().is_empty());
    }

    #[test]
    fn test_scan_matches_naive() {
        let data = b"--x------x-----xx--------";
        for pattern in [&b"-"[..], b"--", b"------", b"x-", b"xx--"] {
            assert_eq!(scan(data, pattern).unwrap(), naive(data, pattern));
        }
    }

    #[test]
    fn test_scan_pattern_longer_than_data() {
        assert!(scan(b"AB", b"ABC").unwrap().is_empty());
        assert!(scan(b"", b"A").unwrap().is_empty());
    }

    #[test]
    fn test_scan_empty_pattern() {
        assert!(matches!(scan(b"data", b""), Err(Error::InvalidPattern)));
    }

    #[test]
    fn test_find_from() {
        let data = b"RIFF....RIFF";
        assert_eq!(find_from(data, b"RIFF", 0), Some(0));
        assert_eq!(find_from(data, b"RIFF", 1), Some(8));
        assert_eq!(find_from(data, b"RIFF", 9), None);
        assert_eq!(find_from(data, b"RIFF", 12), None);
        assert_eq!(find_from(data, b"RIFF", 100), None);
        assert_eq!(find_from(data, b"", 0), None);
    }
}
