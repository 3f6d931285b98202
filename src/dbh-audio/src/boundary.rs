//! End-of-block detection
//!
//! Blocks are closed by six consecutive `0x2D` bytes. A block that runs off
//! the end of the volume is closed by the end of the buffer instead, so
//! truncated or concatenated volumes still extract.

use crate::scan::find_from;
use crate::signature::TERMINATOR;

/// Offset of the first terminator run at or after `from`, or `data.len()`
pub fn find_terminator(data: &[u8], from: usize) -> usize {
    find_from(data, TERMINATOR.bytes, from).unwrap_or(data.len())
}

/// The candidate block `[from, terminator)`, or `None` if it is empty
pub fn slice_to_terminator(data: &[u8], from: usize) -> Option<&[u8]> {
    let end = find_terminator(data, from);
    if end <= from {
        return None;
    }
    Some(&data[from..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_terminator() {
        let data = b"payload------tail";
        assert_eq!(find_terminator(data, 0), 7);
        assert_eq!(find_terminator(data, 7), 7);
    }

    #[test]
    fn test_find_terminator_short_run_ignored() {
        // Five dashes is not a terminator
        let data = b"ab-----cd------";
        assert_eq!(find_terminator(data, 0), 9);
    }

    #[test]
    fn test_find_terminator_falls_back_to_end() {
        let data = b"no terminator here";
        assert_eq!(find_terminator(data, 0), data.len());
        assert_eq!(find_terminator(data, 5), data.len());
        assert_eq!(find_terminator(data, data.len() + 3), data.len());
    }

    #[test]
    fn test_slice_to_terminator() {
        let data = b"RIFFabc------RIFF";
        assert_eq!(slice_to_terminator(data, 0), Some(&b"RIFFabc"[..]));
        // Tail after the terminator runs to the end
        assert_eq!(slice_to_terminator(data, 13), Some(&b"RIFF"[..]));
        // Starting on the terminator itself is an empty block
        assert_eq!(slice_to_terminator(data, 7), None);
        assert_eq!(slice_to_terminator(data, data.len()), None);
    }
}
