//! Line and token scanning for the header block.

use crate::http::error::HttpError;

const CR: u8 = b'\r';
const LF: u8 = b'\n';
const HT: u8 = b'\t';

/// Location of a line terminator inside a scanned window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEnd {
    /// Offset of the first terminator byte, i.e. the length of the line content.
    pub pos: usize,
    /// 2 for `CRLF`, 1 for a bare `LF`.
    pub width: usize,
}

impl LineEnd {
    /// Offset of the first byte after the terminator.
    pub fn next(&self) -> usize {
        self.pos + self.width
    }
}

/// Control characters, DEL and anything outside ASCII. `HT` is allowed.
fn is_disallowed(b: u8) -> bool {
    (b < 0x20 && b != HT) || b >= 0x7f
}

fn is_separator(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')'
            | b'<'
            | b'>'
            | b'@'
            | b','
            | b';'
            | b':'
            | b'\\'
            | b'"'
            | b'/'
            | b'['
            | b']'
            | b'?'
            | b'='
            | b'{'
            | b'}'
            | b' '
            | b'\t'
    )
}

/// Finds the next logical line terminator in `data`.
///
/// Scans forward to the first disallowed byte. `CRLF` and bare `LF` end the
/// line; a `CR` followed by anything else, or any other disallowed byte, is a
/// violation. Returns `Ok(None)` when the window ends before a terminator
/// (including a trailing lone `CR`).
pub fn find_eol(data: &[u8]) -> Result<Option<LineEnd>, HttpError> {
    let Some(pos) = data.iter().position(|&b| is_disallowed(b)) else {
        return Ok(None);
    };

    match data[pos] {
        CR => match data.get(pos + 1) {
            Some(&LF) => Ok(Some(LineEnd { pos, width: 2 })),
            Some(_) => Err(HttpError::InvalidLineEnding),
            None => Ok(None),
        },
        LF => Ok(Some(LineEnd { pos, width: 1 })),
        other => Err(HttpError::InvalidCharacter(other)),
    }
}

/// Width of the line terminator at the very start of `data`, or 0 if the
/// window does not start with one.
pub fn check_eol(data: &[u8]) -> Result<usize, HttpError> {
    match data {
        [CR, LF, ..] => Ok(2),
        [CR, ..] => Err(HttpError::InvalidLineEnding),
        [LF, ..] => Ok(1),
        _ => Ok(0),
    }
}

/// Locates the end of the header block: the first blank line that follows a
/// line terminator.
///
/// `cursor` is where the previous call stopped; it is advanced so repeated
/// calls over a growing buffer do not rescan old bytes. Returns the offset
/// just past the blank line.
pub fn find_head_end(buf: &[u8], cursor: &mut usize) -> Option<usize> {
    let mut i = (*cursor).min(buf.len());
    while let Some(off) = buf[i..].iter().position(|&b| b == LF) {
        let lf = i + off;
        match (buf.get(lf + 1), buf.get(lf + 2)) {
            (Some(&LF), _) => return Some(lf + 2),
            (Some(&CR), Some(&LF)) => return Some(lf + 3),
            (None, _) | (Some(&CR), None) => {
                *cursor = lf;
                return None;
            }
            _ => i = lf + 1,
        }
    }
    *cursor = buf.len();
    None
}

/// Validates a method token: visible ASCII, no separators.
pub fn validate_method(raw: &[u8], limit: usize) -> Result<&str, HttpError> {
    if raw.len() > limit {
        return Err(HttpError::MethodTooLong { limit });
    }
    if raw.is_empty() || raw.iter().any(|&b| is_disallowed(b) || is_separator(b)) {
        return Err(HttpError::InvalidMethod);
    }
    std::str::from_utf8(raw).map_err(|_| HttpError::InvalidMethod)
}

/// Validates a request target. Separators are fine, controls are not.
pub fn validate_path(raw: &[u8], limit: usize) -> Result<&str, HttpError> {
    if raw.len() > limit {
        return Err(HttpError::PathTooLong { limit });
    }
    if raw.is_empty() || raw.iter().any(|&b| b < 0x20 || b >= 0x7f) {
        return Err(HttpError::InvalidPath);
    }
    std::str::from_utf8(raw).map_err(|_| HttpError::InvalidPath)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_eol_crlf_and_bare_lf() {
        assert_eq!(
            find_eol(b"Host: a\r\nrest").unwrap(),
            Some(LineEnd { pos: 7, width: 2 })
        );
        assert_eq!(
            find_eol(b"Host: a\nrest").unwrap(),
            Some(LineEnd { pos: 7, width: 1 })
        );
    }

    #[test]
    fn find_eol_allows_tab() {
        let end = find_eol(b"X:\tv\r\n").unwrap().unwrap();
        assert_eq!(end.pos, 4);
        assert_eq!(end.next(), 6);
    }

    #[test]
    fn find_eol_rejects_bare_cr() {
        assert!(matches!(
            find_eol(b"Host: a\rb\n"),
            Err(HttpError::InvalidLineEnding)
        ));
    }

    #[test]
    fn find_eol_rejects_controls_and_high_bytes() {
        assert!(matches!(
            find_eol(b"Host: \x01\r\n"),
            Err(HttpError::InvalidCharacter(0x01))
        ));
        assert!(matches!(
            find_eol(b"Host: \xc3\xa9\r\n"),
            Err(HttpError::InvalidCharacter(0xc3))
        ));
        assert!(matches!(
            find_eol(b"Host: \x7f\r\n"),
            Err(HttpError::InvalidCharacter(0x7f))
        ));
    }

    #[test]
    fn find_eol_needs_more_data() {
        assert_eq!(find_eol(b"Host: a").unwrap(), None);
        assert_eq!(find_eol(b"Host: a\r").unwrap(), None);
    }

    #[test]
    fn check_eol_widths() {
        assert_eq!(check_eol(b"\r\nX").unwrap(), 2);
        assert_eq!(check_eol(b"\nX").unwrap(), 1);
        assert_eq!(check_eol(b"X\r\n").unwrap(), 0);
        assert!(check_eol(b"\rX").is_err());
    }

    #[test]
    fn head_end_crlf_and_lf() {
        let mut cursor = 0;
        assert_eq!(find_head_end(b"GET / HTTP/1.0\r\n\r\n", &mut cursor), Some(18));

        let mut cursor = 0;
        assert_eq!(find_head_end(b"GET / HTTP/1.0\n\n", &mut cursor), Some(16));
    }

    #[test]
    fn head_end_resumes_from_cursor() {
        let mut buf = b"GET / HTTP/1.0\r\nHost: a\r\n\r".to_vec();
        let mut cursor = 0;
        assert_eq!(find_head_end(&buf, &mut cursor), None);
        assert_eq!(cursor, 24);

        buf.push(b'\n');
        assert_eq!(find_head_end(&buf, &mut cursor), Some(buf.len()));
    }

    #[test]
    fn head_end_cursor_matches_full_rescan() {
        let full = b"POST /x HTTP/1.1\r\nA: 1\nB: 2\r\n\r\nbody";
        let expected = find_head_end(full, &mut 0);

        for split in 1..full.len() {
            let mut cursor = 0;
            let first = find_head_end(&full[..split], &mut cursor);
            let found = first.or_else(|| find_head_end(full, &mut cursor));
            assert_eq!(found, expected, "split at {}", split);
        }
    }

    #[test]
    fn method_rejects_separators() {
        assert_eq!(validate_method(b"GET", 255).unwrap(), "GET");
        assert!(matches!(
            validate_method(b"GE/T", 255),
            Err(HttpError::InvalidMethod)
        ));
        assert!(matches!(
            validate_method(b"GET", 2),
            Err(HttpError::MethodTooLong { limit: 2 })
        ));
    }

    #[test]
    fn path_allows_separators() {
        assert_eq!(validate_path(b"/a?b=c", 4096).unwrap(), "/a?b=c");
        assert!(matches!(validate_path(b"/a\x00", 4096), Err(HttpError::InvalidPath)));
        assert!(matches!(validate_path(b"/a\tb", 4096), Err(HttpError::InvalidPath)));
        assert!(matches!(
            validate_path(b"/abc", 3),
            Err(HttpError::PathTooLong { limit: 3 })
        ));
    }
}
