//! reflog::tail
//!
//! Backward line lookup over a seekable source.
//!
//! Reads a window from the end of the source and splits it on newlines.
//! The first segment of a window that does not start at offset 0 may be a
//! partial line, so it is never counted. If the window holds too few
//! complete lines it doubles and is re-read, until either enough lines are
//! in view or the whole source is covered.

use std::io::{self, Read, Seek, SeekFrom};

use tracing::trace;

use crate::core::config::DEFAULT_READ_WINDOW;

/// Outcome of a backward lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailLine {
    /// The requested line, without its newline.
    Found(Vec<u8>),
    /// The source has fewer lines than requested; carries how many it has.
    Short(usize),
}

/// Reads lines from the end of a seekable source.
#[derive(Debug)]
pub struct TailReader<R> {
    inner: R,
    window: usize,
}

impl<R: Read + Seek> TailReader<R> {
    /// Tail reader with the default initial window.
    pub fn new(inner: R) -> Self {
        Self::with_window(inner, DEFAULT_READ_WINDOW)
    }

    /// Tail reader starting from a window of `window` bytes.
    pub fn with_window(inner: R, window: usize) -> Self {
        Self {
            inner,
            window: window.max(1),
        }
    }

    /// Fetch the `n`th line counting from the end, where 1 is the last line.
    ///
    /// A final line without a trailing newline still counts as a line.
    pub fn line_from_end(&mut self, n: usize) -> io::Result<TailLine> {
        if n == 0 {
            return Ok(TailLine::Short(0));
        }

        let len = self.inner.seek(SeekFrom::End(0))?;
        if len == 0 {
            return Ok(TailLine::Short(0));
        }

        let mut window = self.window as u64;
        loop {
            let size = window.min(len);
            let start = len - size;
            trace!(start, size, "reading tail window");

            self.inner.seek(SeekFrom::Start(start))?;
            let mut buf = vec![0u8; size as usize];
            self.inner.read_exact(&mut buf)?;

            let body = buf.strip_suffix(b"\n").unwrap_or(&buf);
            let mut lines: Vec<&[u8]> = body.rsplit(|b| *b == b'\n').collect();
            if start > 0 {
                lines.pop();
            }

            if lines.len() >= n {
                return Ok(TailLine::Found(lines[n - 1].to_vec()));
            }
            if start == 0 {
                return Ok(TailLine::Short(lines.len()));
            }
            window = window.saturating_mul(2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tail(data: &str, window: usize, n: usize) -> TailLine {
        TailReader::with_window(Cursor::new(data.as_bytes().to_vec()), window)
            .line_from_end(n)
            .unwrap()
    }

    fn found(s: &str) -> TailLine {
        TailLine::Found(s.as_bytes().to_vec())
    }

    #[test]
    fn finds_lines_from_end() {
        let data = "one\ntwo\nthree\n";
        assert_eq!(tail(data, 4096, 1), found("three"));
        assert_eq!(tail(data, 4096, 2), found("two"));
        assert_eq!(tail(data, 4096, 3), found("one"));
        assert_eq!(tail(data, 4096, 4), TailLine::Short(3));
    }

    #[test]
    fn small_windows_grow() {
        let data = "alpha\nbeta\ngamma\ndelta\n";
        for window in 1..=data.len() + 1 {
            assert_eq!(tail(data, window, 1), found("delta"), "window {window}");
            assert_eq!(tail(data, window, 4), found("alpha"), "window {window}");
            assert_eq!(tail(data, window, 5), TailLine::Short(4), "window {window}");
        }
    }

    #[test]
    fn unterminated_last_line_counts() {
        assert_eq!(tail("one\ntwo", 2, 1), found("two"));
        assert_eq!(tail("one\ntwo", 2, 2), found("one"));
    }

    #[test]
    fn empty_source() {
        assert_eq!(tail("", 16, 1), TailLine::Short(0));
    }

    #[test]
    fn zero_is_never_found() {
        assert_eq!(tail("one\n", 16, 0), TailLine::Short(0));
    }
}
