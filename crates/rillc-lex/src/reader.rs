//! Rune reader over the source text.
//!
//! The reader hands out code points one at a time while tracking the current
//! [`Position`]. Line endings `\r`, `\n`, and `\r\n` each count as a single
//! line break. One step of lookback is supported; unreading twice in a row or
//! before the first read is a programmer error and panics.

use std::io::SeekFrom;

use rillc_util::Position;

/// State saved before each read so that one rune can be unread.
#[derive(Clone, Copy, Debug)]
struct Snapshot {
    pos: Position,
    is_end: bool,
    last_was_cr: bool,
}

/// A rune stream with position tracking and one-rune lookback.
pub struct Reader<'a> {
    source: &'a str,
    pos: Position,
    is_end: bool,
    /// Whether the previously read rune was `\r` (pairs `\r\n` into one break).
    last_was_cr: bool,
    /// State before the last `read_rune`; `None` right after an unread.
    prev: Option<Snapshot>,
}

impl<'a> Reader<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: Position::START,
            is_end: false,
            last_was_cr: false,
            prev: None,
        }
    }

    /// The position of the next rune to be read.
    pub fn position(&self) -> Position {
        self.pos
    }

    /// True once the end of the source has been observed.
    pub fn is_at_end(&self) -> bool {
        self.is_end
    }

    /// Reads the next rune, or `None` at end of input (idempotent).
    pub fn read_rune(&mut self) -> Option<char> {
        self.prev = Some(Snapshot {
            pos: self.pos,
            is_end: self.is_end,
            last_was_cr: self.last_was_cr,
        });

        if self.is_end {
            return None;
        }
        let c = match self.source[self.pos.byte_offset..].chars().next() {
            Some(c) => c,
            None => {
                self.is_end = true;
                return None;
            }
        };

        let len = c.len_utf8();
        self.pos.byte_offset += len;
        if c == '\n' && self.last_was_cr {
            // The second half of a \r\n pair: the break was already counted,
            // the column stays at the fresh line.
            self.pos.column_runes = 0;
            self.pos.column_bytes = 0;
            self.last_was_cr = false;
        } else if c == '\n' || c == '\r' {
            self.pos.line += 1;
            self.pos.column_runes = 0;
            self.pos.column_bytes = 0;
            self.last_was_cr = c == '\r';
        } else {
            self.pos.column_runes += 1;
            self.pos.column_bytes += len as u32;
            self.last_was_cr = false;
        }
        Some(c)
    }

    /// Restores the state captured before the last `read_rune`.
    ///
    /// # Panics
    ///
    /// Panics when called twice in a row or before any read.
    pub fn unread_rune(&mut self) {
        let snap = self
            .prev
            .take()
            .expect("unread_rune without a preceding read_rune");
        self.pos = snap.pos;
        self.is_end = snap.is_end;
        self.last_was_cr = snap.last_was_cr;
    }

    /// Repositions the reader and clears the end-of-stream flag.
    ///
    /// Line and column information is recomputed by rescanning from the start
    /// of the buffer, so the target offset must lie on a rune boundary.
    pub fn seek(&mut self, from: SeekFrom) -> usize {
        let len = self.source.len() as i64;
        let target = match from {
            SeekFrom::Start(n) => n as i64,
            SeekFrom::Current(d) => self.pos.byte_offset as i64 + d,
            SeekFrom::End(d) => len + d,
        }
        .clamp(0, len) as usize;
        assert!(
            self.source.is_char_boundary(target),
            "seek target {} is not a rune boundary",
            target
        );

        let mut fresh = Reader::new(self.source);
        while fresh.pos.byte_offset < target {
            fresh.read_rune();
        }
        self.pos = fresh.pos;
        self.last_was_cr = fresh.last_was_cr;
        self.is_end = false;
        self.prev = None;
        target
    }
}
