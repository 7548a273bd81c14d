//! Buffered byte cursor
//!
//! Wraps any [`Read`] with arbitrary peek-ahead, position tracking and an
//! optional capture buffer that records every consumed byte. The capture is
//! how here-document delimiters keep their exact source spelling.

use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read};

use crate::ast::types::Pos;

const CHUNK_SIZE: usize = 4096;

pub struct ByteReader<R> {
    inner: R,
    buf: VecDeque<u8>,
    pos: Pos,
    eof: bool,
    error: Option<io::Error>,
    capture: Vec<u8>,
    capturing: usize,
}

impl<R: Read> ByteReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: VecDeque::new(),
            pos: Pos::default(),
            eof: false,
            error: None,
            capture: Vec::new(),
            capturing: 0,
        }
    }

    /// Position of the next unread byte.
    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// Make sure at least `n` bytes are buffered, unless the input ends first.
    fn fill(&mut self, n: usize) -> bool {
        let mut chunk = [0u8; CHUNK_SIZE];
        while self.buf.len() < n && !self.eof {
            match self.inner.read(&mut chunk) {
                Ok(0) => self.eof = true,
                Ok(read) => self.buf.extend(&chunk[..read]),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    self.error = Some(e);
                    self.eof = true;
                }
            }
        }
        self.buf.len() >= n
    }

    pub fn peek_byte(&mut self) -> Option<u8> {
        if self.fill(1) {
            self.buf.front().copied()
        } else {
            None
        }
    }

    pub fn peek_str(&mut self, s: &[u8]) -> bool {
        self.fill(s.len()) && self.buf.iter().zip(s).all(|(a, b)| a == b)
    }

    pub fn peek_any(&mut self, bytes: &[u8]) -> bool {
        self.peek_byte().is_some_and(|b| bytes.contains(&b))
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        if !self.fill(1) {
            return None;
        }
        let b = self.buf.pop_front()?;
        self.pos.advance(b);
        if self.capturing > 0 {
            self.capture.push(b);
        }
        Some(b)
    }

    /// Consume `s` if the input continues with it.
    pub fn read_only(&mut self, s: &[u8]) -> bool {
        if !self.peek_str(s) {
            return false;
        }
        for _ in 0..s.len() {
            self.read_byte();
        }
        true
    }

    /// Read up to, not including, the next occurrence of `s`. The flag tells
    /// whether `s` was found before the input ended.
    pub fn read_until(&mut self, s: &[u8]) -> (Vec<u8>, bool) {
        let mut bytes = Vec::new();
        loop {
            if self.peek_str(s) {
                return (bytes, true);
            }
            match self.read_byte() {
                Some(b) => bytes.push(b),
                None => return (bytes, false),
            }
        }
    }

    /// The read error that ended the input, if it did not end cleanly.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn start_capture(&mut self) {
        self.capturing += 1;
    }

    /// Offset into the capture buffer; only meaningful while capturing.
    pub fn captured_len(&self) -> usize {
        self.capture.len()
    }

    /// Stop one level of capturing and return the bytes in `start..end`.
    pub fn finish_capture(&mut self, start: usize, end: usize) -> String {
        let end = end.min(self.capture.len());
        let start = start.min(end);
        let text = String::from_utf8_lossy(&self.capture[start..end]).into_owned();
        self.capturing = self.capturing.saturating_sub(1);
        if self.capturing == 0 {
            self.capture.clear();
        }
        text
    }
}
