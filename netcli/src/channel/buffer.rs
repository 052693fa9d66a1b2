//! Output buffer with last-line prompt detection.
//!
//! Device prompts never end in a newline, so the only place a prompt can
//! signal "output finished" is the final, unterminated line of the buffer.
//! Searching just that line keeps detection cheap for large outputs and
//! avoids false positives on prompt-like lines inside the output.

use super::patterns::PromptMatcher;

/// Buffer for accumulating command output.
#[derive(Debug, Default)]
pub struct PatternBuffer {
    /// The accumulated output buffer.
    buffer: Vec<u8>,
}

impl PatternBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
        }
    }

    /// Extend the buffer with new data, stripping ANSI escape codes.
    pub fn extend(&mut self, data: &[u8]) {
        let cleaned = strip_ansi_escapes::strip(data);
        self.buffer.extend_from_slice(&cleaned);
    }

    /// The trailing unterminated line (after the last `\n` or `\r`).
    pub fn last_line(&self) -> &[u8] {
        match memchr::memrchr2(b'\n', b'\r', &self.buffer) {
            Some(pos) => &self.buffer[pos + 1..],
            None => &self.buffer,
        }
    }

    /// Check whether the trailing line is a prompt.
    pub fn ends_with_prompt(&self, matcher: &dyn PromptMatcher) -> bool {
        let line = self.last_line();
        !line.is_empty() && matcher.is_match(line)
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    /// Get a reference to the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::bytes::Regex;

    #[test]
    fn test_basic_extend() {
        let mut buffer = PatternBuffer::new();
        buffer.extend(b"Hello, world!");
        assert_eq!(buffer.as_slice(), b"Hello, world!");
    }

    #[test]
    fn test_ansi_stripping() {
        let mut buffer = PatternBuffer::new();
        // Typical ANSI color code: \x1b[32m (green)
        buffer.extend(b"\x1b[32mGreen text\x1b[0m");
        assert_eq!(buffer.as_slice(), b"Green text");
    }

    #[test]
    fn test_last_line() {
        let mut buffer = PatternBuffer::new();
        buffer.extend(b"show clock\r\n*10:00:00.000 UTC Mon Mar 1 2021\r\nRouter#");
        assert_eq!(buffer.last_line(), b"Router#");

        buffer.extend(b"\r\n");
        assert_eq!(buffer.last_line(), b"");
    }

    #[test]
    fn test_prompt_only_at_end() {
        let pattern = Regex::new(r"^[\w.\-]+#\s*$").unwrap();

        let mut buffer = PatternBuffer::new();
        buffer.extend(b"Router#\r\nsome output still arriving");
        assert!(!buffer.ends_with_prompt(&pattern));

        buffer.extend(b"\r\nRouter#");
        assert!(buffer.ends_with_prompt(&pattern));
    }

    #[test]
    fn test_take_clears_buffer() {
        let mut buffer = PatternBuffer::new();
        buffer.extend(b"test data");
        assert_eq!(buffer.take(), b"test data");
        assert!(buffer.is_empty());
    }
}
