//! Character-level line reader.
//!
//! Reads a character stream one character at a time and yields lines with
//! the character offset where each line starts. `"\n"` and `"\r\n"` both end
//! a line; a final line without a terminator is still returned; once the
//! stream is exhausted the reader reports end-of-stream exactly once and
//! keeps returning `None` afterwards.

use std::iter::{FusedIterator, Peekable};

/// One line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Character offset of the first character of the line.
    pub start: usize,
    /// Line content without its terminator.
    pub text: String,
}

impl Line {
    /// An empty line. Whitespace-only lines are content, not breaks.
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// Iterator over the [`Line`]s of a character stream.
#[derive(Debug)]
pub struct SafeLineReader<I: Iterator<Item = char>> {
    chars: Peekable<I>,
    position: usize,
    done: bool,
}

impl<I: Iterator<Item = char>> SafeLineReader<I> {
    pub fn new(chars: I) -> Self {
        Self {
            chars: chars.peekable(),
            position: 0,
            done: false,
        }
    }

    /// Characters consumed so far, terminators included.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl<'a> SafeLineReader<std::str::Chars<'a>> {
    pub fn from_text(text: &'a str) -> Self {
        Self::new(text.chars())
    }
}

impl<I: Iterator<Item = char>> Iterator for SafeLineReader<I> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        if self.done {
            return None;
        }
        if self.chars.peek().is_none() {
            self.done = true;
            return None;
        }

        let start = self.position;
        let mut text = String::new();
        while let Some(c) = self.chars.next() {
            self.position += 1;
            match c {
                '\n' => return Some(Line { start, text }),
                '\r' if self.chars.peek() == Some(&'\n') => {
                    self.chars.next();
                    self.position += 1;
                    return Some(Line { start, text });
                }
                _ => text.push(c),
            }
        }
        // Unterminated final line.
        Some(Line { start, text })
    }
}

impl<I: Iterator<Item = char>> FusedIterator for SafeLineReader<I> {}
