//! Incremental reveal of a finished reply.
//!
//! Purely presentational: the full text already exists, it is only handed to
//! the renderer in pieces. Pieces are the text between line breaks plus the
//! breaks themselves — a run of two or more `\n` is one piece, a single `\n`
//! is its own piece. Concatenating every piece yields the original text.

use std::time::Duration;

/// Delay between revealed pieces unless configured otherwise.
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(20);

/// Replies longer than this many characters are revealed incrementally.
pub const DEFAULT_REVEAL_THRESHOLD: usize = 500;

/// Lazy splitter over a reply. Cloning restarts from the clone's position;
/// [`reveal_chunks`] always starts from the beginning.
#[derive(Debug, Clone)]
pub struct RevealChunks<'a> {
    rest: &'a str,
}

pub fn reveal_chunks(text: &str) -> RevealChunks<'_> {
    RevealChunks { rest: text }
}

/// Whether a reply is long enough to be worth revealing piece by piece.
pub fn should_reveal(text: &str, threshold: usize) -> bool {
    text.chars().count() > threshold
}

impl<'a> Iterator for RevealChunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let end = match self.rest.find('\n') {
            Some(0) => {
                let run = self.rest.bytes().take_while(|&b| b == b'\n').count();
                // "\n\n+" is one piece; a lone "\n" is another.
                if run >= 2 { run } else { 1 }
            }
            Some(pos) => pos,
            None => self.rest.len(),
        };
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(chunk)
    }
}
