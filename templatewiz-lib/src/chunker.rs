use std::mem;

use crate::tokenizer::Tokenizer;

/// Packs rendered rule blocks into newline-joined chunks of at most
/// `max_tokens` tokens each.
///
/// Greedy: blocks accumulate until the next one would overflow the budget,
/// then the chunk is closed. A block is never split; one that alone reaches
/// the budget becomes a chunk by itself. Chunks are produced lazily.
pub fn chunk<'t, I>(blocks: I, max_tokens: usize, tokenizer: &'t dyn Tokenizer) -> Chunks<'t, I::IntoIter>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    Chunks {
        blocks: blocks.into_iter(),
        max_tokens,
        separator_tokens: tokenizer.count("\n"),
        tokenizer,
        current: String::new(),
        current_tokens: 0,
        ready: None,
    }
}

pub struct Chunks<'t, I> {
    blocks: I,
    max_tokens: usize,
    separator_tokens: usize,
    tokenizer: &'t dyn Tokenizer,
    current: String,
    current_tokens: usize,
    /// A full chunk closed in the same step as its predecessor.
    ready: Option<String>,
}

impl<I> Iterator for Chunks<'_, I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if let Some(ready) = self.ready.take() {
            return Some(ready);
        }

        while let Some(block) = self.blocks.next() {
            let block = block.as_ref();
            if block.is_empty() {
                continue;
            }
            let tokens = self.tokenizer.count(block);
            let cost = if self.current.is_empty() {
                tokens
            } else {
                tokens + self.separator_tokens
            };

            let mut closed = None;
            if self.current_tokens + cost <= self.max_tokens {
                if !self.current.is_empty() {
                    self.current.push('\n');
                }
                self.current.push_str(block);
                self.current_tokens += cost;
            } else {
                if !self.current.is_empty() {
                    closed = Some(mem::take(&mut self.current));
                }
                self.current = block.to_owned();
                self.current_tokens = tokens;
            }

            if self.current_tokens >= self.max_tokens {
                let full = mem::take(&mut self.current);
                self.current_tokens = 0;
                return match closed {
                    Some(previous) => {
                        self.ready = Some(full);
                        Some(previous)
                    }
                    None => Some(full),
                };
            }
            if closed.is_some() {
                return closed;
            }
        }

        if self.current.is_empty() {
            None
        } else {
            self.current_tokens = 0;
            Some(mem::take(&mut self.current))
        }
    }
}
