use std::ops::Range;
use crate::memory::block::DataBlock;

pub trait BlockTokenizer: Send + Sync {
    /// Split `data` into tokens, recording their spans in `scratch`.
    /// Returns the number of tokens found.
    fn tokenize(&self, data: &[u8], scratch: &mut TokenScratch) -> usize;

    fn name(&self) -> &str;

    fn clone_box(&self) -> Box<dyn BlockTokenizer>;

    /// Tokenize the valid bytes of a block. Markers yield no tokens.
    fn tokenize_block(&self, block: &DataBlock, scratch: &mut TokenScratch) -> usize {
        self.tokenize(block.data(), scratch)
    }
}

/// Reusable token span storage.
///
/// Holds byte ranges rather than slices so one allocation serves every
/// block. Tokens are read back as views into the tokenized buffer and are
/// only meaningful until that block is recycled.
#[derive(Debug, Default)]
pub struct TokenScratch {
    spans: Vec<Range<usize>>,
}

impl TokenScratch {
    /// Scratch sized for the worst case of a `block_size` buffer.
    pub fn for_block_size(block_size: usize) -> Self {
        TokenScratch {
            spans: Vec::with_capacity(block_size / 2 + 1),
        }
    }

    pub fn clear(&mut self) {
        self.spans.clear();
    }

    pub fn push(&mut self, span: Range<usize>) {
        self.spans.push(span);
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Token views into `data`, which must be the buffer last tokenized.
    pub fn tokens<'a>(&'a self, data: &'a [u8]) -> impl Iterator<Item = &'a [u8]> + 'a {
        self.spans.iter().map(move |span| &data[span.clone()])
    }
}

/// Splits on a fixed byte delimiter set using a lookup table.
#[derive(Clone)]
pub struct DelimiterTokenizer {
    delimiters: [bool; 256],
}

impl DelimiterTokenizer {
    pub fn new(delimiters: &[u8]) -> Self {
        let mut table = [false; 256];
        for &d in delimiters {
            table[d as usize] = true;
        }
        DelimiterTokenizer { delimiters: table }
    }

    pub fn is_delimiter(&self, byte: u8) -> bool {
        self.delimiters[byte as usize]
    }
}

impl Default for DelimiterTokenizer {
    fn default() -> Self {
        DelimiterTokenizer::new(crate::core::config::DELIMITERS.as_bytes())
    }
}

impl BlockTokenizer for DelimiterTokenizer {
    fn tokenize(&self, data: &[u8], scratch: &mut TokenScratch) -> usize {
        scratch.clear();
        let mut start = None;

        for (i, &byte) in data.iter().enumerate() {
            match (self.is_delimiter(byte), start) {
                (true, Some(s)) => {
                    scratch.push(s..i);
                    start = None;
                }
                (false, None) => start = Some(i),
                _ => {}
            }
        }
        if let Some(s) = start {
            scratch.push(s..data.len());
        }

        scratch.len()
    }

    fn name(&self) -> &str {
        "delimiter"
    }

    fn clone_box(&self) -> Box<dyn BlockTokenizer> {
        Box::new(self.clone())
    }
}
