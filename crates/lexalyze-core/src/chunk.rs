//! Document chunking for bounded-context models.
//!
//! Two windowing modes share one [`Chunk`] type:
//!
//! - **token windows** ([`chunk_tokens`]) split on whitespace, rejoin each
//!   window with single spaces, and advance by `size - overlap` tokens so
//!   entities near a boundary are seen twice.
//! - **character windows** ([`chunk_chars`]) are disjoint slices of at most
//!   `size` characters, used for summarization.
//!
//! Every offset here counts Unicode scalar values, never bytes, so a window
//! cannot split a multi-byte character.

use std::ops::Range;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    #[error("chunk size must be positive")]
    ZeroSize,
    #[error("overlap ({overlap}) must be smaller than chunk size ({size})")]
    OverlapTooLarge { size: usize, overlap: usize },
}

/// A window over a document, fed to one inference call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position in the chunk sequence.
    pub index: usize,
    pub text: String,
    /// First token index (token windows) or first character index (character windows).
    pub start: usize,
    /// Document character range covered by this chunk.
    pub range: Range<usize>,
    /// Token windows only: `(offset in text, offset in document)` of each token start.
    anchors: Vec<(usize, usize)>,
}

impl Chunk {
    /// Translate a character offset inside [`Chunk::text`] into a document offset.
    ///
    /// Token windows collapse runs of whitespace to one space, so the mapping
    /// goes through the start of the token the offset falls in.
    pub fn to_document_offset(&self, local: usize) -> usize {
        let i = self.anchors.partition_point(|&(text_at, _)| text_at <= local);
        if i == 0 {
            return self.range.start + local;
        }
        let (text_at, doc_at) = self.anchors[i - 1];
        doc_at + (local - text_at)
    }

    /// Number of whitespace-delimited words in the chunk text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

struct TokenSpan {
    bytes: Range<usize>,
    chars: Range<usize>,
}

/// Locate whitespace-delimited tokens with both byte and char ranges.
fn token_spans(text: &str) -> Vec<TokenSpan> {
    let mut spans = Vec::new();
    let mut open: Option<(usize, usize)> = None;
    let mut char_pos = 0;

    for (byte_pos, c) in text.char_indices() {
        match (c.is_whitespace(), open) {
            (false, None) => open = Some((byte_pos, char_pos)),
            (true, Some((b, ch))) => {
                spans.push(TokenSpan {
                    bytes: b..byte_pos,
                    chars: ch..char_pos,
                });
                open = None;
            }
            _ => {}
        }
        char_pos += 1;
    }
    if let Some((b, ch)) = open {
        spans.push(TokenSpan {
            bytes: b..text.len(),
            chars: ch..char_pos,
        });
    }
    spans
}

fn validate(size: usize, overlap: usize) -> Result<(), ChunkError> {
    if size == 0 {
        return Err(ChunkError::ZeroSize);
    }
    if overlap >= size {
        return Err(ChunkError::OverlapTooLarge { size, overlap });
    }
    Ok(())
}

/// Split `text` into overlapping windows of at most `size` whitespace tokens.
///
/// Windows start every `size - overlap` tokens. The last window is the one
/// that reaches the final token, so a document of `size` tokens or fewer
/// yields exactly one chunk. Empty or whitespace-only input yields none.
pub fn chunk_tokens(text: &str, size: usize, overlap: usize) -> Result<Vec<Chunk>, ChunkError> {
    validate(size, overlap)?;
    let tokens = token_spans(text);
    let stride = size - overlap;

    let mut chunks = Vec::new();
    let mut first = 0;
    while first < tokens.len() {
        let last = (first + size).min(tokens.len());
        let window = &tokens[first..last];

        let mut joined = String::new();
        let mut anchors = Vec::with_capacity(window.len());
        let mut local = 0;
        for (k, tok) in window.iter().enumerate() {
            if k > 0 {
                joined.push(' ');
                local += 1;
            }
            anchors.push((local, tok.chars.start));
            joined.push_str(&text[tok.bytes.clone()]);
            local += tok.chars.len();
        }

        chunks.push(Chunk {
            index: chunks.len(),
            text: joined,
            start: first,
            range: window[0].chars.start..window[window.len() - 1].chars.end,
            anchors,
        });

        if last == tokens.len() {
            break;
        }
        first += stride;
    }
    Ok(chunks)
}

/// Split `text` into disjoint windows of at most `size` characters.
pub fn chunk_chars(text: &str, size: usize) -> Result<Vec<Chunk>, ChunkError> {
    validate(size, 0)?;

    let mut chunks = Vec::new();
    let mut byte_start = 0;
    let mut char_start = 0;
    let mut count = 0;

    for (byte_pos, _) in text.char_indices() {
        if count == size {
            let chunk = char_chunk(chunks.len(), text, byte_start..byte_pos, char_start, count);
            chunks.push(chunk);
            byte_start = byte_pos;
            char_start += count;
            count = 0;
        }
        count += 1;
    }
    if count > 0 {
        let bytes = byte_start..text.len();
        let chunk = char_chunk(chunks.len(), text, bytes, char_start, count);
        chunks.push(chunk);
    }
    Ok(chunks)
}

fn char_chunk(
    index: usize,
    text: &str,
    bytes: Range<usize>,
    start: usize,
    len: usize,
) -> Chunk {
    Chunk {
        index,
        text: text[bytes].to_string(),
        start,
        range: start..start + len,
        anchors: Vec::new(),
    }
}
