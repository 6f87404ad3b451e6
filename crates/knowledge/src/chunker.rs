//! Fixed-window text chunking with configurable size and overlap.

use siteqa_core::{AppResult, ChunkingConfig};

/// Split `text` into windows of `size` characters starting every
/// `size - overlap` characters.
///
/// The last windows may be shorter than `size` when the text length is not a
/// multiple of the stride. Sizes are counted in characters, never bytes, so
/// multi-byte text is never split inside a code point.
///
/// # Errors
/// Returns `AppError::Config` when `size == 0` or `overlap >= size`.
pub fn chunk(text: &str, size: usize, overlap: usize) -> AppResult<Vec<String>> {
    chunk_text(text, &ChunkingConfig { size, overlap })
}

/// Chunk with a configuration that may have been built by hand.
///
/// # Errors
/// Returns `AppError::Config` when `config` fails [`ChunkingConfig::validate`].
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> AppResult<Vec<String>> {
    config.validate()?;
    if text.is_empty() {
        return Ok(Vec::new());
    }

    // Byte offset of every char boundary, plus the end of the text
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = boundaries.len() - 1;
    let stride = config.stride();

    let chunks: Vec<String> = (0..char_len)
        .step_by(stride)
        .map(|start| {
            let end = (start + config.size).min(char_len);
            text[boundaries[start]..boundaries[end]].to_string()
        })
        .collect();

    tracing::trace!(
        "Chunked {} chars into {} chunks (size: {}, overlap: {})",
        char_len,
        chunks.len(),
        config.size,
        config.overlap
    );

    Ok(chunks)
}
