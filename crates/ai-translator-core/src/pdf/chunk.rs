//! Splitting page text into request-sized chunks.
//!
//! Paragraphs (separated by blank lines) are packed together until the
//! character limit is reached. A paragraph that is too long on its own is
//! split at line breaks, and a single over-long line at character
//! boundaries. Limits count `char`s, not bytes.

/// Split text into chunks of at most `max_chars` characters (0 = unlimited).
///
/// Whitespace-only input yields no chunks.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let limit = if max_chars == 0 { usize::MAX } else { max_chars };

    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in paragraphs(text) {
        if char_len(&paragraph) > limit {
            flush(&mut current, &mut chunks);

            let mut piece = String::new();
            for line in paragraph.lines().flat_map(|line| split_long_line(line, limit)) {
                append_or_flush(&mut piece, &mut chunks, &line, "\n", limit);
            }
            flush(&mut piece, &mut chunks);
            continue;
        }

        append_or_flush(&mut current, &mut chunks, &paragraph, "\n\n", limit);
    }

    flush(&mut current, &mut chunks);
    chunks
}

fn paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut lines: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !lines.is_empty() {
                paragraphs.push(lines.join("\n"));
                lines.clear();
            }
        } else {
            lines.push(line.trim_end());
        }
    }

    if !lines.is_empty() {
        paragraphs.push(lines.join("\n"));
    }

    paragraphs
}

fn split_long_line(line: &str, limit: usize) -> Vec<String> {
    if char_len(line) <= limit {
        return vec![line.to_string()];
    }

    let chars: Vec<char> = line.chars().collect();
    chars.chunks(limit).map(|c| c.iter().collect()).collect()
}

fn append_or_flush(current: &mut String, chunks: &mut Vec<String>, piece: &str, sep: &str, limit: usize) {
    if current.is_empty() {
        current.push_str(piece);
    } else if char_len(current) + char_len(sep) + char_len(piece) <= limit {
        current.push_str(sep);
        current.push_str(piece);
    } else {
        chunks.push(std::mem::take(current));
        current.push_str(piece);
    }
}

fn flush(current: &mut String, chunks: &mut Vec<String>) {
    if !current.is_empty() {
        chunks.push(std::mem::take(current));
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
