//! Reply formatting helpers.

/// Split a message into chunks that fit within a platform length limit.
///
/// Tries to split at newline boundaries to avoid breaking mid-sentence.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if remaining.len() <= max_len {
            chunks.push(remaining.to_string());
            break;
        }

        // Try to split at a newline near the limit
        let split_at = remaining[..max_len].rfind('\n').unwrap_or(max_len);

        let (chunk, rest) = remaining.split_at(split_at);
        chunks.push(chunk.to_string());

        // Skip the newline character if we split there
        remaining = if rest.starts_with('\n') {
            &rest[1..]
        } else {
            rest
        };
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_untouched() {
        let chunks = split_message("hello", 100);
        assert_eq!(chunks, vec!["hello"]);
    }

    #[test]
    fn test_exact_length_untouched() {
        let chunks = split_message("12345", 5);
        assert_eq!(chunks, vec!["12345"]);
    }

    #[test]
    fn test_splits_at_newline() {
        let text = "first line\nsecond line";
        let chunks = split_message(text, 15);
        assert_eq!(chunks, vec!["first line", "second line"]);
    }

    #[test]
    fn test_hard_split_without_newline() {
        let text = "a".repeat(25);
        let chunks = split_message(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 10);
        assert_eq!(chunks[1].len(), 10);
        assert_eq!(chunks[2].len(), 5);
    }

    #[test]
    fn test_chunks_reassemble() {
        let text = "para one\n\npara two\n\npara three";
        let chunks = split_message(text, 12);
        for chunk in &chunks {
            assert!(chunk.len() <= 12);
        }
        // Content survives, modulo the newlines consumed at split points
        let joined = chunks.join("\n");
        assert!(joined.contains("para one"));
        assert!(joined.contains("para three"));
    }
}
