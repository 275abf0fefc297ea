// src/util.rs — Shared utility functions

/// Truncate a string for display/logging (UTF-8 safe).
///
/// Returns a substring of at most `max_len` bytes, ensuring the cut
/// point falls on a valid UTF-8 character boundary.
pub fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        &s[..end]
    }
}

/// Split `text` into pieces of `words_per_chunk` words each.
///
/// Each piece keeps the whitespace that followed its last word, so
/// concatenating the pieces reproduces `text` exactly (leading whitespace
/// is attached to the first piece).
pub fn chunk_words(text: &str, words_per_chunk: usize) -> Vec<String> {
    let per_chunk = words_per_chunk.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut words = 0;
    let mut in_word = false;

    for c in text.chars() {
        if c.is_whitespace() {
            if in_word {
                in_word = false;
                words += 1;
            }
        } else if !in_word {
            if words == per_chunk {
                chunks.push(std::mem::take(&mut current));
                words = 0;
            }
            in_word = true;
        }
        current.push(c);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short() {
        assert_eq!(truncate_str("привет", 64), "привет");
    }

    #[test]
    fn test_truncate_long() {
        assert_eq!(truncate_str("hello world", 5), "hello");
    }

    #[test]
    fn test_truncate_cyrillic_boundary() {
        // Each Cyrillic letter is 2 bytes; byte 3 is mid-letter.
        assert_eq!(truncate_str("при", 3), "п");
    }

    #[test]
    fn test_truncate_zero_max() {
        assert_eq!(truncate_str("hello", 0), "");
    }

    #[test]
    fn test_chunk_words_groups_of_three() {
        let chunks = chunk_words("one two three four five", 3);
        assert_eq!(chunks, vec!["one two three ", "four five"]);
    }

    #[test]
    fn test_chunk_words_preserves_text() {
        let text = "  Привет!\nКак   дела? Всё\tхорошо, спасибо.  ";
        let chunks = chunk_words(text, 3);
        assert_eq!(chunks.concat(), text);
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn test_chunk_words_empty() {
        assert!(chunk_words("", 3).is_empty());
        assert_eq!(chunk_words("   ", 3), vec!["   "]);
    }

    #[test]
    fn test_chunk_words_zero_treated_as_one() {
        assert_eq!(chunk_words("a b", 0), vec!["a ", "b"]);
    }
}
