// Overlapping word-window chunking

/// Default window length in words
pub const DEFAULT_CHUNK_SIZE: usize = 600;

/// Default number of words shared by consecutive windows
pub const DEFAULT_CHUNK_OVERLAP: usize = 120;

/// Split `text` into windows of `chunk_size` words, each starting
/// `chunk_size - overlap` words after the previous one.
///
/// Every window that starts inside the text is emitted, so the tail of a
/// document may appear in more than one chunk. Whitespace is normalized to
/// single spaces. A step of zero is treated as one.
pub fn chunk_words(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::with_capacity(words.len() / step + 1);
    let mut start = 0;

    while start < words.len() {
        let end = (start + chunk_size).min(words.len());
        chunks.push(words[start..end].join(" "));
        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_empty_text() {
        assert!(chunk_words("", 10, 2).is_empty());
        assert!(chunk_words("   \n\t ", 10, 2).is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        assert_eq!(chunk_words("Telnet  is\na partner", 10, 2), vec!["Telnet is a partner"]);
    }

    #[test]
    fn test_windows_overlap() {
        let chunks = chunk_words(&numbered(10), 4, 1);
        assert_eq!(
            chunks,
            vec!["w0 w1 w2 w3", "w3 w4 w5 w6", "w6 w7 w8 w9", "w9"]
        );
    }

    #[test]
    fn test_no_overlap() {
        let chunks = chunk_words(&numbered(6), 3, 0);
        assert_eq!(chunks, vec!["w0 w1 w2", "w3 w4 w5"]);
    }

    #[test]
    fn test_overlap_not_smaller_than_size_still_advances() {
        let chunks = chunk_words(&numbered(3), 2, 5);
        assert_eq!(chunks, vec!["w0 w1", "w1 w2", "w2"]);
    }

    #[test]
    fn test_zero_size() {
        assert!(chunk_words("some text", 0, 0).is_empty());
    }

    #[test]
    fn test_default_window() {
        let chunks = chunk_words(&numbered(1000), DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].split_whitespace().count(), 600);
        assert!(chunks[1].starts_with("w480 "));
        assert!(chunks[2].starts_with("w960 "));
    }
}
