//! Sentence-aligned text chunking for backends with input-size limits.
//!
//! Greedy single pass: `". "` is treated as a soft sentence delimiter and
//! sentences are packed into chunks of at most `max_chars` characters. A
//! sentence is never split, so a single sentence longer than the limit
//! becomes a chunk on its own. Reassembly is ordered concatenation — chunk
//! order in equals chunk order out.

/// Internal sentence separator; never appears in natural text.
const SENTENCE_MARK: char = '\u{1f}';

/// Split `text` into sentence-aligned chunks of at most `max_chars` characters.
///
/// Whitespace-only chunks are dropped. The limit is measured in characters,
/// not bytes, matching what the translation model tokenizer cares about.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let marked = text.replace(". ", &format!(".{}", SENTENCE_MARK));

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for sentence in marked.split(SENTENCE_MARK) {
        let sentence_chars = sentence.chars().count();
        if current_chars + sentence_chars < max_chars {
            current.push_str(sentence);
            current.push(' ');
            current_chars += sentence_chars + 1;
        } else {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                chunks.push(trimmed.to_string());
            }
            current = format!("{} ", sentence);
            current_chars = sentence_chars + 1;
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }

    chunks
}

/// Reassemble per-chunk backend outputs in original order.
pub fn reassemble(chunks: &[String]) -> String {
    chunks
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = chunk_text("Hello world. How are you.", 400);
        assert_eq!(chunks, vec!["Hello world. How are you."]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_text("", 400).is_empty());
        assert!(chunk_text("   ", 400).is_empty());
    }

    #[test]
    fn tiny_threshold_forces_one_sentence_per_chunk() {
        let chunks = chunk_text("A. B. C.", 3);
        assert_eq!(chunks, vec!["A.", "B.", "C."]);
    }

    #[test]
    fn sentences_are_never_split() {
        let text = "The first sentence is here. The second sentence is also here. Third.";
        let chunks = chunk_text(text, 35);
        for chunk in &chunks {
            // Every chunk ends on a sentence boundary or is the tail
            assert!(!chunk.ends_with(' '));
        }
        // Concatenation preserves the sentence sequence
        let rejoined = chunks.join(" ");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn chunks_respect_the_limit_unless_sentence_exceeds_it() {
        let text = "Short one. Another short one. A noticeably longer third sentence here. End.";
        let max = 40;
        for chunk in chunk_text(text, max) {
            let sentence_count = chunk.matches(". ").count() + 1;
            if sentence_count > 1 {
                assert!(
                    chunk.chars().count() <= max,
                    "multi-sentence chunk over limit: {:?}",
                    chunk
                );
            }
        }
    }

    #[test]
    fn oversized_single_sentence_becomes_its_own_chunk() {
        let long = "x".repeat(500);
        let text = format!("Short. {}. Tail.", long);
        let chunks = chunk_text(&text, 100);
        assert!(chunks.iter().any(|c| c.chars().count() > 100));
        let rejoined = chunks.join(" ");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn reassembly_preserves_order() {
        let translated = vec!["ta".to_string(), "tb".to_string(), "tc".to_string()];
        assert_eq!(reassemble(&translated), "ta tb tc");
    }

    #[test]
    fn reassembly_of_empty_is_empty() {
        assert_eq!(reassemble(&[]), "");
    }

    #[test]
    fn chunk_count_is_stable_for_multibyte_text() {
        // character counting, not byte counting
        let text = "Canción número uno. Canción número dos. Canción número tres.";
        let chunks = chunk_text(text, 25);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn text_without_delimiter_is_one_chunk() {
        let text = "no sentence delimiter anywhere in this run of words";
        assert_eq!(chunk_text(text, 10), vec![text.to_string()]);
    }
}
