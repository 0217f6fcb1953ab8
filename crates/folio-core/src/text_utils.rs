//! Text splitting helpers for speech requests.

/// Very lightweight sentence splitter based on punctuation.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?' | ';' | ':') {
            if current.chars().any(|c| !c.is_whitespace()) {
                sentences.push(current.trim().to_string());
            }
            current.clear();
        }
    }

    if current.chars().any(|c| !c.is_whitespace()) {
        sentences.push(current.trim().to_string());
    }

    sentences
}

/// Collapse runs of whitespace (PDF text is full of hard line breaks).
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split text into pieces of at most `max_chars` characters.
///
/// Sentences are packed together while they fit; a sentence that is too long
/// is broken on word boundaries, and a single word longer than the limit is
/// cut by characters.
pub fn chunk_for_speech(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let collapsed = collapse_whitespace(text);
    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(&collapsed) {
        for piece in split_long(&sentence, max_chars) {
            let joined_len = if current.is_empty() {
                char_len(&piece)
            } else {
                char_len(&current) + 1 + char_len(&piece)
            };
            if joined_len > max_chars && !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&piece);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn split_long(sentence: &str, max_chars: usize) -> Vec<String> {
    if char_len(sentence) <= max_chars {
        return vec![sentence.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    for word in sentence.split(' ') {
        for part in split_word(word, max_chars) {
            let joined_len = if current.is_empty() {
                char_len(&part)
            } else {
                char_len(&current) + 1 + char_len(&part)
            };
            if joined_len > max_chars && !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&part);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

fn split_word(word: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
