/// Splits a document into word-bounded chunks for a length-limited model.
///
/// Chunks are whitespace-delimited word runs, in document order; a word is
/// never split across two chunks. Every chunk except possibly the last
/// holds exactly `max_words` words, the trailing partial chunk is always
/// kept, and empty input yields no chunks.
pub fn chunk_words(text: &str, max_words: usize) -> Vec<String> {
    let max_words = max_words.max(1);
    let words: Vec<&str> = text.split_whitespace().collect();

    words
        .chunks(max_words)
        .map(|chunk| chunk.join(" "))
        .collect()
}
