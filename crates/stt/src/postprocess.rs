use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Bracketed annotations recognizers emit instead of words
/// (e.g. `[BLANK_AUDIO]`, `(music)`, `*silence*`)
fn annotation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\[[^\]]*\]|\([^)]*\)|\*[^*]*\*").expect("annotation pattern is valid")
    })
}

/// Strip non-speech annotations and collapse whitespace
pub fn strip_annotations(text: &str) -> String {
    let stripped = annotation_pattern().replace_all(text, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether recognizer output carries no spoken words
pub fn is_non_speech(text: &str) -> bool {
    let stripped = strip_annotations(text);

    // Punctuation-only output ("...", "-") is what silence decodes to
    let has_words = stripped.chars().any(char::is_alphanumeric);
    if !has_words {
        debug!("Recognizer output has no speech: {:?}", text);
    }

    !has_words
}
