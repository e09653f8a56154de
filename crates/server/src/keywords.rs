use speechcheck_common::DEFAULT_KEYWORD_PHRASES;

/// Counts literal phrase occurrences in a transcription
///
/// Matching is case-sensitive and non-overlapping, scanning left to right,
/// and the per-phrase counts are summed.
#[derive(Debug, Clone)]
pub struct KeywordCounter {
    phrases: Vec<String>,
}

impl KeywordCounter {
    /// Create counter for the given phrases (empty phrases are ignored)
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    /// Total occurrences of all phrases in `text`
    pub fn count(&self, text: &str) -> usize {
        self.phrases
            .iter()
            .map(|phrase| text.matches(phrase.as_str()).count())
            .sum()
    }

    /// Configured phrases
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

impl Default for KeywordCounter {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORD_PHRASES.iter().copied())
    }
}
