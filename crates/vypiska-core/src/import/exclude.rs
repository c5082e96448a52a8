//! Transfer/top-up exclusion heuristic
//!
//! Card-to-card transfers, account top-ups, and incoming credits show up in
//! statement exports alongside real purchases. This filter drops them by
//! keyword before a record is created. It is advisory: a transfer described
//! in words the list does not know will still be imported.

/// Keyword filter over resolved category labels
///
/// Keywords are matched as lower-cased substrings. The vocabulary is
/// injectable so a new bank or locale extends the list without code changes.
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    keywords: Vec<String>,
}

impl Default for ExclusionFilter {
    /// Vocabulary of the currently supported exports: transfers, top-ups,
    /// and incoming credits
    fn default() -> Self {
        Self::new(["перевод", "пополнен", "зачислен"])
    }
}

impl ExclusionFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        }
    }

    /// Should a transaction with this category label be dropped as a
    /// non-expense?
    pub fn is_excluded(&self, category: &str) -> bool {
        let lowered = category.to_lowercase();
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}
