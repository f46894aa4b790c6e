use serde::{Deserialize, Serialize};

/// Configuration surface honored by the matching core.
///
/// Threaded explicitly into each component constructor; there is no
/// process-wide mutable configuration cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Record keywords in their authored form (regex notation included)
    /// instead of the stripped human-readable form.
    pub keep_regex_notation: bool,
    /// Capture a bounded context window around each hit into
    /// `matched_text_context`.
    pub append_full_text: bool,
    /// Context window size in characters, split around the matched span.
    /// Texts at most this long are captured whole.
    pub context_window: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            keep_regex_notation: true,
            append_full_text: false,
            context_window: 120,
        }
    }
}

impl ExtractionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plain_keywords(mut self) -> Self {
        self.keep_regex_notation = false;
        self
    }

    pub fn with_full_text(mut self) -> Self {
        self.append_full_text = true;
        self
    }

    pub fn with_context_window(mut self, chars: usize) -> Self {
        self.context_window = chars;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExtractionConfig::default();
        assert!(config.keep_regex_notation);
        assert!(!config.append_full_text);
        assert_eq!(config.context_window, 120);
    }

    #[test]
    fn test_builder_style_overrides() {
        let config = ExtractionConfig::new()
            .with_plain_keywords()
            .with_full_text()
            .with_context_window(80);
        assert!(!config.keep_regex_notation);
        assert!(config.append_full_text);
        assert_eq!(config.context_window, 80);
    }
}
