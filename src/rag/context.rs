// Context block assembled from filtered passages
use serde::{Deserialize, Serialize};

use crate::generation::Passage;

const PASSAGE_SEPARATOR: &str = "\n\n";

/// Context assembly configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Character budget for the whole context block
    pub max_context_chars: usize,
    /// Prefix each passage with its source document
    pub include_sources: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_context_chars: 1600,
            include_sources: false,
        }
    }
}

/// Assembled context for prompt augmentation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembledContext {
    /// The formatted context text
    pub text: String,
    /// Number of passages included (the last one may be truncated)
    pub passage_count: usize,
    /// Length of `text` in characters
    pub char_count: usize,
    /// Source documents of the included passages, in order
    pub sources: Vec<String>,
}

/// Joins passages in rank order until the character budget is spent
pub struct ContextBuilder {
    config: ContextConfig,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            config: ContextConfig::default(),
        }
    }

    pub fn with_config(config: ContextConfig) -> Self {
        Self { config }
    }

    /// Build context from ranked passages.
    ///
    /// The first passage is always included, cut to the budget if needed;
    /// later passages are only added whole.
    pub fn build(&self, passages: &[Passage]) -> AssembledContext {
        let budget = self.config.max_context_chars;
        let mut text = String::new();
        let mut char_count = 0;
        let mut sources = Vec::new();

        for passage in passages {
            let formatted = self.format_passage(passage);
            let formatted_chars = formatted.chars().count();

            if sources.is_empty() {
                if formatted_chars > budget {
                    text = formatted.chars().take(budget).collect();
                    char_count = budget;
                    sources.push(passage.source_document.clone());
                    break;
                }
            } else if char_count + PASSAGE_SEPARATOR.len() + formatted_chars > budget {
                break;
            } else {
                text.push_str(PASSAGE_SEPARATOR);
                char_count += PASSAGE_SEPARATOR.len();
            }

            text.push_str(&formatted);
            char_count += formatted_chars;
            sources.push(passage.source_document.clone());
        }

        AssembledContext {
            passage_count: sources.len(),
            text,
            char_count,
            sources,
        }
    }

    fn format_passage(&self, passage: &Passage) -> String {
        if self.config.include_sources {
            format!("[{}] {}", passage.source_document, passage.text)
        } else {
            passage.text.clone()
        }
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(text: &str, source: &str) -> Passage {
        Passage {
            text: text.to_string(),
            score: 0.9,
            source_document: source.to_string(),
        }
    }

    #[test]
    fn test_build_empty() {
        let context = ContextBuilder::new().build(&[]);
        assert_eq!(context.passage_count, 0);
        assert!(context.text.is_empty());
    }

    #[test]
    fn test_build_joins_with_blank_line() {
        let passages = vec![passage("first", "a.pdf"), passage("second", "b.pdf")];
        let context = ContextBuilder::new().build(&passages);
        assert_eq!(context.text, "first\n\nsecond");
        assert_eq!(context.passage_count, 2);
        assert_eq!(context.char_count, context.text.chars().count());
        assert_eq!(context.sources, vec!["a.pdf", "b.pdf"]);
    }

    #[test]
    fn test_build_respects_budget() {
        let builder = ContextBuilder::with_config(ContextConfig {
            max_context_chars: 12,
            include_sources: false,
        });
        let passages = vec![passage("short", "a"), passage("much longer passage", "b")];

        let context = builder.build(&passages);
        assert_eq!(context.passage_count, 1);
        assert_eq!(context.text, "short");
    }

    #[test]
    fn test_first_passage_truncated_on_char_boundary() {
        let builder = ContextBuilder::with_config(ContextConfig {
            max_context_chars: 4,
            include_sources: false,
        });
        let context = builder.build(&[passage("éléphant", "a")]);
        assert_eq!(context.text, "élép");
        assert_eq!(context.char_count, 4);
        assert_eq!(context.passage_count, 1);
    }

    #[test]
    fn test_include_sources() {
        let builder = ContextBuilder::with_config(ContextConfig {
            include_sources: true,
            ..Default::default()
        });
        let context = builder.build(&[passage("Telnet", "a.pdf")]);
        assert_eq!(context.text, "[a.pdf] Telnet");
    }
}
