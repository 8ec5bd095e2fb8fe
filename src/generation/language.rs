// Query language detection and localized fallback messages
use serde::{Deserialize, Serialize};

/// Reply language for a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    French,
    English,
}

const FRENCH_MARKERS: &[&str] = &[
    "le", "la", "les", "des", "du", "une", "est", "sont", "et", "pour", "avec", "dans",
    "quoi", "qui", "que", "quel", "quelle", "comment", "pourquoi", "où", "bonjour",
    "merci", "entreprise", "c'est", "qu'est-ce",
];

const ENGLISH_MARKERS: &[&str] = &[
    "the", "is", "are", "and", "for", "with", "in", "what", "who", "which", "how",
    "why", "where", "hello", "thanks", "company", "does", "do", "tell", "about",
];

impl Language {
    /// Detect by stop-word vote; accented letters count for French.
    /// Ties go to French.
    pub fn detect(text: &str) -> Self {
        let lower = text.to_lowercase();
        let mut french = 0usize;
        let mut english = 0usize;

        for word in lower.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '-')) {
            if word.is_empty() {
                continue;
            }
            if FRENCH_MARKERS.contains(&word) {
                french += 1;
            }
            if ENGLISH_MARKERS.contains(&word) {
                english += 1;
            }
        }

        french += lower
            .chars()
            .filter(|c| matches!(c, 'é' | 'è' | 'ê' | 'à' | 'ç' | 'ù' | 'â' | 'î' | 'ô'))
            .count();

        if english > french {
            Language::English
        } else {
            Language::French
        }
    }

    /// ISO 639-1 tag
    pub fn code(&self) -> &'static str {
        match self {
            Language::French => "fr",
            Language::English => "en",
        }
    }

    /// Instruction appended to the system prompt
    pub fn reply_instruction(&self) -> &'static str {
        match self {
            Language::French => "Réponds en français.",
            Language::English => "Answer in English.",
        }
    }

    pub fn no_relevant_documents(&self) -> &'static str {
        match self {
            Language::French => {
                "Je n'ai pas trouvé de document suffisamment pertinent pour répondre."
            }
            Language::English => "No relevant documents found.",
        }
    }

    pub fn retrieval_failed(&self) -> &'static str {
        match self {
            Language::French => {
                "La recherche dans les documents a échoué. Veuillez réessayer plus tard."
            }
            Language::English => "Document search failed. Please try again later.",
        }
    }

    pub fn generation_failed(&self) -> &'static str {
        match self {
            Language::French => "Je n'ai pas pu générer de réponse pour le moment.",
            Language::English => "I could not generate an answer right now.",
        }
    }
}

/// Greetings, thanks and goodbyes answered without touching the documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SmallTalk {
    Greeting,
    Thanks,
    Goodbye,
}

/// Words allowed after a small-talk phrase ("merci beaucoup", "hello there")
const SMALL_TALK_TRAILING_WORDS: usize = 2;

const SMALL_TALK_PHRASES: &[(&str, SmallTalk, Language)] = &[
    ("bonjour", SmallTalk::Greeting, Language::French),
    ("bonsoir", SmallTalk::Greeting, Language::French),
    ("salut", SmallTalk::Greeting, Language::French),
    ("coucou", SmallTalk::Greeting, Language::French),
    ("hello", SmallTalk::Greeting, Language::English),
    ("hi", SmallTalk::Greeting, Language::English),
    ("hey", SmallTalk::Greeting, Language::English),
    ("good morning", SmallTalk::Greeting, Language::English),
    ("good evening", SmallTalk::Greeting, Language::English),
    ("merci", SmallTalk::Thanks, Language::French),
    ("thanks", SmallTalk::Thanks, Language::English),
    ("thank you", SmallTalk::Thanks, Language::English),
    ("au revoir", SmallTalk::Goodbye, Language::French),
    ("à bientôt", SmallTalk::Goodbye, Language::French),
    ("a bientot", SmallTalk::Goodbye, Language::French),
    ("bonne journée", SmallTalk::Goodbye, Language::French),
    ("ciao", SmallTalk::Goodbye, Language::French),
    ("bye", SmallTalk::Goodbye, Language::English),
    ("goodbye", SmallTalk::Goodbye, Language::English),
    ("see you", SmallTalk::Goodbye, Language::English),
];

impl SmallTalk {
    /// Recognize input that opens with a small-talk phrase and carries at
    /// most two more words. Punctuation is ignored.
    ///
    /// "Hello, what is Telnet?" stays a question.
    pub fn detect(text: &str) -> Option<(SmallTalk, Language)> {
        let cleaned: String = text
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
            .collect();
        let words: Vec<&str> = cleaned.split_whitespace().collect();
        if words.is_empty() {
            return None;
        }

        SMALL_TALK_PHRASES
            .iter()
            .filter(|(phrase, _, _)| {
                let phrase_words: Vec<&str> = phrase.split(' ').collect();
                words.len() >= phrase_words.len()
                    && words.len() - phrase_words.len() <= SMALL_TALK_TRAILING_WORDS
                    && words[..phrase_words.len()] == phrase_words[..]
            })
            .max_by_key(|(phrase, _, _)| phrase.len())
            .map(|(_, kind, language)| (*kind, *language))
    }

    pub fn reply(&self, language: Language) -> &'static str {
        match (self, language) {
            (SmallTalk::Greeting, Language::French) => {
                "Bonjour ! Posez-moi une question sur vos documents."
            }
            (SmallTalk::Greeting, Language::English) => {
                "Hello! Ask me a question about your documents."
            }
            (SmallTalk::Thanks, Language::French) => "Avec plaisir ! Une autre question ?",
            (SmallTalk::Thanks, Language::English) => "You're welcome! Anything else?",
            (SmallTalk::Goodbye, Language::French) => "Au revoir et à bientôt !",
            (SmallTalk::Goodbye, Language::English) => "Goodbye, see you soon!",
        }
    }

    /// Goodbyes end an interactive session
    pub fn ends_conversation(&self) -> bool {
        matches!(self, SmallTalk::Goodbye)
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::French
    }
}
