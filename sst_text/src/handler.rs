use std::collections::HashMap;

use crate::aspects::{AspectDetector, NullAspectDetector};
use crate::lexicon::{fold_key, SentimentDataHolder};
use crate::rating::SentimentValueData;
use crate::words::WordOccurrence;

/// Flags controlling how a document is scored. Part of the handler
/// snapshot, so changing them is a reload, never an in-place mutation.
#[derive(Clone, Copy, Default, Debug)]
pub struct SentimentContext {
    /// Treat invertor words as ordinary words.
    pub disable_invertors: bool,
    /// Ignore sentiment carried by aspect words themselves.
    pub disable_feature_sentiment: bool,
}

/// Plain word list with an optional numeric value per word.
#[derive(Clone, Default, Debug)]
pub struct WordsDictionary {
    table: HashMap<String, f64>,
}

impl WordsDictionary {
    /// Parses `word [value]` lines; a missing value defaults to 0.
    pub fn construct(contents: &str) -> Self {
        let mut table = HashMap::new();

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split_whitespace();
            let word = match fields.next() {
                Some(word) => fold_key(word),
                None => continue,
            };
            let value = fields
                .next()
                .and_then(|field| field.parse::<f64>().ok())
                .unwrap_or(0.0);

            table.insert(word, value);
        }

        WordsDictionary {
            table,
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.table.contains_key(&fold_key(word))
    }

    pub fn value(&self, word: &str) -> Option<f64> {
        self.table.get(&fold_key(word)).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Immutable bundle of every dictionary consulted while building a review:
/// the sentiment lexicon, the invertor/stopword/question/quantifier lists,
/// the aspect detector and the context flags.
///
/// Handlers are shared behind an `Arc` and swapped whole on reload, so
/// readers never observe a torn configuration.
pub struct WordsHandler {
    lexicon: SentimentDataHolder,
    invertors: WordsDictionary,
    stopwords: WordsDictionary,
    questions: WordsDictionary,
    quantifiers: WordsDictionary,
    aspects: Box<dyn AspectDetector>,
    context: SentimentContext,
}

impl WordsHandler {
    pub fn new(lexicon: SentimentDataHolder, context: SentimentContext) -> Self {
        WordsHandler {
            lexicon,
            invertors: WordsDictionary::construct(include_str!("resources/invertors.txt")),
            stopwords: WordsDictionary::construct(include_str!("resources/stopwords.txt")),
            questions: WordsDictionary::construct(include_str!("resources/questions.txt")),
            quantifiers: WordsDictionary::construct(include_str!("resources/quantifiers.txt")),
            aspects: Box::new(NullAspectDetector),
            context,
        }
    }

    pub fn with_aspects(mut self, aspects: Box<dyn AspectDetector>) -> Self {
        self.aspects = aspects;
        self
    }

    /// The built-in lexicon compiled into the crate.
    pub fn default_lexicon() -> SentimentDataHolder {
        SentimentDataHolder::parse(
            include_str!("resources/sentiments.txt"),
            crate::rating::SentimentSource::Lexicon,
        )
        .expect("embedded default lexicon is well formed")
    }

    pub fn context(&self) -> &SentimentContext {
        &self.context
    }

    pub fn lexicon(&self) -> &SentimentDataHolder {
        &self.lexicon
    }

    pub fn is_invertor(&self, word: &str) -> bool {
        !self.context.disable_invertors && self.invertors.contains(word)
    }

    pub fn is_stop(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub fn is_question(&self, word: &str) -> bool {
        self.questions.contains(word)
    }

    /// Multiplier a quantifier word applies to the sentiment it governs:
    /// a raw value of 0 maps to 1.5, a positive value `v` to `v + 0.5`,
    /// a negative one to `1 / (-v + 0.5)`.
    pub fn measure_quantifier(&self, word: &str) -> Option<f64> {
        let value = self.quantifiers.value(word)?;

        if value == 0.0 {
            Some(1.5)
        } else if value > 0.0 {
            Some(value + 0.5)
        } else {
            Some(1.0 / (-value + 0.5))
        }
    }

    pub fn measure_sentiment(&self, word: &WordOccurrence) -> Option<SentimentValueData> {
        self.lexicon.measure_sentiment(word)
    }

    pub fn is_aspect(&self, word: &WordOccurrence) -> bool {
        self.aspects.is_aspect(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler(context: SentimentContext) -> WordsHandler {
        WordsHandler::new(WordsHandler::default_lexicon(), context)
    }

    #[test]
    fn test_dictionary_parses_optional_values() {
        let dictionary = WordsDictionary::construct("very 1\nquite\n# comment\n\nbarely -2\n");
        assert_eq!(dictionary.len(), 3);
        assert_eq!(dictionary.value("very"), Some(1.0));
        assert_eq!(dictionary.value("quite"), Some(0.0));
        assert_eq!(dictionary.value("barely"), Some(-2.0));
        assert!(!dictionary.contains("missing"));
    }

    #[test]
    fn test_quantifier_mapping() {
        let handler = handler(SentimentContext::default());
        // quite is listed with value 0, very with 1, barely with -2
        assert_eq!(handler.measure_quantifier("quite"), Some(1.5));
        assert_eq!(handler.measure_quantifier("very"), Some(1.5));
        assert_eq!(handler.measure_quantifier("extremely"), Some(2.5));
        assert_eq!(handler.measure_quantifier("barely"), Some(1.0 / 2.5));
        assert_eq!(handler.measure_quantifier("teacher"), None);
    }

    #[test]
    fn test_disable_invertors_clears_flag() {
        let enabled = handler(SentimentContext::default());
        assert!(enabled.is_invertor("not"));

        let disabled = handler(SentimentContext {
            disable_invertors: true,
            ..SentimentContext::default()
        });
        assert!(!disabled.is_invertor("not"));
    }

    #[test]
    fn test_default_lexicon_loaded() {
        let lexicon = WordsHandler::default_lexicon();
        assert!(!lexicon.is_empty());
        assert!(lexicon.lookup("good").unwrap().value > 0.0);
        assert!(lexicon.lookup("terrible").unwrap().value < 0.0);
    }
}
