use std::error;
use std::fmt;

use crate::handler::WordsHandler;
use crate::lexicon::fold_key;
use crate::pos::PosTag;
use crate::rating::SentimentValueData;

/// Mutable relationship record of one word occurrence. All links are
/// indices into the owning review's arena, so resetting a document is a
/// matter of dropping indices rather than walking a cycle.
#[derive(Clone, Default, Debug)]
pub struct Relationship {
    /// Governing word: the head of a noun compound, or the sentiment word
    /// an invertor or quantifier attaches to.
    pub parent: Option<usize>,
    /// Aspect this word's sentiment is attributed to.
    pub aspect: Option<usize>,
    /// An active invertor governs this word.
    pub inverted: bool,
    /// Multiplier contributed by a governing quantifier.
    pub quantifier: Option<f64>,
    /// Sentiment resolved for this occurrence, after negation and scaling.
    pub sentiment: Option<SentimentValueData>,
    /// For aspect words: sentiment-bearing occurrences attributed to them.
    pub governed: Vec<usize>,
}

impl Relationship {
    pub fn reset(&mut self) {
        *self = Relationship::default();
    }
}

/// One word of a parsed document. The text, stem and POS tag are fixed at
/// creation; the derived dictionary flags are computed once from the
/// handler; only the relationship record is mutable.
#[derive(Clone, Debug)]
pub struct WordOccurrence {
    text: String,
    stemmed: String,
    pos: PosTag,
    is_sentiment: bool,
    is_feature: bool,
    is_invertor: bool,
    is_question: bool,
    is_stopword: bool,
    quant_value: Option<f64>,
    relationship: Relationship,
}

impl WordOccurrence {
    pub fn create(
        handler: &WordsHandler,
        text: &str,
        stemmed: &str,
        pos: PosTag,
    ) -> Result<Self, WordError> {
        if text.is_empty() {
            return Err(WordError::EmptyText);
        }
        if pos.is_group() {
            return Err(WordError::GroupTag(pos));
        }

        let text = fold_key(text);
        let stemmed = match stemmed.is_empty() {
            true => text.clone(),
            false => fold_key(stemmed),
        };

        let mut word = WordOccurrence {
            text,
            stemmed,
            pos,
            is_sentiment: false,
            is_feature: false,
            is_invertor: false,
            is_question: false,
            is_stopword: false,
            quant_value: None,
            relationship: Relationship::default(),
        };

        word.is_stopword = handler.is_stop(word.text());
        word.is_invertor = handler.is_invertor(word.text());
        word.is_question = handler.is_question(word.text());
        word.quant_value = handler.measure_quantifier(word.text());
        word.is_sentiment = handler.measure_sentiment(&word).is_some();
        word.is_feature = handler.is_aspect(&word);

        Ok(word)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn stemmed(&self) -> &str {
        &self.stemmed
    }

    pub fn pos(&self) -> &PosTag {
        &self.pos
    }

    pub fn is_sentiment(&self) -> bool {
        self.is_sentiment
    }

    pub fn is_feature(&self) -> bool {
        self.is_feature
    }

    pub fn is_invertor(&self) -> bool {
        self.is_invertor
    }

    pub fn is_question(&self) -> bool {
        self.is_question
    }

    pub fn is_stopword(&self) -> bool {
        self.is_stopword
    }

    pub fn quant_value(&self) -> Option<f64> {
        self.quant_value
    }

    pub fn relationship(&self) -> &Relationship {
        &self.relationship
    }

    pub fn relationship_mut(&mut self) -> &mut Relationship {
        &mut self.relationship
    }

    pub fn reset(&mut self) {
        self.relationship.reset();
    }
}

impl fmt::Display for WordOccurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.relationship.sentiment.as_ref() {
            Some(sentiment) => {
                write!(f, "[{}] [{:?}] [sentiment: {}]", self.text, self.pos, sentiment.value)
            },
            None => write!(f, "[{}] [{:?}]", self.text, self.pos),
        }
    }
}

#[derive(Debug)]
pub enum WordError {
    EmptyText,
    GroupTag(PosTag),
}

impl fmt::Display for WordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyText => write!(f, "word text cannot be empty"),
            Self::GroupTag(pos) => write!(f, "a word cannot carry the group tag {:?}", pos),
        }
    }
}

impl error::Error for WordError {}
