use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::handler::{SentimentContext, WordsHandler};
use crate::pos::PosTag;
use crate::rating::{RatingData, SentimentValue, SentimentValueData};
use crate::splitter::ParsedDocument;
use crate::words::{WordError, WordOccurrence};

/// How far ahead an invertor or quantifier reaches for the sentiment word
/// it governs.
const MODIFIER_WINDOW: usize = 3;

/// How far away a sentiment word may sit from the aspect it is attributed
/// to, in either direction.
const ASPECT_WINDOW: usize = 4;

/// One scored document: an arena of word occurrences with their
/// relationships resolved, plus sentence boundaries into the arena.
///
/// Occurrences are created once per parsed document and discarded with it;
/// nothing here is shared across documents.
#[derive(Clone, Debug)]
pub struct ParsedReview {
    words: Vec<WordOccurrence>,
    sentences: Vec<(usize, usize)>,
    text: String,
    date: Option<DateTime<Utc>>,
}

impl ParsedReview {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word(&self, index: usize) -> &WordOccurrence {
        &self.words[index]
    }

    pub fn items(&self) -> impl Iterator<Item = &WordOccurrence> {
        self.words.iter()
    }

    /// Sentence boundaries as half-open index ranges into the arena.
    pub fn sentences(&self) -> &[(usize, usize)] {
        &self.sentences
    }

    /// Every resolved sentiment value together with its owning occurrence.
    pub fn all_sentiments(&self) -> Vec<SentimentValue> {
        self.words
            .iter()
            .enumerate()
            .filter_map(|(owner, word)| {
                word.relationship().sentiment.as_ref().map(|data| SentimentValue {
                    owner,
                    data: data.clone(),
                })
            })
            .collect()
    }

    /// Folds every resolved sentiment of the document into one rating.
    pub fn calculate_raw_rating(&self) -> RatingData {
        let sentiments = self.all_sentiments();
        RatingData::accumulate(sentiments.iter().map(|value| &value.data))
    }

    /// Drops every relationship while keeping word identities intact.
    pub fn reset(&mut self) {
        for word in &mut self.words {
            word.reset();
        }
    }
}

/// Builds `ParsedReview`s from parsed documents, resolving the word
/// relationship graph against one handler snapshot.
#[derive(Clone)]
pub struct ReviewBuilder {
    handler: Arc<WordsHandler>,
}

impl ReviewBuilder {
    pub fn new(handler: Arc<WordsHandler>) -> Self {
        ReviewBuilder {
            handler,
        }
    }

    pub fn handler(&self) -> &Arc<WordsHandler> {
        &self.handler
    }

    pub fn build(&self, document: &ParsedDocument) -> Result<ParsedReview, WordError> {
        let mut words = Vec::new();
        let mut sentences = Vec::new();

        for sentence in &document.sentences {
            let start = words.len();
            for parsed in &sentence.words {
                words.push(WordOccurrence::create(
                    &self.handler,
                    &parsed.text,
                    &parsed.stemmed,
                    parsed.tag.clone(),
                )?);
            }
            sentences.push((start, words.len()));
        }

        let mut review = ParsedReview {
            words,
            sentences,
            text: document.text.clone(),
            date: document.date,
        };

        let context = *self.handler.context();
        for (start, end) in review.sentences.clone() {
            link_noun_runs(&mut review.words, start, end);
            self.link_modifiers(&mut review.words, start, end);
            self.resolve_sentiments(&mut review.words, start, end, context);
            link_aspects(&mut review.words, start, end);
        }

        Ok(review)
    }

    /// Invertors and quantifiers attach to the nearest following sentiment
    /// word within the modifier window.
    fn link_modifiers(&self, words: &mut [WordOccurrence], start: usize, end: usize) {
        for index in start..end {
            let is_invertor = words[index].is_invertor();
            let quantifier = match words[index].is_invertor() {
                true => None,
                false => words[index].quant_value(),
            };

            if !is_invertor && quantifier.is_none() {
                continue;
            }

            let target = (index + 1..end)
                .take(MODIFIER_WINDOW)
                .find(|&next| words[next].is_sentiment() && !words[next].is_invertor());

            let target = match target {
                Some(target) => target,
                None => continue,
            };

            words[index].relationship_mut().parent = Some(target);
            if is_invertor {
                words[target].relationship_mut().inverted = true;
            } else if let Some(quantifier) = quantifier {
                words[target].relationship_mut().quantifier = Some(quantifier);
            }
        }
    }

    fn resolve_sentiments(
        &self,
        words: &mut [WordOccurrence],
        start: usize,
        end: usize,
        context: SentimentContext,
    ) {
        for index in start..end {
            let data = {
                let word = &words[index];
                if !word.is_sentiment() || word.is_invertor() {
                    continue;
                }
                if word.is_feature() && context.disable_feature_sentiment {
                    continue;
                }

                let base = match self.handler.measure_sentiment(word) {
                    Some(base) => base,
                    None => continue,
                };

                let mut value = base.value * word.relationship().quantifier.unwrap_or(1.0);
                if word.relationship().inverted {
                    value = -value;
                }

                SentimentValueData::with_source(value, base.source)
            };

            words[index].relationship_mut().sentiment = Some(data);
        }
    }
}

/// Adjacent non-stopword nouns form a compound whose head is the last
/// noun; a determiner or possessive pronoun directly before the run
/// attaches to the head as well.
fn link_noun_runs(words: &mut [WordOccurrence], start: usize, end: usize) {
    let in_run = |word: &WordOccurrence| {
        word.pos().is_noun()
            && !word.is_stopword()
            && !word.is_sentiment()
            && !word.is_invertor()
            && word.quant_value().is_none()
    };

    let mut index = start;
    while index < end {
        if !in_run(&words[index]) {
            index += 1;
            continue;
        }

        let run_start = index;
        while index < end && in_run(&words[index]) {
            index += 1;
        }

        let head = index - 1;
        if head == run_start {
            continue;
        }

        for member in run_start..head {
            words[member].relationship_mut().parent = Some(head);
        }

        if run_start > start {
            let before = run_start - 1;
            if matches!(words[before].pos(), PosTag::DT | PosTag::PRPS) {
                words[before].relationship_mut().parent = Some(head);
            }
        }
    }
}

/// Every resolved sentiment is attributed to the nearest aspect word in
/// the same sentence, if one sits within the aspect window.
fn link_aspects(words: &mut [WordOccurrence], start: usize, end: usize) {
    for index in start..end {
        if words[index].relationship().sentiment.is_none() {
            continue;
        }

        let aspect = (start..end)
            .filter(|&other| other != index && words[other].is_feature())
            .map(|other| (index.abs_diff(other), other))
            .filter(|&(distance, _)| distance <= ASPECT_WINDOW)
            .min();

        if let Some((_, aspect)) = aspect {
            words[index].relationship_mut().aspect = Some(aspect);
            words[aspect].relationship_mut().governed.push(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::aspects::DictionaryAspectDetector;
    use crate::lexicon::SentimentDataHolder;
    use crate::rating::SentimentSource;
    use crate::simple::SimpleTextSplitter;

    fn review_for(text: &str, handler: WordsHandler) -> ParsedReview {
        let document = SimpleTextSplitter::parse_text(text, None);
        ReviewBuilder::new(Arc::new(handler)).build(&document).unwrap()
    }

    fn default_handler(context: SentimentContext) -> WordsHandler {
        WordsHandler::new(WordsHandler::default_lexicon(), context)
    }

    #[test]
    fn test_negation_flips_sign() {
        let review = review_for("It is not good.", default_handler(SentimentContext::default()));
        let sentiments = review.all_sentiments();
        assert_eq!(sentiments.len(), 1);
        assert_eq!(sentiments[0].data.value, -1.0);
        assert_eq!(review.calculate_raw_rating().star(), Some(1));
    }

    #[test]
    fn test_disabled_invertors_keep_sign() {
        let context = SentimentContext {
            disable_invertors: true,
            ..SentimentContext::default()
        };
        let review = review_for("It is not good.", default_handler(context));
        let sentiments = review.all_sentiments();
        assert_eq!(sentiments.len(), 1);
        assert_eq!(sentiments[0].data.value, 1.0);
        assert_eq!(review.calculate_raw_rating().star(), Some(5));
    }

    #[test]
    fn test_invertor_word_with_lexicon_weight() {
        // "veto" is both an invertor and, in this lexicon, a sentiment
        // word. While invertors are active it only ever acts as a
        // modifier; once they are disabled its own weight applies.
        let mut lexicon = SentimentDataHolder::new();
        lexicon.set_value("veto", SentimentValueData::new(-2.0));

        let enabled = WordsHandler::new(lexicon.clone(), SentimentContext::default());
        let review = review_for("I Veto it", enabled);
        assert!(review.all_sentiments().is_empty());
        assert_eq!(review.calculate_raw_rating().star(), None);

        let disabled = WordsHandler::new(lexicon, SentimentContext {
            disable_invertors: true,
            ..SentimentContext::default()
        });
        let review = review_for("I Veto it", disabled);
        assert_eq!(review.all_sentiments().len(), 1);
        assert_eq!(review.calculate_raw_rating().star(), Some(1));
    }

    #[test]
    fn test_quantifier_scales_magnitude() {
        let review = review_for("It is very good.", default_handler(SentimentContext::default()));
        let sentiments = review.all_sentiments();
        assert_eq!(sentiments.len(), 1);
        assert_eq!(sentiments[0].data.value, 1.5);
    }

    #[test]
    fn test_negated_quantified_sentiment() {
        let review = review_for("It is not very good.", default_handler(SentimentContext::default()));
        let sentiments = review.all_sentiments();
        assert_eq!(sentiments.len(), 1);
        assert_eq!(sentiments[0].data.value, -1.5);
    }

    #[test]
    fn test_aspect_attribution() {
        let detector = DictionaryAspectDetector::from_words(["battery"]);
        let handler = default_handler(SentimentContext::default())
            .with_aspects(Box::new(detector));
        let review = review_for("The battery is good.", handler);

        let battery = review
            .items()
            .position(|word| word.text() == "battery")
            .unwrap();
        let good = review
            .items()
            .position(|word| word.text() == "good")
            .unwrap();

        assert!(review.word(battery).is_feature());
        assert_eq!(review.word(battery).relationship().governed, vec![good]);
        assert_eq!(review.word(good).relationship().aspect, Some(battery));
    }

    #[test]
    fn test_disable_feature_sentiment() {
        let mut lexicon = SentimentDataHolder::new();
        lexicon.set_value("battery", SentimentValueData::new(1.0));

        let detector = DictionaryAspectDetector::from_words(["battery"]);
        let handler = WordsHandler::new(lexicon, SentimentContext {
            disable_feature_sentiment: true,
            ..SentimentContext::default()
        })
        .with_aspects(Box::new(detector));

        let review = review_for("The battery works", handler);
        assert!(review.all_sentiments().is_empty());
    }

    #[test]
    fn test_sentiment_source_follows_lexicon() {
        let mut lexicon = SentimentDataHolder::new();
        lexicon.set_value(
            "good",
            SentimentValueData::with_source(1.0, SentimentSource::Adjusted),
        );
        let review = review_for("good", WordsHandler::new(lexicon, SentimentContext::default()));
        assert_eq!(review.all_sentiments()[0].data.source, SentimentSource::Adjusted);
    }

    #[test]
    fn test_reset_drops_relationships() {
        let mut review = review_for("It is not good.", default_handler(SentimentContext::default()));
        assert_eq!(review.all_sentiments().len(), 1);
        review.reset();
        assert!(review.all_sentiments().is_empty());
        assert_eq!(review.calculate_raw_rating().raw_rating(), None);
    }

    #[test]
    fn test_empty_document_rates_absent() {
        let review = review_for("", default_handler(SentimentContext::default()));
        assert!(review.is_empty());
        assert_eq!(review.calculate_raw_rating().raw_rating(), None);
    }
}
