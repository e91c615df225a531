use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde::Serialize;

use crate::lexicon::fold_key;
use crate::phrases::Phrase;
use crate::rating::{RatingData, SentimentValueData};
use crate::review::ParsedReview;
use crate::words::WordOccurrence;

/// Decides whether a word occurrence names an aspect that sentiment can be
/// attributed to.
pub trait AspectDetector: Send + Sync {
    fn is_aspect(&self, word: &WordOccurrence) -> bool;
}

/// Default detector: nothing is an aspect.
pub struct NullAspectDetector;

impl AspectDetector for NullAspectDetector {
    fn is_aspect(&self, _word: &WordOccurrence) -> bool {
        false
    }
}

/// Detector backed by a plain word list; a word is an aspect if its text
/// or stem is listed.
pub struct DictionaryAspectDetector {
    words: HashSet<String>,
}

impl DictionaryAspectDetector {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        DictionaryAspectDetector {
            words: words
                .into_iter()
                .map(|word| fold_key(word.as_ref()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl AspectDetector for DictionaryAspectDetector {
    fn is_aspect(&self, word: &WordOccurrence) -> bool {
        self.words.contains(word.text()) || self.words.contains(word.stemmed())
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct AspectSentimentItem {
    pub text: String,
    pub times: usize,
    pub sentiment: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct AspectSentimentData {
    pub total_reviews: usize,
    pub records: Vec<AspectSentimentItem>,
}

/// Corpus-level accumulator of sentiment by aspect, safe under arbitrary
/// concurrent `process` calls. A single coarse lock guards the table;
/// contention is bounded by aspect cardinality, not request volume.
#[derive(Default)]
pub struct AspectSentimentTracker {
    table: Mutex<HashMap<String, Vec<SentimentValueData>>>,
    total_reviews: AtomicUsize,
}

impl AspectSentimentTracker {
    pub fn new() -> Self {
        AspectSentimentTracker::default()
    }

    pub fn total_reviews(&self) -> usize {
        self.total_reviews.load(Ordering::SeqCst)
    }

    pub fn process(&self, review: &ParsedReview) {
        log::debug!("process review");
        self.total_reviews.fetch_add(1, Ordering::SeqCst);

        for word in review.items().filter(|word| word.is_feature()) {
            let sentiments = word
                .relationship()
                .governed
                .iter()
                .filter_map(|&governed| review.word(governed).relationship().sentiment.clone())
                .collect::<Vec<SentimentValueData>>();

            let mut table = self.table.lock().unwrap();
            table
                .entry(fold_key(word.stemmed()))
                .or_default()
                .extend(sentiments);
        }
    }

    /// Stable snapshot report: aspects sorted by key length descending,
    /// zero-sentiment aspects dropped. The table lock is only held for the
    /// clone, never for the rating computation.
    pub fn get_results(&self) -> AspectSentimentData {
        let total_reviews = self.total_reviews();
        let snapshot = {
            let table = self.table.lock().unwrap();
            table
                .iter()
                .map(|(key, values)| (key.clone(), values.clone()))
                .collect::<Vec<(String, Vec<SentimentValueData>)>>()
        };

        let mut records = snapshot
            .into_iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(text, values)| AspectSentimentItem {
                times: values.len(),
                sentiment: RatingData::accumulate(values.iter())
                    .raw_rating()
                    .unwrap_or(0.0),
                text,
            })
            .collect::<Vec<AspectSentimentItem>>();

        records.sort_by(|left, right| {
            right
                .text
                .len()
                .cmp(&left.text.len())
                .then_with(|| left.text.cmp(&right.text))
        });

        AspectSentimentData {
            total_reviews,
            records,
        }
    }
}

/// How many phrases a `get_phrases` report returns at most.
const PHRASE_REPORT_LIMIT: usize = 10;

/// Corpus-level accumulator of word and phrase occurrences.
#[derive(Default)]
pub struct OccurrenceTracker {
    words: Mutex<HashMap<String, String>>,
    phrases: Mutex<HashMap<String, (Phrase, usize)>>,
    total: AtomicUsize,
}

impl OccurrenceTracker {
    pub fn new() -> Self {
        OccurrenceTracker::default()
    }

    /// Total number of recorded word occurrences, repeats included.
    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn add_word(&self, word: &WordOccurrence) {
        self.total.fetch_add(1, Ordering::SeqCst);
        let mut words = self.words.lock().unwrap();
        words.insert(fold_key(word.text()), word.text().to_owned());
    }

    pub fn words(&self) -> Vec<String> {
        let words = self.words.lock().unwrap();
        words.values().cloned().collect()
    }

    pub fn add_phrase(&self, phrase: &Phrase) {
        let mut phrases = self.phrases.lock().unwrap();
        let entry = phrases
            .entry(fold_key(phrase.text()))
            .or_insert_with(|| (phrase.clone(), 0));
        entry.1 += 1;
    }

    /// Phrases recorded at least `cutoff` times, most frequent first,
    /// capped at ten results. Ties break alphabetically so snapshots are
    /// stable.
    pub fn get_phrases(&self, cutoff: usize) -> Vec<Phrase> {
        let snapshot = {
            let phrases = self.phrases.lock().unwrap();
            phrases.values().cloned().collect::<Vec<(Phrase, usize)>>()
        };

        let mut frequent = snapshot
            .into_iter()
            .filter(|(_, count)| *count >= cutoff)
            .collect::<Vec<(Phrase, usize)>>();

        frequent.sort_by(|left, right| {
            right
                .1
                .cmp(&left.1)
                .then_with(|| left.0.text().cmp(right.0.text()))
        });

        frequent
            .into_iter()
            .take(PHRASE_REPORT_LIMIT)
            .map(|(phrase, _)| phrase)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::handler::{SentimentContext, WordsHandler};
    use crate::phrases::PhraseBuilder;
    use crate::review::ReviewBuilder;
    use crate::simple::SimpleTextSplitter;

    fn review_for(text: &str, aspects: &[&str]) -> ParsedReview {
        let handler = WordsHandler::new(WordsHandler::default_lexicon(), SentimentContext::default())
            .with_aspects(Box::new(DictionaryAspectDetector::from_words(aspects.iter().copied())));
        let document = SimpleTextSplitter::parse_text(text, None);
        ReviewBuilder::new(Arc::new(handler)).build(&document).unwrap()
    }

    #[test]
    fn test_null_detector_finds_nothing() {
        let review = review_for("The battery is good.", &[]);
        assert!(review.items().all(|word| !word.is_feature()));
    }

    #[test]
    fn test_aspect_tracker_counts_reviews_and_sentiments() {
        let tracker = AspectSentimentTracker::new();

        tracker.process(&review_for("The battery is good.", &["battery", "screen"]));
        tracker.process(&review_for("The battery is terrible.", &["battery", "screen"]));
        tracker.process(&review_for("The screen is fine.", &["battery", "screen"]));

        let results = tracker.get_results();
        assert_eq!(results.total_reviews, 3);
        assert_eq!(results.records.len(), 2);

        let battery = results
            .records
            .iter()
            .find(|record| record.text == "battery")
            .unwrap();
        assert_eq!(battery.times, 2);

        let screen = results
            .records
            .iter()
            .find(|record| record.text == "screen")
            .unwrap();
        assert_eq!(screen.times, 1);
        assert!(screen.sentiment > 0.0);
    }

    #[test]
    fn test_aspect_without_sentiment_is_dropped() {
        let tracker = AspectSentimentTracker::new();
        tracker.process(&review_for("The battery exists.", &["battery"]));

        let results = tracker.get_results();
        assert_eq!(results.total_reviews, 1);
        assert!(results.records.is_empty());
    }

    #[test]
    fn test_results_sorted_by_key_length() {
        let tracker = AspectSentimentTracker::new();
        tracker.process(&review_for(
            "The battery is good and the screen resolution is good.",
            &["battery", "resolution"],
        ));

        let results = tracker.get_results();
        let keys = results
            .records
            .iter()
            .map(|record| record.text.as_str())
            .collect::<Vec<&str>>();
        assert_eq!(keys, vec!["resolution", "battery"]);
    }

    #[test]
    fn test_concurrent_processing() {
        let tracker = Arc::new(AspectSentimentTracker::new());
        let review = Arc::new(review_for("The battery is good.", &["battery"]));

        let handles = (0..8)
            .map(|_| {
                let tracker = tracker.clone();
                let review = review.clone();
                std::thread::spawn(move || tracker.process(&review))
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.join().unwrap();
        }

        let results = tracker.get_results();
        assert_eq!(results.total_reviews, 8);
        assert_eq!(results.records.len(), 1);
        assert_eq!(results.records[0].times, 8);
    }

    #[test]
    fn test_occurrence_tracker_phrases() {
        let tracker = OccurrenceTracker::new();
        let review = review_for("I like my school teacher.", &[]);

        for word in review.items().filter(|word| !word.is_stopword()) {
            tracker.add_word(word);
        }
        assert_eq!(tracker.total(), 3);

        let phrases = PhraseBuilder::all_phrases(&review);
        assert_eq!(phrases.len(), 1);

        tracker.add_phrase(&phrases[0]);
        tracker.add_phrase(&phrases[0]);

        assert!(tracker.get_phrases(3).is_empty());
        let frequent = tracker.get_phrases(2);
        assert_eq!(frequent.len(), 1);
        assert_eq!(frequent[0].text(), "school teacher");
    }

    #[test]
    fn test_phrase_report_is_capped() {
        let tracker = OccurrenceTracker::new();
        let review = review_for(
            "alpha one. beta two. gamma three. delta four. epsilon five. zeta six. \
             eta seven. theta eight. iota nine. kappa ten. lambda eleven. mu twelve.",
            &[],
        );

        let phrases = PhraseBuilder::all_phrases(&review);
        assert!(phrases.len() > 10);
        for phrase in &phrases {
            tracker.add_phrase(phrase);
        }

        assert_eq!(tracker.get_phrases(1).len(), 10);
    }
}
