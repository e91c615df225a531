use serde::Serialize;

use crate::review::ParsedReview;

/// Ordered group of word occurrences sharing one governing relationship,
/// snapshotted as owned text so it can outlive the review it came from.
/// Phrase identity is the joined text.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Phrase {
    text: String,
    words: Vec<String>,
}

impl Phrase {
    fn from_words(words: Vec<String>) -> Self {
        Phrase {
            text: words.join(" "),
            words,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Extracts phrases from a review's relationship graph. Walking is pure:
/// repeated calls over the same review yield identical phrases.
pub struct PhraseBuilder;

impl PhraseBuilder {
    /// Phrases reachable from the given occurrence: the occurrence's own
    /// governed group if it has one, then the group of each ancestor along
    /// the parent chain.
    pub fn get_phrases(review: &ParsedReview, index: usize) -> Vec<Phrase> {
        let mut phrases = Vec::new();
        let mut current = Some(index);

        while let Some(head) = current {
            if let Some(phrase) = Self::phrase_at(review, head) {
                phrases.push(phrase);
            }
            // Parent links always point forward in the arena, so the chain
            // cannot cycle.
            current = review.word(head).relationship().parent;
        }

        phrases
    }

    /// Every phrase in the review, in arena order of the head word.
    pub fn all_phrases(review: &ParsedReview) -> Vec<Phrase> {
        (0..review.len())
            .filter_map(|head| Self::phrase_at(review, head))
            .collect()
    }

    /// The phrase headed by the given occurrence: its governed members plus
    /// itself, in document order, stopwords dropped. Single words do not
    /// form a phrase.
    fn phrase_at(review: &ParsedReview, head: usize) -> Option<Phrase> {
        let mut members = (0..review.len())
            .filter(|&member| review.word(member).relationship().parent == Some(head))
            .collect::<Vec<usize>>();

        if members.is_empty() {
            return None;
        }

        members.push(head);
        members.sort_unstable();

        let words = members
            .into_iter()
            .map(|member| review.word(member))
            .filter(|word| !word.is_stopword())
            .map(|word| word.text().to_owned())
            .collect::<Vec<String>>();

        match words.len() {
            0 | 1 => None,
            _ => Some(Phrase::from_words(words)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::handler::{SentimentContext, WordsHandler};
    use crate::review::ReviewBuilder;
    use crate::simple::SimpleTextSplitter;

    fn review_for(text: &str) -> crate::review::ParsedReview {
        let handler = WordsHandler::new(WordsHandler::default_lexicon(), SentimentContext::default());
        let document = SimpleTextSplitter::parse_text(text, None);
        ReviewBuilder::new(Arc::new(handler)).build(&document).unwrap()
    }

    #[test]
    fn test_noun_compound_phrase() {
        let review = review_for("I like my school teacher.");
        let school = review
            .items()
            .position(|word| word.text() == "school")
            .unwrap();

        let phrases = PhraseBuilder::get_phrases(&review, school);
        assert_eq!(phrases.len(), 1);
        assert_eq!(phrases[0].text(), "school teacher");
        assert_eq!(phrases[0].len(), 2);
    }

    #[test]
    fn test_phrases_are_repeatable() {
        let review = review_for("If you enjoy professional basketball with nike shoes, that will be a miracle.");
        let first = PhraseBuilder::all_phrases(&review);
        let second = PhraseBuilder::all_phrases(&review);
        assert_eq!(first, second);
        assert!(first.iter().any(|phrase| phrase.text() == "professional basketball"));
        assert!(first.iter().any(|phrase| phrase.text() == "nike shoes"));
    }

    #[test]
    fn test_single_words_form_no_phrase() {
        let review = review_for("Good movie overall.");
        let phrases = PhraseBuilder::all_phrases(&review);
        for phrase in &phrases {
            assert!(phrase.len() >= 2);
        }
    }
}
