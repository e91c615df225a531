use std::collections::HashMap;

use sst_text::rating::{RatingData, SentimentSource, SentimentValueData};
use sst_text::review::ParsedReview;

use crate::machine::MachineSentiment;
use crate::vector::{extract_cells, VectorCell, RATING_STARS};

/// Weight given to uncovered sentiment words when the model returns no
/// rating cell to derive one from.
const DEFAULT_FALLBACK_WEIGHT: f64 = 0.1;

/// Rating of one review after the machine-learned correction.
///
/// When the model returns an empty vector the raw lexicon rating is passed
/// through untouched, which is also how the null model takes effect.
pub struct RatingAdjustment {
    rating: RatingData,
    sentiments: HashMap<usize, SentimentValueData>,
}

impl RatingAdjustment {
    pub fn create(review: &ParsedReview, model: &dyn MachineSentiment) -> Self {
        let cells = extract_cells(review);
        let result = model.get_vector(&cells);

        if result.vector.is_empty() {
            return RatingAdjustment {
                rating: review.calculate_raw_rating(),
                sentiments: HashMap::new(),
            };
        }

        let mut bias = result.vector.rho;
        let mut sentiments = HashMap::new();
        let mut rating_cell: Option<&VectorCell> = None;

        for item in &result.vector.cells {
            if item.cell.name == RATING_STARS {
                rating_cell = Some(item);
            }

            match item.cell.item {
                Some(owner) => {
                    sentiments.insert(
                        owner,
                        SentimentValueData::with_source(item.calculated, SentimentSource::ModelCorrected),
                    );
                },
                None => bias += item.calculated,
            }
        }

        // Words the model did not cover keep a scaled-down version of
        // their lexicon weight. The scaling constants are contractual.
        let all = review.all_sentiments();
        let fallback_weight = match rating_cell {
            Some(cell) => cell.theta.abs() / all.len() as f64,
            None => DEFAULT_FALLBACK_WEIGHT,
        };

        for sentiment in &all {
            if !sentiments.contains_key(&sentiment.owner) {
                sentiments.insert(
                    sentiment.owner,
                    SentimentValueData::with_source(
                        sentiment.data.value * fallback_weight,
                        SentimentSource::FallbackCalculated,
                    ),
                );
            }
        }

        let mut accumulated = sentiments
            .values()
            .cloned()
            .collect::<Vec<SentimentValueData>>();

        if !accumulated.is_empty() {
            // One synthetic value for the bias term.
            accumulated.push(SentimentValueData::with_source(bias, SentimentSource::ModelCorrected));
        }

        let rating = RatingData::accumulate(accumulated.iter());

        if rating.is_positive() == Some(true) && result.probability < 0.5 {
            log::debug!(
                "sentiment mismatch with machine prediction: positive rating, probability {}",
                result.probability,
            );
        }

        RatingAdjustment {
            rating,
            sentiments,
        }
    }

    pub fn rating(&self) -> &RatingData {
        &self.rating
    }

    /// Corrected value for the word occurrence, if the correction touched it.
    pub fn sentiment(&self, owner: usize) -> Option<&SentimentValueData> {
        self.sentiments.get(&owner)
    }

    pub fn total_sentiments(&self) -> usize {
        self.sentiments.len()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use sst_text::handler::{SentimentContext, WordsHandler};
    use sst_text::review::ReviewBuilder;
    use sst_text::simple::SimpleTextSplitter;

    use super::*;
    use crate::machine::{LinearModel, NullMachineSentiment};

    fn review_for(text: &str) -> ParsedReview {
        let handler = WordsHandler::new(WordsHandler::default_lexicon(), SentimentContext::default());
        let document = SimpleTextSplitter::parse_text(text, None);
        ReviewBuilder::new(Arc::new(handler)).build(&document).unwrap()
    }

    fn word_index(review: &ParsedReview, text: &str) -> usize {
        review.items().position(|word| word.text() == text).unwrap()
    }

    #[test]
    fn test_null_model_passes_raw_rating_through() {
        let review = review_for("It is good.");
        let adjustment = RatingAdjustment::create(&review, &NullMachineSentiment);

        assert_eq!(adjustment.rating().raw_rating(), review.calculate_raw_rating().raw_rating());
        assert_eq!(adjustment.total_sentiments(), 0);
    }

    #[test]
    fn test_covered_words_are_model_corrected() {
        let review = review_for("It is good.");
        let good = word_index(&review, "good");

        let mut weights = HashMap::new();
        weights.insert("good".to_owned(), 2.0);
        let model = LinearModel::new(0.5, weights);

        let adjustment = RatingAdjustment::create(&review, &model);
        let corrected = adjustment.sentiment(good).unwrap();
        assert_eq!(corrected.value, 2.0);
        assert_eq!(corrected.source, SentimentSource::ModelCorrected);

        // 2.0 from the word plus the 0.5 bias, no negatives.
        assert_eq!(adjustment.rating().raw_rating(), Some(1.0));
        assert_eq!(adjustment.rating().star(), Some(5));
    }

    #[test]
    fn test_uncovered_words_fall_back_with_rating_cell() {
        let review = review_for("A good but boring film.");
        let good = word_index(&review, "good");
        let boring = word_index(&review, "boring");

        let mut weights = HashMap::new();
        weights.insert("good".to_owned(), 2.0);
        weights.insert(RATING_STARS.to_owned(), 0.4);
        let model = LinearModel::new(0.0, weights);

        let adjustment = RatingAdjustment::create(&review, &model);

        assert_eq!(
            adjustment.sentiment(good).unwrap().source,
            SentimentSource::ModelCorrected,
        );

        // |theta| / total sentiment words = 0.4 / 2
        let fallback = adjustment.sentiment(boring).unwrap();
        assert_eq!(fallback.source, SentimentSource::FallbackCalculated);
        assert!((fallback.value - (-1.0 * 0.2)).abs() < 1e-12);
    }

    #[test]
    fn test_uncovered_words_fall_back_with_default_weight() {
        let review = review_for("A good but boring film.");
        let boring = word_index(&review, "boring");

        let mut weights = HashMap::new();
        weights.insert("good".to_owned(), 2.0);
        let model = LinearModel::new(0.0, weights);

        let adjustment = RatingAdjustment::create(&review, &model);
        let fallback = adjustment.sentiment(boring).unwrap();
        assert!((fallback.value - (-1.0 * 0.1)).abs() < 1e-12);
    }

    #[test]
    fn test_unmatched_model_passes_raw_rating_through() {
        let review = review_for("It is boring.");

        let mut weights = HashMap::new();
        weights.insert("good".to_owned(), 2.0);
        let model = LinearModel::new(0.5, weights);

        let adjustment = RatingAdjustment::create(&review, &model);
        assert_eq!(adjustment.rating().raw_rating(), review.calculate_raw_rating().raw_rating());
        assert_eq!(adjustment.total_sentiments(), 0);
    }

    #[test]
    fn test_untied_cells_fold_into_bias() {
        let review = review_for("It is good.");
        let good = word_index(&review, "good");

        // Only the rating cell matches, so every word is uncovered and the
        // rating is carried by the bias plus fallbacks.
        let mut weights = HashMap::new();
        weights.insert(RATING_STARS.to_owned(), 0.4);
        let model = LinearModel::new(0.0, weights);

        let adjustment = RatingAdjustment::create(&review, &model);
        let fallback = adjustment.sentiment(good).unwrap();
        assert_eq!(fallback.source, SentimentSource::FallbackCalculated);
        assert!((fallback.value - 0.4).abs() < 1e-12);

        // fallback 0.4 plus bias cell 0.4 * 5 stars = 2.4 positive
        assert!((adjustment.rating().positive() - 2.4).abs() < 1e-12);
        assert_eq!(adjustment.rating().star(), Some(5));
    }
}
