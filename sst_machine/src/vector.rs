use sst_text::lexicon::fold_key;
use sst_text::review::ParsedReview;

/// Name of the auxiliary cell carrying the lexicon star estimate.
pub const RATING_STARS: &str = "RATING_STARS";

/// A named numeric feature extracted from a review. Cells derived from a
/// specific word occurrence keep its arena index for attribution; the
/// auxiliary cells carry no back-reference.
#[derive(Clone, Debug)]
pub struct TextVectorCell {
    pub name: String,
    pub value: f64,
    pub item: Option<usize>,
}

impl TextVectorCell {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        TextVectorCell {
            name: name.into(),
            value,
            item: None,
        }
    }

    pub fn for_word(item: usize, name: impl Into<String>, value: f64) -> Self {
        TextVectorCell {
            name: name.into(),
            value,
            item: Some(item),
        }
    }
}

/// One weighted cell of a fitted vector.
#[derive(Clone, Debug)]
pub struct VectorCell {
    pub theta: f64,
    pub calculated: f64,
    pub cell: TextVectorCell,
}

/// Fitted vector returned by a model: the bias `rho` plus the weighted
/// cells. A zero-length vector means "no correction".
#[derive(Clone, Default, Debug)]
pub struct VectorData {
    pub rho: f64,
    pub cells: Vec<VectorCell>,
}

impl VectorData {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Extracts the feature cells of a review: one cell per resolved sentiment
/// word, named by its stem, plus the lexicon star estimate when the review
/// rates at all.
pub fn extract_cells(review: &ParsedReview) -> Vec<TextVectorCell> {
    let mut cells = review
        .all_sentiments()
        .into_iter()
        .map(|sentiment| {
            let stem = fold_key(review.word(sentiment.owner).stemmed());
            TextVectorCell::for_word(sentiment.owner, stem, sentiment.data.value)
        })
        .collect::<Vec<TextVectorCell>>();

    if let Some(stars) = review.calculate_raw_rating().stars_rating() {
        cells.push(TextVectorCell::new(RATING_STARS, stars));
    }

    cells
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sst_text::handler::{SentimentContext, WordsHandler};
    use sst_text::review::ReviewBuilder;
    use sst_text::simple::SimpleTextSplitter;

    use super::*;

    fn review_for(text: &str) -> ParsedReview {
        let handler = WordsHandler::new(WordsHandler::default_lexicon(), SentimentContext::default());
        let document = SimpleTextSplitter::parse_text(text, None);
        ReviewBuilder::new(Arc::new(handler)).build(&document).unwrap()
    }

    #[test]
    fn test_cells_cover_sentiments_and_stars() {
        let review = review_for("It is good.");
        let cells = extract_cells(&review);
        assert_eq!(cells.len(), 2);

        let good = cells.iter().find(|cell| cell.name == "good").unwrap();
        assert_eq!(good.value, 1.0);
        assert!(good.item.is_some());

        let stars = cells.iter().find(|cell| cell.name == RATING_STARS).unwrap();
        assert_eq!(stars.value, 5.0);
        assert!(stars.item.is_none());
    }

    #[test]
    fn test_no_sentiments_means_no_cells() {
        let review = review_for("The weather station.");
        assert!(extract_cells(&review).is_empty());
    }
}
