pub mod aspects;
pub mod handler;
pub mod lexicon;
pub mod phrases;
pub mod pos;
pub mod rating;
pub mod review;
pub mod simple;
pub mod splitter;
pub mod words;

pub use handler::{SentimentContext, WordsHandler};
pub use lexicon::{LexiconLoader, SentimentDataHolder};
pub use phrases::{Phrase, PhraseBuilder};
pub use pos::PosTag;
pub use rating::{RatingData, SentimentSource, SentimentValue, SentimentValueData};
pub use review::{ParsedReview, ReviewBuilder};
pub use splitter::{ParseRequest, ParsedDocument, QueueTextSplitter};
pub use words::WordOccurrence;
