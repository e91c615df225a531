use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use unidecode::unidecode;

use crate::pos::PosTag;
use crate::splitter::{
    ParseError, ParseRequest, ParsedDocument, ParsedSentence, ParsedWord, SplitterFactory,
    TextSplitter,
};

/// Deterministic fallback annotation backend: a regex tokenizer with a
/// suffix stemmer and crude tag guessing. Real deployments plug a proper
/// tagger in through the `TextSplitter` trait; this one keeps the pool,
/// the binary and the tests self-contained.
pub struct SimpleTextSplitter;

impl SimpleTextSplitter {
    pub fn new() -> Self {
        SimpleTextSplitter
    }

    /// Parses the text synchronously. Identical input always yields an
    /// identical document.
    pub fn parse_text(text: &str, date: Option<DateTime<Utc>>) -> ParsedDocument {
        lazy_static! {
            static ref TOKEN_RE: Regex = Regex::new(r"[A-Za-z']+|[.!?]").unwrap();
        }

        let folded = unidecode(text);
        let mut sentences = Vec::new();
        let mut words = Vec::new();

        for token in TOKEN_RE.find_iter(&folded) {
            let token = token.as_str();

            if matches!(token, "." | "!" | "?") {
                if !words.is_empty() {
                    sentences.push(ParsedSentence {
                        words: std::mem::take(&mut words),
                    });
                }
                continue;
            }

            let text = token.trim_matches('\'').to_lowercase();
            if text.is_empty() {
                continue;
            }

            let stemmed = stem(&text);
            let tag = guess_tag(&text);
            words.push(ParsedWord {
                text,
                stemmed,
                tag,
            });
        }

        if !words.is_empty() {
            sentences.push(ParsedSentence {
                words,
            });
        }

        ParsedDocument {
            text: text.to_owned(),
            date,
            sentences,
        }
    }
}

impl Default for SimpleTextSplitter {
    fn default() -> Self {
        SimpleTextSplitter::new()
    }
}

#[async_trait]
impl TextSplitter for SimpleTextSplitter {
    async fn process(&mut self, request: &ParseRequest) -> Result<ParsedDocument, ParseError> {
        Ok(SimpleTextSplitter::parse_text(&request.text, request.date))
    }
}

pub struct SimpleSplitterFactory;

impl SplitterFactory for SimpleSplitterFactory {
    fn construct_single(&self) -> Box<dyn TextSplitter> {
        Box::new(SimpleTextSplitter::new())
    }
}

/// Strips common inflection suffixes. Not a full stemmer; enough to line
/// tokens up with lexicon stems.
fn stem(word: &str) -> String {
    if let Some(base) = word.strip_suffix("'s") {
        return base.to_owned();
    }

    if word.len() > 4 {
        if let Some(base) = word.strip_suffix("ies") {
            return format!("{}y", base);
        }
        if let Some(base) = word.strip_suffix("sses") {
            return format!("{}ss", base);
        }
    }

    if word.len() > 5 {
        if let Some(base) = word.strip_suffix("ing") {
            return base.to_owned();
        }
    }

    if word.len() > 4 {
        if let Some(base) = word.strip_suffix("ed") {
            return base.to_owned();
        }
    }

    if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") {
        return word[..word.len() - 1].to_owned();
    }

    word.to_owned()
}

/// Rough tag guess from surface shape. Nouns are the default: the graph
/// only needs adverbs and verb forms separated out well enough for
/// modifier and compound detection.
fn guess_tag(word: &str) -> PosTag {
    if word.len() > 3 && word.ends_with("ly") {
        PosTag::RB
    } else if word.len() > 5 && word.ends_with("ing") {
        PosTag::VBG
    } else if word.len() > 4 && word.ends_with("ed") {
        PosTag::VBD
    } else if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        PosTag::NNS
    } else {
        PosTag::NN
    }
}
