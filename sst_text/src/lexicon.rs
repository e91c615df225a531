use std::collections::HashMap;
use std::error;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use unidecode::unidecode;

use crate::rating::{SentimentSource, SentimentValueData};
use crate::words::WordOccurrence;

/// Folds a dictionary key to lowercase ASCII so lookups are case and
/// accent insensitive.
pub fn fold_key(word: &str) -> String {
    unidecode(word).to_lowercase()
}

/// Case-insensitive store of word sentiment weights with provenance.
#[derive(Clone, Default, Debug)]
pub struct SentimentDataHolder {
    table: HashMap<String, SentimentValueData>,
}

impl SentimentDataHolder {
    pub fn new() -> Self {
        SentimentDataHolder::default()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Replaces any previous weight for the word; adjustments are not
    /// accumulated on top of each other.
    pub fn set_value(&mut self, word: &str, data: SentimentValueData) {
        self.table.insert(fold_key(word), data);
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn lookup(&self, word: &str) -> Option<&SentimentValueData> {
        self.table.get(&fold_key(word))
    }

    /// Weight carried by a word occurrence: the surface text is tried
    /// first, then the stem. Stopwords never carry sentiment.
    pub fn measure_sentiment(&self, word: &WordOccurrence) -> Option<SentimentValueData> {
        if word.is_stopword() {
            return None;
        }

        self.lookup(word.text())
            .or_else(|| self.lookup(word.stemmed()))
            .cloned()
    }

    /// Loads a lexicon file of `word weight` lines. Blank lines and lines
    /// starting with `#` are skipped.
    pub fn load<P>(path: P) -> Result<Self, LexiconError>
    where
        P: AsRef<Path>,
    {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents, SentimentSource::Lexicon)
    }

    pub(crate) fn parse(contents: &str, source: SentimentSource) -> Result<Self, LexiconError> {
        let mut holder = SentimentDataHolder::new();

        for (number, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split_whitespace();
            let word = fields
                .next()
                .ok_or_else(|| LexiconError::invalid_record(number + 1, line))?;
            let weight = fields
                .next()
                .and_then(|field| field.parse::<f64>().ok())
                .ok_or_else(|| LexiconError::invalid_record(number + 1, line))?;

            holder.set_value(word, SentimentValueData::with_source(weight, source));
        }

        Ok(holder)
    }

    /// Applies a `word,label,weight` adjustment file, replacing the weight
    /// of every matched word. Returns the number of applied rows.
    pub fn adjust_weights<P>(&mut self, path: P) -> Result<usize, LexiconError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(LexiconError::EmptyPath);
        }

        let contents = fs::read_to_string(path)?;
        let mut applied = 0;

        for (number, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields = line.split(',').collect::<Vec<&str>>();
            // The middle field is the product category label; selection by
            // category happens upstream of this holder.
            let (word, weight) = match fields.as_slice() {
                [word, _label, weight] => (word.trim(), weight.trim()),
                _ => return Err(LexiconError::invalid_record(number + 1, line)),
            };

            let weight = weight
                .parse::<f64>()
                .map_err(|_| LexiconError::invalid_record(number + 1, line))?;

            self.set_value(word, SentimentValueData::with_source(weight, SentimentSource::Adjusted));
            applied += 1;
        }

        log::debug!("applied {} weight adjustments", applied);
        Ok(applied)
    }
}

/// Loads a directory of lexicon files into named holders; the file stem is
/// the lexicon name.
#[derive(Default, Debug)]
pub struct LexiconLoader {
    table: Option<HashMap<String, SentimentDataHolder>>,
}

impl LexiconLoader {
    pub fn new() -> Self {
        LexiconLoader::default()
    }

    pub fn load<P>(&mut self, path: P) -> Result<(), LexiconError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(LexiconError::EmptyPath);
        }

        log::info!("loading lexicons: {}", path.to_string_lossy());
        let mut table = HashMap::new();

        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let file_path = entry.path();
            let name = match file_path.file_stem() {
                Some(stem) => fold_key(&stem.to_string_lossy()),
                None => continue,
            };

            table.insert(name, SentimentDataHolder::load(&file_path)?);
        }

        log::info!("loaded {} lexicons", table.len());
        self.table = Some(table);
        Ok(())
    }

    pub fn supported(&self) -> Result<Vec<&str>, LexiconError> {
        let table = self.table.as_ref().ok_or(LexiconError::NotLoaded)?;
        Ok(table.keys().map(String::as_str).collect())
    }

    pub fn get_lexicon(&self, name: &str) -> Result<&SentimentDataHolder, LexiconError> {
        let table = self.table.as_ref().ok_or(LexiconError::NotLoaded)?;
        table
            .get(&fold_key(name))
            .ok_or_else(|| LexiconError::UnknownLexicon(name.to_owned()))
    }
}

#[derive(Debug)]
pub enum LexiconError {
    EmptyPath,
    NotLoaded,
    UnknownLexicon(String),
    Io(Box<io::Error>),
    InvalidRecord {
        line: usize,
        text: String,
    },
}

impl LexiconError {
    fn invalid_record(line: usize, text: &str) -> Self {
        LexiconError::InvalidRecord {
            line,
            text: text.to_owned(),
        }
    }
}

impl fmt::Display for LexiconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPath => write!(f, "lexicon path is empty"),
            Self::NotLoaded => write!(f, "lexicons have not been loaded"),
            Self::UnknownLexicon(name) => write!(f, "lexicon not found: {}", name),
            Self::Io(err) => err.fmt(f),
            Self::InvalidRecord { line, text } => {
                write!(f, "invalid lexicon record at line {}: {}", line, text)
            },
        }
    }
}

impl error::Error for LexiconError {}

impl From<io::Error> for LexiconError {
    fn from(err: io::Error) -> Self {
        LexiconError::Io(Box::new(err))
    }
}
