use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::Parser;
use serde::Serialize;

use sst_text::aspects::{AspectSentimentData, AspectSentimentTracker, DictionaryAspectDetector, OccurrenceTracker};
use sst_text::handler::SentimentContext;
use sst_text::phrases::{Phrase, PhraseBuilder};
use sst_text::review::ReviewBuilder;
use sst_text::simple::SimpleSplitterFactory;
use sst_text::splitter::{ParseRequest, QueueTextSplitter};

use crate::Settings;

#[derive(Parser, Debug)]
pub(crate) struct Opts {
    /// File listing aspect words, one per line.
    #[clap(long)]
    aspects: PathBuf,

    /// Only report phrases seen at least this many times.
    #[clap(long, default_value = "2")]
    cutoff: usize,

    /// Weight adjustment CSV applied to the lexicon before rating.
    #[clap(long)]
    adjust: Option<PathBuf>,

    /// The file to read documents from, one per line.
    /// If omitted, they will be read from stdin instead.
    file: Option<PathBuf>,
}

#[derive(Serialize, Debug)]
struct AspectReport {
    aspects: AspectSentimentData,
    phrases: Vec<Phrase>,
    total_words: usize,
}

pub(crate) async fn run(settings: &Settings, opts: Opts) -> anyhow::Result<()> {
    let documents = crate::read_documents(opts.file.as_deref()).await?;

    let aspect_words = tokio::fs::read_to_string(&opts.aspects)
        .await
        .with_context(|| format!("failed to read aspect file {}", opts.aspects.to_string_lossy()))?;
    let detector = DictionaryAspectDetector::from_words(
        aspect_words
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#')),
    );

    let handler = crate::build_handler(
        settings,
        SentimentContext::default(),
        opts.adjust.as_deref(),
        Some(Box::new(detector)),
    )?;

    let builder = ReviewBuilder::new(handler);
    let pool = Arc::new(QueueTextSplitter::new(settings.workers, Box::new(SimpleSplitterFactory))?);
    let sentiment_tracker = Arc::new(AspectSentimentTracker::new());
    let occurrence_tracker = Arc::new(OccurrenceTracker::new());

    let mut join_handles = Vec::with_capacity(documents.len());

    for document in documents {
        let pool = pool.clone();
        let builder = builder.clone();
        let sentiment_tracker = sentiment_tracker.clone();
        let occurrence_tracker = occurrence_tracker.clone();

        join_handles.push(tokio::spawn(async move {
            track_document(&pool, &builder, &sentiment_tracker, &occurrence_tracker, document).await
        }));
    }

    let mut all_succeeded = true;

    for join_handle in join_handles {
        if let Err(err) = join_handle.await? {
            all_succeeded = false;
            eprintln!("{}", err);
        }
    }

    pool.shutdown();

    let report = AspectReport {
        aspects: sentiment_tracker.get_results(),
        phrases: occurrence_tracker.get_phrases(opts.cutoff),
        total_words: occurrence_tracker.total(),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    match all_succeeded {
        true => Ok(()),
        false => Err(anyhow!("failed to process some documents")),
    }
}

async fn track_document(
    pool: &QueueTextSplitter,
    builder: &ReviewBuilder,
    sentiment_tracker: &AspectSentimentTracker,
    occurrence_tracker: &OccurrenceTracker,
    text: String,
) -> anyhow::Result<()> {
    let parsed = pool.process(&ParseRequest::new(text.as_str())).await?;
    let review = builder.build(&parsed)?;

    sentiment_tracker.process(&review);

    for word in review.items().filter(|word| !word.is_stopword()) {
        occurrence_tracker.add_word(word);
    }
    for phrase in PhraseBuilder::all_phrases(&review) {
        occurrence_tracker.add_phrase(&phrase);
    }

    Ok(())
}
