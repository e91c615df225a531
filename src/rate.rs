use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use clap::Parser;
use serde::Serialize;

use sst_machine::{MachineSentiment, RatingAdjustment};
use sst_text::handler::SentimentContext;
use sst_text::review::ReviewBuilder;
use sst_text::simple::SimpleSplitterFactory;
use sst_text::splitter::{ParseRequest, QueueTextSplitter};

use crate::Settings;

#[derive(Parser, Debug)]
pub(crate) struct Opts {
    /// Treat invertor words as ordinary words.
    #[clap(long)]
    no_invertors: bool,

    /// Ignore sentiment carried by aspect words themselves.
    #[clap(long)]
    no_feature_sentiment: bool,

    /// Weight adjustment CSV applied to the lexicon before rating.
    #[clap(long)]
    adjust: Option<PathBuf>,

    /// Output one JSON record per document instead of plain text.
    #[clap(long)]
    json: bool,

    /// The file to read documents from, one per line.
    /// If omitted, they will be read from stdin instead.
    file: Option<PathBuf>,
}

#[derive(Serialize, Debug)]
struct RatingRecord<'a> {
    text: &'a str,
    raw: Option<f64>,
    stars: Option<u8>,
}

struct RatedDocument {
    text: String,
    raw: Option<f64>,
    stars: Option<u8>,
}

pub(crate) async fn run(settings: &Settings, opts: Opts) -> anyhow::Result<()> {
    let documents = crate::read_documents(opts.file.as_deref()).await?;

    let context = SentimentContext {
        disable_invertors: opts.no_invertors,
        disable_feature_sentiment: opts.no_feature_sentiment,
    };

    let handler = crate::build_handler(settings, context, opts.adjust.as_deref(), None)?;
    let model = crate::load_model(settings)?;
    let builder = ReviewBuilder::new(handler);
    let pool = Arc::new(QueueTextSplitter::new(settings.workers, Box::new(SimpleSplitterFactory))?);

    let mut join_handles = Vec::with_capacity(documents.len());

    for document in documents {
        let pool = pool.clone();
        let builder = builder.clone();
        let model = model.clone();

        join_handles.push(tokio::spawn(async move {
            rate_document(&pool, &builder, model.as_ref(), document).await
        }));
    }

    let mut all_succeeded = true;

    for join_handle in join_handles {
        match join_handle.await? {
            Ok(rated) => print_rated(&rated, opts.json)?,
            Err(err) => {
                all_succeeded = false;
                eprintln!("{}", err);
            },
        }
    }

    pool.shutdown();

    match all_succeeded {
        true => Ok(()),
        false => Err(anyhow!("failed to rate some documents")),
    }
}

async fn rate_document(
    pool: &QueueTextSplitter,
    builder: &ReviewBuilder,
    model: &dyn MachineSentiment,
    text: String,
) -> anyhow::Result<RatedDocument> {
    let parsed = pool.process(&ParseRequest::new(text.as_str())).await?;
    let review = builder.build(&parsed)?;
    let adjustment = RatingAdjustment::create(&review, model);
    let rating = adjustment.rating();

    Ok(RatedDocument {
        text,
        raw: rating.raw_rating(),
        stars: rating.star(),
    })
}

fn print_rated(rated: &RatedDocument, json: bool) -> anyhow::Result<()> {
    if json {
        let record = RatingRecord {
            text: &rated.text,
            raw: rated.raw,
            stars: rated.stars,
        };
        println!("{}", serde_json::to_string(&record)?);
        return Ok(());
    }

    match (rated.stars, rated.raw) {
        (Some(stars), Some(raw)) => println!("{}\t{:.4}\t{}", stars, raw, rated.text),
        _ => println!("-\t-\t{}", rated.text),
    }

    Ok(())
}
