use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use cascade::gallery;
use cascade::layout::Options;
use cascade::runtime::Runtime;
use cascade_api::{BrowseResponse, SortBy, SortOrder};
use cascade_config::Config;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Lays out a captured gallery listing and prints the card placements.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Captured browse response (JSON).
    listing: PathBuf,

    /// Config file to load instead of the built-in defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Viewport width to lay out against, in pixels.
    #[arg(long, default_value_t = 1200.)]
    viewport: f64,

    /// Re-sort images client-side: name, date, rating or modified.
    #[arg(long)]
    sort_by: Option<String>,

    /// Sort direction: asc or desc.
    #[arg(long, default_value = "asc")]
    sort_order: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path).map_err(|err| anyhow!("{err:?}"))?,
        None => Config::default(),
    };

    let text = fs::read_to_string(&cli.listing)
        .with_context(|| format!("error reading {:?}", cli.listing))?;
    let mut listing: BrowseResponse =
        serde_json::from_str(&text).context("error parsing the listing")?;

    if let Some(sort_by) = &cli.sort_by {
        let sort_by = match sort_by.as_str() {
            "name" => SortBy::Name,
            "date" => SortBy::Date,
            "rating" => SortBy::Rating,
            "modified" => SortBy::Modified,
            other => bail!("unknown sort key: {other}"),
        };
        let sort_order = match cli.sort_order.as_str() {
            "asc" => SortOrder::Asc,
            "desc" => SortOrder::Desc,
            other => bail!("unknown sort order: {other}"),
        };
        gallery::sort_images(&mut listing.images, sort_by, sort_order);
    }

    // No thumbnail loader here: cards without EXIF dimensions take the
    // fallback height, which is fine for a dry run.
    let cards = gallery::browse_cards(&listing, None);

    let mut runtime = Runtime::new(Rc::new(Options::from_config(&config)))?;
    runtime.set_items(cards);
    runtime.relayout_now(cli.viewport);

    let summary = runtime.complete_current_pass(Duration::from_secs(5))?;

    println!(
        "{} cards, container {} px tall",
        summary.placements.len(),
        summary.container_height,
    );
    for (path, placement) in &summary.placements {
        println!(
            "{:>8.1} {:>8.1}  {:>5.0} x {:<7.1} {}",
            placement.x, placement.y, placement.width, placement.height, path,
        );
    }

    Ok(())
}
