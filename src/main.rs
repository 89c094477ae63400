// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing, filtered with RUST_LOG, written to stderr)
// 2. Parse command-line arguments using clap
// 3. Build the HTTP fetcher and the scraper, then crawl from the seeds
// 4. Print the most frequent words as a table or as JSON
// 5. Exit with proper code (0 = success, 2 = error)
//
// Rust concepts used:
// - async/await: Because we need to make many network requests concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;   // src/cli.rs - command-line parsing
mod crawl; // src/crawl/ - frontier, worker pool, word tally
mod fetch; // src/fetch/ - HTTP fetching
mod scan;  // src/scan/ - HTML tokenizing and page scanning

use clap::Parser; // Parser trait enables the parse() method
use cli::Cli;
use crawl::{CrawlStats, RankedEntry, Scraper};
use fetch::HttpFetcher;

// anyhow::Result is like std::result::Result but simpler for applications
// It lets us return any error type with the ? operator
use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so stdout only carries the results (important for --json)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = cli.crawl_config();

    let fetcher = HttpFetcher::new(config.request_timeout, &config.user_agent)
        .context("failed to build HTTP client")?;
    let scraper = Scraper::new(fetcher, config.workers).context("invalid crawl settings")?;

    let seeds = cli.seed_urls();
    let stats = scraper.scrape(&seeds).await;
    let ranked = scraper.find_most_recurring_words(cli.top);

    print_results(&ranked, &stats, scraper.distinct_words(), cli.json)?;
    Ok(0)
}

// Prints the ranking either as a table or JSON
fn print_results(
    ranked: &[RankedEntry],
    stats: &CrawlStats,
    distinct_words: usize,
    json: bool,
) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(ranked)?;
        println!("{}", json_output);
    } else {
        print_table(ranked, stats, distinct_words);
    }
    Ok(())
}

// Prints results as a human-readable table in the terminal
fn print_table(ranked: &[RankedEntry], stats: &CrawlStats, distinct_words: usize) {
    if ranked.is_empty() {
        println!("⚠️  No words found");
    } else {
        println!("{:<6} {:<40} {:>10}", "RANK", "WORD", "COUNT");
        println!("{}", "=".repeat(58));

        for (rank, entry) in ranked.iter().enumerate() {
            println!(
                "{:<6} {:<40} {:>10}",
                rank + 1,
                truncate_word(&entry.word, 40),
                entry.count
            );
        }
    }

    println!();
    println!("📊 Summary:");
    println!("   📄 Pages scanned: {}", stats.pages_scanned);
    println!("   ❌ Pages failed: {}", stats.pages_failed);
    println!("   🔗 URLs seen: {}", stats.urls_seen);
    println!("   🔤 Distinct words: {}", distinct_words);
}

// Shortens long words for display, respecting char boundaries
fn truncate_word(word: &str, width: usize) -> String {
    if word.chars().count() > width {
        let head: String = word.chars().take(width - 3).collect();
        format!("{}...", head)
    } else {
        word.to_string()
    }
}
