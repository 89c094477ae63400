// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Everything is optional: with no arguments the crawler starts from a
// built-in seed list with 5 workers and prints the top 5 words.
// =============================================================================

use clap::Parser;
use std::time::Duration;

use crate::crawl::CrawlConfig;

/// Seeds used when none are given on the command line.
pub const DEFAULT_SEEDS: [&str; 4] = [
    "https://www.onet.pl",
    "https://www.wp.pl",
    "https://www.pudelek.pl",
    "https://example.com",
];

#[derive(Parser, Debug)]
#[command(
    name = "word-crawler",
    version = "0.1.0",
    about = "Crawl websites and rank the words that appear most often",
    long_about = "word-crawler starts from one or more seed URLs, follows links that stay on the \
                  same host, counts every visible word and prints the most frequent ones."
)]
pub struct Cli {
    /// Seed URLs to start from (default: a small built-in list)
    ///
    /// Example: word-crawler https://example.com https://www.rust-lang.org
    pub seeds: Vec<String>,

    /// Number of concurrent workers
    #[arg(short, long, default_value_t = 5)]
    pub workers: usize,

    /// How many of the most frequent words to print
    #[arg(short = 'n', long, default_value_t = 5)]
    pub top: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// User-Agent header sent with every request
    #[arg(long, default_value = concat!("word-crawler/", env!("CARGO_PKG_VERSION")))]
    pub user_agent: String,

    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// The seeds to crawl: the ones given, or the built-in list.
    pub fn seed_urls(&self) -> Vec<String> {
        if self.seeds.is_empty() {
            DEFAULT_SEEDS.iter().map(|s| s.to_string()).collect()
        } else {
            self.seeds.clone()
        }
    }

    pub fn crawl_config(&self) -> CrawlConfig {
        CrawlConfig {
            workers: self.workers,
            request_timeout: Duration::from_secs(self.timeout),
            user_agent: self.user_agent.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["word-crawler"]);
        assert_eq!(cli.workers, 5);
        assert_eq!(cli.top, 5);
        assert!(!cli.json);
        assert_eq!(cli.seed_urls().len(), DEFAULT_SEEDS.len());

        let config = cli.crawl_config();
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.user_agent.starts_with("word-crawler/"));
    }

    #[test]
    fn test_explicit_seeds_and_flags() {
        let cli = Cli::parse_from([
            "word-crawler",
            "https://example.com",
            "--workers",
            "8",
            "-n",
            "20",
            "--json",
        ]);
        assert_eq!(cli.seed_urls(), vec!["https://example.com".to_string()]);
        assert_eq!(cli.crawl_config().workers, 8);
        assert_eq!(cli.top, 20);
        assert!(cli.json);
    }
}
