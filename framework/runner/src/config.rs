use crate::cli::BenchCli;
use anyhow::Context;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1/products";

/// Everything a run needs to know about its environment. Built once and passed down explicitly.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub products_url: Url,
    pub counts_url: Url,
    pub dataset_size: u64,
    pub dataset_label: String,
    pub results_dir: PathBuf,
    pub run_summary_path: PathBuf,
    pub request_timeout: Duration,
    pub no_progress: bool,
}

impl BenchConfig {
    /// Defaults for a local service, without a progress bar.
    pub fn for_dataset(dataset_size: u64) -> anyhow::Result<Self> {
        let (products_url, counts_url) = endpoint_urls(DEFAULT_BASE_URL)?;

        Ok(Self {
            products_url,
            counts_url,
            dataset_size,
            dataset_label: dataset_label(dataset_size),
            results_dir: PathBuf::from("results"),
            run_summary_path: PathBuf::from("run_summary.jsonl"),
            request_timeout: Duration::from_secs(30),
            no_progress: true,
        })
    }

    pub fn from_cli(cli: &BenchCli) -> anyhow::Result<Self> {
        let (products_url, counts_url) = endpoint_urls(&cli.base_url)?;
        if cli.timeout_secs == 0 {
            anyhow::bail!("The request timeout must be at least one second");
        }

        Ok(Self {
            products_url,
            counts_url,
            dataset_size: cli.dataset_size,
            dataset_label: cli
                .dataset_label
                .clone()
                .unwrap_or_else(|| dataset_label(cli.dataset_size)),
            results_dir: cli.results_dir.clone(),
            run_summary_path: cli.run_summary.clone(),
            request_timeout: Duration::from_secs(cli.timeout_secs),
            no_progress: cli.no_progress,
        })
    }
}

fn endpoint_urls(base_url: &str) -> anyhow::Result<(Url, Url)> {
    let base = base_url.trim_end_matches('/');
    let products_url =
        Url::parse(base).with_context(|| format!("Invalid base URL: {base_url}"))?;
    let counts_url = Url::parse(&format!("{base}/counts"))
        .with_context(|| format!("Invalid base URL: {base_url}"))?;
    Ok((products_url, counts_url))
}

/// Short label for a dataset size: `10000` becomes `10k`, `1500000` becomes `1.5M`.
pub fn dataset_label(dataset_size: u64) -> String {
    fn scaled(value: u64, unit: u64, suffix: &str) -> String {
        if value % unit == 0 {
            format!("{}{suffix}", value / unit)
        } else {
            let mut text = format!("{:.1}", value as f64 / unit as f64);
            if text.ends_with(".0") {
                text.truncate(text.len() - 2);
            }
            format!("{text}{suffix}")
        }
    }

    match dataset_size {
        size if size >= 1_000_000 => scaled(size, 1_000_000, "M"),
        size if size >= 1_000 => scaled(size, 1_000, "k"),
        size => size.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn labels() {
        assert_eq!(dataset_label(10_000), "10k");
        assert_eq!(dataset_label(100_000), "100k");
        assert_eq!(dataset_label(1_000_000), "1M");
        assert_eq!(dataset_label(1_500_000), "1.5M");
        assert_eq!(dataset_label(2_500), "2.5k");
        assert_eq!(dataset_label(999), "999");
    }

    #[test]
    fn counts_url_is_under_products() -> anyhow::Result<()> {
        let cli = BenchCli::try_parse_from([
            "bench",
            "--dataset-size",
            "1000000",
            "--base-url",
            "http://service:9000/api/v1/products/",
        ])?;
        let config = BenchConfig::from_cli(&cli)?;

        assert_eq!(
            config.products_url.as_str(),
            "http://service:9000/api/v1/products"
        );
        assert_eq!(
            config.counts_url.as_str(),
            "http://service:9000/api/v1/products/counts"
        );
        assert_eq!(config.dataset_label, "1M");
        Ok(())
    }

    #[test]
    fn explicit_label_wins() -> anyhow::Result<()> {
        let cli = BenchCli::try_parse_from([
            "bench",
            "--dataset-size",
            "1400000",
            "--dataset-label",
            "1M+",
        ])?;
        assert_eq!(BenchConfig::from_cli(&cli)?.dataset_label, "1M+");
        Ok(())
    }

    #[test]
    fn rejects_bad_url() {
        let cli =
            BenchCli::try_parse_from(["bench", "--dataset-size", "10", "--base-url", "not a url"])
                .unwrap();
        assert!(BenchConfig::from_cli(&cli).is_err());
    }
}
