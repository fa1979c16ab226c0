use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, stdin};
use tracing::{Level, event};

use crate::core::common::{CandidateRecord, LoggingOptions, ResolveOptions, ResolverBackend};
use crate::core::konst::APP_NAME;
use crate::dns::batch::resolve_batch;
use crate::dns::resolver::{DnsResolver, Resolve, SystemResolver};
use crate::util::message::batch_summary_table_msg;
use crate::util::parser::parse_candidates;
use crate::util::progress::{NoProgress, Progress, ProgressBar};
use crate::util::result::BatchSummary;

#[derive(Debug, Clone)]
pub struct ResolveClientOptions {
    /// Candidate file, `-` reads from stdin
    pub input: String,
    pub valid_only: bool,
}

pub struct ResolveClient {
    pub client_options: ResolveClientOptions,
    pub resolve_options: ResolveOptions,
    pub logging_options: LoggingOptions,
}

impl ResolveClient {
    pub async fn resolve(&self) -> Result<()> {
        let mut records = self.read_candidates().await?;
        event!(
            target: APP_NAME,
            Level::INFO,
            "loaded {} candidates from `{}` using the {} backend",
            records.len(),
            self.client_options.input,
            self.resolve_options.backend
        );

        let summary = match self.resolve_options.backend {
            ResolverBackend::Dns => {
                let resolver = DnsResolver::new(&self.resolve_options)?;
                self.run_batch(&mut records, &resolver).await
            }
            ResolverBackend::System => {
                let resolver = SystemResolver::new(&self.resolve_options);
                self.run_batch(&mut records, &resolver).await
            }
        };

        if !self.logging_options.quiet {
            eprintln!("{}", batch_summary_table_msg(&summary));
        }

        let output: Vec<&CandidateRecord> = records
            .iter()
            .filter(|r| !self.client_options.valid_only || (r.valid && r.is_resolved()))
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);

        Ok(())
    }

    async fn run_batch<R: Resolve>(&self, records: &mut [CandidateRecord], resolver: &R) -> BatchSummary {
        let concurrency = self.resolve_options.concurrency();
        let mut progress: Box<dyn Progress> = match self.logging_options.quiet {
            true => Box::new(NoProgress),
            false => Box::new(ProgressBar::default()),
        };
        resolve_batch(records, resolver, concurrency, &mut progress).await
    }

    async fn read_candidates(&self) -> Result<Vec<CandidateRecord>> {
        let input = match self.client_options.input.as_str() {
            "-" => read_input(stdin()).await.context("failed to read candidates from stdin")?,
            path => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read candidate file `{path}`"))?,
        };
        parse_candidates(&input)
    }
}

async fn read_input<R: AsyncRead + Unpin>(mut reader: R) -> std::io::Result<String> {
    let mut input = String::new();
    reader.read_to_string(&mut input).await?;
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_input_collects_whole_stream() {
        let input: &[u8] = b"www.example.com\nmail.example.com\n";
        let text = read_input(input).await.unwrap();

        let records = parse_candidates(&text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].subdomain, "mail.example.com");
    }
}
