use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::ExtractionConfig;
use crate::extractor::KeywordExtractor;
use crate::patterns::Taxonomy;
use crate::sources::{StoredIssue, StoredPullRequest, StoredRelease};
use crate::taxonomy::{builtin_taxonomy, load_taxonomy};
use crate::types::{MatchRecord, MatchSource};

#[derive(Debug, Parser)]
#[command(
    name = "qagrep",
    version,
    about = "Mine quality-attribute keywords from repository corpora"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Taxonomy TOML file; the built-in taxonomy is used when omitted.
    #[arg(long, global = true)]
    pub taxonomy: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run keyword extraction over stored dumps and/or a checked-out tree
    Match(MatchArgs),
    /// Print the normalized taxonomy in ranked order
    Patterns(PatternsArgs),
}

#[derive(Debug, Args)]
pub struct MatchArgs {
    /// Directory with document-store dumps (issues.json, prs.json, releases.json)
    #[arg(long)]
    pub dumps: Option<PathBuf>,

    /// Checked-out source tree to scan for docs and code comments
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Cloned wiki directory
    #[arg(long)]
    pub wiki: Option<PathBuf>,

    /// Output directory; one JSON-lines file per provenance type
    #[arg(short, long, default_value = "matches")]
    pub out_dir: PathBuf,

    /// Keep the matched text context on every record
    #[arg(long)]
    pub full_text: bool,

    /// Record keywords in plain text instead of their authored notation
    #[arg(long)]
    pub plain_keywords: bool,
}

#[derive(Debug, Args)]
pub struct PatternsArgs {
    /// Print stripped plain-text keywords
    #[arg(long)]
    pub plain: bool,
}

pub struct CliApp {
    taxonomy: Taxonomy,
    verbose: bool,
}

impl CliApp {
    pub fn new(taxonomy_path: Option<&Path>, verbose: bool) -> Result<Self> {
        let taxonomy = match taxonomy_path {
            Some(path) => load_taxonomy(path)
                .with_context(|| format!("failed to load taxonomy from {}", path.display()))?,
            None => builtin_taxonomy(),
        };
        info!(
            attributes = taxonomy.len(),
            patterns = taxonomy.pattern_count(),
            "taxonomy normalized"
        );
        Ok(Self { taxonomy, verbose })
    }

    pub fn run_match(&self, args: &MatchArgs) -> Result<()> {
        let mut config = ExtractionConfig::default();
        if args.full_text {
            config = config.with_full_text();
        }
        if args.plain_keywords {
            config = config.with_plain_keywords();
        }

        let extractor = KeywordExtractor::new(self.taxonomy.clone(), config);
        std::fs::create_dir_all(&args.out_dir).with_context(|| {
            format!("failed to create output directory {}", args.out_dir.display())
        })?;

        if let Some(dumps) = &args.dumps {
            let issues: Vec<StoredIssue> = load_dump(dumps, "issues.json")?;
            self.save(&args.out_dir, MatchSource::Issue, extractor.extract_issues(&issues))?;
            self.save(
                &args.out_dir,
                MatchSource::IssueComment,
                extractor.extract_issue_comments(&issues),
            )?;

            let releases: Vec<StoredRelease> = load_dump(dumps, "releases.json")?;
            self.save(
                &args.out_dir,
                MatchSource::Release,
                extractor.extract_releases(&releases),
            )?;

            let prs: Vec<StoredPullRequest> = load_dump(dumps, "prs.json")?;
            self.save(&args.out_dir, MatchSource::Pr, extractor.extract_prs(&prs))?;
            self.save(
                &args.out_dir,
                MatchSource::PrComment,
                extractor.extract_pr_comments(&prs),
            )?;
            self.save(
                &args.out_dir,
                MatchSource::PrRelatedIssue,
                extractor.extract_pr_related_issues(&prs),
            )?;
            self.save(
                &args.out_dir,
                MatchSource::PrRelatedIssueComment,
                extractor.extract_pr_related_issue_comments(&prs),
            )?;
            self.save(
                &args.out_dir,
                MatchSource::PrCorpus,
                extractor.extract_pr_corpus(&prs),
            )?;
        }

        if let Some(wiki) = &args.wiki {
            self.save(&args.out_dir, MatchSource::Wiki, extractor.extract_wiki(wiki))?;
        }

        if let Some(source) = &args.source {
            self.save(&args.out_dir, MatchSource::Docs, extractor.extract_docs(source))?;
            self.save(
                &args.out_dir,
                MatchSource::CodeComment,
                extractor.extract_code_comments(source),
            )?;
        }

        Ok(())
    }

    pub fn run_patterns(&self, args: &PatternsArgs) -> Result<()> {
        for attribute in self.taxonomy.attributes() {
            println!("{}:", attribute.name());
            for pattern in attribute.patterns() {
                println!("  {}", pattern.keyword(!args.plain));
            }
        }
        Ok(())
    }

    /// One JSON-lines file per provenance type; nothing is written when a
    /// source produced zero matches.
    fn save(&self, out_dir: &Path, source: MatchSource, records: Vec<MatchRecord>) -> Result<()> {
        if records.is_empty() {
            if self.verbose {
                println!("No records to save for source {source}");
            }
            return Ok(());
        }

        let path = out_dir.join(format!("{source}.jsonl"));
        let file =
            File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        for record in &records {
            serde_json::to_writer(&mut writer, record)
                .with_context(|| format!("failed to serialize record for {}", path.display()))?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        println!(
            "Saved {} matches for source {source} to {}",
            records.len(),
            path.display()
        );
        Ok(())
    }
}

/// Missing dump files are treated as an empty collection: not every
/// repository has every provenance fetched.
///
/// Records are decoded individually; a malformed record is skipped with a
/// warning and never costs its siblings their matches. Only a file that is
/// not a JSON array at all fails the run.
fn load_dump<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<Vec<T>> {
    let path = dir.join(name);
    if !path.exists() {
        info!(path = %path.display(), "dump file absent, treating as empty");
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let values: Vec<serde_json::Value> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let mut records = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value(value) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(path = %path.display(), index, error = %e, "skipping undecodable record");
            }
        }
    }
    Ok(records)
}
