//! Batch Runner: walks a sequence collection through the retry loop, skips
//! work already finished by an earlier interrupted run, and routes every
//! sequence into exactly one of the three output artifacts.

use crate::bio::fasta::{read_fasta_seqids, FastaWriter};
use crate::bio::sequence::SeqRecord;
use crate::bold::client::SubmitSequence;
use crate::bold::db::Database;
use crate::bold::parse::TaxonRecord;
use crate::bold::retry::{self, RetryPolicy, Verdict};
use crate::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// How much previously finished work to skip when re-running with the same
/// output prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeMode {
    /// Truncate all outputs and start over.
    Fresh,
    /// Skip seqids already present in the primary `.taxa` table, append to it.
    SkipMatched,
    /// Additionally skip seqids already in the no-match file, append to both.
    SkipMatchedAndNoMatch,
}

impl ResumeMode {
    /// From the count of `-c` flags on the command line.
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => ResumeMode::Fresh,
            1 => ResumeMode::SkipMatched,
            _ => ResumeMode::SkipMatchedAndNoMatch,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Output file names are derived from this prefix.
    pub out_prefix: PathBuf,
    pub db: Database,
    pub policy: RetryPolicy,
    pub resume: ResumeMode,
    /// Pause between sequences. A sustained burst risks an IP-level block by
    /// the service, which would end the whole run.
    pub pause: Duration,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub matched: usize,
    pub no_match: usize,
    pub timed_out: usize,
    pub skipped: usize,
}

/// Tab-separated taxon table. The header line comes from the keys of the
/// first record written and is emitted exactly once per file (never when
/// appending to an existing table).
struct TaxaWriter {
    writer: BufWriter<File>,
    wrote_header: bool,
}

impl TaxaWriter {
    fn open(path: &Path, append: bool) -> Result<Self> {
        let file = if append {
            OpenOptions::new().create(true).append(true).open(path)?
        } else {
            File::create(path)?
        };
        Ok(Self {
            writer: BufWriter::new(file),
            wrote_header: append,
        })
    }

    fn write_rows(&mut self, rows: &[TaxonRecord]) -> Result<()> {
        for row in rows {
            if !self.wrote_header {
                let header: Vec<&str> = row.keys().map(|k| k.as_str()).collect();
                writeln!(self.writer, "{}", header.join("\t"))?;
                self.wrote_header = true;
            }
            let line: Vec<&str> = row.values().map(|v| v.as_str()).collect();
            writeln!(self.writer, "{}", line.join("\t"))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

fn path_with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{}{}", prefix.display(), suffix))
}

/// Seqids already recorded in an existing `.taxa` table: first
/// whitespace-delimited token of every non-header line.
fn read_taxa_seqids(path: &Path) -> Result<HashSet<String>> {
    let file = File::open(path)?;
    let mut seqids = HashSet::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if let Some(token) = line.split_whitespace().next() {
            if token != "seqid" {
                seqids.insert(token.to_string());
            }
        }
    }
    Ok(seqids)
}

pub struct BatchRunner<'a> {
    client: &'a dyn SubmitSequence,
    config: BatchConfig,
}

impl<'a> BatchRunner<'a> {
    pub fn new(client: &'a dyn SubmitSequence, config: BatchConfig) -> Self {
        Self { client, config }
    }

    /// Standard mode: one submission pipeline per sequence, three output
    /// artifacts under the configured prefix.
    pub fn run(&self, records: &[SeqRecord]) -> Result<BatchSummary> {
        let cfg = &self.config;
        let taxa_path = path_with_suffix(&cfg.out_prefix, ".taxa");
        let no_match_path = path_with_suffix(&cfg.out_prefix, ".NoBoldMatchError.fasta");
        let timeout_path = path_with_suffix(&cfg.out_prefix, ".TimeoutException.fasta");

        let mut finished = HashSet::new();
        let resume_taxa = cfg.resume != ResumeMode::Fresh && taxa_path.exists();
        if resume_taxa {
            finished.extend(read_taxa_seqids(&taxa_path)?);
        }
        let resume_no_match =
            cfg.resume == ResumeMode::SkipMatchedAndNoMatch && no_match_path.exists();
        if resume_no_match {
            finished.extend(read_fasta_seqids(&no_match_path)?);
        }

        let mut taxa = TaxaWriter::open(&taxa_path, resume_taxa)?;
        let mut no_match = FastaWriter::create(&no_match_path, resume_no_match)?;
        // Timed-out sequences are always re-attempted on resume, so this
        // file starts empty every run.
        let mut timeout = FastaWriter::create(&timeout_path, false)?;

        let progress = batch_progress(records.len());
        let mut summary = BatchSummary::default();

        for (count, rec) in records.iter().enumerate() {
            let count = count + 1;
            if finished.contains(&rec.id) {
                info!(seqid = %rec.id, count, "already finished, skipping");
                summary.skipped += 1;
                progress.inc(1);
                continue;
            }

            info!(seqid = %rec.id, count, "searching");
            progress.set_message(rec.id.clone());

            match retry::identify(self.client, cfg.db, rec, &cfg.policy) {
                Verdict::Matched(rows) => {
                    taxa.write_rows(&rows)?;
                    summary.matched += 1;
                }
                Verdict::NoMatch => {
                    no_match.write_record(rec)?;
                    summary.no_match += 1;
                }
                Verdict::Exhausted => {
                    timeout.write_record(rec)?;
                    summary.timed_out += 1;
                }
            }

            progress.inc(1);
            if !cfg.pause.is_zero() {
                std::thread::sleep(cfg.pause);
            }
        }

        progress.finish_and_clear();
        info!(?summary, "batch finished");
        Ok(summary)
    }

    /// Chimera-check mode: each sequence is probed twice, 5' end then 3'
    /// end, through the same retry pipeline. Both probes share one taxon
    /// table (rows told apart by the `_5end`/`_3end` id suffix) while the
    /// failure files are kept per end.
    pub fn run_chimera(&self, records: &[SeqRecord], probe_len: usize) -> Result<BatchSummary> {
        let cfg = &self.config;
        let taxa_path = path_with_suffix(&cfg.out_prefix, ".5-and-3ends.taxa");
        let no_match_paths = [
            path_with_suffix(&cfg.out_prefix, ".5end.NoBoldMatchError.fasta"),
            path_with_suffix(&cfg.out_prefix, ".3end.NoBoldMatchError.fasta"),
        ];
        let timeout_paths = [
            path_with_suffix(&cfg.out_prefix, ".5end.TimeoutException.fasta"),
            path_with_suffix(&cfg.out_prefix, ".3end.TimeoutException.fasta"),
        ];

        let mut finished = HashSet::new();
        let resume_taxa = cfg.resume != ResumeMode::Fresh && taxa_path.exists();
        if resume_taxa {
            finished.extend(read_taxa_seqids(&taxa_path)?);
        }
        let resume_no_match = cfg.resume == ResumeMode::SkipMatchedAndNoMatch;
        if resume_no_match {
            for path in &no_match_paths {
                if path.exists() {
                    finished.extend(read_fasta_seqids(path)?);
                }
            }
        }

        let mut taxa = TaxaWriter::open(&taxa_path, resume_taxa)?;
        let mut no_match = [
            FastaWriter::create(&no_match_paths[0], resume_no_match && no_match_paths[0].exists())?,
            FastaWriter::create(&no_match_paths[1], resume_no_match && no_match_paths[1].exists())?,
        ];
        let mut timeout = [
            FastaWriter::create(&timeout_paths[0], false)?,
            FastaWriter::create(&timeout_paths[1], false)?,
        ];

        let progress = batch_progress(records.len());
        let mut summary = BatchSummary::default();

        for (count, rec) in records.iter().enumerate() {
            let count = count + 1;
            let probes = [rec.probe_5end(probe_len), rec.probe_3end(probe_len)];

            for (end, probe) in probes.iter().enumerate() {
                if finished.contains(&probe.id) {
                    info!(seqid = %probe.id, count, "already finished, skipping");
                    summary.skipped += 1;
                    continue;
                }

                info!(seqid = %probe.id, count, "searching");
                progress.set_message(probe.id.clone());

                match retry::identify(self.client, cfg.db, probe, &cfg.policy) {
                    Verdict::Matched(rows) => {
                        taxa.write_rows(&rows)?;
                        summary.matched += 1;
                    }
                    Verdict::NoMatch => {
                        no_match[end].write_record(probe)?;
                        summary.no_match += 1;
                    }
                    Verdict::Exhausted => {
                        timeout[end].write_record(probe)?;
                        summary.timed_out += 1;
                    }
                }

                if !cfg.pause.is_zero() {
                    std::thread::sleep(cfg.pause);
                }
            }

            progress.inc(1);
        }

        progress.finish_and_clear();
        info!(?summary, "chimera batch finished");
        Ok(summary)
    }
}

fn batch_progress(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap(),
    );
    bar
}
