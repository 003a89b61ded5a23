use crate::bold::db::Database;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "bold-taxa",
    version,
    about = "Taxonomic identification of nucleotide sequences via the BOLD Systems web service",
    long_about = "Submits each input sequence to the BOLD identification service and writes the \
                  reported taxonomic ranks to <prefix>.taxa. Sequences the service cannot match \
                  go to <prefix>.NoBoldMatchError.fasta; sequences that never got a definitive \
                  answer within the retry budget go to <prefix>.TimeoutException.fasta and can \
                  be re-run later with -c."
)]
pub struct Cli {
    /// Input sequence collection
    #[arg(short = 'i', long, value_name = "FILE")]
    pub infile: PathBuf,

    /// Input file format
    #[arg(short = 'f', long, default_value = "fasta", value_name = "FORMAT")]
    pub format: String,

    /// Output prefix; artifacts are <prefix>.taxa, <prefix>.NoBoldMatchError.fasta,
    /// <prefix>.TimeoutException.fasta
    #[arg(short = 'o', long, value_name = "PREFIX")]
    pub outprefix: PathBuf,

    /// Reference database to search
    #[arg(short = 'd', long, default_value = "COX1")]
    pub db: Database,

    /// How many top hits to keep per sequence
    #[arg(short = 'n', long, default_value = "1", value_name = "N")]
    pub topnum: usize,

    /// Maximum submissions per sequence before it is routed to the timeout file
    #[arg(short = 'r', long, default_value = "4", value_name = "N")]
    pub retries: usize,

    /// Continuous mode: skip seqids already in the .taxa output and append.
    /// Repeat (-cc) to also skip seqids in the no-match file.
    #[arg(short = 'c', action = clap::ArgAction::Count)]
    pub resume: u8,

    /// Chimera check: submit a 5' and a 3' probe of each sequence separately
    #[arg(long)]
    pub chimera: bool,

    /// Probe length for the chimera check
    #[arg(long, default_value = "400", value_name = "LEN")]
    pub probe_len: usize,

    /// Seconds to wait between sequences (stay under the service's rate limits)
    #[arg(long, default_value = "2", value_name = "SECS")]
    pub pause: u64,

    /// Debug logging
    #[arg(short = 'D', long)]
    pub debug: bool,
}
