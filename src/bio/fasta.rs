use crate::bio::sequence::SeqRecord;
use crate::BoldError;
use flate2::read::GzDecoder;
use nom::{
    bytes::complete::{tag, take_till},
    character::complete::{line_ending, not_line_ending},
    combinator::{map, opt},
    sequence::preceded,
    IResult,
};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

/// Input collection formats understood by the reader. The format name comes
/// from the caller; anything unknown is a fatal configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Fasta,
}

impl FromStr for InputFormat {
    type Err = BoldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fasta" | "fa" | "fna" => Ok(InputFormat::Fasta),
            other => Err(BoldError::Config(format!(
                "unknown input format: {}",
                other
            ))),
        }
    }
}

/// Parse a FASTA header line
fn parse_header(input: &[u8]) -> IResult<&[u8], (&str, Option<&str>)> {
    let (input, _) = tag(b">")(input)?;
    let (input, id) = map(
        take_till(|c: u8| c == b' ' || c == b'\t' || c == b'\n' || c == b'\r'),
        |s| std::str::from_utf8(s).unwrap_or(""),
    )(input)?;
    let (input, description) = opt(preceded(
        tag(b" "),
        map(not_line_ending, |s| std::str::from_utf8(s).unwrap_or("")),
    ))(input)?;
    let (input, _) = opt(line_ending)(input)?;
    Ok((input, (id, description)))
}

/// Parse sequence lines until the next header or EOF, dropping whitespace.
/// Ambiguity codes and case are preserved as-is.
fn parse_residues(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
    let mut residues = Vec::new();
    let mut remaining = input;

    while !remaining.is_empty() && remaining[0] != b'>' {
        let (rest, line) =
            take_till::<_, _, nom::error::Error<_>>(|c: u8| c == b'\n' || c == b'\r')(remaining)?;
        let (rest, _) = opt(line_ending)(rest)?;

        for &c in line {
            if !c.is_ascii_whitespace() {
                residues.push(c);
            }
        }

        remaining = rest;
    }

    Ok((remaining, residues))
}

fn parse_record(input: &[u8]) -> IResult<&[u8], SeqRecord> {
    let (input, (id, description)) = parse_header(input)?;
    let (input, residues) = parse_residues(input)?;

    let mut rec = SeqRecord::new(id.to_string(), residues);
    if let Some(desc) = description {
        rec = rec.with_description(desc.to_string());
    }

    Ok((input, rec))
}

/// Parse FASTA records from an in-memory buffer.
pub fn parse_fasta_from_bytes(data: &[u8]) -> Result<Vec<SeqRecord>, BoldError> {
    let mut input = data;
    let mut records = Vec::new();

    while !input.is_empty() {
        while !input.is_empty() && input[0].is_ascii_whitespace() {
            input = &input[1..];
        }

        if input.is_empty() {
            break;
        }

        if input[0] != b'>' {
            return Err(BoldError::Parse(
                "FASTA record does not start with '>'".to_string(),
            ));
        }

        match parse_record(input) {
            Ok((remaining, rec)) => {
                if !rec.is_empty() {
                    records.push(rec);
                }
                input = remaining;
            }
            Err(e) => {
                return Err(BoldError::Parse(format!("failed to parse FASTA: {:?}", e)));
            }
        }
    }

    Ok(records)
}

/// Read a sequence collection from disk (supports .gz compression).
pub fn read_records<P: AsRef<Path>>(
    path: P,
    format: InputFormat,
) -> Result<Vec<SeqRecord>, BoldError> {
    let InputFormat::Fasta = format;
    let path = path.as_ref();

    let mut buffer = Vec::new();
    let file = File::open(path)?;
    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        GzDecoder::new(BufReader::new(file)).read_to_end(&mut buffer)?;
    } else {
        BufReader::new(file).read_to_end(&mut buffer)?;
    }

    parse_fasta_from_bytes(&buffer)
}

/// Collect the sequence ids present in an existing FASTA file, for resuming
/// an interrupted run.
pub fn read_fasta_seqids<P: AsRef<Path>>(path: P) -> Result<HashSet<String>, BoldError> {
    let file = File::open(path)?;
    let mut seqids = HashSet::new();

    for line in BufReader::new(file).lines() {
        let line = line?;
        if let Some(rest) = line.strip_prefix('>') {
            if let Some(id) = rest.split_whitespace().next() {
                seqids.insert(id.to_string());
            }
        }
    }

    Ok(seqids)
}

/// Incremental FASTA writer for the no-match / timeout outputs. Flushes after
/// every record so a killed run leaves usable files behind.
pub struct FastaWriter {
    writer: BufWriter<File>,
}

impl FastaWriter {
    pub fn create<P: AsRef<Path>>(path: P, append: bool) -> Result<Self, BoldError> {
        let file = if append {
            OpenOptions::new().create(true).append(true).open(path)?
        } else {
            File::create(path)?
        };
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    pub fn write_record(&mut self, rec: &SeqRecord) -> Result<(), BoldError> {
        writeln!(self.writer, "{}", rec.header())?;
        for chunk in rec.residues.chunks(80) {
            writeln!(self.writer, "{}", String::from_utf8_lossy(chunk))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
