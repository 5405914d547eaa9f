//! Streaming reader for FASTA-style reference and query files.
//!
//! A record starts at a header line beginning with `>`. Every other non-blank
//! line is stripped of surrounding whitespace and appended to the body of the
//! current record. Sequence lines that appear before the first header form a
//! record of their own with an empty header, which resolves to the `Unknown`
//! reference id.
//!
//! Supported extensions:
//! - `.fna`, `.fasta` (uncompressed)
//! - `.fna.gz`, `.fasta.gz` (gzip compressed)

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use thiserror::Error;
use tracing::warn;

use crate::core::types::ReferenceId;

/// Character that opens a record header line
pub const RECORD_MARKER: char = '>';

/// Extensions accepted when ingesting reference files into an index
pub const REFERENCE_EXTENSIONS: [&str; 4] = [".fna", ".fna.gz", ".fasta", ".fasta.gz"];

/// Extensions scanned by capacity estimation.
///
/// Narrower than [`REFERENCE_EXTENSIONS`]: `.fasta` files are indexed but not
/// counted when sizing the Bloom filter.
pub const ESTIMATED_EXTENSIONS: [&str; 2] = [".fna", ".fna.gz"];

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    let path_str = path.to_string_lossy();
    extensions.iter().any(|ext| path_str.ends_with(ext))
}

/// Check if the path is a reference file the index builder ingests
#[must_use]
pub fn is_reference_file(path: &Path) -> bool {
    has_extension(path, &REFERENCE_EXTENSIONS)
}

/// Check if the path is a file included in capacity estimation
#[must_use]
pub fn is_estimated_file(path: &Path) -> bool {
    has_extension(path, &ESTIMATED_EXTENSIONS)
}

/// Check if the path is a gzipped file
#[must_use]
pub fn is_gzipped(path: &Path) -> bool {
    path.to_string_lossy().ends_with(".gz")
}

/// Open a file for line reading, decompressing gzip input.
///
/// # Errors
///
/// Returns `ParseError::Open` if the file cannot be opened.
pub fn open_reader(path: &Path) -> Result<Box<dyn BufRead + Send>, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Stream the records of a FASTA file.
///
/// # Errors
///
/// Returns `ParseError::Open` if the file cannot be opened. Read failures
/// surface from the iterator.
pub fn read_file(path: &Path) -> Result<FastaRecords<Box<dyn BufRead + Send>>, ParseError> {
    Ok(FastaRecords::new(open_reader(path)?))
}

/// Extract the reference id from a header line.
///
/// The id is the first whitespace-delimited token with the `>` marker removed.
/// Lines without the marker, or with nothing after it, log a warning and map
/// to the shared `Unknown` id.
#[must_use]
pub fn reference_name(header_line: &str) -> ReferenceId {
    // "> name" has a first token of ">" itself, which carries no name
    let name = header_line
        .strip_prefix(RECORD_MARKER)
        .filter(|rest| !rest.starts_with(char::is_whitespace))
        .and_then(|rest| rest.split_whitespace().next());

    match name {
        Some(name) => ReferenceId::new(name),
        None => {
            warn!("Header line format is incorrect: '{header_line}'");
            ReferenceId::unknown()
        }
    }
}

/// A single FASTA-style record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    /// Header line including the marker; empty for sequence data preceding the first header
    pub header: String,

    /// Concatenated sequence body without line breaks
    pub sequence: String,
}

impl FastaRecord {
    /// Reference id derived from the header
    #[must_use]
    pub fn reference_id(&self) -> ReferenceId {
        reference_name(&self.header)
    }
}

/// Iterator over the records of a FASTA-style stream
pub struct FastaRecords<R> {
    reader: R,
    line: String,
    pending_header: Option<String>,
    done: bool,
}

impl<R: BufRead> FastaRecords<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            pending_header: None,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for FastaRecords<R> {
    type Item = Result<FastaRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut sequence = String::new();
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => {
                    self.done = true;
                    let header = self.pending_header.take();
                    if header.is_none() && sequence.is_empty() {
                        return None;
                    }
                    return Some(Ok(FastaRecord {
                        header: header.unwrap_or_default(),
                        sequence,
                    }));
                }
                Ok(_) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(ParseError::Io(e)));
                }
            }

            let line = self.line.trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with(RECORD_MARKER) {
                let header = line.to_string();
                match self.pending_header.replace(header) {
                    Some(previous) => {
                        return Some(Ok(FastaRecord {
                            header: previous,
                            sequence,
                        }));
                    }
                    None if !sequence.is_empty() => {
                        return Some(Ok(FastaRecord {
                            header: String::new(),
                            sequence,
                        }));
                    }
                    None => {}
                }
            } else {
                sequence.push_str(line);
            }
        }
    }
}
