//! Joining match results with an accession -> taxonomy id map.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use crate::report::table::{parse_record, write_record};
use crate::report::{column_index, ReportError, ACCESSION_COLUMN};

/// Name of the appended column
pub const TAXID_COLUMN: &str = "TaxID";

/// Value used for accessions missing from the map
pub const UNMAPPED_TAXID: &str = "N/A";

/// Read a tab-separated `accession<TAB>taxid` map.
///
/// Lines that do not have exactly two fields are skipped.
///
/// # Errors
///
/// Returns `ReportError::Io` if the file cannot be read.
pub fn load_taxid_map(path: &Path) -> Result<HashMap<String, String>, ReportError> {
    parse_taxid_map(BufReader::new(File::open(path)?))
}

/// Parse a tab-separated `accession<TAB>taxid` map from a reader.
///
/// # Errors
///
/// Returns `ReportError::Io` if reading fails.
pub fn parse_taxid_map<R: BufRead>(reader: R) -> Result<HashMap<String, String>, ReportError> {
    let mut map = HashMap::new();
    for line in reader.lines() {
        let line = line?;
        let fields: Vec<&str> = line.trim().split('\t').collect();
        if let [accession, taxid] = fields.as_slice() {
            map.insert((*accession).to_string(), (*taxid).to_string());
        }
    }
    Ok(map)
}

/// Append a `TaxID` column to a results table, rewriting it in place.
///
/// The table is rewritten into a temporary file next to it, which then
/// replaces the original. Returns the number of data rows.
///
/// # Errors
///
/// Returns `ReportError::Empty` for a file without a header,
/// `ReportError::MissingColumn` if the accession column is absent, or an IO
/// error if reading, writing or replacing the file fails.
pub fn append_taxid_column(
    results: &Path,
    taxids: &HashMap<String, String>,
) -> Result<usize, ReportError> {
    let directory = match results.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let reader = BufReader::new(File::open(results)?);
    let temp = NamedTempFile::new_in(directory)?;
    let mut writer = BufWriter::new(temp);

    let mut lines = reader.lines();
    let mut header = loop {
        match lines.next() {
            Some(line) => {
                let line = line?;
                if !line.trim().is_empty() {
                    break parse_record(line.trim_end_matches('\r'));
                }
            }
            None => return Err(ReportError::Empty(results.to_path_buf())),
        }
    };
    let accession_index = column_index(&header, ACCESSION_COLUMN)?;
    header.push(TAXID_COLUMN.to_string());
    write_record(&mut writer, &header)?;

    let mut rows = 0;
    for line in lines {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        let mut fields = parse_record(line);
        let taxid = fields
            .get(accession_index)
            .and_then(|accession| taxids.get(accession))
            .map_or(UNMAPPED_TAXID, String::as_str)
            .to_string();
        fields.push(taxid);
        write_record(&mut writer, &fields)?;
        rows += 1;
    }

    writer.flush()?;
    let temp = writer.into_inner().map_err(|e| e.into_error())?;
    temp.persist(results)?;

    info!("TaxID column added to {}", results.display());
    Ok(rows)
}
