//! On-disk format of a built index.
//!
//! An index file starts with eight magic bytes, followed by two bincode-encoded
//! values written back to back:
//!
//! 1. [`IndexHeader`]: format version, build timestamp, k-mer size
//! 2. the payload: Bloom filter state (bit words, bit count, hash count) and the
//!    three catalog maps (reverse index, raw counts, accessions)
//!
//! The magic bytes and header are checked before the payload, so files from
//! another tool or an incompatible version are rejected without decoding the rest.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::bloom::{BloomFilter, BloomState};
use crate::catalog::index::KmerIndex;
use crate::catalog::store::ReferenceCatalog;
use crate::catalog::IndexError;

/// File name of the index inside its output directory
pub const INDEX_FILE_NAME: &str = "bloom_filter.bin";

/// Current index format version
pub const FORMAT_VERSION: u32 = 1;

const MAGIC: [u8; 8] = *b"KMERSCRN";

/// Leading record of every index file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexHeader {
    pub format_version: u32,
    pub created_at: String,
    pub kmer_size: u64,
}

#[derive(Serialize)]
struct PayloadRef<'a> {
    bloom: BloomState,
    catalog: &'a ReferenceCatalog,
}

#[derive(Deserialize)]
struct Payload {
    bloom: BloomState,
    catalog: ReferenceCatalog,
}

/// Write an index into `directory`, creating it if needed.
///
/// Returns the path of the written file.
///
/// # Errors
///
/// Returns `IndexError::Io` if the directory or file cannot be written, or
/// `IndexError::Codec` if encoding fails.
pub fn save(index: &KmerIndex, directory: &Path) -> Result<PathBuf, IndexError> {
    std::fs::create_dir_all(directory)?;
    let path = directory.join(INDEX_FILE_NAME);

    let mut writer = BufWriter::new(File::create(&path)?);
    write_index(index, &mut writer)?;
    writer.flush()?;

    info!("Bloom filter saved to {}", path.display());
    Ok(path)
}

/// Encode an index to any writer.
///
/// # Errors
///
/// Returns `IndexError::Codec` if encoding or writing fails.
pub fn write_index<W: Write>(index: &KmerIndex, writer: &mut W) -> Result<(), IndexError> {
    let header = IndexHeader {
        format_version: FORMAT_VERSION,
        created_at: index.created_at().to_string(),
        kmer_size: index.kmer_size() as u64,
    };
    let payload = PayloadRef {
        bloom: BloomState::from(index.bloom()),
        catalog: index.catalog(),
    };

    writer.write_all(&MAGIC)?;
    bincode::serialize_into(&mut *writer, &header)?;
    bincode::serialize_into(&mut *writer, &payload)?;
    Ok(())
}

/// Resolve an index location: a directory means the index file inside it
fn resolve(path: &Path) -> Result<PathBuf, IndexError> {
    let resolved = if path.is_dir() {
        path.join(INDEX_FILE_NAME)
    } else {
        path.to_path_buf()
    };

    if resolved.exists() {
        Ok(resolved)
    } else {
        Err(IndexError::NotFound(resolved))
    }
}

/// Load a complete index into memory.
///
/// `path` may be the index file or the directory it was saved into.
///
/// # Errors
///
/// Returns `IndexError::NotFound` if no index exists at `path`,
/// `IndexError::InvalidFormat` or `IndexError::UnsupportedVersion` if the
/// header is not recognized, or `IndexError::Codec` if decoding fails.
pub fn load(path: &Path) -> Result<KmerIndex, IndexError> {
    let path = resolve(path)?;
    let mut reader = BufReader::new(File::open(&path)?);
    let index = read_index(&mut reader)?;

    info!("Bloom filter loaded from {}", path.display());
    Ok(index)
}

/// Decode an index from any reader.
///
/// # Errors
///
/// See [`load`].
pub fn read_index<R: Read>(reader: &mut R) -> Result<KmerIndex, IndexError> {
    let header = read_checked_header(reader)?;
    let payload: Payload = bincode::deserialize_from(&mut *reader)?;

    let kmer_size = usize::try_from(header.kmer_size)
        .map_err(|_| IndexError::InvalidFormat(format!("k-mer size {}", header.kmer_size)))?;
    let bloom = BloomFilter::try_from(payload.bloom)?;

    Ok(KmerIndex::with_created_at(
        kmer_size,
        bloom,
        payload.catalog,
        header.created_at,
    ))
}

/// Read only the header of an index file.
///
/// # Errors
///
/// See [`load`].
pub fn read_header(path: &Path) -> Result<IndexHeader, IndexError> {
    let path = resolve(path)?;
    let mut reader = BufReader::new(File::open(path)?);
    read_checked_header(&mut reader)
}

fn read_checked_header<R: Read>(reader: &mut R) -> Result<IndexHeader, IndexError> {
    let mut magic = [0u8; 8];
    if reader.read_exact(&mut magic).is_err() || magic != MAGIC {
        return Err(IndexError::InvalidFormat(
            "not a kmer-screen index".to_string(),
        ));
    }

    let header: IndexHeader = bincode::deserialize_from(&mut *reader)
        .map_err(|e| IndexError::InvalidFormat(format!("unreadable header: {e}")))?;

    if header.format_version != FORMAT_VERSION {
        return Err(IndexError::UnsupportedVersion {
            found: header.format_version,
            expected: FORMAT_VERSION,
        });
    }
    Ok(header)
}
