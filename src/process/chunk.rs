// src/process/chunk.rs
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use tracing::trace;

use super::split::ChunkDescriptor;
use crate::error::{Error, Result};
use crate::record::Record;
use crate::schema::ColumnResolution;
use crate::tally::{Merge, Tally};

/// Display names seen for one SOC code. `None` counts records that had a
/// code but no usable name.
pub type NameTally = Tally<Option<String>, u64>;

/// Counts over certified records. Produced per chunk, then merged into the
/// final aggregate for the whole file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub states: Tally<String, u64>,
    pub soc_codes: Tally<String, u64>,
    pub soc_names: Tally<String, NameTally>,
    /// Data lines read, certified or not.
    pub lines: u64,
    /// Certified records among them.
    pub certified: u64,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one cleaned record into the counts. Records that are not
    /// certified contribute nothing but the line count.
    pub fn observe(&mut self, record: Record) {
        self.lines += 1;
        if !record.is_certified() {
            return;
        }
        self.certified += 1;

        if let Some(state) = record.work_state {
            self.states.increment(state);
        }
        if let Some(code) = record.soc_code {
            self.soc_codes.increment(code.clone());
            let mut names = NameTally::new();
            names.increment(record.soc_name);
            self.soc_names.add(code, names);
        }
    }
}

impl Merge for Aggregate {
    fn merge(self, other: Self) -> Self {
        Self {
            states: self.states.merge(other.states),
            soc_codes: self.soc_codes.merge(other.soc_codes),
            soc_names: self.soc_names.merge(other.soc_names),
            lines: self.lines.merge(other.lines),
            certified: self.certified.merge(other.certified),
        }
    }
}

/// Clean and count every line of a chunk's bytes.
pub fn aggregate_chunk(bytes: &[u8], columns: &ColumnResolution) -> Aggregate {
    let text = String::from_utf8_lossy(bytes);
    let mut agg = Aggregate::new();
    for line in text.lines() {
        agg.observe(Record::parse(line, columns));
    }
    trace!(lines = agg.lines, certified = agg.certified, "aggregated chunk");
    agg
}

/// Read exactly the bytes of `chunk` through a handle owned by the caller.
pub fn read_chunk(path: &Path, chunk: ChunkDescriptor) -> Result<Vec<u8>> {
    let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
    file.seek(SeekFrom::Start(chunk.start))
        .map_err(|e| Error::io(path, e))?;
    let mut buf = vec![0u8; chunk.len as usize];
    file.read_exact(&mut buf).map_err(|e| Error::io(path, e))?;
    Ok(buf)
}

/// Read and aggregate one chunk of the file at `path`.
pub fn process_chunk(
    path: &Path,
    chunk: ChunkDescriptor,
    columns: &ColumnResolution,
) -> Result<Aggregate> {
    let bytes = read_chunk(path, chunk)?;
    Ok(aggregate_chunk(&bytes, columns))
}
