// src/summary/write.rs
use std::{
    io::{self, Write},
    path::Path,
};

use csv::{QuoteStyle, WriterBuilder};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use super::RankedResult;
use crate::error::{Error, Result};

/// Serialise `result` as `;`-delimited rows into `out`.
///
/// Header `<TITLE>;NUMBER_CERTIFIED_APPLICATIONS;PERCENTAGE`, then one
/// `label;count;pct%` row per entry with the percentage to one decimal.
pub fn write_to<W: Write>(result: &RankedResult, out: W) -> io::Result<()> {
    let mut wtr = WriterBuilder::new()
        .delimiter(b';')
        .quote_style(QuoteStyle::Never)
        .flexible(false)
        .from_writer(out);

    wtr.write_record([result.title, "NUMBER_CERTIFIED_APPLICATIONS", "PERCENTAGE"])?;
    for entry in &result.entries {
        let count = entry.count.to_string();
        let pct = format!("{:.1}%", result.percentage(entry.count));
        wtr.write_record([entry.label.as_str(), count.as_str(), pct.as_str()])?;
    }
    wtr.flush()
}

/// Write `result` to `path` atomically: a temp file in the same directory is
/// filled first, then renamed over the destination.
#[instrument(level = "debug", skip(result, path), fields(path = %path.as_ref().display()))]
pub fn write_results<P: AsRef<Path>>(result: &RankedResult, path: P) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    write_to(result, tmp.as_file_mut()).map_err(|e| Error::io(path, e))?;
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;

    debug!(rows = result.entries.len(), "wrote results");
    Ok(())
}
