// src/process/mod.rs
pub mod chunk;
pub mod pool;
pub mod split;

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    sync::{mpsc::Receiver, Arc},
    time::Instant,
};

use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::schema::ColumnResolution;
use crate::tally::Merge;

pub use chunk::{aggregate_chunk, process_chunk, Aggregate, NameTally};
pub use pool::{AbortFlag, WorkerPool};
pub use split::{plan_chunks, ChunkDescriptor, ChunkPlan};

/// Read the header line of `path` and resolve the four field columns.
pub fn resolve_columns(path: &Path) -> Result<ColumnResolution> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut header = String::new();
    let n = BufReader::new(file)
        .read_line(&mut header)
        .map_err(|e| Error::io(path, e))?;
    if n == 0 {
        return Err(Error::MissingHeader(path.to_path_buf()));
    }
    ColumnResolution::from_header(&header)
}

/// Aggregate every certified record of `path` in parallel.
///
/// The header is resolved once and shared read-only; chunks are planned
/// up front and handed to a pool of `config.workers` threads, each of which
/// opens its own handle and seeks to its range. Partial aggregates are
/// merged on the calling thread once all of them are in. The first failing
/// chunk aborts the run.
#[instrument(level = "info", skip(path, config), fields(path = %path.as_ref().display()))]
pub fn run<P: AsRef<Path>>(path: P, config: &Config) -> Result<Aggregate> {
    config.validate()?;
    let start = Instant::now();
    let path: Arc<PathBuf> = Arc::new(path.as_ref().to_path_buf());

    let columns = Arc::new(resolve_columns(&path)?);

    let file = File::open(path.as_path()).map_err(|e| Error::io(path.as_path(), e))?;
    let plan = plan_chunks(file, config.chunk_size).map_err(|e| Error::io(path.as_path(), e))?;
    let (data_start, source_len) = (plan.data_start(), plan.source_len());
    let chunks = plan
        .collect::<std::io::Result<Vec<ChunkDescriptor>>>()
        .map_err(|e| Error::io(path.as_path(), e))?;

    let pool = WorkerPool::new(config.workers)?;
    info!(
        chunks = chunks.len(),
        chunk_size = config.chunk_size,
        data_start,
        source_len,
        workers = pool.workers(),
        "planned chunks"
    );

    let abort = AbortFlag::default();
    let rx = {
        let path = Arc::clone(&path);
        let columns = Arc::clone(&columns);
        pool.dispatch(chunks.clone(), &abort, move |index, chunk: ChunkDescriptor| {
            debug!(index, start = chunk.start, len = chunk.len, "processing chunk");
            process_chunk(&path, chunk, &columns)
        })
    };

    // barrier: every partial is collected before any merging happens
    let partials = collect_partials(rx, &chunks, &abort)?;
    let merged = merge_all(partials);
    info!(
        lines = merged.lines,
        certified = merged.certified,
        states = merged.states.len(),
        soc_codes = merged.soc_codes.len(),
        elapsed = ?start.elapsed(),
        "aggregation complete"
    );
    Ok(merged)
}

/// Drain the result channel, one entry per chunk in `chunks`.
///
/// The first failure raises `abort` so queued chunks are skipped, and is
/// returned as [`Error::Chunk`] carrying that chunk's index and byte range.
pub fn collect_partials(
    rx: Receiver<(usize, Result<Aggregate>)>,
    chunks: &[ChunkDescriptor],
    abort: &AbortFlag,
) -> Result<Vec<Aggregate>> {
    let mut partials: Vec<Option<Aggregate>> = vec![None; chunks.len()];
    for (index, result) in rx {
        match result {
            Ok(partial) => partials[index] = Some(partial),
            Err(source) => {
                abort.raise();
                let chunk = chunks[index];
                warn!(index, error = %source, "chunk failed, aborting run");
                return Err(Error::Chunk {
                    index,
                    start: chunk.start,
                    len: chunk.len,
                    source: Box::new(source),
                });
            }
        }
    }
    Ok(partials.into_iter().flatten().collect())
}

/// Fold partial aggregates into one. Order does not matter.
pub fn merge_all<I: IntoIterator<Item = Aggregate>>(partials: I) -> Aggregate {
    partials.into_iter().fold(Aggregate::new(), Merge::merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::{self, Write};
    use std::sync::mpsc;
    use tempfile::NamedTempFile;
    use tracing_subscriber::{fmt, EnvFilter};

    fn init_logging() {
        let _ = fmt()
            .with_env_filter(EnvFilter::new("debug"))
            .with_test_writer()
            .try_init();
    }

    fn write_file(content: &str) -> Result<NamedTempFile> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        Ok(tmp)
    }

    fn sample() -> String {
        let mut s = String::from("CASE_STATUS;WORKSITE_STATE;SOC_CODE;SOC_NAME\n");
        let states = ["CA", "tx", "NY", "Michigan", "wa"];
        let statuses = ["CERTIFIED", "Certified", "DENIED", "CERTIFIED-WITHDRAWN"];
        for i in 0..2000 {
            s.push_str(&format!(
                "{};{};15-11{:02};JOB {}\n",
                statuses[i % statuses.len()],
                states[i % states.len()],
                i % 13,
                i % 13
            ));
        }
        s
    }

    #[test]
    fn result_is_independent_of_partitioning() -> Result<()> {
        init_logging();
        let tmp = write_file(&sample())?;

        let baseline = run(
            tmp.path(),
            &Config {
                chunk_size: 1 << 20,
                workers: 1,
            },
        )?;
        assert_eq!(baseline.lines, 2000);
        assert_eq!(baseline.certified, 1000);

        for (chunk_size, workers) in [(0, 3), (17, 2), (256, 8), (4096, 4)] {
            let agg = run(tmp.path(), &Config { chunk_size, workers })?;
            assert_eq!(agg, baseline, "chunk_size={chunk_size} workers={workers}");
        }
        Ok(())
    }

    #[test]
    fn unknown_schema_is_fatal() -> Result<()> {
        let tmp = write_file("A;B;C\n1;2;3\n")?;
        let err = run(tmp.path(), &Config::default()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { .. }));
        Ok(())
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = run("/nonexistent/certstats/input.csv", &Config::default()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn empty_file_has_no_header() -> Result<()> {
        let tmp = write_file("")?;
        let err = run(tmp.path(), &Config::default()).unwrap_err();
        assert!(matches!(err, Error::MissingHeader(_)));
        Ok(())
    }

    #[test]
    fn header_only_file_gives_empty_aggregate() -> Result<()> {
        let tmp = write_file("CASE_STATUS;WORKSITE_STATE;SOC_CODE;SOC_NAME\n")?;
        let agg = run(tmp.path(), &Config::default())?;
        assert_eq!(agg, Aggregate::new());
        Ok(())
    }

    #[test]
    fn failed_chunk_aborts_with_its_range() {
        init_logging();
        let chunks = [
            ChunkDescriptor { start: 45, len: 100 },
            ChunkDescriptor { start: 145, len: 80 },
            ChunkDescriptor { start: 225, len: 60 },
        ];
        let abort = AbortFlag::default();
        let (tx, rx) = mpsc::channel();
        tx.send((0, Ok(Aggregate::new()))).unwrap();
        tx.send((
            1,
            Err(Error::io(
                "input.csv",
                io::Error::new(io::ErrorKind::UnexpectedEof, "file shrank"),
            )),
        ))
        .unwrap();
        tx.send((2, Ok(Aggregate::new()))).unwrap();
        drop(tx);

        let err = collect_partials(rx, &chunks, &abort).unwrap_err();
        match err {
            Error::Chunk {
                index,
                start,
                len,
                source,
            } => {
                assert_eq!((index, start, len), (1, 145, 80));
                assert!(matches!(*source, Error::Io { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(abort.is_raised());
    }

    #[test]
    fn all_partials_are_collected_in_any_order() {
        let chunks = [
            ChunkDescriptor { start: 10, len: 5 },
            ChunkDescriptor { start: 15, len: 5 },
        ];
        let abort = AbortFlag::default();
        let (tx, rx) = mpsc::channel();
        let mut late = Aggregate::new();
        late.lines = 3;
        tx.send((1, Ok(late))).unwrap();
        tx.send((0, Ok(Aggregate::new()))).unwrap();
        drop(tx);

        let partials = collect_partials(rx, &chunks, &abort).unwrap();
        assert_eq!(partials.len(), 2);
        assert_eq!(merge_all(partials).lines, 3);
        assert!(!abort.is_raised());
    }
}
