// src/process/split.rs
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};

/// A contiguous, line-aligned byte range of the input's data region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkDescriptor {
    pub start: u64,
    pub len: u64,
}

impl ChunkDescriptor {
    pub fn end(&self) -> u64 {
        self.start + self.len
    }
}

/// Iterator over the chunks of a seekable source.
///
/// The header line is skipped. Each chunk starts where the previous one
/// ended, advances `target` bytes, then extends to the next `\n`
/// (inclusive), so no line is ever split. A trailing line without a
/// terminator ends the last chunk at end of input. The sequence is finite;
/// calling [`plan_chunks`] again on the same source restarts it.
pub struct ChunkPlan<R> {
    reader: BufReader<R>,
    target: u64,
    pos: u64,
    source_len: u64,
    scratch: Vec<u8>,
    failed: bool,
}

/// Plan line-aligned chunks of roughly `target` bytes over `source`.
pub fn plan_chunks<R: Read + Seek>(source: R, target: u64) -> io::Result<ChunkPlan<R>> {
    let mut reader = BufReader::new(source);
    let source_len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;

    let mut header = Vec::new();
    let header_len = reader.read_until(b'\n', &mut header)? as u64;
    // a header without a terminator leaves no data region
    let pos = if header.last() == Some(&b'\n') {
        header_len
    } else {
        source_len
    };

    Ok(ChunkPlan {
        reader,
        target,
        pos,
        source_len,
        scratch: Vec::new(),
        failed: false,
    })
}

impl<R: Read + Seek> ChunkPlan<R> {
    /// Offset of the first data byte, i.e. just past the header.
    pub fn data_start(&self) -> u64 {
        self.pos
    }

    pub fn source_len(&self) -> u64 {
        self.source_len
    }

    fn next_end(&mut self) -> io::Result<u64> {
        let seek_to = self.pos.saturating_add(self.target);
        if seek_to >= self.source_len {
            return Ok(self.source_len);
        }
        self.reader.seek(SeekFrom::Start(seek_to))?;
        self.scratch.clear();
        let n = self.reader.read_until(b'\n', &mut self.scratch)? as u64;
        Ok(seek_to + n)
    }
}

impl<R: Read + Seek> Iterator for ChunkPlan<R> {
    type Item = io::Result<ChunkDescriptor>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.source_len {
            return None;
        }
        match self.next_end() {
            Ok(end) => {
                let chunk = ChunkDescriptor {
                    start: self.pos,
                    len: end - self.pos,
                };
                self.pos = end;
                Some(Ok(chunk))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
