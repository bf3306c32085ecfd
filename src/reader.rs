//! Stream splitter for the serialized layout: one header line terminated
//! by `\r\n`, then raw bytes that may themselves contain `\r\n`.

use std::io::{self, BufRead, BufReader, Read};

pub const DELIMITER: &[u8; 2] = b"\r\n";

/// Payload chunk size used unless overridden.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Iterator over the chunks of a delimited stream.
///
/// The first item is the header line without its delimiter. Every later
/// item is at most `chunk_size` raw bytes; the delimiter is not searched
/// for again. Whatever is buffered at end of stream is yielded last.
pub struct DelimitedChunks<R: Read> {
    reader: BufReader<R>,
    chunk_size: usize,
    header_done: bool,
    header_terminated: bool,
    finished: bool,
}

impl<R: Read> DelimitedChunks<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            chunk_size: DEFAULT_CHUNK_SIZE,
            header_done: false,
            header_terminated: false,
            finished: false,
        }
    }

    /// Sets the maximum payload chunk size; zero is treated as one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Whether the header line ended with the delimiter. `false` until the
    /// header has been read, and after a header flushed at end of stream.
    pub fn header_terminated(&self) -> bool {
        self.header_terminated
    }

    fn read_header(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        loop {
            let read = self.reader.read_until(b'\n', &mut line)?;
            if read == 0 {
                // EOF before any delimiter: flush what we have
                self.finished = true;
                return Ok((!line.is_empty()).then_some(line));
            }
            if line.ends_with(DELIMITER) {
                line.truncate(line.len() - DELIMITER.len());
                self.header_terminated = true;
                return Ok(Some(line));
            }
        }
    }

    fn read_payload_chunk(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut chunk = Vec::with_capacity(self.chunk_size.min(DEFAULT_CHUNK_SIZE));
        let limit = self.chunk_size as u64;
        self.reader.by_ref().take(limit).read_to_end(&mut chunk)?;
        if chunk.len() < self.chunk_size {
            self.finished = true;
        }
        Ok((!chunk.is_empty()).then_some(chunk))
    }
}

impl<R: Read> Iterator for DelimitedChunks<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = if self.header_done {
            self.read_payload_chunk()
        } else {
            self.header_done = true;
            self.read_header()
        };

        match result {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
