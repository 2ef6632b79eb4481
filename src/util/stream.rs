use std::{
    fmt::Display,
    io::{self, Read},
};

use futures::{Stream, StreamExt};

use crate::util::poll;

pub const CHUNK_SIZE: usize = 256 * 1024;

/// Blocking `Read` over an SDK byte stream. Chunks are pulled one at a time
/// as the caller reads.
pub struct StreamReader<S> {
    stream: S,
    chunk: Vec<u8>,
    pos: usize,
    done: bool,
}

impl<S> StreamReader<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            chunk: Vec::new(),
            pos: 0,
            done: false,
        }
    }
}

impl<S, B, E> Read for StreamReader<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Display,
{
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }

        while self.pos >= self.chunk.len() {
            if self.done {
                return Ok(0);
            }

            match poll::poll_until_ready(self.stream.next()) {
                None => self.done = true,
                Some(Err(err)) => {
                    self.done = true;
                    return Err(io::Error::other(err.to_string()));
                }
                Some(Ok(bytes)) => {
                    self.chunk.clear();
                    self.chunk.extend_from_slice(bytes.as_ref());
                    self.pos = 0;
                }
            }
        }

        let n = out.len().min(self.chunk.len() - self.pos);
        out[..n].copy_from_slice(&self.chunk[self.pos..self.pos + n]);
        self.pos += n;

        Ok(n)
    }
}

/// Splits a reader into owned chunks for streaming uploads. Stops after the
/// first error.
pub struct ReadChunks<R> {
    reader: R,
    chunk_size: usize,
    done: bool,
}

impl<R: Read> ReadChunks<R> {
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, CHUNK_SIZE)
    }

    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size,
            done: false,
        }
    }
}

impl<R: Read> Iterator for ReadChunks<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut chunk = vec![0; self.chunk_size];
        loop {
            match self.reader.read(&mut chunk) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(n) => {
                    chunk.truncate(n);
                    return Some(Ok(chunk));
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use futures::stream;

    use super::*;

    #[test]
    fn test_stream_reader() {
        let chunks: Vec<Result<Vec<u8>, String>> =
            vec![Ok(b"hello ".to_vec()), Ok(Vec::new()), Ok(b"world".to_vec())];
        let mut reader = StreamReader::new(stream::iter(chunks));

        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();

        assert_eq!(out, "hello world");
    }

    #[test]
    fn test_stream_reader_small_buffer() {
        let chunks: Vec<Result<Vec<u8>, String>> = vec![Ok(b"abcdef".to_vec())];
        let mut reader = StreamReader::new(stream::iter(chunks));

        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ef");
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_stream_reader_error() {
        let chunks: Vec<Result<Vec<u8>, String>> =
            vec![Ok(b"abc".to_vec()), Err("connection reset".to_string())];
        let mut reader = StreamReader::new(stream::iter(chunks));

        let mut out = Vec::new();
        let err = reader.read_to_end(&mut out).unwrap_err();

        assert_eq!(err.to_string(), "connection reset");
        assert_eq!(out, b"abc");
    }

    #[test]
    fn test_read_chunks() {
        let cases = vec![
            ("", 4, vec![]),
            ("abc", 4, vec!["abc"]),
            ("abcdefghij", 4, vec!["abcd", "efgh", "ij"]),
        ];

        for (input, chunk_size, expected) in cases {
            let chunks: Vec<Vec<u8>> =
                ReadChunks::with_chunk_size(Cursor::new(input.as_bytes().to_vec()), chunk_size)
                    .map(|c| c.unwrap())
                    .collect();
            let expected: Vec<Vec<u8>> = expected.iter().map(|c| c.as_bytes().to_vec()).collect();

            assert_eq!(chunks, expected, "failed for case: {}", input);
        }
    }
}
