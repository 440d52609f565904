// Kinescope
// Copyright (c) 2026 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cmp;
use std::io;
use std::io::{Read, Seek, SeekFrom};

use super::{MediaSource, ReadBytes};

/// `MediaSourceStreamOptions` specifies the buffering behaviour of a `MediaSourceStream`.
pub struct MediaSourceStreamOptions {
    /// The maximum buffer size. Must be a power of 2. Default 64kB.
    pub buffer_len: usize,
}

impl Default for MediaSourceStreamOptions {
    fn default() -> Self {
        MediaSourceStreamOptions { buffer_len: 64 * 1024 }
    }
}

/// `MediaSourceStream` is the main reader type for Kinescope.
///
/// By using type erasure and dynamic dispatch, `MediaSourceStream` wraps and hides the inner
/// reader from the consumer, allowing any typical `Read`er to be used with a demuxer in a generic
/// way, selectable at runtime.
///
/// `MediaSourceStream` is read-ahead buffered to reduce the inefficiencies of small reads against
/// the source.
pub struct MediaSourceStream {
    /// The source reader.
    inner: Box<dyn MediaSource>,
    /// The read-ahead buffer filled from the inner reader.
    buf: Box<[u8]>,
    /// The index of the next readable byte in the buffer.
    pos: usize,
    /// The index just past the last readable byte in the buffer.
    end: usize,
    /// The absolute source position of the first byte of the buffer.
    abs_pos: u64,
}

impl MediaSourceStream {
    pub fn new(source: Box<dyn MediaSource>, options: MediaSourceStreamOptions) -> Self {
        assert!(options.buffer_len.is_power_of_two());

        MediaSourceStream {
            inner: source,
            buf: vec![0u8; options.buffer_len].into_boxed_slice(),
            pos: 0,
            end: 0,
            abs_pos: 0,
        }
    }

    /// Returns if the underlying source is seekable.
    pub fn is_seekable(&self) -> bool {
        self.inner.is_seekable()
    }

    /// Returns the length of the underlying source in bytes, if known.
    pub fn byte_len(&self) -> Option<u64> {
        self.inner.byte_len()
    }

    /// Seeks the stream to the given absolute position.
    ///
    /// If the position is already buffered the seek is satisfied without touching the underlying
    /// source.
    pub fn seek(&mut self, pos: u64) -> io::Result<u64> {
        let buf_start = self.abs_pos;
        let buf_end = self.abs_pos + self.end as u64;

        if pos >= buf_start && pos < buf_end {
            self.pos = (pos - buf_start) as usize;
            return Ok(pos);
        }

        let seeked = self.inner.seek(SeekFrom::Start(pos))?;

        // Discard the buffer.
        self.pos = 0;
        self.end = 0;
        self.abs_pos = seeked;

        Ok(seeked)
    }

    /// The number of unread bytes currently buffered.
    fn unread_len(&self) -> usize {
        self.end - self.pos
    }

    /// Refills the read-ahead buffer from the inner reader. At least one byte will be buffered,
    /// otherwise an end-of-stream error is returned.
    fn fetch(&mut self) -> io::Result<()> {
        if self.pos < self.end {
            return Ok(());
        }

        self.abs_pos += self.end as u64;
        self.pos = 0;
        self.end = 0;

        let count = self.inner.read(&mut self.buf)?;

        if count == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "end of stream"));
        }

        self.end = count;
        Ok(())
    }
}

impl ReadBytes for MediaSourceStream {
    #[inline(always)]
    fn read_byte(&mut self) -> io::Result<u8> {
        self.fetch()?;

        let byte = self.buf[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    fn read_quad_bytes(&mut self) -> io::Result<[u8; 4]> {
        let mut bytes = [0u8; 4];
        self.read_buf_exact(&mut bytes)?;
        Ok(bytes)
    }

    fn read_buf_exact(&mut self, mut buf: &mut [u8]) -> io::Result<()> {
        while !buf.is_empty() {
            self.fetch()?;

            let count = cmp::min(buf.len(), self.unread_len());

            buf[..count].copy_from_slice(&self.buf[self.pos..self.pos + count]);
            self.pos += count;

            buf = &mut buf[count..];
        }

        Ok(())
    }

    fn ignore_bytes(&mut self, mut count: u64) -> io::Result<()> {
        while count > 0 {
            self.fetch()?;

            let discard = cmp::min(count, self.unread_len() as u64);
            self.pos += discard as usize;
            count -= discard;
        }

        Ok(())
    }

    #[inline(always)]
    fn pos(&self) -> u64 {
        self.abs_pos + self.pos as u64
    }
}

#[cfg(test)]
mod tests {
    use super::{MediaSourceStream, MediaSourceStreamOptions, ReadBytes};
    use std::io::Cursor;

    fn make_stream(data: Vec<u8>) -> MediaSourceStream {
        MediaSourceStream::new(
            Box::new(Cursor::new(data)),
            MediaSourceStreamOptions { buffer_len: 8 },
        )
    }

    #[test]
    fn verify_reads_across_buffer_boundary() {
        let data = (0u8..32).collect::<Vec<u8>>();
        let mut mss = make_stream(data);

        assert_eq!(mss.read_u32().unwrap(), u32::from_le_bytes([0, 1, 2, 3]));

        let mut buf = [0u8; 10];
        mss.read_buf_exact(&mut buf).unwrap();
        assert_eq!(&buf, &[4, 5, 6, 7, 8, 9, 10, 11, 12, 13]);
        assert_eq!(mss.pos(), 14);
    }

    #[test]
    fn verify_seek_within_and_outside_buffer() {
        let data = (0u8..64).collect::<Vec<u8>>();
        let mut mss = make_stream(data);

        assert_eq!(mss.read_byte().unwrap(), 0);

        // Within the buffered window.
        mss.seek(4).unwrap();
        assert_eq!(mss.read_byte().unwrap(), 4);

        // Outside the buffered window.
        mss.seek(40).unwrap();
        assert_eq!(mss.read_byte().unwrap(), 40);
        assert_eq!(mss.pos(), 41);

        // Backwards.
        mss.seek(2).unwrap();
        assert_eq!(mss.read_byte().unwrap(), 2);
    }

    #[test]
    fn verify_ignore_bytes() {
        let data = (0u8..32).collect::<Vec<u8>>();
        let mut mss = make_stream(data);

        mss.ignore_bytes(20).unwrap();
        assert_eq!(mss.read_byte().unwrap(), 20);

        assert!(mss.ignore_bytes(100).is_err());
    }
}
