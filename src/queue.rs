//! Block-chained byte queue for non-blocking connection I/O
//!
//! A [`ByteQueue`] is a FIFO of bytes stored in fixed-size blocks. Data is
//! appended at the tail and consumed from the head; neither operation ever
//! moves bytes that are already queued, so both are O(1) amortized no matter
//! how much is buffered.
//!
//! Layout invariants:
//! - `len` equals the payload of all blocks minus the head offset
//! - only the first block may have a non-zero consumed offset (`head`)
//! - only the last block may have free trailing space
//!
//! Every connection owns two queues: one filled from the socket and drained
//! line by line, one filled with responses and drained into the socket.

use std::collections::VecDeque;
use std::io::{self, IoSlice};

use crate::constants::buffer::BLOCK;

/// Non-blocking socket operations used by [`ByteQueue::read_from`] and
/// [`ByteQueue::write_to`]
///
/// Each call maps to exactly one underlying system call and reports
/// `ErrorKind::WouldBlock` instead of waiting.
pub trait NonBlockingIo {
    /// Read whatever is immediately available into `buf`
    fn try_read(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write as much of `bufs` as the socket accepts right now
    fn try_write_vectored(&self, bufs: &[IoSlice<'_>]) -> io::Result<usize>;
}

impl NonBlockingIo for tokio::net::TcpStream {
    #[inline]
    fn try_read(&self, buf: &mut [u8]) -> io::Result<usize> {
        tokio::net::TcpStream::try_read(self, buf)
    }

    #[inline]
    fn try_write_vectored(&self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        tokio::net::TcpStream::try_write_vectored(self, bufs)
    }
}

/// Outcome of a single non-blocking transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// This many bytes moved between queue and socket
    Bytes(usize),
    /// The socket is not ready; nothing moved
    WouldBlock,
    /// The peer closed the connection (zero-byte read or write)
    Closed,
}

/// FIFO byte buffer made of 16KB blocks
#[derive(Debug, Default)]
pub struct ByteQueue {
    blocks: VecDeque<Box<[u8]>>,
    /// Bytes already consumed from the first block
    head: usize,
    /// Bytes currently queued
    len: usize,
}

impl ByteQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued bytes
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated blocks
    #[must_use]
    #[inline]
    pub fn blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Free space at the end of the last block
    #[inline]
    fn tail_free(&self) -> usize {
        self.blocks.len() * BLOCK - self.head - self.len
    }

    fn new_block() -> Box<[u8]> {
        vec![0u8; BLOCK].into_boxed_slice()
    }

    /// Queued bytes as a sequence of contiguous slices, head first
    pub fn segments(&self) -> impl Iterator<Item = &[u8]> + '_ {
        let mut remaining = self.len;
        self.blocks.iter().enumerate().map_while(move |(i, block)| {
            if remaining == 0 {
                return None;
            }
            let start = if i == 0 { self.head } else { 0 };
            let n = (BLOCK - start).min(remaining);
            remaining -= n;
            Some(&block[start..start + n])
        })
    }

    /// Append bytes at the tail, allocating blocks as needed
    pub fn append(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let free = self.tail_free();
            if free == 0 {
                self.blocks.push_back(Self::new_block());
                continue;
            }

            let start = BLOCK - free;
            let n = free.min(data.len());
            if let Some(tail) = self.blocks.back_mut() {
                tail[start..start + n].copy_from_slice(&data[..n]);
            }
            self.len += n;
            data = &data[n..];
        }
    }

    /// Append a string at the tail
    #[inline]
    pub fn append_str(&mut self, s: &str) {
        self.append(s.as_bytes());
    }

    /// Drop the first `n` queued bytes
    ///
    /// Fully consumed head blocks are released; a partially consumed head
    /// block only moves its offset.
    ///
    /// # Panics
    /// Panics if `n` exceeds [`len`](Self::len).
    pub fn remove_start(&mut self, n: usize) {
        assert!(
            n <= self.len,
            "remove_start({}) exceeds queued length {}",
            n,
            self.len
        );

        self.len -= n;
        let mut offset = self.head + n;
        while offset >= BLOCK {
            self.blocks.pop_front();
            offset -= BLOCK;
        }
        self.head = offset;

        if self.len == 0 {
            self.blocks.clear();
            self.head = 0;
        }
    }

    /// Copy up to `buf.len()` bytes from the head into `buf` and remove them
    ///
    /// Returns the number of bytes copied.
    pub fn extract_start(&mut self, buf: &mut [u8]) -> usize {
        let mut copied = 0;
        for segment in self.segments() {
            let n = segment.len().min(buf.len() - copied);
            buf[copied..copied + n].copy_from_slice(&segment[..n]);
            copied += n;
            if copied == buf.len() {
                break;
            }
        }
        self.remove_start(copied);
        copied
    }

    /// Position of the first `needle` byte, scanning across block boundaries
    /// without copying
    #[must_use]
    pub fn find(&self, needle: u8) -> Option<usize> {
        let mut offset = 0;
        for segment in self.segments() {
            if let Some(pos) = memchr::memchr(needle, segment) {
                return Some(offset + pos);
            }
            offset += segment.len();
        }
        None
    }

    /// Remove and return the next complete line
    ///
    /// The trailing `\n` is stripped, and a `\r` before it as well. Returns
    /// `None` while no `\n` is buffered; partial lines stay queued.
    pub fn read_line(&mut self) -> Option<String> {
        let pos = self.find(b'\n')?;
        let mut line = vec![0u8; pos + 1];
        self.extract_start(&mut line);

        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        Some(match String::from_utf8(line) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }

    /// Read once from `src` into the free space at the tail
    ///
    /// Exactly one read call is issued. A fresh block is allocated first when
    /// the tail is full and released again if nothing arrived.
    ///
    /// # Errors
    /// Returns any I/O error other than `WouldBlock`.
    pub fn read_from<S: NonBlockingIo + ?Sized>(&mut self, src: &S) -> io::Result<Transfer> {
        let pushed = if self.tail_free() == 0 {
            self.blocks.push_back(Self::new_block());
            true
        } else {
            false
        };

        let start = BLOCK - self.tail_free();
        let result = match self.blocks.back_mut() {
            Some(tail) => src.try_read(&mut tail[start..]),
            None => Ok(0),
        };

        match result {
            Ok(n) if n > 0 => {
                self.len += n;
                Ok(Transfer::Bytes(n))
            }
            other => {
                if pushed {
                    self.blocks.pop_back();
                }
                match other {
                    Ok(_) => Ok(Transfer::Closed),
                    Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(Transfer::WouldBlock),
                    Err(e) => Err(e),
                }
            }
        }
    }

    /// Write queued bytes to `dst` with one vectored write call
    ///
    /// Whatever the socket accepted is removed from the head.
    ///
    /// # Errors
    /// Returns any I/O error other than `WouldBlock`.
    pub fn write_to<S: NonBlockingIo + ?Sized>(&mut self, dst: &S) -> io::Result<Transfer> {
        if self.is_empty() {
            return Ok(Transfer::Bytes(0));
        }

        let result = {
            let slices: Vec<IoSlice<'_>> = self.segments().map(IoSlice::new).collect();
            dst.try_write_vectored(&slices)
        };
        match result {
            Ok(0) => Ok(Transfer::Closed),
            Ok(n) => {
                self.remove_start(n);
                Ok(Transfer::Bytes(n))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(Transfer::WouldBlock),
            Err(e) => Err(e),
        }
    }
}
