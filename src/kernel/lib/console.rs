// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Console
//!
//! Formatted console output through a shared-memory ring. The early boot
//! path writes into the ring with [`RingConsole`] and whoever owns the serial
//! port empties it with [`drain`].

use core::fmt;

use super::ringbuf::{Consumer, Producer};

/// Largest single push issued by the console
pub const CONSOLE_CHUNK: usize = 64;

/// `core::fmt::Write` adapter over the producing end of a ring
///
/// Every `\n` is sent as `\r\n`. Writes block while the ring is full.
pub struct RingConsole<'r> {
    producer: Producer<'r>,
    chunk: usize,
}

impl<'r> RingConsole<'r> {
    /// Console writing through `producer` in pushes of at most
    /// [`CONSOLE_CHUNK`] bytes
    pub fn new(producer: Producer<'r>) -> Self {
        let chunk = CONSOLE_CHUNK.min(producer.capacity() - 1);
        Self { producer, chunk }
    }

    /// Give back the producer
    pub fn into_inner(self) -> Producer<'r> {
        self.producer
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        for piece in bytes.chunks(self.chunk) {
            self.producer.push(piece);
        }
    }
}

impl fmt::Write for RingConsole<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut lines = s.split('\n');
        if let Some(first) = lines.next() {
            self.write_bytes(first.as_bytes());
        }
        for line in lines {
            self.write_bytes(b"\r\n");
            self.write_bytes(line.as_bytes());
        }
        Ok(())
    }
}

/// Move everything currently in the ring into `sink`
///
/// Returns the number of bytes handed to the sink.
pub fn drain<F: FnMut(&[u8])>(consumer: &mut Consumer<'_>, mut sink: F) -> usize {
    let mut buf = [0u8; CONSOLE_CHUNK];
    let mut total = 0;
    loop {
        let n = consumer.pop(&mut buf);
        if n == 0 {
            return total;
        }
        sink(&buf[..n]);
        total += n;
    }
}
