//! Session-level engines.
//!
//! - **editor**: raw line editor with server-side echo
//! - **session**: per-connection state machine driving prompts and the script
//!
//! # Architecture
//!
//! ```text
//! Session
//! ├── Channel (client byte stream)
//! ├── LineEditor (input lines)
//! ├── SessionContext (last decoy shown)
//! └── Animator (pacer + jitter source)
//! ```

use std::io::{Read, Write};

pub mod editor;
pub mod session;

/// Duplex byte stream to one client
pub trait Channel: Read + Write + Send {}

impl<T: Read + Write + Send> Channel for T {}

#[cfg(test)]
pub(crate) use self::mock::MockChannel;

#[cfg(test)]
mod mock {
    use std::collections::VecDeque;
    use std::io::{self, Read, Write};

    /// In-memory channel: scripted input chunks, captured output
    #[derive(Debug, Default)]
    pub(crate) struct MockChannel {
        input: VecDeque<Vec<u8>>,
        pub output: Vec<u8>,
        fail_reads: bool,
        fail_writes: bool,
    }

    impl MockChannel {
        /// All input delivered by one read
        pub fn new(input: &[u8]) -> Self {
            Self::chunked(&[input])
        }

        /// Each chunk delivered by its own read
        pub fn chunked(chunks: &[&[u8]]) -> Self {
            Self {
                input: chunks.iter().filter(|c| !c.is_empty()).map(|c| c.to_vec()).collect(),
                ..Self::default()
            }
        }

        /// Reads fail instead of reporting end of stream
        pub fn fail_reads_after_input(mut self) -> Self {
            self.fail_reads = true;
            self
        }

        /// Every write fails
        pub fn fail_writes(mut self) -> Self {
            self.fail_writes = true;
            self
        }

        pub fn output_str(&self) -> String {
            String::from_utf8_lossy(&self.output).into_owned()
        }
    }

    impl Read for MockChannel {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let Some(chunk) = self.input.front_mut() else {
                if self.fail_reads {
                    return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
                }
                return Ok(0);
            };

            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            chunk.drain(..n);
            if chunk.is_empty() {
                self.input.pop_front();
            }
            Ok(n)
        }
    }

    impl Write for MockChannel {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail_writes {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.output.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
