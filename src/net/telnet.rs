//! Telnet framing for raw-mode clients
//!
//! A telnet client starts in line mode with local echo. Offering
//! `WILL ECHO` and `WILL SUPPRESS-GO-AHEAD` switches it to character mode
//! with the server echoing, which is what the line editor expects.
//! Everything else the client proposes is refused.
//!
//! [`TelnetStream`] strips command sequences from the input, so the layers
//! above only ever see data bytes.

use std::io::{self, Read, Write};

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;

const OPT_ECHO: u8 = 1;
const OPT_SGA: u8 = 3;

/// Input decoder state, kept across reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decode {
    Data,
    Iac,
    /// Waiting for the option byte of WILL/WONT/DO/DONT
    Option(u8),
    Sub,
    SubIac,
}

/// Byte stream with telnet commands filtered out
pub struct TelnetStream<S> {
    inner: S,
    state: Decode,
    replies: Vec<u8>,
}

impl<S: Read + Write> TelnetStream<S> {
    /// Wrap `inner` and send the character-mode offer
    pub fn negotiate(mut inner: S) -> io::Result<Self> {
        inner.write_all(&[IAC, WILL, OPT_ECHO, IAC, WILL, OPT_SGA])?;
        inner.flush()?;
        Ok(Self {
            inner,
            state: Decode::Data,
            replies: Vec::new(),
        })
    }

    /// Filter `buf[..n]` in place, returning the data length
    fn decode(&mut self, buf: &mut [u8], n: usize) -> usize {
        let mut out = 0;
        for i in 0..n {
            let byte = buf[i];
            self.state = match (self.state, byte) {
                (Decode::Data, IAC) => Decode::Iac,
                (Decode::Data, b) => {
                    buf[out] = b;
                    out += 1;
                    Decode::Data
                }
                (Decode::Iac, IAC) => {
                    buf[out] = IAC;
                    out += 1;
                    Decode::Data
                }
                (Decode::Iac, cmd @ (WILL | WONT | DO | DONT)) => Decode::Option(cmd),
                (Decode::Iac, SB) => Decode::Sub,
                // NOP, GA, AYT and friends carry no data
                (Decode::Iac, _) => Decode::Data,
                (Decode::Option(cmd), opt) => {
                    self.answer(cmd, opt);
                    Decode::Data
                }
                (Decode::Sub, IAC) => Decode::SubIac,
                (Decode::Sub, _) => Decode::Sub,
                (Decode::SubIac, SE) => Decode::Data,
                (Decode::SubIac, _) => Decode::Sub,
            };
        }
        out
    }

    /// Refuse anything that was not offered
    fn answer(&mut self, cmd: u8, opt: u8) {
        match cmd {
            WILL => self.replies.extend_from_slice(&[IAC, DONT, opt]),
            DO if opt != OPT_ECHO && opt != OPT_SGA => {
                self.replies.extend_from_slice(&[IAC, WONT, opt]);
            }
            _ => {}
        }
    }

    fn send_replies(&mut self) -> io::Result<()> {
        if self.replies.is_empty() {
            return Ok(());
        }
        let replies = std::mem::take(&mut self.replies);
        self.inner.write_all(&replies)?;
        self.inner.flush()
    }

    #[cfg(test)]
    fn get_ref(&self) -> &S {
        &self.inner
    }
}

impl<S: Read + Write> Read for TelnetStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            let n = self.inner.read(buf)?;
            if n == 0 {
                return Ok(0);
            }
            let data = self.decode(buf, n);
            self.send_replies()?;
            // A read that held only commands must not look like end of stream
            if data > 0 {
                return Ok(data);
            }
        }
    }
}

impl<S: Read + Write> Write for TelnetStream<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.contains(&IAC) {
            let mut escaped = Vec::with_capacity(buf.len() + 4);
            for &b in buf {
                escaped.push(b);
                if b == IAC {
                    escaped.push(IAC);
                }
            }
            self.inner.write_all(&escaped)?;
        } else {
            self.inner.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MockChannel;
    use pretty_assertions::assert_eq;

    fn read_all<S: Read + Write>(stream: &mut TelnetStream<S>) -> Vec<u8> {
        let mut data = Vec::new();
        let mut buf = [0u8; 64];
        loop {
            match stream.read(&mut buf).unwrap() {
                0 => return data,
                n => data.extend_from_slice(&buf[..n]),
            }
        }
    }

    #[test]
    fn test_negotiate_offers_echo_and_sga() {
        let stream = TelnetStream::negotiate(MockChannel::new(b"")).unwrap();
        assert_eq!(stream.get_ref().output, vec![IAC, WILL, OPT_ECHO, IAC, WILL, OPT_SGA]);
    }

    #[test]
    fn test_strips_commands_and_refuses_options() {
        // DO ECHO, WILL NAWS (31), SB NAWS ... SE, then data
        let input = [
            IAC, DO, OPT_ECHO, IAC, WILL, 31, IAC, SB, 31, 0, 80, 0, 24, IAC, SE, b'h', b'i',
        ];
        let mut stream = TelnetStream::negotiate(MockChannel::new(&input)).unwrap();
        assert_eq!(read_all(&mut stream), b"hi".to_vec());
        assert_eq!(&stream.get_ref().output[6..], &[IAC, DONT, 31]);
    }

    #[test]
    fn test_refuses_unoffered_do() {
        let mut stream = TelnetStream::negotiate(MockChannel::new(&[IAC, DO, 24, b'x'])).unwrap();
        assert_eq!(read_all(&mut stream), b"x".to_vec());
        assert_eq!(&stream.get_ref().output[6..], &[IAC, WONT, 24]);
    }

    #[test]
    fn test_sequence_split_across_reads() {
        let chunks: [&[u8]; 3] = [b"a\xff", &[DO, OPT_SGA, IAC], &[IAC, b'b']];
        let mut stream = TelnetStream::negotiate(MockChannel::chunked(&chunks)).unwrap();
        assert_eq!(read_all(&mut stream), vec![b'a', IAC, b'b']);
    }

    #[test]
    fn test_command_only_read_is_not_eof() {
        let chunks: [&[u8]; 2] = [&[IAC, DO, OPT_ECHO], b"quit\r\0"];
        let mut stream = TelnetStream::negotiate(MockChannel::chunked(&chunks)).unwrap();
        assert_eq!(read_all(&mut stream), b"quit\r\0".to_vec());
    }

    #[test]
    fn test_write_escapes_iac() {
        let mut stream = TelnetStream::negotiate(MockChannel::new(b"")).unwrap();
        stream.write_all(&[b'a', IAC, b'b']).unwrap();
        assert_eq!(&stream.get_ref().output[6..], &[b'a', IAC, IAC, b'b']);
    }
}
