/*
 * channel.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Postino, a POP3 mail retrieval client.
 *
 * Postino is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Postino is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Postino.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Command/reply framing: one CRLF-terminated command out, one status line back,
//! plus a dot-terminated data block for multiline commands.

use std::io::{self, BufRead, BufReader, Write};

use log::{debug, trace};

use crate::error::Pop3Error;
use crate::net::Pop3Stream;

/// Leading status token of a reply line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    Ok,
    Err,
}

/// One server reply. `data` is present only for a successful multiline reply.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: ReplyStatus,
    /// Status line text after the status token.
    pub text: String,
    /// Unstuffed data lines, each with its original line terminator.
    pub data: Option<Vec<u8>>,
}

impl Reply {
    /// Classify a status line. Only a first token of exactly "+OK" is success.
    pub fn parse_status_line(line: &str) -> Self {
        let line = line.trim();
        let (token, text) = match line.split_once(' ') {
            Some((t, rest)) => (t, rest.trim()),
            None => (line, ""),
        };
        let status = if token == "+OK" {
            ReplyStatus::Ok
        } else {
            ReplyStatus::Err
        };
        Reply {
            status,
            text: text.to_string(),
            data: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ReplyStatus::Ok
    }

    /// Turn a failure reply into `CommandRejected` for `command`.
    pub fn into_result(self, command: &str) -> Result<Reply, Pop3Error> {
        match self.status {
            ReplyStatus::Ok => Ok(self),
            ReplyStatus::Err => Err(Pop3Error::rejected(mask_credentials(command), self.text)),
        }
    }

    /// Data block, or an empty slice for single-line replies.
    pub fn data(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }
}

/// Hide secrets in commands before they reach logs or error messages.
pub(crate) fn mask_credentials(command: &str) -> String {
    let mut words = command.splitn(3, ' ');
    let verb = words.next().unwrap_or("");
    if verb.eq_ignore_ascii_case("PASS") {
        return format!("{} ****", verb);
    }
    if verb.eq_ignore_ascii_case("APOP") {
        let user = words.next().unwrap_or("");
        return format!("{} {} ****", verb, user);
    }
    command.to_string()
}

/// Lock-step command channel over an exclusively owned stream.
pub struct CommandChannel {
    reader: BufReader<Pop3Stream>,
    line_buf: Vec<u8>,
}

impl CommandChannel {
    pub fn new(stream: Pop3Stream) -> Self {
        Self {
            reader: BufReader::new(stream),
            line_buf: Vec::with_capacity(1024),
        }
    }

    pub fn is_secure(&self) -> bool {
        self.reader.get_ref().is_secure()
    }

    /// Write `command` followed by CRLF.
    pub fn send_command(&mut self, command: &str) -> Result<(), Pop3Error> {
        debug!("POP3 > {}", mask_credentials(command));
        let stream = self.reader.get_mut();
        stream.write_all(command.as_bytes())?;
        stream.write_all(b"\r\n")?;
        stream.flush()?;
        Ok(())
    }

    /// Read one raw line including its terminator. EOF is a transport error.
    fn read_raw_line(&mut self) -> io::Result<&[u8]> {
        self.line_buf.clear();
        let n = self.reader.read_until(b'\n', &mut self.line_buf)?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed"));
        }
        Ok(&self.line_buf)
    }

    /// Read the status line and, when `multiline` and the status is +OK, the data block
    /// up to the lone "." line.
    pub fn read_reply(&mut self, multiline: bool) -> Result<Reply, Pop3Error> {
        let line = String::from_utf8_lossy(self.read_raw_line()?).into_owned();
        debug!("POP3 < {}", line.trim_end());
        let mut reply = Reply::parse_status_line(&line);
        if multiline && reply.is_ok() {
            reply.data = Some(self.read_data_block()?);
        }
        Ok(reply)
    }

    fn read_data_block(&mut self) -> Result<Vec<u8>, Pop3Error> {
        let mut out = Vec::new();
        loop {
            let line = self.read_raw_line()?;
            let content = trim_line_end(line);
            if content == b"." {
                break;
            }
            trace!("POP3 < {}", String::from_utf8_lossy(content));
            let unstuffed = if line.first() == Some(&b'.') {
                &line[1..]
            } else {
                line
            };
            out.extend_from_slice(unstuffed);
        }
        Ok(out)
    }

    /// Send then read. The only primitive the session uses.
    pub fn call(&mut self, command: &str, multiline: bool) -> Result<Reply, Pop3Error> {
        self.send_command(command)?;
        self.read_reply(multiline)
    }

    /// Swap the underlying stream for TLS after STLS was accepted.
    /// Fails if the server sent data past the STLS reply (plaintext injection).
    pub fn upgrade_to_tls(self, host: &str, accept_invalid_certs: bool) -> io::Result<Self> {
        if !self.reader.buffer().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "unexpected data after STLS reply",
            ));
        }
        let stream = self.reader.into_inner().upgrade_to_tls(host, accept_invalid_certs)?;
        Ok(Self::new(stream))
    }

    /// Close the socket; any later read or write fails.
    pub fn shutdown(&self) {
        let _ = self.reader.get_ref().shutdown();
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && (line[end - 1] == b'\n' || line[end - 1] == b'\r') {
        end -= 1;
    }
    &line[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::Timeouts;
    use std::io::Read;
    use std::net::TcpListener;
    use std::time::Duration;

    /// Serve `script` to the first client, then return everything the client sent.
    fn serve(script: &'static [u8]) -> (u16, std::thread::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = std::thread::spawn(move || {
            let (mut s, _) = listener.accept().unwrap();
            s.write_all(script).unwrap();
            s.set_read_timeout(Some(Duration::from_millis(300))).unwrap();
            let mut got = Vec::new();
            let _ = s.read_to_end(&mut got);
            got
        });
        (port, handle)
    }

    fn channel(port: u16) -> CommandChannel {
        let t = Timeouts {
            connect: Duration::from_secs(5),
            idle: Some(Duration::from_secs(5)),
        };
        CommandChannel::new(Pop3Stream::connect_plain("127.0.0.1", port, t).unwrap())
    }

    #[test]
    fn status_line_classification() {
        let r = Reply::parse_status_line("+OK 2 320\r\n");
        assert!(r.is_ok());
        assert_eq!(r.text, "2 320");
        let r = Reply::parse_status_line("+OK");
        assert!(r.is_ok());
        assert_eq!(r.text, "");
        assert!(!Reply::parse_status_line("-ERR no such message").is_ok());
        assert!(!Reply::parse_status_line("+OKAY").is_ok());
        assert!(!Reply::parse_status_line("").is_ok());
    }

    #[test]
    fn rejected_reply_becomes_typed_error() {
        let err = Reply::parse_status_line("-ERR no such message")
            .into_result("RETR 7")
            .unwrap_err();
        match err {
            Pop3Error::CommandRejected { command, message } => {
                assert_eq!(command, "RETR 7");
                assert_eq!(message, "no such message");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn credentials_are_masked() {
        assert_eq!(mask_credentials("PASS hunter2"), "PASS ****");
        assert_eq!(mask_credentials("APOP bob 0123abcd"), "APOP bob ****");
        assert_eq!(mask_credentials("USER bob"), "USER bob");
        assert_eq!(mask_credentials("STAT"), "STAT");
    }

    #[test]
    fn multiline_reply_is_unstuffed() {
        let (port, server) = serve(b"+OK 3 lines\r\nSubject: x\r\n\r\n..hidden\r\n.\r\n");
        let mut ch = channel(port);
        let reply = ch.call("RETR 1", true).unwrap();
        assert!(reply.is_ok());
        assert_eq!(reply.data(), b"Subject: x\r\n\r\n.hidden\r\n");
        drop(ch);
        assert_eq!(server.join().unwrap(), b"RETR 1\r\n");
    }

    #[test]
    fn failed_multiline_reply_reads_no_data() {
        let (port, _server) = serve(b"-ERR no such message\r\n+OK\r\n");
        let mut ch = channel(port);
        let reply = ch.call("RETR 9", true).unwrap();
        assert!(!reply.is_ok());
        assert!(reply.data.is_none());
        assert!(ch.call("NOOP", false).unwrap().is_ok());
    }

    #[test]
    fn eof_mid_block_is_connection_error() {
        let (port, _server) = serve(b"+OK\r\nline one\r\n");
        let mut ch = channel(port);
        let err = ch.call("RETR 1", true).unwrap_err();
        assert!(matches!(err, Pop3Error::Connection(_)));
        assert!(err.is_fatal());
    }
}
