/*
 * client.rs
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

//! POP3 session: connect, STLS, APOP or USER/PASS, then STAT/LIST/UIDL/RETR/TOP/DELE/NOOP/RSET, QUIT.

use std::io;

use log::{debug, info, warn};

use super::auth::{authenticate, greeting_timestamp};
use super::channel::{CommandChannel, Reply};
use crate::config::{Pop3Config, Security};
use crate::email::Email;
use crate::error::Pop3Error;
use crate::mime::MessageAssembler;
use crate::net::{Pop3Stream, Timeouts};

/// STAT response: message count and total size in octets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatResponse {
    pub count: u32,
    pub total_size: u64,
}

impl StatResponse {
    /// Parse "count size"; either field defaults to 0 when missing or not numeric.
    pub fn parse(text: &str) -> Self {
        let mut parts = text.split_whitespace();
        let count = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
        let total_size = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
        Self { count, total_size }
    }
}

/// UIDL list entry: message number and unique-id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UidlEntry {
    pub msg_no: u32,
    pub uidl: String,
}

/// LIST entry: message number and size in octets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListEntry {
    pub msg_no: u32,
    pub size: u64,
}

/// Bytes of one retrieved message and its sequence number.
#[derive(Debug, Clone)]
pub struct RawMessage {
    sequence_number: u32,
    bytes: Vec<u8>,
}

impl RawMessage {
    pub fn new(sequence_number: u32, bytes: Vec<u8>) -> Self {
        Self {
            sequence_number,
            bytes,
        }
    }

    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Split data lines into "number rest" pairs, skipping lines without a positive number.
fn numbered_lines(data: &[u8]) -> impl Iterator<Item = (u32, String)> + '_ {
    data.split(|&b| b == b'\n').filter_map(|raw| {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim();
        let mut sp = line.splitn(2, ' ');
        let msg_no: u32 = sp.next().and_then(|s| s.parse().ok()).unwrap_or(0);
        let rest = sp.next().unwrap_or("").trim().to_string();
        (msg_no > 0).then_some((msg_no, rest))
    })
}

/// Sequence numbers for one page: the `range` messages ending `start` messages
/// before the newest. Range is clamped to at least 1; start to at least 0;
/// a start past the end wraps back to the newest page.
pub fn page_ids(total: u32, start: i64, range: i64) -> Vec<u32> {
    if total == 0 {
        return Vec::new();
    }
    let range = range.max(1);
    let start = start.max(0);
    let mut max = total as i64 - start;
    if max < 1 {
        max = total as i64;
    }
    let min = (max - range + 1).max(1);
    (min as u32..=max as u32).collect()
}

/// One POP3 session. Owns its connection exclusively; one command at a time.
///
/// After any transport failure the connection is dropped and every operation
/// returns `NotConnected` until `connect` is called again.
pub struct Pop3Session {
    config: Pop3Config,
    channel: Option<CommandChannel>,
    timestamp: Option<String>,
    authenticated: bool,
    assembler: MessageAssembler,
}

impl Pop3Session {
    /// Session for `config` with no connection yet.
    pub fn new(config: Pop3Config) -> Self {
        Self {
            config,
            channel: None,
            timestamp: None,
            authenticated: false,
            assembler: MessageAssembler::default(),
        }
    }

    /// Connect and authenticate in one step.
    pub fn open(config: Pop3Config) -> Result<Self, Pop3Error> {
        let mut session = Self::new(config);
        session.connect()?;
        Ok(session)
    }

    /// Use a different assembler (for example with a custom extension table).
    pub fn with_assembler(mut self, assembler: MessageAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn config(&self) -> &Pop3Config {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated && self.channel.is_some()
    }

    pub fn is_secure(&self) -> bool {
        self.channel.as_ref().map(|c| c.is_secure()).unwrap_or(false)
    }

    /// APOP timestamp from the last greeting, if the server sent one.
    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    /// Connect, upgrade if configured, then log in. No-op when already authenticated.
    pub fn connect(&mut self) -> Result<(), Pop3Error> {
        if self.is_authenticated() {
            return Ok(());
        }
        self.disconnect();
        let (mut channel, timestamp) = open_channel(&self.config)?;
        match authenticate(&mut channel, &self.config.credentials, timestamp.as_deref()) {
            Ok(strategy) => {
                info!(
                    "POP3 logged in to {} as {} ({})",
                    self.config.address(),
                    self.config.credentials.username,
                    strategy.name()
                );
                self.channel = Some(channel);
                self.timestamp = timestamp;
                self.authenticated = true;
                Ok(())
            }
            Err(e) => {
                quit(&mut channel);
                Err(e)
            }
        }
    }

    /// Connection test: connect, read the greeting, upgrade if configured, QUIT.
    /// Does not log in.
    pub fn check(config: &Pop3Config) -> Result<(), Pop3Error> {
        let (mut channel, _) = open_channel(config)?;
        quit(&mut channel);
        Ok(())
    }

    /// Send QUIT (failures ignored) and drop the connection.
    pub fn disconnect(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            quit(&mut channel);
        }
        self.authenticated = false;
    }

    /// Close the socket without QUIT. Use after a caller-side timeout.
    pub fn abort(&mut self) {
        if let Some(channel) = self.channel.take() {
            channel.shutdown();
        }
        self.authenticated = false;
    }

    /// Run one command on the authenticated channel. A fatal error drops the connection.
    fn call(&mut self, command: &str, multiline: bool) -> Result<Reply, Pop3Error> {
        if !self.authenticated {
            return Err(if self.channel.is_some() {
                Pop3Error::NotAuthenticated
            } else {
                Pop3Error::NotConnected
            });
        }
        let channel = self.channel.as_mut().ok_or(Pop3Error::NotConnected)?;
        match channel.call(command, multiline) {
            Ok(reply) => Ok(reply),
            Err(e) => {
                if e.is_fatal() {
                    warn!("POP3 connection to {} lost: {}", self.config.address(), e);
                    self.abort();
                }
                Err(e)
            }
        }
    }

    fn call_ok(&mut self, command: &str, multiline: bool) -> Result<Reply, Pop3Error> {
        self.call(command, multiline)?.into_result(command)
    }

    /// STAT -> count and total size.
    pub fn stat(&mut self) -> Result<StatResponse, Pop3Error> {
        let reply = self.call_ok("STAT", false)?;
        Ok(StatResponse::parse(&reply.text))
    }

    /// Number of messages in the maildrop. A rejected or unparseable STAT counts as 0.
    pub fn message_count(&mut self) -> Result<u32, Pop3Error> {
        match self.stat() {
            Ok(stat) => Ok(stat.count),
            Err(e) if !e.is_fatal() => {
                warn!("POP3 STAT failed, assuming empty maildrop: {}", e);
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    /// LIST -> (msg_no, size) for every message.
    pub fn list(&mut self) -> Result<Vec<ListEntry>, Pop3Error> {
        let reply = self.call_ok("LIST", true)?;
        Ok(numbered_lines(reply.data())
            .map(|(msg_no, rest)| ListEntry {
                msg_no,
                size: rest.split_whitespace().next().and_then(|s| s.parse().ok()).unwrap_or(0),
            })
            .collect())
    }

    /// UIDL -> (msg_no, unique-id) for every message.
    pub fn uidl(&mut self) -> Result<Vec<UidlEntry>, Pop3Error> {
        let reply = self.call_ok("UIDL", true)?;
        Ok(numbered_lines(reply.data())
            .map(|(msg_no, uidl)| UidlEntry { msg_no, uidl })
            .collect())
    }

    /// TOP msg n -> headers plus first n lines of body. n=0 for headers only.
    pub fn top(&mut self, msg_no: u32, lines: u32) -> Result<RawMessage, Pop3Error> {
        let reply = self.call_ok(&format!("TOP {} {}", msg_no, lines), true)?;
        Ok(RawMessage::new(msg_no, reply.data.unwrap_or_default()))
    }

    pub fn noop(&mut self) -> Result<(), Pop3Error> {
        self.call_ok("NOOP", false).map(|_| ())
    }

    /// RSET: unmark messages marked for deletion in this session.
    pub fn reset(&mut self) -> Result<(), Pop3Error> {
        self.call_ok("RSET", false).map(|_| ())
    }

    /// RETR msg -> raw message bytes.
    pub fn fetch_raw(&mut self, msg_no: u32) -> Result<RawMessage, Pop3Error> {
        let reply = self.call_ok(&format!("RETR {}", msg_no), true)?;
        Ok(RawMessage::new(msg_no, reply.data.unwrap_or_default()))
    }

    /// RETR msg and assemble it into an `Email`.
    pub fn fetch(&mut self, msg_no: u32) -> Result<Email, Pop3Error> {
        let raw = self.fetch_raw(msg_no)?;
        let email = self.assembler.assemble(raw.bytes(), raw.sequence_number())?;
        Ok(email)
    }

    /// DELE each id. Rejected ids are logged and skipped; transport errors abort.
    pub fn delete(&mut self, ids: &[u32]) -> Result<(), Pop3Error> {
        for id in ids {
            let command = format!("DELE {}", id);
            let reply = self.call(&command, false)?;
            if !reply.is_ok() {
                warn!("POP3 {} rejected: {}", command, reply.text);
            }
        }
        Ok(())
    }

    /// The `limit` most recent sequence numbers, oldest first.
    pub fn recent_ids(&mut self, limit: u32) -> Result<Vec<u32>, Pop3Error> {
        let total = self.message_count()?;
        if total == 0 || limit == 0 {
            return Ok(Vec::new());
        }
        let first = total.saturating_sub(limit).saturating_add(1).max(1);
        Ok((first..=total).collect())
    }

    /// Fetch one page of messages, see [`page_ids`].
    pub fn fetch_page(&mut self, start: i64, range: i64) -> Result<Vec<Email>, Pop3Error> {
        let total = self.message_count()?;
        let ids = page_ids(total, start, range);
        debug!("POP3 fetching page {:?} of {}", ids.first().zip(ids.last()), total);
        ids.into_iter().map(|id| self.fetch(id)).collect()
    }
}

impl Drop for Pop3Session {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Best-effort QUIT; the reply and any error are ignored.
fn quit(channel: &mut CommandChannel) {
    let _ = channel.call("QUIT", false);
    channel.shutdown();
}

/// TCP (or implicit TLS) connect, read the greeting, STLS if configured.
fn open_channel(config: &Pop3Config) -> Result<(CommandChannel, Option<String>), Pop3Error> {
    let timeouts = Timeouts {
        connect: config.connect_timeout,
        idle: config.idle_timeout,
    };
    let stream = match config.security {
        Security::ImplicitTls => Pop3Stream::connect_implicit_tls(
            &config.host,
            config.port,
            timeouts,
            config.accept_invalid_certs,
        )?,
        Security::None | Security::StartTls => {
            Pop3Stream::connect_plain(&config.host, config.port, timeouts)?
        }
    };
    let mut channel = CommandChannel::new(stream);
    let greeting = channel.read_reply(false)?;
    if !greeting.is_ok() {
        channel.shutdown();
        return Err(Pop3Error::Connection(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            format!("server greeting: {}", greeting.text),
        )));
    }
    info!("POP3 connected to {}", config.address());
    let timestamp = greeting_timestamp(&greeting.text);
    if config.security == Security::StartTls {
        channel = start_tls(channel, config)?;
    }
    Ok((channel, timestamp))
}

/// STLS then handshake on the same socket. Any failure closes the connection.
fn start_tls(mut channel: CommandChannel, config: &Pop3Config) -> Result<CommandChannel, Pop3Error> {
    let reply = channel.call("STLS", false)?;
    if !reply.is_ok() {
        quit(&mut channel);
        return Err(Pop3Error::EncryptionUpgrade(format!("STLS refused: {}", reply.text)));
    }
    channel
        .upgrade_to_tls(&config.host, config.accept_invalid_certs)
        .map_err(|e| Pop3Error::EncryptionUpgrade(e.to_string()))
}
