/*
 * error.rs
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

//! Session and protocol errors.

use std::io;

use thiserror::Error;

use crate::mime::MimeParseError;

/// Errors from connecting, authenticating, issuing commands or assembling a fetched message.
#[derive(Debug, Error)]
pub enum Pop3Error {
    /// Unreachable host, refused connection, timeout, TLS handshake failure or a
    /// connection dropped mid-reply. The session is unusable afterwards.
    #[error("connection error: {0}")]
    Connection(#[from] io::Error),
    /// The STLS command was refused or the in-band TLS handshake failed.
    #[error("TLS upgrade failed: {0}")]
    EncryptionUpgrade(String),
    /// Both the APOP and the USER/PASS exchange were rejected.
    #[error("authentication failed: {0}")]
    Authentication(String),
    /// The server answered -ERR. The session remains usable.
    #[error("{command} rejected: {message}")]
    CommandRejected { command: String, message: String },
    /// A retrieved message could not be turned into any usable structure.
    #[error("malformed message: {0}")]
    MalformedMessage(String),
    #[error("not connected")]
    NotConnected,
    #[error("not authenticated")]
    NotAuthenticated,
}

impl Pop3Error {
    pub fn rejected(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CommandRejected {
            command: command.into(),
            message: message.into(),
        }
    }

    /// True when the session can no longer be used and must be reconnected from scratch.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Pop3Error::CommandRejected { .. } | Pop3Error::MalformedMessage(_)
        )
    }
}

impl From<MimeParseError> for Pop3Error {
    fn from(e: MimeParseError) -> Self {
        Self::MalformedMessage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_is_not_fatal() {
        assert!(!Pop3Error::rejected("DELE 3", "no such message").is_fatal());
        assert!(!Pop3Error::MalformedMessage("empty".into()).is_fatal());
    }

    #[test]
    fn transport_errors_are_fatal() {
        let e: Pop3Error = io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed").into();
        assert!(e.is_fatal());
        assert!(Pop3Error::Authentication("bad".into()).is_fatal());
        assert!(Pop3Error::EncryptionUpgrade("refused".into()).is_fatal());
        assert!(Pop3Error::NotConnected.is_fatal());
    }

    #[test]
    fn rejection_display_names_the_command() {
        let e = Pop3Error::rejected("RETR 9", "no such message");
        assert_eq!(e.to_string(), "RETR 9 rejected: no such message");
    }
}
