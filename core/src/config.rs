/*
 * config.rs
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

//! Session configuration: server address, credentials, transport security and timeouts.
//! Loading these values from files, keychains or the environment is left to the caller.

use std::fmt;
use std::time::Duration;

use crate::uri::parse_pop3_uri;

/// Connect-phase timeout used when none is configured.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Idle timeout applied to every read and write once connected.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

pub const POP3_PORT: u16 = 110;
pub const POP3S_PORT: u16 = 995;

/// Transport security for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Security {
    /// Plain TCP; credentials travel in the clear unless APOP is accepted.
    #[default]
    None,
    /// TLS from the first byte (pop3s, port 995).
    ImplicitTls,
    /// Plain TCP upgraded in-band with STLS before any credentials are sent.
    StartTls,
}

impl Security {
    pub fn default_port(&self) -> u16 {
        match self {
            Security::ImplicitTls => POP3S_PORT,
            Security::None | Security::StartTls => POP3_PORT,
        }
    }
}

/// Mailbox user name and password.
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

/// Everything needed to open and authenticate one session.
#[derive(Debug, Clone)]
pub struct Pop3Config {
    pub host: String,
    pub port: u16,
    pub credentials: Credentials,
    pub security: Security,
    /// Skip certificate validation. Only for legacy servers with self-signed certificates.
    pub accept_invalid_certs: bool,
    pub connect_timeout: Duration,
    /// None waits forever on a stalled peer.
    pub idle_timeout: Option<Duration>,
}

impl Pop3Config {
    /// Plain connection on port 110 with default timeouts.
    pub fn new(host: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: POP3_PORT,
            credentials: Credentials::new(username, password),
            security: Security::None,
            accept_invalid_certs: false,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
        }
    }

    /// Build from a pop3://, pop3s:// or pop3+stls:// URL. The port defaults from the scheme.
    pub fn from_uri(uri: &str, password: impl Into<String>) -> Option<Self> {
        let parsed = parse_pop3_uri(uri)?;
        let port = parsed.port.unwrap_or_else(|| parsed.security.default_port());
        Some(
            Self::new(parsed.host, parsed.username, password)
                .with_security(parsed.security)
                .with_port(port),
        )
    }

    /// Sets the security mode and moves the port to that mode's default.
    /// Call `with_port` afterwards for a non-standard port.
    pub fn with_security(mut self, security: Security) -> Self {
        self.security = security;
        self.port = security.default_port();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// host:port, for log and error messages.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
