/*
 * auth.rs
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

//! Login strategies: APOP (RFC 1939 §7) then USER/PASS.
//!
//! Strategies are tried in order. A rejected APOP is dropped silently and the
//! plaintext exchange runs next; only when every strategy is rejected does the
//! caller see `Pop3Error::Authentication`.

use log::{debug, warn};
use md5::{Digest, Md5};

use super::channel::CommandChannel;
use crate::config::Credentials;
use crate::error::Pop3Error;
use crate::hex::bytes_to_hex;

/// One way of logging in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    /// APOP user md5(timestamp + password). Needs a greeting timestamp.
    Apop,
    /// USER name, then PASS password.
    UserPass,
}

/// Order in which strategies are attempted.
pub const AUTH_STRATEGIES: [AuthStrategy; 2] = [AuthStrategy::Apop, AuthStrategy::UserPass];

impl AuthStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            AuthStrategy::Apop => "APOP",
            AuthStrategy::UserPass => "USER/PASS",
        }
    }

    /// Run this strategy. Rejections come back as `CommandRejected`.
    /// Returns Ok(false) when the strategy does not apply (APOP without a timestamp).
    fn attempt(
        &self,
        channel: &mut CommandChannel,
        credentials: &Credentials,
        timestamp: Option<&str>,
    ) -> Result<bool, Pop3Error> {
        match self {
            AuthStrategy::Apop => {
                let Some(ts) = timestamp else {
                    return Ok(false);
                };
                let command = format!(
                    "APOP {} {}",
                    credentials.username,
                    apop_digest(ts, &credentials.password)
                );
                channel.call(&command, false)?.into_result(&command)?;
                Ok(true)
            }
            AuthStrategy::UserPass => {
                let user = format!("USER {}", credentials.username);
                channel.call(&user, false)?.into_result(&user)?;
                let pass = format!("PASS {}", credentials.password);
                channel.call(&pass, false)?.into_result(&pass)?;
                Ok(true)
            }
        }
    }
}

/// Challenge token from the server greeting: `<...>` including the brackets,
/// accepted only when an '@' follows the first character inside.
pub fn greeting_timestamp(greeting: &str) -> Option<String> {
    let start = greeting.find('<')?;
    let rest = &greeting[start + 1..];
    let end = rest.find('>')?;
    let inner = &rest[..end];
    match inner.find('@') {
        Some(at) if at > 0 => Some(format!("<{}>", inner)),
        _ => None,
    }
}

/// APOP digest: lowercase hex MD5 of timestamp followed by password.
pub fn apop_digest(timestamp: &str, password: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(timestamp.as_bytes());
    hasher.update(password.as_bytes());
    bytes_to_hex(&hasher.finalize())
}

/// Try each strategy in order until one succeeds.
/// Transport errors abort immediately; rejections move on to the next strategy.
pub(crate) fn authenticate(
    channel: &mut CommandChannel,
    credentials: &Credentials,
    timestamp: Option<&str>,
) -> Result<AuthStrategy, Pop3Error> {
    let mut last_rejection = None;
    for strategy in AUTH_STRATEGIES {
        match strategy.attempt(channel, credentials, timestamp) {
            Ok(true) => {
                debug!("POP3 authenticated with {}", strategy.name());
                return Ok(strategy);
            }
            Ok(false) => continue,
            Err(e) if !e.is_fatal() => {
                if strategy == AuthStrategy::Apop {
                    warn!("POP3 APOP rejected, falling back to USER/PASS");
                }
                last_rejection = Some(e);
            }
            Err(e) => return Err(e),
        }
    }
    let reason = last_rejection
        .map(|e| e.to_string())
        .unwrap_or_else(|| "no applicable login method".to_string());
    Err(Pop3Error::Authentication(reason))
}
