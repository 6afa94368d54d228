/*
 * mod.rs
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

//! POP3 (RFC 1939) client with STLS (RFC 2595).
//!
//! `channel` frames commands and replies, `auth` runs the login strategies,
//! `client` is the authenticated session callers use.

mod auth;
mod channel;
mod client;

pub use auth::{apop_digest, greeting_timestamp, AuthStrategy};
pub use channel::{CommandChannel, Reply, ReplyStatus};
pub use client::{page_ids, ListEntry, Pop3Session, RawMessage, StatResponse, UidlEntry};
