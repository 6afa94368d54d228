/*
 * lib.rs
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

//! Postino core: a blocking POP3 client with a tolerant MIME assembler.
//!
//! A [`Pop3Session`] connects (plain, implicit TLS or STLS), authenticates with APOP
//! falling back to USER/PASS, and retrieves messages as [`Email`] values built by
//! the [`mime::MessageAssembler`].

pub mod config;
pub mod email;
pub mod error;
mod hex;
pub mod mime;
pub mod net;
pub mod protocol;
pub mod uri;

pub use config::{Credentials, Pop3Config, Security};
pub use email::{Attachment, Email};
pub use error::Pop3Error;
pub use mime::{EmailAddress, HeaderSet, HeaderValue, MessageAssembler, MimeExtensionTable};
pub use protocol::pop3::{Pop3Session, RawMessage, StatResponse};
pub use uri::{parse_pop3_uri, pop3_store_uri, Pop3Uri};
