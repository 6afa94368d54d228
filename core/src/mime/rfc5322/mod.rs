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

//! RFC 5322 envelope headers (Date, From, To, Cc, Bcc, Subject, Message-ID, threading).

mod address_parser;
mod date_time;
mod email_address;

pub use address_parser::parse_email_address_list;
pub use date_time::{parse_epoch_seconds, parse_rfc5322_date};
pub use email_address::EmailAddress;

use super::header::HeaderSet;

/// Envelope fields read from a top-level header set. Absent headers stay None or empty;
/// defaults are applied by the message assembler.
#[derive(Debug, Default, Clone)]
pub struct EnvelopeHeaders {
    pub date: Option<i64>,
    pub from: Vec<EmailAddress>,
    pub to: Vec<EmailAddress>,
    pub cc: Vec<EmailAddress>,
    pub bcc: Vec<EmailAddress>,
    pub subject: Option<String>,
    pub message_id: Option<String>,
    pub in_reply_to: Option<String>,
    pub thread_topic: Option<String>,
}

fn addresses(headers: &HeaderSet, name: &str) -> Vec<EmailAddress> {
    headers
        .all(name)
        .into_iter()
        .flat_map(parse_email_address_list)
        .collect()
}

/// Header text with double quotes removed; None when blank.
fn unquoted(headers: &HeaderSet, name: &str) -> Option<String> {
    let v = headers.first(name)?.replace('"', "");
    let v = v.trim();
    (!v.is_empty()).then(|| v.to_string())
}

pub fn parse_envelope(headers: &HeaderSet) -> EnvelopeHeaders {
    EnvelopeHeaders {
        date: headers.first("date").and_then(parse_epoch_seconds),
        from: addresses(headers, "from"),
        to: addresses(headers, "to"),
        cc: addresses(headers, "cc"),
        bcc: addresses(headers, "bcc"),
        subject: headers.first("subject").map(str::to_string),
        message_id: unquoted(headers, "message-id"),
        in_reply_to: unquoted(headers, "in-reply-to"),
        thread_topic: headers
            .first("thread-topic")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
    }
}
