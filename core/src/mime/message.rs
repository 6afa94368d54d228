/*
 * message.rs
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

//! Whole-message assembly: header/body split, envelope fields with their
//! defaults, and body parts.

use std::sync::Arc;

use log::debug;

use super::body::BodyPartAssembler;
use super::charset::utf8_or_latin1;
use super::extensions::MimeExtensionTable;
use super::header::{infer_boundary, parse_header_block};
use super::rfc5322::parse_envelope;
use super::MimeParseError;
use crate::email::Email;
use crate::hex::random_hex;

/// Subject used when the message has none.
pub const NO_SUBJECT: &str = "(no subject)";

/// Builds an `Email` from the bytes of one retrieved message.
#[derive(Debug, Clone, Default)]
pub struct MessageAssembler {
    parts: BodyPartAssembler,
}

impl MessageAssembler {
    pub fn new(extensions: Arc<MimeExtensionTable>) -> Self {
        Self {
            parts: BodyPartAssembler::new(extensions),
        }
    }

    pub fn body_part_assembler(&self) -> &BodyPartAssembler {
        &self.parts
    }

    /// Assemble one message. Fails only when there is nothing to work with:
    /// blank input or a head with no header field in it.
    pub fn assemble(&self, raw: &[u8], sequence_number: u32) -> Result<Email, MimeParseError> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Err(MimeParseError::Empty);
        }
        let (head, body) = split_head_body(raw);
        let body = body.filter(|b| !is_closing_artifact(b));
        let head = utf8_or_latin1(head);
        let headers = parse_header_block(&head);
        if headers.is_empty() {
            return Err(MimeParseError::NoHeaders);
        }
        let boundary = infer_boundary(&head);
        let envelope = parse_envelope(&headers);

        let subject = normalize_subject(envelope.subject.as_deref());
        let topic = envelope.thread_topic.unwrap_or_else(|| subject.clone());
        let id = envelope
            .message_id
            .unwrap_or_else(|| format!("no-id-{}", random_hex(16)));
        let parts = self
            .parts
            .assemble(body.unwrap_or_default(), boundary.as_deref(), &headers);
        debug!(
            "assembled message {} ({}): {} body part(s), {} attachment(s)",
            sequence_number,
            id,
            parts.body.len(),
            parts.attachments.len()
        );

        Ok(Email {
            id,
            parent: envelope.in_reply_to,
            topic,
            date: envelope.date,
            subject,
            from: envelope.from.into_iter().next(),
            to: envelope.to,
            cc: envelope.cc,
            bcc: envelope.bcc,
            headers,
            body: parts.body,
            attachments: parts.attachments,
            sequence_number,
            raw: raw.to_vec(),
        })
    }
}

/// Split at the first line break followed by a whitespace-only run containing
/// another line break. The body starts after the last break of that run.
fn split_head_body(raw: &[u8]) -> (&[u8], Option<&[u8]>) {
    for (i, _) in raw.iter().enumerate().filter(|(_, &b)| b == b'\n') {
        let mut last_break = None;
        for (j, &b) in raw.iter().enumerate().skip(i + 1) {
            if !b.is_ascii_whitespace() {
                break;
            }
            if b == b'\n' {
                last_break = Some(j);
            }
        }
        if let Some(j) = last_break {
            return (&raw[..i], Some(&raw[j + 1..]));
        }
    }
    (raw, None)
}

/// A body of just ")" is a leftover of the retrieval framing.
fn is_closing_artifact(body: &[u8]) -> bool {
    body.iter().filter(|b| !b.is_ascii_whitespace()).eq([b')'].iter())
}

fn normalize_subject(subject: Option<&str>) -> String {
    let subject = subject.map(str::trim).unwrap_or_default();
    let subject = if subject.is_empty() { NO_SUBJECT } else { subject };
    let stripped: String = subject.chars().filter(|c| *c != '<' && *c != '>').collect();
    let stripped = stripped.trim();
    if stripped.is_empty() {
        return NO_SUBJECT.to_string();
    }
    stripped.replace("â€™", "'")
}
