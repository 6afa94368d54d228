/*
 * email.rs
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

//! The assembled message returned by a fetch.

use std::collections::HashMap;

use crate::mime::{EmailAddress, HeaderSet};

/// POP3 exposes a single mailbox.
pub const MAILBOX: &str = "INBOX";

/// One attachment part: decoded content plus the identity derived from its headers.
#[derive(Debug, Clone)]
pub struct Attachment {
    id: String,
    name: String,
    mime: String,
    file_extension: Option<String>,
    headers: HeaderSet,
    content: Vec<u8>,
}

impl Attachment {
    pub(crate) fn new(
        id: String,
        name: String,
        mime: String,
        file_extension: Option<String>,
        headers: HeaderSet,
        content: Vec<u8>,
    ) -> Self {
        Self {
            id,
            name,
            mime,
            file_extension,
            headers,
            content,
        }
    }

    /// Content-ID of the part, or a random 160-bit hex token.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower-cased MIME type, `application/octet-stream` when undeclared.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn file_extension(&self) -> Option<&str> {
        self.file_extension.as_deref()
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn into_content(self) -> Vec<u8> {
        self.content
    }
}

/// A retrieved message after MIME assembly.
///
/// Subject and id are never empty: placeholders are substituted during assembly.
#[derive(Debug, Clone)]
pub struct Email {
    pub(crate) id: String,
    pub(crate) parent: Option<String>,
    pub(crate) topic: String,
    pub(crate) date: Option<i64>,
    pub(crate) subject: String,
    pub(crate) from: Option<EmailAddress>,
    pub(crate) to: Vec<EmailAddress>,
    pub(crate) cc: Vec<EmailAddress>,
    pub(crate) bcc: Vec<EmailAddress>,
    pub(crate) headers: HeaderSet,
    pub(crate) body: HashMap<String, Vec<u8>>,
    pub(crate) attachments: Vec<Attachment>,
    pub(crate) sequence_number: u32,
    pub(crate) raw: Vec<u8>,
}

impl Email {
    /// Message-ID with quotes removed, or a synthesized `no-id-...` token.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// In-Reply-To with quotes removed.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Thread-Topic, or the subject when the header is absent.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn mailbox(&self) -> &str {
        MAILBOX
    }

    /// Seconds since the Unix epoch; None when the Date header is missing or unreadable.
    pub fn date(&self) -> Option<i64> {
        self.date
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn from(&self) -> Option<&EmailAddress> {
        self.from.as_ref()
    }

    pub fn to(&self) -> &[EmailAddress] {
        &self.to
    }

    pub fn cc(&self) -> &[EmailAddress] {
        &self.cc
    }

    pub fn bcc(&self) -> &[EmailAddress] {
        &self.bcc
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// Inline parts keyed by lower-cased MIME type.
    pub fn body(&self) -> &HashMap<String, Vec<u8>> {
        &self.body
    }

    pub fn body_part(&self, mime: &str) -> Option<&[u8]> {
        self.body.get(&mime.to_ascii_lowercase()).map(Vec::as_slice)
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    /// The message exactly as retrieved.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The text/plain body, empty when there is none.
    pub fn text_plain(&self) -> String {
        self.text_of("text/plain").unwrap_or_default()
    }

    /// The text/html body, else text/xml, else the plain text.
    pub fn text_html(&self) -> String {
        self.text_of("text/html")
            .or_else(|| self.text_of("text/xml"))
            .unwrap_or_else(|| self.text_plain())
    }

    fn text_of(&self, mime: &str) -> Option<String> {
        self.body
            .get(mime)
            .filter(|b| !b.is_empty())
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email_with_body(parts: &[(&str, &str)]) -> Email {
        Email {
            id: "<1@x>".into(),
            parent: None,
            topic: "t".into(),
            date: None,
            subject: "t".into(),
            from: None,
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            headers: HeaderSet::new(),
            body: parts
                .iter()
                .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
                .collect(),
            attachments: Vec::new(),
            sequence_number: 1,
            raw: Vec::new(),
        }
    }

    #[test]
    fn html_falls_back_to_xml_then_plain() {
        let e = email_with_body(&[("text/plain", "plain"), ("text/xml", "<x/>")]);
        assert_eq!(e.text_html(), "<x/>");
        let e = email_with_body(&[("text/plain", "plain"), ("text/html", "")]);
        assert_eq!(e.text_html(), "plain");
        let e = email_with_body(&[("text/html", "<b>hi</b>")]);
        assert_eq!(e.text_html(), "<b>hi</b>");
        assert_eq!(e.text_plain(), "");
    }

    #[test]
    fn mailbox_is_inbox() {
        assert_eq!(email_with_body(&[]).mailbox(), "INBOX");
    }
}
