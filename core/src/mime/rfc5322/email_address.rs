/*
 * email_address.rs
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

//! One mailbox from an address-list header.

use std::fmt;

/// Mailbox parsed from From/To/Cc/Bcc. The display name is already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress {
    display_name: Option<String>,
    local_part: String,
    domain: String,
}

impl EmailAddress {
    pub fn new(
        display_name: Option<impl Into<String>>,
        local_part: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.map(|n| n.into()).filter(|n: &String| !n.is_empty()),
            local_part: local_part.into(),
            domain: domain.into(),
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn local_part(&self) -> &str {
        &self.local_part
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// local-part@domain
    pub fn address(&self) -> String {
        format!("{}@{}", self.local_part, self.domain)
    }
}

fn needs_quoting(name: &str) -> bool {
    name.chars().any(|c| matches!(c, ',' | ';' | ':' | '<' | '>' | '@' | '"' | '(' | ')' | '\\'))
}

impl fmt::Display for EmailAddress {
    /// `Name <local@domain>`, quoting the name when it holds specials.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.display_name.as_deref() {
            Some(name) if needs_quoting(name) => {
                let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "\"{}\" <{}>", escaped, self.address())
            }
            Some(name) => write!(f, "{} <{}>", name, self.address()),
            None => write!(f, "<{}>", self.address()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_specials() {
        let a = EmailAddress::new(Some("Doe, Jane"), "jane", "example.com");
        assert_eq!(a.to_string(), "\"Doe, Jane\" <jane@example.com>");
        let b = EmailAddress::new(Some("Bob"), "bob", "example.org");
        assert_eq!(b.to_string(), "Bob <bob@example.org>");
        let c = EmailAddress::new(None::<String>, "c", "x.org");
        assert_eq!(c.to_string(), "<c@x.org>");
    }

    #[test]
    fn empty_name_is_none() {
        assert_eq!(EmailAddress::new(Some(""), "a", "b.c").display_name(), None);
    }
}
