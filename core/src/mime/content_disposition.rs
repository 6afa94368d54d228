/*
 * content_disposition.rs
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

//! Content-Disposition header (RFC 2183).

use std::collections::HashMap;

use super::content_type::{parse_parameter_list, split_parameters};

#[derive(Debug, Clone)]
pub struct ContentDisposition {
    disposition_type: String,
    parameter_map: HashMap<String, String>,
}

impl ContentDisposition {
    pub fn get_disposition_type(&self) -> &str {
        &self.disposition_type
    }

    pub fn is_disposition_type(&self, t: &str) -> bool {
        self.disposition_type.eq_ignore_ascii_case(t)
    }

    pub fn get_parameter(&self, name: &str) -> Option<&str> {
        self.parameter_map.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn filename(&self) -> Option<&str> {
        self.get_parameter("filename").filter(|f| !f.is_empty())
    }
}

pub fn parse_content_disposition(value: &str) -> Option<ContentDisposition> {
    let mut segments = split_parameters(value);
    let disposition_type = segments.next()?.trim().to_ascii_lowercase();
    if disposition_type.is_empty() {
        return None;
    }
    Some(ContentDisposition {
        disposition_type,
        parameter_map: parse_parameter_list(segments),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_filename() {
        let cd = parse_content_disposition("attachment; filename=\"report.pdf\"").unwrap();
        assert!(cd.is_disposition_type("ATTACHMENT"));
        assert_eq!(cd.filename(), Some("report.pdf"));
    }

    #[test]
    fn inline_without_filename() {
        let cd = parse_content_disposition("inline").unwrap();
        assert_eq!(cd.get_disposition_type(), "inline");
        assert_eq!(cd.filename(), None);
        assert!(parse_content_disposition("").is_none());
    }
}
