/*
 * uri.rs
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

//! POP3 store URLs: pop3://user@host:port (plain), pop3s://user@host:port (implicit TLS),
//! pop3+stls://user@host:port (plain, upgraded with STLS before login).
//! The user name is percent-encoded in the authority so a single @ separates it from the host.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::Security;

/// Userinfo in authority: encode @ and other reserved so one @ separates userinfo from host.
const USERINFO: &AsciiSet = &CONTROLS.add(b'@').add(b':').add(b'%').add(b'/').add(b'?').add(b'#').add(b'[').add(b']');

/// Components of a parsed POP3 store URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pop3Uri {
    pub username: String,
    pub host: String,
    pub port: Option<u16>,
    pub security: Security,
}

fn scheme_for(security: Security) -> &'static str {
    match security {
        Security::None => "pop3",
        Security::ImplicitTls => "pop3s",
        Security::StartTls => "pop3+stls",
    }
}

/// POP3 store URL for the given account.
pub fn pop3_store_uri(username: &str, host: &str, port: u16, security: Security) -> String {
    let userinfo = utf8_percent_encode(username, USERINFO).to_string();
    format!("{}://{}@{}:{}", scheme_for(security), userinfo, host, port)
}

/// Parse a POP3 store URL. Returns None for other schemes, a missing user or host, or a bad port.
pub fn parse_pop3_uri(uri: &str) -> Option<Pop3Uri> {
    let (scheme, rest) = uri.trim().split_once("://")?;
    let security = match scheme.to_ascii_lowercase().as_str() {
        "pop3" => Security::None,
        "pop3s" => Security::ImplicitTls,
        "pop3+stls" | "pop3+starttls" => Security::StartTls,
        _ => return None,
    };
    let authority = rest.split('/').next().unwrap_or("");
    let (userinfo, hostport) = authority.rsplit_once('@')?;
    let username = percent_decode_str(userinfo).decode_utf8_lossy().into_owned();
    if username.is_empty() {
        return None;
    }
    let (host, port_part) = if let Some(bracketed) = hostport.strip_prefix('[') {
        // IPv6 literal: [addr] or [addr]:port
        let (h, after) = bracketed.split_once(']')?;
        (h, after.strip_prefix(':'))
    } else {
        match hostport.rsplit_once(':') {
            Some((h, p)) => (h, Some(p)),
            None => (hostport, None),
        }
    };
    let port = match port_part {
        Some(p) => Some(p.parse().ok()?),
        None => None,
    };
    if host.is_empty() {
        return None;
    }
    Some(Pop3Uri {
        username,
        host: host.to_string(),
        port,
        security,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_follows_security() {
        assert_eq!(pop3_store_uri("user", "host", 110, Security::None), "pop3://user@host:110");
        assert_eq!(pop3_store_uri("user", "host", 995, Security::ImplicitTls), "pop3s://user@host:995");
        assert_eq!(pop3_store_uri("user", "host", 110, Security::StartTls), "pop3+stls://user@host:110");
    }

    #[test]
    fn user_with_at_sign_is_encoded() {
        let u = pop3_store_uri("me@example.com", "mail.example.com", 995, Security::ImplicitTls);
        assert_eq!(u, "pop3s://me%40example.com@mail.example.com:995");
        let parsed = parse_pop3_uri(&u).unwrap();
        assert_eq!(parsed.username, "me@example.com");
        assert_eq!(parsed.host, "mail.example.com");
        assert_eq!(parsed.port, Some(995));
        assert_eq!(parsed.security, Security::ImplicitTls);
    }

    #[test]
    fn port_is_optional() {
        let parsed = parse_pop3_uri("pop3+stls://bob@pop.example.org").unwrap();
        assert_eq!(parsed.port, None);
        assert_eq!(parsed.security, Security::StartTls);
    }

    #[test]
    fn rejects_foreign_schemes_and_missing_parts() {
        assert!(parse_pop3_uri("imap://bob@host:143").is_none());
        assert!(parse_pop3_uri("pop3://host:110").is_none());
        assert!(parse_pop3_uri("pop3://bob@host:notaport").is_none());
        assert!(parse_pop3_uri("pop3://bob@").is_none());
    }
}
