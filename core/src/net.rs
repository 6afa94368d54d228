/*
 * net.rs
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

//! Blocking transport: TcpStream with connect and idle timeouts, optionally wrapped in rustls.
//!
//! A connection is plain or secure; implicit TLS handshakes immediately on connect;
//! STLS upgrades a plain stream in place after the server accepts the command.
//! Handshakes are driven to completion eagerly so failures surface here rather than
//! on the first protocol read.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, WebPkiSupportedAlgorithms};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, ClientConnection, DigitallySignedStruct, RootCertStore, SignatureScheme, StreamOwned};

/// Connect and idle timeouts for one connection.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub connect: Duration,
    /// Applied to every read and write; None blocks indefinitely.
    pub idle: Option<Duration>,
}

/// Build a root certificate store: platform native certs first, then webpki-roots as fallback.
fn build_root_store() -> RootCertStore {
    let mut root_store = RootCertStore::empty();
    if let Ok(certs) = rustls_native_certs::load_native_certs() {
        for cert in certs {
            let _ = root_store.add(cert);
        }
    }
    if root_store.is_empty() {
        root_store.roots = webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();
    }
    root_store
}

/// Verifier that accepts any server certificate but still checks handshake signatures.
#[derive(Debug)]
struct AcceptAnyCertificate {
    algorithms: WebPkiSupportedAlgorithms,
}

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}

/// Default TLS client config (native + Mozilla roots, no client auth).
fn verifying_client_config() -> Arc<ClientConfig> {
    static CONFIG: OnceLock<Arc<ClientConfig>> = OnceLock::new();
    CONFIG
        .get_or_init(|| {
            let config = ClientConfig::builder()
                .with_root_certificates(build_root_store())
                .with_no_client_auth();
            Arc::new(config)
        })
        .clone()
}

/// TLS client config that skips certificate validation (explicit opt-in only).
fn unverified_client_config() -> Arc<ClientConfig> {
    static CONFIG: OnceLock<Arc<ClientConfig>> = OnceLock::new();
    CONFIG
        .get_or_init(|| {
            let verifier = AcceptAnyCertificate {
                algorithms: rustls::crypto::ring::default_provider().signature_verification_algorithms,
            };
            let config = ClientConfig::builder()
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(verifier))
                .with_no_client_auth();
            Arc::new(config)
        })
        .clone()
}

fn client_config(accept_invalid_certs: bool) -> Arc<ClientConfig> {
    if accept_invalid_certs {
        unverified_client_config()
    } else {
        verifying_client_config()
    }
}

/// Byte stream for a session: plain TCP or TLS over TCP.
pub enum Pop3Stream {
    Plain(TcpStream),
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
}

impl Pop3Stream {
    /// Connect without TLS (plain sessions and the first leg of STLS).
    pub fn connect_plain(host: &str, port: u16, timeouts: Timeouts) -> io::Result<Self> {
        let tcp = connect_tcp(host, port, timeouts)?;
        Ok(Pop3Stream::Plain(tcp))
    }

    /// Connect with implicit TLS (pop3s, port 995): TCP connect then immediate handshake.
    pub fn connect_implicit_tls(
        host: &str,
        port: u16,
        timeouts: Timeouts,
        accept_invalid_certs: bool,
    ) -> io::Result<Self> {
        let tcp = connect_tcp(host, port, timeouts)?;
        let tls = handshake(host, tcp, accept_invalid_certs)?;
        Ok(Pop3Stream::Tls(Box::new(tls)))
    }

    /// Upgrade this plain stream to TLS on the same TCP connection (after STLS was accepted).
    /// An already secure stream is returned unchanged.
    pub fn upgrade_to_tls(self, host: &str, accept_invalid_certs: bool) -> io::Result<Self> {
        match self {
            Pop3Stream::Plain(tcp) => {
                let tls = handshake(host, tcp, accept_invalid_certs)?;
                Ok(Pop3Stream::Tls(Box::new(tls)))
            }
            tls @ Pop3Stream::Tls(_) => Ok(tls),
        }
    }

    pub fn is_secure(&self) -> bool {
        matches!(self, Pop3Stream::Tls(_))
    }

    fn tcp(&self) -> &TcpStream {
        match self {
            Pop3Stream::Plain(s) => s,
            Pop3Stream::Tls(s) => s.get_ref(),
        }
    }

    /// Close the socket in both directions. Aborts any read blocked on another handle.
    pub fn shutdown(&self) -> io::Result<()> {
        self.tcp().shutdown(Shutdown::Both)
    }
}

fn connect_tcp(host: &str, port: u16, timeouts: Timeouts) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeouts.connect) {
            Ok(tcp) => {
                tcp.set_read_timeout(timeouts.idle)?;
                tcp.set_write_timeout(timeouts.idle)?;
                return Ok(tcp);
            }
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, format!("no address found for {}", host))
    }))
}

fn handshake(
    host: &str,
    mut tcp: TcpStream,
    accept_invalid_certs: bool,
) -> io::Result<StreamOwned<ClientConnection, TcpStream>> {
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "invalid host name"))?;
    let mut conn = ClientConnection::new(client_config(accept_invalid_certs), server_name)
        .map_err(|e| io::Error::new(io::ErrorKind::ConnectionRefused, e))?;
    while conn.is_handshaking() {
        conn.complete_io(&mut tcp)?;
    }
    Ok(StreamOwned::new(conn, tcp))
}

impl Read for Pop3Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Pop3Stream::Plain(s) => s.read(buf),
            Pop3Stream::Tls(s) => s.read(buf),
        }
    }
}

impl Write for Pop3Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Pop3Stream::Plain(s) => s.write(buf),
            Pop3Stream::Tls(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Pop3Stream::Plain(s) => s.flush(),
            Pop3Stream::Tls(s) => s.flush(),
        }
    }
}
