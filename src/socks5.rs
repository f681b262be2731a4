//! Client side of the socks5 CONNECT handshake (rfc1928), without
//! authentication.

use byteorder::{NetworkEndian, WriteBytesExt};
use hyper::client::connect::Destination;
use std::io;
use std::net::SocketAddr;
use std::net::{Ipv4Addr, Ipv6Addr};
use tokio::net::tcp::TcpStream;
use tokio::prelude::*;

const VERSION: u8 = 0x05;
const NO_AUTH: u8 = 0x00;
const CMD_CONNECT: u8 = 0x01;

const ATYP_IPV4: u8 = 0x01;
const ATYP_DOMAIN: u8 = 0x03;
const ATYP_IPV6: u8 = 0x04;

/// Greeting sent right after the tcp connection is established.
pub const HELLO: [u8; 3] = [
    VERSION,
    0x01, // number of supported auths
    NO_AUTH,
];

#[derive(Debug, Clone, PartialEq)]
pub enum ProxyDest {
    Ipv4Addr(Ipv4Addr),
    Ipv6Addr(Ipv6Addr),
    Domain(String),
}

impl ProxyDest {
    fn apply(&self, buf: &mut Vec<u8>) -> io::Result<()> {
        match self {
            ProxyDest::Ipv4Addr(addr) => {
                debug!("Setting socks5 destination as ipv4: {:?}", addr);
                buf.push(ATYP_IPV4);
                buf.extend(&addr.octets());
            }
            ProxyDest::Ipv6Addr(addr) => {
                debug!("Setting socks5 destination as ipv6: {:?}", addr);
                buf.push(ATYP_IPV6);
                buf.extend(&addr.octets());
            }
            ProxyDest::Domain(domain) => {
                debug!("Setting socks5 destination as domain: {:?}", domain);
                if domain.is_empty() || domain.len() > 255 {
                    return Err(invalid_data("domain can not be encoded for socks5"));
                }
                buf.push(ATYP_DOMAIN);
                buf.push(domain.len() as u8);
                buf.extend(domain.bytes());
            }
        }
        Ok(())
    }

    /// Parse a host as it appears in a url, ipv6 addresses are bracketed.
    pub fn from_host(host: &str) -> ProxyDest {
        if let Ok(addr) = host.parse::<Ipv4Addr>() {
            return ProxyDest::Ipv4Addr(addr);
        }

        let unbracketed = host.trim_start_matches('[').trim_end_matches(']');
        match unbracketed.parse::<Ipv6Addr>() {
            Ok(addr) => ProxyDest::Ipv6Addr(addr),
            _ => ProxyDest::Domain(host.to_string()),
        }
    }

    pub fn from_hyper(dest: &Destination) -> (ProxyDest, u16) {
        let port = match (dest.scheme(), dest.port()) {
            (_, Some(port)) => port,
            ("http", None) => 80,
            (_, None) => 443,
        };

        (ProxyDest::from_host(dest.host()), port)
    }
}

/// Build the CONNECT request for `dest:port`.
pub fn connect_request(dest: &ProxyDest, port: u16) -> io::Result<Vec<u8>> {
    let mut buf = vec![
        VERSION,
        CMD_CONNECT,
        0x00, // reserved
    ];
    dest.apply(&mut buf)?;
    buf.write_u16::<NetworkEndian>(port)?;
    Ok(buf)
}

/// Check the server's answer to our greeting.
pub fn check_hello_reply(buf: &[u8]) -> io::Result<()> {
    if buf.len() != 2 || buf[0] != VERSION {
        return Err(invalid_data("wrong version"));
    }
    if buf[1] != NO_AUTH {
        return Err(invalid_data("auth failed"));
    }
    Ok(())
}

/// Validate the fixed part of the CONNECT reply and return how many bytes of
/// bound address remain to be read, `None` when the length is sent as an
/// extra byte (domain).
pub fn check_connect_reply(buf: &[u8]) -> io::Result<Option<usize>> {
    if buf.len() != 4 || buf[0] != VERSION {
        return Err(invalid_data("wrong version"));
    }
    if let Some(msg) = reply_error(buf[1]) {
        return Err(io::Error::new(io::ErrorKind::ConnectionRefused, msg));
    }
    if buf[2] != 0x00 {
        return Err(invalid_data("wrong reserved bytes"));
    }
    match buf[3] {
        ATYP_IPV4 => Ok(Some(4)),
        ATYP_DOMAIN => Ok(None),
        ATYP_IPV6 => Ok(Some(16)),
        _ => Err(invalid_data("wrong address type")),
    }
}

/// Map a socks5 reply code to its error message, `None` means success.
pub fn reply_error(code: u8) -> Option<&'static str> {
    match code {
        0x00 => None,
        0x01 => Some("general failure"),
        0x02 => Some("connection not allowed by ruleset"),
        0x03 => Some("network unreachable"),
        0x04 => Some("host unreachable"),
        0x05 => Some("connection refused by destination host"),
        0x06 => Some("TTL expired"),
        0x07 => Some("command not supported / protocol error"),
        0x08 => Some("address type not supported"),
        _ => Some("unknown connection error"),
    }
}

fn invalid_data(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

/// A `Future` that will resolve to an tcp connection.
#[must_use = "futures do nothing unless polled"]
pub struct ConnectionFuture(Box<dyn Future<Item = TcpStream, Error = io::Error> + Send>);

impl Future for ConnectionFuture {
    type Item = TcpStream;
    type Error = io::Error;

    fn poll(&mut self) -> Poll<Self::Item, Self::Error> {
        self.0.poll()
    }
}

type AddrLenFuture = Box<dyn Future<Item = (TcpStream, usize), Error = io::Error> + Send>;

/// Connect to the proxy at `addr` and ask it to open a tunnel to `dest:port`.
pub fn connect(addr: &SocketAddr, dest: ProxyDest, port: u16) -> ConnectionFuture {
    let request = match connect_request(&dest, port) {
        Ok(request) => request,
        Err(err) => return ConnectionFuture(Box::new(future::err(err))),
    };

    let fut = TcpStream::connect(addr)
        .and_then(|stream| {
            debug!("Sending socks5 hello");
            tokio::io::write_all(stream, HELLO)
        })
        .and_then(|(stream, _)| tokio::io::read_exact(stream, [0; 2]))
        .and_then(|(stream, buf)| -> io::Result<TcpStream> {
            check_hello_reply(&buf)?;
            debug!("Socks5 authentication successful, sending connect request");
            Ok(stream)
        })
        .and_then(move |stream| tokio::io::write_all(stream, request))
        .and_then(|(stream, _)| tokio::io::read_exact(stream, [0; 4]))
        .and_then(|(stream, buf)| -> AddrLenFuture {
            match check_connect_reply(&buf) {
                Ok(Some(n)) => Box::new(future::ok((stream, n))),
                Ok(None) => {
                    let fut = tokio::io::read_exact(stream, [0; 1])
                        .map(|(stream, len)| (stream, len[0] as usize));
                    Box::new(fut)
                }
                Err(err) => Box::new(future::err(err)),
            }
        })
        .and_then(|(stream, n)| {
            // bound address followed by the bound port
            tokio::io::read_exact(stream, vec![0; n + 2])
        })
        .map(|(stream, _)| {
            info!("Socks5 tunnel established");
            stream
        });
    ConnectionFuture(Box::new(fut))
}
