use crate::socks5::{self, ProxyDest};
use futures::{future, Poll};
use hyper::client::connect::HttpConnector;
use hyper::client::connect::{self, Connect, Connected};
use hyper::rt::Future;
use hyper_rustls::HttpsConnector;
use rustls::ClientConfig;
use tokio::net::TcpStream;

use std::io;
use std::net::SocketAddr;

/// Opens the tcp connection for a request, either directly or through a
/// socks5 proxy.
pub struct Connector<T> {
    http: T,
    proxy: Option<SocketAddr>,
}

impl<T> Connector<T> {
    /// The socks5 proxy this connector dials through, if any.
    pub fn proxy(&self) -> Option<&SocketAddr> {
        self.proxy.as_ref()
    }
}

impl Connector<HttpConnector> {
    pub fn new() -> Connector<HttpConnector> {
        let mut http = HttpConnector::new(4);
        http.enforce_http(false);
        Connector {
            http,
            proxy: None,
        }
    }

    pub fn with_socks5(mut self, proxy: SocketAddr) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_https(self) -> HttpsConnector<Connector<HttpConnector>> {
        let mut config = ClientConfig::new();
        config
            .root_store
            .add_server_trust_anchors(&webpki_roots::TLS_SERVER_ROOTS);
        config.ct_logs = Some(&ct_logs::LOGS);

        HttpsConnector::from((self, config))
    }
}

impl Default for Connector<HttpConnector> {
    fn default() -> Self {
        Connector::new()
    }
}

impl Connect for Connector<HttpConnector> {
    type Transport = TcpStream;
    type Error = io::Error;
    type Future = Connecting<TcpStream>;

    fn connect(&self, dest: connect::Destination) -> Self::Future {
        match &self.proxy {
            Some(proxy) => {
                debug!("dialing {:?} through socks5 proxy {}", dest, proxy);
                let (dest, port) = ProxyDest::from_hyper(&dest);
                let fut = socks5::connect(proxy, dest, port)
                    .and_then(|stream| future::ok((stream, Connected::new())));
                Connecting(Box::new(fut))
            }
            None => {
                debug!("dialing {:?} directly", dest);
                Connecting(Box::new(self.http.connect(dest)))
            }
        }
    }
}

/// A Future representing work to connect to a URL.
#[must_use = "futures do nothing unless polled"]
pub struct Connecting<T>(Box<dyn Future<Item = (T, connect::Connected), Error = io::Error> + Send>);

impl<T> Future for Connecting<T> {
    type Item = (T, connect::Connected);
    type Error = io::Error;

    fn poll(&mut self) -> Poll<Self::Item, Self::Error> {
        self.0.poll()
    }
}
