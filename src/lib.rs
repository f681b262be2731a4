//! This crate fetches a single url and streams the response body into a
//! sink, either standard output, a file or any writer.
//!
//! Connections are made directly or tunnelled through a socks5 proxy,
//! `https` urls are wrapped in rustls with the webpki root store.
//!
//! # Example
//!
//! ```no_run
//! use sockfetch::Client;
//! use std::time::Duration;
//!
//! let client = Client::builder()
//!     .proxy("127.0.0.1:9050")
//!     .user_agent("sockfetch/0.1")
//!     .timeout(Duration::from_secs(5))
//!     .build()
//!     .expect("failed to create client");
//!
//! let written = client.get("https://httpbin.org/anything").expect("request failed");
//! eprintln!("received {} bytes", written);
//! client.close().expect("failed to close output");
//! ```

#![warn(unused_extern_crates)]
pub use http;
pub use hyper;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

pub use http::header;
use http::header::USER_AGENT;
pub use http::{Method, Request, Uri};
use hyper::client::connect::HttpConnector;
use hyper::rt::{Future, Stream};
pub use hyper::Body;
use hyper_rustls::HttpsConnector;

use tokio::prelude::FutureExt;
use tokio::runtime::current_thread::Runtime;

use std::fmt;
use std::io::Write;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

pub mod connector;
mod fields;
mod sink;
pub mod socks5;
mod timer;
use self::connector::Connector;
pub use crate::fields::Fields;
pub use crate::sink::Sink;
pub use crate::timer::{format_duration, TimeIt};

pub mod errors {
    pub use failure::{Error, ResultExt};
    pub type Result<T> = ::std::result::Result<T, Error>;
}
pub use crate::errors::*;

type HttpClient = hyper::Client<HttpsConnector<Connector<HttpConnector>>>;

/// A single configuration value for a [`Client`].
///
/// Values are applied in order, a later value replaces an earlier one for
/// the same setting.
///
/// [`Client`]: struct.Client.html
pub enum Conf {
    /// Tunnel connections through this socks5 proxy (`host:port`). Empty
    /// strings are ignored.
    Proxy(String),
    /// Send this `User-Agent`. Empty strings are ignored.
    UserAgent(String),
    /// Limit for the whole request, from connecting until the body has been
    /// written. Zero disables the limit.
    Timeout(Duration),
    /// Write the body to a writer owned by the caller. The client takes the
    /// handle and drops it on `close` without closing anything else, so pass
    /// a handle you keep, eg. a `try_clone`d `File` or an `Arc<Mutex<_>>`.
    Writer(Box<dyn Write + Send>),
    /// Write the body to a new file. If the file can't be created a warning
    /// is logged and the previous output is kept.
    FileOutput(PathBuf),
}

impl fmt::Debug for Conf {
    fn fmt(&self, w: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Conf::Proxy(proxy) => write!(w, "Proxy({:?})", proxy),
            Conf::UserAgent(ua) => write!(w, "UserAgent({:?})", ua),
            Conf::Timeout(timeout) => write!(w, "Timeout({:?})", timeout),
            Conf::Writer(_) => write!(w, "Writer"),
            Conf::FileOutput(path) => write!(w, "FileOutput({:?})", path),
        }
    }
}

#[derive(Debug, Default)]
struct Settings {
    proxy: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    sink: Mutex<Sink>,
    fields: Fields,
}

impl Settings {
    fn apply(&mut self, conf: Conf) {
        match conf {
            Conf::Proxy(proxy) => {
                if !proxy.is_empty() {
                    self.fields.insert("proxy", &proxy);
                    self.proxy = Some(proxy);
                }
            }
            Conf::UserAgent(ua) => {
                if !ua.is_empty() {
                    self.fields.insert("user_agent", &ua);
                    self.user_agent = Some(ua);
                }
            }
            Conf::Timeout(timeout) => {
                self.fields.insert("timeout", humantime::format_duration(timeout));
                self.timeout = if timeout == Duration::from_secs(0) {
                    None
                } else {
                    Some(timeout)
                };
            }
            Conf::Writer(writer) => {
                self.fields.remove("file");
                self.replace_sink(Sink::Writer(writer));
            }
            Conf::FileOutput(path) => match Sink::create(&path) {
                Ok(sink) => {
                    self.fields.insert("file", path.display());
                    self.replace_sink(sink);
                }
                Err(err) => {
                    warn!(
                        "creating {:?} failed, falling back to previous output: {} {}",
                        path, err, self.fields
                    );
                }
            },
        }
    }

    fn replace_sink(&mut self, sink: Sink) {
        let slot = match self.sink.get_mut() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = sink;
    }
}

/// Resolve the proxy address and set up a transport that dials through it.
fn transport(proxy: Option<&str>) -> Result<HttpClient> {
    let connector = Connector::new();
    let connector = match proxy {
        Some(proxy) => {
            let addr = resolve_proxy(proxy)
                .map_err(|err| format_err!("connecting to the proxy: {}", err))?;
            info!("using socks5 proxy {}", addr);
            connector.with_socks5(addr)
        }
        None => connector,
    };

    let https = connector.with_https();
    let client = hyper::Client::builder()
        .keep_alive(false)
        .build::<_, hyper::Body>(https);
    Ok(client)
}

fn resolve_proxy(proxy: &str) -> Result<SocketAddr> {
    let mut addrs = proxy
        .to_socket_addrs()
        .map_err(|err| format_err!("invalid address {:?}: {}", proxy, err))?;
    addrs
        .next()
        .ok_or_else(|| format_err!("{:?} did not resolve to any address", proxy))
}

/// Collects configuration for a [`Client`].
///
/// [`Client`]: struct.Client.html
#[derive(Debug, Default)]
pub struct ClientBuilder {
    settings: Settings,
}

impl ClientBuilder {
    pub fn new() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Apply a configuration value now.
    pub fn conf(mut self, conf: Conf) -> ClientBuilder {
        self.settings.apply(conf);
        self
    }

    pub fn proxy<S: Into<String>>(self, proxy: S) -> ClientBuilder {
        self.conf(Conf::Proxy(proxy.into()))
    }

    pub fn user_agent<S: Into<String>>(self, user_agent: S) -> ClientBuilder {
        self.conf(Conf::UserAgent(user_agent.into()))
    }

    pub fn timeout(self, timeout: Duration) -> ClientBuilder {
        self.conf(Conf::Timeout(timeout))
    }

    /// Write the body into `writer`. The client flushes it and drops its
    /// handle on close, closing the underlying resource is up to the caller.
    /// Pass a handle you keep, eg. a `try_clone`d `File`.
    pub fn writer<W: Write + Send + 'static>(self, writer: W) -> ClientBuilder {
        self.conf(Conf::Writer(Box::new(writer)))
    }

    pub fn file_output<P: Into<PathBuf>>(self, path: P) -> ClientBuilder {
        self.conf(Conf::FileOutput(path.into()))
    }

    /// Create the client. Fails if a proxy is configured but its address
    /// can't be resolved.
    pub fn build(self) -> Result<Client> {
        let http = transport(self.settings.proxy.as_deref())?;
        Ok(Client {
            http,
            settings: self.settings,
        })
    }
}

/// A client that fetches urls into its output.
///
/// `get` may be called from multiple threads at once, writes into the
/// output are serialized per chunk. Changing the configuration requires
/// exclusive access.
#[derive(Debug)]
pub struct Client {
    http: HttpClient,
    settings: Settings,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client from a list of configuration values, applied in order.
    pub fn new<I: IntoIterator<Item = Conf>>(confs: I) -> Result<Client> {
        confs
            .into_iter()
            .fold(ClientBuilder::new(), ClientBuilder::conf)
            .build()
    }

    /// Change the configuration between requests.
    ///
    /// Setting a proxy replaces the transport. If the proxy can't be set up
    /// the client is left unchanged.
    pub fn update_conf(&mut self, conf: Conf) -> Result<()> {
        if let Conf::Proxy(proxy) = &conf {
            if !proxy.is_empty() {
                self.http = transport(Some(proxy.as_str()))?;
            }
        }
        self.settings.apply(conf);
        Ok(())
    }

    pub fn proxy(&self) -> Option<&str> {
        self.settings.proxy.as_deref()
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.settings.user_agent.as_deref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.settings.timeout
    }

    /// The file the body is written to, `None` for stdout or a custom writer.
    pub fn output_file(&self) -> Option<PathBuf> {
        let sink = match self.settings.sink.lock() {
            Ok(sink) => sink,
            Err(poisoned) => poisoned.into_inner(),
        };
        sink.path().map(Path::to_path_buf)
    }

    pub fn fields(&self) -> &Fields {
        &self.settings.fields
    }

    /// Build a GET request for `url`, with our user agent if one is set.
    pub fn new_request(&self, url: &str) -> Result<Request<Body>> {
        let uri = url
            .parse::<Uri>()
            .map_err(|err| format_err!("building request: invalid url {:?}: {}", url, err))?;
        if uri.scheme_part().is_none() || uri.host().is_none() {
            bail!("building request: url {:?} needs a scheme and a host", url);
        }

        let mut request = Request::builder();
        request.method(Method::GET).uri(uri);
        if let Some(ua) = &self.settings.user_agent {
            request.header(USER_AGENT, ua.as_str());
        }
        request
            .body(Body::empty())
            .map_err(|err| format_err!("building request: {}", err))
    }

    /// Fetch `url` and stream the body into the output, returns the number
    /// of bytes written.
    ///
    /// Blocks until the body is written or the timeout expired.
    pub fn get(&self, url: &str) -> Result<u64> {
        let timer = TimeIt::start(self.settings.fields.clone().with("url", url));

        let request = self.new_request(url)?;
        info!("sending request to {:?}", request.uri());

        let sink = &self.settings.sink;
        let fut = self
            .http
            .request(request)
            .map_err(|err| format_err!("sending request: {}", err))
            .and_then(move |res| {
                debug!("http response: {:?}", res);
                res.into_body()
                    .map_err(|err| format_err!("reading response body: {}", err))
                    .fold(0u64, move |written, chunk| -> Result<u64> {
                        let mut sink = sink
                            .lock()
                            .map_err(|_| format_err!("output is poisoned"))?;
                        sink.write_all(&chunk)
                            .map_err(|err| format_err!("writing response body: {}", err))?;
                        Ok(written + chunk.len() as u64)
                    })
            });

        let mut rt = Runtime::new()?;
        let written = match self.settings.timeout {
            Some(timeout) => {
                let fut = fut.timeout(timeout).map_err(move |err| {
                    if err.is_elapsed() {
                        format_err!("request timed out after {}", humantime::format_duration(timeout))
                    } else {
                        match err.into_inner() {
                            Some(err) => err,
                            None => format_err!("timer failed while waiting for response"),
                        }
                    }
                });
                rt.block_on(fut)?
            }
            None => rt.block_on(fut)?,
        };

        self.settings
            .sink
            .lock()
            .map_err(|_| format_err!("output is poisoned"))?
            .flush()
            .map_err(|err| format_err!("writing response body: {}", err))?;

        debug!("wrote {} bytes to output", written);
        timer.done();
        Ok(written)
    }

    /// Flush the output and close it if it's a file we created. Writers set
    /// with [`Conf::Writer`] are not closed.
    ///
    /// [`Conf::Writer`]: enum.Conf.html#variant.Writer
    pub fn close(self) -> Result<()> {
        let sink = self
            .settings
            .sink
            .into_inner()
            .map_err(|_| format_err!("output is poisoned"))?;
        sink.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{NetworkEndian, ReadBytesExt};
    use std::env;
    use std::fs;
    use std::io::{self, Read};
    use std::net::{Ipv4Addr, TcpListener, TcpStream};
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> Vec<u8> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn read_head(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut byte = [0u8; 1];
        while !buf.ends_with(b"\r\n\r\n") {
            match stream.read(&mut byte) {
                Ok(1) => buf.push(byte[0]),
                _ => break,
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn header(request: &str, name: &str) -> Option<String> {
        request.lines().find_map(|line| {
            let mut parts = line.splitn(2, ':');
            let key = parts.next()?;
            let value = parts.next()?;
            if key.eq_ignore_ascii_case(name) {
                Some(value.trim().to_string())
            } else {
                None
            }
        })
    }

    /// Serve a single request with `body` after `delay`, the join handle
    /// returns the raw request head.
    fn serve(body: &'static [u8], delay: Duration) -> (SocketAddr, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_head(&mut stream);
            thread::sleep(delay);
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).ok();
            stream.write_all(body).ok();
            request
        });
        (addr, handle)
    }

    /// Minimal socks5 server for a single ipv4 CONNECT, the join handle
    /// returns the destination that was requested.
    fn socks5_proxy() -> (SocketAddr, thread::JoinHandle<SocketAddr>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut client, _) = listener.accept().unwrap();

            let mut hello = [0u8; 3];
            client.read_exact(&mut hello).unwrap();
            assert_eq!(hello, socks5::HELLO);
            client.write_all(&[0x05, 0x00]).unwrap();

            let mut head = [0u8; 4];
            client.read_exact(&mut head).unwrap();
            assert_eq!(&head, &[0x05, 0x01, 0x00, 0x01]);
            let mut ip = [0u8; 4];
            client.read_exact(&mut ip).unwrap();
            let port = client.read_u16::<NetworkEndian>().unwrap();
            let dest = SocketAddr::from((Ipv4Addr::from(ip), port));

            let mut upstream = TcpStream::connect(dest).unwrap();
            client
                .write_all(&[0x05, 0x00, 0x00, 0x01, 0, 0, 0, 0, 0, 0])
                .unwrap();

            let mut client_read = client.try_clone().unwrap();
            let mut upstream_write = upstream.try_clone().unwrap();
            thread::spawn(move || io::copy(&mut client_read, &mut upstream_write).ok());
            io::copy(&mut upstream, &mut client).ok();
            dest
        });
        (addr, handle)
    }

    fn unused_addr() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    }

    #[test]
    fn verify_hello_world() {
        let (addr, server) = serve(b"hello world", Duration::from_secs(0));
        let out = SharedBuf::default();
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .writer(out.clone())
            .build()
            .expect("failed to create client");

        let written = client.get(&format!("http://{}/", addr)).expect("request failed");
        assert_eq!(written, 11);
        assert_eq!(out.contents(), b"hello world");
        server.join().unwrap();
        client.close().expect("failed to close");
    }

    #[test]
    fn verify_written_matches_body_len() {
        static BODY: [u8; 100_000] = [b'x'; 100_000];
        let (addr, server) = serve(&BODY, Duration::from_secs(0));
        let out = SharedBuf::default();
        let client = Client::builder().writer(out.clone()).build().unwrap();

        let written = client.get(&format!("http://{}/big", addr)).expect("request failed");
        assert_eq!(written, BODY.len() as u64);
        assert_eq!(out.contents().len(), BODY.len());
        server.join().unwrap();
    }

    #[test]
    fn verify_user_agent() {
        let (addr, server) = serve(b"", Duration::from_secs(0));
        let client = Client::builder()
            .user_agent("some useragent")
            .writer(SharedBuf::default())
            .build()
            .unwrap();

        client.get(&format!("http://{}/", addr)).expect("request failed");
        let request = server.join().unwrap();
        assert_eq!(header(&request, "user-agent"), Some("some useragent".to_string()));
    }

    #[test]
    fn verify_no_user_agent_by_default() {
        let (addr, server) = serve(b"", Duration::from_secs(0));
        let client = Client::builder().writer(SharedBuf::default()).build().unwrap();

        client.get(&format!("http://{}/", addr)).expect("request failed");
        let request = server.join().unwrap();
        assert_eq!(header(&request, "user-agent"), None);
        assert!(request.starts_with("GET / HTTP/1.1\r\n"));
    }

    #[test]
    fn verify_update_conf_user_agent() {
        let (addr, server) = serve(b"", Duration::from_secs(0));
        let mut client = Client::new(vec![
            Conf::UserAgent("first".to_string()),
            Conf::Writer(Box::new(SharedBuf::default())),
        ])
        .unwrap();
        client.update_conf(Conf::UserAgent("second".to_string())).unwrap();
        assert_eq!(client.user_agent(), Some("second"));

        client.get(&format!("http://{}/", addr)).expect("request failed");
        let request = server.join().unwrap();
        assert_eq!(header(&request, "user-agent"), Some("second".to_string()));
    }

    #[test]
    fn verify_last_conf_wins() {
        let client = Client::builder()
            .user_agent("a")
            .user_agent("b")
            .user_agent("")
            .proxy("127.0.0.1:1080")
            .proxy("127.0.0.1:9050")
            .proxy("")
            .timeout(Duration::from_secs(1))
            .timeout(Duration::from_secs(3))
            .build()
            .unwrap();
        assert_eq!(client.user_agent(), Some("b"));
        assert_eq!(client.proxy(), Some("127.0.0.1:9050"));
        assert_eq!(client.timeout(), Some(Duration::from_secs(3)));
        assert_eq!(client.fields().get("proxy"), Some("127.0.0.1:9050"));
        assert_eq!(client.fields().get("timeout"), Some("3s"));
    }

    #[test]
    fn verify_zero_timeout_disables_limit() {
        let client = Client::builder()
            .timeout(Duration::from_secs(2))
            .timeout(Duration::from_secs(0))
            .build()
            .unwrap();
        assert_eq!(client.timeout(), None);
    }

    #[test]
    fn verify_invalid_proxy() {
        let err = Client::builder().proxy("bad proxy").build().unwrap_err();
        assert!(err.to_string().starts_with("connecting to the proxy"));
    }

    #[test]
    fn verify_invalid_proxy_update_keeps_client() {
        let mut client = Client::builder().build().unwrap();
        assert!(client.update_conf(Conf::Proxy("bad proxy".to_string())).is_err());
        assert_eq!(client.proxy(), None);
    }

    #[test]
    fn verify_unreachable_proxy() {
        let (addr, _server) = serve(b"hello world", Duration::from_secs(0));
        let client = Client::builder()
            .proxy(unused_addr().to_string())
            .timeout(Duration::from_secs(5))
            .writer(SharedBuf::default())
            .build()
            .expect("proxy address is valid");

        assert!(client.get(&format!("http://{}/", addr)).is_err());
    }

    #[test]
    fn verify_socks5_proxy() {
        let (addr, server) = serve(b"hello world", Duration::from_secs(0));
        let (proxy, socks) = socks5_proxy();
        let out = SharedBuf::default();
        let client = Client::builder()
            .proxy(proxy.to_string())
            .timeout(Duration::from_secs(5))
            .writer(out.clone())
            .build()
            .unwrap();

        let written = client.get(&format!("http://{}/", addr)).expect("request failed");
        assert_eq!(written, 11);
        assert_eq!(out.contents(), b"hello world");
        assert_eq!(socks.join().unwrap(), addr);
        server.join().unwrap();
    }

    #[test]
    fn verify_update_conf_proxy() {
        let (addr, server) = serve(b"hello world", Duration::from_secs(0));
        let (proxy, socks) = socks5_proxy();
        let out = SharedBuf::default();
        let mut client = Client::builder()
            .timeout(Duration::from_secs(5))
            .writer(out.clone())
            .build()
            .unwrap();
        client.update_conf(Conf::Proxy(proxy.to_string())).unwrap();
        assert_eq!(client.proxy(), Some(proxy.to_string().as_str()));

        let written = client.get(&format!("http://{}/", addr)).expect("request failed");
        assert_eq!(written, 11);
        assert_eq!(out.contents(), b"hello world");
        assert_eq!(socks.join().unwrap(), addr);
        server.join().unwrap();
    }

    #[test]
    fn verify_close_keeps_caller_file_open() {
        let path = env::temp_dir().join(format!("sockfetch-writer-{}.html", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        let (addr, server) = serve(b"hello world", Duration::from_secs(0));
        let client = Client::builder()
            .writer(file.try_clone().unwrap())
            .build()
            .unwrap();

        client.get(&format!("http://{}/", addr)).expect("request failed");
        client.close().expect("failed to close");
        server.join().unwrap();

        file.write_all(b"!").expect("caller handle was closed");
        drop(file);
        assert_eq!(fs::read(&path).unwrap(), b"hello world!");
        fs::remove_file(&path).ok();
    }

    #[test]
    fn verify_timeout() {
        let (addr, _server) = serve(b"hello world", Duration::from_secs(1));
        let timeout = Duration::from_millis(250);
        let client = Client::builder()
            .timeout(timeout)
            .writer(SharedBuf::default())
            .build()
            .unwrap();

        let start = Instant::now();
        let err = client.get(&format!("http://{}/", addr)).unwrap_err();
        let elapsed = start.elapsed();

        assert!(err.to_string().contains("timed out"), "unexpected error: {}", err);
        assert!(elapsed >= timeout);
        assert!(elapsed < timeout + Duration::from_millis(500));
    }

    #[test]
    fn verify_timeout_longer_than_delay() {
        let delay = Duration::from_millis(200);
        let (addr, server) = serve(b"hello world", delay);
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .writer(SharedBuf::default())
            .build()
            .unwrap();

        let start = Instant::now();
        let written = client.get(&format!("http://{}/", addr)).expect("request failed");
        assert_eq!(written, 11);
        assert!(start.elapsed() >= delay);
        server.join().unwrap();
    }

    #[test]
    fn verify_malformed_url() {
        let client = Client::builder().writer(SharedBuf::default()).build().unwrap();
        let err = client.get("http://exa mple.com/").unwrap_err();
        assert!(err.to_string().starts_with("building request"));
    }

    #[test]
    fn verify_url_without_scheme() {
        let client = Client::builder().writer(SharedBuf::default()).build().unwrap();
        let err = client.get("example.com").unwrap_err();
        assert!(err.to_string().starts_with("building request"));
    }

    #[test]
    fn verify_connection_refused() {
        let client = Client::builder().writer(SharedBuf::default()).build().unwrap();
        let err = client.get(&format!("http://{}/", unused_addr())).unwrap_err();
        assert!(err.to_string().starts_with("sending request"));
    }

    #[test]
    fn verify_file_output() {
        let path = env::temp_dir().join(format!("sockfetch-get-{}.html", std::process::id()));
        let (addr, server) = serve(b"hello world", Duration::from_secs(0));
        let client = Client::builder().file_output(&path).build().unwrap();
        assert_eq!(client.output_file(), Some(path.clone()));
        assert_eq!(client.fields().get("file"), Some(path.display().to_string().as_str()));

        client.get(&format!("http://{}/", addr)).expect("request failed");
        client.close().expect("failed to close");
        server.join().unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"hello world");
        fs::remove_file(&path).ok();
    }

    #[test]
    fn verify_unwritable_file_falls_back() {
        let path = env::temp_dir().join("sockfetch-missing-dir").join("out.html");
        let client = Client::builder()
            .file_output(&path)
            .build()
            .expect("file errors are not fatal");
        assert_eq!(client.output_file(), None);
        assert_eq!(client.fields().get("file"), None);
    }

    #[test]
    fn verify_unwritable_file_keeps_writer() {
        let (addr, server) = serve(b"hello world", Duration::from_secs(0));
        let out = SharedBuf::default();
        let path = env::temp_dir().join("sockfetch-missing-dir").join("out.html");
        let client = Client::builder()
            .writer(out.clone())
            .file_output(&path)
            .build()
            .unwrap();

        client.get(&format!("http://{}/", addr)).expect("request failed");
        assert_eq!(out.contents(), b"hello world");
        server.join().unwrap();
    }

    #[test]
    fn verify_client_is_sync() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<Client>();
    }
}
