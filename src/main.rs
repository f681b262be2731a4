#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

use log::LevelFilter;
use sockfetch::errors::*;
use sockfetch::{Client, Conf};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(about = "Fetch a url and write the body to stdout or a file")]
pub struct Args {
    /// Socks5 proxy (host:port), connects directly if empty
    #[structopt(long = "proxy", default_value = "")]
    proxy: String,
    /// Timeout for the whole request, eg. 500ms, 5s, 1m 30s. Fractions like
    /// 1.5s are not accepted, use 1500ms instead
    #[structopt(
        long = "timeout",
        default_value = "5s",
        parse(try_from_str = humantime::parse_duration)
    )]
    timeout: Duration,
    /// User-Agent header, none is sent if empty
    #[structopt(long = "user-agent", default_value = "")]
    user_agent: String,
    /// Write the body to this file instead of stdout
    #[structopt(short = "o", default_value = "")]
    output: String,
    /// One of debug, info, warn, error
    #[structopt(long = "logLevel", default_value = "error")]
    log_level: String,
    /// Url to fetch, http:// is assumed if no scheme is given
    url: String,
}

fn parse_level(level: &str) -> LevelFilter {
    match level {
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        _ => LevelFilter::Error,
    }
}

fn normalize_url(url: &str) -> String {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

fn init_logger(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Error)
        .filter_module("sockfetch", level)
        .format_timestamp_secs()
        .init();
}

fn run(args: Args) -> Result<()> {
    let url = normalize_url(&args.url);

    let mut client = Client::builder()
        .user_agent(args.user_agent)
        .proxy(args.proxy)
        .timeout(args.timeout)
        .build()
        .map_err(|err| format_err!("creating new client: {}", err))?;

    if !args.output.is_empty() {
        client.update_conf(Conf::FileOutput(PathBuf::from(args.output)))?;
    }

    let written = client.get(&url);
    let closed = client.close();
    let written = written?;
    closed?;

    debug!("received {} bytes", written);
    Ok(())
}

fn main() {
    let args = Args::from_args();
    init_logger(parse_level(&args.log_level));

    if let Err(err) = run(args) {
        error!("{}", err);
        process::exit(1);
    }
}
