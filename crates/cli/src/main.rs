use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lazycurl_engine::{Executor, StreamKind};
use lazycurl_types::{CurlFlag, Environment, KeyValueEntry, Method, Request, RequestBody};
use lazycurl_util::command::{self, Mode};
use lazycurl_util::status;

#[derive(Debug, Parser)]
#[command(name = "lazycurl", version, about = "Build and run curl commands from a structured request")]
struct Cli {
    /// Target URL; may contain {{variable}} tokens
    url: String,

    /// HTTP method (GET is the default and is never rendered explicitly)
    #[arg(short = 'X', long = "request", value_name = "METHOD")]
    method: Option<String>,

    /// Request header as 'Key: Value'; repeatable
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    headers: Vec<String>,

    /// Query parameter as key=value; repeatable
    #[arg(short = 'q', long = "query", value_name = "KEY=VALUE")]
    query: Vec<String>,

    /// Raw request body
    #[arg(short = 'd', long = "data", value_name = "BODY", conflicts_with_all = ["form", "data_binary"])]
    data: Option<String>,

    /// Form field as key=value; repeatable
    #[arg(short = 'F', long = "form", value_name = "KEY=VALUE", conflicts_with = "data_binary")]
    form: Vec<String>,

    /// Upload a file as the request body
    #[arg(long = "data-binary", value_name = "PATH")]
    data_binary: Option<PathBuf>,

    /// Substitution variable as key=value; repeatable
    #[arg(short = 'e', long = "env", value_name = "KEY=VALUE")]
    env: Vec<String>,

    /// Extra curl flag, optionally as flag=value; repeatable
    #[arg(short = 'o', long = "option", value_name = "FLAG[=VALUE]", allow_hyphen_values = true)]
    options: Vec<String>,

    /// Print the preview command and exit without executing
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let environment = parse_environment(&cli.env)?;
    let request = build_request(&cli)?;

    println!("{}", command::build(&request, &environment, Mode::Preview));
    if cli.dry_run {
        return Ok(());
    }

    let args = command::build_args(&request, &environment, Mode::Execution);
    let mut executor = Executor::new();
    executor.start_args(&args)?;

    // Stream stderr (curl's progress meter) live; stdout is buffered so the
    // status marker can be stripped before anything is shown.
    let mut sink = |kind: StreamKind, chunk: &[u8]| {
        if kind == StreamKind::Stderr {
            let _ = std::io::stderr().write_all(chunk);
        }
    };
    let result = executor
        .finish(&mut sink)
        .context("failed draining curl output")?
        .context("no job was started")?;

    if let Some(status_code) = status::extract_http_status(&result.stdout) {
        eprintln!("HTTP {status_code}");
    }
    print!("{}", status::strip_status_marker(&result.stdout));
    std::io::stdout().flush().ok();

    if let Some(message) = &result.error_message {
        match result.exit_code {
            Some(code) => eprintln!("curl exited with code {code}: {message}"),
            None => eprintln!("{message}"),
        }
        std::process::exit(i32::from(result.exit_code.unwrap_or(1)));
    }
    Ok(())
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_request(cli: &Cli) -> Result<Request> {
    let mut request = Request::new(cli.url.clone());

    if let Some(raw) = &cli.method {
        let method: Method = raw.parse().with_context(|| format!("invalid method '{raw}'"))?;
        request.method = Some(method);
    }
    for raw in &cli.headers {
        request.headers.push(parse_header(raw)?);
    }
    for raw in &cli.query {
        let (key, value) = split_pair(raw)?;
        request.query_params.push(KeyValueEntry::new(key, value));
    }
    for raw in &cli.options {
        request.flags.push(parse_option(raw));
    }

    if let Some(data) = &cli.data {
        request.body = RequestBody::Raw(data.clone());
    } else if !cli.form.is_empty() {
        let fields = cli
            .form
            .iter()
            .map(|raw| split_pair(raw).map(|(key, value)| KeyValueEntry::new(key, value)))
            .collect::<Result<Vec<KeyValueEntry>>>()?;
        request.body = RequestBody::FormData(fields);
    } else if let Some(path) = &cli.data_binary {
        request.body = RequestBody::Binary(path.clone());
    }

    Ok(request)
}

fn parse_environment(pairs: &[String]) -> Result<Environment> {
    let mut environment = Environment::default();
    for pair in pairs {
        let (key, value) = split_pair(pair)?;
        environment.set(key, value);
    }
    Ok(environment)
}

fn parse_header(raw: &str) -> Result<KeyValueEntry> {
    let (key, value) = raw
        .split_once(':')
        .with_context(|| format!("expected 'Key: Value', got '{raw}'"))?;
    Ok(KeyValueEntry::new(key.trim(), value.trim()))
}

fn parse_option(raw: &str) -> CurlFlag {
    match raw.split_once('=') {
        Some((flag, value)) => CurlFlag::with_value(flag, value),
        None => CurlFlag::new(raw),
    }
}

fn split_pair(pair: &str) -> Result<(&str, &str)> {
    pair.split_once('=')
        .with_context(|| format!("expected key=value, got '{pair}'"))
}
