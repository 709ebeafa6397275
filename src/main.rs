use anyhow::{Context, anyhow};
use clap::Parser;
use http_response::http::{Framing, Response, StreamOutput, Variant};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io;
use std::str::FromStr;
use tracing::debug;
use tracing_subscriber::EnvFilter;

static HEADER_ARG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<name>[!#$%&'*+\-.^_`|~0-9A-Za-z]+)\s*:\s*(?P<value>.*?)\s*$").unwrap()
});

/// Writes a single HTTP response to stdout.
///
/// By default the status goes out as a CGI `Status:` header. With
/// `--framing nph` a full status line is written instead, using
/// `SERVER_PROTOCOL` when the host sets it.
#[derive(Parser, Debug)]
#[command(name = "respond", version)]
struct Cli {
    /// Builder behaviour: `current` or `legacy`
    #[arg(long, default_value = "current", value_parser = Variant::from_str)]
    variant: Variant,

    /// Status framing: `cgi` (Status header) or `nph` (raw status line)
    #[arg(long, default_value = "cgi", value_parser = Framing::from_str)]
    framing: Framing,

    #[arg(long)]
    status: Option<u16>,

    /// Header to set, as `Name: value`. Repeatable.
    #[arg(long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Header name to remove before headers are set. Repeatable.
    #[arg(long = "remove-header")]
    remove_headers: Vec<String>,

    #[arg(long, conflicts_with_all = ["json", "redirect"])]
    body: Option<String>,

    /// JSON document sent as the body with a JSON content type
    #[arg(long, conflicts_with = "redirect")]
    json: Option<String>,

    #[arg(long, conflicts_with_all = ["status", "headers", "remove_headers"])]
    redirect: Option<String>,

    #[arg(long, default_value_t = 302)]
    redirect_status: u16,

    /// Terminate the process right after the response is written
    #[arg(long)]
    exit: bool,
}

fn parse_header(arg: &str) -> anyhow::Result<(String, String)> {
    let caps = HEADER_ARG_RE
        .captures(arg)
        .ok_or(anyhow!("Expected `Name: value`, got: {}", arg))?;

    Ok((caps["name"].to_string(), caps["value"].to_string()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    debug!(variant = %cli.variant, framing = %cli.framing, "writing response");

    let output = StreamOutput::from_env(io::stdout().lock()).with_framing(cli.framing);
    let mut response = Response::with_variant(output, cli.variant);

    if let Some(url) = &cli.redirect {
        if cli.exit {
            response.redirect_and_exit(url, cli.redirect_status);
        }
        return response
            .redirect(url, cli.redirect_status)
            .context("Can't redirect");
    }

    if let Some(code) = cli.status {
        response
            .set_status_code(code)
            .context("Can't set status code")?;
    }

    response
        .remove_headers(cli.remove_headers)
        .set_headers(cli.headers);

    if let Some(json) = &cli.json {
        let payload: serde_json::Value =
            serde_json::from_str(json).context("Invalid JSON payload")?;
        if cli.exit {
            response.send_json_and_exit(&payload);
        }
        return response.send_json(&payload).context("Can't send response");
    }

    if let Some(body) = cli.body {
        response.set_body(body);
    }

    if cli.exit {
        response.send_and_exit();
    }
    response.send().context("Can't send response")
}
