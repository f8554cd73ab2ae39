use anyhow::Context;
use clap::Parser;
use soap_walk::{soap, Document, ReadOptions, WriteSink};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, registry::Registry, EnvFilter};

/// Parse a SOAP envelope and print its elements
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// XML file to read. The bundled sample envelope is used when omitted.
    file: Option<PathBuf>,

    /// Trim whitespace around text and drop whitespace-only text
    #[arg(long)]
    trim: bool,

    /// Accept documents without an XML declaration
    #[arg(long)]
    no_decl: bool,

    /// Verbose logging (can be repeated for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose_level: u8) -> anyhow::Result<()> {
    let log_level = match verbose_level {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = Registry::default().with(env_filter).with(
        fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .with_ansi(false)
            .compact(),
    );

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn load(args: &Args) -> anyhow::Result<Document> {
    let opts = ReadOptions {
        trim_text: args.trim,
        require_decl: !args.no_decl,
    };
    match &args.file {
        Some(path) => {
            info!(path = %path.display(), "parsing file");
            Document::parse_file_with_opts(path, opts)
                .with_context(|| format!("failed to parse {}", path.display()))
        }
        None => {
            info!("parsing bundled sample envelope");
            Document::parse_str_with_opts(soap::SAMPLE_ENVELOPE, opts)
                .context("failed to parse sample envelope")
        }
    }
}

fn run(args: &Args, out: &mut impl Write) -> anyhow::Result<()> {
    let document = load(args)?;

    match soap::client_state_ip(&document) {
        Ok(ip) => writeln!(out, "{}", ip)?,
        Err(err) => warn!(error = %err, "no client state"),
    }

    match soap::general_info_entries(&document) {
        Ok(entries) => {
            for (name, text) in entries {
                writeln!(out, "{}", name)?;
                writeln!(out, "{}", text)?;
            }
        }
        Err(err) => warn!(error = %err, "no GenaralInfo entries"),
    }

    let nodes = soap::envelope_children(&document).unwrap_or_else(|err| {
        warn!(error = %err, "document has no root element");
        &[]
    });
    let mut sink = WriteSink::new(out);
    soap_walk::walk(&document, nodes, &mut sink)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    run(&args, &mut out)?;
    out.flush()?;
    Ok(())
}
