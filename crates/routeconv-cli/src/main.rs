use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use routeconv::{ConvertOptions, Diagnostic, Format};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "routeconv",
    version,
    about = "Convert integration routes between blueprint XML and the YAML DSL"
)]
struct Args {
    /// Input file (defaults to stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    /// Input format (xml, yaml); inferred from the input extension
    #[arg(short, long, value_enum)]
    from: Option<FormatArg>,
    /// Output format (xml, yaml); inferred from the output extension or
    /// taken as the opposite of the input format
    #[arg(short, long, value_enum)]
    to: Option<FormatArg>,
    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,
    /// Keep editor-generated ids such as `route-3f2a`
    #[arg(long)]
    keep_generated_ids: bool,
    /// Write endpoint URIs as one string instead of `uri` + `parameters`
    #[arg(long)]
    no_unpack_uris: bool,
    /// How to print diagnostics on stderr
    #[arg(long, value_enum, default_value = "text")]
    diagnostics: DiagnosticsArg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Xml,
    #[value(alias = "yml")]
    Yaml,
}

impl From<FormatArg> for Format {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Xml => Self::Xml,
            FormatArg::Yaml => Self::Yaml,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DiagnosticsArg {
    Text,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let from = match args.from.map(Format::from).or_else(|| infer_format(&args.input)) {
        Some(format) => format,
        None => {
            bail!(
                "could not infer input format; pass --from or provide an input file with extension"
            );
        }
    };
    let to = args
        .to
        .map(Format::from)
        .or_else(|| infer_format(&args.output))
        .unwrap_or(match from {
            Format::Xml => Format::Yaml,
            Format::Yaml => Format::Xml,
        });

    let options = ConvertOptions {
        strip_generated_ids: !args.keep_generated_ids,
        unpack_uris: !args.no_unpack_uris,
        ..ConvertOptions::default()
    };

    let input = read_input(&args.input)?;
    debug!(?from, ?to, bytes = input.len(), "converting");
    let conversion = routeconv::convert_with_options(&input, from, to, &options)
        .context("conversion failed")?;

    report(&conversion.diagnostics, args.diagnostics)?;
    write_output(&args.output, conversion.output.as_bytes())?;
    Ok(())
}

fn read_input(path: &Option<PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.trim().is_empty() {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
}

fn write_output(path: &Option<PathBuf>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(data).context("failed to write stdout")?;
            Ok(())
        }
    }
}

fn report(diagnostics: &[Diagnostic], style: DiagnosticsArg) -> Result<()> {
    if diagnostics.is_empty() {
        return Ok(());
    }
    let mut stderr = io::stderr();
    match style {
        DiagnosticsArg::Text => {
            for diagnostic in diagnostics {
                writeln!(stderr, "warning: {diagnostic}").context("failed to write stderr")?;
            }
        }
        DiagnosticsArg::Json => {
            serde_json::to_writer_pretty(&mut stderr, diagnostics)
                .context("failed to encode diagnostics")?;
            writeln!(stderr).context("failed to write stderr")?;
        }
    }
    Ok(())
}

fn infer_format(path: &Option<PathBuf>) -> Option<Format> {
    path.as_deref().and_then(Format::from_path)
}
