use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use glob::glob;
use hazelshark_core::codec::{code_to_int, int_to_code};
use hazelshark_core::{
    CaptureConfig, Direction, PacketKind, PacketRecord, RecordDecode, Workspace, decode_capture,
    parse_hex,
};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;

mod render;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("HAZELSHARK_BUILD_COMMIT"),
    ", ",
    env!("HAZELSHARK_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "hazelshark")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Offline dissector for Hazel game traffic: packets, announcements, region files and captures.",
    long_about = None,
    after_help = "Examples:\n  hazelshark decode 0c 00 01\n  hazelshark decode --clientbound --format tree 00 79 00 0e ...\n  hazelshark capture session.pcapng -o report.json\n  hazelshark code ABCDEF"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress logs and non-error output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode one packet given as hex bytes.
    Decode {
        /// Hex bytes, with or without separators
        #[arg(required = true)]
        hex: Vec<String>,

        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Decode the raw contents of a file (e.g. a region descriptor).
    File {
        input: PathBuf,

        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Decode every game datagram of a .pcap or .pcapng capture.
    Capture {
        /// Path (or glob matching one file) of a .pcap or .pcapng capture
        input: PathBuf,

        /// UDP port of the game server
        #[arg(long, default_value_t = CaptureConfig::default().game_port)]
        game_port: u16,

        /// UDP port of the announcement server
        #[arg(long, default_value_t = CaptureConfig::default().announcement_port)]
        announcement_port: u16,

        /// Also save the decoded datagrams as a workspace file
        #[arg(long)]
        save_workspace: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Decode every packet saved in a workspace file.
    Workspace {
        input: PathBuf,

        /// Write the sample workspace to INPUT instead of decoding it
        #[arg(long)]
        init: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Convert a game code to its integer form, or back.
    Code {
        /// Four or six letter code, or a signed integer
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

#[derive(Args, Debug)]
struct TargetArgs {
    /// Which decoder to run
    #[arg(long, value_enum, default_value_t = KindArg::Game)]
    kind: KindArg,

    /// Packet was sent by the server
    #[arg(long, conflicts_with = "serverbound")]
    clientbound: bool,

    /// Packet was sent by the client (default)
    #[arg(long)]
    serverbound: bool,
}

impl TargetArgs {
    fn direction(&self) -> Direction {
        if self.clientbound {
            Direction::Clientbound
        } else {
            Direction::Serverbound
        }
    }

    fn record(&self, name: String, data: Vec<u8>) -> PacketRecord {
        PacketRecord::new(name, data, self.direction(), self.kind.into())
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Game,
    Announcement,
    Region,
}

impl From<KindArg> for PacketKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Game => PacketKind::GameServer,
            KindArg::Announcement => PacketKind::AnnouncementServer,
            KindArg::Region => PacketKind::RegionInfo,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Json,
    Tree,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Write output to a file instead of stdout
    #[arg(short = 'o', long, conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Write output to stdout (default)
    #[arg(long)]
    stdout: bool,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let quiet = cli.quiet;
    let result = match cli.command {
        Commands::Decode {
            hex,
            target,
            output,
        } => cmd_decode(&hex, &target, &output, quiet),
        Commands::File {
            input,
            target,
            output,
        } => cmd_file(&input, &target, &output, quiet),
        Commands::Capture {
            input,
            game_port,
            announcement_port,
            save_workspace,
            output,
        } => cmd_capture(
            &input,
            CaptureConfig {
                game_port,
                announcement_port,
            },
            save_workspace.as_deref(),
            &output,
            quiet,
        ),
        Commands::Workspace {
            input,
            init,
            output,
        } => cmd_workspace(&input, init, &output, quiet),
        Commands::Code { value } => cmd_code(&value),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        LevelFilter::OFF
    } else {
        match verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn cmd_decode(
    hex: &[String],
    target: &TargetArgs,
    output: &OutputArgs,
    quiet: bool,
) -> Result<(), CliError> {
    let text = hex.join(" ");
    let data = parse_hex(&text).map_err(|err| {
        CliError::new(
            err.to_string(),
            Some("pass bytes as hex pairs, e.g. `0c 00 01`".to_string()),
        )
    })?;
    let record = target.record("stdin".to_string(), data);
    let decoded = decode_record(&record)?;
    emit(&decoded, || render::render_tree(decoded.tree()), output, quiet)
}

fn cmd_file(
    input: &Path,
    target: &TargetArgs,
    output: &OutputArgs,
    quiet: bool,
) -> Result<(), CliError> {
    ensure_file(input, "pass the path of a binary packet or region file")?;
    let data =
        fs::read(input).with_context(|| format!("Failed to read input file: {}", input.display()))?;
    debug!(path = %input.display(), len = data.len(), "read input file");
    let record = target.record(input.display().to_string(), data);
    let decoded = decode_record(&record)?;
    emit(&decoded, || render::render_tree(decoded.tree()), output, quiet)
}

fn cmd_capture(
    input: &Path,
    config: CaptureConfig,
    save_workspace: Option<&Path>,
    output: &OutputArgs,
    quiet: bool,
) -> Result<(), CliError> {
    let resolved = resolve_input_path(input)?;
    validate_capture_file(&resolved)?;
    let report = decode_capture(&resolved, &config).context("PCAP/PCAPNG decoding failed")?;
    info!(
        frames = report.frames_total,
        decoded = report.decoded,
        failed = report.failed,
        "capture decoded"
    );

    if let Some(path) = save_workspace {
        let workspace = Workspace {
            packets: report.entries.iter().map(|entry| entry.to_record()).collect(),
        };
        workspace
            .save(path)
            .with_context(|| format!("Failed to save workspace: {}", path.display()))?;
        if !quiet {
            eprintln!("OK: workspace written -> {}", path.display());
        }
    }

    emit(&report, || render::render_capture(&report), output, quiet)
}

#[derive(Serialize)]
struct WorkspaceEntry<'a> {
    name: &'a str,
    kind: PacketKind,
    direction: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    decoded: Option<RecordDecode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn cmd_workspace(
    input: &Path,
    init: bool,
    output: &OutputArgs,
    quiet: bool,
) -> Result<(), CliError> {
    if init {
        if input.exists() {
            return Err(CliError::new(
                format!("workspace already exists: {}", input.display()),
                Some("choose a new path for the sample workspace".to_string()),
            ));
        }
        Workspace::sample()
            .save(input)
            .with_context(|| format!("Failed to write workspace: {}", input.display()))?;
        if !quiet {
            eprintln!("OK: sample workspace written -> {}", input.display());
        }
        return Ok(());
    }

    ensure_file(input, "create one with `hazelshark workspace --init <PATH>`")?;
    let workspace = Workspace::load(input).map_err(|err| {
        CliError::new(
            err.to_string(),
            Some("expected a JSON object with a `packets` array".to_string()),
        )
    })?;
    let entries: Vec<WorkspaceEntry<'_>> = workspace
        .packets
        .iter()
        .map(|record| {
            let (decoded, error) = match record.decode() {
                Ok(decoded) => (Some(decoded), None),
                Err(err) => (None, Some(err.to_string())),
            };
            WorkspaceEntry {
                name: &record.name,
                kind: record.kind,
                direction: record.direction,
                decoded,
                error,
            }
        })
        .collect();

    let text = || {
        entries
            .iter()
            .map(|entry| {
                let body = match (&entry.decoded, &entry.error) {
                    (Some(decoded), _) => render::render_tree(decoded.tree()),
                    (None, Some(error)) => format!("error: {error}\n"),
                    (None, None) => String::new(),
                };
                format!(
                    "== {} ({}, {})\n{}",
                    entry.name,
                    entry.kind.as_str(),
                    entry.direction.as_str(),
                    body
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    emit(&entries, text, output, quiet)
}

fn cmd_code(value: &str) -> Result<(), CliError> {
    let value = value.trim();
    if let Ok(number) = value.parse::<i32>() {
        println!("{}", int_to_code(number));
        return Ok(());
    }
    let number = code_to_int(value).map_err(|err| {
        CliError::new(
            format!("invalid game code '{value}': {err}"),
            Some("use 4 letters (legacy) or 6 letters, or a signed 32-bit integer".to_string()),
        )
    })?;
    println!("{number}");
    Ok(())
}

fn decode_record(record: &PacketRecord) -> Result<RecordDecode, CliError> {
    record.decode().map_err(|err| {
        let hint = match record.kind {
            PacketKind::GameServer => "check --clientbound/--serverbound and --kind",
            PacketKind::AnnouncementServer | PacketKind::RegionInfo => "check --kind",
        };
        CliError::new(format!("decode failed: {err}"), Some(hint.to_string()))
    })
}

/// Serialize or render `value` and write it where `output` asks.
fn emit<T: Serialize>(
    value: &T,
    render: impl FnOnce() -> String,
    output: &OutputArgs,
    quiet: bool,
) -> Result<(), CliError> {
    let text = match output.format {
        Format::Json => serialize_json(value, output.pretty && !output.compact)?,
        Format::Tree => render(),
    };

    let path = match &output.output {
        Some(path) if !output.stdout => path,
        _ => {
            print!("{}", text);
            if !text.ends_with('\n') {
                println!();
            }
            return Ok(());
        }
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(path, text).with_context(|| format!("Failed to write output: {}", path.display()))?;
    if !quiet {
        eprintln!("OK: output written -> {}", path.display());
    }
    Ok(())
}

fn serialize_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("JSON serialization failed").map_err(Into::into)
}

fn ensure_file(input: &Path, hint: &str) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some(hint.to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some(hint.to_string()),
        ));
    }
    Ok(())
}

fn validate_capture_file(input: &Path) -> Result<(), CliError> {
    ensure_file(input, "use a .pcap or .pcapng file")?;
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "pcap" && ext != "pcapng" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .pcap or .pcapng file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .pcap or .pcapng".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let more = if count > 3 { ", ..." } else { "" };
            Err(CliError::new(
                format!("multiple files match pattern '{pattern}' ({count} matches); matches: {listed}{more}"),
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
