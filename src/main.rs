//! Purpose: `lc-revive` CLI entry point.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Commands emit stable stdout formats (JSON, pretty on a TTY).
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: Secret values never reach stdout, stderr, or logs.
#![allow(clippy::result_large_err)]
use std::collections::HashMap;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::{
    Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint,
    error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod color_json;
mod command_dispatch;

use color_json::colorize_revived;
use lc_revive::api::{Error, ErrorKind, ReviveOptions, Revived, SymbolPath, to_exit_code};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse_from(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                let message = clap_error_summary(&err);
                let hint = clap_error_hint(&err);
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(message)
                        .with_hint(hint),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    command_dispatch::dispatch_command(cli.command, color_mode)
        .map_err(add_io_hint)
        .map_err(add_internal_hint)
        .map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "lc-revive",
    version,
    about = "Revive LangChain-serialized JSON into live objects, safely",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Only classes from allowed namespaces with a known import path are constructed.
Secrets come from --secret/--secrets-file first, then the environment.
"#,
    after_help = r#"EXAMPLES
  $ lc-revive revive prompt.json
  $ cat chain.json | lc-revive revive --secret ANTHROPIC_API_KEY=sk-...
  $ lc-revive mappings --lookup langchain.prompts.PromptTemplate
  $ lc-revive namespaces --valid-namespace my_pkg

LEARN MORE
  $ lc-revive <command> --help
  Set RUST_LOG=debug to trace each constructed node."#,
    arg_required_else_help = true,
    disable_help_subcommand = false
)]
struct Cli {
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics and pretty JSON output: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Revive a serialized document and print the result",
        long_about = r#"Read serialized JSON from FILE (or stdin) and revive it.

Constructed objects print as {"instance": <class>, "repr": <debug form>}.
Secrets print masked."#,
        after_help = r#"EXAMPLES
  $ lc-revive revive prompt.json
  $ lc-revive revive - < chain.json --no-secrets-from-env --secret API_KEY=sk-test
  $ lc-revive revive doc.json --valid-namespace my_pkg --import-mapping my_pkg.Foo=my_pkg.impl.Foo"#
    )]
    Revive {
        #[arg(
            help = "Serialized JSON file; omit or use - for stdin",
            value_hint = ValueHint::FilePath
        )]
        input: Option<PathBuf>,
        #[command(flatten)]
        options: ReviveArgs,
        #[arg(long, help = "Pretty-print output even when stdout is not a TTY")]
        pretty: bool,
    },
    #[command(about = "List namespaces accepted as constructor roots")]
    Namespaces {
        #[arg(
            long = "valid-namespace",
            value_name = "NS",
            help = "Additional namespace to allow (repeatable)"
        )]
        valid_namespaces: Vec<String>,
    },
    #[command(
        about = "List or look up import mappings",
        after_help = r#"EXAMPLES
  $ lc-revive mappings
  $ lc-revive mappings --lookup langchain.schema.messages.HumanMessage"#
    )]
    Mappings {
        #[arg(long, value_name = "KEY", help = "Resolve one dotted constructor id")]
        lookup: Option<String>,
        #[arg(
            long = "import-mapping",
            value_name = "KEY=PATH",
            help = "Override mapping, dotted on both sides (repeatable)"
        )]
        import_mappings: Vec<String>,
    },
    #[command(about = "List registered modules and their symbols")]
    Symbols,
    #[command(
        arg_required_else_help = true,
        about = "Generate shell completion scripts",
        after_help = r#"EXAMPLES
  $ lc-revive completion bash > ~/.local/share/bash-completion/completions/lc-revive
  $ lc-revive completion zsh > ~/.zfunc/_lc-revive"#
    )]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
    #[command(about = "Print version info as JSON")]
    Version,
}

#[derive(Args, Debug, Default)]
struct ReviveArgs {
    #[arg(
        long = "secret",
        value_name = "KEY=VALUE",
        help = "Secret value for a key (repeatable)"
    )]
    secrets: Vec<String>,
    #[arg(
        long = "secrets-file",
        value_name = "FILE",
        help = "JSON object of secret key/value strings",
        value_hint = ValueHint::FilePath
    )]
    secrets_file: Option<PathBuf>,
    #[arg(
        long = "valid-namespace",
        value_name = "NS",
        help = "Additional namespace to allow (repeatable)"
    )]
    valid_namespaces: Vec<String>,
    #[arg(long, help = "Do not fall back to environment variables for secrets")]
    no_secrets_from_env: bool,
    #[arg(
        long = "import-mapping",
        value_name = "KEY=PATH",
        help = "Override mapping, dotted on both sides (repeatable)"
    )]
    import_mappings: Vec<String>,
}

fn build_options(args: ReviveArgs) -> Result<ReviveOptions, Error> {
    let mut options = ReviveOptions::new().with_secrets_from_env(!args.no_secrets_from_env);
    if let Some(path) = &args.secrets_file {
        for (key, value) in read_secrets_file(path)? {
            options = options.with_secret(key, value);
        }
    }
    // Flag secrets win over file secrets.
    for pair in &args.secrets {
        let (key, value) = split_pair(pair, "--secret", "KEY=VALUE")?;
        options = options.with_secret(key, value);
    }
    for namespace in args.valid_namespaces {
        options = options.with_valid_namespace(namespace);
    }
    for (key, path) in parse_import_mappings(&args.import_mappings)? {
        options = options.with_import_mapping(key, path);
    }
    Ok(options)
}

fn parse_import_mappings(pairs: &[String]) -> Result<Vec<(SymbolPath, SymbolPath)>, Error> {
    pairs
        .iter()
        .map(|pair| {
            let (key, path) = split_pair(pair, "--import-mapping", "a.b.C=x.y.C")?;
            Ok((SymbolPath::parse_dotted(key)?, SymbolPath::parse_dotted(path)?))
        })
        .collect()
}

fn split_pair<'a>(pair: &'a str, flag: &str, shape: &str) -> Result<(&'a str, &'a str), Error> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => Err(Error::new(ErrorKind::Usage)
            .with_message(format!("invalid {flag} value `{}`", redact_pair(pair)))
            .with_hint(format!("Use {flag} {shape}."))),
    }
}

// Keeps only the part before `=` so secret values never appear in diagnostics.
fn redact_pair(pair: &str) -> String {
    match pair.split_once('=') {
        Some((key, _)) => format!("{key}=..."),
        None => "...".to_string(),
    }
}

fn read_secrets_file(path: &Path) -> Result<HashMap<String, String>, Error> {
    let text = std::fs::read_to_string(path).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message(format!("failed to read secrets file {}", path.display()))
            .with_source(err)
    })?;
    serde_json::from_str::<HashMap<String, String>>(&text).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("secrets file must be a JSON object of strings")
            .with_hint("Example: {\"ANTHROPIC_API_KEY\": \"sk-...\"}")
            .with_source(err)
    })
}

fn read_input(input: Option<&Path>) -> Result<String, Error> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message(format!("failed to read {}", path.display()))
                .with_source(err)
        }),
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read stdin")
                    .with_source(err)
            })?;
            Ok(text)
        }
    }
}

fn add_io_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Io || err.hint().is_some() {
        return err;
    }
    err.with_hint("I/O error. Check the path and file permissions.")
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Internal || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "Unexpected internal failure. Retry with RUST_BACKTRACE=1 and share command/context if it persists.",
    )
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn emit_version_output(color_mode: ColorMode) {
    if io::stdout().is_terminal() {
        println!("lc-revive {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(
            json!({
                "name": "lc-revive",
                "version": env!("CARGO_PKG_VERSION"),
            }),
            color_mode,
        );
    }
}

fn emit_json(value: Value, color_mode: ColorMode) {
    let is_tty = io::stdout().is_terminal();
    let use_color = color_mode.use_color(is_tty);
    let json = if is_tty || use_color {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_revived(value: &Revived, pretty: bool, color_mode: ColorMode) {
    let is_tty = io::stdout().is_terminal();
    let use_color = color_mode.use_color(is_tty);
    let rendered = if pretty || is_tty || use_color {
        colorize_revived(value, use_color)
    } else {
        serde_json::to_string(&value.to_display_json())
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    };
    println!("{rendered}");
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error",
        ErrorKind::Usage => "usage error",
        ErrorKind::Io => "i/o error",
        ErrorKind::Parse => "invalid json",
        ErrorKind::MalformedNode => "malformed serialized node",
        ErrorKind::MissingSecret => "missing secret",
        ErrorKind::NotSerializable => "object is marked not serializable",
        ErrorKind::InvalidNamespace => "namespace not allowed",
        ErrorKind::UnsupportedVersion => "unsupported serialized path",
        ErrorKind::ImportResolutionFailed => "import failed",
        ErrorKind::ConstructionFailed => "construction failed",
    }
    .to_string()
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(key) = err.key() {
        inner.insert("key".to_string(), json!(key));
    }
    if let Some(symbol) = err.symbol() {
        inner.insert("symbol".to_string(), json!(symbol.to_string()));
    }
    if let Some(node) = err.node() {
        inner.insert("node".to_string(), node.clone());
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(key) = err.key() {
        lines.push(format!(
            "{} {key}",
            colorize_label("key:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(symbol) = err.symbol() {
        lines.push(format!(
            "{} {symbol}",
            colorize_label("symbol:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(node) = err.node() {
        lines.push(format!(
            "{} {node}",
            colorize_label("node:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let usage = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .map(str::trim);

    let Some(usage) = usage else {
        return "Try `lc-revive --help`.".to_string();
    };

    let tokens: Vec<&str> = usage.split_whitespace().collect();
    let Some(pos) = tokens.iter().position(|t| *t == "lc-revive") else {
        return "Try `lc-revive --help`.".to_string();
    };

    let mut parts = Vec::new();
    for token in tokens.iter().skip(pos + 1) {
        if token.starts_with('-') || token.starts_with('<') || token.starts_with('[') {
            break;
        }
        parts.push(*token);
    }

    if parts.is_empty() {
        return "Try `lc-revive --help`.".to_string();
    }
    format!("Try `lc-revive {} --help`.", parts.join(" "))
}
