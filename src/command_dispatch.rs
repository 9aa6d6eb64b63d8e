//! Purpose: Hold top-level CLI command dispatch for `lc-revive`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Every command writes exactly one JSON document (or completion script) to stdout.
//! Invariants: Helpers in `main.rs` remain the source of parsing and emission logic.

use super::*;
use lc_revive::api::{ImportMappings, NamespaceAllowlist, SymbolRegistry, loads};

pub(super) fn dispatch_command(command: Command, color_mode: ColorMode) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "lc-revive", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output(color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Revive {
            input,
            options,
            pretty,
        } => {
            let options = build_options(options)?;
            let text = read_input(input.as_deref())?;
            let revived = loads(&text, &options)?;
            emit_revived(&revived, pretty, color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Namespaces { valid_namespaces } => {
            let allowlist = NamespaceAllowlist::new(valid_namespaces);
            emit_json(json!({ "namespaces": allowlist.as_slice() }), color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Mappings {
            lookup,
            import_mappings,
        } => {
            let overrides = parse_import_mappings(&import_mappings)?
                .into_iter()
                .collect::<HashMap<_, _>>();
            let mappings = ImportMappings::with_overrides(overrides);
            match lookup {
                Some(key) => {
                    let key = SymbolPath::parse_dotted(&key)?;
                    let path = mappings.resolve(&key).ok_or_else(|| {
                        Error::new(ErrorKind::UnsupportedVersion)
                            .with_message(format!("no import mapping for `{key}`"))
                            .with_hint("Run `lc-revive mappings` to list known keys.")
                            .with_symbol(key.clone())
                    })?;
                    emit_json(mapping_json(&mappings, &key, path), color_mode);
                }
                None => {
                    let entries = mappings
                        .entries()
                        .into_iter()
                        .map(|(key, path)| mapping_json(&mappings, key, path))
                        .collect::<Vec<_>>();
                    emit_json(json!({ "mappings": entries }), color_mode);
                }
            }
            Ok(RunOutcome::ok())
        }
        Command::Symbols => {
            let modules = SymbolRegistry::builtin()
                .modules()
                .map(|(module, symbols)| {
                    let symbols = symbols
                        .values()
                        .map(|symbol| {
                            json!({
                                "name": symbol.name(),
                                "constructible": symbol.is_constructible(),
                            })
                        })
                        .collect::<Vec<_>>();
                    json!({ "module": module, "symbols": symbols })
                })
                .collect::<Vec<_>>();
            emit_json(json!({ "modules": modules }), color_mode);
            Ok(RunOutcome::ok())
        }
    }
}

fn mapping_json(mappings: &ImportMappings, key: &SymbolPath, path: &SymbolPath) -> Value {
    json!({
        "key": key.to_string(),
        "path": path.to_string(),
        "override": mappings.is_override(key),
    })
}
