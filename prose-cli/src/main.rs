// Command-line interface for prose
//
// This binary converts documents between Markdown, HTML and ProseMirror JSON, all fitted to
// the same schema. The conversions themselves live in the prose-babel crate; this crate only
// reads files, loads configuration and reports errors.
//
// Converting:
//
// The conversion needs a to and from pair. The from can be auto-detected from the file extension,
// while being overwrittable by an explicit --from flag.
// Usage:
//  prose <input> --to <format> [--from <format>] [--output <file>]  - Convert between formats (default)
//  prose convert <input> --to <format> [--from <format>] [--output <file>]  - Same as above (explicit)
//  prose schema                          - Print the active vocabulary
//  prose --list-formats                  - List available formats
//
// Configuration:
//
// The embedded defaults are layered with ./prose.toml (when present) and an explicit --config file.
// Single keys can be overridden with --extra-<key> <value>:
//  prose notes.md --to html --extra-linkify --extra-image-inline true
//
// Logging goes to stderr. RUST_LOG is honored; --verbose turns on debug output, which includes
// every element the parsers dropped and every node written through a fallback.

use clap::{Arg, ArgAction, Command, ValueHint};
use prose_babel::schema::{ContentRule, NodeGroup};
use prose_babel::{FormatRegistry, Schema};
use prose_config::{Loader, ProseConfig};
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        let key_opt = if let Some(key) = arg.strip_prefix("--extra-") {
            Some(key)
        } else {
            arg.strip_prefix("--extras-")
        };

        if let Some(key) = key_opt {
            // A following value is anything that is not another flag. "-" alone is
            // a valid value (the bullet marker).
            let has_value = args
                .get(i + 1)
                .is_some_and(|next| next == "-" || !next.starts_with('-'));

            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("prose")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert rich-text documents between Markdown, HTML and ProseMirror JSON")
        .long_about(
            "prose converts documents between Markdown, HTML and ProseMirror JSON.\n\n\
            Every conversion goes through a document tree fitted to the active schema,\n\
            so content the schema cannot hold is dropped (run with --verbose to see what).\n\n\
            Commands:\n  \
            - convert: Transform between document formats (default)\n  \
            - schema:  Print the node and mark types of the active schema\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to override a configuration key.\n  \
            Boolean flags can omit the value (defaults to 'true').\n  \
            Keys: allow-html, linkify, breaks, image-inline,\n        \
            tight-lists, bullet-marker, html-fallback\n\n\
            Examples:\n  \
            prose notes.md --to html                   # Convert to HTML (outputs to stdout)\n  \
            prose page.html --to markdown -o page.md   # Convert to a Markdown file\n  \
            prose doc.json --to markdown --extra-tight-lists",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a prose.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log debug diagnostics to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats (default command)")
                .long_about(
                    "Convert documents between different formats.\n\n\
                    Supported formats:\n  \
                    - markdown: CommonMark with GFM tables and strikethrough (.md)\n  \
                    - html:     HTML fragment (.html)\n  \
                    - json:     ProseMirror document JSON (.json)\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.\n\n\
                    Examples:\n  \
                    prose convert input.md --to html             # Convert to HTML (stdout)\n  \
                    prose convert doc.json --to markdown -o a.md # JSON to a Markdown file\n  \
                    prose input.md --to json                     # 'convert' is optional",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .long_help(
                            "Target format to convert to.\n\n\
                            Available formats: markdown, html, json\n\
                            Use the format name, not the file extension.",
                        )
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("schema")
                .about("Print the node and mark types of the active schema")
                .long_about(
                    "Lists every node type with its group, content rule and attributes,\n\
                    followed by every mark type. Configuration applies, so\n\
                    --extra-image-inline shows image as an inline node.",
                ),
        )
}

fn main() {
    // Try to parse args. If no subcommand is provided, inject "convert"
    let args: Vec<String> = std::env::args().collect();

    // Parse extra-* arguments before clap processing
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A first argument that is neither a flag nor a command is an input file
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && cleaned_args[1] != "convert"
                && cleaned_args[1] != "schema"
                && cleaned_args[1] != "help"
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);

                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    init_tracing(matches.get_flag("verbose"));

    let mut config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    apply_config_overrides(&mut config, &mut extra_params);
    if let Some(unknown) = extra_params.keys().next() {
        eprintln!("Unknown parameter --extra-{unknown}");
        std::process::exit(1);
    }

    let registry = build_registry(&config);

    if matches.get_flag("list-formats") {
        handle_list_formats_command(&registry);
        return;
    }

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let from_arg = sub_matches.get_one::<String>("from");
            let to = sub_matches.get_one::<String>("to").expect("to is required");

            // Auto-detect --from if not provided
            let from = if let Some(f) = from_arg {
                f.to_string()
            } else {
                match registry.detect_format_from_filename(input) {
                    Some(detected) => detected,
                    None => {
                        eprintln!("Error: Could not detect format from filename '{input}'");
                        eprintln!("Please specify --from explicitly");
                        std::process::exit(1);
                    }
                }
            };

            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(&registry, input, &from, to, output);
        }
        Some(("schema", _)) => {
            let schema = build_schema(&config);
            print!("{}", describe_schema(&schema));
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

/// Installs the stderr subscriber. `--verbose` wins over `RUST_LOG`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_schema(config: &ProseConfig) -> Schema {
    config.build_schema().unwrap_or_else(|e| {
        eprintln!("Invalid schema: {e}");
        std::process::exit(1);
    })
}

fn build_registry(config: &ProseConfig) -> FormatRegistry {
    let schema = Arc::new(build_schema(config));
    FormatRegistry::with_defaults(schema, &config.conversion_options())
}

/// Handle the convert command
fn handle_convert_command(
    registry: &FormatRegistry,
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
) {
    // Validate formats exist
    if let Err(e) = registry.get(from) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    if let Err(e) = registry.get(to) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let source = fs::read_to_string(input).unwrap_or_else(|e| {
        eprintln!("Error reading file '{input}': {e}");
        std::process::exit(1);
    });

    debug!(input, from, to, "converting");
    let doc = registry.parse(&source, from).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let mut text = registry.serialize(&doc, to).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    if !text.ends_with('\n') {
        text.push('\n');
    }

    match output {
        Some(path) => {
            fs::write(path, text).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
        }
        None => print!("{text}"),
    }
}

/// Handle the list-formats command
fn handle_list_formats_command(registry: &FormatRegistry) {
    println!("Available formats:\n");
    for name in registry.list_formats() {
        if let Ok(format) = registry.get(&name) {
            let extensions = format
                .file_extensions()
                .iter()
                .map(|ext| format!(".{ext}"))
                .collect::<Vec<_>>()
                .join(", ");
            println!("  {name:<10} {:<28} {extensions}", format.description());
        }
    }
}

/// One line per node type (group, content, attributes), then one per mark type.
fn describe_schema(schema: &Schema) -> String {
    let mut out = String::from("Nodes:\n");
    for spec in schema.nodes() {
        let group = match spec.group {
            NodeGroup::Block => "block",
            NodeGroup::Structural => "structural",
            NodeGroup::Inline => "inline",
            NodeGroup::Text => "text",
        };
        let content = match &spec.content {
            ContentRule::Empty => "-".to_string(),
            ContentRule::Text => "text*".to_string(),
            ContentRule::Inline => "inline*".to_string(),
            ContentRule::Blocks => "block+".to_string(),
            ContentRule::BlocksStartingWith(first) => format!("{first} block*"),
            ContentRule::Only(types) if types.len() == 1 => format!("{}+", types[0]),
            ContentRule::Only(types) => format!("({})+", types.join(" | ")),
        };
        let attrs = spec
            .attrs
            .iter()
            .map(|attr| match attr.default.to_string() {
                value if value.is_empty() => attr.name.clone(),
                value => format!("{}={value}", attr.name),
            })
            .collect::<Vec<_>>()
            .join(" ");
        let line = format!("  {:<16} {:<11} {:<26} {attrs}", spec.name, group, content);
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out.push_str("\nMarks:\n");
    for spec in schema.marks() {
        let attrs = spec
            .attrs
            .iter()
            .map(|attr| attr.name.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let line = format!("  {:<16} {attrs}", spec.name);
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn load_cli_config(explicit_path: Option<&str>) -> ProseConfig {
    let loader = Loader::new().with_optional_file("prose.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

fn apply_config_overrides(config: &mut ProseConfig, extra_params: &mut HashMap<String, String>) {
    if let Some(raw) = extra_params.remove("image-inline") {
        config.schema.image_inline = parse_bool_arg("image-inline", &raw);
    }

    if let Some(raw) = extra_params.remove("allow-html") {
        config.parse.allow_html = parse_bool_arg("allow-html", &raw);
    }
    if let Some(raw) = extra_params.remove("linkify") {
        config.parse.linkify = parse_bool_arg("linkify", &raw);
    }
    if let Some(raw) = extra_params.remove("breaks") {
        config.parse.breaks = parse_bool_arg("breaks", &raw);
    }

    if let Some(raw) = take_override(extra_params, &["tight-lists", "tight"]) {
        config.serialize.tight_lists = parse_bool_arg("tight-lists", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["bullet-marker", "bullet-list-marker"]) {
        config.serialize.bullet_list_marker = parse_marker_arg(&raw);
    }
    if let Some(raw) = extra_params.remove("html-fallback") {
        config.serialize.html_fallback = parse_bool_arg("html-fallback", &raw);
    }
}

fn take_override(map: &mut HashMap<String, String>, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(value) = map.remove(*key) {
            return Some(value);
        }
    }
    None
}

fn parse_bool_arg(flag: &str, raw: &str) -> bool {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        other => {
            eprintln!("Invalid boolean value '{other}' for --extra-{flag}");
            std::process::exit(1);
        }
    }
}

fn parse_marker_arg(raw: &str) -> char {
    match raw {
        "*" | "-" | "+" => raw.chars().next().unwrap_or('*'),
        other => {
            eprintln!("Invalid bullet marker '{other}' for --extra-bullet-marker (use *, - or +)");
            std::process::exit(1);
        }
    }
}
