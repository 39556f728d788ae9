use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the built-in formats registered by prose-babel
// We need to duplicate this here since build scripts can't access src/ modules
const AVAILABLE_FORMATS: &[&str] = &["markdown", "html", "json"];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let formats = || clap::builder::PossibleValuesParser::new(AVAILABLE_FORMATS);

    let mut cmd = Command::new("prose")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert rich-text documents between Markdown, HTML and ProseMirror JSON")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats (default command)")
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(Arg::new("from").long("from").value_parser(formats()))
                .arg(
                    Arg::new("to")
                        .long("to")
                        .required(true)
                        .value_parser(formats()),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(Command::new("schema").about("Print the node and mark types of the active schema"));

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "prose", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "prose", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "prose", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
