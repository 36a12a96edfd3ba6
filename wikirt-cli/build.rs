use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of build_cli() in src/main.rs, which build scripts cannot import.
// Only the shape matters for completions; help texts are abbreviated.
fn build_cli() -> Command {
    Command::new("wikirt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Round-trip checker for wikitext/HTML conversion")
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("roundtrip")
                .about("Round-trip a page and classify every difference")
                .arg(Arg::new("title").required(true).index(1))
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .value_parser(["plain", "xml"]),
                )
                .arg(Arg::new("prefix").long("prefix"))
                .arg(Arg::new("domain").long("domain"))
                .arg(
                    Arg::new("parsoid-url")
                        .long("parsoid-url")
                        .value_hint(ValueHint::Url),
                )
                .arg(Arg::new("api-url").long("api-url").value_hint(ValueHint::Url))
                .arg(
                    Arg::new("parallel")
                        .long("parallel")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("align")
                .about("Print the nodes a source range maps to")
                .arg(
                    Arg::new("html")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(Arg::new("start").required(true).index(2))
                .arg(Arg::new("end").required(true).index(3))
                .arg(Arg::new("source-len").long("source-len")),
        )
        .subcommand(
            Command::new("normalize")
                .about("Print the canonical form of a file")
                .arg(
                    Arg::new("input")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(Arg::new("html").long("html").action(ArgAction::SetTrue)),
        )
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = build_cli();

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "wikirt", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "wikirt", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "wikirt", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
