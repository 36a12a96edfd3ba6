// Command-line interface for wikirt
//
// The main role of the wikirt program is to round-trip a wiki page through a Parsoid-compatible
// service and report which differences in the regenerated wikitext matter. The library does the
// work; this binary wires configuration, logging and the HTTP service together and picks the
// exit code.
//
// Usage:
//  wikirt <title>                         - Round-trip a page (default)
//  wikirt roundtrip <title> [--format F]  - Same as above (explicit)
//  wikirt align <html> <start> <end>      - Print the nodes a source range maps to
//  wikirt normalize <file> [--html]       - Print the canonical form used for comparison
//  wikirt --list-formats                  - List report formats
//
// Exit codes: 0 when no semantic differences were found, 1 when some were, 2 on any failure.

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use std::fs;
use tracing_subscriber::EnvFilter;
use wikirt::dom::markup::markup;
use wikirt::report::Outcome;
use wikirt::{
    find_matching_nodes, normalize_html, normalize_wikitext, AnnotatedDocument, Classifier,
    HttpService, ReporterRegistry, RoundTrip, ServiceSettings, SourceSpan,
};
use wikirt_config::{
    LoadError, LogFormat, LoggingConfig, Loader, WikirtConfig, LOCAL_CONFIG_FILE,
};

const EXIT_CLEAN: i32 = 0;
const EXIT_SEMANTIC: i32 = 1;
const EXIT_FATAL: i32 = 2;

const SUBCOMMANDS: &[&str] = &["roundtrip", "align", "normalize", "help"];

fn build_cli() -> Command {
    Command::new("wikirt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Round-trip checker for wikitext/HTML conversion")
        .long_about(
            "wikirt parses a wiki page to annotated HTML, serializes it back and reports\n\
            which changes in the regenerated wikitext are semantic.\n\n\
            Examples:\n  \
            wikirt Main_Page                          # Plain report for one page\n  \
            wikirt roundtrip Main_Page --format xml   # JUnit-style XML\n  \
            wikirt align page.html 120 180            # Nodes covering [120, 180)\n  \
            wikirt normalize excerpt.wiki             # Normalized wikitext",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available report formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a wikirt.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("roundtrip")
                .about("Round-trip a page and classify every difference (default command)")
                .arg(
                    Arg::new("title")
                        .help("Page title")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Report format (see --list-formats)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("prefix")
                        .long("prefix")
                        .help("Wiki prefix used in report labels, e.g. enwiki"),
                )
                .arg(
                    Arg::new("domain")
                        .long("domain")
                        .help("Wiki domain sent to the transform service"),
                )
                .arg(
                    Arg::new("parsoid-url")
                        .long("parsoid-url")
                        .help("Base URL of the transform service")
                        .value_hint(ValueHint::Url),
                )
                .arg(
                    Arg::new("api-url")
                        .long("api-url")
                        .help("MediaWiki action API endpoint used to fetch the page")
                        .value_hint(ValueHint::Url),
                )
                .arg(
                    Arg::new("parallel")
                        .long("parallel")
                        .help("Classify differences on a thread pool")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("align")
                .about("Print the nodes of an annotated HTML file that a source range maps to")
                .arg(
                    Arg::new("html")
                        .help("Path to the annotated HTML")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("start")
                        .help("Range start (character offset)")
                        .required(true)
                        .index(2)
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("end")
                        .help("Range end (character offset, exclusive)")
                        .required(true)
                        .index(3)
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("source-len")
                        .long("source-len")
                        .help("Length of the source text; defaults to the range end")
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
        .subcommand(
            Command::new("normalize")
                .about("Print the canonical form of a wikitext (or HTML) file")
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("html")
                        .long("html")
                        .help("Treat the input as HTML")
                        .action(ArgAction::SetTrue),
                ),
        )
}

/// Global flags whose value is the next argument.
const GLOBAL_VALUE_FLAGS: &[&str] = &["--config"];

/// Rewrite `args` for a bare page title by inserting the roundtrip
/// subcommand before it. Leading global flags may precede the title.
/// `None` when the first positional argument is a subcommand or missing.
fn inject_default_subcommand(args: &[String]) -> Option<Vec<String>> {
    let mut index = 1;
    while let Some(arg) = args.get(index) {
        if GLOBAL_VALUE_FLAGS.contains(&arg.as_str()) {
            index += 2;
        } else if arg.starts_with('-') {
            index += 1;
        } else {
            break;
        }
    }

    let first = args.get(index)?;
    if SUBCOMMANDS.contains(&first.as_str()) {
        return None;
    }
    let mut injected = args[..index].to_vec();
    injected.push("roundtrip".to_string());
    injected.extend_from_slice(&args[index..]);
    Some(injected)
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Try normal parsing first, then retry with "roundtrip" injected for a
    // bare page title
    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&args) {
        Ok(m) => m,
        Err(e) => match inject_default_subcommand(&args) {
            Some(injected) => match cli.try_get_matches_from(&injected) {
                Ok(m) => m,
                Err(e2) => e2.exit(),
            },
            None => e.exit(),
        },
    };

    if matches.get_flag("list-formats") {
        handle_list_formats_command();
        return;
    }

    let code = match matches.subcommand() {
        Some(("roundtrip", sub_matches)) => {
            let config = load_cli_config(
                matches.get_one::<String>("config").map(|s| s.as_str()),
                sub_matches,
            );
            init_logging(&config.logging);
            let title = sub_matches
                .get_one::<String>("title")
                .expect("title is required");
            handle_roundtrip_command(title, &config)
        }
        Some(("align", sub_matches)) => {
            let path = sub_matches
                .get_one::<String>("html")
                .expect("html is required");
            let start = *sub_matches
                .get_one::<usize>("start")
                .expect("start is required");
            let end = *sub_matches.get_one::<usize>("end").expect("end is required");
            let source_len = sub_matches.get_one::<usize>("source-len").copied();
            handle_align_command(path, start, end, source_len)
        }
        Some(("normalize", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            handle_normalize_command(input, sub_matches.get_flag("html"))
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            EXIT_FATAL
        }
    };
    std::process::exit(code);
}

/// Handle the roundtrip command
fn handle_roundtrip_command(title: &str, config: &WikirtConfig) -> i32 {
    let registry = ReporterRegistry::default();
    let format = config.report.format.as_str();
    if let Err(e) = registry.get(format) {
        eprintln!("Error: {e}");
        return EXIT_FATAL;
    }

    let service = match HttpService::new(ServiceSettings::from(&config.service)) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("Error: {e}");
            return EXIT_FATAL;
        }
    };
    let classifier = Classifier::default().parallel(config.classify.parallel);
    let prefix = config.service.prefix.as_str();
    tracing::info!(%title, %prefix, format, parsoid = %config.service.parsoid_url, "checking page");

    let (outcome, code) = match RoundTrip::new(&service, &service, &classifier).run(title) {
        Ok(report) => {
            let code = if report.semantic_count() > 0 {
                EXIT_SEMANTIC
            } else {
                EXIT_CLEAN
            };
            (registry.render(format, prefix, Outcome::Completed(&report)), code)
        }
        Err(error) => (
            registry.render(
                format,
                prefix,
                Outcome::Failed {
                    title,
                    error: &error,
                },
            ),
            EXIT_FATAL,
        ),
    };

    match outcome {
        Ok(text) => {
            println!("{text}");
            code
        }
        Err(e) => {
            eprintln!("Error: {e}");
            EXIT_FATAL
        }
    }
}

/// Handle the align command
fn handle_align_command(path: &str, start: usize, end: usize, source_len: Option<usize>) -> i32 {
    if end < start {
        eprintln!("Error: range end {end} is before its start {start}");
        return EXIT_FATAL;
    }
    let html = match fs::read_to_string(path) {
        Ok(html) => html,
        Err(e) => {
            eprintln!("Error reading file '{path}': {e}");
            return EXIT_FATAL;
        }
    };

    let doc = AnnotatedDocument::parse(&html);
    let source_len = source_len.unwrap_or(end).max(end);
    match find_matching_nodes(&doc, doc.body(), SourceSpan::new(start, end), source_len) {
        Some(nodes) => println!("{}", markup(&doc, &nodes)),
        // Not an error: the range may fall between annotated nodes.
        None => eprintln!("No nodes match [{start}, {end})"),
    }
    EXIT_CLEAN
}

/// Handle the normalize command
fn handle_normalize_command(input: &str, html: bool) -> i32 {
    let source = match fs::read_to_string(input) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading file '{input}': {e}");
            return EXIT_FATAL;
        }
    };

    if html {
        print!("{}", normalize_html(&source));
    } else {
        print!("{}", normalize_wikitext(&source));
    }
    EXIT_CLEAN
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    let registry = ReporterRegistry::default();
    println!("Available report formats:\n");
    for name in registry.list_formats() {
        if let Ok(reporter) = registry.get(&name) {
            println!("  {name:<8} {}", reporter.description());
        }
    }
}

fn load_cli_config(explicit_path: Option<&str>, sub_matches: &ArgMatches) -> WikirtConfig {
    let loader = Loader::new().with_optional_file(LOCAL_CONFIG_FILE);
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    apply_cli_overrides(loader, sub_matches)
        .and_then(Loader::build)
        .unwrap_or_else(|err| {
            eprintln!("Failed to load configuration: {err}");
            std::process::exit(EXIT_FATAL);
        })
}

/// Flags given on the command line win over every configuration file.
fn apply_cli_overrides(
    mut loader: Loader,
    sub_matches: &ArgMatches,
) -> Result<Loader, LoadError> {
    const STRING_FLAGS: &[(&str, &str)] = &[
        ("format", "report.format"),
        ("prefix", "service.prefix"),
        ("domain", "service.domain"),
        ("parsoid-url", "service.parsoid_url"),
        ("api-url", "service.api_url"),
    ];

    for (flag, key) in STRING_FLAGS {
        if let Some(value) = sub_matches.get_one::<String>(flag) {
            loader = loader.set_override(key, value.as_str())?;
        }
    }
    if sub_matches.get_flag("parallel") {
        loader = loader.set_override("classify.parallel", true)?;
    }
    Ok(loader)
}

/// Install the global subscriber. Logs go to stderr; stdout carries reports.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // A second call (tests, embedding) keeps the first subscriber.
    let _ = match config.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
