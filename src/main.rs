use clap::{Parser, Subcommand};
use jade_parser::{CompileError, Options, Parsed, Summary, Warning, parse_json};
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use walkdir::WalkDir;

const TOKENS_SUFFIX: &str = ".tokens.json";
const AST_SUFFIX: &str = ".ast.json";

#[derive(Parser)]
#[command(name = "jade-parse")]
#[command(about = "Jade parser - turns lexer token streams into template ASTs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse .tokens.json files into .ast.json files
    Parse {
        /// Path to a .tokens.json file or a directory
        #[arg(required_unless_present = "stdin")]
        path: Option<PathBuf>,

        /// Read a token array from stdin and print the AST to stdout
        #[arg(long)]
        stdin: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Output what the template defines and depends on instead of the AST
        #[arg(long)]
        summary: bool,

        /// Filename recorded on nodes when reading from stdin
        #[arg(long)]
        filename: Option<String>,
    },
}

/// Output shape shared by stdin and file modes
#[derive(Clone, Copy)]
struct Format {
    pretty: bool,
    summary: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { path, stdin, pretty, summary, filename } => {
            let format = Format { pretty, summary };
            let ok = if stdin {
                parse_stdin(filename, format)
            } else if let Some(path) = path {
                parse_path(&path, format)
            } else {
                eprintln!("Error: provide a file/directory or use --stdin");
                false
            };
            if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
        }
    }
}

fn parse_stdin(filename: Option<String>, format: Format) -> bool {
    let mut json = String::new();
    if let Err(err) = io::stdin().read_to_string(&mut json) {
        eprintln!("Error: failed to read stdin: {}", err);
        return false;
    }

    let options = Options { filename };
    match parse_json(&json, &options) {
        Ok(parsed) => {
            print_warnings(&parsed.warnings);
            match render(&parsed, format) {
                Ok(output) => {
                    println!("{}", output);
                    true
                }
                Err(err) => {
                    eprintln!("Error: failed to serialize output: {}", err);
                    false
                }
            }
        }
        Err(err) => {
            print_error(&err);
            false
        }
    }
}

fn parse_path(path: &Path, format: Format) -> bool {
    let start = Instant::now();

    if path.is_file() {
        if !is_token_file(path) {
            eprintln!("Error: {} is not a {} file", path.display(), TOKENS_SUFFIX);
            return false;
        }
        let ok = parse_file(path, format);
        print_summary(usize::from(ok), start.elapsed());
        ok
    } else if path.is_dir() {
        parse_directory(path, format, start)
    } else {
        eprintln!("Error: {} does not exist", path.display());
        false
    }
}

fn parse_directory(dir: &Path, format: Format, start: Instant) -> bool {
    let mut file_count = 0;
    let mut failures = 0;

    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_token_file(e.path()))
    {
        file_count += 1;
        if !parse_file(entry.path(), format) {
            failures += 1;
        }
    }

    if file_count == 0 {
        eprintln!("No {} files found in {}", TOKENS_SUFFIX, dir.display());
        return false;
    }

    print_summary(file_count - failures, start.elapsed());
    failures == 0
}

fn parse_file(path: &Path, format: Format) -> bool {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(err) => {
            eprintln!("Error: failed to read {}: {}", path.display(), err);
            return false;
        }
    };

    let options = Options { filename: template_name(path) };
    let parsed = match parse_json(&json, &options) {
        Ok(parsed) => parsed,
        Err(err) => {
            print_error(&err);
            return false;
        }
    };
    print_warnings(&parsed.warnings);

    let output = output_path(path);
    let written = render(&parsed, format)
        .map_err(io::Error::from)
        .and_then(|contents| fs::write(&output, contents + "\n"));
    match written {
        Ok(()) => {
            print_generated(&output.display().to_string());
            true
        }
        Err(err) => {
            eprintln!("Error: failed to write {}: {}", output.display(), err);
            false
        }
    }
}

fn render(parsed: &Parsed, format: Format) -> Result<String, serde_json::Error> {
    let value = if format.summary {
        serde_json::to_value(Summary::collect(&parsed.root))?
    } else {
        jade_parser::ast::to_value(&parsed.root)?
    };
    if format.pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
}

fn is_token_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(TOKENS_SUFFIX))
}

/// `views/index.jade.tokens.json` was lexed from `views/index.jade`
fn template_name(path: &Path) -> Option<String> {
    let path = path.to_str()?;
    path.strip_suffix(TOKENS_SUFFIX).map(str::to_string)
}

fn output_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let stem = name.strip_suffix(TOKENS_SUFFIX).unwrap_or(name);
    path.with_file_name(format!("{}{}", stem, AST_SUFFIX))
}

fn print_error(err: &CompileError) {
    if io::stderr().is_terminal() {
        eprint!("{}", err.render_color());
    } else {
        eprint!("{}", err.render());
    }
}

fn print_warnings(warnings: &[Warning]) {
    let is_tty = io::stderr().is_terminal();
    for warning in warnings {
        if is_tty {
            eprintln!("  \x1b[33mwarning:\x1b[0m {}", warning);
        } else {
            eprintln!("  warning: {}", warning);
        }
    }
}

fn print_generated(path: &str) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("  \x1b[32m✓\x1b[0m {}", path);
    } else {
        eprintln!("  ✓ {}", path);
    }
}

fn print_summary(count: usize, elapsed: std::time::Duration) {
    let is_tty = io::stderr().is_terminal();
    let time_str = format_duration(elapsed);
    let files_word = if count == 1 { "file" } else { "files" };

    if is_tty {
        eprintln!("\n\x1b[1m✨ Parsed {} {} in {}\x1b[0m", count, files_word, time_str);
    } else {
        eprintln!("\n✨ Parsed {} {} in {}", count, files_word, time_str);
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let micros = d.as_micros();
    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{:.1}ms", micros as f64 / 1000.0)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}
