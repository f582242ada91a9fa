//! Fixture runner: parses every `tests/fixtures/**/*.tokens.json` and compares
//! the result with the sibling `.expected.json` (AST) or `.expected.err`
//! (rendered error).
//!
//! Run with: cargo test --test fixtures

use jade_parser::{Options, ast, parse_json};
use libtest_mimic::{Arguments, Failed, Trial};
use std::fs;
use std::path::{Path, PathBuf};

const TOKENS_SUFFIX: &str = ".tokens.json";

fn main() {
    let args = Arguments::from_args();
    libtest_mimic::run(&args, collect_trials()).exit();
}

fn collect_trials() -> Vec<Trial> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");
    let pattern = format!("{}/**/*{}", root.display(), TOKENS_SUFFIX);

    let mut paths: Vec<PathBuf> = glob::glob(&pattern)
        .expect("valid glob pattern")
        .filter_map(Result::ok)
        .collect();
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let name = path
                .strip_prefix(&root)
                .unwrap_or(&path)
                .to_string_lossy()
                .trim_end_matches(TOKENS_SUFFIX)
                .replace('\\', "/");
            Trial::test(name, move || run_fixture(&path))
        })
        .collect()
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let stem = name.strip_suffix(TOKENS_SUFFIX).unwrap_or(name);
    path.with_file_name(format!("{}{}", stem, suffix))
}

fn run_fixture(path: &Path) -> Result<(), Failed> {
    let tokens = fs::read_to_string(path)?;
    let expected_json = sibling(path, ".expected.json");
    let expected_err = sibling(path, ".expected.err");

    // Fixtures are stamped with their bare template name so expectations stay portable
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_suffix(TOKENS_SUFFIX))
        .map(str::to_string);
    let options = Options { filename };

    match parse_json(&tokens, &options) {
        Ok(parsed) => {
            if !expected_json.exists() {
                return Err(format!("parsed successfully but {} is missing", expected_json.display()).into());
            }
            let expected: serde_json::Value = serde_json::from_str(&fs::read_to_string(&expected_json)?)?;
            let actual = ast::to_value(&parsed.root)?;
            if actual != expected {
                return Err(format!(
                    "AST mismatch\n--- expected ---\n{}\n--- actual ---\n{}",
                    serde_json::to_string_pretty(&expected)?,
                    serde_json::to_string_pretty(&actual)?
                )
                .into());
            }
            Ok(())
        }
        Err(err) => {
            if !expected_err.exists() {
                return Err(format!("unexpected error:{}", err.render()).into());
            }
            let expected = fs::read_to_string(&expected_err)?;
            let actual = err.render();
            if actual.trim() != expected.trim() {
                return Err(format!(
                    "Error mismatch\n--- expected ---\n{}\n--- actual ---\n{}",
                    expected.trim(),
                    actual.trim()
                )
                .into());
            }
            Ok(())
        }
    }
}
