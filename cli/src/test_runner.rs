use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Module name used when generating artifacts.
    #[serde(default = "default_module")]
    pub module: String,

    /// If true, the test expects parsing to fail.
    #[serde(default)]
    pub expect_parse_error: bool,

    /// Expected parse error: the error message must contain this substring.
    #[serde(default)]
    pub expect_error: Option<String>,

    /// If set, the parse error must report this 1-based source line.
    #[serde(default)]
    pub expect_error_line: Option<usize>,

    /// Expected struct-declarations artifact (trimmed comparison).
    #[serde(default)]
    pub expect_header: Option<String>,

    /// Expected reflection-metadata artifact (trimmed comparison).
    #[serde(default)]
    pub expect_source: Option<String>,
}

fn default_module() -> String {
    "test".to_string()
}

/// Parse a `.test.type` file into its TOML frontmatter config and schema
/// source.
fn parse_test_file(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}'); // strip BOM

    if !content.starts_with("---") {
        return Err("missing opening --- frontmatter delimiter".into());
    }

    let after_open = &content[3..];
    let after_open = after_open
        .strip_prefix('\n')
        .or_else(|| after_open.strip_prefix("\r\n"))
        .unwrap_or(after_open);

    let close_pos = after_open
        .find("\n---")
        .ok_or("missing closing --- frontmatter delimiter")?;

    let toml_str = after_open[..close_pos].trim_end_matches('\r');
    let rest_start = close_pos + 4; // skip \n---
    let source = after_open[rest_start..]
        .strip_prefix("\r\n")
        .or_else(|| after_open[rest_start..].strip_prefix('\n'))
        .unwrap_or(&after_open[rest_start..]);

    let config: TestConfig =
        toml::from_str(toml_str).map_err(|e| format!("TOML parse error: {}", e))?;

    Ok((config, source))
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

fn fail(path: &Path, description: Option<String>, reason: String) -> TestResult {
    TestResult {
        path: path.to_path_buf(),
        description,
        outcome: TestOutcome::Fail(reason),
    }
}

fn run_single_test(path: &Path) -> TestResult {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return fail(path, None, format!("cannot read file: {}", e)),
    };

    let (config, source) = match parse_test_file(&content) {
        Ok(pair) => pair,
        Err(e) => return fail(path, None, format!("frontmatter error: {}", e)),
    };

    let description = config.description.clone();

    let parser = msgtype::parser::Parser::new(source.to_string(), 0);
    let parse_result = parser.parse();

    // Error-expecting tests pass iff parsing failed the expected way.
    let expects_error = config.expect_parse_error
        || config.expect_error.is_some()
        || config.expect_error_line.is_some();
    if expects_error {
        let error = match parse_result {
            Err(error) => error,
            Ok(_) => {
                return fail(
                    path,
                    description,
                    "expected parse error, but parsing succeeded".into(),
                );
            }
        };
        if let Some(expected) = &config.expect_error {
            if !error.message.contains(expected.as_str()) {
                return fail(
                    path,
                    description,
                    format!(
                        "expected error containing \"{}\", got: {}",
                        expected, error.message
                    ),
                );
            }
        }
        if let Some(expected_line) = config.expect_error_line {
            if error.line != expected_line {
                return fail(
                    path,
                    description,
                    format!(
                        "expected error on line {}, but it is on line {}",
                        expected_line, error.line
                    ),
                );
            }
        }
        return TestResult {
            path: path.to_path_buf(),
            description,
            outcome: TestOutcome::Pass,
        };
    }

    let schema = match parse_result {
        Ok(s) => s,
        Err(error) => {
            return fail(
                path,
                description,
                format!("unexpected parse error: {}", error.message),
            );
        }
    };

    if let Some(expected) = &config.expect_header {
        let actual = codegen::generate_header(&config.module, &schema);
        if let Some(reason) = artifact_mismatch("header", expected, &actual) {
            return fail(path, description, reason);
        }
    }
    if let Some(expected) = &config.expect_source {
        let actual = codegen::generate_source(&config.module, &schema);
        if let Some(reason) = artifact_mismatch("source", expected, &actual) {
            return fail(path, description, reason);
        }
    }

    TestResult {
        path: path.to_path_buf(),
        description,
        outcome: TestOutcome::Pass,
    }
}

/// Trimmed comparison of a generated artifact against the expectation.
/// Returns `Some(reason)` on mismatch.
fn artifact_mismatch(what: &str, expected: &str, actual: &str) -> Option<String> {
    if actual.trim() == expected.trim() {
        return None;
    }
    Some(format!(
        "{} mismatch\n  expected:\n{}\n  actual:\n{}",
        what,
        expected.trim(),
        actual.trim()
    ))
}

/// Discover `.test.type` files grouped by category (subfolder relative to
/// root). Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.ends_with(".test.type") {
                let category = path
                    .parent()
                    .and_then(|p| p.strip_prefix(root).ok())
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
                    .unwrap_or_default();
                out.entry(category).or_default().push(path);
            }
        }
    }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no .test.type files found in {}", path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &categories {
        let label = if cat.is_empty() { "(root)" } else { cat.as_str() };
        eprintln!("  {} ({} tests)", label, files.len());
    }
}

fn pass_label(no_color: bool) -> &'static str {
    if no_color { "PASS" } else { "\x1b[32mPASS\x1b[0m" }
}

fn fail_label(no_color: bool) -> &'static str {
    if no_color { "FAIL" } else { "\x1b[31mFAIL\x1b[0m" }
}

/// Run all `.test.type` files under `path` (or a single file). If
/// `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let files: Vec<PathBuf> = if path.is_file() {
        vec![path.to_path_buf()]
    } else {
        let all_categories = discover_categorized(path);
        if all_categories.is_empty() {
            eprintln!("no .test.type files found in {}", path.display());
            return 1;
        }
        let selected: Vec<PathBuf> = if categories.is_empty() {
            all_categories.into_values().flatten().collect()
        } else {
            let mut selected = Vec::new();
            for requested in categories {
                let req = requested.trim_matches('/');
                let mut found = false;
                for (cat, files) in &all_categories {
                    if cat == req || cat.starts_with(&format!("{}/", req)) {
                        selected.extend(files.iter().cloned());
                        found = true;
                    }
                }
                if !found {
                    eprintln!(
                        "warning: category '{}' not found (available: {})",
                        req,
                        all_categories
                            .keys()
                            .map(|k| if k.is_empty() { "(root)" } else { k.as_str() })
                            .collect::<Vec<_>>()
                            .join(", ")
                    );
                }
            }
            selected
        };
        selected
    };

    let mut failures: Vec<TestResult> = Vec::new();
    let total = files.len();

    for file in files {
        let result = run_single_test(&file);
        let label = result
            .description
            .clone()
            .unwrap_or_else(|| file.display().to_string());
        match &result.outcome {
            TestOutcome::Pass => eprintln!("  {}  {}", pass_label(no_color), label),
            TestOutcome::Fail(_) => {
                eprintln!("  {}  {}", fail_label(no_color), label);
                failures.push(result);
            }
        }
    }

    eprintln!();
    if failures.is_empty() {
        eprintln!(
            "test result: {}. {} passed, 0 failed",
            if no_color { "ok" } else { "\x1b[32mok\x1b[0m" },
            total
        );
        0
    } else {
        eprintln!("failures:");
        eprintln!();
        for failure in &failures {
            let TestOutcome::Fail(reason) = &failure.outcome else {
                continue;
            };
            eprintln!("  --- {} ---", failure.path.display());
            for line in reason.lines() {
                eprintln!("  {}", line);
            }
            eprintln!();
        }
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            if no_color { "FAILED" } else { "\x1b[31mFAILED\x1b[0m" },
            total - failures.len(),
            failures.len(),
            total
        );
        1
    }
}
