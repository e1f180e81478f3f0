//! On-disk multi-file projects
//!
//! A [`TestProject`] writes its files into a temporary directory and compiles
//! them through the same file-reading path as the command-line tool.

use anyhow::{Context, Result};
use cy_driver::{Compiler, CompilerConfig, ReturnValue};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Result of running a project
#[derive(Debug)]
pub enum TestResult {
    /// Outcome matched the expectation
    Pass,
    /// Outcome did not match
    Fail {
        /// What went wrong
        reason: String,
    },
}

/// Expected outcome of a project
#[derive(Debug, Clone)]
pub enum Expected {
    /// The entry point returns this value
    Returns(ReturnValue),
    /// Compilation fails with a message containing every pattern
    CompileError {
        /// Substrings of the error chain
        patterns: Vec<String>,
    },
}

/// A multi-file project compiled from disk
#[derive(Debug)]
pub struct TestProject {
    /// Project name, used as directory name
    pub name: String,
    /// Relative paths and contents, compiled in this order
    pub files: Vec<(PathBuf, String)>,
    /// Session configuration
    pub config: CompilerConfig,
    /// Expected outcome
    pub expected: Expected,
}

impl TestProject {
    /// Creates an empty project expecting the entry point to return `0`
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: Vec::new(),
            config: CompilerConfig::default(),
            expected: Expected::Returns(ReturnValue::Int(0)),
        }
    }

    /// Loads every `.c` file of a directory, ordered by file name
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or a file cannot be read.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let name = dir
            .file_name()
            .map_or_else(|| "project".to_string(), |name| name.to_string_lossy().into_owned());
        let mut project = Self::new(name);

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "c") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let contents = fs::read_to_string(&path)?;
            let relative = path.strip_prefix(dir).unwrap_or(&path).to_path_buf();
            project.add_file(relative, contents);
        }
        Ok(project)
    }

    /// Appends a file
    pub fn add_file(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.push((path.into(), content.into()));
    }

    /// Expects the entry point to return `value`
    pub fn expect_return(&mut self, value: ReturnValue) {
        self.expected = Expected::Returns(value);
    }

    /// Expects compilation to fail with messages containing `patterns`
    pub fn expect_errors(&mut self, patterns: &[&str]) {
        self.expected = Expected::CompileError {
            patterns: patterns.iter().map(ToString::to_string).collect(),
        };
    }

    /// Writes the project to a temporary directory, compiles it and checks the outcome
    #[must_use]
    pub fn run(&self) -> TestResult {
        match self.execute() {
            Ok(outcome) => self.check(outcome),
            Err(err) => TestResult::Fail {
                reason: format!("{err:#}"),
            },
        }
    }

    fn execute(&self) -> Result<std::result::Result<ReturnValue, String>> {
        let temp_dir = TempDir::new().context("creating temporary directory")?;
        let root = temp_dir.path().join(&self.name);

        let mut paths = Vec::new();
        for (path, content) in &self.files {
            let full_path = root.join(path);
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&full_path, content)
                .with_context(|| format!("writing {}", full_path.display()))?;
            paths.push(full_path);
        }

        Ok(compile_and_run(&paths, self.config.clone()).map_err(|err| format!("{err:#}")))
    }

    fn check(&self, outcome: std::result::Result<ReturnValue, String>) -> TestResult {
        match (&self.expected, outcome) {
            (Expected::Returns(expected), Ok(actual)) if *expected == actual => TestResult::Pass,
            (Expected::Returns(expected), Ok(actual)) => TestResult::Fail {
                reason: format!("expected {expected}, entry returned {actual}"),
            },
            (Expected::Returns(_), Err(message)) => TestResult::Fail {
                reason: format!("compilation failed: {message}"),
            },
            (Expected::CompileError { patterns }, Err(message)) => {
                match patterns.iter().find(|pattern| !message.contains(pattern.as_str())) {
                    Some(missing) => TestResult::Fail {
                        reason: format!("error `{message}` does not mention `{missing}`"),
                    },
                    None => TestResult::Pass,
                }
            }
            (Expected::CompileError { .. }, Ok(actual)) => TestResult::Fail {
                reason: format!("expected a compile error, entry returned {actual}"),
            },
        }
    }
}

fn compile_and_run(paths: &[PathBuf], config: CompilerConfig) -> Result<ReturnValue> {
    let mut compiler = Compiler::new(config);
    for path in paths {
        compiler.insert_file(path)?;
    }
    let assembly = compiler.compile()?;
    Ok(assembly.entry()?.call()?)
}
