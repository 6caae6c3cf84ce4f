//! Repo-local architectural lint for the clinic backend's layer boundaries.
//!
//! The backend keeps its rules in `domain` (plus ports), its command-line
//! surface in `inbound`, and storage in `outbound`. This crate parses every
//! source file under those directories and reports:
//!
//! - `domain` code reaching into `inbound`, `outbound` or `settings`, or
//!   naming a CLI, configuration or filesystem crate
//! - `inbound` adapters importing `outbound` modules or filesystem crates
//! - `outbound` adapters importing `inbound`, `settings` or CLI crates
//!
//! Run it with `cargo run -p architecture-lint` from the workspace root.

use std::collections::BTreeSet;
use std::fmt;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use syn::visit::Visit;
use thiserror::Error;

const CRATE_NAME: &str = "clinic_backend";

/// A layer directory under `backend/src` and the names it may not use.
struct LayerRule {
    dir: &'static str,
    modules: &'static [&'static str],
    crates: &'static [&'static str],
}

const RULES: [LayerRule; 3] = [
    LayerRule {
        dir: "domain",
        modules: &["inbound", "outbound", "settings"],
        crates: &[
            "camino",
            "cap_std",
            "clap",
            "ortho_config",
            "tempfile",
            "tracing_subscriber",
        ],
    },
    LayerRule {
        dir: "inbound",
        modules: &["outbound"],
        crates: &["camino", "cap_std", "tempfile"],
    },
    LayerRule {
        dir: "outbound",
        modules: &["inbound", "settings"],
        crates: &["clap", "ortho_config", "tracing_subscriber"],
    },
];

/// A single boundary violation discovered by the linter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File path relative to `backend/src`.
    pub file: Utf8PathBuf,
    /// Human-readable description of the violated rule.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.message)
    }
}

/// Failure modes returned by the architecture lint.
#[derive(Debug, Error)]
pub enum ArchitectureLintError {
    /// Walking or reading the source tree failed.
    #[error("I/O error while linting architecture: {0}")]
    Io(#[from] io::Error),
    /// A file could not be attributed to a layer or parsed as Rust.
    #[error("cannot lint {file}: {message}")]
    Parse { file: Utf8PathBuf, message: String },
    /// One or more boundary violations were found.
    #[error("Architecture boundary violations:\n{}", render(.0))]
    Violations(Vec<Violation>),
}

fn render(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|violation| format!("- {violation}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A Rust source file to be linted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `backend/src`.
    pub file: Utf8PathBuf,
    pub contents: String,
}

/// Lint the backend crate sources on disk.
///
/// `backend_dir` must be the `backend/` directory at the repository root.
pub fn lint_backend_sources(backend_dir: &Utf8Path) -> Result<(), ArchitectureLintError> {
    let src_dir = Dir::open_ambient_dir(backend_dir.join("src"), ambient_authority())?;
    let mut sources = Vec::new();
    for rule in &RULES {
        let layer = match src_dir.open_dir(rule.dir) {
            Ok(layer) => layer,
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => return Err(err.into()),
        };
        read_sources(&layer, Utf8Path::new(rule.dir), &mut sources)?;
    }
    lint_sources(&sources)
}

/// Lint the provided Rust sources. Intended for unit and behaviour tests.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), ArchitectureLintError> {
    let mut violations = Vec::new();
    for source in sources {
        let rule = LayerRule::for_file(&source.file).ok_or_else(|| {
            cannot_lint(&source.file, "file is not under a domain, inbound or outbound directory")
        })?;
        let parsed =
            syn::parse_file(&source.contents).map_err(|err| cannot_lint(&source.file, err))?;
        violations.extend(rule.check(&source.file, &ReferencedPaths::of(&parsed)));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ArchitectureLintError::Violations(violations))
    }
}

fn cannot_lint(file: &Utf8Path, message: impl fmt::Display) -> ArchitectureLintError {
    ArchitectureLintError::Parse {
        file: file.to_owned(),
        message: message.to_string(),
    }
}

impl LayerRule {
    fn for_file(file: &Utf8Path) -> Option<&'static Self> {
        let first = file.components().next()?.as_str();
        RULES.iter().find(|rule| rule.dir == first)
    }

    fn check(&self, file: &Utf8Path, paths: &BTreeSet<Vec<String>>) -> Vec<Violation> {
        let mut messages = BTreeSet::new();
        for segments in paths {
            match Dependency::of(segments) {
                Some(Dependency::Module(root)) if self.modules.iter().any(|m| *m == root) => {
                    messages.insert(format!(
                        "{} module must not depend on crate::{root}",
                        self.dir
                    ));
                }
                Some(Dependency::Crate(root)) if self.crates.iter().any(|c| *c == root) => {
                    messages.insert(format!(
                        "{} module must not depend on external crate `{root}`",
                        self.dir
                    ));
                }
                _ => {}
            }
        }

        messages
            .into_iter()
            .map(|message| Violation {
                file: file.to_owned(),
                message,
            })
            .collect()
    }
}

/// What the leading segments of a referenced path point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dependency<'a> {
    /// A top-level module of the backend crate.
    Module(&'a str),
    /// Another crate.
    Crate(&'a str),
}

impl<'a> Dependency<'a> {
    fn of(segments: &'a [String]) -> Option<Self> {
        let (first, rest) = segments.split_first()?;
        match first.as_str() {
            "crate" | "self" | "super" => rest
                .iter()
                .map(String::as_str)
                .find(|segment| !matches!(*segment, "crate" | "self" | "super"))
                .map(Self::Module),
            CRATE_NAME => rest.first().map(|segment| Self::Module(segment.as_str())),
            layer if RULES.iter().any(|rule| rule.dir == layer) => Some(Self::Module(layer)),
            root => Some(Self::Crate(root)),
        }
    }
}

/// Every path a file names, with `use` trees flattened to full paths.
#[derive(Default)]
struct ReferencedPaths(BTreeSet<Vec<String>>);

impl ReferencedPaths {
    fn of(file: &syn::File) -> BTreeSet<Vec<String>> {
        let mut collected = Self::default();
        collected.visit_file(file);
        collected.0
    }

    fn flatten_use(&mut self, tree: &syn::UseTree, prefix: &mut Vec<String>) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.flatten_use(&path.tree, prefix);
                prefix.pop();
            }
            syn::UseTree::Name(syn::UseName { ident })
            | syn::UseTree::Rename(syn::UseRename { ident, .. }) => {
                self.insert_under(prefix, ident.to_string());
            }
            syn::UseTree::Glob(_) => self.insert_under(prefix, "*".to_owned()),
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.flatten_use(item, prefix);
                }
            }
        }
    }

    fn insert_under(&mut self, prefix: &[String], last: String) {
        let mut segments = prefix.to_vec();
        segments.push(last);
        self.0.insert(segments);
    }
}

impl<'ast> Visit<'ast> for ReferencedPaths {
    fn visit_path(&mut self, node: &'ast syn::Path) {
        let segments: Vec<String> = node
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        if !segments.is_empty() {
            self.0.insert(segments);
        }
        syn::visit::visit_path(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.flatten_use(&node.tree, &mut Vec::new());
    }
}

fn read_sources(
    dir: &Dir,
    relative: &Utf8Path,
    sources: &mut Vec<LintSource>,
) -> Result<(), ArchitectureLintError> {
    for entry in dir.entries()? {
        let entry = entry?;
        let name = entry
            .file_name()
            .into_string()
            .map_err(|raw| cannot_lint(relative, format!("non UTF-8 file name {raw:?}")))?;
        let path = relative.join(&name);
        if entry.file_type()?.is_dir() {
            read_sources(&entry.open_dir()?, &path, sources)?;
        } else if path.extension() == Some("rs") {
            let contents = dir.read_to_string(&name)?;
            sources.push(LintSource {
                file: path,
                contents,
            });
        }
    }
    Ok(())
}
