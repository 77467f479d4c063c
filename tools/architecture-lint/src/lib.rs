//! Layer boundary lint for the ride service backend.
//!
//! Seat allocation rules live in `domain`; HTTP, token verification and
//! OpenAPI live in `inbound`; Diesel and the in-memory store live in
//! `outbound`. [`RULES`] lists what each layer may not touch and why. The
//! lint parses every non-test source under those three trees with `syn` and
//! reports each import or path that breaks a rule.
//!
//! Run it with `cargo run -p architecture-lint` from the workspace root.

use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use syn::visit::Visit;

/// Library name of the backend crate, as seen in absolute `use` paths.
const CRATE_NAME: &str = "ride_service";

/// Top-level module trees that are linted.
const LAYER_DIRS: [&str; 3] = ["domain", "inbound", "outbound"];

/// A hexagon layer under `backend/src`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Domain,
    Inbound,
    Outbound,
}

impl Layer {
    fn of(relative_path: &Path) -> Option<Self> {
        let top = relative_path.components().next()?.as_os_str().to_str()?;
        match top {
            "domain" => Some(Self::Domain),
            "inbound" => Some(Self::Inbound),
            "outbound" => Some(Self::Outbound),
            _ => None,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Domain => "domain",
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        })
    }
}

/// What a rule keeps out of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forbidden {
    /// A sibling module of this crate, e.g. `outbound`.
    Module(&'static str),
    /// An external crate root, e.g. `diesel`.
    Crate(&'static str),
    /// A call path ending in these segments, e.g. `Utc::now`.
    Call(&'static [&'static str]),
}

impl fmt::Display for Forbidden {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module(name) => write!(f, "crate::{name}"),
            Self::Crate(name) => write!(f, "external crate `{name}`"),
            Self::Call(tail) => write!(f, "`{}`", tail.join("::")),
        }
    }
}

/// One boundary rule.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub layer: Layer,
    pub forbidden: Forbidden,
    pub reason: &'static str,
}

const fn rule(layer: Layer, forbidden: Forbidden, reason: &'static str) -> Rule {
    Rule {
        layer,
        forbidden,
        reason,
    }
}

/// Boundary rules of the ride service.
pub const RULES: &[Rule] = &[
    rule(
        Layer::Domain,
        Forbidden::Module("inbound"),
        "use cases are reached through the driving ports",
    ),
    rule(
        Layer::Domain,
        Forbidden::Module("outbound"),
        "storage is reached through RideRepository",
    ),
    rule(
        Layer::Domain,
        Forbidden::Crate("actix_web"),
        "role checks and status codes belong to inbound::http",
    ),
    rule(
        Layer::Domain,
        Forbidden::Crate("jsonwebtoken"),
        "callers arrive as a verified CallerIdentity",
    ),
    rule(
        Layer::Domain,
        Forbidden::Crate("utoipa"),
        "OpenAPI wrappers live in inbound::http::schemas",
    ),
    rule(
        Layer::Domain,
        Forbidden::Crate("diesel"),
        "rows are mapped in outbound::persistence",
    ),
    rule(
        Layer::Domain,
        Forbidden::Crate("diesel_async"),
        "rows are mapped in outbound::persistence",
    ),
    rule(
        Layer::Domain,
        Forbidden::Call(&["Utc", "now"]),
        "services read time from mockable::Clock",
    ),
    rule(
        Layer::Domain,
        Forbidden::Call(&["SystemTime", "now"]),
        "services read time from mockable::Clock",
    ),
    rule(
        Layer::Inbound,
        Forbidden::Module("outbound"),
        "handlers see RideCommand and RideQuery only",
    ),
    rule(
        Layer::Inbound,
        Forbidden::Crate("diesel"),
        "handlers never query the database",
    ),
    rule(
        Layer::Inbound,
        Forbidden::Crate("diesel_async"),
        "handlers never query the database",
    ),
    rule(
        Layer::Outbound,
        Forbidden::Module("inbound"),
        "adapters implement domain ports only",
    ),
    rule(
        Layer::Outbound,
        Forbidden::Crate("actix_web"),
        "adapters know nothing about HTTP",
    ),
    rule(
        Layer::Outbound,
        Forbidden::Crate("jsonwebtoken"),
        "adapters know nothing about callers",
    ),
];

/// A rule broken by one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File path relative to `backend/src`.
    pub file: PathBuf,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}

/// Failure modes returned by the architecture lint.
#[derive(Debug, thiserror::Error)]
pub enum ArchitectureLintError {
    /// Walking or reading the source tree failed.
    #[error("I/O error while linting architecture: {0}")]
    Io(#[from] io::Error),
    /// A file could not be parsed or placed in a layer.
    #[error("cannot lint {}: {message}", .file.display())]
    Parse { file: PathBuf, message: String },
    /// One or more rules were broken.
    #[error("{}", render(.0))]
    Violations(Vec<Violation>),
}

fn render(violations: &[Violation]) -> String {
    violations.iter().fold(
        String::from("Architecture boundary violations:"),
        |mut out, violation| {
            out.push_str("\n- ");
            out.push_str(&violation.to_string());
            out
        },
    )
}

/// A Rust source file to be linted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `backend/src`.
    pub file: PathBuf,
    pub contents: String,
}

/// Lint the sources under `backend_dir/src`.
pub fn lint_backend_sources(backend_dir: &Path) -> Result<(), ArchitectureLintError> {
    lint_sources(&read_layer_sources(&backend_dir.join("src"))?)
}

/// Lint in-memory sources whose paths are relative to `backend/src`.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), ArchitectureLintError> {
    let mut violations = Vec::new();
    for source in sources {
        violations.extend(lint_one(source)?);
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ArchitectureLintError::Violations(violations))
    }
}

fn lint_one(source: &LintSource) -> Result<Vec<Violation>, ArchitectureLintError> {
    let parse_error = |message: String| ArchitectureLintError::Parse {
        file: source.file.clone(),
        message,
    };
    let layer = Layer::of(&source.file)
        .ok_or_else(|| parse_error("not under domain/, inbound/ or outbound/".to_owned()))?;
    if is_test_file(&source.file) {
        return Ok(Vec::new());
    }
    let parsed = syn::parse_file(&source.contents).map_err(|err| parse_error(err.to_string()))?;

    let mut refs = References::default();
    refs.visit_file(&parsed);

    let messages: BTreeSet<String> = RULES
        .iter()
        .filter(|rule| rule.layer == layer && refs.breaks(rule.forbidden))
        .map(|rule| {
            format!(
                "{layer} module must not depend on {}: {}",
                rule.forbidden, rule.reason
            )
        })
        .collect();

    Ok(messages
        .into_iter()
        .map(|message| Violation {
            file: source.file.clone(),
            message,
        })
        .collect())
}

/// `*_tests.rs` siblings and `tests.rs` modules only compile under `cfg(test)`.
fn is_test_file(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem == "tests" || stem.ends_with("_tests"))
}

/// Every path mentioned outside `#[cfg(test)]` items.
#[derive(Default)]
struct References {
    paths: BTreeSet<Vec<String>>,
}

impl References {
    fn breaks(&self, forbidden: Forbidden) -> bool {
        self.paths.iter().any(|path| match forbidden {
            Forbidden::Module(name) => module_root(path) == Some(name),
            Forbidden::Crate(name) => crate_root(path) == Some(name),
            Forbidden::Call(tail) => {
                path.len() >= tail.len()
                    && path.iter().rev().zip(tail.iter().rev()).all(|(seen, want)| seen == want)
            }
        })
    }

    fn add_use_tree(&mut self, tree: &syn::UseTree, prefix: &[String]) {
        let extended = |ident: &syn::Ident| {
            let mut path = prefix.to_vec();
            path.push(ident.to_string());
            path
        };
        match tree {
            syn::UseTree::Path(node) => self.add_use_tree(&node.tree, &extended(&node.ident)),
            syn::UseTree::Name(node) => {
                self.paths.insert(extended(&node.ident));
            }
            syn::UseTree::Rename(node) => {
                self.paths.insert(extended(&node.ident));
            }
            syn::UseTree::Glob(_) => {
                self.paths.insert(prefix.to_vec());
            }
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.add_use_tree(item, prefix);
                }
            }
        }
    }
}

fn is_cfg_test(attrs: &[syn::Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("cfg")
            && attr
                .parse_args::<syn::Ident>()
                .is_ok_and(|ident| ident == "test")
    })
}

impl<'ast> Visit<'ast> for References {
    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        if !is_cfg_test(&node.attrs) {
            syn::visit::visit_item_mod(self, node);
        }
    }

    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        if !is_cfg_test(&node.attrs) {
            syn::visit::visit_item_fn(self, node);
        }
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        if !is_cfg_test(&node.attrs) {
            self.add_use_tree(&node.tree, &[]);
        }
    }

    fn visit_path(&mut self, node: &'ast syn::Path) {
        let path: Vec<String> = node
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        if !path.is_empty() {
            self.paths.insert(path);
        }
        syn::visit::visit_path(self, node);
    }
}

fn is_relative(segment: &str) -> bool {
    matches!(segment, "crate" | "self" | "super")
}

/// The crate module a path points into, if it is crate-internal.
fn module_root(path: &[String]) -> Option<&str> {
    let first = path.first()?.as_str();
    if LAYER_DIRS.contains(&first) {
        return Some(first);
    }
    if first == CRATE_NAME {
        return path.get(1).map(String::as_str);
    }
    if is_relative(first) {
        return path
            .iter()
            .map(String::as_str)
            .find(|segment| !is_relative(segment));
    }
    None
}

/// The external crate a path starts with, if any.
fn crate_root(path: &[String]) -> Option<&str> {
    let first = path.first()?.as_str();
    (!is_relative(first) && first != CRATE_NAME).then_some(first)
}

fn read_layer_sources(src_dir: &Path) -> Result<Vec<LintSource>, ArchitectureLintError> {
    let mut pending: Vec<PathBuf> = LAYER_DIRS
        .iter()
        .map(|dir| src_dir.join(dir))
        .filter(|dir| dir.is_dir())
        .collect();
    let mut sources = Vec::new();

    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                let file = path
                    .strip_prefix(src_dir)
                    .map_err(|err| ArchitectureLintError::Parse {
                        file: path.clone(),
                        message: err.to_string(),
                    })?
                    .to_path_buf();
                let contents = std::fs::read_to_string(&path)?;
                sources.push(LintSource { file, contents });
            }
        }
    }
    sources.sort_by(|left, right| left.file.cmp(&right.file));
    Ok(sources)
}
