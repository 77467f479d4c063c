//! Runs the lint over a source tree written to disk.

use std::fs;
use std::path::{Path, PathBuf};

use architecture_lint::{ArchitectureLintError, Violation};
use rstest::{fixture, rstest};
use tempfile::TempDir;

const DOMAIN_RIDE: (&str, &str) = (
    "domain/ride.rs",
    "pub struct RideId(i64); impl RideId { pub fn new(v: i64) -> Self { Self(v) } }",
);
const INBOUND_RIDES: (&str, &str) = (
    "inbound/http/rides.rs",
    "use crate::domain::ride::RideId; fn handler() { let _id = RideId::new(1); }",
);
const OUTBOUND_MEMORY: (&str, &str) = (
    "outbound/memory/in_memory_ride_repository.rs",
    "use crate::domain::ride::RideId; pub struct Store; impl Store { pub fn get(&self, _id: RideId) {} }",
);

struct Backend {
    _root: TempDir,
    dir: PathBuf,
}

impl Backend {
    fn write(&self, file: &str, contents: &str) {
        let path = self.dir.join("src").join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directories");
        }
        fs::write(path, contents).expect("write source file");
    }

    fn lint(&self) -> Result<(), ArchitectureLintError> {
        architecture_lint::lint_backend_sources(&self.dir)
    }
}

#[fixture]
fn backend() -> Backend {
    let root = TempDir::new().expect("tempdir");
    let dir = root.path().join("backend");
    let backend = Backend { _root: root, dir };
    for (file, contents) in [DOMAIN_RIDE, INBOUND_RIDES, OUTBOUND_MEMORY] {
        backend.write(file, contents);
    }
    backend
}

fn violations(outcome: Result<(), ArchitectureLintError>) -> Vec<Violation> {
    match outcome {
        Err(ArchitectureLintError::Violations(violations)) => violations,
        other => panic!("expected violations, got: {other:?}"),
    }
}

fn reported(violations: &[Violation], file: &str, fragment: &str) -> bool {
    violations
        .iter()
        .any(|violation| violation.file == Path::new(file) && violation.message.contains(fragment))
}

#[rstest]
fn clean_tree_passes(backend: Backend) {
    let outcome = backend.lint();
    assert!(outcome.is_ok(), "expected success, got: {outcome:?}");
}

#[rstest]
fn files_outside_layers_are_ignored(backend: Backend) {
    backend.write(
        "main.rs",
        "use ride_service::outbound::memory::InMemoryRideRepository; fn main() {}",
    );
    assert!(backend.lint().is_ok());
}

#[rstest]
fn every_violation_is_reported(backend: Backend) {
    backend.write(
        "inbound/http/leaky.rs",
        "use ride_service::outbound::persistence::DieselRideRepository; fn f() {}",
    );
    backend.write(
        "domain/leaky.rs",
        "use actix_web::HttpResponse; fn f() { let _ = HttpResponse::Ok(); }",
    );
    backend.write(
        "outbound/persistence/leaky.rs",
        "use crate::inbound::http::auth::JwtVerifier; fn f() {}",
    );

    let violations = violations(backend.lint());

    assert_eq!(violations.len(), 3, "violations: {violations:?}");
    assert!(reported(&violations, "inbound/http/leaky.rs", "crate::outbound"));
    assert!(reported(&violations, "domain/leaky.rs", "external crate `actix_web`"));
    assert!(reported(&violations, "outbound/persistence/leaky.rs", "crate::inbound"));
}

#[rstest]
fn unparsable_sources_fail_the_run(backend: Backend) {
    backend.write("domain/broken.rs", "pub struct {");
    assert!(matches!(
        backend.lint(),
        Err(ArchitectureLintError::Parse { .. })
    ));
}
