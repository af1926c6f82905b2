//! Include scanning and library selection over installed library folders.

use super::{index_of, names, record, resolver_for};
use anyhow::Result;
use libresolve_cli::library::{LibraryIndex, LibraryRecord, LoadOptions, PropertiesFileLoader};
use libresolve_cli::scanner::PreferenceSet;
use libresolve_cli::test_utils::LibraryFixture;
use libresolve_cli::version::DependencySpec;
use std::sync::Arc;
use tempfile::TempDir;

fn installed(name: &str, version: &str) -> LibraryFixture {
    LibraryFixture {
        dir_name: format!("{name}-{version}"),
        ..LibraryFixture::new(name)
    }
    .version(version)
}

#[test]
fn test_includes_resolve_to_providing_libraries() -> Result<()> {
    let temp = TempDir::new()?;
    LibraryFixture::new("Wire").header("Wire.h").source("Wire.cpp", &["Wire.h"]).write(temp.path())?;
    LibraryFixture::new("Servo")
        .header("Servo.h")
        .source("Servo.cpp", &["Servo.h", "Wire.h"])
        .write(temp.path())?;
    LibraryFixture::new("App").source("App.cpp", &["Servo.h", "stdio.h", "Wire.h"]).write(temp.path())?;

    let index = index_of(temp.path())?;
    let resolver = resolver_for(&index)?;

    let direct = resolver.direct_dependencies(record(&index, "org.test.app"))?;
    assert_eq!(names(&direct), ["org.test.servo", "org.test.wire"]);
    assert_eq!(direct[0].spec().to_string(), "org.test.servo");

    assert_eq!(names(&resolver.direct_dependencies(record(&index, "org.test.servo"))?), ["org.test.wire"]);
    assert!(resolver.direct_dependencies(record(&index, "org.test.wire"))?.is_empty());
    Ok(())
}

#[test]
fn test_closure_lists_direct_dependencies_before_descending() -> Result<()> {
    let temp = TempDir::new()?;
    LibraryFixture::new("A").source("A.cpp", &["B.h", "C.h"]).write(temp.path())?;
    LibraryFixture::new("B").header("B.h").source("B.cpp", &["D.h"]).write(temp.path())?;
    LibraryFixture::new("C").header("C.h").write(temp.path())?;
    LibraryFixture::new("D").header("D.h").write(temp.path())?;

    let index = index_of(temp.path())?;
    let resolver = resolver_for(&index)?;

    let closure = resolver.transitive_dependencies(record(&index, "org.test.a"))?;
    assert_eq!(names(&closure), ["org.test.b", "org.test.c", "org.test.d"]);
    Ok(())
}

#[test]
fn test_include_cycle_terminates() -> Result<()> {
    let temp = TempDir::new()?;
    LibraryFixture::new("A").header("A.h").source("A.cpp", &["B.h"]).write(temp.path())?;
    LibraryFixture::new("B").header("B.h").source("B.cpp", &["C.h"]).write(temp.path())?;
    LibraryFixture::new("C").header("C.h").source("C.cpp", &["A.h"]).write(temp.path())?;

    let index = index_of(temp.path())?;
    let resolver = resolver_for(&index)?;

    assert_eq!(names(&resolver.transitive_dependencies(record(&index, "org.test.a"))?), ["org.test.b", "org.test.c"]);
    assert_eq!(names(&resolver.transitive_dependencies(record(&index, "org.test.b"))?), ["org.test.c", "org.test.a"]);
    assert_eq!(names(&resolver.transitive_dependencies(record(&index, "org.test.c"))?), ["org.test.a", "org.test.b"]);
    Ok(())
}

#[test]
fn test_highest_version_provides_header() -> Result<()> {
    let temp = TempDir::new()?;
    for version in ["1.5", "2.5", "1.10"] {
        installed("Servo", version).header("Servo.h").write(temp.path())?;
    }
    LibraryFixture::new("App").source("App.ino", &["Servo.h"]).write(temp.path())?;

    let index = index_of(temp.path())?;
    assert_eq!(index.providers_of("Servo.h").len(), 3);

    let resolver = resolver_for(&index)?;
    let direct = resolver.direct_dependencies(record(&index, "org.test.app"))?;
    assert_eq!(direct.len(), 1);
    assert_eq!(direct[0].library().version(), Some("2.5"));
    Ok(())
}

#[test]
fn test_declared_depends_honor_constraint() -> Result<()> {
    let temp = TempDir::new()?;
    for version in ["1.5", "2.5", "1.10"] {
        installed("Servo", version).header("Servo.h").write(temp.path())?;
    }
    LibraryFixture::new("App").depends(&["org.test.servo:1.0-2.0"]).write(temp.path())?;

    let index = index_of(temp.path())?;
    let resolver = resolver_for(&index)?;

    let direct = resolver.direct_dependencies(record(&index, "org.test.app"))?;
    assert_eq!(direct.len(), 1);
    assert_eq!(direct[0].library().version(), Some("1.10"));
    assert_eq!(direct[0].spec().to_string(), "org.test.servo:1.0-2.0");
    Ok(())
}

#[test]
fn test_declared_depends_win_over_included_header() -> Result<()> {
    let temp = TempDir::new()?;
    for version in ["1.5", "2.5"] {
        installed("Servo", version).header("Servo.h").write(temp.path())?;
    }
    LibraryFixture::new("App")
        .source("App.cpp", &["Servo.h"])
        .depends(&["org.test.servo:1.0-2.0"])
        .write(temp.path())?;

    let index = index_of(temp.path())?;
    let resolver = resolver_for(&index)?;

    let direct = resolver.direct_dependencies(record(&index, "org.test.app"))?;
    assert_eq!(direct.len(), 1);
    assert_eq!(direct[0].library().version(), Some("1.5"));
    assert_eq!(direct[0].spec().to_string(), "org.test.servo:1.0-2.0");
    Ok(())
}

#[test]
fn test_missing_declared_dependency_is_skipped() -> Result<()> {
    let temp = TempDir::new()?;
    LibraryFixture::new("Wire").header("Wire.h").write(temp.path())?;
    LibraryFixture::new("App")
        .depends(&["org.test.missing", "org.test.wire"])
        .write(temp.path())?;

    let index = index_of(temp.path())?;
    let resolver = resolver_for(&index)?;

    assert_eq!(names(&resolver.direct_dependencies(record(&index, "org.test.app"))?), ["org.test.wire"]);
    Ok(())
}

#[test]
fn test_own_header_shadows_other_providers() -> Result<()> {
    let temp = TempDir::new()?;
    LibraryFixture::new("Alpha").version("2.0").header("Display.h").write(temp.path())?;
    LibraryFixture::new("Beta")
        .version("1.0")
        .header("Display.h")
        .source("Beta.cpp", &["Display.h"])
        .write(temp.path())?;
    LibraryFixture::new("Gamma").source("Gamma.cpp", &["Display.h"]).write(temp.path())?;

    let index = index_of(temp.path())?;
    let resolver = resolver_for(&index)?;

    assert!(resolver.direct_dependencies(record(&index, "org.test.beta"))?.is_empty());
    assert_eq!(names(&resolver.direct_dependencies(record(&index, "org.test.gamma"))?), ["org.test.alpha"]);

    let beta = record(&index, "org.test.beta");
    let chosen = index.resolve(&DependencySpec::parse("org.test.beta"), &PreferenceSet::of(beta))?;
    assert_eq!(chosen.map(|r| r.name().to_string()), Some("Beta".to_string()));
    Ok(())
}

#[test]
fn test_flat_layout_scans_root_and_utility_only() -> Result<()> {
    let temp = TempDir::new()?;
    LibraryFixture::new("Wire").header("Wire.h").write(temp.path())?;
    LibraryFixture::new("Servo").header("Servo.h").write(temp.path())?;
    LibraryFixture::new("Legacy")
        .header("Legacy.h")
        .source("utility/twi.c", &["Wire.h"])
        .source("examples/Sweep/Sweep.ino", &["Servo.h"])
        .write(temp.path())?;

    let index = index_of(temp.path())?;
    let resolver = resolver_for(&index)?;

    assert_eq!(names(&resolver.direct_dependencies(record(&index, "org.test.legacy"))?), ["org.test.wire"]);
    Ok(())
}

#[test]
fn test_recursive_layout_scans_nested_sources() -> Result<()> {
    let temp = TempDir::new()?;
    LibraryFixture::new("Wire").header("Wire.h").write(temp.path())?;
    LibraryFixture::new("Servo").header("Servo.h").write(temp.path())?;
    LibraryFixture::new("Modern")
        .header("src/Modern.h")
        .header("src/impl/Inner.h")
        .source("src/impl/deep/bus.cpp", &["Wire.h"])
        .source("src/.cache/stale.cpp", &["Servo.h"])
        .write(temp.path())?;
    LibraryFixture::new("User").source("User.cpp", &["Modern.h", "Inner.h"]).write(temp.path())?;

    let index = index_of(temp.path())?;
    let resolver = resolver_for(&index)?;

    assert_eq!(names(&resolver.direct_dependencies(record(&index, "org.test.modern"))?), ["org.test.wire"]);
    assert_eq!(names(&resolver.direct_dependencies(record(&index, "org.test.user"))?), ["org.test.modern"]);
    assert!(index.providers_of("Inner.h").is_empty());
    Ok(())
}

#[test]
fn test_index_skips_folders_that_are_not_libraries() -> Result<()> {
    let temp = TempDir::new()?;
    LibraryFixture::new("Wire").header("Wire.h").write(temp.path())?;
    LibraryFixture::new("Broken").without("version").write(temp.path())?;
    std::fs::create_dir(temp.path().join("NotALibrary"))?;
    std::fs::write(temp.path().join("README.txt"), "libraries go here")?;

    let index = index_of(temp.path())?;
    assert_eq!(index.len(), 1);
    assert!(index.find("org.test.wire").is_some());
    assert!(index.find("org.test.broken").is_none());
    Ok(())
}

#[test]
fn test_library_outside_index_resolves_against_it() -> Result<()> {
    let installed_dir = TempDir::new()?;
    let sketch_dir = TempDir::new()?;
    LibraryFixture::new("Wire").header("Wire.h").write(installed_dir.path())?;
    let root = LibraryFixture::new("Local")
        .source("Local.cpp", &["Wire.h"])
        .write(sketch_dir.path())?;

    let index = LibraryIndex::load(
        &[installed_dir.path().to_path_buf()],
        &PropertiesFileLoader,
        LoadOptions::default(),
    )?;
    let local = LibraryRecord::load(&root, &PropertiesFileLoader)?;
    let (index, local) = index.including(local);
    assert_eq!(index.len(), 2);

    let index = Arc::new(index);
    let resolver = resolver_for(&index)?;
    assert_eq!(names(&resolver.direct_dependencies(&local)?), ["org.test.wire"]);
    Ok(())
}
