//! Cached results follow source changes on disk.

use super::{index_of, names, record, resolver_for};
use anyhow::Result;
use libresolve_cli::test_utils::{LibraryFixture, touch};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_new_include_is_picked_up_after_edit() -> Result<()> {
    let temp = TempDir::new()?;
    LibraryFixture::new("Wire").header("Wire.h").write(temp.path())?;
    LibraryFixture::new("Servo").header("Servo.h").write(temp.path())?;
    let app = LibraryFixture::new("App").source("App.cpp", &["Wire.h"]).write(temp.path())?;

    let index = index_of(temp.path())?;
    let resolver = resolver_for(&index)?;
    let record = record(&index, "org.test.app");

    assert_eq!(names(&resolver.direct_dependencies(record)?), ["org.test.wire"]);

    let source = app.join("App.cpp");
    fs::write(&source, "#include <Wire.h>\n#include \"Servo.h\"\n")?;
    touch(&source)?;

    assert_eq!(names(&resolver.direct_dependencies(record)?), ["org.test.wire", "org.test.servo"]);
    Ok(())
}

#[test]
fn test_new_source_file_is_picked_up() -> Result<()> {
    let temp = TempDir::new()?;
    LibraryFixture::new("Wire").header("Wire.h").write(temp.path())?;
    let app = LibraryFixture::new("App").header("App.h").write(temp.path())?;

    let index = index_of(temp.path())?;
    let resolver = resolver_for(&index)?;
    let record = record(&index, "org.test.app");

    assert!(resolver.direct_dependencies(record)?.is_empty());

    fs::write(app.join("bus.cpp"), "#include <Wire.h>\n")?;
    assert_eq!(names(&resolver.direct_dependencies(record)?), ["org.test.wire"]);
    Ok(())
}

#[test]
fn test_deep_change_reaches_every_dependent() -> Result<()> {
    let temp = TempDir::new()?;
    LibraryFixture::new("A").source("A.cpp", &["B.h"]).write(temp.path())?;
    LibraryFixture::new("B").header("B.h").source("B.cpp", &["C.h"]).write(temp.path())?;
    let c = LibraryFixture::new("C").header("C.h").source("C.cpp", &[]).write(temp.path())?;
    LibraryFixture::new("D").header("D.h").write(temp.path())?;
    LibraryFixture::new("E").source("E.cpp", &["C.h"]).write(temp.path())?;

    let index = index_of(temp.path())?;
    let resolver = resolver_for(&index)?;
    let a = record(&index, "org.test.a");
    let e = record(&index, "org.test.e");

    assert_eq!(names(&resolver.transitive_dependencies(a)?), ["org.test.b", "org.test.c"]);
    assert_eq!(names(&resolver.transitive_dependencies(e)?), ["org.test.c"]);

    let source = c.join("C.cpp");
    fs::write(&source, "#include <D.h>\n")?;
    touch(&source)?;

    assert_eq!(names(&resolver.transitive_dependencies(a)?), ["org.test.b", "org.test.c", "org.test.d"]);
    assert_eq!(names(&resolver.transitive_dependencies(e)?), ["org.test.c", "org.test.d"]);
    Ok(())
}

#[test]
fn test_changed_recursively_reports_each_change_once() -> Result<()> {
    let temp = TempDir::new()?;
    LibraryFixture::new("A").source("A.cpp", &["B.h"]).write(temp.path())?;
    let b = LibraryFixture::new("B").header("B.h").write(temp.path())?;

    let index = index_of(temp.path())?;
    let resolver = resolver_for(&index)?;
    let a = record(&index, "org.test.a");

    resolver.transitive_dependencies(a)?;
    assert!(!resolver.changed_recursively(a)?);

    touch(&b.join("B.h"))?;
    assert!(resolver.changed_recursively(a)?);
    assert!(!resolver.changed_recursively(a)?);

    assert_eq!(names(&resolver.transitive_dependencies(a)?), ["org.test.b"]);
    Ok(())
}

#[test]
fn test_unrelated_change_keeps_results() -> Result<()> {
    let temp = TempDir::new()?;
    LibraryFixture::new("A").source("A.cpp", &["B.h"]).write(temp.path())?;
    LibraryFixture::new("B").header("B.h").write(temp.path())?;
    let other = LibraryFixture::new("Other").header("Other.h").write(temp.path())?;

    let index = index_of(temp.path())?;
    let resolver = resolver_for(&index)?;
    let a = record(&index, "org.test.a");

    resolver.transitive_dependencies(a)?;
    touch(&other.join("Other.h"))?;
    assert!(!resolver.changed_recursively(a)?);
    Ok(())
}
