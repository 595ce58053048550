// tests/ingest_rpm.rs

//! Integration tests for the RPM pool/symlink pipeline

mod common;

use common::{Fixture, NoopSleeper, RecordingRunner, count, failure, output};
use repomgr::db::models::{BinaryKey, BinaryPackage, Component, Distribution, SourcePackage, Vendor};
use repomgr::process::CommandOutput;
use repomgr::{IngestOptions, Ingestor};
use std::cell::Cell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

fn is_checksig(argv: &[String]) -> bool {
    argv.iter().any(|a| a == "--checksig")
}

fn link_target(link: &Path) -> std::path::PathBuf {
    fs::read_link(link).unwrap()
}

#[test]
fn test_remove_on_update_replaces_previous_version() {
    let fixture = Fixture::new();
    let dist = fixture.add_dist("el9", Vendor::RedHat, &["extra-x86_64"]);
    let package = fixture.add_package("foo", false, false, true);
    let extra = Component::find_by_name(&fixture.conn, "extra-x86_64")
        .unwrap()
        .unwrap();

    // Version 1.0-1 is currently published
    let key = BinaryKey {
        package_id: package.id.unwrap(),
        name: "foo",
        distribution_id: dist.id.unwrap(),
        arch: "x86_64",
    };
    BinaryPackage::record(&fixture.conn, key, "1.0-1", std::slice::from_ref(&extra)).unwrap();

    let pool = fixture.rpm_base.join("rpms");
    let component_dir = fixture.rpm_base.join("extra-x86_64");
    fs::create_dir_all(&pool).unwrap();
    fs::create_dir_all(&component_dir).unwrap();
    let old_pooled = pool.join("foo-1.0-1.el9.x86_64.rpm");
    let old_link = component_dir.join("foo-1.0-1.el9.x86_64.rpm");
    fs::write(&old_pooled, b"old").unwrap();
    std::os::unix::fs::symlink(&old_pooled, &old_link).unwrap();

    let upload = fixture.incoming.join("foo-2.0-1.el9.x86_64.rpm");
    fs::write(&upload, b"new").unwrap();

    // The old publication must already be gone when the new file is checked
    let swept = Rc::new(Cell::new(false));
    let runner = {
        let swept = Rc::clone(&swept);
        let old_link = old_link.clone();
        RecordingRunner::responding(move |argv| {
            if is_checksig(argv) {
                swept.set(fs::symlink_metadata(&old_link).is_err());
            }
            CommandOutput::skipped()
        })
    };

    let config = fixture.config(IngestOptions::default());
    let sleeper = NoopSleeper::default();
    let report = Ingestor::new(&fixture.conn, &config, &runner, &sleeper)
        .run()
        .unwrap();

    assert_eq!(report.rpms_published, vec![upload.clone()]);
    assert!(swept.get());

    assert!(fs::symlink_metadata(&old_link).is_err());
    assert!(!old_pooled.exists());

    let new_pooled = pool.join("foo-2.0-1.el9.x86_64.rpm");
    let new_link = component_dir.join("foo-2.0-1.el9.x86_64.rpm");
    assert_eq!(fs::read(&new_pooled).unwrap(), b"new");
    assert_eq!(link_target(&new_link), new_pooled);
    assert!(!upload.exists());

    let rows = BinaryPackage::list_for_package(&fixture.conn, package.id.unwrap()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].version, "2.0-1");
    assert_eq!(rows[0].components(&fixture.conn).unwrap()[0].name, "extra-x86_64");

    let calls = runner.calls();
    assert_eq!(
        calls[0],
        vec!["rpm", "--quiet", "--checksig", upload.to_str().unwrap()]
    );
    assert_eq!(
        calls.last().unwrap(),
        &vec![
            "createrepo",
            "-d",
            "--basedir",
            component_dir.to_str().unwrap(),
            "--update",
            ".",
        ]
    );
}

#[test]
fn test_bad_signature_is_not_published() {
    let fixture = Fixture::new();
    fixture.add_dist("el9", Vendor::RedHat, &["extra-x86_64"]);
    let upload = fixture.incoming.join("foo-2.0-1.el9.x86_64.rpm");
    fs::write(&upload, b"tampered").unwrap();

    let config = fixture.config(IngestOptions::default());
    let runner = RecordingRunner::failing(is_checksig);
    let sleeper = NoopSleeper::default();
    let report = Ingestor::new(&fixture.conn, &config, &runner, &sleeper)
        .run()
        .unwrap();

    assert_eq!(report.failed, vec![upload.clone()]);
    assert!(upload.exists());
    assert!(!fixture.rpm_base.join("rpms/foo-2.0-1.el9.x86_64.rpm").exists());
    assert_eq!(common::count(&fixture.conn, "binary_packages"), 0);
}

#[test]
fn test_arch_suffix_selects_components() {
    let fixture = Fixture::new();
    fixture.add_dist(
        "el9",
        Vendor::RedHat,
        &["extra-x86_64", "extra-aarch64", "testing"],
    );
    fs::write(fixture.incoming.join("foo-1.0-1.el9.x86_64.rpm"), b"x").unwrap();
    fs::write(fixture.incoming.join("bar-1.0-1.el9.noarch.rpm"), b"n").unwrap();
    fs::write(fixture.incoming.join("bar-1.0-1.el9.src.rpm"), b"s").unwrap();

    let config = fixture.config(IngestOptions::default());
    let runner = RecordingRunner::new();
    let sleeper = NoopSleeper::default();
    let report = Ingestor::new(&fixture.conn, &config, &runner, &sleeper)
        .run()
        .unwrap();
    assert_eq!(report.rpms_published.len(), 3);

    let linked = |component: &str, file: &str| {
        fs::symlink_metadata(fixture.rpm_base.join(component).join(file)).is_ok()
    };

    assert!(linked("extra-x86_64", "foo-1.0-1.el9.x86_64.rpm"));
    assert!(!linked("extra-aarch64", "foo-1.0-1.el9.x86_64.rpm"));
    assert!(!linked("testing", "foo-1.0-1.el9.x86_64.rpm"));

    for component in ["extra-x86_64", "extra-aarch64", "testing"] {
        assert!(linked(component, "bar-1.0-1.el9.noarch.rpm"));
        assert!(linked(component, "bar-1.0-1.el9.src.rpm"));
    }

    // Source RPMs land in source_packages under the full version
    let bar = SourcePackage::find_by_package_name(&fixture.conn, "bar").unwrap();
    assert_eq!(bar.len(), 1);
    assert_eq!(bar[0].version, "1.0-1");
    assert_eq!(bar[0].components(&fixture.conn).unwrap().len(), 3);

    // createrepo once per component
    assert_eq!(runner.calls_with("createrepo").len(), 3);
}

#[test]
fn test_all_distributions_fans_out_within_vendor() {
    let fixture = Fixture::new();
    fixture.add_dist("el8", Vendor::RedHat, &["updates8-x86_64"]);
    fixture.add_dist("el9", Vendor::RedHat, &["updates9-x86_64"]);
    fixture.add_dist("fc40", Vendor::Fedora, &["fedora-x86_64"]);
    fixture.add_package("foo", false, true, false);

    let upload = fixture.incoming.join("foo-2.0-1.el9.x86_64.rpm");
    fs::write(&upload, b"rpm").unwrap();

    let config = fixture.config(IngestOptions::default());
    let runner = RecordingRunner::new();
    let sleeper = NoopSleeper::default();
    let report = Ingestor::new(&fixture.conn, &config, &runner, &sleeper)
        .run()
        .unwrap();
    assert_eq!(report.rpms_published, vec![upload]);

    // One pool file, linked under each distribution's own name
    let pooled = fixture.rpm_base.join("rpms/foo-2.0-1.el9.x86_64.rpm");
    for (component, file) in [
        ("updates8-x86_64", "foo-2.0-1.el8.x86_64.rpm"),
        ("updates9-x86_64", "foo-2.0-1.el9.x86_64.rpm"),
    ] {
        assert_eq!(link_target(&fixture.rpm_base.join(component).join(file)), pooled);
    }
    assert!(
        fs::symlink_metadata(fixture.rpm_base.join("updates8-x86_64/foo-2.0-1.el9.x86_64.rpm"))
            .is_err()
    );
    assert!(
        fs::symlink_metadata(fixture.rpm_base.join("fedora-x86_64/foo-2.0-1.el9.x86_64.rpm"))
            .is_err()
    );

    let mut dists: Vec<String> = BinaryPackage::find_by_name(&fixture.conn, "foo")
        .unwrap()
        .iter()
        .map(|b| {
            Distribution::find_by_id(&fixture.conn, b.distribution_id)
                .unwrap()
                .unwrap()
                .name
        })
        .collect();
    dists.sort();
    assert_eq!(dists, vec!["el8", "el9"]);
}

fn run(fixture: &Fixture) -> repomgr::IngestReport {
    let config = fixture.config(IngestOptions::default());
    let runner = RecordingRunner::new();
    let sleeper = NoopSleeper::default();
    Ingestor::new(&fixture.conn, &config, &runner, &sleeper)
        .run()
        .unwrap()
}

#[test]
fn test_remove_on_update_sweeps_every_distribution() {
    let fixture = Fixture::new();
    fixture.add_dist("el8", Vendor::RedHat, &["updates8-x86_64"]);
    fixture.add_dist("el9", Vendor::RedHat, &["updates9-x86_64"]);
    let package = fixture.add_package("foo", false, true, true);

    let first = fixture.incoming.join("foo-2.0-1.el9.x86_64.rpm");
    fs::write(&first, b"2.0").unwrap();
    assert_eq!(run(&fixture).rpms_published, vec![first]);

    let second = fixture.incoming.join("foo-3.0-1.el9.x86_64.rpm");
    fs::write(&second, b"3.0").unwrap();
    assert_eq!(run(&fixture).rpms_published, vec![second]);

    let listing = |dir: &str| -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(fixture.rpm_base.join(dir))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    };
    assert_eq!(listing("rpms"), vec!["foo-3.0-1.el9.x86_64.rpm"]);
    assert_eq!(listing("updates8-x86_64"), vec!["foo-3.0-1.el8.x86_64.rpm"]);
    assert_eq!(listing("updates9-x86_64"), vec!["foo-3.0-1.el9.x86_64.rpm"]);

    let rows = BinaryPackage::list_for_package(&fixture.conn, package.id.unwrap()).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.version == "3.0-1"));
}

#[test]
fn test_distributions_sharing_a_component() {
    let fixture = Fixture::new();
    fixture.add_dist("el8", Vendor::RedHat, &["epel-x86_64"]);
    fixture.add_dist("el9", Vendor::RedHat, &["epel-x86_64"]);
    fixture.add_package("foo", false, true, false);

    let upload = fixture.incoming.join("foo-2.0-1.el9.x86_64.rpm");
    fs::write(&upload, b"rpm").unwrap();
    let report = run(&fixture);
    assert_eq!(report.rpms_published, vec![upload]);
    assert!(report.failed.is_empty());

    let pooled = fixture.rpm_base.join("rpms/foo-2.0-1.el9.x86_64.rpm");
    let epel = fixture.rpm_base.join("epel-x86_64");
    assert_eq!(link_target(&epel.join("foo-2.0-1.el8.x86_64.rpm")), pooled);
    assert_eq!(link_target(&epel.join("foo-2.0-1.el9.x86_64.rpm")), pooled);
}

#[test]
fn test_bare_rpm_for_debian_distribution_is_rejected() {
    let fixture = Fixture::new();
    fixture.add_dist("bookworm", Vendor::Debian, &["main"]);
    let upload = fixture.incoming.join("foo-1.0-1.bookworm.noarch.rpm");
    fs::write(&upload, b"rpm").unwrap();

    let report = run(&fixture);
    assert_eq!(report.failed, vec![upload.clone()]);
    assert!(report.rpms_published.is_empty());
    assert!(upload.exists());
    assert!(!fixture.rpm_base.join("rpms/foo-1.0-1.bookworm.noarch.rpm").exists());
    assert_eq!(count(&fixture.conn, "binary_packages"), 0);
    assert_eq!(count(&fixture.conn, "packages"), 0);
}

#[test]
fn test_distribution_directory_uses_rpm_query() {
    let fixture = Fixture::new();
    fixture.add_dist("el9", Vendor::RedHat, &["extra-x86_64", "extra-aarch64"]);
    let dir = fixture.incoming_dir("el9");
    let upload = dir.join("upload.rpm");
    fs::write(&upload, b"rpm").unwrap();

    let runner = RecordingRunner::responding(|argv| {
        if argv.iter().any(|a| a == "-qpi") {
            output(
                "Name        : foo\n\
                 Version     : 3.0\n\
                 Release     : 2.el9\n\
                 Architecture: noarch\n\
                 Description :\n\
                 Name: not the package\n",
            )
        } else {
            CommandOutput::skipped()
        }
    });

    let config = fixture.config(IngestOptions::default());
    let sleeper = NoopSleeper::default();
    let report = Ingestor::new(&fixture.conn, &config, &runner, &sleeper)
        .run()
        .unwrap();
    assert_eq!(report.rpms_published, vec![upload.clone()]);

    let canonical = "foo-3.0-2.el9.noarch.rpm";
    assert!(fixture.rpm_base.join("rpms").join(canonical).exists());
    for component in ["extra-aarch64", "extra-x86_64"] {
        assert!(fs::symlink_metadata(fixture.rpm_base.join(component).join(canonical)).is_ok());
    }

    let rows = BinaryPackage::find_by_name(&fixture.conn, "foo").unwrap();
    assert_eq!(rows[0].version, "3.0-2");
    assert_eq!(rows[0].arch, "noarch");
}

#[test]
fn test_failed_query_falls_back_to_file_name() {
    let fixture = Fixture::new();
    fixture.add_dist("el9", Vendor::RedHat, &["extra-x86_64"]);
    let dir = fixture.incoming_dir("el9-x86_64");
    fs::write(dir.join("foo-1.0-1.el8.x86_64.rpm"), b"rpm").unwrap();

    let runner = RecordingRunner::responding(|argv| {
        if argv.iter().any(|a| a == "-qpi") {
            failure(1, "not an rpm package")
        } else {
            CommandOutput::skipped()
        }
    });

    let config = fixture.config(IngestOptions::default());
    let sleeper = NoopSleeper::default();
    let report = Ingestor::new(&fixture.conn, &config, &runner, &sleeper)
        .run()
        .unwrap();
    assert_eq!(report.rpms_published.len(), 1);

    // The directory decides the distribution
    assert!(
        fs::symlink_metadata(fixture.rpm_base.join("extra-x86_64/foo-1.0-1.el9.x86_64.rpm"))
            .is_ok()
    );
}

#[test]
fn test_existing_link_is_a_conflict() {
    let fixture = Fixture::new();
    fixture.add_dist("el9", Vendor::RedHat, &["extra-x86_64"]);
    let component_dir = fixture.rpm_base.join("extra-x86_64");
    fs::create_dir_all(&component_dir).unwrap();
    fs::write(component_dir.join("foo-1.0-1.el9.x86_64.rpm"), b"stray").unwrap();

    let upload = fixture.incoming.join("foo-1.0-1.el9.x86_64.rpm");
    fs::write(&upload, b"rpm").unwrap();

    let config = fixture.config(IngestOptions::default());
    let runner = RecordingRunner::new();
    let sleeper = NoopSleeper::default();
    let report = Ingestor::new(&fixture.conn, &config, &runner, &sleeper)
        .run()
        .unwrap();

    assert_eq!(report.failed, vec![upload]);
    // The stray file is left alone
    assert_eq!(
        fs::read(component_dir.join("foo-1.0-1.el9.x86_64.rpm")).unwrap(),
        b"stray"
    );
}

#[test]
fn test_unknown_distribution_fails_item_only() {
    let fixture = Fixture::new();
    fixture.add_dist("el9", Vendor::RedHat, &["extra-x86_64"]);
    let stray = fixture.incoming.join("foo-1.0-1.el7.x86_64.rpm");
    let good = fixture.incoming.join("goo-1.0-1.el9.x86_64.rpm");
    fs::write(&stray, b"rpm").unwrap();
    fs::write(&good, b"rpm").unwrap();

    let config = fixture.config(IngestOptions::default());
    let runner = RecordingRunner::new();
    let sleeper = NoopSleeper::default();
    let report = Ingestor::new(&fixture.conn, &config, &runner, &sleeper)
        .run()
        .unwrap();

    assert_eq!(report.failed, vec![stray.clone()]);
    assert_eq!(report.rpms_published, vec![good]);
    assert!(stray.exists());
}
