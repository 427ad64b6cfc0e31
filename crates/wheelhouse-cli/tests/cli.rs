//! End-to-end tests for the `wheelhouse` binary.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;
use wheelhouse_schema::{HashAlgorithm, RecordHash, parse_record_file};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const WHEEL_NAME: &str = "mypkg-1.0-py3-none-any.whl";
const INTERPRETER: &str = "/usr/bin/python3";

/// Test context with a scratch directory holding a wheel and a prefix.
struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn prefix(&self) -> PathBuf {
        self.temp_dir.path().join("env")
    }

    fn site_packages(&self) -> PathBuf {
        self.prefix().join("lib/python3.12/site-packages")
    }

    fn wheelhouse(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_wheelhouse"));
        cmd.env_remove("VIRTUAL_ENV")
            .env_remove("WHEELHOUSE_PREFIX")
            .env_remove("WHEELHOUSE_DESTDIR")
            .env_remove("WHEELHOUSE_PYTHON_VERSION")
            .env_remove("WHEELHOUSE_INTERPRETER");
        cmd
    }

    fn install(&self, wheel: &Path, extra: &[&str]) -> Output {
        self.wheelhouse()
            .arg("install")
            .arg(wheel)
            .arg("--prefix")
            .arg(self.prefix())
            .args(["--python-version", "3.12", "--interpreter", INTERPRETER])
            .args(extra)
            .output()
            .expect("failed to run wheelhouse")
    }

    /// Write a wheel whose RECORD lists every file with its real hash.
    fn write_wheel(&self, files: &[(&str, &[u8], u32)]) -> PathBuf {
        let path = self.temp_dir.path().join(WHEEL_NAME);
        let mut writer = ZipWriter::new(fs::File::create(&path).unwrap());
        let mut record = String::new();

        for (name, data, mode) in files {
            let options = SimpleFileOptions::default().unix_permissions(*mode);
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
            let hash = RecordHash::compute(HashAlgorithm::Sha256, data);
            record.push_str(&format!("{name},{hash},{}\n", data.len()));
        }
        record.push_str("mypkg-1.0.dist-info/RECORD,,\n");
        writer
            .start_file("mypkg-1.0.dist-info/RECORD", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(record.as_bytes()).unwrap();
        writer.finish().unwrap();
        path
    }

    fn sample_wheel(&self) -> PathBuf {
        self.write_wheel(&[
            ("mypkg/__init__.py", b"def main():\n    print('hi')\n", 0o644),
            ("mypkg-1.0.data/scripts/helper", b"#!python\nimport mypkg\n", 0o755),
            ("mypkg-1.0.data/headers/mypkg.h", b"int x;\n", 0o644),
            (
                "mypkg-1.0.dist-info/WHEEL",
                b"Wheel-Version: 1.0\nGenerator: test\nRoot-Is-Purelib: true\nTag: py3-none-any\n",
                0o644,
            ),
            (
                "mypkg-1.0.dist-info/entry_points.txt",
                b"[console_scripts]\nmycli = mypkg:main\n",
                0o644,
            ),
        ])
    }
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx.wheelhouse().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("install"));
}

#[test]
fn test_version_command() {
    let ctx = TestContext::new();
    let output = ctx.wheelhouse().arg("--version").output().unwrap();
    assert!(output.status.success());
}

#[test]
fn test_install_places_files_and_writes_record() {
    let ctx = TestContext::new();
    let wheel = ctx.sample_wheel();

    let output = ctx.install(&wheel, &[]);
    assert!(output.status.success(), "{}", stderr(&output));

    let site = ctx.site_packages();
    assert!(site.join("mypkg/__init__.py").is_file());
    assert_eq!(
        fs::read_to_string(site.join("mypkg-1.0.dist-info/INSTALLER")).unwrap(),
        "wheelhouse\n"
    );
    assert_eq!(
        fs::read(ctx.prefix().join("include/python3.12/mypkg/mypkg.h")).unwrap(),
        b"int x;\n"
    );

    let helper = fs::read_to_string(ctx.prefix().join("bin/helper")).unwrap();
    assert_eq!(helper, format!("#!{INTERPRETER}\nimport mypkg\n"));

    let launcher = fs::read_to_string(ctx.prefix().join("bin/mycli")).unwrap();
    assert!(launcher.starts_with(&format!("#!{INTERPRETER}\n")));
    assert!(launcher.contains("from mypkg import main"));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        for script in ["bin/helper", "bin/mycli"] {
            let mode = fs::metadata(ctx.prefix().join(script))
                .unwrap()
                .permissions()
                .mode();
            assert_ne!(mode & 0o111, 0, "{script} should be executable");
        }
    }

    let record = fs::read_to_string(site.join("mypkg-1.0.dist-info/RECORD")).unwrap();
    let entries = parse_record_file(&record).unwrap();
    let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec![
        "../../../bin/mycli",
        "mypkg/__init__.py",
        "../../../bin/helper",
        "../../../include/python3.12/mypkg/mypkg.h",
        "mypkg-1.0.dist-info/WHEEL",
        "mypkg-1.0.dist-info/entry_points.txt",
        "mypkg-1.0.dist-info/INSTALLER",
        "mypkg-1.0.dist-info/RECORD",
    ]);

    // Every hashed entry matches what is on disk.
    for entry in &entries {
        if entry.hash.is_none() {
            continue;
        }
        let data = fs::read(site.join(&entry.path)).unwrap();
        assert!(entry.validate(&data), "{} does not match RECORD", entry.path);
    }
    let last = entries.last().unwrap();
    assert!(last.hash.is_none() && last.size.is_none());
}

#[test]
fn test_install_refuses_existing_files_without_overwrite() {
    let ctx = TestContext::new();
    let wheel = ctx.sample_wheel();

    assert!(ctx.install(&wheel, &[]).status.success());

    let again = ctx.install(&wheel, &[]);
    assert!(!again.status.success());
    assert!(stderr(&again).contains("already exists"));

    let forced = ctx.install(&wheel, &["--overwrite"]);
    assert!(forced.status.success(), "{}", stderr(&forced));
}

#[test]
fn test_dry_run_writes_nothing() {
    let ctx = TestContext::new();
    let wheel = ctx.sample_wheel();

    let output = ctx
        .wheelhouse()
        .arg("--dry-run")
        .arg("install")
        .arg(&wheel)
        .arg("--prefix")
        .arg(ctx.prefix())
        .args(["--python-version", "3.12", "--interpreter", INTERPRETER])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    assert!(!ctx.prefix().exists());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Would install mypkg 1.0"));
    assert!(stdout.contains("mypkg/__init__.py"));
}

#[test]
fn test_json_output() {
    let ctx = TestContext::new();
    let wheel = ctx.sample_wheel();

    let output = ctx.install(&wheel, &["--json"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["distribution"], "mypkg");
    assert_eq!(summary["root_scheme"], "purelib");
    assert_eq!(summary["dry_run"], false);
    let records = summary["records"].as_array().unwrap();
    assert_eq!(records.len(), 8);
    assert_eq!(records[0]["scheme"], "scripts");
    assert_eq!(records[0]["entry"]["path"], "mycli");
}

#[test]
fn test_destdir_stages_install() {
    let ctx = TestContext::new();
    let wheel = ctx.sample_wheel();
    let stage = ctx.temp_dir.path().join("stage");

    let output = ctx.install(&wheel, &["--destdir", stage.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr(&output));

    assert!(!ctx.prefix().exists());
    let staged_prefix = stage.join(ctx.prefix().strip_prefix("/").unwrap());
    assert!(staged_prefix
        .join("lib/python3.12/site-packages/mypkg/__init__.py")
        .is_file());
}

#[test]
fn test_custom_scheme_override() {
    let ctx = TestContext::new();
    let wheel = ctx.write_wheel(&[
        (
            "mypkg-1.0.dist-info/WHEEL",
            b"Wheel-Version: 1.0\nRoot-Is-Purelib: false\n",
            0o644,
        ),
        ("mypkg-1.0.data/man/man1/mypkg.1", b".TH MYPKG 1\n", 0o644),
    ]);
    let man = ctx.temp_dir.path().join("man");
    let scheme = format!("man={}", man.display());

    let output = ctx.install(&wheel, &["--scheme", &scheme]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(man.join("man1/mypkg.1").is_file());
}

#[test]
fn test_unknown_data_scheme_fails() {
    let ctx = TestContext::new();
    let wheel = ctx.write_wheel(&[
        (
            "mypkg-1.0.dist-info/WHEEL",
            b"Wheel-Version: 1.0\nRoot-Is-Purelib: true\n",
            0o644,
        ),
        ("mypkg-1.0.data/badscheme/x", b"x", 0o644),
    ]);

    let output = ctx.install(&wheel, &[]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("mypkg-1.0.data/badscheme/x"));
}

#[test]
fn test_incompatible_wheel_version_fails() {
    let ctx = TestContext::new();
    let wheel = ctx.write_wheel(&[
        (
            "mypkg-1.0.dist-info/WHEEL",
            b"Wheel-Version: 2.0\nRoot-Is-Purelib: true\n",
            0o644,
        ),
        ("mypkg/__init__.py", b"", 0o644),
    ]);

    let output = ctx.install(&wheel, &[]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Wheel-Version"));
    assert!(!ctx.site_packages().join("mypkg").exists());
}

#[test]
fn test_verify_command() {
    let ctx = TestContext::new();
    let wheel = ctx.sample_wheel();

    let ok = ctx.wheelhouse().arg("verify").arg(&wheel).output().unwrap();
    assert!(ok.status.success(), "{}", stderr(&ok));

    let broken = ctx.temp_dir.path().join("broken");
    fs::create_dir_all(&broken).unwrap();
    let path = broken.join(WHEEL_NAME);
    let mut writer = ZipWriter::new(fs::File::create(&path).unwrap());
    for (name, data) in [
        ("mypkg-1.0.dist-info/WHEEL", &b"Wheel-Version: 1.0\n"[..]),
        ("mypkg/__init__.py", b"x = 1\n"),
        (
            "mypkg-1.0.dist-info/RECORD",
            b"mypkg-1.0.dist-info/WHEEL,sha256=AAAA,19\nmypkg-1.0.dist-info/RECORD,,\n",
        ),
    ] {
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();

    let bad = ctx.wheelhouse().arg("verify").arg(&path).output().unwrap();
    assert!(!bad.status.success());
    let err = stderr(&bad);
    assert!(err.contains("mypkg/__init__.py is not mentioned in RECORD"));
    assert!(err.contains("didn't match RECORD"));
}
