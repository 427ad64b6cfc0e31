//! Install command

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use wheelhouse_core::schema::Scheme;
use wheelhouse_core::{
    DryRunDestination, INSTALLER_NAME, InstallRecord, SchemeDictionaryDestination, SchemeLayout,
    ValidationMode, WheelFile, WheelSource, install as install_wheel, resolve_root_scheme,
};

use crate::config::InstallTarget;
use crate::ui::Output;

/// Everything `wheelhouse install` was asked to do.
#[derive(Debug, Clone)]
pub struct InstallArgs {
    pub wheel: PathBuf,
    pub prefix: Option<PathBuf>,
    pub destdir: Option<PathBuf>,
    pub python_version: Option<String>,
    pub interpreter: Option<String>,
    pub schemes: Vec<(Scheme, PathBuf)>,
    pub validate_record: ValidationMode,
    pub overwrite: bool,
    pub json: bool,
}

/// Machine-readable result, printed with `--json`.
#[derive(Debug, Serialize)]
struct InstallSummary<'a> {
    wheel: &'a str,
    distribution: &'a str,
    version: &'a str,
    prefix: &'a Path,
    dry_run: bool,
    root_scheme: &'a Scheme,
    records: &'a [InstallRecord],
}

/// Install one wheel.
pub fn install(args: InstallArgs, dry_run: bool, out: Output) -> Result<()> {
    let mut wheel = WheelFile::open(&args.wheel)
        .with_context(|| format!("Failed to open {}", args.wheel.display()))?;
    wheel.validate_record(args.validate_record)?;

    let target = InstallTarget::resolve(args.prefix, args.interpreter, args.python_version)?;
    let root_scheme = resolve_root_scheme(&mut wheel)?;

    let mut layout =
        SchemeLayout::for_prefix(&target.prefix, &target.python_version, wheel.distribution());
    for (scheme, dir) in args.schemes {
        let dir = std::path::absolute(&dir)
            .with_context(|| format!("Invalid directory for scheme '{scheme}'"))?;
        layout = layout.with_override(scheme, dir);
    }

    let metadata = vec![(
        "INSTALLER".to_string(),
        format!("{INSTALLER_NAME}\n").into_bytes(),
    )];

    let records = if dry_run {
        let mut destination =
            DryRunDestination::new(layout.schemes().cloned(), &target.interpreter);
        install_wheel(&mut wheel, &mut destination, &metadata)?;
        destination.records().to_vec()
    } else {
        let mut destination = SchemeDictionaryDestination::new(layout, &target.interpreter)
            .overwrite_existing(args.overwrite);
        if let Some(destdir) = &args.destdir {
            destination = destination.with_destdir(destdir);
        }
        install_wheel(&mut wheel, &mut destination, &metadata)
            .with_context(|| format!("Failed to install {}", wheel.filename()))?;
        destination.records().to_vec()
    };

    if args.json {
        let summary = InstallSummary {
            wheel: wheel.filename(),
            distribution: wheel.distribution(),
            version: wheel.version(),
            prefix: &target.prefix,
            dry_run,
            root_scheme: &root_scheme,
            records: &records,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if dry_run {
        out.info(&format!(
            "Would install {} {} into {} ({} files)",
            wheel.distribution(),
            wheel.version(),
            target.prefix.display(),
            records.len()
        ));
        out.records(&records);
    } else {
        out.success(&format!(
            "Installed {} {} into {} ({} files)",
            wheel.distribution(),
            wheel.version(),
            target.prefix.display(),
            records.len()
        ));
    }
    Ok(())
}
