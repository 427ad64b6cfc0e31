//! Wheel placement and the install driver.
//!
//! Three steps, each a plain function:
//!
//! 1. [`resolve_root_scheme`] reads `WHEEL` and decides where the archive
//!    root goes (`purelib` or `platlib`).
//! 2. [`classify`] maps each archive path to a scheme and a path relative to
//!    that scheme, following the `{distribution}-{version}.data/{scheme}/`
//!    convention.
//! 3. [`install`] drives a source and a destination through one linear pass
//!    and ends with a single RECORD write.

use serde::Serialize;
use tracing::{debug, info};
use wheelhouse_schema::{
    ENTRY_POINTS_FILENAME, MetadataRecord, RECORD_FILENAME, RecordEntry, Scheme, WHEEL_FILENAME,
    parse_entry_points_bytes,
};

use crate::destination::WheelDestination;
use crate::source::{WheelContent, WheelSource};
use crate::{Error, Result};

/// A written file and the scheme it was written to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallRecord {
    /// Scheme the entry's path is relative to.
    pub scheme: Scheme,
    /// What the destination reported for the file.
    pub entry: RecordEntry,
}

impl InstallRecord {
    /// Pair a scheme with a RECORD entry.
    pub fn new(scheme: Scheme, entry: RecordEntry) -> Self {
        Self { scheme, entry }
    }
}

/// Decide the root scheme from the source's `WHEEL` file.
///
/// `Root-Is-Purelib: true` selects `purelib`; any other value, including a
/// missing key, selects `platlib`.
///
/// # Errors
///
/// Returns [`Error::IncompatibleSource`] unless `Wheel-Version` starts with
/// `1.`, and propagates read and parse errors from the source.
pub fn resolve_root_scheme<S>(source: &mut S) -> Result<Scheme>
where
    S: WheelSource + ?Sized,
{
    let bytes = source.read_dist_info(WHEEL_FILENAME)?;
    let metadata = MetadataRecord::from_bytes(&bytes)?;

    let version = metadata.get("Wheel-Version");
    if !version.is_some_and(|v| v.starts_with("1.")) {
        return Err(Error::IncompatibleSource {
            version: version.map(str::to_string),
        });
    }

    if metadata.get("Root-Is-Purelib") == Some("true") {
        Ok(Scheme::PURELIB)
    } else {
        Ok(Scheme::PLATLIB)
    }
}

/// Map an archive path to `(scheme, path within scheme)`.
///
/// Paths outside `data_dir` belong to `root_scheme` unchanged. Paths under
/// it must continue with one of `schemes` and at least one more segment;
/// that segment prefix is stripped. The remainder has no empty segments, so
/// it is always a relative file path.
///
/// # Errors
///
/// Returns [`Error::InvalidSource`] for a path under `data_dir` that names an
/// unknown scheme, stops at the scheme directory itself, or has an empty
/// segment (`scripts//x`, `scripts/x/`).
pub fn classify(
    path: &str,
    data_dir: &str,
    root_scheme: &Scheme,
    schemes: &[Scheme],
) -> Result<(Scheme, String)> {
    let segments: Vec<&str> = path.split('/').collect();
    let prefix: Vec<&str> = data_dir.trim_end_matches('/').split('/').collect();

    if !segments.starts_with(&prefix) {
        return Ok((root_scheme.clone(), path.to_string()));
    }

    let invalid = || {
        Error::invalid_source(
            data_dir,
            format!("{path} is not contained in a valid .data subdirectory"),
        )
    };

    let (scheme_name, rest) = segments[prefix.len()..]
        .split_first()
        .ok_or_else(invalid)?;
    if rest.is_empty() || rest.iter().any(|s| s.is_empty()) {
        return Err(invalid());
    }

    let scheme = schemes
        .iter()
        .find(|s| s.as_str() == *scheme_name)
        .ok_or_else(invalid)?;

    Ok((scheme.clone(), rest.join("/")))
}

/// Install `source` into `destination`.
///
/// Records are collected in installation order: entry point launchers,
/// archive files in source order, then `additional_metadata` (written into
/// the `.dist-info` directory in the order given), and finally RECORD
/// itself with no hash or size. The whole list goes to
/// [`WheelDestination::finalize_installation`] in one call.
///
/// The archive's own RECORD is never copied; the destination writes a new
/// one on finalize.
///
/// # Errors
///
/// Fails fast on the first error from resolution, classification, the
/// source or the destination. Files already written are left in place.
pub fn install<S, D>(
    source: &mut S,
    destination: &mut D,
    additional_metadata: &[(String, Vec<u8>)],
) -> Result<()>
where
    S: WheelSource + ?Sized,
    D: WheelDestination + ?Sized,
{
    let root_scheme = resolve_root_scheme(source)?;
    let dist_info_dir = source.dist_info_dir().to_string();
    let data_dir = source.data_dir().to_string();
    let record_file_path = format!("{dist_info_dir}/{RECORD_FILENAME}");
    let schemes = destination.scheme_names();

    info!(
        distribution = source.distribution(),
        version = source.version(),
        root_scheme = %root_scheme,
        "Installing wheel"
    );

    let mut records: Vec<InstallRecord> = Vec::new();

    if source
        .dist_info_filenames()
        .iter()
        .any(|name| name == ENTRY_POINTS_FILENAME)
    {
        let text = source.read_dist_info(ENTRY_POINTS_FILENAME)?;
        for entry_point in parse_entry_points_bytes(&text)? {
            debug!(
                name = %entry_point.name,
                section = %entry_point.section,
                "Writing launcher"
            );
            let entry = destination.write_script(&entry_point)?;
            records.push(InstallRecord::new(Scheme::SCRIPTS, entry));
        }
    }

    source.visit_contents(&mut |content: WheelContent<'_>| {
        if content.record.path == record_file_path {
            return Ok(());
        }

        let (scheme, path) = classify(&content.record.path, &data_dir, &root_scheme, &schemes)?;
        debug!(source = %content.record.path, scheme = %scheme, path = %path, "Writing file");

        let entry = destination.write_file(&scheme, &path, content.reader, content.is_executable)?;
        records.push(InstallRecord::new(scheme, entry));
        Ok(())
    })?;

    for (filename, contents) in additional_metadata {
        let path = format!("{dist_info_dir}/{filename}");
        let entry = destination.write_file(&root_scheme, &path, &mut contents.as_slice(), false)?;
        records.push(InstallRecord::new(root_scheme.clone(), entry));
    }

    records.push(InstallRecord::new(
        root_scheme.clone(),
        RecordEntry::new(record_file_path.clone(), None, None),
    ));

    info!(files = records.len(), "Finalizing installation");
    destination.finalize_installation(&root_scheme, &record_file_path, records)
}
