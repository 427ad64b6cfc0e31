//! Verify command

use anyhow::{Context, Result, bail};
use std::path::Path;
use wheelhouse_core::{Error, ValidationMode, WheelFile};

use crate::ui::Output;

/// Check `wheel`'s RECORD against its contents.
pub fn verify(wheel: &Path, mode: ValidationMode, out: Output) -> Result<()> {
    let mut file =
        WheelFile::open(wheel).with_context(|| format!("Failed to open {}", wheel.display()))?;

    match file.validate_record(mode) {
        Ok(()) => {
            out.success(&format!("{}: RECORD ok ({mode})", file.filename()));
            Ok(())
        }
        Err(Error::RecordValidation { wheel, issues }) => {
            for issue in &issues {
                out.error(issue);
            }
            bail!("{wheel}: RECORD validation failed with {} issue(s)", issues.len())
        }
        Err(err) => Err(err.into()),
    }
}
