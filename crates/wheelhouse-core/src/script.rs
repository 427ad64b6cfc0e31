//! Launcher generation and shebang rewriting for POSIX targets.

use std::io::{self, BufRead, BufReader, Cursor, Read};

use wheelhouse_schema::EntryPoint;

use crate::{Error, Result};

/// Longest shebang line the kernel is trusted to honour, including `#!` and
/// the trailing newline.
#[cfg(target_os = "macos")]
const MAX_SHEBANG_LENGTH: usize = 512;
#[cfg(not(target_os = "macos"))]
const MAX_SHEBANG_LENGTH: usize = 127;

/// Prefix marking a script whose interpreter is filled in at install time.
const PLACEHOLDER_SHEBANG: &[u8] = b"#!python";

/// Build the first line of a script (without the newline).
///
/// Short interpreter paths without spaces are used directly. Anything else
/// goes through a `/bin/sh` trampoline that re-executes the script with the
/// quoted interpreter; the second line is a Python no-op string.
pub fn build_shebang(interpreter: &str) -> Vec<u8> {
    if !interpreter.contains(' ') && interpreter.len() + 3 <= MAX_SHEBANG_LENGTH {
        return format!("#!{interpreter}").into_bytes();
    }
    format!(
        "#!/bin/sh\n'''exec' {} \"$0\" \"$@\"\n' '''",
        shell_quote(interpreter)
    )
    .into_bytes()
}

/// Quote `s` for a POSIX shell.
///
/// Strings made only of safe characters pass through; everything else is
/// single-quoted with embedded quotes spliced as `'"'"'`.
pub fn shell_quote(s: &str) -> String {
    if s.is_empty() {
        return "''".to_string();
    }
    let safe = s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c));
    if safe {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', "'\"'\"'"))
}

/// Render the launcher for `entry_point`.
///
/// # Errors
///
/// Returns [`Error::InvalidScript`] if the entry point has no attribute or
/// its name cannot be used as a file name.
pub fn generate_script(entry_point: &EntryPoint, interpreter: &str) -> Result<Vec<u8>> {
    let invalid = |reason: &str| Error::InvalidScript {
        name: entry_point.name.clone(),
        reason: reason.to_string(),
    };

    if entry_point.name.is_empty() || entry_point.name.contains(['/', '\\']) {
        return Err(invalid("name must be a plain file name"));
    }
    let attribute = entry_point
        .attribute
        .as_deref()
        .ok_or_else(|| invalid("entry point has no callable attribute"))?;
    let import_name = attribute.split('.').next().unwrap_or(attribute);

    let mut script = build_shebang(interpreter);
    script.push(b'\n');
    script.extend_from_slice(
        format!(
            "# -*- coding: utf-8 -*-\n\
             import re\n\
             import sys\n\
             from {module} import {import_name}\n\
             if __name__ == \"__main__\":\n    \
             sys.argv[0] = re.sub(r\"(-script\\.pyw|\\.exe)?$\", \"\", sys.argv[0])\n    \
             sys.exit({attribute}())\n",
            module = entry_point.module,
        )
        .as_bytes(),
    );
    Ok(script)
}

/// Replace a `#!python` first line with a real shebang for `interpreter`.
///
/// Other content passes through untouched. Only the first eight bytes are
/// inspected before deciding; nothing is buffered beyond the first line.
///
/// # Errors
///
/// Propagates read errors from `reader`.
pub fn fix_shebang<'a, R: Read + 'a>(reader: R, interpreter: &str) -> io::Result<Box<dyn Read + 'a>> {
    let mut reader = BufReader::new(reader);
    let mut head = Vec::with_capacity(PLACEHOLDER_SHEBANG.len());
    (&mut reader)
        .take(PLACEHOLDER_SHEBANG.len() as u64)
        .read_to_end(&mut head)?;

    if head != PLACEHOLDER_SHEBANG {
        return Ok(Box::new(Cursor::new(head).chain(reader)));
    }

    let mut discarded = Vec::new();
    reader.read_until(b'\n', &mut discarded)?;

    let mut shebang = build_shebang(interpreter);
    shebang.push(b'\n');
    Ok(Box::new(Cursor::new(shebang).chain(reader)))
}
