//! `entry_points.txt` parsing.
//!
//! The file is INI-style: bracketed group headers followed by
//! `name = module:attr [extras]` lines. Only the `console_scripts` and
//! `gui_scripts` groups produce launchers; other groups (plugin
//! registrations and the like) are ignored at install time.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Errors from parsing `entry_points.txt`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryPointError {
    /// The file is not valid UTF-8.
    #[error("entry_points.txt is not valid UTF-8")]
    Encoding,

    /// A line outside any `[group]` header, or without `=`.
    #[error("Malformed entry_points.txt line {line}: '{content}'")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },

    /// A `[group]` header appears more than once.
    #[error("Duplicate group [{group}] on line {line}")]
    DuplicateGroup {
        /// Group header.
        group: String,
        /// 1-based line number of the repeated header.
        line: usize,
    },

    /// The same name appears twice in one group.
    #[error("Duplicate entry point '{name}' in [{group}]")]
    Duplicate {
        /// Group header.
        group: String,
        /// Repeated name.
        name: String,
    },

    /// The value does not follow `module[:attr][ [extras]]`.
    #[error("Invalid entry point '{name}': '{value}'")]
    InvalidValue {
        /// Entry point name.
        name: String,
        /// Offending value.
        value: String,
    },
}

/// Which kind of launcher an entry point produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptSection {
    /// From `[console_scripts]`.
    Console,
    /// From `[gui_scripts]`.
    Gui,
}

impl ScriptSection {
    /// Short name (`console` / `gui`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Console => "console",
            Self::Gui => "gui",
        }
    }

    /// The `entry_points.txt` group this section is read from.
    pub fn group(&self) -> &'static str {
        match self {
            Self::Console => "console_scripts",
            Self::Gui => "gui_scripts",
        }
    }
}

impl std::fmt::Display for ScriptSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A declared launcher: `name = module:attribute`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    /// Name of the launcher to create.
    pub name: String,
    /// Dotted module path to import.
    pub module: String,
    /// Dotted attribute path within the module, if any.
    pub attribute: Option<String>,
    /// Console or GUI launcher.
    pub section: ScriptSection,
}

static ENTRY_POINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<module>[\w.]+)\s*(:\s*(?P<attrs>[\w.]+)\s*)?((?P<extras>\[.*\])\s*)?$")
        .expect("entry point pattern is valid")
});

/// Parse `entry_points.txt` into launcher declarations.
///
/// Entry points come out in file order, groups included.
///
/// # Errors
///
/// Returns an [`EntryPointError`] for malformed lines, repeated group
/// headers, duplicate names within a group, or values that are not
/// `module[:attr]`.
pub fn parse_entry_points(text: &str) -> Result<Vec<EntryPoint>, EntryPointError> {
    let groups = parse_groups(text)?;
    let mut entry_points = Vec::new();

    for (group, entries) in &groups {
        let Some(section) = [ScriptSection::Console, ScriptSection::Gui]
            .into_iter()
            .find(|section| section.group() == group)
        else {
            continue;
        };

        for (name, value) in entries {
            let caps = ENTRY_POINT_RE
                .captures(value)
                .ok_or_else(|| EntryPointError::InvalidValue {
                    name: name.clone(),
                    value: value.clone(),
                })?;

            entry_points.push(EntryPoint {
                name: name.clone(),
                module: caps["module"].to_string(),
                attribute: caps.name("attrs").map(|m| m.as_str().to_string()),
                section,
            });
        }
    }

    Ok(entry_points)
}

/// Parse raw bytes as read from an archive.
///
/// # Errors
///
/// Returns [`EntryPointError::Encoding`] for non-UTF-8 input, otherwise as
/// [`parse_entry_points`].
pub fn parse_entry_points_bytes(bytes: &[u8]) -> Result<Vec<EntryPoint>, EntryPointError> {
    let text = std::str::from_utf8(bytes).map_err(|_| EntryPointError::Encoding)?;
    parse_entry_points(text)
}

type Group = (String, Vec<(String, String)>);

fn parse_groups(text: &str) -> Result<Vec<Group>, EntryPointError> {
    let mut groups: Vec<Group> = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        let malformed = || EntryPointError::MalformedLine {
            line: index + 1,
            content: raw.to_string(),
        };

        if let Some(header) = line.strip_prefix('[') {
            let name = header.strip_suffix(']').ok_or_else(malformed)?.trim();
            if groups.iter().any(|(existing, _)| existing == name) {
                return Err(EntryPointError::DuplicateGroup {
                    group: name.to_string(),
                    line: index + 1,
                });
            }
            groups.push((name.to_string(), Vec::new()));
            continue;
        }

        let (group, entries) = groups.last_mut().ok_or_else(malformed)?;
        let (name, value) = line.split_once('=').ok_or_else(malformed)?;
        let name = name.trim();

        if entries.iter().any(|(existing, _)| existing == name) {
            return Err(EntryPointError::Duplicate {
                group: group.clone(),
                name: name.to_string(),
            });
        }
        entries.push((name.to_string(), value.trim().to_string()));
    }

    Ok(groups)
}
