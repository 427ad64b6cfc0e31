//! A wheel read from a zip archive.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{self, BufReader, Read, Seek};
use std::path::Path;

use tracing::{debug, warn};
use wheelhouse_schema::{
    HashingReader, RECORD_FILENAME, RecordEntry, WheelFilename, parse_record_file,
};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::source::{WheelContent, WheelSource};
use crate::{Error, Result};

/// Signature files that live next to RECORD but are never listed in it.
const SIGNATURE_FILENAMES: [&str; 2] = ["RECORD.jws", "RECORD.p7s"];

/// How thoroughly [`WheelFile::validate_record`] checks the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Skip validation.
    #[default]
    None,
    /// Every file must be listed in RECORD with a hash.
    Entries,
    /// As [`Entries`](Self::Entries), and every hash and size must match.
    All,
}

impl std::str::FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "entries" => Ok(Self::Entries),
            "all" => Ok(Self::All),
            other => Err(format!(
                "unknown validation mode '{other}' (expected none, entries or all)"
            )),
        }
    }
}

impl std::fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Entries => "entries",
            Self::All => "all",
        })
    }
}

/// A `.whl` archive.
pub struct WheelFile<R = BufReader<File>> {
    archive: ZipArchive<R>,
    filename: String,
    name: WheelFilename,
    dist_info_dir: String,
    data_dir: String,
}

impl WheelFile {
    /// Open the wheel at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened, its name is not a wheel filename,
    /// or the archive does not have exactly one `.dist-info` directory.
    pub fn open(path: &Path) -> Result<Self> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::invalid_source(path.display().to_string(), "not a file name"))?
            .to_string();
        let file = File::open(path)?;
        Self::new(BufReader::new(file), &filename)
    }
}

impl<R: Read + Seek> WheelFile<R> {
    /// Read a wheel from `reader`; `filename` supplies the name and version.
    ///
    /// # Errors
    ///
    /// Same as [`WheelFile::open`], minus the filesystem.
    pub fn new(reader: R, filename: &str) -> Result<Self> {
        let name = WheelFilename::parse(filename)?;
        let archive = ZipArchive::new(reader)?;

        let dist_infos: BTreeSet<&str> = archive
            .file_names()
            .filter_map(|path| path.split('/').next())
            .filter(|top| top.ends_with(".dist-info"))
            .collect();

        let dist_info_dir = match dist_infos.into_iter().collect::<Vec<_>>().as_slice() {
            [single] => (*single).to_string(),
            [] => return Err(Error::invalid_source(filename, "no .dist-info directory found")),
            many => {
                return Err(Error::invalid_source(
                    filename,
                    format!("multiple .dist-info directories found: {}", many.join(", ")),
                ));
            }
        };
        let data_dir = format!("{}.data", dist_info_dir.trim_end_matches(".dist-info"));

        debug!(wheel = filename, dist_info = %dist_info_dir, "Opened wheel");

        Ok(Self {
            archive,
            filename: filename.to_string(),
            name,
            dist_info_dir,
            data_dir,
        })
    }

    /// The archive's file name.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    fn record_path(&self) -> String {
        format!("{}/{RECORD_FILENAME}", self.dist_info_dir)
    }

    fn is_signature(&self, path: &str) -> bool {
        path.strip_prefix(&self.dist_info_dir)
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some_and(|rest| SIGNATURE_FILENAMES.contains(&rest))
    }

    fn read_record(&mut self) -> Result<Vec<RecordEntry>> {
        let bytes = self.read_dist_info(RECORD_FILENAME)?;
        let text = String::from_utf8(bytes)
            .map_err(|_| Error::invalid_source(&self.filename, "RECORD is not valid UTF-8"))?;
        Ok(parse_record_file(&text)?)
    }

    /// Check that RECORD describes the archive.
    ///
    /// Every problem found is collected, so one failure lists them all.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordValidation`] listing each issue, or an archive
    /// error if a member cannot be read.
    pub fn validate_record(&mut self, mode: ValidationMode) -> Result<()> {
        if mode == ValidationMode::None {
            return Ok(());
        }

        let records = match self.read_record() {
            Ok(records) => records,
            Err(err) => {
                return Err(Error::RecordValidation {
                    wheel: self.filename.clone(),
                    issues: vec![format!("Unable to retrieve RECORD: {err}")],
                });
            }
        };
        let mut mapping: HashMap<String, RecordEntry> = records
            .into_iter()
            .map(|entry| (entry.path.clone(), entry))
            .collect();

        let record_path = self.record_path();
        let mut issues = Vec::new();

        for index in 0..self.archive.len() {
            let path = self.archive.name_for_index(index).unwrap_or_default().to_string();
            if path.ends_with('/') {
                continue;
            }
            let listed = mapping.remove(&path);

            if self.is_signature(&path) {
                if listed.is_some() {
                    issues.push(format!(
                        "digital signature file {path} is incorrectly contained in RECORD"
                    ));
                }
                continue;
            }

            let Some(entry) = listed else {
                issues.push(format!("{path} is not mentioned in RECORD"));
                continue;
            };

            if path == record_path {
                if entry.hash.is_some() || entry.size.is_some() {
                    issues.push("RECORD file incorrectly contains hash / size".to_string());
                }
                continue;
            }

            let Some(expected) = entry.hash.as_ref() else {
                issues.push(format!("hash / size of {path} is not included in RECORD"));
                continue;
            };

            if mode == ValidationMode::All {
                let matches = match expected.algorithm() {
                    Some(algorithm) => {
                        let mut member = self.archive.by_index(index)?;
                        let mut hashing = HashingReader::new(&mut member, algorithm);
                        io::copy(&mut hashing, &mut io::sink())?;
                        let (actual, size) = hashing.finish();
                        actual.value == expected.value && entry.size.is_none_or(|s| s == size)
                    }
                    None => false,
                };
                if !matches {
                    issues.push(format!("hash / size of {path} didn't match RECORD"));
                }
            }
        }

        if issues.is_empty() {
            debug!(wheel = %self.filename, mode = %mode, "RECORD validated");
            Ok(())
        } else {
            warn!(wheel = %self.filename, issues = issues.len(), "RECORD validation failed");
            Err(Error::RecordValidation {
                wheel: self.filename.clone(),
                issues,
            })
        }
    }
}

impl<R: Read + Seek> WheelSource for WheelFile<R> {
    fn distribution(&self) -> &str {
        &self.name.distribution
    }

    fn version(&self) -> &str {
        &self.name.version
    }

    fn dist_info_dir(&self) -> &str {
        &self.dist_info_dir
    }

    fn data_dir(&self) -> &str {
        &self.data_dir
    }

    fn dist_info_filenames(&self) -> Vec<String> {
        let prefix = format!("{}/", self.dist_info_dir);
        self.archive
            .file_names()
            .filter_map(|path| path.strip_prefix(&prefix))
            .filter(|rest| !rest.is_empty() && !rest.ends_with('/'))
            .map(str::to_string)
            .collect()
    }

    fn read_dist_info(&mut self, filename: &str) -> Result<Vec<u8>> {
        let path = format!("{}/{filename}", self.dist_info_dir);
        let mut member = match self.archive.by_name(&path) {
            Ok(member) => member,
            Err(ZipError::FileNotFound) => return Err(Error::NotFound(path)),
            Err(err) => return Err(err.into()),
        };
        let mut data = Vec::new();
        member.read_to_end(&mut data)?;
        Ok(data)
    }

    fn visit_contents(
        &mut self,
        visitor: &mut dyn FnMut(WheelContent<'_>) -> Result<()>,
    ) -> Result<()> {
        let mut mapping: HashMap<String, RecordEntry> = self
            .read_record()?
            .into_iter()
            .map(|entry| (entry.path.clone(), entry))
            .collect();
        let record_path = self.record_path();

        for index in 0..self.archive.len() {
            let path = self.archive.name_for_index(index).unwrap_or_default().to_string();
            if path.ends_with('/') {
                continue;
            }

            let record = match mapping.remove(&path) {
                Some(record) => record,
                None if path == record_path || self.is_signature(&path) => {
                    RecordEntry::new(path.clone(), None, None)
                }
                None => {
                    return Err(Error::invalid_source(
                        &self.filename,
                        format!("{path} is not mentioned in RECORD"),
                    ));
                }
            };

            let mut member = self.archive.by_index(index)?;
            let is_executable = member.unix_mode().is_some_and(|mode| mode & 0o111 != 0);

            visitor(WheelContent {
                record,
                reader: &mut member,
                is_executable,
            })?;
        }
        Ok(())
    }
}

impl<R> std::fmt::Debug for WheelFile<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WheelFile")
            .field("filename", &self.filename)
            .field("dist_info_dir", &self.dist_info_dir)
            .finish_non_exhaustive()
    }
}
