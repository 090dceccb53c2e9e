//! # Input file list normalization
//!
//! Registration entry points accept either an explicit list of exposures or a single
//! pattern string, as typed on a command line:
//!
//! ```text
//! "*fl?.fits"                       glob, expanded and sorted
//! "j01_flt.fits,j02_flt.fits"       comma-separated list, order kept
//! "@visit1.lst"                     one path per line (first column), blank lines and '#' comments skipped
//! "@visit1.lst,extra_flt.fits"      entries can be mixed
//! ```
//!
//! Entries of an `@` list file may themselves be globs. An input that resolves to no file is
//! an [`WcsAlignError::EmptyFileList`] error: every later step needs a first exposure.
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;

use crate::{constants::FileList, wcsalign_errors::WcsAlignError};

/// Exposures to register, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileInput {
    Pattern(String),
    List(FileList),
}

impl From<&str> for FileInput {
    fn from(value: &str) -> Self {
        FileInput::Pattern(value.to_string())
    }
}

impl From<String> for FileInput {
    fn from(value: String) -> Self {
        FileInput::Pattern(value)
    }
}

impl From<FileList> for FileInput {
    fn from(value: FileList) -> Self {
        FileInput::List(value)
    }
}

impl From<&[&str]> for FileInput {
    fn from(value: &[&str]) -> Self {
        FileInput::List(value.iter().map(Utf8PathBuf::from).collect())
    }
}

impl FileInput {
    /// Resolve into an ordered, non-empty list of exposures.
    pub fn resolve(&self) -> Result<FileList, WcsAlignError> {
        let files = match self {
            FileInput::Pattern(pattern) => parse_file_list(pattern)?,
            FileInput::List(list) => list.clone(),
        };
        if files.is_empty() {
            return Err(WcsAlignError::EmptyFileList(self.to_string()));
        }
        Ok(files)
    }
}

impl std::fmt::Display for FileInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileInput::Pattern(p) => f.write_str(p),
            FileInput::List(list) => {
                let joined: Vec<&str> = list.iter().map(|p| p.as_str()).collect();
                f.write_str(&joined.join(","))
            }
        }
    }
}

fn is_glob(entry: &str) -> bool {
    entry.contains(['*', '?', '['])
}

fn expand_glob(pattern: &str) -> Result<FileList, WcsAlignError> {
    let mut matches = Vec::new();
    for path in glob::glob(pattern)? {
        let path = path?;
        let path = Utf8PathBuf::from_path_buf(path)
            .map_err(|p| WcsAlignError::Utf8PathError(p.display().to_string()))?;
        matches.push(path);
    }
    matches.sort();
    debug!("{pattern}: {} match(es)", matches.len());
    Ok(matches)
}

fn expand_entry(entry: &str, files: &mut FileList) -> Result<(), WcsAlignError> {
    if is_glob(entry) {
        files.extend(expand_glob(entry)?);
    } else {
        files.push(Utf8PathBuf::from(entry));
    }
    Ok(())
}

fn read_list_file(path: &Utf8Path, files: &mut FileList) -> Result<(), WcsAlignError> {
    let content = fs::read_to_string(path)?;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(first) = line.split_whitespace().next() {
            expand_entry(first, files)?;
        }
    }
    Ok(())
}

/// Expand a pattern string into exposures, without the emptiness check of
/// [`FileInput::resolve`].
pub fn parse_file_list(input: &str) -> Result<FileList, WcsAlignError> {
    let mut files = FileList::new();
    for entry in input.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        match entry.strip_prefix('@') {
            Some(list_file) => read_list_file(Utf8Path::new(list_file), &mut files)?,
            None => expand_entry(entry, &mut files)?,
        }
    }
    Ok(files)
}

#[cfg(test)]
mod test_file_list {
    use super::*;

    fn touch(dir: &Utf8Path, name: &str) -> Utf8PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"").unwrap();
        path
    }

    fn utf8_tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_comma_list_keeps_order() {
        let files = parse_file_list("b_flt.fits, a_flt.fits,,c_flt.fits").unwrap();
        assert_eq!(
            files,
            vec![
                Utf8PathBuf::from("b_flt.fits"),
                Utf8PathBuf::from("a_flt.fits"),
                Utf8PathBuf::from("c_flt.fits"),
            ]
        );
    }

    #[test]
    fn test_glob_is_sorted() {
        let (_guard, dir) = utf8_tempdir();
        let b = touch(&dir, "j02_flt.fits");
        let a = touch(&dir, "j01_flc.fits");
        touch(&dir, "j01_drz.fits");

        let files = parse_file_list(dir.join("*fl?.fits").as_str()).unwrap();
        assert_eq!(files, vec![a, b]);
    }

    #[test]
    fn test_at_file() {
        let (_guard, dir) = utf8_tempdir();
        let list = dir.join("visit.lst");
        fs::write(&list, "# visit 1\nj01_flt.fits  j01_ivm.fits\n\nj02_flt.fits\n").unwrap();

        let files = parse_file_list(&format!("@{list},j03_flt.fits")).unwrap();
        assert_eq!(
            files,
            vec![
                Utf8PathBuf::from("j01_flt.fits"),
                Utf8PathBuf::from("j02_flt.fits"),
                Utf8PathBuf::from("j03_flt.fits"),
            ]
        );
    }

    #[test]
    fn test_empty_is_error() {
        let (_guard, dir) = utf8_tempdir();
        let pattern = dir.join("*.fits").to_string();
        let err = FileInput::from(pattern.as_str()).resolve().unwrap_err();
        assert_eq!(err, WcsAlignError::EmptyFileList(pattern));

        let err = FileInput::List(Vec::new()).resolve().unwrap_err();
        assert_eq!(err, WcsAlignError::EmptyFileList(String::new()));
    }

    #[test]
    fn test_explicit_list_untouched() {
        let input = FileInput::from(&["z_flt.fits", "a_flt.fits"][..]);
        assert_eq!(input.to_string(), "z_flt.fits,a_flt.fits");
        assert_eq!(input.resolve().unwrap().len(), 2);
    }
}
