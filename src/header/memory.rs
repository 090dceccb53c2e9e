use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};

use super::{is_removable_alt, split_alt_wcs_key, HeaderStore};
use crate::{
    constants::{ORIGINAL_WCS_KEY, WCSNAME_KEY},
    wcsalign_errors::WcsAlignError,
};

/// Ordered `(keyword, value)` cards of one header unit.
pub type HeaderCards = Vec<(String, String)>;

/// Headers kept in memory, one list of header units per file; unit 0 is the primary header.
///
/// Used for dry runs and by the tests. Reading a file that was never registered is a
/// [`WcsAlignError::HeaderNotFound`] error, as opening a missing FITS file would be.
#[derive(Debug, Clone, Default)]
pub struct MemoryHeaderStore {
    files: HashMap<Utf8PathBuf, Vec<HeaderCards>>,
}

impl MemoryHeaderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) a keyword of the primary header, creating the file if needed.
    pub fn set_keyword(&mut self, file: impl AsRef<Utf8Path>, key: &str, value: &str) {
        let units = self
            .files
            .entry(file.as_ref().to_path_buf())
            .or_insert_with(|| vec![HeaderCards::new()]);
        set_card(&mut units[0], key, value);
    }

    /// Append an extension header unit to a file and return its index.
    pub fn push_extension(&mut self, file: impl AsRef<Utf8Path>, cards: HeaderCards) -> usize {
        let units = self
            .files
            .entry(file.as_ref().to_path_buf())
            .or_insert_with(|| vec![HeaderCards::new()]);
        units.push(cards);
        units.len() - 1
    }

    pub fn unit(&self, file: impl AsRef<Utf8Path>, index: usize) -> Option<&HeaderCards> {
        self.files.get(file.as_ref())?.get(index)
    }

    pub fn card(&self, file: impl AsRef<Utf8Path>, index: usize, key: &str) -> Option<&str> {
        self.unit(file, index)?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn units_mut(&mut self, file: &Utf8Path) -> Result<&mut Vec<HeaderCards>, WcsAlignError> {
        self.files
            .get_mut(file)
            .ok_or_else(|| WcsAlignError::HeaderNotFound(file.to_string()))
    }
}

fn set_card(cards: &mut HeaderCards, key: &str, value: &str) {
    match cards.iter_mut().find(|(k, _)| k == key) {
        Some((_, v)) => *v = value.to_string(),
        None => cards.push((key.to_string(), value.to_string())),
    }
}

fn clean_unit(cards: &mut HeaderCards) -> bool {
    if !cards.iter().any(|(k, _)| k == WCSNAME_KEY) {
        return false;
    }

    let restored: Vec<(String, String)> = cards
        .iter()
        .filter_map(|(k, v)| match split_alt_wcs_key(k) {
            Some((base, ORIGINAL_WCS_KEY)) => Some((base.to_string(), v.clone())),
            _ => None,
        })
        .collect();
    for (base, value) in restored {
        set_card(cards, &base, &value);
    }

    cards.retain(|(k, _)| !is_removable_alt(k));
    true
}

impl HeaderStore for MemoryHeaderStore {
    fn keyword(&mut self, file: &Utf8Path, key: &str) -> Result<Option<String>, WcsAlignError> {
        let units = self.units_mut(file)?;
        Ok(units
            .first()
            .and_then(|primary| primary.iter().find(|(k, _)| k == key))
            .map(|(_, v)| v.clone()))
    }

    fn clear_alt_wcs(&mut self, file: &Utf8Path) -> Result<usize, WcsAlignError> {
        let units = self.units_mut(file)?;
        let mut cleaned = 0;
        for unit in units.iter_mut() {
            if clean_unit(unit) {
                cleaned += 1;
            }
        }
        Ok(cleaned)
    }
}
