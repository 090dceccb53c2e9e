#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};

use camino::Utf8Path;
use wcsalign::{
    constants::WCSNAME_KEY,
    engine::{RegistrationEngine, RegistrationReport, RegistrationRequest},
    header::{memory::MemoryHeaderStore, HeaderStore},
    parameters::ParameterSet,
    session::RegistrationPlan,
    WcsAlignError,
};

/// A [`MemoryHeaderStore`] shared between a session and a fake engine, so that a commit
/// written by the engine is seen by the next session.
#[derive(Clone, Default)]
pub struct SharedStore(pub Rc<RefCell<MemoryHeaderStore>>);

impl SharedStore {
    pub fn with_camera(files: &[&str], instrument: &str, detector: &str) -> Self {
        let mut store = MemoryHeaderStore::new();
        for file in files {
            store.set_keyword(file, "INSTRUME", instrument);
            store.set_keyword(file, "DETECTOR", detector);
        }
        SharedStore(Rc::new(RefCell::new(store)))
    }

    pub fn set_keyword(&self, file: &str, key: &str, value: &str) {
        self.0.borrow_mut().set_keyword(file, key, value);
    }

    pub fn primary(&self, file: &str, key: &str) -> Option<String> {
        self.0.borrow().card(file, 0, key).map(String::from)
    }
}

impl HeaderStore for SharedStore {
    fn keyword(&mut self, file: &Utf8Path, key: &str) -> Result<Option<String>, WcsAlignError> {
        self.0.borrow_mut().keyword(file, key)
    }

    fn clear_alt_wcs(&mut self, file: &Utf8Path) -> Result<usize, WcsAlignError> {
        self.0.borrow_mut().clear_alt_wcs(file)
    }
}

/// Engine recording every request. Commits write `WCSNAME` into the shared store;
/// `fail_at` makes the n-th call (0-based) fail.
#[derive(Default)]
pub struct RecordingEngine {
    pub store: Option<SharedStore>,
    pub requests: Vec<RegistrationRequest>,
    pub fail_at: Option<usize>,
}

impl RecordingEngine {
    pub fn writing_to(store: &SharedStore) -> Self {
        RecordingEngine {
            store: Some(store.clone()),
            ..Default::default()
        }
    }

    pub fn commits(&self) -> usize {
        self.requests.iter().filter(|r| r.mode.is_commit()).count()
    }

    pub fn previews(&self) -> usize {
        self.requests.len() - self.commits()
    }
}

impl RegistrationEngine for RecordingEngine {
    fn register(
        &mut self,
        request: &RegistrationRequest,
    ) -> Result<RegistrationReport, WcsAlignError> {
        if self.fail_at == Some(self.requests.len()) {
            return Err(WcsAlignError::EngineFailed {
                command: "tweakreg-bridge".into(),
                status: "exit status: 1".into(),
                stderr: "not enough matched sources".into(),
            });
        }
        self.requests.push(request.clone());

        if request.updatehdr {
            if let Some(store) = &self.store {
                for file in &request.files {
                    store.set_keyword(file.as_str(), WCSNAME_KEY, &request.wcsname);
                }
            }
        }
        Ok(RegistrationReport {
            diagnostics: vec![format!("XRMS 0.05  YRMS 0.07  ({} files)", request.files.len())],
        })
    }
}

pub fn plan(files: &[&str], wcsname: &str) -> RegistrationPlan {
    RegistrationPlan {
        files: files.iter().map(|f| (*f).into()).collect(),
        refimage: None,
        refcat: None,
        wcsname: wcsname.to_string(),
        params: ParameterSet::default(),
    }
}
