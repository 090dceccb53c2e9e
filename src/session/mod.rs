//! # Interactive registration session
//!
//! A [`Session`] drives one registration of a list of exposures: it reads the camera of the
//! first exposure, checks whether the requested WCS label already exists, optionally lets an
//! operator tune the [`ParameterSet`] over several preview runs, and finally commits exactly
//! one WCS solution.
//!
//! ## State machine
//!
//! ```text
//!            (initial_preview)
//!   start ──────────────────────▶ Reviewing ◀──────────────┐
//!                                  │   │                   │ "run" → preview
//!                       "y…"       │   │ anything else     │
//!                                  ▼   ▼                   │
//!                          Committed   Editing ────────────┘
//!                                        │ ▲
//!                                        └─┘ "name = value" / malformed line
//! ```
//!
//! - **Reviewing**: the current parameters are shown, then the operator is asked to adopt them.
//!   A line starting with `y`/`Y` moves to `Committed`.
//! - **Editing**: one `name = value` line at a time updates the parameters. Malformed lines are
//!   reported and change nothing. `run` triggers a preview with the new parameters.
//! - **Committed**: terminal; the single commit-mode run follows.
//!
//! The [`ParameterSet`] is the only mutable state; it is moved through the loop and never
//! shared.
//!
//! ## Guarantees
//!
//! - Preview runs never write headers; only the final commit does.
//! - Non-interactive sessions make exactly one (commit) run.
//! - If the label already exists in the first exposure and `clobber` is off, the session returns
//!   that label without any run.
//! - A missing `INSTRUME`/`DETECTOR` keyword fails the session before any run.
//! - Engine and header-store errors propagate unchanged; nothing is committed after a failure.
//!
//! ## Example
//!
//! ```rust,ignore
//! use wcsalign::session::{console::LineConsole, RegistrationPlan, Session, SessionOptions};
//!
//! let mut session = Session::new(store, engine, LineConsole::stdio(), SessionOptions::interactive());
//! let result = session.run(plan)?;
//! println!("WCS written as {}", result.wcsname);
//! ```
pub mod console;

use camino::Utf8PathBuf;
use log::{info, warn};

use crate::{
    camera::Camera,
    constants::{ConvWidth, FileList},
    engine::{RegistrationEngine, RegistrationReport, RegistrationRequest, RunMode},
    header::HeaderStore,
    parameters::{
        edit::{parse_edit_line, EditCommand},
        ParameterSet,
    },
    wcsalign_errors::WcsAlignError,
};
use console::Console;

const SEPARATOR: &str = "==============================";

/// Behavior switches of a [`Session`].
///
/// # Fields
///
/// * `interactive` - let an operator tune the parameters before committing
/// * `clobber` - register even if the WCS label already exists
/// * `debug` - keep the engine's intermediate files
/// * `initial_preview` - run a preview before the first confirmation prompt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    pub interactive: bool,
    pub clobber: bool,
    pub debug: bool,
    pub initial_preview: bool,
}

impl SessionOptions {
    pub fn interactive() -> Self {
        SessionOptions {
            interactive: true,
            ..Default::default()
        }
    }
}

/// What to register, and under which label.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationPlan {
    pub files: FileList,
    pub refimage: Option<Utf8PathBuf>,
    pub refcat: Option<Utf8PathBuf>,
    pub wcsname: String,
    pub params: ParameterSet,
}

/// Outcome of a session.
///
/// # Fields
///
/// * `wcsname` - label of the committed (or already present) WCS solution
/// * `params` - the accepted parameters
/// * `skipped` - `true` when the label already existed and nothing ran
/// * `invocations` - number of engine runs, previews and commit included
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResult {
    pub wcsname: String,
    pub params: ParameterSet,
    pub skipped: bool,
    pub invocations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Reviewing,
    Editing,
    Committed,
}

/// Everything a run needs besides the parameters and the mode.
struct RunContext<'a> {
    plan: &'a RegistrationPlan,
    conv_width: ConvWidth,
}

pub struct Session<S, E, C> {
    store: S,
    engine: E,
    console: C,
    options: SessionOptions,
    invocations: usize,
}

impl<S, E, C> Session<S, E, C>
where
    S: HeaderStore,
    E: RegistrationEngine,
    C: Console,
{
    pub fn new(store: S, engine: E, console: C, options: SessionOptions) -> Self {
        Session {
            store,
            engine,
            console,
            options,
            invocations: 0,
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Register `plan.files` and write the resulting WCS under `plan.wcsname`.
    ///
    /// Arguments
    /// -----------------
    /// * `plan`: exposures, reference, label and starting parameters.
    ///
    /// Return
    /// ----------
    /// * The [`SessionResult`], or the first error from the header store, the engine or the
    ///   console.
    pub fn run(&mut self, plan: RegistrationPlan) -> Result<SessionResult, WcsAlignError> {
        self.invocations = 0;
        let first = plan
            .files
            .first()
            .ok_or_else(|| WcsAlignError::EmptyFileList(String::new()))?
            .clone();

        let camera = Camera::from_header(&mut self.store, &first)?;
        let conv_width = camera.conv_width();
        info!("{first}: camera {camera}, conv_width = {conv_width}");

        let existing = self.store.wcs_names(&first)?;
        if existing.iter().any(|name| *name == plan.wcsname) && !self.options.clobber {
            warn!(
                "WCSNAME {} already exists in {first}, skipping this registration. \
                 Re-run with clobber if you really want it done.",
                plan.wcsname
            );
            return Ok(SessionResult {
                wcsname: plan.wcsname.clone(),
                params: plan.params,
                skipped: true,
                invocations: 0,
            });
        }

        let ctx = RunContext {
            plan: &plan,
            conv_width,
        };
        let mut params = plan.params.clone();
        if self.options.interactive {
            params = self.refine(params, &ctx)?;
        }

        self.console
            .say(&format!("{SEPARATOR}\n  Final tweakreg run for updating headers."))?;
        let commit = RunMode::Commit {
            wcsname: plan.wcsname.clone(),
        };
        self.invoke(&ctx, commit, &params)?;

        info!("WCS solution {} written to {} file(s)", plan.wcsname, plan.files.len());
        Ok(SessionResult {
            wcsname: plan.wcsname.clone(),
            params,
            skipped: false,
            invocations: self.invocations,
        })
    }

    fn invoke(
        &mut self,
        ctx: &RunContext<'_>,
        mode: RunMode,
        params: &ParameterSet,
    ) -> Result<RegistrationReport, WcsAlignError> {
        let request = RegistrationRequest::new(
            ctx.plan.files.clone(),
            ctx.plan.refimage.clone(),
            ctx.plan.refcat.clone(),
            mode,
            params.clone(),
            ctx.conv_width,
            self.options.debug,
        );
        self.invocations += 1;
        self.engine.register(&request)
    }

    fn preview(
        &mut self,
        ctx: &RunContext<'_>,
        params: &ParameterSet,
    ) -> Result<(), WcsAlignError> {
        self.console
            .say("Running a tweakreg preview; headers are not updated.")?;
        let report = self.invoke(ctx, RunMode::Preview, params)?;
        for line in &report.diagnostics {
            self.console.say(line)?;
        }
        self.console.say(SEPARATOR)
    }

    /// Operator loop; returns the adopted parameters.
    fn refine(
        &mut self,
        mut params: ParameterSet,
        ctx: &RunContext<'_>,
    ) -> Result<ParameterSet, WcsAlignError> {
        if self.options.initial_preview {
            self.preview(ctx, &params)?;
        }

        let mut state = SessionState::Reviewing;
        while state != SessionState::Committed {
            state = match state {
                SessionState::Reviewing => {
                    self.console.say("Current tweakreg/imagefind parameters:")?;
                    self.console.say(params.summary().to_string().trim_end())?;
                    let answer = self.console.ask("Adopt these tweakreg settings? y/[n] ")?;
                    if answer.to_lowercase().starts_with('y') {
                        self.console.say("OK. Proceeding to update headers.")?;
                        SessionState::Committed
                    } else {
                        self.console
                            .say("Adjust parameters using \"parname = value\" syntax.")?;
                        self.console
                            .say("Enter \"run\" to re-run tweakreg with new parameters.")?;
                        SessionState::Editing
                    }
                }
                SessionState::Editing => {
                    let line = self.console.ask("   ")?;
                    match parse_edit_line(&line) {
                        Ok(EditCommand::Run) => {
                            self.preview(ctx, &params)?;
                            SessionState::Reviewing
                        }
                        Ok(EditCommand::Set(edit)) => {
                            params.apply(edit);
                            SessionState::Editing
                        }
                        Err(e) => {
                            warn!("Rejected parameter edit: {e}");
                            self.console.say(&format!("{e}. Try again"))?;
                            SessionState::Editing
                        }
                    }
                }
                SessionState::Committed => SessionState::Committed,
            };
        }
        Ok(params)
    }
}
