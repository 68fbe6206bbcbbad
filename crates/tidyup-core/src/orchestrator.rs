use crate::analysis::{self, Rebound};
use crate::config::AppConfig;
use crate::engine::ScanEngine;
use crate::error::Error;
use crate::executor::{self, Outcome};
use crate::model::{Action, ActionGroups, ActionKind, Category};
use crate::progress::ProgressReporter;
use crate::prompt::{Choice, Chooser};
use crate::storage::ActionStore;
use crate::tracker::RunState;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// How proposed actions turn into executed ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Ask about every file.
    #[default]
    Analyze,
    /// Fixed per-group policy, no questions.
    Auto,
    /// Execute the saved snapshot without scanning.
    Replay,
    /// Pick groups, then one answer per group.
    Select,
    /// Classify and save the snapshot only.
    Json,
}

impl Mode {
    pub const ALL: [Mode; 5] = [Mode::Analyze, Mode::Auto, Mode::Replay, Mode::Select, Mode::Json];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Analyze => "analyze",
            Mode::Auto => "auto",
            Mode::Replay => "replay",
            Mode::Select => "select",
            Mode::Json => "json",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Scanning,
    Classifying,
    Planning,
    AwaitingSelection,
    Executing,
    Persisting,
    Done,
}

/// What a run did, in execution order.
#[derive(Debug)]
pub struct RunReport {
    pub mode: Mode,
    /// The plan the run worked from: classified, reconciled, or loaded.
    pub plan: ActionGroups,
    pub outcomes: Vec<(Category, Outcome)>,
    pub snapshot: Option<PathBuf>,
    /// Set when the post-run snapshot could not be written.
    pub persist_error: Option<String>,
}

impl RunReport {
    fn new(mode: Mode, plan: ActionGroups) -> Self {
        Self {
            mode,
            plan,
            outcomes: Vec::new(),
            snapshot: None,
            persist_error: None,
        }
    }

    /// Nothing was proposed (or nothing was saved to replay).
    pub fn nothing_to_do(&self) -> bool {
        self.plan.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_failure()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_skipped()).count()
    }
}

/// Drives one run: scan, classify, decide, execute, persist.
pub struct Orchestrator<'a> {
    config: &'a AppConfig,
    store: ActionStore,
    chooser: &'a mut dyn Chooser,
    reporter: &'a dyn ProgressReporter,
    phase: Phase,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a AppConfig,
        chooser: &'a mut dyn Chooser,
        reporter: &'a dyn ProgressReporter,
    ) -> Self {
        Self {
            config,
            store: ActionStore::open(&config.actions_file),
            chooser,
            reporter,
            phase: Phase::Idle,
        }
    }

    pub fn with_store(mut self, store: ActionStore) -> Self {
        self.store = store;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn run(&mut self, mode: Mode) -> Result<RunReport, Error> {
        self.config.validate()?;
        info!("Running in {} mode", mode);

        let report = match mode {
            Mode::Replay => self.replay()?,
            Mode::Json => self.with_plan(mode, Self::generate)?,
            Mode::Auto => self.with_plan(mode, |run, groups| Ok(run.automatic(groups)))?,
            Mode::Analyze => self.with_plan(mode, Self::interactive)?,
            Mode::Select => self.with_plan(mode, Self::group_interactive)?,
        };

        self.enter(Phase::Done);
        info!(
            "{} mode finished: {} succeeded, {} failed, {} skipped",
            mode,
            report.succeeded(),
            report.failed(),
            report.skipped()
        );
        Ok(report)
    }

    fn enter(&mut self, phase: Phase) {
        debug!("{:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    fn classify_tree(&mut self) -> ActionGroups {
        self.enter(Phase::Scanning);
        let inventory = ScanEngine::new(self.config.clone()).scan(self.reporter);

        self.enter(Phase::Classifying);
        analysis::classify(&inventory.files, &inventory.duplicates, self.config)
    }

    /// Scan and classify, then hand the plan to `handler` unless it is empty.
    fn with_plan(
        &mut self,
        mode: Mode,
        handler: impl FnOnce(&mut Self, ActionGroups) -> Result<RunReport, Error>,
    ) -> Result<RunReport, Error> {
        let groups = self.classify_tree();
        if groups.is_empty() {
            info!("No actions suggested.");
            return Ok(RunReport::new(mode, groups));
        }
        handler(self, groups)
    }

    fn execution(&self) -> Execution<'a> {
        Execution::new(self.reporter, self.config.primary_dir())
    }

    /// Reconcile and save; nothing is executed.
    fn generate(&mut self, groups: ActionGroups) -> Result<RunReport, Error> {
        self.enter(Phase::Planning);
        let plan = analysis::reconcile(&groups, self.config.primary_dir());

        self.enter(Phase::Persisting);
        self.store.save(&plan)?;
        self.reporter.on_snapshot_saved(self.store.path());

        let mut report = RunReport::new(Mode::Json, plan);
        report.snapshot = Some(self.store.path().to_path_buf());
        Ok(report)
    }

    fn automatic(&mut self, groups: ActionGroups) -> RunReport {
        self.enter(Phase::Planning);
        let mut run = self.execution();

        self.enter(Phase::Executing);
        for (category, actions) in groups.iter() {
            let force_delete = match self.auto_policy(category) {
                AutoPolicy::Delete => true,
                AutoPolicy::Proposed => false,
                AutoPolicy::Untouched => {
                    if !actions.is_empty() {
                        debug!("Leaving {} untouched in automatic mode", category);
                    }
                    continue;
                }
            };
            for action in actions {
                if force_delete {
                    run.run(category, &action.with_kind(ActionKind::Delete));
                } else {
                    run.run(category, action);
                }
            }
        }

        self.finish(Mode::Auto, groups, run)
    }

    fn auto_policy(&self, category: Category) -> AutoPolicy {
        match category {
            Category::Temporary | Category::Duplicates => AutoPolicy::Delete,
            Category::BadChars | Category::MoveToX => AutoPolicy::Proposed,
            other if self.config.auto_include.contains(&other) => AutoPolicy::Proposed,
            _ => AutoPolicy::Untouched,
        }
    }

    /// One question per file; each group's answers are collected, then executed.
    fn interactive(&mut self, groups: ActionGroups) -> Result<RunReport, Error> {
        let mut run = self.execution();

        for (category, actions) in groups.iter() {
            if actions.is_empty() {
                continue;
            }

            self.enter(Phase::AwaitingSelection);
            let mut chosen: Vec<Action> = Vec::new();
            for action in actions {
                let ready = match run.prepare(category, action) {
                    Rebound::Ready(ready) => ready,
                    Rebound::Deleted(path) => {
                        run.skip(category, path, "already deleted");
                        continue;
                    }
                };
                let offered = Choice::offered_for(std::slice::from_ref(&ready));
                let choice = self.chooser.choose_for_file(category, &ready, &offered)?;
                // Execution rebinds from the original path again.
                match accept(choice, &offered).apply(action) {
                    Some(action) => chosen.push(action),
                    None => run.skip(category, ready.path, "skipped by user"),
                }
            }

            self.enter(Phase::Executing);
            for action in &chosen {
                run.run(category, action);
            }
        }

        Ok(self.finish(Mode::Analyze, groups, run))
    }

    /// Pick groups, then one answer per group applied to every matching action.
    fn group_interactive(&mut self, groups: ActionGroups) -> Result<RunReport, Error> {
        let mut run = self.execution();
        let available = groups.non_empty();

        self.enter(Phase::AwaitingSelection);
        let selected = self.chooser.select_groups(&available)?;

        for (category, _) in available {
            if !selected.contains(&category) {
                continue;
            }

            self.enter(Phase::AwaitingSelection);
            let mut originals: Vec<&Action> = Vec::new();
            let mut ready: Vec<Action> = Vec::new();
            for action in groups.get(category) {
                match run.prepare(category, action) {
                    Rebound::Ready(rebound) => {
                        originals.push(action);
                        ready.push(rebound);
                    }
                    Rebound::Deleted(path) => run.skip(category, path, "already deleted"),
                }
            }
            if ready.is_empty() {
                continue;
            }

            let offered = Choice::offered_for(&ready);
            let choice = accept(
                self.chooser.choose_for_group(category, &ready, &offered)?,
                &offered,
            );

            self.enter(Phase::Executing);
            for (original, shown) in originals.into_iter().zip(&ready) {
                match choice.apply(original) {
                    Some(action) => run.run(category, &action),
                    None => run.skip(category, shown.path.clone(), "not selected"),
                }
            }
        }

        Ok(self.finish(Mode::Select, groups, run))
    }

    /// Execute the stored plan in stored order with a fresh run state.
    fn replay(&mut self) -> Result<RunReport, Error> {
        self.enter(Phase::Planning);
        let groups = match self.store.load()? {
            Some(groups) => groups,
            None => {
                info!(
                    "No actions loaded from {}. Run in analyze, auto, select, or json mode first.",
                    self.store.path().display()
                );
                return Ok(RunReport::new(Mode::Replay, ActionGroups::new()));
            }
        };
        info!("Replaying actions from {}...", self.store.path().display());

        self.enter(Phase::Executing);
        let mut run = self.execution();
        for (category, actions) in groups.iter() {
            for action in actions {
                run.run_stored(category, action);
            }
        }

        let mut report = RunReport::new(Mode::Replay, groups);
        report.outcomes = run.outcomes;
        Ok(report)
    }

    /// Save what was actually dispatched so `replay` can repeat it.
    fn finish(&mut self, mode: Mode, plan: ActionGroups, run: Execution<'_>) -> RunReport {
        self.enter(Phase::Persisting);
        let mut report = RunReport::new(mode, plan);
        match self.store.save(&run.dispatched) {
            Ok(()) => {
                self.reporter.on_snapshot_saved(self.store.path());
                report.snapshot = Some(self.store.path().to_path_buf());
            }
            Err(e) => {
                error!("Could not save actions: {}", e);
                report.persist_error = Some(e.to_string());
            }
        }
        report.outcomes = run.outcomes;
        report
    }
}

enum AutoPolicy {
    Delete,
    Proposed,
    Untouched,
}

fn accept(choice: Choice, offered: &[Choice]) -> Choice {
    if offered.contains(&choice) {
        choice
    } else {
        warn!("Choice '{}' was not offered, skipping", choice);
        Choice::Skip
    }
}

/// The executing half of a run: owns the run state, dispatches actions and
/// keeps the result stream.
struct Execution<'r> {
    state: RunState,
    primary: PathBuf,
    dispatched: ActionGroups,
    outcomes: Vec<(Category, Outcome)>,
    reporter: &'r dyn ProgressReporter,
}

impl<'r> Execution<'r> {
    fn new(reporter: &'r dyn ProgressReporter, primary: &Path) -> Self {
        Self {
            state: RunState::new(),
            primary: primary.to_path_buf(),
            dispatched: ActionGroups::new(),
            outcomes: Vec::new(),
            reporter,
        }
    }

    fn prepare(&self, category: Category, action: &Action) -> Rebound {
        analysis::rebind(category, action, &self.state, &self.primary)
    }

    /// Rebind against the current state, then dispatch.
    fn run(&mut self, category: Category, action: &Action) {
        match self.prepare(category, action) {
            Rebound::Ready(ready) => self.dispatch(category, ready),
            Rebound::Deleted(path) => self.skip(category, path, "already deleted in this run"),
        }
    }

    /// Replay: follow renames and deletions, keep the stored destination.
    fn run_stored(&mut self, category: Category, action: &Action) {
        match analysis::resolve_target(action, &self.state) {
            Rebound::Ready(ready) => self.dispatch(category, ready),
            Rebound::Deleted(path) => self.skip(category, path, "already deleted in this run"),
        }
    }

    fn dispatch(&mut self, category: Category, action: Action) {
        let outcome = executor::execute(&action);
        if outcome.is_success() {
            match &action.kind {
                ActionKind::Delete => self.state.record_delete(&action.path),
                ActionKind::Move { new_path } | ActionKind::Rename { new_path } => {
                    self.state.record_rename(&action.path, new_path)
                }
                ActionKind::Chmod { .. } | ActionKind::Keep => {}
            }
        }
        self.dispatched.push(category, action);
        self.report(category, outcome);
    }

    fn skip(&mut self, category: Category, path: PathBuf, reason: &str) {
        self.report(
            category,
            Outcome::Skipped {
                path,
                reason: reason.to_string(),
            },
        );
    }

    fn report(&mut self, category: Category, outcome: Outcome) {
        self.reporter.on_outcome(category, &outcome);
        self.outcomes.push((category, outcome));
    }
}
