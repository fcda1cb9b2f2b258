//! Session controller: catalog selection, the active boundary and the fault log.

use std::time::Duration;

use crate::{
    Action, Catalog, Config, CrashBoundary, FaultRecord, HarnessError, HarnessResult, Input,
    Instance, SessionState, TimelineEntry, View,
};

#[derive(Debug)]
pub struct SessionController {
    config: Config,
    catalog: &'static Catalog,
    active: Option<CrashBoundary>,
    faults: Vec<FaultRecord>,
}

impl SessionController {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            catalog: Catalog::builtin(),
            active: None,
            faults: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    /// Starts a fresh instance of `id`, discarding whatever was active.
    /// Unknown ids fail before any state is created.
    pub fn select(&mut self, id: &str) -> HarnessResult<()> {
        let record = self.catalog.get(id)?;
        self.discard_active();
        tracing::info!(scenario = record.id, category = %record.category, "scenario selected");
        let boundary = CrashBoundary::launch(record, &self.config);
        if let Some(fault) = boundary.fault() {
            self.faults.push(fault.clone());
        }
        self.active = Some(boundary);
        Ok(())
    }

    pub fn trigger(&mut self, action: Action) -> HarnessResult<()> {
        self.guarded(|inst| inst.trigger(action)).map(|_| ())
    }

    pub fn input(&mut self, input: Input) -> HarnessResult<()> {
        self.guarded(|inst| inst.input(input)).map(|_| ())
    }

    /// Advances the active instance's clock. A faulted instance has no
    /// timers left, so time passing there is a no-op.
    pub fn advance(&mut self, d: Duration) -> HarnessResult<usize> {
        match &self.active {
            None => Err(HarnessError::NoActiveScenario),
            Some(boundary) if boundary.is_faulted() => Ok(0),
            Some(_) => Ok(self.guarded(|inst| inst.advance(d))?.unwrap_or(0)),
        }
    }

    /// Always succeeds; discards the instance and its state and returns the
    /// discarded instance's timeline. Empty when nothing was active.
    pub fn return_to_catalog(&mut self) -> Vec<TimelineEntry> {
        self.discard_active()
    }

    pub fn view(&self) -> View {
        match &self.active {
            None => View::catalog(self.catalog),
            Some(CrashBoundary::Running(instance)) => View::running(instance.snapshot()),
            Some(CrashBoundary::Faulted { fault, .. }) => View::faulted(fault),
        }
    }

    pub fn instance(&self) -> Option<&Instance> {
        self.active.as_ref().and_then(CrashBoundary::instance)
    }

    pub fn state(&self) -> Option<&SessionState> {
        self.instance().map(Instance::state)
    }

    pub fn is_faulted(&self) -> bool {
        self.active.as_ref().is_some_and(CrashBoundary::is_faulted)
    }

    pub fn fault_log(&self) -> &[FaultRecord] {
        &self.faults
    }

    pub fn timeline(&self) -> &[TimelineEntry] {
        self.active.as_ref().map(CrashBoundary::timeline).unwrap_or(&[])
    }

    fn guarded<R>(&mut self, f: impl FnOnce(&mut Instance) -> R) -> HarnessResult<Option<R>> {
        let boundary = self.active.as_mut().ok_or(HarnessError::NoActiveScenario)?;
        let out = boundary.guard(f)?;
        if out.is_none()
            && let Some(fault) = boundary.fault()
        {
            self.faults.push(fault.clone());
        }
        Ok(out)
    }

    fn discard_active(&mut self) -> Vec<TimelineEntry> {
        self.active.take().map(CrashBoundary::close).unwrap_or_default()
    }
}
