//! Hooking and polling loop.
//!
//! A [`Tracker`] owns the process connection and the [`RunState`]. Rehook
//! attempts run on a slow cadence and walk discovery one stage further each
//! time; ticks run on a fast cadence and feed snapshots to the aggregator.

mod schedule;
mod shutdown;

pub use schedule::{Schedule, Task};
pub use shutdown::ShutdownSignal;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::export::SessionManager;
use crate::game::{BasePointer, Hook, Snapshot, discover_title_offset, locate_base_pointer};
use crate::process::{ProcessInfo, ProcessProvider};
use crate::signature::CompiledSignature;
use crate::stats::{AttemptStat, HookStatus, RunState};

pub struct Tracker<P: ProcessProvider> {
    provider: P,
    signature: CompiledSignature,
    hook_interval: Duration,
    tick_interval: Duration,
    process: Option<P::Process>,
    base: Option<BasePointer>,
    hook: Option<Hook>,
    state: RunState,
    sessions: Option<SessionManager>,
    /// Table contents at the last session write
    saved: Vec<AttemptStat>,
}

impl<P: ProcessProvider> Tracker<P> {
    /// Create a tracker; fails if the configured signature does not compile.
    pub fn new(provider: P, config: &Config) -> Result<Self> {
        let signature = config.signature.compile()?;
        let sessions = config
            .save_sessions
            .then(|| SessionManager::new(&config.session_dir));

        Ok(Self {
            provider,
            signature,
            hook_interval: config.hook_interval(),
            tick_interval: config.tick_interval(),
            process: None,
            base: None,
            hook: None,
            state: RunState::new(),
            sessions,
            saved: Vec::new(),
        })
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut RunState {
        &mut self.state
    }

    pub fn process(&self) -> Option<&P::Process> {
        self.process.as_ref()
    }

    pub fn hook(&self) -> Option<&Hook> {
        self.hook.as_ref()
    }

    pub fn is_hooked(&self) -> bool {
        self.hook.is_some()
    }

    /// Advance discovery by as many stages as currently succeed.
    ///
    /// Stages: attach to the process, locate the base pointer by signature,
    /// find the title offset. Completed stages are kept across calls; losing
    /// the process discards all of them. Returns the resulting status.
    pub fn rehook(&mut self) -> HookStatus {
        if let Some(process) = &self.process
            && !process.is_alive()
        {
            self.on_disconnect();
        }

        if self.process.is_none() {
            match self.provider.find_process() {
                Ok(process) => {
                    info!("Found process (PID: {})", process.pid());
                    self.process = Some(process);
                }
                Err(e) => {
                    debug!("Process not available: {}", e);
                    self.state.set_status(HookStatus::NotHooked);
                    return self.state.status();
                }
            }
        }

        let Some(process) = &self.process else {
            return self.state.status();
        };

        if self.base.is_none() {
            match locate_base_pointer(process, &self.signature) {
                Ok(base) => {
                    info!(
                        "Signature at 0x{:08X}, base pointer 0x{:08X}",
                        base.signature_address, base.address
                    );
                    self.base = Some(base);
                }
                Err(e) => {
                    debug!("Base pointer lookup failed: {}", e);
                    self.state.set_status(HookStatus::SignatureNotFound);
                    return self.state.status();
                }
            }
        }

        if self.hook.is_none()
            && let Some(base) = self.base
        {
            match discover_title_offset(process, base.address) {
                Some(offset) => {
                    info!("Title found at offset 0x{:X}", offset);
                    self.hook = Some(Hook::new(base, offset));
                }
                None => {
                    debug!("Title offset not found");
                    self.state.set_status(HookStatus::TitleNotFound);
                    return self.state.status();
                }
            }
        }

        self.state.set_status(HookStatus::Hooked);
        self.state.status()
    }

    /// Read the current snapshot, if hooked and every field resolves.
    pub fn snapshot(&self) -> Option<Snapshot> {
        let process = self.process.as_ref()?;
        self.hook.as_ref()?.snapshot(process)
    }

    /// Poll once. Returns `true` if a snapshot was applied.
    pub fn tick(&mut self) -> bool {
        if !self.is_hooked() {
            return false;
        }

        match self.snapshot() {
            Some(snapshot) => {
                self.state.update(&snapshot);
                true
            }
            None => {
                debug!("Skipping tick: snapshot unreadable");
                false
            }
        }
    }

    /// Run rehook and tick on their cadences until `shutdown` fires, then
    /// write a final session.
    pub fn run(&mut self, shutdown: &ShutdownSignal) {
        info!("Starting tracker loop...");
        let mut schedule = Schedule::new(self.hook_interval, self.tick_interval, Instant::now());

        while !shutdown.is_shutdown() {
            let now = Instant::now();
            match schedule.due(now) {
                Some(Task::Rehook) => {
                    self.rehook();
                }
                Some(Task::Tick) => {
                    self.tick();
                }
                None => {
                    if shutdown.wait(schedule.until_next(now)) {
                        break;
                    }
                }
            }
        }

        info!("Shutdown requested, stopping tracker loop");
        self.save_session();
    }

    /// Write the active table to a new session file if it changed since the
    /// last write. Returns the written path.
    pub fn save_session(&mut self) -> Option<PathBuf> {
        let sessions = self.sessions.as_mut()?;
        let stats = self.state.stats();
        if stats == self.saved.as_slice() {
            return None;
        }

        match sessions.save(stats) {
            Ok(path) => {
                self.saved = stats.to_vec();
                path
            }
            Err(e) => {
                warn!("Failed to save session: {}", e);
                None
            }
        }
    }

    fn on_disconnect(&mut self) {
        if let Some(process) = self.process.take() {
            info!("Process {} exited", process.pid());
        }
        self.base = None;
        self.hook = None;
        self.save_session();
        self.state.set_status(HookStatus::NotHooked);
    }
}
