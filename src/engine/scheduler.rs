//! Frame scheduler.
//!
//! Each registration pairs one experiment with one renderer. On every display
//! refresh the scheduler advances each running experiment by the steps its
//! clock plans, lets the Jidoka guard inspect it, and hands the new frame to
//! the renderer. Registrations are independent and run in id order.
//!
//! Configuration sent while a registration is paused is held back and applied
//! on the next resume or reset.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ExperimentConfig, SchedulerConfig};
use crate::demos::{kind_mismatch, Experiment};
use crate::engine::clock::SimClock;
use crate::engine::jidoka::JidokaGuard;
use crate::error::{SimError, SimResult};
use crate::renderers::Renderer;

/// Handle returned by [`FrameScheduler::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegistrationId(u64);

impl RegistrationId {
    /// Raw id value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Registration {
    experiment: Box<dyn Experiment>,
    renderer: Box<dyn Renderer>,
    clock: SimClock,
    guard: JidokaGuard,
    paused: bool,
    pending: Option<ExperimentConfig>,
}

impl Registration {
    fn apply_pending(&mut self) -> SimResult<()> {
        if let Some(config) = self.pending.take() {
            self.experiment.configure(config)?;
        }
        Ok(())
    }

    fn draw(&mut self) {
        let frame = self.experiment.render();
        self.renderer.render(&frame);
    }
}

/// Frame-rate sampler for the periodic FPS log line.
#[derive(Debug, Clone, Default)]
struct FpsMeter {
    frames: u32,
    elapsed: f64,
}

impl FpsMeter {
    fn sample(&mut self, elapsed: f64, window: u32) -> Option<f64> {
        if window == 0 {
            return None;
        }
        self.frames += 1;
        self.elapsed += elapsed;
        if self.frames < window {
            return None;
        }
        let fps = if self.elapsed > 0.0 {
            f64::from(self.frames) / self.elapsed
        } else {
            0.0
        };
        self.frames = 0;
        self.elapsed = 0.0;
        Some(fps)
    }
}

/// Summary of one refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshReport {
    /// Experiments that were advanced and rendered.
    pub rendered: usize,
    /// Total integration steps taken.
    pub steps: u64,
    /// Experiments reset by the Jidoka guard.
    pub recoveries: usize,
}

/// Drives registered experiments once per display refresh.
pub struct FrameScheduler {
    config: SchedulerConfig,
    registrations: BTreeMap<RegistrationId, Registration>,
    next_id: u64,
    fps: FpsMeter,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl std::fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("config", &self.config)
            .field("registrations", &self.registrations.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl FrameScheduler {
    /// Create a scheduler with the given settings.
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            registrations: BTreeMap::new(),
            next_id: 1,
            fps: FpsMeter::default(),
        }
    }

    /// Scheduler settings.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Register an experiment and its renderer. The initial state is
    /// rendered immediately.
    pub fn register(
        &mut self,
        experiment: Box<dyn Experiment>,
        renderer: Box<dyn Renderer>,
    ) -> RegistrationId {
        let id = RegistrationId(self.next_id);
        self.next_id += 1;

        log::debug!("register {id}: {}", experiment.name());
        let mut registration = Registration {
            experiment,
            renderer,
            clock: SimClock::from_config(&self.config),
            guard: JidokaGuard::new(),
            paused: false,
            pending: None,
        };
        registration.draw();
        self.registrations.insert(id, registration);
        id
    }

    /// Remove a registration and return its experiment. The renderer is
    /// dropped and never invoked again.
    ///
    /// # Errors
    ///
    /// Returns `SimError::UnknownRegistration` if `id` is not registered.
    pub fn unregister(&mut self, id: RegistrationId) -> SimResult<Box<dyn Experiment>> {
        let registration = self
            .registrations
            .remove(&id)
            .ok_or(SimError::UnknownRegistration(id.0))?;
        log::debug!("unregister {id}: {}", registration.experiment.name());
        Ok(registration.experiment)
    }

    /// Whether `id` is registered.
    #[must_use]
    pub fn is_registered(&self, id: RegistrationId) -> bool {
        self.registrations.contains_key(&id)
    }

    /// Number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Stop advancing `id`. State is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `SimError::UnknownRegistration` if `id` is not registered.
    pub fn pause(&mut self, id: RegistrationId) -> SimResult<()> {
        let registration = self.get_mut(id)?;
        if !registration.paused {
            registration.paused = true;
            log::info!("pause {id}: {}", registration.experiment.name());
        }
        Ok(())
    }

    /// Resume `id`, applying any configuration sent while paused.
    ///
    /// # Errors
    ///
    /// Returns `SimError::UnknownRegistration` if `id` is not registered.
    pub fn resume(&mut self, id: RegistrationId) -> SimResult<()> {
        let registration = self.get_mut(id)?;
        registration.apply_pending()?;
        if registration.paused {
            registration.paused = false;
            log::info!("resume {id}: {}", registration.experiment.name());
        }
        Ok(())
    }

    /// Whether `id` is paused.
    ///
    /// # Errors
    ///
    /// Returns `SimError::UnknownRegistration` if `id` is not registered.
    pub fn is_paused(&self, id: RegistrationId) -> SimResult<bool> {
        Ok(self.get(id)?.paused)
    }

    /// Send a configuration snapshot to `id`.
    ///
    /// A running experiment applies it at once; a paused one holds it until
    /// the next resume or reset. A later snapshot replaces an earlier
    /// pending one.
    ///
    /// # Errors
    ///
    /// Returns `SimError::UnknownRegistration` if `id` is not registered, or
    /// `SimError::KindMismatch` if the snapshot is for another model.
    pub fn configure(&mut self, id: RegistrationId, config: ExperimentConfig) -> SimResult<()> {
        let registration = self.get_mut(id)?;
        let kind = registration.experiment.kind();
        if config.kind() != kind {
            return Err(kind_mismatch(kind, &config));
        }
        if registration.paused {
            registration.pending = Some(config);
            Ok(())
        } else {
            registration.experiment.configure(config)
        }
    }

    /// Configuration `id` will run with: the pending snapshot if paused with
    /// edits, otherwise the experiment's current one.
    ///
    /// # Errors
    ///
    /// Returns `SimError::UnknownRegistration` if `id` is not registered.
    pub fn effective_config(&self, id: RegistrationId) -> SimResult<ExperimentConfig> {
        let registration = self.get(id)?;
        Ok(registration
            .pending
            .clone()
            .unwrap_or_else(|| registration.experiment.config()))
    }

    /// Discard the state of `id` and rebuild it from its current
    /// configuration, including edits made while paused. The fresh state is
    /// rendered; the paused flag is kept.
    ///
    /// # Errors
    ///
    /// Returns `SimError::UnknownRegistration` if `id` is not registered.
    pub fn reset(&mut self, id: RegistrationId) -> SimResult<()> {
        let registration = self.get_mut(id)?;
        registration.apply_pending()?;
        log::debug!(
            "reset {id}: {} after {} steps at t={}",
            registration.experiment.name(),
            registration.clock.step_count(),
            registration.clock.current_time()
        );
        registration.experiment.reset();
        registration.clock.reset();
        registration.guard.reset();
        registration.draw();
        Ok(())
    }

    /// Run one display refresh that arrived `elapsed` after the previous one.
    pub fn on_refresh(&mut self, elapsed: Duration) -> RefreshReport {
        let secs = elapsed.as_secs_f64();
        let mut report = RefreshReport::default();

        for registration in self.registrations.values_mut() {
            if registration.paused {
                continue;
            }
            let plan = registration.clock.plan_frame(secs);
            for _ in 0..plan.substeps {
                registration.experiment.step(plan.dt);
                registration.clock.advance(plan.dt);
                report.steps += 1;
                if registration.guard.inspect(registration.experiment.as_mut()) {
                    registration.clock.reset();
                    report.recoveries += 1;
                    break;
                }
            }
            registration.draw();
            report.rendered += 1;
        }

        if let Some(fps) = self.fps.sample(secs, self.config.fps_window) {
            log::info!("FPS: {fps:.1} ({} experiments)", self.registrations.len());
        }
        report
    }

    /// Jidoka recoveries performed for `id` since its last reset.
    ///
    /// # Errors
    ///
    /// Returns `SimError::UnknownRegistration` if `id` is not registered.
    pub fn recoveries(&self, id: RegistrationId) -> SimResult<u64> {
        Ok(self.get(id)?.guard.recoveries())
    }

    /// Fail if the Jidoka guard has recovered `id` since its last reset.
    ///
    /// Headless runs use this to stop on the first numerical fault instead
    /// of continuing from the recovered state.
    ///
    /// # Errors
    ///
    /// Returns `SimError::UnknownRegistration` if `id` is not registered, or
    /// `SimError::NonFiniteValue` describing the most recent violation.
    pub fn check_health(&self, id: RegistrationId) -> SimResult<()> {
        match self.get(id)?.guard.last_violation() {
            Some(violation) => Err(violation.clone().into()),
            None => Ok(()),
        }
    }

    /// Borrow the experiment behind `id`.
    ///
    /// # Errors
    ///
    /// Returns `SimError::UnknownRegistration` if `id` is not registered.
    pub fn experiment(&self, id: RegistrationId) -> SimResult<&dyn Experiment> {
        Ok(self.get(id)?.experiment.as_ref())
    }

    fn get(&self, id: RegistrationId) -> SimResult<&Registration> {
        self.registrations
            .get(&id)
            .ok_or(SimError::UnknownRegistration(id.0))
    }

    fn get_mut(&mut self, id: RegistrationId) -> SimResult<&mut Registration> {
        self.registrations
            .get_mut(&id)
            .ok_or(SimError::UnknownRegistration(id.0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::demos::{build, PendulumConfig, WaveConfig};
    use crate::renderers::RecordingRenderer;

    const FRAME: Duration = Duration::from_nanos(16_666_667);

    fn pendulum_config() -> SchedulerConfig {
        SchedulerConfig::default().with_nominal_dt(1.0 / 60.0)
    }

    fn register_pendulum(scheduler: &mut FrameScheduler) -> (RegistrationId, RecordingRenderer) {
        let recorder = RecordingRenderer::new();
        let id = scheduler.register(
            build(ExperimentConfig::Pendulum(PendulumConfig::default())),
            Box::new(recorder.clone()),
        );
        (id, recorder)
    }

    #[test]
    fn test_register_renders_initial_state() {
        let mut scheduler = FrameScheduler::default();
        let (id, recorder) = register_pendulum(&mut scheduler);
        assert!(scheduler.is_registered(id));
        assert_eq!(recorder.len(), 1);
        assert!(recorder.last().unwrap().time.abs() < f64::EPSILON);
    }

    #[test]
    fn test_refresh_steps_and_renders() {
        let mut scheduler = FrameScheduler::new(pendulum_config());
        let (id, recorder) = register_pendulum(&mut scheduler);
        for _ in 0..10 {
            let report = scheduler.on_refresh(FRAME);
            assert_eq!(report.rendered, 1);
        }
        assert_eq!(recorder.len(), 11);
        assert!(scheduler.experiment(id).unwrap().time() > 0.1);
    }

    #[test]
    fn test_pause_freezes_state_and_rendering() {
        let mut scheduler = FrameScheduler::new(pendulum_config());
        let (id, recorder) = register_pendulum(&mut scheduler);
        scheduler.on_refresh(FRAME);
        scheduler.pause(id).unwrap();
        let frozen = scheduler.experiment(id).unwrap().render();
        let frames = recorder.len();

        for _ in 0..20 {
            let report = scheduler.on_refresh(FRAME);
            assert_eq!(report.rendered, 0);
        }
        assert_eq!(recorder.len(), frames);
        assert_eq!(scheduler.experiment(id).unwrap().render(), frozen);

        scheduler.resume(id).unwrap();
        scheduler.on_refresh(FRAME);
        assert_eq!(recorder.len(), frames + 1);
    }

    #[test]
    fn test_edits_while_paused_apply_on_resume() {
        let mut scheduler = FrameScheduler::new(pendulum_config());
        let (id, _recorder) = register_pendulum(&mut scheduler);
        scheduler.pause(id).unwrap();

        let edited = ExperimentConfig::Pendulum(PendulumConfig::default().with_damping(0.9));
        scheduler.configure(id, edited.clone()).unwrap();
        assert_ne!(scheduler.experiment(id).unwrap().config(), edited);
        assert_eq!(scheduler.effective_config(id).unwrap(), edited);

        scheduler.resume(id).unwrap();
        assert_eq!(scheduler.experiment(id).unwrap().config(), edited);
    }

    #[test]
    fn test_reset_uses_current_configuration() {
        let mut scheduler = FrameScheduler::new(pendulum_config());
        let (id, recorder) = register_pendulum(&mut scheduler);
        for _ in 0..30 {
            scheduler.on_refresh(FRAME);
        }
        scheduler.pause(id).unwrap();
        let edited = ExperimentConfig::Pendulum(PendulumConfig::default().with_initial_angle_deg(5.0));
        scheduler.configure(id, edited.clone()).unwrap();
        scheduler.reset(id).unwrap();

        assert_eq!(scheduler.experiment(id).unwrap().config(), edited);
        assert!(scheduler.experiment(id).unwrap().time().abs() < f64::EPSILON);
        assert!(scheduler.is_paused(id).unwrap());
        assert!(recorder.last().unwrap().time.abs() < f64::EPSILON);
    }

    #[test]
    fn test_reset_twice_is_idempotent() {
        let mut scheduler = FrameScheduler::new(pendulum_config());
        let (id, recorder) = register_pendulum(&mut scheduler);
        for _ in 0..30 {
            scheduler.on_refresh(FRAME);
        }
        scheduler.reset(id).unwrap();
        let first = recorder.last().unwrap();
        scheduler.reset(id).unwrap();
        let second = recorder.last().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unregister_stops_rendering() {
        let mut scheduler = FrameScheduler::new(pendulum_config());
        let (id, recorder) = register_pendulum(&mut scheduler);
        scheduler.on_refresh(FRAME);
        let experiment = scheduler.unregister(id).unwrap();
        let time = experiment.time();
        let frames = recorder.len();

        for _ in 0..10 {
            scheduler.on_refresh(FRAME);
        }
        assert_eq!(recorder.len(), frames);
        assert!((experiment.time() - time).abs() < f64::EPSILON);
        assert!(scheduler.is_empty());

        assert!(matches!(
            scheduler.unregister(id),
            Err(SimError::UnknownRegistration(_))
        ));
        assert!(scheduler.pause(id).is_err());
    }

    #[test]
    fn test_registrations_are_independent() {
        let mut scheduler = FrameScheduler::new(pendulum_config());
        let (a, _) = register_pendulum(&mut scheduler);
        let (b, _) = register_pendulum(&mut scheduler);
        assert_ne!(a, b);
        scheduler.pause(a).unwrap();
        for _ in 0..10 {
            scheduler.on_refresh(FRAME);
        }
        assert!(scheduler.experiment(a).unwrap().time().abs() < f64::EPSILON);
        assert!(scheduler.experiment(b).unwrap().time() > 0.0);
    }

    #[test]
    fn test_configure_rejects_other_kind() {
        let mut scheduler = FrameScheduler::default();
        let (id, _) = register_pendulum(&mut scheduler);
        let err = scheduler
            .configure(id, ExperimentConfig::Wave(WaveConfig::default()))
            .unwrap_err();
        assert!(matches!(err, SimError::KindMismatch { .. }));
    }

    #[test]
    fn test_wall_mode_one_step_per_refresh() {
        let mut scheduler = FrameScheduler::new(SchedulerConfig::default().wall_clock());
        let (_, _) = register_pendulum(&mut scheduler);
        let report = scheduler.on_refresh(Duration::from_millis(7));
        assert_eq!(report.steps, 1);
        let report = scheduler.on_refresh(Duration::from_secs(1));
        assert_eq!(report.steps, 1);
    }

    #[test]
    fn test_fps_meter_window() {
        let mut meter = FpsMeter::default();
        assert!(meter.sample(0.5, 2).is_none());
        let fps = meter.sample(0.5, 2).unwrap();
        assert!((fps - 2.0).abs() < 1e-12);
        assert!(meter.sample(0.5, 0).is_none());
    }
}
