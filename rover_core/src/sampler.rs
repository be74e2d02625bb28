//! Background range sampling.
//!
//! One thread owns every range sensor, folds readings into per-direction
//! hazard flags and publishes them through the shared hazard word. The
//! thread is stopped and joined when the `HazardSampler` is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use rover_traits::RangeSensor;
use rover_traits::clock::Clock;

use crate::config::SamplerCfg;
use crate::hazard::{Facing, HazardMonitor, SharedHazards};

pub type BoxedRangeSensor = Box<dyn RangeSensor + Send>;

pub struct HazardSampler {
    last_ok: Arc<AtomicU64>,
    epoch: Instant,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl HazardSampler {
    pub fn spawn<C: Clock + Send + 'static>(
        sensors: Vec<(Facing, BoxedRangeSensor)>,
        cfg: SamplerCfg,
        hazards: SharedHazards,
        clock: C,
    ) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let last_ok = Arc::new(AtomicU64::new(0));
        let last_ok_clone = last_ok.clone();
        let period = crate::util::period(cfg.sample_hz);
        let epoch = clock.now();

        let mut sensors: Vec<(HazardMonitor, BoxedRangeSensor)> = sensors
            .into_iter()
            .map(|(facing, s)| (HazardMonitor::new(facing, cfg.threshold_cm), s))
            .collect();

        let join_handle = std::thread::spawn(move || {
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("hazard sampler received shutdown signal");
                    break;
                }

                let mut any_ok = false;
                for (monitor, sensor) in &mut sensors {
                    let reading = sensor.read_cm(cfg.read_timeout);
                    any_ok |= matches!(reading, Ok(cm) if cm.is_finite() && cm >= 0.0);
                    let blocked = monitor.observe(reading);
                    hazards.set(monitor.facing(), blocked);
                }
                if any_ok {
                    last_ok_clone.store(clock.ms_since(epoch), Ordering::Relaxed);
                }

                if shutdown_clone.load(Ordering::Relaxed) {
                    break;
                }
                clock.sleep(period);
            }
            tracing::trace!("hazard sampler exiting cleanly");
        });

        Self {
            last_ok,
            epoch,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    /// Milliseconds since the last valid sample, measured at `now_ms`
    /// (relative to [`epoch`](Self::epoch)).
    pub fn stalled_for(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_ok.load(Ordering::Relaxed))
    }

    pub fn stalled_for_now(&self) -> u64 {
        let ms = Instant::now()
            .saturating_duration_since(self.epoch)
            .as_millis()
            .min(u128::from(u64::MAX)) as u64;
        self.stalled_for(ms)
    }
}

impl Drop for HazardSampler {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // Exits after the in-flight read, bounded by the read timeout.
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => tracing::trace!("hazard sampler joined"),
                Err(e) => tracing::warn!(?e, "hazard sampler panicked during shutdown"),
            }
        }
    }
}
