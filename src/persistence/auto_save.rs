//! Debounced background save scheduling.

use std::time::Duration;
use web_time::Instant;

use crate::constants::{AUTOSAVE_DEBOUNCE_SECS, AUTOSAVE_MIN_INTERVAL_SECS};

/// Decides when a dirty session should be written to storage.
///
/// A save is due once the session has been quiet for `debounce_delay` and at
/// least `save_interval` has passed since the previous attempt. Time is passed
/// in explicitly by the `*_at` methods; the plain variants use `Instant::now()`.
#[derive(Debug)]
pub struct AutoSaveManager {
    save_interval: Duration,
    debounce_delay: Duration,
    last_attempt: Option<Instant>,
    last_change: Option<Instant>,
    enabled: bool,
    dirty: bool,
}

impl Default for AutoSaveManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoSaveManager {
    pub fn new() -> Self {
        Self {
            save_interval: Duration::from_secs_f64(AUTOSAVE_MIN_INTERVAL_SECS),
            debounce_delay: Duration::from_secs_f64(AUTOSAVE_DEBOUNCE_SECS),
            last_attempt: None,
            last_change: None,
            enabled: true,
            dirty: false,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    pub fn with_save_interval(mut self, interval: Duration) -> Self {
        self.save_interval = interval;
        self
    }

    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    pub fn mark_dirty(&mut self) {
        self.mark_dirty_at(Instant::now());
    }

    pub fn mark_dirty_at(&mut self, now: Instant) {
        self.dirty = true;
        self.last_change = Some(now);
        log::trace!("Auto-save: dirty");
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn should_save(&self) -> bool {
        self.should_save_at(Instant::now())
    }

    pub fn should_save_at(&self, now: Instant) -> bool {
        if !self.enabled || !self.dirty {
            return false;
        }
        let Some(last_change) = self.last_change else {
            return false;
        };
        if now.saturating_duration_since(last_change) < self.debounce_delay {
            return false;
        }
        match self.last_attempt {
            Some(last) => now.saturating_duration_since(last) >= self.save_interval,
            None => true,
        }
    }

    pub fn mark_saved(&mut self) {
        self.mark_saved_at(Instant::now());
    }

    pub fn mark_saved_at(&mut self, now: Instant) {
        self.last_attempt = Some(now);
        self.dirty = false;
        self.last_change = None;
        log::trace!("Auto-save: saved");
    }

    /// Record a failed write. The session stays dirty and is retried after the interval.
    pub fn mark_save_failed_at(&mut self, now: Instant) {
        self.last_attempt = Some(now);
        log::trace!("Auto-save: failed, will retry");
    }

    pub fn mark_save_failed(&mut self) {
        self.mark_save_failed_at(Instant::now());
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        log::debug!("Auto-save: enabled = {}", enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Forget pending changes, e.g. when a new image replaces the session.
    pub fn reset(&mut self) {
        self.dirty = false;
        self.last_change = None;
        self.last_attempt = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> AutoSaveManager {
        AutoSaveManager::new()
            .with_debounce_delay(Duration::from_secs(1))
            .with_save_interval(Duration::from_secs(5))
    }

    #[test]
    fn test_clean_manager_never_saves() {
        let m = manager();
        assert!(!m.is_dirty());
        assert!(!m.should_save_at(Instant::now() + Duration::from_secs(100)));
    }

    #[test]
    fn test_debounce_delays_first_save() {
        let t0 = Instant::now();
        let mut m = manager();
        m.mark_dirty_at(t0);
        assert!(!m.should_save_at(t0 + Duration::from_millis(500)));
        assert!(m.should_save_at(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn test_new_change_restarts_debounce() {
        let t0 = Instant::now();
        let mut m = manager();
        m.mark_dirty_at(t0);
        m.mark_dirty_at(t0 + Duration::from_millis(900));
        assert!(!m.should_save_at(t0 + Duration::from_millis(1500)));
        assert!(m.should_save_at(t0 + Duration::from_millis(1900)));
    }

    #[test]
    fn test_min_interval_between_saves() {
        let t0 = Instant::now();
        let mut m = manager();
        m.mark_dirty_at(t0);
        m.mark_saved_at(t0 + Duration::from_secs(1));
        assert!(!m.is_dirty());

        m.mark_dirty_at(t0 + Duration::from_secs(2));
        assert!(!m.should_save_at(t0 + Duration::from_secs(4)));
        assert!(m.should_save_at(t0 + Duration::from_secs(6)));
    }

    #[test]
    fn test_failed_save_stays_dirty() {
        let t0 = Instant::now();
        let mut m = manager();
        m.mark_dirty_at(t0);
        m.mark_save_failed_at(t0 + Duration::from_secs(1));
        assert!(m.is_dirty());
        assert!(!m.should_save_at(t0 + Duration::from_secs(2)));
        assert!(m.should_save_at(t0 + Duration::from_secs(6)));
    }

    #[test]
    fn test_disabled_and_reset() {
        let t0 = Instant::now();
        let mut m = AutoSaveManager::disabled().with_debounce_delay(Duration::ZERO);
        m.mark_dirty_at(t0);
        assert!(!m.should_save_at(t0));
        m.set_enabled(true);
        assert!(m.should_save_at(t0));
        m.reset();
        assert!(!m.should_save_at(t0));
    }
}
