use std::time::Duration;
use ratatui::prelude::*;
use tachyonfx::{fx, Effect, EffectTimer, Interpolation};

/// Manages visual effects for the application
pub struct EffectManager {
    /// Startup fade-in effect
    startup_fx: Option<Effect>,
    /// Flash over the body after a reload or save
    status_fx: Option<Effect>,
}

impl Default for EffectManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectManager {
    pub fn new() -> Self {
        Self {
            startup_fx: Some(Self::create_startup_effect()),
            status_fx: None,
        }
    }

    /// Manager with no pending effects
    pub fn disabled() -> Self {
        Self {
            startup_fx: None,
            status_fx: None,
        }
    }

    /// Create the initial fade-in effect for app startup
    fn create_startup_effect() -> Effect {
        fx::fade_from(
            (0, 0, 0),  // fg color as tuple
            (0, 0, 0),  // bg color as tuple
            EffectTimer::from_ms(800, Interpolation::QuadOut),
        )
    }

    /// Create a color flash effect for reload/save results
    fn create_status_flash_effect(success: bool) -> Effect {
        let color = if success {
            (80, 200, 120)  // Green for success
        } else {
            (200, 80, 80)   // Red for failure
        };
        fx::fade_from(
            color,
            (0, 0, 0),
            EffectTimer::from_ms(400, Interpolation::QuadOut),
        )
    }

    /// Trigger the status flash
    pub fn trigger_status(&mut self, success: bool) {
        self.status_fx = Some(Self::create_status_flash_effect(success));
    }

    /// Process the startup effect (whole screen)
    pub fn process(&mut self, elapsed: Duration, buf: &mut Buffer, area: Rect) {
        if let Some(ref mut fx) = self.startup_fx {
            fx.process(elapsed.into(), buf, area);
            if fx.done() {
                self.startup_fx = None;
            }
        }
    }

    /// Process status flash effects (body area)
    pub fn process_status(&mut self, elapsed: Duration, buf: &mut Buffer, area: Rect) {
        if let Some(ref mut fx) = self.status_fx {
            fx.process(elapsed.into(), buf, area);
            if fx.done() {
                self.status_fx = None;
            }
        }
    }

    /// True while any effect still needs frames
    pub fn is_animating(&self) -> bool {
        self.startup_fx.is_some() || self.status_fx.is_some()
    }
}
