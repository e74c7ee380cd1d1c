//! Process-wide wizard styles.
//!
//! Hosts call `init()` once at startup to install the shake animation and the
//! invalid-field style. Calling it again is harmless. Until it has run, shake
//! offsets are always zero.

use std::sync::OnceLock;
use std::time::Duration;

use tracing::debug;

/// Stylesheet for web hosts
pub const STYLESHEET: &str = r#"
@keyframes shake {
    0%, 100% { transform: translateX(0); }
    25% { transform: translateX(-8px); }
    75% { transform: translateX(8px); }
}
.is-invalid {
    border-color: var(--danger) !important;
    box-shadow: 0 0 0 4px rgba(239, 68, 68, 0.1) !important;
}
"#;

static STYLES: OnceLock<GlobalStyles> = OnceLock::new();

/// Keyframed horizontal shake
#[derive(Debug, Clone, PartialEq)]
pub struct ShakeAnimation {
    pub duration: Duration,
    /// (progress in 0..=1, offset in px), sorted by progress
    pub keyframes: Vec<(f32, i16)>,
}

impl ShakeAnimation {
    /// Offset at `elapsed`, linearly interpolated between keyframes
    pub fn offset_at(&self, elapsed: Duration) -> i16 {
        if elapsed >= self.duration || self.duration.is_zero() {
            return 0;
        }
        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();

        for pair in self.keyframes.windows(2) {
            let (t0, x0) = pair[0];
            let (t1, x1) = pair[1];
            if t >= t0 && t <= t1 {
                let span = (t1 - t0).max(f32::EPSILON);
                let x = x0 as f32 + (x1 - x0) as f32 * ((t - t0) / span);
                return x.round() as i16;
            }
        }
        0
    }
}

impl Default for ShakeAnimation {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(400),
            keyframes: vec![(0.0, 0), (0.25, -8), (0.75, 8), (1.0, 0)],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalStyles {
    pub shake: ShakeAnimation,
    pub stylesheet: &'static str,
}

/// Install the global styles. Idempotent.
pub fn init() -> &'static GlobalStyles {
    STYLES.get_or_init(|| {
        debug!("Installing wizard styles");
        GlobalStyles {
            shake: ShakeAnimation::default(),
            stylesheet: STYLESHEET,
        }
    })
}

pub fn is_initialized() -> bool {
    STYLES.get().is_some()
}

/// Shake offset for an animation started `elapsed` ago
pub fn shake_offset(elapsed: Duration) -> i16 {
    STYLES
        .get()
        .map(|styles| styles.shake.offset_at(elapsed))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let first = init() as *const GlobalStyles;
        let second = init() as *const GlobalStyles;
        assert_eq!(first, second);
        assert!(is_initialized());
        assert!(init().stylesheet.contains("@keyframes shake"));
    }

    #[test]
    fn test_shake_keyframes() {
        let shake = ShakeAnimation::default();
        assert_eq!(shake.offset_at(Duration::ZERO), 0);
        assert_eq!(shake.offset_at(Duration::from_millis(100)), -8);
        assert_eq!(shake.offset_at(Duration::from_millis(200)), 0);
        assert_eq!(shake.offset_at(Duration::from_millis(300)), 8);
        assert_eq!(shake.offset_at(Duration::from_millis(400)), 0);
        assert_eq!(shake.offset_at(Duration::from_secs(5)), 0);
    }
}
