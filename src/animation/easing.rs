use serde::{Deserialize, Serialize};

use crate::errors::{Result, VitrineError};

const fn default_overshoot() -> f32 {
    1.70158
}
const fn default_mass() -> f32 {
    1.0
}
const fn default_stiffness() -> f32 {
    170.0
}
const fn default_damping() -> f32 {
    26.0
}

/// Easing curve of one timeline entry.
///
/// Maps normalized entry time `t ∈ [0, 1]` to blend progress. Back and
/// under-damped spring curves leave `[0, 1]` on purpose; every curve returns
/// exactly `1.0` at `t = 1` so entries finish on their declared end value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ease {
    #[default]
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    /// Overshoots past the end value before settling.
    BackOut {
        #[serde(default = "default_overshoot")]
        overshoot: f32,
    },
    /// Damped harmonic oscillator released from rest at 0 toward 1.
    /// Evaluated in seconds, so the entry duration matters.
    Spring {
        #[serde(default = "default_mass")]
        mass: f32,
        #[serde(default = "default_stiffness")]
        stiffness: f32,
        #[serde(default = "default_damping")]
        damping: f32,
    },
}

impl Ease {
    #[must_use]
    pub fn back_out() -> Self {
        Self::BackOut {
            overshoot: default_overshoot(),
        }
    }

    #[must_use]
    pub fn spring(mass: f32, stiffness: f32, damping: f32) -> Self {
        Self::Spring {
            mass,
            stiffness,
            damping,
        }
    }

    /// Blend progress at normalized time `t` of an entry lasting `duration`
    /// seconds.
    #[must_use]
    pub fn apply(&self, t: f32, duration: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t >= 1.0 {
            return 1.0;
        }
        match *self {
            Self::Linear => t,
            Self::QuadIn => t * t,
            Self::QuadOut => 1.0 - (1.0 - t).powi(2),
            Self::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::CubicIn => t * t * t,
            Self::CubicOut => 1.0 - (1.0 - t).powi(3),
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::BackOut { overshoot } => {
                let c3 = overshoot + 1.0;
                let u = t - 1.0;
                1.0 + c3 * u.powi(3) + overshoot * u.powi(2)
            }
            Self::Spring {
                mass,
                stiffness,
                damping,
            } => spring_position(mass, stiffness, damping, t * duration),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Self::Spring {
            mass,
            stiffness,
            damping,
        } = *self
        {
            if mass.is_nan() || mass <= 0.0 {
                return Err(VitrineError::InvalidConfig {
                    field: "ease.mass",
                    reason: format!("must be positive, got {mass}"),
                });
            }
            if stiffness.is_nan() || stiffness <= 0.0 {
                return Err(VitrineError::InvalidConfig {
                    field: "ease.stiffness",
                    reason: format!("must be positive, got {stiffness}"),
                });
            }
            if damping.is_nan() || damping < 0.0 {
                return Err(VitrineError::InvalidConfig {
                    field: "ease.damping",
                    reason: format!("must not be negative, got {damping}"),
                });
            }
        }
        Ok(())
    }
}

/// Closed-form position of a unit spring at `time` seconds.
fn spring_position(mass: f32, stiffness: f32, damping: f32, time: f32) -> f32 {
    let omega = (stiffness / mass).sqrt();
    let zeta = damping / (2.0 * (stiffness * mass).sqrt());

    if zeta < 1.0 - 1e-4 {
        let omega_d = omega * (1.0 - zeta * zeta).sqrt();
        let envelope = (-zeta * omega * time).exp();
        1.0 - envelope
            * ((omega_d * time).cos() + (zeta * omega / omega_d) * (omega_d * time).sin())
    } else if zeta > 1.0 + 1e-4 {
        let root = (zeta * zeta - 1.0).sqrt();
        let r1 = -omega * (zeta - root);
        let r2 = -omega * (zeta + root);
        1.0 - (r2 * (r1 * time).exp() - r1 * (r2 * time).exp()) / (r2 - r1)
    } else {
        1.0 - (-omega * time).exp() * (1.0 + omega * time)
    }
}
