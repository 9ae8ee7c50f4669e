//! Photometric functions

use crate::common::Float;
use itertools::Itertools;
use std::fmt;
use std::str::FromStr;

/// A reflectance law mapping the cosine of the incidence angle, the cosine
/// of the emission angle and the phase angle in degrees to a unitless
/// brightness.
pub trait PhotometricLaw: Send + Sync {
    /// Evaluates the law.
    ///
    /// * `cos_i`     - Cosine of the incidence angle.
    /// * `cos_e`     - Cosine of the emission angle.
    /// * `phase_deg` - Phase angle in degrees.
    fn value(&self, cos_i: Float, cos_e: Float, phase_deg: Float) -> Float;
}

impl<F> PhotometricLaw for F
where
    F: Fn(Float, Float, Float) -> Float + Send + Sync,
{
    fn value(&self, cos_i: Float, cos_e: Float, phase_deg: Float) -> Float {
        self(cos_i, cos_e, phase_deg)
    }
}

/// The named reflectance laws selectable from the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PhotometricFunction {
    /// Lommel-Seeliger with the OSIRIS-REx polynomial phase correction.
    Orex,

    /// Lommel-Seeliger.
    LommelSeeliger,

    /// Lunar-Lambert with phase-dependent partition (β = e^(-phase/60°)).
    Lunar,

    /// McEwen's Lunar-Lambert variant.
    McEwen,

    /// Lunar-Lambert with a fixed partition β = 0.65.
    NoPhase,
}

impl PhotometricFunction {
    /// All supported laws.
    pub const ALL: [PhotometricFunction; 5] = [
        PhotometricFunction::Orex,
        PhotometricFunction::LommelSeeliger,
        PhotometricFunction::Lunar,
        PhotometricFunction::McEwen,
        PhotometricFunction::NoPhase,
    ];

    /// Returns the name used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            PhotometricFunction::Orex => "OREX",
            PhotometricFunction::LommelSeeliger => "LommelSeeliger",
            PhotometricFunction::Lunar => "Lunar",
            PhotometricFunction::McEwen => "McEwen",
            PhotometricFunction::NoPhase => "NoPhase",
        }
    }

    /// Returns a human readable list of the supported names.
    pub fn option_string() -> String {
        let names = Self::ALL.iter().map(|f| f.name()).collect_vec();
        format!(
            "Photometric function. Supported values are {}, or {}.",
            names[..names.len() - 1].join(", "),
            names[names.len() - 1]
        )
    }
}

impl Default for PhotometricFunction {
    fn default() -> Self {
        PhotometricFunction::Orex
    }
}

impl PhotometricLaw for PhotometricFunction {
    fn value(&self, cos_i: Float, cos_e: Float, phase_deg: Float) -> Float {
        if cos_i < 0.0 || cos_e < 0.0 {
            return 0.0;
        }
        let lommel_seeliger = cos_i / (cos_i + cos_e);
        match self {
            PhotometricFunction::Orex => {
                let f = ((-0.000000990 * phase_deg + 0.000269) * phase_deg - 0.0436) * phase_deg;
                f.exp() * lommel_seeliger
            }
            PhotometricFunction::LommelSeeliger => 2.0 * lommel_seeliger,
            PhotometricFunction::Lunar => {
                let beta = (-phase_deg / 60.0).exp();
                (1.0 - beta) * cos_i + 2.0 * beta * lommel_seeliger
            }
            PhotometricFunction::McEwen => {
                let beta = (-phase_deg / 60.0).exp();
                (1.0 - beta) * cos_i + beta * lommel_seeliger
            }
            PhotometricFunction::NoPhase => {
                let beta = 0.65;
                (1.0 - beta) * cos_i + beta * lommel_seeliger
            }
        }
    }
}

impl FromStr for PhotometricFunction {
    type Err = String;

    /// Parses a law name, ignoring case.
    ///
    /// * `s` - The name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("Unknown photometric function '{s}'. {}", Self::option_string()))
    }
}

impl fmt::Display for PhotometricFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
