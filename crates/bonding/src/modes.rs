//! Registry of collision-handling modes
//!
//! Each mode has a fixed, ordered set of required configuration parameter
//! names and a compact integer encoding. The encodings are powers of two so
//! modes could be OR-combined, but combination is currently not supported:
//! [`Mode::decode`] accepts exactly one listed value and rejects anything
//! else, including combined bit patterns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BondingError, Result};

/// How colliding particles are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Collisions are ignored
    Off,
    /// Bond the centers of colliding particles
    BindCenters,
    /// Bond the centers and tie two virtual sites together at the contact point
    BindAtPointOfCollision,
    /// Glue a particle onto a surface particle through one virtual site
    GlueToSurface,
    /// Bond the centers and add an angle bond to a third particle
    BindThreeParticles,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Off,
        Mode::BindCenters,
        Mode::BindAtPointOfCollision,
        Mode::GlueToSurface,
        Mode::BindThreeParticles,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Off => "off",
            Mode::BindCenters => "bind_centers",
            Mode::BindAtPointOfCollision => "bind_at_point_of_collision",
            Mode::GlueToSurface => "glue_to_surface",
            Mode::BindThreeParticles => "bind_three_particles",
        }
    }

    /// Integer encoding of the mode
    pub fn encode(&self) -> u32 {
        match self {
            Mode::Off => 0,
            Mode::BindCenters => 2,
            Mode::BindAtPointOfCollision => 4,
            Mode::GlueToSurface => 8,
            Mode::BindThreeParticles => 16,
        }
    }

    /// Decodes a single-mode integer
    ///
    /// # Errors
    ///
    /// `UnknownMode` for any value that is not exactly one mode's encoding.
    ///
    /// # Examples
    ///
    /// ```
    /// use bonding::modes::Mode;
    ///
    /// assert_eq!(Mode::decode(4).unwrap(), Mode::BindAtPointOfCollision);
    /// assert!(Mode::decode(6).is_err()); // combined modes are rejected
    /// ```
    pub fn decode(value: u32) -> Result<Mode> {
        Mode::ALL
            .into_iter()
            .find(|m| m.encode() == value)
            .ok_or_else(|| BondingError::UnknownMode(format!("integer collision mode {value}")))
    }

    /// Parameter names this mode requires, `"mode"` first
    ///
    /// # Examples
    ///
    /// ```
    /// use bonding::modes::Mode;
    ///
    /// assert_eq!(Mode::BindCenters.required_params(), &["mode", "bond_centers", "distance"]);
    /// ```
    pub fn required_params(&self) -> &'static [&'static str] {
        match self {
            Mode::Off => &["mode"],
            Mode::BindCenters => &["mode", "bond_centers", "distance"],
            Mode::BindAtPointOfCollision => &[
                "mode",
                "bond_centers",
                "bond_vs",
                "part_type_vs",
                "distance",
                "vs_placement",
            ],
            Mode::GlueToSurface => &[
                "mode",
                "bond_centers",
                "bond_vs",
                "part_type_vs",
                "part_type_to_be_glued",
                "part_type_to_attach_vs_to",
                "part_type_after_glueing",
                "distance",
                "distance_glued_particle_to_vs",
            ],
            Mode::BindThreeParticles => &[
                "mode",
                "bond_centers",
                "distance",
                "bond_three_particles",
                "three_particle_binding_angle_resolution",
            ],
        }
    }

    /// Whether the mode spawns virtual particles
    pub fn creates_virtual_sites(&self) -> bool {
        matches!(self, Mode::BindAtPointOfCollision | Mode::GlueToSurface)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = BondingError;

    fn from_str(s: &str) -> Result<Self> {
        Mode::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| BondingError::UnknownMode(s.to_string()))
    }
}

/// Required parameter names for a mode given by name
pub fn params_for_mode(name: &str) -> Result<&'static [&'static str]> {
    name.parse::<Mode>().map(|m| m.required_params())
}
