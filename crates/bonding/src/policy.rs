//! Collision policy: the validated, immutable configuration of collision
//! handling
//!
//! A policy is built from a complete parameter set, validated against the
//! particle system, and only then installed. There is no way to change a
//! single field of the installed policy; callers replace it wholesale through
//! [`CollisionDetection::configure`], so readers never observe a policy whose
//! fields disagree with its mode.

use std::collections::BTreeSet;
use std::sync::Arc;

use particles::{BondTypeId, ParticleSystem, ParticleType};

use crate::error::{BondingError, Result};
use crate::modes::Mode;
use crate::params::{
    CollisionParams, ParamValue, as_count, as_f64, as_particle_type, collision_params_from_json,
    decode_bond_id,
};

/// Active collision handling and its mode-specific parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CollisionPolicy {
    #[default]
    Off,
    BindCenters {
        bond_centers: BondTypeId,
        distance: f64,
    },
    BindAtPointOfCollision {
        bond_centers: BondTypeId,
        bond_vs: BondTypeId,
        part_type_vs: ParticleType,
        distance: f64,
        /// Fraction of the separation at which virtual sites are placed
        vs_placement: f64,
    },
    GlueToSurface {
        bond_centers: BondTypeId,
        bond_vs: BondTypeId,
        part_type_vs: ParticleType,
        part_type_to_be_glued: ParticleType,
        part_type_to_attach_vs_to: ParticleType,
        part_type_after_glueing: ParticleType,
        distance: f64,
        distance_glued_particle_to_vs: f64,
    },
    BindThreeParticles {
        bond_centers: BondTypeId,
        distance: f64,
        /// First of `resolution + 1` consecutive angle bond types
        bond_three_particles: BondTypeId,
        three_particle_binding_angle_resolution: u32,
    },
}

fn field<'a>(params: &'a CollisionParams, name: &str) -> Result<&'a ParamValue> {
    params
        .get(name)
        .ok_or_else(|| BondingError::ValidationError(format!("{name} is missing")))
}

fn required_bond(params: &CollisionParams, name: &str) -> Result<BondTypeId> {
    decode_bond_id(name, field(params, name)?)?
        .ok_or_else(|| BondingError::ValidationError(format!("{name} must reference a bond")))
}

fn parse_mode(value: &ParamValue) -> Result<Mode> {
    match value {
        ParamValue::Str(name) => name.parse(),
        ParamValue::Int(code) => u32::try_from(*code)
            .map_err(|_| BondingError::UnknownMode(format!("integer collision mode {code}")))
            .and_then(Mode::decode),
        other => Err(BondingError::UnknownMode(format!("{other:?}"))),
    }
}

impl CollisionPolicy {
    /// Builds a policy from a complete parameter set
    ///
    /// The key set, `"mode"` included, must equal the mode's required set
    /// exactly. Values are type-checked but not validated against a system.
    ///
    /// # Examples
    ///
    /// ```
    /// use bonding::params::collision_params;
    /// use bonding::policy::CollisionPolicy;
    /// use bonding::modes::Mode;
    ///
    /// let params = collision_params([
    ///     ("mode", "bind_centers".into()),
    ///     ("bond_centers", 0i64.into()),
    ///     ("distance", 1.5.into()),
    /// ]);
    /// let policy = CollisionPolicy::from_params(&params).unwrap();
    /// assert_eq!(policy.mode(), Mode::BindCenters);
    ///
    /// let mut incomplete = params.clone();
    /// incomplete.remove("distance");
    /// assert!(CollisionPolicy::from_params(&incomplete).is_err());
    /// ```
    pub fn from_params(params: &CollisionParams) -> Result<Self> {
        let mode = parse_mode(params.get("mode").ok_or(BondingError::MissingMode)?)?;

        let required: BTreeSet<&str> = mode.required_params().iter().copied().collect();
        let got: BTreeSet<&str> = params.keys().map(String::as_str).collect();
        if required != got {
            return Err(BondingError::ParameterMismatch {
                mode: mode.name().to_string(),
                required: mode.required_params().to_vec(),
                got: got.into_iter().map(str::to_string).collect(),
            });
        }

        let distance = || as_f64("distance", field(params, "distance")?);
        let ptype = |name: &str| as_particle_type(name, field(params, name)?);

        let policy = match mode {
            Mode::Off => CollisionPolicy::Off,
            Mode::BindCenters => CollisionPolicy::BindCenters {
                bond_centers: required_bond(params, "bond_centers")?,
                distance: distance()?,
            },
            Mode::BindAtPointOfCollision => CollisionPolicy::BindAtPointOfCollision {
                bond_centers: required_bond(params, "bond_centers")?,
                bond_vs: required_bond(params, "bond_vs")?,
                part_type_vs: ptype("part_type_vs")?,
                distance: distance()?,
                vs_placement: as_f64("vs_placement", field(params, "vs_placement")?)?,
            },
            Mode::GlueToSurface => CollisionPolicy::GlueToSurface {
                bond_centers: required_bond(params, "bond_centers")?,
                bond_vs: required_bond(params, "bond_vs")?,
                part_type_vs: ptype("part_type_vs")?,
                part_type_to_be_glued: ptype("part_type_to_be_glued")?,
                part_type_to_attach_vs_to: ptype("part_type_to_attach_vs_to")?,
                part_type_after_glueing: ptype("part_type_after_glueing")?,
                distance: distance()?,
                distance_glued_particle_to_vs: as_f64(
                    "distance_glued_particle_to_vs",
                    field(params, "distance_glued_particle_to_vs")?,
                )?,
            },
            Mode::BindThreeParticles => CollisionPolicy::BindThreeParticles {
                bond_centers: required_bond(params, "bond_centers")?,
                distance: distance()?,
                bond_three_particles: required_bond(params, "bond_three_particles")?,
                three_particle_binding_angle_resolution: as_count(
                    "three_particle_binding_angle_resolution",
                    field(params, "three_particle_binding_angle_resolution")?,
                )?,
            },
        };
        Ok(policy)
    }

    pub fn mode(&self) -> Mode {
        match self {
            CollisionPolicy::Off => Mode::Off,
            CollisionPolicy::BindCenters { .. } => Mode::BindCenters,
            CollisionPolicy::BindAtPointOfCollision { .. } => Mode::BindAtPointOfCollision,
            CollisionPolicy::GlueToSurface { .. } => Mode::GlueToSurface,
            CollisionPolicy::BindThreeParticles { .. } => Mode::BindThreeParticles,
        }
    }

    pub fn bond_centers(&self) -> Option<BondTypeId> {
        match self {
            CollisionPolicy::Off => None,
            CollisionPolicy::BindCenters { bond_centers, .. }
            | CollisionPolicy::BindAtPointOfCollision { bond_centers, .. }
            | CollisionPolicy::GlueToSurface { bond_centers, .. }
            | CollisionPolicy::BindThreeParticles { bond_centers, .. } => Some(*bond_centers),
        }
    }

    pub fn bond_vs(&self) -> Option<BondTypeId> {
        match self {
            CollisionPolicy::BindAtPointOfCollision { bond_vs, .. }
            | CollisionPolicy::GlueToSurface { bond_vs, .. } => Some(*bond_vs),
            _ => None,
        }
    }

    pub fn bond_three_particles(&self) -> Option<BondTypeId> {
        match self {
            CollisionPolicy::BindThreeParticles {
                bond_three_particles,
                ..
            } => Some(*bond_three_particles),
            _ => None,
        }
    }

    /// Collision distance; `None` when collisions are off
    pub fn distance(&self) -> Option<f64> {
        match self {
            CollisionPolicy::Off => None,
            CollisionPolicy::BindCenters { distance, .. }
            | CollisionPolicy::BindAtPointOfCollision { distance, .. }
            | CollisionPolicy::GlueToSurface { distance, .. }
            | CollisionPolicy::BindThreeParticles { distance, .. } => Some(*distance),
        }
    }

    pub fn part_type_vs(&self) -> Option<ParticleType> {
        match self {
            CollisionPolicy::BindAtPointOfCollision { part_type_vs, .. }
            | CollisionPolicy::GlueToSurface { part_type_vs, .. } => Some(*part_type_vs),
            _ => None,
        }
    }

    pub fn vs_placement(&self) -> Option<f64> {
        match self {
            CollisionPolicy::BindAtPointOfCollision { vs_placement, .. } => Some(*vs_placement),
            _ => None,
        }
    }

    pub fn part_type_to_be_glued(&self) -> Option<ParticleType> {
        match self {
            CollisionPolicy::GlueToSurface {
                part_type_to_be_glued,
                ..
            } => Some(*part_type_to_be_glued),
            _ => None,
        }
    }

    pub fn part_type_to_attach_vs_to(&self) -> Option<ParticleType> {
        match self {
            CollisionPolicy::GlueToSurface {
                part_type_to_attach_vs_to,
                ..
            } => Some(*part_type_to_attach_vs_to),
            _ => None,
        }
    }

    pub fn part_type_after_glueing(&self) -> Option<ParticleType> {
        match self {
            CollisionPolicy::GlueToSurface {
                part_type_after_glueing,
                ..
            } => Some(*part_type_after_glueing),
            _ => None,
        }
    }

    pub fn distance_glued_particle_to_vs(&self) -> Option<f64> {
        match self {
            CollisionPolicy::GlueToSurface {
                distance_glued_particle_to_vs,
                ..
            } => Some(*distance_glued_particle_to_vs),
            _ => None,
        }
    }

    pub fn three_particle_binding_angle_resolution(&self) -> Option<u32> {
        match self {
            CollisionPolicy::BindThreeParticles {
                three_particle_binding_angle_resolution,
                ..
            } => Some(*three_particle_binding_angle_resolution),
            _ => None,
        }
    }

    /// Value of one named parameter in boundary form
    ///
    /// Parameters the current mode does not use read as `Null`, never as a
    /// sentinel id.
    pub fn get_parameter(&self, name: &str) -> Result<ParamValue> {
        let float = |v: Option<f64>| v.map_or(ParamValue::Null, ParamValue::Float);
        let ptype = |v: Option<ParticleType>| v.map_or(ParamValue::Null, ParamValue::from);

        let value = match name {
            "mode" => ParamValue::Str(self.mode().name().to_string()),
            "bond_centers" => self.bond_centers().into(),
            "bond_vs" => self.bond_vs().into(),
            "bond_three_particles" => self.bond_three_particles().into(),
            "distance" => float(self.distance()),
            "vs_placement" => float(self.vs_placement()),
            "distance_glued_particle_to_vs" => float(self.distance_glued_particle_to_vs()),
            "part_type_vs" => ptype(self.part_type_vs()),
            "part_type_to_be_glued" => ptype(self.part_type_to_be_glued()),
            "part_type_to_attach_vs_to" => ptype(self.part_type_to_attach_vs_to()),
            "part_type_after_glueing" => ptype(self.part_type_after_glueing()),
            "three_particle_binding_angle_resolution" => self
                .three_particle_binding_angle_resolution()
                .map_or(ParamValue::Null, |r| ParamValue::Int(r as i64)),
            _ => {
                return Err(BondingError::ValidationError(format!(
                    "unknown collision parameter {name}"
                )));
            }
        };
        Ok(value)
    }

    /// The mode's required parameters in boundary form
    pub fn to_params(&self) -> CollisionParams {
        self.mode()
            .required_params()
            .iter()
            .filter_map(|&name| {
                self.get_parameter(name)
                    .ok()
                    .map(|value| (name.to_string(), value))
            })
            .collect()
    }

    /// Checks the policy against the bond table and particle types of `system`
    ///
    /// # Errors
    ///
    /// `ValidationError` naming the first inconsistency found.
    pub fn validate(&self, system: &ParticleSystem) -> Result<()> {
        let invalid = |msg: String| Err(BondingError::ValidationError(msg));

        if let Some(distance) = self.distance() {
            if !(distance.is_finite() && distance > 0.0) {
                return invalid(format!("distance must be positive, got {distance}"));
            }
        }

        for (name, bond) in [
            ("bond_centers", self.bond_centers()),
            ("bond_vs", self.bond_vs()),
        ] {
            let Some(id) = bond else { continue };
            match system.bond_types.get(id) {
                None => return invalid(format!("{name} references unknown bond type {id}")),
                Some(t) if !t.kind.is_pair() => {
                    return invalid(format!("{name} must be a pair bond, bond type {id} is not"));
                }
                Some(_) => {}
            }
        }

        if let Some(placement) = self.vs_placement() {
            if !(0.0..=1.0).contains(&placement) {
                return invalid(format!("vs_placement must lie in [0, 1], got {placement}"));
            }
        }

        if let Some(vs_type) = self.part_type_vs() {
            if system.physical_types().contains(&vs_type) {
                return invalid(format!(
                    "part_type_vs {vs_type} is already used by real particles"
                ));
            }
        }

        if let CollisionPolicy::GlueToSurface {
            part_type_vs,
            part_type_to_be_glued,
            part_type_to_attach_vs_to,
            part_type_after_glueing,
            distance_glued_particle_to_vs,
            ..
        } = self
        {
            let types = [
                *part_type_vs,
                *part_type_to_be_glued,
                *part_type_to_attach_vs_to,
                *part_type_after_glueing,
            ];
            let distinct: BTreeSet<ParticleType> = types.iter().copied().collect();
            if distinct.len() != types.len() {
                return invalid(
                    "part_type_vs, part_type_to_be_glued, part_type_to_attach_vs_to and part_type_after_glueing must differ"
                        .to_string(),
                );
            }
            if !(distance_glued_particle_to_vs.is_finite() && *distance_glued_particle_to_vs > 0.0)
            {
                return invalid(format!(
                    "distance_glued_particle_to_vs must be positive, got {distance_glued_particle_to_vs}"
                ));
            }
        }

        if let CollisionPolicy::BindThreeParticles {
            bond_three_particles,
            three_particle_binding_angle_resolution: resolution,
            ..
        } = self
        {
            if *resolution == 0 {
                return invalid(
                    "three_particle_binding_angle_resolution must be at least 1".to_string(),
                );
            }
            for bin in 0..=*resolution as usize {
                let id = BondTypeId(bond_three_particles.0 + bin);
                match system.bond_types.get(id) {
                    Some(t) if t.kind.is_angle() => {}
                    _ => {
                        return invalid(format!(
                            "bond type {id} must be an angle bond (bond_three_particles + {bin})"
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Holder of the active collision policy
///
/// Detection sites take cheap snapshots through [`CollisionDetection::policy`];
/// configuration swaps in a complete, validated replacement.
#[derive(Debug, Clone, Default)]
pub struct CollisionDetection {
    policy: Arc<CollisionPolicy>,
}

impl CollisionDetection {
    /// Starts with collisions off
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the active policy from a complete parameter set
    ///
    /// On any error the previously installed policy stays active.
    ///
    /// # Examples
    ///
    /// ```
    /// use bonding::params::collision_params;
    /// use bonding::policy::CollisionDetection;
    /// use bonding::modes::Mode;
    /// use particles::{BondType, ParticleSystem};
    ///
    /// let mut system = ParticleSystem::new();
    /// let spring = system.bond_types.add(BondType::harmonic(1.0, 1.0));
    ///
    /// let mut detection = CollisionDetection::new();
    /// detection
    ///     .configure(
    ///         &collision_params([
    ///             ("mode", "bind_centers".into()),
    ///             ("bond_centers", (spring.0 as i64).into()),
    ///             ("distance", 1.2.into()),
    ///         ]),
    ///         &system,
    ///     )
    ///     .unwrap();
    /// assert_eq!(detection.mode(), Mode::BindCenters);
    /// ```
    pub fn configure(&mut self, params: &CollisionParams, system: &ParticleSystem) -> Result<()> {
        let policy = CollisionPolicy::from_params(params)?;
        self.install(policy, system)
    }

    /// Replaces the active policy from a JSON object of parameters
    pub fn configure_json(&mut self, json: &str, system: &ParticleSystem) -> Result<()> {
        self.configure(&collision_params_from_json(json)?, system)
    }

    /// Validates and installs an already typed policy
    pub fn install(&mut self, policy: CollisionPolicy, system: &ParticleSystem) -> Result<()> {
        policy.validate(system)?;
        log::info!("collision mode set to {}", policy.mode());
        self.policy = Arc::new(policy);
        Ok(())
    }

    /// Re-checks the installed policy against the current system
    pub fn validate(&self, system: &ParticleSystem) -> Result<()> {
        self.policy.validate(system)
    }

    /// Snapshot of the installed policy
    pub fn policy(&self) -> Arc<CollisionPolicy> {
        Arc::clone(&self.policy)
    }

    pub fn mode(&self) -> Mode {
        self.policy.mode()
    }

    pub fn get_params(&self) -> CollisionParams {
        self.policy.to_params()
    }

    pub fn get_parameter(&self, name: &str) -> Result<ParamValue> {
        self.policy.get_parameter(name)
    }
}
