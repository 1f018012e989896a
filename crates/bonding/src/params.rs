//! Loosely typed parameter values at the configuration boundary
//!
//! Configuration layers hand over a name → value map. Values are converted
//! into typed policy fields here, including the bond-id convention where
//! `-1` (or null) means "no bond".

use std::collections::BTreeMap;

use particles::{BondTypeId, ParticleType};
use serde::{Deserialize, Serialize};

use crate::error::{BondingError, Result};

/// Integer used by external layers for an unset bond reference
pub const UNSET_BOND_ID: i64 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<Option<BondTypeId>> for ParamValue {
    fn from(v: Option<BondTypeId>) -> Self {
        match v {
            Some(id) => ParamValue::Int(id.0 as i64),
            None => ParamValue::Null,
        }
    }
}

impl From<ParticleType> for ParamValue {
    fn from(v: ParticleType) -> Self {
        ParamValue::Int(v.0 as i64)
    }
}

/// Name → value map handed to [`crate::policy::CollisionDetection::configure`]
pub type CollisionParams = BTreeMap<String, ParamValue>;

/// Builds a parameter map from `(name, value)` pairs
///
/// # Examples
///
/// ```
/// use bonding::params::{collision_params, ParamValue};
///
/// let params = collision_params([("mode", "bind_centers".into()), ("distance", 1.5.into())]);
/// assert_eq!(params["distance"], ParamValue::Float(1.5));
/// ```
pub fn collision_params<const N: usize>(entries: [(&str, ParamValue); N]) -> CollisionParams {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Parses a JSON object into a parameter map
pub fn collision_params_from_json(json: &str) -> Result<CollisionParams> {
    serde_json::from_str(json)
        .map_err(|e| BondingError::ValidationError(format!("invalid parameter JSON: {e}")))
}

/// Translates an external bond id into an optional bond reference
///
/// `-1` and null both mean "unset".
///
/// # Examples
///
/// ```
/// use bonding::params::{decode_bond_id, encode_bond_id, ParamValue};
/// use particles::BondTypeId;
///
/// assert_eq!(decode_bond_id("bond_vs", &ParamValue::Int(-1)).unwrap(), None);
/// assert_eq!(decode_bond_id("bond_vs", &ParamValue::Int(3)).unwrap(), Some(BondTypeId(3)));
/// assert_eq!(encode_bond_id(None), -1);
/// ```
pub fn decode_bond_id(name: &str, value: &ParamValue) -> Result<Option<BondTypeId>> {
    match value {
        ParamValue::Null => Ok(None),
        ParamValue::Int(UNSET_BOND_ID) => Ok(None),
        ParamValue::Int(id) if *id >= 0 => Ok(Some(BondTypeId(*id as usize))),
        other => Err(BondingError::ValidationError(format!(
            "{name} must be a bond id (non-negative integer or -1), got {other:?}"
        ))),
    }
}

pub fn encode_bond_id(id: Option<BondTypeId>) -> i64 {
    id.map_or(UNSET_BOND_ID, |id| id.0 as i64)
}

pub(crate) fn as_f64(name: &str, value: &ParamValue) -> Result<f64> {
    match value {
        ParamValue::Float(v) => Ok(*v),
        ParamValue::Int(v) => Ok(*v as f64),
        other => Err(BondingError::ValidationError(format!(
            "{name} must be a number, got {other:?}"
        ))),
    }
}

pub(crate) fn as_particle_type(name: &str, value: &ParamValue) -> Result<ParticleType> {
    match value {
        ParamValue::Int(v) if *v >= 0 && *v <= u32::MAX as i64 => Ok(ParticleType(*v as u32)),
        other => Err(BondingError::ValidationError(format!(
            "{name} must be a non-negative particle type, got {other:?}"
        ))),
    }
}

pub(crate) fn as_count(name: &str, value: &ParamValue) -> Result<u32> {
    match value {
        ParamValue::Int(v) if *v >= 0 && *v <= u32::MAX as i64 => Ok(*v as u32),
        other => Err(BondingError::ValidationError(format!(
            "{name} must be a non-negative integer, got {other:?}"
        ))),
    }
}
