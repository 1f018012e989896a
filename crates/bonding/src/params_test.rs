use particles::{BondTypeId, ParticleType};

use crate::error::BondingError;
use crate::params::*;

#[test]
fn test_decode_bond_id() {
    assert_eq!(decode_bond_id("bond_centers", &ParamValue::Int(-1)).unwrap(), None);
    assert_eq!(decode_bond_id("bond_centers", &ParamValue::Null).unwrap(), None);
    assert_eq!(
        decode_bond_id("bond_centers", &ParamValue::Int(0)).unwrap(),
        Some(BondTypeId(0))
    );
}

#[test]
fn test_decode_bond_id_rejects_other_values() {
    for value in [
        ParamValue::Int(-2),
        ParamValue::Float(1.0),
        ParamValue::Str("harmonic".to_string()),
    ] {
        assert!(matches!(
            decode_bond_id("bond_vs", &value),
            Err(BondingError::ValidationError(_))
        ));
    }
}

#[test]
fn test_bond_id_round_trip() {
    for id in [None, Some(BondTypeId(0)), Some(BondTypeId(7))] {
        let encoded = ParamValue::Int(encode_bond_id(id));
        assert_eq!(decode_bond_id("bond", &encoded).unwrap(), id);
    }
}

#[test]
fn test_absent_bond_is_null_not_sentinel() {
    assert_eq!(ParamValue::from(None::<BondTypeId>), ParamValue::Null);
    assert_eq!(ParamValue::from(Some(BondTypeId(2))), ParamValue::Int(2));
}

#[test]
fn test_numeric_coercion() {
    assert_eq!(as_f64("distance", &ParamValue::Int(2)).unwrap(), 2.0);
    assert_eq!(as_f64("distance", &ParamValue::Float(0.5)).unwrap(), 0.5);
    assert!(as_f64("distance", &ParamValue::Null).is_err());
}

#[test]
fn test_particle_type_must_be_non_negative() {
    assert_eq!(
        as_particle_type("part_type_vs", &ParamValue::Int(3)).unwrap(),
        ParticleType(3)
    );
    assert!(as_particle_type("part_type_vs", &ParamValue::Int(-1)).is_err());
    assert!(as_particle_type("part_type_vs", &ParamValue::Float(3.0)).is_err());
}

#[test]
fn test_params_from_json() {
    let params = collision_params_from_json(
        r#"{"mode": "bind_at_point_of_collision", "bond_centers": 0, "bond_vs": -1,
            "part_type_vs": 4, "distance": 1.5, "vs_placement": null}"#,
    )
    .unwrap();

    assert_eq!(params["mode"], ParamValue::Str("bind_at_point_of_collision".into()));
    assert_eq!(params["bond_centers"], ParamValue::Int(0));
    assert_eq!(params["bond_vs"], ParamValue::Int(-1));
    assert_eq!(params["distance"], ParamValue::Float(1.5));
    assert_eq!(params["vs_placement"], ParamValue::Null);
}

#[test]
fn test_params_from_invalid_json() {
    assert!(matches!(
        collision_params_from_json("[1, 2]"),
        Err(BondingError::ValidationError(_))
    ));
}
