use std::collections::HashSet;

use crate::error::BondingError;
use crate::modes::{Mode, params_for_mode};

#[test]
fn test_encode_decode_round_trip() {
    for mode in Mode::ALL {
        assert_eq!(Mode::decode(mode.encode()).unwrap(), mode);
    }
}

#[test]
fn test_encodings_are_distinct_single_values() {
    let codes: HashSet<u32> = Mode::ALL.iter().map(|m| m.encode()).collect();
    assert_eq!(codes.len(), Mode::ALL.len());

    for mode in Mode::ALL.iter().filter(|m| **m != Mode::Off) {
        assert!(mode.encode().is_power_of_two());
    }
}

#[test]
fn test_decode_unknown_integer() {
    assert!(matches!(Mode::decode(1), Err(BondingError::UnknownMode(_))));
    assert!(matches!(Mode::decode(32), Err(BondingError::UnknownMode(_))));
}

#[test]
fn test_decode_rejects_combined_modes() {
    let combined = Mode::BindCenters.encode() | Mode::GlueToSurface.encode();
    assert!(matches!(
        Mode::decode(combined),
        Err(BondingError::UnknownMode(_))
    ));
}

#[test]
fn test_name_round_trip() {
    for mode in Mode::ALL {
        assert_eq!(mode.name().parse::<Mode>().unwrap(), mode);
        assert_eq!(mode.to_string(), mode.name());
    }
}

#[test]
fn test_unknown_name() {
    let err = "bind_everything".parse::<Mode>().unwrap_err();
    assert_eq!(err, BondingError::UnknownMode("bind_everything".to_string()));
}

#[test]
fn test_required_params_start_with_mode() {
    for mode in Mode::ALL {
        assert_eq!(mode.required_params()[0], "mode");
    }
    assert_eq!(Mode::Off.required_params(), &["mode"]);
}

#[test]
fn test_required_params_have_no_duplicates() {
    for mode in Mode::ALL {
        let unique: HashSet<&str> = mode.required_params().iter().copied().collect();
        assert_eq!(unique.len(), mode.required_params().len());
    }
}

#[test]
fn test_glue_to_surface_params() {
    let params = Mode::GlueToSurface.required_params();

    assert_eq!(params.len(), 9);
    assert!(params.contains(&"part_type_to_be_glued"));
    assert!(params.contains(&"part_type_to_attach_vs_to"));
    assert!(params.contains(&"part_type_after_glueing"));
    assert!(params.contains(&"distance_glued_particle_to_vs"));
}

#[test]
fn test_params_for_mode_by_name() {
    assert_eq!(
        params_for_mode("bind_three_particles").unwrap(),
        &[
            "mode",
            "bond_centers",
            "distance",
            "bond_three_particles",
            "three_particle_binding_angle_resolution"
        ]
    );
    assert!(matches!(
        params_for_mode("nope"),
        Err(BondingError::UnknownMode(_))
    ));
}

#[test]
fn test_virtual_site_modes() {
    assert!(Mode::BindAtPointOfCollision.creates_virtual_sites());
    assert!(Mode::GlueToSurface.creates_virtual_sites());
    assert!(!Mode::BindCenters.creates_virtual_sites());
    assert!(!Mode::Off.creates_virtual_sites());
}
