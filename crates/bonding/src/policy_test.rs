use nalgebra::Point3;
use particles::{BondType, BondTypeId, ParticleSystem, ParticleType};

use crate::error::BondingError;
use crate::modes::Mode;
use crate::params::{CollisionParams, ParamValue, collision_params};
use crate::policy::{CollisionDetection, CollisionPolicy};

/// Bond table: 0 harmonic, 1 virtual, 2..=5 angle bonds. Real particles of
/// types 0 and 1.
fn make_test_system() -> ParticleSystem {
    let mut system = ParticleSystem::new();
    system.bond_types.add(BondType::harmonic(10.0, 1.0));
    system.bond_types.add(BondType::virtual_bond());
    for bin in 0..4 {
        let phi0 = std::f64::consts::PI * bin as f64 / 3.0;
        system.bond_types.add(BondType::angle_harmonic(5.0, phi0));
    }
    system.add_particle(ParticleType(0), Point3::origin()).unwrap();
    system.add_particle(ParticleType(1), Point3::new(2.0, 0.0, 0.0)).unwrap();
    system
}

fn bind_centers_params() -> CollisionParams {
    collision_params([
        ("mode", "bind_centers".into()),
        ("bond_centers", 0i64.into()),
        ("distance", 1.5.into()),
    ])
}

fn point_of_collision_params() -> CollisionParams {
    collision_params([
        ("mode", "bind_at_point_of_collision".into()),
        ("bond_centers", 0i64.into()),
        ("bond_vs", 1i64.into()),
        ("part_type_vs", 7i64.into()),
        ("distance", 1.5.into()),
        ("vs_placement", 0.5.into()),
    ])
}

fn glue_params() -> CollisionParams {
    collision_params([
        ("mode", "glue_to_surface".into()),
        ("bond_centers", 0i64.into()),
        ("bond_vs", 1i64.into()),
        ("part_type_vs", 7i64.into()),
        ("part_type_to_be_glued", 0i64.into()),
        ("part_type_to_attach_vs_to", 1i64.into()),
        ("part_type_after_glueing", 2i64.into()),
        ("distance", 1.5.into()),
        ("distance_glued_particle_to_vs", 0.2.into()),
    ])
}

fn three_particle_params() -> CollisionParams {
    collision_params([
        ("mode", "bind_three_particles".into()),
        ("bond_centers", 0i64.into()),
        ("distance", 1.5.into()),
        ("bond_three_particles", 2i64.into()),
        ("three_particle_binding_angle_resolution", 3i64.into()),
    ])
}

#[test]
fn test_default_is_off() {
    let detection = CollisionDetection::new();

    assert_eq!(detection.mode(), Mode::Off);
    assert_eq!(detection.policy().distance(), None);
    assert_eq!(
        detection.get_params(),
        collision_params([("mode", "off".into())])
    );
}

#[test]
fn test_configure_every_mode() {
    let system = make_test_system();
    let cases = [
        (bind_centers_params(), Mode::BindCenters),
        (point_of_collision_params(), Mode::BindAtPointOfCollision),
        (glue_params(), Mode::GlueToSurface),
        (three_particle_params(), Mode::BindThreeParticles),
        (collision_params([("mode", "off".into())]), Mode::Off),
    ];

    for (params, mode) in cases {
        let mut detection = CollisionDetection::new();
        detection.configure(&params, &system).unwrap();
        assert_eq!(detection.mode(), mode);
    }
}

#[test]
fn test_mode_by_integer_encoding() {
    let system = make_test_system();
    let mut params = bind_centers_params();
    params.insert("mode".into(), ParamValue::Int(Mode::BindCenters.encode() as i64));

    let mut detection = CollisionDetection::new();
    detection.configure(&params, &system).unwrap();

    assert_eq!(detection.mode(), Mode::BindCenters);
}

#[test]
fn test_missing_mode() {
    let system = make_test_system();
    let mut params = bind_centers_params();
    params.remove("mode");

    let mut detection = CollisionDetection::new();
    assert_eq!(
        detection.configure(&params, &system),
        Err(BondingError::MissingMode)
    );
}

#[test]
fn test_unknown_mode() {
    let system = make_test_system();
    let mut detection = CollisionDetection::new();

    let err = detection
        .configure(&collision_params([("mode", "bind_everything".into())]), &system)
        .unwrap_err();
    assert!(matches!(err, BondingError::UnknownMode(_)));

    let err = detection
        .configure(&collision_params([("mode", 6i64.into())]), &system)
        .unwrap_err();
    assert!(matches!(err, BondingError::UnknownMode(_)));
}

#[test]
fn test_subset_of_parameters_rejected() {
    let system = make_test_system();
    let mut params = point_of_collision_params();
    params.remove("vs_placement");

    let mut detection = CollisionDetection::new();
    let err = detection.configure(&params, &system).unwrap_err();

    match err {
        BondingError::ParameterMismatch { mode, required, got } => {
            assert_eq!(mode, "bind_at_point_of_collision");
            assert!(required.contains(&"vs_placement"));
            assert!(!got.contains(&"vs_placement".to_string()));
        }
        other => panic!("expected ParameterMismatch, got {other:?}"),
    }
    assert_eq!(detection.mode(), Mode::Off);
}

#[test]
fn test_superset_of_parameters_rejected() {
    let system = make_test_system();
    let mut params = bind_centers_params();
    params.insert("bond_vs".into(), 1i64.into());

    let mut detection = CollisionDetection::new();
    assert!(matches!(
        detection.configure(&params, &system),
        Err(BondingError::ParameterMismatch { .. })
    ));
}

#[test]
fn test_required_bond_may_not_be_unset() {
    let system = make_test_system();
    let mut params = bind_centers_params();
    params.insert("bond_centers".into(), ParamValue::Int(-1));

    let mut detection = CollisionDetection::new();
    assert!(matches!(
        detection.configure(&params, &system),
        Err(BondingError::ValidationError(_))
    ));
}

#[test]
fn test_failed_configure_keeps_previous_policy() {
    let system = make_test_system();
    let mut detection = CollisionDetection::new();
    detection.configure(&bind_centers_params(), &system).unwrap();
    let before = detection.get_params();

    let mut bad = point_of_collision_params();
    bad.insert("vs_placement".into(), 1.5.into());
    assert!(detection.configure(&bad, &system).is_err());

    assert_eq!(detection.mode(), Mode::BindCenters);
    assert_eq!(detection.get_params(), before);
}

#[test]
fn test_snapshot_survives_reconfigure() {
    let system = make_test_system();
    let mut detection = CollisionDetection::new();
    detection.configure(&bind_centers_params(), &system).unwrap();

    let snapshot = detection.policy();
    detection.configure(&glue_params(), &system).unwrap();

    assert_eq!(snapshot.mode(), Mode::BindCenters);
    assert_eq!(detection.mode(), Mode::GlueToSurface);
}

#[test]
fn test_get_params_round_trip() {
    let system = make_test_system();
    for params in [
        bind_centers_params(),
        point_of_collision_params(),
        glue_params(),
        three_particle_params(),
    ] {
        let mut detection = CollisionDetection::new();
        detection.configure(&params, &system).unwrap();

        let echoed = detection.get_params();
        assert_eq!(echoed.len(), params.len());

        let mut again = CollisionDetection::new();
        again.configure(&echoed, &system).unwrap();
        assert_eq!(*again.policy(), *detection.policy());
    }
}

#[test]
fn test_unused_parameters_read_null() {
    let system = make_test_system();
    let mut detection = CollisionDetection::new();
    detection.configure(&bind_centers_params(), &system).unwrap();

    assert_eq!(detection.get_parameter("bond_vs").unwrap(), ParamValue::Null);
    assert_eq!(detection.get_parameter("vs_placement").unwrap(), ParamValue::Null);
    assert_eq!(detection.get_parameter("bond_centers").unwrap(), ParamValue::Int(0));
    assert!(matches!(
        detection.get_parameter("colour"),
        Err(BondingError::ValidationError(_))
    ));
}

#[test]
fn test_configure_json() {
    let system = make_test_system();
    let mut detection = CollisionDetection::new();

    detection
        .configure_json(
            r#"{"mode": "bind_centers", "bond_centers": 0, "distance": 1.25}"#,
            &system,
        )
        .unwrap();

    assert_eq!(detection.policy().distance(), Some(1.25));
    assert_eq!(detection.policy().bond_centers(), Some(BondTypeId(0)));
}

fn assert_invalid(params: CollisionParams, system: &ParticleSystem) {
    let mut detection = CollisionDetection::new();
    let result = detection.configure(&params, system);
    assert!(
        matches!(result, Err(BondingError::ValidationError(_))),
        "expected ValidationError, got {result:?}"
    );
    assert_eq!(detection.mode(), Mode::Off);
}

#[test]
fn test_unknown_bond_type_rejected() {
    let system = make_test_system();
    let mut params = bind_centers_params();
    params.insert("bond_centers".into(), 42i64.into());
    assert_invalid(params, &system);
}

#[test]
fn test_angle_bond_as_center_bond_rejected() {
    let system = make_test_system();
    let mut params = bind_centers_params();
    params.insert("bond_centers".into(), 2i64.into());
    assert_invalid(params, &system);
}

#[test]
fn test_non_positive_distance_rejected() {
    let system = make_test_system();
    for distance in [0.0, -1.0] {
        let mut params = bind_centers_params();
        params.insert("distance".into(), distance.into());
        assert_invalid(params, &system);
    }
}

#[test]
fn test_vs_placement_range() {
    let system = make_test_system();
    for placement in [0.0, 1.0] {
        let mut params = point_of_collision_params();
        params.insert("vs_placement".into(), placement.into());
        let mut detection = CollisionDetection::new();
        detection.configure(&params, &system).unwrap();
    }
    for placement in [-0.1, 1.1] {
        let mut params = point_of_collision_params();
        params.insert("vs_placement".into(), placement.into());
        assert_invalid(params, &system);
    }
}

#[test]
fn test_vs_type_must_not_be_physical() {
    let system = make_test_system();
    let mut params = point_of_collision_params();
    params.insert("part_type_vs".into(), 1i64.into());
    assert_invalid(params, &system);
}

#[test]
fn test_glue_types_must_differ() {
    let system = make_test_system();
    let mut params = glue_params();
    params.insert("part_type_after_glueing".into(), 7i64.into());
    assert_invalid(params, &system);

    let mut params = glue_params();
    params.insert("part_type_to_attach_vs_to".into(), 0i64.into());
    assert_invalid(params, &system);
}

#[test]
fn test_glue_distance_to_vs_positive() {
    let system = make_test_system();
    let mut params = glue_params();
    params.insert("distance_glued_particle_to_vs".into(), 0.0.into());
    assert_invalid(params, &system);
}

#[test]
fn test_three_particle_angle_range() {
    let system = make_test_system();

    // 2 + 4 reaches past the last angle bond
    let mut params = three_particle_params();
    params.insert("three_particle_binding_angle_resolution".into(), 4i64.into());
    assert_invalid(params, &system);

    // starting on the virtual bond
    let mut params = three_particle_params();
    params.insert("bond_three_particles".into(), 1i64.into());
    assert_invalid(params, &system);

    let mut params = three_particle_params();
    params.insert("three_particle_binding_angle_resolution".into(), 0i64.into());
    assert_invalid(params, &system);
}

#[test]
fn test_revalidate_after_system_changes() {
    let mut system = make_test_system();
    let mut detection = CollisionDetection::new();
    detection.configure(&point_of_collision_params(), &system).unwrap();

    system.add_particle(ParticleType(7), Point3::new(5.0, 5.0, 5.0)).unwrap();

    assert!(matches!(
        detection.validate(&system),
        Err(BondingError::ValidationError(_))
    ));
}

#[test]
fn test_install_typed_policy() {
    let system = make_test_system();
    let mut detection = CollisionDetection::new();

    detection
        .install(
            CollisionPolicy::BindCenters {
                bond_centers: BondTypeId(0),
                distance: 2.0,
            },
            &system,
        )
        .unwrap();

    assert_eq!(detection.get_parameter("distance").unwrap(), ParamValue::Float(2.0));
}
