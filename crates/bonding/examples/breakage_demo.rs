//! Bond formation and breakage example
//!
//! Particles in a box jiggle randomly. Colliding pairs are bound at their
//! point of collision through two virtual sites; when the virtual-site bond
//! is stretched too far, the whole construct is dissolved again.
//!
//! Run with: RUST_LOG=debug cargo run --package bonding --example breakage_demo

use bonding::collisions::GridDetector;
use bonding::lifecycle::BondLifecycle;
use bonding::params::collision_params;
use nalgebra::{Point3, Vector3};
use particles::{BondType, ParticleId, ParticleSystem, ParticleType};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn main() {
    env_logger::init();

    println!("Bond Lifecycle Demo: binding at the point of collision\n");
    println!("{}", "=".repeat(60));

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut system = ParticleSystem::new();

    let center_bond = system.bond_types.add(BondType::harmonic(50.0, 0.5));
    let vs_bond = system
        .bond_types
        .add(BondType::virtual_bond().with_breaking_distance(0.6));

    let extent = 4.0;
    let n_particles = 60;
    for _ in 0..n_particles {
        let pos = Point3::new(
            rng.random_range(0.0..extent),
            rng.random_range(0.0..extent),
            rng.random_range(0.0..extent),
        );
        if let Err(e) = system.add_particle(ParticleType(0), pos) {
            eprintln!("{e}");
            return;
        }
    }
    let real: Vec<ParticleId> = system.particles.iter().map(|p| p.id).collect();

    let mut lifecycle = BondLifecycle::new().with_detector(GridDetector);
    let params = collision_params([
        ("mode", "bind_at_point_of_collision".into()),
        ("bond_centers", (center_bond.0 as i64).into()),
        ("bond_vs", (vs_bond.0 as i64).into()),
        ("part_type_vs", 1i64.into()),
        ("distance", 0.4.into()),
        ("vs_placement", 0.5.into()),
    ]);
    if let Err(e) = lifecycle.detection.configure(&params, &system) {
        eprintln!("invalid collision parameters: {e}");
        return;
    }
    for handler in ["print_queue_entry", "break_bind_at_point_of_collision"] {
        if let Err(e) = lifecycle.breakage.add_handler(handler) {
            eprintln!("{e}");
            return;
        }
    }

    println!("\nSetup:");
    println!("  Particles: {}", n_particles);
    println!("  Box edge: {}", extent);
    println!("  Active handlers: {:?}", lifecycle.breakage.active_handlers());
    println!("  Collision parameters: {:?}", lifecycle.detection.get_params());

    let n_steps = 200;
    let kick = 0.05;
    let mut bonds_made = 0;
    let mut breakages = 0;

    println!("\n{}", "=".repeat(60));
    println!("Starting simulation...\n");

    for step in 0..n_steps {
        // Random walk; virtual sites move with the particle they represent
        for &id in &real {
            let dx = Vector3::new(
                rng.random_range(-kick..kick),
                rng.random_range(-kick..kick),
                rng.random_range(-kick..kick),
            );
            for moved in std::iter::once(id).chain(system.virtual_sites_of(id)) {
                if let Some(p) = system.get_mut(moved) {
                    p.position += dx;
                }
            }
        }

        match lifecycle.step(&mut system) {
            Ok(report) => {
                bonds_made += report.resolution.bonds_created;
                breakages += report.breakage_events;
                if report.resolution.bonds_created > 0 || report.breakage_events > 0 {
                    println!(
                        "step {:4}: {} collision(s), {} bond(s) created, {} breakage event(s)",
                        step,
                        report.collisions,
                        report.resolution.bonds_created,
                        report.breakage_events
                    );
                }
            }
            Err(e) => {
                println!("step {:4}: {}", step, e);
            }
        }
    }

    println!("{}", "=".repeat(60));
    println!("Simulation complete!\n");

    println!("Final statistics:");
    println!("  Bonds created: {}", bonds_made);
    println!("  Breakage events: {}", breakages);
    println!("  Virtual sites alive: {}", system.virtual_count());
    println!("  Bond instances alive: {}", system.bond_instance_count());

    println!("\n{}", "=".repeat(60));
    println!("Demo complete!");
}
