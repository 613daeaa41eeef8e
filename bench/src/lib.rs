//! Benchmark utilities for tiny_ecs.
//!
//! This crate holds the shared fixtures for the criterion microbenchmarks in `benches/`:
//!
//! - **Components and events** representative of game data ([`components`])
//! - **World seeding** with a reproducible mix of component layouts ([`populate`])
//! - **Listeners** that do a trivial amount of work per event ([`Counter`])
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p tiny_ecs_bench
//!
//! # Run specific benchmark group
//! cargo bench -p tiny_ecs_bench -- query
//! ```
//!
//! Results are written to `target/criterion/` with HTML reports for visualization.

pub mod components;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tiny_ecs::{
    entity::{self, EntityManager},
    event::{Failure, Listener},
};

use crate::components::{Health, Hit, Position, Velocity};

/// Seed used for every generated world, so runs are comparable.
pub const SEED: u64 = 0x7e57_ec5;

/// Create `count` entities with a random mix of components.
///
/// Every entity gets a [`Position`]; about half also get a [`Velocity`] and about a quarter a
/// [`Health`]. Returns the created ids in creation order.
pub fn populate(entities: &mut EntityManager, count: usize) -> Vec<entity::Id> {
    let mut rng = StdRng::seed_from_u64(SEED);

    (0..count)
        .map(|i| {
            let id = entities.create_entity(None).id();
            let Ok(mut entity) = entities.entity_mut(id) else {
                return id;
            };

            entity.add(Position {
                x: i as f32,
                ..Default::default()
            });
            if rng.gen_bool(0.5) {
                entity.add(Velocity {
                    x: rng.gen_range(-1.0..1.0),
                    ..Default::default()
                });
            }
            if rng.gen_bool(0.25) {
                entity.add(Health(rng.gen_range(1..100)));
            }
            id
        })
        .collect()
}

/// Pick `count` random ids out of `ids`, possibly with repeats. Empty when `ids` is empty.
pub fn sample(ids: &[entity::Id], count: usize) -> Vec<entity::Id> {
    if ids.is_empty() {
        return Vec::new();
    }
    let mut rng = StdRng::seed_from_u64(SEED ^ count as u64);
    (0..count)
        .map(|_| ids[rng.gen_range(0..ids.len())])
        .collect()
}

/// A listener summing the damage of every [`Hit`] it sees.
#[derive(Debug, Default)]
pub struct Counter {
    pub total: u64,
}

impl Listener<Hit> for Counter {
    fn on_event(&mut self, event: &Hit) -> Result<(), Failure> {
        self.total += u64::from(event.damage);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_of_nothing_is_empty() {
        assert!(sample(&[], 8).is_empty());
    }

    #[test]
    fn sample_picks_from_given_ids() {
        // Given
        let mut entities = EntityManager::default();
        let ids = populate(&mut entities, 16);

        // When
        let picked = sample(&ids, 8);

        // Then
        assert_eq!(picked.len(), 8);
        assert!(picked.iter().all(|id| ids.contains(id)));
        assert_eq!(picked, sample(&ids, 8));
    }
}
