// src/search/mutation.rs
//
// Mutation-repair operators. Both are pure: they clone, perturb and return.
//
// Car-following (per waypoint, each with probability 1 / NODE_ARITY):
//   lateral   y += N(0, lane_width * σ)        snapped back into the band
//   temporal  gap += N(0, σ_t)                 repaired into [v_min, v_max]
// A temporal change at node i shifts node i and every later node by the same
// cumulative delta, so gaps downstream keep their length.
//
// Procedural road (per segment, probability 1 / segment count):
//   50%  replace the segment with a freshly drawn one
//   50%  redraw one numeric attribute in place

use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use super::individual::{CarFollowingIndividual, RoadIndividual};
use crate::error::ConfigError;
use crate::geometry::EPSILON;
use crate::trajectory::{DrivingAction, ManeuverSegment, MPS_TO_KMH};
use crate::types::{CarFollowingConfig, ProceduralRoadConfig};

/// Mutable fields of a waypoint (x, y, z, t); the per-node mutation
/// probability is its reciprocal.
pub const NODE_ARITY: usize = 4;

/// Probability of redrawing a whole segment rather than one attribute.
const REPLACE_PROBABILITY: f64 = 0.5;

// ============================================================================
// CAR-FOLLOWING
// ============================================================================

#[derive(Debug, Clone)]
pub struct CarFollowingMutator {
    lateral_noise: Normal<f64>,
    temporal_noise: Normal<f64>,
    lateral_min: f64,
    lateral_max: f64,
    repair_low: f64,
    repair_high: f64,
    min_speed_kmh: f64,
    max_speed_kmh: f64,
}

impl CarFollowingMutator {
    pub fn new(cf: &CarFollowingConfig) -> Result<Self, ConfigError> {
        if !(cf.min_speed_kmh > 0.0 && cf.min_speed_kmh < cf.max_speed_kmh) {
            return Err(ConfigError::invalid(
                "car_following.min_speed_kmh",
                "need 0 < min speed < max speed",
            ));
        }
        let lateral_noise = Normal::new(0.0, cf.lane_width * cf.lateral_sigma_factor)
            .map_err(|e| ConfigError::invalid("car_following.lateral_sigma_factor", e.to_string()))?;
        let temporal_noise = Normal::new(0.0, cf.temporal_sigma)
            .map_err(|e| ConfigError::invalid("car_following.temporal_sigma", e.to_string()))?;

        Ok(Self {
            lateral_noise,
            temporal_noise,
            lateral_min: cf.lateral_min,
            lateral_max: cf.lateral_max,
            repair_low: cf.lateral_repair_low,
            repair_high: cf.lateral_repair_high,
            min_speed_kmh: cf.min_speed_kmh,
            max_speed_kmh: cf.max_speed_kmh,
        })
    }

    pub fn mutate<R: Rng>(&self, individual: &CarFollowingIndividual, rng: &mut R) -> CarFollowingIndividual {
        let p = 1.0 / NODE_ARITY as f64;
        let mut mutant = individual.clone();

        for (index, wp) in mutant.waypoints.iter_mut().enumerate() {
            if rng.gen::<f64>() <= p {
                let delta = self.lateral_noise.sample(rng);
                let moved = wp.y + delta;
                wp.y = self.snap_lateral(moved);
                debug!(node = index, delta, y = wp.y, snapped = moved != wp.y, "lateral mutation");
            }
        }

        self.retime(individual, &mut mutant, rng);
        mutant
    }

    /// Keep waypoints out of the oncoming lane and on the asphalt.
    pub fn snap_lateral(&self, y: f64) -> f64 {
        if y > self.lateral_max {
            self.repair_high
        } else if y < self.lateral_min {
            self.repair_low
        } else {
            y
        }
    }

    /// Shortest and longest gap (seconds) allowed to cover `distance` metres.
    pub fn gap_bounds(&self, distance: f64) -> (f64, f64) {
        (
            distance * MPS_TO_KMH / self.max_speed_kmh,
            distance * MPS_TO_KMH / self.min_speed_kmh,
        )
    }

    /// Replace `gap` by the exact bound gap when it implies a speed outside
    /// the limits. Coincident nodes cannot satisfy a minimum speed; their gap
    /// is only kept positive.
    pub fn repair_gap(&self, gap: f64, distance: f64) -> f64 {
        if distance <= EPSILON {
            return gap.max(EPSILON);
        }
        let (shortest, longest) = self.gap_bounds(distance);
        gap.clamp(shortest, longest)
    }

    fn retime<R: Rng>(&self, original: &CarFollowingIndividual, mutant: &mut CarFollowingIndividual, rng: &mut R) {
        let p = 1.0 / NODE_ARITY as f64;
        let mut cumulative_delta = 0.0;

        // Node 0 anchors the script; only gaps are mutated.
        for i in 1..mutant.waypoints.len() {
            let base_gap = original.waypoints[i].t - original.waypoints[i - 1].t;
            let mut delta = if rng.gen::<f64>() <= p {
                self.temporal_noise.sample(rng)
            } else {
                0.0
            };

            let distance = mutant.waypoints[i - 1]
                .position()
                .distance(mutant.waypoints[i].position());
            let wanted = base_gap + delta;
            let repaired = self.repair_gap(wanted, distance);
            if repaired != wanted {
                debug!(node = i, wanted, repaired, "inter-node time repaired");
                delta = repaired - base_gap;
            } else if delta != 0.0 {
                debug!(node = i, delta, "temporal mutation");
            }

            cumulative_delta += delta;
            mutant.waypoints[i].t = original.waypoints[i].t + cumulative_delta;
        }
    }
}

// ============================================================================
// PROCEDURAL ROAD
// ============================================================================

fn draw(rng: &mut impl Rng, lo: u32, hi: u32) -> f64 {
    // Upper bound exclusive; a collapsed range yields its lower bound.
    if hi > lo {
        f64::from(rng.gen_range(lo..hi))
    } else {
        f64::from(lo)
    }
}

/// One random road piece: straight with the configured probability, else a
/// right or left turn with equal odds. Parameters are whole numbers.
pub fn generate_random_segment<R: Rng>(pr: &ProceduralRoadConfig, rng: &mut R) -> DrivingAction {
    let segment = if rng.gen::<f64>() <= pr.straight_probability {
        ManeuverSegment::straight(draw(rng, pr.min_length, pr.max_length))
    } else if rng.gen::<f64>() <= 0.5 {
        ManeuverSegment::turn(
            -draw(rng, pr.min_angle, pr.max_angle),
            draw(rng, pr.min_radius, pr.max_radius),
        )
    } else {
        ManeuverSegment::turn(
            draw(rng, pr.min_angle, pr.max_angle),
            draw(rng, pr.min_radius, pr.max_radius),
        )
    };
    DrivingAction::single(segment)
}

/// `n_segments - 1` random pieces; the lead-in straight is the n-th.
pub fn generate_random_road<R: Rng>(n_segments: usize, pr: &ProceduralRoadConfig, rng: &mut R) -> RoadIndividual {
    let segments = (1..n_segments)
        .map(|_| generate_random_segment(pr, rng))
        .collect();
    RoadIndividual::new(segments)
}

#[derive(Debug, Clone)]
pub struct RoadMutator {
    config: ProceduralRoadConfig,
}

impl RoadMutator {
    pub fn new(config: ProceduralRoadConfig) -> Self {
        Self { config }
    }

    pub fn mutate<R: Rng>(&self, individual: &RoadIndividual, rng: &mut R) -> RoadIndividual {
        let mut mutant = individual.clone();
        if mutant.is_empty() {
            return mutant;
        }
        let p = 1.0 / mutant.len() as f64;

        for (index, action) in mutant.segments.iter_mut().enumerate() {
            if rng.gen::<f64>() > p {
                continue;
            }
            if rng.gen::<f64>() <= REPLACE_PROBABILITY {
                *action = generate_random_segment(&self.config, rng);
                debug!(segment = index, "road segment replaced");
            } else {
                match action.segments.first_mut() {
                    Some(segment) => self.change_attribute(segment, rng),
                    None => *action = generate_random_segment(&self.config, rng),
                }
                debug!(segment = index, "road segment attribute changed");
            }
        }
        mutant
    }

    fn change_attribute<R: Rng>(&self, segment: &mut ManeuverSegment, rng: &mut R) {
        let pr = &self.config;
        match segment {
            ManeuverSegment::Straight { length } => {
                *length = draw(rng, pr.min_length, pr.max_length);
            }
            ManeuverSegment::Turn { angle, radius } => {
                if rng.gen::<f64>() <= 0.5 {
                    let sign = if rng.gen::<f64>() <= 0.5 { 1.0 } else { -1.0 };
                    *angle = draw(rng, pr.min_angle, pr.max_angle) * sign;
                } else {
                    *radius = draw(rng, pr.min_radius, pr.max_radius);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::{speed_profile, Waypoint};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn mutator() -> CarFollowingMutator {
        CarFollowingMutator::new(&CarFollowingConfig::default()).unwrap()
    }

    fn assert_in_bounds(ind: &CarFollowingIndividual) {
        for (i, v) in speed_profile(&ind.waypoints).iter().enumerate() {
            assert!(
                (10.0 - 1e-9..=50.0 + 1e-9).contains(v),
                "gap {} implies {} km/h",
                i,
                v
            );
        }
    }

    #[test]
    fn test_gap_bounds_for_nominal_distance() {
        let (shortest, longest) = mutator().gap_bounds(20.0);
        assert!((shortest - 1.44).abs() < 1e-12);
        assert!((longest - 7.2).abs() < 1e-12);
    }

    #[test]
    fn test_repair_gap() {
        let m = mutator();
        assert_eq!(m.repair_gap(2.5, 20.0), 2.5);
        assert!((m.repair_gap(0.3, 20.0) - 1.44).abs() < 1e-12, "too fast → max speed gap");
        assert!((m.repair_gap(-4.0, 20.0) - 1.44).abs() < 1e-12, "negative gap is too fast");
        assert!((m.repair_gap(30.0, 20.0) - 7.2).abs() < 1e-12, "too slow → min speed gap");
    }

    #[test]
    fn test_snap_lateral() {
        let m = mutator();
        assert_eq!(m.snap_lateral(33.0), 30.0);
        assert_eq!(m.snap_lateral(23.9), 26.0);
        assert_eq!(m.snap_lateral(27.3), 27.3);
    }

    #[test]
    fn test_mutation_is_pure_and_keeps_first_time() {
        let seed = CarFollowingIndividual::seed(&CarFollowingConfig::default());
        let before = seed.clone();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let mutant = mutator().mutate(&seed, &mut rng);
            assert_eq!(mutant.waypoints[0].t, 0.0);
            assert_eq!(mutant.len(), seed.len());
            assert!(mutant.waypoints.iter().zip(&seed.waypoints).all(|(a, b)| a.x == b.x));
        }
        assert_eq!(seed, before);
    }

    #[test]
    fn test_mutation_changes_something_eventually() {
        let seed = CarFollowingIndividual::seed(&CarFollowingConfig::default());
        let mut rng = StdRng::seed_from_u64(11);
        let changed = (0..20).any(|_| mutator().mutate(&seed, &mut rng) != seed);
        assert!(changed, "20 mutations with p = 1/4 per field never changed anything");
    }

    #[test]
    fn test_random_segments_within_ranges() {
        let pr = ProceduralRoadConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        let (mut straights, mut lefts, mut rights) = (0, 0, 0);
        for _ in 0..500 {
            let action = generate_random_segment(&pr, &mut rng);
            assert_eq!(action.segments.len(), 1);
            match action.segments[0] {
                ManeuverSegment::Straight { length } => {
                    straights += 1;
                    assert!((5.0..50.0).contains(&length));
                    assert_eq!(length.fract(), 0.0);
                }
                ManeuverSegment::Turn { angle, radius } => {
                    if angle > 0.0 {
                        lefts += 1;
                    } else {
                        rights += 1;
                    }
                    assert!((10.0..90.0).contains(&angle.abs()));
                    assert!((10.0..50.0).contains(&radius));
                }
            }
        }
        assert!(straights > 100 && straights < 200, "≈30% straights, got {}", straights);
        assert!(lefts > 100 && rights > 100);
    }

    #[test]
    fn test_random_road_has_n_minus_one_segments() {
        let pr = ProceduralRoadConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(generate_random_road(5, &pr, &mut rng).len(), 4);
        assert!(generate_random_road(1, &pr, &mut rng).is_empty());
    }

    #[test]
    fn test_road_mutation_keeps_shape() {
        let pr = ProceduralRoadConfig::default();
        let m = RoadMutator::new(pr.clone());
        let mut rng = StdRng::seed_from_u64(9);
        let road = generate_random_road(5, &pr, &mut rng);
        let mut changed = false;
        for _ in 0..50 {
            let mutant = m.mutate(&road, &mut rng);
            assert_eq!(mutant.len(), road.len());
            changed |= mutant != road;
        }
        assert!(changed);
        assert!(m.mutate(&RoadIndividual::new(vec![]), &mut rng).is_empty());
    }

    fn arbitrary_individual() -> impl Strategy<Value = CarFollowingIndividual> {
        prop::collection::vec((24.0f64..32.0, 0.05f64..15.0), 2..8).prop_map(|nodes| {
            let mut t = 0.0;
            let waypoints = nodes
                .into_iter()
                .enumerate()
                .map(|(i, (y, gap))| {
                    if i > 0 {
                        t += gap;
                    }
                    Waypoint::new(20.0 * i as f64 + 15.0, y, -27.0, t)
                })
                .collect();
            CarFollowingIndividual::new(waypoints)
        })
    }

    proptest! {
        #[test]
        fn prop_speeds_stay_within_limits(seed in any::<u64>(), ind in arbitrary_individual()) {
            let m = mutator();
            let mut rng = StdRng::seed_from_u64(seed);
            let mut current = ind;
            for _ in 0..10 {
                current = m.mutate(&current, &mut rng);
                assert_in_bounds(&current);
            }
        }

        #[test]
        fn prop_arrival_times_strictly_increase(seed in any::<u64>()) {
            let m = mutator();
            let mut rng = StdRng::seed_from_u64(seed);
            let mut current = CarFollowingIndividual::seed(&CarFollowingConfig::default());
            for _ in 0..20 {
                current = m.mutate(&current, &mut rng);
                let times = current.arrival_times();
                prop_assert!(times.windows(2).all(|w| w[1] > w[0]), "times {:?}", times);
            }
        }

        #[test]
        fn prop_lateral_offsets_stay_in_band(seed in any::<u64>()) {
            let m = mutator();
            let mut rng = StdRng::seed_from_u64(seed);
            let mut current = CarFollowingIndividual::seed(&CarFollowingConfig::default());
            for _ in 0..20 {
                current = m.mutate(&current, &mut rng);
                prop_assert!(current.waypoints.iter().all(|w| (24.0..=32.0).contains(&w.y)));
            }
        }

        #[test]
        fn prop_road_mutation_stays_in_ranges(seed in any::<u64>()) {
            let pr = ProceduralRoadConfig::default();
            let m = RoadMutator::new(pr.clone());
            let mut rng = StdRng::seed_from_u64(seed);
            let mut road = generate_random_road(5, &pr, &mut rng);
            for _ in 0..10 {
                road = m.mutate(&road, &mut rng);
            }
            for action in &road.segments {
                prop_assert!(action.segments.iter().all(|s| s.validate().is_ok()));
            }
        }
    }
}
