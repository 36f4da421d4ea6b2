use crate::error::ConfigError;
use crate::types::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_yaml(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.search;
        if s.budget == 0 {
            return Err(ConfigError::invalid("search.budget", "must be at least 1"));
        }
        if s.population_size == 0 {
            return Err(ConfigError::invalid("search.population_size", "must be at least 1"));
        }
        if s.tournament_size == 0 {
            return Err(ConfigError::invalid("search.tournament_size", "must be at least 1"));
        }
        if s.max_road_attempts == 0 {
            return Err(ConfigError::invalid("search.max_road_attempts", "must be at least 1"));
        }
        if s.event_capacity == 0 {
            return Err(ConfigError::invalid("search.event_capacity", "must be at least 1"));
        }

        let cf = &self.car_following;
        if !(cf.min_speed_kmh > 0.0 && cf.min_speed_kmh < cf.max_speed_kmh) {
            return Err(ConfigError::invalid(
                "car_following.min_speed_kmh",
                format!("need 0 < min ({}) < max ({})", cf.min_speed_kmh, cf.max_speed_kmh),
            ));
        }
        if cf.lane_width <= 0.0 {
            return Err(ConfigError::invalid("car_following.lane_width", "must be positive"));
        }
        if cf.inter_node_distance <= 0.0 {
            return Err(ConfigError::invalid("car_following.inter_node_distance", "must be positive"));
        }
        if cf.node_count < 2 {
            return Err(ConfigError::invalid("car_following.node_count", "need at least 2 waypoints"));
        }
        if cf.road_node_count < 2 {
            return Err(ConfigError::invalid("car_following.road_node_count", "need at least 2 nodes"));
        }
        if cf.nominal_gap <= 0.0 {
            return Err(ConfigError::invalid("car_following.nominal_gap", "must be positive"));
        }
        if !(cf.lateral_min <= cf.lateral_repair_low
            && cf.lateral_repair_low <= cf.lateral_repair_high
            && cf.lateral_repair_high <= cf.lateral_max)
        {
            return Err(ConfigError::invalid(
                "car_following.lateral_min",
                "need lateral_min <= repair_low <= repair_high <= lateral_max",
            ));
        }
        if cf.temporal_sigma < 0.0 || cf.lateral_sigma_factor < 0.0 {
            return Err(ConfigError::invalid("car_following.temporal_sigma", "noise must be non-negative"));
        }

        let pr = &self.procedural_road;
        if pr.segment_count < 2 {
            return Err(ConfigError::invalid("procedural_road.segment_count", "need at least 2"));
        }
        for (field, lo, hi) in [
            ("procedural_road.min_length", pr.min_length, pr.max_length),
            ("procedural_road.min_radius", pr.min_radius, pr.max_radius),
            ("procedural_road.min_angle", pr.min_angle, pr.max_angle),
        ] {
            if lo == 0 || lo >= hi {
                return Err(ConfigError::invalid(field, format!("need 0 < {} < {}", lo, hi)));
            }
        }
        if pr.max_angle > 180 {
            return Err(ConfigError::invalid("procedural_road.max_angle", "turns are limited to 180°"));
        }
        if !(0.0..=1.0).contains(&pr.straight_probability) {
            return Err(ConfigError::invalid("procedural_road.straight_probability", "must be in [0, 1]"));
        }
        if pr.lane_width <= 0.0 || pr.sampling_unit <= 0.0 || pr.lead_in_length <= 0.0 {
            return Err(ConfigError::invalid(
                "procedural_road.sampling_unit",
                "lane width, sampling unit and lead-in must be positive",
            ));
        }

        let sim = &self.simulation;
        if sim.car_following_steps == 0 || sim.procedural_road_steps == 0 {
            return Err(ConfigError::invalid("simulation.car_following_steps", "step budgets must be positive"));
        }
        if sim.target_margin < 0.0 {
            return Err(ConfigError::invalid("simulation.target_margin", "must be non-negative"));
        }

        Ok(())
    }
}
