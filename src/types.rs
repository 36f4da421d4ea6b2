use serde::{Deserialize, Serialize};

/// Top-level configuration, one section per concern. Every section falls back
/// to its `Default` when omitted from the YAML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub car_following: CarFollowingConfig,
    pub procedural_road: ProceduralRoadConfig,
    pub simulation: SimulationConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Single individual, lower fitness is better (car-following).
    HillClimb,
    /// Population with tournament selection, higher fitness is better
    /// (procedural roads).
    Genetic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub strategy: SearchStrategy,
    /// Number of generations after the seed evaluation.
    pub budget: u32,
    pub population_size: usize,
    pub tournament_size: usize,
    /// Fixed seed for reproducible runs; entropy-seeded when absent.
    pub seed: Option<u64>,
    /// Attempts to draw a valid random road before giving up on a slot.
    pub max_road_attempts: usize,
    pub event_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::HillClimb,
            budget: 10,
            population_size: 4,
            tournament_size: 3,
            seed: None,
            max_road_attempts: 50,
            event_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarFollowingConfig {
    pub lane_width: f64,
    pub inter_node_distance: f64,
    /// Gap between ego and lead vehicle at start (metres).
    pub initial_distance: f64,
    pub car_length: f64,
    /// Waypoints in the lead vehicle script.
    pub node_count: usize,
    /// Seconds between consecutive seed waypoints.
    pub nominal_gap: f64,
    pub min_speed_kmh: f64,
    pub max_speed_kmh: f64,
    /// Road nodes of the straight test road.
    pub road_node_count: usize,
    pub road_center_y: f64,
    /// Admissible lateral band for waypoints; values beyond it are
    /// snapped back to the repair targets.
    pub lateral_min: f64,
    pub lateral_max: f64,
    pub lateral_repair_low: f64,
    pub lateral_repair_high: f64,
    /// Lateral noise std as a fraction of lane width.
    pub lateral_sigma_factor: f64,
    /// Temporal noise std (seconds).
    pub temporal_sigma: f64,
    pub ground_level: f64,
}

impl Default for CarFollowingConfig {
    fn default() -> Self {
        Self {
            lane_width: 4.0,
            inter_node_distance: 20.0,
            initial_distance: 15.0,
            car_length: 5.0,
            node_count: 5,
            nominal_gap: 2.5,
            min_speed_kmh: 10.0,
            max_speed_kmh: 50.0,
            road_node_count: 10,
            road_center_y: 30.0,
            lateral_min: 24.0,
            lateral_max: 32.0,
            lateral_repair_low: 26.0,
            lateral_repair_high: 30.0,
            lateral_sigma_factor: 0.25,
            temporal_sigma: 1.0,
            ground_level: -28.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProceduralRoadConfig {
    /// Roads carry `segment_count - 1` random segments after the lead-in.
    pub segment_count: usize,
    /// Integer parameter ranges, upper bound exclusive.
    pub min_length: u32,
    pub max_length: u32,
    pub min_radius: u32,
    pub max_radius: u32,
    pub min_angle: u32,
    pub max_angle: u32,
    pub straight_probability: f64,
    pub lane_width: f64,
    pub sampling_unit: f64,
    pub lead_in_length: f64,
    pub start_x: f64,
    pub start_y: f64,
    pub start_heading_deg: f64,
    /// Distance of the ego start along the lead-in straight.
    pub car_start_offset: f64,
    pub ground_level: f64,
    pub speed_limit_kmh: f64,
}

impl Default for ProceduralRoadConfig {
    fn default() -> Self {
        Self {
            segment_count: 5,
            min_length: 5,
            max_length: 50,
            min_radius: 10,
            max_radius: 50,
            min_angle: 10,
            max_angle: 90,
            straight_probability: 0.3,
            lane_width: 4.0,
            sampling_unit: 5.0,
            lead_in_length: 10.0,
            start_x: 0.0,
            start_y: 0.0,
            start_heading_deg: 0.0,
            car_start_offset: 5.0,
            ground_level: -28.0,
            speed_limit_kmh: 70.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub steps_per_second: u32,
    /// Oracle checks per car-following run before timing out.
    pub car_following_steps: u32,
    pub car_following_ticks_per_step: u32,
    pub procedural_road_steps: u32,
    pub procedural_road_ticks_per_step: u32,
    /// Target radius is `2 * lane_width + target_margin`.
    pub target_margin: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps_per_second: 60,
            car_following_steps: 60,
            car_following_ticks_per_step: 60,
            procedural_road_steps: 120,
            procedural_road_ticks_per_step: 30,
            target_margin: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub report_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: "scenario_report.jsonl".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
