//! Robot motion scenarios.

use odom_trail_core::DisplayParameters;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// Constant speed around a 5m circle
    Circle,

    /// Figure-eight (lemniscate) crossing its own trail
    FigureEight,

    /// Robot standing still, only sensor noise moves it
    Idle,

    /// Constant speed with a randomly drifting heading
    RandomWalk,

    /// Fast straight line, long enough to overflow the trail capacity
    Dash,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Circle,
            ScenarioId::FigureEight,
            ScenarioId::Idle,
            ScenarioId::RandomWalk,
            ScenarioId::Dash,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Circle => "circle",
            ScenarioId::FigureEight => "figure_eight",
            ScenarioId::Idle => "idle",
            ScenarioId::RandomWalk => "random_walk",
            ScenarioId::Dash => "dash",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Circle => "0.5 rad/s around a 5m circle",
            ScenarioId::FigureEight => "Figure-eight over a 6m span, revisiting the center",
            ScenarioId::Idle => {
                "Stationary robot with sensor jitter; the distance gate should reject most samples"
            }
            ScenarioId::RandomWalk => "1 m/s with Gaussian heading drift",
            ScenarioId::Dash => "8 m/s straight line with a 100 point trail",
        }
    }

    /// Display parameters used when no configuration file is given.
    pub fn default_parameters(&self) -> DisplayParameters {
        let mut params = DisplayParameters {
            text_string: format!("robot ({})", self.name()),
            ..Default::default()
        };
        match self {
            ScenarioId::Idle => params.min_distance = 0.01,
            ScenarioId::Dash => {
                params.max_points = 100;
                params.min_distance = 0.05;
            }
            _ => {}
        }
        params
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "circle" => Ok(ScenarioId::Circle),
            "figure_eight" | "figureeight" | "eight" => Ok(ScenarioId::FigureEight),
            "idle" | "stationary" => Ok(ScenarioId::Idle),
            "random_walk" | "randomwalk" => Ok(ScenarioId::RandomWalk),
            "dash" => Ok(ScenarioId::Dash),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_from_str() {
        for id in ScenarioId::all() {
            assert_eq!(id.name().parse::<ScenarioId>(), Ok(id));
        }
        assert!("warp_speed".parse::<ScenarioId>().is_err());
    }

    #[test]
    fn test_dash_overflows_capacity() {
        let params = ScenarioId::Dash.default_parameters();
        assert_eq!(params.max_points, 100);
        assert!(params.label_visible());
    }
}
