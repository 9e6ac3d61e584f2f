//! Weather transition matrix and condition rolls.
//!
//! Weather changes are drawn from a per-(season, current-weather)
//! probability row. Rows are validated up front: every pair has a row,
//! every row sums to 1.0 within [`WEIGHT_TOLERANCE`], and every row
//! carries an explicit self-transition entry, so a bad table is caught
//! at startup instead of surfacing as a skewed draw hours in.

use std::collections::HashMap;

use rand::Rng;

use aether_events::{Season, Weather, WeatherCondition};

use crate::config::ConfigError;

/// Allowed deviation of a row's weight sum from 1.0.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Stay probability used by the standard matrix.
const STANDARD_STAY: f64 = 0.6;

/// Weather preferred by each season, in the standard matrix.
fn seasonal_pattern(season: Season) -> &'static [Weather] {
    match season {
        Season::Spring => &[Weather::Clear, Weather::Rain, Weather::Cloudy],
        Season::Summer => &[Weather::Clear, Weather::Storm, Weather::Cloudy],
        Season::Autumn => &[Weather::Cloudy, Weather::Rain, Weather::Fog],
        Season::Winter => &[Weather::Snow, Weather::Cloudy, Weather::Clear],
    }
}

/// Transition probabilities keyed by season and current weather.
#[derive(Debug, Clone)]
pub struct WeatherMatrix {
    rows: HashMap<(Season, Weather), Vec<(Weather, f64)>>,
}

impl WeatherMatrix {
    /// Empty matrix. Invalid until a row exists for every
    /// (season, weather) pair; see [`WeatherMatrix::validate`].
    pub fn empty() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }

    /// The built-in matrix: from any weather, stay with probability 0.6
    /// and otherwise drift toward the season's preferred weather.
    pub fn standard() -> Self {
        let mut matrix = Self::empty();
        for &season in Season::all() {
            let pattern = seasonal_pattern(season);
            for &current in Weather::all() {
                let targets: Vec<Weather> =
                    pattern.iter().copied().filter(|&w| w != current).collect();
                let mut row = vec![(current, STANDARD_STAY)];
                if targets.is_empty() {
                    row = vec![(current, 1.0)];
                } else {
                    let share = (1.0 - STANDARD_STAY) / targets.len() as f64;
                    for target in targets {
                        row.push((target, share));
                    }
                }
                matrix.set_row(season, current, row);
            }
        }
        matrix
    }

    /// Replaces the row for `(season, from)`.
    pub fn set_row(&mut self, season: Season, from: Weather, row: Vec<(Weather, f64)>) {
        self.rows.insert((season, from), row);
    }

    pub fn row(&self, season: Season, from: Weather) -> Option<&[(Weather, f64)]> {
        self.rows.get(&(season, from)).map(|r| r.as_slice())
    }

    /// Checks every (season, weather) pair: a row must exist, weights
    /// must be non-negative and sum to 1.0 within tolerance, and the
    /// row must name its own weather explicitly.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for &season in Season::all() {
            for &from in Weather::all() {
                let Some(row) = self.rows.get(&(season, from)) else {
                    return Err(ConfigError::Invalid(format!(
                        "weather matrix is missing a row for {} {}",
                        season, from
                    )));
                };
                let mut total = 0.0;
                let mut has_self = false;
                for &(to, weight) in row {
                    if weight < 0.0 {
                        return Err(ConfigError::Invalid(format!(
                            "weather matrix row {} {} has negative weight {} for {}",
                            season, from, weight, to
                        )));
                    }
                    if to == from {
                        has_self = true;
                    }
                    total += weight;
                }
                if (total - 1.0).abs() > WEIGHT_TOLERANCE {
                    return Err(ConfigError::Invalid(format!(
                        "weather matrix row {} {} sums to {} (expected 1.0)",
                        season, from, total
                    )));
                }
                if !has_self {
                    return Err(ConfigError::Invalid(format!(
                        "weather matrix row {} {} has no explicit self-transition",
                        season, from
                    )));
                }
            }
        }
        Ok(())
    }

    /// Draws the next weather for the given season. Falls back to the
    /// current weather when the row is absent or degenerate.
    pub fn next_weather<R: Rng>(&self, rng: &mut R, season: Season, current: Weather) -> Weather {
        let Some(row) = self.rows.get(&(season, current)) else {
            return current;
        };
        let total: f64 = row.iter().map(|(_, weight)| weight).sum();
        if total <= 0.0 {
            return current;
        }

        let mut roll = rng.gen::<f64>() * total;
        for &(weather, weight) in row {
            roll -= weight;
            if roll <= 0.0 {
                return weather;
            }
        }
        row.last().map(|&(weather, _)| weather).unwrap_or(current)
    }
}

/// Rolls fresh intensity, visibility and wind for a weather type.
pub fn roll_conditions<R: Rng>(rng: &mut R, weather: Weather) -> WeatherCondition {
    let intensity = rng.gen_range(0.3..1.0);
    let (visibility, wind_speed) = match weather {
        Weather::Clear => (1.0, rng.gen_range(0.0..10.0)),
        Weather::Cloudy => (rng.gen_range(0.7..1.0), rng.gen_range(5.0..20.0)),
        Weather::Rain => (rng.gen_range(0.6..0.9), rng.gen_range(10.0..30.0)),
        Weather::Storm => (rng.gen_range(0.3..0.6), rng.gen_range(40.0..80.0)),
        Weather::Fog => (rng.gen_range(0.2..0.5), rng.gen_range(0.0..5.0)),
        Weather::Snow => (rng.gen_range(0.4..0.8), rng.gen_range(5.0..25.0)),
        Weather::CrystalStorm => (rng.gen_range(0.4..0.7), rng.gen_range(20.0..60.0)),
    };
    let intensity = if weather == Weather::CrystalStorm {
        rng.gen_range(0.7..1.0)
    } else {
        intensity
    };
    WeatherCondition::new(weather, intensity, visibility, wind_speed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_standard_matrix_is_valid() {
        WeatherMatrix::standard().validate().unwrap();
    }

    #[test]
    fn test_standard_rows_cover_every_pair() {
        let matrix = WeatherMatrix::standard();
        for &season in Season::all() {
            for &weather in Weather::all() {
                assert!(
                    matrix.row(season, weather).is_some(),
                    "missing row for {} {}",
                    season,
                    weather
                );
            }
        }
    }

    #[test]
    fn test_missing_row_fails_validation() {
        let mut matrix = WeatherMatrix::standard();
        matrix.rows.remove(&(Season::Winter, Weather::Snow));
        let err = matrix.validate().unwrap_err();
        assert!(err.to_string().contains("missing a row"));
    }

    #[test]
    fn test_bad_sum_fails_validation() {
        let mut matrix = WeatherMatrix::standard();
        matrix.set_row(
            Season::Spring,
            Weather::Clear,
            vec![(Weather::Clear, 0.5), (Weather::Rain, 0.4)],
        );
        let err = matrix.validate().unwrap_err();
        assert!(err.to_string().contains("sums to"));
    }

    #[test]
    fn test_missing_self_transition_fails_validation() {
        let mut matrix = WeatherMatrix::standard();
        matrix.set_row(
            Season::Spring,
            Weather::Clear,
            vec![(Weather::Rain, 0.5), (Weather::Cloudy, 0.5)],
        );
        let err = matrix.validate().unwrap_err();
        assert!(err.to_string().contains("self-transition"));
    }

    #[test]
    fn test_negative_weight_fails_validation() {
        let mut matrix = WeatherMatrix::standard();
        matrix.set_row(
            Season::Spring,
            Weather::Clear,
            vec![(Weather::Clear, 1.2), (Weather::Rain, -0.2)],
        );
        let err = matrix.validate().unwrap_err();
        assert!(err.to_string().contains("negative weight"));
    }

    #[test]
    fn test_next_weather_only_draws_from_row() {
        let matrix = WeatherMatrix::standard();
        let mut rng = SmallRng::seed_from_u64(7);
        // Winter from Snow: row holds Snow plus the winter pattern
        for _ in 0..200 {
            let next = matrix.next_weather(&mut rng, Season::Winter, Weather::Snow);
            assert!(
                matches!(next, Weather::Snow | Weather::Cloudy | Weather::Clear),
                "unexpected draw {}",
                next
            );
        }
    }

    #[test]
    fn test_next_weather_certain_row() {
        let mut matrix = WeatherMatrix::standard();
        matrix.set_row(
            Season::Summer,
            Weather::Clear,
            vec![(Weather::Clear, 0.0), (Weather::Storm, 1.0)],
        );
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(
                matrix.next_weather(&mut rng, Season::Summer, Weather::Clear),
                Weather::Storm
            );
        }
    }

    #[test]
    fn test_draw_frequencies_converge_on_row_weights() {
        let mut matrix = WeatherMatrix::empty();
        matrix.set_row(
            Season::Autumn,
            Weather::Fog,
            vec![(Weather::Fog, 0.6), (Weather::Cloudy, 0.3), (Weather::Rain, 0.1)],
        );

        let mut rng = SmallRng::seed_from_u64(31);
        let samples = 10_000;
        let mut fog = 0u32;
        let mut cloudy = 0u32;
        let mut rain = 0u32;
        for _ in 0..samples {
            match matrix.next_weather(&mut rng, Season::Autumn, Weather::Fog) {
                Weather::Fog => fog += 1,
                Weather::Cloudy => cloudy += 1,
                Weather::Rain => rain += 1,
                other => panic!("unexpected draw {}", other),
            }
        }

        let freq = |count: u32| count as f64 / samples as f64;
        assert!((freq(fog) - 0.6).abs() < 0.05, "fog frequency {}", freq(fog));
        assert!((freq(cloudy) - 0.3).abs() < 0.05, "cloudy frequency {}", freq(cloudy));
        assert!((freq(rain) - 0.1).abs() < 0.05, "rain frequency {}", freq(rain));
    }

    #[test]
    fn test_roll_conditions_ranges() {
        let mut rng = SmallRng::seed_from_u64(99);
        for _ in 0..100 {
            let storm = roll_conditions(&mut rng, Weather::Storm);
            assert!(storm.visibility >= 0.3 && storm.visibility < 0.6);
            assert!(storm.wind_speed >= 40.0 && storm.wind_speed < 80.0);

            let crystal = roll_conditions(&mut rng, Weather::CrystalStorm);
            assert!(crystal.intensity >= 0.7, "crystal storms run hot");

            let clear = roll_conditions(&mut rng, Weather::Clear);
            assert!((clear.visibility - 1.0).abs() < f64::EPSILON);
        }
    }
}
