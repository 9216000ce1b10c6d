use crate::core::Coordinates;
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Датчик рельєфу: множник енергії для переходу між двома точками.
///
/// Для однакових точок повертає `NaN`, для різних не менше 2.
pub trait TerrainSensor: Send + Sync {
    fn coefficient(&self, from: Coordinates, to: Coordinates) -> f64;
}

#[derive(Debug)]
struct Terrain<R> {
    rng: R,
    factors: HashMap<Coordinates, f64>,
}

/// Датчик, що вперше побачену клітинку оцінює випадковим множником у [1, 3)
/// і надалі пам'ятає його.
#[derive(Debug)]
pub struct LandSensor<R> {
    terrain: Mutex<Terrain<R>>,
}

impl<R: Rng + Send> LandSensor<R> {
    pub fn new(rng: R) -> Self {
        Self {
            terrain: Mutex::new(Terrain {
                rng,
                factors: HashMap::new(),
            }),
        }
    }

    /// Евклідова відстань між точками.
    pub fn distance(&self, from: Coordinates, to: Coordinates) -> f64 {
        let dx = f64::from(to.x) - f64::from(from.x);
        let dy = f64::from(to.y) - f64::from(from.y);
        (dx * dx + dy * dy).sqrt()
    }
}

impl<R: Rng> Terrain<R> {
    fn factor(&mut self, point: Coordinates) -> f64 {
        let rng = &mut self.rng;
        *self
            .factors
            .entry(point)
            .or_insert_with(|| 1.0 + 2.0 * rng.gen::<f64>())
    }
}

impl<R: Rng + Send> TerrainSensor for LandSensor<R> {
    fn coefficient(&self, from: Coordinates, to: Coordinates) -> f64 {
        if from == to {
            return f64::NAN;
        }
        let mut terrain = self.terrain.lock().unwrap_or_else(PoisonError::into_inner);
        let a = terrain.factor(from);
        let b = terrain.factor(to);
        1.0 + (a + b) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_points() -> Vec<Coordinates> {
        vec![
            Coordinates::new(0, 0),
            Coordinates::new(5, 2),
            Coordinates::new(3, -7),
            Coordinates::new(-6, 4),
            Coordinates::new(-1, -8),
            Coordinates::new(0, 9),
            Coordinates::new(0, -10),
            Coordinates::new(13, 0),
            Coordinates::new(-12, 0),
        ]
    }

    #[test]
    fn test_coefficient_same_point_is_nan() {
        let sensor = LandSensor::new(StdRng::seed_from_u64(7));
        let p = Coordinates::new(5, 5);
        assert!(sensor.coefficient(p, p).is_nan());
    }

    #[test]
    fn test_coefficient_with_fixed_draw() {
        // Кожне f64 з цього генератора дорівнює рівно 0.5.
        let sensor = LandSensor::new(StepRng::new(1 << 63, 0));
        let c = sensor.coefficient(Coordinates::new(0, 0), Coordinates::new(5, 5));
        assert_relative_eq!(c, 3.0, epsilon = 0.01);
    }

    #[test]
    fn test_coefficient_not_less_than_two() {
        let sensor = LandSensor::new(StdRng::seed_from_u64(2024));
        let points = sample_points();
        for a in &points {
            for b in &points {
                if a != b {
                    let c = sensor.coefficient(*a, *b);
                    assert!(c >= 2.0, "коефіцієнт між {:?} і {:?} = {}", a, b, c);
                    assert!(c < 4.0);
                }
            }
        }
    }

    #[test]
    fn test_coefficient_is_stable_per_pair() {
        let sensor = LandSensor::new(StdRng::seed_from_u64(1));
        let a = Coordinates::new(1, 1);
        let b = Coordinates::new(1, 2);
        let first = sensor.coefficient(a, b);
        assert_relative_eq!(sensor.coefficient(a, b), first);
        assert_relative_eq!(sensor.coefficient(b, a), first);
    }

    #[test]
    fn test_seeded_sensors_agree() {
        let left = LandSensor::new(StdRng::seed_from_u64(99));
        let right = LandSensor::new(StdRng::seed_from_u64(99));
        let a = Coordinates::new(-3, 4);
        let b = Coordinates::new(-3, 5);
        assert_relative_eq!(left.coefficient(a, b), right.coefficient(a, b));
    }

    #[test]
    fn test_distance() {
        let sensor = LandSensor::new(StdRng::seed_from_u64(0));
        let p = Coordinates::new(5, 5);
        assert_relative_eq!(sensor.distance(p, p), 0.0);
        assert_relative_eq!(
            sensor.distance(Coordinates::new(0, 0), p),
            7.07,
            epsilon = 0.01
        );
        let points = sample_points();
        for a in &points {
            for b in &points {
                assert!(sensor.distance(*a, *b) >= 0.0);
            }
        }
    }
}
