// СЛОВНИК
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Клітинка цілочисельної сітки.
///
/// Сітка замкнена в тор: крок за межу `i32` переносить ровер на протилежний край.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
}

impl Coordinates {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Сусідня клітинка перед ровером, що дивиться в напрямку `heading`.
    pub fn next_forward(self, heading: Direction) -> Self {
        let (dx, dy) = heading.offset();
        Self::new(self.x.wrapping_add(dx), self.y.wrapping_add(dy))
    }

    /// Сусідня клітинка позаду ровера.
    pub fn next_backward(self, heading: Direction) -> Self {
        self.next_forward(heading.opposite())
    }
}

/// Сторони світу, впорядковані за годинниковою стрілкою.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Поворот на чверть кола праворуч.
    pub fn clockwise(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    /// Поворот на чверть кола ліворуч.
    pub fn counterclockwise(self) -> Self {
        match self {
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
            Direction::East => Direction::North,
        }
    }

    pub fn opposite(self) -> Self {
        self.clockwise().clockwise()
    }

    /// Зміщення (dx, dy) на один крок уперед.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }
}

/// Елементарні команди маршруту.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Instruction {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
}

/// Помилки ядра навігації.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoverError {
    #[error("Ровер ще не приземлився")]
    Unlanded,
    #[error("Недостатньо заряду: потрібно {required:.2}, доступно {available:.2}")]
    InsufficientCharge { required: f64, available: f64 },
    #[error("Очікування заряду скасовано")]
    Cancelled,
    #[error("Некоректна кількість енергії: {0}")]
    InvalidAmount(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_is_closed() {
        for d in Direction::ALL {
            assert_eq!(d.clockwise().clockwise().clockwise().clockwise(), d);
            assert_eq!(
                d.counterclockwise()
                    .counterclockwise()
                    .counterclockwise()
                    .counterclockwise(),
                d
            );
            assert_eq!(d.clockwise().counterclockwise(), d);
            assert_eq!(d.counterclockwise().clockwise(), d);
        }
    }

    #[test]
    fn test_forward_then_backward_is_identity() {
        let start = Coordinates::new(-2, 5);
        for d in Direction::ALL {
            assert_eq!(start.next_forward(d).next_backward(d), start);
        }
    }

    #[test]
    fn test_offsets() {
        let origin = Coordinates::new(3, 0);
        assert_eq!(origin.next_forward(Direction::North), Coordinates::new(3, 1));
        assert_eq!(origin.next_forward(Direction::East), Coordinates::new(4, 0));
        assert_eq!(origin.next_forward(Direction::South), Coordinates::new(3, -1));
        assert_eq!(origin.next_forward(Direction::West), Coordinates::new(2, 0));
        assert_eq!(origin.next_backward(Direction::North), Coordinates::new(3, -1));
    }

    #[test]
    fn test_steps_wrap_at_grid_edge() {
        let top = Coordinates::new(0, i32::MAX);
        assert_eq!(top.next_forward(Direction::North), Coordinates::new(0, i32::MIN));
        assert_eq!(
            Coordinates::new(0, i32::MIN).next_backward(Direction::North),
            top
        );
        let left = Coordinates::new(i32::MIN, 4);
        assert_eq!(left.next_forward(Direction::West), Coordinates::new(i32::MAX, 4));
        assert_eq!(left.next_forward(Direction::West).next_backward(Direction::West), left);
    }
}
