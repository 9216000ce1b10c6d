//! Симуляція ровера на безмежній сітці: рух із витратою енергії,
//! очікування підзарядки та виконання маршрутів.

pub mod core;
pub mod power;
pub mod route;
pub mod rover;
pub mod terrain;

pub use crate::core::{Coordinates, Direction, Instruction, RoverError};
pub use power::{Battery, PowerCell, RechargeDriver};
pub use route::{GreedyRouteSynthesizer, RouteBook, RouteSynthesizer};
pub use rover::{CancelHandle, Rover};
pub use terrain::{LandSensor, TerrainSensor};
