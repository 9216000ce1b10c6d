use crate::core::{Coordinates, Direction, Instruction, RoverError};
use crate::power::PowerCell;
use crate::route::{GreedyRouteSynthesizer, RouteBook, RouteSynthesizer};
use crate::terrain::TerrainSensor;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::debug;

/// Положення приземленого ровера.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Pose {
    position: Coordinates,
    heading: Direction,
}

/// Сигнал скасування очікування заряду.
///
/// Піднятий сигнал перериває поточне (і кожне наступне) очікування
/// з `RoverError::Cancelled`, доки його не скинуть через `reset`.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn reset(&self) {
        self.tx.send_replace(false);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Ядро навігації ровера.
///
/// Не розраховане на конкурентні виклики: усі операції руху приймають
/// `&mut self`, тож потік команд серіалізує сам компілятор.
pub struct Rover {
    step_cost: f64,
    pose: Option<Pose>,
    route: RouteBook,
    cell: Arc<dyn PowerCell>,
    sensor: Arc<dyn TerrainSensor>,
    synthesizer: Box<dyn RouteSynthesizer>,
    cancel_tx: Arc<watch::Sender<bool>>,
    cancel_rx: watch::Receiver<bool>,
}

impl Rover {
    /// Створює неприземленого ровера з номінальною вартістю кроку `step_cost`.
    pub fn new(step_cost: f64, cell: Arc<dyn PowerCell>, sensor: Arc<dyn TerrainSensor>) -> Self {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        Self {
            step_cost,
            pose: None,
            route: RouteBook::default(),
            cell,
            sensor,
            synthesizer: Box::new(GreedyRouteSynthesizer),
            cancel_tx: Arc::new(cancel_tx),
            cancel_rx,
        }
    }

    /// Замінює планувальник маршрутів для `navigate_to`.
    pub fn with_synthesizer(mut self, synthesizer: impl RouteSynthesizer + 'static) -> Self {
        self.synthesizer = Box::new(synthesizer);
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: self.cancel_tx.clone(),
        }
    }

    pub fn step_cost(&self) -> f64 {
        self.step_cost
    }

    pub fn is_landed(&self) -> bool {
        self.pose.is_some()
    }

    /// Приземлення: задає позицію й повертає ровер на північ.
    /// Повторне приземлення просто скидає стан.
    pub fn land(&mut self, position: Coordinates) {
        self.pose = Some(Pose {
            position,
            heading: Direction::North,
        });
        debug!(x = position.x, y = position.y, "Ровер приземлився");
    }

    fn pose(&self) -> Result<Pose, RoverError> {
        self.pose.ok_or(RoverError::Unlanded)
    }

    pub fn position(&self) -> Result<Coordinates, RoverError> {
        Ok(self.pose()?.position)
    }

    pub fn position_x(&self) -> Result<i32, RoverError> {
        Ok(self.pose()?.position.x)
    }

    pub fn position_y(&self) -> Result<i32, RoverError> {
        Ok(self.pose()?.position.y)
    }

    pub fn heading(&self) -> Result<Direction, RoverError> {
        Ok(self.pose()?.heading)
    }

    pub async fn move_forward(&mut self) -> Result<(), RoverError> {
        let pose = self.pose()?;
        self.step_to(pose, pose.position.next_forward(pose.heading))
            .await
    }

    pub async fn move_backward(&mut self) -> Result<(), RoverError> {
        let pose = self.pose()?;
        self.step_to(pose, pose.position.next_backward(pose.heading))
            .await
    }

    async fn step_to(&mut self, pose: Pose, next: Coordinates) -> Result<(), RoverError> {
        let required = self.step_cost * self.sensor.coefficient(pose.position, next);

        self.wait_for_charge(required).await?;
        self.cell.consume(required)?;

        self.pose = Some(Pose {
            position: next,
            ..pose
        });
        debug!(x = next.x, y = next.y, energy = required, "Крок виконано");
        Ok(())
    }

    /// Чекає, доки комірка накопичить `required`. Тривалість і рівень заряду
    /// перечитуються на кожній ітерації.
    async fn wait_for_charge(&mut self, required: f64) -> Result<(), RoverError> {
        while self.cell.charge_level() < required {
            let wait = self.cell.time_to_sufficient_charge(required);
            debug!(required, ?wait, "Очікування заряду");
            tokio::select! {
                biased;
                _ = self.cancel_rx.wait_for(|cancelled| *cancelled) => {
                    return Err(RoverError::Cancelled);
                }
                _ = sleep(wait) => {}
            }
        }
        Ok(())
    }

    pub fn turn_left(&mut self) -> Result<(), RoverError> {
        let pose = self.pose.as_mut().ok_or(RoverError::Unlanded)?;
        pose.heading = pose.heading.counterclockwise();
        debug!(heading = ?pose.heading, "Поворот ліворуч");
        Ok(())
    }

    pub fn turn_right(&mut self) -> Result<(), RoverError> {
        let pose = self.pose.as_mut().ok_or(RoverError::Unlanded)?;
        pose.heading = pose.heading.clockwise();
        debug!(heading = ?pose.heading, "Поворот праворуч");
        Ok(())
    }

    /// Повністю замінює поточний маршрутний лист.
    pub fn assign_route(&mut self, route: RouteBook) {
        self.route = route;
    }

    /// Виконує призначений маршрут до кінця або до першої помилки.
    /// Уже виконані команди не відкочуються.
    pub async fn execute_route(&mut self) -> Result<(), RoverError> {
        self.pose()?;
        while let Some(instruction) = self.route.next_instruction() {
            match instruction {
                Instruction::Forward => self.move_forward().await?,
                Instruction::Backward => self.move_backward().await?,
                Instruction::TurnLeft => self.turn_left()?,
                Instruction::TurnRight => self.turn_right()?,
            }
        }
        Ok(())
    }

    /// Будує маршрут до `destination` і виконує його.
    pub async fn navigate_to(&mut self, destination: Coordinates) -> Result<(), RoverError> {
        let pose = self.pose()?;
        let instructions = self
            .synthesizer
            .synthesize(pose.heading, pose.position, destination);
        debug!(
            steps = instructions.len(),
            x = destination.x,
            y = destination.y,
            "Маршрут побудовано"
        );
        self.assign_route(RouteBook::new(instructions));
        self.execute_route().await
    }
}
