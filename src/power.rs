use crate::core::RoverError;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant};
use tracing::debug;

/// Джерело енергії ровера.
///
/// Методи приймають `&self`: одну комірку спільно використовують ровер
/// і зовнішній драйвер підзарядки, тому синхронізація лежить на реалізації.
pub trait PowerCell: Send + Sync {
    /// Поточний рівень заряду.
    fn charge_level(&self) -> f64;

    /// Списує `amount` з комірки або повертає `InsufficientCharge`.
    /// Від'ємна або `NaN` кількість дає `InvalidAmount`.
    fn consume(&self, amount: f64) -> Result<(), RoverError>;

    /// Один крок підзарядки за моделлю конкретної комірки.
    fn charge(&self);

    /// Оцінка часу, за який заряд досягне `target`. Нуль, якщо заряду вже достатньо.
    fn time_to_sufficient_charge(&self, target: f64) -> Duration;
}

/// Акумулятор з геометричною кривою підзарядки: `level * 1.1 + 1` за крок.
#[derive(Debug)]
pub struct Battery {
    level: Mutex<f64>,
    recharge_period: Duration,
}

impl Battery {
    pub const DEFAULT_CHARGE: f64 = 100.0;
    pub const DEFAULT_PERIOD: Duration = Duration::from_millis(1000);

    /// Від'ємний або `NaN` початковий заряд вважається нульовим.
    pub fn new(initial_charge: f64, recharge_period: Duration) -> Self {
        Self {
            level: Mutex::new(initial_charge.max(0.0)),
            recharge_period,
        }
    }

    pub fn recharge_period(&self) -> Duration {
        self.recharge_period
    }

    fn next_level(level: f64) -> f64 {
        level * 1.1 + 1.0
    }

    fn level(&self) -> MutexGuard<'_, f64> {
        self.level.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Battery {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CHARGE, Self::DEFAULT_PERIOD)
    }
}

impl PowerCell for Battery {
    fn charge_level(&self) -> f64 {
        *self.level()
    }

    fn consume(&self, amount: f64) -> Result<(), RoverError> {
        if amount.is_nan() || amount < 0.0 {
            return Err(RoverError::InvalidAmount(amount));
        }
        let mut level = self.level();
        if amount > *level {
            return Err(RoverError::InsufficientCharge {
                required: amount,
                available: *level,
            });
        }
        *level -= amount;
        Ok(())
    }

    fn charge(&self) {
        let mut level = self.level();
        *level = Self::next_level(*level);
    }

    fn time_to_sufficient_charge(&self, target: f64) -> Duration {
        let mut level = *self.level();
        let mut steps: u32 = 0;
        while level < target {
            let next = Self::next_level(level);
            if next <= level || steps == u32::MAX {
                return Duration::MAX;
            }
            level = next;
            steps += 1;
        }
        self.recharge_period
            .checked_mul(steps)
            .unwrap_or(Duration::MAX)
    }
}

/// Фонова задача, що заряджає комірку з фіксованим періодом.
///
/// Задача зупиняється через `shutdown` або при знищенні драйвера.
pub struct RechargeDriver {
    handle: JoinHandle<()>,
}

impl RechargeDriver {
    pub fn spawn(cell: Arc<dyn PowerCell>, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                cell.charge();
                debug!(level = cell.charge_level(), "Комірку підзаряджено");
            }
        });
        Self { handle }
    }

    pub fn shutdown(self) {
        self.handle.abort();
    }
}

impl Drop for RechargeDriver {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
