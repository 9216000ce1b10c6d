use anyhow::{ensure, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rover_sim::{
    Battery, Coordinates, Instruction, LandSensor, PowerCell, RechargeDriver, RouteBook, Rover,
    RoverError,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Структура для зчитування зовнішньої конфігурації.
#[derive(Debug, Deserialize)]
struct Config {
    rover: RoverConfig,
    battery: BatteryConfig,
    terrain: TerrainConfig,
    mission: MissionConfig,
}

#[derive(Debug, Deserialize)]
struct RoverConfig {
    step_cost: f64,
}

#[derive(Debug, Deserialize)]
struct BatteryConfig {
    initial_charge: f64,
    recharge_period_ms: u64,
}

#[derive(Debug, Deserialize)]
struct TerrainConfig {
    seed: u64,
}

#[derive(Debug, Deserialize)]
struct MissionConfig {
    landing: Coordinates,
    destination: Coordinates,
    #[serde(default)]
    warmup: Vec<Instruction>,
}

impl Config {
    /// Перевіряє значення, які десеріалізація пропускає без заперечень.
    fn validate(&self) -> Result<()> {
        ensure!(
            self.battery.initial_charge >= 0.0,
            "battery.initial_charge має бути невід'ємним, отримано {}",
            self.battery.initial_charge
        );
        ensure!(
            self.battery.recharge_period_ms > 0,
            "battery.recharge_period_ms має бути більшим за нуль"
        );
        ensure!(
            self.rover.step_cost >= 0.0,
            "rover.step_cost має бути невід'ємним, отримано {}",
            self.rover.step_cost
        );
        Ok(())
    }
}

/// Виконує розминку з конфігурації, а потім веде ровер до цілі.
async fn run_mission(rover: &mut Rover, mission: MissionConfig) -> Result<(), RoverError> {
    rover.assign_route(RouteBook::new(mission.warmup));
    rover.execute_route().await?;

    let pos = rover.position()?;
    let heading = rover.heading()?;
    info!(x = pos.x, y = pos.y, ?heading, "Розминку завершено");

    let target = mission.destination;
    info!(x = target.x, y = target.y, "Вирушаю до цілі");
    rover.navigate_to(target).await
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Ініціалізація структурованого логування (tracing)
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Не вдалося встановити tracing subscriber");

    // 2. Завантаження зовнішньої конфігурації
    let settings = config::Config::builder()
        .add_source(config::File::with_name("Settings.toml"))
        .build()
        .context("Не знайдено або пошкоджено файл Settings.toml")?;

    let config: Config = settings
        .try_deserialize()
        .context("Некоректна структура Settings.toml")?;
    config
        .validate()
        .context("Некоректні значення в Settings.toml")?;
    info!(
        step_cost = config.rover.step_cost,
        seed = config.terrain.seed,
        "Конфігурація завантажена"
    );

    // 3. Збирання ровера: акумулятор із підзарядкою та датчик рельєфу
    let period = Duration::from_millis(config.battery.recharge_period_ms);
    let cell = Arc::new(Battery::new(config.battery.initial_charge, period));
    let driver = RechargeDriver::spawn(cell.clone(), period);
    let sensor = Arc::new(LandSensor::new(StdRng::seed_from_u64(config.terrain.seed)));
    let mut rover = Rover::new(config.rover.step_cost, cell.clone(), sensor);

    // Ctrl+C перериває лише очікування заряду
    let cancel = rover.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Отримано Ctrl+C, скасовую очікування заряду");
            cancel.cancel();
        }
    });

    // 4. Приземлення, розминковий маршрут і рух до цілі
    let landing = config.mission.landing;
    rover.land(landing);
    info!(x = landing.x, y = landing.y, "Ровер приземлився");

    let outcome = run_mission(&mut rover, config.mission).await;

    driver.shutdown();
    let pos = rover.position()?;

    match outcome {
        Ok(()) => {
            info!(
                x = pos.x,
                y = pos.y,
                charge = cell.charge_level(),
                "Місія завершена"
            );
            Ok(())
        }
        Err(RoverError::Cancelled) => {
            warn!(x = pos.x, y = pos.y, "Місію перервано під час очікування заряду");
            Ok(())
        }
        Err(e) => {
            error!(x = pos.x, y = pos.y, "Місію зупинено: {}", e);
            Err(e).context("Ровер не дістався цілі")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(battery: &str) -> Config {
        let source = format!(
            r#"
            [rover]
            step_cost = 1.0

            [battery]
            {battery}

            [terrain]
            seed = 7

            [mission]
            landing = {{ x = 3, y = 0 }}
            destination = {{ x = -4, y = 9 }}
            warmup = ["Forward", "TurnLeft"]
            "#
        );
        config::Config::builder()
            .add_source(config::File::from_str(&source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_valid_config() {
        let config = parse("initial_charge = 100.0\nrecharge_period_ms = 1000");
        assert!(config.validate().is_ok());
        assert_eq!(config.mission.landing, Coordinates::new(3, 0));
        assert_eq!(
            config.mission.warmup,
            vec![Instruction::Forward, Instruction::TurnLeft]
        );
    }

    #[test]
    fn test_negative_initial_charge_rejected() {
        let config = parse("initial_charge = -10.0\nrecharge_period_ms = 1000");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_recharge_period_rejected() {
        let config = parse("initial_charge = 100.0\nrecharge_period_ms = 0");
        assert!(config.validate().is_err());
    }
}
