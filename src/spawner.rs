//! Enemy spawner: a two-state machine driven by an `Interval`.

use std::time::Duration;

use glam::Vec3;
use rand::Rng;
use tracing::debug;

use crate::config::VariantConfig;
use crate::entities::{Enemy, Movable};
use crate::timer::Interval;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnerState {
    Running,
    /// Terminal.  Only a new session brings enemies back.
    Stopped,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Spawner {
    state: SpawnerState,
    interval: Interval,
}

impl Spawner {
    /// A running spawner whose first enemy is due one period after `now`.
    pub fn start(period: Duration, now: Duration) -> Self {
        let mut interval = Interval::new(period);
        interval.start(now);
        Self {
            state: SpawnerState::Running,
            interval,
        }
    }

    /// A spawner that never emits.
    pub fn stopped(period: Duration) -> Self {
        Self {
            state: SpawnerState::Stopped,
            interval: Interval::new(period),
        }
    }

    pub fn state(&self) -> SpawnerState {
        self.state
    }

    pub fn stop(&mut self) {
        if self.state == SpawnerState::Running {
            debug!("spawner stopped");
        }
        self.state = SpawnerState::Stopped;
        self.interval.cancel();
    }

    /// Emit an enemy if the period has elapsed.  `player_z` anchors the
    /// spawn point ahead of the player.
    pub fn poll(
        &mut self,
        now: Duration,
        player_z: f32,
        config: &VariantConfig,
        rng: &mut impl Rng,
    ) -> Option<Enemy> {
        if self.state == SpawnerState::Stopped || !self.interval.poll(now) {
            return None;
        }
        let enemy = spawn_enemy(player_z, config, rng);
        debug!(x = enemy.body.position.x, z = enemy.body.position.z, "enemy spawned");
        Some(enemy)
    }
}

/// Place a new enemy at a random lateral offset ahead of the player.
pub fn spawn_enemy(player_z: f32, config: &VariantConfig, rng: &mut impl Rng) -> Enemy {
    let spread = 0.4 * config.lane_width;
    let x = rng.gen_range(-spread..=spread);
    let z = player_z + config.spawn_lookahead + rng.gen::<f32>() * config.spawn_range;
    Enemy {
        body: Movable::at(Vec3::new(x, config.player_height, z)),
        speed: config.enemy_speed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn spawn_stays_inside_the_lane_and_ahead() {
        let config = VariantConfig::shooter();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let e = spawn_enemy(10.0, &config, &mut rng);
            assert!(e.body.position.x.abs() <= 0.4 * config.lane_width);
            assert!(e.body.position.z >= 10.0 + config.spawn_lookahead);
            assert!(e.body.position.z <= 10.0 + config.spawn_lookahead + config.spawn_range);
        }
    }

    #[test]
    fn stopped_spawner_stays_stopped() {
        let config = VariantConfig::shooter();
        let mut rng = StdRng::seed_from_u64(7);
        let mut s = Spawner::start(Duration::from_millis(2000), Duration::ZERO);
        s.stop();
        assert_eq!(s.state(), SpawnerState::Stopped);
        assert!(s.poll(Duration::from_secs(60), 0.0, &config, &mut rng).is_none());
    }
}
