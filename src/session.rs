//! Session controller.
//!
//! Owns the `World` for one play-through together with its collaborators:
//! the asset completion channel and the soundtrack.  Asset completions are
//! drained before each frame, never in the middle of one.  A finished
//! session stays finished; playing again means building a new `Session`.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use rand::Rng;
use tracing::info;

use crate::assets::{self, AssetEvent};
use crate::audio::{LoopedTrack, Soundtrack};
use crate::compute::{attach_player, attach_skybox, init_world, tick, FrameReport};
use crate::config::VariantConfig;
use crate::entities::{GameStatus, World};
use crate::input::KeyState;

pub struct Session {
    world: World,
    assets: Receiver<AssetEvent>,
    soundtrack: Option<Box<dyn Soundtrack>>,
}

impl Session {
    /// Validate `config`, start the soundtrack and kick off asset loads.
    pub fn start(config: VariantConfig, now: Duration, rng: &mut impl Rng) -> anyhow::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let soundtrack = config
            .soundtrack
            .as_ref()
            .map(|path| Box::new(LoopedTrack::new(path.clone())) as Box<dyn Soundtrack>);
        let session = Self::with_collaborators(config, now, rng, rx, soundtrack)?;

        let config = &session.world.config;
        assets::request_player_model(config.player_asset.clone(), tx.clone());
        if let Some(texture) = &config.skybox_texture {
            assets::request_skybox(texture.clone(), tx);
        }
        Ok(session)
    }

    /// Build a session around an existing completion channel and soundtrack.
    /// Fails, without touching the soundtrack, if `config` is invalid.
    pub fn with_collaborators(
        config: VariantConfig,
        now: Duration,
        rng: &mut impl Rng,
        assets: Receiver<AssetEvent>,
        mut soundtrack: Option<Box<dyn Soundtrack>>,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        info!(variant = %config.name, "session started");
        if let Some(track) = soundtrack.as_mut() {
            track.play_loop();
        }
        Ok(Self {
            world: init_world(config, now, rng),
            assets,
            soundtrack,
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn soundtrack(&self) -> Option<&dyn Soundtrack> {
        self.soundtrack.as_deref()
    }

    pub fn is_over(&self) -> bool {
        self.world.status == GameStatus::GameOver
    }

    pub fn apply_asset(&mut self, event: AssetEvent) {
        self.world = match event {
            AssetEvent::Player(model) => attach_player(&self.world, model),
            AssetEvent::Skybox { textured } => attach_skybox(&self.world, textured),
        };
    }

    /// Drain finished loads.  Returns how many were applied.
    pub fn poll_assets(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.assets.try_recv() {
                Ok(event) => {
                    self.apply_asset(event);
                    applied += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    /// Run one frame: apply finished loads, advance the world, then react
    /// to the end of the game.  Consumes the pointer fire pulse.
    pub fn frame(&mut self, keys: &mut KeyState, now: Duration, rng: &mut impl Rng) -> FrameReport {
        self.poll_assets();
        let (world, report) = tick(&self.world, keys, now, rng);
        self.world = world;
        keys.fire_pulse = false;

        if report.game_over {
            if let Some(track) = self.soundtrack.as_mut() {
                track.pause();
            }
        }
        report
    }
}
