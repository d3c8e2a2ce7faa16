pub mod assets;
pub mod audio;
pub mod compute;
pub mod config;
pub mod entities;
pub mod input;
pub mod logging;
pub mod session;
pub mod spawner;
pub mod timer;
