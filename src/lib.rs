pub mod binding;
pub mod camera;
pub mod config;
pub mod driver;
pub mod events;
pub mod game;
pub mod gpu_render;
pub mod input;
pub mod math;
pub mod mesh;
pub mod scene;

pub use driver::{Control, Driver};
pub use events::{GameEvent, GameObserver};
pub use game::{Cell, Direction, Engine, GameSession, Phase, Rules, TickOutcome};
