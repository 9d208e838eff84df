//! Platform-independent core of the hero animation: timeline, scene state,
//! asset decoding, engine lifecycle and the visibility gate.

pub mod applier;
pub mod assets;
pub mod clock;
pub mod color;
pub mod config;
pub mod constants;
pub mod easing;
pub mod engine;
pub mod error;
pub mod gate;
pub mod geometry;
pub mod objects;
pub mod particles;
pub mod placeholders;
pub mod renderer;
pub mod scene;
pub mod scheduler;
pub mod timeline;

pub use assets::{AssetKind, AssetLoader, EnvironmentMap};
pub use clock::RuntimeClock;
pub use color::Rgb;
pub use config::{AnimationConfig, Background, DurationOverrides, HeroOptions, PhaseDurations};
pub use engine::{EngineState, Hero, HeroControls, HeroEngine};
pub use error::{HeroError, Result};
pub use gate::{GateState, VisibilityGate};
pub use objects::HeroScene;
pub use particles::{ParticleMode, ParticleState};
pub use renderer::{SceneRenderer, Viewport};
pub use scene::{Disposable, ResourceId, ResourceSink, Tintable};
pub use scheduler::{FrameLoop, FrameScheduler, FrameToken};
pub use timeline::{Phase, PhaseSample, PhaseTimeline};
