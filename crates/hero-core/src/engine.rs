//! One hero instance: timeline, clock, scene and the resources behind them.
//!
//! [`Hero`] is the cheap, cloneable handle the host keeps. The frame loop and
//! asset futures only hold weak or temporary references, so dropping every
//! handle after [`Hero::destroy`] frees the instance.

use crate::applier::{self, Motion};
use crate::assets::{self, AssetKind, AssetLoader, EnvironmentMap, LoadedAsset};
use crate::clock::RuntimeClock;
use crate::config::AnimationConfig;
use crate::error::Result;
use crate::objects::{HeroScene, NoopSink};
use crate::renderer::{SceneRenderer, Viewport};
use crate::scene::{Disposable, ResourceSink};
use crate::scheduler::{FrameLoop, FrameScheduler};
use crate::timeline::{PhaseSample, PhaseTimeline};
use std::cell::RefCell;
use std::rc::Rc;

/// Pause, resume and destroy: everything the visibility gate needs.
pub trait HeroControls {
    fn pause(&self);
    fn resume(&self);
    fn destroy(&self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// Animating (or waiting for the renderer before it starts).
    Running,
    /// Reduced motion: one still frame, no loop.
    Static,
    /// No graphics backend; the host shows a static image instead.
    Fallback,
    Destroyed,
}

pub struct HeroEngine<R: SceneRenderer> {
    config: AnimationConfig,
    timeline: PhaseTimeline,
    clock: RuntimeClock,
    scene: HeroScene,
    renderer: Option<R>,
    environment: Option<EnvironmentMap>,
    state: EngineState,
    last_sample: PhaseSample,
    pending_viewport: Option<Viewport>,
    scheduler: Rc<dyn FrameScheduler>,
    frame_loop: Option<FrameLoop>,
    loader: Option<Rc<dyn AssetLoader>>,
    on_detach: Vec<Box<dyn FnOnce()>>,
    on_destroy: Vec<Box<dyn FnOnce()>>,
}

impl<R: SceneRenderer> HeroEngine<R> {
    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn timeline(&self) -> &PhaseTimeline {
        &self.timeline
    }

    pub fn clock(&self) -> &RuntimeClock {
        &self.clock
    }

    pub fn scene(&self) -> &HeroScene {
        &self.scene
    }

    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn last_sample(&self) -> PhaseSample {
        self.last_sample
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == EngineState::Destroyed
    }

    pub fn is_looping(&self) -> bool {
        self.frame_loop.as_ref().is_some_and(FrameLoop::is_running)
    }

    /// One animation step. Returns `false` once the loop should stop.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        if self.state != EngineState::Running {
            return false;
        }
        self.clock.tick(now_ms);
        self.update();
        self.render();
        true
    }

    /// Skip to just past the start of the next phase.
    pub fn advance_phase(&mut self) {
        let delta = self.timeline.skip_delta(self.clock.elapsed());
        self.clock.advance(delta);
        log::debug!("[hero] skip +{delta:.3}s");
    }

    fn update(&mut self) {
        let elapsed = self.clock.elapsed();
        let cycle_time = self.timeline.cycle_time(elapsed);
        let sample = self.timeline.resolve(cycle_time);
        applier::apply_phase(
            &mut self.scene,
            sample,
            Motion {
                cycle_time,
                elapsed,
            },
        );
        self.last_sample = sample;
    }

    fn render(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            if let Err(e) = renderer.render(&self.scene) {
                log::error!("[gpu] {e}");
            }
        }
    }

    fn render_static_frame(&mut self) {
        applier::apply_static_frame(&mut self.scene);
        self.last_sample = PhaseSample::START;
        self.render();
    }

    fn resize(&mut self, viewport: Viewport) {
        self.scene.camera.set_viewport(viewport.width, viewport.height);
        match self.renderer.as_mut() {
            Some(renderer) => renderer.resize(viewport),
            None => self.pending_viewport = Some(viewport),
        }
        // A paused or static scene is not redrawn by the loop.
        if self.state == EngineState::Static {
            self.render();
        }
    }

    fn with_sink(&mut self, f: impl FnOnce(&mut HeroScene, &mut dyn ResourceSink)) {
        match self.renderer.as_mut() {
            Some(renderer) => f(&mut self.scene, renderer),
            None => f(&mut self.scene, &mut NoopSink),
        }
    }

    fn install(&mut self, kind: AssetKind, url: &str, result: Result<LoadedAsset>) {
        let asset = match result {
            Ok(asset) => asset,
            Err(e) => {
                log::warn!("[assets] {} ({url}) failed, keeping placeholder: {e}", kind.name());
                return;
            }
        };
        if self.is_destroyed() {
            if let LoadedAsset::Model(mut node) = asset {
                node.dispose(&mut NoopSink);
            }
            return;
        }
        match asset {
            LoadedAsset::Model(node) => {
                self.with_sink(|scene, sink| match kind {
                    AssetKind::Printer => scene.install_printer(node, sink),
                    AssetKind::Scanner => scene.install_scanner(node, sink),
                    _ => scene.install_part(node, sink),
                });
            }
            LoadedAsset::Environment(environment) => self.install_environment(environment),
        }
        log::info!("[assets] {} ready", kind.name());
    }

    fn install_environment(&mut self, environment: EnvironmentMap) {
        if let Some(renderer) = self.renderer.as_mut() {
            if let Some(old) = self.environment.take() {
                renderer.release_texture(old.id);
            }
            renderer.set_environment(&environment);
        }
        self.environment = Some(environment);
    }

    fn assets_settled(&mut self) {
        if self.state == EngineState::Static {
            self.render_static_frame();
        }
    }

    fn stop_loop(&mut self) {
        if let Some(frame_loop) = self.frame_loop.take() {
            frame_loop.stop();
        }
    }

    /// Release everything except the detach and destroy hooks, which the
    /// handle runs after the engine borrow ends.
    fn teardown(&mut self) -> Vec<Box<dyn FnOnce()>> {
        self.state = EngineState::Destroyed;
        self.stop_loop();
        if let Some(loader) = self.loader.take() {
            loader.shutdown();
        }
        let environment = self.environment.take();
        match self.renderer.as_mut() {
            Some(renderer) => {
                self.scene.dispose_all(renderer);
                if let Some(env) = environment {
                    renderer.release_texture(env.id);
                }
                renderer.dispose();
            }
            None => self.scene.dispose_all(&mut NoopSink),
        }
        self.renderer = None;
        let mut hooks = std::mem::take(&mut self.on_detach);
        hooks.append(&mut self.on_destroy);
        hooks
    }
}

/// Shared handle to a [`HeroEngine`].
pub struct Hero<R: SceneRenderer + 'static> {
    inner: Rc<RefCell<HeroEngine<R>>>,
}

impl<R: SceneRenderer + 'static> Clone for Hero<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<R: SceneRenderer + 'static> Hero<R> {
    /// Build the scene with placeholders. Nothing animates until a renderer
    /// is attached.
    pub fn new(
        config: AnimationConfig,
        host_reduced_motion: bool,
        scheduler: Rc<dyn FrameScheduler>,
        seed: u64,
    ) -> Self {
        let timeline = PhaseTimeline::new(&config.durations);
        if timeline.total_duration() <= 0.0 {
            log::warn!("[hero] every phase duration is zero; holding the idle pose");
        }
        let state = if config.prefers_reduced_motion(host_reduced_motion) {
            EngineState::Static
        } else {
            EngineState::Running
        };
        let scene = HeroScene::new(&config, seed);
        let engine = HeroEngine {
            config,
            timeline,
            clock: RuntimeClock::new(),
            scene,
            renderer: None,
            environment: None,
            state,
            last_sample: PhaseSample::START,
            pending_viewport: None,
            scheduler,
            frame_loop: None,
            loader: None,
            on_detach: Vec::new(),
            on_destroy: Vec::new(),
        };
        Self {
            inner: Rc::new(RefCell::new(engine)),
        }
    }

    /// Read access for inspection and tests.
    pub fn with_engine<T>(&self, f: impl FnOnce(&HeroEngine<R>) -> T) -> T {
        f(&self.inner.borrow())
    }

    pub fn state(&self) -> EngineState {
        self.inner.borrow().state
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.borrow().is_destroyed()
    }

    /// Hand over the graphics backend. Starts the loop, or draws the still
    /// frame under reduced motion. A renderer that arrives after destroy is
    /// disposed right away.
    pub fn attach_renderer(&self, mut renderer: R) {
        let start = {
            let mut engine = self.inner.borrow_mut();
            if matches!(engine.state, EngineState::Destroyed | EngineState::Fallback) {
                renderer.dispose();
                return;
            }
            if let Some(viewport) = engine.pending_viewport.take() {
                renderer.resize(viewport);
            }
            if let Some(env) = engine.environment.as_ref() {
                renderer.set_environment(env);
            }
            engine.renderer = Some(renderer);
            match engine.state {
                EngineState::Static => {
                    engine.render_static_frame();
                    false
                }
                _ => {
                    engine.update();
                    engine.render();
                    true
                }
            }
        };
        if start {
            self.start_loop();
        }
        log::info!("[hero] renderer attached");
    }

    /// Degrade to the static fallback (the graphics backend could not be
    /// created). Detach hooks run now; only destroy hooks remain.
    pub fn fall_back(&self) {
        let hooks = {
            let mut engine = self.inner.borrow_mut();
            if matches!(engine.state, EngineState::Destroyed | EngineState::Fallback) {
                return;
            }
            engine.state = EngineState::Fallback;
            engine.stop_loop();
            engine.scene.dispose_all(&mut NoopSink);
            std::mem::take(&mut engine.on_detach)
        };
        for hook in hooks {
            hook();
        }
        log::info!("[hero] no graphics backend, showing fallback image");
    }

    fn start_loop(&self) {
        let weak = Rc::downgrade(&self.inner);
        let scheduler = {
            let mut engine = self.inner.borrow_mut();
            engine.stop_loop();
            engine.clock.clear_anchor();
            Rc::clone(&engine.scheduler)
        };
        let frame_loop = FrameLoop::start(scheduler, move |now| match weak.upgrade() {
            Some(inner) => match inner.try_borrow_mut() {
                Ok(mut engine) => engine.frame(now),
                Err(_) => true,
            },
            None => false,
        });
        self.inner.borrow_mut().frame_loop = Some(frame_loop);
    }

    /// Run a callback once the instance stops animating for good: on fallback
    /// or on destroy, whichever comes first. Used for input listeners.
    pub fn on_detach(&self, hook: impl FnOnce() + 'static) {
        let mut engine = self.inner.borrow_mut();
        if matches!(engine.state, EngineState::Destroyed | EngineState::Fallback) {
            drop(engine);
            hook();
        } else {
            engine.on_detach.push(Box::new(hook));
        }
    }

    /// Run a callback on destroy (fallback image cleanup).
    /// Runs immediately when the instance is already destroyed.
    pub fn on_destroy(&self, hook: impl FnOnce() + 'static) {
        let mut engine = self.inner.borrow_mut();
        if engine.is_destroyed() {
            drop(engine);
            hook();
        } else {
            engine.on_destroy.push(Box::new(hook));
        }
    }

    pub fn set_hover(&self, hovering: bool) {
        self.inner.borrow_mut().clock.set_hover_paused(hovering);
    }

    /// Click handler: skip to the next phase when enabled.
    pub fn skip(&self) {
        let mut engine = self.inner.borrow_mut();
        if engine.state == EngineState::Running && engine.config.skip_on_click {
            engine.advance_phase();
        }
    }

    pub fn resize(&self, viewport: Viewport) {
        let mut engine = self.inner.borrow_mut();
        if !engine.is_destroyed() {
            engine.resize(viewport);
        }
    }

    /// Follow a change of the host reduced-motion preference. An explicit
    /// `reducedMotion` option wins over the host.
    pub fn set_host_reduced_motion(&self, reduced: bool) {
        let restart = {
            let mut engine = self.inner.borrow_mut();
            if engine.config.reduced_motion.is_some() {
                return;
            }
            match (engine.state, reduced) {
                (EngineState::Running, true) => {
                    engine.state = EngineState::Static;
                    engine.stop_loop();
                    engine.render_static_frame();
                    false
                }
                (EngineState::Static, false) => {
                    engine.state = EngineState::Running;
                    engine.renderer.is_some()
                }
                _ => false,
            }
        };
        if restart {
            self.start_loop();
        }
    }

    /// Fetch every configured asset. Each one installs as soon as it
    /// decodes; failures only log. Resolves once all of them settled.
    pub async fn load_assets(&self, loader: Rc<dyn AssetLoader>) {
        let urls = {
            let mut engine = self.inner.borrow_mut();
            if matches!(engine.state, EngineState::Destroyed | EngineState::Fallback) {
                return;
            }
            engine.loader = Some(Rc::clone(&loader));
            engine.config.urls.clone()
        };
        let tasks = urls.entries().map(|(kind, url)| {
            let loader = Rc::clone(&loader);
            let inner = Rc::clone(&self.inner);
            let url = url.to_owned();
            async move {
                let result = assets::load_asset(loader.as_ref(), kind, &url).await;
                inner.borrow_mut().install(kind, &url, result);
            }
        });
        futures::future::join_all(tasks).await;

        let mut engine = self.inner.borrow_mut();
        if !engine.is_destroyed() {
            engine.loader = None;
            engine.assets_settled();
        }
    }
}

impl<R: SceneRenderer + 'static> HeroControls for Hero<R> {
    fn pause(&self) {
        self.inner.borrow_mut().clock.set_manual_paused(true);
    }

    fn resume(&self) {
        self.inner.borrow_mut().clock.set_manual_paused(false);
    }

    fn destroy(&self) {
        let hooks = {
            let mut engine = self.inner.borrow_mut();
            if engine.is_destroyed() {
                return;
            }
            engine.teardown()
        };
        for hook in hooks {
            hook();
        }
        log::info!("[hero] destroyed");
    }
}
