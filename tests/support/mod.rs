// Recording fakes shared by the integration tests.
#![allow(dead_code)]

use futures::future::LocalBoxFuture;
use hero_core::assets::{AssetLoader, EnvironmentMap};
use hero_core::error::{HeroError, Result};
use hero_core::objects::HeroScene;
use hero_core::renderer::{SceneRenderer, Viewport};
use hero_core::scene::{ResourceId, ResourceSink};
use hero_core::scheduler::{FrameScheduler, FrameToken};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Queues frame callbacks until the test fires them. Cancelled frames stay
/// queued, like a host that already dispatched the callback.
#[derive(Default)]
pub struct ManualScheduler {
    next: Cell<i32>,
    queue: RefCell<Vec<(FrameToken, Box<dyn FnOnce(f64)>)>>,
    cancelled: RefCell<Vec<FrameToken>>,
}

impl ManualScheduler {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn queued(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled.borrow().len()
    }

    /// Fire every queued callback with `now_ms`; returns how many ran.
    pub fn run_frame(&self, now_ms: f64) -> usize {
        let batch = std::mem::take(&mut *self.queue.borrow_mut());
        let count = batch.len();
        for (_, callback) in batch {
            callback(now_ms);
        }
        count
    }
}

impl FrameScheduler for ManualScheduler {
    fn schedule_frame(&self, callback: Box<dyn FnOnce(f64)>) -> FrameToken {
        let token = FrameToken(self.next.get() + 1);
        self.next.set(token.0);
        self.queue.borrow_mut().push((token, callback));
        token
    }

    fn cancel(&self, token: FrameToken) {
        self.cancelled.borrow_mut().push(token);
    }
}

#[derive(Debug, Default)]
pub struct RenderLog {
    pub frames: usize,
    pub viewports: Vec<Viewport>,
    pub environments: Vec<ResourceId>,
    pub geometries: Vec<ResourceId>,
    pub materials: Vec<ResourceId>,
    pub textures: Vec<ResourceId>,
    pub disposed: usize,
    pub last_cube_opacity: Option<f32>,
    pub last_visible_points: usize,
}

pub struct RecordingRenderer {
    log: Rc<RefCell<RenderLog>>,
    fail: bool,
}

impl RecordingRenderer {
    pub fn new() -> (Self, Rc<RefCell<RenderLog>>) {
        let log = Rc::new(RefCell::new(RenderLog::default()));
        (
            Self {
                log: Rc::clone(&log),
                fail: false,
            },
            log,
        )
    }

    /// A renderer whose every frame fails.
    pub fn failing() -> (Self, Rc<RefCell<RenderLog>>) {
        let (mut renderer, log) = Self::new();
        renderer.fail = true;
        (renderer, log)
    }
}

impl ResourceSink for RecordingRenderer {
    fn release_geometry(&mut self, id: ResourceId) {
        self.log.borrow_mut().geometries.push(id);
    }

    fn release_material(&mut self, id: ResourceId) {
        self.log.borrow_mut().materials.push(id);
    }

    fn release_texture(&mut self, id: ResourceId) {
        self.log.borrow_mut().textures.push(id);
    }
}

impl SceneRenderer for RecordingRenderer {
    fn resize(&mut self, viewport: Viewport) {
        self.log.borrow_mut().viewports.push(viewport);
    }

    fn set_environment(&mut self, environment: &EnvironmentMap) {
        self.log.borrow_mut().environments.push(environment.id);
    }

    fn render(&mut self, scene: &HeroScene) -> Result<()> {
        let mut log = self.log.borrow_mut();
        log.frames += 1;
        log.last_cube_opacity = scene.cube.opacity();
        log.last_visible_points = scene.particles.visible_count();
        if self.fail {
            return Err(HeroError::Render("device lost".into()));
        }
        Ok(())
    }

    fn dispose(&mut self) {
        self.log.borrow_mut().disposed += 1;
    }
}

/// Serves canned responses; unknown URLs fail like a 404.
#[derive(Default)]
pub struct StaticLoader {
    responses: HashMap<String, Vec<u8>>,
    pub requests: RefCell<Vec<String>>,
    pub shutdowns: Cell<usize>,
}

impl StaticLoader {
    pub fn with(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.responses.insert(url.to_owned(), bytes);
        self
    }
}

impl AssetLoader for StaticLoader {
    fn load_bytes(&self, url: &str) -> LocalBoxFuture<'static, Result<Vec<u8>>> {
        self.requests.borrow_mut().push(url.to_owned());
        let result = self
            .responses
            .get(url)
            .cloned()
            .ok_or_else(|| HeroError::Fetch {
                url: url.to_owned(),
                reason: "HTTP 404".into(),
            });
        Box::pin(futures::future::ready(result))
    }

    fn shutdown(&self) {
        self.shutdowns.set(self.shutdowns.get() + 1);
    }
}

/// A binary glTF holding one triangle with its buffer in the BIN chunk.
pub fn triangle_glb() -> Vec<u8> {
    let json = concat!(
        r#"{"asset":{"version":"2.0"},"scene":0,"scenes":[{"nodes":[0]}],"#,
        r#""nodes":[{"mesh":0,"name":"tri"}],"#,
        r#""meshes":[{"primitives":[{"attributes":{"POSITION":0}}]}],"#,
        r#""accessors":[{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3","#,
        r#""min":[0,0,0],"max":[1,1,0]}],"#,
        r#""bufferViews":[{"buffer":0,"byteLength":36}],"#,
        r#""buffers":[{"byteLength":36}]}"#
    );
    glb(json, triangle_positions())
}

/// One triangle with texture coordinates and a base color texture whose
/// image bytes (`image`) sit in the BIN chunk.
pub fn textured_triangle_glb(image: &[u8]) -> Vec<u8> {
    let mut bin = triangle_positions();
    let uvs: [f32; 6] = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
    bin.extend(uvs.iter().flat_map(|f| f.to_le_bytes()));
    bin.extend_from_slice(image);
    let json = format!(
        concat!(
            r#"{{"asset":{{"version":"2.0"}},"scene":0,"scenes":[{{"nodes":[0]}}],"#,
            r#""nodes":[{{"mesh":0,"name":"tri"}}],"#,
            r#""meshes":[{{"primitives":[{{"attributes":{{"POSITION":0,"TEXCOORD_0":1}},"material":0}}]}}],"#,
            r#""materials":[{{"pbrMetallicRoughness":{{"baseColorTexture":{{"index":0}}}}}}],"#,
            r#""textures":[{{"source":0}}],"#,
            r#""images":[{{"bufferView":2,"mimeType":"image/png"}}],"#,
            r#""accessors":["#,
            r#"{{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3","min":[0,0,0],"max":[1,1,0]}},"#,
            r#"{{"bufferView":1,"componentType":5126,"count":3,"type":"VEC2"}}],"#,
            r#""bufferViews":[{{"buffer":0,"byteLength":36}},"#,
            r#"{{"buffer":0,"byteOffset":36,"byteLength":24}},"#,
            r#"{{"buffer":0,"byteOffset":60,"byteLength":{image_len}}}],"#,
            r#""buffers":[{{"byteLength":{len}}}]}}"#
        ),
        image_len = image.len(),
        len = bin.len(),
    );
    glb(&json, bin)
}

/// A solid 2×2 PNG.
pub fn solid_png(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba(rgba));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("png encodes");
    out.into_inner()
}

fn triangle_positions() -> Vec<u8> {
    let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    positions.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn glb(json: &str, mut bin: Vec<u8>) -> Vec<u8> {
    let mut json = json.as_bytes().to_vec();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());
    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json);
    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(&bin);
    glb
}

/// A 2×1 Radiance HDR image in flat (uncompressed) scanline form.
pub fn tiny_hdr() -> Vec<u8> {
    let mut bytes = b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y 1 +X 2\n".to_vec();
    bytes.extend_from_slice(&[128, 128, 128, 129]);
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes
}

/// Holds every request open until `release` or `shutdown`.
#[derive(Default)]
pub struct GatedLoader {
    pending: RefCell<Vec<(String, futures::channel::oneshot::Sender<Vec<u8>>)>>,
    pub shutdowns: Cell<usize>,
}

impl GatedLoader {
    pub fn in_flight(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Answer every open request with `bytes`.
    pub fn release(&self, bytes: &[u8]) {
        for (_, tx) in self.pending.borrow_mut().drain(..) {
            let _ = tx.send(bytes.to_vec());
        }
    }
}

impl AssetLoader for GatedLoader {
    fn load_bytes(&self, url: &str) -> LocalBoxFuture<'static, Result<Vec<u8>>> {
        let (tx, rx) = futures::channel::oneshot::channel();
        self.pending.borrow_mut().push((url.to_owned(), tx));
        let url = url.to_owned();
        Box::pin(async move {
            rx.await.map_err(|_| HeroError::Fetch {
                url,
                reason: "aborted".into(),
            })
        })
    }

    fn shutdown(&self) {
        self.shutdowns.set(self.shutdowns.get() + 1);
        self.pending.borrow_mut().clear();
    }
}
