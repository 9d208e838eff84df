use futures::future::LocalBoxFuture;
use hero_core::assets::AssetLoader;
use hero_core::error::{HeroError, Result};
use js_sys::Uint8Array;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// `fetch`-based loader sharing one `AbortController` per hero instance.
pub struct FetchLoader {
    controller: Option<web::AbortController>,
}

impl FetchLoader {
    pub fn new() -> Self {
        let controller = web::AbortController::new()
            .map_err(|e| log::warn!("[assets] AbortController unavailable: {:?}", e))
            .ok();
        Self { controller }
    }
}

impl Default for FetchLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLoader for FetchLoader {
    fn load_bytes(&self, url: &str) -> LocalBoxFuture<'static, Result<Vec<u8>>> {
        let url = url.to_owned();
        let signal = self.controller.as_ref().map(|c| c.signal());
        Box::pin(async move {
            let result = fetch_bytes(&url, signal.as_ref()).await;
            result.map_err(|reason| HeroError::Fetch { url, reason })
        })
    }

    fn shutdown(&self) {
        if let Some(controller) = &self.controller {
            controller.abort();
        }
    }
}

async fn fetch_bytes(
    url: &str,
    signal: Option<&web::AbortSignal>,
) -> std::result::Result<Vec<u8>, String> {
    let window = web::window().ok_or("no window")?;
    let init = web::RequestInit::new();
    init.set_signal(signal);
    let response = JsFuture::from(window.fetch_with_str_and_init(url, &init))
        .await
        .map_err(|e| format!("{:?}", e))?;
    let response: web::Response = response.dyn_into().map_err(|e| format!("{:?}", e))?;
    if !response.ok() {
        return Err(format!("HTTP {}", response.status()));
    }
    let buffer = response.array_buffer().map_err(|e| format!("{:?}", e))?;
    let buffer = JsFuture::from(buffer).await.map_err(|e| format!("{:?}", e))?;
    Ok(Uint8Array::new(&buffer).to_vec())
}
