// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Airline logo cache and loading.
//!
//! Logos are downloaded once on a background thread, cached on disk under
//! SHA256-based filenames, and turned into egui textures. A logo that fails
//! to download is remembered for the session so the card falls back to a
//! plane glyph instead of retrying every frame.

use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, warn};

/// Logos are drawn in a square box of this many pixels
pub const LOGO_SIZE: u32 = 130;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(5);

/// Disk cache for logo images
#[derive(Debug, Clone)]
pub struct LogoStore {
    cache_dir: PathBuf,
    client: reqwest::blocking::Client,
}

impl LogoStore {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let cache_dir = dirs::cache_dir()
            .ok_or("Could not determine cache directory")?
            .join("flights-overhead")
            .join("logos");
        Self::with_dir(cache_dir)
    }

    pub fn with_dir(cache_dir: PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        fs::create_dir_all(&cache_dir)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()?;

        Ok(Self { cache_dir, client })
    }

    /// Get cache file path for a given URL
    fn get_cache_path(&self, url: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        let hash = format!("{:x}", hasher.finalize());

        self.cache_dir.join(format!("{}.{}", hash, extension(url)))
    }

    /// Get cached image bytes
    pub fn get_cached_bytes(&self, url: &str) -> Option<Vec<u8>> {
        fs::read(self.get_cache_path(url)).ok()
    }

    /// Download an image and write it to the cache
    pub fn download_and_cache(&self, url: &str) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        let response = self.client.get(url).send()?;

        if !response.status().is_success() {
            return Err(format!("HTTP error: {}", response.status()).into());
        }

        let bytes = response.bytes()?.to_vec();
        fs::write(self.get_cache_path(url), &bytes)?;

        Ok(bytes)
    }
}

/// File extension from the last path segment, ignoring any query string
fn extension(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    match segment.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.len() <= 4 => ext,
        _ => "png",
    }
}

/// Decode image bytes into an egui image, shrinking anything larger than
/// the logo box
pub fn decode_logo(bytes: &[u8]) -> Option<egui::ColorImage> {
    let mut image = image::load_from_memory(bytes).ok()?;
    if image.width() > LOGO_SIZE || image.height() > LOGO_SIZE {
        image = image.resize(LOGO_SIZE, LOGO_SIZE, image::imageops::FilterType::Lanczos3);
    }

    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Some(egui::ColorImage::from_rgba_unmultiplied(size, &rgba.into_raw()))
}

/// What the card can draw for a logo right now
#[derive(Clone)]
pub enum LogoState {
    Ready(egui::TextureHandle),
    Loading,
    Unavailable,
}

impl std::fmt::Debug for LogoState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogoState::Ready(texture) => f.debug_tuple("Ready").field(&texture.id()).finish(),
            LogoState::Loading => f.write_str("Loading"),
            LogoState::Unavailable => f.write_str("Unavailable"),
        }
    }
}

/// Manages loading airline logos into egui textures
pub struct LogoTextures {
    store: LogoStore,
    textures: Arc<Mutex<HashMap<String, egui::TextureHandle>>>,
    loading: Arc<Mutex<HashSet<String>>>,
    failed: Arc<Mutex<HashSet<String>>>,
}

impl std::fmt::Debug for LogoTextures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogoTextures")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl LogoTextures {
    pub fn new(store: LogoStore) -> Self {
        Self {
            store,
            textures: Arc::new(Mutex::new(HashMap::new())),
            loading: Arc::new(Mutex::new(HashSet::new())),
            failed: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Get the texture for a logo URL, starting a download if needed
    pub fn get_or_load(&self, ctx: &egui::Context, url: &str) -> LogoState {
        if let Some(texture) = self.textures.lock().ok().and_then(|t| t.get(url).cloned()) {
            return LogoState::Ready(texture);
        }

        if self.failed.lock().is_ok_and(|f| f.contains(url)) {
            return LogoState::Unavailable;
        }

        // Check disk cache
        if let Some(image) = self.store.get_cached_bytes(url).as_deref().and_then(decode_logo) {
            let texture = ctx.load_texture(format!("logo_{url}"), image, egui::TextureOptions::LINEAR);
            if let Ok(mut textures) = self.textures.lock() {
                textures.insert(url.to_string(), texture.clone());
            }
            return LogoState::Ready(texture);
        }

        // Check if already loading
        match self.loading.lock() {
            Ok(mut loading) => {
                if !loading.insert(url.to_string()) {
                    return LogoState::Loading;
                }
            }
            Err(_) => return LogoState::Unavailable,
        }

        let store = self.store.clone();
        let url = url.to_string();
        let textures = Arc::clone(&self.textures);
        let loading = Arc::clone(&self.loading);
        let failed = Arc::clone(&self.failed);
        let ctx = ctx.clone();

        std::thread::spawn(move || {
            let image = match store.download_and_cache(&url) {
                Ok(bytes) => decode_logo(&bytes),
                Err(e) => {
                    debug!("Logo download failed for {url}: {e}");
                    None
                }
            };

            match image {
                Some(image) => {
                    let texture =
                        ctx.load_texture(format!("logo_{url}"), image, egui::TextureOptions::LINEAR);
                    if let Ok(mut textures) = textures.lock() {
                        textures.insert(url.clone(), texture);
                    }
                }
                None => {
                    warn!("No logo available from {url}");
                    if let Ok(mut failed) = failed.lock() {
                        failed.insert(url.clone());
                    }
                }
            }

            if let Ok(mut loading) = loading.lock() {
                loading.remove(&url);
            }
            ctx.request_repaint();
        });

        LogoState::Loading
    }
}
