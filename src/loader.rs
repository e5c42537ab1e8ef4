use std::{
    collections::{HashMap, VecDeque},
    io::Read,
    path::Path,
    sync::{Arc, mpsc},
};

use anyhow::Context;

use crate::catalog::{EntryKey, ImageSource};

/// Longest edge of grid thumbnails.
pub const THUMB_SIZE: u32 = 300;
/// Longest edge of images shown in the viewer.
pub const FULL_MAX: u32 = 1920;
/// Cells start loading this many points before they scroll into view.
pub const VISIBILITY_MARGIN: f32 = 50.0;
/// Fraction of a cell that must overlap the expanded viewport.
pub const VISIBILITY_THRESHOLD: f32 = 0.1;
const MAX_REMOTE_BYTES: u64 = 64 * 1024 * 1024;
/// Thumbnail textures kept resident; the least recently requested go first.
pub const MAX_LOADED_THUMBNAILS: usize = 96;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Thumbnail,
    Full,
}

impl Variant {
    fn max_edge(self) -> u32 {
        match self {
            Variant::Thumbnail => THUMB_SIZE,
            Variant::Full => FULL_MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadKey {
    pub entry: EntryKey,
    pub variant: Variant,
}

/// Lifecycle of one lazily loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellState {
    #[default]
    NotVisible,
    Loading,
    Loaded,
    Errored,
}

impl CellState {
    /// Returns the next state and whether a fetch has to start.
    pub fn on_near_visible(self) -> (CellState, bool) {
        match self {
            CellState::NotVisible => (CellState::Loading, true),
            other => (other, false),
        }
    }

    /// `Loaded` and `Errored` are terminal; late results do not move them.
    pub fn on_fetched(self, ok: bool) -> CellState {
        match self {
            CellState::NotVisible | CellState::Loading if ok => CellState::Loaded,
            CellState::NotVisible | CellState::Loading => CellState::Errored,
            terminal => terminal,
        }
    }
}

/// Whether `cell` overlaps the viewport grown by [`VISIBILITY_MARGIN`] by at
/// least [`VISIBILITY_THRESHOLD`] of its own area.
pub fn is_near_visible(cell: egui::Rect, viewport: egui::Rect) -> bool {
    let area = cell.area();
    if area.is_nan() || area <= 0.0 {
        return false;
    }
    let overlap = cell.intersect(viewport.expand(VISIBILITY_MARGIN));
    if !overlap.is_positive() {
        return false;
    }
    overlap.area() / area >= VISIBILITY_THRESHOLD
}

type Fetcher = Arc<dyn Fn(&ImageSource) -> anyhow::Result<Vec<u8>> + Send + Sync>;

struct FetchResult {
    key: LoadKey,
    label: String,
    image: anyhow::Result<egui::ColorImage>,
}

/// Owns per-image load state and the textures of finished loads.
///
/// Thumbnail textures are capped at [`MAX_LOADED_THUMBNAILS`]. Full-size
/// textures are kept only for the image the viewer shows.
pub struct ImageLoader {
    states: HashMap<LoadKey, CellState>,
    textures: HashMap<LoadKey, egui::TextureHandle>,
    /// Loaded thumbnails, oldest use at the front.
    loaded_lru: VecDeque<LoadKey>,
    fetch: Fetcher,
    tx: mpsc::SyncSender<FetchResult>,
    rx: mpsc::Receiver<FetchResult>,
}

impl ImageLoader {
    pub fn new() -> Self {
        Self::with_fetcher(Arc::new(read_source))
    }

    fn with_fetcher(fetch: Fetcher) -> Self {
        let (tx, rx) = mpsc::sync_channel(64);
        Self {
            states: HashMap::new(),
            textures: HashMap::new(),
            loaded_lru: VecDeque::new(),
            fetch,
            tx,
            rx,
        }
    }

    pub fn state(&self, key: LoadKey) -> CellState {
        self.states.get(&key).copied().unwrap_or_default()
    }

    pub fn texture(&self, key: LoadKey) -> Option<&egui::TextureHandle> {
        self.textures.get(&key)
    }

    /// Marks a cell near-visible, starting its fetch on the first call.
    pub fn request(&mut self, key: LoadKey, src: &ImageSource, ctx: &egui::Context) -> CellState {
        let (next, start) = self.state(key).on_near_visible();
        self.states.insert(key, next);
        if start {
            self.spawn_fetch(key, src.clone(), Some(ctx.clone()));
        } else if next == CellState::Loaded {
            self.touch(key);
        }
        next
    }

    fn touch(&mut self, key: LoadKey) {
        if let Some(pos) = self.loaded_lru.iter().position(|k| *k == key) {
            self.loaded_lru.remove(pos);
            self.loaded_lru.push_back(key);
        }
    }

    /// Frees a loaded texture. The cell returns to `NotVisible` so it loads
    /// again next time it is requested.
    fn evict(&mut self, key: LoadKey) {
        if self.state(key) == CellState::Loaded {
            self.states.remove(&key);
            self.textures.remove(&key);
        }
    }

    /// Drops every full-size texture except the one for `keep`.
    pub fn retain_full(&mut self, keep: Option<EntryKey>) {
        let stale: Vec<LoadKey> = self
            .textures
            .keys()
            .filter(|k| k.variant == Variant::Full && Some(k.entry) != keep)
            .copied()
            .collect();
        for key in stale {
            self.evict(key);
        }
    }

    /// Fetches ahead of visibility. Already requested images are left alone.
    pub fn prefetch(&mut self, key: LoadKey, src: &ImageSource, ctx: &egui::Context) {
        if self.state(key) == CellState::NotVisible {
            self.request(key, src, ctx);
        }
    }

    fn spawn_fetch(&self, key: LoadKey, src: ImageSource, ctx: Option<egui::Context>) {
        let tx = self.tx.clone();
        let fetch = Arc::clone(&self.fetch);
        rayon::spawn(move || {
            let label = src.display_name();
            let image = load_image(&src, key.variant, |s| fetch(s));
            let _ = tx.send(FetchResult { key, label, image });
            if let Some(ctx) = ctx {
                ctx.request_repaint();
            }
        });
    }

    /// Applies finished fetches and uploads their textures.
    pub fn poll(&mut self, ctx: &egui::Context) {
        while let Ok(result) = self.rx.try_recv() {
            if let Some((key, label, image)) = self.receive(result) {
                self.store(ctx, key, label, image);
            }
        }
    }

    fn store(&mut self, ctx: &egui::Context, key: LoadKey, label: String, image: egui::ColorImage) {
        let texture = ctx.load_texture(label, image, egui::TextureOptions::LINEAR);
        self.textures.insert(key, texture);
        if key.variant != Variant::Thumbnail {
            return;
        }
        self.loaded_lru.push_back(key);
        let mut evicted = 0;
        while self.loaded_lru.len() > MAX_LOADED_THUMBNAILS {
            if let Some(oldest) = self.loaded_lru.pop_front() {
                self.evict(oldest);
                evicted += 1;
            }
        }
        if evicted > 0 {
            tracing::debug!(evicted, "evicted thumbnails to stay under limit");
        }
    }

    /// Records a fetch outcome; returns the image when it still needs uploading.
    fn receive(&mut self, result: FetchResult) -> Option<(LoadKey, String, egui::ColorImage)> {
        let FetchResult { key, label, image } = result;
        let prev = self.state(key);
        let next = prev.on_fetched(image.is_ok());
        self.states.insert(key, next);
        match image {
            Ok(image) if next == CellState::Loaded && !self.textures.contains_key(&key) => {
                Some((key, label, image))
            }
            Ok(_) => None,
            Err(err) => {
                tracing::warn!("failed to load {label}: {err:#}");
                None
            }
        }
    }
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads the raw bytes behind a portfolio locator.
pub fn read_source(src: &ImageSource) -> anyhow::Result<Vec<u8>> {
    match src {
        ImageSource::Path(path) => read_file(path),
        ImageSource::Url(url) => {
            let response = ureq::get(url)
                .call()
                .with_context(|| format!("requesting {url}"))?;
            let mut bytes = Vec::new();
            response
                .into_reader()
                .take(MAX_REMOTE_BYTES)
                .read_to_end(&mut bytes)
                .with_context(|| format!("reading body of {url}"))?;
            Ok(bytes)
        }
    }
}

fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

/// Fetches and decodes one image, downscaled to the variant's size limit.
fn load_image<F>(src: &ImageSource, variant: Variant, fetch: F) -> anyhow::Result<egui::ColorImage>
where
    F: Fn(&ImageSource) -> anyhow::Result<Vec<u8>>,
{
    let bytes = fetch(src)?;
    let decoded = image::load_from_memory(&bytes).context("decoding image")?;
    let max = variant.max_edge();
    let scaled = if decoded.width() > max || decoded.height() > max {
        decoded.thumbnail(max, max)
    } else {
        decoded
    };
    let rgba = scaled.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}
