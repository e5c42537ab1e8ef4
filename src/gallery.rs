use std::sync::Arc;

use crate::{
    catalog::{Catalog, CatalogEntry},
    filter::{Category, FilteredSequence},
    grid::GridView,
    lightbox::{self, LightboxEvent, LightboxView},
    loader::{CellState, ImageLoader, LoadKey, Variant},
    viewer::{OpenViewer, ScrollLocks, ViewerAction},
};

/// Owns the catalog view: filter selection, grid window, image loads and the
/// open viewer. Child views only report intents back here.
pub struct Gallery {
    catalog: Arc<Catalog>,
    categories: Vec<Category>,
    selected: Category,
    filtered: FilteredSequence,
    grid: GridView,
    loader: ImageLoader,
    scroll_locks: ScrollLocks,
    viewer: Option<OpenViewer>,
}

impl Gallery {
    pub fn new(catalog: Arc<Catalog>, initial: Category) -> Self {
        let categories = Category::enumerate(&catalog);
        let selected = if categories.contains(&initial) {
            initial
        } else {
            Category::All
        };
        let filtered = FilteredSequence::new(&catalog, &selected);
        tracing::info!(
            images = catalog.len(),
            categories = categories.len() - 1,
            "gallery ready"
        );
        Self {
            catalog,
            categories,
            selected,
            filtered,
            grid: GridView::default(),
            loader: ImageLoader::new(),
            scroll_locks: ScrollLocks::default(),
            viewer: None,
        }
    }

    pub fn selected(&self) -> &Category {
        &self.selected
    }

    /// Changing the filter closes an open viewer: its index would point into
    /// the old sequence.
    pub fn select_category(&mut self, category: Category) {
        if category == self.selected {
            return;
        }
        if self.viewer.is_some() {
            tracing::debug!("closing viewer on category change");
            self.close_viewer();
        }
        tracing::debug!(category = category.name(), "category selected");
        self.filtered = FilteredSequence::new(&self.catalog, &category);
        self.selected = category;
        self.grid.reset();
    }

    pub fn open_viewer(&mut self, index: usize) {
        if index >= self.filtered.len() {
            return;
        }
        tracing::debug!(index, "viewer opened");
        self.viewer = Some(OpenViewer::open(index, &self.scroll_locks));
    }

    /// Drops the viewer state, which releases its scroll lock and the
    /// full-size texture.
    pub fn close_viewer(&mut self) {
        if self.viewer.take().is_some() {
            tracing::debug!("viewer closed");
            self.loader.retain_full(None);
        }
    }

    fn current_entry(&self) -> Option<&CatalogEntry> {
        let viewer = self.viewer.as_ref()?;
        self.filtered
            .get(&self.catalog, viewer.state.current_index())
    }

    pub fn apply(&mut self, action: ViewerAction) {
        if action == ViewerAction::Close {
            self.close_viewer();
            return;
        }
        let len = self.filtered.len();
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.state.apply(action, len);
        }
    }

    fn handle(&mut self, event: LightboxEvent) {
        match event {
            LightboxEvent::Action(action) => self.apply(action),
            LightboxEvent::TouchEnd(pos) => {
                let swipe = self.viewer.as_mut().and_then(|v| v.swipe.finish(pos));
                if let Some(action) = swipe {
                    self.apply(action);
                }
            }
            other => {
                let Some(viewer) = self.viewer.as_mut() else {
                    return;
                };
                match other {
                    LightboxEvent::DragBegin(pos) => viewer.state.begin_drag(pos),
                    LightboxEvent::DragMove(pos) => viewer.state.drag_to(pos),
                    LightboxEvent::DragEnd => viewer.state.end_drag(),
                    LightboxEvent::TouchStart(pos) => viewer.swipe.start(pos),
                    LightboxEvent::TouchCancel => viewer.swipe.cancel(),
                    LightboxEvent::Action(_) | LightboxEvent::TouchEnd(_) => {}
                }
            }
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        let ctx = ui.ctx().clone();
        self.loader.poll(&ctx);

        ui.vertical_centered(|ui| {
            ui.add_space(12.0);
            ui.label(
                egui::RichText::new("VISUAL SHOWCASE")
                    .size(12.0)
                    .color(egui::Color32::from_rgb(251, 191, 36)),
            );
            ui.heading(egui::RichText::new("My Gallery").size(32.0).strong());
            ui.add_space(12.0);
        });

        let mut picked: Option<Category> = None;
        ui.horizontal_wrapped(|ui| {
            for category in &self.categories {
                let is_sel = *category == self.selected;
                if ui
                    .selectable_label(is_sel, category.label())
                    .clicked()
                {
                    picked = Some(category.clone());
                }
            }
        });
        ui.separator();
        if let Some(category) = picked {
            self.select_category(category);
        }

        let scroll_locked = self.scroll_locks.is_locked();
        let resp = self.grid.show(
            ui,
            ("gallery_grid", self.selected.name()),
            &self.catalog,
            &self.filtered,
            &mut self.loader,
            scroll_locked,
        );
        if let Some(index) = resp.clicked {
            self.open_viewer(index);
        }

        self.show_viewer(&ctx);
    }

    fn show_viewer(&mut self, ctx: &egui::Context) {
        if self.viewer.is_none() {
            return;
        }
        let Some((key, src)) = self.current_entry().map(|e| (e.key, e.src.clone())) else {
            self.close_viewer();
            return;
        };

        let full = LoadKey {
            entry: key,
            variant: Variant::Full,
        };
        let thumb = LoadKey {
            entry: key,
            variant: Variant::Thumbnail,
        };
        self.loader.retain_full(Some(key));
        self.loader.request(full, &src, ctx);

        let (Some(viewer), Some(entry)) = (self.viewer.as_ref(), self.current_entry()) else {
            return;
        };
        let events = lightbox::show(
            ctx,
            LightboxView {
                state: &viewer.state,
                entry,
                total: self.filtered.len(),
                texture: self
                    .loader
                    .texture(full)
                    .or_else(|| self.loader.texture(thumb)),
                failed: self.loader.state(full) == CellState::Errored,
            },
        );
        for event in events {
            self.handle(event);
        }
    }
}

#[cfg(test)]
impl Gallery {
    pub(crate) fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub(crate) fn is_viewer_open(&self) -> bool {
        self.viewer.is_some()
    }

    pub(crate) fn viewer_index(&self) -> Option<usize> {
        self.viewer.as_ref().map(|v| v.state.current_index())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use egui::Pos2;

    use super::*;
    use crate::catalog::{GalleryGroup, ImageRef};

    fn group(category: &str, n: usize) -> GalleryGroup {
        GalleryGroup {
            category: category.into(),
            title: format!("{category} series"),
            images: (0..n)
                .map(|i| ImageRef::Bare(format!("{category}/{i}.jpg")))
                .collect(),
        }
    }

    fn gallery() -> Gallery {
        let catalog = Catalog::from_groups(
            &[group("Oils", 10), group("Digital", 5), group("Murals", 0)],
            Path::new("/art"),
        );
        Gallery::new(Arc::new(catalog), Category::All)
    }

    #[test]
    fn selecting_categories_refilters() {
        let mut g = gallery();
        assert_eq!(g.filtered_len(), 15);
        g.select_category(Category::Named("Digital".into()));
        assert_eq!(g.filtered_len(), 5);
        g.select_category(Category::Named("Murals".into()));
        assert_eq!(g.filtered_len(), 0);
    }

    #[test]
    fn unknown_initial_category_falls_back_to_all() {
        let catalog = Catalog::from_groups(&[group("Oils", 2)], Path::new("/art"));
        let g = Gallery::new(Arc::new(catalog), Category::Named("Gone".into()));
        assert_eq!(*g.selected(), Category::All);
    }

    #[test]
    fn viewer_wraps_within_filtered_sequence() {
        let mut g = gallery();
        g.select_category(Category::Named("Digital".into()));
        g.open_viewer(2);
        g.apply(ViewerAction::Prev);
        g.apply(ViewerAction::Prev);
        assert_eq!(g.viewer_index(), Some(0));
        g.apply(ViewerAction::Prev);
        assert_eq!(g.viewer_index(), Some(4));
        assert_eq!(
            g.current_entry().map(|e| e.key.image_index),
            Some(4)
        );
    }

    #[test]
    fn opening_locks_scrolling_and_closing_releases_it() {
        let mut g = gallery();
        g.open_viewer(0);
        assert!(g.scroll_locks.is_locked());
        g.apply(ViewerAction::Close);
        assert!(!g.is_viewer_open());
        assert!(!g.scroll_locks.is_locked());
    }

    #[test]
    fn category_change_closes_viewer() {
        let mut g = gallery();
        g.open_viewer(12);
        g.select_category(Category::Named("Oils".into()));
        assert!(!g.is_viewer_open());
        assert!(!g.scroll_locks.is_locked());
    }

    #[test]
    fn out_of_range_open_is_ignored() {
        let mut g = gallery();
        g.select_category(Category::Named("Murals".into()));
        g.open_viewer(0);
        assert!(!g.is_viewer_open());
    }

    #[test]
    fn swipe_events_navigate() {
        let mut g = gallery();
        g.open_viewer(0);
        g.handle(LightboxEvent::TouchStart(Pos2::new(300.0, 200.0)));
        g.handle(LightboxEvent::TouchEnd(Pos2::new(220.0, 210.0)));
        assert_eq!(g.viewer_index(), Some(1));

        g.handle(LightboxEvent::TouchStart(Pos2::new(300.0, 200.0)));
        g.handle(LightboxEvent::TouchEnd(Pos2::new(220.0, 290.0)));
        assert_eq!(g.viewer_index(), Some(1));
    }

    #[test]
    fn drag_events_pan_only_when_zoomed() {
        let mut g = gallery();
        g.open_viewer(0);
        g.handle(LightboxEvent::DragBegin(Pos2::new(0.0, 0.0)));
        g.handle(LightboxEvent::DragMove(Pos2::new(20.0, 0.0)));
        let pan = g.viewer.as_ref().map(|v| v.state.pan());
        assert_eq!(pan, Some(egui::Vec2::ZERO));

        g.apply(ViewerAction::ToggleZoom);
        g.handle(LightboxEvent::DragBegin(Pos2::new(0.0, 0.0)));
        g.handle(LightboxEvent::DragMove(Pos2::new(20.0, 5.0)));
        g.handle(LightboxEvent::DragEnd);
        let pan = g.viewer.as_ref().map(|v| v.state.pan());
        assert_eq!(pan, Some(egui::vec2(20.0, 5.0)));
    }
}
