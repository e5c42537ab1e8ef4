use crate::{
    catalog::{Catalog, CatalogEntry},
    filter::FilteredSequence,
    loader::{CellState, ImageLoader, LoadKey, Variant, is_near_visible},
    window::{
        GridMetrics, PendingRecompute, SMALL_VIEWPORT_WIDTH, ScrollSample, VisibleRange,
        visible_range,
    },
};

const GAP: f32 = 16.0;
const FLOW_CELL_HEIGHT: f32 = 180.0;
const LABEL_CHARS: usize = 32;

#[derive(Default)]
pub struct GridResponse {
    /// Filtered index of a cell the user activated this frame.
    pub clicked: Option<usize>,
}

/// Windowed thumbnail grid over the filtered sequence.
#[derive(Default)]
pub struct GridView {
    metrics: Option<GridMetrics>,
    range: VisibleRange,
    last_sample: Option<ScrollSample>,
    computed_len: usize,
    pending: PendingRecompute,
}

impl GridView {
    /// Forgets the window; the next frame recomputes from scratch.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        scroll_id: impl std::hash::Hash,
        catalog: &Catalog,
        filtered: &FilteredSequence,
        loader: &mut ImageLoader,
        scroll_locked: bool,
    ) -> GridResponse {
        if filtered.is_empty() {
            show_empty_state(ui);
            return GridResponse::default();
        }

        let width = ui.available_width();
        if width < SMALL_VIEWPORT_WIDTH {
            return show_flow(ui, scroll_id, catalog, filtered, loader, scroll_locked);
        }

        let metrics = GridMetrics::for_width(width);
        let len = filtered.len();
        let mut response = GridResponse::default();

        egui::ScrollArea::vertical()
            .id_salt(scroll_id)
            .auto_shrink([false, false])
            .enable_scrolling(!scroll_locked)
            .show_viewport(ui, |ui, viewport| {
                ui.set_height(metrics.total_height(len));

                let sample = ScrollSample {
                    offset: viewport.min.y,
                    viewport_height: viewport.height(),
                };
                if self.last_sample != Some(sample)
                    || self.metrics != Some(metrics)
                    || self.computed_len != len
                {
                    self.pending.request(sample);
                }
                self.recompute(metrics, len);

                if self.range.is_empty() {
                    return;
                }
                let origin = ui.min_rect().min;
                let block_top = origin.y + self.range.offset_y(&metrics);
                let first_row = self.range.start / metrics.column_count;
                let cols = metrics.column_count as f32;
                let cell_w = ((ui.available_width() - GAP * (cols - 1.0)) / cols).max(1.0);
                let cell_h = metrics.row_height - GAP;
                let clip = ui.clip_rect();

                for (index, entry) in filtered.slice(catalog, self.range.as_range()) {
                    let row = index / metrics.column_count - first_row;
                    let col = index % metrics.column_count;
                    let rect = egui::Rect::from_min_size(
                        egui::pos2(
                            origin.x + col as f32 * (cell_w + GAP),
                            block_top + row as f32 * metrics.row_height,
                        ),
                        egui::vec2(cell_w, cell_h),
                    );
                    let resp = ui.interact(
                        rect,
                        ui.id().with(("gallery_cell", entry.key)),
                        egui::Sense::click(),
                    );
                    if is_near_visible(rect, clip) {
                        loader.request(thumb_key(entry), &entry.src, ui.ctx());
                    }
                    draw_cell(ui, &resp, entry, index, loader);
                    if resp.clicked() {
                        response.clicked = Some(index);
                    }
                }

                for (_, entry) in
                    filtered.slice(catalog, self.range.prefetch_range(len, &metrics))
                {
                    loader.prefetch(thumb_key(entry), &entry.src, ui.ctx());
                }
            });

        response
    }

    /// Runs at most one window computation, for the most recent scroll sample.
    fn recompute(&mut self, metrics: GridMetrics, len: usize) {
        let Some(sample) = self.pending.take() else {
            return;
        };
        let range = visible_range(sample.offset, sample.viewport_height, &metrics, len);
        if range != self.range {
            tracing::trace!(
                start = range.start,
                end = range.end,
                drawn = range.len(),
                "grid window moved"
            );
        }
        self.range = range;
        self.metrics = Some(metrics);
        self.last_sample = Some(sample);
        self.computed_len = len;
    }
}

fn thumb_key(entry: &CatalogEntry) -> LoadKey {
    LoadKey {
        entry: entry.key,
        variant: Variant::Thumbnail,
    }
}

fn show_empty_state(ui: &mut egui::Ui) {
    ui.add_space(48.0);
    ui.vertical_centered(|ui| {
        ui.label(egui::RichText::new("🖼").size(48.0).weak());
        ui.add_space(8.0);
        ui.label(egui::RichText::new("No images found in this category").size(18.0).weak());
    });
}

/// Narrow-window layout: every item, no windowing.
fn show_flow(
    ui: &mut egui::Ui,
    scroll_id: impl std::hash::Hash,
    catalog: &Catalog,
    filtered: &FilteredSequence,
    loader: &mut ImageLoader,
    scroll_locked: bool,
) -> GridResponse {
    let mut response = GridResponse::default();
    let columns = GridMetrics::for_width(ui.available_width()).column_count;
    let cell_w = ((ui.available_width() - GAP * (columns as f32 - 1.0)) / columns as f32).max(1.0);

    egui::ScrollArea::vertical()
        .id_salt(scroll_id)
        .auto_shrink([false, false])
        .enable_scrolling(!scroll_locked)
        .show(ui, |ui| {
            egui::Grid::new("gallery_flow")
                .num_columns(columns)
                .spacing([GAP, GAP])
                .show(ui, |ui| {
                    for (index, entry) in filtered.iter(catalog) {
                        let (_, resp) = ui.allocate_exact_size(
                            egui::vec2(cell_w, FLOW_CELL_HEIGHT),
                            egui::Sense::click(),
                        );
                        if is_near_visible(resp.rect, ui.clip_rect()) {
                            loader.request(thumb_key(entry), &entry.src, ui.ctx());
                        }
                        draw_cell(ui, &resp, entry, index, loader);
                        if resp.clicked() {
                            response.clicked = Some(index);
                        }
                        if (index + 1) % columns == 0 {
                            ui.end_row();
                        }
                    }
                });
        });

    response
}

fn draw_cell(
    ui: &egui::Ui,
    resp: &egui::Response,
    entry: &CatalogEntry,
    index: usize,
    loader: &ImageLoader,
) {
    let rect = resp.rect;
    let alt = if entry.alt_text.is_empty() {
        format!("Gallery image {}", index + 1)
    } else {
        entry.alt_text.clone()
    };
    resp.widget_info(|| {
        egui::WidgetInfo::labeled(egui::WidgetType::Button, true, format!("View image: {alt}"))
    });

    if !ui.is_rect_visible(rect) {
        return;
    }
    let painter = ui.painter_at(rect);
    let visuals = ui.visuals();

    // Background
    painter.rect_filled(rect, 8.0, egui::Color32::from_gray(28));
    if resp.hovered() || resp.has_focus() {
        painter.rect_stroke(
            rect,
            8.0,
            egui::Stroke::new(2.0, visuals.selection.stroke.color),
            egui::StrokeKind::Inside,
        );
    }

    let key = thumb_key(entry);
    match (loader.state(key), loader.texture(key)) {
        (CellState::Loaded, Some(tex)) => {
            let inner = rect.shrink(4.0);
            let tex_size = tex.size_vec2();
            let scale = (inner.width() / tex_size.x).min(inner.height() / tex_size.y);
            let draw_rect = egui::Rect::from_center_size(inner.center(), tex_size * scale);
            painter.image(
                tex.id(),
                draw_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
        (CellState::Errored, _) => {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Error loading image",
                egui::FontId::proportional(13.0),
                egui::Color32::GRAY,
            );
        }
        _ => {
            painter.rect_filled(rect.shrink(4.0), 6.0, egui::Color32::from_gray(40));
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "🖼",
                egui::FontId::proportional(22.0),
                egui::Color32::GRAY,
            );
        }
    }

    // Hover overlay: category and title
    if resp.hovered() {
        let band = egui::Rect::from_min_max(
            egui::pos2(rect.left(), rect.bottom() - 48.0),
            rect.right_bottom(),
        );
        painter.rect_filled(band, 0.0, egui::Color32::from_black_alpha(170));
        painter.text(
            band.left_top() + egui::vec2(10.0, 8.0),
            egui::Align2::LEFT_TOP,
            entry.category.to_uppercase(),
            egui::FontId::proportional(10.0),
            egui::Color32::from_rgb(251, 191, 36),
        );
        painter.text(
            band.left_top() + egui::vec2(10.0, 24.0),
            egui::Align2::LEFT_TOP,
            truncate(&entry.title, LABEL_CHARS),
            egui::FontId::proportional(13.0),
            egui::Color32::WHITE,
        );
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("Portrait", 32), "Portrait");
        assert_eq!(truncate("ÉÉÉÉÉ", 3), "ÉÉ…");
    }

    #[test]
    fn recompute_applies_only_latest_sample() {
        let mut grid = GridView::default();
        let metrics = GridMetrics {
            column_count: 4,
            row_height: 280.0,
        };
        grid.pending.request(ScrollSample {
            offset: 0.0,
            viewport_height: 600.0,
        });
        grid.pending.request(ScrollSample {
            offset: 700.0,
            viewport_height: 600.0,
        });
        grid.recompute(metrics, 1000);
        assert_eq!(grid.range, VisibleRange { start: 8, end: 24 });

        // Nothing pending: the window stays put.
        grid.recompute(metrics, 10);
        assert_eq!(grid.range, VisibleRange { start: 8, end: 24 });
    }

    #[test]
    fn reset_clears_window() {
        let mut grid = GridView::default();
        grid.pending.request(ScrollSample {
            offset: 0.0,
            viewport_height: 600.0,
        });
        grid.recompute(GridMetrics::for_width(1200.0), 50);
        assert!(!grid.range.is_empty());
        grid.reset();
        assert!(grid.range.is_empty());
    }
}
