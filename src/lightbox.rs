//! Full-window image overlay. Draws the current viewer state and reports
//! what the user asked for; the gallery decides what to do with it.

use egui::{Color32, Event, Id, Pos2, Rect, Sense, TouchPhase, pos2, vec2};

use crate::{
    catalog::CatalogEntry,
    viewer::{ViewerAction, ViewerState, action_for_key, action_for_wheel},
};

const HEADER_HEIGHT: f32 = 72.0;
const FOOTER_HEIGHT: f32 = 96.0;
const ARROW_WIDTH: f32 = 56.0;
const BUTTON: f32 = 36.0;
const ACCENT: Color32 = Color32::from_rgb(251, 191, 36);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightboxEvent {
    Action(ViewerAction),
    DragBegin(Pos2),
    DragMove(Pos2),
    DragEnd,
    TouchStart(Pos2),
    TouchEnd(Pos2),
    TouchCancel,
}

/// What the lightbox needs to draw one frame.
#[derive(Clone, Copy)]
pub struct LightboxView<'a> {
    pub state: &'a ViewerState,
    pub entry: &'a CatalogEntry,
    pub total: usize,
    /// Best texture available: the full image, else its thumbnail.
    pub texture: Option<&'a egui::TextureHandle>,
    pub failed: bool,
}

pub fn show(ctx: &egui::Context, view: LightboxView<'_>) -> Vec<LightboxEvent> {
    let mut events = collect_input(ctx);
    let screen = ctx.screen_rect();

    egui::Area::new(Id::new("lightbox"))
        .order(egui::Order::Foreground)
        .fixed_pos(screen.min)
        .show(ctx, |ui| {
            ui.set_min_size(screen.size());

            let backdrop = ui.interact(screen, Id::new("lightbox_backdrop"), Sense::click());
            ui.painter()
                .rect_filled(screen, 0.0, Color32::from_black_alpha(242));

            let header = Rect::from_min_size(screen.min, vec2(screen.width(), HEADER_HEIGHT));
            let footer = Rect::from_min_max(
                pos2(screen.left(), screen.bottom() - FOOTER_HEIGHT),
                screen.max,
            );
            let stage = Rect::from_min_max(
                pos2(screen.left() + ARROW_WIDTH, header.bottom()),
                pos2(screen.right() - ARROW_WIDTH, footer.top()),
            );

            draw_image(ui, &view, stage, &mut events);
            draw_header(ui, &view, header, &mut events);
            draw_side_arrows(ui, header, footer, screen, &mut events);
            draw_footer(ui, view.state, footer, &mut events);

            if backdrop.clicked() {
                events.push(LightboxEvent::Action(ViewerAction::Close));
            }
        });

    events
}

/// Keyboard, wheel and touch input, gathered while the lightbox is open.
fn collect_input(ctx: &egui::Context) -> Vec<LightboxEvent> {
    ctx.input(|i| {
        let mut events = Vec::new();
        for event in &i.events {
            match event {
                Event::Key {
                    key, pressed: true, ..
                } => {
                    if let Some(action) = action_for_key(*key) {
                        events.push(LightboxEvent::Action(action));
                    }
                }
                Event::Touch { phase, pos, .. } => match phase {
                    TouchPhase::Start => events.push(LightboxEvent::TouchStart(*pos)),
                    TouchPhase::End => events.push(LightboxEvent::TouchEnd(*pos)),
                    TouchPhase::Cancel => events.push(LightboxEvent::TouchCancel),
                    TouchPhase::Move => {}
                },
                _ => {}
            }
        }
        if let Some(action) = action_for_wheel(i.raw_scroll_delta.y) {
            events.push(LightboxEvent::Action(action));
        }
        events
    })
}

fn draw_image(
    ui: &mut egui::Ui,
    view: &LightboxView<'_>,
    stage: Rect,
    events: &mut Vec<LightboxEvent>,
) {
    let painter = ui.painter_at(stage);
    let Some(tex) = view.texture else {
        let msg = if view.failed {
            "⚠ Could not open image"
        } else {
            "Loading…"
        };
        painter.text(
            stage.center(),
            egui::Align2::CENTER_CENTER,
            msg,
            egui::FontId::proportional(16.0),
            Color32::GRAY,
        );
        return;
    };

    let tex_size = tex.size_vec2();
    let fit = (stage.width() / tex_size.x).min(stage.height() / tex_size.y);
    let shown = tex_size * fit * view.state.zoom();
    let image_rect = Rect::from_center_size(stage.center() + view.state.pan(), shown);

    painter.image(
        tex.id(),
        image_rect,
        Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
        Color32::WHITE,
    );

    let hit = image_rect.intersect(stage);
    if !hit.is_positive() {
        // Nothing left to grab, so a drag in progress can never stop on its own.
        if view.state.is_dragging() {
            events.push(LightboxEvent::DragEnd);
        }
        return;
    }
    let resp = ui.interact(hit, Id::new("lightbox_image"), Sense::click_and_drag());
    let alt = view.entry.alt_text.clone();
    resp.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Image, true, &alt));

    if resp.double_clicked() {
        events.push(LightboxEvent::Action(ViewerAction::ToggleZoom));
    }
    if resp.drag_started() {
        if let Some(pos) = resp.interact_pointer_pos() {
            events.push(LightboxEvent::DragBegin(pos));
        }
    } else if resp.dragged() {
        if let Some(pos) = resp.interact_pointer_pos() {
            events.push(LightboxEvent::DragMove(pos));
        }
    }
    let pointer_left = !ui.ctx().input(|i| i.pointer.has_pointer());
    if resp.drag_stopped() || (view.state.is_dragging() && pointer_left) {
        events.push(LightboxEvent::DragEnd);
    }

    if view.state.zoom() > 1.0 {
        let icon = if view.state.is_dragging() {
            egui::CursorIcon::Grabbing
        } else {
            egui::CursorIcon::Grab
        };
        resp.on_hover_cursor(icon);
    } else {
        resp.on_hover_cursor(egui::CursorIcon::ZoomIn);
    }
}

fn draw_header(
    ui: &mut egui::Ui,
    view: &LightboxView<'_>,
    header: Rect,
    events: &mut Vec<LightboxEvent>,
) {
    let painter = ui.painter();
    painter.text(
        header.left_top() + vec2(24.0, 16.0),
        egui::Align2::LEFT_TOP,
        &view.entry.title,
        egui::FontId::proportional(20.0),
        Color32::WHITE,
    );
    painter.text(
        header.left_top() + vec2(24.0, 44.0),
        egui::Align2::LEFT_TOP,
        &view.entry.category,
        egui::FontId::proportional(13.0),
        Color32::from_gray(170),
    );

    let y = header.center().y;
    let close = Rect::from_center_size(pos2(header.right() - 36.0, y), vec2(BUTTON, BUTTON));
    let next = close.translate(vec2(-(BUTTON + 12.0), 0.0));
    let counter = next.center() - vec2(BUTTON + 20.0, 0.0);
    let prev = Rect::from_center_size(counter - vec2(BUTTON + 20.0, 0.0), vec2(BUTTON, BUTTON));

    painter.text(
        counter,
        egui::Align2::CENTER_CENTER,
        format!("{} / {}", view.state.current_index() + 1, view.total),
        egui::FontId::monospace(14.0),
        Color32::WHITE,
    );

    if ui
        .put(prev, egui::Button::new("◀"))
        .on_hover_text("Previous image")
        .clicked()
    {
        events.push(LightboxEvent::Action(ViewerAction::Prev));
    }
    if ui
        .put(next, egui::Button::new("▶"))
        .on_hover_text("Next image")
        .clicked()
    {
        events.push(LightboxEvent::Action(ViewerAction::Next));
    }
    if ui
        .put(close, egui::Button::new("✕"))
        .on_hover_text("Close")
        .clicked()
    {
        events.push(LightboxEvent::Action(ViewerAction::Close));
    }
}

fn draw_side_arrows(
    ui: &mut egui::Ui,
    header: Rect,
    footer: Rect,
    screen: Rect,
    events: &mut Vec<LightboxEvent>,
) {
    let left = Rect::from_min_max(
        pos2(screen.left(), header.bottom()),
        pos2(screen.left() + ARROW_WIDTH, footer.top()),
    );
    let right = Rect::from_min_max(
        pos2(screen.right() - ARROW_WIDTH, header.bottom()),
        pos2(screen.right(), footer.top()),
    );
    let arrow = |label: &str| egui::Button::new(egui::RichText::new(label).size(24.0)).frame(false);

    if ui.put(left, arrow("❮")).on_hover_text("Previous image").clicked() {
        events.push(LightboxEvent::Action(ViewerAction::Prev));
    }
    if ui.put(right, arrow("❯")).on_hover_text("Next image").clicked() {
        events.push(LightboxEvent::Action(ViewerAction::Next));
    }
}

fn draw_footer(
    ui: &mut egui::Ui,
    state: &ViewerState,
    footer: Rect,
    events: &mut Vec<LightboxEvent>,
) {
    let row_y = footer.top() + 28.0;
    let center = pos2(footer.center().x, row_y);
    let zoom_out = Rect::from_center_size(center - vec2(64.0, 0.0), vec2(BUTTON, BUTTON));
    let zoom_in = Rect::from_center_size(center + vec2(64.0, 0.0), vec2(BUTTON, BUTTON));

    let can_out = state.can_zoom_out();
    if ui
        .put(zoom_out, |ui: &mut egui::Ui| {
            ui.add_enabled(can_out, egui::Button::new("−"))
        })
        .on_hover_text("Zoom out")
        .clicked()
    {
        events.push(LightboxEvent::Action(ViewerAction::ZoomOut));
    }
    let can_in = state.can_zoom_in();
    if ui
        .put(zoom_in, |ui: &mut egui::Ui| {
            ui.add_enabled(can_in, egui::Button::new("+"))
        })
        .on_hover_text("Zoom in")
        .clicked()
    {
        events.push(LightboxEvent::Action(ViewerAction::ZoomIn));
    }

    let painter = ui.painter();
    painter.text(
        center,
        egui::Align2::CENTER_CENTER,
        format!("{}%", (state.zoom() * 100.0).round() as i32),
        egui::FontId::monospace(14.0),
        Color32::from_gray(200),
    );
    painter.text(
        pos2(footer.center().x, footer.bottom() - 24.0),
        egui::Align2::CENTER_CENTER,
        "Double-click or scroll to zoom • Drag to move • Esc to close • Arrows or swipe to navigate",
        egui::FontId::proportional(12.0),
        ACCENT.gamma_multiply(0.8),
    );
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::catalog::{Catalog, GalleryGroup, ImageRef};

    fn run_frame(ctx: &egui::Context, view: LightboxView<'_>) -> Vec<LightboxEvent> {
        let input = egui::RawInput {
            screen_rect: Some(Rect::from_min_size(Pos2::ZERO, vec2(1200.0, 800.0))),
            ..Default::default()
        };
        let mut events = Vec::new();
        let _ = ctx.run(input, |ctx| events = show(ctx, view));
        events
    }

    fn catalog() -> Catalog {
        Catalog::from_groups(
            &[GalleryGroup {
                category: "Oils".into(),
                title: "Harbour".into(),
                images: vec![ImageRef::Bare("a.jpg".into())],
            }],
            Path::new("/art"),
        )
    }

    #[test]
    fn drag_ends_when_image_is_panned_off_stage() {
        let ctx = egui::Context::default();
        let texture = ctx.load_texture(
            "test",
            egui::ColorImage::new([4, 4], Color32::WHITE),
            egui::TextureOptions::LINEAR,
        );
        let catalog = catalog();
        let entry = catalog.get(0).expect("one entry");

        let mut state = ViewerState::open(0);
        state.set_zoom(2.0);
        state.begin_drag(Pos2::new(0.0, 0.0));
        state.drag_to(Pos2::new(20_000.0, 0.0));
        assert!(state.is_dragging());

        let events = run_frame(
            &ctx,
            LightboxView {
                state: &state,
                entry,
                total: 1,
                texture: Some(&texture),
                failed: false,
            },
        );
        assert!(events.contains(&LightboxEvent::DragEnd));
    }

    #[test]
    fn idle_off_stage_image_reports_nothing() {
        let ctx = egui::Context::default();
        let texture = ctx.load_texture(
            "test",
            egui::ColorImage::new([4, 4], Color32::WHITE),
            egui::TextureOptions::LINEAR,
        );
        let catalog = catalog();
        let entry = catalog.get(0).expect("one entry");

        let mut state = ViewerState::open(0);
        state.set_zoom(2.0);
        state.begin_drag(Pos2::new(0.0, 0.0));
        state.drag_to(Pos2::new(20_000.0, 0.0));
        state.end_drag();

        let events = run_frame(
            &ctx,
            LightboxView {
                state: &state,
                entry,
                total: 1,
                texture: Some(&texture),
                failed: false,
            },
        );
        assert!(!events.contains(&LightboxEvent::DragEnd));
    }
}
