use std::{cell::Cell, rc::Rc};

use egui::{Key, Pos2, Vec2};

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 3.0;
pub const ZOOM_STEP: f32 = 0.25;
/// Zoom applied by a double click/tap from the unzoomed view.
pub const TOGGLE_ZOOM: f32 = 2.0;
/// Minimum horizontal travel, in points, for a touch to count as a swipe.
pub const SWIPE_THRESHOLD: f32 = 50.0;

/// Everything the viewer can be asked to do, whatever the input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    Close,
    Next,
    Prev,
    ZoomIn,
    ZoomOut,
    ToggleZoom,
}

pub fn action_for_key(key: Key) -> Option<ViewerAction> {
    match key {
        Key::Escape => Some(ViewerAction::Close),
        Key::ArrowRight => Some(ViewerAction::Next),
        Key::ArrowLeft => Some(ViewerAction::Prev),
        Key::Plus | Key::Equals => Some(ViewerAction::ZoomIn),
        Key::Minus => Some(ViewerAction::ZoomOut),
        _ => None,
    }
}

/// Wheel input: egui reports scrolling up (away from the user) as positive `y`.
pub fn action_for_wheel(delta_y: f32) -> Option<ViewerAction> {
    if delta_y == 0.0 || !delta_y.is_finite() {
        None
    } else if delta_y > 0.0 {
        Some(ViewerAction::ZoomIn)
    } else {
        Some(ViewerAction::ZoomOut)
    }
}

/// Zoom, pan and position of the image shown in the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    current_index: usize,
    zoom: f32,
    pan: Vec2,
    drag_anchor: Option<Pos2>,
}

impl ViewerState {
    pub fn open(index: usize) -> Self {
        Self {
            current_index: index,
            zoom: 1.0,
            pan: Vec2::ZERO,
            drag_anchor: None,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    pub fn can_zoom_in(&self) -> bool {
        self.zoom < MAX_ZOOM
    }

    pub fn can_zoom_out(&self) -> bool {
        self.zoom > MIN_ZOOM
    }

    /// Advances with wraparound. Does nothing for an empty sequence.
    pub fn next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.show((self.current_index + 1) % len);
    }

    pub fn prev(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let index = if self.current_index == 0 || self.current_index >= len {
            len - 1
        } else {
            self.current_index - 1
        };
        self.show(index);
    }

    fn show(&mut self, index: usize) {
        self.current_index = index;
        self.drag_anchor = None;
        self.set_zoom(1.0);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    pub fn toggle_zoom(&mut self) {
        if self.zoom > 1.0 {
            self.set_zoom(1.0);
        } else {
            self.set_zoom(TOGGLE_ZOOM);
        }
    }

    /// The only writer of `zoom`: clamps, and recentres once panning is meaningless.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if self.zoom <= 1.0 {
            self.pan = Vec2::ZERO;
            self.drag_anchor = None;
        }
    }

    /// Starts a pan drag. Ignored unless zoomed in.
    pub fn begin_drag(&mut self, pointer: Pos2) {
        if self.zoom > 1.0 {
            self.drag_anchor = Some(pointer - self.pan);
        }
    }

    pub fn drag_to(&mut self, pointer: Pos2) {
        if self.zoom <= 1.0 {
            return;
        }
        if let Some(anchor) = self.drag_anchor {
            self.pan = pointer - anchor;
        }
    }

    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    pub fn apply(&mut self, action: ViewerAction, len: usize) {
        match action {
            ViewerAction::Next => self.next(len),
            ViewerAction::Prev => self.prev(len),
            ViewerAction::ZoomIn => self.zoom_in(),
            ViewerAction::ZoomOut => self.zoom_out(),
            ViewerAction::ToggleZoom => self.toggle_zoom(),
            ViewerAction::Close => {}
        }
    }
}

/// Touch swipe detection between a touch start and its end.
#[derive(Debug, Default)]
pub struct SwipeTracker {
    start: Option<Pos2>,
}

impl SwipeTracker {
    pub fn start(&mut self, pos: Pos2) {
        self.start = Some(pos);
    }

    pub fn cancel(&mut self) {
        self.start = None;
    }

    /// A mostly horizontal swipe past the threshold: rightward goes back,
    /// leftward goes forward.
    pub fn finish(&mut self, pos: Pos2) -> Option<ViewerAction> {
        let start = self.start.take()?;
        swipe_action(pos - start)
    }
}

pub fn swipe_action(delta: Vec2) -> Option<ViewerAction> {
    if delta.x.abs() > SWIPE_THRESHOLD && delta.x.abs() > delta.y.abs() {
        if delta.x > 0.0 {
            Some(ViewerAction::Prev)
        } else {
            Some(ViewerAction::Next)
        }
    } else {
        None
    }
}

/// Counts outstanding locks on background scrolling.
#[derive(Debug, Clone, Default)]
pub struct ScrollLocks {
    held: Rc<Cell<usize>>,
}

impl ScrollLocks {
    pub fn acquire(&self) -> ScrollLock {
        self.held.set(self.held.get() + 1);
        ScrollLock {
            held: Rc::clone(&self.held),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.held.get() > 0
    }
}

/// Keeps background scrolling disabled until dropped.
#[derive(Debug)]
pub struct ScrollLock {
    held: Rc<Cell<usize>>,
}

impl Drop for ScrollLock {
    fn drop(&mut self) {
        self.held.set(self.held.get().saturating_sub(1));
    }
}

/// A viewer that is on screen: its state plus the scroll lock it holds.
#[derive(Debug)]
pub struct OpenViewer {
    pub state: ViewerState,
    pub swipe: SwipeTracker,
    _lock: ScrollLock,
}

impl OpenViewer {
    pub fn open(index: usize, locks: &ScrollLocks) -> Self {
        Self {
            state: ViewerState::open(index),
            swipe: SwipeTracker::default(),
            _lock: locks.acquire(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_wraps_from_last_to_first() {
        let mut s = ViewerState::open(4);
        s.next(5);
        assert_eq!(s.current_index(), 0);
    }

    #[test]
    fn prev_walks_back_then_wraps() {
        let mut s = ViewerState::open(2);
        s.prev(5);
        s.prev(5);
        assert_eq!(s.current_index(), 0);
        s.prev(5);
        assert_eq!(s.current_index(), 4);
    }

    #[test]
    fn navigation_on_empty_sequence_is_a_no_op() {
        let mut s = ViewerState::open(0);
        s.next(0);
        s.prev(0);
        assert_eq!(s.current_index(), 0);
    }

    #[test]
    fn navigation_resets_zoom_and_pan() {
        let mut s = ViewerState::open(1);
        s.set_zoom(2.0);
        s.begin_drag(Pos2::new(10.0, 10.0));
        s.drag_to(Pos2::new(40.0, 30.0));
        assert_eq!(s.pan(), Vec2::new(30.0, 20.0));

        s.next(3);
        assert_eq!(s.zoom(), 1.0);
        assert_eq!(s.pan(), Vec2::ZERO);
        assert!(!s.is_dragging());
    }

    #[test]
    fn three_zoom_ins_reach_one_seventy_five() {
        let mut s = ViewerState::open(0);
        for _ in 0..3 {
            s.zoom_in();
        }
        assert_eq!(s.zoom(), 1.75);
    }

    #[test]
    fn zoom_out_clamps_at_half() {
        let mut s = ViewerState::open(0);
        s.set_zoom(1.75);
        for _ in 0..5 {
            s.zoom_out();
        }
        assert_eq!(s.zoom(), MIN_ZOOM);
    }

    #[test]
    fn zoom_never_leaves_bounds() {
        let mut s = ViewerState::open(0);
        for i in 0..40 {
            if i % 3 == 0 {
                s.zoom_out();
            } else {
                s.zoom_in();
            }
            assert!((MIN_ZOOM..=MAX_ZOOM).contains(&s.zoom()));
        }
        for _ in 0..20 {
            s.zoom_in();
        }
        assert_eq!(s.zoom(), MAX_ZOOM);
        assert!(!s.can_zoom_in());
    }

    #[test]
    fn dropping_to_unit_zoom_recentres() {
        let mut s = ViewerState::open(0);
        s.set_zoom(1.25);
        s.begin_drag(Pos2::new(0.0, 0.0));
        s.drag_to(Pos2::new(15.0, -5.0));
        assert_ne!(s.pan(), Vec2::ZERO);
        s.zoom_out();
        assert_eq!(s.zoom(), 1.0);
        assert_eq!(s.pan(), Vec2::ZERO);
    }

    #[test]
    fn drag_is_ignored_when_not_zoomed() {
        let mut s = ViewerState::open(0);
        s.begin_drag(Pos2::new(5.0, 5.0));
        assert!(!s.is_dragging());
        s.drag_to(Pos2::new(50.0, 50.0));
        assert_eq!(s.pan(), Vec2::ZERO);
    }

    #[test]
    fn drag_continues_from_existing_pan() {
        let mut s = ViewerState::open(0);
        s.set_zoom(2.0);
        s.begin_drag(Pos2::new(0.0, 0.0));
        s.drag_to(Pos2::new(10.0, 0.0));
        s.end_drag();

        s.begin_drag(Pos2::new(100.0, 100.0));
        s.drag_to(Pos2::new(105.0, 100.0));
        assert_eq!(s.pan(), Vec2::new(15.0, 0.0));
    }

    #[test]
    fn toggle_zoom_switches_between_unit_and_double() {
        let mut s = ViewerState::open(0);
        s.toggle_zoom();
        assert_eq!(s.zoom(), TOGGLE_ZOOM);
        s.toggle_zoom();
        assert_eq!(s.zoom(), 1.0);
        s.set_zoom(0.5);
        s.toggle_zoom();
        assert_eq!(s.zoom(), TOGGLE_ZOOM);
    }

    #[test]
    fn horizontal_swipe_left_goes_next() {
        let mut t = SwipeTracker::default();
        t.start(Pos2::new(200.0, 100.0));
        assert_eq!(
            t.finish(Pos2::new(120.0, 110.0)),
            Some(ViewerAction::Next)
        );
    }

    #[test]
    fn mostly_vertical_swipe_does_nothing() {
        let mut t = SwipeTracker::default();
        t.start(Pos2::new(200.0, 100.0));
        assert_eq!(t.finish(Pos2::new(120.0, 190.0)), None);
    }

    #[test]
    fn short_or_rightward_swipes() {
        assert_eq!(swipe_action(Vec2::new(40.0, 0.0)), None);
        assert_eq!(swipe_action(Vec2::new(80.0, 5.0)), Some(ViewerAction::Prev));
    }

    #[test]
    fn finish_without_start_is_ignored() {
        let mut t = SwipeTracker::default();
        assert_eq!(t.finish(Pos2::new(0.0, 0.0)), None);
    }

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(action_for_key(Key::Escape), Some(ViewerAction::Close));
        assert_eq!(action_for_key(Key::ArrowRight), Some(ViewerAction::Next));
        assert_eq!(action_for_key(Key::ArrowLeft), Some(ViewerAction::Prev));
        assert_eq!(action_for_key(Key::Plus), Some(ViewerAction::ZoomIn));
        assert_eq!(action_for_key(Key::Equals), Some(ViewerAction::ZoomIn));
        assert_eq!(action_for_key(Key::Minus), Some(ViewerAction::ZoomOut));
        assert_eq!(action_for_key(Key::A), None);
    }

    #[test]
    fn wheel_direction_maps_to_zoom() {
        assert_eq!(action_for_wheel(12.0), Some(ViewerAction::ZoomIn));
        assert_eq!(action_for_wheel(-3.0), Some(ViewerAction::ZoomOut));
        assert_eq!(action_for_wheel(0.0), None);
    }

    #[test]
    fn scroll_lock_is_released_when_viewer_drops() {
        let locks = ScrollLocks::default();
        let viewer = OpenViewer::open(0, &locks);
        assert!(locks.is_locked());
        drop(viewer);
        assert!(!locks.is_locked());
    }

    #[test]
    fn nested_locks_release_independently() {
        let locks = ScrollLocks::default();
        let a = locks.acquire();
        let b = locks.acquire();
        drop(a);
        assert!(locks.is_locked());
        drop(b);
        assert!(!locks.is_locked());
    }
}
