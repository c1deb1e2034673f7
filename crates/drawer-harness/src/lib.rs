#![forbid(unsafe_code)]

//! Test harness for drawers.
//!
//! [`Harness`] bundles a [`FakeDocument`], an isolated [`DrawerStack`] and a
//! [`MemoryStorage`], and scripts input against mounted drawers: pointer
//! drags with a controllable clock, key presses dispatched top-down, and
//! frame stepping.
//!
//! ```ignore
//! let h = Harness::new();
//! let dom = h.build_drawer(&["a", "b", "c"]);
//! let mut drawer = h.mount(DrawerConfig::new().snap_points([0.25, 0.5, 0.9]), &dom)?;
//! drawer.sync_open(true);
//! h.drag(&mut drawer, dom.handle, 0.0, -68.0, 120, 6);
//! ```

pub mod document;

use std::cell::RefCell;
use std::rc::Rc;

use drawer_core::{
    ElementId, Environment, Event, KeyCode, KeyEvent, Modifiers, Point, PointerEvent,
    PointerEventKind, PointerId, SharedEnvironment,
};
use drawer_runtime::{MemoryStorage, SharedStorage};
use drawer_widgets::{ConfigError, Drawer, DrawerConfig, DrawerHost, DrawerStack, DrawerSurface};
use proptest::prelude::*;
use web_time::{Duration, Instant};

pub use document::FakeDocument;

/// Content size used by [`Harness::build_drawer`].
pub const CONTENT_WIDTH: f32 = 300.0;
pub const CONTENT_HEIGHT: f32 = 400.0;

/// Pointer used by scripted drags.
pub const PRIMARY_POINTER: PointerId = PointerId(1);

/// Elements of a drawer built by [`Harness::build_drawer`].
#[derive(Debug, Clone)]
pub struct DrawerElements {
    pub overlay: ElementId,
    pub content: ElementId,
    pub handle: ElementId,
    pub close_button: ElementId,
    /// Tabbable items inside the content, in tab order (the close button is
    /// not one of them).
    pub items: Vec<ElementId>,
}

impl DrawerElements {
    /// Surface with handle, overlay and close button.
    pub fn surface(&self) -> DrawerSurface {
        DrawerSurface::new(self.content)
            .with_handle(self.handle)
            .with_overlay(self.overlay)
            .with_close_button(self.close_button)
    }
}

/// Document, stack and storage shared by the drawers of one test.
pub struct Harness {
    pub doc: Rc<RefCell<FakeDocument>>,
    pub env: SharedEnvironment,
    pub stack: DrawerStack,
    pub storage: Rc<MemoryStorage>,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    pub fn new() -> Self {
        Self::with_storage(Rc::new(MemoryStorage::new()))
    }

    /// A harness over existing storage, to simulate a reload.
    pub fn with_storage(storage: Rc<MemoryStorage>) -> Self {
        let doc = Rc::new(RefCell::new(FakeDocument::new()));
        let env: SharedEnvironment = doc.clone();
        Self {
            doc,
            env,
            stack: DrawerStack::new(),
            storage,
        }
    }

    /// Host services for mounting a drawer in this harness.
    pub fn host(&self) -> DrawerHost {
        let storage: SharedStorage = self.storage.clone();
        DrawerHost::new(Rc::clone(&self.env))
            .with_stack(self.stack.clone())
            .with_storage(storage)
    }

    /// Mount a drawer over `elements`.
    pub fn mount(
        &self,
        config: DrawerConfig,
        elements: &DrawerElements,
    ) -> Result<Drawer, ConfigError> {
        Drawer::mount(config, elements.surface(), self.host())
    }

    pub fn body(&self) -> ElementId {
        self.doc.borrow().body()
    }

    /// Build overlay, content (with handle, close button and one tabbable
    /// item per name) under the body.
    pub fn build_drawer(&self, items: &[&str]) -> DrawerElements {
        let mut doc = self.doc.borrow_mut();
        let body = doc.body();
        let overlay = doc.create(body, "overlay");
        let content = doc.create(body, "content");
        doc.set_size(content, CONTENT_WIDTH, CONTENT_HEIGHT);
        let handle = doc.create(content, "handle");
        let header = doc.create(content, "header");
        let close_button = doc.create(header, "close");
        let items = items
            .iter()
            .map(|name| doc.create_focusable(content, name))
            .collect();
        DrawerElements {
            overlay,
            content,
            handle,
            close_button,
            items,
        }
    }

    /// A tabbable element outside every drawer.
    pub fn outside_button(&self, name: &str) -> ElementId {
        let mut doc = self.doc.borrow_mut();
        let body = doc.body();
        doc.create_focusable(body, name)
    }

    pub fn focus(&self, element: ElementId) -> bool {
        self.doc.borrow_mut().focus(element)
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.doc.borrow().focused()
    }

    pub fn now(&self) -> Instant {
        self.doc.borrow().now()
    }

    pub fn advance(&self, by: Duration) {
        self.doc.borrow_mut().advance(by);
    }

    /// A pointer event at the current time.
    pub fn pointer(
        &self,
        kind: PointerEventKind,
        pointer: PointerId,
        position: Point,
        target: ElementId,
    ) -> Event {
        Event::Pointer(PointerEvent::new(pointer, kind, position, self.now()).with_target(target))
    }

    /// Script a drag with [`PRIMARY_POINTER`]: press on `target`, move along
    /// the vertical axis from `from_y` to `to_y` in `steps` evenly timed moves
    /// over `duration_ms`, release at the last position.
    ///
    /// Returns whether the press started a drag.
    pub fn drag(
        &self,
        drawer: &mut Drawer,
        target: ElementId,
        from_y: f32,
        to_y: f32,
        duration_ms: u64,
        steps: u32,
    ) -> bool {
        let from = Point::new(0.0, from_y);
        let to = Point::new(0.0, to_y);
        self.drag_along(drawer, target, from, to, duration_ms, steps)
    }

    /// [`drag`](Self::drag) between arbitrary points.
    pub fn drag_along(
        &self,
        drawer: &mut Drawer,
        target: ElementId,
        from: Point,
        to: Point,
        duration_ms: u64,
        steps: u32,
    ) -> bool {
        let started = self.press_pointer(drawer, target, from);
        self.move_pointer(drawer, target, from, to, duration_ms, steps);
        let up = self.pointer(PointerEventKind::Up, PRIMARY_POINTER, to, target);
        drawer.handle_event(&up);
        started
    }

    /// Pointer-down without release.
    pub fn press_pointer(&self, drawer: &mut Drawer, target: ElementId, at: Point) -> bool {
        let down = self.pointer(PointerEventKind::Down, PRIMARY_POINTER, at, target);
        drawer.handle_event(&down)
    }

    /// Evenly timed moves from `from` to `to`, ending at `to`.
    pub fn move_pointer(
        &self,
        drawer: &mut Drawer,
        target: ElementId,
        from: Point,
        to: Point,
        duration_ms: u64,
        steps: u32,
    ) {
        let steps = steps.max(1);
        let step_time = Duration::from_millis(duration_ms / u64::from(steps));
        for i in 1..=steps {
            self.advance(step_time);
            let t = i as f32 / steps as f32;
            let position = Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t);
            let event = self.pointer(PointerEventKind::Move, PRIMARY_POINTER, position, target);
            drawer.handle_event(&event);
        }
    }

    /// Deliver `key` to `drawers` in order (topmost first), stopping at the
    /// first one that consumes it.
    pub fn press_key(&self, drawers: &mut [&mut Drawer], key: KeyEvent) -> bool {
        let event = Event::Key(key);
        drawers.iter_mut().any(|drawer| drawer.handle_event(&event))
    }

    pub fn escape(&self, drawers: &mut [&mut Drawer]) -> bool {
        self.press_key(drawers, KeyEvent::press(KeyCode::Escape))
    }

    pub fn tab(&self, drawers: &mut [&mut Drawer]) -> bool {
        self.press_key(drawers, KeyEvent::press(KeyCode::Tab))
    }

    pub fn shift_tab(&self, drawers: &mut [&mut Drawer]) -> bool {
        self.press_key(
            drawers,
            KeyEvent::press(KeyCode::Tab).with_modifiers(Modifiers::SHIFT),
        )
    }

    /// Step the clock frame by frame until `drawer` settles. Returns the
    /// settled visible fraction.
    pub fn settle(&self, drawer: &mut Drawer) -> f32 {
        const FRAME: Duration = Duration::from_millis(16);
        for _ in 0..240 {
            let now = self.now();
            drawer.tick(now);
            if !drawer.is_animating(now) {
                break;
            }
            self.advance(FRAME);
        }
        drawer.tick(self.now())
    }
}

/// A scripted drag: vertical travel in pixels (positive toward a bottom
/// drawer's closed edge), duration and move count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragScript {
    pub travel: f32,
    pub duration_ms: u64,
    pub steps: u32,
}

/// Random drags spanning slow drifts to fast flicks, overshooting the drawer
/// extent in both directions.
pub fn drag_scripts() -> impl Strategy<Value = DragScript> {
    (
        -2.0f32 * CONTENT_HEIGHT..2.0 * CONTENT_HEIGHT,
        10u64..600,
        1u32..12,
    )
        .prop_map(|(travel, duration_ms, steps)| DragScript {
            travel,
            duration_ms,
            steps,
        })
}
