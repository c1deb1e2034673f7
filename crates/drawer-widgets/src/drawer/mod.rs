#![forbid(unsafe_code)]

//! The drawer state machine.
//!
//! A [`Drawer`] owns the canonical open/snap state of one drawer instance and
//! drives it from pointer, keyboard and programmatic input.
//!
//! ```text
//!              sync_open(true)
//!   Closed ───────────────────────▶ Open(snap)
//!     ▲   ◀─────────────────────── │   ▲
//!     │   Escape / overlay /        │   │ release
//!     │   close button / sync       │   │ (resolver) or cancel (revert)
//!     │                  pointer ▼  │   │
//!     └───────────────────── Dragging(from)
//!            release resolves to closed
//! ```
//!
//! Dragging never starts from `Closed`: a drawer must first be opened
//! programmatically, after which the handle (or the content when there is no
//! handle) is draggable.
//!
//! # Invariants
//!
//! 1. Closed implies no active snap point, a zero drag offset and no gesture.
//! 2. When open with snap points configured, the active snap point is one of
//!    them. Without snap points it is `None`.
//! 3. Every committed change of open state or snap point writes persistence
//!    (if enabled), updates the published observables, and fires the matching
//!    callback exactly once, in that order, with the new value.
//! 4. A cancelled gesture (pointer cancel, blur, Escape) returns to the state
//!    held before it began and fires nothing.
//! 5. Only the topmost open drawer reacts to Escape, overlay clicks and Tab.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Invalid snap points / active snap point / missing persist key | `mount` returns [`ConfigError`] |
//! | Storage failure | Logged, in-memory state unaffected |
//! | Persisted snap point no longer configured | Logged, default snap point used |
//! | Content has zero extent | Drag ignored |
//! | Second pointer during a drag | Ignored |

pub mod config;
mod focus;
mod portal;
mod stack;

use std::rc::Rc;

use drawer_core::{
    Direction, ElementId, Event, KeyEvent, KeyEventKind, ListenerId, Point, PointerEvent,
    PointerEventKind, PointerId, SharedEnvironment,
};
use drawer_runtime::{
    DrawerPersistence, Observable, PersistKey, PersistedRecord, SettleAnimation, SharedStorage,
};
use web_time::Instant;

use crate::gesture::{GestureTracker, OffsetBounds};
use crate::snap::{SnapResolver, SnapTarget};

pub use config::{ConfigError, DrawerConfig, DrawerTuning, PortalContainer, SnapPoints};
use config::{OpenChangeCallback, SnapChangeCallback};
pub use focus::FocusContainment;
pub use portal::resolve_portal_target;
pub use stack::{BASE_DRAWER_Z, DrawerId, DrawerStack};

/// Why a drawer closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    Escape,
    /// Pointer-down on the overlay.
    Overlay,
    /// The header's close button.
    CloseButton,
    /// A drag released toward closed.
    Gesture,
    /// `sync_open(false)` or another caller-initiated close.
    Programmatic,
}

/// Externally visible state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawerPhase {
    Closed,
    Open { snap_point: Option<f32> },
    /// Being dragged from `Open { snap_point }`.
    Dragging { snap_point: Option<f32> },
}

impl DrawerPhase {
    pub fn is_open(self) -> bool {
        !matches!(self, Self::Closed)
    }

    pub fn snap_point(self) -> Option<f32> {
        match self {
            Self::Closed => None,
            Self::Open { snap_point } | Self::Dragging { snap_point } => snap_point,
        }
    }
}

/// Elements that make up a drawer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawerSurface {
    /// Root of the drawer content; focus is contained here.
    pub content: ElementId,
    /// Drag handle. Without one the whole content is draggable.
    pub handle: Option<ElementId>,
    /// Backdrop; a pointer-down on it closes the topmost drawer.
    pub overlay: Option<ElementId>,
    /// Header close button; pointer-downs on it never start a drag.
    pub close_button: Option<ElementId>,
}

impl DrawerSurface {
    pub fn new(content: ElementId) -> Self {
        Self {
            content,
            handle: None,
            overlay: None,
            close_button: None,
        }
    }

    #[must_use]
    pub fn with_handle(mut self, handle: ElementId) -> Self {
        self.handle = Some(handle);
        self
    }

    #[must_use]
    pub fn with_overlay(mut self, overlay: ElementId) -> Self {
        self.overlay = Some(overlay);
        self
    }

    #[must_use]
    pub fn with_close_button(mut self, button: ElementId) -> Self {
        self.close_button = Some(button);
        self
    }

    /// Element that starts drags.
    pub fn drag_surface(&self) -> ElementId {
        self.handle.unwrap_or(self.content)
    }
}

/// Document-level services shared by the drawers of one document.
#[derive(Clone)]
pub struct DrawerHost {
    pub env: SharedEnvironment,
    pub stack: DrawerStack,
    pub storage: Option<SharedStorage>,
}

impl DrawerHost {
    /// Host using the thread's global drawer stack and no storage.
    pub fn new(env: SharedEnvironment) -> Self {
        Self {
            env,
            stack: DrawerStack::global(),
            storage: None,
        }
    }

    #[must_use]
    pub fn with_stack(mut self, stack: DrawerStack) -> Self {
        self.stack = stack;
        self
    }

    #[must_use]
    pub fn with_storage(mut self, storage: SharedStorage) -> Self {
        self.storage = Some(storage);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Committed {
    open: bool,
    snap_point: Option<f32>,
}

impl Committed {
    const CLOSED: Self = Self {
        open: false,
        snap_point: None,
    };

    fn open(snap_point: Option<f32>) -> Self {
        Self {
            open: true,
            snap_point,
        }
    }

    fn fraction(self) -> f32 {
        match (self.open, self.snap_point) {
            (false, _) => 0.0,
            (true, Some(f)) => f,
            (true, None) => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    /// Visible fraction when the drag began.
    origin: f32,
    extent: f32,
    capture: ElementId,
}

/// One mounted drawer.
pub struct Drawer {
    id: DrawerId,
    direction: Direction,
    close_on_escape: bool,
    snap_points: SnapPoints,
    portal: bool,
    portal_container: Option<PortalContainer>,
    resolver: SnapResolver,
    surface: DrawerSurface,
    env: SharedEnvironment,
    committed: Committed,
    drag: Option<DragState>,
    gesture: GestureTracker,
    settle: SettleAnimation,
    focus: FocusContainment,
    persistence: Option<DrawerPersistence>,
    persist_enabled: bool,
    open_state: Observable<bool>,
    snap_state: Observable<Option<f32>>,
    listener: ListenerId,
    listening: bool,
    last_close_reason: Option<CloseReason>,
    on_open_change: Option<OpenChangeCallback>,
    on_snap_point_change: Option<SnapChangeCallback>,
}

impl std::fmt::Debug for Drawer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Drawer")
            .field("id", &self.id)
            .field("direction", &self.direction)
            .field("phase", &self.phase())
            .field("snap_points", &self.snap_points)
            .field("surface", &self.surface)
            .finish_non_exhaustive()
    }
}

impl Drawer {
    /// Validate `config` and mount a drawer over `surface`.
    ///
    /// Initial state: controlled `open`/`active_snap_point` first, then the
    /// persisted record (when persistence is enabled), then `default_open`
    /// with the first snap point.
    pub fn mount(
        config: DrawerConfig,
        surface: DrawerSurface,
        host: DrawerHost,
    ) -> Result<Self, ConfigError> {
        let snap_points = config.validate()?;
        let DrawerConfig {
            open,
            default_open,
            direction,
            close_on_escape,
            active_snap_point,
            portal,
            portal_container,
            persist_state,
            persist_key,
            persist_snap_point,
            trap_focus,
            tuning,
            on_open_change,
            on_snap_point_change,
            ..
        } = config;

        let id = DrawerId::next();
        let persistence = match (persist_key, &host.storage) {
            (Some(key), Some(storage)) if !key.trim().is_empty() => Some(DrawerPersistence::new(
                Rc::clone(storage),
                PersistKey::new(key),
                persist_snap_point,
            )),
            _ => None,
        };
        if persist_state && persistence.is_none() {
            tracing::warn!(
                drawer = id.id(),
                "State persistence requested without a storage backend"
            );
        }
        let record = if persist_state {
            persistence.as_ref().and_then(DrawerPersistence::load)
        } else {
            None
        };

        let is_open = open
            .or(record.map(|r| r.open))
            .unwrap_or(default_open);
        let committed = if !is_open {
            Committed::CLOSED
        } else if snap_points.is_empty() {
            Committed::open(None)
        } else {
            let controlled = active_snap_point.and_then(|p| snap_points.find(p));
            let persisted = if active_snap_point.is_none() {
                persisted_snap_point(record, &snap_points)
            } else {
                None
            };
            Committed::open(controlled.or(persisted).or(snap_points.first()))
        };
        tracing::debug!(
            drawer = id.id(),
            %direction,
            open = committed.open,
            snap_point = ?committed.snap_point,
            restored = record.is_some(),
            "drawer mounted"
        );

        let focus = FocusContainment::new(id, Rc::clone(&host.env), host.stack, trap_focus);
        let mut drawer = Self {
            id,
            direction,
            close_on_escape,
            resolver: tuning.resolver(),
            gesture: GestureTracker::new(direction, tuning.velocity_tracker()),
            settle: SettleAnimation::new(tuning.settle_spec(), committed.fraction()),
            snap_points,
            portal,
            portal_container,
            surface,
            env: host.env,
            committed,
            drag: None,
            focus,
            persistence,
            persist_enabled: persist_state,
            open_state: Observable::new(committed.open),
            snap_state: Observable::new(committed.snap_point),
            listener: ListenerId(id.id()),
            listening: false,
            last_close_reason: None,
            on_open_change,
            on_snap_point_change,
        };
        if committed.open {
            drawer.enter_open();
        }
        Ok(drawer)
    }

    // --- Input ---

    /// Handle an input event. Returns `true` if the drawer consumed it.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        match event {
            Event::Pointer(pointer) => self.handle_pointer(pointer),
            Event::Key(key) => self.handle_key(key),
            Event::Blur => self.cancel_drag(),
        }
    }

    fn handle_pointer(&mut self, event: &PointerEvent) -> bool {
        match event.kind {
            PointerEventKind::Down => self.pointer_down(event),
            PointerEventKind::Move => self
                .gesture
                .update(event.id, event.position, event.timestamp)
                .is_some(),
            PointerEventKind::Up => self.pointer_up(event),
            PointerEventKind::Cancel => {
                self.gesture.pointer() == Some(event.id) && self.cancel_drag()
            }
        }
    }

    fn pointer_down(&mut self, event: &PointerEvent) -> bool {
        if let Some(active) = self.gesture.pointer() {
            if active != event.id {
                tracing::trace!(
                    drawer = self.id.id(),
                    pointer = event.id.0,
                    "ignoring pointer during active drag"
                );
            }
            return false;
        }
        if !self.committed.open {
            return false;
        }
        let Some(target) = event.target else {
            return false;
        };

        let drag_surface = self.surface.drag_surface();
        let (on_overlay, on_close_button, on_drag_surface, extent) = {
            let env = self.env.borrow();
            let within = |element: Option<ElementId>| {
                element.is_some_and(|element| env.contains(element, target))
            };
            (
                within(self.surface.overlay),
                within(self.surface.close_button),
                env.contains(drag_surface, target),
                env.extent(self.surface.content, self.direction.axis()),
            )
        };

        if on_overlay {
            return self.focus.is_topmost() && self.request_close(CloseReason::Overlay);
        }
        if on_close_button || !on_drag_surface {
            return false;
        }
        if !(extent.is_finite() && extent > 0.0) {
            tracing::debug!(drawer = self.id.id(), extent, "drawer has no extent, drag ignored");
            return false;
        }

        let origin = self.settle.value_at(self.now());
        let bounds = OffsetBounds::for_resting(origin, extent);
        if !self
            .gesture
            .begin(event.id, event.position, event.timestamp, bounds)
        {
            return false;
        }
        self.settle.snap_to(origin);
        self.env
            .borrow_mut()
            .set_pointer_capture(drag_surface, event.id);
        self.drag = Some(DragState {
            origin,
            extent,
            capture: drag_surface,
        });
        tracing::debug!(
            drawer = self.id.id(),
            pointer = event.id.0,
            origin,
            extent,
            "drag started"
        );
        true
    }

    fn pointer_up(&mut self, event: &PointerEvent) -> bool {
        let Some(outcome) = self.gesture.end(event.id, event.timestamp) else {
            return false;
        };
        let Some(drag) = self.drag.take() else {
            return false;
        };
        self.release_capture(drag.capture, event.id);

        let release = (drag.origin - outcome.final_offset / drag.extent).clamp(0.0, 1.0);
        // Resolver velocity: extents per second, positive while opening.
        let velocity = -outcome.velocity / drag.extent;
        let target = self.resolver.resolve(
            release,
            velocity,
            self.snap_points.as_slice(),
            self.committed.fraction(),
        );
        tracing::debug!(
            drawer = self.id.id(),
            release,
            velocity,
            ?target,
            "drag released"
        );

        self.settle.snap_to(release);
        let next = match target {
            SnapTarget::Closed => Committed::CLOSED,
            SnapTarget::Open(fraction) if self.snap_points.is_empty() => {
                debug_assert_eq!(fraction, 1.0);
                Committed::open(None)
            }
            SnapTarget::Open(fraction) => Committed::open(Some(fraction)),
        };
        self.commit(next, CloseReason::Gesture);
        true
    }

    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        if key.is_escape() {
            if self.drag.is_some() {
                return self.cancel_drag();
            }
            return self.close_on_escape
                && self.focus.is_topmost()
                && self.request_close(CloseReason::Escape);
        }
        if let Some(backwards) = key.tab_direction()
            && self.committed.open
        {
            return self.focus.handle_tab(backwards);
        }
        false
    }

    /// Abandon the active gesture and return to the pre-drag state.
    ///
    /// Returns `false` if no gesture was active.
    pub fn cancel_drag(&mut self) -> bool {
        let now = self.now();
        let visible = self.visible_fraction_at(now);
        let Some(pointer) = self.gesture.cancel() else {
            return false;
        };
        if let Some(drag) = self.drag.take() {
            self.release_capture(drag.capture, pointer);
        }
        self.settle.snap_to(visible);
        self.settle.animate_to(self.committed.fraction(), now);
        tracing::debug!(
            drawer = self.id.id(),
            pointer = pointer.0,
            "drag cancelled, reverting"
        );
        true
    }

    // --- Programmatic control ---

    /// Apply an external open state (controlled prop change or programmatic
    /// toggle). Opening rests at the first snap point.
    pub fn sync_open(&mut self, open: bool) {
        self.cancel_drag();
        if open == self.committed.open {
            return;
        }
        let next = if open {
            Committed::open(self.snap_points.first())
        } else {
            Committed::CLOSED
        };
        self.commit(next, CloseReason::Programmatic);
    }

    /// Apply an external active snap point.
    ///
    /// A value that is not a configured snap point is a [`ConfigError`]. While
    /// closed, or for `None`, the call changes nothing: a closed drawer has no
    /// snap point and an open one with snap points always rests at one.
    pub fn sync_active_snap_point(&mut self, point: Option<f32>) -> Result<(), ConfigError> {
        let Some(value) = point else {
            return Ok(());
        };
        let Some(snap_point) = self.snap_points.find(value) else {
            return Err(ConfigError::ActiveSnapPointNotInSnapPoints { value });
        };
        if !self.committed.open {
            tracing::debug!(
                drawer = self.id.id(),
                snap_point,
                "snap point change ignored while closed"
            );
            return Ok(());
        }
        self.cancel_drag();
        self.commit(Committed::open(Some(snap_point)), CloseReason::Programmatic);
        Ok(())
    }

    /// Close for `reason`. Returns `false` if already closed.
    pub fn request_close(&mut self, reason: CloseReason) -> bool {
        if !self.committed.open {
            return false;
        }
        self.cancel_drag();
        self.commit(Committed::CLOSED, reason);
        true
    }

    // --- Commit ---

    fn commit(&mut self, next: Committed, reason: CloseReason) {
        let previous = self.committed;
        let now = self.now();
        self.settle.animate_to(next.fraction(), now);
        if previous == next {
            return;
        }
        self.committed = next;
        let open_changed = previous.open != next.open;
        let snap_changed = previous.snap_point != next.snap_point;
        tracing::debug!(
            drawer = self.id.id(),
            from_open = previous.open,
            to_open = next.open,
            from_snap = ?previous.snap_point,
            to_snap = ?next.snap_point,
            ?reason,
            "drawer state committed"
        );

        if open_changed {
            if next.open {
                self.last_close_reason = None;
                self.enter_open();
            } else {
                self.last_close_reason = Some(reason);
                self.leave_open();
            }
        }

        if self.persist_enabled
            && let Some(persistence) = &self.persistence
        {
            persistence.save(next.open, next.snap_point);
        }

        self.open_state.set(next.open);
        self.snap_state.set(next.snap_point);

        if open_changed && let Some(callback) = self.on_open_change.as_mut() {
            callback(next.open);
        }
        if snap_changed && let Some(callback) = self.on_snap_point_change.as_mut() {
            callback(next.snap_point);
        }
    }

    fn enter_open(&mut self) {
        self.focus.activate(self.surface.content);
        if !self.listening {
            self.env.borrow_mut().add_keydown_listener(self.listener);
            self.listening = true;
        }
    }

    fn leave_open(&mut self) {
        self.focus.deactivate();
        if self.listening {
            self.env.borrow_mut().remove_keydown_listener(self.listener);
            self.listening = false;
        }
    }

    fn release_capture(&self, element: ElementId, pointer: PointerId) {
        if let Ok(mut env) = self.env.try_borrow_mut() {
            env.release_pointer_capture(element, pointer);
        }
    }

    fn now(&self) -> Instant {
        self.env.borrow().now()
    }

    // --- Rendering ---

    /// Advance the settle animation to `now` and return the visible fraction.
    pub fn tick(&mut self, now: Instant) -> f32 {
        if self.drag.is_none() {
            self.settle.settle(now);
        }
        self.visible_fraction_at(now)
    }

    /// Visible fraction of the drawer at the environment's current time.
    pub fn visible_fraction(&self) -> f32 {
        self.visible_fraction_at(self.now())
    }

    /// Visible fraction at `now`. During a drag it follows the pointer.
    pub fn visible_fraction_at(&self, now: Instant) -> f32 {
        match self.drag {
            Some(drag) => (drag.origin - self.gesture.offset() / drag.extent).clamp(0.0, 1.0),
            None => self.settle.value_at(now).clamp(0.0, 1.0),
        }
    }

    /// Whether a settle transition is still running at `now`.
    pub fn is_animating(&self, now: Instant) -> bool {
        self.drag.is_none() && self.settle.is_running(now)
    }

    /// Translation, in pixels, to apply to the content: zero when fully open,
    /// the full extent toward the attached edge when closed.
    pub fn transform(&self) -> Point {
        let (extent, now) = {
            let env = self.env.borrow();
            (
                env.extent(self.surface.content, self.direction.axis()),
                env.now(),
            )
        };
        let hidden = 1.0 - self.visible_fraction_at(now);
        self.direction.translation(hidden * extent)
    }

    /// Backdrop opacity: opaque at any resting open position, fading out as
    /// the drawer moves below its lowest resting fraction.
    pub fn overlay_opacity(&self) -> f32 {
        let reference = self.snap_points.first().unwrap_or(1.0);
        (self.visible_fraction() / reference).clamp(0.0, 1.0)
    }

    /// Container the content should be mounted in; `None` renders in place.
    pub fn portal_target(&self) -> Option<ElementId> {
        resolve_portal_target(
            self.portal,
            self.portal_container.as_ref(),
            &*self.env.borrow(),
        )
    }

    /// Z-index for the compositor while open.
    pub fn z_index(&self) -> Option<u32> {
        self.focus.stack().z_index(self.id)
    }

    // --- State queries ---

    pub fn id(&self) -> DrawerId {
        self.id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn surface(&self) -> &DrawerSurface {
        &self.surface
    }

    pub fn snap_points(&self) -> &SnapPoints {
        &self.snap_points
    }

    pub fn phase(&self) -> DrawerPhase {
        match (self.drag, self.committed.open) {
            (Some(_), _) => DrawerPhase::Dragging {
                snap_point: self.committed.snap_point,
            },
            (None, true) => DrawerPhase::Open {
                snap_point: self.committed.snap_point,
            },
            (None, false) => DrawerPhase::Closed,
        }
    }

    /// Committed open state. A drag does not change it until release.
    pub fn is_open(&self) -> bool {
        self.committed.open
    }

    pub fn active_snap_point(&self) -> Option<f32> {
        self.committed.snap_point
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Current drag offset in pixels, positive toward closed; `0.0` when no
    /// gesture is active.
    pub fn drag_offset(&self) -> f32 {
        self.gesture.offset()
    }

    /// Whether this drawer owns Escape, overlay clicks and Tab.
    pub fn is_topmost(&self) -> bool {
        self.focus.is_topmost()
    }

    pub fn last_close_reason(&self) -> Option<CloseReason> {
        self.last_close_reason
    }

    /// Observable mirror of the committed open state.
    pub fn open_state(&self) -> Observable<bool> {
        self.open_state.clone()
    }

    /// Observable mirror of the committed snap point.
    pub fn snap_state(&self) -> Observable<Option<f32>> {
        self.snap_state.clone()
    }

    /// Keydown listener registered with the environment while open.
    pub fn listener_id(&self) -> ListenerId {
        self.listener
    }
}

fn persisted_snap_point(record: Option<PersistedRecord>, snap_points: &SnapPoints) -> Option<f32> {
    let value = record?.snap_point?;
    let found = snap_points.find(value);
    if found.is_none() {
        tracing::warn!(
            snap_point = value,
            "Ignoring persisted snap point that is not configured"
        );
    }
    found
}

impl Drop for Drawer {
    fn drop(&mut self) {
        if let Some(pointer) = self.gesture.cancel()
            && let Some(drag) = self.drag.take()
        {
            self.release_capture(drag.capture, pointer);
        }
        self.focus.deactivate();
        if self.listening
            && let Ok(mut env) = self.env.try_borrow_mut()
        {
            env.remove_keydown_listener(self.listener);
        }
        if !self.persist_enabled
            && let Some(persistence) = &self.persistence
        {
            persistence.clear();
        }
    }
}
