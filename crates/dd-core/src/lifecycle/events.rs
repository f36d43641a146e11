//! Minimal single-threaded host event hub.
//!
//! Handlers receive a mutable context (the pipeline state) and the event.
//! Every [`HostEvents::subscribe`] returns a [`Subscription`] guard; dropping
//! the guard removes the handler, including from inside a running handler.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::camera::Camera;
use crate::render::DrawSurface;
use crate::text::{Cadence, LabelPainter, TextMeasure};

/// Event discriminant used to route handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Repaint,
    FrameTick,
    FixedTick,
    PlayModeEntered,
    PlayModeExiting,
    SceneOpening,
}

impl EventKind {
    pub fn tick(cadence: Cadence) -> Self {
        match cadence {
            Cadence::Frame => EventKind::FrameTick,
            Cadence::Fixed => EventKind::FixedTick,
        }
    }
}

/// Host GUI state passed with a text tick.
pub struct TickContext<'a> {
    /// Whether the host simulation is running
    pub simulating: bool,
    /// Host-level overlay visibility toggle
    pub overlays_visible: bool,
    pub measure: &'a dyn TextMeasure,
    pub painter: &'a mut dyn LabelPainter,
}

/// Events raised by the host viewport.
pub enum HostEvent<'a> {
    /// The viewport is being repainted with the given active camera
    Repaint {
        camera: Option<&'a Camera>,
        surface: &'a mut dyn DrawSurface,
    },
    /// GUI tick of one text cadence
    Tick {
        cadence: Cadence,
        context: TickContext<'a>,
    },
    PlayModeEntered,
    PlayModeExiting,
    SceneOpening,
}

impl HostEvent<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::Repaint { .. } => EventKind::Repaint,
            HostEvent::Tick { cadence, .. } => EventKind::tick(*cadence),
            HostEvent::PlayModeEntered => EventKind::PlayModeEntered,
            HostEvent::PlayModeExiting => EventKind::PlayModeExiting,
            HostEvent::SceneOpening => EventKind::SceneOpening,
        }
    }
}

type Handler<C> = Box<dyn FnMut(&mut C, &mut HostEvent<'_>)>;

struct Entry<C> {
    id: u64,
    kind: EventKind,
    handler: Handler<C>,
}

struct Registry<C> {
    next_id: u64,
    entries: Vec<Entry<C>>,
    /// Ids removed while their entries were checked out by `emit`
    removed: Vec<u64>,
    /// Entries checked out by running emits, innermost last
    in_flight: Vec<(u64, EventKind)>,
    emitting: usize,
}

impl<C> Registry<C> {
    fn unsubscribe(&mut self, id: u64) {
        self.entries.retain(|e| e.id != id);
        if self.emitting > 0 {
            self.removed.push(id);
        }
    }
}

/// Subscribe/emit hub for hosts without a native callback registry.
pub struct HostEvents<C> {
    inner: Rc<RefCell<Registry<C>>>,
}

impl<C> Clone for HostEvents<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<C: 'static> Default for HostEvents<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> HostEvents<C> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Registry {
                next_id: 0,
                entries: Vec::new(),
                removed: Vec::new(),
                in_flight: Vec::new(),
                emitting: 0,
            })),
        }
    }

    /// Registers `handler` for events of `kind`.
    #[must_use = "the handler is removed when the subscription is dropped"]
    pub fn subscribe(
        &self,
        kind: EventKind,
        handler: impl FnMut(&mut C, &mut HostEvent<'_>) + 'static,
    ) -> Subscription {
        let id = {
            let mut registry = self.inner.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push(Entry {
                id,
                kind,
                handler: Box::new(handler),
            });
            id
        };

        let registry: Weak<RefCell<Registry<C>>> = Rc::downgrade(&self.inner);
        Subscription {
            id,
            unsubscribe: Some(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    registry.borrow_mut().unsubscribe(id);
                }
            })),
        }
    }

    /// Number of handlers registered for `kind`, including handlers of a
    /// running emit.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        let registry = self.inner.borrow();
        let idle = registry.entries.iter().filter(|e| e.kind == kind).count();
        let running = registry
            .in_flight
            .iter()
            .filter(|(id, k)| *k == kind && !registry.removed.contains(id))
            .count();
        idle + running
    }

    /// Dispatches `event` to every matching handler, returning how many ran.
    ///
    /// Handlers may subscribe or drop subscriptions while running. New
    /// handlers take effect from the next emit.
    pub fn emit(&self, context: &mut C, event: &mut HostEvent<'_>) -> usize {
        let kind = event.kind();
        let (mut entries, base) = {
            let mut registry = self.inner.borrow_mut();
            registry.emitting += 1;
            let entries = std::mem::take(&mut registry.entries);
            let base = registry.in_flight.len();
            registry
                .in_flight
                .extend(entries.iter().map(|e| (e.id, e.kind)));
            (entries, base)
        };

        let mut called = 0;
        for entry in entries.iter_mut().filter(|e| e.kind == kind) {
            if self.inner.borrow().removed.contains(&entry.id) {
                continue;
            }
            (entry.handler)(context, event);
            called += 1;
        }

        let mut registry = self.inner.borrow_mut();
        registry.emitting -= 1;
        registry.in_flight.truncate(base);
        let removed = if registry.emitting == 0 {
            std::mem::take(&mut registry.removed)
        } else {
            registry.removed.clone()
        };
        entries.retain(|e| !removed.contains(&e.id));
        let added = std::mem::take(&mut registry.entries);
        entries.extend(added);
        registry.entries = entries;
        called
    }
}

/// Guard that removes its handler when dropped.
pub struct Subscription {
    id: u64,
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_routes_by_kind() {
        let hub: HostEvents<Vec<EventKind>> = HostEvents::new();
        let _a = hub.subscribe(EventKind::SceneOpening, |log, ev| log.push(ev.kind()));
        let _b = hub.subscribe(EventKind::PlayModeEntered, |log, ev| log.push(ev.kind()));

        let mut log = Vec::new();
        assert_eq!(hub.emit(&mut log, &mut HostEvent::SceneOpening), 1);
        assert_eq!(log, vec![EventKind::SceneOpening]);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let hub: HostEvents<usize> = HostEvents::new();
        let sub = hub.subscribe(EventKind::SceneOpening, |n, _| *n += 1);
        assert_eq!(hub.handler_count(EventKind::SceneOpening), 1);
        drop(sub);
        assert_eq!(hub.handler_count(EventKind::SceneOpening), 0);

        let mut n = 0;
        assert_eq!(hub.emit(&mut n, &mut HostEvent::SceneOpening), 0);
        assert_eq!(n, 0);
    }

    #[test]
    fn test_handler_can_drop_its_own_subscription() {
        struct Ctx {
            hits: usize,
            guard: Option<Subscription>,
        }

        let hub: HostEvents<Ctx> = HostEvents::new();
        let guard = hub.subscribe(EventKind::SceneOpening, |ctx: &mut Ctx, _| {
            ctx.hits += 1;
            ctx.guard = None;
        });
        let mut ctx = Ctx {
            hits: 0,
            guard: Some(guard),
        };

        hub.emit(&mut ctx, &mut HostEvent::SceneOpening);
        hub.emit(&mut ctx, &mut HostEvent::SceneOpening);
        assert_eq!(ctx.hits, 1);
        assert_eq!(hub.handler_count(EventKind::SceneOpening), 0);
    }

    #[test]
    fn test_subscribe_during_emit_applies_next_time() {
        struct Ctx {
            hub: HostEvents<Ctx>,
            guards: Vec<Subscription>,
            hits: usize,
        }

        let hub: HostEvents<Ctx> = HostEvents::new();
        let _root = hub.subscribe(EventKind::PlayModeEntered, |ctx: &mut Ctx, _| {
            let guard = ctx
                .hub
                .subscribe(EventKind::PlayModeEntered, |ctx: &mut Ctx, _| ctx.hits += 1);
            ctx.guards.push(guard);
        });
        let mut ctx = Ctx {
            hub: hub.clone(),
            guards: Vec::new(),
            hits: 0,
        };

        hub.emit(&mut ctx, &mut HostEvent::PlayModeEntered);
        assert_eq!(ctx.hits, 0);
        hub.emit(&mut ctx, &mut HostEvent::PlayModeEntered);
        assert_eq!(ctx.hits, 1);
        assert_eq!(hub.handler_count(EventKind::PlayModeEntered), 3);
    }

    #[test]
    fn test_handler_count_includes_running_handlers() {
        let hub: HostEvents<Vec<usize>> = HostEvents::new();
        let inner = hub.clone();
        let _a = hub.subscribe(EventKind::Repaint, move |seen, _| {
            seen.push(inner.handler_count(EventKind::Repaint));
        });
        let _b = hub.subscribe(EventKind::Repaint, |_, _| {});

        let mut seen = Vec::new();
        let mut surface = crate::render::tests::RecordingSurface::default();
        hub.emit(
            &mut seen,
            &mut HostEvent::Repaint {
                camera: None,
                surface: &mut surface,
            },
        );
        assert_eq!(seen, vec![2]);
        assert_eq!(hub.handler_count(EventKind::Repaint), 2);
    }

    #[test]
    fn test_guard_outliving_hub_is_harmless() {
        let hub: HostEvents<()> = HostEvents::new();
        let sub = hub.subscribe(EventKind::Repaint, |_, _| {});
        drop(hub);
        drop(sub);
    }
}
