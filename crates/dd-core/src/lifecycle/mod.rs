//! Lifecycle coordination between the host viewport and the pipeline.
//!
//! ```text
//!            enqueue              repaint
//!   Idle ───────────▶ Accumulating ───────▶ Draining
//!    ▲                                         │
//!    └──────────── queue cleared ──────────────┘
//!
//!   play mode entered / exiting, scene opening:  * ──▶ Idle (full clear)
//! ```

pub mod events;

use thiserror::Error;

use crate::state::RenderState;

pub use events::{EventKind, HostEvent, HostEvents, Subscription, TickContext};

/// Pipeline lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    Accumulating,
    Draining,
}

/// Why a forced reset happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    PlayModeEntered,
    PlayModeExiting,
    SceneOpening,
    /// Requested directly by the host
    Manual,
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("A repaint handler is already installed on this host")]
    AlreadyInstalled,
}

/// Tracks the pipeline state across host events.
#[derive(Debug, Default)]
pub struct LifecycleCoordinator {
    state: LifecycleState,
    resets: u64,
    drains: u64,
}

impl LifecycleCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Number of forced resets so far.
    pub fn resets(&self) -> u64 {
        self.resets
    }

    /// Number of completed drains so far.
    pub fn drains(&self) -> u64 {
        self.drains
    }

    pub fn on_enqueue(&mut self) {
        if self.state == LifecycleState::Idle {
            self.state = LifecycleState::Accumulating;
        }
    }

    pub fn begin_drain(&mut self) {
        debug_assert_ne!(self.state, LifecycleState::Draining, "drain re-entered");
        self.state = LifecycleState::Draining;
    }

    pub fn end_drain(&mut self) {
        self.state = LifecycleState::Idle;
        self.drains += 1;
    }

    pub fn reset(&mut self, reason: ResetReason) {
        tracing::debug!(?reason, from = ?self.state, "Debug-draw pipeline reset");
        self.state = LifecycleState::Idle;
        self.resets += 1;
    }
}

/// Handlers installed on a host; dropping it removes them.
#[derive(Debug)]
pub struct Installation {
    _guards: Vec<Subscription>,
}

/// Wires a [`RenderState`] to a host's events.
///
/// Installs exactly one repaint handler plus the reset handlers for play
/// mode transitions and scene loads. The state keeps a handle to the hub so
/// the text overlay can subscribe to tick events on first use.
pub fn install(
    state: &mut RenderState,
    events: &HostEvents<RenderState>,
) -> Result<Installation, LifecycleError> {
    if events.handler_count(EventKind::Repaint) > 0 {
        return Err(LifecycleError::AlreadyInstalled);
    }
    state.attach(events.clone());

    let reset = |kind: EventKind, reason: ResetReason| {
        events.subscribe(kind, move |state: &mut RenderState, _| state.reset(reason))
    };

    let guards = vec![
        events.subscribe(EventKind::Repaint, |state: &mut RenderState, event| {
            if let HostEvent::Repaint { camera, surface } = event {
                state.render(*camera, &mut **surface);
            }
        }),
        reset(EventKind::PlayModeEntered, ResetReason::PlayModeEntered),
        reset(EventKind::PlayModeExiting, ResetReason::PlayModeExiting),
        reset(EventKind::SceneOpening, ResetReason::SceneOpening),
    ];

    tracing::debug!("Debug-draw pipeline installed on host events");
    Ok(Installation { _guards: guards })
}
