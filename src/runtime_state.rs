use super::*;

/// Named controller callbacks. Listener and timer dispatch go through these
/// references, so re-registration dedupe and removal compare by name the way
/// a browser compares callback identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HandlerRef {
    ArmStopTimer,
    CancelStopTimer,
    FinishAndClose,
    SuppressContextMenu,
    ResumeOnInteraction,
    ScheduleReadyFullscreen,
}

#[derive(Debug, Clone)]
pub(crate) struct Listener {
    pub(crate) handler: HandlerRef,
    pub(crate) capture: bool,
    pub(crate) passive: bool,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct ListenerStore {
    pub(crate) map: HashMap<NodeId, HashMap<String, Vec<Listener>>>,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, node_id: NodeId, event: String, listener: Listener) {
        let listeners = self
            .map
            .entry(node_id)
            .or_default()
            .entry(event)
            .or_default();

        // Match browser semantics: the same callback registered again for the
        // same type/capture pair is ignored.
        if listeners.iter().any(|existing| {
            existing.capture == listener.capture && existing.handler == listener.handler
        }) {
            return;
        }

        listeners.push(listener);
    }

    pub(crate) fn remove(
        &mut self,
        node_id: NodeId,
        event: &str,
        capture: bool,
        handler: HandlerRef,
    ) -> bool {
        let Some(events) = self.map.get_mut(&node_id) else {
            return false;
        };
        let Some(listeners) = events.get_mut(event) else {
            return false;
        };

        if let Some(pos) = listeners
            .iter()
            .position(|listener| listener.capture == capture && listener.handler == handler)
        {
            listeners.remove(pos);
            if listeners.is_empty() {
                events.remove(event);
            }
            if events.is_empty() {
                self.map.remove(&node_id);
            }
            return true;
        }

        false
    }

    pub(crate) fn get(&self, node_id: NodeId, event: &str, capture: bool) -> Vec<Listener> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .map(|listeners| {
                listeners
                    .iter()
                    .filter(|listener| listener.capture == capture)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EventState {
    pub(crate) event_type: String,
    pub(crate) target: NodeId,
    pub(crate) current_target: NodeId,
    pub(crate) cancelable: bool,
    pub(crate) default_prevented: bool,
    pub(crate) propagation_stopped: bool,
    pub(crate) immediate_propagation_stopped: bool,
}

impl EventState {
    pub(crate) fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: target,
            cancelable: true,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
        }
    }

    pub(crate) fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }
}

/// What a one-shot timer does when it fires. Also exposed on
/// [`PendingTimer`] so tests can tell the stop timer apart from the
/// close-fallback and deferred-fullscreen timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    StopPlayback,
    CloseFallback,
    ReadyFullscreen,
}

#[derive(Debug, Clone)]
pub(crate) struct ScheduledTask {
    pub(crate) id: i64,
    pub(crate) due_at: i64,
    pub(crate) order: i64,
    pub(crate) kind: TimerKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: i64,
    pub due_at: i64,
    pub order: i64,
    pub kind: TimerKind,
}

#[derive(Debug)]
pub(crate) struct SchedulerState {
    pub(crate) task_queue: Vec<ScheduledTask>,
    pub(crate) now_ms: i64,
    pub(crate) timer_step_limit: usize,
    pub(crate) next_timer_id: i64,
    pub(crate) next_task_order: i64,
    pub(crate) running_timer_id: Option<i64>,
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self {
            task_queue: Vec::new(),
            now_ms: 0,
            timer_step_limit: 10_000,
            next_timer_id: 1,
            next_task_order: 0,
            running_timer_id: None,
        }
    }
}

impl SchedulerState {
    pub(crate) fn allocate_timer_id(&mut self) -> i64 {
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        id
    }

    pub(crate) fn allocate_task_order(&mut self) -> i64 {
        let order = self.next_task_order;
        self.next_task_order += 1;
        order
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationNavigation {
    pub from: String,
    pub to: String,
}

#[derive(Debug)]
pub(crate) struct PageState {
    pub(crate) document_url: String,
    pub(crate) closed: bool,
    pub(crate) unloaded: bool,
    pub(crate) navigations: Vec<LocationNavigation>,
}

impl PageState {
    pub(crate) fn new(url: &str) -> Self {
        Self {
            document_url: url.to_string(),
            closed: false,
            unloaded: false,
            navigations: Vec::new(),
        }
    }
}

/// Engine autoplay posture for playback started without user activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayPolicy {
    /// `play()` always succeeds.
    Allowed,
    /// `play()` succeeds only once the page has user activation.
    RequiresActivation,
    /// `play()` never succeeds from script (kiosk-style block-all).
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenPath {
    Element,
    WebkitElement,
    DocumentElement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullscreenRequest {
    pub path: FullscreenPath,
    pub granted: bool,
}

/// Engine policy knobs plus the calls recorded against them: every gated
/// browser API leaves an observable trail.
#[derive(Debug)]
pub(crate) struct PlatformState {
    pub(crate) autoplay_policy: AutoplayPolicy,
    pub(crate) fullscreen_requires_activation: bool,
    pub(crate) element_fullscreen_supported: bool,
    pub(crate) webkit_fullscreen_supported: bool,
    pub(crate) script_closable: bool,
    pub(crate) media_session_available: bool,
    pub(crate) user_activation: bool,
    pub(crate) media_session_metadata_cleared: bool,
    pub(crate) fullscreen_element: Option<NodeId>,
    pub(crate) fullscreen_requests: Vec<FullscreenRequest>,
    pub(crate) play_calls: Vec<bool>,
    pub(crate) close_calls: usize,
}

impl Default for PlatformState {
    fn default() -> Self {
        Self {
            autoplay_policy: AutoplayPolicy::RequiresActivation,
            fullscreen_requires_activation: true,
            element_fullscreen_supported: true,
            webkit_fullscreen_supported: false,
            script_closable: false,
            media_session_available: true,
            user_activation: false,
            media_session_metadata_cleared: false,
            fullscreen_element: None,
            fullscreen_requests: Vec::new(),
            play_calls: Vec::new(),
            close_calls: 0,
        }
    }
}

/// Construction-time policy overrides. The page script runs during
/// construction, so knobs it consults at boot (media-session availability,
/// autoplay posture, fullscreen support) must be decided up front.
#[derive(Debug, Clone)]
pub struct PageOptions {
    pub autoplay_policy: AutoplayPolicy,
    pub fullscreen_requires_activation: bool,
    pub element_fullscreen_supported: bool,
    pub webkit_fullscreen_supported: bool,
    pub script_closable: bool,
    pub media_session_available: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            autoplay_policy: AutoplayPolicy::RequiresActivation,
            fullscreen_requires_activation: true,
            element_fullscreen_supported: true,
            webkit_fullscreen_supported: false,
            script_closable: false,
            media_session_available: true,
        }
    }
}

/// Script-owned state: the bound video element and the pending stop-timer
/// handle. At most one stop timer is outstanding at any time.
#[derive(Debug)]
pub(crate) struct BumperState {
    pub(crate) video: NodeId,
    pub(crate) stop_timer: Option<i64>,
}

#[derive(Debug)]
pub(crate) struct TraceState {
    pub(crate) enabled: bool,
    pub(crate) events: bool,
    pub(crate) timers: bool,
    pub(crate) page: bool,
    pub(crate) logs: VecDeque<String>,
    pub(crate) log_limit: usize,
    pub(crate) to_stderr: bool,
}

impl Default for TraceState {
    fn default() -> Self {
        Self {
            enabled: false,
            events: true,
            timers: true,
            page: true,
            logs: VecDeque::new(),
            log_limit: 10_000,
            to_stderr: true,
        }
    }
}
