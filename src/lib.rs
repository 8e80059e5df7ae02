use std::collections::{HashMap, VecDeque};
use std::error::Error as StdError;
use std::fmt;

mod bumper;
mod page_dom;
mod runtime_state;

#[cfg(test)]
mod tests;

use page_dom::*;
use runtime_state::*;

pub use runtime_state::{
    AutoplayPolicy, FullscreenPath, FullscreenRequest, LocationNavigation, PageOptions,
    PendingTimer, TimerKind,
};

const DEFAULT_PAGE_URL: &str = "https://bumper.local/index.html";

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    Runtime(String),
    SelectorNotFound(String),
    UnsupportedSelector(String),
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::Runtime(msg) => write!(f, "runtime error: {msg}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::TypeMismatch {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "type mismatch for {selector}: expected {expected}, actual {actual}"
            ),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}

/// A loaded bumper page: the parsed document with the controller script
/// installed, plus a virtual clock. Nothing advances until the test drives
/// events or time.
#[derive(Debug)]
pub struct Harness {
    dom: Dom,
    listeners: ListenerStore,
    scheduler: SchedulerState,
    page: PageState,
    platform: PlatformState,
    bumper: BumperState,
    trace: TraceState,
}

impl Harness {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::from_html_with_options(DEFAULT_PAGE_URL, html, PageOptions::default())
    }

    pub fn from_html_with_url(url: &str, html: &str) -> Result<Self> {
        Self::from_html_with_options(url, html, PageOptions::default())
    }

    /// Builds the page and runs the controller's boot sequence, then fires
    /// `DOMContentLoaded`. The controller binds to `#v`, falling back to the
    /// first `video` element.
    pub fn from_html_with_options(url: &str, html: &str, options: PageOptions) -> Result<Self> {
        let dom = parse_html(html)?;
        let video = dom
            .element_by_id("v")
            .filter(|node_id| {
                dom.tag_name(*node_id)
                    .is_some_and(|tag| tag.eq_ignore_ascii_case("video"))
            })
            .or_else(|| dom.first_by_tag("video"))
            .ok_or_else(|| Error::Runtime("page has no video element".into()))?;

        let platform = PlatformState {
            autoplay_policy: options.autoplay_policy,
            fullscreen_requires_activation: options.fullscreen_requires_activation,
            element_fullscreen_supported: options.element_fullscreen_supported,
            webkit_fullscreen_supported: options.webkit_fullscreen_supported,
            script_closable: options.script_closable,
            media_session_available: options.media_session_available,
            ..PlatformState::default()
        };

        let mut harness = Self {
            dom,
            listeners: ListenerStore::default(),
            scheduler: SchedulerState::default(),
            page: PageState::new(url),
            platform,
            bumper: BumperState {
                video,
                stop_timer: None,
            },
            trace: TraceState::default(),
        };

        harness.install_bumper()?;
        let document = harness.dom.document;
        harness.dispatch_event(document, "DOMContentLoaded")?;
        Ok(harness)
    }

    // ---- interaction ----

    /// Trusted click. Grants user activation before listeners run, like any
    /// engine-delivered pointer gesture.
    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.gesture(target, "click")
    }

    pub fn touch(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.gesture(target, "touchstart")
    }

    /// Right-click. Returns whether the native menu was suppressed.
    pub fn open_context_menu(&mut self, selector: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        if self.page.unloaded {
            self.trace_page_line("[page] drop event=contextmenu reason=unloaded".into());
            return Ok(false);
        }
        self.platform.user_activation = true;
        let event = self.dispatch_event(target, "contextmenu")?;
        Ok(event.default_prevented)
    }

    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_event(target, event)?;
        Ok(())
    }

    fn gesture(&mut self, target: NodeId, event_type: &str) -> Result<()> {
        if self.page.unloaded {
            self.trace_page_line(format!("[page] drop event={event_type} reason=unloaded"));
            return Ok(());
        }
        self.platform.user_activation = true;
        self.dispatch_event(target, event_type)?;
        Ok(())
    }

    // ---- playback simulation ----

    /// The media stack reports playback has started: fires `play` then
    /// `playing`. No-op when already playing.
    pub fn begin_playback(&mut self, selector: &str) -> Result<()> {
        let target = self.media_target(selector)?;
        if self.page.unloaded {
            self.trace_page_line("[page] drop event=play reason=unloaded".into());
            return Ok(());
        }
        self.start_media_playback(target)
    }

    /// Playback paused from outside the controller (user control, tab
    /// switch). Fires `pause`. No-op when already paused.
    pub fn interrupt_playback(&mut self, selector: &str) -> Result<()> {
        let target = self.media_target(selector)?;
        if self.page.unloaded {
            self.trace_page_line("[page] drop event=pause reason=unloaded".into());
            return Ok(());
        }
        self.pause_media(target)
    }

    /// The media resource runs out: fires `pause` then `ended`, the order
    /// engines use for a natural end of playback.
    pub fn end_playback(&mut self, selector: &str) -> Result<()> {
        let target = self.media_target(selector)?;
        if self.page.unloaded {
            self.trace_page_line("[page] drop event=ended reason=unloaded".into());
            return Ok(());
        }
        let Some(media) = self.dom.media_mut(target) else {
            return Ok(());
        };
        if media.paused {
            return Ok(());
        }
        media.paused = true;
        media.ended = true;
        self.dispatch_event(target, "pause")?;
        self.dispatch_event(target, "ended")?;
        Ok(())
    }

    pub(crate) fn start_media_playback(&mut self, target: NodeId) -> Result<()> {
        let Some(media) = self.dom.media_mut(target) else {
            return Ok(());
        };
        if !media.paused {
            return Ok(());
        }
        media.paused = false;
        media.ended = false;
        self.dispatch_event(target, "play")?;
        self.dispatch_event(target, "playing")?;
        Ok(())
    }

    pub(crate) fn pause_media(&mut self, target: NodeId) -> Result<()> {
        let Some(media) = self.dom.media_mut(target) else {
            return Ok(());
        };
        if media.paused {
            return Ok(());
        }
        media.paused = true;
        self.dispatch_event(target, "pause")?;
        Ok(())
    }

    fn media_target(&self, selector: &str) -> Result<NodeId> {
        let target = self.select_one(selector)?;
        if self.dom.media(target).is_none() {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "media element".into(),
                actual: self
                    .dom
                    .tag_name(target)
                    .unwrap_or("non-element")
                    .to_string(),
            });
        }
        Ok(target)
    }

    // ---- virtual clock ----

    pub fn now_ms(&self) -> i64 {
        self.scheduler.now_ms
    }

    pub fn clear_timer(&mut self, timer_id: i64) -> bool {
        let existed = self.scheduler.running_timer_id == Some(timer_id)
            || self
                .scheduler
                .task_queue
                .iter()
                .any(|task| task.id == timer_id);
        self.clear_timeout(timer_id);
        existed
    }

    pub fn clear_all_timers(&mut self) -> usize {
        let cleared = self.scheduler.task_queue.len();
        self.scheduler.task_queue.clear();
        self.trace_timer_line(format!("[timer] clear_all cleared={cleared}"));
        cleared
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .scheduler
            .task_queue
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
                kind: task.kind,
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::Runtime(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let from = self.scheduler.now_ms;
        self.scheduler.now_ms = self.scheduler.now_ms.saturating_add(delta_ms);
        let ran = self.run_due_timers_internal()?;
        self.trace_timer_line(format!(
            "[timer] advance delta_ms={} from={} to={} ran_due={}",
            delta_ms, from, self.scheduler.now_ms, ran
        ));
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        if target_ms < self.scheduler.now_ms {
            return Err(Error::Runtime(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={})",
                self.scheduler.now_ms
            )));
        }
        let from = self.scheduler.now_ms;
        self.scheduler.now_ms = target_ms;
        let ran = self.run_due_timers_internal()?;
        self.trace_timer_line(format!(
            "[timer] advance_to from={} to={} ran_due={}",
            from, self.scheduler.now_ms, ran
        ));
        Ok(())
    }

    /// Runs the timer queue to exhaustion, advancing the clock to each task's
    /// due time.
    pub fn flush(&mut self) -> Result<()> {
        let from = self.scheduler.now_ms;
        let ran = self.run_timer_queue(None, true)?;
        self.trace_timer_line(format!(
            "[timer] flush from={} to={} ran={}",
            from, self.scheduler.now_ms, ran
        ));
        Ok(())
    }

    pub fn run_next_timer(&mut self) -> Result<bool> {
        let Some(next_idx) = self.next_task_index(None) else {
            self.trace_timer_line("[timer] run_next none".into());
            return Ok(false);
        };

        let task = self.scheduler.task_queue.remove(next_idx);
        if task.due_at > self.scheduler.now_ms {
            self.scheduler.now_ms = task.due_at;
        }
        self.execute_timer_task(task)?;
        Ok(true)
    }

    pub fn run_next_due_timer(&mut self) -> Result<bool> {
        let Some(next_idx) = self.next_task_index(Some(self.scheduler.now_ms)) else {
            self.trace_timer_line("[timer] run_next_due none".into());
            return Ok(false);
        };

        let task = self.scheduler.task_queue.remove(next_idx);
        self.execute_timer_task(task)?;
        Ok(true)
    }

    pub fn run_due_timers(&mut self) -> Result<usize> {
        let ran = self.run_due_timers_internal()?;
        self.trace_timer_line(format!(
            "[timer] run_due now_ms={} ran={}",
            self.scheduler.now_ms, ran
        ));
        Ok(ran)
    }

    pub fn set_timer_step_limit(&mut self, max_steps: usize) -> Result<()> {
        if max_steps == 0 {
            return Err(Error::Runtime(
                "set_timer_step_limit requires at least 1 step".into(),
            ));
        }
        self.scheduler.timer_step_limit = max_steps;
        Ok(())
    }

    fn run_due_timers_internal(&mut self) -> Result<usize> {
        self.run_timer_queue(Some(self.scheduler.now_ms), false)
    }

    fn run_timer_queue(&mut self, due_limit: Option<i64>, advance_clock: bool) -> Result<usize> {
        let mut steps = 0usize;
        while let Some(next_idx) = self.next_task_index(due_limit) {
            steps += 1;
            if steps > self.scheduler.timer_step_limit {
                return Err(self.timer_step_limit_error(
                    self.scheduler.timer_step_limit,
                    steps,
                    due_limit,
                ));
            }
            let task = self.scheduler.task_queue.remove(next_idx);
            if advance_clock && task.due_at > self.scheduler.now_ms {
                self.scheduler.now_ms = task.due_at;
            }
            self.execute_timer_task(task)?;
        }
        Ok(steps)
    }

    fn timer_step_limit_error(
        &self,
        max_steps: usize,
        steps: usize,
        due_limit: Option<i64>,
    ) -> Error {
        let due_limit_desc = due_limit
            .map(|value| value.to_string())
            .unwrap_or_else(|| "none".into());

        let next_task_desc = self
            .next_task_index(due_limit)
            .and_then(|idx| self.scheduler.task_queue.get(idx))
            .map(|task| {
                format!(
                    "id={},due_at={},order={},kind={:?}",
                    task.id, task.due_at, task.order, task.kind
                )
            })
            .unwrap_or_else(|| "none".into());

        Error::Runtime(format!(
            "flush exceeded max task steps: limit={max_steps}, steps={steps}, now_ms={}, due_limit={}, pending_tasks={}, next_task={}",
            self.scheduler.now_ms,
            due_limit_desc,
            self.scheduler.task_queue.len(),
            next_task_desc
        ))
    }

    fn next_task_index(&self, due_limit: Option<i64>) -> Option<usize> {
        self.scheduler
            .task_queue
            .iter()
            .enumerate()
            .filter(|(_, task)| {
                if let Some(limit) = due_limit {
                    task.due_at <= limit
                } else {
                    true
                }
            })
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }

    fn execute_timer_task(&mut self, task: ScheduledTask) -> Result<()> {
        self.trace_timer_line(format!(
            "[timer] run id={} kind={:?} due_at={} now_ms={}",
            task.id, task.kind, task.due_at, self.scheduler.now_ms
        ));

        if self.page.unloaded {
            self.trace_page_line(format!("[page] drop timer id={} reason=unloaded", task.id));
            return Ok(());
        }

        self.scheduler.running_timer_id = Some(task.id);
        let result = self.run_timer(task.kind);
        self.scheduler.running_timer_id = None;
        result
    }

    pub(crate) fn set_timeout(&mut self, delay_ms: i64, kind: TimerKind) -> i64 {
        let id = self.scheduler.allocate_timer_id();
        let order = self.scheduler.allocate_task_order();
        let due_at = self.scheduler.now_ms.saturating_add(delay_ms.max(0));
        self.scheduler.task_queue.push(ScheduledTask {
            id,
            due_at,
            order,
            kind,
        });
        self.trace_timer_line(format!("[timer] set id={id} kind={kind:?} due_at={due_at}"));
        id
    }

    pub(crate) fn clear_timeout(&mut self, timer_id: i64) {
        self.scheduler.task_queue.retain(|task| task.id != timer_id);
        self.trace_timer_line(format!("[timer] clear id={timer_id}"));
    }

    // ---- event dispatch ----

    pub(crate) fn add_listener(
        &mut self,
        node_id: NodeId,
        event: &str,
        handler: HandlerRef,
        capture: bool,
        passive: bool,
    ) {
        self.listeners.add(
            node_id,
            event.to_string(),
            Listener {
                handler,
                capture,
                passive,
            },
        );
    }

    pub(crate) fn dispatch_event(
        &mut self,
        target: NodeId,
        event_type: &str,
    ) -> Result<EventState> {
        let mut event = EventState::new(event_type, target);
        if self.page.unloaded {
            self.trace_page_line(format!("[page] drop event={event_type} reason=unloaded"));
            return Ok(event);
        }

        let mut path = Vec::new();
        let mut cursor = Some(target);
        while let Some(node) = cursor {
            path.push(node);
            cursor = self.dom.parent(node);
        }
        path.reverse();

        // Capture phase.
        if path.len() >= 2 {
            for node in path[..path.len() - 1].iter().copied() {
                event.current_target = node;
                self.invoke_listeners(node, &mut event, true)?;
                if event.propagation_stopped {
                    self.trace_event_done(&event, "propagation_stopped");
                    return Ok(event);
                }
                if self.page.unloaded {
                    self.trace_event_done(&event, "unloaded");
                    return Ok(event);
                }
            }
        }

        // Target phase: capture listeners first, then bubble listeners.
        event.current_target = target;
        for capture in [true, false] {
            self.invoke_listeners(target, &mut event, capture)?;
            if event.propagation_stopped {
                self.trace_event_done(&event, "propagation_stopped");
                return Ok(event);
            }
            if self.page.unloaded {
                self.trace_event_done(&event, "unloaded");
                return Ok(event);
            }
        }

        // Bubble phase.
        if path.len() >= 2 {
            for node in path[..path.len() - 1].iter().rev().copied() {
                event.current_target = node;
                self.invoke_listeners(node, &mut event, false)?;
                if event.propagation_stopped {
                    self.trace_event_done(&event, "propagation_stopped");
                    return Ok(event);
                }
                if self.page.unloaded {
                    self.trace_event_done(&event, "unloaded");
                    return Ok(event);
                }
            }
        }

        self.trace_event_done(&event, "completed");
        Ok(event)
    }

    fn invoke_listeners(
        &mut self,
        node_id: NodeId,
        event: &mut EventState,
        capture: bool,
    ) -> Result<()> {
        let listeners = self.listeners.get(node_id, &event.event_type, capture);
        for listener in listeners {
            if self.trace.enabled {
                let phase = if capture { "capture" } else { "bubble" };
                let target_label = self.dom.node_label(event.target);
                let current_label = self.dom.node_label(event.current_target);
                self.trace_event_line(format!(
                    "[event] {} target={} current={} phase={} default_prevented={}",
                    event.event_type, target_label, current_label, phase, event.default_prevented
                ));
            }
            let default_prevented_before = event.default_prevented;
            self.run_handler(listener.handler, event)?;
            if listener.passive {
                // Passive listeners cannot cancel the default action.
                event.default_prevented = default_prevented_before;
            }
            if event.immediate_propagation_stopped {
                break;
            }
        }
        Ok(())
    }

    fn trace_event_done(&mut self, event: &EventState, outcome: &str) {
        let target_label = self.dom.node_label(event.target);
        let current_label = self.dom.node_label(event.current_target);
        self.trace_event_line(format!(
            "[event] done {} target={} current={} outcome={} default_prevented={}",
            event.event_type, target_label, current_label, outcome, event.default_prevented
        ));
    }

    // ---- page state ----

    pub fn document_url(&self) -> &str {
        &self.page.document_url
    }

    pub fn is_closed(&self) -> bool {
        self.page.closed
    }

    pub fn is_unloaded(&self) -> bool {
        self.page.unloaded
    }

    pub fn navigations(&self) -> &[LocationNavigation] {
        &self.page.navigations
    }

    pub fn close_attempts(&self) -> usize {
        self.platform.close_calls
    }

    pub fn user_activation(&self) -> bool {
        self.platform.user_activation
    }

    pub fn fullscreen_element(&self) -> Option<String> {
        self.platform
            .fullscreen_element
            .map(|node_id| self.dom.node_label(node_id))
    }

    pub fn fullscreen_requests(&self) -> &[FullscreenRequest] {
        &self.platform.fullscreen_requests
    }

    /// Outcome of each controller `play()` call, in order.
    pub fn play_calls(&self) -> &[bool] {
        &self.platform.play_calls
    }

    pub fn media_session_metadata_cleared(&self) -> bool {
        self.platform.media_session_metadata_cleared
    }

    pub fn is_paused(&self) -> bool {
        self.dom
            .media(self.bumper.video)
            .map(|media| media.paused)
            .unwrap_or(true)
    }

    pub fn has_ended(&self) -> bool {
        self.dom
            .media(self.bumper.video)
            .map(|media| media.ended)
            .unwrap_or(false)
    }

    pub fn is_muted(&self) -> bool {
        self.dom
            .media(self.bumper.video)
            .map(|media| media.muted)
            .unwrap_or(false)
    }

    pub fn volume(&self) -> f64 {
        self.dom
            .media(self.bumper.video)
            .map(|media| media.volume)
            .unwrap_or(1.0)
    }

    // ---- policies ----

    pub fn set_autoplay_policy(&mut self, policy: AutoplayPolicy) {
        self.platform.autoplay_policy = policy;
    }

    pub fn set_fullscreen_requires_activation(&mut self, required: bool) {
        self.platform.fullscreen_requires_activation = required;
    }

    pub fn set_element_fullscreen_supported(&mut self, supported: bool) {
        self.platform.element_fullscreen_supported = supported;
    }

    pub fn set_webkit_fullscreen_supported(&mut self, supported: bool) {
        self.platform.webkit_fullscreen_supported = supported;
    }

    pub fn set_script_closable(&mut self, closable: bool) {
        self.platform.script_closable = closable;
    }

    // ---- inspection ----

    pub fn attr(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let target = self.select_one(selector)?;
        Ok(self.dom.attr(target, name))
    }

    pub fn style_property(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let target = self.select_one(selector)?;
        Ok(self.dom.style_property(target, name))
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn assert_attr_absent(&self, selector: &str, name: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if let Some(value) = self.dom.attr(target, name) {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("no {name} attribute"),
                actual: format!("{name}='{value}'"),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 200)
    }

    // ---- trace ----

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace.enabled = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace.logs).into_iter().collect()
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace.to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace.events = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.trace.timers = enabled;
    }

    pub fn set_trace_page(&mut self, enabled: bool) {
        self.trace.page = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::Runtime(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace.log_limit = max_entries;
        while self.trace.logs.len() > self.trace.log_limit {
            self.trace.logs.pop_front();
        }
        Ok(())
    }

    fn trace_event_line(&mut self, line: String) {
        if self.trace.enabled && self.trace.events {
            self.trace_line(line);
        }
    }

    fn trace_timer_line(&mut self, line: String) {
        if self.trace.enabled && self.trace.timers {
            self.trace_line(line);
        }
    }

    pub(crate) fn trace_page_line(&mut self, line: String) {
        if self.trace.enabled && self.trace.page {
            self.trace_line(line);
        }
    }

    fn trace_line(&mut self, line: String) {
        if self.trace.to_stderr {
            eprintln!("{line}");
        }
        self.trace.logs.push_back(line);
        while self.trace.logs.len() > self.trace.log_limit {
            self.trace.logs.pop_front();
        }
    }
}

fn truncate_chars(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        input.to_string()
    } else {
        input.chars().take(max_chars).collect()
    }
}
