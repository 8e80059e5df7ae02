use super::*;

/// Playback is stopped this long after it starts.
pub(crate) const STOP_DELAY_MS: i64 = 700;
/// Grace period between the native close attempt and the blank-page fallback.
pub(crate) const CLOSE_FALLBACK_DELAY_MS: i64 = 150;
/// Delay before the fullscreen attempt made once the document is ready.
pub(crate) const READY_FULLSCREEN_DELAY_MS: i64 = 100;

const BLANK_URL: &str = "about:blank";

impl Harness {
    /// The page script: strips native controls, enables audio, pins the
    /// video to the viewport, clears media-session metadata, wires the
    /// playback listeners and attempts autoplay.
    pub(crate) fn install_bumper(&mut self) -> Result<()> {
        let video = self.bumper.video;
        let window = self.dom.window;

        self.dom.remove_attr(video, "controls");
        if let Some(media) = self.dom.media_mut(video) {
            media.muted = false;
            media.volume = 1.0;
        }

        self.dom.set_style_property(video, "position", "fixed");
        self.dom.set_style_property(video, "inset", "0");
        self.dom.set_style_property(video, "width", "100%");
        self.dom.set_style_property(video, "height", "100%");
        self.dom.set_style_property(video, "object-fit", "cover");

        if self.platform.media_session_available {
            self.platform.media_session_metadata_cleared = true;
            self.trace_page_line("[page] media_session metadata cleared".into());
        }

        self.add_listener(video, "contextmenu", HandlerRef::SuppressContextMenu, false, false);
        self.add_listener(video, "play", HandlerRef::ArmStopTimer, false, false);
        self.add_listener(video, "playing", HandlerRef::ArmStopTimer, false, false);
        self.add_listener(video, "pause", HandlerRef::CancelStopTimer, false, false);
        self.add_listener(video, "ended", HandlerRef::FinishAndClose, false, false);
        self.add_listener(window, "click", HandlerRef::ResumeOnInteraction, false, true);
        self.add_listener(window, "touchstart", HandlerRef::ResumeOnInteraction, false, true);
        self.add_listener(
            window,
            "DOMContentLoaded",
            HandlerRef::ScheduleReadyFullscreen,
            false,
            false,
        );

        if self.dom.has_attr(video, "autoplay") {
            self.try_play()?;
        }
        Ok(())
    }

    pub(crate) fn run_handler(
        &mut self,
        handler: HandlerRef,
        event: &mut EventState,
    ) -> Result<()> {
        match handler {
            HandlerRef::ArmStopTimer => {
                self.arm_stop_timer();
                self.attempt_fullscreen();
                Ok(())
            }
            HandlerRef::CancelStopTimer => {
                self.cancel_stop_timer();
                Ok(())
            }
            HandlerRef::FinishAndClose => {
                self.cancel_stop_timer();
                self.attempt_close();
                Ok(())
            }
            HandlerRef::SuppressContextMenu => {
                event.prevent_default();
                Ok(())
            }
            HandlerRef::ResumeOnInteraction => self.resume_on_interaction(),
            HandlerRef::ScheduleReadyFullscreen => {
                self.set_timeout(READY_FULLSCREEN_DELAY_MS, TimerKind::ReadyFullscreen);
                Ok(())
            }
        }
    }

    pub(crate) fn run_timer(&mut self, kind: TimerKind) -> Result<()> {
        match kind {
            TimerKind::StopPlayback => {
                // Drop the handle first: the pause listener must find no
                // timer left to cancel.
                self.bumper.stop_timer = None;
                let video = self.bumper.video;
                self.pause_media(video)?;
                self.attempt_close();
                Ok(())
            }
            TimerKind::CloseFallback => {
                // Re-checked at fire time: navigate only when the native
                // close did not succeed.
                if !self.page.closed {
                    self.navigate_to_blank();
                }
                Ok(())
            }
            TimerKind::ReadyFullscreen => {
                self.attempt_fullscreen();
                Ok(())
            }
        }
    }

    /// At most one stop timer is outstanding: rearming replaces the prior
    /// one.
    fn arm_stop_timer(&mut self) {
        if let Some(timer_id) = self.bumper.stop_timer.take() {
            self.clear_timeout(timer_id);
        }
        let timer_id = self.set_timeout(STOP_DELAY_MS, TimerKind::StopPlayback);
        self.bumper.stop_timer = Some(timer_id);
    }

    fn cancel_stop_timer(&mut self) {
        if let Some(timer_id) = self.bumper.stop_timer.take() {
            self.clear_timeout(timer_id);
        }
    }

    /// Native close, then a deferred blank-page fallback.
    pub(crate) fn attempt_close(&mut self) {
        self.platform.close_calls += 1;
        if self.platform.script_closable {
            self.page.closed = true;
            self.page.unloaded = true;
            self.trace_page_line("[page] close granted".into());
        } else {
            self.trace_page_line("[page] close denied".into());
        }
        self.set_timeout(CLOSE_FALLBACK_DELAY_MS, TimerKind::CloseFallback);
    }

    fn navigate_to_blank(&mut self) {
        let from = self.page.document_url.clone();
        self.page.navigations.push(LocationNavigation {
            from: from.clone(),
            to: BLANK_URL.to_string(),
        });
        self.page.document_url = BLANK_URL.to_string();
        self.page.unloaded = true;
        self.trace_page_line(format!("[page] navigate from={from} to={BLANK_URL}"));
    }

    /// Best-effort fullscreen: no-op when already fullscreen, otherwise the
    /// first feature-detected path is requested and any denial swallowed.
    pub(crate) fn attempt_fullscreen(&mut self) {
        if self.platform.fullscreen_element.is_some() {
            self.trace_page_line("[page] fullscreen skip reason=already_fullscreen".into());
            return;
        }

        let (path, target) = if self.platform.element_fullscreen_supported {
            (FullscreenPath::Element, self.bumper.video)
        } else if self.platform.webkit_fullscreen_supported {
            (FullscreenPath::WebkitElement, self.bumper.video)
        } else {
            (FullscreenPath::DocumentElement, self.dom.document_element)
        };

        let granted =
            !self.platform.fullscreen_requires_activation || self.platform.user_activation;
        self.platform
            .fullscreen_requests
            .push(FullscreenRequest { path, granted });

        if granted {
            self.platform.fullscreen_element = Some(target);
            self.trace_page_line(format!(
                "[page] fullscreen granted path={path:?} element={}",
                self.dom.node_label(target)
            ));
        } else {
            self.trace_page_line(format!(
                "[page] fullscreen denied path={path:?} reason=no_user_activation"
            ));
        }
    }

    /// First trusted interaction: enable audio, restart playback, retry
    /// fullscreen, then unhook so it never runs again.
    fn resume_on_interaction(&mut self) -> Result<()> {
        let video = self.bumper.video;
        if let Some(media) = self.dom.media_mut(video) {
            media.muted = false;
            media.volume = 1.0;
        }
        self.try_play()?;
        self.attempt_fullscreen();

        let window = self.dom.window;
        self.listeners
            .remove(window, "click", false, HandlerRef::ResumeOnInteraction);
        self.listeners
            .remove(window, "touchstart", false, HandlerRef::ResumeOnInteraction);
        Ok(())
    }

    /// `play()` as the page calls it: outcome recorded, rejection swallowed.
    pub(crate) fn try_play(&mut self) -> Result<()> {
        let video = self.bumper.video;
        let playing = self
            .dom
            .media(video)
            .is_some_and(|media| !media.paused);
        let granted = playing
            || match self.platform.autoplay_policy {
                AutoplayPolicy::Allowed => true,
                AutoplayPolicy::RequiresActivation => self.platform.user_activation,
                AutoplayPolicy::Blocked => false,
            };
        self.platform.play_calls.push(granted);

        if !granted {
            self.trace_page_line("[page] play rejected reason=autoplay_policy".into());
            return Ok(());
        }
        if playing {
            self.trace_page_line("[page] play granted already_playing=true".into());
            return Ok(());
        }
        self.trace_page_line("[page] play granted".into());
        self.start_media_playback(video)
    }
}
