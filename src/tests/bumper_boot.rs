use super::*;

#[test]
fn boot_strips_native_controls_and_enables_audio() -> Result<()> {
    let html = r#"<video id='v' controls muted src='/media/clip.mp4'></video>"#;

    let h = Harness::from_html(html)?;
    h.assert_attr_absent("#v", "controls")?;
    assert!(!h.is_muted());
    assert_eq!(h.volume(), 1.0);
    assert!(h.is_paused());
    Ok(())
}

#[test]
fn boot_pins_video_to_viewport() -> Result<()> {
    let h = Harness::from_html(r#"<video id='v'></video>"#)?;

    assert_eq!(h.style_property("#v", "position")?.as_deref(), Some("fixed"));
    assert_eq!(h.style_property("#v", "inset")?.as_deref(), Some("0"));
    assert_eq!(h.style_property("#v", "width")?.as_deref(), Some("100%"));
    assert_eq!(h.style_property("#v", "height")?.as_deref(), Some("100%"));
    assert_eq!(
        h.style_property("#v", "object-fit")?.as_deref(),
        Some("cover")
    );
    Ok(())
}

#[test]
fn boot_clears_media_session_metadata_when_available() -> Result<()> {
    let h = Harness::from_html(r#"<video id='v'></video>"#)?;
    assert!(h.media_session_metadata_cleared());

    let options = PageOptions {
        media_session_available: false,
        ..PageOptions::default()
    };
    let h = Harness::from_html_with_options(DEFAULT_PAGE_URL, r#"<video id='v'></video>"#, options)?;
    assert!(!h.media_session_metadata_cleared());
    Ok(())
}

#[test]
fn autoplay_attribute_starts_playback_when_policy_allows() -> Result<()> {
    let options = PageOptions {
        autoplay_policy: AutoplayPolicy::Allowed,
        ..PageOptions::default()
    };
    let mut h = Harness::from_html_with_options(
        DEFAULT_PAGE_URL,
        r#"<video id='v' autoplay></video>"#,
        options,
    )?;

    assert_eq!(h.play_calls(), &[true]);
    assert!(!h.is_paused());
    assert!(
        h.pending_timers()
            .iter()
            .any(|timer| timer.kind == TimerKind::StopPlayback && timer.due_at == 700)
    );

    h.advance_time(850)?;
    assert!(h.is_paused());
    assert!(h.is_unloaded());
    Ok(())
}

#[test]
fn autoplay_attribute_is_rejected_under_default_policy() -> Result<()> {
    let h = Harness::from_html(r#"<video id='v' autoplay></video>"#)?;

    assert_eq!(h.play_calls(), &[false]);
    assert!(h.is_paused());
    assert!(
        h.pending_timers()
            .iter()
            .all(|timer| timer.kind != TimerKind::StopPlayback)
    );
    Ok(())
}

#[test]
fn page_without_video_is_rejected() {
    match Harness::from_html(r#"<div id='d'>no media here</div>"#) {
        Err(Error::Runtime(message)) => {
            assert!(
                message.contains("no video element"),
                "unexpected message: {message}"
            );
        }
        other => panic!("expected runtime error, got: {other:?}"),
    }
}

#[test]
fn controller_binds_first_video_when_v_is_missing() -> Result<()> {
    let html = r#"
        <div id='wrap'>
          <video id='player' controls></video>
        </div>
        "#;

    let mut h = Harness::from_html(html)?;
    h.assert_attr_absent("#player", "controls")?;
    assert_eq!(
        h.style_property("#player", "position")?.as_deref(),
        Some("fixed")
    );

    h.begin_playback("#player")?;
    assert!(!h.is_paused());
    Ok(())
}

#[test]
fn controller_skips_non_video_element_with_id_v() -> Result<()> {
    let html = r#"
        <div id='v'>decoy</div>
        <video id='player'></video>
        "#;

    let h = Harness::from_html(html)?;
    assert_eq!(
        h.style_property("#player", "position")?.as_deref(),
        Some("fixed")
    );
    assert_eq!(h.style_property("#v", "position")?, None);
    Ok(())
}

#[test]
fn context_menu_is_suppressed_on_the_video_only() -> Result<()> {
    let html = r#"
        <video id='v'></video>
        <div id='d'>text</div>
        "#;

    let mut h = Harness::from_html(html)?;
    assert!(h.open_context_menu("#v")?);
    assert!(!h.open_context_menu("#d")?);
    Ok(())
}
