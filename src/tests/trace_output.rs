use super::*;

fn traced_page() -> Result<Harness> {
    let mut h = Harness::from_html(r#"<video id='v'></video>"#)?;
    h.enable_trace(true);
    h.set_trace_stderr(false);
    Ok(h)
}

#[test]
fn lifecycle_leaves_event_timer_and_page_lines() -> Result<()> {
    let mut h = traced_page()?;

    h.begin_playback("#v")?;
    h.advance_time(850)?;

    let logs = h.take_trace_logs();
    assert!(logs.iter().any(|line| line.contains("[event] play")));
    assert!(logs.iter().any(|line| line.contains("[event] done playing")));
    assert!(logs.iter().any(|line| line.contains("[timer] set")));
    assert!(
        logs.iter()
            .any(|line| line.contains("[timer] run") && line.contains("StopPlayback"))
    );
    assert!(logs.iter().any(|line| line.contains("[page] close denied")));
    assert!(
        logs.iter()
            .any(|line| line.contains("[page] navigate") && line.contains("about:blank"))
    );

    assert!(h.take_trace_logs().is_empty());
    Ok(())
}

#[test]
fn event_lines_can_be_switched_off_alone() -> Result<()> {
    let mut h = traced_page()?;
    h.set_trace_events(false);

    h.begin_playback("#v")?;
    h.advance_time(700)?;

    let logs = h.take_trace_logs();
    assert!(logs.iter().all(|line| !line.contains("[event]")));
    assert!(logs.iter().any(|line| line.contains("[timer]")));
    Ok(())
}

#[test]
fn timer_and_page_lines_can_be_switched_off_alone() -> Result<()> {
    let mut h = traced_page()?;
    h.set_trace_timers(false);
    h.set_trace_page(false);

    h.begin_playback("#v")?;
    h.advance_time(850)?;

    let logs = h.take_trace_logs();
    assert!(logs.iter().all(|line| !line.contains("[timer]")));
    assert!(logs.iter().all(|line| !line.contains("[page]")));
    assert!(logs.iter().any(|line| line.contains("[event]")));
    Ok(())
}

#[test]
fn disabled_trace_collects_nothing() -> Result<()> {
    let mut h = Harness::from_html(r#"<video id='v'></video>"#)?;

    h.begin_playback("#v")?;
    h.advance_time(850)?;

    assert!(h.take_trace_logs().is_empty());
    Ok(())
}

#[test]
fn log_limit_keeps_only_the_newest_lines() -> Result<()> {
    let mut h = traced_page()?;
    h.set_trace_log_limit(3)?;

    h.begin_playback("#v")?;
    h.advance_time(850)?;

    let logs = h.take_trace_logs();
    assert_eq!(logs.len(), 3);
    assert!(
        logs.iter()
            .any(|line| line.contains("[page] navigate") || line.contains("[timer] advance"))
    );
    Ok(())
}

#[test]
fn log_limit_rejects_zero() -> Result<()> {
    let mut h = traced_page()?;
    assert!(matches!(h.set_trace_log_limit(0), Err(Error::Runtime(_))));
    Ok(())
}

#[test]
fn dropped_activity_on_an_unloaded_page_is_traced() -> Result<()> {
    let mut h = traced_page()?;

    h.begin_playback("#v")?;
    h.advance_time(850)?;
    h.take_trace_logs();

    h.click("#v")?;
    let logs = h.take_trace_logs();
    assert!(
        logs.iter()
            .any(|line| line.contains("drop event=click") && line.contains("unloaded"))
    );
    Ok(())
}
