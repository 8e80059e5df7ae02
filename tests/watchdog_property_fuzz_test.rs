use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{FileFailurePersistence, TestCaseResult};
use video_bumper::{Harness, TimerKind};

const WATCHDOG_PROPTEST_REGRESSION_FILE: &str =
    "tests/proptest-regressions/watchdog_property_fuzz_test.txt";
const DEFAULT_WATCHDOG_PROPTEST_CASES: u32 = 256;

const BUMPER_PAGE_HTML: &str = r#"
<video id='v' src='/media/spot.mp4'></video>
<div id='overlay'>tap to play</div>
"#;

#[derive(Clone, Debug)]
enum PageAction {
    BeginPlayback,
    InterruptPlayback,
    EndPlayback,
    ClickVideo,
    ClickOverlay,
    TouchOverlay,
    DispatchPlaying,
    AdvanceTime(i64),
}

fn env_proptest_cases(var_name: &str, default_cases: u32) -> u32 {
    std::env::var(var_name)
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default_cases)
}

fn watchdog_proptest_cases() -> u32 {
    std::env::var("VIDEO_BUMPER_WATCHDOG_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or_else(|| {
            env_proptest_cases(
                "VIDEO_BUMPER_PROPTEST_CASES",
                DEFAULT_WATCHDOG_PROPTEST_CASES,
            )
        })
}

fn page_action_strategy() -> BoxedStrategy<PageAction> {
    prop_oneof![
        4 => Just(PageAction::BeginPlayback),
        3 => Just(PageAction::InterruptPlayback),
        2 => Just(PageAction::EndPlayback),
        2 => Just(PageAction::ClickVideo),
        1 => Just(PageAction::ClickOverlay),
        1 => Just(PageAction::TouchOverlay),
        2 => Just(PageAction::DispatchPlaying),
        5 => (0i64..=400).prop_map(PageAction::AdvanceTime),
    ]
    .boxed()
}

fn page_action_sequence_strategy() -> BoxedStrategy<Vec<PageAction>> {
    vec(page_action_strategy(), 1..=24).boxed()
}

fn run_action(page: &mut Harness, action: &PageAction) -> video_bumper::Result<()> {
    match action {
        PageAction::BeginPlayback => page.begin_playback("#v"),
        PageAction::InterruptPlayback => page.interrupt_playback("#v"),
        PageAction::EndPlayback => page.end_playback("#v"),
        PageAction::ClickVideo => page.click("#v"),
        PageAction::ClickOverlay => page.click("#overlay"),
        PageAction::TouchOverlay => page.touch("#overlay"),
        PageAction::DispatchPlaying => page.dispatch("#v", "playing"),
        PageAction::AdvanceTime(delta_ms) => page.advance_time(*delta_ms),
    }
}

fn pending_count(page: &Harness, kind: TimerKind) -> usize {
    page.pending_timers()
        .iter()
        .filter(|timer| timer.kind == kind)
        .count()
}

fn assert_watchdog_invariants_hold(actions: &[PageAction]) -> TestCaseResult {
    let mut page = Harness::from_html(BUMPER_PAGE_HTML)
        .map_err(|err| proptest::test_runner::TestCaseError::fail(format!("{err:?}")))?;

    for (step, action) in actions.iter().enumerate() {
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            run_action(&mut page, action)
        }));

        match outcome {
            Err(_) => {
                prop_assert!(
                    false,
                    "action panicked at step {step}: {action:?}, actions={actions:?}"
                );
            }
            Ok(Err(error)) => {
                prop_assert!(
                    false,
                    "action returned error at step {step}: {action:?}, error={error:?}, actions={actions:?}"
                );
            }
            Ok(Ok(())) => {}
        }

        prop_assert!(
            pending_count(&page, TimerKind::StopPlayback) <= 1,
            "more than one stop timer outstanding after step {step}: {action:?}, actions={actions:?}"
        );
        prop_assert!(
            pending_count(&page, TimerKind::ReadyFullscreen) <= 1,
            "more than one deferred fullscreen timer after step {step}: {action:?}"
        );
        prop_assert!(
            page.navigations().len() <= 1,
            "page navigated more than once after step {step}: {action:?}, actions={actions:?}"
        );
        if page.is_unloaded() {
            prop_assert!(
                page.close_attempts() >= 1,
                "page unloaded without a close attempt after step {step}: {action:?}"
            );
        }
    }

    page.flush()
        .map_err(|err| proptest::test_runner::TestCaseError::fail(format!("{err:?}")))?;
    prop_assert!(
        page.pending_timers().is_empty(),
        "timers left after flush, actions={actions:?}"
    );
    if page.close_attempts() > 0 {
        prop_assert!(
            page.is_unloaded(),
            "close sequence ran but the page is still loaded, actions={actions:?}"
        );
    }

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: watchdog_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(WATCHDOG_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn arbitrary_event_sequences_keep_watchdog_invariants(actions in page_action_sequence_strategy()) {
        assert_watchdog_invariants_hold(&actions)?;
    }
}
