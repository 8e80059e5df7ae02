use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{FileFailurePersistence, TestCaseResult};
use video_bumper::Harness;

const PARSER_PROPTEST_REGRESSION_FILE: &str =
    "tests/proptest-regressions/parser_property_fuzz_test.txt";
const DEFAULT_PARSER_PROPTEST_CASES: u32 = 256;

fn parser_proptest_cases() -> u32 {
    std::env::var("VIDEO_BUMPER_PARSER_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or_else(|| {
            std::env::var("VIDEO_BUMPER_PROPTEST_CASES")
                .ok()
                .and_then(|raw| raw.parse::<u32>().ok())
                .filter(|value| *value > 0)
                .unwrap_or(DEFAULT_PARSER_PROPTEST_CASES)
        })
}

fn id_suffix_strategy() -> BoxedStrategy<String> {
    vec(
        prop_oneof![
            Just('a'),
            Just('b'),
            Just('c'),
            Just('x'),
            Just('y'),
            Just('z'),
            Just('0'),
            Just('1'),
            Just('9'),
            Just('-'),
        ],
        1..=8,
    )
    .prop_map(|chars| chars.into_iter().collect())
    .boxed()
}

fn attr_value_strategy() -> BoxedStrategy<String> {
    vec(
        prop_oneof![
            Just('a'),
            Just('m'),
            Just('z'),
            Just('0'),
            Just('7'),
            Just(' '),
            Just('.'),
            Just('/'),
            Just(':'),
            Just('_'),
            Just('-'),
        ],
        0..=16,
    )
    .prop_map(|chars| chars.into_iter().collect())
    .boxed()
}

fn text_strategy() -> BoxedStrategy<String> {
    vec(
        prop_oneof![
            Just('a'),
            Just('e'),
            Just('t'),
            Just('p'),
            Just(' '),
            Just('.'),
            Just('!'),
        ],
        0..=20,
    )
    .prop_map(|chars| chars.into_iter().collect())
    .boxed()
}

fn assert_parsed_page_is_queryable(id_suffix: &str, value: &str, text: &str) -> TestCaseResult {
    let html = format!(
        "<video id='v' data-spot='{value}'></video><p id='p-{id_suffix}'>{text}</p>"
    );

    let page = Harness::from_html(&html)
        .map_err(|err| proptest::test_runner::TestCaseError::fail(format!("{err:?}")))?;

    let spot = page
        .attr("#v", "data-spot")
        .map_err(|err| proptest::test_runner::TestCaseError::fail(format!("{err:?}")))?;
    prop_assert_eq!(spot.as_deref(), Some(value));

    let selector = format!("p#p-{id_suffix}");
    prop_assert!(
        page.assert_exists(&selector).is_ok(),
        "paragraph missing for selector {selector}, html={html}"
    );
    prop_assert!(
        page.assert_text(&selector, text.trim()).is_ok(),
        "text mismatch for selector {selector}, html={html}"
    );

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: parser_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(PARSER_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn generated_markup_round_trips_through_the_page(
        id_suffix in id_suffix_strategy(),
        value in attr_value_strategy(),
        text in text_strategy(),
    ) {
        assert_parsed_page_is_queryable(&id_suffix, &value, &text)?;
    }
}
