//! Ranking properties over candidates produced by the real extractors.

use proptest::prelude::*;
use reelcast_core::fake::FakeTransport;
use reelcast_core::{PreferenceConfig, VideoCandidate};

use crate::fixtures::{STREAMTAPE_PAGE, VOE_PAGE, mirror_page, mirror_profile, okru_page, pipeline};

const EPISODE_URL: &str = "https://lmanime.test/one-piece-episode-1000";

const LABELS: [&str; 5] = [
    "English - Okru:1080p",
    "English - Okru:720p",
    "English - Okru:480p",
    "Spanish - Voe",
    "English - StreamTape",
];

fn transport() -> FakeTransport {
    let page = mirror_page(&[
        ("English - ok.ru", "https://ok.ru/videoembed/1000"),
        ("Spanish - voe", "https://voe.sx/e/1000"),
        ("English - streamtape", "https://streamtape.com/e/1000"),
    ]);
    FakeTransport::new()
        .with_page(EPISODE_URL, page)
        .with_page("https://ok.ru/videoembed/1000", okru_page())
        .with_page("https://voe.sx/e/1000", VOE_PAGE)
        .with_page("https://streamtape.com/e/1000", STREAMTAPE_PAGE)
}

fn resolve(preferences: PreferenceConfig) -> Vec<VideoCandidate> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime
        .block_on(pipeline(&transport(), preferences).resolve_page(&mirror_profile(), EPISODE_URL))
        .unwrap()
}

fn sorted_locations(videos: &[VideoCandidate]) -> Vec<String> {
    let mut locations: Vec<String> = videos.iter().map(|v| v.location().to_string()).collect();
    locations.sort();
    locations
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_exact_preferred_label_comes_first(
        quality in prop::sample::select(LABELS.to_vec()),
        language in prop::sample::select(vec!["", "english", "spanish"]),
    ) {
        let baseline = resolve(PreferenceConfig::default());
        let ranked = resolve(
            PreferenceConfig::new().with_quality(quality).with_language(language),
        );

        prop_assert_eq!(ranked.len(), LABELS.len());
        prop_assert_eq!(ranked[0].label(), quality);
        prop_assert_eq!(sorted_locations(&baseline), sorted_locations(&ranked));
    }

    #[test]
    fn test_unmatched_preferences_never_drop_candidates(
        quality in "[a-z]{0,6}",
        language in "[a-z]{0,6}",
    ) {
        let ranked = resolve(
            PreferenceConfig::new().with_quality(quality).with_language(language),
        );

        prop_assert_eq!(ranked.len(), LABELS.len());
    }
}

#[test]
fn test_language_preference_groups_matching_rows_first() {
    let ranked = resolve(PreferenceConfig::new().with_language("spanish"));

    assert_eq!(ranked[0].label(), "Spanish - Voe");
    assert!(ranked[1..].iter().all(|v| v.label().starts_with("English - ")));
}
