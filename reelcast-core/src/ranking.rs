//! Preference-driven ordering of resolved video candidates.
//!
//! Ranking runs in two phases. A stable multi-key sort orders candidates by
//! how well their label matches the preferences, then a single move promotes
//! the first candidate whose label equals the preferred quality exactly.
//! The promotion is kept out of the comparator so the sort stays a total
//! order.

use std::cmp::Ordering;

use crate::preferences::PreferenceConfig;
use crate::video::VideoCandidate;

/// Which sort keys follow the quality and language stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankingStrategy {
    /// Quality match, then case-insensitive language match.
    #[default]
    PreferenceMatch,
    /// As `PreferenceMatch`, then provider name ascending and the label's
    /// digits descending, so "Okru:1080p" sorts before "Okru:720p".
    ProviderQuality,
}

impl std::str::FromStr for RankingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "match" | "preference" => Ok(Self::PreferenceMatch),
            "provider" | "provider-quality" => Ok(Self::ProviderQuality),
            _ => Err(format!("Invalid ranking strategy: {s}")),
        }
    }
}

/// Sorts candidates most-preferred first.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreferenceRanker {
    strategy: RankingStrategy,
}

/// Precomputed sort key for one candidate.
#[derive(Debug)]
struct RankKey {
    quality_match: bool,
    language_match: bool,
    provider: String,
    digits: String,
}

impl PreferenceRanker {
    pub fn new(strategy: RankingStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> RankingStrategy {
        self.strategy
    }

    /// Orders candidates by preference.
    ///
    /// The result is always a permutation of the input. Candidates that no
    /// preference distinguishes keep their input order.
    pub fn rank(
        &self,
        candidates: Vec<VideoCandidate>,
        preferences: &PreferenceConfig,
    ) -> Vec<VideoCandidate> {
        let mut keyed: Vec<(RankKey, VideoCandidate)> = candidates
            .into_iter()
            .map(|candidate| (Self::key_for(&candidate, preferences), candidate))
            .collect();

        keyed.sort_by(|(a, _), (b, _)| self.compare(a, b));

        let mut ranked: Vec<VideoCandidate> =
            keyed.into_iter().map(|(_, candidate)| candidate).collect();

        Self::promote_exact_match(&mut ranked, &preferences.preferred_quality);
        ranked
    }

    fn key_for(candidate: &VideoCandidate, preferences: &PreferenceConfig) -> RankKey {
        let label = candidate.label();
        let quality = preferences.preferred_quality.as_str();
        let language = preferences.preferred_language.to_lowercase();

        RankKey {
            quality_match: !quality.is_empty() && label.contains(quality),
            language_match: !language.is_empty() && label.to_lowercase().contains(&language),
            provider: label.chars().filter(|c| !c.is_ascii_digit()).collect(),
            digits: significant_digits(label),
        }
    }

    fn compare(&self, a: &RankKey, b: &RankKey) -> Ordering {
        let by_preference = b
            .quality_match
            .cmp(&a.quality_match)
            .then_with(|| b.language_match.cmp(&a.language_match));

        match self.strategy {
            RankingStrategy::PreferenceMatch => by_preference,
            RankingStrategy::ProviderQuality => by_preference
                .then_with(|| a.provider.cmp(&b.provider))
                .then_with(|| compare_digits(&b.digits, &a.digits)),
        }
    }

    /// Moves the first exact label match to the front.
    fn promote_exact_match(ranked: &mut [VideoCandidate], preferred: &str) {
        if preferred.is_empty() {
            return;
        }

        if let Some(index) = ranked.iter().position(|c| c.label() == preferred) {
            ranked[..=index].rotate_right(1);
        }
    }
}

/// Digits of a label with leading zeros removed, "0" when there are none.
fn significant_digits(label: &str) -> String {
    let digits: String = label.chars().filter(char::is_ascii_digit).collect();
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Numeric comparison of two digit strings without parsing into a fixed width.
fn compare_digits(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn candidate(index: usize, label: &str) -> VideoCandidate {
        VideoCandidate::new(&format!("https://cdn.example/{index}.mp4"), label).unwrap()
    }

    fn labels(ranked: &[VideoCandidate]) -> Vec<&str> {
        ranked.iter().map(|c| c.label()).collect()
    }

    #[test]
    fn test_quality_then_language() {
        let input = vec![
            candidate(0, "Dailymotion (Español)"),
            candidate(1, "English - 480p"),
            candidate(2, "Español - 720p"),
            candidate(3, "English - 720p"),
        ];
        let prefs = PreferenceConfig::new()
            .with_quality("720p")
            .with_language("english");

        let ranked = PreferenceRanker::default().rank(input, &prefs);

        assert_eq!(
            labels(&ranked),
            vec![
                "English - 720p",
                "Español - 720p",
                "English - 480p",
                "Dailymotion (Español)"
            ]
        );
    }

    #[test]
    fn test_empty_preferences_keep_input_order() {
        let input = vec![candidate(0, "b"), candidate(1, "a"), candidate(2, "c")];
        let ranked = PreferenceRanker::default().rank(input, &PreferenceConfig::new());
        assert_eq!(labels(&ranked), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_provider_quality_groups_and_orders_digits() {
        let input = vec![
            candidate(0, "Okru:360p"),
            candidate(1, "StreamTape"),
            candidate(2, "Okru:1080p"),
            candidate(3, "Amazon"),
            candidate(4, "Okru:720p"),
        ];

        let ranked =
            PreferenceRanker::new(RankingStrategy::ProviderQuality).rank(input, &PreferenceConfig::new());

        assert_eq!(
            labels(&ranked),
            vec!["Amazon", "Okru:1080p", "Okru:720p", "Okru:360p", "StreamTape"]
        );
    }

    #[test]
    fn test_exact_label_pulled_to_front() {
        let input = vec![
            candidate(0, "Amazon ES"),
            candidate(1, "Okru:720p"),
            candidate(2, "Amazon"),
        ];
        let prefs = PreferenceConfig::new().with_quality("Amazon");

        let ranked = PreferenceRanker::new(RankingStrategy::ProviderQuality).rank(input, &prefs);

        assert_eq!(labels(&ranked), vec!["Amazon", "Amazon ES", "Okru:720p"]);
    }

    #[test]
    fn test_unmatched_preference_is_harmless() {
        let input = vec![candidate(0, "Okru:720p"), candidate(1, "Sibnet")];
        let prefs = PreferenceConfig::new()
            .with_quality("not-a-quality???")
            .with_language("Klingon");

        let ranked = PreferenceRanker::default().rank(input, &prefs);
        assert_eq!(labels(&ranked), vec!["Okru:720p", "Sibnet"]);
    }

    #[test]
    fn test_digit_comparison_handles_long_runs() {
        assert_eq!(
            compare_digits(&significant_digits("x99999999999999999999999"), "1080"),
            Ordering::Greater
        );
        assert_eq!(significant_digits("no digits"), "0");
        assert_eq!(significant_digits("0720p"), "720");
    }

    fn arb_candidates() -> impl Strategy<Value = Vec<VideoCandidate>> {
        prop::collection::vec(
            prop::sample::select(vec![
                "Okru:1080p",
                "Okru:720p",
                "English - 720p",
                "Español - 480p",
                "Amazon",
                "Amazon ES",
                "StreamTape",
                "Sibnet",
            ]),
            0..12,
        )
        .prop_map(|labels| {
            labels
                .into_iter()
                .enumerate()
                .map(|(i, label)| candidate(i, label))
                .collect()
        })
    }

    fn arb_preferences() -> impl Strategy<Value = PreferenceConfig> {
        (
            prop::sample::select(vec!["", "720p", "Amazon", "Okru:1080p", "???"]),
            prop::sample::select(vec!["", "english", "ES", "Español"]),
        )
            .prop_map(|(quality, language)| {
                PreferenceConfig::new()
                    .with_quality(quality)
                    .with_language(language)
            })
    }

    fn arb_strategy() -> impl Strategy<Value = RankingStrategy> {
        prop_oneof![
            Just(RankingStrategy::PreferenceMatch),
            Just(RankingStrategy::ProviderQuality)
        ]
    }

    proptest! {
        #[test]
        fn test_rank_is_permutation(
            input in arb_candidates(),
            prefs in arb_preferences(),
            strategy in arb_strategy(),
        ) {
            let ranked = PreferenceRanker::new(strategy).rank(input.clone(), &prefs);

            let mut expected: Vec<String> = input.iter().map(|c| c.location().to_string()).collect();
            let mut actual: Vec<String> = ranked.iter().map(|c| c.location().to_string()).collect();
            expected.sort();
            actual.sort();
            prop_assert_eq!(expected, actual);
        }

        #[test]
        fn test_rank_is_idempotent(
            input in arb_candidates(),
            prefs in arb_preferences(),
            strategy in arb_strategy(),
        ) {
            let ranker = PreferenceRanker::new(strategy);
            let once = ranker.rank(input, &prefs);
            let twice = ranker.rank(once.clone(), &prefs);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn test_exact_quality_match_ranks_first(
            input in arb_candidates(),
            prefs in arb_preferences(),
            strategy in arb_strategy(),
        ) {
            let has_exact = input.iter().any(|c| c.label() == prefs.preferred_quality);
            let ranked = PreferenceRanker::new(strategy).rank(input, &prefs);

            if has_exact {
                prop_assert_eq!(ranked[0].label(), prefs.preferred_quality.as_str());
            }
        }
    }
}
