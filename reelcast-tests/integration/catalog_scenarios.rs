//! Catalog listing, search, expansion and episode resolution against the
//! canned catalog API.

use std::collections::HashSet;

use reelcast_catalog::{CatalogError, CatalogOrdering, CatalogRecord, ReleaseStatus, title_to_slug};
use reelcast_core::PreferenceConfig;
use reelcast_core::fake::FakeTransport;

use crate::fixtures::{CATALOG, CATALOG_URL, catalog_source};

fn catalog_transport() -> FakeTransport {
    FakeTransport::new().with_page(CATALOG_URL, CATALOG)
}

#[tokio::test]
async fn test_popular_pages_are_disjoint_and_contiguous() {
    let source = catalog_source(&catalog_transport(), PreferenceConfig::default());
    let store = source.store();

    let mut seen = Vec::new();
    let mut last_has_next = Vec::new();
    for page in 1..=3 {
        let window = store.list(CatalogOrdering::Popular, page).await.unwrap();
        seen.extend(window.items.iter().map(|record| record.id));
        last_has_next.push(window.has_next_page);
    }

    assert_eq!(seen, vec![1, 2, 4, 3, 5]);
    assert_eq!(last_has_next, vec![true, true, false]);
    assert!(store.list(CatalogOrdering::Popular, 4).await.unwrap().items.is_empty());
}

#[tokio::test]
async fn test_latest_reverses_catalog_order() {
    let source = catalog_source(&catalog_transport(), PreferenceConfig::default());

    let first = source.store().list(CatalogOrdering::Latest, 1).await.unwrap();
    let ids: Vec<u64> = first.items.iter().map(|record| record.id).collect();

    assert_eq!(ids, vec![5, 4]);
    assert!(first.has_next_page);
}

#[tokio::test]
async fn test_listing_expands_seasons_and_tracks() {
    let source = catalog_source(&catalog_transport(), PreferenceConfig::default());

    let page = source.list_catalog(CatalogOrdering::Popular, 1).await.unwrap();

    let titles: Vec<&str> = page.items.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Frieren (VOSTFR)",
            "Frieren (VF)",
            "L'Attaque des Titans S1",
            "L'Attaque des Titans S2 (VOSTFR)",
            "L'Attaque des Titans S2 (VF)",
        ]
    );
    assert_eq!(page.items[0].url(), "/anime/sousou-no-frieren?lang=vo&s=1");
    assert_eq!(page.items[1].url(), "/anime/sousou-no-frieren?lang=vf&s=1");
    assert_eq!(page.items[0].genres, "Aventure, Fantasy");
    assert_eq!(page.items[0].status, ReleaseStatus::Ongoing);
    assert_eq!(page.items[2].status, ReleaseStatus::Completed);
    assert!(page.has_next_page);
}

#[tokio::test]
async fn test_single_track_record_is_unannotated() {
    let source = catalog_source(&catalog_transport(), PreferenceConfig::default());

    let page = source.list_catalog(CatalogOrdering::Popular, 3).await.unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].title, "Oshi no Ko");
    assert_eq!(page.items[0].url(), "/anime/oshi-no-ko?lang=vf&s=1");
    assert_eq!(page.items[0].status, ReleaseStatus::Upcoming);
    assert!(!page.has_next_page);
}

#[tokio::test]
async fn test_dashed_query_matches_slug_only() {
    let source = catalog_source(&catalog_transport(), PreferenceConfig::default());

    let found = source.search_catalog("rezero-kara-hajimeru", 1).await.unwrap();

    let urls: Vec<String> = found.items.iter().map(|e| e.url()).collect();
    assert_eq!(urls, vec!["/anime/rezero-kara-hajimeru-isekai-seikatsu?lang=vo&s=1"]);
}

#[tokio::test]
async fn test_search_matches_alternate_titles() {
    let source = catalog_source(&catalog_transport(), PreferenceConfig::default());

    let found = source.search_catalog("BEYOND JOURNEY", 1).await.unwrap();

    assert_eq!(found.items.len(), 2);
    assert!(found.items.iter().all(|e| e.listing.slug == "sousou-no-frieren"));
}

#[test]
fn test_fixture_slugs_do_not_collide() {
    let records: Vec<CatalogRecord> = serde_json::from_str(CATALOG).unwrap();

    let slugs: HashSet<String> = records
        .iter()
        .map(|record| title_to_slug(&record.original_title))
        .collect();

    assert_eq!(slugs.len(), records.len());
}

#[tokio::test]
async fn test_episode_list_per_track() {
    let source = catalog_source(&catalog_transport(), PreferenceConfig::default());

    let vo = source
        .episodes_for("/anime/sousou-no-frieren?lang=vo&s=1")
        .await
        .unwrap();
    let vf = source
        .episodes_for("/anime/sousou-no-frieren?lang=vf&s=1")
        .await
        .unwrap();

    let vo_numbers: Vec<usize> = vo.iter().map(|e| e.number).collect();
    assert_eq!(vo_numbers, vec![2, 1]);
    assert_eq!(vo[0].name, "Pas besoin de magie");
    assert_eq!(vf.len(), 1);
    assert_eq!(vf[0].reference.to_path(), "/anime/sousou-no-frieren?lang=vf&s=1&ep=1");
}

#[tokio::test]
async fn test_episode_videos_resolved_and_ranked() {
    let transport = catalog_transport()
        .with_page(
            "https://api.test/api/anime/1/0/0/vo/0",
            "https://video.sibnet.test/shell.php?videoid=42",
        )
        .with_page(
            "https://video.sibnet.test/shell.php?videoid=42",
            r#"<script>player.src([{src: "/v/hash/42.mp4", type: "video/mp4"}]);</script>"#,
        )
        .with_page("https://api.test/api/anime/1/0/0/vo/1", "https://cdn.franime.test/ep1.mp4");
    let source = catalog_source(&transport, PreferenceConfig::new().with_quality("FRAnime"));

    let videos = source
        .resolve_videos("/anime/sousou-no-frieren?lang=vo&s=1&ep=1")
        .await
        .unwrap();

    let labels: Vec<&str> = videos.iter().map(|v| v.label()).collect();
    assert_eq!(labels, vec!["FRAnime", "Sibnet"]);
    assert_eq!(
        videos[1].location().as_str(),
        "https://video.sibnet.test/v/hash/42.mp4"
    );
}

#[tokio::test]
async fn test_catalog_loaded_once_across_operations() {
    let transport = catalog_transport();
    let source = catalog_source(&transport, PreferenceConfig::default());

    source.list_catalog(CatalogOrdering::Popular, 1).await.unwrap();
    source.search_catalog("one piece", 1).await.unwrap();
    source.episodes_for("/anime/one-piece").await.unwrap();

    let loads = transport
        .requests()
        .iter()
        .filter(|url| url.as_str() == CATALOG_URL)
        .count();
    assert_eq!(loads, 1);
}

#[tokio::test]
async fn test_failed_load_and_bad_references() {
    let source = catalog_source(&FakeTransport::new(), PreferenceConfig::default());
    assert!(matches!(
        source.list_catalog(CatalogOrdering::Popular, 1).await,
        Err(CatalogError::LoadFailed { .. })
    ));

    let source = catalog_source(&catalog_transport(), PreferenceConfig::default());
    assert!(matches!(
        source.episodes_for("/anime/one-piece?lang=vo&s=4").await,
        Err(CatalogError::SeasonOutOfRange { season: 4, .. })
    ));
    assert!(matches!(
        source.resolve_videos("/anime/one-piece?lang=vo&s=1&ep=9").await,
        Err(CatalogError::EpisodeOutOfRange { episode: 9, .. })
    ));
    assert!(matches!(
        source.resolve_videos("/anime/one-piece?lang=jp").await,
        Err(CatalogError::MalformedReference { .. })
    ));
}
