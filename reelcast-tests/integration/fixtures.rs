//! Canned pages and catalog payloads shared by the integration tests.

use std::sync::Arc;

use reelcast_catalog::{CatalogSource, CatalogSourceParts};
use reelcast_core::fake::FakeTransport;
use reelcast_core::{PreferenceConfig, ReelcastConfig, StaticPreferences};
use reelcast_extract::{EmbedDiscovery, HostRegistry, ResolutionPipeline, SiteProfile};

pub const SITE: &str = "https://lmanime.test";
pub const CATALOG_URL: &str = "https://api.test/api/animes/";

pub const VOE_PAGE: &str =
    "<html><script>var sources = {'hls': 'https://delivery.voe.test/ep1/master.m3u8'};</script></html>";

pub const STREAMTAPE_PAGE: &str = "<html><script>\
    document.getElementById('norobotlink').innerHTML = '//streamtape.com/get_video?id=abc&expires=1' + ('xcd&token=XyZ').substring(1);\
    </script></html>";

/// An Ok.ru embed page with three named renditions.
pub fn okru_page() -> String {
    let metadata = serde_json::json!({
        "videos": [
            {"name": "sd", "url": "https://vd.okcdn.test/?id=1&type=0"},
            {"name": "hd", "url": "https://vd.okcdn.test/?id=1&type=3"},
            {"name": "full", "url": "https://vd.okcdn.test/?id=1&type=5"}
        ]
    });
    let options = serde_json::json!({"flashvars": {"metadata": metadata.to_string()}}).to_string();
    let attribute = options.replace('&', "&amp;").replace('"', "&quot;");
    format!(r#"<html><body><div data-module="OKVideo" data-options="{attribute}"></div></body></html>"#)
}

/// An episode page listing one `<option>` per server row.
pub fn mirror_page(rows: &[(&str, &str)]) -> String {
    let options: String = rows
        .iter()
        .map(|(text, link)| format!(r#"<option value="{link}">{text}</option>"#))
        .collect();
    format!(r#"<html><body><select class="mirror">{options}</select></body></html>"#)
}

pub fn mirror_profile() -> SiteProfile {
    SiteProfile::new(
        "LMAnime",
        SITE,
        EmbedDiscovery::server_list("select.mirror > option", "value"),
    )
    .with_language_prefix()
}

pub fn pipeline(transport: &FakeTransport, preferences: PreferenceConfig) -> ResolutionPipeline {
    ResolutionPipeline::new(
        Arc::new(transport.clone()),
        Arc::new(HostRegistry::with_defaults()),
        Arc::new(StaticPreferences::new(preferences)),
        ReelcastConfig::for_testing().resolution,
    )
}

/// Five records; ids 2 and 4 share a rating so their catalog order decides.
pub const CATALOG: &str = r#"[
    {"id": 1, "title": "Frieren", "titleO": "Sousou no Frieren", "note": 9.1, "status": "EN COURS",
     "titles": {"en": "Frieren: Beyond Journey's End"},
     "themes": ["Aventure", "Fantasy"],
     "saisons": [{"episodes": [
        {"title": "La fin du voyage", "lang": {"vo": {"players": ["sibnet", "franime_myvi"]}, "vf": {"players": ["sendvid"]}}},
        {"title": "Pas besoin de magie", "lang": {"vo": {"players": ["sibnet"]}, "vf": {"players": []}}}
     ]}]},
    {"id": 2, "title": "L'Attaque des Titans", "titleO": "Shingeki no Kyojin", "note": 8.9, "status": "TERMINÉ",
     "saisons": [
        {"episodes": [{"title": "À toi", "lang": {"vo": {"players": ["sibnet"]}, "vf": {"players": []}}}]},
        {"episodes": [{"title": "La bête", "lang": {"vo": {"players": ["sibnet"]}, "vf": {"players": ["myvi"]}}}]}
     ]},
    {"id": 3, "title": "Re:Zero", "titleO": "Re:Zero kara Hajimeru Isekai Seikatsu", "note": 8.2,
     "saisons": [{"episodes": [{"title": "Le début", "lang": {"vo": {"players": ["sibnet"]}}}]}]},
    {"id": 4, "title": "One Piece", "titleO": "One Piece", "note": 8.9, "status": "EN COURS",
     "saisons": [{"episodes": [{"title": "Je suis Luffy", "lang": {"vo": {"players": ["sibnet"]}}}]}]},
    {"id": 5, "title": "Oshi no Ko", "titleO": "[Oshi no Ko]", "note": 7.5, "status": "À VENIR",
     "saisons": [{"episodes": [{"title": "Mère et enfants", "lang": {"vf": {"players": ["sendvid"]}}}]}]}
]"#;

/// A catalog source over `CATALOG` paging two records at a time.
pub fn catalog_source(transport: &FakeTransport, preferences: PreferenceConfig) -> CatalogSource {
    let mut config = ReelcastConfig::for_testing();
    config.catalog.page_size = 2;

    CatalogSource::new(CatalogSourceParts {
        transport: Arc::new(transport.clone()),
        registry: Arc::new(HostRegistry::with_defaults()),
        preferences: Arc::new(StaticPreferences::new(preferences)),
        catalog: config.catalog,
        resolution: config.resolution,
    })
}
