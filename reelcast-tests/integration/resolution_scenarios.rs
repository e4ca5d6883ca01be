//! End-to-end resolution of HTML episode pages.

use reelcast_core::fake::FakeTransport;
use reelcast_core::{HtmlDocument, PreferenceConfig};
use reelcast_extract::{ExtractContext, HostRegistry, ResolveError, SiteProfile};

use crate::fixtures::{
    STREAMTAPE_PAGE, VOE_PAGE, mirror_page, mirror_profile, okru_page, pipeline,
};

const EPISODE_URL: &str = "https://lmanime.test/frieren-episode-1";

#[tokio::test]
async fn test_disallowed_language_row_is_never_contacted() {
    let page = mirror_page(&[
        ("English - ok.ru", "https://ok.ru/videoembed/abc"),
        ("Spanish - dailymotion", "https://www.dailymotion.com/embed/video/xyz"),
    ]);
    let transport = FakeTransport::new()
        .with_page(EPISODE_URL, page)
        .with_page("https://ok.ru/videoembed/abc", okru_page());
    let preferences = PreferenceConfig::new().with_allowed_languages(["English"]);

    let videos = pipeline(&transport, preferences)
        .resolve_page(&mirror_profile(), EPISODE_URL)
        .await
        .unwrap();

    let labels: Vec<&str> = videos.iter().map(|v| v.label()).collect();
    assert_eq!(
        labels,
        vec![
            "English - Okru:1080p",
            "English - Okru:720p",
            "English - Okru:480p"
        ]
    );
    assert!(transport.was_requested("ok.ru/videoembed/abc"));
    assert!(!transport.was_requested("dailymotion"));
}

#[tokio::test]
async fn test_malformed_host_page_does_not_affect_siblings() {
    let page = mirror_page(&[
        ("English - streamtape", "https://streamtape.com/e/broken"),
        ("English - voe", "https://voe.sx/e/ok"),
        ("English - tape", "https://streamtape.com/e/fine"),
    ]);
    let transport = FakeTransport::new()
        .with_page(EPISODE_URL, page)
        .with_page("https://streamtape.com/e/broken", "<html><script>var nothing;</script></html>")
        .with_page("https://voe.sx/e/ok", VOE_PAGE)
        .with_page("https://streamtape.com/e/fine", STREAMTAPE_PAGE);

    let videos = pipeline(&transport, PreferenceConfig::default())
        .resolve_page(&mirror_profile(), EPISODE_URL)
        .await
        .unwrap();

    let mut labels: Vec<&str> = videos.iter().map(|v| v.label()).collect();
    labels.sort_unstable();
    assert_eq!(labels, vec!["English - StreamTape", "English - Voe"]);
    assert!(transport.was_requested("streamtape.com/e/broken"));
}

#[tokio::test]
async fn test_extractor_on_missing_script_yields_nothing() {
    let transport = FakeTransport::new()
        .with_page("https://streamtape.com/e/broken", "<html></html>")
        .with_page("https://voe.sx/e/ok", VOE_PAGE);
    let registry = HostRegistry::with_defaults();
    let context = ExtractContext::default();

    let broken = registry
        .resolve("https://streamtape.com/e/broken", &transport, &context)
        .await;
    let sibling = registry.resolve("https://voe.sx/e/ok", &transport, &context).await;

    assert!(broken.is_empty());
    assert_eq!(sibling.len(), 1);
    assert_eq!(
        sibling[0].location().as_str(),
        "https://delivery.voe.test/ep1/master.m3u8"
    );
}

#[tokio::test]
async fn test_unreachable_episode_page_is_an_error() {
    let transport = FakeTransport::new().with_status(EPISODE_URL, 503);

    let result = pipeline(&transport, PreferenceConfig::default())
        .resolve_page(&mirror_profile(), EPISODE_URL)
        .await;

    assert!(matches!(result, Err(ResolveError::PageFetch(_))));
}

#[tokio::test]
async fn test_page_without_embeds_is_reported() {
    let transport = FakeTransport::new().with_page(EPISODE_URL, mirror_page(&[]));

    let result = pipeline(&transport, PreferenceConfig::default())
        .resolve_page(&mirror_profile(), EPISODE_URL)
        .await;

    assert!(matches!(result, Err(ResolveError::NoEmbedsFound { .. })));
}

#[tokio::test]
async fn test_script_array_site_with_redirect_pages() {
    let episode = HtmlDocument::new(
        "https://www.animefenix.tv/ver/frieren-1",
        "<html><script>var tabsArray = new Array();\n\
         tabsArray['1'] = \"<iframe src='https://www.animefenix.tv/redirect.php?player=2&amp;code=amz' frameborder='0'>\";\n\
         tabsArray['2'] = \"<iframe src='https://www.animefenix.tv/redirect.php?player=6&amp;code=tape' frameborder='0'>\";\n\
         tabsArray['3'] = \"<iframe src='https://www.animefenix.tv/redirect.php?player=9&amp;code=gone' frameborder='0'>\";\n\
         tabsArray['4'] = \"<iframe src='https://www.animefenix.tv/redirect.php?player=4&amp;code=blank' frameborder='0'>\";\n\
         </script></html>",
    );
    let transport = FakeTransport::new()
        .with_page(
            "https://www.animefenix.tv/redirect.php?player=2&code=amz",
            r#"<html><script>var frame = '<iframe src="https://www.animefenix.tv/stream/amz.php?v=abc&ext=es">';</script></html>"#,
        )
        .with_page(
            "https://www.animefenix.tv/stream/amz.php?v=abc&ext=es",
            r#"<script>player.setup({ sources: [{"file":"https:\/\/amz.cdn.test\/ep1.mp4","type":"mp4"}] });</script>"#,
        )
        .with_page(
            "https://www.animefenix.tv/redirect.php?player=6&code=tape",
            r#"<html><script>var frame = '<iframe src="https://streamtape.com/e/abc">';</script></html>"#,
        )
        .with_page("https://streamtape.com/e/abc", STREAMTAPE_PAGE)
        .with_status("https://www.animefenix.tv/redirect.php?player=9&code=gone", 404)
        .with_page(
            "https://www.animefenix.tv/redirect.php?player=4&code=blank",
            "<html><script>var frame = '';</script></html>",
        );
    let preferences = PreferenceConfig::new().with_quality("StreamTape");

    let videos = pipeline(&transport, preferences)
        .resolve_videos(&SiteProfile::animefenix(), &episode)
        .await
        .unwrap();

    let labels: Vec<&str> = videos.iter().map(|v| v.label()).collect();
    assert_eq!(labels, vec!["StreamTape", "Amazon ES"]);
    assert_eq!(videos[1].location().as_str(), "https://amz.cdn.test/ep1.mp4");
    assert!(transport.was_requested("code=gone"));
    assert!(transport.was_requested("code=blank"));
}

const OKRU_FRAME: &str =
    "PGlmcmFtZSBzcmM9Imh0dHBzOi8vb2sucnUvdmlkZW9lbWJlZC83NyIgZnJhbWVib3JkZXI9IjAiPjwvaWZyYW1lPg==";
const DAILY_EN_FRAME: &str =
    "PGlmcmFtZSBzcmM9Imh0dHBzOi8vd3d3LmRhaWx5bW90aW9uLmNvbS9lbWJlZC92aWRlby94OHEiPjwvaWZyYW1lPg==";
const DAILY_ES_FRAME: &str =
    "PGlmcmFtZSBzcmM9Imh0dHBzOi8vd3d3LmRhaWx5bW90aW9uLmNvbS9lbWJlZC92aWRlby94OXoiPjwvaWZyYW1lPg==";

#[tokio::test]
async fn test_lmanime_encoded_mirrors() {
    let episode_url = "https://lmanime.com/frieren-episode-1";
    let page = mirror_page(&[
        ("Select Video Server", ""),
        ("English - ok.ru", OKRU_FRAME),
        ("English - dailymotion", DAILY_EN_FRAME),
        ("Español - dailymotion", DAILY_ES_FRAME),
    ]);
    let transport = FakeTransport::new()
        .with_page(episode_url, page)
        .with_page("https://ok.ru/videoembed/77", okru_page())
        .with_page(
            "https://www.dailymotion.com/player/metadata/video/x8q",
            r#"{"qualities":{"720":[{"url":"https://cdn.dm.test/x8q/720.mp4"}]}}"#,
        );
    let preferences = PreferenceConfig::new().with_allowed_languages(["English"]);

    let videos = pipeline(&transport, preferences)
        .resolve_page(&SiteProfile::lmanime(), episode_url)
        .await
        .unwrap();

    let mut labels: Vec<&str> = videos.iter().map(|v| v.label()).collect();
    labels.sort_unstable();
    assert_eq!(
        labels,
        vec![
            "Dailymotion (English):720p",
            "English - Okru:1080p",
            "English - Okru:480p",
            "English - Okru:720p",
        ]
    );
    assert!(!transport.was_requested("x9z"));
    let headers = transport.headers_sent_to("https://ok.ru/videoembed/77").unwrap();
    assert_eq!(headers["Referer"], "https://lmanime.com/");
}
