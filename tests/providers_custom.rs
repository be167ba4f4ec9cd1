// tests/providers_custom.rs
//
// User-supplied endpoints: placeholder substitution, content-type routing
// and JSON shape recognition.

mod common;

use std::sync::Arc;

use common::{aggregator, FakeHttp, JSON, REDDIT_JSON, RSS, TEST_BROWSER_UA};
use pulse_news::ingest::request::CustomUrls;
use pulse_news::{FetchRequest, SourceTag, SourceToggles};

fn custom_request(templates: &[&str]) -> FetchRequest {
    FetchRequest {
        keywords: vec!["rate cut".to_string()],
        sources: SourceToggles::all(false),
        custom_urls: CustomUrls::List(templates.iter().map(|s| s.to_string()).collect()),
        ..Default::default()
    }
}

#[tokio::test]
async fn reddit_shaped_json_maps_like_native_reddit() {
    let fake = Arc::new(
        FakeHttp::new()
            .route("http://reddit.test/", 200, JSON, REDDIT_JSON)
            .route("https://mirror.example.test/", 200, JSON, REDDIT_JSON),
    );
    let agg = aggregator(&fake);

    let custom = agg
        .fetch_news(&custom_request(&["https://mirror.example.test/search?q={query}"]))
        .await;
    let native = agg
        .fetch_news(&FetchRequest {
            keywords: vec!["rate cut".to_string()],
            sources: SourceToggles {
                reddit: true,
                ..SourceToggles::all(false)
            },
            ..Default::default()
        })
        .await;

    assert_eq!(custom.sources_queried, 1);
    assert_eq!(custom.items.len(), native.items.len());
    for (c, n) in custom.items.iter().zip(&native.items) {
        assert_eq!(c.source, SourceTag::Custom);
        assert_eq!(c.site, "mirror.example.test");
        assert_eq!(c.title, n.title);
        assert_eq!(c.url, n.url);
        assert_eq!(c.published_at, n.published_at);
        assert_eq!(c.snippet, n.snippet);
        assert_eq!(c.author, n.author);
        assert_eq!(c.engagement, n.engagement);
    }
}

#[tokio::test]
async fn every_placeholder_is_replaced_and_headers_sent() {
    let fake = Arc::new(FakeHttp::new().route("https://api.example.test/", 200, JSON, "{}"));
    let agg = aggregator(&fake);

    agg.fetch_news(&custom_request(&[
        "https://api.example.test/v1?q={query}&title={query}",
    ]))
    .await;

    let calls = fake.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].url,
        "https://api.example.test/v1?q=rate%20cut&title=rate%20cut"
    );
    assert_eq!(calls[0].header("User-Agent"), Some(TEST_BROWSER_UA));
}

#[tokio::test]
async fn xml_content_type_goes_through_feed_parser() {
    let fake = Arc::new(
        FakeHttp::new()
            .route("https://feeds.example.test/", 200, "text/xml", common::MARKETWATCH_XML)
            .route("https://rss.example.test/", 200, RSS, common::PRNEWSWIRE_XML),
    );
    let agg = aggregator(&fake);

    let resp = agg
        .fetch_news(&custom_request(&[
            "https://feeds.example.test/rss?q={query}",
            "https://rss.example.test/{query}",
        ]))
        .await;

    assert_eq!(resp.sources_queried, 2);
    assert_eq!(resp.total_count, 3);
    assert!(resp.items.iter().all(|i| i.source == SourceTag::Custom));
    let mut sites: Vec<_> = resp.items.iter().map(|i| i.site.as_str()).collect();
    sites.sort();
    sites.dedup();
    assert_eq!(sites, vec!["feeds.example.test", "rss.example.test"]);
    // plain feed parsing: no creator field for custom XML
    assert!(resp.items.iter().all(|i| i.author.is_none()));
}

#[tokio::test]
async fn unsupported_or_unknown_payloads_yield_nothing() {
    let fake = Arc::new(
        FakeHttp::new()
            .route("https://html.example.test/", 200, "text/html", "<html><body>hi</body></html>")
            .route("https://json.example.test/", 200, JSON, r#"{"results":[{"title":"x"}]}"#)
            .route("https://bad.example.test/", 200, JSON, "{not json")
            .route("https://down.example.test/", 404, JSON, "{}"),
    );
    let agg = aggregator(&fake);

    let resp = agg
        .fetch_news(&custom_request(&[
            "https://html.example.test/?q={query}",
            "https://json.example.test/?q={query}",
            "https://bad.example.test/?q={query}",
            "https://down.example.test/?q={query}",
        ]))
        .await;

    assert_eq!(resp.sources_queried, 4);
    assert_eq!(resp.total_count, 0);
    assert_eq!(fake.calls().len(), 4);
}

#[tokio::test]
async fn invalid_template_fails_alone() {
    let fake = Arc::new(FakeHttp::new().route("https://ok.example.test/", 200, JSON, REDDIT_JSON));
    let agg = aggregator(&fake);

    let resp = agg
        .fetch_news(&custom_request(&[
            "not a url {query}",
            "https://ok.example.test/?q={query}",
        ]))
        .await;

    assert_eq!(resp.sources_queried, 2);
    assert_eq!(resp.total_count, 2);
    // the unparsable template never reaches the transport
    assert_eq!(fake.calls().len(), 1);
}

#[tokio::test]
async fn newline_delimited_templates_are_split_and_trimmed() {
    let fake = Arc::new(FakeHttp::new());
    let agg = aggregator(&fake);
    let req: FetchRequest = serde_json::from_str(
        r#"{
            "keywords": ["cpi"],
            "sources": {"googleNews": false, "reddit": false, "yahooFinance": false, "reuters": false,
                        "marketWatch": false, "prNewswire": false, "secEdgar": false},
            "customUrls": "  https://a.example.test/?q={query}\n\n https://b.example.test/{query}  \n"
        }"#,
    )
    .unwrap();

    let resp = agg.fetch_news(&req).await;

    assert_eq!(resp.sources_queried, 2);
    assert_eq!(
        fake.urls(),
        vec![
            "https://a.example.test/?q=cpi".to_string(),
            "https://b.example.test/cpi".to_string(),
        ]
    );
}

#[tokio::test]
async fn reddit_shaped_json_with_broken_children_keeps_good_posts() {
    let body = r#"{"data":{"children":[
        {"data":{"title":"Kept","permalink":"/r/investing/comments/k1/kept/"}},
        {"data":{"title":["not","a","string"],"url":"https://example.test/bad"}},
        {"kind":"more","data":null}
    ]}}"#;
    let fake = Arc::new(FakeHttp::new().route("https://mirror.example.test/", 200, JSON, body));
    let agg = aggregator(&fake);

    let resp = agg
        .fetch_news(&custom_request(&["https://mirror.example.test/?q={query}"]))
        .await;

    assert_eq!(resp.total_count, 1);
    assert_eq!(resp.items[0].title, "Kept");
    assert_eq!(resp.items[0].source, SourceTag::Custom);
}
