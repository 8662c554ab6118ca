mod common;

use common::{client, SCRAPER_TOKEN};
use serde_json::json;
use thordata::engines::{bing, google};
use thordata::{Engine, ErrorKind, SerpFormat, SerpRequest, UnlockFormat, UnlockOutput, UnlockRequest};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn serp_search_returns_organic_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/request"))
        .and(header("token", SCRAPER_TOKEN))
        .and(header("authorization", format!("Bearer {SCRAPER_TOKEN}").as_str()))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("engine=google"))
        .and(body_string_contains("q=pizza"))
        .and(body_string_contains("json=1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": 200, "organic": [{"title": "Example"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, 0);
    let results = client
        .serp_search(&SerpRequest::new("pizza").engine(Engine::Google))
        .await
        .unwrap();

    let organic = results["organic"].as_array().unwrap();
    assert_eq!(organic.len(), 1);
    assert_eq!(organic[0]["title"], "Example");
}

#[tokio::test]
async fn serp_html_mode_wraps_the_page() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/request"))
        .and(body_string_contains("json=0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>results</html>"))
        .mount(&server)
        .await;

    let client = client(&server, 0);
    let page = client
        .serp_search(&SerpRequest::new("pizza").output_format(SerpFormat::Html))
        .await
        .unwrap();

    assert_eq!(page, json!({"html": "<html>results</html>"}));
}

#[tokio::test]
async fn serp_accepts_backtick_wrapped_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/request"))
        .respond_with(ResponseTemplate::new(200).set_body_string("`{\"code\":200,\"news\":[]}`\n"))
        .mount(&server)
        .await;

    let client = client(&server, 0);
    let results = client.serp_search(&SerpRequest::new("ai")).await.unwrap();
    assert_eq!(results, json!({"code": 200, "news": []}));
}

#[tokio::test]
async fn body_code_overrides_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/request"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": 401, "msg": "Unauthorized"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, 3);
    let err = client
        .serp_search(&SerpRequest::new("pizza"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(err.code(), Some(401));
    assert_eq!(err.status(), Some(200));
    assert_eq!(err.message(), "Unauthorized");
    assert_eq!(err.payload().unwrap()["msg"], "Unauthorized");
}

#[tokio::test]
async fn empty_query_fails_without_a_request() {
    let server = MockServer::start().await;
    let client = client(&server, 3);

    let err = client.serp_search(&SerpRequest::new("")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn engine_wrappers_pin_engine_and_extras() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/request"))
        .and(body_string_contains("engine=google_product"))
        .and(body_string_contains("product_id=123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 200, "product": {}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/request"))
        .and(body_string_contains("engine=google_flights"))
        .and(body_string_contains("q=flights"))
        .and(body_string_contains("departure_id=CDG"))
        .and(body_string_contains("arrival_id=AUS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 200, "flights": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/request"))
        .and(body_string_contains("engine=bing_news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 200, "news": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, 0);

    let product = google::shopping(&client, SerpRequest::new("headphones"), Some("123"))
        .await
        .unwrap();
    assert!(product.get("product").is_some());

    let flight = google::FlightSearch {
        departure_id: Some("CDG".into()),
        arrival_id: Some("AUS".into()),
        ..Default::default()
    };
    let flights = google::flights(&client, SerpRequest::default(), &flight).await.unwrap();
    assert!(flights.get("flights").is_some());

    let news = bing::news(&client, SerpRequest::new("rust")).await.unwrap();
    assert!(news.get("news").is_some());
}

#[tokio::test]
async fn concurrent_searches_share_one_client() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/request"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 200, "organic": []})))
        .expect(5)
        .mount(&server)
        .await;

    let client = client(&server, 0);
    let requests: Vec<_> = (0..5).map(|i| SerpRequest::new(format!("query {i}"))).collect();
    let results = futures::future::join_all(requests.iter().map(|r| client.serp_search(r))).await;

    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| r.is_ok()));
}

#[tokio::test]
async fn universal_scrape_unwraps_html() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/request"))
        .and(body_string_contains("url=https%3A%2F%2Fexample.com"))
        .and(body_string_contains("type=html"))
        .and(body_string_contains("js_render=False"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": 200, "html": "<html>...</html>"})),
        )
        .mount(&server)
        .await;

    let client = client(&server, 0);
    let output = client
        .universal_scrape(&UnlockRequest::new("https://example.com"))
        .await
        .unwrap();

    assert_eq!(output, UnlockOutput::Html("<html>...</html>".to_string()));
}

#[tokio::test]
async fn universal_scrape_returns_png_bytes() {
    let png = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a];
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/request"))
        .and(body_string_contains("type=png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(png.clone()),
        )
        .mount(&server)
        .await;

    let client = client(&server, 0);
    let output = client
        .universal_scrape(
            &UnlockRequest::new("https://example.com")
                .js_render(true)
                .output_format(UnlockFormat::Png),
        )
        .await
        .unwrap();

    assert_eq!(output, UnlockOutput::Png(png));
}

#[tokio::test]
async fn universal_png_error_envelope_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/request"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": 402, "msg": "no balance"})),
        )
        .mount(&server)
        .await;

    let client = client(&server, 0);
    let err = client
        .universal_scrape(&UnlockRequest::new("https://example.com").output_format(UnlockFormat::Png))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RateLimit);
}

#[test]
fn invalid_output_format_is_a_config_error() {
    let err = "pdf".parse::<UnlockFormat>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}
