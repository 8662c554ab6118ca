#![allow(dead_code)]

use std::time::Duration;
use thordata::{BaseUrls, Client, ClientConfig, RetryPolicy};
use wiremock::MockServer;

pub const SCRAPER_TOKEN: &str = "scraper-tok";
pub const PUBLIC_TOKEN: &str = "public-tok";
pub const PUBLIC_KEY: &str = "public-key";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Client pointed at `server` for every API family, with fast retries.
pub fn client(server: &MockServer, max_retries: u32) -> Client {
    init_logger();
    let config = ClientConfig::builder(SCRAPER_TOKEN)
        .public_credentials(PUBLIC_TOKEN, PUBLIC_KEY)
        .base_urls(BaseUrls::all(&server.uri()))
        .timeout(Duration::from_secs(5))
        .retry_policy(RetryPolicy::new(max_retries).with_base_delay(Duration::from_millis(10)))
        .build()
        .unwrap();
    Client::new(config).unwrap()
}

/// Client without the public token/key pair.
pub fn scraper_only_client(server: &MockServer) -> Client {
    init_logger();
    let config = ClientConfig::builder(SCRAPER_TOKEN)
        .base_urls(BaseUrls::all(&server.uri()))
        .build()
        .unwrap();
    Client::new(config).unwrap()
}
