//! Search, unlock and proxy example for thordata.
//!
//! Needs `THORDATA_SCRAPER_TOKEN`; the proxy part runs when
//! `THORDATA_RESIDENTIAL_USERNAME`/`_PASSWORD` are set too.

use thordata::engines::google;
use thordata::{
    proxy_credentials_from_env, proxy_scheme_from_env, Client, ProxyProduct, ProxyTarget,
    SerpRequest, UnlockRequest,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let client = Client::from_env()?;

    println!("Searching...");
    let results = google::search(&client, SerpRequest::new("rust async runtime").country("us").num(5)).await?;
    let organic = results
        .get("organic")
        .and_then(|o| o.as_array())
        .map(Vec::len)
        .unwrap_or(0);
    println!("Organic results: {}", organic);

    println!("Unlocking...");
    let page = client
        .universal_scrape(&UnlockRequest::new("https://example.com"))
        .await?;
    if let Some(html) = page.as_html() {
        println!("HTML length: {}", html.len());
    }

    match proxy_credentials_from_env(ProxyProduct::Residential) {
        Ok(credentials) => {
            let target = ProxyTarget::residential(credentials)
                .country("us")
                .session("demo1")
                .sticky(10)?
                .scheme(proxy_scheme_from_env()?);
            let target = ProxyTarget::from(target);
            println!("Sending request through {}...", target);
            let body = client.proxy_get("https://ipinfo.thordata.com", &target).await?;
            println!("Response: {:?}", body);
        }
        Err(e) => println!("Skipping proxy request: {}", e),
    }

    Ok(())
}
