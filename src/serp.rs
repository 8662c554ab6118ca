//! Search engine results requests.

use crate::error::{Error, Result};
use crate::payload::{flag, FormPayload};
use std::collections::BTreeMap;
use std::fmt;

/// Search engines accepted by the SERP API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Engine {
    /// Google web search.
    #[default]
    Google,
    GoogleSearch,
    GoogleAiMode,
    GoogleWeb,
    GoogleNews,
    GoogleShopping,
    /// Google Shopping for a single product, selected by `product_id`.
    GoogleProduct,
    GoogleLocal,
    GoogleImages,
    GoogleVideos,
    GoogleLens,
    GoogleMaps,
    GoogleJobs,
    GoogleFlights,
    GoogleHotels,
    GooglePlay,
    GoogleScholar,
    GooglePatents,
    GoogleTrends,
    GoogleFinance,
    Bing,
    BingSearch,
    BingImages,
    BingVideos,
    BingNews,
    BingMaps,
    BingShopping,
    Yandex,
    YandexSearch,
    DuckDuckGo,
    DuckDuckGoSearch,
    /// An engine name not modelled above, sent verbatim.
    Custom(String),
}

impl Engine {
    /// Wire name of the engine.
    pub fn as_str(&self) -> &str {
        match self {
            Engine::Google => "google",
            Engine::GoogleSearch => "google_search",
            Engine::GoogleAiMode => "google_ai_mode",
            Engine::GoogleWeb => "google_web",
            Engine::GoogleNews => "google_news",
            Engine::GoogleShopping => "google_shopping",
            Engine::GoogleProduct => "google_product",
            Engine::GoogleLocal => "google_local",
            Engine::GoogleImages => "google_images",
            Engine::GoogleVideos => "google_videos",
            Engine::GoogleLens => "google_lens",
            Engine::GoogleMaps => "google_maps",
            Engine::GoogleJobs => "google_jobs",
            Engine::GoogleFlights => "google_flights",
            Engine::GoogleHotels => "google_hotels",
            Engine::GooglePlay => "google_play",
            Engine::GoogleScholar => "google_scholar",
            Engine::GooglePatents => "google_patents",
            Engine::GoogleTrends => "google_trends",
            Engine::GoogleFinance => "google_finance",
            Engine::Bing => "bing",
            Engine::BingSearch => "bing_search",
            Engine::BingImages => "bing_images",
            Engine::BingVideos => "bing_videos",
            Engine::BingNews => "bing_news",
            Engine::BingMaps => "bing_maps",
            Engine::BingShopping => "bing_shopping",
            Engine::Yandex => "yandex",
            Engine::YandexSearch => "yandex_search",
            Engine::DuckDuckGo => "duckduckgo",
            Engine::DuckDuckGoSearch => "duckduckgo_search",
            Engine::Custom(name) => name,
        }
    }

    /// Form field that carries the query for this engine.
    pub fn query_field(&self) -> &'static str {
        if self.as_str().eq_ignore_ascii_case("yandex") {
            "text"
        } else {
            "q"
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Engine {
    fn from(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "google" => Engine::Google,
            "google_search" => Engine::GoogleSearch,
            "google_ai_mode" => Engine::GoogleAiMode,
            "google_web" => Engine::GoogleWeb,
            "google_news" => Engine::GoogleNews,
            "google_shopping" => Engine::GoogleShopping,
            "google_product" => Engine::GoogleProduct,
            "google_local" => Engine::GoogleLocal,
            "google_images" => Engine::GoogleImages,
            "google_videos" => Engine::GoogleVideos,
            "google_lens" => Engine::GoogleLens,
            "google_maps" => Engine::GoogleMaps,
            "google_jobs" => Engine::GoogleJobs,
            "google_flights" => Engine::GoogleFlights,
            "google_hotels" => Engine::GoogleHotels,
            "google_play" => Engine::GooglePlay,
            "google_scholar" => Engine::GoogleScholar,
            "google_patents" => Engine::GooglePatents,
            "google_trends" => Engine::GoogleTrends,
            "google_finance" => Engine::GoogleFinance,
            "bing" => Engine::Bing,
            "bing_search" => Engine::BingSearch,
            "bing_images" => Engine::BingImages,
            "bing_videos" => Engine::BingVideos,
            "bing_news" => Engine::BingNews,
            "bing_maps" => Engine::BingMaps,
            "bing_shopping" => Engine::BingShopping,
            "yandex" => Engine::Yandex,
            "yandex_search" => Engine::YandexSearch,
            "duckduckgo" => Engine::DuckDuckGo,
            "duckduckgo_search" => Engine::DuckDuckGoSearch,
            _ => Engine::Custom(lower),
        }
    }
}

/// Result category codes (`tbm`) keyed by their readable names.
const VERTICALS: &[(&str, &str)] = &[
    ("images", "isch"),
    ("shopping", "shop"),
    ("news", "nws"),
    ("videos", "vid"),
    ("isch", "isch"),
    ("shop", "shop"),
    ("nws", "nws"),
    ("vid", "vid"),
];

/// Provider vertical code for a search type; unknown types pass through unchanged.
pub fn vertical_code(search_type: &str) -> String {
    let lower = search_type.to_lowercase();
    VERTICALS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, code)| (*code).to_string())
        .unwrap_or_else(|| search_type.to_string())
}

/// Response format of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SerpFormat {
    /// Structured results.
    #[default]
    Json,
    /// The raw results page, returned as `{"html": ...}`.
    Html,
}

/// A search request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerpRequest {
    /// Search terms.
    pub query: String,
    /// Engine, which also decides the query field name.
    pub engine: Engine,
    /// Number of results.
    pub num: Option<u32>,
    /// Result offset.
    pub start: Option<u32>,
    /// Country code, sent as `gl`.
    pub country: Option<String>,
    /// Language code, sent as `hl`.
    pub language: Option<String>,
    /// Result category, sent as `tbm` after translation.
    pub search_type: Option<String>,
    /// Device to emulate (desktop, mobile, tablet).
    pub device: Option<String>,
    /// Render JavaScript before extracting results.
    pub render_js: Option<bool>,
    /// Bypass the provider cache.
    pub no_cache: Option<bool>,
    /// Response format.
    pub output_format: SerpFormat,
    /// Provider parameters not modelled above, appended after the typed fields.
    pub additional_parameters: BTreeMap<String, String>,
}

impl SerpRequest {
    /// A Google search for `query`.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn engine(mut self, engine: impl Into<Engine>) -> Self {
        self.engine = engine.into();
        self
    }

    pub fn num(mut self, num: u32) -> Self {
        self.num = Some(num);
        self
    }

    pub fn start(mut self, start: u32) -> Self {
        self.start = Some(start);
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn search_type(mut self, search_type: impl Into<String>) -> Self {
        self.search_type = Some(search_type.into());
        self
    }

    pub fn device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn render_js(mut self, render_js: bool) -> Self {
        self.render_js = Some(render_js);
        self
    }

    pub fn no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = Some(no_cache);
        self
    }

    pub fn output_format(mut self, format: SerpFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Add a provider parameter that has no typed field.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_parameters.insert(key.into(), value.into());
        self
    }

    /// Encode into the form payload of the SERP endpoint.
    pub fn to_payload(&self) -> Result<FormPayload> {
        if self.query.is_empty() {
            return Err(Error::config("query is required for a search"));
        }

        let mut payload = FormPayload::new();
        payload.set("engine", self.engine.as_str().to_lowercase());
        payload.set(
            "json",
            match self.output_format {
                SerpFormat::Json => "1",
                SerpFormat::Html => "0",
            },
        );
        payload.set(self.engine.query_field(), self.query.as_str());

        payload.set_opt("num", self.num.map(|n| n.to_string()));
        payload.set_opt("start", self.start.map(|n| n.to_string()));
        payload.set_opt("gl", self.country.as_deref().map(str::to_lowercase));
        payload.set_opt("hl", self.language.as_deref().map(str::to_lowercase));
        payload.set_opt("tbm", self.search_type.as_deref().map(vertical_code));
        payload.set_opt("device", self.device.as_deref().map(str::to_lowercase));
        payload.set_opt("render_js", self.render_js.map(flag));
        payload.set_opt("no_cache", self.no_cache.map(flag));

        payload.extend_passthrough(&self.additional_parameters);
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn minimal_google_search() {
        let payload = SerpRequest::new("pizza").to_payload().unwrap();
        assert_eq!(payload.get("engine"), Some("google"));
        assert_eq!(payload.get("q"), Some("pizza"));
        assert_eq!(payload.get("json"), Some("1"));
        assert_eq!(payload.len(), 3);
    }

    #[test]
    fn yandex_uses_text_field() {
        let payload = SerpRequest::new("погода")
            .engine(Engine::Yandex)
            .to_payload()
            .unwrap();
        assert_eq!(payload.get("text"), Some("погода"));
        assert!(!payload.contains("q"));

        let payload = SerpRequest::new("x").engine("yandex_search").to_payload().unwrap();
        assert_eq!(payload.get("q"), Some("x"));
    }

    #[test]
    fn typed_fields_are_normalized() {
        let payload = SerpRequest::new("pizza")
            .num(10)
            .start(20)
            .country("US")
            .language("EN")
            .device("Mobile")
            .render_js(true)
            .no_cache(false)
            .output_format(SerpFormat::Html)
            .to_payload()
            .unwrap();

        assert_eq!(payload.get("num"), Some("10"));
        assert_eq!(payload.get("start"), Some("20"));
        assert_eq!(payload.get("gl"), Some("us"));
        assert_eq!(payload.get("hl"), Some("en"));
        assert_eq!(payload.get("device"), Some("mobile"));
        assert_eq!(payload.get("render_js"), Some("True"));
        assert_eq!(payload.get("no_cache"), Some("False"));
        assert_eq!(payload.get("json"), Some("0"));
    }

    #[test]
    fn vertical_table_and_identity_fallback() {
        for (name, code) in VERTICALS {
            assert_eq!(vertical_code(name), *code);
        }
        assert_eq!(vertical_code("News"), "nws");
        assert_eq!(vertical_code("lcl"), "lcl");
        assert_eq!(vertical_code("Books"), "Books");
    }

    #[test]
    fn passthrough_extends_payload() {
        let payload = SerpRequest::new("pizza")
            .param("safe", "active")
            .param("engine", "bing")
            .to_payload()
            .unwrap();
        assert_eq!(payload.get("safe"), Some("active"));
        assert_eq!(payload.get("engine"), Some("google"));
    }

    #[test]
    fn empty_query_is_config_error() {
        let err = SerpRequest::new("").to_payload().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn engine_names_round_trip() {
        assert_eq!(Engine::from("GOOGLE_NEWS"), Engine::GoogleNews);
        assert_eq!(Engine::from("naver"), Engine::Custom("naver".into()));
        assert_eq!(Engine::DuckDuckGo.to_string(), "duckduckgo");
    }
}
