//! Engine-specific shortcuts over [`Client::serp_search`].
//!
//! Each wrapper pins the engine on the given request and adds the
//! engine's own parameters; everything else on the request is sent as-is.

use crate::client::Client;
use crate::error::Result;
use crate::serp::{Engine, SerpRequest};
use serde_json::Value;

async fn run(client: &Client, request: SerpRequest, engine: Engine) -> Result<Value> {
    client.serp_search(&request.engine(engine)).await
}

/// Google verticals.
pub mod google {
    use super::*;

    pub async fn search(client: &Client, request: SerpRequest) -> Result<Value> {
        run(client, request, Engine::Google).await
    }

    pub async fn news(client: &Client, request: SerpRequest) -> Result<Value> {
        run(client, request, Engine::GoogleNews).await
    }

    pub async fn jobs(client: &Client, request: SerpRequest) -> Result<Value> {
        run(client, request, Engine::GoogleJobs).await
    }

    /// Shopping results, or a single product's offers when `product_id` is given.
    pub async fn shopping(
        client: &Client,
        request: SerpRequest,
        product_id: Option<&str>,
    ) -> Result<Value> {
        match product_id {
            Some(id) => run(client, request.param("product_id", id), Engine::GoogleProduct).await,
            None => run(client, request, Engine::GoogleShopping).await,
        }
    }

    /// Maps results, optionally centred on `coordinates` (`@lat,lng,zoom`).
    pub async fn maps(
        client: &Client,
        request: SerpRequest,
        coordinates: Option<&str>,
    ) -> Result<Value> {
        let request = match coordinates {
            Some(ll) => request.param("ll", ll),
            None => request,
        };
        run(client, request, Engine::GoogleMaps).await
    }

    /// Route and date selection of a flights search.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct FlightSearch {
        /// Departure airport code, e.g. `CDG`.
        pub departure_id: Option<String>,
        pub arrival_id: Option<String>,
        /// `YYYY-MM-DD`.
        pub outbound_date: Option<String>,
        pub return_date: Option<String>,
    }

    /// Flights; the query defaults to `flights` when the request has none.
    pub async fn flights(
        client: &Client,
        mut request: SerpRequest,
        flight: &FlightSearch,
    ) -> Result<Value> {
        if request.query.is_empty() {
            request.query = "flights".to_string();
        }
        let fields = [
            ("departure_id", &flight.departure_id),
            ("arrival_id", &flight.arrival_id),
            ("outbound_date", &flight.outbound_date),
            ("return_date", &flight.return_date),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                request = request.param(key, value.as_str());
            }
        }
        run(client, request, Engine::GoogleFlights).await
    }

    pub async fn patents(client: &Client, request: SerpRequest) -> Result<Value> {
        run(client, request, Engine::GooglePatents).await
    }

    pub async fn trends(client: &Client, request: SerpRequest) -> Result<Value> {
        run(client, request, Engine::GoogleTrends).await
    }
}

/// Bing verticals.
pub mod bing {
    use super::*;

    pub async fn search(client: &Client, request: SerpRequest) -> Result<Value> {
        run(client, request, Engine::Bing).await
    }

    pub async fn news(client: &Client, request: SerpRequest) -> Result<Value> {
        run(client, request, Engine::BingNews).await
    }
}
