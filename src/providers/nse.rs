//! Domestic-exchange-specialized price source using NSE's quote API with
//! its exchange-native field names. First in the fallback order for
//! domestic-classified symbols.

use crate::core::errors::SourceUnavailable;
use crate::core::quote::{PriceSource, Quote, SourceId};
use crate::core::symbol::Symbol;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

pub struct NseSource {
    base_url: String,
    client: reqwest::Client,
}

impl NseSource {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("eqtrack/0.1")
            .timeout(request_timeout)
            .build()?;
        Ok(NseSource {
            base_url: base_url.to_string(),
            client,
        })
    }
}

// Fixed field mapping for the exchange payload.
#[derive(Deserialize, Debug)]
struct NseQuoteResponse {
    #[serde(rename = "priceInfo")]
    price_info: NsePriceInfo,
}

#[derive(Deserialize, Debug)]
struct NsePriceInfo {
    #[serde(rename = "lastPrice")]
    last_price: f64,
    #[serde(default, rename = "previousClose")]
    previous_close: Option<f64>,
}

#[async_trait]
impl PriceSource for NseSource {
    fn id(&self) -> SourceId {
        SourceId::Nse
    }

    #[instrument(name = "NseFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch(&self, symbol: &Symbol) -> Result<Quote, SourceUnavailable> {
        // The exchange API takes the bare ticker without a suffix.
        let ticker = symbol.exchange_ticker();
        let url = format!("{}/api/quote-equity?symbol={}", self.base_url, ticker);
        debug!("Requesting price data from {url}");

        let fail = |reason: String| SourceUnavailable::new(SourceId::Nse, reason);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| fail(format!("request error: {e}")))?;

        if !response.status().is_success() {
            return Err(fail(format!("HTTP {}", response.status())));
        }

        let text = response
            .text()
            .await
            .map_err(|e| fail(format!("response read error: {e}")))?;
        if text.trim().is_empty() {
            return Err(fail("empty response".to_string()));
        }

        let data: NseQuoteResponse = serde_json::from_str(&text)
            .map_err(|e| fail(format!("malformed payload: {e}")))?;

        let price = data.price_info.last_price;
        if price <= 0.0 {
            return Err(fail(format!("non-positive price {price}")));
        }

        Ok(Quote::new(
            symbol.clone(),
            price,
            data.price_info.previous_close,
            SourceId::Nse,
        ))
    }
}
