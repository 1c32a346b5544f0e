//! General-purpose multi-market price source backed by the Yahoo Finance
//! chart endpoint. Slower than the exchange-native source but covers
//! foreign listings; always the final fallback.

use crate::core::errors::SourceUnavailable;
use crate::core::quote::{PriceSource, Quote, SourceId};
use crate::core::symbol::{Market, Symbol};
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

pub struct YahooSource {
    base_url: String,
    client: reqwest::Client,
}

impl YahooSource {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("eqtrack/0.1")
            .timeout(request_timeout)
            .build()?;
        Ok(YahooSource {
            base_url: base_url.to_string(),
            client,
        })
    }

    /// Yahoo expects domestic tickers with an explicit `.NS` suffix.
    fn wire_symbol(symbol: &Symbol) -> String {
        match symbol.market() {
            Market::Domestic if !symbol.as_str().contains('.') => {
                format!("{symbol}.NS")
            }
            _ => symbol.as_str().to_string(),
        }
    }
}

// Fixed field mapping for the chart payload; only the meta block is used.
#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: ChartMeta,
}

#[derive(Deserialize, Debug)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: f64,
    #[serde(default, rename = "regularMarketPreviousClose")]
    regular_market_previous_close: Option<f64>,
    #[serde(default, rename = "chartPreviousClose")]
    chart_previous_close: Option<f64>,
}

impl ChartMeta {
    /// The session previous close when present, else the chart baseline.
    fn previous_close(&self) -> Option<f64> {
        self.regular_market_previous_close
            .or(self.chart_previous_close)
    }
}

#[async_trait]
impl PriceSource for YahooSource {
    fn id(&self) -> SourceId {
        SourceId::Yahoo
    }

    #[instrument(name = "YahooFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch(&self, symbol: &Symbol) -> Result<Quote, SourceUnavailable> {
        let wire_symbol = Self::wire_symbol(symbol);
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range=5d",
            self.base_url, wire_symbol
        );
        debug!("Requesting price data from {url}");

        let fail = |reason: String| SourceUnavailable::new(SourceId::Yahoo, reason);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| fail(format!("request error: {e}")))?;

        if !response.status().is_success() {
            return Err(fail(format!("HTTP {}", response.status())));
        }

        let data = response
            .json::<YahooChartResponse>()
            .await
            .map_err(|e| fail(format!("malformed payload: {e}")))?;

        let item = data
            .chart
            .result
            .and_then(|items| items.into_iter().next())
            .ok_or_else(|| fail("no chart data in response".to_string()))?;

        let price = item.meta.regular_market_price;
        if price <= 0.0 {
            return Err(fail(format!("non-positive price {price}")));
        }

        Ok(Quote::new(
            symbol.clone(),
            price,
            item.meta.previous_close(),
            SourceId::Yahoo,
        ))
    }
}
