use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, instrument};

use crate::core::config::NbpProviderConfig;
use crate::core::{ExchangeRateTable, FetchError, RatesProvider};

/// Table "A" holds the mid rates of the commonly traded currencies.
const TABLE: &str = "A";

pub struct NbpProvider {
    base_url: String,
    user_agent: String,
}

impl NbpProvider {
    pub fn new(base_url: &str) -> Self {
        NbpProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: crate::core::config::DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn from_config(config: &NbpProviderConfig) -> Self {
        NbpProvider {
            user_agent: config.user_agent.clone(),
            ..Self::new(&config.base_url)
        }
    }

    pub fn table_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/api/exchangerates/tables/{}/{}/?format=json",
            self.base_url,
            TABLE,
            date.format("%Y-%m-%d")
        )
    }
}

#[async_trait]
impl RatesProvider for NbpProvider {
    #[instrument(name = "NbpTableFetch", skip(self), fields(date = %date))]
    async fn fetch_table(&self, date: NaiveDate) -> Result<Option<ExchangeRateTable>, FetchError> {
        let url = self.table_url(date);
        debug!("Requesting rate table from {}", url);

        let client = reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .build()?;
        let response = client.get(&url).send().await?;

        debug!(status = %response.status(), "Received NBP response");
        if !response.status().is_success() {
            return Err(FetchError::NoRatesForDate {
                status: response.status().as_u16(),
            });
        }

        let text = response.text().await?;
        let tables: Vec<ExchangeRateTable> = serde_json::from_str(&text)
            .map_err(|e| FetchError::request(format!("Failed to parse rate table: {e}")))?;

        let Some(table) = tables.into_iter().next() else {
            debug!("Response held no table");
            return Ok(None);
        };
        table.validate()?;

        debug!(
            no = %table.no,
            effective_date = %table.effective_date,
            rates = table.rates.len(),
            "Parsed rate table"
        );
        Ok(Some(table))
    }
}
