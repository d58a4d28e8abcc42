use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::data_platform::DataPlatformClient;
use crate::domain::transfers::failed_transfer::ReservationData;

pub struct ReqwestDataPlatformClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ReqwestDataPlatformClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build http client: {e}"))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl DataPlatformClient for ReqwestDataPlatformClient {
    async fn send(&self, data: &ReservationData) -> anyhow::Result<()> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(data)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("request failed: {e}"))?;
        if !resp.status().is_success() {
            anyhow::bail!("upstream returned status {}", resp.status());
        }
        Ok(())
    }
}
