use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use waveportal_core::api::{
    FinalizedWrite, GatewayLedgerConfig, LedgerError, LiveFeed, PendingWrite, RawWave, WaveLedger,
    NEW_WAVE_EVENT,
};

use super::http_client::{GatewayHttpError, HttpClient, SendWavePayload, TxStatus};

/// Ledger client speaking to a wave gateway over HTTP.
///
/// Finalization and the live feed are both driven by polling.
pub struct GatewayLedger {
    client: HttpClient,
    signer: String,
    poll_interval: Duration,
}

impl GatewayLedger {
    pub fn new(cfg: &GatewayLedgerConfig, signer: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            client: HttpClient::new(cfg.base_url.clone(), cfg.api_key.clone(), cfg.timeout_ms)?,
            signer: signer.into(),
            poll_interval: Duration::from_millis(cfg.poll_interval_ms.max(1)),
        })
    }
}

fn to_ledger_error(err: anyhow::Error) -> LedgerError {
    let Some(http) = err.downcast_ref::<GatewayHttpError>() else {
        return LedgerError::Transport(err.to_string());
    };
    match http {
        GatewayHttpError::Status {
            status: 401 | 403, ..
        } => LedgerError::Unauthorized(http.to_string()),
        GatewayHttpError::Status { status, .. } if (400..500).contains(status) => {
            LedgerError::Rejected {
                reason: http.reason().map(str::to_string),
            }
        }
        GatewayHttpError::Unreachable { .. } => LedgerError::Unavailable(http.to_string()),
        GatewayHttpError::Decode { .. } => LedgerError::Decode(http.to_string()),
        GatewayHttpError::Status { .. } | GatewayHttpError::Transport { .. } => {
            LedgerError::Transport(http.to_string())
        }
    }
}

async fn await_receipt(
    client: HttpClient,
    tx_hash: String,
    poll_interval: Duration,
) -> Result<FinalizedWrite, LedgerError> {
    loop {
        let receipt = client.tx_receipt(&tx_hash).await.map_err(to_ledger_error)?;
        match receipt.status {
            TxStatus::Pending => tokio::time::sleep(poll_interval).await,
            TxStatus::Mined => {
                return Ok(FinalizedWrite {
                    reference: receipt.tx_hash,
                })
            }
            TxStatus::Failed => {
                return Err(LedgerError::Rejected {
                    reason: receipt.reason,
                })
            }
        }
    }
}

struct FeedCursor {
    client: HttpClient,
    offset: u64,
    buffered: VecDeque<RawWave>,
    poll_interval: Duration,
}

impl FeedCursor {
    async fn next(mut self) -> Option<(RawWave, Self)> {
        loop {
            if let Some(wave) = self.buffered.pop_front() {
                return Some((wave, self));
            }
            tokio::time::sleep(self.poll_interval).await;
            match self.client.list_waves(self.offset).await {
                Ok(waves) => {
                    self.offset += waves.len() as u64;
                    self.buffered.extend(waves);
                }
                Err(err) => {
                    tracing::warn!(target: "waveportal.gateway", error = %err, "Live feed poll failed")
                }
            }
        }
    }
}

#[async_trait]
impl WaveLedger for GatewayLedger {
    fn name(&self) -> &str {
        "gateway"
    }

    async fn read_all_entries(&self) -> Result<Vec<RawWave>, LedgerError> {
        self.client.list_waves(0).await.map_err(to_ledger_error)
    }

    async fn write_entry(
        &self,
        message: &str,
        resource_ceiling: u64,
    ) -> Result<PendingWrite, LedgerError> {
        let payload = SendWavePayload {
            from: self.signer.clone(),
            message: message.to_string(),
            gas_limit: resource_ceiling,
        };
        let sent = self
            .client
            .send_wave(&payload)
            .await
            .map_err(to_ledger_error)?;

        let finalization =
            await_receipt(self.client.clone(), sent.tx_hash.clone(), self.poll_interval).boxed();
        Ok(PendingWrite::new(sent.tx_hash, finalization))
    }

    async fn read_entry_count(&self) -> Result<u64, LedgerError> {
        self.client.wave_count().await.map_err(to_ledger_error)
    }

    async fn subscribe(&self, event_name: &str) -> Result<LiveFeed, LedgerError> {
        if event_name != NEW_WAVE_EVENT {
            return Err(LedgerError::UnknownEvent(event_name.to_string()));
        }
        let offset = self.client.wave_count().await.map_err(to_ledger_error)?;
        tracing::debug!(target: "waveportal.gateway", offset, "Polling live feed");

        let cursor = FeedCursor {
            client: self.client.clone(),
            offset,
            buffered: VecDeque::new(),
            poll_interval: self.poll_interval,
        };
        let stream = futures::stream::unfold(cursor, FeedCursor::next);
        Ok(LiveFeed::new(stream).with_release(|| {
            tracing::debug!(target: "waveportal.gateway", "Live feed polling stopped");
        }))
    }
}
