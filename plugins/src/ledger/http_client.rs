use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use waveportal_core::api::RawWave;

const BODY_PREVIEW_LIMIT: usize = 512;

/// Failure of one gateway round trip, split the way the ledger reports it.
#[derive(Debug, Error)]
pub enum GatewayHttpError {
    /// Connection refused or request timed out.
    #[error("gateway unreachable url={url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("gateway transport error url={url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("gateway status={status} url={url}: {preview}")]
    Status {
        status: u16,
        url: String,
        preview: String,
        /// `reason` field of a JSON error body.
        reason: Option<String>,
    },
    #[error("failed to decode gateway response url={url}: {source} | body={preview}")]
    Decode {
        url: String,
        preview: String,
        #[source]
        source: serde_json::Error,
    },
}

impl GatewayHttpError {
    fn from_reqwest(source: reqwest::Error, url: String) -> Self {
        if source.is_connect() || source.is_timeout() {
            Self::Unreachable { url, source }
        } else {
            Self::Transport { url, source }
        }
    }

    fn from_status(status: u16, url: String, body: &str) -> Self {
        let reason = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("reason")?.as_str().map(str::to_string));
        Self::Status {
            status,
            url,
            preview: preview_body(body),
            reason,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Status { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }
}

fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out = String::new();
    let mut truncated = false;
    for (idx, ch) in trimmed.chars().enumerate() {
        if idx >= BODY_PREVIEW_LIMIT {
            truncated = true;
            break;
        }
        out.push(ch);
    }

    if truncated {
        out.push_str("...");
    }

    out
}

async fn parse_json_response<T>(resp: reqwest::Response) -> anyhow::Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let status = resp.status();
    let url = resp.url().to_string();
    let body = resp
        .text()
        .await
        .map_err(|err| GatewayHttpError::from_reqwest(err, url.clone()))?;

    if !status.is_success() {
        return Err(GatewayHttpError::from_status(status.as_u16(), url, &body).into());
    }

    serde_json::from_str::<T>(&body).map_err(|source| {
        GatewayHttpError::Decode {
            url,
            preview: preview_body(&body),
            source,
        }
        .into()
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct SendWavePayload {
    pub from: String,
    pub message: String,
    pub gas_limit: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendWaveResponse {
    pub tx_hash: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Pending,
    Mined,
    Failed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: String,
    pub status: TxStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Clone)]
pub struct HttpClient {
    api_key: String,
    http: reqwest::Client,
    url_waves: String,
    url_count: String,
    url_tx: String,
}

impl HttpClient {
    pub fn new(base_url: String, api_key: String, timeout_ms: u64) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()?;
        let normalized = base_url.trim_end_matches('/');
        Ok(Self {
            api_key,
            http,
            url_waves: format!("{}/v1/waves", normalized),
            url_count: format!("{}/v1/waves/count", normalized),
            url_tx: format!("{}/v1/tx", normalized),
        })
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.trim().is_empty() {
            req
        } else {
            req.bearer_auth(&self.api_key)
        }
    }

    /// Waves starting at `offset`, oldest first.
    pub async fn list_waves(&self, offset: u64) -> anyhow::Result<Vec<RawWave>> {
        let url = &self.url_waves;
        tracing::debug!(
            target: "waveportal.gateway",
            stage = "gateway.http.list.in",
            url = %url,
            offset
        );
        let mut req = self.http.get(url);
        if offset > 0 {
            req = req.query(&[("offset", offset)]);
        }
        let resp = self
            .auth(req)
            .send()
            .await
            .map_err(|err| GatewayHttpError::from_reqwest(err, url.clone()))?;
        let status = resp.status();
        let waves: Vec<RawWave> = parse_json_response(resp).await?;
        tracing::debug!(
            target: "waveportal.gateway",
            stage = "gateway.http.list.out",
            status = %status,
            count = waves.len()
        );
        Ok(waves)
    }

    pub async fn wave_count(&self) -> anyhow::Result<u64> {
        let url = &self.url_count;
        let resp = self
            .auth(self.http.get(url))
            .send()
            .await
            .map_err(|err| GatewayHttpError::from_reqwest(err, url.clone()))?;
        let body: CountResponse = parse_json_response(resp).await?;
        tracing::debug!(
            target: "waveportal.gateway",
            stage = "gateway.http.count.out",
            count = body.count
        );
        Ok(body.count)
    }

    pub async fn send_wave(&self, payload: &SendWavePayload) -> anyhow::Result<SendWaveResponse> {
        let url = &self.url_waves;
        tracing::debug!(
            target: "waveportal.gateway",
            stage = "gateway.http.send.in",
            url = %url,
            from = %payload.from,
            message_len = payload.message.len(),
            gas_limit = payload.gas_limit
        );
        let req = self.http.post(url).json(payload);
        let resp = self
            .auth(req)
            .send()
            .await
            .map_err(|err| GatewayHttpError::from_reqwest(err, url.clone()))?;
        let status = resp.status();
        let sent: SendWaveResponse = parse_json_response(resp).await?;
        tracing::debug!(
            target: "waveportal.gateway",
            stage = "gateway.http.send.out",
            status = %status,
            tx = %sent.tx_hash
        );
        Ok(sent)
    }

    pub async fn tx_receipt(&self, tx_hash: &str) -> anyhow::Result<TxReceipt> {
        let url = format!("{}/{}", self.url_tx, tx_hash);
        let resp = self
            .auth(self.http.get(&url))
            .send()
            .await
            .map_err(|err| GatewayHttpError::from_reqwest(err, url.clone()))?;
        parse_json_response(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[test]
    fn test_preview_body_empty() {
        assert_eq!(preview_body("   "), "<empty body>");
    }

    #[test]
    fn test_preview_body_truncates() {
        let body = "a".repeat(BODY_PREVIEW_LIMIT + 10);
        let preview = preview_body(&body);
        assert!(preview.ends_with("..."));
        assert!(preview.len() <= BODY_PREVIEW_LIMIT + 3);
    }

    #[test]
    fn test_status_error_extracts_reason() {
        let err = GatewayHttpError::from_status(
            422,
            "https://example.com/v1/waves".to_string(),
            r#"{"reason":"insufficient funds"}"#,
        );
        assert_eq!(err.reason(), Some("insufficient funds"));
        assert_eq!(err.status(), Some(422));
        let msg = err.to_string();
        assert!(msg.contains("status=422"));
        assert!(msg.contains("url=https://example.com/v1/waves"));
    }

    #[test]
    fn test_status_error_plain_body_has_no_reason() {
        let err = GatewayHttpError::from_status(
            502,
            "https://example.com/v1/waves".to_string(),
            "bad gateway",
        );
        assert_eq!(err.reason(), None);
        assert!(err.to_string().contains("bad gateway"));
    }

    #[tokio::test]
    async fn test_unreachable_gateway() {
        let client = HttpClient::new("http://127.0.0.1:9".to_string(), "".to_string(), 500).unwrap();
        let err = client.wave_count().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GatewayHttpError>(),
            Some(GatewayHttpError::Unreachable { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_waves_sends_offset() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/v1/waves")
            .match_query(Matcher::UrlEncoded("offset".into(), "2".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"waver":"0xC","timestamp":3000,"message":"late"}]"#)
            .create_async()
            .await;

        let client = HttpClient::new(server.url(), "".to_string(), 1_000).unwrap();
        let waves = client.list_waves(2).await.unwrap();
        assert_eq!(waves, vec![RawWave::new("0xC", 3000, "late")]);
    }

    #[tokio::test]
    async fn test_send_wave_uses_bearer_auth() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/v1/waves")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "from": "0xA",
                "message": "hello",
                "gas_limit": 300000
            })))
            .with_status(202)
            .with_body(r#"{"tx_hash":"0xabc"}"#)
            .create_async()
            .await;

        let client = HttpClient::new(server.url(), "secret".to_string(), 1_000).unwrap();
        let sent = client
            .send_wave(&SendWavePayload {
                from: "0xA".into(),
                message: "hello".into(),
                gas_limit: 300_000,
            })
            .await
            .unwrap();
        assert_eq!(sent.tx_hash, "0xabc");
    }

    #[tokio::test]
    async fn test_count_decode_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/v1/waves/count")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = HttpClient::new(server.url(), "".to_string(), 1_000).unwrap();
        let err = client.wave_count().await.unwrap_err();
        let http_err = err.downcast_ref::<GatewayHttpError>().unwrap();
        assert!(matches!(http_err, GatewayHttpError::Decode { .. }));
        assert!(http_err.to_string().contains("body=not json"));
    }
}
