use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AiError;

/// Header value carrying a secret. Rejects keys with control characters.
pub(crate) fn secret_header(value: &str) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|_| AiError::Config("API key is not a valid header value".to_string()))?;
    header.set_sensitive(true);
    Ok(header)
}

/// POST `body` as JSON to `url` and decode the JSON reply.
///
/// Any non-2xx status becomes `AiError::Api` with the raw response body.
pub(crate) async fn post_json<Req, Resp>(
    http: &reqwest::Client,
    url: &str,
    mut headers: HeaderMap,
    body: &Req,
) -> Result<Resp>
where
    Req: Serialize + ?Sized,
    Resp: DeserializeOwned,
{
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let response = http
        .post(url)
        .headers(headers)
        .json(body)
        .send()
        .await
        .map_err(AiError::from)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AiError::Api {
            status: status.as_u16(),
            body,
        }
        .into());
    }

    Ok(response.json().await.map_err(AiError::from)?)
}
