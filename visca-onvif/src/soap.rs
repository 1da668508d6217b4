use crate::target::{OnvifAuth, OnvifTarget};
use crate::wsse::UsernameToken;
use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;

pub struct SoapResponse {
    pub status: u16,
    pub body: String,
}

impl SoapResponse {
    pub fn is_success(&self) -> bool {
        self.status < 400
    }
}

pub async fn send(
    client: &Client,
    target: &OnvifTarget,
    endpoint: &str,
    action: &str,
    body: &str,
) -> Result<SoapResponse> {
    let envelope = build_envelope(target, body)?;
    let content_type = format!("application/soap+xml; charset=utf-8; action=\"{}\"", action);
    let mut request = client
        .post(endpoint)
        .header("Content-Type", content_type)
        .body(envelope);
    if target.onvif_auth() == OnvifAuth::Basic {
        if let Some((user, pass)) = target.basic_auth() {
            request = request.basic_auth(user, Some(pass));
        }
    }
    let response = request
        .send()
        .await
        .with_context(|| format!("soap request failed for {} -> {}", action, endpoint))?;
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    Ok(SoapResponse { status, body })
}

/// Fails with the operation name when the camera answered with an HTTP error.
pub fn ensure_success(operation: &str, endpoint: &str, response: &SoapResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    log_response(operation, endpoint, response);
    bail!("{operation} failed with HTTP {}", response.status)
}

pub fn log_response(operation: &str, endpoint: &str, response: &SoapResponse) {
    if response.body.is_empty() {
        tracing::debug!(
            "SOAP response ({}): {} -> HTTP {} (empty body)",
            operation,
            endpoint,
            response.status
        );
    } else {
        tracing::debug!(
            "SOAP response ({}): {} -> HTTP {}\n{}",
            operation,
            endpoint,
            response.status,
            response.body
        );
    }
}

fn build_envelope(target: &OnvifTarget, body: &str) -> Result<String> {
    let header = match target.onvif_auth() {
        OnvifAuth::Basic => String::new(),
        OnvifAuth::Wsse => {
            let (user, pass) = target
                .basic_auth()
                .ok_or_else(|| anyhow!("onvif wsse auth requires username and password"))?;
            UsernameToken::generate(user, pass)?.header()
        }
    };
    Ok(format!(
        r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope">
{header}  <s:Body xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema">
    {body}
  </s:Body>
</s:Envelope>
"#
    ))
}
