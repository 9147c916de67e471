use serde::Deserialize;

use crate::error::{MintClientError, MintClientResult};

/// LNURL-pay metadata document, fetched from a lightning address's
/// `/.well-known/lnurlp/<user>` endpoint (LUD-06/LUD-16).
#[derive(Debug, Clone, Deserialize)]
struct LnurlPayResponse {
    callback: String,
    #[serde(rename = "minSendable")]
    min_sendable: u64,
    #[serde(rename = "maxSendable")]
    max_sendable: u64,
    #[serde(default)]
    tag: String,
}

#[derive(Debug, Clone, Deserialize)]
struct LnurlInvoiceResponse {
    pr: String,
}

/// Resolves `user@domain` Lightning addresses to bolt11 invoices. A
/// collaborator so the HTTP round trips never need mocking in engine tests:
/// the engine only ever calls through `MintClient::resolve_lightning_address`.
pub trait LnurlResolver: Send + Sync {
    fn lnurlp_url(&self, address: &str) -> MintClientResult<String>;
}

#[derive(Debug, Default)]
pub struct HttpLnurlResolver {
    client: reqwest::Client,
}

impl HttpLnurlResolver {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Resolves a `user@domain` address to a bolt11 invoice for
    /// `amount_msat`, per LUD-16.
    pub async fn resolve(&self, address: &str, amount_msat: u64) -> MintClientResult<String> {
        let (user, domain) = address
            .split_once('@')
            .ok_or_else(|| MintClientError::LnurlResolution(format!("`{address}` is not a lightning address")))?;
        let metadata_url = format!("https://{domain}/.well-known/lnurlp/{user}");

        let pay_response: LnurlPayResponse = self
            .client
            .get(&metadata_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if pay_response.tag != "payRequest" {
            return Err(MintClientError::LnurlResolution(format!(
                "`{address}` is not an LNURL-pay endpoint"
            )));
        }
        if amount_msat < pay_response.min_sendable || amount_msat > pay_response.max_sendable {
            return Err(MintClientError::LnurlResolution(format!(
                "{amount_msat} msat is outside `{address}`'s sendable range [{}, {}]",
                pay_response.min_sendable, pay_response.max_sendable
            )));
        }

        let separator = if pay_response.callback.contains('?') { '&' } else { '?' };
        let callback_url = format!("{}{separator}amount={amount_msat}", pay_response.callback);

        let invoice_response: LnurlInvoiceResponse =
            self.client.get(&callback_url).send().await?.error_for_status()?.json().await?;

        Ok(invoice_response.pr)
    }
}

impl LnurlResolver for HttpLnurlResolver {
    fn lnurlp_url(&self, address: &str) -> MintClientResult<String> {
        let (user, domain) = address
            .split_once('@')
            .ok_or_else(|| MintClientError::LnurlResolution(format!("`{address}` is not a lightning address")))?;
        Ok(format!("https://{domain}/.well-known/lnurlp/{user}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_well_known_url() {
        let resolver = HttpLnurlResolver::default();
        assert_eq!(
            resolver.lnurlp_url("alice@example.com").unwrap(),
            "https://example.com/.well-known/lnurlp/alice"
        );
    }

    #[test]
    fn rejects_address_without_at_sign() {
        let resolver = HttpLnurlResolver::default();
        assert!(resolver.lnurlp_url("not-an-address").is_err());
    }
}
