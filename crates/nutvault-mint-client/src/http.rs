use async_trait::async_trait;
use cashu::dhke::{blind_message, hash_to_curve};
use cashu::nuts::nut01::{Keys, PublicKey, SecretKey};
use cashu::secret::Secret;
use cashu::Amount;
use nutvault_common::{CurrencyUnit, NewProof, Proof, ProofStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::bolt11::{Bolt11Decoder, LightningInvoiceDecoder};
use crate::client::MintClient;
use crate::error::{MintClientError, MintClientResult};
use crate::lnurl::HttpLnurlResolver;
use crate::types::{
    DecodedToken, MeltOutcome, MeltQuote, MeltQuoteState, MintOperationError, MintProofState,
    MintQuote, MintQuoteState, ProofStateEntry, SwapOutcome, SwapOutputConfig,
};

/// A freshly blinded output, kept around until the mint's signature comes
/// back so the blinding factor can be removed again.
struct PendingOutput {
    amount: Amount,
    secret: Secret,
    blinding_factor: SecretKey,
}

#[derive(Serialize)]
struct WireBlindedMessage {
    amount: u64,
    id: String,
    #[serde(rename = "B_")]
    blinded_secret: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    witness: Option<Value>,
}

#[derive(Deserialize)]
struct WireBlindSignature {
    amount: u64,
    #[serde(rename = "id")]
    keyset_id: String,
    #[serde(rename = "C_")]
    c: String,
    #[serde(default)]
    dleq: Option<Value>,
}

#[derive(Serialize)]
struct WireProof {
    amount: u64,
    id: String,
    secret: String,
    #[serde(rename = "C")]
    c: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    witness: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dleq: Option<Value>,
}

impl WireProof {
    fn from_stored(proof: &Proof) -> MintClientResult<Self> {
        Ok(Self {
            amount: proof.amount,
            id: proof.proof_id.clone(),
            secret: proof.secret.clone(),
            c: proof.c.clone(),
            witness: opt_str_to_value(proof.witness.as_deref())?,
            dleq: opt_str_to_value(proof.dleq.as_deref())?,
        })
    }
}

fn opt_str_to_value(raw: Option<&str>) -> MintClientResult<Option<Value>> {
    raw.map(|s| serde_json::from_str(s).map_err(|e| MintClientError::Decode(e.to_string())))
        .transpose()
}

#[derive(Serialize)]
struct MintQuoteBolt11Request {
    unit: CurrencyUnit,
    amount: u64,
}

#[derive(Deserialize)]
struct MintQuoteBolt11ResponseWire {
    quote: String,
    request: String,
    state: MintQuoteState,
    expiry: u64,
}

#[derive(Serialize)]
struct MintBolt11Request<'a> {
    quote: &'a str,
    outputs: Vec<WireBlindedMessage>,
}

#[derive(Deserialize)]
struct MintBolt11ResponseWire {
    signatures: Vec<WireBlindSignature>,
}

#[derive(Serialize)]
struct SwapRequestWire {
    inputs: Vec<WireProof>,
    outputs: Vec<WireBlindedMessage>,
}

#[derive(Deserialize)]
struct SwapResponseWire {
    signatures: Vec<WireBlindSignature>,
}

#[derive(Serialize)]
struct MeltQuoteBolt11Request<'a> {
    unit: CurrencyUnit,
    request: &'a str,
}

#[derive(Deserialize)]
struct MeltQuoteBolt11ResponseWire {
    quote: String,
    amount: u64,
    fee_reserve: u64,
    state: MeltQuoteState,
    expiry: u64,
    #[serde(default)]
    payment_preimage: Option<String>,
}

#[derive(Serialize)]
struct MeltBolt11Request<'a> {
    quote: &'a str,
    inputs: Vec<WireProof>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    outputs: Vec<WireBlindedMessage>,
}

#[derive(Deserialize)]
struct MeltBolt11ResponseWire {
    state: MeltQuoteState,
    #[serde(default)]
    payment_preimage: Option<String>,
    #[serde(default)]
    change: Vec<WireBlindSignature>,
}

#[derive(Serialize)]
struct CheckStateRequest {
    #[serde(rename = "Ys")]
    ys: Vec<String>,
}

#[derive(Deserialize)]
struct CheckStateResponse {
    states: Vec<ProofStateWire>,
}

#[derive(Deserialize)]
struct ProofStateWire {
    #[serde(rename = "Y")]
    y: String,
    state: String,
}

#[derive(Deserialize)]
struct KeysetEntryWire {
    id: String,
    keys: Keys,
}

#[derive(Deserialize)]
struct KeysResponseWire {
    keysets: Vec<KeysetEntryWire>,
}

#[derive(Deserialize)]
struct ErrorResponseWire {
    #[serde(default)]
    code: Option<i32>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Talks to a real mint's Cashu-over-HTTP API (NUT-04/05/03/07) plus bolt11
/// and LNURL-pay collaborators. Mint responses are decoded into locally
/// defined wire structs rather than the `cashu` crate's own request/response
/// types, keeping `dleq`/`witness` opaque all the way through, per the
/// storage layer's "never re-validate" design.
pub struct HttpMintClient {
    http: reqwest::Client,
    bolt11: Box<dyn Bolt11Decoder>,
    lnurl: HttpLnurlResolver,
}

impl std::fmt::Debug for HttpMintClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMintClient").finish_non_exhaustive()
    }
}

impl HttpMintClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            lnurl: HttpLnurlResolver::new(http.clone()),
            bolt11: Box::new(LightningInvoiceDecoder),
            http,
        }
    }

    fn endpoint(mint_url: &str, path: &str) -> String {
        format!("{}/{path}", mint_url.trim_end_matches('/'))
    }

    async fn send_json<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&Req>,
    ) -> MintClientResult<Resp> {
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            let parsed: Option<ErrorResponseWire> = serde_json::from_str(&text).ok();
            let (code, message) = match parsed {
                Some(err) => (
                    err.code,
                    err.detail.or(err.error).unwrap_or_else(|| text.clone()),
                ),
                None => (None, text),
            };
            return Err(MintClientError::MintRejected(MintOperationError {
                code,
                message: format!("HTTP {status}: {message}"),
            }));
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| MintClientError::Decode(e.to_string()))
    }

    async fn fetch_active_keys(&self, mint_url: &str, keyset_id: &str) -> MintClientResult<Keys> {
        let url = Self::endpoint(mint_url, &format!("v1/keys/{keyset_id}"));
        let response: KeysResponseWire = self.send_json::<(), _>(reqwest::Method::GET, &url, None).await?;
        response
            .keysets
            .into_iter()
            .find(|k| k.id == keyset_id)
            .map(|k| k.keys)
            .ok_or_else(|| MintClientError::Decode(format!("mint did not return keyset {keyset_id}")))
    }

    async fn active_keyset_id(&self, mint_url: &str, unit: CurrencyUnit) -> MintClientResult<String> {
        let url = Self::endpoint(mint_url, "v1/keysets");
        #[derive(Deserialize)]
        struct KeysetInfoWire {
            id: String,
            unit: String,
            active: bool,
        }
        #[derive(Deserialize)]
        struct KeysetsResponseWire {
            keysets: Vec<KeysetInfoWire>,
        }
        let response: KeysetsResponseWire =
            self.send_json::<(), _>(reqwest::Method::GET, &url, None).await?;
        response
            .keysets
            .into_iter()
            .find(|k| k.active && k.unit == unit.as_str())
            .map(|k| k.id)
            .ok_or_else(|| MintClientError::Decode(format!("mint has no active keyset for unit {unit}")))
    }

    /// Blinds `amount`'s power-of-two split into fresh outputs against
    /// `keyset_id`, without depending on the mint's fee schedule (NUT-00 §
    /// simple split, not the fee-aware NUT-08 variant).
    fn blind_outputs(
        amount: u64,
        keyset_id: &str,
    ) -> MintClientResult<(Vec<PendingOutput>, Vec<WireBlindedMessage>)> {
        let mut pending = Vec::new();
        let mut wire = Vec::new();
        for part in Amount::from(amount).split() {
            let secret = Secret::new();
            let (blinded_secret, blinding_factor) = blind_message(secret.as_bytes(), None)
                .map_err(|e| MintClientError::Decode(e.to_string()))?;
            wire.push(WireBlindedMessage {
                amount: part.into(),
                id: keyset_id.to_string(),
                blinded_secret: serde_json::to_value(&blinded_secret)
                    .map_err(|e| MintClientError::Decode(e.to_string()))?
                    .as_str()
                    .unwrap_or_default()
                    .to_string(),
                witness: None,
            });
            pending.push(PendingOutput {
                amount: part,
                secret,
                blinding_factor,
            });
        }
        Ok((pending, wire))
    }

    /// Unblinds a set of signatures returned by the mint into our storage
    /// layer's opaque-field `NewProof`s, given the blinding state that
    /// produced the matching outputs and the mint's public keys for that
    /// keyset.
    fn unblind_signatures(
        pending: Vec<PendingOutput>,
        signatures: Vec<WireBlindSignature>,
        keys: &Keys,
    ) -> MintClientResult<Vec<NewProof>> {
        if pending.len() != signatures.len() {
            return Err(MintClientError::Decode(
                "mint returned a different number of signatures than outputs sent".into(),
            ));
        }

        pending
            .into_iter()
            .zip(signatures)
            .map(|(output, sig)| {
                let mint_pubkey = keys
                    .amount_key(output.amount)
                    .ok_or_else(|| MintClientError::Decode(format!("mint has no key for amount {}", output.amount)))?;
                let blinded_c: PublicKey = serde_json::from_value(Value::String(sig.c.clone()))
                    .map_err(|e| MintClientError::Decode(e.to_string()))?;
                let unblinded = cashu::dhke::unblind_message(blinded_c, output.blinding_factor, mint_pubkey)
                    .map_err(|e| MintClientError::Decode(e.to_string()))?;
                let c_hex = serde_json::to_value(&unblinded)
                    .map_err(|e| MintClientError::Decode(e.to_string()))?
                    .as_str()
                    .unwrap_or_default()
                    .to_string();

                Ok(NewProof {
                    proof_id: sig.keyset_id,
                    amount: sig.amount,
                    secret: String::from_utf8_lossy(output.secret.as_bytes()).into_owned(),
                    c: c_hex,
                    dleq: sig.dleq.map(|v| v.to_string()),
                    witness: None,
                })
            })
            .collect()
    }
}

#[async_trait]
impl MintClient for HttpMintClient {
    #[instrument(skip(self))]
    async fn create_mint_quote(
        &self,
        mint_url: &str,
        amount: u64,
        unit: CurrencyUnit,
    ) -> MintClientResult<MintQuote> {
        let url = Self::endpoint(mint_url, "v1/mint/quote/bolt11");
        let request = MintQuoteBolt11Request { unit, amount };
        let response: MintQuoteBolt11ResponseWire =
            self.send_json(reqwest::Method::POST, &url, Some(&request)).await?;

        Ok(MintQuote {
            quote: response.quote,
            request: response.request,
            amount,
            unit,
            state: response.state,
            expiry: response.expiry,
        })
    }

    async fn check_mint_quote(&self, mint_url: &str, quote: &str) -> MintClientResult<MintQuote> {
        let url = Self::endpoint(mint_url, &format!("v1/mint/quote/bolt11/{quote}"));
        let response: MintQuoteBolt11ResponseWire =
            self.send_json::<(), _>(reqwest::Method::GET, &url, None).await?;

        Ok(MintQuote {
            quote: response.quote,
            request: response.request,
            amount: 0,
            unit: CurrencyUnit::Sat,
            state: response.state,
            expiry: response.expiry,
        })
    }

    #[instrument(skip(self, quote))]
    async fn mint_proofs(&self, mint_url: &str, quote: &MintQuote) -> MintClientResult<Vec<NewProof>> {
        let keyset_id = self.active_keyset_id(mint_url, quote.unit).await?;
        let (pending, outputs) = Self::blind_outputs(quote.amount, &keyset_id)?;

        let url = Self::endpoint(mint_url, "v1/mint/bolt11");
        let request = MintBolt11Request {
            quote: &quote.quote,
            outputs,
        };
        let response: MintBolt11ResponseWire =
            self.send_json(reqwest::Method::POST, &url, Some(&request)).await?;

        let keys = self.fetch_active_keys(mint_url, &keyset_id).await?;
        Self::unblind_signatures(pending, response.signatures, &keys)
    }

    #[instrument(skip(self, input_proofs))]
    async fn swap(
        &self,
        mint_url: &str,
        unit: CurrencyUnit,
        input_proofs: &[Proof],
        send_amount: u64,
        output_config: SwapOutputConfig,
    ) -> MintClientResult<SwapOutcome> {
        let total: u64 = input_proofs.iter().map(|p| p.amount).sum();
        let keep_amount = total
            .checked_sub(send_amount)
            .ok_or_else(|| MintClientError::Decode("send amount exceeds input proofs".into()))?;

        let keyset_id = self.active_keyset_id(mint_url, unit).await?;

        let (keep_pending, mut outputs) = Self::blind_outputs(keep_amount, &keyset_id)?;
        let (send_pending, mut send_outputs) = Self::blind_outputs(send_amount, &keyset_id)?;
        if let Some(lock) = &output_config.send_lock {
            let witness = serde_json::json!({ "p2pk_pubkey": lock.pubkey });
            for msg in &mut send_outputs {
                msg.witness = Some(witness.clone());
            }
        }
        let keep_len = outputs.len();
        outputs.append(&mut send_outputs);

        let inputs = input_proofs
            .iter()
            .map(WireProof::from_stored)
            .collect::<MintClientResult<Vec<_>>>()?;

        let url = Self::endpoint(mint_url, "v1/swap");
        let request = SwapRequestWire { inputs, outputs };
        let response: SwapResponseWire =
            self.send_json(reqwest::Method::POST, &url, Some(&request)).await?;

        if response.signatures.len() != keep_len + send_pending.len() {
            return Err(MintClientError::Decode(
                "mint returned a mismatched number of swap signatures".into(),
            ));
        }
        let mut signatures = response.signatures;
        let send_signatures = signatures.split_off(keep_len);

        let keys = self.fetch_active_keys(mint_url, &keyset_id).await?;
        let keep = Self::unblind_signatures(keep_pending, signatures, &keys)?;
        let send = Self::unblind_signatures(send_pending, send_signatures, &keys)?;

        Ok(SwapOutcome { keep, send })
    }

    #[instrument(skip(self))]
    async fn create_melt_quote(
        &self,
        mint_url: &str,
        unit: CurrencyUnit,
        invoice: &str,
    ) -> MintClientResult<MeltQuote> {
        let decoded = self.bolt11.decode(invoice)?;
        debug!(amount_msat = ?decoded.amount_msat, "decoded invoice for melt quote");

        let url = Self::endpoint(mint_url, "v1/melt/quote/bolt11");
        let request = MeltQuoteBolt11Request { unit, request: invoice };
        let response: MeltQuoteBolt11ResponseWire =
            self.send_json(reqwest::Method::POST, &url, Some(&request)).await?;

        Ok(MeltQuote {
            quote: response.quote,
            amount: response.amount,
            fee_reserve: response.fee_reserve,
            unit,
            state: response.state,
            expiry: response.expiry,
            payment_preimage: response.payment_preimage,
        })
    }

    async fn check_melt_quote(&self, mint_url: &str, quote: &str) -> MintClientResult<MeltQuote> {
        let url = Self::endpoint(mint_url, &format!("v1/melt/quote/bolt11/{quote}"));
        let response: MeltQuoteBolt11ResponseWire =
            self.send_json::<(), _>(reqwest::Method::GET, &url, None).await?;

        Ok(MeltQuote {
            quote: response.quote,
            amount: response.amount,
            fee_reserve: response.fee_reserve,
            unit: CurrencyUnit::Sat,
            state: response.state,
            expiry: response.expiry,
            payment_preimage: response.payment_preimage,
        })
    }

    #[instrument(skip(self, quote, input_proofs))]
    async fn melt_proofs(
        &self,
        mint_url: &str,
        quote: &MeltQuote,
        input_proofs: &[Proof],
    ) -> MintClientResult<MeltOutcome> {
        let total: u64 = input_proofs.iter().map(|p| p.amount).sum();
        let overpaid = total.saturating_sub(quote.amount + quote.fee_reserve);

        let (change_pending, change_outputs) = if overpaid > 0 {
            let keyset_id = self.active_keyset_id(mint_url, quote.unit).await?;
            let (pending, outputs) = Self::blind_outputs(overpaid, &keyset_id)?;
            (Some((keyset_id, pending)), outputs)
        } else {
            (None, Vec::new())
        };

        let inputs = input_proofs
            .iter()
            .map(WireProof::from_stored)
            .collect::<MintClientResult<Vec<_>>>()?;

        let url = Self::endpoint(mint_url, "v1/melt/bolt11");
        let request = MeltBolt11Request {
            quote: &quote.quote,
            inputs,
            outputs: change_outputs,
        };
        let response: MeltBolt11ResponseWire =
            self.send_json(reqwest::Method::POST, &url, Some(&request)).await?;

        let change = match change_pending {
            Some((keyset_id, pending)) if !response.change.is_empty() => {
                let keys = self.fetch_active_keys(mint_url, &keyset_id).await?;
                Self::unblind_signatures(pending, response.change, &keys)?
            }
            _ => Vec::new(),
        };

        Ok(MeltOutcome {
            quote: MeltQuote {
                quote: quote.quote.clone(),
                amount: quote.amount,
                fee_reserve: quote.fee_reserve,
                unit: quote.unit,
                state: response.state,
                expiry: quote.expiry,
                payment_preimage: response.payment_preimage,
            },
            change,
        })
    }

    #[instrument(skip(self, proofs))]
    async fn check_proof_states(
        &self,
        mint_url: &str,
        proofs: &[Proof],
    ) -> MintClientResult<Vec<ProofStateEntry>> {
        let ys = proofs
            .iter()
            .map(|p| {
                let y = hash_to_curve(p.secret.as_bytes());
                serde_json::to_value(PublicKey::from(y))
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .ok_or_else(|| MintClientError::Decode("could not derive Y for proof".into()))
            })
            .collect::<MintClientResult<Vec<_>>>()?;

        let secrets: Vec<&str> = proofs.iter().map(|p| p.secret.as_str()).collect();

        let url = Self::endpoint(mint_url, "v1/checkstate");
        let request = CheckStateRequest { ys: ys.clone() };
        let response: CheckStateResponse =
            self.send_json(reqwest::Method::POST, &url, Some(&request)).await?;

        response
            .states
            .into_iter()
            .enumerate()
            .map(|(i, entry)| {
                let state = match entry.state.as_str() {
                    "UNSPENT" => MintProofState::Unspent,
                    "PENDING" => MintProofState::Pending,
                    "SPENT" => MintProofState::Spent,
                    other => return Err(MintClientError::Decode(format!("unknown proof state `{other}`"))),
                };
                let secret = secrets
                    .get(i)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| entry.y.clone());
                Ok(ProofStateEntry { secret, state })
            })
            .collect()
    }

    fn decode_token(&self, token: &str) -> MintClientResult<DecodedToken> {
        let trimmed = token.trim();
        if trimmed.starts_with("cashuB") {
            return Err(MintClientError::Decode(
                "binary (v4) Cashu tokens are not supported; send a v3 (cashuA...) token".into(),
            ));
        }
        let body = trimmed
            .strip_prefix("cashuA")
            .ok_or_else(|| MintClientError::Decode("not a recognized Cashu token".into()))?;

        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        use base64::Engine as _;
        let decoded = URL_SAFE_NO_PAD
            .decode(body.trim_end_matches('='))
            .map_err(|e| MintClientError::Decode(e.to_string()))?;
        let json: RawTokenV3 =
            serde_json::from_slice(&decoded).map_err(|e| MintClientError::Decode(e.to_string()))?;

        let entry = json
            .token
            .into_iter()
            .next()
            .ok_or_else(|| MintClientError::Decode("token carries no proofs".into()))?;

        let unit = json
            .unit
            .as_deref()
            .and_then(|u| u.parse::<CurrencyUnit>().ok())
            .unwrap_or(CurrencyUnit::Sat);

        let proofs = entry
            .proofs
            .into_iter()
            .map(|p| Proof {
                id: 0,
                wallet_id: 0,
                proof_id: p.id,
                amount: p.amount,
                secret: p.secret,
                c: p.c,
                dleq: p.dleq.map(|v| v.to_string()),
                witness: p.witness.map(|v| v.to_string()),
                status: ProofStatus::Unspent,
                created_at: 0,
            })
            .collect();

        Ok(DecodedToken {
            mint_url: entry.mint,
            unit,
            memo: json.memo,
            proofs,
        })
    }

    async fn resolve_lightning_address(&self, address: &str, amount_msat: u64) -> MintClientResult<String> {
        self.lnurl.resolve(address, amount_msat).await
    }

    fn encode_token(
        &self,
        mint_url: &str,
        unit: CurrencyUnit,
        proofs: &[Proof],
        memo: Option<&str>,
    ) -> MintClientResult<String> {
        let wire_proofs: Vec<WireProofV3> = proofs
            .iter()
            .map(|p| WireProofV3 {
                amount: p.amount,
                id: p.proof_id.clone(),
                secret: p.secret.clone(),
                c: p.c.clone(),
                witness: p.witness.as_deref().map(opaque_field_to_value),
                dleq: p.dleq.as_deref().map(opaque_field_to_value),
            })
            .collect();

        let wire = WireTokenV3 {
            token: vec![WireTokenV3Entry { mint: mint_url.to_string(), proofs: wire_proofs }],
            memo: memo.map(str::to_string),
            unit: unit.as_str().to_string(),
        };

        let json = serde_json::to_vec(&wire).map_err(|e| MintClientError::Decode(e.to_string()))?;
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        use base64::Engine as _;
        Ok(format!("cashuA{}", URL_SAFE_NO_PAD.encode(json)))
    }
}

/// `witness`/`dleq` are stored as opaque strings (spec §9); re-embed them as
/// JSON if they parse as JSON, otherwise as a plain string, so a value that
/// round-tripped through `decode_token` comes back out unchanged.
fn opaque_field_to_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[derive(Serialize)]
struct WireTokenV3 {
    token: Vec<WireTokenV3Entry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    memo: Option<String>,
    unit: String,
}

#[derive(Serialize)]
struct WireTokenV3Entry {
    mint: String,
    proofs: Vec<WireProofV3>,
}

#[derive(Serialize)]
struct WireProofV3 {
    amount: u64,
    id: String,
    secret: String,
    #[serde(rename = "C")]
    c: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    witness: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dleq: Option<Value>,
}

#[derive(Deserialize)]
struct RawTokenV3 {
    token: Vec<RawTokenV3Entry>,
    #[serde(default)]
    memo: Option<String>,
    #[serde(default)]
    unit: Option<String>,
}

#[derive(Deserialize)]
struct RawTokenV3Entry {
    mint: String,
    proofs: Vec<RawProofV3>,
}

#[derive(Deserialize)]
struct RawProofV3 {
    amount: u64,
    id: String,
    secret: String,
    #[serde(rename = "C")]
    c: String,
    #[serde(default)]
    witness: Option<Value>,
    #[serde(default)]
    dleq: Option<Value>,
}
