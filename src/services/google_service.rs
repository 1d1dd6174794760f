use std::collections::HashMap;
use std::time::{Duration, Instant};

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{Error, Result};

const GOOGLE_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// Google issues ID tokens under both spellings.
const GOOGLE_ISSUERS: [&str; 2] = ["https://accounts.google.com", "accounts.google.com"];

const CERTS_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Claims of a verified Google ID token. `email` is what account resolution
/// keys on; `sub` is the stable Google subject id that gets linked.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleClaims {
    pub sub: String,
    pub email: String,
    pub email_verified: Option<bool>,
    pub name: Option<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct CertsResponse {
    keys: Vec<CertKey>,
}

#[derive(Debug, Clone, Deserialize)]
struct CertKey {
    kid: String,
    n: String,
    e: String,
}

/// Verifies Google ID tokens against Google's rotating signing keys. Keys are
/// fetched on first use and cached for an hour; a failed refresh keeps
/// serving whatever is already cached.
pub struct GoogleAuthService {
    http: Client,
    client_id: String,
    keys: RwLock<HashMap<String, DecodingKey>>,
    last_refresh: RwLock<Option<Instant>>,
}

impl GoogleAuthService {
    pub fn new(client_id: String) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client for Google auth");
        Self {
            http,
            client_id,
            keys: RwLock::new(HashMap::new()),
            last_refresh: RwLock::new(None),
        }
    }

    async fn refresh_keys(&self) -> Result<()> {
        debug!("Refreshing Google signing keys");

        let response = self.http.get(GOOGLE_CERTS_URL).send().await?;
        let certs: CertsResponse = response.json().await?;

        let mut keys = HashMap::new();
        for cert in certs.keys {
            match DecodingKey::from_rsa_components(&cert.n, &cert.e) {
                Ok(key) => {
                    keys.insert(cert.kid, key);
                }
                Err(err) => warn!("Skipping malformed Google signing key {}: {}", cert.kid, err),
            }
        }

        debug!("Fetched {} Google signing keys", keys.len());
        *self.keys.write().await = keys;
        *self.last_refresh.write().await = Some(Instant::now());
        Ok(())
    }

    async fn get_key(&self, kid: &str) -> Option<DecodingKey> {
        let needs_refresh = {
            let last = self.last_refresh.read().await;
            match *last {
                Some(at) => at.elapsed() > CERTS_CACHE_TTL,
                None => true,
            }
        };

        if needs_refresh {
            if let Err(err) = self.refresh_keys().await {
                warn!("Failed to refresh Google signing keys: {}", err);
            }
        }

        self.keys.read().await.get(kid).cloned()
    }

    /// Verifies signature, issuer, audience and expiry of a Google ID token.
    pub async fn verify_id_token(&self, token: &str) -> Result<GoogleClaims> {
        let header = decode_header(token)
            .map_err(|err| Error::Unauthorized(format!("Invalid Google token header: {}", err)))?;

        let kid = header
            .kid
            .ok_or_else(|| Error::Unauthorized("Google token missing key ID".to_string()))?;

        let key = self
            .get_key(&kid)
            .await
            .ok_or_else(|| Error::Unauthorized("Unknown Google signing key".to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation.set_audience(&[&self.client_id]);

        let token_data = decode::<GoogleClaims>(token, &key, &validation)
            .map_err(|err| Error::Unauthorized(format!("Google token rejected: {}", err)))?;

        Ok(token_data.claims)
    }
}
