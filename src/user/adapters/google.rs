//! Google and Firebase ID token verification against a JSON Web Key set.

use crate::user::{
    domain::{EmailAddress, GoogleSubject, VerifiedIdentity},
    ports::{IdentityError, IdentityVerifier},
};
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header, jwk::JwkSet};
use serde::Deserialize;
use tracing::debug;

const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];
const FIREBASE_ISSUER_PREFIX: &str = "https://securetoken.google.com/";

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

/// Accepted audience and issuers for one token flavour.
#[derive(Debug, Clone)]
struct TrustedAudience {
    audience: String,
    issuers: Vec<String>,
}

/// [`IdentityVerifier`] checking RS256 ID tokens issued by Google sign-in or
/// Firebase Authentication.
///
/// Keys come from a JWK set supplied by the caller; refreshing that set is
/// the caller's concern.
#[derive(Debug, Clone)]
pub struct GoogleIdentityVerifier {
    keys: JwkSet,
    trusted: Vec<TrustedAudience>,
}

impl GoogleIdentityVerifier {
    /// Creates a verifier with no trusted audiences.
    #[must_use]
    pub const fn new(keys: JwkSet) -> Self {
        Self {
            keys,
            trusted: Vec::new(),
        }
    }

    /// Parses a JWK set document.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when the document is not a JWK set.
    pub fn from_jwks_json(document: &str) -> Result<Self, IdentityError> {
        let keys: JwkSet =
            serde_json::from_str(document).map_err(|err| IdentityError(err.to_string()))?;
        Ok(Self::new(keys))
    }

    /// Trusts Google sign-in tokens issued for an OAuth client.
    #[must_use]
    pub fn with_google_client(mut self, client_id: impl Into<String>) -> Self {
        self.trusted.push(TrustedAudience {
            audience: client_id.into(),
            issuers: GOOGLE_ISSUERS.iter().map(|issuer| (*issuer).to_owned()).collect(),
        });
        self
    }

    /// Trusts Firebase Authentication tokens of a project.
    #[must_use]
    pub fn with_firebase_project(mut self, project_id: impl Into<String>) -> Self {
        let project = project_id.into();
        self.trusted.push(TrustedAudience {
            issuers: vec![format!("{FIREBASE_ISSUER_PREFIX}{project}")],
            audience: project,
        });
        self
    }

    fn decode_claims(&self, id_token: &str) -> Result<IdTokenClaims, IdentityError> {
        let header = decode_header(id_token).map_err(|err| IdentityError(err.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| IdentityError("token header has no key id".to_owned()))?;
        let jwk = self
            .keys
            .find(&kid)
            .ok_or_else(|| IdentityError(format!("unknown signing key: {kid}")))?;
        let key = DecodingKey::from_jwk(jwk).map_err(|err| IdentityError(err.to_string()))?;

        let mut last_error = IdentityError("no trusted audience configured".to_owned());
        for trusted in &self.trusted {
            let mut validation = Validation::new(Algorithm::RS256);
            validation.set_audience(&[trusted.audience.as_str()]);
            validation.set_issuer(&trusted.issuers);
            match decode::<IdTokenClaims>(id_token, &key, &validation) {
                Ok(data) => return Ok(data.claims),
                Err(err) => {
                    debug!(audience = %trusted.audience, error = %err, "id token rejected");
                    last_error = IdentityError(err.to_string());
                }
            }
        }
        Err(last_error)
    }
}

#[async_trait]
impl IdentityVerifier for GoogleIdentityVerifier {
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let claims = self.decode_claims(id_token)?;
        let email = claims
            .email
            .ok_or_else(|| IdentityError("token carries no email".to_owned()))?;
        Ok(VerifiedIdentity {
            subject: GoogleSubject::new(claims.sub).map_err(|err| IdentityError(err.to_string()))?,
            email: EmailAddress::new(email).map_err(|err| IdentityError(err.to_string()))?,
            name: claims.name,
            picture: claims.picture,
        })
    }
}
