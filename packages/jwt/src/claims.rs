//! Ledger API claims and builder.
//!
//! A party-based token carries the custom `https://daml.com/ledger-api` claim
//! naming the ledger, the application and the parties the bearer may act as.
//! A user-based token instead names a participant user (`sub`) and targets the
//! participant through `aud`.

use crate::error::{JwtError, JwtResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Namespace of the custom ledger API claim.
pub const LEDGER_API_NAMESPACE: &str = "https://daml.com/ledger-api";

/// Scope ledger API participants expect on user-based tokens.
pub const DEFAULT_SCOPE: &str = "daml_ledger_api";

const PARTICIPANT_AUDIENCE_PREFIX: &str = "https://daml.com/jwt/aud/participant/";

/// Audience identifying a specific participant node.
#[must_use]
pub fn participant_audience(participant_id: &str) -> String {
    format!("{PARTICIPANT_AUDIENCE_PREFIX}{participant_id}")
}

/// Fresh v4 UUID for the `jti` claim.
#[must_use]
pub fn random_jwt_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Custom ledger API claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerApiClaim {
    /// Ledger the token is valid for.
    pub ledger_id: String,
    /// Application submitting commands.
    pub application_id: String,
    /// Parties the bearer may act as, in caller order.
    pub act_as: Vec<String>,
}

/// Token payload.
///
/// Optional claims are left out of the JSON entirely when unset. Field order
/// is the wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Custom ledger API claim, absent on user-based tokens.
    #[serde(
        rename = "https://daml.com/ledger-api",
        skip_serializing_if = "Option::is_none"
    )]
    pub ledger_api: Option<LedgerApiClaim>,
    /// Expiry (unix seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Issued-at (unix seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Issuer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Subject (ledger user id).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// JWT ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    /// Parties granted through `actAs`, empty for user-based tokens.
    #[must_use]
    pub fn act_as(&self) -> &[String] {
        self.ledger_api
            .as_ref()
            .map(|claim| claim.act_as.as_slice())
            .unwrap_or(&[])
    }

    /// Set the JWT ID (jti) claim on already built claims.
    #[must_use]
    pub fn with_jwt_id(mut self, jti: impl Into<String>) -> Self {
        self.jti = Some(jti.into());
        self
    }

    /// Identities this token grants: the `actAs` parties, or the subject.
    #[must_use]
    pub fn identities(&self) -> Vec<String> {
        match (&self.ledger_api, &self.sub) {
            (Some(claim), _) => claim.act_as.clone(),
            (None, Some(sub)) => vec![sub.clone()],
            (None, None) => Vec::new(),
        }
    }
}

/// Builder for party-based ledger API claims.
#[derive(Debug, Clone)]
pub struct ClaimsBuilder {
    ledger_id: String,
    application_id: String,
    parties: Vec<String>,
    issuer: Option<String>,
    expiry_seconds: Option<u64>,
    audience: Option<String>,
    scope: Option<String>,
    jwt_id: Option<String>,
}

impl ClaimsBuilder {
    /// Start claims for a ledger and application.
    #[must_use]
    pub fn new(ledger_id: impl Into<String>, application_id: impl Into<String>) -> Self {
        Self {
            ledger_id: ledger_id.into(),
            application_id: application_id.into(),
            parties: Vec::new(),
            issuer: None,
            expiry_seconds: None,
            audience: None,
            scope: None,
            jwt_id: None,
        }
    }

    /// Append parties to `actAs`. Order is kept and duplicates are not removed.
    #[must_use]
    pub fn act_as<I, S>(mut self, parties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parties.extend(parties.into_iter().map(Into::into));
        self
    }

    /// Append a single party to `actAs`.
    #[must_use]
    pub fn party(mut self, party: impl Into<String>) -> Self {
        self.parties.push(party.into());
        self
    }

    /// Set the issuer (iss) claim.
    #[must_use]
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Expire the token `seconds` after it is built. Also sets `iat`.
    #[must_use]
    pub fn expires_in(mut self, seconds: u64) -> Self {
        self.expiry_seconds = Some(seconds);
        self
    }

    /// Set the audience (aud) claim.
    #[must_use]
    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Target a participant node through the audience claim.
    #[must_use]
    pub fn participant(self, participant_id: &str) -> Self {
        self.audience(participant_audience(participant_id))
    }

    /// Set the scope claim.
    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Set the JWT ID (jti) claim.
    #[must_use]
    pub fn jwt_id(mut self, jti: impl Into<String>) -> Self {
        self.jwt_id = Some(jti.into());
        self
    }

    /// Set a random v4 UUID as JWT ID. Tokens built this way are not reproducible.
    #[must_use]
    pub fn random_jwt_id(self) -> Self {
        self.jwt_id(random_jwt_id())
    }

    /// Build using the current system time.
    ///
    /// # Errors
    /// `InvalidInput` when no party was given or the expiry overflows.
    pub fn build(self) -> JwtResult<Claims> {
        self.build_at(Utc::now())
    }

    /// Build with an explicit clock reading.
    ///
    /// # Errors
    /// `InvalidInput` when no party was given or the expiry overflows.
    pub fn build_at(self, now: DateTime<Utc>) -> JwtResult<Claims> {
        if self.parties.is_empty() {
            return Err(JwtError::invalid_input(
                "actAs requires at least one party id",
            ));
        }

        let (exp, iat) = expiry_window(self.expiry_seconds, now)?;

        Ok(Claims {
            ledger_api: Some(LedgerApiClaim {
                ledger_id: self.ledger_id,
                application_id: self.application_id,
                act_as: self.parties,
            }),
            exp,
            iat,
            iss: self.issuer,
            aud: self.audience,
            sub: None,
            scope: self.scope,
            jti: self.jwt_id,
        })
    }
}

/// Build party-based claims using the current system time.
///
/// # Errors
/// `InvalidInput` when `parties` is empty.
pub fn build_claims<S: AsRef<str>>(
    parties: &[S],
    ledger_id: &str,
    application_id: &str,
    issuer: Option<&str>,
    expiry_seconds: Option<u64>,
) -> JwtResult<Claims> {
    build_claims_at(
        parties,
        ledger_id,
        application_id,
        issuer,
        expiry_seconds,
        Utc::now(),
    )
}

/// Build party-based claims with an explicit clock reading.
///
/// # Errors
/// `InvalidInput` when `parties` is empty.
pub fn build_claims_at<S: AsRef<str>>(
    parties: &[S],
    ledger_id: &str,
    application_id: &str,
    issuer: Option<&str>,
    expiry_seconds: Option<u64>,
    now: DateTime<Utc>,
) -> JwtResult<Claims> {
    let mut builder = ClaimsBuilder::new(ledger_id, application_id)
        .act_as(parties.iter().map(|party| party.as_ref().to_string()));
    if let Some(issuer) = issuer {
        builder = builder.issuer(issuer);
    }
    if let Some(seconds) = expiry_seconds {
        builder = builder.expires_in(seconds);
    }
    builder.build_at(now)
}

/// Build user-based claims with an explicit clock reading.
///
/// `scope` defaults to [`DEFAULT_SCOPE`].
///
/// # Errors
/// `InvalidInput` when `user_id` or `participant_id` is empty.
pub fn build_user_claims_at(
    user_id: &str,
    participant_id: &str,
    scope: Option<&str>,
    expiry_seconds: Option<u64>,
    now: DateTime<Utc>,
) -> JwtResult<Claims> {
    if user_id.trim().is_empty() {
        return Err(JwtError::invalid_input("user id must not be empty"));
    }
    if participant_id.trim().is_empty() {
        return Err(JwtError::invalid_input("participant id must not be empty"));
    }

    let (exp, iat) = expiry_window(expiry_seconds, now)?;

    Ok(Claims {
        ledger_api: None,
        exp,
        iat,
        iss: None,
        aud: Some(participant_audience(participant_id)),
        sub: Some(user_id.to_string()),
        scope: Some(scope.unwrap_or(DEFAULT_SCOPE).to_string()),
        jti: None,
    })
}

/// Build user-based claims using the current system time.
///
/// # Errors
/// `InvalidInput` when `user_id` or `participant_id` is empty.
pub fn build_user_claims(
    user_id: &str,
    participant_id: &str,
    scope: Option<&str>,
    expiry_seconds: Option<u64>,
) -> JwtResult<Claims> {
    build_user_claims_at(user_id, participant_id, scope, expiry_seconds, Utc::now())
}

/// `(exp, iat)` for an optional lifetime.
fn expiry_window(
    expiry_seconds: Option<u64>,
    now: DateTime<Utc>,
) -> JwtResult<(Option<i64>, Option<i64>)> {
    let Some(seconds) = expiry_seconds else {
        return Ok((None, None));
    };

    let iat = now.timestamp();
    let exp = i64::try_from(seconds)
        .ok()
        .and_then(|lifetime| iat.checked_add(lifetime))
        .ok_or_else(|| JwtError::invalid_input("expiry does not fit a unix timestamp"))?;

    Ok((Some(exp), Some(iat)))
}
