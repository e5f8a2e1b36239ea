//! Session token minting and verification.
//!
//! Tokens are HS256 JWTs signed with the configured session secret. The
//! claims carry everything a [`SessionContext`] needs, so verifying a token
//! never requires a store lookup.
use crate::auth::session::{PermissionChecker, Requester, Role, RolePermissions, SessionContext};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 24);

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("jwt: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("system clock is before the unix epoch")]
    Clock,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub iss: String,
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
    pub account_status: String,
    #[serde(default)]
    pub account_status_explanation: String,
    pub active_household: String,
    #[serde(default)]
    pub service_roles: Vec<Role>,
    #[serde(default)]
    pub household_roles: HashMap<String, Vec<Role>>,
}

impl SessionClaims {
    pub fn into_session(self) -> SessionContext {
        let household_permissions = self
            .household_roles
            .into_iter()
            .map(|(household, roles)| {
                let checker: Arc<dyn PermissionChecker> = Arc::new(RolePermissions::new(roles));
                (household, checker)
            })
            .collect();
        SessionContext {
            requester: Requester {
                user_id: self.sub,
                account_status: self.account_status,
                account_status_explanation: self.account_status_explanation,
            },
            active_household_id: self.active_household,
            service_permissions: Arc::new(RolePermissions::new(self.service_roles)),
            household_permissions,
        }
    }
}

/// Signs and verifies session tokens for one issuer.
#[derive(Clone)]
pub struct SessionKeys {
    issuer: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

fn now_secs() -> Result<u64, TokenError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .map_err(|_| TokenError::Clock)
}

impl SessionKeys {
    pub fn new(issuer: impl Into<String>, secret: &[u8]) -> Self {
        Self {
            issuer: issuer.into(),
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Mints a token for `user_id` with the given roles, valid for `ttl`.
    pub fn mint(
        &self,
        user_id: &str,
        active_household: &str,
        service_roles: Vec<Role>,
        household_roles: HashMap<String, Vec<Role>>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let iat = now_secs()?;
        let claims = SessionClaims {
            iss: self.issuer.clone(),
            sub: user_id.to_string(),
            iat,
            exp: iat + ttl.as_secs(),
            account_status: "good".to_string(),
            account_status_explanation: String::new(),
            active_household: active_household.to_string(),
            service_roles,
            household_roles,
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &self.encoding,
        )?)
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = 30;
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}
