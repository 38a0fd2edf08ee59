use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use tower_sessions::Session;
use tracing::{debug, warn};

use super::claims::{Claims, Role};
use crate::{config::JwtConfig, error::PageError, state::AppState};

/// Session key holding the token of a browser login.
pub const TOKEN_KEY: &str = "access_token";

#[derive(Clone)]
pub struct JwtKeys {
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
        } = state.config.jwt.clone();
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
        }
    }
}

impl JwtKeys {
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(admin_id = data.claims.sub, role = ?data.claims.role, "jwt verified");
        Ok(data.claims)
    }
}

/// The authenticated reseller acting on the request.
#[derive(Debug, Clone)]
pub struct AuthReseller {
    pub id: i64,
    pub name: String,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthReseller
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = PageError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let token = match bearer_token(parts) {
            Some(t) => Some(t),
            None => session_token(parts).await,
        }
        .ok_or_else(|| PageError::Unauthorized("missing credentials".into()))?;

        let claims = match keys.verify(&token) {
            Ok(c) => c,
            Err(_) => {
                warn!("invalid or expired token");
                return Err(PageError::Unauthorized("invalid or expired token".into()));
            }
        };

        if claims.role != Role::Reseller {
            warn!(admin_id = claims.sub, role = ?claims.role, "reseller area denied");
            return Err(PageError::Forbidden("reseller access required".into()));
        }

        Ok(AuthReseller {
            id: claims.sub,
            name: claims.name,
        })
    }
}

async fn session_token(parts: &Parts) -> Option<String> {
    let session = parts.extensions.get::<Session>()?;
    match session.get::<String>(TOKEN_KEY).await {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, "session lookup failed");
            None
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::to_string)
}

#[cfg(test)]
pub(crate) mod test_support {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use time::{Duration, OffsetDateTime};

    use super::super::claims::{Claims, Role};

    pub const SECRET: &str = "test-secret";
    pub const ISSUER: &str = "test-issuer";
    pub const AUDIENCE: &str = "test-aud";

    pub fn token_for(id: i64, name: &str, role: Role) -> String {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: id,
            name: name.into(),
            role,
            iat: now.unix_timestamp() as usize,
            exp: (now + Duration::minutes(5)).unix_timestamp() as usize,
            iss: ISSUER.into(),
            aud: AUDIENCE.into(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("sign test token")
    }
}
