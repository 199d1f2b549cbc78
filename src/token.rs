//! Session Tokens
//!
//! Issues and validates HMAC-signed JWT access/refresh pairs. Tokens are
//! stateless: validity is decided by signature and expiry alone, so an issued
//! token stays usable until it expires or the signing secret is rotated.

use crate::clock::Clock;
use crate::error::{AuthError, TokenError};
use crate::models::User;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Duration;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Access token lifetime (15 minutes)
pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;

/// Refresh token lifetime (7 days)
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Algorithm used when signing
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Algorithms accepted when validating
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Which credential a token is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn ttl(&self) -> Duration {
        match self {
            TokenKind::Access => Duration::seconds(ACCESS_TOKEN_TTL_SECS),
            TokenKind::Refresh => Duration::seconds(REFRESH_TOKEN_TTL_SECS),
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (stringified user ID)
    pub sub: String,
    pub user_id: i64,
    pub email: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    pub kind: TokenKind,
    /// Token ID
    pub jti: Uuid,
}

/// Access and refresh token issued together from one user snapshot
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

// ============================================
// Issuance
// ============================================

/// Builds and signs token pairs
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            clock,
        }
    }

    /// Issue an access/refresh pair for a user
    pub fn issue(&self, user: &User) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.sign(user, TokenKind::Access)?,
            refresh_token: self.sign(user, TokenKind::Refresh)?,
        })
    }

    fn sign(&self, user: &User, kind: TokenKind) -> Result<String, AuthError> {
        let now = self.clock.now();
        let exp = now + kind.ttl();

        let claims = Claims {
            sub: user.id.to_string(),
            user_id: user.id,
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            kind,
            jti: Uuid::new_v4(),
        };

        encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key).map_err(|err| {
            tracing::error!(user_id = user.id, ?kind, "Token signing failed: {:?}", err);
            AuthError::Internal
        })
    }
}

// ============================================
// Validation
// ============================================

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Verifies token structure, algorithm, signature, expiry and kind
#[derive(Clone)]
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl TokenValidator {
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        // Expiry is checked against the injected clock below.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            clock,
        }
    }

    /// Validate a token and return its claims
    pub fn validate(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        check_algorithm(token)?;

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|err| {
            tracing::debug!("Token validation failed: {:?}", err);
            match err.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::InvalidAlgorithm => TokenError::WrongAlgorithm,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;
        let claims = data.claims;

        if self.clock.now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        if claims.kind != expected {
            tracing::debug!(
                user_id = claims.user_id,
                presented = ?claims.kind,
                ?expected,
                "Token kind mismatch"
            );
            return Err(TokenError::WrongAlgorithm);
        }

        if claims.sub != claims.user_id.to_string() {
            return Err(TokenError::Malformed);
        }

        Ok(claims)
    }
}

/// Reject anything outside the HMAC family, `none` included, before any
/// signature work.
fn check_algorithm(token: &str) -> Result<(), TokenError> {
    let mut segments = token.split('.');
    let header = segments.next().ok_or(TokenError::Malformed)?;
    if segments.count() != 2 {
        return Err(TokenError::Malformed);
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| TokenError::Malformed)?;
    let header: RawHeader = serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)?;

    match header.alg.as_str() {
        "HS256" | "HS384" | "HS512" => Ok(()),
        other => {
            tracing::debug!(alg = other, "Rejected token algorithm");
            Err(TokenError::WrongAlgorithm)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{TimeZone, Utc};

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn user() -> User {
        let now = Utc::now();
        User {
            id: 1,
            email: "a@x.com".into(),
            password_hash: String::new(),
            first_name: "A".into(),
            last_name: "B".into(),
            country: "US".into(),
            language: "en".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn setup() -> (ManualClock, TokenIssuer, TokenValidator) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        let issuer = TokenIssuer::new(SECRET, Arc::new(clock.clone()));
        let validator = TokenValidator::new(SECRET, Arc::new(clock.clone()));
        (clock, issuer, validator)
    }

    fn b64(json: &str) -> String {
        URL_SAFE_NO_PAD.encode(json.as_bytes())
    }

    #[test]
    fn access_token_validates_with_matching_claims() {
        let (clock, issuer, validator) = setup();
        let pair = issuer.issue(&user()).unwrap();

        let claims = validator.validate(&pair.access_token, TokenKind::Access).unwrap();
        assert_eq!(claims.user_id, 1);
        assert_eq!(claims.sub, "1");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.iat, clock.now().timestamp());
        assert_eq!(claims.exp - claims.iat, ACCESS_TOKEN_TTL_SECS);
    }

    #[test]
    fn refresh_token_has_seven_day_ttl() {
        let (_, issuer, validator) = setup();
        let pair = issuer.issue(&user()).unwrap();

        let claims = validator.validate(&pair.refresh_token, TokenKind::Refresh).unwrap();
        assert_eq!(claims.kind, TokenKind::Refresh);
        assert_eq!(claims.exp - claims.iat, REFRESH_TOKEN_TTL_SECS);
    }

    #[test]
    fn pair_tokens_have_distinct_ids() {
        let (_, issuer, validator) = setup();
        let pair = issuer.issue(&user()).unwrap();

        let access = validator.validate(&pair.access_token, TokenKind::Access).unwrap();
        let refresh = validator.validate(&pair.refresh_token, TokenKind::Refresh).unwrap();
        assert_ne!(access.jti, refresh.jti);
    }

    #[test]
    fn access_token_expires_after_fifteen_minutes() {
        let (clock, issuer, validator) = setup();
        let pair = issuer.issue(&user()).unwrap();

        clock.advance(Duration::minutes(14));
        assert!(validator.validate(&pair.access_token, TokenKind::Access).is_ok());

        clock.advance(Duration::minutes(2));
        assert_eq!(
            validator.validate(&pair.access_token, TokenKind::Access),
            Err(TokenError::Expired)
        );

        // the refresh token is still inside its own window
        assert!(validator.validate(&pair.refresh_token, TokenKind::Refresh).is_ok());
    }

    #[test]
    fn token_is_expired_at_exact_expiry() {
        let (clock, issuer, validator) = setup();
        let pair = issuer.issue(&user()).unwrap();

        clock.advance(Duration::seconds(ACCESS_TOKEN_TTL_SECS));
        assert_eq!(
            validator.validate(&pair.access_token, TokenKind::Access),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn refresh_token_expires_after_seven_days() {
        let (clock, issuer, validator) = setup();
        let pair = issuer.issue(&user()).unwrap();

        clock.advance(Duration::days(7) + Duration::seconds(1));
        assert_eq!(
            validator.validate(&pair.refresh_token, TokenKind::Refresh),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn different_secret_is_bad_signature() {
        let (clock, _, validator) = setup();
        let other = TokenIssuer::new(b"ffffffffffffffffffffffffffffffff", Arc::new(clock));
        let pair = other.issue(&user()).unwrap();

        assert_eq!(
            validator.validate(&pair.access_token, TokenKind::Access),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn tampered_payload_is_bad_signature() {
        let (clock, issuer, validator) = setup();
        let pair = issuer.issue(&user()).unwrap();
        let parts: Vec<&str> = pair.access_token.split('.').collect();

        let forged = format!(
            r#"{{"sub":"2","user_id":2,"email":"b@x.com","iat":{now},"exp":{exp},"kind":"access","jti":"{jti}"}}"#,
            now = clock.now().timestamp(),
            exp = clock.now().timestamp() + 600,
            jti = Uuid::new_v4(),
        );
        let token = format!("{}.{}.{}", parts[0], b64(&forged), parts[2]);

        assert_eq!(
            validator.validate(&token, TokenKind::Access),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn non_mac_algorithm_is_rejected() {
        let (_, issuer, validator) = setup();
        let pair = issuer.issue(&user()).unwrap();
        let parts: Vec<&str> = pair.access_token.split('.').collect();

        let rs256 = format!(
            "{}.{}.{}",
            b64(r#"{"alg":"RS256","typ":"JWT"}"#),
            parts[1],
            parts[2]
        );
        assert_eq!(
            validator.validate(&rs256, TokenKind::Access),
            Err(TokenError::WrongAlgorithm)
        );

        let none = format!("{}.{}.", b64(r#"{"alg":"none","typ":"JWT"}"#), parts[1]);
        assert_eq!(
            validator.validate(&none, TokenKind::Access),
            Err(TokenError::WrongAlgorithm)
        );
    }

    #[test]
    fn other_hmac_variants_are_accepted() {
        let (clock, _, validator) = setup();
        let now = clock.now().timestamp();
        let claims = Claims {
            sub: "1".into(),
            user_id: 1,
            email: "a@x.com".into(),
            iat: now,
            exp: now + 60,
            kind: TokenKind::Access,
            jti: Uuid::new_v4(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(validator.validate(&token, TokenKind::Access), Ok(claims));
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let (_, issuer, validator) = setup();
        let pair = issuer.issue(&user()).unwrap();

        assert_eq!(
            validator.validate(&pair.refresh_token, TokenKind::Access),
            Err(TokenError::WrongAlgorithm)
        );
        assert_eq!(
            validator.validate(&pair.access_token, TokenKind::Refresh),
            Err(TokenError::WrongAlgorithm)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let (_, _, validator) = setup();

        for token in ["", "abc", "a.b", "a.b.c.d", "!!!.e30.sig"] {
            assert_eq!(
                validator.validate(token, TokenKind::Access),
                Err(TokenError::Malformed),
                "{token:?}"
            );
        }
    }

    #[test]
    fn missing_claims_are_malformed() {
        let (_, _, validator) = setup();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "sub": "1", "exp": 4_102_444_800_i64 }),
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(
            validator.validate(&token, TokenKind::Access),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn subject_must_match_user_id() {
        let (clock, _, validator) = setup();
        let now = clock.now().timestamp();
        let claims = Claims {
            sub: "99".into(),
            user_id: 1,
            email: "a@x.com".into(),
            iat: now,
            exp: now + 60,
            kind: TokenKind::Access,
            jti: Uuid::new_v4(),
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap();

        assert_eq!(
            validator.validate(&token, TokenKind::Access),
            Err(TokenError::Malformed)
        );
    }
}
