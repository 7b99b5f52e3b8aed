use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::UserRole;
use crate::common::Email;

/// Session lifetime
const TOKEN_TTL_HOURS: i64 = 24;

/// JWT Claims - data stored in the token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,    // Subject (user email)
    pub role: UserRole, // Role at login time, drives dashboard access
    pub exp: i64,       // Expiration timestamp
    pub iat: i64,       // Issued at timestamp
    pub iss: String,    // Issuer
    pub jti: String,    // JWT ID (unique token identifier)
}

/// JWT Service - creates and verifies session tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl JwtService {
    pub fn new(secret: &str, issuer: String) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
        }
    }

    /// Create a session token for a user; expires after 24 hours
    pub fn create_token(&self, email: &Email, role: UserRole) -> Result<String> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::hours(TOKEN_TTL_HOURS);

        let claims = Claims {
            sub: email.to_string(),
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(Into::into)
    }

    /// Verify and decode a token; fails when expired, forged or from another issuer
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> Email {
        Email::parse("ana@uni.edu").unwrap()
    }

    #[test]
    fn test_token_carries_email_and_role() {
        let service = JwtService::new("test_secret_key", "test_issuer".to_string());

        let token = service.create_token(&email(), UserRole::University).unwrap();
        let claims = service.verify_token(&token).unwrap();

        assert_eq!(claims.sub, "ana@uni.edu");
        assert_eq!(claims.role, UserRole::University);
        assert_eq!(claims.iss, "test_issuer");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service1 = JwtService::new("secret1", "test_issuer".to_string());
        let service2 = JwtService::new("secret2", "test_issuer".to_string());

        let token = service1.create_token(&email(), UserRole::Student).unwrap();

        assert!(service2.verify_token(&token).is_err());
    }

    #[test]
    fn test_other_issuer_rejected() {
        let ours = JwtService::new("shared", "mindsync".to_string());
        let theirs = JwtService::new("shared", "someone-else".to_string());

        let token = theirs.create_token(&email(), UserRole::Student).unwrap();

        assert!(ours.verify_token(&token).is_err());
    }

    #[test]
    fn test_expiry_is_a_day_out() {
        let service = JwtService::new("test_secret_key", "test_issuer".to_string());
        let token = service.create_token(&email(), UserRole::Company).unwrap();

        let claims = service.verify_token(&token).unwrap();

        let expires_in = claims.exp - chrono::Utc::now().timestamp();
        assert!(expires_in > 23 * 3600);
        assert!(expires_in <= 24 * 3600);
    }
}
