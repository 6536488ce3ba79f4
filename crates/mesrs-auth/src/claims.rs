//! JWT claim structures.
//!
//! - [`Claims`]: access token, carries the role and preferred language so
//!   requests can be authorized and localized without a database lookup
//! - [`RefreshTokenClaims`]: refresh token, identified by `jti` for revocation

use mesrs_core::Language;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Profile ID (subject claim)
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Preferred interface language stored on the profile
    #[serde(default)]
    pub lang: Language,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
    pub iat: usize,
    /// Unique token identifier, recorded on sign-out
    pub jti: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_round_trip_fields() {
        let id = Uuid::new_v4();
        let claims = Claims {
            sub: id.to_string(),
            email: "staff@mesrs.mr".to_string(),
            role: Role::Staff,
            lang: Language::Ar,
            exp: 1234567890,
            iat: 1234567800,
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""role":"staff""#));
        assert!(serialized.contains(r#""lang":"ar""#));
        assert_eq!(claims.user_id(), Some(id));
    }

    #[test]
    fn test_claims_default_language() {
        let json = r#"{"sub":"x","email":"a@b.mr","role":"student","exp":9999999999,"iat":9999999900}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.lang, Language::Fr);
        assert_eq!(claims.user_id(), None);
    }

    #[test]
    fn test_refresh_claims_do_not_parse_as_access_claims() {
        let refresh = RefreshTokenClaims {
            sub: Uuid::new_v4().to_string(),
            email: "a@b.mr".to_string(),
            exp: 1,
            iat: 1,
            jti: "jti".to_string(),
        };
        let json = serde_json::to_string(&refresh).unwrap();
        assert!(serde_json::from_str::<Claims>(&json).is_err());
    }
}
