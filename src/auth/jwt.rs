use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use uuid::Uuid;

use crate::{model::employee::Employee, models::Claims};

fn now() -> usize {
    Utc::now().timestamp().max(0) as usize
}

pub fn generate_access_token(employee: &Employee, secret: &str, ttl: usize) -> Result<String, Error> {
    let claims = Claims {
        user_id: employee.id.clone(),
        sub: employee.email.clone(),
        role: employee.role.id(),
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use crate::service::test_support::employee;

    #[test]
    fn token_carries_identity_and_role() {
        let hr = employee("Hana", "hana@corp.com", Role::Hr);
        let token = generate_access_token(&hr, "secret", 60).unwrap();

        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "hana@corp.com");
        assert_eq!(claims.user_id, hr.id);
        assert_eq!(Role::from_id(claims.role), Some(Role::Hr));

        assert!(verify_token(&token, "other-secret").is_err());
    }
}
