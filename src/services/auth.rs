// src/services/auth.rs

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::{
    common::error::AppError,
    db::Store,
    models::auth::{Claims, UserResponse},
};

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, jwt_secret: String) -> Self {
        Self { store, jwt_secret }
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<(String, UserResponse), AppError> {
        let user = self.store.create_user(email, password).await?;
        let user = UserResponse::from(user);
        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(String, UserResponse), AppError> {
        let user = self.store.verify_credentials(email, password).await?;
        let user = UserResponse::from(user);
        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    /// The claims carry everything the request pipeline needs, so token
    /// validation never touches the store.
    pub fn validate_token(&self, token: &str) -> Result<UserResponse, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(UserResponse {
            id: token_data.claims.sub,
            email: token_data.claims.email,
        })
    }

    fn create_token(&self, user: &UserResponse) -> Result<String, AppError> {
        let expires_at = Utc::now() + chrono::Duration::days(7);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            exp: expires_at.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocalStore;

    #[tokio::test]
    async fn issued_tokens_validate_back_to_the_same_user() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalStore::new(dir.path().join("db.json")));
        let service = AuthService::new(store, "test-secret".to_string());

        let (token, user) = service.sign_in("staff@tanchoice.com", "pw").await.unwrap();
        let validated = service.validate_token(&token).unwrap();
        assert_eq!(validated.id, user.id);
        assert_eq!(validated.email, "staff@tanchoice.com");
    }

    #[tokio::test]
    async fn garbage_tokens_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalStore::new(dir.path().join("db.json")));
        let service = AuthService::new(store, "test-secret".to_string());
        assert!(matches!(
            service.validate_token("not-a-token"),
            Err(AppError::InvalidToken)
        ));
    }
}
