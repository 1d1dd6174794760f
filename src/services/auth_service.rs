use std::sync::Arc;

use crate::error::{Error, Result};
use crate::models::user::{NewUser, User};
use crate::services::google_service::{GoogleAuthService, GoogleClaims};
use crate::services::token_service::TokenService;
use crate::store::UserStore;
use crate::utils::crypto;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Name given to accounts provisioned from a Google token that carries no
/// profile name.
const GOOGLE_FALLBACK_NAME: &str = "Google User";

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
    google: Option<Arc<GoogleAuthService>>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: TokenService,
        google: Option<Arc<GoogleAuthService>>,
    ) -> Self {
        Self {
            users,
            tokens,
            google,
        }
    }

    pub async fn register(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> Result<(User, String)> {
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(Error::DuplicateEmail);
        }
        let password_hash = crypto::hash_password(&password)?;
        let user = self
            .users
            .insert(NewUser {
                name,
                email,
                password_hash: Some(password_hash),
                google_id: None,
            })
            .await?;
        let token = self.tokens.issue(user.id)?;
        Ok((user, token))
    }

    /// Unknown email, wrong password and password-less Google accounts all
    /// answer with the same message, so the response never reveals which
    /// emails exist.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String)> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| Error::BadRequest(INVALID_CREDENTIALS.to_string()))?;
        let matches = match user.password_hash.as_deref() {
            Some(hash) => crypto::verify_password(password, hash)?,
            None => false,
        };
        if !matches {
            return Err(Error::BadRequest(INVALID_CREDENTIALS.to_string()));
        }
        let token = self.tokens.issue(user.id)?;
        Ok((user, token))
    }

    pub async fn login_with_google(&self, id_token: &str) -> Result<(User, String)> {
        let google = self
            .google
            .as_ref()
            .ok_or_else(|| Error::Config("Google sign-in is not configured".to_string()))?;
        let claims = google.verify_id_token(id_token).await?;
        let user = self.resolve_google_account(claims).await?;
        let token = self.tokens.issue(user.id)?;
        Ok((user, token))
    }

    /// Finds or provisions the account for verified Google claims. Lookup
    /// goes by email first: an existing password account with the same email
    /// gets the Google subject linked on its first Google sign-in, and a
    /// subject already on file is never overwritten.
    pub async fn resolve_google_account(&self, claims: GoogleClaims) -> Result<User> {
        if let Some(user) = self.users.find_by_email(&claims.email).await? {
            if user.google_id.is_none() {
                let linked = self.users.link_google_id(user.id, &claims.sub).await?;
                return linked
                    .ok_or_else(|| Error::Internal("Account disappeared during Google link".to_string()));
            }
            return Ok(user);
        }
        let name = claims
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| GOOGLE_FALLBACK_NAME.to_string());
        self.users
            .insert(NewUser {
                name,
                email: claims.email,
                password_hash: None,
                google_id: Some(claims.sub),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemUserStore;
    use crate::store::MockUserStore;

    fn service_with(users: Arc<dyn UserStore>) -> AuthService {
        AuthService::new(users, TokenService::new("unit-test-secret", 3600), None)
    }

    fn claims(sub: &str, email: &str, name: Option<&str>) -> GoogleClaims {
        GoogleClaims {
            sub: sub.to_string(),
            email: email.to_string(),
            email_verified: Some(true),
            name: name.map(str::to_string),
            iss: "https://accounts.google.com".to_string(),
            aud: "client-id".to_string(),
            iat: 0,
            exp: 0,
        }
    }

    #[tokio::test]
    async fn google_resolution_links_an_existing_password_account() {
        let service = service_with(Arc::new(MemUserStore::new()));
        let (registered, _) = service
            .register(
                "Ada".to_string(),
                "ada@example.com".to_string(),
                "secret-password".to_string(),
            )
            .await
            .unwrap();

        let resolved = service
            .resolve_google_account(claims("google-1", "ada@example.com", Some("Ada L")))
            .await
            .unwrap();
        assert_eq!(resolved.id, registered.id);
        assert_eq!(resolved.google_id.as_deref(), Some("google-1"));

        // A different subject on a later sign-in must not replace the link.
        let again = service
            .resolve_google_account(claims("google-2", "ada@example.com", None))
            .await
            .unwrap();
        assert_eq!(again.id, registered.id);
        assert_eq!(again.google_id.as_deref(), Some("google-1"));
    }

    #[tokio::test]
    async fn google_resolution_provisions_unknown_emails() {
        let service = service_with(Arc::new(MemUserStore::new()));

        let named = service
            .resolve_google_account(claims("g-1", "new@example.com", Some("New Person")))
            .await
            .unwrap();
        assert_eq!(named.name, "New Person");
        assert!(named.password_hash.is_none());

        let anonymous = service
            .resolve_google_account(claims("g-2", "other@example.com", None))
            .await
            .unwrap();
        assert_eq!(anonymous.name, "Google User");
        assert_eq!(anonymous.google_id.as_deref(), Some("g-2"));
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_unknown_email_alike() {
        let service = service_with(Arc::new(MemUserStore::new()));
        service
            .register(
                "Ada".to_string(),
                "ada@example.com".to_string(),
                "secret-password".to_string(),
            )
            .await
            .unwrap();

        let wrong = service
            .login("ada@example.com", "wrong-password")
            .await
            .unwrap_err();
        let unknown = service
            .login("missing@example.com", "secret-password")
            .await
            .unwrap_err();
        for err in [wrong, unknown] {
            match err {
                Error::BadRequest(msg) => assert_eq!(msg, INVALID_CREDENTIALS),
                other => panic!("expected BadRequest, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn store_failures_surface_as_database_errors() {
        let mut users = MockUserStore::new();
        users
            .expect_find_by_email()
            .returning(|_| Err(Error::Database(sqlx::Error::PoolTimedOut)));

        let service = service_with(Arc::new(users));
        let err = service
            .login("ada@example.com", "secret-password")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Database(_)));
    }
}
