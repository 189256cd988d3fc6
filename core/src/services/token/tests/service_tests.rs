//! Unit tests for the authorization token service

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{Duration, Utc};
use tv_shared::TokenConfig;

use crate::domain::entities::credential::CredentialClaims;
use crate::domain::entities::user::UserRecord;
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::{MockUserRepository, UserRepository};
use crate::services::encryption::{AesGcmTokenCipher, TokenCipher};
use crate::services::token::{
    AuthorizationTokenService, CredentialGenerator, CredentialSigner, CredentialStatus,
    JwtCredentialSigner, TokenServiceConfig,
};

const SECRET: &str = "service-test-secret";
const KEY: [u8; 32] = [9u8; 32];

fn create_test_service(
    repository: Arc<MockUserRepository>,
) -> AuthorizationTokenService<MockUserRepository> {
    let config = TokenConfig::new(SECRET, BASE64.encode(KEY));
    AuthorizationTokenService::from_config(repository, &config)
        .expect("Failed to create token service")
}

fn test_cipher() -> AesGcmTokenCipher {
    AesGcmTokenCipher::new(&KEY).unwrap()
}

fn verify_stored(service: &AuthorizationTokenService<MockUserRepository>, stored: &str) -> CredentialStatus {
    let credential = test_cipher().decrypt(stored).unwrap();
    service.generator().verify(&credential)
}

async fn plant_credential(repository: &MockUserRepository, user_id: &str, credential: &str) -> String {
    let stored = test_cipher().encrypt(credential).unwrap();
    assert!(repository.force_token(user_id, Some(stored.clone())).await);
    stored
}

/// Cipher that stores credentials as-is
struct PlainCipher;

impl TokenCipher for PlainCipher {
    fn encrypt(&self, plaintext: &str) -> DomainResult<String> {
        Ok(plaintext.to_string())
    }

    fn decrypt(&self, ciphertext: &str) -> DomainResult<String> {
        Ok(ciphertext.to_string())
    }
}

/// Signer handing out scripted credentials, then a fixed fallback
struct ScriptedSigner {
    outputs: Mutex<VecDeque<String>>,
    fallback: String,
    status: CredentialStatus,
}

impl ScriptedSigner {
    fn new(outputs: &[&str], fallback: &str, status: CredentialStatus) -> Self {
        Self {
            outputs: Mutex::new(outputs.iter().map(|s| s.to_string()).collect()),
            fallback: fallback.to_string(),
            status,
        }
    }

    fn constant(output: &str, status: CredentialStatus) -> Self {
        Self::new(&[], output, status)
    }
}

impl CredentialSigner for ScriptedSigner {
    fn sign(&self, _claims: &CredentialClaims) -> DomainResult<String> {
        let mut outputs = self.outputs.lock().unwrap();
        Ok(outputs.pop_front().unwrap_or_else(|| self.fallback.clone()))
    }

    fn verify(&self, _credential: &str) -> CredentialStatus {
        self.status.clone()
    }
}

/// Directory whose token lookups never see concurrent writers' values
struct StaleLookupRepository {
    inner: MockUserRepository,
}

#[async_trait]
impl UserRepository for StaleLookupRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, DomainError> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_authorization_token(
        &self,
        _token: &str,
    ) -> Result<Option<UserRecord>, DomainError> {
        Ok(None)
    }

    async fn create(&self, user: UserRecord) -> Result<UserRecord, DomainError> {
        self.inner.create(user).await
    }

    async fn update_authorization_token(&self, id: &str, token: &str) -> Result<(), DomainError> {
        self.inner.update_authorization_token(id, token).await
    }
}

fn scripted_service<R: UserRepository>(
    repository: Arc<R>,
    signer: ScriptedSigner,
) -> AuthorizationTokenService<R, ScriptedSigner, PlainCipher> {
    AuthorizationTokenService::new(repository, signer, PlainCipher, TokenServiceConfig::default())
        .expect("Failed to create token service")
}

#[tokio::test]
async fn test_issue_unknown_user() {
    let repository = Arc::new(MockUserRepository::new());
    let service = create_test_service(repository.clone());

    let result = service.issue("u1").await;

    assert!(matches!(
        result.unwrap_err(),
        DomainError::Token(TokenError::UserNotFound { user_id }) if user_id == "u1"
    ));
    assert_eq!(repository.token_write_count(), 0);
}

#[tokio::test]
async fn test_issue_persists_encrypted_token() {
    let repository = Arc::new(MockUserRepository::with_users(["u2"]));
    let service = create_test_service(repository.clone());

    let token = service.issue("u2").await.unwrap();

    let stored = repository.find_by_id("u2").await.unwrap().unwrap();
    assert_eq!(stored.stored_token(), Some(token.as_str()));
    assert_eq!(repository.token_write_count(), 1);

    // Never stored in the clear
    assert_eq!(token.split('.').count(), 1);
    match verify_stored(&service, &token) {
        CredentialStatus::Valid(claims) => assert_eq!(claims.sub, "u2"),
        other => panic!("expected valid credential, got {:?}", other),
    }
}

#[tokio::test]
async fn test_issue_twice_replaces_token() {
    let repository = Arc::new(MockUserRepository::with_users(["u2"]));
    let service = create_test_service(repository.clone());

    let first = service.issue("u2").await.unwrap();
    let second = service.issue("u2").await.unwrap();

    assert_ne!(first, second);
    let stored = repository.find_by_id("u2").await.unwrap().unwrap();
    assert_eq!(stored.stored_token(), Some(second.as_str()));
    assert!(repository.find_by_authorization_token(&first).await.unwrap().is_none());
}

#[tokio::test]
async fn test_issue_collision_with_other_user() {
    let repository = Arc::new(MockUserRepository::with_users(["u1", "u2"]));
    repository.force_token("u1", Some("dup".to_string())).await;
    let service = scripted_service(
        repository.clone(),
        ScriptedSigner::constant("dup", CredentialStatus::Invalid),
    );

    let result = service.issue("u2").await;

    assert!(matches!(
        result.unwrap_err(),
        DomainError::Token(TokenError::TokenCollision)
    ));
    assert_eq!(repository.token_write_count(), 0);
    let u2 = repository.find_by_id("u2").await.unwrap().unwrap();
    assert!(u2.authorization_token.is_none());
}

#[tokio::test]
async fn test_issue_collision_with_own_token() {
    let repository = Arc::new(MockUserRepository::with_users(["u2"]));
    repository.force_token("u2", Some("same".to_string())).await;
    let service = scripted_service(
        repository.clone(),
        ScriptedSigner::constant("same", CredentialStatus::Invalid),
    );

    let result = service.issue("u2").await;

    assert!(matches!(
        result.unwrap_err(),
        DomainError::Token(TokenError::TokenCollision)
    ));
    assert_eq!(repository.token_write_count(), 0);
}

#[tokio::test]
async fn test_issue_retries_after_collision() {
    let repository = Arc::new(MockUserRepository::with_users(["u1", "u2"]));
    repository.force_token("u1", Some("dup".to_string())).await;
    let service = scripted_service(
        repository.clone(),
        ScriptedSigner::new(&["dup", "dup"], "fresh", CredentialStatus::Invalid),
    );

    let token = service.issue("u2").await.unwrap();

    assert_eq!(token, "fresh");
    assert_eq!(repository.token_write_count(), 1);
}

#[tokio::test]
async fn test_issue_retries_when_directory_rejects_write() {
    let inner = MockUserRepository::with_users(["u1", "u2"]);
    inner.force_token("u1", Some("dup".to_string())).await;
    let repository = Arc::new(StaleLookupRepository { inner });
    let service = scripted_service(
        repository.clone(),
        ScriptedSigner::new(&["dup", "dup"], "fresh", CredentialStatus::Invalid),
    );

    let token = service.issue("u2").await.unwrap();

    assert_eq!(token, "fresh");
    let u1 = repository.find_by_id("u1").await.unwrap().unwrap();
    assert_eq!(u1.stored_token(), Some("dup"));
}

#[tokio::test]
async fn test_issue_respects_attempt_budget() {
    let inner = MockUserRepository::with_users(["u1", "u2"]);
    inner.force_token("u1", Some("dup".to_string())).await;
    let repository = Arc::new(StaleLookupRepository { inner });
    let config = TokenServiceConfig {
        max_issue_attempts: 1,
        ..Default::default()
    };
    let service = AuthorizationTokenService::new(
        repository,
        ScriptedSigner::new(&["dup"], "fresh", CredentialStatus::Invalid),
        PlainCipher,
        config,
    )
    .unwrap();

    let result = service.issue("u2").await;

    assert!(result.unwrap_err().is_collision());
}

#[tokio::test]
async fn test_issue_empty_user_id() {
    let repository = Arc::new(MockUserRepository::new());
    let service = create_test_service(repository);

    assert!(matches!(
        service.issue("").await.unwrap_err(),
        DomainError::Validation { .. }
    ));
}

#[tokio::test]
async fn test_issue_directory_unavailable() {
    let repository = Arc::new(MockUserRepository::with_users(["u2"]));
    repository.set_unavailable(true);
    let service = create_test_service(repository);

    assert!(matches!(
        service.issue("u2").await.unwrap_err(),
        DomainError::Directory { .. }
    ));
}

#[tokio::test]
async fn test_validate_unknown_user() {
    let repository = Arc::new(MockUserRepository::new());
    let service = create_test_service(repository);

    assert!(matches!(
        service.validate_and_refresh("u1").await.unwrap_err(),
        DomainError::Token(TokenError::UserNotFound { .. })
    ));
}

#[tokio::test]
async fn test_validate_without_token() {
    let repository = Arc::new(MockUserRepository::with_users(["u2", "u3"]));
    repository.force_token("u3", Some(String::new())).await;
    let service = create_test_service(repository);

    for user_id in ["u2", "u3"] {
        assert!(matches!(
            service.validate_and_refresh(user_id).await.unwrap_err(),
            DomainError::Token(TokenError::NoTokenFound { .. })
        ));
    }
}

#[tokio::test]
async fn test_validate_unexpired_token_is_idempotent() {
    let repository = Arc::new(MockUserRepository::with_users(["u2"]));
    let service = create_test_service(repository.clone());
    let issued = service.issue("u2").await.unwrap();
    let writes_after_issue = repository.token_write_count();

    let first = service.validate_and_refresh("u2").await.unwrap();
    let second = service.validate_and_refresh("u2").await.unwrap();

    assert_eq!(first, issued);
    assert_eq!(second, issued);
    assert_eq!(repository.token_write_count(), writes_after_issue);
}

#[tokio::test]
async fn test_validate_refreshes_expired_token() {
    let repository = Arc::new(MockUserRepository::with_users(["u2"]));
    let service = create_test_service(repository.clone());
    let expired = service
        .generator()
        .generate_at("u2", Utc::now() - Duration::minutes(61))
        .unwrap();
    let old = plant_credential(&repository, "u2", &expired).await;

    let refreshed = service.validate_and_refresh("u2").await.unwrap();

    assert_ne!(refreshed, old);
    assert_eq!(repository.token_write_count(), 1);
    let stored = repository.find_by_id("u2").await.unwrap().unwrap();
    assert_eq!(stored.stored_token(), Some(refreshed.as_str()));
    assert!(repository.find_by_authorization_token(&old).await.unwrap().is_none());

    // The replacement is encrypted like an issued token and verifies
    match verify_stored(&service, &refreshed) {
        CredentialStatus::Valid(claims) => assert_eq!(claims.sub, "u2"),
        other => panic!("expected valid credential, got {:?}", other),
    }

    // And a follow-up validation is a no-op
    assert_eq!(service.validate_and_refresh("u2").await.unwrap(), refreshed);
    assert_eq!(repository.token_write_count(), 1);
}

#[tokio::test]
async fn test_validate_undecryptable_token() {
    let repository = Arc::new(MockUserRepository::with_users(["u2"]));
    repository.force_token("u2", Some("garbage!".to_string())).await;
    let service = create_test_service(repository.clone());

    assert!(matches!(
        service.validate_and_refresh("u2").await.unwrap_err(),
        DomainError::Decryption { .. }
    ));
    assert_eq!(repository.token_write_count(), 0);
}

#[tokio::test]
async fn test_validate_token_signed_with_other_secret() {
    let repository = Arc::new(MockUserRepository::with_users(["u2"]));
    let service = create_test_service(repository.clone());
    let foreign = CredentialGenerator::new(
        JwtCredentialSigner::new("another-secret", "tokenvault").unwrap(),
        "tokenvault",
        Duration::hours(1),
    )
    .unwrap();
    let credential = foreign.generate("u2").unwrap();
    plant_credential(&repository, "u2", &credential).await;

    assert!(matches!(
        service.validate_and_refresh("u2").await.unwrap_err(),
        DomainError::Token(TokenError::InvalidToken)
    ));
    assert_eq!(repository.token_write_count(), 0);
}

#[tokio::test]
async fn test_validate_token_of_other_user() {
    let repository = Arc::new(MockUserRepository::with_users(["u1", "u2"]));
    let service = create_test_service(repository.clone());
    let credential = service.generator().generate("u1").unwrap();
    plant_credential(&repository, "u2", &credential).await;

    assert!(matches!(
        service.validate_and_refresh("u2").await.unwrap_err(),
        DomainError::Token(TokenError::InvalidToken)
    ));
}

#[tokio::test]
async fn test_refresh_collision_keeps_old_token() {
    let repository = Arc::new(MockUserRepository::with_users(["u1", "u2"]));
    repository.force_token("u1", Some("dup".to_string())).await;
    repository.force_token("u2", Some("old".to_string())).await;
    let service = scripted_service(
        repository.clone(),
        ScriptedSigner::constant("dup", CredentialStatus::Expired),
    );

    let result = service.validate_and_refresh("u2").await;

    assert!(matches!(
        result.unwrap_err(),
        DomainError::Token(TokenError::TokenCollision)
    ));
    let u2 = repository.find_by_id("u2").await.unwrap().unwrap();
    assert_eq!(u2.stored_token(), Some("old"));
}

#[tokio::test]
async fn test_authenticate_valid_token() {
    let repository = Arc::new(MockUserRepository::with_users(["u2"]));
    let service = create_test_service(repository);
    let token = service.issue("u2").await.unwrap();

    let holder = service.authenticate(&token).await.unwrap();

    assert_eq!(holder.id, "u2");
}

#[tokio::test]
async fn test_authenticate_expired_token() {
    let repository = Arc::new(MockUserRepository::with_users(["u2"]));
    let service = create_test_service(repository.clone());
    let expired = service
        .generator()
        .generate_at("u2", Utc::now() - Duration::hours(2))
        .unwrap();
    let stored = plant_credential(&repository, "u2", &expired).await;

    assert!(matches!(
        service.authenticate(&stored).await.unwrap_err(),
        DomainError::Token(TokenError::TokenExpired)
    ));
    // Presenting an expired token never refreshes it
    assert_eq!(repository.token_write_count(), 0);
}

#[tokio::test]
async fn test_authenticate_unknown_token() {
    let repository = Arc::new(MockUserRepository::with_users(["u2"]));
    let service = create_test_service(repository);
    let unheld = test_cipher().encrypt("whatever").unwrap();

    for token in ["", unheld.as_str()] {
        assert!(matches!(
            service.authenticate(token).await.unwrap_err(),
            DomainError::Token(TokenError::InvalidToken)
        ));
    }
}

#[tokio::test]
async fn test_authenticate_foreign_subject() {
    let repository = Arc::new(MockUserRepository::with_users(["u1", "u2"]));
    let service = create_test_service(repository.clone());
    let credential = service.generator().generate("u1").unwrap();
    let stored = plant_credential(&repository, "u2", &credential).await;

    assert!(matches!(
        service.authenticate(&stored).await.unwrap_err(),
        DomainError::Token(TokenError::InvalidToken)
    ));
}

#[tokio::test]
async fn test_out_of_range_lifetime_rejected() {
    for minutes in [0, -5, tv_shared::MAX_LIFETIME_MINUTES + 1, 100_000_000_000_000] {
        let repository = Arc::new(MockUserRepository::with_users(["u2"]));
        let config = TokenConfig::new(SECRET, BASE64.encode(KEY)).with_lifetime_minutes(minutes);

        let result = AuthorizationTokenService::from_config(repository, &config);

        assert!(
            matches!(result, Err(DomainError::Configuration { .. })),
            "lifetime {} accepted",
            minutes
        );
    }
}

#[tokio::test]
async fn test_short_lifetime_tokens_stay_valid_until_expiry() {
    let repository = Arc::new(MockUserRepository::with_users(["u2"]));
    let config = TokenConfig::new(SECRET, BASE64.encode(KEY)).with_lifetime_minutes(1);
    let service = AuthorizationTokenService::from_config(repository.clone(), &config).unwrap();

    let issued = service.issue("u2").await.unwrap();

    assert_eq!(service.validate_and_refresh("u2").await.unwrap(), issued);
    assert_eq!(service.authenticate(&issued).await.unwrap().id, "u2");
    assert_eq!(repository.token_write_count(), 1);
}

#[tokio::test]
async fn test_invalid_issuer_rejected() {
    for issuer in ["", "token vault"] {
        let repository = Arc::new(MockUserRepository::new());
        let config = TokenServiceConfig {
            issuer: issuer.to_string(),
            ..Default::default()
        };

        let result = AuthorizationTokenService::new(
            repository,
            ScriptedSigner::constant("t", CredentialStatus::Invalid),
            PlainCipher,
            config,
        );

        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}

#[tokio::test]
async fn test_whitespace_user_id_is_opaque() {
    let repository = Arc::new(MockUserRepository::with_users(["  "]));
    let service = create_test_service(repository);

    let token = service.issue("  ").await.unwrap();

    assert_eq!(service.validate_and_refresh("  ").await.unwrap(), token);
}

#[tokio::test]
async fn test_stored_token_fits_directory_column() {
    // Longest id the directory accepts, every character JSON-escaped to six bytes
    let user_id = "\u{1}".repeat(191);
    let repository = Arc::new(MockUserRepository::with_users([user_id.clone()]));
    let mut config = TokenConfig::new(SECRET, BASE64.encode(KEY));
    config.issuer = "i".repeat(tv_shared::MAX_ISSUER_LEN);
    let service = AuthorizationTokenService::from_config(repository, &config).unwrap();

    let token = service.issue(&user_id).await.unwrap();

    // users.authorization_token is VARCHAR(2560)
    assert!(token.len() <= 2560, "stored token is {} bytes", token.len());
}
