//! Request Signup Use Case
//!
//! Registers a (user name, email) pair, or re-issues a code for an existing
//! matching pair, and mails the code to the stored address.

use std::sync::Arc;

use kernel::error::field::{FieldErrors, REQUIRED};
use platform::mail::{MailMessage, Mailer};

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::{AuthError, AuthResult};

/// Signup input
pub struct SignupInput {
    pub username: String,
    pub email: String,
}

/// Signup output (echo of the stored identity)
#[derive(Debug)]
pub struct SignupOutput {
    pub username: String,
    pub email: String,
    /// True when a new account was created
    pub created: bool,
}

/// Request signup use case
pub struct RequestSignupUseCase<R, M>
where
    R: UserRepository,
    M: Mailer,
{
    repo: Arc<R>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<R, M> RequestSignupUseCase<R, M>
where
    R: UserRepository,
    M: Mailer,
{
    pub fn new(repo: Arc<R>, mailer: Arc<M>, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            mailer,
            config,
        }
    }

    pub async fn execute(&self, input: SignupInput) -> AuthResult<SignupOutput> {
        let (username, email) = self.validate(input)?;

        let (mut user, created) = match self.resolve(&username, &email).await {
            // Concurrent first signup for the same pair: the other insert won
            Err(AuthError::UserNameTaken | AuthError::EmailTaken) => {
                self.resolve(&username, &email).await?
            }
            other => other?,
        };

        let code = user
            .issue_confirmation_code(self.config.confirmation_code_ttl()?)
            .ok_or_else(|| {
                AuthError::Internal("confirmation code expiry out of range".to_string())
            })?;
        if let Some(expires_at) = user.confirmation_code_expires_at {
            self.repo
                .store_confirmation_code(&user.user_id, &code, expires_at)
                .await?;
        }

        let message = MailMessage {
            from: self.config.mail_from.clone(),
            to: user.email.as_str().to_string(),
            subject: "YaMDb confirmation code".to_string(),
            text: format!(
                "Hello, {}!\n\nYour confirmation code: {}\n\nUse it to obtain an access token.",
                user.username,
                code.as_str()
            ),
        };
        self.mailer.send(&message).await?;

        tracing::info!(
            user_id = %user.user_id,
            username = %user.username,
            created,
            "Confirmation code issued"
        );

        Ok(SignupOutput {
            username: user.username.into_inner(),
            email: user.email.into_db(),
            created,
        })
    }

    fn validate(&self, input: SignupInput) -> AuthResult<(UserName, Email)> {
        let mut errors = FieldErrors::new();

        if input.username.trim().is_empty() {
            errors.push("username", REQUIRED);
        }
        if input.email.trim().is_empty() {
            errors.push("email", REQUIRED);
        }

        let username = if errors.contains("username") {
            None
        } else {
            errors.check(
                "username",
                UserName::new_with_reserved(&input.username, self.config.forbidden_usernames.as_slice()),
            )
        };
        let email = if errors.contains("email") {
            None
        } else {
            errors.check("email", Email::new(input.email))
        };

        match (username, email) {
            (Some(username), Some(email)) if errors.is_empty() => Ok((username, email)),
            _ => Err(AuthError::Validation(errors)),
        }
    }

    /// Find the matching account, refuse a half-matching one, or create it
    async fn resolve(&self, username: &UserName, email: &Email) -> AuthResult<(User, bool)> {
        if let Some(user) = self.repo.find_by_username(username).await? {
            if &user.email == email {
                return Ok((user, false));
            }
            tracing::debug!(username = %username, "Signup refused: user name bound to another email");
            return Err(AuthError::UserNameTaken);
        }

        if self.repo.find_by_email(email).await?.is_some() {
            tracing::debug!(username = %username, "Signup refused: email bound to another user name");
            return Err(AuthError::EmailTaken);
        }

        let user = User::new(username.clone(), email.clone());
        self.repo.create(&user).await?;
        Ok((user, true))
    }
}
