//! Login, registration and password reset pages

use std::time::Duration;

use action_locator::Target;
use action_primitives::{Step, Verdict};
use serde::{Deserialize, Serialize};
use storefront_core_types::AnchorDescriptor;
use tracing::info;

use crate::errors::SuiteError;
use crate::scenario::ScenarioContext;
use crate::services::MailInbox;

/// Budget for spotting a validation message after submit
const MESSAGE_WAIT: Duration = Duration::from_secs(5);

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const EMAIL_REQUIRED: &str = "Email is required";
pub const PASSWORD_REQUIRED: &str = "Password is required";
pub const PASSWORDS_MUST_MATCH: &str = "Passwords must match";
pub const VERIFY_EMAIL_NOTICE: &str = "Please check your email to activate your account";

/// Text box located by its placeholder, with the accessible name as the
/// fallback.
fn placeholder_box(name: &str, placeholder: &str) -> Target {
    Target::new(name)
        .candidate(format!(r#"input[placeholder="{}"]"#, placeholder))
        .candidate(AnchorDescriptor::aria("textbox", placeholder))
}

fn named_input(name: &str, input: &str) -> Target {
    Target::new(name)
        .candidate(format!(r#"input[name="{}"]"#, input))
        .candidate(format!(r#"#{}"#, input))
}

fn message_target(text: &str) -> Target {
    Target::new(format!("message '{}'", text)).candidate(AnchorDescriptor::text(text))
}

/// Whether `text` shows up on the page within the message budget.
async fn message_visible(ctx: &ScenarioContext, text: &str) -> Result<bool, SuiteError> {
    let opts = ctx
        .resolve_options()
        .with_budget(MESSAGE_WAIT)
        .without_capture();
    Ok(ctx.resolve_with(&message_target(text), &opts).await?.is_found())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl UserInfo {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            first_name: "Test".into(),
            last_name: "User".into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

pub struct LoginPage<'a> {
    ctx: &'a ScenarioContext,
}

impl<'a> LoginPage<'a> {
    pub fn new(ctx: &'a ScenarioContext) -> Self {
        Self { ctx }
    }

    pub fn email_target() -> Target {
        placeholder_box("login email", "Email")
            .candidate(r#"input[name="username"]"#)
            .slug("login-email-debug")
    }

    pub fn password_target() -> Target {
        placeholder_box("login password", "Password")
            .candidate(r#"input[name="password"]"#)
            .slug("login-password-debug")
    }

    pub fn submit_target() -> Target {
        Target::new("log in")
            .slug("login-submit-debug")
            .candidate(AnchorDescriptor::aria("button", "Log In"))
            .candidate(r#"button:has-text("Log In")"#)
            .candidate(r#"input[type="submit"]"#)
    }

    pub fn register_link_target() -> Target {
        Target::new("register link")
            .slug("register-link-debug")
            .candidate(AnchorDescriptor::aria("link", "Register"))
            .candidate(AnchorDescriptor::exact_text("Register"))
    }

    pub async fn open(&self) -> Result<(), SuiteError> {
        let url = self.ctx.config().site.login_url.clone();
        self.ctx.goto(&url).await
    }

    /// Fill whatever credentials are given and submit.
    pub async fn login(&self, email: Option<&str>, password: Option<&str>) -> Result<(), SuiteError> {
        if let Some(email) = email {
            self.ctx.fill(Self::email_target(), email).await?;
        }
        if let Some(password) = password {
            self.ctx.fill(Self::password_target(), password).await?;
        }
        self.ctx.click(Self::submit_target()).await?;
        Ok(())
    }

    /// Text of the generic error banner, empty when none shows.
    pub async fn error_message(&self) -> Result<String, SuiteError> {
        let target = Target::new("login error").candidate(".error-message");
        let opts = self
            .ctx
            .resolve_options()
            .with_budget(MESSAGE_WAIT)
            .without_capture();
        match self.ctx.resolve_with(&target, &opts).await?.found() {
            Some(found) => Ok(found.element.text().await?.trim().to_string()),
            None => Ok(String::new()),
        }
    }

    pub async fn message_visible(&self, text: &str) -> Result<bool, SuiteError> {
        message_visible(self.ctx, text).await
    }

    pub async fn go_to_register(&self) -> Result<Verdict, SuiteError> {
        self.ctx.click(Self::register_link_target()).await
    }
}

pub struct RegisterPage<'a> {
    ctx: &'a ScenarioContext,
}

impl<'a> RegisterPage<'a> {
    pub fn new(ctx: &'a ScenarioContext) -> Self {
        Self { ctx }
    }

    pub fn first_name_target() -> Target {
        named_input("first name", "firstName").candidate(r#"input[placeholder="First Name"]"#)
    }

    pub fn last_name_target() -> Target {
        named_input("last name", "lastName").candidate(r#"input[placeholder="Last Name"]"#)
    }

    pub fn email_target() -> Target {
        named_input("register email", "email").candidate(r#"input[placeholder="Email"]"#)
    }

    pub fn password_target() -> Target {
        named_input("register password", "password").candidate(r#"input[placeholder="Password"]"#)
    }

    pub fn confirm_password_target() -> Target {
        named_input("confirm password", "password-confirm")
            .candidate(r#"input[placeholder="Confirm Password"]"#)
    }

    pub fn submit_target() -> Target {
        Target::new("register")
            .slug("register-submit-debug")
            .candidate(r#"input[value="Register"]"#)
            .candidate(AnchorDescriptor::aria("button", "Register"))
    }

    /// Fill the form for `user` and submit. Validation messages are left
    /// for the caller to check.
    pub async fn register(&self, user: &UserInfo, confirm: Option<&str>) -> Result<(), SuiteError> {
        self.ctx.fill(Self::first_name_target(), &user.first_name).await?;
        self.ctx.fill(Self::last_name_target(), &user.last_name).await?;
        self.ctx.fill(Self::email_target(), &user.email).await?;
        self.ctx.fill(Self::password_target(), &user.password).await?;
        self.ctx
            .fill(
                Self::confirm_password_target(),
                confirm.unwrap_or(&user.password),
            )
            .await?;
        self.ctx
            .perform(
                Step::click(Self::submit_target())
                    .with_policy(self.ctx.retry_policy())
                    .with_slug("register-submit-debug"),
            )
            .await?;
        info!(email = %user.email, "registration submitted");
        Ok(())
    }

    pub async fn message_visible(&self, text: &str) -> Result<bool, SuiteError> {
        message_visible(self.ctx, text).await
    }
}

pub struct ForgotPasswordPage<'a> {
    ctx: &'a ScenarioContext,
}

impl<'a> ForgotPasswordPage<'a> {
    pub fn new(ctx: &'a ScenarioContext) -> Self {
        Self { ctx }
    }

    pub fn heading_target() -> Target {
        Target::new("forgot password heading")
            .candidate(AnchorDescriptor::css_with_text("h1, h2, h3", "Forgot Password"))
            .candidate(AnchorDescriptor::aria("heading", "Forgot Password"))
    }

    pub fn email_target() -> Target {
        placeholder_box("reset email", "you@example.com")
            .candidate(r#"input[type="email"]"#)
            .slug("forgot-password-email-debug")
    }

    pub fn submit_target() -> Target {
        Target::new("send reset link")
            .slug("forgot-password-submit-debug")
            .candidate(r#"button:has-text("Send Reset Link")"#)
            .candidate(AnchorDescriptor::aria("button", "Send Reset Link"))
    }

    pub fn success_target() -> Target {
        Target::new("reset confirmation")
            .candidate(".success-message, .alert-success")
            .candidate(AnchorDescriptor::text("sent"))
    }

    pub async fn open(&self) -> Result<(), SuiteError> {
        let url = self.ctx.config().site.forgot_password_url.clone();
        self.ctx.goto(&url).await
    }

    pub async fn has_heading(&self) -> Result<bool, SuiteError> {
        Ok(self.ctx.find(&Self::heading_target()).await?.is_some())
    }

    pub async fn request_reset(&self, email: &str) -> Result<(), SuiteError> {
        self.ctx.fill(Self::email_target(), email).await?;
        self.ctx.click(Self::submit_target()).await?;
        Ok(())
    }

    /// Confirmation text, if one appeared.
    pub async fn success_message(&self) -> Result<Option<String>, SuiteError> {
        let opts = self
            .ctx
            .resolve_options()
            .with_budget(MESSAGE_WAIT)
            .without_capture();
        match self.ctx.resolve_with(&Self::success_target(), &opts).await?.found() {
            Some(found) => Ok(Some(found.element.text().await?.trim().to_string())),
            None => Ok(None),
        }
    }

    pub async fn error_message(&self) -> Result<Option<String>, SuiteError> {
        let target = Target::new("reset error").candidate(".error-message");
        let opts = self
            .ctx
            .resolve_options()
            .with_budget(MESSAGE_WAIT)
            .without_capture();
        match self.ctx.resolve_with(&target, &opts).await?.found() {
            Some(found) => Ok(Some(found.element.text().await?.trim().to_string())),
            None => Ok(None),
        }
    }
}

/// Register `user` from the login page, then open the verification link
/// sent to their inbox. Returns the link that was followed.
pub async fn create_and_verify_account(
    ctx: &ScenarioContext,
    user: &UserInfo,
) -> Result<String, SuiteError> {
    let login = LoginPage::new(ctx);
    login.open().await?;
    login.go_to_register().await?;
    RegisterPage::new(ctx).register(user, None).await?;

    let link = MailInbox::from_context(ctx)
        .verification_link(ctx, &user.email)
        .await?;
    ctx.goto(&link).await?;
    info!(email = %user.email, "account verified");
    Ok(link)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_box_prefers_exact_placeholder() {
        let target = RegisterPage::password_target();
        assert_eq!(target.candidates[0], AnchorDescriptor::css(r#"input[name="password"]"#));
        assert_eq!(
            target.candidates[2],
            AnchorDescriptor::css(r#"input[placeholder="Password"]"#)
        );
    }

    #[test]
    fn login_targets_carry_debug_slugs() {
        assert_eq!(LoginPage::email_target().slug, "login-email-debug");
        assert_eq!(LoginPage::submit_target().candidates.len(), 3);
    }
}
