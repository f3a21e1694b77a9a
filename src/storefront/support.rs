//! Support request form

use action_locator::{ResolutionResult, Target};
use action_primitives::Verdict;
use serde::{Deserialize, Serialize};
use storefront_core_types::AnchorDescriptor;
use tracing::info;

use crate::errors::SuiteError;
use crate::scenario::ScenarioContext;

pub const FORM: &str = "form.w-full.max-w-2xl";
pub const CREATED_MESSAGE: &str = "Support request created successfully";
pub const TOO_LONG_MESSAGE: &str =
    "Error creating support request: value too long for type character varying(255)";
/// Column width of the text fields on the backend
pub const FIELD_LIMIT: usize = 255;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SupportField {
    FirstName,
    LastName,
    Email,
    PhoneNumber,
    Company,
    Address,
    Details,
}

impl SupportField {
    pub const ALL: [SupportField; 7] = [
        SupportField::FirstName,
        SupportField::LastName,
        SupportField::Email,
        SupportField::PhoneNumber,
        SupportField::Company,
        SupportField::Address,
        SupportField::Details,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SupportField::FirstName => "firstName",
            SupportField::LastName => "lastName",
            SupportField::Email => "email",
            SupportField::PhoneNumber => "phoneNumber",
            SupportField::Company => "company",
            SupportField::Address => "address",
            SupportField::Details => "details",
        }
    }

    fn tag(self) -> &'static str {
        match self {
            SupportField::Details => "textarea",
            _ => "input",
        }
    }

    pub fn target(self) -> Target {
        let name = self.name();
        Target::new(format!("support {}", name))
            .slug(format!("support-{}-debug", name))
            .candidate(format!(r#"{} {}[name="{}"]"#, FORM, self.tag(), name))
            .candidate(format!(r#"{}[name="{}"]"#, self.tag(), name))
            .candidate(format!(r#"[name="{}"]"#, name))
    }
}

/// Values for the support form; `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub details: Option<String>,
}

impl SupportRequest {
    pub fn complete() -> Self {
        Self {
            first_name: Some("John".into()),
            last_name: Some("Doe".into()),
            email: Some("john.doe@example.com".into()),
            phone_number: Some("1234567890".into()),
            company: Some("Test Company".into()),
            address: Some("123 Test Street".into()),
            details: Some("This is a test support request.".into()),
        }
    }

    pub fn value(&self, field: SupportField) -> Option<&str> {
        match field {
            SupportField::FirstName => self.first_name.as_deref(),
            SupportField::LastName => self.last_name.as_deref(),
            SupportField::Email => self.email.as_deref(),
            SupportField::PhoneNumber => self.phone_number.as_deref(),
            SupportField::Company => self.company.as_deref(),
            SupportField::Address => self.address.as_deref(),
            SupportField::Details => self.details.as_deref(),
        }
    }
}

/// What the page showed after submitting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "message", rename_all = "snake_case")]
pub enum Submission {
    Created,
    Rejected(String),
    /// Neither confirmation nor error appeared in time
    NoResponse,
}

pub struct SupportPage<'a> {
    ctx: &'a ScenarioContext,
}

impl<'a> SupportPage<'a> {
    pub fn new(ctx: &'a ScenarioContext) -> Self {
        Self { ctx }
    }

    pub fn form_target() -> Target {
        Target::new("support form")
            .slug("support-form-debug")
            .candidate(FORM)
            .candidate("main form")
            .candidate("form")
    }

    pub fn submit_target() -> Target {
        Target::new("support submit")
            .slug("support-submit-debug")
            .candidate(format!(r#"{} button[type="submit"]"#, FORM))
            .candidate(r#"button[type="submit"]"#)
            .candidate(AnchorDescriptor::aria("button", "Send"))
    }

    /// Confirmation first, then the error banners.
    pub fn response_target() -> Target {
        Target::new("support response")
            .slug("support-response-debug")
            .candidate(AnchorDescriptor::text(CREATED_MESSAGE))
            .candidate(AnchorDescriptor::text("Error creating support request"))
            .candidate(".error-message")
            .candidate(r#"[role="alert"]"#)
    }

    pub async fn open(&self) -> Result<(), SuiteError> {
        let url = self.ctx.config().site.support_url.clone();
        self.ctx.goto(&url).await?;
        self.ctx.require(&Self::form_target()).await?;
        Ok(())
    }

    pub async fn fill_field(&self, field: SupportField, value: &str) -> Result<Verdict, SuiteError> {
        self.ctx.fill(field.target(), value).await
    }

    /// Fill every field `request` sets, in form order.
    pub async fn fill(
        &self,
        request: &SupportRequest,
    ) -> Result<Vec<(SupportField, Verdict)>, SuiteError> {
        let mut verdicts = Vec::new();
        for field in SupportField::ALL {
            if let Some(value) = request.value(field) {
                verdicts.push((field, self.fill_field(field, value).await?));
            }
        }
        Ok(verdicts)
    }

    pub async fn submit(&self) -> Result<Submission, SuiteError> {
        self.ctx.click(Self::submit_target()).await?;
        self.response().await
    }

    pub async fn response(&self) -> Result<Submission, SuiteError> {
        let submission = match self.ctx.resolve(&Self::response_target()).await? {
            ResolutionResult::Found(found) if found.candidate_index == 0 => Submission::Created,
            ResolutionResult::Found(found) => {
                Submission::Rejected(found.element.text().await?.trim().to_string())
            }
            ResolutionResult::NotFound { .. } => Submission::NoResponse,
        };
        info!(?submission, "support form response");
        Ok(submission)
    }
}
