//! Unique disposable addresses for sign-up flows

use chrono::{DateTime, Local, TimeZone};

pub const TEST_MAIL_DOMAIN: &str = "mailinator.com";

/// `test{YYYYmmddHHMMSSmmm}@mailinator.com`
pub fn unique_email() -> String {
    unique_email_at(&Local::now(), TEST_MAIL_DOMAIN)
}

pub fn unique_email_at<Tz: TimeZone>(at: &DateTime<Tz>, domain: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("test{}@{}", at.format("%Y%m%d%H%M%S%3f"), domain)
}
