//! Collaborators outside the storefront: test inbox, PageSpeed, result log

pub mod mail;
pub mod pagespeed;
pub mod result_log;

pub use mail::{inbox_name, MailInbox};
pub use pagespeed::{AuditReport, CategoryScore, PageSpeedClient, Strategy};
pub use result_log::{ResultLog, ResultRow, RowSink, RowStatus};
