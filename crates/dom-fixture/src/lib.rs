//! In-memory page for exercising the locator and retrier without a browser.
//!
//! Pages are built from a declarative [`Node`] tree and queried with a small
//! CSS engine that covers the selector shapes the storefront suite uses
//! (escaped Tailwind classes, attribute operators, `:not`, `:has-text`,
//! child/descendant combinators). Tests mutate the page between calls to
//! simulate flaky DOM behaviour: hidden/disabled toggles, re-renders that
//! invalidate handles, failing clicks and screenshots.

mod dom;
mod node;
mod page;
mod selector;

pub use node::{ClickEffect, Node};
pub use page::{FakeBrowser, FakeElement, FakePage};
pub use selector::{parse_selector, SelectorList};
