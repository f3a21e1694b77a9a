//! Page objects for the storefront under test

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod email;
pub mod home;
pub mod price;
pub mod product_detail;
pub mod products;
pub mod search;
pub mod service;
pub mod support;

pub use auth::{create_and_verify_account, ForgotPasswordPage, LoginPage, RegisterPage, UserInfo};
pub use cart::CartPage;
pub use checkout::CheckoutPage;
pub use home::HomePage;
pub use product_detail::ProductDetailPage;
pub use products::ProductsPage;
pub use search::{SearchOutcome, SearchResultsPage};
pub use service::{ServiceCard, ServicePage, SERVICES};
pub use support::{SupportField, SupportPage, SupportRequest, Submission};
