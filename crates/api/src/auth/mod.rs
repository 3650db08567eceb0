pub mod adapter;
pub mod config;
pub mod cookie;
pub mod credentials;
pub mod csrf;
pub mod jwt;
pub mod oauth;
pub mod providers;
pub mod session;

pub use config::{AuthConfig, EmergencyCredentials};
pub use credentials::{Credentials, CredentialsAuthorizer, UserStore};
pub use jwt::{Claims, JwtService};
pub use oauth::OAuthService;
pub use providers::ProviderRegistry;
pub use session::{get_server_auth_session, Session, SessionUser};
