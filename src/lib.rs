//! Remote control for a Jenkins server: list jobs, create them from
//! templates, trigger builds and wait for them to finish.
//!
//! ```no_run
//! use autojenkins::{Jenkins, Variables, WaitOptions};
//!
//! # fn main() -> autojenkins::Result<()> {
//! let jenkins = Jenkins::builder("https://ci.example.com")?
//!     .auth_basic("bot", "api-token")
//!     .build()?;
//!
//! let vars = Variables::from([("branch", "main")]);
//! jenkins.create_copy("app-main", "app-template", true, false, &vars)?;
//! let outcome = jenkins.build("app-main", &Variables::new(), Some(&WaitOptions::default()))?;
//! println!("{:?}", outcome.result());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod literal;
pub mod template;
pub mod transport;
pub mod types;
mod util;

pub use auth::{Auth, SecretString};
pub use client::{Jenkins, JenkinsBuilder};
pub use config::{ProxyConfig, ServerConfig};
pub use error::{BodySnippetConfig, Error, ErrorKind, HttpError, Result, TransportErrorKind};
pub use template::Variables;
pub use types::*;
