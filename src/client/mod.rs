//! Consumer side: pull the token from a running notifier and drop it into a
//! dotenv file for scripts that read it from the environment.

pub mod env_file;
pub mod notifier;

pub use notifier::{FetchOutcome, FetchedToken, NotifierClient};
