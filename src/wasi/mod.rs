//! The WASI embedding API.
//!
//! A [`wasi_config_t`] collects the guest's OS facade. It is consumed by
//! [`wasi_env_new`], which checks it against the module's WASI version and
//! installs the resulting context in the store. [`wasi_get_imports`] then
//! resolves the module's imports against that environment.

mod capture;
mod config;
mod deprecated;
mod env;
mod version;

pub use self::config::*;
pub use self::deprecated::*;
pub use self::env::*;
pub use self::version::*;
