pub mod logging;
pub mod provider;
