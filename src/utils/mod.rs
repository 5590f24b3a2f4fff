pub mod env;
pub mod helpers;
pub mod logging;
