pub mod attachment;
pub mod auth;
pub mod catalog;
pub mod group;
pub mod issue;
pub mod project;
pub mod user;

use crate::config;

/// External base URL for self links.
pub(crate) fn base_url() -> &'static str {
    &config::config().server.base_url
}
