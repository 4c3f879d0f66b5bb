//! Merchant enrichment: transaction text to domains, domains to logo URLs.

mod directory;
mod logo;
mod resolver;

pub use logo::{FallbackChain, LogoProbe, LogoResolver, LogoSource};
pub use resolver::DomainResolver;

pub(crate) use logo::HttpProbe;
