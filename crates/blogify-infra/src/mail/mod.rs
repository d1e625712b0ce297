//! Outgoing transactional email.

mod memory;
#[cfg(feature = "resend")]
mod resend;

pub use memory::InMemoryMailer;
#[cfg(feature = "resend")]
pub use resend::{ResendConfig, ResendMailer};
