pub mod esg;

pub use esg::{run_esg_checks, EsgRule, ESG_RULES};
