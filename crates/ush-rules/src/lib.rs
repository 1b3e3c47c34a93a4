//! Rule Descriptors, the built-in rule families, and the dispatch engine
//! that runs them over a parsed document and resolves their severities
//! through a Policy Repository.

pub mod builtin;
pub mod context;
pub mod descriptors;
pub mod engine;
pub mod util;

pub use builtin::{RuleFamily, FAMILIES};
pub use context::RuleContext;
pub use descriptors::{to_rule_definitions, RuleDescriptor, RULE_DESCRIPTORS};
pub use engine::analyze;
