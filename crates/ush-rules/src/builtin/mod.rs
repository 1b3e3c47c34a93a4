//! The seven rule families. Each module exposes a `FAMILY: RuleFamily`
//! constant the engine dispatches to; none of them know about each other or
//! about policy/severity resolution, only about how to find their own
//! pattern in a parsed tree.

pub mod api_exposure;
pub mod attributes;
pub mod language;
pub mod network_events;
pub mod runtime;
pub mod structure;
pub mod sync;

use crate::context::RuleContext;
use ush_core::diagnostics::Diagnostic;

/// A rule family as described in the design notes: the set of rule IDs it
/// may emit, and the function that walks the tree looking for them. The
/// engine treats families as an opaque callback table — a faulty family is
/// isolated by `engine::analyze`'s panic boundary, not by this type.
pub struct RuleFamily {
    pub name: &'static str,
    pub ids: &'static [&'static str],
    pub run: fn(&RuleContext) -> Vec<Diagnostic>,
}

pub const FAMILIES: &[RuleFamily] = &[
    RuleFamily {
        name: "network_events",
        ids: &["USH0001", "USH0002", "USH0003", "USH0004", "USH0005", "USH0006", "USH0043"],
        run: network_events::run,
    },
    RuleFamily {
        name: "synchronization",
        ids: &["USH0007", "USH0008", "USH0009", "USH0010", "USH0011", "USH0012"],
        run: sync::run,
    },
    RuleFamily {
        name: "api_exposure",
        ids: &["USH0013", "USH0014", "USH0015"],
        run: api_exposure::run,
    },
    RuleFamily {
        name: "runtime_restrictions",
        ids: &["USH0016", "USH0017", "USH0018", "USH0019", "USH0020", "USH0021"],
        run: runtime::run,
    },
    RuleFamily {
        name: "language_constraints",
        ids: &[
            "USH0022", "USH0023", "USH0024", "USH0025", "USH0026", "USH0027", "USH0028", "USH0029",
            "USH0030", "USH0031", "USH0032", "USH0033", "USH0034", "USH0035", "USH0036", "USH0037",
            "USH0038", "USH0039",
        ],
        run: language::run,
    },
    RuleFamily {
        name: "attributes",
        ids: &["USH0040", "USH0041", "USH0042"],
        run: attributes::run,
    },
    RuleFamily {
        name: "structure",
        ids: &["USH0044", "USH0045"],
        run: structure::run,
    },
];
