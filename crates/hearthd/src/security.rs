//! Platform security preload pass.
//!
//! Before the entry point is instantiated, a fixed set of internal type
//! names is warmed through the server context so later resolution inside
//! restricted call paths never has to fault types in. The pass is
//! best-effort: a miss is logged and the bootstrap continues, since
//! repositories may legitimately provide a subset.

use std::sync::Arc;

use tracing::{debug, trace};

use hearth_loader::LoaderContext;

use crate::server::{KERNEL_TYPE, SERVER_TYPE};

const SECURITY_TARGET: &str = "hearth::security";

const PRELOAD_TYPES: [&str; 2] = [SERVER_TYPE, KERNEL_TYPE];

/// Warms the fixed preload set through the given context.
pub fn preload(context: &Arc<LoaderContext>) {
    for type_name in PRELOAD_TYPES {
        if context.lookup(type_name).is_some() {
            trace!(target: SECURITY_TARGET, type_name, "preloaded");
        } else {
            debug!(target: SECURITY_TARGET, type_name, "preload miss");
        }
    }
}
