//! VM runtime - the main entry point
//!
//! The runtime builds the intrinsics once and hands out execution contexts.

use crate::context::VmContext;
use crate::intrinsics::Intrinsics;
use crate::set_data::SetDataConfig;

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Maximum nesting of native calls (callbacks, getters) before
    /// `VmError::StackOverflow` is raised. Every level is real Rust
    /// recursion, so this must fit the host thread's stack.
    pub max_stack_depth: usize,
    /// Storage settings for every Set created by this runtime's contexts
    pub set_data: SetDataConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_stack_depth: 1000,
            set_data: SetDataConfig::default(),
        }
    }
}

/// The VM runtime
///
/// Owns the intrinsic objects (`Set`, `%SetIteratorPrototype%`, ...) and the
/// configuration shared by every context it creates.
pub struct VmRuntime {
    intrinsics: Intrinsics,
    config: RuntimeConfig,
}

impl VmRuntime {
    /// Create a new runtime with default configuration
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a new runtime with custom configuration
    pub fn with_config(config: RuntimeConfig) -> Self {
        tracing::debug!(?config, "creating runtime");
        Self {
            intrinsics: Intrinsics::new(),
            config,
        }
    }

    /// Create a new execution context
    pub fn create_context(&self) -> VmContext {
        VmContext::new(self.intrinsics.clone(), self.config.clone())
    }

    /// Intrinsic objects
    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    /// Get runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

impl Default for VmRuntime {
    fn default() -> Self {
        Self::new()
    }
}
