use serde::{Deserialize, Serialize};

/// Default size of the data area in bytes.
pub const DEFAULT_MEMORY_SIZE: usize = 8 * 1024;
/// Default size of the space reserved after the data area.
pub const DEFAULT_STACK_SIZE: usize = 8 * 1024;

/// Sizing of a single interpreter instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VmConfig {
    pub memory_size: usize,
    pub stack_size: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl VmConfig {
    pub const fn new(memory_size: usize, stack_size: usize) -> Self {
        Self {
            memory_size,
            stack_size,
        }
    }

    /// Size of the flat memory handed to the program.
    pub const fn total_size(&self) -> usize {
        self.memory_size.saturating_add(self.stack_size)
    }
}
