pub mod constants;
pub mod error;
pub mod io;
pub mod logger;
pub mod memory;
pub mod mmu;
pub mod page_table;
pub mod process;
pub mod translation;

// Re-export commonly used items for convenience
pub use error::{MmuError, Result};
pub use mmu::{Mmu, Pid};
pub use page_table::PageTable;
pub use process::Process;
pub use translation::VirtualAddress;
