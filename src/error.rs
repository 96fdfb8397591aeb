//! Error taxonomy for the simulated MMU.

use core::fmt;

use crate::mmu::Pid;

/// Errors returned by the MMU and its components.
///
/// Every operation that returns one of these leaves frames, the free list and
/// all page tables exactly as they were before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmuError {
    /// Non-positive byte count for an allocation or a read
    InvalidArgument,
    /// Not enough free frames to satisfy an allocation
    OutOfMemory { requested: usize, available: usize },
    /// The free-frame scan found fewer free frames than requested
    NotEnoughFrames { requested: usize, available: usize },
    /// The process has no page table
    InvalidProcess(Pid),
    /// Virtual address outside the process's allocated pages
    AddressOutOfBounds { address: isize },
    /// Page or frame index outside the valid range
    IndexOutOfBounds { index: isize, len: usize },
    /// Read extends past the end of the process's allocation
    OutOfBoundsRead { requested: usize, available: usize },
    /// Tried to free a non-positive count or more pages than allocated
    FreeOutOfBounds { requested: isize, allocated: usize },
    /// Tried to set a free-list entry to the state it already has
    DuplicateOperation { frame: usize },
    /// Memory size and frame size do not describe a usable frame pool
    InvalidGeometry { mem_size: usize, frame_size: usize },
}

impl fmt::Display for MmuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MmuError::InvalidArgument => {
                write!(f, "invalid argument: byte count must be greater than 0")
            }
            MmuError::OutOfMemory { requested, available } => write!(
                f,
                "out of memory: {} frames requested, {} free",
                requested, available
            ),
            MmuError::NotEnoughFrames { requested, available } => write!(
                f,
                "not enough free frames: {} requested, {} found",
                requested, available
            ),
            MmuError::InvalidProcess(pid) => write!(f, "process {} does not exist", pid),
            MmuError::AddressOutOfBounds { address } => {
                write!(f, "address {} out of bounds", address)
            }
            MmuError::IndexOutOfBounds { index, len } => {
                write!(f, "index {} out of bounds (len {})", index, len)
            }
            MmuError::OutOfBoundsRead { requested, available } => write!(
                f,
                "read of {} bytes exceeds the {} bytes allocated from the start address",
                requested, available
            ),
            MmuError::FreeOutOfBounds { requested, allocated } => write!(
                f,
                "cannot free {} pages, {} allocated",
                requested, allocated
            ),
            MmuError::DuplicateOperation { frame } => write!(
                f,
                "tried to update free list entry {} to its current state",
                frame
            ),
            MmuError::InvalidGeometry { mem_size, frame_size } => write!(
                f,
                "memory size {} must be a positive multiple of frame size {}, which must be a power of two",
                mem_size, frame_size
            ),
        }
    }
}

impl std::error::Error for MmuError {}

pub type Result<T> = core::result::Result<T, MmuError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_values() {
        let msg = MmuError::OutOfMemory { requested: 3, available: 1 }.to_string();
        assert!(msg.contains("out of memory"));
        assert!(msg.contains('3'));

        let msg = MmuError::InvalidProcess(7).to_string();
        assert_eq!(msg, "process 7 does not exist");
    }

    #[test]
    fn test_is_std_error() {
        fn takes_error(_: &dyn std::error::Error) {}
        takes_error(&MmuError::InvalidArgument);
    }
}
