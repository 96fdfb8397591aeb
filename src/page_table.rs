use crate::error::{MmuError, Result};

/// Per-process mapping from virtual page number (index) to physical frame
/// number (value).
///
/// Pages are appended at the end and freed from the end, so the most recently
/// allocated pages are always released first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageTable {
    frame_indices: Vec<usize>,
}

impl PageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map the given frames to the next virtual pages, in order
    pub fn append(&mut self, frames: &[usize]) {
        self.frame_indices.extend_from_slice(frames);
    }

    /// Remove the last `n` pages and return their frames in virtual page order
    pub fn free(&mut self, n: isize) -> Result<Vec<usize>> {
        let len = self.len();
        if n < 1 || n as usize > len {
            return Err(MmuError::FreeOutOfBounds {
                requested: n,
                allocated: len,
            });
        }
        Ok(self.frame_indices.split_off(len - n as usize))
    }

    /// Physical frame mapped to virtual page `vpn`
    pub fn lookup(&self, vpn: isize) -> Result<usize> {
        usize::try_from(vpn)
            .ok()
            .and_then(|i| self.frame_indices.get(i).copied())
            .ok_or(MmuError::IndexOutOfBounds {
                index: vpn,
                len: self.len(),
            })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frame_indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frame_indices.is_empty()
    }

    pub fn frames(&self) -> &[usize] {
        &self.frame_indices
    }
}

impl From<Vec<usize>> for PageTable {
    fn from(frame_indices: Vec<usize>) -> Self {
        PageTable { frame_indices }
    }
}
