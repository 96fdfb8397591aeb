use crate::error::{MmuError, Result};

/// Physical memory as a fixed pool of equally sized frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalMemory {
    frames: Vec<Box<[u8]>>,
    frame_size: usize,
}

impl PhysicalMemory {
    /// Create `frame_count` zeroed frames of `frame_size` bytes each
    pub fn new(frame_count: usize, frame_size: usize) -> Self {
        let frames = (0..frame_count)
            .map(|_| vec![0u8; frame_size].into_boxed_slice())
            .collect();
        PhysicalMemory { frames, frame_size }
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Read one byte from a frame
    #[inline]
    pub fn read(&self, frame: usize, offset: usize) -> u8 {
        self.frames[frame][offset]
    }

    /// Write one byte into a frame
    #[inline]
    pub fn write(&mut self, frame: usize, offset: usize, value: u8) {
        self.frames[frame][offset] = value;
    }

    /// Set every byte of a frame to zero
    pub fn zero_frame(&mut self, frame: usize) {
        self.frames[frame].fill(0);
    }

    pub fn frame(&self, frame: usize) -> Option<&[u8]> {
        self.frames.get(frame).map(|f| &f[..])
    }

    pub fn frames(&self) -> impl Iterator<Item = &[u8]> {
        self.frames.iter().map(|f| &f[..])
    }

    /// Replace the whole frame pool; frame count and size follow the new contents
    #[cfg(test)]
    pub(crate) fn set_contents(&mut self, frames: Vec<Vec<u8>>) {
        self.frame_size = frames.first().map_or(self.frame_size, Vec::len);
        self.frames = frames.into_iter().map(Vec::into_boxed_slice).collect();
    }
}

/// Tracks which frames are available for allocation
///
/// `free[i]` is `true` when frame `i` is free. `free_count` always equals the
/// number of `true` entries; batch updates are validated on a working copy
/// and only committed when every entry is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeFrameList {
    free: Vec<bool>,
    free_count: usize,
}

impl FreeFrameList {
    /// All `frame_count` frames start out free
    pub fn new(frame_count: usize) -> Self {
        FreeFrameList {
            free: vec![true; frame_count],
            free_count: frame_count,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.free.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        self.free_count
    }

    /// Recount free frames from the bitmap
    pub fn count_free(&self) -> usize {
        self.free.iter().filter(|&&f| f).count()
    }

    pub fn is_free(&self, frame: usize) -> bool {
        self.free.get(frame).copied().unwrap_or(false)
    }

    /// First-fit scan for `n` free frames in ascending index order.
    /// Frames need not be contiguous. Does not mark anything as occupied.
    pub fn find_free_frames(&self, n: usize) -> Result<Vec<usize>> {
        let found: Vec<usize> = self
            .free
            .iter()
            .enumerate()
            .filter(|(_, free)| **free)
            .map(|(i, _)| i)
            .take(n)
            .collect();

        if found.len() < n {
            return Err(MmuError::NotEnoughFrames {
                requested: n,
                available: found.len(),
            });
        }
        Ok(found)
    }

    /// Mark the given frames as occupied
    pub fn remove_frames(&mut self, frames: &[usize]) -> Result<()> {
        self.free = self.updated(frames, false)?;
        self.free_count -= frames.len();
        Ok(())
    }

    /// Mark the given frames as free
    pub fn add_frames(&mut self, frames: &[usize]) -> Result<()> {
        self.free = self.updated(frames, true)?;
        self.free_count += frames.len();
        Ok(())
    }

    /// Build the bitmap that results from setting every frame in `frames` to
    /// `free`, without touching `self`
    fn updated(&self, frames: &[usize], free: bool) -> Result<Vec<bool>> {
        let mut working = self.free.clone();
        for &frame in frames {
            let Some(entry) = working.get_mut(frame) else {
                return Err(MmuError::IndexOutOfBounds {
                    index: frame as isize,
                    len: self.free.len(),
                });
            };
            // Checked against the working copy so a repeated index in one
            // batch is rejected too.
            if *entry == free {
                return Err(MmuError::DuplicateOperation { frame });
            }
            *entry = free;
        }
        Ok(working)
    }

    /// Replace the bitmap and recompute the free count
    #[cfg(test)]
    pub(crate) fn set_state(&mut self, free: Vec<bool>) {
        self.free = free;
        self.free_count = self.count_free();
    }
}

impl From<Vec<bool>> for FreeFrameList {
    fn from(free: Vec<bool>) -> Self {
        let free_count = free.iter().filter(|&&f| f).count();
        FreeFrameList { free, free_count }
    }
}
