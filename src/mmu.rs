//! Simulated memory management unit.
//!
//! The MMU owns the physical frame pool, the free-frame list and one page
//! table per process. Processes address memory through virtual addresses
//! that are split into a virtual page number and an offset; the page table
//! maps the page number to a physical frame.

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, trace};

use crate::constants::DUMP_SEPARATOR;
use crate::error::{MmuError, Result};
use crate::memory::{FreeFrameList, PhysicalMemory};
use crate::page_table::PageTable;
use crate::process::Process;
use crate::translation::{offset_bits, VirtualAddress};

/// Process identifier
pub type Pid = i32;

pub struct Mmu {
    memory: PhysicalMemory,
    free_list: FreeFrameList,
    processes: BTreeMap<Pid, PageTable>,
    offset_bits: u32,
}

impl Mmu {
    /// Create an MMU managing `mem_size` bytes split into frames of `frame_size` bytes.
    ///
    /// `frame_size` must be a power of two and `mem_size` a positive multiple of it.
    pub fn new(mem_size: usize, frame_size: usize) -> Result<Self> {
        if !frame_size.is_power_of_two() || mem_size == 0 || mem_size % frame_size != 0 {
            return Err(MmuError::InvalidGeometry { mem_size, frame_size });
        }
        let frame_count = mem_size / frame_size;

        debug!("mmu: {} frames of {} bytes", frame_count, frame_size);
        Ok(Mmu {
            memory: PhysicalMemory::new(frame_count, frame_size),
            free_list: FreeFrameList::new(frame_count),
            processes: BTreeMap::new(),
            offset_bits: offset_bits(frame_size),
        })
    }

    #[inline]
    pub fn frame_size(&self) -> usize {
        self.memory.frame_size()
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.memory.frame_count()
    }

    #[inline]
    pub fn free_frame_count(&self) -> usize {
        self.free_list.free_count()
    }

    pub fn is_frame_free(&self, frame: usize) -> bool {
        self.free_list.is_free(frame)
    }

    /// Contents of a physical frame
    pub fn frame(&self, frame: usize) -> Option<&[u8]> {
        self.memory.frame(frame)
    }

    pub fn page_table(&self, pid: Pid) -> Option<&PageTable> {
        self.processes.get(&pid)
    }

    /// Processes that own a page table, in ascending order
    pub fn pids(&self) -> impl Iterator<Item = Pid> + '_ {
        self.processes.keys().copied()
    }

    /// Handle that issues operations on behalf of `pid`
    pub fn process(&mut self, pid: Pid) -> Process<'_> {
        Process::new(pid, self)
    }

    /// Allocate `n` bytes, rounded up to whole frames, at the end of the
    /// address space of `pid`. The page table is created on the first
    /// successful allocation.
    pub fn alloc(&mut self, pid: Pid, n: isize) -> Result<()> {
        if n < 1 {
            return Err(MmuError::InvalidArgument);
        }
        let needed = (n as usize).div_ceil(self.frame_size());
        let available = self.free_list.free_count();
        if available < needed {
            return Err(MmuError::OutOfMemory {
                requested: needed,
                available,
            });
        }

        let frames = self.free_list.find_free_frames(needed)?;
        self.free_list.remove_frames(&frames)?;
        self.processes.entry(pid).or_default().append(&frames);

        debug!("alloc: pid {} got {} bytes in frames {:?}", pid, n, frames);
        Ok(())
    }

    /// Write `content` into the address space of `pid` starting at
    /// `virtual_address`, growing the address space if the content runs
    /// past its end.
    pub fn write(&mut self, pid: Pid, virtual_address: isize, content: &[u8]) -> Result<()> {
        let start = self.translate_and_check(pid, virtual_address)?;
        let available = self.bytes_from(pid, &start)?;

        if content.len() > available {
            let shortfall = content.len() - available;
            self.alloc(pid, shortfall as isize)?;
            debug!("write: pid {} grew by {} bytes", pid, shortfall);
        }

        let pages = self
            .processes
            .get(&pid)
            .map(PageTable::frames)
            .ok_or(MmuError::InvalidProcess(pid))?;
        let walk = PageWalk::new(pages, &start, self.memory.frame_size());
        for (&byte, (frame, offset)) in content.iter().zip(walk) {
            self.memory.write(frame, offset, byte);
        }
        Ok(())
    }

    /// Read `n` bytes from the address space of `pid` starting at `virtual_address`.
    /// Reads never grow the address space.
    pub fn read(&self, pid: Pid, virtual_address: isize, n: isize) -> Result<Vec<u8>> {
        if n < 1 {
            return Err(MmuError::InvalidArgument);
        }
        let start = self.translate_and_check(pid, virtual_address)?;
        let available = self.bytes_from(pid, &start)?;
        let n = n as usize;
        if n > available {
            return Err(MmuError::OutOfBoundsRead {
                requested: n,
                available,
            });
        }

        let walk = PageWalk::new(self.pages(pid)?, &start, self.frame_size());
        Ok(walk
            .take(n)
            .map(|(frame, offset)| self.memory.read(frame, offset))
            .collect())
    }

    /// Release the last `n` pages of `pid`. Freed frames are zeroed before
    /// they return to the free list.
    pub fn free(&mut self, pid: Pid, n: isize) -> Result<()> {
        let page_table = self
            .processes
            .get_mut(&pid)
            .ok_or(MmuError::InvalidProcess(pid))?;
        let freed = page_table.free(n)?;

        for &frame in &freed {
            self.memory.zero_frame(frame);
        }
        self.free_list.add_frames(&freed)?;

        debug!("free: pid {} released frames {:?}", pid, freed);
        Ok(())
    }

    /// Split `virtual_address` into page number and offset, and check that the
    /// page is mapped for `pid`
    fn translate_and_check(&self, pid: Pid, virtual_address: isize) -> Result<VirtualAddress> {
        let page_table = self
            .processes
            .get(&pid)
            .ok_or(MmuError::InvalidProcess(pid))?;
        let va = VirtualAddress::decompose(virtual_address, self.offset_bits);
        let frame = page_table
            .lookup(va.vpn)
            .map_err(|_| MmuError::AddressOutOfBounds {
                address: virtual_address,
            })?;

        trace!("translate: pid {} {} -> frame {}", pid, va, frame);
        Ok(va)
    }

    /// Bytes between a translated address and the end of the address space
    fn bytes_from(&self, pid: Pid, va: &VirtualAddress) -> Result<usize> {
        let pages_left = self.pages(pid)?.len() - va.vpn as usize;
        Ok(pages_left * self.frame_size() - va.offset)
    }

    fn pages(&self, pid: Pid) -> Result<&[usize]> {
        self.processes
            .get(&pid)
            .map(PageTable::frames)
            .ok_or(MmuError::InvalidProcess(pid))
    }

    #[cfg(test)]
    pub(crate) fn set_memory_content(&mut self, frames: Vec<Vec<u8>>) {
        self.memory.set_contents(frames);
        self.offset_bits = offset_bits(self.memory.frame_size());
    }

    #[cfg(test)]
    pub(crate) fn set_free_list(&mut self, free: Vec<bool>) {
        self.free_list.set_state(free);
    }

    #[cfg(test)]
    pub(crate) fn set_process(&mut self, pid: Pid, page_table: PageTable) {
        self.processes.insert(pid, page_table);
    }
}

/// Memory map: one header per frame followed by its bytes in binary
impl fmt::Display for Mmu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame_size = self.frame_size();
        for (i, frame) in self.memory.frames().enumerate() {
            let state = if self.free_list.is_free(i) { "FREE" } else { "BUSY" };
            writeln!(f, "[{:#x}: {}]", i * frame_size, state)?;
            for byte in frame {
                writeln!(f, "> {:08b}", byte)?;
            }
        }
        write!(f, "{}", DUMP_SEPARATOR)
    }
}

/// Physical `(frame, offset)` positions of consecutive virtual bytes.
///
/// The offset advances byte by byte; when it reaches the frame size it wraps
/// to zero and the walk moves to the next virtual page, wherever that page
/// lives physically. Ends at the last mapped page.
struct PageWalk<'a> {
    pages: &'a [usize],
    vpn: usize,
    offset: usize,
    frame_size: usize,
}

impl<'a> PageWalk<'a> {
    fn new(pages: &'a [usize], start: &VirtualAddress, frame_size: usize) -> Self {
        PageWalk {
            pages,
            vpn: start.vpn as usize,
            offset: start.offset,
            frame_size,
        }
    }
}

impl Iterator for PageWalk<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let frame = *self.pages.get(self.vpn)?;
        let position = (frame, self.offset);

        self.offset += 1;
        if self.offset >= self.frame_size {
            self.offset = 0;
            self.vpn += 1;
        }
        Some(position)
    }
}
