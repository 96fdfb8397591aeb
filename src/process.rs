use crate::error::Result;
use crate::mmu::{Mmu, Pid};

/// A (highly simplified) process: every request is forwarded to the MMU
/// under this process's pid.
pub struct Process<'a> {
    pid: Pid,
    mmu: &'a mut Mmu,
}

impl<'a> Process<'a> {
    pub fn new(pid: Pid, mmu: &'a mut Mmu) -> Self {
        Process { pid, mmu }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Ask the MMU for `n` more bytes
    pub fn malloc(&mut self, n: isize) -> Result<()> {
        self.mmu.alloc(self.pid, n)
    }

    /// Free the last `n` pages of this process's address space
    pub fn free(&mut self, n: isize) -> Result<()> {
        self.mmu.free(self.pid, n)
    }

    pub fn read(&self, virtual_address: isize, length: isize) -> Result<Vec<u8>> {
        self.mmu.read(self.pid, virtual_address, length)
    }

    pub fn write(&mut self, virtual_address: isize, message: &[u8]) -> Result<()> {
        self.mmu.write(self.pid, virtual_address, message)
    }
}
