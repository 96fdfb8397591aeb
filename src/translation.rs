/// Number of offset bits for a frame size of `2^n` bytes.
///
/// Counts how many times `frame_size` can be halved while it stays even, so
/// the result is only meaningful for powers of two.
pub fn offset_bits(frame_size: usize) -> u32 {
    let mut n = frame_size;
    let mut bits = 0;
    while n > 0 && n % 2 == 0 {
        bits += 1;
        n /= 2;
    }
    bits
}

/// Mask selecting the low `bits` bits of an address
#[inline]
pub fn offset_mask(bits: u32) -> usize {
    (1usize << bits) - 1
}

/// Represents the decomposed components of a Virtual Address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualAddress {
    pub va: isize,
    pub vpn: isize,
    pub offset: usize,
}

impl VirtualAddress {
    /// Split a raw VA into virtual page number and offset, given the number of
    /// offset bits. Negative addresses yield a negative VPN.
    pub fn decompose(va: isize, bits: u32) -> Self {
        let offset = va as usize & offset_mask(bits);
        let vpn = va >> bits;

        VirtualAddress { va, vpn, offset }
    }

    /// Reassemble the raw address from its parts
    #[inline]
    pub fn to_raw(&self, bits: u32) -> isize {
        (self.vpn << bits) | self.offset as isize
    }
}

impl std::fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VA({}) = (vpn={}, offset={})", self.va, self.vpn, self.offset)
    }
}
