pub const DEFAULT_MEM_SIZE: usize = 1024;
pub const DEFAULT_FRAME_SIZE: usize = 16;

pub const COMMENT_PREFIX: char = '#';
pub const HEX_PREFIX: &str = "0x";

pub const DUMP_SEPARATOR: &str = "------------";
