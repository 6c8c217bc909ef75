// Sector arithmetic shared by the layout and builder

/// Disk sector size (512 bytes)
pub const SECTOR_SIZE: u64 = 0x200;

/// End of the MBR region; the bootstrap payload always starts here
pub const MBR_END_OFFSET: u64 = SECTOR_SIZE;

/// Fill value for the tail of the last sector
pub const PAD_BYTE: u8 = 0xEE;

/// Align value up to the nearest multiple of align (power of two)
pub const fn align_up(value: u64, align: u64) -> u64 {
    (value + align - 1) & !(align - 1)
}

/// Check if value is aligned
pub const fn is_aligned(value: u64, align: u64) -> bool {
    (value & (align - 1)) == 0
}

/// Number of whole sectors needed to hold `bytes`
pub const fn sectors_for(bytes: u64) -> u64 {
    align_up(bytes, SECTOR_SIZE) / SECTOR_SIZE
}
