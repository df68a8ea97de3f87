//! Translation of host physical addresses into the controller's local
//! address space. Memory-window commands may only touch these two windows;
//! anything else is rejected before it reaches the transport.

const SDRAM_HOST_BASE: u32 = 0x1000_0000;
const SDRAM_HOST_END: u32 = 0x1400_0000;
const SDRAM_LOCAL_BASE: u32 = 0x0000_0000;

const FLASH_HOST_BASE: u32 = 0x1FFE_0000;
const FLASH_HOST_END: u32 = 0x1FFE_2000;
const FLASH_LOCAL_BASE: u32 = 0x0500_0000;

/// Map `address..address+length` into the local address space, or `None`
/// when the range is outside both windows or runs past a window end.
/// The bound check is done in u64 so a large `length` cannot wrap around
/// 32 bits and masquerade as in-range.
pub fn translate(address: u32, length: u32) -> Option<u32> {
    let end = address as u64 + length as u64;
    if (SDRAM_HOST_BASE..SDRAM_HOST_END).contains(&address) {
        if end <= SDRAM_HOST_END as u64 {
            return Some(address - SDRAM_HOST_BASE + SDRAM_LOCAL_BASE);
        }
        return None;
    }
    if (FLASH_HOST_BASE..FLASH_HOST_END).contains(&address) {
        if end <= FLASH_HOST_END as u64 {
            return Some(address - FLASH_HOST_BASE + FLASH_LOCAL_BASE);
        }
        return None;
    }
    None
}
