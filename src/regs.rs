//! Register map and the ordered load/store primitive the protocol runs over.

use bitflags::bitflags;

/// Mailbox and control registers visible to this firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    Status,
    Command,
    Data0,
    Data1,
    Version,
    Scr,
}

/// Ordered, uncached access to the hardware registers. Implementations must
/// not cache or reorder: the host observes these registers concurrently and
/// treats the done flag as a fence for the result registers.
pub trait FpgaRegs {
    fn reg_get(&mut self, reg: Reg) -> u32;
    fn reg_set(&mut self, reg: Reg, value: u32);
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status: u32 {
        const CFG_PENDING = 1 << 0;
    }
}

bitflags! {
    /// Completion bits in the command register. The low byte carries the
    /// command code on submission; the hardware clears CFG_PENDING when
    /// DONE is written back.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CfgCmd: u32 {
        const ERROR = 1 << 30;
        const DONE = 1 << 31;
    }
}

bitflags! {
    /// Cartridge control register (SCR). Independent enable bits plus the
    /// save-type bits, which are only ever written through the save-type
    /// mapper in `cfg`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Scr: u32 {
        const BOOTLOADER_ENABLED = 1 << 0;
        const BOOTLOADER_SKIP = 1 << 1;
        const ROM_WRITE_ENABLED = 1 << 2;
        const ROM_SHADOW_ENABLED = 1 << 3;
        const SRAM_ENABLED = 1 << 4;
        const SRAM_BANKED = 1 << 5;
        const EEPROM_ENABLED = 1 << 6;
        const EEPROM_16K = 1 << 7;
        const DD_ENABLED = 1 << 8;
        const DDIPL_ENABLED = 1 << 9;
        const FLASHRAM_ENABLED = 1 << 10;
    }
}
