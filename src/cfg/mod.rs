//! The configuration mailbox protocol.
//!
//! The host submits a request by writing two argument words and a command
//! byte, then setting the pending bit in the status register. Each call to
//! [`Cfg::process`] handles at most one pending request: it either completes
//! it (results written, done flag set), fails it (error code written, done
//! and error flags set), or defers it by writing nothing at all, so the
//! identical request is re-evaluated on the next poll. Deferral is the only
//! retry mechanism; a busy downstream queue is invisible to the host except
//! as latency.


use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::address;
use crate::peripherals::{Board, OutputReady};
use crate::regs::{CfgCmd, Reg, Scr, Status};
use crate::rtc::RtcTime;

pub const CIC_SEED_UNKNOWN: u16 = 0xFFFF;

/// Property identifiers of the query/update protocol. The wire id is the
/// discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ConfigId {
    BootloaderSwitch = 0,
    RomWriteEnable = 1,
    RomShadowEnable = 2,
    DdMode = 3,
    IsvEnable = 4,
    BootMode = 5,
    SaveType = 6,
    CicSeed = 7,
    TvType = 8,
    FlashEraseBlock = 9,
    DdDriveType = 10,
    DdDiskState = 11,
}

impl ConfigId {
    pub fn from_raw(value: u32) -> Option<Self> {
        Some(match value {
            0 => ConfigId::BootloaderSwitch,
            1 => ConfigId::RomWriteEnable,
            2 => ConfigId::RomShadowEnable,
            3 => ConfigId::DdMode,
            4 => ConfigId::IsvEnable,
            5 => ConfigId::BootMode,
            6 => ConfigId::SaveType,
            7 => ConfigId::CicSeed,
            8 => ConfigId::TvType,
            9 => ConfigId::FlashEraseBlock,
            10 => ConfigId::DdDriveType,
            11 => ConfigId::DdDiskState,
            _ => return None,
        })
    }
}

/// 64DD mode values used by the DdMode update. The query side composes the
/// value from the two SCR bits independently, so both-set and neither-set
/// are observable even though the update treats the value as an enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum DdMode {
    Disabled = 0,
    Regs = 1,
    Ipl = 2,
    Full = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum BootMode {
    MenuSd = 0,
    MenuUsb = 1,
    Rom = 2,
    DiskDrive = 3,
    Direct = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum SaveType {
    None = 0,
    Eeprom4k = 1,
    Eeprom16k = 2,
    Sram = 3,
    Flashram = 4,
    SramBanked = 5,
}

impl SaveType {
    /// Out-of-range values clamp to `None`; the protocol never rejects a
    /// save type.
    pub fn from_raw(value: u32) -> Self {
        match value {
            1 => SaveType::Eeprom4k,
            2 => SaveType::Eeprom16k,
            3 => SaveType::Sram,
            4 => SaveType::Flashram,
            5 => SaveType::SramBanked,
            _ => SaveType::None,
        }
    }

    /// The exact SCR bits for this save type. Disjoint from every other
    /// type's bits only in combination with the full clear the mapper does
    /// first.
    pub fn scr_bits(self) -> Scr {
        match self {
            SaveType::None => Scr::empty(),
            SaveType::Eeprom4k => Scr::EEPROM_ENABLED,
            SaveType::Eeprom16k => Scr::EEPROM_ENABLED | Scr::EEPROM_16K,
            SaveType::Sram => Scr::SRAM_ENABLED,
            SaveType::Flashram => Scr::FLASHRAM_ENABLED,
            SaveType::SramBanked => Scr::SRAM_ENABLED | Scr::SRAM_BANKED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum TvType {
    Pal = 0,
    Ntsc = 1,
    Mpal = 2,
    Unknown = 3,
}

impl TvType {
    pub fn from_raw(value: u32) -> Self {
        match value & 0x03 {
            0 => TvType::Pal,
            1 => TvType::Ntsc,
            2 => TvType::Mpal,
            _ => TvType::Unknown,
        }
    }
}

/// Error codes written into result register 0 on failure. `Ok = 0` exists on
/// the wire but is never produced here; `Timeout = 3` is reserved for
/// downstream layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum CfgError {
    BadAddress = 1,
    BadConfigId = 2,
    Timeout = 3,
    UnknownCommand = -1,
}

/// What a command handler did with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Results to write back, done flag to set.
    Completed([u32; 2]),
    /// Error code to write back, done and error flags to set.
    Failed(CfgError),
    /// Nothing written; the request stays pending for the next poll.
    Deferred,
}

/// The configuration core: protocol state plus the board it talks through.
pub struct Cfg<B: Board> {
    board: B,
    boot_mode: u32,
    save_type: SaveType,
    cic_seed: u16,
    tv_type: TvType,
    usb_output_ready: OutputReady,
}

impl<B: Board> Cfg<B> {
    pub fn new(board: B) -> Self {
        let mut cfg = Cfg {
            board,
            boot_mode: BootMode::MenuSd as u32,
            save_type: SaveType::None,
            cic_seed: CIC_SEED_UNKNOWN,
            tv_type: TvType::Unknown,
            usb_output_ready: OutputReady::new(true),
        };
        cfg.reset();
        cfg
    }

    /// Power-on / reset state: SCR cleared, no save type, unknown CIC seed
    /// and TV type, menu-from-SD boot, output mailbox free.
    pub fn reset(&mut self) {
        self.board.reg_set(Reg::Scr, 0);
        self.set_save_type(SaveType::None);
        self.cic_seed = CIC_SEED_UNKNOWN;
        self.tv_type = TvType::Unknown;
        self.boot_mode = BootMode::MenuSd as u32;
        self.usb_output_ready = OutputReady::new(true);
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn boot_mode(&self) -> u32 {
        self.boot_mode
    }

    pub fn save_type(&self) -> SaveType {
        self.save_type
    }

    pub fn cic_seed(&self) -> u16 {
        self.cic_seed
    }

    pub fn tv_type(&self) -> TvType {
        self.tv_type
    }

    pub fn usb_output_ready(&self) -> bool {
        self.usb_output_ready.is_ready()
    }

    pub fn version(&mut self) -> u32 {
        self.board.reg_get(Reg::Version)
    }

    /// Read-modify-write of SCR bits. Every SCR mutation goes through here,
    /// so a concurrent reader of the register only ever sees fully-formed
    /// states.
    fn change_scr_bits(&mut self, mask: Scr, value: bool) {
        let scr = self.board.reg_get(Reg::Scr);
        let scr = if value {
            scr | mask.bits()
        } else {
            scr & !mask.bits()
        };
        self.board.reg_set(Reg::Scr, scr);
    }

    /// Save-type mapper: clears all five save bits, then sets exactly the
    /// bits of the new type. The only code path allowed to touch those bits.
    fn set_save_type(&mut self, save_type: SaveType) {
        let save_reset_mask = Scr::EEPROM_16K
            | Scr::EEPROM_ENABLED
            | Scr::FLASHRAM_ENABLED
            | Scr::SRAM_BANKED
            | Scr::SRAM_ENABLED;
        self.change_scr_bits(save_reset_mask, false);
        let bits = save_type.scr_bits();
        if !bits.is_empty() {
            self.change_scr_bits(bits, true);
        }
        self.save_type = save_type;
    }

    /// Query one property. Flag properties return the masked register bits
    /// without normalizing to 0/1; the host treats any nonzero as true.
    pub fn query(&mut self, id: u32) -> Result<u32, CfgError> {
        let id = ConfigId::from_raw(id).ok_or(CfgError::BadConfigId)?;
        let scr = self.board.reg_get(Reg::Scr);
        Ok(match id {
            ConfigId::BootloaderSwitch => scr & Scr::BOOTLOADER_ENABLED.bits(),
            ConfigId::RomWriteEnable => scr & Scr::ROM_WRITE_ENABLED.bits(),
            ConfigId::RomShadowEnable => scr & Scr::ROM_SHADOW_ENABLED.bits(),
            ConfigId::DdMode => {
                // Composed from the two bits independently; both-set and
                // neither-set are valid readings.
                let mut mode = DdMode::Disabled as u32;
                if scr & Scr::DDIPL_ENABLED.bits() != 0 {
                    mode |= DdMode::Ipl as u32;
                }
                if scr & Scr::DD_ENABLED.bits() != 0 {
                    mode |= DdMode::Regs as u32;
                }
                mode
            }
            ConfigId::IsvEnable => self.board.enabled(),
            ConfigId::BootMode => self.boot_mode,
            ConfigId::SaveType => self.save_type as u32,
            ConfigId::CicSeed => self.cic_seed as u32,
            ConfigId::TvType => self.tv_type as u32,
            // Write-triggered side effect only; reads always the sentinel.
            ConfigId::FlashEraseBlock => 0xFFFF_FFFF,
            ConfigId::DdDriveType => self.board.drive_type(),
            ConfigId::DdDiskState => self.board.disk_state(),
        })
    }

    /// Update one property. Out-of-range values for CIC seed, TV type, boot
    /// mode and save type are masked or clamped, never rejected; only an
    /// unknown id fails.
    pub fn update(&mut self, id: u32, value: u32) -> Result<(), CfgError> {
        let id = ConfigId::from_raw(id).ok_or(CfgError::BadConfigId)?;
        match id {
            ConfigId::BootloaderSwitch => {
                self.change_scr_bits(Scr::BOOTLOADER_ENABLED, value != 0);
            }
            ConfigId::RomWriteEnable => {
                self.change_scr_bits(Scr::ROM_WRITE_ENABLED, value != 0);
            }
            ConfigId::RomShadowEnable => {
                self.change_scr_bits(Scr::ROM_SHADOW_ENABLED, value != 0);
            }
            ConfigId::DdMode => {
                if value == DdMode::Disabled as u32 {
                    self.change_scr_bits(Scr::DD_ENABLED | Scr::DDIPL_ENABLED, false);
                } else if value == DdMode::Regs as u32 {
                    self.change_scr_bits(Scr::DD_ENABLED, true);
                    self.change_scr_bits(Scr::DDIPL_ENABLED, false);
                } else if value == DdMode::Ipl as u32 {
                    self.change_scr_bits(Scr::DD_ENABLED, false);
                    self.change_scr_bits(Scr::DDIPL_ENABLED, true);
                } else {
                    // Anything else enables both, Full included.
                    self.change_scr_bits(Scr::DD_ENABLED | Scr::DDIPL_ENABLED, true);
                }
            }
            ConfigId::IsvEnable => self.board.set_enabled(value),
            ConfigId::BootMode => {
                // Stored exactly as written; only the skip bit is derived.
                self.boot_mode = value;
                self.change_scr_bits(Scr::BOOTLOADER_SKIP, value == BootMode::Direct as u32);
            }
            ConfigId::SaveType => self.set_save_type(SaveType::from_raw(value)),
            ConfigId::CicSeed => self.cic_seed = (value & 0xFFFF) as u16,
            ConfigId::TvType => self.tv_type = TvType::from_raw(value),
            ConfigId::FlashEraseBlock => self.board.erase_block(value),
            ConfigId::DdDriveType => self.board.set_drive_type(value),
            ConfigId::DdDiskState => self.board.set_disk_state(value),
        }
        Ok(())
    }

    /// One poll step. Bounded work: at most one request is examined, and it
    /// is either completed, failed or left untouched for the next poll.
    pub fn process(&mut self) {
        let status = self.board.reg_get(Reg::Status);
        if status & Status::CFG_PENDING.bits() == 0 {
            return;
        }

        let args = [
            self.board.reg_get(Reg::Data0),
            self.board.reg_get(Reg::Data1),
        ];
        let cmd = (self.board.reg_get(Reg::Command) & 0xFF) as u8;

        match self.dispatch(cmd, args) {
            Outcome::Completed(results) => {
                debug!(
                    "cmd '{}' done: {:08X} {:08X}",
                    cmd as char, results[0], results[1]
                );
                // Results first, done flag last: the host treats the done
                // flag as the fence that makes the results valid.
                self.board.reg_set(Reg::Data0, results[0]);
                self.board.reg_set(Reg::Data1, results[1]);
                self.board.reg_set(Reg::Command, CfgCmd::DONE.bits());
            }
            Outcome::Failed(error) => {
                warn!("cmd '{}' failed: {:?}", cmd as char, error);
                self.board.reg_set(Reg::Data0, error as i32 as u32);
                self.board.reg_set(Reg::Data1, 0);
                self.board
                    .reg_set(Reg::Command, (CfgCmd::ERROR | CfgCmd::DONE).bits());
            }
            Outcome::Deferred => {
                debug!("cmd '{}' deferred", cmd as char);
            }
        }
    }

    fn dispatch(&mut self, cmd: u8, args: [u32; 2]) -> Outcome {
        match cmd {
            b'v' => Outcome::Completed([self.version(), args[1]]),

            b'c' => match self.query(args[0]) {
                Ok(value) => Outcome::Completed([args[0], value]),
                Err(error) => Outcome::Failed(error),
            },

            b'C' => match self.update(args[0], args[1]) {
                Ok(()) => Outcome::Completed(args),
                Err(error) => Outcome::Failed(error),
            },

            b't' => Outcome::Completed(self.board.get_time().encode()),

            b'T' => {
                let time = RtcTime::decode(args);
                self.board.set_time(time);
                Outcome::Completed(args)
            }

            b'm' => {
                let Some(local) = address::translate(args[0], args[1]) else {
                    return Outcome::Failed(CfgError::BadAddress);
                };
                if self.board.prepare_read(local, args[1]) {
                    Outcome::Completed([local, args[1]])
                } else {
                    Outcome::Deferred
                }
            }

            b'M' => {
                let Some(local) = address::translate(args[0], args[1]) else {
                    return Outcome::Failed(CfgError::BadAddress);
                };
                let done = self.usb_output_ready.clone();
                if self.board.enqueue_output(local, args[1], done) {
                    self.usb_output_ready.set_busy();
                    Outcome::Completed([local, args[1]])
                } else {
                    Outcome::Deferred
                }
            }

            b'u' => Outcome::Completed(self.board.read_info()),

            b'U' => {
                let ready = if self.usb_output_ready.is_ready() { 1 } else { 0 };
                Outcome::Completed([ready, args[1]])
            }

            _ => Outcome::Failed(CfgError::UnknownCommand),
        }
    }
}
