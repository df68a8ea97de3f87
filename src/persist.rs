//! Snapshot of the persistent configuration properties, so a simulator run
//! can pick up where the previous one left off. Only the four properties
//! that live in the core's own state are saved; register flags and the
//! output mailbox are runtime state and start fresh.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::cfg::{Cfg, ConfigId, SaveType, TvType};
use crate::peripherals::Board;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub boot_mode: u32,
    pub save_type: SaveType,
    pub cic_seed: u16,
    pub tv_type: TvType,
}

impl Settings {
    pub fn capture<B: Board>(cfg: &Cfg<B>) -> Self {
        Settings {
            boot_mode: cfg.boot_mode(),
            save_type: cfg.save_type(),
            cic_seed: cfg.cic_seed(),
            tv_type: cfg.tv_type(),
        }
    }

    /// Replays the snapshot through the normal update path, so the save-type
    /// bits land in the control register exactly as a host update would put
    /// them there.
    pub fn apply<B: Board>(&self, cfg: &mut Cfg<B>) {
        // Ids come from the enum, so these updates cannot fail.
        let _ = cfg.update(ConfigId::BootMode as u32, self.boot_mode);
        let _ = cfg.update(ConfigId::SaveType as u32, self.save_type as u32);
        let _ = cfg.update(ConfigId::CicSeed as u32, self.cic_seed as u32);
        let _ = cfg.update(ConfigId::TvType as u32, self.tv_type as u32);
    }
}

pub fn load_settings(path: &Path) -> io::Result<Option<Settings>> {
    if !path.exists() {
        return Ok(None);
    }
    let mut file = File::open(path)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    let settings = bincode::deserialize(&data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Some(settings))
}

pub fn save_settings(path: &Path, settings: &Settings) -> io::Result<()> {
    let data = bincode::serialize(settings)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let mut file = File::create(path)?;
    file.write_all(&data)?;
    file.sync_all()?;
    Ok(())
}
