mod address;
mod cfg;
mod peripherals;
mod persist;
mod regs;
mod rtc;
mod sim;

use std::env;
use std::path::PathBuf;
use std::process;

use log::{info, warn};

use cfg::{BootMode, Cfg, ConfigId, SaveType, TvType};
use persist::Settings;
use rtc::RtcTime;
use sim::SimBoard;

/// Drives the configuration core against the simulated board with a short
/// host-style exchange, optionally restoring/saving settings from a file:
///
///   cart-controller [settings.cfg]
fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        eprintln!("Usage: {} [settings.cfg]", args[0]);
        process::exit(2);
    }
    let settings_path = args.get(1).map(PathBuf::from);

    let mut cfg = Cfg::new(SimBoard::new());

    if let Some(path) = &settings_path {
        match persist::load_settings(path) {
            Ok(Some(settings)) => {
                info!("restored settings from {}: {:?}", path.display(), settings);
                settings.apply(&mut cfg);
            }
            Ok(None) => info!("no settings file at {}, using defaults", path.display()),
            Err(e) => warn!("failed to load {}: {}", path.display(), e),
        }
    }

    run_demo(&mut cfg);

    if let Some(path) = &settings_path {
        let settings = Settings::capture(&cfg);
        match persist::save_settings(path, &settings) {
            Ok(()) => info!("saved settings to {}", path.display()),
            Err(e) => warn!("failed to save {}: {}", path.display(), e),
        }
    }
}

fn exchange(cfg: &mut Cfg<SimBoard>, cmd: u8, arg0: u32, arg1: u32) -> [u32; 2] {
    cfg.board_mut().submit(cmd, arg0, arg1);
    cfg.process();
    let results = cfg.board().results();
    info!(
        "'{}' {:08X} {:08X} -> {:08X} {:08X}{}",
        cmd as char,
        arg0,
        arg1,
        results[0],
        results[1],
        if cfg.board().error() { " (error)" } else { "" }
    );
    results
}

fn run_demo(cfg: &mut Cfg<SimBoard>) {
    let version = exchange(cfg, b'v', 0, 0)[0];
    println!("controller version: {:08X}", version);

    cfg.board_mut().rtc = RtcTime {
        second: 30,
        minute: 15,
        hour: 9,
        weekday: 3,
        day: 21,
        month: 6,
        year: 23,
    };
    let time = exchange(cfg, b't', 0, 0);
    println!("rtc: {:08X} {:08X}", time[0], time[1]);

    exchange(cfg, b'C', ConfigId::SaveType as u32, SaveType::Eeprom16k as u32);
    exchange(cfg, b'C', ConfigId::TvType as u32, TvType::Ntsc as u32);
    exchange(cfg, b'C', ConfigId::BootMode as u32, BootMode::Rom as u32);
    println!(
        "save type {:?}, tv {:?}, boot mode {}, scr {:08X}",
        cfg.save_type(),
        cfg.tv_type(),
        cfg.boot_mode(),
        cfg.board().scr()
    );

    // A memory-window write with its async completion.
    exchange(cfg, b'M', 0x1000_0000, 0x100);
    println!("output ready after enqueue: {}", cfg.usb_output_ready());
    cfg.board_mut().finish_output();
    println!("output ready after completion: {}", cfg.usb_output_ready());
}
