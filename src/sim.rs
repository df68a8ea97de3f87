//! Simulated board: an in-memory register file plus scriptable stand-ins
//! for every peripheral trait. Used by the tests and by the host-side
//! binaries; it also plays the host, submitting requests the way the
//! console CPU would.

#![allow(dead_code)]

use crate::peripherals::{DiskDrive, FlashMemory, IsViewer, OutputReady, RtcDriver, UsbTransport};
use crate::regs::{CfgCmd, FpgaRegs, Reg, Status};
use crate::rtc::RtcTime;

/// An output transfer accepted by the simulated queue but not yet finished.
#[derive(Debug)]
pub struct PendingOutput {
    pub address: u32,
    pub length: u32,
    done: OutputReady,
}

pub struct SimBoard {
    regs: [u32; 6],
    /// When false, `prepare_read` reports not-ready and the request defers.
    pub read_window_free: bool,
    /// When false, `enqueue_output` reports busy and the request defers.
    pub output_queue_free: bool,
    pub pending_output: Option<PendingOutput>,
    read_window: [u32; 2],
    pub rtc: RtcTime,
    pub drive_type: u32,
    pub disk_state: u32,
    pub isv_enabled: u32,
    pub erased_blocks: Vec<u32>,
}

pub const SIM_VERSION: u32 = 0x5343_0200;

fn idx(reg: Reg) -> usize {
    match reg {
        Reg::Status => 0,
        Reg::Command => 1,
        Reg::Data0 => 2,
        Reg::Data1 => 3,
        Reg::Version => 4,
        Reg::Scr => 5,
    }
}

impl SimBoard {
    pub fn new() -> Self {
        let mut regs = [0; 6];
        regs[idx(Reg::Version)] = SIM_VERSION;
        SimBoard {
            regs,
            read_window_free: true,
            output_queue_free: true,
            pending_output: None,
            read_window: [0, 0],
            rtc: RtcTime::default(),
            drive_type: 0,
            disk_state: 0,
            isv_enabled: 0,
            erased_blocks: Vec::new(),
        }
    }

    // ---- host side ----

    /// Submit a request the way the host does: arguments, command byte,
    /// then the pending bit.
    pub fn submit(&mut self, cmd: u8, arg0: u32, arg1: u32) {
        self.regs[idx(Reg::Data0)] = arg0;
        self.regs[idx(Reg::Data1)] = arg1;
        self.regs[idx(Reg::Command)] = cmd as u32;
        self.regs[idx(Reg::Status)] |= Status::CFG_PENDING.bits();
    }

    pub fn pending(&self) -> bool {
        self.regs[idx(Reg::Status)] & Status::CFG_PENDING.bits() != 0
    }

    pub fn done(&self) -> bool {
        self.regs[idx(Reg::Command)] & CfgCmd::DONE.bits() != 0
    }

    pub fn error(&self) -> bool {
        self.regs[idx(Reg::Command)] & CfgCmd::ERROR.bits() != 0
    }

    pub fn results(&self) -> [u32; 2] {
        [self.regs[idx(Reg::Data0)], self.regs[idx(Reg::Data1)]]
    }

    pub fn scr(&self) -> u32 {
        self.regs[idx(Reg::Scr)]
    }

    /// Last prepared read window (address, length).
    pub fn read_window(&self) -> [u32; 2] {
        self.read_window
    }

    /// Complete the in-flight output transfer, firing its completion flag.
    /// Panics if nothing is in flight; the tests treat that as a bug.
    pub fn finish_output(&mut self) -> PendingOutput {
        let pending = self.pending_output.take().expect("no output in flight");
        pending.done.signal();
        pending
    }
}

impl FpgaRegs for SimBoard {
    fn reg_get(&mut self, reg: Reg) -> u32 {
        self.regs[idx(reg)]
    }

    fn reg_set(&mut self, reg: Reg, value: u32) {
        self.regs[idx(reg)] = value;
        // The hardware clears the pending bit when the done flag lands in
        // the command register.
        if reg == Reg::Command && value & CfgCmd::DONE.bits() != 0 {
            self.regs[idx(Reg::Status)] &= !Status::CFG_PENDING.bits();
        }
    }
}

impl UsbTransport for SimBoard {
    fn prepare_read(&mut self, address: u32, length: u32) -> bool {
        if !self.read_window_free {
            return false;
        }
        self.read_window = [address, length];
        true
    }

    fn read_info(&self) -> [u32; 2] {
        self.read_window
    }

    fn enqueue_output(&mut self, address: u32, length: u32, done: OutputReady) -> bool {
        if !self.output_queue_free || self.pending_output.is_some() {
            return false;
        }
        self.pending_output = Some(PendingOutput {
            address,
            length,
            done,
        });
        true
    }
}

impl DiskDrive for SimBoard {
    fn drive_type(&self) -> u32 {
        self.drive_type
    }

    fn set_drive_type(&mut self, value: u32) {
        self.drive_type = value;
    }

    fn disk_state(&self) -> u32 {
        self.disk_state
    }

    fn set_disk_state(&mut self, value: u32) {
        self.disk_state = value;
    }
}

impl FlashMemory for SimBoard {
    fn erase_block(&mut self, block: u32) {
        self.erased_blocks.push(block);
    }
}

impl IsViewer for SimBoard {
    fn enabled(&self) -> u32 {
        self.isv_enabled
    }

    fn set_enabled(&mut self, value: u32) {
        self.isv_enabled = value;
    }
}

impl RtcDriver for SimBoard {
    fn get_time(&self) -> RtcTime {
        self.rtc
    }

    fn set_time(&mut self, time: RtcTime) {
        self.rtc = time;
    }
}
