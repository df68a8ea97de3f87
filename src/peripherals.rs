//! Traits for the subsystems the configuration core drives but does not
//! implement: USB transport, 64DD emulation, flash, IS-Viewer trace channel
//! and the RTC. The simulator implements all of them for tests and the
//! host-side binaries; real hardware backends implement them on target.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::rtc::RtcTime;

/// One-shot completion flag for an asynchronous output transfer.
///
/// The transport's execution context fires `signal()` exactly once when the
/// transfer finishes; the dispatcher only ever reads it. Nothing else is
/// shared across that boundary, so a single atomic is the whole protocol.
#[derive(Debug, Clone)]
pub struct OutputReady(Arc<AtomicBool>);

impl OutputReady {
    pub fn new(ready: bool) -> Self {
        OutputReady(Arc::new(AtomicBool::new(ready)))
    }

    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Marks the output mailbox occupied. Called by the dispatcher right
    /// after a transfer is accepted by the queue.
    pub fn set_busy(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Completion callback: frees the output mailbox.
    pub fn signal(&self) {
        self.0.store(true, Ordering::Release);
    }
}

pub trait UsbTransport {
    /// Prepare a host-to-controller read window at a translated local
    /// address. Returns `false` when the transport cannot take the window
    /// yet; the request stays pending and is retried on the next poll.
    fn prepare_read(&mut self, address: u32, length: u32) -> bool;

    /// Current read-window info, as two raw words for the host.
    fn read_info(&self) -> [u32; 2];

    /// Enqueue an asynchronous output transfer. Returns `false` when the
    /// packet queue is busy. On acceptance the transport owns `done` and
    /// fires it exactly once when the DMA completes.
    fn enqueue_output(&mut self, address: u32, length: u32, done: OutputReady) -> bool;
}

pub trait DiskDrive {
    fn drive_type(&self) -> u32;
    fn set_drive_type(&mut self, value: u32);
    fn disk_state(&self) -> u32;
    fn set_disk_state(&mut self, value: u32);
}

pub trait FlashMemory {
    fn erase_block(&mut self, block: u32);
}

pub trait IsViewer {
    fn enabled(&self) -> u32;
    fn set_enabled(&mut self, value: u32);
}

pub trait RtcDriver {
    fn get_time(&self) -> RtcTime;
    fn set_time(&mut self, time: RtcTime);
}

/// Everything the dispatcher needs from the hardware side, in one bound.
pub trait Board:
    crate::regs::FpgaRegs + UsbTransport + DiskDrive + FlashMemory + IsViewer + RtcDriver
{
}

impl<T> Board for T where
    T: crate::regs::FpgaRegs + UsbTransport + DiskDrive + FlashMemory + IsViewer + RtcDriver
{
}
