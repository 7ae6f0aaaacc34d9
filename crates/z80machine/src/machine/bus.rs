use crate::config::{MachineConfig, MemoryMap, Window, ZERO_PAGE};
use crate::cpu::Bus;
use crate::HALT_OPCODE;

use super::gpu::Gpu;
use super::keyboard::KeyboardState;
use super::timer::Timer0;

/// IO port assignments.
pub mod ports {
    pub const KEY_SELECT: u16 = 0;
    pub const KEY_DOWN: u16 = 1;
    pub const KEY_LAST: u16 = 2;
    pub const GPU_BASE: u16 = 10;
    pub const GPU_LEN: u16 = 10;
    pub const TIMER0_CONTROL: u16 = 20;
    pub const TIMER0_THRESHOLD_LOW: u16 = 21;
    pub const TIMER0_THRESHOLD_HIGH: u16 = 22;
    pub const BOOTROM_PAGE: u16 = 30;
    pub const ROM_PAGE: u16 = 40;
}

/// Highest IO port the machine decodes.
const IO_PORT_MAX: u16 = 0xFF;

/// Memory and IO decode for the whole machine plus the attached devices.
pub struct MachineBus {
    map: MemoryMap,
    framebuffer_window: Window,
    zero_page: [u8; ZERO_PAGE.size as usize],
    ram: Vec<u8>,
    bootrom: Vec<u8>,
    rom: Vec<u8>,
    bootrom_page: u8,
    rom_page: u8,
    pub timer: Timer0,
    pub gpu: Gpu,
    pub keyboard: KeyboardState,
    irq_pending: bool,
}

impl MachineBus {
    pub fn new(config: &MachineConfig, bootrom: Vec<u8>, rom: Vec<u8>) -> Self {
        Self {
            map: config.memory_map,
            framebuffer_window: config.framebuffer_window(),
            zero_page: [0; ZERO_PAGE.size as usize],
            ram: vec![0; config.memory_map.ram.size as usize],
            bootrom,
            rom,
            bootrom_page: 0,
            rom_page: 0,
            timer: Timer0::new(),
            gpu: Gpu::new(config),
            keyboard: KeyboardState::new(),
            irq_pending: false,
        }
    }

    /// Power-on state for everything but the images and the host-side
    /// keyboard state.
    pub fn reset(&mut self, config: &MachineConfig) {
        self.zero_page.fill(0);
        self.ram.fill(0);
        self.bootrom_page = 0;
        self.rom_page = 0;
        self.timer = Timer0::new();
        self.gpu = Gpu::new(config);
        self.keyboard.select(0);
        self.irq_pending = false;
    }

    pub fn rom_page(&self) -> u8 {
        self.rom_page
    }

    pub fn bootrom_page(&self) -> u8 {
        self.bootrom_page
    }
}

/// Page 0 of an image: an empty image reads as HALT, a short one as 0 past
/// its end.
fn read_page0(image: &[u8], offset: usize) -> u8 {
    if image.is_empty() {
        return HALT_OPCODE;
    }
    image.get(offset).copied().unwrap_or(0)
}

/// Paged slice of an image: anything past the end reads as HALT.
fn read_paged(image: &[u8], window: Window, page: u8, offset: usize) -> u8 {
    let index = page as usize * window.size as usize + offset;
    image.get(index).copied().unwrap_or(HALT_OPCODE)
}

impl Bus for MachineBus {
    fn read_mem(&mut self, addr: u16) -> u8 {
        if let Some(offset) = ZERO_PAGE.offset(addr) {
            self.zero_page[offset]
        } else if let Some(offset) = self.map.ram.offset(addr) {
            self.ram[offset]
        } else if let Some(offset) = self.framebuffer_window.offset(addr) {
            self.gpu.read_window(offset)
        } else if let Some(offset) = self.map.bootrom_page0.offset(addr) {
            read_page0(&self.bootrom, offset)
        } else if let Some(offset) = self.map.rom_page0.offset(addr) {
            read_page0(&self.rom, offset)
        } else if let Some(offset) = self.map.rom_paged.offset(addr) {
            read_paged(&self.rom, self.map.rom_paged, self.rom_page, offset)
        } else if let Some(offset) = self.map.bootrom_paged.offset(addr) {
            read_paged(&self.bootrom, self.map.bootrom_paged, self.bootrom_page, offset)
        } else {
            0
        }
    }

    fn write_mem(&mut self, addr: u16, value: u8) {
        if let Some(offset) = ZERO_PAGE.offset(addr) {
            self.zero_page[offset] = value;
        } else if let Some(offset) = self.map.ram.offset(addr) {
            self.ram[offset] = value;
        } else if let Some(offset) = self.framebuffer_window.offset(addr) {
            self.gpu.write_window(offset, value);
        }
    }

    fn read_io(&mut self, port: u16) -> u8 {
        if port > IO_PORT_MAX {
            return 0;
        }
        match port {
            ports::KEY_SELECT => self.keyboard.selected(),
            ports::KEY_DOWN => self.keyboard.selected_down(),
            ports::KEY_LAST => self.keyboard.last_key(),
            ports::TIMER0_CONTROL => self.timer.control(),
            ports::TIMER0_THRESHOLD_LOW => self.timer.threshold_low(),
            ports::TIMER0_THRESHOLD_HIGH => self.timer.threshold_high(),
            ports::BOOTROM_PAGE => self.bootrom_page,
            ports::ROM_PAGE => self.rom_page,
            p if (ports::GPU_BASE..ports::GPU_BASE + ports::GPU_LEN).contains(&p) => {
                self.gpu.read_io(p - ports::GPU_BASE)
            }
            _ => 0,
        }
    }

    fn write_io(&mut self, port: u16, value: u8) {
        if port > IO_PORT_MAX {
            return;
        }
        match port {
            ports::KEY_SELECT => self.keyboard.select(value),
            ports::TIMER0_CONTROL => self.timer.write_control(value),
            ports::TIMER0_THRESHOLD_LOW => self.timer.write_threshold_low(value),
            ports::TIMER0_THRESHOLD_HIGH => self.timer.write_threshold_high(value),
            ports::BOOTROM_PAGE => self.bootrom_page = value,
            ports::ROM_PAGE => self.rom_page = value,
            p if (ports::GPU_BASE..ports::GPU_BASE + ports::GPU_LEN).contains(&p) => {
                self.gpu.write_io(p - ports::GPU_BASE, value)
            }
            _ => {}
        }
    }

    fn tick(&mut self) {
        if self.timer.tick() {
            self.irq_pending = true;
        }
        self.gpu.tick();
    }

    fn take_interrupt(&mut self) -> bool {
        std::mem::take(&mut self.irq_pending)
    }
}
