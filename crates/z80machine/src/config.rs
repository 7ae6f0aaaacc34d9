use typed_builder::TypedBuilder;

use crate::error::ConfigError;
use crate::{CLOCK_HZ, RESET_SP};

/// A contiguous range of the 16-bit address space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub base: u16,
    pub size: u16,
}

impl Window {
    pub const fn new(base: u16, size: u16) -> Self {
        Self { base, size }
    }

    /// Offset of `addr` inside the window, if it falls inside.
    #[inline]
    pub fn offset(&self, addr: u16) -> Option<usize> {
        if addr < self.base {
            return None;
        }
        let offset = (addr - self.base) as usize;
        (offset < self.size as usize).then_some(offset)
    }

    /// One past the last address, widened so a window ending at 0xFFFF fits.
    #[inline]
    pub fn end(&self) -> u32 {
        self.base as u32 + self.size as u32
    }

    fn overlaps(&self, other: &Window) -> bool {
        (self.base as u32) < other.end() && (other.base as u32) < self.end()
    }
}

/// Zero page: the first 256 bytes, always present.
pub const ZERO_PAGE: Window = Window::new(0x0000, 0x0100);

/// Placement of the RAM, ROM and bootROM windows and of the framebuffer
/// window's base. The framebuffer window size follows from the framebuffer
/// geometry in [`MachineConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryMap {
    pub ram: Window,
    pub rom_page0: Window,
    pub rom_paged: Window,
    pub framebuffer_base: u16,
    pub bootrom_paged: Window,
    /// Page 0 of the bootROM; its base is the reset vector.
    pub bootrom_page0: Window,
}

impl Default for MemoryMap {
    fn default() -> Self {
        Self {
            ram: Window::new(0x1000, 0x3000),
            rom_page0: Window::new(0x4000, 0x2000),
            rom_paged: Window::new(0x6000, 0x2000),
            framebuffer_base: 0x8000,
            bootrom_paged: Window::new(0xC000, 0x2000),
            bootrom_page0: Window::new(0xE000, 0x2000),
        }
    }
}

/// Machine configuration. Every field defaults to the standard machine, so
/// `MachineConfig::builder().build()` and `MachineConfig::default()` agree.
#[derive(Clone, Debug, TypedBuilder)]
pub struct MachineConfig {
    #[builder(default)]
    pub memory_map: MemoryMap,
    #[builder(default = 160)]
    pub framebuffer_width: usize,
    #[builder(default = 120)]
    pub framebuffer_height: usize,
    /// Lines of the framebuffer visible through one page of the window.
    #[builder(default = 10)]
    pub framebuffer_line_height: usize,
    #[builder(default = 12)]
    pub tty_rows: usize,
    #[builder(default = 16)]
    pub tty_cols: usize,
    #[builder(default = RESET_SP)]
    pub reset_sp: u16,
    #[builder(default = CLOCK_HZ)]
    pub clock_hz: u32,
    /// Sleep between steps to approximate `clock_hz` in wall-clock time.
    #[builder(default = false)]
    pub pacing: bool,
    /// Whether the rendering collaborator has a font for tty output.
    #[builder(default = true)]
    pub font_available: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MachineConfig {
    /// Window through which the CPU sees one page of the framebuffer.
    pub fn framebuffer_window(&self) -> Window {
        let size = (self.framebuffer_width * self.framebuffer_line_height).min(u16::MAX as usize);
        Window::new(self.memory_map.framebuffer_base, size as u16)
    }

    pub fn reset_pc(&self) -> u16 {
        self.memory_map.bootrom_page0.base
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (what, value) in [
            ("framebuffer width", self.framebuffer_width),
            ("framebuffer height", self.framebuffer_height),
            ("framebuffer line height", self.framebuffer_line_height),
            ("tty rows", self.tty_rows),
            ("tty columns", self.tty_cols),
            ("clock frequency", self.clock_hz as usize),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroSized { what });
            }
        }
        if self.framebuffer_width * self.framebuffer_line_height > u16::MAX as usize {
            return Err(ConfigError::WindowOutOfRange {
                name: "framebuffer",
            });
        }

        let map = &self.memory_map;
        let windows = [
            ("zero page", ZERO_PAGE),
            ("ram", map.ram),
            ("framebuffer", self.framebuffer_window()),
            ("bootrom page 0", map.bootrom_page0),
            ("rom page 0", map.rom_page0),
            ("rom paged", map.rom_paged),
            ("bootrom paged", map.bootrom_paged),
        ];

        for &(name, window) in &windows {
            if window.end() > 0x1_0000 {
                return Err(ConfigError::WindowOutOfRange { name });
            }
            if window.size == 0 {
                return Err(ConfigError::ZeroSized { what: name });
            }
        }

        for (i, &(first, a)) in windows.iter().enumerate() {
            for &(second, b) in &windows[i + 1..] {
                if a.overlaps(&b) {
                    return Err(ConfigError::OverlappingWindows {
                        first,
                        first_base: a.base as u32,
                        first_end: a.end(),
                        second,
                        second_base: b.base as u32,
                        second_end: b.end(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_map_is_valid() {
        let config = MachineConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.framebuffer_window(), Window::new(0x8000, 1600));
        assert_eq!(config.reset_pc(), 0xE000);
    }

    #[test]
    fn overlapping_windows_are_rejected() {
        let mut map = MemoryMap::default();
        map.rom_paged = Window::new(0x5000, 0x2000);
        let config = MachineConfig::builder().memory_map(map).build();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OverlappingWindows {
                first: "rom page 0",
                second: "rom paged",
                ..
            })
        ));
    }

    #[test]
    fn zero_geometry_is_rejected() {
        let config = MachineConfig::builder().tty_cols(0).build();
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroSized {
                what: "tty columns"
            })
        );
    }

    #[test]
    fn window_offset_bounds() {
        let w = Window::new(0xE000, 0x2000);
        assert_eq!(w.offset(0xDFFF), None);
        assert_eq!(w.offset(0xE000), Some(0));
        assert_eq!(w.offset(0xFFFF), Some(0x1FFF));
        assert_eq!(w.end(), 0x1_0000);
    }
}
