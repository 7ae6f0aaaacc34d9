use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::cpu::Bus;
use crate::diagnostics::CollectingSink;
use crate::HALT_OPCODE;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `LD A,value ; OUT (port),A`
fn out(port: u16, value: u8) -> [u8; 4] {
    [0x3E, value, 0xD3, port as u8]
}

fn program(chunks: &[[u8; 4]], tail: &[u8]) -> Vec<u8> {
    let mut bytes: Vec<u8> = chunks.iter().flatten().copied().collect();
    bytes.extend_from_slice(tail);
    bytes
}

#[derive(Default)]
struct RecordingRenderer {
    frames: Vec<(Vec<u8>, usize, usize)>,
    texts: Vec<String>,
}

impl Renderer for RecordingRenderer {
    fn framebuffer(&mut self, pixels: &[u8], width: usize, height: usize) {
        self.frames.push((pixels.to_vec(), width, height));
    }

    fn text(&mut self, text: &str) {
        self.texts.push(text.to_string());
    }
}

#[test]
fn empty_images_halt_immediately() {
    let mut machine = Machine::new(Vec::new(), Vec::new());
    assert_eq!(machine.bus.read_mem(0xE000), HALT_OPCODE);

    assert_eq!(machine.step(), 4);
    assert!(machine.cpu.halted);
    assert!(!machine.is_stuck());
}

#[test]
fn bootrom_program_runs_from_reset_vector() {
    // LD A,0x42 ; LD (0x1000),A ; HALT
    let mut machine = Machine::new(vec![0x3E, 0x42, 0x32, 0x00, 0x10, 0x76], Vec::new());

    assert_eq!(machine.step(), 7);
    assert_eq!(machine.step(), 13);
    machine.step();

    assert!(machine.cpu.halted);
    assert_eq!(machine.bus.read_mem(0x1000), 0x42);
}

#[test]
fn timer_interrupt_is_taken_at_next_step_boundary() {
    init_logger();
    let bootrom = program(
        &[
            out(ports::TIMER0_THRESHOLD_LOW, 1),
            out(ports::TIMER0_CONTROL, 0x03),
        ],
        &[0x00],
    );
    let mut machine = Machine::new(bootrom, Vec::new());

    for _ in 0..4 {
        machine.step();
    }
    assert!(!machine.cpu.interrupts.requested);
    assert_eq!(machine.cpu.regs.pc, 0xE008);

    machine.step();
    assert!(machine.cpu.interrupts.processing);
    // The NOP at the vector ran after entry.
    assert_eq!(machine.cpu.regs.pc, crate::cpu::INTERRUPT_VECTOR + 1);
    assert_eq!(machine.bus.read_mem(0x00FE), 0xE0);
    assert_eq!(machine.bus.read_mem(0x00FD), 0x08);
}

#[test]
fn program_driven_fill() {
    init_logger();
    let gpu_pointer = ports::GPU_BASE + 1;
    let gpu_data = ports::GPU_BASE + 2;
    let mut chunks = Vec::new();
    for (index, value) in [(1u8, CMD_FILL), (2, 0), (3, 0), (4, 0), (5, 0), (6, 16), (7, 0xAA)] {
        chunks.push(out(gpu_pointer, index));
        chunks.push(out(gpu_data, value));
    }
    chunks.push(out(gpu_pointer, 0));
    chunks.push(out(gpu_data, STATUS_TRIGGER));
    let bootrom = program(&chunks, &[0x00, 0x76]);
    let steps = chunks.len() * 2 + 1;

    let mut machine = Machine::new(bootrom, Vec::new());
    for _ in 0..steps {
        machine.step();
    }

    let gpu = &machine.bus.gpu;
    assert_eq!(gpu.command_buffer()[1], RESPONSE_ACK);
    assert_eq!(gpu.command_buffer()[0] & STATUS_TRIGGER, 0);
    assert!(machine.framebuffer()[..16].iter().all(|&b| b == 0xAA));
    assert_eq!(machine.framebuffer()[16], 0);
}

#[test]
fn dump_state_opcode_reaches_sink() {
    init_logger();
    let mut machine =
        Machine::new(vec![0x3E, 0x07, 0xED, 0xFF, 0x76], Vec::new()).with_sink(CollectingSink::default());

    machine.step();
    assert!(machine.sink().dumps.is_empty());
    assert_eq!(machine.step(), 8);

    assert_eq!(machine.sink().dumps.len(), 1);
    assert_eq!(machine.sink().dumps[0].a, 0x07);
    assert_eq!(machine.sink().dumps[0].code.rows[0][0], HALT_OPCODE);
}

#[test]
fn shutdown_emits_final_dump() {
    let mut machine = Machine::new(Vec::new(), Vec::new()).with_sink(CollectingSink::default());
    machine.step();
    machine.shutdown();

    let dumps = &machine.sink().dumps;
    assert_eq!(dumps.len(), 1);
    assert!(dumps[0].halted);
    assert_eq!(dumps[0].pc, 0xE001);
}

#[test]
fn run_stops_on_signal() {
    let mut machine = Machine::new(Vec::new(), Vec::new());

    let stop = AtomicBool::new(true);
    assert_eq!(machine.run(&stop), 0);

    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(10));
        flag.store(true, Ordering::Relaxed);
    });
    let cycles = machine.run(&stop);
    handle.join().unwrap();

    assert!(cycles > 0);
    assert!(machine.cpu.halted);
}

#[test]
fn present_hands_over_dirty_surfaces_once() {
    let mut machine = Machine::new(Vec::new(), Vec::new());
    let mut renderer = RecordingRenderer::default();

    machine.bus.write_mem(0x8000, 0x07);
    machine.present(&mut renderer);
    machine.present(&mut renderer);

    assert_eq!(renderer.frames.len(), 1);
    let (pixels, width, height) = &renderer.frames[0];
    assert_eq!((*width, *height), (160, 120));
    assert_eq!(pixels[0], 0x07);
    assert!(renderer.texts.is_empty());
}

#[test]
fn tty_text_is_presented() {
    let gpu_pointer = ports::GPU_BASE + 1;
    let gpu_data = ports::GPU_BASE + 2;
    let bootrom = program(
        &[
            out(gpu_pointer, 1),
            out(gpu_data, CMD_TTY_WRITE),
            out(gpu_pointer, 2),
            out(gpu_data, b'O'),
            out(gpu_pointer, 3),
            out(gpu_data, b'K'),
            out(gpu_pointer, 0),
            out(gpu_data, STATUS_TRIGGER),
        ],
        &[0x76],
    );
    let mut machine = Machine::new(bootrom, Vec::new());
    for _ in 0..17 {
        machine.step();
    }

    let mut renderer = RecordingRenderer::default();
    machine.present(&mut renderer);
    assert_eq!(renderer.texts.len(), 1);
    assert!(renderer.texts[0].starts_with("OK "));
    assert_eq!(renderer.texts[0].lines().count(), 12);
}

#[test]
fn missing_font_nacks_tty_write() {
    init_logger();
    let mut machine = Machine::new(Vec::new(), Vec::new());
    machine.set_font_available(false);
    for (port, value) in [(1, 1), (2, CMD_TTY_WRITE), (1, 2), (2, b'X'), (1, 0), (2, STATUS_TRIGGER)] {
        machine.bus.write_io(ports::GPU_BASE + port, value);
    }
    machine.step();
    assert_eq!(machine.bus.gpu.command_buffer()[1], RESPONSE_NACK);
}

#[test]
fn keyboard_update_keeps_program_selection() {
    // LD A,'k' ; OUT (0),A ; IN A,(1) ; IN A,(2) ; HALT
    let bootrom = vec![0x3E, b'k', 0xD3, 0x00, 0xDB, 0x01, 0x76];
    let mut machine = Machine::new(bootrom, Vec::new());
    machine.step();
    machine.step();

    let mut host = KeyboardState::new();
    host.handle_key(KeyCode::Code(b'k'), true);
    machine.update_keyboard(&host);

    machine.step();
    assert_eq!(machine.cpu.regs.a(), 1);
    assert_eq!(machine.bus.keyboard.selected(), b'k');
    assert_eq!(machine.bus.keyboard.last_key(), b'k');
}

#[test]
fn halt_after_applied_di_is_stuck() {
    // DI ; NOP ; NOP ; NOP ; HALT
    let mut machine = Machine::new(vec![0xF3, 0x00, 0x00, 0x00, 0x76], Vec::new());
    for _ in 0..4 {
        machine.step();
    }
    assert!(!machine.is_stuck());

    machine.step();
    assert!(machine.is_stuck());
}

#[test]
fn halt_with_di_in_flight_is_not_stuck() {
    let mut machine = Machine::new(vec![0xF3, 0x76], Vec::new());
    for _ in 0..6 {
        machine.step();
    }
    assert!(machine.cpu.halted);
    assert!(!machine.is_stuck());
}

#[test]
fn pacing_follows_clock() {
    let machine = Machine::new(Vec::new(), Vec::new());
    assert_eq!(machine.pace(4), Duration::from_nanos(4_000));

    let config = MachineConfig::builder().clock_hz(2_000_000).build();
    let machine = Machine::with_config(config, Vec::new(), Vec::new()).unwrap();
    assert_eq!(machine.pace(10), Duration::from_nanos(5_000));
}

#[test]
fn invalid_config_is_rejected() {
    let config = MachineConfig::builder().framebuffer_line_height(0).build();
    assert!(matches!(
        Machine::with_config(config, Vec::new(), Vec::new()),
        Err(ConfigError::ZeroSized { .. })
    ));
}

#[test]
fn reset_restores_power_on_state() {
    let mut machine = Machine::new(vec![0x3E, 0x42, 0x32, 0x00, 0x10, 0x76], Vec::new());
    for _ in 0..3 {
        machine.step();
    }
    machine.bus.write_io(ports::ROM_PAGE, 3);
    machine.bus.write_io(ports::BOOTROM_PAGE, 1);

    machine.reset();

    assert_eq!(machine.cpu.regs.pc, 0xE000);
    assert!(!machine.cpu.halted);
    assert_eq!(machine.bus.read_mem(0x1000), 0);
    assert_eq!(machine.bus.rom_page(), 0);
    assert_eq!(machine.bus.bootrom_page(), 0);
    assert_eq!(machine.step(), 7);
}
