use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use z80machine::{Machine, MachineConfig, Renderer};

pub const USAGE: &str =
    "Usage: z80machine_runner [rom] [--bootrom PATH] [--steps N] [--pace] [--dump-fb PATH]";

const DEFAULT_ROM: &str = "rom.bin";
const DEFAULT_BOOTROM: &str = "bootrom.bin";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub rom: PathBuf,
    pub bootrom: PathBuf,
    /// Stop after this many CPU steps; unlimited when `None`.
    pub steps: Option<u64>,
    pub pace: bool,
    pub dump_framebuffer: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            rom: PathBuf::from(DEFAULT_ROM),
            bootrom: PathBuf::from(DEFAULT_BOOTROM),
            steps: None,
            pace: false,
            dump_framebuffer: None,
        }
    }
}

impl Options {
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Self> {
        let mut options = Options::default();
        let mut rom_seen = false;
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--bootrom" => {
                    let path = args.next().context("--bootrom needs a path")?;
                    options.bootrom = PathBuf::from(path);
                }
                "--steps" => {
                    let count = args.next().context("--steps needs a count")?;
                    let count = count
                        .parse::<u64>()
                        .with_context(|| format!("invalid step count '{count}'"))?;
                    options.steps = Some(count);
                }
                "--pace" => options.pace = true,
                "--dump-fb" => {
                    let path = args.next().context("--dump-fb needs a path")?;
                    options.dump_framebuffer = Some(PathBuf::from(path));
                }
                flag if flag.starts_with("--") => bail!("unknown option '{flag}'"),
                path => {
                    if rom_seen {
                        bail!("unexpected argument '{path}'");
                    }
                    options.rom = PathBuf::from(path);
                    rom_seen = true;
                }
            }
        }
        Ok(options)
    }
}

/// Read an image file. A missing or unreadable file becomes an empty image,
/// which the machine sees as a window full of HALT.
pub fn load_image(path: &Path, what: &str) -> Vec<u8> {
    match std::fs::read(path) {
        Ok(bytes) => {
            log::info!("Loaded {} '{}' ({} bytes)", what, path.display(), bytes.len());
            bytes
        }
        Err(err) => {
            log::warn!(
                "Could not read {} '{}': {err}; using an empty image",
                what,
                path.display()
            );
            Vec::new()
        }
    }
}

/// Prints tty updates to stdout; framebuffer updates are only counted.
#[derive(Debug, Default)]
pub struct StdoutRenderer {
    pub frames: u64,
}

impl Renderer for StdoutRenderer {
    fn framebuffer(&mut self, _pixels: &[u8], width: usize, height: usize) {
        self.frames += 1;
        log::debug!("Framebuffer update #{} ({}x{})", self.frames, width, height);
    }

    fn text(&mut self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(err) = write_text(&mut stdout, text) {
            log::warn!("Failed to write tty text to stdout: {err}");
        }
    }
}

/// Tty contents followed by a blank separator line.
fn write_text<W: Write>(out: &mut W, text: &str) -> std::io::Result<()> {
    writeln!(out, "{text}")?;
    writeln!(out)?;
    out.flush()
}

/// Summary of a finished run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunReport {
    pub steps: u64,
    pub cycles: u64,
    pub stuck: bool,
}

/// Run `machine` until the step budget is used up or the CPU can no longer
/// make progress.
pub fn drive<R: Renderer>(machine: &mut Machine, renderer: &mut R, budget: Option<u64>) -> RunReport {
    let mut report = RunReport {
        steps: 0,
        cycles: 0,
        stuck: false,
    };
    let pacing = machine.config().pacing;

    while budget.map_or(true, |limit| report.steps < limit) {
        let cycles = machine.step();
        report.steps += 1;
        report.cycles += cycles as u64;
        machine.present(renderer);

        if machine.is_stuck() {
            log::info!(
                "CPU halted with interrupts disabled @ 0x{:04X}",
                machine.cpu.regs.pc
            );
            report.stuck = true;
            break;
        }
        if pacing {
            std::thread::sleep(machine.pace(cycles));
        }
    }
    report
}

pub fn run(options: &Options) -> anyhow::Result<RunReport> {
    let bootrom = load_image(&options.bootrom, "bootROM");
    let rom = load_image(&options.rom, "ROM");

    let config = MachineConfig::builder().pacing(options.pace).build();
    let mut machine =
        Machine::with_config(config, bootrom, rom).context("invalid machine configuration")?;

    let mut renderer = StdoutRenderer::default();
    let report = drive(&mut machine, &mut renderer, options.steps);
    log::info!(
        "Ran {} steps ({} T-states), {} framebuffer updates",
        report.steps,
        report.cycles,
        renderer.frames
    );

    if let Some(path) = &options.dump_framebuffer {
        std::fs::write(path, machine.framebuffer())
            .with_context(|| format!("failed to write framebuffer to '{}'", path.display()))?;
        let (width, height) = machine.bus.gpu.dimensions();
        println!(
            "Wrote {} bytes ({}x{} rgb332) to '{}'",
            machine.framebuffer().len(),
            width,
            height,
            path.display()
        );
    }

    machine.shutdown();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults() {
        let options = Options::parse(Vec::new()).unwrap();
        assert_eq!(options, Options::default());
        assert_eq!(options.rom, PathBuf::from("rom.bin"));
        assert_eq!(options.bootrom, PathBuf::from("bootrom.bin"));
    }

    #[test]
    fn parses_all_options() {
        let options = Options::parse(args(&[
            "game.bin",
            "--bootrom",
            "boot.bin",
            "--steps",
            "100",
            "--pace",
            "--dump-fb",
            "fb.raw",
        ]))
        .unwrap();
        assert_eq!(options.rom, PathBuf::from("game.bin"));
        assert_eq!(options.bootrom, PathBuf::from("boot.bin"));
        assert_eq!(options.steps, Some(100));
        assert!(options.pace);
        assert_eq!(options.dump_framebuffer, Some(PathBuf::from("fb.raw")));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(Options::parse(args(&["--steps", "many"])).is_err());
        assert!(Options::parse(args(&["--bootrom"])).is_err());
        assert!(Options::parse(args(&["--fast"])).is_err());
        assert!(Options::parse(args(&["a.bin", "b.bin"])).is_err());
    }

    #[test]
    fn missing_image_is_empty() {
        let image = load_image(Path::new("/nonexistent/z80machine/rom.bin"), "ROM");
        assert!(image.is_empty());
    }

    struct BrokenPipe;

    impl std::io::Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn tty_text_is_separated_by_blank_line() {
        let mut out = Vec::new();
        write_text(&mut out, "AB\nCD").unwrap();
        assert_eq!(out, b"AB\nCD\n\n");
    }

    #[test]
    fn tty_write_errors_are_reported() {
        let err = write_text(&mut BrokenPipe, "AB").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn drive_stops_when_stuck() {
        // DI ; NOP ; NOP ; NOP ; HALT
        let mut machine = Machine::new(vec![0xF3, 0x00, 0x00, 0x00, 0x76], Vec::new());
        let mut renderer = StdoutRenderer::default();
        let report = drive(&mut machine, &mut renderer, Some(1_000));
        assert!(report.stuck);
        assert_eq!(report.steps, 5);
        assert_eq!(report.cycles, 20);
    }

    #[test]
    fn drive_respects_budget() {
        let mut machine = Machine::new(Vec::new(), Vec::new());
        let mut renderer = StdoutRenderer::default();
        let report = drive(&mut machine, &mut renderer, Some(10));
        assert!(!report.stuck);
        assert_eq!(report.steps, 10);
    }
}
