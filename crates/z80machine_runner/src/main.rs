use z80machine_runner::{Options, USAGE};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let options = match Options::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err:#}");
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    log::info!("Running ROM '{}'", options.rom.display());
    let report = z80machine_runner::run(&options)?;
    if report.stuck {
        log::info!("Stopped: CPU can no longer make progress");
    }
    Ok(())
}
