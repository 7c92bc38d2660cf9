use anyhow::Context;
use clap::Parser;
use log::info;

mod app;
mod beep;
mod clock;
mod display;
mod emulator;
mod input;
mod instruction;
mod keymap;
mod machine;
mod rom;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// ROM file to load
    #[clap(value_parser)]
    filename: String,

    /// CPU clock speed, in instructions per second
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..), default_value_t = 500)]
    clock_speed: u32,

    /// Window pixels per CHIP-8 pixel
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..), default_value_t = 10)]
    scale: u32,
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    // parse command-line arguments
    let cli = Cli::parse();

    // read the rom
    let file = std::fs::File::open(&cli.filename)
        .with_context(|| format!("error opening rom file: {}", &cli.filename))?;
    let program = rom::read_rom(file).context("error reading rom")?;
    info!("loaded {} ({} bytes)", &cli.filename, program.len());

    // build the emulator
    let mut emu = emulator::Emulator::new();
    emu.load_fontset(&emulator::FONTSET);
    emu.load_program(&program).context("error loading rom")?;

    // run
    let settings = app::Settings {
        clock_speed: cli.clock_speed,
        scale: cli.scale,
        title: format!("VIP8 - {}", &cli.filename),
    };
    app::run(emu, settings)?;
    Ok(())
}
