use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::Parser;
use env_logger::{Env, Target};
use log::{error, info};

use chip8::config::{DEFAULT_CYCLES_PER_SECOND, DEFAULT_KEY_HOLD_MS};
use chip8::display::MonoTermDisplay;
use chip8::input::TermInput;
use chip8::sound::{Mute, SimpleBeep, Sound};
use chip8::{Chip8Interpreter, Config, Environment, HostError};

/// logs go to a file so they don't scribble over the terminal display
const LOG_FILE: &str = "chip8.log";

#[derive(Parser, Debug)]
#[command(version, about = "CHIP-8 interpreter for the terminal")]
struct Args {
    /// ROM image to run
    rom: PathBuf,

    /// instructions per second
    #[arg(long, default_value_t = DEFAULT_CYCLES_PER_SECOND)]
    ips: u32,

    /// no sound
    #[arg(long)]
    mute: bool,

    /// how long a key press counts as held, in milliseconds
    #[arg(long, default_value_t = DEFAULT_KEY_HOLD_MS)]
    key_hold_ms: u64,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };
    init_logging();

    let config = Config {
        cycles_per_second: args.ips,
        mute: args.mute,
        key_hold: Duration::from_millis(args.key_hold_ms),
        ..Config::default()
    };

    // devices are gone by the time we get here, so the terminal is back to normal
    match run(&args.rom, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("chip8: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    if let Ok(file) = File::create(LOG_FILE) {
        builder.target(Target::Pipe(Box::new(file)));
    }
    builder.init();
}

fn run(rom: &Path, config: Config) -> Result<(), HostError> {
    let mut interpreter = Chip8Interpreter::new();
    let mut f = File::open(rom).map_err(chip8::LoadError::from)?;
    let len = interpreter.load_program(&mut f)?;
    info!("loaded {} ({} bytes)", rom.display(), len);

    let mut sound: Box<dyn Sound> = if config.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new(config.beep_pitch)?)
    };
    let mut display = MonoTermDisplay::new()?;
    let mut input = TermInput::new(config.key_hold)?;

    let mut environment = Environment::new(
        interpreter,
        &mut display,
        &mut input,
        sound.as_mut(),
        config,
    );
    environment.main_loop()
}
