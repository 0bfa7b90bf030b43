use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use ls8::cpu::CPU;
use ls8::error::CpuError;
use ls8::loader;

#[derive(Parser, Debug)]
#[command(name = "ls8")]
#[command(about = "Runs LS-8 programs on an 8-bit virtual machine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a program file and execute it until HLT
    Run {
        /// Program text: one binary word per line, `#` starts a comment
        program: PathBuf,

        /// Address the first word is placed at (execution starts there too)
        #[arg(long, default_value_t = 0)]
        origin: u8,

        /// Stop with an error after this many instructions
        #[arg(long)]
        max_steps: Option<u64>,

        /// Print a trace line to stderr before each instruction
        #[arg(long)]
        trace: bool,
    },
}

fn run(program: PathBuf, origin: u8, max_steps: Option<u64>, trace: bool) -> Result<(), CpuError> {
    let words = loader::load_file(&program)?;

    let mut cpu = CPU::new();
    cpu.load_at(&words, origin as u16)?;
    cpu.program_counter = origin as u16;

    cpu.run_bounded(max_steps, |cpu| {
        if trace {
            eprintln!("{}", cpu.trace());
        }
    })
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            program,
            origin,
            max_steps,
            trace,
        } => {
            log::info!("running {}", program.display());
            if let Err(err) = run(program, origin, max_steps, trace) {
                log::debug!("machine halted: {:?}", err);
                let _ = io::stdout().flush();
                eprintln!("ls8: {}", err);
                process::exit(1);
            }
        }
    }
}
