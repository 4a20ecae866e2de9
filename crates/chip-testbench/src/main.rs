//! Run a transistor-level 65xx against a memory map.
//!
//! The netlist and machine can come from a JSON config file; every setting
//! can also be given or overridden on the command line.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use chip_core::Observable;
use chip_testbench::{
    Console, Machine, MachineConfig, RamSpec, RomSpec, RunLimit, TraceFormat, Tracer,
};
use clap::Parser;
use mos_65xx::{Mos65xx, Netlist, Variant};

#[derive(Parser)]
#[command(name = "chip-testbench")]
#[command(about = "Clock a switch-level 65xx against ROM and RAM", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON machine configuration
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Netlist JSON file, or a directory holding the segdefs/transdefs/nodenames files
    #[arg(short, long, value_name = "PATH")]
    netlist: Option<PathBuf>,

    /// Chip variant, e.g. MOS6502 or MOS6510-1
    #[arg(long, value_name = "NAME")]
    chip: Option<String>,

    /// Map a ROM image (repeatable)
    #[arg(long, value_name = "FILE@ADDR")]
    rom: Vec<RomSpec>,

    /// Map zero-filled RAM (repeatable)
    #[arg(long, value_name = "START:SIZE")]
    ram: Vec<RamSpec>,

    /// Stop after this many cycles
    #[arg(long, value_name = "N")]
    cycles: Option<u64>,

    /// Stop once PC reaches this address
    #[arg(long, value_name = "ADDR", value_parser = parse_pc)]
    until_pc: Option<u16>,

    /// Write a per-cycle trace ("-" for stdout)
    #[arg(long, value_name = "FILE")]
    trace: Option<PathBuf>,

    #[arg(long, value_enum)]
    trace_format: Option<TraceFormat>,

    /// Cycles to hold RES low
    #[arg(long, value_name = "N")]
    reset_cycles: Option<u32>,

    /// Map the console mailbox here, wired to stdin and stdout
    #[arg(long, value_name = "ADDR", value_parser = parse_console)]
    console: Option<u32>,

    /// Per-call propagation limit
    #[arg(long, value_name = "N")]
    settle_budget: Option<usize>,

    /// After the run, print these observable paths as JSON (comma separated)
    #[arg(long, value_name = "PATHS", value_delimiter = ',')]
    query: Vec<String>,

    /// Write the loaded netlist as JSON and exit
    #[arg(long, value_name = "FILE")]
    export_netlist: Option<PathBuf>,

    /// Print run statistics
    #[arg(short, long)]
    stats: bool,

    /// List the supported variants and exit
    #[arg(long)]
    list: bool,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_pc(text: &str) -> Result<u16, String> {
    let address = chip_testbench::config::parse_address(text).map_err(|e| e.to_string())?;
    u16::try_from(address).map_err(|_| format!("{text} is outside the 16-bit address space"))
}

fn parse_console(text: &str) -> Result<u32, String> {
    chip_testbench::config::parse_address(text).map_err(|e| e.to_string())
}

/// Minimal stderr logger.
struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn list_variants() {
    println!("{:<10} {:>4} {:>8}  I/O port", "variant", "pins", "address");
    for variant in Variant::ALL {
        let port = match variant {
            Variant::Mos6510 => "P0-P5",
            _ if variant.has_io_port() => "P0-P7",
            _ => "-",
        };
        println!(
            "{:<10} {:>4} {:>8}  {port}",
            variant.name(),
            variant.pin_count(),
            format!("{} bits", variant.address_bus_width()),
        );
    }
}

/// Config file first, then command-line overrides.
fn build_config(cli: &Cli) -> Result<MachineConfig> {
    let mut config = match &cli.config {
        Some(path) => MachineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MachineConfig::default(),
    };
    if let Some(netlist) = &cli.netlist {
        config.netlist = Some(netlist.clone());
    }
    if let Some(chip) = &cli.chip {
        config.chip.clone_from(chip);
    }
    config.roms.extend(cli.rom.iter().cloned());
    config.ram.extend(cli.ram.iter().copied());
    if cli.cycles.is_some() {
        config.max_cycles = cli.cycles;
    }
    if cli.until_pc.is_some() {
        config.until_pc = cli.until_pc;
    }
    if let Some(trace) = &cli.trace {
        config.trace = Some(trace.clone());
    }
    if let Some(format) = cli.trace_format {
        config.trace_format = format;
    }
    if let Some(cycles) = cli.reset_cycles {
        config.reset_cycles = cycles;
    }
    if cli.settle_budget.is_some() {
        config.settle_budget = cli.settle_budget;
    }
    if cli.console.is_some() {
        config.console = cli.console;
    }
    Ok(config)
}

fn open_trace(config: &MachineConfig) -> Result<Option<Tracer>> {
    let Some(path) = &config.trace else {
        return Ok(None);
    };
    let out: Box<dyn Write> = if path.as_os_str() == "-" {
        Box::new(io::stdout().lock())
    } else {
        let file = File::create(path)
            .with_context(|| format!("creating trace file {}", path.display()))?;
        Box::new(BufWriter::new(file))
    };
    Ok(Some(Tracer::new(out, config.trace_format)))
}

fn print_queries(cpu: &Mos65xx, paths: &[String]) -> Result<()> {
    let mut values = serde_json::Map::new();
    for path in paths {
        let value = cpu
            .query(path)
            .with_context(|| format!("unknown query path {path:?}"))?;
        values.insert(path.clone(), serde_json::to_value(&value)?);
    }
    println!("{}", serde_json::to_string_pretty(&values)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.list {
        list_variants();
        return Ok(());
    }

    let config = build_config(&cli)?;
    let variant = config.variant()?;
    let Some(netlist_path) = &config.netlist else {
        bail!("no netlist given; pass --netlist or set \"netlist\" in the config");
    };
    let netlist = Netlist::load(netlist_path)
        .with_context(|| format!("loading netlist {}", netlist_path.display()))?;

    if let Some(path) = &cli.export_netlist {
        fs::write(path, netlist.to_json()?)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("netlist written to {}", path.display());
        return Ok(());
    }

    let cpu = Mos65xx::with_config(variant, &netlist, config.chip_config())
        .with_context(|| format!("building {variant}"))?;
    let memory = config.build_memory()?;
    let mut machine = Machine::new(cpu, memory).with_reset_cycles(config.reset_cycles);
    if let Some(tracer) = open_trace(&config)? {
        machine = machine.with_tracer(tracer);
    }
    if let Some(base) = config.console {
        log::info!("console mailbox at ${base:04X}");
        machine = machine.with_console(Console::new(
            base,
            Box::new(io::stdin()),
            Box::new(io::stdout()),
        ));
    }

    let started = Instant::now();
    machine.reset().context("reset")?;
    let result = machine
        .run(RunLimit {
            max_cycles: config.max_cycles,
            until_pc: config.until_pc,
        })
        .context("run")?;
    let elapsed = started.elapsed();

    if cli.stats {
        let seconds = elapsed.as_secs_f64();
        eprintln!("chip:    {variant}");
        eprintln!("cycles:  {}", result.cycles);
        eprintln!("stop:    {:?}", result.stop);
        eprintln!("elapsed: {seconds:.3}s");
        if seconds > 0.0 {
            #[allow(clippy::cast_precision_loss)]
            let rate = result.cycles as f64 / seconds;
            eprintln!("rate:    {rate:.0} cycles/s");
        }
    }
    if !cli.query.is_empty() {
        print_queries(machine.cpu(), &cli.query)?;
    }
    Ok(())
}
