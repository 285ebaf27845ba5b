extern crate clap;
extern crate colored;
extern crate elfcut;
extern crate log;

use std::process;

use colored::*;
use elfcut::utils::hextab;
use elfcut::{compute_cut_offset, ElfImage, StripOptions};
use log::{Level, LevelFilter, Log, Metadata, Record};

struct StderrLogger {
    level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let tag = match record.level() {
            Level::Error => "error".red().bold(),
            Level::Warn  => "warn".yellow().bold(),
            Level::Info  => "info".green(),
            Level::Debug => "debug".blue(),
            Level::Trace => "trace".dimmed(),
        };
        eprintln!("{}: {}", tag, record.args());
    }

    fn flush(&self) {}
}

fn init_logger(verbosity: u64) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if log::set_boxed_logger(Box::new(StderrLogger { level })).is_ok() {
        log::set_max_level(level);
    }
}

fn dry_run(input: &str) -> elfcut::Result<()> {
    let image = ElfImage::open(input)?;
    let plan = compute_cut_offset(&image)?;

    println!("{}", input.bold());
    println!("  Class:                             {:?}", plan.class);
    println!("  File size:                         {} (bytes)", plan.file_size);
    println!("  Start of section headers:          0x{}", hextab(8, image.shoff()));
    println!("  Number of section headers:         {}", image.shnum());
    println!("  Section header string table index: {}", image.shstrndx());
    match plan.shstrtab {
        Some(ref r) => println!(
            "  Section name string table:         0x{} +0x{}",
            hextab(8, r.offset),
            hextab(8, r.size)
        ),
        None => println!("  Section name string table:         -"),
    }
    if plan.is_noop() {
        println!("  {}", "no section headers, output would equal input".yellow());
    } else {
        println!("  Cut at:                            0x{}", hextab(8, plan.cut_offset));
        println!("  Bytes removed:                     {}", plan.removed_bytes());
    }
    Ok(())
}

fn main() {
    let matches = clap::App::new("elfcut")
        .setting(clap::AppSettings::ArgRequiredElseHelp)
        .setting(clap::AppSettings::UnifiedHelpMessage)
        .version(env!("CARGO_PKG_VERSION"))
        .about("cut the section header table off an ELF32/ELF64 file")
        .arg(clap::Arg::with_name("input")
             .required(true)
             .help("ELF file to read")
             .takes_value(true)
             .index(1)
            )
        .arg(clap::Arg::with_name("output")
             .required_unless("dry-run")
             .help("where to write the cut file")
             .takes_value(true)
             .index(2)
            )
        .arg(clap::Arg::with_name("keep-strtab")
             .long("keep-strtab")
             .help("do not zero the section name string table")
            )
        .arg(clap::Arg::with_name("atomic")
             .long("atomic")
             .help("write to a temporary file and rename it over the output")
            )
        .arg(clap::Arg::with_name("dry-run")
             .long("dry-run")
             .short("n")
             .help("only print where the file would be cut")
            )
        .arg(clap::Arg::with_name("verbose")
             .short("v")
             .multiple(true)
             .help("log each step, twice for every section header read")
            )
        .get_matches();

    init_logger(matches.occurrences_of("verbose"));

    let input = matches.value_of("input").unwrap_or_default();

    if matches.is_present("dry-run") {
        if let Err(e) = dry_run(input) {
            eprintln!("{}: {}: {}", "elfcut".red().bold(), input, e);
            process::exit(1);
        }
        return;
    }

    let output = matches.value_of("output").unwrap_or_default();
    let opts = StripOptions {
        scrub_strtab: !matches.is_present("keep-strtab"),
        atomic:       matches.is_present("atomic"),
        ..StripOptions::default()
    };

    match elfcut::strip_file(input, output, &opts) {
        Ok(report) => {
            if report.plan.is_noop() {
                println!("{}: no section headers, copied as is", input.yellow());
            } else {
                println!(
                    "{} -> {}: cut at 0x{}, {} bytes removed",
                    input,
                    output.bold(),
                    hextab(8, report.plan.cut_offset),
                    report.plan.removed_bytes()
                );
            }
        }
        Err(e) => {
            eprintln!("{}: {}: {}", "elfcut".red().bold(), input, e);
            process::exit(1);
        }
    }
}
