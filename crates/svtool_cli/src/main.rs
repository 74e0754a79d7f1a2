//! svtool: simulate a SystemVerilog-subset source file.
//!
//! Pipeline: read the source, lex and parse, elaborate (parameters and
//! generate unrolling), lower to RTL, then run the event-driven kernel,
//! optionally writing a VCD waveform trace.
//!
//! Exit codes: 0 on success, 1 on usage, parse, or elaboration errors.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use svtool_common::Interner;
use svtool_diagnostics::{render_diagnostic, DiagnosticSink, Severity};
use svtool_elaborate::GenArena;
use svtool_sim::{Kernel, VcdWriter};
use svtool_source::SourceDb;

/// Simulator for a synthesizable SystemVerilog subset.
#[derive(Parser, Debug)]
#[command(name = "svtool", version, about = "SystemVerilog subset simulator")]
struct Cli {
    /// Write a VCD waveform trace to this path.
    #[arg(long, value_name = "PATH")]
    vcd: Option<PathBuf>,

    /// Halt before processing any event later than this time (0 runs
    /// until the event queue empties or $finish).
    #[arg(long, value_name = "N", default_value_t = 0)]
    max: u64,

    /// The source file to simulate.
    source: PathBuf,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version requests are not usage errors.
            if e.use_stderr() {
                eprint!("{e}");
                process::exit(1);
            }
            print!("{e}");
            process::exit(0);
        }
    };
    process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    let text = match fs::read_to_string(&cli.source) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("error: cannot open {}: {e}", cli.source.display());
            return 1;
        }
    };

    let mut source_db = SourceDb::new();
    let file = source_db.add_source(cli.source.display().to_string(), text);

    let interner = Interner::new();
    let sink = DiagnosticSink::new();

    let ast = svtool_parser::parse_source(source_db.file_text(file), file, &interner, &sink);
    if sink.has_errors() {
        report(&sink, &source_db);
        return 1;
    }

    let arena = GenArena::new();
    let elab = match svtool_elaborate::elaborate(&ast, &arena, &interner, &sink) {
        Ok(elab) => elab,
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    };
    if sink.has_errors() {
        report(&sink, &source_db);
        return 1;
    }

    let design = svtool_ir::build_design(&elab, &interner);

    let mut kernel = Kernel::new(&interner);
    if let Some(path) = &cli.vcd {
        match fs::File::create(path) {
            Ok(file) => {
                let writer: Box<dyn Write> = Box::new(BufWriter::new(file));
                kernel.set_vcd(VcdWriter::new(writer));
            }
            Err(e) => {
                eprintln!("error: cannot create {}: {e}", path.display());
                return 1;
            }
        }
    }

    if let Err(e) = kernel.load_design(&design) {
        eprintln!("error: {e}");
        return 1;
    }
    if let Err(e) = kernel.run(cli.max) {
        eprintln!("error: {e}");
        return 1;
    }

    // Surface non-fatal diagnostics (lowering gaps, skipped items).
    report(&sink, &source_db);

    if kernel.stop_requested() {
        eprintln!("$finish at time {}", kernel.time());
    } else {
        eprintln!("simulation settled at time {}", kernel.time());
    }
    if let Some(path) = &cli.vcd {
        eprintln!("wrote {}", path.display());
    }

    0
}

fn report(sink: &DiagnosticSink, source_db: &SourceDb) {
    for diag in sink.take_all() {
        if diag.severity >= Severity::Warning {
            eprintln!("{}", render_diagnostic(&diag, source_db));
        }
    }
}
