//! Check whether a sequence of assumptions is consistent under unit propagation

use clap::{AppSettings, Arg, ArgMatches};
use incsat::{Options, Solver};
use incsat_common::{
    clause::write_clause,
    die,
    output::{install_signal_handler, print_key_value, print_solution, Timer},
    parser::open_file,
    write_to_stdout,
};
use std::io::Read;

fn main() {
    std::process::exit(run_frontend());
}

/// Run `propcheck`, returning its exit code: 10 if the assumptions are
/// consistent, 20 otherwise.
fn run_frontend() -> i32 {
    install_signal_handler();
    let app = clap::App::new("propcheck")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Check assumptions for consistency under unit propagation")
        .setting(AppSettings::AllowNegativeNumbers)
        .after_help(
            "Input files may be compressed - supported file extensions are: zst, gz, bz2, xz and lz4.
Use \"-\" to read the formula from standard input.",
        )
        .arg(Arg::with_name("INPUT").required(true).help("input file in DIMACS format"))
        .arg(
            Arg::with_name("ASSUMPTIONS")
                .multiple(true)
                .help("literals to assume, in this order"),
        )
        .arg(
            Arg::with_name("RESTORE")
                .short("r")
                .long("restore")
                .help("First propagate literals assigned out of band; a conflict there is reported separately."),
        )
        .arg(
            Arg::with_name("CORE")
                .short("u")
                .long("core")
                .help("Print the assumptions responsible for a conflict."),
        )
        .arg(
            Arg::with_name("OPTIONS_FILE")
                .takes_value(true)
                .long("options")
                .help("Read solver options from this TOML file."),
        )
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Verbose output. Repeat for more detail."),
        );
    let matches = app.get_matches();
    let options = read_options(&matches);
    let quiet = options.quiet;
    let formula_filename = matches.value_of("INPUT").unwrap();
    let assumptions: Vec<i32> = matches
        .values_of("ASSUMPTIONS")
        .map(|values| values.map(parse_literal).collect())
        .unwrap_or_default();

    let mut timer = Timer::name("total time");
    timer.disabled = quiet;
    let mut solver = Solver::with_options(options);
    solver
        .read_dimacs(formula_filename)
        .unwrap_or_else(|err| die!("{}: {}", formula_filename, err));
    let result = solver.propcheck(
        &assumptions,
        matches.is_present("RESTORE"),
        /*save_propagated=*/ true,
        matches.is_present("CORE"),
    );
    print_solution(if result.is_consistent() {
        "CONSISTENT"
    } else {
        "INCONSISTENT"
    });
    if let Some(propagated) = &result.propagated {
        print_literals("v", propagated);
    }
    if let Some(core) = &result.core {
        print_literals("u", core);
    }
    drop(timer);
    if !quiet {
        print_key_value("outcome", result.outcome);
        print_key_value("propagated literals", result.num_propagated);
        solver.print_statistics();
    }
    if result.is_consistent() {
        10
    } else {
        20
    }
}

/// Options from the file given with `--options`, raised by `-v`.
fn read_options(matches: &ArgMatches) -> Options {
    let mut options = match matches.value_of("OPTIONS_FILE") {
        None => Options::default(),
        Some(filename) => {
            let mut toml_str = String::new();
            open_file(filename)
                .read_to_string(&mut toml_str)
                .unwrap_or_else(|err| die!("Failed to read options file: {}", err));
            Options::from_toml(&toml_str)
                .unwrap_or_else(|err| die!("Failed to parse options file: {}", err))
        }
    };
    let verbose = matches.occurrences_of("v") as u32;
    if verbose > options.verbose {
        options.verbose = verbose.min(3);
    }
    options
}

fn parse_literal(text: &str) -> i32 {
    match text.parse::<i32>() {
        Ok(literal) if literal != 0 && literal != i32::min_value() => literal,
        _ => die!("invalid literal: {}", text),
    }
}

/// Write a line of DIMACS literals after a prefix.
fn print_literals(prefix: &str, literals: &[i32]) {
    let mut line = Vec::new();
    write_clause(&mut line, literals).unwrap_or_else(|err| die!("{}", err));
    write_to_stdout!("{} {}\n", prefix, String::from_utf8_lossy(&line));
}
