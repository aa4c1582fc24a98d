//! Count the cubes over a list of variables that survive unit propagation

use clap::{Arg, ArgMatches};
use incsat::{Options, Solver};
use incsat_common::{
    clause::write_clause,
    die,
    output::{install_signal_handler, print_key_value, Timer},
    parser::{open_file, open_file_for_writing},
};
use std::io::{self, Read, Write};

fn main() {
    std::process::exit(run_frontend());
}

fn run_frontend() -> i32 {
    install_signal_handler();
    let app = clap::App::new("propcheck-tree")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Enumerate the sign assignments to some variables that unit propagation does not refute")
        .after_help(
            "Input files may be compressed - supported file extensions are: zst, gz, bz2, xz and lz4.
Use \"-\" to read the formula from standard input.",
        )
        .arg(Arg::with_name("INPUT").required(true).help("input file in DIMACS format"))
        .arg(
            Arg::with_name("VARIABLES")
                .required(true)
                .multiple(true)
                .help("variables to branch on, outermost first"),
        )
        .arg(
            Arg::with_name("LIMIT")
                .takes_value(true)
                .short("n")
                .long("limit")
                .help("Stop after this many cubes (0 means no limit)."),
        )
        .arg(
            Arg::with_name("CUBES_FILE")
                .takes_value(true)
                .short("o")
                .long("output")
                .help("Write every cube to this file."),
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
    let variables: Vec<i32> = matches
        .values_of("VARIABLES")
        .unwrap()
        .map(parse_variable)
        .collect();
    let limit = matches.value_of("LIMIT").map_or(0, |text| {
        text.parse::<u64>()
            .unwrap_or_else(|_| die!("invalid limit: {}", text))
    });
    let mut cubes_file = matches.value_of("CUBES_FILE").map(open_file_for_writing);

    let mut timer = Timer::name("total time");
    timer.disabled = quiet;
    let mut solver = Solver::with_options(options);
    solver
        .read_dimacs(formula_filename)
        .unwrap_or_else(|err| die!("{}: {}", formula_filename, err));
    let tree = solver.propcheck_all_tree_with(&variables, limit, |cube| {
        if let Some(file) = cubes_file.as_mut() {
            write_cube(file, cube).unwrap_or_else(|err| die!("Failed to write cube: {}", err));
        }
    });
    if let Some(file) = cubes_file.as_mut() {
        file.flush()
            .unwrap_or_else(|err| die!("Failed to write cube: {}", err));
    }
    print_key_value("cubes", tree.total);
    drop(timer);
    if !quiet {
        print_key_value("propagations checked", tree.checked);
        solver.print_statistics();
    }
    0
}

/// Write a cube as an `a` line, as in iCNF files.
fn write_cube(file: &mut impl Write, cube: &[i32]) -> io::Result<()> {
    write!(file, "a ")?;
    write_clause(file, cube)?;
    writeln!(file)
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

fn parse_variable(text: &str) -> i32 {
    match text.parse::<i32>() {
        Ok(variable) if variable > 0 => variable,
        _ => die!("invalid variable: {}", text),
    }
}
