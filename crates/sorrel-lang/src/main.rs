use std::env;
use std::fs;

mod repl;

use signal_hook::consts::signal::SIGINT;
use signal_hook::flag;
use sorrel_core::env::Env;
use sorrel_core::error::{format_error, ERROR_TAG};
use sorrel_core::{eval_source, interrupt, load_source};

fn help() -> ! {
    println!("Usage: sorrel [--version] [-e CODE] [file ...]");
    println!();
    println!("Options:");
    println!("  -e, --eval CODE   Evaluate CODE and print the result");
    println!("  --version         Show version");
    println!("  -h, --help        Show this help");
    println!();
    println!("Files are loaded as one program; with no arguments the REPL starts.");
    std::process::exit(0);
}

fn unknown_option(opt: &str) -> ! {
    eprintln!("unknown option: {}", opt);
    help();
}

fn main() {
    let mut args = env::args().skip(1).collect::<Vec<_>>();
    let mut source = None;

    loop {
        if matches!(args.first().map(|s| s.as_str()), Some("-e") | Some("--eval"))
            && args.len() >= 2
            && source.is_none()
        {
            source = Some(args[1].clone());
            args.drain(0..2);
            continue;
        }
        match args.first().map(|s| s.as_str()) {
            Some("--version") => {
                println!("{}", env!("CARGO_PKG_VERSION"));
                return;
            }
            Some("-h") | Some("--help") => help(),
            Some(s) if s.starts_with('-') => unknown_option(s),
            _ => break,
        }
    }

    // Ctrl-C raises the interrupt flag; the evaluator notices it on the
    // next step and unwinds with an error.
    if let Err(err) = flag::register(SIGINT, interrupt::flag()) {
        eprintln!("{} failed to register signal handler: {}", ERROR_TAG, err);
    }

    if let Some(src) = source {
        let env = Env::session(false);
        match eval_source(&src, &env) {
            Ok(value) => println!("{}", value),
            Err(err) => {
                eprintln!("{}", format_error(&err));
                std::process::exit(1);
            }
        }
        return;
    }

    if args.is_empty() {
        repl::run();
        return;
    }

    let mut sources = Vec::new();
    for file in &args {
        match fs::read_to_string(file) {
            Ok(code) => sources.push(code),
            Err(err) => {
                eprintln!("{} error reading file {}: {}", ERROR_TAG, file, err);
                std::process::exit(1);
            }
        }
    }
    let env = Env::session(false);
    if let Err(err) = load_source(&sources.join("\n"), &env) {
        eprintln!("{}", format_error(&err));
        std::process::exit(1);
    }
}
