use std::path::PathBuf;

use rustyline::{error::ReadlineError, DefaultEditor};

use sorrel_core::env::Env;
use sorrel_core::error::{format_error, ERROR_TAG};
use sorrel_core::{eval_source, interrupt};

pub fn run() {
    let env = Env::session(true);
    let mut rl = DefaultEditor::new().expect("create line editor");
    let hist_path = history_path();
    if let Some(ref path) = hist_path {
        let _ = rl.load_history(path);
    }
    println!("sorrel {}. Ctrl-D to quit.", env!("CARGO_PKG_VERSION"));

    // Lines accumulate here until the delimiters balance, so forms may
    // span as many lines as they like.
    let mut pending = String::new();
    loop {
        let prompt = if pending.is_empty() { "> " } else { "  " };
        match rl.readline(prompt) {
            Ok(line) => {
                if pending.is_empty() {
                    pending = line;
                } else {
                    pending.push('\n');
                    pending.push_str(&line);
                }
                if !ready(&pending) {
                    continue;
                }
                let entry = std::mem::take(&mut pending);
                let _ = rl.add_history_entry(entry.as_str());
                if let Some(ref path) = hist_path {
                    let _ = rl.append_history(path);
                }
                interrupt::clear();
                match eval_source(&entry, &env) {
                    Ok(value) => println!("{}", value),
                    Err(err) => {
                        if interrupt::is_interrupted() {
                            println!("; evaluation interrupted");
                            interrupt::clear();
                        } else {
                            println!("{}", format_error(&err));
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                pending.clear();
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{} repl: {}", ERROR_TAG, err);
                break;
            }
        }
    }
}

/// An entry is ready once it contains something other than blanks and
/// every delimiter opened in it has been closed. Surplus closers count
/// as ready too; the reader reports those.
fn ready(entry: &str) -> bool {
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut skip_next = false;
    let mut in_comment = false;
    let mut blank = true;
    for ch in entry.chars() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if in_comment {
            if ch == '\n' {
                in_comment = false;
            }
            continue;
        }
        if in_string {
            match ch {
                '\\' => skip_next = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            ';' => in_comment = true,
            '"' => {
                in_string = true;
                blank = false;
            }
            '(' | '[' | '{' => {
                depth += 1;
                blank = false;
            }
            ')' | ']' | '}' => {
                depth -= 1;
                blank = false;
            }
            c if c.is_whitespace() || c == ',' => {}
            _ => blank = false,
        }
    }
    !blank && !in_string && depth <= 0
}

fn history_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| {
        let mut p = PathBuf::from(home);
        p.push(".sorrel_history");
        p
    })
}
