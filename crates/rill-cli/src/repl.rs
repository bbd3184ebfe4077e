//! Interactive front end: batches input lines by brace counting so
//! block constructs can span lines, then scans, parses, and evaluates
//! each batch against one persistent root environment.
//!
//! Lexical errors are reported and the loop continues; parse and
//! evaluation errors propagate to the caller, which exits.

use crate::eval::{self, Env};
use anyhow::Result;
use rill_parse::{parse_with_functions, scan};
use std::io::{self, BufRead, Write};
use std::rc::Rc;

pub fn run() -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let env = Env::root();

    loop {
        print!(">>> ");
        io::stdout().flush()?;

        let Some(batch) = read_batch(&mut lines)? else {
            return Ok(());
        };

        let tokens = match scan(&batch) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("ERROR: {e}");
                continue;
            }
        };

        // functions declared in earlier batches stay callable
        let seed = Env::function_signatures(&env);
        let block = parse_with_functions(tokens, &seed)?;
        let value = eval::evaluate(&block, Some(Rc::clone(&env)))?;
        println!("{value}");
    }
}

/// Read one input batch: a line, plus as many further lines as it takes
/// to balance its braces. `None` at end of input.
fn read_batch(lines: &mut impl Iterator<Item = io::Result<String>>) -> Result<Option<String>> {
    let Some(first) = lines.next() else {
        return Ok(None);
    };
    let mut batch = first?;
    let mut depth = brace_delta(&batch);
    while depth > 0 {
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        depth += brace_delta(&line);
        batch.push('\n');
        batch.push_str(&line);
    }
    Ok(Some(batch))
}

fn brace_delta(line: &str) -> i32 {
    line.chars()
        .map(|c| match c {
            '{' => 1,
            '}' => -1,
            _ => 0,
        })
        .sum()
}
