use std::io;
use std::{env, process};

use rocks_lang::Rocks;

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut stdout = io::stdout();
    let mut rocks = Rocks::new(&mut stdout);

    let code = match args.len() {
        1 => rocks.run_prompt(),
        2 => rocks.run_file(&args[1]),
        _ => {
            println!("Usage: rocks [script]");
            rocks_lang::EXIT_USAGE
        }
    };

    process::exit(code);
}
