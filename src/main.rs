use colored::Colorize;
use std::process;

fn main() {
    let argv: Vec<String> = std::env::args().collect();
    lunrclient::shell::init_tracing(&argv);

    match lunrclient::shell::lunr::main(argv) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            process::exit(1);
        }
    }
}
