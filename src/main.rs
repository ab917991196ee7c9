//! Design Token Resolver Binary

use std::process;
use tokenc::TokenCli;

fn main() {
    match TokenCli::new().run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    }
}
