//! Reads a password from stdin and prints its bcrypt hash.
//!
//! Users are created out-of-band; use this to produce the value of the
//! `users.password` column.

use std::io::{self, BufRead};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut line = String::new();
    if let Err(e) = io::stdin().lock().read_line(&mut line) {
        eprintln!("Failed to read password: {}", e);
        return ExitCode::FAILURE;
    }
    let password = line.trim_end_matches(['\r', '\n']);
    if password.chars().count() < 6 {
        eprintln!("Password must be at least 6 characters long");
        return ExitCode::FAILURE;
    }

    match dashgate::auth::hash_password(password) {
        Ok(hash) => {
            println!("{}", hash);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
