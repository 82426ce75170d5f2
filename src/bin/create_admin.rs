use std::{
    error::Error,
    io::{self, BufRead, Write},
    path::Path,
    process::exit,
};

use clap::Parser;
use rusqlite::Connection;

use storefront_admin::{PasswordHash, ValidatedPassword, create_admin, initialize_db};

/// A utility for adding an admin account to the storefront_admin database.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);
    validate_db_path(db_path);

    let Some(username) = get_username()? else {
        return Ok(());
    };

    let Some(password_hash) = get_password_hash(&username) else {
        return Ok(());
    };

    let conn = Connection::open(db_path)?;
    initialize_db(&conn)?;

    match create_admin(&username, password_hash, &conn) {
        Ok(admin) => {
            println!("Created admin {} with ID {}.", admin.username, admin.id);
            Ok(())
        }
        Err(error) => {
            print_error(error);
            exit(1);
        }
    }
}

fn validate_db_path(db_path: &Path) {
    match db_path.extension() {
        None => {
            print_error("Database path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            print_error("Database path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }
}

fn get_username() -> Result<Option<String>, io::Error> {
    let stdin = io::stdin();

    loop {
        print!("Enter a username: ");
        io::stdout().flush()?;

        let mut username = String::new();
        if stdin.lock().read_line(&mut username)? == 0 {
            return Ok(None);
        }

        let username = username.trim();
        if username.is_empty() {
            print_error("Username cannot be empty, try again.");
            continue;
        }

        return Ok(Some(username.to_owned()));
    }
}

fn get_password_hash(username: &str) -> Option<PasswordHash> {
    loop {
        println!();

        let first_password = match rpassword::prompt_password("Enter a password: ") {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                return None;
            }
            Err(error) => {
                print_error(format!("Could not read password from stdin: {error}"));
                return None;
            }
        };

        let validated_password = match ValidatedPassword::new(&first_password, &[username]) {
            Ok(password) => password,
            Err(error) => {
                print_error(error);
                continue;
            }
        };

        let second_password = match rpassword::prompt_password("Enter the same password again: ") {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                return None;
            }
            Err(error) => {
                print_error(format!("Could not read password from stdin: {error}"));
                return None;
            }
        };

        if first_password != second_password {
            print_error("Passwords must match, try again.");
            continue;
        }

        match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
            Ok(password_hash) => return Some(password_hash),
            Err(error) => {
                print_error(format!("{error}. Try again."));
                continue;
            }
        }
    }
}

fn print_error(error: impl ToString) {
    eprintln!(
        "\x1b[31;1m{}\x1b[0m",
        capitalise_first_char(&error.to_string())
    )
}

fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}
