use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::str::FromStr;

use clap::Parser;
use email_address::EmailAddress;
use rusqlite::Connection;

use cappih::{
    PasswordHash, ValidatedPassword, create_user, initialize_db, insert_sample_transactions,
};

const TEST_EMAIL: &str = "test@example.com";
const TEST_PASSWORD: &str = "test";

/// A utility for creating a test database for the Cappih web server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user {TEST_EMAIL} with the password '{TEST_PASSWORD}'...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(TEST_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(EmailAddress::from_str(TEST_EMAIL)?, password_hash, &conn)?;

    println!("Adding sample categories and transactions...");

    let transactions = insert_sample_transactions(user.id, &conn)?;

    println!("Success! Added {} transactions.", transactions.len());

    Ok(())
}
