use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use time::{Duration, OffsetDateTime};

use ledgerline::{
    Category, Email, NewUser, PasswordHash, Transaction, TransactionType, UserId, config,
    create_transaction, create_user, initialize_db, open_connection,
};

/// A utility for creating a test database for the REST API server of ledgerline.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The ID of the demo user, use the ID of a user at the identity provider
    /// to view the data from a signed in client.
    #[arg(long, default_value = "user_demo")]
    user_id: String,
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
    let conn = open_connection(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let user = create_user(
        NewUser {
            id: UserId::new(args.user_id),
            fullname: "Demo User".to_owned(),
            email: Email::new("demo@example.com")?,
            password_hash: PasswordHash::new("test", config::PASSWORD_HASH_COST)?,
        },
        &conn,
    )?;

    println!("Creating transactions for the last 30 days...");

    let categories = [
        ("salary", "Salary", "briefcase"),
        ("food", "Food", "utensils"),
        ("transport", "Transport", "bus"),
        ("rent", "Rent", "home"),
        ("fun", "Entertainment", "film"),
    ]
    .map(|(id, name, icon)| Category {
        id: id.to_owned(),
        name: name.to_owned(),
        icon: icon.to_owned(),
    });

    let now = OffsetDateTime::now_utc();
    let mut count = 0;

    for days_ago in 0..30 {
        let day = now - Duration::days(days_ago);

        if days_ago % 14 == 0 {
            create_transaction(
                Transaction::build(
                    user.id.clone(),
                    TransactionType::Income,
                    2500.0,
                    categories[0].clone(),
                )
                .description(Some("Pay day".to_owned()))
                .created_at(day - Duration::hours(1)),
                &conn,
            )?;
            count += 1;
        }

        if days_ago % 7 == 3 {
            create_transaction(
                Transaction::build(
                    user.id.clone(),
                    TransactionType::Expense,
                    450.0,
                    categories[3].clone(),
                )
                .description(Some("Weekly rent".to_owned()))
                .created_at(day - Duration::hours(2)),
                &conn,
            )?;
            count += 1;
        }

        // Spread the smaller expenses unevenly so some days have none.
        if days_ago % 3 != 2 {
            let category = match days_ago % 5 {
                4 => &categories[4],
                n if n % 2 == 0 => &categories[1],
                _ => &categories[2],
            };
            let amount = 5.0 + (days_ago as f64 * 7.3) % 60.0;

            create_transaction(
                Transaction::build(
                    user.id.clone(),
                    TransactionType::Expense,
                    (amount * 100.0).round() / 100.0,
                    category.clone(),
                )
                .created_at(day - Duration::minutes(30 + days_ago % 8 * 20)),
                &conn,
            )?;
            count += 1;
        }
    }

    println!("Created {count} transactions for user {}.", user.id);
    println!("Success!");

    Ok(())
}
