use migration::Migrator;
use std::{io, path::Path};
use util::config;

mod runner;

enum Command {
    Up,
    Fresh,
    Clean,
    Status,
}

impl Command {
    fn parse(arg: Option<&str>) -> Option<Self> {
        match arg {
            None | Some("up") => Some(Command::Up),
            Some("fresh") => Some(Command::Fresh),
            Some("clean") => Some(Command::Clean),
            Some("status") => Some(Command::Status),
            Some(_) => None,
        }
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let arg = std::env::args().nth(1);
    let Some(command) = Command::parse(arg.as_deref()) else {
        eprintln!("usage: migration [up|fresh|clean|status]");
        std::process::exit(2);
    };

    let db_file = config::database_path();
    let url = format!("sqlite://{}?mode=rwc", db_file);
    let db_file = Path::new(&db_file);

    match command {
        Command::Clean => drop_database(db_file)?,
        Command::Fresh => {
            drop_database(db_file)?;
            ensure_parent(db_file)?;
            runner::run_pending::<Migrator>(&url).await;
        }
        Command::Up => {
            ensure_parent(db_file)?;
            runner::run_pending::<Migrator>(&url).await;
        }
        Command::Status => runner::print_status::<Migrator>(&url).await,
    }
    Ok(())
}

fn drop_database(file: &Path) -> io::Result<()> {
    if !file.exists() {
        println!("Nothing to delete at {}", file.display());
        return Ok(());
    }
    std::fs::remove_file(file)?;
    println!("Deleted {}", file.display());
    Ok(())
}

fn ensure_parent(file: &Path) -> io::Result<()> {
    match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
        _ => Ok(()),
    }
}
