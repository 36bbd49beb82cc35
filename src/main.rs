pub use error::Error;
mod conf;
mod db;
mod error;
mod liquefaction_zone;
mod log;
mod rest;
mod server;
use conf::Conf;
use std::env;
use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, PartialEq)]
enum Command {
    Server,
    Migrate,
    ImportZones(PathBuf),
}

impl Command {
    fn parse(args: &[String]) -> Result<Command> {
        let first_arg = match args.first() {
            Some(some) => some,
            None => Err(Error::CLI("No actions passed".into()))?,
        };
        match first_arg.as_str() {
            "server" => Ok(Command::Server),
            "db" => match args.get(1).map(String::as_str) {
                Some("migrate") => Ok(Command::Migrate),
                Some(other) => Err(Error::CLI(format!("Unknown db action: {other}"))),
                None => Err(Error::CLI("No db actions passed".into())),
            },
            "import-zones" => match args.get(1) {
                Some(path) => Ok(Command::ImportZones(PathBuf::from(path))),
                None => Err(Error::CLI("import-zones requires a GeoJSON file path".into())),
            },
            other => Err(Error::CLI(format!("Unknown command: {other}"))),
        }
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    log::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = Command::parse(&args)?;
    let conf = Conf::from_env()?;

    let mut db = db::open_connection(&conf.db_path)?;
    db::migration::run(&mut db)?;

    match command {
        Command::Server => {
            drop(db);
            server::run(&conf).await?
        }
        Command::Migrate => {}
        Command::ImportZones(path) => {
            liquefaction_zone::import::run(&path, &mut db)?;
        }
    }

    Ok(())
}
