use crate::{Error, Result};
use std::env;
use std::fs::create_dir_all;
use std::path::PathBuf;
use std::str::FromStr;

const DB_FILE_NAME: &str = "liquefaction.db";

#[derive(Debug, Clone, PartialEq)]
pub struct Conf {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub pool_size: Option<usize>,
}

impl Conf {
    pub fn from_env() -> Result<Conf> {
        Conf::from_vars(|name| env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Conf> {
        let db_path = match var("LIQUEFACTION_DB") {
            Some(path) => PathBuf::from(path),
            None => data_dir_file_path(DB_FILE_NAME)?,
        };
        Ok(Conf {
            db_path,
            host: var("LIQUEFACTION_HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port: parse_var("LIQUEFACTION_PORT", &var)?.unwrap_or(8000),
            pool_size: parse_var("LIQUEFACTION_POOL_SIZE", &var)?,
        })
    }
}

fn parse_var<T: FromStr>(name: &str, var: impl Fn(&str) -> Option<String>) -> Result<Option<T>> {
    match var(name) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| Error::Conf(format!("Invalid value of {name}: {value}"))),
        None => Ok(None),
    }
}

fn data_dir_file_path(file_name: &str) -> Result<PathBuf> {
    let data_dir = env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or(Error::Conf("Home directory does not exist".into()))?
        .join(".local/share/liquefaction-api");
    if !data_dir.exists() {
        create_dir_all(&data_dir)?;
    }
    Ok(data_dir.join(file_name))
}
