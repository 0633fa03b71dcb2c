use anyhow::{anyhow, bail, Context, Result};
use color_service_store::{Palette, Rgb};
use rocket::http::uri::Origin;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::str::FromStr;
use toml::Value;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlsFiles {
    pub certs: PathBuf,
    pub key: PathBuf,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub address: IpAddr,
    pub http_port: u16,
    pub https_port: u16,
    pub base: String,
    pub default_color: Option<String>,
    pub tls: Option<TlsFiles>,
    pub palette: Palette,
    pub users: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            http_port: 8080,
            https_port: 8443,
            base: "/".to_string(),
            default_color: None,
            tls: None,
            palette: Palette::default(),
            users: BTreeMap::new(),
        }
    }
}

pub fn read_settings(config_path: &str) -> Result<Settings> {
    let mut settings = match fs::read_to_string(config_path) {
        Ok(text) => parse_settings(&text).with_context(|| {
            format!("couldn't read {}, make sure it follows the toml format", config_path)
        })?,
        Err(_) => {
            log::info!("File {} not found, using default settings", config_path);
            Settings::default()
        }
    };
    apply_env(&mut settings, |key| env::var(key).ok())?;
    Ok(settings)
}

pub fn parse_settings(text: &str) -> Result<Settings> {
    let table = Value::from_str(text)?;
    let mut settings = Settings::default();
    if let Some(address) = read_str(&table, "address")? {
        settings.address = address
            .parse()
            .with_context(|| format!("invalid address {}", address))?;
    }
    if let Some(port) = read_port(&table, "http_port")? {
        settings.http_port = port;
    }
    if let Some(port) = read_port(&table, "https_port")? {
        settings.https_port = port;
    }
    if let Some(base) = read_str(&table, "base")? {
        settings.base = check_base(base)?;
    }
    settings.default_color = read_str(&table, "default_color")?.map(str::to_string);
    settings.tls = read_tls(&table)?;
    read_colors(&table, &mut settings.palette)?;
    settings.users = read_users(&table)?;
    Ok(settings)
}

/// Environment variables win over the file.
pub fn apply_env<F>(settings: &mut Settings, var: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = var("COLOR_HTTP_PORT").and_then(|p| env_port("COLOR_HTTP_PORT", &p)) {
        settings.http_port = port;
    }
    if let Some(port) = var("COLOR_HTTPS_PORT").and_then(|p| env_port("COLOR_HTTPS_PORT", &p)) {
        settings.https_port = port;
    }
    if let Some(name) = var("COLOR_DEFAULT") {
        settings.default_color = Some(name);
    }
    match (var("COLOR_TLS_CERTS"), var("COLOR_TLS_KEY")) {
        (Some(certs), Some(key)) => {
            settings.tls = Some(TlsFiles {
                certs: certs.into(),
                key: key.into(),
            })
        }
        (None, None) => (),
        _ => bail!("COLOR_TLS_CERTS and COLOR_TLS_KEY must be set together"),
    }
    Ok(())
}

fn env_port(key: &str, value: &str) -> Option<u16> {
    match value.parse::<u16>() {
        Ok(port) if port > 1023 => Some(port),
        _ => {
            log::warn!("ignoring {}={}, expected a port greater than 1023", key, value);
            None
        }
    }
}

pub fn setup_logging(who: &str, level_arg: &str) -> Result<()> {
    use fern::colors::{Color, ColoredLevelConfig};
    let colors = ColoredLevelConfig::new()
        .info(Color::Green)
        .error(Color::Red)
        .warn(Color::Yellow);
    let level = env::var("RUST_LOG").unwrap_or(level_arg.to_string());
    let level = log::LevelFilter::from_str(&level).map_err(|_| anyhow!("bad log level {}", level))?;
    let who = who.to_string();
    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {}/{} {}] {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                who,
                record.target(),
                colors.color(record.level()),
                message
            ))
        })
        .level(level)
        .level_for("rocket", log::LevelFilter::Warn)
        .level_for("hyper", log::LevelFilter::Warn)
        .level_for("_", log::LevelFilter::Warn)
        .chain(std::io::stdout())
        .apply()
        .map_err(|e| anyhow!("log config: {}", e))
}

fn read_str<'a>(table: &'a Value, key: &str) -> Result<Option<&'a str>> {
    match table.get(key) {
        None => Ok(None),
        Some(v) => match v.as_str() {
            Some(s) => Ok(Some(s)),
            None => bail!("{} must be a string", key),
        },
    }
}

fn read_port(table: &Value, key: &str) -> Result<Option<u16>> {
    let temp = match table.get(key) {
        None => {
            log::info!("{} not specified, using the default", key);
            return Ok(None);
        }
        Some(v) => v
            .as_integer()
            .ok_or_else(|| anyhow!("The {} is not an integer greater than 1023", key))?,
    };
    if temp <= 1023 {
        bail!("The {} is not an integer greater than 1023", key)
    }
    let port = u16::try_from(temp).map_err(|_| anyhow!("The {} is way too big!", key))?;
    log::info!("Read {} setting: {}", key, port);
    Ok(Some(port))
}

fn check_base(base: &str) -> Result<String> {
    if !base.starts_with('/') || Origin::parse(base).is_err() {
        bail!("base must be an absolute path, got {}", base)
    }
    Ok(base.to_string())
}

fn read_tls(table: &Value) -> Result<Option<TlsFiles>> {
    let tls = match table.get("tls") {
        None => return Ok(None),
        Some(tls) => tls,
    };
    match (read_str(tls, "certs")?, read_str(tls, "key")?) {
        (Some(certs), Some(key)) => Ok(Some(TlsFiles {
            certs: certs.into(),
            key: key.into(),
        })),
        _ => bail!("[tls] needs both certs and key"),
    }
}

fn read_colors(table: &Value, palette: &mut Palette) -> Result<()> {
    let colors = match table.get("colors") {
        None => return Ok(()),
        Some(c) => c
            .as_table()
            .ok_or_else(|| anyhow!("[colors] must be a table"))?,
    };
    for (name, value) in colors {
        let channels = value
            .as_array()
            .filter(|a| a.len() == 3)
            .ok_or_else(|| anyhow!("color {} must be an [r, g, b] array", name))?;
        let mut rgb = [0u8; 3];
        for (slot, channel) in rgb.iter_mut().zip(channels) {
            *slot = channel
                .as_integer()
                .and_then(|c| u8::try_from(c).ok())
                .ok_or_else(|| anyhow!("color {} channels must be integers in 0..=255", name))?;
        }
        palette.insert(name, Rgb::new(rgb[0], rgb[1], rgb[2]))?;
        log::info!("Read color {} {:?}", name, rgb);
    }
    Ok(())
}

fn read_users(table: &Value) -> Result<BTreeMap<String, String>> {
    let mut users = BTreeMap::new();
    if let Some(t) = table.get("users") {
        let t = t.as_table().ok_or_else(|| anyhow!("[users] must be a table"))?;
        for (name, pass) in t {
            let pass = pass
                .as_str()
                .ok_or_else(|| anyhow!("password for {} must be a string", name))?;
            users.insert(name.clone(), pass.to_string());
        }
    }
    Ok(users)
}
