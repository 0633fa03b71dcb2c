use clap::{Arg, Command};
use color_service_server::util::{read_settings, setup_logging};

const DEFAULT_CONFIG_PATH: &str = "color.conf";

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    let matches = Command::new("color-service")
        .about("Stores and serves the current color over http and https")
        .arg(
            Arg::new("config")
                .help("path to the toml settings file")
                .long("config")
                .short('c')
                .takes_value(true),
        )
        .get_matches();

    setup_logging("color ", "info")?;

    let config_path = matches.value_of("config").unwrap_or(DEFAULT_CONFIG_PATH);
    let settings = read_settings(config_path)?;
    log::info!(
        "=> {} recognized colors, {} configured users",
        settings.palette.len(),
        settings.users.len()
    );

    color_service_server::serve(settings).await
}
