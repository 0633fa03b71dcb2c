use clap::{Arg, Command};
use color_service_tester::{scenario, TrustAllConfig, TrustAllTransactor};
use dotenv::dotenv;
use std::env;

const URL: &str = "http://localhost:8080";
const USERNAME: &str = "snoopy";
const PASSWORD: &str = "pass";

fn setting(matches: &clap::ArgMatches, arg: &str, var: &str, default: &str) -> String {
    matches
        .value_of(arg)
        .map(str::to_string)
        .or_else(|| env::var(var).ok())
        .unwrap_or(default.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    pretty_env_logger::formatted_builder()
        .parse_filters(&env::var("RUST_LOG").unwrap_or("info".to_string()))
        .init();

    let matches = Command::new("color-tester")
        .about("Runs the post-and-get scenario against a color service")
        .arg(Arg::new("url").long("url").takes_value(true).help("service root (COLOR_URL)"))
        .arg(Arg::new("user").long("user").takes_value(true).help("username (COLOR_USER)"))
        .arg(Arg::new("pass").long("pass").takes_value(true).help("password (COLOR_PASS)"))
        .arg(Arg::new("color").long("color").takes_value(true).help("color to set"))
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("verify the server certificate and hostname"),
        )
        .get_matches();

    let url = setting(&matches, "url", "COLOR_URL", URL);
    let user = setting(&matches, "user", "COLOR_USER", USERNAME);
    let pass = setting(&matches, "pass", "COLOR_PASS", PASSWORD);
    let color = matches.value_of("color").unwrap_or("green");

    let config = if matches.is_present("strict") {
        TrustAllConfig::strict()
    } else {
        TrustAllConfig::default()
    };
    let transactor = TrustAllTransactor::new(&url, config.with_credentials(&user, &pass))?;

    let got = scenario::post_and_get(&transactor, color).await?;
    log::info!("SUCCESS! {} = ({}, {}, {})", got.name, got.r, got.g, got.b);
    Ok(())
}
