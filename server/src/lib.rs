pub mod auth;
pub mod negotiate;
pub mod resource;
pub mod routes;
pub mod util;

use crate::resource::ColorResource;
use crate::routes::Listener;
use crate::util::Settings;
use anyhow::{anyhow, Context};
use rocket::tokio;
use std::sync::Arc;

pub use crate::routes::build_rocket;

/// Launch the plain listener, plus the TLS listener when certificates are
/// configured. Both serve the same store.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let resource = ColorResource::from_settings(&settings)
        .context("default_color must be one of the recognized colors")?;
    let resource = Arc::new(resource);

    let plain = build_rocket(&settings, resource.clone(), &Listener::Plain);
    log::info!(
        "=> http listener on {}:{}{}",
        settings.address,
        settings.http_port,
        settings.base
    );
    match settings.tls.clone() {
        Some(files) => {
            let tls = build_rocket(&settings, resource, &Listener::Tls(files));
            log::info!(
                "=> https listener on {}:{}{}",
                settings.address,
                settings.https_port,
                settings.base
            );
            tokio::try_join!(
                async { plain.launch().await.map_err(launch_error) },
                async { tls.launch().await.map_err(launch_error) }
            )?;
        }
        None => {
            log::info!("=> no tls certificates configured, https disabled");
            plain.launch().await.map_err(launch_error)?;
        }
    }
    Ok(())
}

fn launch_error(e: rocket::Error) -> anyhow::Error {
    anyhow!("listener failed: {}", e)
}
