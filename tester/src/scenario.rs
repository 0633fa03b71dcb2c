use crate::{MediaType, Method, TrustAllTransactor};
use anyhow::{ensure, Result};
use color_service_store::{Color, Palette};

/// Set `name`, then read it back through both reads.
pub async fn post_and_get(t: &TrustAllTransactor, name: &str) -> Result<Color> {
    let url = t.segments(&["color", name])?;
    let reply = t.send(Method::POST, url, None).await?;
    ensure!(
        reply.status == 204,
        "POST color/{} returned {}: {}",
        name,
        reply.status,
        reply.body
    );
    log::info!("=> POST color/{} {}", name, reply.status);

    let reply = t.get("color", Some(MediaType::Json)).await?;
    ensure!(reply.status == 200, "GET color returned {}", reply.status);
    let current: String = reply.json()?;
    ensure!(current == name, "GET color returned {} not {}", current, name);
    log::info!("=> GET color {}", reply.body);

    let reply = t.get("color/object", Some(MediaType::Json)).await?;
    ensure!(reply.status == 200, "GET color/object returned {}", reply.status);
    let color: Color = reply.json()?;
    ensure!(color.name == name, "GET color/object returned {}", color.name);
    // colors added in the server's config are only checked by name
    if let Some(expected) = Palette::default().lookup(name) {
        ensure!(color == expected, "expected {:?} got {:?}", expected, color);
    }
    log::info!("=> GET color/object {}", reply.body);
    Ok(color)
}
