use anyhow::{Result, bail};
use filmoteca_dal::{genre::Genre, movie::Movie};
use reqwest::Url;
use serde_json::json;
use tracing::info;

pub async fn create_genre(client: &reqwest::Client, base_url: &Url, name: &str) -> Result<Genre> {
    let payload = json!({"nombre": name});
    let api_url = base_url.join("api/genres")?;

    let response = client.post(api_url).json(&payload).send().await?;
    if response.status().as_u16() != 201 {
        bail!("Genre not created: {}", response.status());
    }

    let new_genre: Genre = response.json().await?;
    Ok(new_genre)
}

pub fn movie_payload(
    title: &str,
    director: &str,
    year: i32,
    rating: f64,
    genres: &[&Genre],
) -> serde_json::Value {
    json!({
        "titulo": title,
        "director": director,
        "ano_Lanzamiento": year,
        "calificacion": rating,
        "generoIds": genres.iter().map(|g| g.id).collect::<Vec<_>>(),
    })
}

pub async fn create_movie(
    client: &reqwest::Client,
    base_url: &Url,
    payload: &serde_json::Value,
) -> Result<Movie> {
    let api_url = base_url.join("api/movies")?;

    let response = client.post(api_url).json(payload).send().await?;
    info!("Movie Response: {:#?}", response);
    if response.status().as_u16() != 201 {
        bail!("Movie not created: {}", response.status());
    }

    let new_movie: Movie = response.json().await?;
    Ok(new_movie)
}
