use filmoteca_dal::genre::Genre;
use filmoteca_e2e_tests::{
    extend_url, prepare_env,
    rest::{create_genre, create_movie, movie_payload},
    spawn_server,
};
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_genres() {
    let (args, _config_guard) = prepare_env("test_genres").await.unwrap();
    let base_url = args.base_url.clone();
    spawn_server(args).await.unwrap();
    let client = reqwest::Client::new();

    let drama = create_genre(&client, &base_url, "Drama").await.unwrap();
    let scifi = create_genre(&client, &base_url, "Ciencia ficción").await.unwrap();
    assert!(scifi.id > drama.id);

    let api_url = base_url.join("api/genres").unwrap();
    let response = client.get(api_url.clone()).send().await.unwrap();
    assert!(response.status().is_success());
    let list: serde_json::Value = response.json().await.unwrap();
    let genres: Vec<Genre> = serde_json::from_value(list["generos"].clone()).unwrap();
    assert_eq!(genres, vec![drama.clone(), scifi.clone()]);

    let response = client
        .post(api_url.clone())
        .json(&serde_json::json!({"nombre": ""}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let payload = movie_payload("Solaris", "Tarkovsky", 1972, 8.1, &[&drama, &scifi]);
    let movie = create_movie(&client, &base_url, &payload).await.unwrap();
    assert_eq!(movie.genres.len(), 2);

    // deleting genre removes it from movies
    let response = client
        .delete(extend_url(&api_url, drama.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let response = client
        .get(extend_url(&api_url, drama.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let movie_url = extend_url(&base_url.join("api/movies").unwrap(), movie.id);
    let response = client.get(movie_url).send().await.unwrap();
    assert!(response.status().is_success());
    let movie: filmoteca_dal::movie::Movie = response.json().await.unwrap();
    assert_eq!(movie.genres, vec![scifi]);
}
