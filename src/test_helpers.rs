//! Shared test utilities for the moviedeck test suite.
//!
//! Provides a canonical template bundle writer and a small sample
//! collection, so template, cache, builder, and render tests all exercise
//! the same fixture shapes.

use std::fs;
use std::path::Path;

use crate::model::{Actor, Movie, MovieCollection};

/// List-page template text: page-level placeholders plus an item model
/// whose record placeholders must survive the server pass.
const LIST_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Movies</title><link rel="stylesheet" href="css/style.css"></head>
<body style="background-image: url('{{background}}')">
<header>page {{movies.index}} of {{movies.total}}</header>
<nav>
  <a href="{{movies.home}}">home</a>
  <a href="{{movies.previous}}">previous</a>
  <a href="{{movies.next}}">next</a>
</nav>
<section class="movie-list">
  <article id="ItemModel" class="hidden movie-list-item">
    <h2>{{title}}</h2>
    <span class="if-year">{{year}}</span>
  </article>
</section>
<script src="data.js"></script>
<script>const props = {{props}};</script>
<script src="js/template.js"></script>
</body>
</html>
"#;

/// Detail-page template text: record placeholders, conditional classes,
/// and one placeholder no binding ever covers.
const DETAIL_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><title>{{title}}</title><link rel="stylesheet" href="css/style.css"></head>
<body style="background-image: url('{{background}}')" data-idle="{{backgroundIdle}}">
<h1>{{title}}</h1>
<p class="if-summary">{{summary}}</p>
<p class="if-director">by {{director}}</p>
<p class="if-interests">{{interests}}</p>
<p class="if_no-rating--unrated">{{rating}}</p>
<p>{{notAThing}}</p>
<a href="{{movies.home}}">back</a>
<script>const data = {{data}}; const props = {{props}};</script>
<script src="js/template.js"></script>
</body>
</html>
"#;

const DESCRIPTOR: &str = r#"name = "Dark"
resources = ["/css", "/js", "favicon.svg"]

[list]
filename = "index"
background = "img/back.jpg"

[detail]
background = "img/detail.jpg"
background_idle = "img/idle.jpg"
"#;

/// Write a complete template bundle named `id` under `templates_dir`.
pub fn write_template_bundle(templates_dir: &Path, id: &str) {
    let dir = templates_dir.join(id);
    fs::create_dir_all(dir.join("css")).unwrap();
    fs::create_dir_all(dir.join("js")).unwrap();
    fs::write(dir.join("template.toml"), DESCRIPTOR).unwrap();
    fs::write(dir.join("list.html"), LIST_TEMPLATE).unwrap();
    fs::write(dir.join("detail.html"), DETAIL_TEMPLATE).unwrap();
    fs::write(dir.join("css/style.css"), "body { margin: 0; }\n").unwrap();
    fs::write(dir.join("js/template.js"), "// client render engine\n").unwrap();
    fs::write(dir.join("favicon.svg"), "<svg></svg>\n").unwrap();
}

/// Two fully set-up records: "Heat" (full picture, rich fields) and
/// "Alien" (no full picture). Construction order, not sort order.
pub fn sample_collection() -> MovieCollection {
    let heat = Movie {
        url: "https://example.org/title/heat".to_string(),
        id: Some("tt0113277".to_string()),
        title: Some("Heat".to_string()),
        summary: Some("A thief and a detective circle each other.".to_string()),
        interests: vec!["Crime".to_string(), "Thriller".to_string()],
        rating: Some("8.3".to_string()),
        year: Some("1995".to_string()),
        director: Some("Michael Mann".to_string()),
        stars: vec!["Al Pacino".to_string(), "Robert De Niro".to_string()],
        actors: vec![
            Actor {
                name: "Al Pacino".to_string(),
                pic_url: Some("pacino.jpg".to_string()),
                characters: vec!["Vincent Hanna".to_string()],
            },
            Actor {
                name: "Robert De Niro".to_string(),
                pic_url: Some("deniro.jpg".to_string()),
                characters: vec!["Neil McCauley".to_string()],
            },
        ],
        pic_full_url: Some("heat-full.jpg".to_string()),
        ..Movie::default()
    };
    let alien = Movie {
        url: "https://example.org/title/alien".to_string(),
        id: Some("tt0078748".to_string()),
        title: Some("Alien".to_string()),
        year: Some("1979".to_string()),
        director: Some("Ridley Scott".to_string()),
        interests: vec!["Horror".to_string(), "Sci-Fi".to_string()],
        ..Movie::default()
    };

    let mut collection = MovieCollection::new(vec![heat, alien]);
    collection.setup(".html");
    collection
}
