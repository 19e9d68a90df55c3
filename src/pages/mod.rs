//! Static site: the two HTML views plus whatever lives under the static root.

use std::path::PathBuf;
use warp::Filter;

pub fn routes(
    static_dir: impl Into<PathBuf>,
    views_dir: impl Into<PathBuf>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let views_dir: PathBuf = views_dir.into();
    let index = views_dir.join("index.html");
    let inicio = views_dir.join("inicio.html");

    let root = warp::get()
        .and(warp::path::end())
        .and(warp::fs::file(index.clone()));

    let index = warp::get()
        .and(warp::path!("index.html"))
        .and(warp::fs::file(index));

    let inicio = warp::get()
        .and(warp::path!("inicio.html"))
        .and(warp::fs::file(inicio));

    let assets = warp::get().and(warp::fs::dir(static_dir.into()));

    root.or(index).or(inicio).or(assets)
}
