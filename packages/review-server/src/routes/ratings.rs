use axum::response::Response;
use serde::Serialize;

use danci_srs::{Rating, RatingColor};

use crate::response::ok;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RatingInfo {
    value: u8,
    key: char,
    label: &'static str,
    color: RatingColor,
    quality: u8,
}

pub async fn list() -> Response {
    let ratings: Vec<RatingInfo> = Rating::ALL
        .iter()
        .map(|rating| RatingInfo {
            value: rating.value(),
            key: rating.key(),
            label: rating.label(),
            color: rating.color(),
            quality: rating.quality(),
        })
        .collect();
    ok(ratings)
}
