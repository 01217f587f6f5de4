use crate::heatmap::projector::HeatPoint;
use crate::http::error::error_response;
use crate::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HeatmapResponse {
    pub version: u64,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub points: Vec<HeatPoint>,
}

#[derive(Debug, Serialize)]
struct ExportRow {
    lat: f64,
    lon: f64,
    intensity: f64,
    events: u64,
}

pub async fn get_heatmap(State(state): State<AppState>) -> impl IntoResponse {
    let frame = state.heatmap_feed.current();
    Json(HeatmapResponse {
        version: frame.version,
        generated_at: frame.generated_at,
        points: frame.points.clone(),
    })
}

pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.aggregator.stats().await;
    Json(serde_json::json!({
        "accepted": stats.accepted,
        "rejected": stats.rejected,
        "cells": stats.cells,
        "version": state.heatmap_feed.current().version,
    }))
}

pub async fn export_csv(State(state): State<AppState>) -> impl IntoResponse {
    let cells = state.aggregator.snapshot().await;
    match render_csv(&cells) {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"heatmap.csv\""),
            ],
            body,
        )
            .into_response(),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "EXPORT_FAILED",
            "failed to render heatmap export",
            Some(e.to_string()),
        ),
    }
}

pub fn render_csv(cells: &[crate::heatmap::density::CellIntensity]) -> anyhow::Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(["lat", "lon", "intensity", "events"])?;
    for cell in cells {
        writer.serialize(ExportRow {
            lat: cell.lat,
            lon: cell.lon,
            intensity: cell.intensity,
            events: cell.events,
        })?;
    }
    writer.flush()?;
    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
