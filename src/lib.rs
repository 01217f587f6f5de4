pub mod config;
pub mod domain {
    pub mod credential;
    pub mod event;
    pub mod geofence;
    pub mod scan;
}
pub mod error;
pub mod heatmap;
pub mod http {
    pub mod error;
    pub mod handlers {
        pub mod credentials;
        pub mod events;
        pub mod heatmap;
        pub mod ops;
    }
    pub mod routes;
}
pub mod service {
    pub mod credential_service;
    pub mod heatmap_feed;
    pub mod ingest;
    pub mod retention;
}
pub mod source;
pub mod telemetry;

#[derive(Clone)]
pub struct AppState {
    pub credential_service: service::credential_service::CredentialService,
    pub aggregator: heatmap::aggregator::SpatialAggregator,
    pub heatmap_feed: service::heatmap_feed::HeatmapFeed,
    pub publisher: Option<source::channel::EventPublisher>,
}
