mod common;

use airtrack_core::{haversine_km, AirportApi, RadiusBounds, RadiusSearch};
use common::{init_logging, MockApi};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

async fn search_around(api: &Arc<MockApi>, icao: &str) -> Arc<RadiusSearch> {
    init_logging();
    let search = Arc::new(RadiusSearch::new(api.clone(), RadiusBounds::default()));
    let center = api.airport(icao).await.unwrap();
    search.set_center(Some(center));
    search
}

#[tokio::test(start_paused = true)]
async fn test_refresh_requires_center() {
    let api = Arc::new(MockApi::new());
    let search = RadiusSearch::new(api.clone(), RadiusBounds::default());

    assert!(!search.refresh().await);
    assert!(api.radius_calls.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_refresh_loads_airports_and_flights() {
    let api = Arc::new(MockApi::new());
    let search = search_around(&api, "UUEE").await;
    search.set_radius(100.0);

    assert!(search.refresh().await);
    search.with_selection(|s| {
        let mut codes: Vec<_> = s.airports().iter().map(|a| a.icao.as_str()).collect();
        codes.sort();
        assert_eq!(codes, vec!["UUDD", "UUEE", "UUWW"]);
        assert_eq!(s.flights().len(), 3);
    });

    let scene = search.scene();
    assert_eq!(scene.view.zoom, 8);
    assert_eq!(scene.radius_ring.len(), 37);
    assert_eq!(scene.markers.len(), 3);
    assert_eq!(scene.markers.iter().filter(|m| m.is_center).count(), 1);
    // Pulkovo and Heathrow are outside 100 km, so no arc can be drawn
    assert!(scene.arcs.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_wide_radius_draws_flight_arcs() {
    let api = Arc::new(MockApi::new());
    let search = search_around(&api, "UUEE").await;
    // clamped to the 2000 km maximum
    assert_eq!(search.set_radius(5000.0), 2000.0);

    assert!(search.refresh().await);
    assert_eq!(api.radius_calls.lock().unwrap().as_slice(), &[2000.0]);

    let scene = search.scene();
    assert_eq!(scene.view.zoom, 5);
    assert_eq!(scene.markers.len(), 4);
    let callsigns: Vec<_> = scene.arcs.iter().map(|a| a.callsign.as_str()).collect();
    assert_eq!(callsigns, vec!["AFL1", "AFL2"]);
    for arc in &scene.arcs {
        assert_eq!(arc.points.len(), 21);
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_stale_search_is_discarded() {
    let api = Arc::new(MockApi::new());
    api.slow_radius.store(true, Ordering::SeqCst);
    let search = search_around(&api, "UUEE").await;
    search.set_radius(2000.0);

    let slow = {
        let search = Arc::clone(&search);
        tokio::spawn(async move { search.refresh().await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    search.set_radius(100.0);
    assert!(search.refresh().await);
    assert!(!slow.await.unwrap());

    let center = search.with_selection(|s| s.center().and_then(|c| c.point()).unwrap());
    search.with_selection(|s| {
        assert_eq!(s.airports().len(), 3);
        for airport in s.airports() {
            assert!(haversine_km(center, airport.point().unwrap()) <= 100.0);
        }
    });
}

#[tokio::test(start_paused = true)]
async fn test_failed_search_clears_results() {
    let api = Arc::new(MockApi::new());
    let search = search_around(&api, "UUEE").await;
    assert!(search.refresh().await);
    assert!(!search.with_selection(|s| s.airports().is_empty()));

    api.fail.store(true, Ordering::SeqCst);
    search.set_radius(300.0);
    assert!(search.refresh().await);
    search.with_selection(|s| {
        assert!(s.airports().is_empty());
        assert!(s.flights().is_empty());
    });

    // the ring still renders for the selected center
    assert_eq!(search.scene().radius_ring.len(), 37);
}
