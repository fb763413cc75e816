use xritkit::geo::{GeoReference, OutOfView};

/// GOES-13 LRIT full disk navigation
fn goes13_lrit() -> GeoReference {
    GeoReference::new(-75.0, 1402, 1402, 10216334.0, 10216334.0, false, 2804)
}

/// Fine sampling, roughly 1000 pixels per degree of scan angle
fn fine_grid(satellite_longitude: f64) -> GeoReference {
    GeoReference::new(
        satellite_longitude,
        10848,
        10848,
        65_536_000.0,
        65_536_000.0,
        false,
        21696,
    )
}

#[test]
fn test_sub_satellite_point_maps_to_offsets() {
    for geo in [
        goes13_lrit(),
        fine_grid(-75.2),
        GeoReference::new(0.0, 1856, 1856, 13642337.0, 13642337.0, false, 3712),
        GeoReference::new(140.7, 1100, 900, 20000000.0, 10000000.0, false, 2200),
    ] {
        let lon = geo.satellite_longitude();
        assert_eq!(
            geo.pixel_from_geodetic(0.0, lon),
            (geo.column_offset(), geo.line_offset())
        );
        assert_eq!(
            geo.pixel_from_geodetic_f(0.0, lon),
            (geo.column_offset() as f64, geo.line_offset() as f64)
        );
    }
}

#[test]
fn test_offsets_map_back_to_sub_satellite_point() {
    let geo = goes13_lrit();
    let (lat, lon) = geo.geodetic_from_pixel(1402, 1402).unwrap();

    assert!(lat.abs() < 1e-9);
    assert!((lon - -75.0).abs() < 1e-9);
}

#[test]
fn test_geodetic_round_trip_within_hundredth_degree() {
    let geo = fine_grid(-75.2);

    let (x, y) = geo.pixel_from_geodetic(10.0, -70.0);
    let (lat, lon) = geo.geodetic_from_pixel(x, y).unwrap();
    assert!((lat - 10.0).abs() < 0.01, "lat {}", lat);
    assert!((lon - -70.0).abs() < 0.01, "lon {}", lon);

    let geo = goes13_lrit();
    let (x, y) = geo.pixel_from_geodetic_f(10.0, -70.0);
    let (lat, lon) = geo.geodetic_from_pixel_f(x, y).unwrap();
    assert!((lat - 10.0).abs() < 1e-6);
    assert!((lon - -70.0).abs() < 1e-6);
}

#[test]
fn test_pixel_round_trip_inside_disk() {
    let geo = fine_grid(-75.2);

    for (x, y) in [(10848, 10848), (12000, 9000), (5000, 14000), (15500, 10848)] {
        let (lat, lon) = geo.geodetic_from_pixel(x, y).unwrap();
        assert!(geo.is_within_visible_disk(lat, lon));
        assert_eq!(geo.pixel_from_geodetic(lat, lon), (x, y));
    }
}

#[test]
fn test_geodetic_round_trip_grid() {
    let geo = goes13_lrit();

    for lat in [-60.0, -30.0, -5.0, 0.0, 20.0, 45.0, 60.0] {
        for dlon in [-50.0, -25.0, 0.0, 15.0, 50.0] {
            let lon = -75.0 + dlon;
            let (x, y) = geo.pixel_from_geodetic_f(lat, lon);
            let (lat2, lon2) = geo.geodetic_from_pixel_f(x, y).unwrap();
            assert!((lat - lat2).abs() < 1e-6, "lat {} -> {}", lat, lat2);
            assert!((lon - lon2).abs() < 1e-6, "lon {} -> {}", lon, lon2);
        }
    }
}

#[test]
fn test_north_is_up_and_east_is_right() {
    let geo = goes13_lrit();
    let (_, y_north) = geo.pixel_from_geodetic(30.0, -75.0);
    let (x_east, _) = geo.pixel_from_geodetic(0.0, -50.0);

    assert!(y_north < geo.line_offset());
    assert!(x_east > geo.column_offset());
}

#[test]
fn test_corner_pixel_is_out_of_view() {
    let geo = goes13_lrit();

    assert_eq!(
        geo.geodetic_from_pixel(0, 0),
        Err(OutOfView { x: 0.0, y: 0.0 })
    );
    assert!(geo.geodetic_from_pixel(0, 1402).is_err());
    assert!(geo.geodetic_from_pixel(2803, 1402).is_err());
}

#[test]
fn test_scan_pointing_away_from_earth_is_out_of_view() {
    let geo = goes13_lrit();

    // 28060 columns is a 180 degree scan angle at this sampling
    assert!(geo.geodetic_from_pixel(1402 + 28060, 1402).is_err());
    assert!(geo.geodetic_from_pixel(1402, 1402 + 28060).is_err());
    assert!(geo.geodetic_from_pixel(1402 - 15000, 1402).is_err());
    assert!(geo.geodetic_from_pixel_f(1402.0 + 28060.0, 1402.0 + 28060.0).is_err());
}

#[test]
fn test_fix_aspect_round_trip() {
    let geo = GeoReference::new(-75.0, 1402, 701, 10216334.0, 5108167.0, true, 2804);

    let (x, y) = geo.pixel_from_geodetic_f(25.0, -60.0);
    let (lat, lon) = geo.geodetic_from_pixel_f(x, y).unwrap();
    assert!((lat - 25.0).abs() < 1e-6);
    assert!((lon - -60.0).abs() < 1e-6);
}

#[test]
fn test_fix_aspect_stretches_whole_line() {
    let stretched = GeoReference::new(-75.0, 1402, 1000, 10216334.0, 5108167.0, true, 2804);
    let plain = GeoReference::new(-75.0, 1402, 1000, 10216334.0, 5108167.0, false, 2804);

    let (x, y) = stretched.pixel_from_geodetic_f(30.0, -75.0);
    let (x_plain, y_plain) = plain.pixel_from_geodetic_f(30.0, -75.0);
    assert_eq!(x, x_plain);
    assert!((y - 2.0 * y_plain).abs() < 1e-9);

    // The sub-satellite line moves with the stretch
    assert_eq!(stretched.pixel_from_geodetic(0.0, -75.0), (1402, 2000));
}

#[test]
fn test_crop_left() {
    let geo = GeoReference::new(-75.0, 1924, 1402, 10216334.0, 10216334.0, false, 3000);
    assert_eq!(geo.crop_left(), 848);

    let centered = goes13_lrit();
    assert_eq!(centered.crop_left(), 0);
}

#[test]
fn test_visible_bounds_and_trim() {
    let geo = GeoReference::new(-75.2, 1402, 1402, 10216334.0, 10216334.0, false, 2804);

    assert_eq!(geo.max_latitude(), 79.0);
    assert_eq!(geo.min_latitude(), -79.0);
    assert!((geo.max_longitude() - 3.8).abs() < 1e-9);
    assert!((geo.min_longitude() - -154.2).abs() < 1e-9);
    assert_eq!(geo.latitude_coverage(), 158.0);
    assert!((geo.longitude_coverage() - 158.0).abs() < 1e-9);
    assert_eq!(geo.trim_latitude(), 16.0);
    assert_eq!(geo.trim_longitude(), 16.0);

    assert!(geo.is_within_visible_disk(10.0, -70.0));
    assert!(!geo.is_within_visible_disk(80.0, -75.2));
    assert!(!geo.is_within_visible_disk(0.0, 10.0));
}

#[test]
fn test_shared_across_threads() {
    let geo = std::sync::Arc::new(goes13_lrit());

    std::thread::scope(|scope| {
        for lat in [-40.0, 0.0, 40.0] {
            let geo = geo.clone();
            scope.spawn(move || {
                let (x, y) = geo.pixel_from_geodetic_f(lat, -75.0);
                let (lat2, _) = geo.geodetic_from_pixel_f(x, y).unwrap();
                assert!((lat - lat2).abs() < 1e-6);
            });
        }
    });
}
