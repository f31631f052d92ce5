use streamplot::{
    iterate_extent, AxisRange, Batch, Datum, IterateBuilder, IterateDatum, StreamConfig, StreamWindowController,
};

#[test]
fn iterates_stream_through_a_controller() {
    let config = StreamConfig::default().with_drop_data_after(3.0).with_windowed_stats(true);
    let mut c = StreamWindowController::<IterateDatum>::time_series(config, [("x-axis-default", AxisRange::new(0.0, 10.0))]).unwrap();
    let mut builder = IterateBuilder::new();

    let raw = [
        vec![Datum::new(0.0, 0.2), Datum::new(1.0, 0.6)],
        vec![Datum::new(2.0, 0.9), Datum::new(3.0, 0.3)],
        vec![Datum::new(4.0, 0.8), Datum::new(5.0, 0.5)],
    ];
    for chunk in &raw {
        let iterates = builder.push("logistic", chunk);
        c.process_batch(&Batch::from_points([("logistic", iterates)]));
    }

    // Iterates at t = 1..=5; only t >= 2 survive a 3 ms retention at t = 5.
    let series = c.series("logistic").unwrap();
    assert_eq!(series.len(), 4);
    assert_eq!(series.first().unwrap().time, 2.0);

    let stats = c.stats("logistic").unwrap();
    let extent = iterate_extent(&stats.windowed, series.first(), (0.0, 1.0));
    assert_eq!((extent.start(), extent.end()), (0.3, 0.9));
}
