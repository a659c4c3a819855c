use tabula_frame::{Label, Value};
use tabula_testkit::{
    compare::{
        Datum, FrameCompareOptions, SeriesCompareOptions, assert_almost_equal, assert_frame_equal,
        assert_index_equal, assert_panel_equal, assert_panel4d_equal, assert_series_equal,
    },
    custom::{FrameSpec, IndexNames, IndexSpec, IndexType, make_custom_dataframe, make_custom_index},
    data_gen,
};

fn random_frame(seed: u64) -> tabula_frame::DataFrame {
    fastrand::seed(seed);
    let spec = FrameSpec::default()
        .row_index(IndexSpec::new(1).prefix("R").idx_type(IndexType::Str))
        .column_index(IndexSpec::new(2).prefix("C").ndupe(vec![2]))
        .data_gen(|_, _| Value::Float64(fastrand::f64()));
    make_custom_dataframe(6, 4, &spec).unwrap()
}

#[test]
fn test_custom_index_lengths_and_levels() {
    for nentries in [0, 1, 2, 7, 25] {
        for nlevels in 1..=3 {
            for dupe in 1..=3 {
                let spec = IndexSpec::new(nlevels).ndupe(vec![dupe]);
                let index = make_custom_index(nentries, &spec).unwrap();
                assert_eq!(index.len(), nentries, "{nentries} x {nlevels} x {dupe}");
                if nentries > 1 && nlevels > 1 {
                    assert_eq!(index.nlevels(), nlevels);
                    assert!(
                        index
                            .iter()
                            .all(|l| l.as_tuple().is_some_and(|t| t.len() == nlevels))
                    );
                }
            }
        }
    }
}

#[test]
fn test_first_level_repeats_consecutively() {
    for dupe in 1..=4 {
        let index = make_custom_index(11, &IndexSpec::new(1).ndupe(vec![dupe])).unwrap();
        let labels = index.labels();
        for (group, chunk) in labels.chunks(dupe).enumerate() {
            assert!(chunk.iter().all(|l| *l == chunk[0]));
            assert_eq!(chunk[0], Label::from(format!("#_l0_g{group}")));
        }
    }
}

#[test]
fn test_two_level_index_with_pairs() {
    let index = make_custom_index(6, &IndexSpec::new(2).ndupe(vec![2, 1])).unwrap();
    assert_eq!(index.len(), 6);
    assert_eq!(index.nlevels(), 2);
    let tabula_frame::Index::Multi(multi) = &index else {
        panic!("expected a multi-level index");
    };
    let level0 = multi.level_values(0);
    for pair in level0.chunks(2) {
        assert_eq!(pair[0], pair[1]);
    }
    assert_ne!(level0[1], level0[2]);
    assert!(index.is_unique());
    assert_eq!(
        index.names(),
        vec![Some("#0".to_string()), Some("#1".to_string())]
    );
}

#[test]
fn test_default_cells() {
    let df = make_custom_dataframe(3, 2, &FrameSpec::default()).unwrap();
    assert_eq!(df.shape(), (3, 2));
    let cells = (0..3)
        .flat_map(|r| (0..2).map(move |c| (r, c)))
        .map(|(r, c)| df.value(r, c).unwrap())
        .collect::<Vec<_>>();
    let expected = ["R0C0", "R0C1", "R1C0", "R1C1", "R2C0", "R2C1"]
        .into_iter()
        .map(Value::from)
        .collect::<Vec<_>>();
    assert_eq!(cells, expected);
}

#[test]
fn test_seeded_frames_compare_equal() {
    let left = random_frame(1234);
    let right = random_frame(1234);
    let options = FrameCompareOptions::default();
    assert_frame_equal(&left, &right, &options).unwrap();

    let mut altered = right.clone();
    altered.set_value(2, 1, Value::Float64(42.0)).unwrap();
    assert!(assert_frame_equal(&left, &altered, &options).unwrap_err().is_assertion());

    let other_seed = random_frame(99);
    assert!(assert_frame_equal(&left, &other_seed, &options).is_err());
}

#[test]
fn test_self_comparison() {
    let index = make_custom_index(9, &IndexSpec::new(3).names(IndexNames::None)).unwrap();
    assert_index_equal(&index, &index).unwrap();
    assert_almost_equal(&Datum::from(&index), &Datum::from(&index), false).unwrap();

    let series = data_gen::make_time_series(Some(12)).unwrap();
    assert_series_equal(&series, &series.clone(), &SeriesCompareOptions::default()).unwrap();

    let frame = data_gen::make_mixed_data_frame().unwrap();
    assert_frame_equal(&frame, &frame.clone(), &FrameCompareOptions::default()).unwrap();
    let by_blocks = FrameCompareOptions {
        by_blocks: true,
        ..Default::default()
    };
    assert_frame_equal(&frame, &frame.clone(), &by_blocks).unwrap();

    let mut panel = data_gen::make_panel(Some(5)).unwrap();
    data_gen::add_nans(&mut panel).unwrap();
    assert_panel_equal(&panel, &panel.clone(), false).unwrap();

    let p4 = data_gen::make_panel4d(Some(3)).unwrap();
    assert_panel4d_equal(&p4, &p4.clone(), false).unwrap();
}

#[test]
fn test_tolerance_properties() {
    let almost = |a: f64, b: f64| assert_almost_equal(&Datum::from(a), &Datum::from(b), false);
    almost(1.000001, 1.0000015).unwrap();
    assert!(almost(1.01, 1.02).is_err());
    almost(0.0000001, 0.0000002).unwrap();
    assert!(almost(1.0, 1.1).is_err());
}

#[test]
fn test_panel_nan_mismatch() {
    fastrand::seed(5);
    let left = data_gen::make_panel(Some(4)).unwrap();
    let mut right = left.clone();
    data_gen::add_nans(&mut right).unwrap();
    // item 0 column 0 is untouched, item 0 column 1 loses its first row
    let err = assert_panel_equal(&left, &right, false).unwrap_err();
    assert!(err.to_string().contains("ItemA"), "{err}");
}
