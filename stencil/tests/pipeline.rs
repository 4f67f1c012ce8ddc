use rand::{Rng, SeedableRng, rngs::StdRng};
use stencil::{
    Collector, Execution, Grid, LocalPipeline, PartitionPlan, Slab, edge_detect, route_halos,
};

/// Runs every worker's pipeline in turn, exchanging halos the way the group does.
fn distributed(image: &Grid, workers: usize, exec: Execution) -> Grid {
    let plan = PartitionPlan::new(image.rows(), workers).unwrap();
    let pipeline = LocalPipeline::new(exec);

    let slabs: Vec<_> = plan
        .iter()
        .map(|part| Slab::from_image(image, *part).unwrap())
        .collect();

    let mut smoothed: Vec<_> = slabs.iter().map(|s| pipeline.smooth(s).unwrap()).collect();
    let boundaries: Vec<_> = smoothed.iter().map(Slab::boundary_rows).collect();
    let halos = route_halos(&plan, &boundaries, image.cols()).unwrap();
    for (slab, halo) in smoothed.iter_mut().zip(&halos) {
        slab.set_halo_rows(halo).unwrap();
    }

    let mut collector = Collector::new(plan, image.cols()).unwrap();
    for slab in &smoothed {
        let out = pipeline.gradient(slab).unwrap();
        collector.place(out.partition().rank, out.interior()).unwrap();
    }

    collector.finish().unwrap()
}

fn random_image(rows: usize, cols: usize, seed: u64) -> Grid {
    let mut rng = StdRng::seed_from_u64(seed);
    Grid::from_fn(rows, cols, |_, _| rng.random_range(0.0..255.0)).unwrap()
}

#[test]
fn uniform_four_by_four_on_two_workers_is_all_zero() {
    let image = Grid::from_fn(4, 4, |_, _| 100.0).unwrap();
    let out = distributed(&image, 2, Execution::Serial);

    assert_eq!(out.rows(), 4);
    assert_eq!(out.cols(), 4);
    assert!(out.as_slice().iter().all(|&px| px == 0.0));
}

#[test]
fn spike_matches_hand_computed_sobel() {
    let image = Grid::from_fn(5, 5, |i, j| if (i, j) == (2, 2) { 255.0 } else { 0.0 }).unwrap();
    let out = distributed(&image, 1, Execution::Serial);

    // the blurred spike is a flat 3×3 plateau of 255/9
    let a = 255.0_f32 / 9.0;
    let corner = 3.0 * a * 2.0_f32.sqrt();
    let edge = 4.0 * a;

    let expected = [
        [0.0, 0.0, 0.0, 0.0, 0.0],
        [0.0, corner, edge, corner, 0.0],
        [0.0, edge, 0.0, edge, 0.0],
        [0.0, corner, edge, corner, 0.0],
        [0.0, 0.0, 0.0, 0.0, 0.0],
    ];

    for (i, row) in expected.iter().enumerate() {
        for (j, want) in row.iter().enumerate() {
            let got = out.get(i, j);
            assert!((got - want).abs() < 1e-3, "({i}, {j}): got {got}, want {want}");
        }
    }
}

#[test]
fn worker_count_does_not_change_the_result() {
    for (rows, cols) in [(9, 9), (16, 11), (23, 5)] {
        let image = random_image(rows, cols, rows as u64);
        let reference = edge_detect(&image, Execution::Serial).unwrap();

        for workers in 1..=rows.min(8) {
            let out = distributed(&image, workers, Execution::Parallel);
            for (got, want) in out.as_slice().iter().zip(reference.as_slice()) {
                assert!((got - want).abs() <= 1e-5, "{rows}x{cols} on {workers} workers");
            }
        }
    }
}

#[test]
fn every_worker_owning_one_row_still_matches() {
    let image = random_image(6, 6, 99);
    let reference = edge_detect(&image, Execution::Serial).unwrap();
    assert_eq!(distributed(&image, 6, Execution::Serial), reference);
}

#[test]
fn output_borders_are_zero() {
    let image = random_image(12, 10, 3);
    let out = distributed(&image, 5, Execution::Parallel);

    assert!(out.row(0).iter().all(|&px| px == 0.0));
    assert!(out.row(11).iter().all(|&px| px == 0.0));
    for i in 0..12 {
        assert_eq!(out.get(i, 0), 0.0);
        assert_eq!(out.get(i, 9), 0.0);
    }
}

#[test]
fn reruns_are_bit_identical() {
    let image = random_image(20, 20, 11);
    let first = distributed(&image, 3, Execution::Parallel);
    let second = distributed(&image, 3, Execution::Parallel);
    assert_eq!(first, second);
}

#[test]
fn magnitudes_are_never_negative() {
    let image = random_image(15, 15, 5);
    let out = edge_detect(&image, Execution::Parallel).unwrap();
    assert!(out.as_slice().iter().all(|&px| px >= 0.0));
}
