//! Runs that cannot complete must fail, never hang or emit partial output


use crossbeam_channel::bounded;
use test_helpers::PanickingExecutor;
use treechurn::{
    derive_units, Benchmark, ChurnConfig, ChurnError, Collector, Scheduler, TreeExecutor, UnitRole,
};

#[test]
fn panicking_unit_fails_the_run() {
    for role in [UnitRole::Stretch, UnitRole::Ladder(6), UnitRole::LongLived] {
        let config = ChurnConfig::for_problem_size(8).with_concurrency(2);
        let err = Benchmark::new(config)
            .run_with(PanickingExecutor { fails_on: role })
            .unwrap_err();

        assert!(
            matches!(err, ChurnError::ResultStreamClosed { missing: 1 }),
            "unexpected error for {}: {}",
            role,
            err
        );
    }
}

#[test]
fn closed_pool_aborts_dispatch_and_collection() {
    let config = ChurnConfig::for_problem_size(6);
    let units = derive_units(&config);
    let expected = units.len();

    let scheduler = Scheduler::new(TreeExecutor, 2).expect("scheduler");
    scheduler.permits().close();

    let (tx, rx) = bounded(2);
    let dispatcher = scheduler.spawn(units, tx).expect("dispatcher starts");
    let collected = Collector::new(expected, rx).finish();
    let dispatched = dispatcher.join().expect("dispatcher joins");

    assert!(matches!(
        dispatched,
        Err(ChurnError::PermitUnavailable {
            role: UnitRole::Ladder(4),
            ..
        })
    ));
    assert!(matches!(
        collected,
        Err(ChurnError::ResultStreamClosed { missing }) if missing == expected
    ));
}

#[test]
fn invalid_configs_are_rejected_before_dispatch() {
    let zero = Benchmark::new(ChurnConfig::for_problem_size(6).with_concurrency(0)).run();
    assert!(matches!(zero, Err(ChurnError::InvalidConcurrency(0))));

    let huge = Benchmark::new(ChurnConfig::for_problem_size(200)).run();
    assert!(matches!(huge, Err(ChurnError::ProblemTooLarge { requested: 200, .. })));

    let flooded = ChurnConfig::for_problem_size(6).with_concurrency(100_000_000);
    let flooded = Benchmark::new(flooded).run();
    assert!(matches!(flooded, Err(ChurnError::InvalidConcurrency(100_000_000))));
}
