use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use thermo_core::Controller;
use thermo_core::mocks::{MemoryTransport, RecordingActuator, ScriptedThermocouple};

const SCRIPT: &[&str] = &[
    "*IDN?",
    "CTRL:SET 250.5C",
    "CONTROLLER:TEMPERATURE?",
    "ctrl:coeff?",
    "CTRL:SET 650",
    "SYST:ERR?",
    "CTRL:BOGUS",
    "CTRL:ON",
];

pub fn bench_dispatch(c: &mut Criterion) {
    let mut g = c.benchmark_group("dispatch");
    // BENCH_SAMPLE_SIZE=10 cargo bench -p thermo_core --bench cycle
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE")
        && let Ok(n) = ss.parse::<usize>()
    {
        g.sample_size(n.max(10));
    }

    g.bench_function("dispatch_script", |b| {
        b.iter_batched(
            || {
                Controller::builder(
                    ScriptedThermocouple::celsius([21.0]),
                    RecordingActuator::new(),
                    MemoryTransport::default(),
                )
                .build()
                .unwrap()
            },
            |mut ctl| {
                for line in SCRIPT {
                    black_box(ctl.dispatch(black_box(line)));
                }
            },
            BatchSize::SmallInput,
        )
    });

    g.bench_function("step_with_command", |b| {
        b.iter_batched(
            || {
                Controller::builder(
                    ScriptedThermocouple::celsius([21.0]),
                    RecordingActuator::new(),
                    MemoryTransport::new(SCRIPT.iter().copied()),
                )
                .build()
                .unwrap()
            },
            |mut ctl| {
                for _ in 0..SCRIPT.len() {
                    black_box(ctl.step());
                }
            },
            BatchSize::SmallInput,
        )
    });
    g.finish();
}

criterion_group!(cycle, bench_dispatch);
criterion_main!(cycle);
