use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use rover_core::hazard::{self, Facing};
use rover_core::{FrameDecoder, MotionCommand, RampCfg, SafetyCfg, build_coordinator};
use rover_traits::{Actuator, DriveSignal, Side};

struct NullActuator;

impl Actuator for NullActuator {
    fn apply(
        &mut self,
        _side: Side,
        _signal: DriveSignal,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }

    fn release(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

fn bench_tick(c: &mut Criterion) {
    c.bench_function("tick_ramp_100", |b| {
        b.iter_batched(
            || {
                let hz = hazard::shared();
                let coord =
                    build_coordinator(NullActuator, hz.clone(), RampCfg::default(), SafetyCfg::default())
                        .unwrap();
                (coord, hz)
            },
            |(mut coord, hz)| {
                coord.tick(Some(MotionCommand::forward(Side::Left, 9)));
                coord.tick(Some(MotionCommand::forward(Side::Right, 9)));
                for i in 0..100u32 {
                    hz.set(Facing::Front, i % 25 == 0);
                    black_box(coord.tick(None));
                }
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_decode(c: &mut Criterion) {
    let stream: Vec<u8> = b"LF5RF5;L:0.75\nR:-0.3\nSLSR LB2 RB2 "
        .iter()
        .copied()
        .cycle()
        .take(4096)
        .collect();
    c.bench_function("decode_4k", |b| {
        b.iter(|| {
            let mut d = FrameDecoder::new();
            black_box(d.decode_all(black_box(&stream)).len())
        });
    });
}

criterion_group!(benches, bench_tick, bench_decode);
criterion_main!(benches);
