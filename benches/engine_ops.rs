use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tiles2048::adapter::protocol::build_observation;
use tiles2048::core::{Board, GameSnapshot, GameState, TileRng};
use tiles2048::types::Direction;

fn busy_board() -> Board {
    Board::from_rows([
        [2, 2, 4, 8],
        [4, 0, 4, 16],
        [8, 8, 0, 2],
        [0, 2, 2, 2],
    ])
    .unwrap_or_default()
}

fn bench_shift(c: &mut Criterion) {
    let board = busy_board();

    c.bench_function("shift_left", |b| {
        b.iter(|| black_box(&board).shift(black_box(Direction::Left)))
    });
}

fn bench_apply_move(c: &mut Criterion) {
    let board = busy_board();
    let mut rng = TileRng::new(12345);

    c.bench_function("apply_move_with_spawn", |b| {
        b.iter(|| black_box(&board).apply_move(black_box(Direction::Down), &mut rng))
    });
}

fn bench_legal_moves(c: &mut Criterion) {
    let board = busy_board();

    c.bench_function("legal_moves", |b| b.iter(|| black_box(&board).legal_moves()));
}

fn bench_game_cycle(c: &mut Criterion) {
    let mut state = GameState::new(12345);
    let mut i = 0usize;

    c.bench_function("game_state_move_cycle", |b| {
        b.iter(|| {
            if state.status().is_terminal() {
                state.restart();
            }
            let _ = state.apply_move(Direction::ALL[i % 4]);
            i += 1;
        })
    });
}

fn bench_snapshot_into(c: &mut Criterion) {
    let state = GameState::new(12345);
    let mut snap = GameSnapshot::default();

    c.bench_function("snapshot_into", |b| {
        b.iter(|| state.snapshot_into(black_box(&mut snap)))
    });
}

fn bench_build_observation(c: &mut Criterion) {
    let snap = GameState::new(12345).snapshot();

    c.bench_function("build_observation", |b| {
        b.iter(|| build_observation(black_box(&snap), 1, None))
    });
}

criterion_group!(
    benches,
    bench_shift,
    bench_apply_move,
    bench_legal_moves,
    bench_game_cycle,
    bench_snapshot_into,
    bench_build_observation
);
criterion_main!(benches);
