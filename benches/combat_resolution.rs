use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::time::Duration;
use steal_arena_server::combat::{resolve_attack, resolve_steal};
use steal_arena_server::config::GameConfig;
use steal_arena_server::metrics::ResponseTimeTracker;
use steal_arena_server::registry::PlayerRegistry;
use uuid::Uuid;

fn full_room(players: &PlayerRegistry, rules: &GameConfig) -> Vec<Uuid> {
    (0..rules.max_players_per_room)
        .map(|i| {
            let id = Uuid::new_v4();
            players
                .create(id, format!("P{i}"), "BENCH".to_string(), rules)
                .expect("fresh id");
            id
        })
        .collect()
}

fn bench_combat(c: &mut Criterion) {
    let rules = GameConfig {
        attack_ammo_cost: 0,
        ..GameConfig::default()
    };

    c.bench_function("resolve_steal_round_robin", |b| {
        let players = PlayerRegistry::new();
        let ids = full_room(&players, &rules);
        let mut turn = 0usize;
        b.iter(|| {
            let thief = ids[turn % ids.len()];
            let target = ids[(turn + 1) % ids.len()];
            turn += 1;
            black_box(resolve_steal(&players, &rules, &thief, &target).expect("same room"))
        });
    });

    c.bench_function("resolve_attack", |b| {
        let players = PlayerRegistry::new();
        let ids = full_room(&players, &rules);
        b.iter(|| black_box(resolve_attack(&players, &rules, &ids[0], &ids[1])));
    });
}

fn bench_response_time_tracker(c: &mut Criterion) {
    c.bench_function("response_time_tracker_record", |b| {
        b.iter(|| {
            let mut tracker = ResponseTimeTracker::new();
            for sample in 0..512u64 {
                let duration = Duration::from_micros(50 + (sample % 250));
                tracker.add_sample("steal", duration);
            }
            tracker
        });
    });
}

criterion_group!(combat, bench_combat, bench_response_time_tracker);
criterion_main!(combat);
