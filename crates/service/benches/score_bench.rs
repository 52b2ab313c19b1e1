use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use service::movie::domain::MovieRecord;
use service::movie::repository::mock::MockMovieRepository;
use service::score::{ScoreService, domain::ScoreDto, repository::mock::MockScoreRepository};
use service::user_service::mock::FixedUserService;

fn bench_save_score(c: &mut Criterion) {
    let movies = Arc::new(MockMovieRepository::with_movies([MovieRecord {
        id: 1,
        title: "Bench Movie".into(),
        release_year: Some(2020),
        image: "https://example.com/bench.jpg".into(),
        score: 0.0,
        count: 0,
    }]));
    let scores = Arc::new(MockScoreRepository::new(movies));
    let rt = tokio::runtime::Runtime::new().unwrap();

    // a realistic crowd of existing votes so the average is not trivial
    for uid in 2..500 {
        let voter = ScoreService::new(Arc::new(FixedUserService::client(uid, "voter@example.com")), scores.clone());
        rt.block_on(voter.save_score(ScoreDto { movie_id: 1, score: (uid % 6) as f64 })).unwrap();
    }

    let svc = ScoreService::new(Arc::new(FixedUserService::client(1, "bench@example.com")), scores);
    c.bench_function("score_save_and_average", |b| {
        b.to_async(&rt).iter(|| svc.save_score(ScoreDto { movie_id: 1, score: 4.0 }));
    });
}

criterion_group!(benches, bench_save_score);
criterion_main!(benches);
