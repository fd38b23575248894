// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use criterion::{criterion_group, criterion_main, Criterion};
use lumen_core::math::Rect;
use lumen_data::{ObjectId, SpatialIndexRoot};
use std::hint::black_box;

fn scattered(count: u64) -> Vec<(ObjectId, Rect)> {
    (0..count)
        .map(|i| {
            let x = ((i * 7919) % 2000) as f32;
            let y = ((i * 104_729) % 2000) as f32;
            (ObjectId(i), Rect::new(x, y, 8.0, 8.0))
        })
        .collect()
}

fn bench_spatial(c: &mut Criterion) {
    let bounds = Rect::new(0.0, 0.0, 2048.0, 2048.0);
    let objects = scattered(10_000);

    let mut group = c.benchmark_group("Spatial Index");

    group.bench_function("Insert 10k", |b| {
        b.iter(|| {
            let mut root = SpatialIndexRoot::with_limits(bounds, 8, 10);
            for (id, rect) in &objects {
                let _ = root.add_object(*id, *rect);
            }
            black_box(root.node_count());
        });
    });

    let mut root = SpatialIndexRoot::with_limits(bounds, 8, 10);
    for (id, rect) in &objects {
        let _ = root.add_object(*id, *rect);
    }

    group.bench_function("Query viewport", |b| {
        let view = Rect::new(600.0, 600.0, 640.0, 360.0);
        b.iter(|| black_box(root.query(&view).len()));
    });

    group.bench_function("Update in place", |b| {
        b.iter(|| {
            for (id, rect) in objects.iter().take(1_000) {
                let _ = black_box(root.update_object(*id, *rect));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_spatial);
criterion_main!(benches);
