//! Benchmarks for the analysis and convergence engine

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rcframe::prelude::*;

fn create_multi_story_frame(stories: usize, bays: usize) -> FrameModel {
    let mut model = FrameModel::new();

    model.add_material("M25", Material::m25()).unwrap();
    model
        .add_section("COL", Section::rectangular(0.30, 0.45))
        .unwrap();
    model
        .add_section("BM", Section::rectangular(0.23, 0.45))
        .unwrap();

    let story_height = 3.0;
    let bay_width = 4.5;

    for story in 0..=stories {
        for bay in 0..=bays {
            let name = format!("N{}_{}", story, bay);
            let x = bay as f64 * bay_width;
            let y = story as f64 * story_height;
            model.add_node(&name, Node::new(x, y, 0.0)).unwrap();
        }
    }

    for story in 0..stories {
        for bay in 0..=bays {
            let name = format!("C{}_{}", story, bay);
            let i = format!("N{}_{}", story, bay);
            let j = format!("N{}_{}", story + 1, bay);
            model
                .add_element(&name, Element::column(&i, &j, "M25", "COL"))
                .unwrap();
        }
    }

    for story in 1..=stories {
        for bay in 0..bays {
            let name = format!("B{}_{}", story, bay);
            let i = format!("N{}_{}", story, bay);
            let j = format!("N{}_{}", story, bay + 1);
            model
                .add_element(&name, Element::beam(&i, &j, "M25", "BM"))
                .unwrap();
        }
    }

    for bay in 0..=bays {
        model
            .add_support(&format!("N0_{}", bay), Support::fixed())
            .unwrap();
    }

    model.add_load_case(LoadCase::dead()).unwrap();
    model.add_load_case(LoadCase::live()).unwrap();
    model.apply_self_weight("Dead").unwrap();
    for story in 1..=stories {
        for bay in 0..bays {
            model
                .add_element_dist_load(
                    &format!("B{}_{}", story, bay),
                    DistributedLoad::downward(10e3, "Live"),
                )
                .unwrap();
        }
    }

    model
}

fn bench_linear_analysis(c: &mut Criterion) {
    let mut model = create_multi_story_frame(5, 3);
    model
        .generate_combinations(&CodeProfile::default())
        .unwrap();
    let options = AnalysisOptions::default();

    c.bench_function("analyze 5x3 frame", |b| {
        b.iter(|| {
            let result = model.analyze(black_box(&options)).unwrap();
            black_box(result);
        })
    });
}

fn bench_convergence_run(c: &mut Criterion) {
    c.bench_function("converge 3x2 frame", |b| {
        b.iter(|| {
            let model = create_multi_story_frame(3, 2);
            let mut engine = DesignEngine::new(model, CodeProfile::default());
            let design = engine.run().unwrap();
            black_box(design);
        })
    });
}

criterion_group!(benches, bench_linear_analysis, bench_convergence_run);
criterion_main!(benches);
