use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;
use termmenu::capability::CapabilitySet;
use termmenu::render::{FrameWriter, PreviewPane, RenderInput, Renderer};
use termmenu::search::{filter, SearchPattern, SearchState};
use termmenu::selection::{SelectionModel, SelectionOptions};
use termmenu::{MenuConfig, MenuEntry};

fn create_entries(count: usize) -> Vec<MenuEntry> {
    let services = ["auth", "database", "cache", "payment", "notification"];
    let levels = ["debug", "info", "warn", "error"];

    (0..count)
        .map(|i| {
            let raw = format!(
                "{}-{} worker {:05} handles region eu-{}|/var/log/{}.log",
                services[i % services.len()],
                levels[i % levels.len()],
                i,
                i % 7,
                i
            );
            MenuEntry::parse(&raw, false)
        })
        .collect()
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    group.measurement_time(Duration::from_secs(3));

    for count in [100, 1_000, 10_000] {
        let entries = create_entries(count);
        let literal = SearchPattern::compile("payment", false).unwrap();
        let regex = SearchPattern::compile(r"(cache|auth)-\w+ worker 0\d{2}", false).unwrap();

        group.bench_with_input(BenchmarkId::new("literal", count), &entries, |b, entries| {
            b.iter(|| black_box(filter(entries, Some(&literal))))
        });
        group.bench_with_input(BenchmarkId::new("regex", count), &entries, |b, entries| {
            b.iter(|| black_box(filter(entries, Some(&regex))))
        });
        group.bench_with_input(BenchmarkId::new("unfiltered", count), &entries, |b, entries| {
            b.iter(|| black_box(filter(entries, None)))
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.measurement_time(Duration::from_secs(3));

    let caps = CapabilitySet::ansi();
    let config = MenuConfig {
        title: Some("Services".to_string()),
        multi_select: true,
        ..MenuConfig::default()
    };

    for count in [50, 5_000] {
        let entries = create_entries(count);
        let renderer = Renderer::new(&config, &entries);
        let mut search = SearchState::new(&entries, false);
        let mut selection = SelectionModel::new(SelectionOptions {
            multi_select: true,
            ..SelectionOptions::default()
        });
        selection
            .initialize(&entries, search.view(), None, &[])
            .unwrap();

        group.bench_with_input(BenchmarkId::new("full_view", count), &entries, |b, entries| {
            let input = RenderInput {
                entries,
                search: &search,
                selection: &selection,
                searching: false,
                preview: PreviewPane::Hidden,
                size: (120, 40),
            };
            b.iter(|| black_box(renderer.render(&input, &caps)))
        });

        search.set_text("err", &entries);
        group.bench_with_input(BenchmarkId::new("highlighted", count), &entries, |b, entries| {
            let input = RenderInput {
                entries,
                search: &search,
                selection: &selection,
                searching: true,
                preview: PreviewPane::Hidden,
                size: (120, 40),
            };
            b.iter(|| black_box(renderer.render(&input, &caps)))
        });
    }

    group.finish();
}

fn bench_frame_diff(c: &mut Criterion) {
    let caps = CapabilitySet::ansi();
    let entries = create_entries(200);
    let renderer = Renderer::new(&MenuConfig::default(), &entries);
    let search = SearchState::new(&entries, false);

    let frames: Vec<_> = (0..2)
        .map(|step| {
            let mut selection = SelectionModel::new(SelectionOptions::default());
            selection
                .initialize(&entries, search.view(), Some(step), &[])
                .unwrap();
            let input = RenderInput {
                entries: &entries,
                search: &search,
                selection: &selection,
                searching: false,
                preview: PreviewPane::Hidden,
                size: (100, 30),
            };
            renderer.render(&input, &caps)
        })
        .collect();

    c.bench_function("cursor_move_redraw", |b| {
        b.iter(|| {
            let mut writer = FrameWriter::new();
            let first = writer.diff(&frames[0], &caps);
            let second = writer.diff(black_box(&frames[1]), &caps);
            black_box((first, second))
        })
    });
}

criterion_group!(benches, bench_filter, bench_render, bench_frame_diff);
criterion_main!(benches);
