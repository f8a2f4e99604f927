//! Surface benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sadconsole::core::{CellSurface, Color, Cursor, SurfaceEditor};
use sadconsole::parser::StringParser;

fn bench_cursor_print(c: &mut Criterion) {
    let mut group = c.benchmark_group("cursor");

    let text = "The quick brown fox jumps over the lazy dog. ".repeat(40);
    group.throughput(Throughput::Bytes(text.len() as u64));

    group.bench_function("print_wrapped", |b| {
        b.iter(|| {
            let mut surface = CellSurface::new(80, 25);
            let mut cursor = Cursor::for_surface(&surface);
            cursor.print(&mut surface, black_box(&text));
            black_box(surface)
        })
    });

    group.bench_function("print_scrolling", |b| {
        b.iter(|| {
            let mut surface = CellSurface::new(40, 10);
            let mut cursor = Cursor::for_surface(&surface);
            cursor.disable_word_break = true;
            cursor.print(&mut surface, black_box(&text));
            black_box(surface)
        })
    });

    group.finish();
}

fn bench_shift(c: &mut Criterion) {
    let mut group = c.benchmark_group("shift");

    for size in [(80usize, 25usize), (200, 60)] {
        let mut rng = StdRng::seed_from_u64(7);
        let mut base = CellSurface::new(size.0, size.1);
        base.fill_with_random_garbage(&mut rng);

        group.bench_with_input(BenchmarkId::new("up_wrap", format!("{}x{}", size.0, size.1)), &base, |b, base| {
            b.iter(|| {
                let mut surface = base.clone();
                surface.shift_up(black_box(3), true);
                black_box(surface)
            })
        });

        group.bench_with_input(BenchmarkId::new("left", format!("{}x{}", size.0, size.1)), &base, |b, base| {
            b.iter(|| {
                let mut surface = base.clone();
                surface.shift_left(black_box(5), false);
                black_box(surface)
            })
        });
    }

    group.finish();
}

fn bench_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill");

    group.bench_function("fill_80x25", |b| {
        let mut surface = CellSurface::new(80, 25);
        b.iter(|| {
            surface.fill(Some(Color::RED), Some(Color::BLUE), Some(black_box(176)), None);
        })
    });

    group.bench_function("random_garbage_80x25", |b| {
        let mut surface = CellSurface::new(80, 25);
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| {
            surface.fill_with_random_garbage(&mut rng);
        })
    });

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("markup");

    let parser = StringParser::new();
    let plain = "plain text without any commands in it ".repeat(20);
    let markup = "[c:r f:red]Red[c:u] [c:g f:red:blue:10]gradient!![c:u] [c:b 3]blink[c:m h]mirror ".repeat(20);

    group.bench_function("plain", |b| b.iter(|| black_box(parser.parse(black_box(&plain)))));
    group.bench_function("commands", |b| b.iter(|| black_box(parser.parse(black_box(&markup)))));

    group.finish();
}

criterion_group!(benches, bench_cursor_print, bench_shift, bench_fill, bench_parse);
criterion_main!(benches);
