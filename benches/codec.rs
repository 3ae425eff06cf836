//! Wire codec benchmark suite.
//!
//! Benchmarks the per-line work done on the hot paths:
//! - Building command lines with and without quoting
//! - Decoding main-socket messages of each kind
//! - Decoding immediate-socket replies
//!
//! Run with: cargo bench --bench codec
//! Results saved to: target/criterion/

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use whisker_client::protocol::{CommandLine, decode_main, decode_reply, split_args};

// ============================================================================
// Benchmark Inputs
// ============================================================================

const MAIN_LINES: &[(&str, &str)] = &[
    ("event", "Event: lever_pressed"),
    ("event_timestamped", "Event: lever_pressed [123456]"),
    ("key_event", "KeyEvent: 65 down screen_doc"),
    ("client_message", "ClientMessage: 4 session started"),
    ("warning", "Warning: line 7 not claimed"),
    ("unknown", "Something the server invented later"),
];

const REPLY_LINES: &[(&str, &str)] = &[
    ("success", "Success"),
    ("failure", "Failure"),
    ("size", "MSG_SIZE 1024 768"),
    ("extent", "MSG_EXTENT 10 20 110 220"),
    ("duration", "MSG_DURATION 60000"),
    ("value", "on"),
];

// ============================================================================
// Benchmark: Command Building
// ============================================================================

fn bench_command_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("command_build");

    group.bench_function("plain", |b| {
        b.iter(|| {
            CommandLine::new("LINE_SET_STATE")
                .arg(black_box("reward"))
                .arg("on")
                .build()
        });
    });

    group.bench_function("quoted", |b| {
        b.iter(|| {
            CommandLine::new("AUDIO_LOAD_SOUND")
                .arg("speaker")
                .arg(black_box("tone a"))
                .quoted(black_box("C:\\sounds\\reward tone.wav"))
                .build()
        });
    });

    group.bench_function("display_text", |b| {
        b.iter(|| {
            CommandLine::new("DISPLAY_ADD_OBJECT")
                .arg("doc")
                .arg("caption")
                .arg("text")
                .num(100)
                .num(200)
                .quoted(black_box("Press the left lever"))
                .raw("-height 24 -font \"Arial\" -colour 255 255 255")
                .build()
        });
    });

    group.finish();
}

// ============================================================================
// Benchmark: Decoding
// ============================================================================

fn bench_decode_main(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_main");

    for &(name, line) in MAIN_LINES {
        group.throughput(Throughput::Bytes(line.len() as u64));
        group.bench_with_input(BenchmarkId::new("kind", name), line, |b, line| {
            b.iter(|| decode_main(black_box(line)));
        });
    }

    group.finish();
}

fn bench_decode_reply(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_reply");

    for &(name, line) in REPLY_LINES {
        group.bench_with_input(BenchmarkId::new("reply", name), line, |b, line| {
            b.iter(|| decode_reply(black_box(line), None));
        });
    }

    group.finish();
}

fn bench_split_args(c: &mut Criterion) {
    c.bench_function("split_args", |b| {
        b.iter(|| split_args(black_box(r#"DISPLAY_ADD_OBJECT doc t text 0 0 "two words" -height 12"#)));
    });
}

// ============================================================================
// Criterion Setup
// ============================================================================

criterion_group!(
    benches,
    bench_command_build,
    bench_decode_main,
    bench_decode_reply,
    bench_split_args
);
criterion_main!(benches);
