use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use escape_reader::{StrSource, UnicodeEscapeReader};

fn translate(input: &str) -> String {
    let mut reader = UnicodeEscapeReader::new(StrSource::new(input));
    let mut out = String::with_capacity(input.len());
    reader.read_to_string(&mut out).unwrap();
    out
}

fn bench_translate(c: &mut Criterion) {
    let plain_text = "def greet(name) { println \"hello, ${name}\" }\n".repeat(2000);
    let escaped_text = r#"def s = "\u0063\u0061\u0066\u00e9 \uuu4f60\u597D";"#.repeat(2000);
    let mixed_text = "let path = \"C:\\\\temp\\\\new\"; // \\u00e9 \\n\n".repeat(2000);

    let mut group = c.benchmark_group("translate");

    group.throughput(Throughput::Bytes(plain_text.len() as u64));
    group.bench_function("plain_100kb", |b| b.iter(|| translate(&plain_text)));

    group.throughput(Throughput::Bytes(escaped_text.len() as u64));
    group.bench_function("escaped", |b| b.iter(|| translate(&escaped_text)));

    group.throughput(Throughput::Bytes(mixed_text.len() as u64));
    group.bench_function("mixed_backslashes", |b| b.iter(|| translate(&mixed_text)));

    group.finish();
}

criterion_group!(benches, bench_translate);
criterion_main!(benches);
