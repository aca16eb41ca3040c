//! Benchmarks for HTML-to-markdown conversion at varying payload sizes.
//!
//! Run with: `cargo bench --bench content_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use url::Url;
use webfetch::content::html::html_to_markdown;
use webfetch::content::ContentRouter;

/// Build an HTML page of roughly `target_bytes`.
///
/// Article blocks (headings, paragraphs, relative links, lists) sit inside
/// page chrome (nav, header, footer, script) so both the pruning pass and
/// the link rewriter have work to do.
fn article_page(target_bytes: usize) -> String {
    const CHROME_TOP: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Bench</title><script>window.track = true;</script></head>
<body>
<header><a href="/">Site</a></header>
<nav><ul><li><a href="/docs">Docs</a></li><li><a href="/blog">Blog</a></li></ul></nav>
<main>
"#;
    const CHROME_BOTTOM: &str = r#"
</main>
<aside>Related posts</aside>
<footer><p>&copy; Bench Corp</p><form><button>Subscribe</button></form></footer>
</body>
</html>"#;

    let blocks = [
        "<h2>Section</h2>\n",
        "<p>Glyph runs carry no whitespace, so words are inferred from spacing. \
         Lines are inferred from baseline jumps between consecutive runs.</p>\n",
        r#"<p>Read <a href="../guide/extraction">the extraction guide</a> or <a href="https://example.org/notes">the format notes</a>.</p>"#,
        "\n<ul><li>first point</li><li>second point</li><li>third point</li></ul>\n",
    ];

    let mut html = String::with_capacity(target_bytes + 1024);
    html.push_str(CHROME_TOP);
    for block in blocks.iter().cycle() {
        if html.len() >= target_bytes {
            break;
        }
        html.push_str(block);
    }
    html.push_str(CHROME_BOTTOM);
    html
}

fn bench_html_to_markdown(c: &mut Criterion) {
    let mut group = c.benchmark_group("html_to_markdown");
    let base = Url::parse("https://example.com/articles/current").unwrap();

    for (size, label) in [(1_024, "1KB"), (10_240, "10KB"), (51_200, "50KB"), (204_800, "200KB")] {
        let html = article_page(size);
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(BenchmarkId::new("convert", label), &html, |b, html| {
            b.iter(|| black_box(html_to_markdown(black_box(html), Some(&base)).unwrap()));
        });
    }

    group.finish();
}

fn bench_router_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("content_router_dispatch");
    let router = ContentRouter::new();
    let page = article_page(10_240);
    let bytes = page.as_bytes();

    for content_type in ["text/html", "text/html; charset=utf-8", "application/xhtml+xml"] {
        group.bench_function(content_type, |b| {
            b.iter(|| black_box(router.convert(black_box(bytes), content_type, None).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_html_to_markdown, bench_router_dispatch);
criterion_main!(benches);
