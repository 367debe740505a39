use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ctyled::{
    Attrs, Color, ColorCache, ColorDescriptor, Instance, Overrides, PropertySet, ResolveMemo,
    StopInput, Styled, TemplateFragment, ThemeContext, classes, evaluate, merge, resolve_all,
};

fn bench_colors(c: &mut Criterion) {
    let mut group = c.benchmark_group("ctyled/colors");
    let descriptor = ColorDescriptor::new([
        StopInput::from("#1e1e2e"),
        StopInput::at("#89b4fa", 0.6),
        StopInput::from("#cdd6f4"),
    ])
    .with_contrast(0.7);

    group.bench_function("Color::new", |b| {
        b.iter(|| black_box(Color::new(descriptor.clone())));
    });

    let base = Color::new(descriptor.clone()).unwrap_or_default();
    group.bench_function("Color::nudge", |b| {
        b.iter(|| black_box(base.nudge(black_box(0.15))));
    });

    group.bench_function("ColorCache::nudge", |b| {
        let mut cache = ColorCache::default();
        b.iter(|| black_box(cache.nudge(&base, black_box(0.15))));
    });

    group.bench_function("ColorPalette::interpolate", |b| {
        b.iter(|| black_box(base.interpolate(black_box(0.42), false)));
    });

    group.finish();
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("ctyled/resolution");
    let class = classes::core();
    let theme = ThemeContext::from_values(PropertySet::new().with("size", 16));
    let overrides = Overrides::new().set("bg", true).set("gutter", 1);
    let attrs = Attrs::new();

    group.bench_function("resolve_all/core", |b| {
        b.iter(|| black_box(resolve_all(&class, &theme, &overrides, &attrs)));
    });

    group.bench_function("ResolveMemo::resolve/core", |b| {
        let mut memo = ResolveMemo::new();
        b.iter(|| black_box(memo.resolve(&class, &theme, &overrides, &attrs)));
    });

    group.finish();
}

fn bench_templates(c: &mut Criterion) {
    let mut group = c.benchmark_group("ctyled/templates");
    let fragment = TemplateFragment::builder()
        .text("font-size: ")
        .value(|p: &PropertySet, _: &Attrs| p.get("size").clone())
        .text("px; color: ")
        .literal("red")
        .text(";")
        .build();
    let props = PropertySet::new().with("size", 14);
    let attrs = Attrs::new();

    group.bench_function("merge", |b| {
        b.iter(|| black_box(merge(&fragment, &fragment)));
    });

    group.bench_function("evaluate", |b| {
        b.iter(|| black_box(evaluate(&fragment, &props, &attrs)));
    });

    group.finish();
}

fn bench_styled(c: &mut Criterion) {
    let mut group = c.benchmark_group("ctyled/styled");
    let Ok(button) = Styled::new("button", classes::core())
        .and_then(|s| s.class(&classes::inline()))
        .and_then(|s| s.class(&classes::active()))
    else {
        return;
    };
    let theme = ThemeContext::new();
    let instance = Instance::new().overrides(Overrides::new().set("border", true));

    group.bench_function("compute/button", |b| {
        b.iter(|| black_box(button.compute(&theme, &instance)));
    });

    group.bench_function("compute_with/button", |b| {
        let mut memo = ResolveMemo::new();
        b.iter(|| black_box(button.compute_with(&mut memo, &theme, &instance)));
    });

    group.finish();
}

criterion_group!(
    ctyled_benches,
    bench_colors,
    bench_resolution,
    bench_templates,
    bench_styled
);
criterion_main!(ctyled_benches);
