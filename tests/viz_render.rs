use biodem_rs::stats::AggregatedGroup;
use biodem_rs::viz::brush::{self, BrushChartConfig};
use biodem_rs::viz::bubble::{self, BubbleChartConfig};
use biodem_rs::viz::color::STEELBLUE;
use biodem_rs::viz::dual::{self, DualChartConfig};
use biodem_rs::viz::{Layout, Mount};
use std::collections::BTreeMap;

struct Row {
    year: i32,
    records: u64,
    indicator: Option<f64>,
}

fn sample_rows() -> Vec<Row> {
    vec![
        Row { year: 2000, records: 100, indicator: Some(0.2) },
        Row { year: 2001, records: 0, indicator: Some(0.5) },
        Row { year: 2002, records: 2500, indicator: None },
        Row { year: 2003, records: 40, indicator: Some(0.9) },
    ]
}

fn upper(s: &str) -> String {
    s.to_ascii_uppercase()
}

#[test]
fn dual_chart_draws_zero_count_bars_at_log_floor() {
    let rows = vec![
        Row { year: 2000, records: 100, indicator: None },
        Row { year: 2001, records: 0, indicator: None },
    ];
    let x = |r: &Row| r.year as f64;
    let y = |r: &Row| r.records as f64;
    let y2 = |r: &Row| r.indicator;
    let color = |_: &Row| STEELBLUE;
    let mut cfg = DualChartConfig::new(&rows, &x, &y, &y2, &color);
    cfg.width = Some(600);
    cfg.height = 300;
    cfg.y_min = Some(1.0);

    let mut mount = Mount::new(600);
    dual::render(&mut mount, &cfg).unwrap();
    let svg = upper(mount.svg().unwrap());

    // Both years produce a bar; the zero-count year is not omitted.
    assert_eq!(svg.matches("#4682B4").count(), 2, "expected two bars");
    // The zero-count bar sits at the log floor: clamped to 1, which maps to
    // the bottom of the plot, i.e. a zero-height rectangle.
    assert!(svg.contains("HEIGHT=\"0\""), "zero bar missing: {}", svg);
}

#[test]
fn dual_chart_rerender_is_idempotent() {
    let rows = sample_rows();
    let x = |r: &Row| r.year as f64;
    let y = |r: &Row| r.records as f64;
    let y2 = |r: &Row| r.indicator;
    let color = |_: &Row| STEELBLUE;
    let mut cfg = DualChartConfig::new(&rows, &x, &y, &y2, &color);
    cfg.width = Some(800);
    cfg.title = "Sweden".into();

    let mut mount = Mount::new(800);
    dual::render(&mut mount, &cfg).unwrap();
    let first = mount.svg().unwrap().to_string();
    dual::render(&mut mount, &cfg).unwrap();
    let second = mount.svg().unwrap().to_string();
    // Full replace: no stale elements accumulate across calls.
    assert_eq!(first, second);
}

#[test]
fn dual_chart_fetching_flag_renders_neutral_bars() {
    let rows = sample_rows();
    let x = |r: &Row| r.year as f64;
    let y = |r: &Row| r.records as f64;
    let y2 = |r: &Row| r.indicator;
    let color = |_: &Row| STEELBLUE;
    let mut cfg = DualChartConfig::new(&rows, &x, &y, &y2, &color);
    cfg.width = Some(800);
    cfg.fetching = true;

    let mut mount = Mount::new(800);
    dual::render(&mut mount, &cfg).unwrap();
    let svg = upper(mount.svg().unwrap());
    assert_eq!(svg.matches("#4682B4").count(), 0);
    assert_eq!(svg.matches("#AAAAAA").count(), rows.len());
}

#[test]
fn dual_chart_breaks_line_at_missing_values() {
    let rows = sample_rows();
    let x = |r: &Row| r.year as f64;
    let y = |r: &Row| r.records as f64;
    let y2 = |r: &Row| r.indicator;
    let color = |_: &Row| STEELBLUE;
    let mut cfg = DualChartConfig::new(&rows, &x, &y, &y2, &color);
    cfg.width = Some(800);

    let mut mount = Mount::new(800);
    dual::render(&mut mount, &cfg).unwrap();
    let svg = upper(mount.svg().unwrap());
    // Three present indicator values, but 2002 is missing, so the line has
    // one 2-point segment (2000-2001) and three markers.
    assert_eq!(svg.matches("#FF0000").count(), 1 + 3);
}

#[test]
fn dual_chart_uses_mount_width_when_unspecified() {
    let rows = sample_rows();
    let x = |r: &Row| r.year as f64;
    let y = |r: &Row| r.records as f64;
    let y2 = |r: &Row| r.indicator;
    let color = |_: &Row| STEELBLUE;
    let cfg = DualChartConfig::new(&rows, &x, &y, &y2, &color);

    let mut mount = Mount::new(640);
    dual::render(&mut mount, &cfg).unwrap();
    assert!(mount.svg().unwrap().contains("width=\"640\""));
}

#[test]
fn dual_chart_rejects_empty_data() {
    let rows: Vec<Row> = vec![];
    let x = |r: &Row| r.year as f64;
    let y = |r: &Row| r.records as f64;
    let y2 = |r: &Row| r.indicator;
    let color = |_: &Row| STEELBLUE;
    let cfg = DualChartConfig::new(&rows, &x, &y, &y2, &color);
    let mut mount = Mount::new(800);
    assert!(dual::render(&mut mount, &cfg).is_err());
}

fn group(country: &str, stats: &[(&str, f64)]) -> AggregatedGroup {
    AggregatedGroup {
        country: country.into(),
        stats: stats
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect::<BTreeMap<_, _>>(),
    }
}

fn sample_groups() -> Vec<AggregatedGroup> {
    vec![
        group("AFG", &[("x", 0.2), ("y", 2_000.0), ("pop", 9.0e6), ("code", 0.0)]),
        group("DEU", &[("x", 0.9), ("y", 45_000.0), ("pop", 8.0e7), ("code", 3.0)]),
        group("SWE", &[("x", 0.8), ("y", 52_000.0), ("pop", 1.0e7), ("code", 3.0)]),
    ]
}

#[test]
fn bubble_chart_renders_one_point_per_group() {
    let groups = sample_groups();
    let x = |g: &AggregatedGroup| g.stat("x").unwrap_or(0.0);
    let y = |g: &AggregatedGroup| g.stat("y").unwrap_or(0.0);
    let r = |g: &AggregatedGroup| g.stat("pop").unwrap_or(0.0);
    let code = |g: &AggregatedGroup| g.stat("code").unwrap_or(f64::NAN);
    let mut cfg = BubbleChartConfig::new(&groups, &x, &y, &r, &code);
    cfg.width = Some(800);
    cfg.y_log = true;

    let mut mount = Mount::new(800);
    bubble::render(&mut mount, &cfg).unwrap();

    let layout = match &mount.rendered().unwrap().layout {
        Layout::Bubble(l) => l.clone(),
        other => panic!("unexpected layout {:?}", other),
    };
    assert_eq!(layout.points.len(), 3);
    // Largest magnitude drawn first.
    assert_eq!(layout.points[0].key, "DEU");
}

#[test]
fn bubble_chart_click_hits_topmost_point() {
    let groups = sample_groups();
    let x = |g: &AggregatedGroup| g.stat("x").unwrap_or(0.0);
    let y = |g: &AggregatedGroup| g.stat("y").unwrap_or(0.0);
    let r = |g: &AggregatedGroup| g.stat("pop").unwrap_or(0.0);
    let code = |g: &AggregatedGroup| g.stat("code").unwrap_or(f64::NAN);
    let mut cfg = BubbleChartConfig::new(&groups, &x, &y, &r, &code);
    cfg.width = Some(800);

    let mut mount = Mount::new(800);
    bubble::render(&mut mount, &cfg).unwrap();
    let layout = match &mount.rendered().unwrap().layout {
        Layout::Bubble(l) => l.clone(),
        other => panic!("unexpected layout {:?}", other),
    };

    for p in &layout.points {
        let hit = bubble::hit_test(&layout, p.cx, p.cy);
        assert_eq!(hit, Some(p.key.as_str()));
    }
    assert_eq!(bubble::hit_test(&layout, 1.0, 1.0), None);
}

#[test]
fn bubble_chart_selection_and_rerender_are_stable() {
    let groups = sample_groups();
    let x = |g: &AggregatedGroup| g.stat("x").unwrap_or(0.0);
    let y = |g: &AggregatedGroup| g.stat("y").unwrap_or(0.0);
    let r = |g: &AggregatedGroup| g.stat("pop").unwrap_or(0.0);
    let code = |g: &AggregatedGroup| g.stat("code").unwrap_or(f64::NAN);
    let mut cfg = BubbleChartConfig::new(&groups, &x, &y, &r, &code);
    cfg.width = Some(800);
    cfg.selected = Some("SWE".into());

    let mut mount = Mount::new(800);
    bubble::render(&mut mount, &cfg).unwrap();
    let first = mount.svg().unwrap().to_string();
    bubble::render(&mut mount, &cfg).unwrap();
    assert_eq!(first, mount.svg().unwrap());

    // The selection stroke adds one extra circle element.
    let mut unselected_cfg = BubbleChartConfig::new(&groups, &x, &y, &r, &code);
    unselected_cfg.width = Some(800);
    let mut other = Mount::new(800);
    bubble::render(&mut other, &unselected_cfg).unwrap();
    let circles = |s: &str| s.matches("<circle").count();
    assert_eq!(
        circles(&first),
        circles(other.svg().unwrap()) + 1
    );
}

#[test]
fn bubble_tooltip_contains_name_region_and_magnitude() {
    let g = group("SWE", &[("pop", 1_234_567.0)]);
    let tip = bubble::tooltip(&g, Some("Sweden"), Some("Western Europe"), "pop");
    assert!(tip.contains("<b>Sweden</b>"));
    assert!(tip.contains("Western Europe"));
    assert!(tip.contains("1,234,567"));

    // Falls back to the group key without joined metadata.
    let bare = bubble::tooltip(&g, None, None, "pop");
    assert!(bare.contains("<b>SWE</b>"));
}

#[test]
fn brush_strip_renders_selection_rectangle() {
    let rows = sample_rows();
    let x = |r: &Row| r.year as f64;
    let y = |r: &Row| r.records as f64;
    let mut cfg = BrushChartConfig::new(&rows, &x, &y);
    cfg.width = Some(600);
    cfg.selection = Some(biodem_rs::models::YearRange::new(2001, 2002));

    let mut mount = Mount::new(600);
    brush::render(&mut mount, &cfg).unwrap();
    let with_sel = mount.svg().unwrap().to_string();

    let mut cfg_none = BrushChartConfig::new(&rows, &x, &y);
    cfg_none.width = Some(600);
    let mut other = Mount::new(600);
    brush::render(&mut other, &cfg_none).unwrap();
    let without_sel = other.svg().unwrap().to_string();

    let rects = |s: &str| s.matches("<rect").count();
    assert_eq!(rects(&with_sel), rects(&without_sel) + 2);
}
