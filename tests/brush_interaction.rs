use biodem_rs::models::YearRange;
use biodem_rs::viz::brush::{self, BrushChartConfig, BrushInteraction};
use biodem_rs::viz::{Layout, Mount};
use std::time::{Duration, Instant};

struct Row {
    year: i32,
    total: f64,
}

fn layout_for(years: std::ops::RangeInclusive<i32>) -> brush::BrushLayout {
    let rows: Vec<Row> = years
        .map(|year| Row { year, total: 10.0 + year as f64 })
        .collect();
    let x = |r: &Row| r.year as f64;
    let y = |r: &Row| r.total;
    let mut cfg = BrushChartConfig::new(&rows, &x, &y);
    cfg.width = Some(600);
    let mut mount = Mount::new(600);
    brush::render(&mut mount, &cfg).unwrap();
    match &mount.rendered().unwrap().layout {
        Layout::Brush(l) => l.clone(),
        other => panic!("unexpected layout {:?}", other),
    }
}

#[test]
fn drag_reports_whole_year_ranges() {
    let layout = layout_for(2000..=2010);
    let plot = layout.plot;
    let x_at = |year: f64| layout.x_linear.map(year);

    let mut brush = BrushInteraction::new(layout.clone(), Duration::from_millis(100));
    assert_eq!(brush.selection(), YearRange::new(2000, 2010));

    let t0 = Instant::now();
    brush.pointer_down(x_at(2002.4));
    // First move emits immediately, floored/ceiled to whole years.
    let first = brush.pointer_move(x_at(2005.6), t0).unwrap();
    assert_eq!(first, YearRange::new(2002, 2006));
    assert!(brush.is_dragging());

    // Pixels outside the plot clamp to the domain edge.
    brush.pointer_move(plot.right() + 500.0, t0 + Duration::from_millis(10));
    let fin = brush.pointer_up().unwrap();
    assert_eq!(fin, YearRange::new(2002, 2010));
    assert!(!brush.is_dragging());
}

#[test]
fn rapid_updates_within_one_window_deliver_first_and_final_only() {
    let layout = layout_for(1960..=2018);
    let x_at = |year: f64| layout.x_linear.map(year);

    let mut brush = BrushInteraction::new(layout.clone(), Duration::from_millis(100));
    let t0 = Instant::now();
    brush.pointer_down(x_at(1970.0));

    let mut delivered = Vec::new();
    for (i, year) in [1975.0, 1980.0, 1985.0, 1990.0].iter().enumerate() {
        let now = t0 + Duration::from_millis(5 * (i as u64 + 1));
        if let Some(sel) = brush.pointer_move(x_at(*year), now) {
            delivered.push(sel);
        }
    }
    if let Some(sel) = brush.pointer_up() {
        delivered.push(sel);
    }

    // Only the first update and the final dragged position came through.
    assert_eq!(
        delivered,
        vec![YearRange::new(1970, 1975), YearRange::new(1970, 1990)]
    );
}

#[test]
fn pointer_up_does_not_repeat_an_already_delivered_state() {
    let layout = layout_for(2000..=2010);
    let x_at = |year: f64| layout.x_linear.map(year);

    let mut brush = BrushInteraction::new(layout.clone(), Duration::from_millis(50));
    let t0 = Instant::now();
    brush.pointer_down(x_at(2001.0));
    let emitted = brush.pointer_move(x_at(2004.0), t0);
    assert!(emitted.is_some());
    // No further movement: release has nothing new to say.
    assert_eq!(brush.pointer_up(), None);
}

#[test]
fn moves_without_a_drag_are_ignored() {
    let layout = layout_for(2000..=2010);
    let mut brush = BrushInteraction::new(layout, Duration::from_millis(50));
    assert_eq!(brush.pointer_move(300.0, Instant::now()), None);
    assert_eq!(brush.pointer_up(), None);
}
