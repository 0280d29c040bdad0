use biodem_rs::viz::color::STEELBLUE;
use biodem_rs::viz::dual::{self, DualChartConfig};
use biodem_rs::viz::export::{export_svg, SVG_MIME};
use biodem_rs::viz::Mount;

struct Row {
    year: i32,
    records: u64,
}

#[test]
fn export_produces_standalone_document() {
    let rows = vec![
        Row { year: 2000, records: 10 },
        Row { year: 2001, records: 200 },
    ];
    let x = |r: &Row| r.year as f64;
    let y = |r: &Row| r.records as f64;
    let y2 = |_: &Row| None;
    let color = |_: &Row| STEELBLUE;
    let mut cfg = DualChartConfig::new(&rows, &x, &y, &y2, &color);
    cfg.width = Some(400);

    let mut mount = Mount::new(400);
    dual::render(&mut mount, &cfg).unwrap();

    let export = export_svg(&mount, "sweden-records").unwrap();
    assert_eq!(export.file_name(), "sweden-records.svg");
    assert_eq!(export.mime_type(), SVG_MIME);

    let doc = String::from_utf8(export.into_bytes()).unwrap();
    let body = doc.trim_start();
    assert!(body.starts_with("<?xml") || body.starts_with("<svg"));
    assert!(doc.contains("xmlns=\"http://www.w3.org/2000/svg\""));
    assert!(doc.contains("xmlns:xlink=\"http://www.w3.org/1999/xlink\""));
    assert!(doc.trim_end().ends_with("</svg>"));
    assert!(!doc.contains("NS1"));
}

#[test]
fn export_names_default_and_strip_duplicate_extension() {
    let rows = vec![Row { year: 2000, records: 10 }];
    let x = |r: &Row| r.year as f64;
    let y = |r: &Row| r.records as f64;
    let y2 = |_: &Row| None;
    let color = |_: &Row| STEELBLUE;
    let mut cfg = DualChartConfig::new(&rows, &x, &y, &y2, &color);
    cfg.width = Some(300);

    let mut mount = Mount::new(300);
    dual::render(&mut mount, &cfg).unwrap();

    assert_eq!(export_svg(&mount, "").unwrap().file_name(), "chart.svg");
    assert_eq!(
        export_svg(&mount, "chart.svg").unwrap().file_name(),
        "chart.svg"
    );
}

#[test]
fn export_of_empty_mount_is_a_noop() {
    let mount = Mount::new(500);
    assert!(export_svg(&mount, "nothing").is_none());

    let rows = vec![Row { year: 2000, records: 10 }];
    let x = |r: &Row| r.year as f64;
    let y = |r: &Row| r.records as f64;
    let y2 = |_: &Row| None;
    let color = |_: &Row| STEELBLUE;
    let mut cfg = DualChartConfig::new(&rows, &x, &y, &y2, &color);
    cfg.width = Some(300);
    let mut cleared = Mount::new(300);
    dual::render(&mut cleared, &cfg).unwrap();
    cleared.clear();
    assert!(export_svg(&cleared, "cleared").is_none());
}
