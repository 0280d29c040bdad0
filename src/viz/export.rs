//! Export a rendered chart as a standalone downloadable SVG document.

use crate::viz::Mount;
use anyhow::{Context, Result};
use std::path::Path;

/// MIME type of exported documents.
pub const SVG_MIME: &str = "image/svg+xml";

/// A standalone exported document.
///
/// The handle owns the serialized bytes; dropping it is the release.
/// Ownership guarantees the release happens exactly once per export.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgExport {
    file_name: String,
    bytes: Vec<u8>,
}

impl SvgExport {
    /// Deterministic file-name suggestion derived from the export hint.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &'static str {
        SVG_MIME
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Write the document to disk, e.g. from the CLI.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, &self.bytes).with_context(|| format!("write {}", path.display()))
    }
}

/// Serialize the mount's current graphic into a standalone document.
///
/// Returns `None` when nothing has been rendered at the mount: an export
/// with no graphic degrades to a no-op rather than an error.
pub fn export_svg(mount: &Mount, name_hint: &str) -> Option<SvgExport> {
    let svg = mount.svg()?;
    let normalized = normalize_svg(svg);
    let stem = if name_hint.is_empty() { "chart" } else { name_hint };
    Some(SvgExport {
        file_name: format!("{}.svg", stem.trim_end_matches(".svg")),
        bytes: normalized.into_bytes(),
    })
}

/// Turn a serialized SVG fragment into a valid freestanding document.
///
/// Three repairs, all observed on real serializer output:
/// - inject the `xmlns`/`xmlns:xlink` declarations a live tree inherits from
///   its host document but a standalone file must carry itself;
/// - truncate trailing content after the closing root tag;
/// - rewrite the engine-internal `NS1` token some serializers substitute for
///   the XLink prefix back to `xlink:`.
pub fn normalize_svg(svg: &str) -> String {
    let mut out = svg.trim_start().to_string();

    // Anything after the closing root tag is serializer debris.
    if let Some(pos) = out.find("</svg>") {
        out.truncate(pos + "</svg>".len());
    }

    // Namespace-prefix corruption: `xmlns:NS1="" NS1:xlink:href=...`.
    out = out.replace("xmlns:NS1=\"\"", "");
    out = out.replace("NS1:xlink:href", "xlink:href");

    // Root element namespace declarations. The root tag is located
    // explicitly so an XML declaration ahead of it is left untouched.
    if let Some(svg_start) = out.find("<svg") {
        if let Some(rel_end) = out[svg_start..].find('>') {
            let tag_end = svg_start + rel_end;
            let root_tag = &out[svg_start..tag_end];
            let mut inject = String::new();
            if !root_tag.contains("xmlns=") {
                inject.push_str(" xmlns=\"http://www.w3.org/2000/svg\"");
            }
            if !root_tag.contains("xmlns:xlink=") {
                inject.push_str(" xmlns:xlink=\"http://www.w3.org/1999/xlink\"");
            }
            if !inject.is_empty() {
                let insert_at = if root_tag.ends_with('/') {
                    tag_end - 1
                } else {
                    tag_end
                };
                out.insert_str(insert_at, &inject);
            }
        }
    }
    out
}
