//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every stored preview is shown by its locator first, with the on-disk path
//! and the steps that produced it as indented context lines:
//!
//! ```text
//! processed-1760000000123-b07e55aa.png → http://localhost:5000/uploads/processed-1760000000123-b07e55aa.png
//!     Source: temp-1760000000000-3fa2c1d9.png
//!     001 modulate brightness 1.20 saturation 1.00
//!     002 contrast ×1.50 offset -64.0
//!     003 rotate 90°
//!     004 resize ≤ 300px
//!     Path: uploads/processed-1760000000123-b07e55aa.png
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::imaging::AdjustStep;
use crate::storage::StoredPreview;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Header line shared by every stored preview.
fn preview_header(stored: &StoredPreview) -> String {
    format!("{} \u{2192} {}", stored.name, stored.url)
}

/// One planned engine step, without index.
pub fn format_step(step: &AdjustStep) -> String {
    match step {
        AdjustStep::Modulate(m) => format!(
            "modulate brightness {:.2} saturation {:.2}",
            m.brightness, m.saturation
        ),
        AdjustStep::Contrast(c) => {
            format!("contrast \u{00d7}{:.2} offset {:.1}", c.factor, c.offset)
        }
        AdjustStep::Rotate(degrees) => format!("rotate {}\u{00b0}", degrees),
        AdjustStep::Resize(constraint) => format!("resize \u{2264} {}px", constraint.max_width),
    }
}

/// Numbered plan lines at the given depth.
pub fn format_plan(steps: &[AdjustStep], depth: usize) -> Vec<String> {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}{} {}", indent(depth), format_index(i + 1), format_step(step)))
        .collect()
}

/// Format the result of `ingest`.
pub fn format_ingest_output(source: &Path, stored: &StoredPreview) -> Vec<String> {
    vec![
        preview_header(stored),
        format!("{}Source: {}", indent(1), source.display()),
        format!("{}Path: {}", indent(1), stored.path.display()),
    ]
}

/// Format the result of `adjust`.
pub fn format_adjust_output(
    locator: &str,
    steps: &[AdjustStep],
    stored: &StoredPreview,
) -> Vec<String> {
    let mut lines = vec![
        preview_header(stored),
        format!("{}Source: {}", indent(1), locator),
    ];
    lines.extend(format_plan(steps, 1));
    lines.push(format!("{}Path: {}", indent(1), stored.path.display()));
    lines
}

/// Format the start-up banner of `serve`.
pub fn format_serve_banner(bind_addr: &str, store_root: &Path, public_base_url: &str) -> Vec<String> {
    vec![
        format!("==> Listening on http://{}", bind_addr),
        format!("{}Store: {}", indent(1), store_root.display()),
        format!(
            "{}Locators: {}{}/",
            indent(1),
            public_base_url.trim_end_matches('/'),
            crate::storage::PUBLIC_MOUNT
        ),
    ]
}

/// Print ingest output to stdout.
pub fn print_ingest_output(source: &Path, stored: &StoredPreview) {
    for line in format_ingest_output(source, stored) {
        println!("{}", line);
    }
}

/// Print adjust output to stdout.
pub fn print_adjust_output(locator: &str, steps: &[AdjustStep], stored: &StoredPreview) {
    for line in format_adjust_output(locator, steps, stored) {
        println!("{}", line);
    }
}

/// Print the serve banner to stdout.
pub fn print_serve_banner(bind_addr: &str, store_root: &Path, public_base_url: &str) {
    for line in format_serve_banner(bind_addr, store_root, public_base_url) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{ContrastStretch, Modulation, PreviewConstraint};
    use std::path::PathBuf;

    fn stored(name: &str) -> StoredPreview {
        StoredPreview {
            name: name.to_string(),
            path: PathBuf::from("uploads").join(name),
            url: format!("http://localhost:5000/uploads/{name}"),
        }
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
    }

    #[test]
    fn format_step_each_kind() {
        let modulate = AdjustStep::Modulate(Modulation {
            brightness: 1.2,
            saturation: 1.0,
        });
        assert_eq!(
            format_step(&modulate),
            "modulate brightness 1.20 saturation 1.00"
        );

        let contrast = AdjustStep::Contrast(ContrastStretch {
            factor: 1.5,
            offset: -64.0,
        });
        assert_eq!(format_step(&contrast), "contrast \u{00d7}1.50 offset -64.0");

        assert_eq!(format_step(&AdjustStep::Rotate(90.0)), "rotate 90\u{00b0}");
        assert_eq!(
            format_step(&AdjustStep::Resize(PreviewConstraint::new(300))),
            "resize \u{2264} 300px"
        );
    }

    #[test]
    fn format_plan_numbers_and_indents() {
        let steps = [
            AdjustStep::Rotate(45.0),
            AdjustStep::Resize(PreviewConstraint::new(300)),
        ];
        let lines = format_plan(&steps, 1);
        assert_eq!(lines, vec![
            "    001 rotate 45\u{00b0}".to_string(),
            "    002 resize \u{2264} 300px".to_string(),
        ]);
    }

    #[test]
    fn ingest_output_header_is_locator() {
        let preview = stored("temp-1760000000000-3fa2c1d9.png");
        let lines = format_ingest_output(Path::new("photo.jpg"), &preview);

        assert_eq!(
            lines[0],
            "temp-1760000000000-3fa2c1d9.png \u{2192} http://localhost:5000/uploads/temp-1760000000000-3fa2c1d9.png"
        );
        assert_eq!(lines[1], "    Source: photo.jpg");
        assert!(lines[2].starts_with("    Path: "));
    }

    #[test]
    fn adjust_output_lists_plan_between_source_and_path() {
        let preview = stored("processed-1760000000123-b07e55aa.png");
        let steps = [AdjustStep::Resize(PreviewConstraint::new(300))];
        let lines = format_adjust_output("temp-1760000000000-3fa2c1d9.png", &steps, &preview);

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "    Source: temp-1760000000000-3fa2c1d9.png");
        assert_eq!(lines[2], "    001 resize \u{2264} 300px");
        assert!(lines[3].starts_with("    Path: "));
    }

    #[test]
    fn serve_banner_shows_locator_prefix() {
        let lines = format_serve_banner(
            "127.0.0.1:5000",
            Path::new("uploads"),
            "http://localhost:5000/",
        );
        assert_eq!(lines[0], "==> Listening on http://127.0.0.1:5000");
        assert_eq!(lines[1], "    Store: uploads");
        assert_eq!(lines[2], "    Locators: http://localhost:5000/uploads/");
    }
}
