//! CLI integration tests for `stx info` and `stx export`.
//!
//! Covers structure printing (text and JSON), frame export with scaling and
//! filters, and the distinct exit code for PNGs without Stax data.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::{Rgba, RgbaImage};
use stax::encode;
use stax::models::{Animation, Frame, Slice, Stack, Stax};

/// Get the path to the stx binary.
fn stx_binary() -> PathBuf {
    let release = Path::new("target/release/stx");
    if release.exists() {
        return release.to_path_buf();
    }
    let debug = Path::new("target/debug/stx");
    if debug.exists() {
        return debug.to_path_buf();
    }
    panic!("stx binary not found. Run 'cargo build' first.");
}

/// Run stx with the given arguments and return (stdout, stderr, exit code).
fn run_stx(args: &[&str]) -> (String, String, Option<i32>) {
    let output = Command::new(stx_binary())
        .args(args)
        .output()
        .expect("Failed to execute stx");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.code())
}

/// Write a 2-frame, 1-slice-deep test sheet into the tempdir: 8x8 slices,
/// frame 0 solid red, frame 1 solid blue, stacked vertically.
fn create_test_sheet(dir: &tempfile::TempDir) -> PathBuf {
    let stax = Stax {
        slice_width: 8,
        slice_height: 8,
        stacks: vec![Stack {
            name: "base".to_string(),
            slice_count: 1,
            animations: vec![Animation {
                name: "blink".to_string(),
                frame_time: 30,
                frames: vec![
                    Frame {
                        slices: vec![Slice { x: 0, y: 0, shading: 0 }],
                    },
                    Frame {
                        slices: vec![Slice { x: 0, y: 8, shading: 0 }],
                    },
                ],
            }],
        }],
    };
    let sheet = RgbaImage::from_fn(8, 16, |_, y| {
        if y < 8 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 255])
        }
    });
    let bytes = encode::write_sheet(&sheet, &stax).unwrap();
    let path = dir.path().join("sheet.png");
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Write a PNG without any Stax data into the tempdir.
fn create_plain_png(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("plain.png");
    RgbaImage::new(4, 4).save(&path).unwrap();
    path
}

#[test]
fn test_info_prints_structure() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = create_test_sheet(&dir);

    let (stdout, _, code) = run_stx(&["info", sheet.to_str().unwrap()]);
    assert_eq!(code, Some(0));
    assert!(stdout.contains("slice size: 8x8"));
    assert!(stdout.contains("stack \"base\" (1 slices)"));
    assert!(stdout.contains("animation \"blink\" (2 frames, frame time 30)"));
}

#[test]
fn test_info_json_is_parseable() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = create_test_sheet(&dir);

    let (stdout, _, code) = run_stx(&["info", sheet.to_str().unwrap(), "--json"]);
    assert_eq!(code, Some(0));
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["slice_width"], 8);
    assert_eq!(value["stacks"][0]["animations"][0]["frames"][1]["slices"][0]["y"], 8);
}

#[test]
fn test_info_plain_png_uses_distinct_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let plain = create_plain_png(&dir);

    let (_, stderr, code) = run_stx(&["info", plain.to_str().unwrap()]);
    assert_eq!(code, Some(3));
    assert!(stderr.contains("No Stax data"));
}

#[test]
fn test_info_missing_file_is_invalid_args() {
    let (_, stderr, code) = run_stx(&["info", "does_not_exist.png"]);
    assert_eq!(code, Some(2));
    assert!(stderr.contains("Cannot open input file"));
}

#[test]
fn test_export_writes_each_frame() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = create_test_sheet(&dir);
    let out = dir.path().join("out");

    let (stdout, _, code) = run_stx(&[
        "export",
        sheet.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);
    assert_eq!(code, Some(0));
    assert_eq!(stdout.matches("Saved").count(), 2);

    let frame0 = image::open(out.join("base_blink_000.png")).unwrap().to_rgba8();
    let frame1 = image::open(out.join("base_blink_001.png")).unwrap().to_rgba8();
    assert_eq!(*frame0.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
    assert_eq!(*frame1.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
}

#[test]
fn test_export_scale_factor() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = create_test_sheet(&dir);
    let out = dir.path().join("scaled");

    let (_, _, code) = run_stx(&[
        "export",
        sheet.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--scale",
        "4",
    ]);
    assert_eq!(code, Some(0));
    let frame0 = image::open(out.join("base_blink_000.png")).unwrap().to_rgba8();
    assert_eq!(frame0.dimensions(), (32, 32));
}

#[test]
fn test_export_unknown_stack_fails() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = create_test_sheet(&dir);

    let (_, stderr, code) = run_stx(&["export", sheet.to_str().unwrap(), "--stack", "nope"]);
    assert_eq!(code, Some(1));
    assert!(stderr.contains("No stack named 'nope'"));
}

#[test]
fn test_export_animation_filter() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = create_test_sheet(&dir);
    let out = dir.path().join("filtered");

    let (stdout, _, code) = run_stx(&[
        "export",
        sheet.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--stack",
        "base",
        "--animation",
        "blink",
    ]);
    assert_eq!(code, Some(0));
    assert_eq!(stdout.matches("Saved").count(), 2);
}
