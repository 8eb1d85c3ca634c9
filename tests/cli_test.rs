use image::{Rgba, RgbaImage};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn mattekey(args: &[&Path]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mattekey"))
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn combined_log(output: &Output) -> String {
    let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
    log.push_str(&String::from_utf8_lossy(&output.stderr));
    log
}

fn write_render(path: &Path) {
    let mut image = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 255, 255]));
    image.put_pixel(1, 1, Rgba([0, 255, 0, 255]));
    image.save(path).unwrap();
}

#[test]
fn batch_continues_past_a_corrupt_input() {
    let dir = TempDir::new().unwrap();
    let bad = dir.path().join("bad.png");
    let good = dir.path().join("good.png");
    let out_dir = dir.path().join("keyed");
    std::fs::write(&bad, b"not really a png").unwrap();
    write_render(&good);

    let output = mattekey(&[&bad, &good, Path::new("-d"), &out_dir]);
    let log = combined_log(&output);

    assert_eq!(output.status.code(), Some(1), "log:\n{log}");
    assert!(!out_dir.join("bad.png").exists());

    let keyed = image::open(out_dir.join("good.png")).unwrap().into_rgba8();
    assert_eq!(*keyed.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    assert_eq!(*keyed.get_pixel(1, 1), Rgba([0, 255, 0, 255]));

    assert!(log.contains("1 processed, 1 failed"), "log:\n{log}");
    assert!(log.contains("bad.png"), "log:\n{log}");
}

#[test]
fn clean_batch_exits_zero() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("render.png");
    let output_path = dir.path().join("render_keyed.png");
    write_render(&input);

    let output = mattekey(&[&input, Path::new("-o"), &output_path]);

    assert!(output.status.success(), "log:\n{}", combined_log(&output));
    assert!(output_path.exists());
}

#[test]
fn colliding_stems_abort_before_writing() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("one")).unwrap();
    std::fs::create_dir_all(dir.path().join("two")).unwrap();
    let first = dir.path().join("one/shot.png");
    let second = dir.path().join("two/shot.png");
    let out_dir = dir.path().join("keyed");
    write_render(&first);
    write_render(&second);

    let output = mattekey(&[&first, &second, Path::new("-d"), &out_dir]);

    assert_eq!(output.status.code(), Some(1));
    assert!(!out_dir.exists());
    assert!(combined_log(&output).contains("would overwrite"));
}

#[test]
fn unwritable_output_directory_is_named() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("render.png");
    let blocker = dir.path().join("blocker");
    write_render(&input);
    std::fs::write(&blocker, b"a file, not a directory").unwrap();
    let out_dir = blocker.join("keyed");

    let output = mattekey(&[&input, Path::new("-d"), &out_dir]);
    let log = combined_log(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(log.contains("failed to create output directory"), "log:\n{log}");
    assert!(log.contains(&out_dir.display().to_string()), "log:\n{log}");
}

#[test]
fn nameless_input_is_counted_and_skipped() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.png");
    let out_dir = dir.path().join("keyed");
    write_render(&good);

    let output = mattekey(&[&dir.path().join(".."), &good, Path::new("-d"), &out_dir]);
    let log = combined_log(&output);

    assert_eq!(output.status.code(), Some(1), "log:\n{log}");
    assert!(out_dir.join("good.png").exists());
    assert!(log.contains("1 processed, 1 failed"), "log:\n{log}");
}

#[test]
fn despill_can_be_disabled() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("tinted.png");
    let output_path = dir.path().join("tinted_keyed.png");
    RgbaImage::from_pixel(1, 1, Rgba([128, 64, 128, 255]))
        .save(&input)
        .unwrap();

    let output = mattekey(&[&input, Path::new("-o"), &output_path, Path::new("--no-despill")]);
    assert!(output.status.success(), "log:\n{}", combined_log(&output));

    let keyed = image::open(&output_path).unwrap().into_rgba8();
    assert_eq!(*keyed.get_pixel(0, 0), Rgba([128, 64, 128, 255]));
}
