mod common;

use common::{config_with_work_dir, write_png, FakeBackend, Mode};
use docshift::{worker, ConversionKind, ConversionRequest, Registry};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[test]
fn background_job_reports_success() {
    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("a.png");
    write_png(&png, 8, 8);
    let out = dir.path().join("a.pdf");
    let reg = Arc::new(Registry::new(
        &config_with_work_dir(dir.path()),
        FakeBackend::new(&png),
    ));

    let job = worker::spawn(
        reg,
        ConversionRequest::new(ConversionKind::Img2Pdf, &png, &out),
    );
    let res = job.wait();
    assert!(res.ok, "{:?}", res.error);
    assert_eq!(res.primary_output(), Some(out.as_path()));
    assert!(out.exists());
}

#[test]
fn background_job_reports_failure_through_polling() {
    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("a.png");
    write_png(&png, 8, 8);
    let reg = Arc::new(Registry::new(
        &config_with_work_dir(dir.path()),
        FakeBackend::new(&png).with_mode(Mode::FailAfterWriting),
    ));

    let mut job = worker::spawn(
        reg,
        ConversionRequest::new(ConversionKind::Img2Txt, &png, dir.path().join("a.txt")),
    );
    let deadline = Instant::now() + Duration::from_secs(10);
    let res = loop {
        if let Some(res) = job.try_result() {
            break res.clone();
        }
        assert!(Instant::now() < deadline, "job never finished");
        std::thread::sleep(Duration::from_millis(10));
    };
    assert!(!res.ok);
    assert!(res.error.unwrap().contains("fake ocr crashed"));
    assert!(!dir.path().join("a.txt").exists());
}

#[test]
fn jobs_run_independently() {
    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("a.png");
    write_png(&png, 8, 8);
    let reg = Arc::new(Registry::new(
        &config_with_work_dir(dir.path()),
        FakeBackend::new(&png),
    ));

    let jobs: Vec<_> = (0..4)
        .map(|i| {
            worker::spawn(
                Arc::clone(&reg),
                ConversionRequest::new(
                    ConversionKind::Img2Txt,
                    &png,
                    dir.path().join(format!("out-{i}.txt")),
                ),
            )
        })
        .collect();
    for job in jobs {
        assert!(job.wait().ok);
    }
    for i in 0..4 {
        assert!(dir.path().join(format!("out-{i}.txt")).exists());
    }
}
