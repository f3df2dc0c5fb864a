// tests/skip_logging.rs

//! Skipped checks leave no result file, so the log is the only trace.
//!
//! Kept in its own test binary: it installs a global subscriber, which the
//! worker threads log through.

mod common;

use common::*;
use installcheck::{FetchMode, InstallCheck};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_skip_is_logged() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .init();

    let mut server = mockito::Server::new();
    let _urepo = serve_urepo_main(&mut server);
    let _debian = debian_main_not_found(&mut server);

    let ws = Workspace::new();
    let script = ws.solver_script("exit 1\n");
    let config = single_dependency_config(&server, &script);

    let summary = InstallCheck::new(&config, ws.options(FetchMode::Download))
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(summary.skipped.len(), 1);
    assert!(dir_entries(&ws.outdir()).is_empty());

    let output = logs.contents();
    assert!(
        output.contains(
            "Skipping dist urepo/sid/main/amd64 due to unavailable dependency debian/sid/main/amd64"
        ),
        "log output was: {output}"
    );
    assert!(output.contains("[SKIPPED] urepo/sid/main/amd64"));
}
