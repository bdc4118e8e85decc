use crate::toast::{ToastKind, Toaster};
use anyhow::{bail, Context, Result};
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub trait ClipboardWriter: Send + Sync {
    fn write_text(&self, text: &str) -> Result<()>;
}

pub struct SystemClipboard;

impl ClipboardWriter for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new().context("open system clipboard")?;
        clipboard
            .set_text(text.to_string())
            .context("write system clipboard")?;
        Ok(())
    }
}

pub struct HelperClipboard;

#[cfg(target_os = "macos")]
const HELPERS: &[(&str, &[&str])] = &[("pbcopy", &[])];

#[cfg(target_os = "windows")]
const HELPERS: &[(&str, &[&str])] = &[("clip", &[])];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const HELPERS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

impl ClipboardWriter for HelperClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        pipe_into(HELPERS, text)
    }
}

fn pipe_into(helpers: &[(&str, &[&str])], text: &str) -> Result<()> {
    for &(program, args) in helpers {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let Ok(mut child) = child else { continue };
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(text.as_bytes()),
            None => Ok(()),
        };
        let status = child.wait();
        if let Err(e) = written {
            warn!(program, error = %e, "clipboard helper rejected input");
            continue;
        }
        match status {
            Ok(status) if status.success() => return Ok(()),
            Ok(status) => debug!(program, %status, "clipboard helper failed"),
            Err(e) => warn!(program, error = %e, "clipboard helper did not exit"),
        }
    }
    bail!("no clipboard helper available")
}

pub struct Copier {
    primary: Box<dyn ClipboardWriter>,
    fallback: Box<dyn ClipboardWriter>,
    toaster: Arc<Toaster>,
    short_toast: Duration,
}

impl Copier {
    pub fn new(
        primary: Box<dyn ClipboardWriter>,
        fallback: Box<dyn ClipboardWriter>,
        toaster: Arc<Toaster>,
        short_toast: Duration,
    ) -> Self {
        Self {
            primary,
            fallback,
            toaster,
            short_toast,
        }
    }

    pub fn system(toaster: Arc<Toaster>, short_toast: Duration) -> Self {
        Self::new(Box::new(SystemClipboard), Box::new(HelperClipboard), toaster, short_toast)
    }

    pub fn copy(&self, text: &str) -> bool {
        let copied = match self.primary.write_text(text) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "clipboard write failed, trying fallback");
                self.fallback.write_text(text).is_ok()
            }
        };
        if copied {
            self.toaster
                .show("Copied to clipboard", ToastKind::Success, Some(self.short_toast));
        } else {
            self.toaster.error("Could not copy to clipboard");
        }
        copied
    }
}
