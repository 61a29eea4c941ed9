//! Debug dumps of arbitrary values.

use std::fmt::{Debug, Write};

use http::StatusCode;

use crate::halt::{escape_html, Halt};

/// Where a dump is going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpMode {
    /// Plain text on stdout; execution continues.
    Console,
    /// An HTML fragment that replaces the response; execution stops.
    Web,
}

/// Renders `values` with their pretty `Debug` form.
pub fn render(values: &[&dyn Debug], mode: DumpMode) -> String {
    let mut out = String::new();
    for value in values {
        let text = format!("{value:#?}");
        // Writing to a String cannot fail.
        let _ = match mode {
            DumpMode::Console => writeln!(out, "{text}"),
            DumpMode::Web => writeln!(out, "<pre>{}</pre>", escape_html(&text)),
        };
    }
    out
}

/// Dumps `values`.
///
/// In console mode the output is printed and `Ok(())` returned. In web mode
/// nothing is printed; the rendered fragment comes back as a [`Halt`] that
/// the request loop writes as the whole response.
pub fn dump(values: &[&dyn Debug], mode: DumpMode) -> Result<(), Halt> {
    let rendered = render(values, mode);
    match mode {
        DumpMode::Console => {
            print!("{rendered}");
            Ok(())
        }
        DumpMode::Web => {
            tracing::debug!(count = values.len(), "dump halted request");
            Err(Halt::html(StatusCode::OK, rendered))
        }
    }
}
