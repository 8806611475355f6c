// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Console logging for programs using the codec, enabled by the `console-logging` feature.

use std::{
    fmt,
    io::Write,
    sync::atomic::{AtomicBool, Ordering},
};

use env_logger::{fmt::Color, Builder};

struct Pad<T> {
    value: T,
    width: usize,
}

impl<T: fmt::Display> fmt::Display for Pad<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{: <width$}", self.value, width = self.width)
    }
}

fn level_color(level: log::Level) -> Color {
    match level {
        log::Level::Error => Color::Red,
        log::Level::Warn => Color::Yellow,
        log::Level::Info => Color::Cyan,
        log::Level::Debug => Color::Green,
        log::Level::Trace => Color::Ansi256(8),
    }
}

/// Initialises console logging. Filtering comes from the `RUST_OPCUA_LOG` environment variable
/// rather than `RUST_LOG` so output from other tools does not get mixed in. Calling this more
/// than once has no further effect.
pub fn init() {
    lazy_static! {
        static ref INITIALISED: AtomicBool = AtomicBool::new(false);
    }

    if !INITIALISED.swap(true, Ordering::Relaxed) {
        let mut builder = Builder::from_env("RUST_OPCUA_LOG");
        builder.format(|f, record| {
            let time_fmt = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");

            let mut style = f.style();
            style.set_color(level_color(record.level()));
            let level = style.value(Pad {
                value: record.level(),
                width: 5,
            });

            let mut style = f.style();
            let target = style.set_bold(true).value(Pad {
                value: record.target(),
                width: 40,
            });

            writeln!(f, "{} {} {} {}", time_fmt, level, target, record.args())
        });
        // Another logger may already be installed by the host program
        if builder.try_init().is_ok() {
            info!("Logging is enabled, use RUST_OPCUA_LOG environment variable to control filtering, logging level");
        }
    }
}
