// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Synthetic capture session for recovery drills
//!
//! Writes generated frames through a real session buffer. With `--no-close`
//! the buffer is abandoned without a `SessionEnd`, exactly as a crash would
//! leave it.

use crate::commands::recover;
use crate::config::Settings;
use anyhow::{bail, Context, Result};
use labcap_core::{AuditLevel, Clock, Metadata, SessionId, SystemClock};
use labcap_storage::{BufferDir, SessionBuffer};
use serde_json::{json, Value};

#[derive(clap::Args)]
pub struct CaptureArgs {
    /// Session id to capture under
    #[arg(long)]
    session: u64,

    /// Number of measurements to write
    #[arg(long, default_value_t = 10)]
    count: u64,

    /// Leave the buffer without a SessionEnd
    #[arg(long)]
    no_close: bool,
}

fn object(value: Value) -> Metadata {
    match value {
        Value::Object(map) => map,
        _ => Metadata::new(),
    }
}

pub async fn handle(args: CaptureArgs, settings: &Settings) -> Result<()> {
    // No new buffer may be created before leftovers are recovered
    let summary = recover::run(settings).await?;
    if !summary.is_clean() {
        eprintln!("warning: {}", summary);
    }

    let clock = SystemClock;
    let session_id = SessionId::new(args.session);
    let dir = BufferDir::open(settings.buffer.clone())?;

    // Anything still on disk for this id was kept by recovery and must survive
    let path = dir.path_for(session_id);
    if path.exists() {
        bail!(
            "buffer for session {} was kept by recovery: {}; move it aside before capturing",
            session_id,
            path.display()
        );
    }
    let mut buffer = SessionBuffer::create(
        &dir,
        session_id,
        clock.now(),
        object(json!({"model": "synthetic", "firmware": env!("CARGO_PKG_VERSION")})),
        object(json!({"source": "labcap capture"})),
    )
    .with_context(|| format!("failed to start session {}", session_id))?;

    for seq in 0..args.count {
        let value = (seq as f64 * 0.25).sin();
        buffer.append_measurement(
            clock.now(),
            seq.to_le_bytes().to_vec(),
            json!({"seq": seq, "value": value}),
            object(json!({"abs": value.abs()})),
        )?;
    }
    buffer.append_audit_event(
        AuditLevel::Info,
        "capture",
        "synthetic capture finished",
        json!({"count": args.count}),
    )?;

    if args.no_close {
        buffer.flush()?;
        println!(
            "Captured {} measurement(s) for session {} (left open)",
            args.count, session_id
        );
        return Ok(());
    }

    buffer.close(clock.now(), buffer.measurements_written())?;
    println!(
        "Captured {} measurement(s) for session {}",
        args.count, session_id
    );
    Ok(())
}
