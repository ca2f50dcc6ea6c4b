use crate::CliContext;
use chrono::{Local, TimeDelta};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::Duration;
use waystone_core::client_log::Reader;
use waystone_core::tracker::{MapInstance, SnapshotOutcome, XpSource};
use waystone_core::xp_table;

/// Bootstrap from the given log file and start tailing it.
pub async fn follow_log(path: &str, ctx: &CliContext) {
    let path_buf = PathBuf::from(path);
    if !path_buf.is_file() {
        println!("No such file: {}", path);
        return;
    }

    // Stop any current tailing task
    if let Some(active_tail) = ctx.tasks.lock().await.log_tail.take() {
        active_tail.abort();
    }

    let (line_limit, poll_ms) = {
        let config = ctx.config.read().await;
        (config.bootstrap_line_limit, config.tail_poll_ms)
    };

    let session = ctx.session();
    {
        let mut s = session.write().await;
        s.active_file = Some(path_buf.clone());
        s.current_byte = None;
    }

    let reader = Reader::from(path_buf.clone(), Arc::clone(&session))
        .with_tail_poll(Duration::from_millis(poll_ms));

    match reader.bootstrap_log_file(line_limit).await {
        Ok(result) => println!(
            "replayed {} of {} trailing lines from {}",
            result.lines_replayed,
            result.lines_scanned,
            path_buf.display()
        ),
        Err(e) => {
            println!("bootstrap failed: {}", e);
            return;
        }
    }

    println!("Beginning file tail: {}", path_buf.display());
    let handle = tokio::spawn(async move {
        if let Err(e) = reader.tail_log_file().await {
            tracing::error!(%e, "log tail stopped");
        }
    });
    ctx.tasks.lock().await.log_tail = Some(handle);
}

pub async fn show_status(ctx: &CliContext) {
    let session = ctx.session();
    let s = session.read().await;

    match s.current_map() {
        Some(map) => {
            let now = Local::now().naive_local();
            let place = if map.in_hideout() { "hideout" } else { "map" };
            println!(
                "{} (level {}, seed {}) - in {}",
                map.display_name(),
                map.area_level,
                map.seed,
                place
            );
            println!(
                "  active {}  load {}  hideout {}  pause {}",
                fmt_duration(map.span.active_time(now)),
                fmt_duration(map.span.load_time()),
                fmt_duration(map.span.hideout_time()),
                fmt_duration(map.span.pause_time()),
            );
            println!("  xp gained {}  ({:.0}/h)", map.xp_gained, map.xp_per_hour);
        }
        None => println!("No active map"),
    }

    if let Some(snapshot) = s.recent_snapshots().newest() {
        let level = xp_table::level_from_xp(snapshot.xp);
        println!(
            "last xp: {} (level {}, {:.1}% into level)",
            snapshot.xp,
            level,
            xp_table::level_progress(snapshot.xp) * 100.0
        );
    }
}

pub async fn list_maps(ctx: &CliContext) {
    let session = ctx.session();
    let s = session.read().await;

    if s.recent_maps().is_empty() {
        println!("No completed maps yet");
        return;
    }

    println!(
        "{:<30} {:>5} {:>10} {:>12} {:>10}",
        "Map", "Lvl", "Active", "XP gained", "XP/h"
    );
    println!("{}", "-".repeat(72));
    for map in s.recent_maps().iter_newest_first() {
        println!(
            "{:<30} {:>5} {:>10} {:>12} {:>10.0}",
            map.display_name(),
            map.area_level,
            fmt_duration(active_time_of(map)),
            map.xp_gained,
            map.xp_per_hour
        );
    }
    println!("\nTotal: {} maps", s.recent_maps().len());
}

pub async fn list_snapshots(ctx: &CliContext) {
    let session = ctx.session();
    let s = session.read().await;

    if s.recent_snapshots().is_empty() {
        println!("No XP snapshots yet");
        return;
    }

    println!("{:<20} {:>14} {:>10} {:>8}", "Time", "XP", "Delta", "Source");
    println!("{}", "-".repeat(56));
    for snapshot in s.recent_snapshots().iter_newest_first() {
        println!(
            "{:<20} {:>14} {:>10} {:>8}",
            snapshot.timestamp.format("%Y-%m-%d %H:%M:%S"),
            snapshot.xp,
            snapshot.delta,
            source_label(snapshot.source)
        );
    }
}

/// Manual debug snapshot, timestamped now.
pub async fn take_xp_snapshot(ctx: &CliContext, xp: u64) {
    let session = ctx.session();
    let outcome = session
        .write()
        .await
        .apply_xp_snapshot(xp, None, XpSource::Manual, None);

    match outcome {
        SnapshotOutcome::Recorded(snapshot) => println!(
            "recorded xp {} (delta {}, level {})",
            snapshot.xp,
            snapshot.delta,
            xp_table::level_from_xp(snapshot.xp)
        ),
        SnapshotOutcome::Suppressed { delta } => {
            println!("snapshot suppressed (delta {})", delta)
        }
    }
}

pub async fn pause(ctx: &CliContext) {
    let session = ctx.session();
    session.write().await.pause(Local::now().naive_local());
    println!("paused");
}

pub async fn unpause(ctx: &CliContext) {
    let session = ctx.session();
    session.write().await.unpause(Local::now().naive_local());
    println!("unpaused");
}

pub async fn show_settings(ctx: &CliContext) {
    let config = ctx.config.read().await;
    match serde_json::to_string_pretty(&*config) {
        Ok(json) => println!("{}", json),
        Err(e) => println!("failed to render config: {}", e),
    }
}

pub async fn set_log_file(path: &str, ctx: &CliContext) {
    let path_buf = PathBuf::from(path);
    if !path_buf.is_file() {
        println!("Update failed. No such file: {}", path);
        return;
    }

    {
        let mut config = ctx.config.write().await;
        config.log_file = Some(path_buf);
        config.clone().save();
    }
    follow_log(path, ctx).await;
}

pub fn exit() {
    write!(std::io::stdout(), "quitting...").expect("error exiting");
    std::io::stdout().flush().expect("error flushing stdout");
}

fn active_time_of(map: &MapInstance) -> TimeDelta {
    // completed maps carry their end time; fall back to zero-width just in case
    map.span.active_time(map.span.end.unwrap_or(map.span.start))
}

fn source_label(source: XpSource) -> &'static str {
    match source {
        XpSource::Ocr => "ocr",
        XpSource::Ladder => "ladder",
        XpSource::Manual => "manual",
    }
}

fn fmt_duration(delta: TimeDelta) -> String {
    let total_secs = delta.num_seconds().max(0);
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    if hours > 0 {
        format!("{}h{:02}m{:02}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m{:02}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}
