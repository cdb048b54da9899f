//! Live telemetry: one sample, or a stream until Ctrl-C.

use evse_core::{Panel, TelemetryPoller, TelemetryView};

use crate::cli::{GlobalOpts, OutputFormat, StatusArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(panel: &Panel, args: StatusArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(global.color());

    if !args.watch {
        // A one-shot read reports the failure instead of a placeholder view.
        let status = panel.fetch_status().await?;
        let view = TelemetryView::from_status(&status);
        let out = output::render_single(
            global.output(),
            &view,
            |v| detail(v, color),
            |v| v.charge.text.clone(),
        );
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    let mut poller = panel.poller();
    if let Some(ref raw) = args.interval {
        let period = humantime::parse_duration(raw).map_err(|e| CliError::Validation {
            field: "interval".into(),
            reason: format!("'{raw}': {e}"),
        })?;
        if period.is_zero() {
            return Err(CliError::Validation {
                field: "interval".into(),
                reason: "must be greater than zero".into(),
            });
        }
        poller = TelemetryPoller::new(panel.clone(), period);
    }

    let mut rx = poller.subscribe();
    let handle = poller.start()?;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = rx.borrow_and_update().clone();
                let line = match global.output() {
                    OutputFormat::Table | OutputFormat::Plain => line(&view, color),
                    // One JSON document per line.
                    _ => output::render_json(&view, true),
                };
                output::print_output(&line, global.quiet);
            }
        }
    }

    handle.stop().await;
    Ok(())
}

fn detail(view: &TelemetryView, color: bool) -> String {
    let mut pairs = vec![
        ("Voltage", view.voltage.clone()),
        ("Current", view.current.clone()),
        ("Power", view.power.clone()),
        ("Charge", output::paint(&view.charge.text, view.charge.tone, color)),
        ("Network", output::paint(&view.network.text, view.network.tone, color)),
    ];
    if let Some(ref v) = view.leakage_ac {
        pairs.push(("AC leakage", v.clone()));
    }
    if let Some(ref v) = view.leakage_dc {
        pairs.push(("DC leakage", v.clone()));
    }
    if let Some(ref v) = view.cp_voltage {
        pairs.push(("CP voltage", v.clone()));
    }
    if let Some(ref cover) = view.cover {
        pairs.push(("Cover", output::paint(&cover.text, cover.tone, color)));
    }
    output::render_detail(&pairs)
}

fn line(view: &TelemetryView, color: bool) -> String {
    let now = chrono::Local::now().format("%H:%M:%S");
    format!(
        "{now}  {:>10}  {:>8}  {:>10}  {}  {}",
        view.voltage,
        view.current,
        view.power,
        output::paint(&view.charge.text, view.charge.tone, color),
        output::paint(&view.network.text, view.network.tone, color),
    )
}
