//! Protection threshold handlers.

use strum::{EnumCount, IntoEnumIterator};

use evse_core::{ConfigUpdate, ConfigView, DeviceConfig, FormField, Panel, Tone};

use crate::cli::{GlobalOpts, SettingsArgs, SettingsCommand, SettingsSetArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    panel: &Panel,
    args: SettingsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SettingsCommand::Show => {
            let view = panel.load_config().await;
            print_view(&view, global);
            Ok(())
        }

        SettingsCommand::Set(set) => {
            let overrides = overrides(&set);
            if overrides.is_empty() {
                return Err(CliError::Validation {
                    field: "settings".into(),
                    reason: "nothing to change; pass at least one --<field> flag".into(),
                });
            }

            // Unspecified fields keep the device's current values, so a
            // failed read is only acceptable when every field is given.
            let current = panel.load_config().await;
            if current.error.is_some() && overrides.len() < FormField::COUNT {
                return Err(CliError::Device {
                    message: "could not read current settings; pass all five fields to overwrite"
                        .into(),
                });
            }

            let mut form = current.form;
            for (field, value) in overrides {
                form.set(field, value);
            }

            let outcome = panel.save_config(&form).await;
            if let Some(view) = util::finish(outcome, global)? {
                print_view(&view, global);
            }
            Ok(())
        }

        SettingsCommand::Reset => {
            let gate = util::confirm_gate(global, "settings reset")?;
            let Some(form) = panel.reset_form(&gate) else {
                return Err(CliError::Declined {
                    action: "settings reset".into(),
                });
            };
            let outcome = panel.save_config(&form).await;
            if let Some(view) = util::finish(outcome, global)? {
                print_view(&view, global);
            }
            Ok(())
        }
    }
}

fn overrides(set: &SettingsSetArgs) -> Vec<(FormField, u32)> {
    [
        (FormField::VoltageDeviation, set.voltage_deviation),
        (FormField::MaxCurrent, set.max_current),
        (FormField::CpDeviation, set.cp_deviation),
        (FormField::LeakageAc, set.leakage_ac),
        (FormField::LeakageDc, set.leakage_dc),
    ]
    .into_iter()
    .filter_map(|(field, value)| value.map(|v| (field, v)))
    .collect()
}

fn print_view(view: &ConfigView, global: &GlobalOpts) {
    let color = output::should_color(global.color());
    let out = output::render_single(
        global.output(),
        view,
        |v| detail(v, color),
        |v| form_line(&v.form),
    );
    output::print_output(&out, global.quiet);
}

fn detail(view: &ConfigView, color: bool) -> String {
    let mut device = Vec::new();
    match (&view.device, &view.error) {
        (Some(cfg), _) => device_pairs(cfg, &mut device),
        (None, Some(error)) => device.push(("Device".to_owned(), output::paint(error, Tone::Danger, color))),
        (None, None) => {}
    }

    let form: Vec<(String, String)> = FormField::iter()
        .map(|field| (field.to_string(), format!("{} {}", view.form.get(field), field.unit())))
        .collect();

    if device.is_empty() {
        return output::render_detail(&form);
    }
    format!("{}\n\n{}", output::render_detail(&device), output::render_detail(&form))
}

fn device_pairs(device: &DeviceConfig, pairs: &mut Vec<(String, String)>) {
    pairs.push(("Over-voltage".into(), format!("{:.1} V", device.ov_threshold)));
    pairs.push(("Under-voltage".into(), format!("{:.1} V", device.uv_threshold)));
    pairs.push(("Max charge current".into(), format!("{:.0} A", device.max_current)));
    pairs.push(("AC leakage limit".into(), format!("{:.0} mA", device.leakage_ac)));
    pairs.push(("DC leakage limit".into(), format!("{:.0} mA", device.leakage_dc)));
}

fn form_line(form: &ConfigUpdate) -> String {
    FormField::iter()
        .map(|f| form.get(f).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
