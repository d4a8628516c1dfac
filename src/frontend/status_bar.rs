//! Status bar: bottom strip with link state and the most recent visit.

use egui::{Color32, RichText, Ui};
use rust_i18n::t;

use crate::types::{ConnectionStatus, WorkTrace};

/// Context needed to render the status bar.
pub struct StatusBarContext<'a> {
    pub connection_status: ConnectionStatus,
    pub device: &'a str,
    pub last_visit: Option<&'a WorkTrace>,
}

fn status_style(status: ConnectionStatus) -> (Color32, String) {
    match status {
        ConnectionStatus::Connected => (Color32::GREEN, t!("status.connected").into_owned()),
        ConnectionStatus::Disconnected => {
            (Color32::GRAY, t!("status.disconnected").into_owned())
        }
        ConnectionStatus::Lost => (Color32::RED, t!("status.lost").into_owned()),
    }
}

/// Render the status bar.
pub fn render_status_bar(ui: &mut Ui, ctx: &StatusBarContext<'_>) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let (status_color, status_text) = status_style(ctx.connection_status);
        ui.colored_label(status_color, "●");
        ui.label(RichText::new(format!("{}: {}", status_text, ctx.device)).small());

        ui.separator();

        let visit_text = match ctx.last_visit {
            Some(trace) => t!(
                "status.last_visit",
                name = trace.name,
                machine = trace.machine,
                date = trace.date
            )
            .into_owned(),
            None => t!("status.no_visits").into_owned(),
        };
        ui.label(RichText::new(visit_text).small());
    });
}
