//! Notice dialog
//!
//! Notices are queued and shown one at a time, oldest first. The dialog is
//! modal in effect: the form underneath ignores input while a notice is up.

use super::{Dialog, DialogAction, DialogState, DialogWindowConfig};
use crate::notice::{Notice, NoticeLevel};
use egui::{Color32, RichText, Ui};
use rust_i18n::t;
use std::collections::VecDeque;

/// Pending notices, front is on screen
#[derive(Debug, Default)]
pub struct NoticeQueue {
    pending: VecDeque<Notice>,
}

impl NoticeQueue {
    pub fn push(&mut self, notice: Notice) {
        self.pending.push_back(notice);
    }

    /// The notice currently shown
    pub fn current(&self) -> Option<&Notice> {
        self.pending.front()
    }

    /// Dismiss the notice currently shown
    pub fn acknowledge(&mut self) -> Option<Notice> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl DialogState for NoticeQueue {
    fn reset(&mut self) {
        self.pending.pop_front();
    }

    fn is_valid(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Action from the notice dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeAction {
    /// The operator dismissed this notice
    Acknowledged(Notice),
}

pub struct NoticeDialog;

impl Dialog for NoticeDialog {
    type State = NoticeQueue;
    type Action = NoticeAction;
    type Context<'a> = ();

    fn title(state: &Self::State) -> String {
        state
            .current()
            .map(|notice| notice.level.title())
            .unwrap_or_default()
    }

    fn window_config() -> DialogWindowConfig {
        DialogWindowConfig::centered(300.0)
    }

    fn render(
        state: &mut Self::State,
        _ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action> {
        let notice = match state.current() {
            Some(notice) => notice.clone(),
            None => return DialogAction::Close,
        };

        let color = match notice.level {
            NoticeLevel::Info => ui.visuals().text_color(),
            NoticeLevel::Warning => Color32::from_rgb(230, 160, 40),
            NoticeLevel::Error => Color32::LIGHT_RED,
        };
        ui.label(RichText::new(notice.message.text()).color(color));

        ui.separator();

        let ok = ui.vertical_centered(|ui| ui.button(t!("notice.ok")).clicked()).inner;
        if ok {
            DialogAction::CloseWithAction(NoticeAction::Acknowledged(notice))
        } else {
            DialogAction::None
        }
    }
}
