//! Dialog trait system
//!
//! Each dialog implements [`Dialog`], which ties together its state, the
//! action it can produce and how it renders. [`show_dialog`] runs the shared
//! window lifecycle.

use egui::{Align2, Context, Ui};

pub mod notice;

pub use notice::{NoticeAction, NoticeDialog, NoticeQueue};

/// What a dialog asks for after one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DialogAction<A> {
    /// Nothing happened this frame
    #[default]
    None,
    /// Dismissed
    Close,
    /// Dismissed with a result for the caller
    CloseWithAction(A),
    /// Result for the caller, dialog stays up
    Action(A),
}

impl<A> DialogAction<A> {
    pub fn should_close(&self) -> bool {
        matches!(self, DialogAction::Close | DialogAction::CloseWithAction(_))
    }

    /// The caller-facing result, if any
    pub fn into_action(self) -> Option<A> {
        match self {
            DialogAction::CloseWithAction(a) | DialogAction::Action(a) => Some(a),
            _ => None,
        }
    }
}

/// Lifecycle hooks for dialog state
pub trait DialogState: Default {
    /// Called when the dialog closes
    fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether the dialog currently has anything to show
    fn is_valid(&self) -> bool {
        true
    }
}

/// Window appearance for a dialog
#[derive(Debug, Clone)]
pub struct DialogWindowConfig {
    pub default_width: f32,
    pub resizable: bool,
    pub collapsible: bool,
    /// Pin the window instead of letting the user move it
    pub anchor: Option<(Align2, [f32; 2])>,
}

impl Default for DialogWindowConfig {
    fn default() -> Self {
        Self {
            default_width: 320.0,
            resizable: false,
            collapsible: false,
            anchor: None,
        }
    }
}

impl DialogWindowConfig {
    /// A fixed-size dialog centered on the window
    pub fn centered(width: f32) -> Self {
        Self {
            default_width: width,
            anchor: Some((Align2::CENTER_CENTER, [0.0, 0.0])),
            ..Self::default()
        }
    }
}

/// A dialog: state, action and rendering in one place
pub trait Dialog {
    type State: DialogState;

    /// Result handed back to the caller
    type Action;

    /// Borrowed data the dialog reads while rendering
    type Context<'a>;

    /// Localized window title
    fn title(state: &Self::State) -> String;

    fn window_config() -> DialogWindowConfig {
        DialogWindowConfig::default()
    }

    /// Render the dialog content and report what should happen next
    fn render(
        state: &mut Self::State,
        ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action>;
}

/// Show a dialog while its state is valid
///
/// Renders nothing when [`DialogState::is_valid`] is false. A closing action
/// resets the state. Returns the action the dialog produced, if any.
pub fn show_dialog<D: Dialog>(
    ctx: &Context,
    state: &mut D::State,
    dialog_ctx: D::Context<'_>,
) -> Option<D::Action> {
    if !state.is_valid() {
        return None;
    }

    let config = D::window_config();
    let mut action_result: Option<D::Action> = None;
    let mut should_close = false;

    let mut window = egui::Window::new(D::title(state))
        .collapsible(config.collapsible)
        .resizable(config.resizable)
        .default_width(config.default_width);

    if let Some((align, offset)) = config.anchor {
        window = window.anchor(align, offset);
    }

    window.show(ctx, |ui| {
        let action = D::render(state, dialog_ctx, ui);
        should_close = action.should_close();
        action_result = action.into_action();
    });

    if should_close {
        state.reset();
    }

    action_result
}
